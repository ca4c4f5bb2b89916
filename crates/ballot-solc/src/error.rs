use crate::version::SolcVersion;

#[derive(Debug, thiserror::Error)]
pub enum SolcError {
    #[error("spawn `{binary}` failed: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },
    #[error("write temporary source failed: {0}")]
    TempSource(#[source] std::io::Error),
    #[error("read artifact `{path}` failed: {source}")]
    ReadArtifact {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("solc failed: {stderr}")]
    Failed { stderr: String },
    #[error("solc output pattern invalid: {0}")]
    Pattern(#[from] regex::Error),
    #[error("unrecognized solc version output: {0}")]
    UnknownVersion(String),
    #[error("solc {found} is older than required {required}")]
    VersionTooOld {
        found: SolcVersion,
        required: SolcVersion,
    },
    #[error("combined json malformed: {0}")]
    Malformed(String),
    #[error("contract `{name}` not found in compiler output (available: {available})")]
    ContractNotFound { name: String, available: String },
    #[error("contract name `{name}` is ambiguous: {candidates}")]
    AmbiguousContract { name: String, candidates: String },
}
