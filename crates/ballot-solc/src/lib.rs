//! Thin driver around the `solc` binary.
//!
//! Compilation always goes through `solc --combined-json abi,bin`; the same
//! JSON shape can be loaded from disk, so a run can reuse an artifact
//! produced elsewhere instead of requiring a local compiler.
mod artifact;
mod compiler;
mod diagnostics;
mod error;
mod version;

pub use artifact::{load_combined_json, parse_combined_json, CompileOutput, CompiledContract};
pub use compiler::{SolcCompiler, DEFAULT_SOLC_BINARY};
pub use diagnostics::{parse_solc_diagnostics, DiagnosticDetails, DiagnosticKind, SolcDiagnostic};
pub use error::SolcError;
pub use version::SolcVersion;

const LOG_TARGET: &str = "ballot::solc";
