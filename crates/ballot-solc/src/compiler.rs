use crate::artifact::{parse_combined_json, CompileOutput};
use crate::diagnostics::parse_solc_diagnostics;
use crate::error::SolcError;
use crate::version::SolcVersion;
use crate::LOG_TARGET;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::{debug, warn};

pub const DEFAULT_SOLC_BINARY: &str = "solc";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolcCompiler {
    binary: PathBuf,
}

impl SolcCompiler {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        self.binary.as_path()
    }

    pub fn version(&self) -> Result<SolcVersion, SolcError> {
        let output = self.spawn(|command| {
            command.arg("--version");
        })?;
        if !output.status.success() {
            return Err(SolcError::Failed {
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }
        SolcVersion::from_version_output(String::from_utf8_lossy(&output.stdout).as_ref())
    }

    pub fn ensure_min_version(&self, required: SolcVersion) -> Result<SolcVersion, SolcError> {
        let found = self.version()?;
        debug!(target: LOG_TARGET, %found, %required, "solc version check");
        if found < required {
            return Err(SolcError::VersionTooOld { found, required });
        }
        Ok(found)
    }

    pub fn compile_files(&self, files: &[PathBuf]) -> Result<CompileOutput, SolcError> {
        let output = self.spawn(|command| {
            command.arg("--combined-json").arg("abi,bin").args(files);
        })?;
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        if !output.status.success() {
            return Err(SolcError::Failed { stderr });
        }

        let compiled = CompileOutput {
            contracts: parse_combined_json(&output.stdout)?,
            diagnostics: parse_solc_diagnostics(stderr.as_str())?,
        };
        for diagnostic in compiled.warnings() {
            warn!(target: LOG_TARGET, message = %diagnostic.message, line = ?diagnostic.details.line, "solc warning");
        }
        debug!(target: LOG_TARGET, contracts = compiled.contracts.len(), "solc compiled");
        Ok(compiled)
    }

    /// Compiles an in-memory source through a temporary file.
    pub fn compile_source(&self, code: &str) -> Result<CompileOutput, SolcError> {
        let mut temp_file = tempfile::Builder::new()
            .suffix(".sol")
            .tempfile()
            .map_err(SolcError::TempSource)?;
        temp_file
            .write_all(code.as_bytes())
            .map_err(SolcError::TempSource)?;
        self.compile_files(&[temp_file.path().to_path_buf()])
    }

    fn spawn(&self, configure: impl FnOnce(&mut Command)) -> Result<Output, SolcError> {
        let mut command = Command::new(&self.binary);
        configure(&mut command);
        command.output().map_err(|source| SolcError::Spawn {
            binary: self.binary.display().to_string(),
            source,
        })
    }
}

impl Default for SolcCompiler {
    fn default() -> Self {
        Self::new(DEFAULT_SOLC_BINARY)
    }
}

#[cfg(test)]
#[path = "compiler_test.rs"]
mod tests;
