use super::{SolcCompiler, DEFAULT_SOLC_BINARY};
use crate::SolcError;
use std::path::Path;

#[test]
fn default_compiler_uses_solc_from_path() {
    let compiler = SolcCompiler::default();
    assert_eq!(compiler.binary(), Path::new(DEFAULT_SOLC_BINARY));
}

#[test]
fn missing_binary_surfaces_spawn_error() {
    let compiler = SolcCompiler::new("/nonexistent/solc-binary-for-tests");
    let error = compiler.version().expect_err("must fail to spawn");
    assert!(matches!(error, SolcError::Spawn { ref binary, .. } if binary.contains("solc-binary-for-tests")));

    let error = compiler
        .compile_source("contract A {}")
        .expect_err("must fail to spawn");
    assert!(matches!(error, SolcError::Spawn { .. }));
}

#[cfg(unix)]
#[test]
fn failing_binary_reports_stderr() {
    // `false` exits non-zero without output, standing in for a broken compiler.
    let compiler = SolcCompiler::new("false");
    let error = compiler
        .compile_files(&[std::path::PathBuf::from("Ballot.sol")])
        .expect_err("must fail");
    assert!(matches!(error, SolcError::Failed { .. }));
}
