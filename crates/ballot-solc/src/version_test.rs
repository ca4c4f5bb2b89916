use super::SolcVersion;
use crate::SolcError;

#[test]
fn parses_version_banner() {
    let output = "solc, the solidity compiler commandline interface\nVersion: 0.8.26+commit.8a97fa7a.Linux.g++\n";
    let version = SolcVersion::from_version_output(output).expect("must parse");
    assert_eq!(version, SolcVersion::new(0, 8, 26));
    assert_eq!(version.to_string(), "0.8.26");
}

#[test]
fn rejects_banner_without_version() {
    let error = SolcVersion::from_version_output("command not found").expect_err("must fail");
    assert!(matches!(error, SolcError::UnknownVersion(_)));
}

#[test]
fn from_str_accepts_optional_v_prefix() {
    assert_eq!("v0.8.20".parse::<SolcVersion>().expect("parse"), SolcVersion::new(0, 8, 20));
    assert_eq!("0.5.12".parse::<SolcVersion>().expect("parse"), SolcVersion::new(0, 5, 12));
    assert!("0.8".parse::<SolcVersion>().is_err());
    assert!("0.8.x".parse::<SolcVersion>().is_err());
}

#[test]
fn ordering_is_numeric_not_lexical() {
    assert!(SolcVersion::new(0, 8, 10) > SolcVersion::new(0, 8, 9));
    assert!(SolcVersion::new(1, 0, 0) > SolcVersion::new(0, 100, 5));
}
