use super::{LocalPrivateKeySigner, SignerError};
use alloy_primitives::address;
use std::io::Write;

#[test]
fn rejects_invalid_hex() {
    let error = LocalPrivateKeySigner::from_hex("0x1234").expect_err("must reject short key");
    assert!(matches!(error, SignerError::InvalidKey(_)));

    let zero = LocalPrivateKeySigner::from_hex(
        "0x0000000000000000000000000000000000000000000000000000000000000000",
    )
    .expect_err("zero scalar is not a valid key");
    assert!(matches!(zero, SignerError::InvalidKey(_)));
}

#[test]
fn derives_the_well_known_address_for_key_one() {
    let signer = LocalPrivateKeySigner::from_hex(
        "0x0000000000000000000000000000000000000000000000000000000000000001",
    )
    .expect("valid key");
    assert_eq!(
        signer.address(),
        address!("7E5F4552091A69125d5DfCb7b8C2659029395Bdf")
    );
    assert_eq!(
        signer.private_key_hex(),
        "0x0000000000000000000000000000000000000000000000000000000000000001"
    );
}

#[test]
fn debug_output_hides_the_key() {
    let signer = LocalPrivateKeySigner::from_hex(
        "0x1111111111111111111111111111111111111111111111111111111111111111",
    )
    .expect("valid key");
    let rendered = format!("{signer:?}");
    assert!(rendered.contains("address"));
    assert!(!rendered.contains("1111111111111111"));
}

#[test]
fn random_accounts_are_distinct_and_round_trip_through_hex() {
    let first = LocalPrivateKeySigner::random();
    let second = LocalPrivateKeySigner::random();
    assert_ne!(first.address(), second.address());

    let reloaded = LocalPrivateKeySigner::from_hex(first.private_key_hex().as_str()).expect("reload");
    assert_eq!(reloaded, first);
}

#[test]
fn keystore_errors_name_the_path() {
    let missing = LocalPrivateKeySigner::from_keystore(
        std::path::Path::new("/nonexistent/keystore.json"),
        "password",
    )
    .expect_err("missing file");
    assert!(matches!(missing, SignerError::Keystore { ref path, .. } if path.contains("keystore.json")));

    let mut garbage = tempfile::NamedTempFile::new().expect("temp file");
    garbage.write_all(b"not a keystore").expect("write");
    let error = LocalPrivateKeySigner::from_keystore(garbage.path(), "password")
        .expect_err("malformed keystore");
    assert!(matches!(error, SignerError::Keystore { .. }));
}
