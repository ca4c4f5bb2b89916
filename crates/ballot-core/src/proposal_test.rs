use super::{ProposalName, ProposalNameError};
use alloy_primitives::{hex, B256};

#[test]
fn text_is_right_padded_into_bytes32() {
    let name = ProposalName::from_text("proposal1").expect("fits");
    let word = name.as_word();
    assert_eq!(&word[..9], b"proposal1");
    assert!(word[9..].iter().all(|byte| *byte == 0));
    assert_eq!(name.to_text(), "proposal1");
}

#[test]
fn rejects_empty_and_oversized_names() {
    assert_eq!(ProposalName::from_text(""), Err(ProposalNameError::Empty));
    let long = "x".repeat(33);
    assert_eq!(
        ProposalName::from_text(long.as_str()),
        Err(ProposalNameError::TooLong { len: 33 })
    );
    assert!(ProposalName::from_text("y".repeat(32).as_str()).is_ok());
}

#[test]
fn word_with_non_utf8_bytes_renders_as_hex() {
    let mut raw = [0u8; 32];
    raw[0] = 0xff;
    raw[1] = 0xfe;
    let name = ProposalName::from_word(B256::from(raw));
    assert_eq!(name.to_text(), "0xfffe");
}

#[test]
fn zero_word_renders_as_empty_text() {
    let name = ProposalName::from_word(B256::ZERO);
    assert_eq!(name.trimmed().len(), 0);
    assert_eq!(name.to_string(), "");
}

#[test]
fn serde_uses_the_text_form() {
    let name: ProposalName = serde_json::from_str("\"proposal2\"").expect("decode");
    assert_eq!(serde_json::to_string(&name).expect("encode"), "\"proposal2\"");
    assert_eq!(
        hex::encode(&name.as_word()[..9]),
        hex::encode(b"proposal2")
    );
    assert!(serde_json::from_str::<ProposalName>("\"\"").is_err());
}
