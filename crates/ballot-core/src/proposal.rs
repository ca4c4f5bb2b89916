use alloy_primitives::{hex, B256};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};

pub const PROPOSAL_NAME_LEN: usize = 32;

/// A ballot proposal name as stored on chain: a right zero-padded `bytes32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProposalName([u8; PROPOSAL_NAME_LEN]);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProposalNameError {
    #[error("proposal name must not be empty")]
    Empty,
    #[error("proposal name is {len} bytes, at most {PROPOSAL_NAME_LEN} fit in bytes32")]
    TooLong { len: usize },
}

impl ProposalName {
    pub fn from_text(text: &str) -> Result<Self, ProposalNameError> {
        let bytes = text.as_bytes();
        if bytes.is_empty() {
            return Err(ProposalNameError::Empty);
        }
        if bytes.len() > PROPOSAL_NAME_LEN {
            return Err(ProposalNameError::TooLong { len: bytes.len() });
        }
        let mut word = [0u8; PROPOSAL_NAME_LEN];
        word[..bytes.len()].copy_from_slice(bytes);
        Ok(Self(word))
    }

    pub fn from_word(word: B256) -> Self {
        Self(word.0)
    }

    pub fn as_word(&self) -> B256 {
        B256::from(self.0)
    }

    pub fn trimmed(&self) -> &[u8] {
        let end = self
            .0
            .iter()
            .rposition(|byte| *byte != 0)
            .map_or(0, |index| index + 1);
        &self.0[..end]
    }

    /// Text form of the name; falls back to hex when the bytes are not UTF-8.
    pub fn to_text(&self) -> String {
        let trimmed = self.trimmed();
        match std::str::from_utf8(trimmed) {
            Ok(text) => text.to_string(),
            Err(_) => format!("0x{}", hex::encode(trimmed)),
        }
    }
}

impl Display for ProposalName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_text().as_str())
    }
}

impl std::str::FromStr for ProposalName {
    type Err = ProposalNameError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::from_text(text)
    }
}

impl Serialize for ProposalName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.to_text().as_str())
    }
}

impl<'de> Deserialize<'de> for ProposalName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::from_text(text.as_str()).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "proposal_test.rs"]
mod tests;
