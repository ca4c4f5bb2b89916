use alloy::signers::local::PrivateKeySigner;
use alloy_primitives::{Address, B256};
use k256::ecdsa::SigningKey;
use std::fmt::{Debug, Formatter};
use std::path::Path;
use std::str::FromStr;

/// A secp256k1 key held in memory, the account that signs submitted transactions.
#[derive(Clone, PartialEq, Eq)]
pub struct LocalPrivateKeySigner {
    private_key: B256,
    address: Address,
}

impl LocalPrivateKeySigner {
    pub fn from_hex(private_key_hex: &str) -> Result<Self, SignerError> {
        let private_key = B256::from_str(private_key_hex.trim())
            .map_err(|error| SignerError::InvalidKey(error.to_string()))?;
        Self::from_bytes(private_key)
    }

    pub fn from_bytes(private_key: B256) -> Result<Self, SignerError> {
        let signing_key = SigningKey::from_slice(private_key.as_slice())
            .map_err(|error| SignerError::InvalidKey(error.to_string()))?;
        let address = Address::from_public_key(signing_key.verifying_key());
        Ok(Self {
            private_key,
            address,
        })
    }

    /// Decrypts a Web3 Secret Storage (v3) keystore file.
    pub fn from_keystore(path: &Path, password: &str) -> Result<Self, SignerError> {
        let signer = PrivateKeySigner::decrypt_keystore(path, password).map_err(|error| {
            SignerError::Keystore {
                path: path.display().to_string(),
                reason: error.to_string(),
            }
        })?;
        Self::from_bytes(signer.to_bytes())
    }

    /// Generates a fresh random account.
    pub fn random() -> Self {
        let signer = PrivateKeySigner::random();
        Self {
            private_key: signer.to_bytes(),
            address: signer.address(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn private_key_hex(&self) -> String {
        format!("{:#x}", self.private_key)
    }

    pub(crate) fn to_alloy_signer(&self) -> Result<PrivateKeySigner, SignerError> {
        PrivateKeySigner::from_bytes(&self.private_key)
            .map_err(|error| SignerError::InvalidKey(error.to_string()))
    }
}

impl Debug for LocalPrivateKeySigner {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalPrivateKeySigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SignerError {
    #[error("invalid private key hex: {0}")]
    InvalidKey(String),
    #[error("keystore `{path}` could not be decrypted: {reason}")]
    Keystore { path: String, reason: String },
}

#[cfg(test)]
#[path = "signer_test.rs"]
mod tests;
