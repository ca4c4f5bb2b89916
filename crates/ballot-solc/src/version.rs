use crate::error::SolcError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SolcVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl SolcVersion {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Extracts the version from `solc --version` output
    /// (`Version: 0.8.26+commit.8a97fa7a.Linux.g++`).
    pub fn from_version_output(output: &str) -> Result<Self, SolcError> {
        let regex = Regex::new(r"Version:\s*v?(\d+)\.(\d+)\.(\d+)")?;
        let captures = regex
            .captures(output)
            .ok_or_else(|| SolcError::UnknownVersion(output.trim().to_string()))?;
        let part = |index: usize| {
            captures[index]
                .parse::<u64>()
                .map_err(|_| SolcError::UnknownVersion(output.trim().to_string()))
        };
        Ok(Self::new(part(1)?, part(2)?, part(3)?))
    }
}

impl Display for SolcVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for SolcVersion {
    type Err = SolcError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        let text = trimmed.strip_prefix('v').unwrap_or(trimmed);
        let parts = text
            .split('.')
            .map(|part| part.parse::<u64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| SolcError::UnknownVersion(input.to_string()))?;
        match parts.as_slice() {
            [major, minor, patch] => Ok(Self::new(*major, *minor, *patch)),
            _ => Err(SolcError::UnknownVersion(input.to_string())),
        }
    }
}

#[cfg(test)]
#[path = "version_test.rs"]
mod tests;
