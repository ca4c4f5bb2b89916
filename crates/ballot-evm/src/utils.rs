use alloy_primitives::utils;
use alloy_primitives::{Address, U256};
use std::str::FromStr;

pub fn parse_address(text: &str) -> Result<Address, String> {
    Address::from_str(text.trim()).map_err(|error| format!("invalid address `{text}`: {error}"))
}

/// Parses a decimal ether amount (`"1"`, `"0.25"`) into wei.
pub fn parse_ether(text: &str) -> Result<U256, String> {
    utils::parse_ether(text.trim()).map_err(|error| format!("invalid ether amount `{text}`: {error}"))
}

pub fn format_ether(wei: U256) -> String {
    utils::format_ether(wei)
}

#[cfg(test)]
#[path = "utils_test.rs"]
mod tests;
