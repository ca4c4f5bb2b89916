use super::{format_ether, parse_address, parse_ether};
use alloy_primitives::U256;

#[test]
fn parse_ether_scales_to_wei() {
    assert_eq!(
        parse_ether("1").expect("one ether"),
        U256::from(1_000_000_000_000_000_000u128)
    );
    assert_eq!(
        parse_ether("0.5").expect("half"),
        U256::from(500_000_000_000_000_000u128)
    );
    assert!(parse_ether("one").is_err());
}

#[test]
fn format_ether_renders_decimal() {
    let rendered = format_ether(U256::from(1_500_000_000_000_000_000u128));
    assert!(rendered.starts_with("1.5"));
}

#[test]
fn parse_address_reports_input() {
    let error = parse_address("0x12").expect_err("short address");
    assert!(error.contains("0x12"));
    assert!(parse_address(" 0x0000000000000000000000000000000000000001 ").is_ok());
}
