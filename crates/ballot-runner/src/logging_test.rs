use super::{default_log_directive, init_tracing};

#[test]
fn verbose_raises_ballot_targets_to_debug() {
    assert_eq!(default_log_directive(false), "warn,ballot=info");
    assert_eq!(default_log_directive(true), "warn,ballot=debug");
}

#[test]
fn init_tracing_is_idempotent() {
    init_tracing(false);
    init_tracing(true);
}
