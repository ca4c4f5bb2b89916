use tracing_subscriber::EnvFilter;

/// Directive used when `RUST_LOG` is unset.
pub fn default_log_directive(verbose: bool) -> &'static str {
    if verbose {
        "warn,ballot=debug"
    } else {
        "warn,ballot=info"
    }
}

/// Installs the stderr fmt subscriber; stdout stays reserved for command output.
pub fn init_tracing(verbose: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_directive(verbose)));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter)
        .try_init();
}

#[cfg(test)]
#[path = "logging_test.rs"]
mod tests;
