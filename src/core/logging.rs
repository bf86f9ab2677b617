//! Logging initialization

/// Install `env_logger` as the `log` backend.
///
/// Reads `RUST_LOG`, defaulting to `info`. Calling it again after a logger is
/// installed does nothing.
pub fn init_logging() {
    let env = env_logger::Env::default().default_filter_or("info");
    if env_logger::Builder::from_env(env).try_init().is_ok() {
        log::debug!("Logging initialized");
    }
}
