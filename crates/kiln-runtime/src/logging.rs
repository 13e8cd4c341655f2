//! Logger setup for binaries and tools built on the runtime

/// Filter used when `RUST_LOG` is not set. GPU backends are noisy below `warn`.
pub const DEFAULT_FILTER: &str = "info,wgpu_core=warn,wgpu_hal=warn,naga=warn";

/// Install the global `env_logger`. Later calls are ignored.
pub fn init() {
    init_with_filter(DEFAULT_FILTER);
}

/// Install the global logger with `filter` as the fallback for `RUST_LOG`
pub fn init_with_filter(filter: &str) {
    let env = env_logger::Env::default().default_filter_or(filter);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init();
}
