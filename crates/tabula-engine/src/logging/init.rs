use std::sync::Once;

use log::LevelFilter;

/// Where the engine's diagnostics go when the host has no logger of its own.
///
/// Shader compile and link logs, texture and canvas failures, and GL errors
/// are reported at `error`/`warn`; engine init at `info`; per-object
/// lifecycle at `debug`/`trace`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// `env_logger` filter directives, e.g. `"tabula_engine=debug"`. Falls
    /// back to `RUST_LOG`, then to `default_level`.
    pub env_filter: Option<String>,
    /// Level used when neither `env_filter` nor `RUST_LOG` is set.
    pub default_level: LevelFilter,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            default_level: LevelFilter::Info,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

static INIT: Once = Once::new();

/// Routes engine diagnostics to stderr through `env_logger`.
///
/// Runs at most once per process. If the host already installed a `log`
/// backend that one stays in place and this call does nothing.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();
        match config.env_filter.or_else(|| std::env::var("RUST_LOG").ok()) {
            Some(filter) => builder.parse_filters(&filter),
            None => builder.filter_level(config.default_level),
        };
        builder.write_style(config.write_style);

        match builder.try_init() {
            Ok(()) => log::debug!("engine logging routed to env_logger"),
            Err(_) => log::debug!("host logger already installed; keeping it"),
        }
    });
}
