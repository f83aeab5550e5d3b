use std::sync::Once;

use crate::config::ConfigSource;

/// Filter used when neither the config nor `RUST_LOG` provide one.
///
/// wgpu and naga are chatty at info level; keep them at warn.
const DEFAULT_FILTER: &str = "info,wgpu_core=warn,wgpu_hal=warn,naga=warn";

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g.
/// "opengd_engine=debug,wgpu_core=warn").
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    /// Reads `[LOG] filter` and `[LOG] color`.
    ///
    /// `color = "True"` forces ANSI colors, `"False"` disables them and any
    /// other value leaves the terminal detection on.
    pub fn from_source(source: &dyn ConfigSource) -> Self {
        let filter = source.load_data("LOG", "filter", "");
        let write_style = match source.load_data("LOG", "color", "Auto").as_str() {
            "True" => env_logger::WriteStyle::Always,
            "False" => env_logger::WriteStyle::Never,
            _ => env_logger::WriteStyle::Auto,
        };
        Self {
            env_filter: (!filter.trim().is_empty()).then_some(filter),
            write_style,
        }
    }
}

/// Config filter, else `RUST_LOG`, else [`DEFAULT_FILTER`].
fn resolve_filter(config: Option<&str>, env: Option<&str>) -> String {
    config.or(env).unwrap_or(DEFAULT_FILTER).to_string()
}

static INIT: Once = Once::new();

/// Initializes the global logger once.
///
/// Subsequent calls are ignored. Call early in `main`, before the graphics
/// context is created, so init failures are visible.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let env = std::env::var("RUST_LOG").ok();
        let filter = resolve_filter(config.env_filter.as_deref(), env.as_deref());

        let mut builder = env_logger::Builder::new();
        builder.parse_filters(&filter);
        builder.write_style(config.write_style);

        // A test binary may have installed its own logger already.
        if builder.try_init().is_ok() {
            log::debug!("logging initialized with filter {filter:?}");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapConfig;

    #[test]
    fn filter_precedence() {
        assert_eq!(resolve_filter(Some("debug"), Some("warn")), "debug");
        assert_eq!(resolve_filter(None, Some("warn")), "warn");
        assert_eq!(resolve_filter(None, None), DEFAULT_FILTER);
    }

    #[test]
    fn reads_log_section() {
        let cfg = MapConfig::new()
            .with("LOG", "filter", "opengd_engine=trace")
            .with("LOG", "color", "False");
        let logging = LoggingConfig::from_source(&cfg);
        assert_eq!(logging.env_filter.as_deref(), Some("opengd_engine=trace"));
        assert!(matches!(logging.write_style, env_logger::WriteStyle::Never));
    }

    #[test]
    fn color_follows_true_false_convention() {
        let style = |v: &str| {
            LoggingConfig::from_source(&MapConfig::new().with("LOG", "color", v)).write_style
        };
        assert!(matches!(style("True"), env_logger::WriteStyle::Always));
        assert!(matches!(style("False"), env_logger::WriteStyle::Never));
        assert!(matches!(style("Never"), env_logger::WriteStyle::Auto));
        assert!(matches!(style("Auto"), env_logger::WriteStyle::Auto));
    }

    #[test]
    fn empty_filter_means_unset() {
        let logging = LoggingConfig::from_source(&MapConfig::new());
        assert!(logging.env_filter.is_none());
        assert!(matches!(logging.write_style, env_logger::WriteStyle::Auto));
    }
}
