use std::io::IsTerminal;

use anyhow::anyhow;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
const DEFAULT_LEVEL: &str = "warn";

/// Filter directives taken from the rc file. `log.filter` is used verbatim;
/// otherwise `log.level` applies to every target.
pub fn filter_directives(cfg: &Config) -> String {
    if let Some(filter) = cfg.get("log.filter").filter(|f| !f.trim().is_empty()) {
        return filter.trim().to_string();
    }
    cfg.get("log.level")
        .map(|raw| raw.trim().to_ascii_lowercase())
        .filter(|level| LEVELS.contains(&level.as_str()))
        .unwrap_or_else(|| DEFAULT_LEVEL.to_string())
}

/// Installs the fmt subscriber. `RUST_LOG` wins over the rc settings.
pub fn init_tracing(cfg: &Config) -> anyhow::Result<()> {
    let directives = filter_directives(cfg);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&directives))
        .map_err(|e| anyhow!("invalid RUST_LOG / log.filter `{directives}`: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(pairs: &[(&str, &str)]) -> Config {
        let mut cfg = Config::default();
        cfg.apply_overrides(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        );
        cfg
    }

    #[test]
    fn filter_prefers_explicit_directives() {
        assert_eq!(filter_directives(&Config::default()), "warn");
        assert_eq!(filter_directives(&cfg(&[("log.level", " DEBUG ")])), "debug");
        assert_eq!(filter_directives(&cfg(&[("log.level", "loud")])), "warn");
        assert_eq!(
            filter_directives(&cfg(&[
                ("log.level", "info"),
                ("log.filter", "timesheet_core=trace,warn"),
            ])),
            "timesheet_core=trace,warn"
        );
    }

    #[test]
    fn second_init_is_tolerated() {
        let cfg = cfg(&[("log.level", "info")]);
        init_tracing(&cfg).expect("first init");
        init_tracing(&cfg).expect("second init");
    }
}
