use anyhow::{Context, Result};
use config::Config;
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// When the console report lists every suite and spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SpecdocMode {
    Always,
    Never,
    Failure,
}

/// Top-level configuration.
///
/// Loaded from a TOML file (`$JASMINE_GUARD_CONFIG`, default
/// `jasmine-guard.toml`) and then from `JASMINE_GUARD__*` environment
/// variables. Every key is optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Base URL of the Jasmine HTML runner
    pub jasmine_url: String,
    /// Path to the PhantomJS binary
    pub phantomjs_bin: String,
    /// Show desktop notifications
    pub notification: bool,
    /// Suppress the notification for a passing suite
    pub hide_success: bool,
    /// Passing this directory as a path runs every suite
    pub spec_dir: PathBuf,
    pub specdoc: SpecdocMode,
    /// Probe `jasmine_url` before spawning PhantomJS
    pub server_check: bool,
    #[serde(with = "humantime_serde")]
    pub server_timeout: Duration,
    /// How long the driver script waits for Jasmine to report
    #[serde(with = "humantime_serde")]
    pub page_timeout: Duration,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            jasmine_url: "http://localhost:8888/jasmine".to_string(),
            phantomjs_bin: "phantomjs".to_string(),
            notification: true,
            hide_success: false,
            spec_dir: PathBuf::from("spec/javascripts"),
            specdoc: SpecdocMode::Failure,
            server_check: true,
            server_timeout: Duration::from_secs(5),
            page_timeout: Duration::from_secs(10),
        }
    }
}

impl GuardConfig {
    /// Loads the configuration. `path` wins over `$JASMINE_GUARD_CONFIG`.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_string(),
            None => env::var("JASMINE_GUARD_CONFIG")
                .unwrap_or_else(|_| "jasmine-guard.toml".to_string()),
        };

        debug!("JASMINE_GUARD_CONFIG => {}", config_path);

        Self::from_builder(
            Config::builder()
                .add_source(config::File::with_name(&config_path).required(path.is_some()))
                .add_source(env_source()),
        )
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self> {
        builder
            .build()
            .context("loading configuration")?
            .try_deserialize::<Self>()
            .context("parsing configuration")
    }

    pub fn with_jasmine_url(mut self, url: impl Into<String>) -> Self {
        self.jasmine_url = url.into();
        self
    }

    pub fn with_phantomjs_bin(mut self, bin: impl Into<String>) -> Self {
        self.phantomjs_bin = bin.into();
        self
    }

    pub fn with_notification(mut self, notification: bool) -> Self {
        self.notification = notification;
        self
    }

    pub fn with_hide_success(mut self, hide_success: bool) -> Self {
        self.hide_success = hide_success;
        self
    }

    pub fn with_spec_dir(mut self, spec_dir: impl Into<PathBuf>) -> Self {
        self.spec_dir = spec_dir.into();
        self
    }

    pub fn with_specdoc(mut self, specdoc: SpecdocMode) -> Self {
        self.specdoc = specdoc;
        self
    }

    pub fn with_server_check(mut self, server_check: bool) -> Self {
        self.server_check = server_check;
        self
    }
}

/// `JASMINE_GUARD__HIDE_SUCCESS=true` overrides `hide_success`.
fn env_source() -> config::Environment {
    config::Environment::with_prefix("JASMINE_GUARD").separator("__")
}

pub fn debug_print_config(cfg: &GuardConfig) {
    debug!("🔧 Loaded Configuration:");
    debug!("    jasmine_url = {}", cfg.jasmine_url);
    debug!("    phantomjs_bin = {}", cfg.phantomjs_bin);
    debug!("    notification = {}", cfg.notification);
    debug!("    hide_success = {}", cfg.hide_success);
    debug!("    spec_dir = {}", cfg.spec_dir.display());
    debug!("    specdoc = {:?}", cfg.specdoc);
    debug!(
        "    server_check = {} (timeout {}s)",
        cfg.server_check,
        cfg.server_timeout.as_secs()
    );
    debug!("    page_timeout = {}ms", cfg.page_timeout.as_millis());
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn parse(toml: &str) -> GuardConfig {
        GuardConfig::from_builder(
            Config::builder().add_source(config::File::from_str(toml, FileFormat::Toml)),
        )
        .unwrap()
    }

    #[test]
    fn test_defaults_when_empty() {
        let cfg = parse("");
        assert_eq!(cfg.jasmine_url, "http://localhost:8888/jasmine");
        assert_eq!(cfg.phantomjs_bin, "phantomjs");
        assert!(cfg.notification);
        assert!(!cfg.hide_success);
        assert_eq!(cfg.spec_dir, PathBuf::from("spec/javascripts"));
        assert_eq!(cfg.specdoc, SpecdocMode::Failure);
        assert_eq!(cfg.server_timeout, Duration::from_secs(5));
        assert_eq!(cfg.page_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_partial_file_overrides() {
        let cfg = parse(
            r#"
            jasmine_url = "http://127.0.0.1:3000/specs"
            phantomjs_bin = "/opt/phantomjs/bin/phantomjs"
            hide_success = true
            specdoc = "always"
            server_timeout = "250ms"
            "#,
        );
        assert_eq!(cfg.jasmine_url, "http://127.0.0.1:3000/specs");
        assert_eq!(cfg.phantomjs_bin, "/opt/phantomjs/bin/phantomjs");
        assert!(cfg.hide_success);
        assert!(cfg.notification);
        assert_eq!(cfg.specdoc, SpecdocMode::Always);
        assert_eq!(cfg.server_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_unknown_specdoc_is_rejected() {
        let result = GuardConfig::from_builder(
            Config::builder().add_source(config::File::from_str(
                "specdoc = \"sometimes\"",
                FileFormat::Toml,
            )),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guard.toml");
        std::fs::write(&path, "notification = false\nspec_dir = \"test/js\"\n").unwrap();

        let cfg = GuardConfig::load(Some(path.to_str().unwrap())).unwrap();
        assert!(!cfg.notification);
        assert_eq!(cfg.spec_dir, PathBuf::from("test/js"));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(GuardConfig::load(Some(path.to_str().unwrap())).is_err());
    }

    #[test]
    fn test_env_overrides_file() {
        let mut env = config::Map::new();
        env.insert("JASMINE_GUARD__HIDE_SUCCESS".to_string(), "true".to_string());
        env.insert("JASMINE_GUARD__SERVER_TIMEOUT".to_string(), "2s".to_string());
        env.insert("JASMINE_GUARD_CONFIG".to_string(), "ignored.toml".to_string());

        let cfg = GuardConfig::from_builder(
            Config::builder()
                .add_source(config::File::from_str(
                    "hide_success = false\nserver_timeout = \"30s\"\nphantomjs_bin = \"/usr/bin/phantomjs\"\n",
                    FileFormat::Toml,
                ))
                .add_source(env_source().source(Some(env))),
        )
        .unwrap();

        assert!(cfg.hide_success);
        assert_eq!(cfg.server_timeout, Duration::from_secs(2));
        assert_eq!(cfg.phantomjs_bin, "/usr/bin/phantomjs");
    }

    #[test]
    fn test_builder_overrides() {
        let cfg = GuardConfig::default()
            .with_jasmine_url("http://ci:9000/jasmine")
            .with_hide_success(true)
            .with_notification(false);
        assert_eq!(cfg.jasmine_url, "http://ci:9000/jasmine");
        assert!(cfg.hide_success);
        assert!(!cfg.notification);
    }
}
