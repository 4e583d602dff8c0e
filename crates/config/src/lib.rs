//! Layered configuration for relink.
//!
//! Settings are merged from, lowest to highest priority:
//!
//! 1. built-in defaults,
//! 2. `config.toml`, `config.yaml` or `config.json` in the user config
//!    directory (`~/.config/relink/` on Linux),
//! 3. an explicit config file,
//! 4. `RELINK_` environment variables, with `__` separating nested keys
//!    (`RELINK_LINKS__IGNORE_MARKER`).
//!
//! ```toml
//! sources_dir = "./sources"
//! fields = ["content", "summary"]
//! publish = false
//! failure_log = "relink-failures.log"
//!
//! [links]
//! non_http_schemes = ["mailto", "tel", "ftp", "res", "skype", "ssh"]
//! ignore_marker = '^\[(?:content_link|asset_link)|^/?assets/'
//! ```

pub mod error;

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use relink_engine::{DEFAULT_IGNORE_MARKER, DEFAULT_NON_HTTP_SCHEMES, EngineConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "RELINK_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory of JSON source exports.
    pub sources_dir: PathBuf,
    /// Text fields to rewrite, in order.
    pub fields: Vec<String>,
    /// Publish modified records instead of only saving them.
    pub publish: bool,
    pub failure_log: PathBuf,
    pub links: LinksConfig,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            sources_dir: PathBuf::from("./sources"),
            fields: vec!["content".to_string()],
            publish: false,
            failure_log: PathBuf::from("relink-failures.log"),
            links: LinksConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinksConfig {
    pub non_http_schemes: Vec<String>,
    /// Regular expression; matching links are left alone.
    pub ignore_marker: String,
}
impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            non_http_schemes: DEFAULT_NON_HTTP_SCHEMES.iter().map(ToString::to_string).collect(),
            ignore_marker: DEFAULT_IGNORE_MARKER.to_string(),
        }
    }
}

impl Config {
    /// Loads the layered configuration. `explicit` must exist if given.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let user_dir = directories::ProjectDirs::from("", "", "relink").map(|dirs| dirs.config_dir().to_path_buf());
        Self::load_from(user_dir.as_deref(), explicit)
    }

    /// As [`load`](Self::load), with the user config directory given.
    pub fn load_from(user_dir: Option<&Path>, explicit: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(dir) = user_dir {
            tracing::debug!(dir = %dir.display(), "Looking for user config");
            figment = figment
                .merge(Toml::file(dir.join("config.toml")))
                .merge(Yaml::file(dir.join("config.yaml")))
                .merge(Json::file(dir.join("config.json")));
        }
        if let Some(path) = explicit {
            if !path.is_file() {
                exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
            }
            tracing::debug!(path = %path.display(), "Loading config file");
            figment = match path.extension().and_then(|ext| ext.to_str()) {
                Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
                Some("json") => figment.merge(Json::file(path)),
                _ => figment.merge(Toml::file(path)),
            };
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        match figment.extract::<Config>() {
            Ok(config) => Ok(config),
            Err(e) => exn::bail!(ErrorKind::Invalid(e.to_string())),
        }
    }

    /// Engine settings for a source rooted at `base_url`.
    pub fn engine_config(&self, base_url: impl Into<String>) -> Result<EngineConfig> {
        EngineConfig::new(base_url)
            .with_schemes(self.links.non_http_schemes.iter().cloned())
            .with_ignore_marker(&self.links.ignore_marker)
            .or_raise(|| ErrorKind::InvalidValue("links.ignore_marker".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        Jail::expect_with(|_jail| {
            let config = Config::load_from(None, None).unwrap();
            assert_eq!(config, Config::default());
            assert_eq!(config.fields, ["content"]);
            assert_eq!(config.links.non_http_schemes.len(), DEFAULT_NON_HTTP_SCHEMES.len());
            Ok(())
        });
    }

    #[rstest]
    #[case("relink.toml", "fields = [\"content\", \"summary\"]\npublish = true\n")]
    #[case("relink.yaml", "fields: [content, summary]\npublish: true\n")]
    #[case("relink.json", r#"{"fields": ["content", "summary"], "publish": true}"#)]
    fn test_explicit_file(#[case] name: &str, #[case] contents: &str) {
        Jail::expect_with(|jail| {
            jail.create_file(name, contents)?;
            let config = Config::load_from(None, Some(Path::new(name))).unwrap();
            assert_eq!(config.fields, ["content", "summary"]);
            assert!(config.publish);
            assert_eq!(config.sources_dir, PathBuf::from("./sources"));
            Ok(())
        });
    }

    #[test]
    fn test_layering_order() {
        Jail::expect_with(|jail| {
            let user_dir = jail.directory().join("user");
            std::fs::create_dir(&user_dir).map_err(|e| e.to_string())?;
            std::fs::write(user_dir.join("config.toml"), "publish = true\nfailure_log = \"user.log\"\n")
                .map_err(|e| e.to_string())?;
            jail.create_file("explicit.toml", "failure_log = \"explicit.log\"\nsources_dir = \"exports\"\n")?;
            jail.set_env("RELINK_SOURCES_DIR", "from-env");
            jail.set_env("RELINK_LINKS__NON_HTTP_SCHEMES", "[mailto]");

            let config = Config::load_from(Some(&user_dir), Some(Path::new("explicit.toml"))).unwrap();
            assert!(config.publish);
            assert_eq!(config.failure_log, PathBuf::from("explicit.log"));
            assert_eq!(config.sources_dir, PathBuf::from("from-env"));
            assert_eq!(config.links.non_http_schemes, ["mailto"]);
            assert_eq!(config.links.ignore_marker, DEFAULT_IGNORE_MARKER);
            Ok(())
        });
    }

    #[test]
    fn test_missing_explicit_file() {
        Jail::expect_with(|_jail| {
            let error = Config::load_from(None, Some(Path::new("missing.toml"))).unwrap_err();
            assert!(matches!(&*error, ErrorKind::NotFound(_)));
            Ok(())
        });
    }

    #[test]
    fn test_invalid_type() {
        Jail::expect_with(|jail| {
            jail.create_file("relink.toml", "publish = \"sometimes\"\n")?;
            let error = Config::load_from(None, Some(Path::new("relink.toml"))).unwrap_err();
            assert!(matches!(&*error, ErrorKind::Invalid(_)));
            Ok(())
        });
    }

    #[test]
    fn test_engine_config() {
        let config = Config::default();
        let engine = config.engine_config("http://example.com").unwrap();
        assert_eq!(engine.base_url, "http://example.com");
        assert!(engine.ignore_marker.is_match("[content_link,id=1]"));

        let mut config = Config::default();
        config.links.ignore_marker = "(".to_string();
        let error = config.engine_config("http://example.com").unwrap_err();
        assert_eq!(*error, ErrorKind::InvalidValue("links.ignore_marker".to_string()));
    }
}
