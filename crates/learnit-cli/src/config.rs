//! learnit configuration file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use learnit_core::error::LearnError;
use learnit_core::flags::{FlagValue, RawFlags};
use learnit_core::model::Mode;
use learnit_core::syntax::Syntax;

/// Top-level learnit configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearnitConfig {
    /// Directory searched when a learndata path does not exist as given.
    #[serde(default)]
    pub learndata_root: Option<PathBuf>,
    /// JSON preset store.
    #[serde(default = "default_presets_file")]
    pub presets_file: PathBuf,
    /// Mode used by `learnit drill` without asking.
    #[serde(default)]
    pub default_mode: Option<String>,
    /// Flag overrides applied to every file, below command-line flags.
    #[serde(default)]
    pub flags: BTreeMap<String, toml::Value>,
}

fn default_presets_file() -> PathBuf {
    PathBuf::from("presets.json")
}

impl Default for LearnitConfig {
    fn default() -> Self {
        Self {
            learndata_root: None,
            presets_file: default_presets_file(),
            default_mode: None,
            flags: BTreeMap::new(),
        }
    }
}

impl LearnitConfig {
    /// The configured default mode, if it names one.
    pub fn default_mode(&self) -> Option<Mode> {
        let raw = self.default_mode.as_deref()?;
        match raw.parse() {
            Ok(mode) => Some(mode),
            Err(e) => {
                tracing::warn!("ignoring default_mode: {e}");
                None
            }
        }
    }

    /// The `[flags]` table as a flag layer.
    pub fn flag_overrides(&self, syntax: &Syntax) -> RawFlags {
        let mut flags = RawFlags::new();
        for (name, value) in &self.flags {
            match toml_to_flag_value(value, syntax) {
                Some(v) => flags.insert(name, v),
                None => tracing::warn!("config: unsupported value for flag {name}, ignoring"),
            }
        }
        flags
    }

    /// Locate a learndata file.
    ///
    /// Tries `path`, then `learndata_root/path`, then both with `.txt`
    /// appended.
    pub fn resolve_learndata_path(&self, path: &Path) -> Result<PathBuf, LearnError> {
        let mut candidates = vec![path.to_path_buf()];
        if let Some(root) = &self.learndata_root {
            if path.is_relative() {
                candidates.push(root.join(path));
            }
        }
        let with_ext: Vec<PathBuf> = candidates
            .iter()
            .filter(|p| p.extension().is_none())
            .map(|p| p.with_extension("txt"))
            .collect();
        candidates.extend(with_ext);

        candidates
            .into_iter()
            .find(|p| p.is_file())
            .ok_or_else(|| LearnError::NotFound(path.to_path_buf()))
    }
}

fn toml_to_flag_value(value: &toml::Value, syntax: &Syntax) -> Option<FlagValue> {
    match value {
        toml::Value::Boolean(b) => Some(FlagValue::Bool(*b)),
        toml::Value::Integer(n) => Some(FlagValue::Integer(*n)),
        toml::Value::Float(x) => Some(FlagValue::Float(*x)),
        toml::Value::String(s) => Some(syntax.coerce(s)),
        toml::Value::Array(items) => Some(FlagValue::List(
            items
                .iter()
                .map(|item| match item {
                    toml::Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect(),
        )),
        toml::Value::Datetime(_) | toml::Value::Table(_) => None,
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `learnit.toml` in the current directory
/// 2. `~/.config/learnit/config.toml`
///
/// Environment variable overrides: `LEARNIT_PRESETS`, `LEARNIT_ROOT`.
pub fn load_config_from(path: Option<&Path>) -> Result<LearnitConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("learnit.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<LearnitConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => LearnitConfig::default(),
    };

    if let Ok(presets) = std::env::var("LEARNIT_PRESETS") {
        config.presets_file = PathBuf::from(presets);
    }
    if let Ok(root) = std::env::var("LEARNIT_ROOT") {
        config.learndata_root = Some(PathBuf::from(root));
    }

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("learnit"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = LearnitConfig::default();
        assert_eq!(config.presets_file, PathBuf::from("presets.json"));
        assert!(config.learndata_root.is_none());
        assert!(config.default_mode().is_none());
    }

    #[test]
    fn parse_config() {
        let toml_str = r#"
learndata_root = "learndata"
default_mode = "test"

[flags]
ask-order = "keep"
grade-max = 100
case-sensitive = "yes"
whitelist = ["a", "b"]
"#;
        let config: LearnitConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.default_mode(), Some(Mode::Testing));

        let flags = config.flag_overrides(&Syntax::new());
        assert_eq!(flags.get("ask-order"), Some(&FlagValue::from("keep")));
        assert_eq!(flags.get("grade-max"), Some(&FlagValue::Integer(100)));
        assert_eq!(flags.get("case-sensitive"), Some(&FlagValue::Bool(true)));
        assert_eq!(
            flags.get("whitelist"),
            Some(&FlagValue::List(vec!["a".into(), "b".into()]))
        );
    }

    #[test]
    fn bad_default_mode_is_ignored() {
        let config = LearnitConfig {
            default_mode: Some("exam".into()),
            ..LearnitConfig::default()
        };
        assert!(config.default_mode().is_none());
    }

    #[test]
    fn resolve_path_with_root_and_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("capitals.txt"), "france\nparis\n").unwrap();

        let config = LearnitConfig {
            learndata_root: Some(dir.path().to_path_buf()),
            ..LearnitConfig::default()
        };
        let found = config
            .resolve_learndata_path(Path::new("capitals"))
            .unwrap();
        assert_eq!(found, dir.path().join("capitals.txt"));

        let err = config
            .resolve_learndata_path(Path::new("missing"))
            .unwrap_err();
        assert!(matches!(err, LearnError::NotFound(_)));
    }

    #[test]
    fn explicit_missing_config_fails() {
        let result = load_config_from(Some(Path::new("/no/such/learnit.toml")));
        assert!(result.is_err());
    }
}
