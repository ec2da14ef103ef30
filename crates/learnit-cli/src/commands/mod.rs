pub mod drill;
pub mod flags;
pub mod init;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::Result;

use learnit_core::flags::{FlagSchema, FlagValue, RawFlags};
use learnit_core::preset::PresetStore;
use learnit_core::syntax::Syntax;

use crate::config::{load_config_from, LearnitConfig};

/// Everything a command needs before it touches a learndata file.
pub struct Context {
    pub config: LearnitConfig,
    pub syntax: Syntax,
    pub schema: FlagSchema,
    pub presets: PresetStore,
}

impl Context {
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = load_config_from(config_path)?;
        let syntax = Syntax::new();
        let presets = PresetStore::load_or_empty(&config.presets_file, &syntax);
        Ok(Self {
            config,
            syntax,
            schema: FlagSchema::standard(),
            presets,
        })
    }

    /// Caller-level flags: config `[flags]`, then `--flag` values, then
    /// `--no-blacklist`.
    pub fn overrides(&self, flags: &[String], no_blacklist: bool) -> Result<RawFlags> {
        let mut overrides = self.config.flag_overrides(&self.syntax);
        overrides.merge(&parse_flag_args(flags, &self.syntax)?);
        if no_blacklist {
            overrides.insert("blacklist", FlagValue::List(Vec::new()));
        }
        Ok(overrides)
    }

    pub fn resolve_path(&self, path: &Path) -> Result<PathBuf> {
        Ok(self.config.resolve_learndata_path(path)?)
    }
}

/// Parse `NAME=VALUE` arguments. A bare `NAME` sets the flag to true.
pub fn parse_flag_args(args: &[String], syntax: &Syntax) -> Result<RawFlags> {
    let mut flags = RawFlags::new();
    for arg in args {
        let (name, value) = match arg.split_once('=') {
            Some((name, value)) => (name.trim(), syntax.coerce(value)),
            None => (arg.trim(), FlagValue::Bool(true)),
        };
        anyhow::ensure!(
            !name.trim_start_matches('-').is_empty(),
            "invalid flag argument: '{arg}'"
        );
        flags.insert(name, value);
    }
    Ok(flags)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn flag_args_are_coerced() {
        let flags = parse_flag_args(
            &args(&["ask-order=keep", "--debug", "grade-max=100", "whitelist=[a, b]"]),
            &Syntax::new(),
        )
        .unwrap();
        assert_eq!(flags.get("ask-order"), Some(&FlagValue::from("keep")));
        assert_eq!(flags.get("debug"), Some(&FlagValue::Bool(true)));
        assert_eq!(flags.get("grade-max"), Some(&FlagValue::Integer(100)));
        assert_eq!(
            flags.get("whitelist"),
            Some(&FlagValue::List(vec!["a".into(), "b".into()]))
        );
    }

    #[test]
    fn empty_flag_name_is_rejected() {
        assert!(parse_flag_args(&args(&["=yes"]), &Syntax::new()).is_err());
        assert!(parse_flag_args(&args(&["--"]), &Syntax::new()).is_err());
    }

    #[test]
    fn no_blacklist_wins_over_flag_args() {
        let context = Context {
            config: LearnitConfig::default(),
            syntax: Syntax::new(),
            schema: FlagSchema::standard(),
            presets: PresetStore::empty(),
        };
        let overrides = context
            .overrides(&args(&["blacklist=[foo]"]), true)
            .unwrap();
        assert_eq!(overrides.get("blacklist"), Some(&FlagValue::List(vec![])));
    }
}
