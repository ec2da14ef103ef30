//! Named flag presets.
//!
//! The preset store is a JSON object mapping preset names to flag tables:
//!
//! ```json
//! { "vocab": { "--ask-for": "both", "ask-sentence": "How do you say <> ?" } }
//! ```
//!
//! A learndata file picks one with `--preset vocab`; its flags become the
//! lowest layer above the schema defaults.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{LearnError, Result};
use crate::flags::{FlagValue, RawFlags, PRESET_DIRECTIVE};
use crate::syntax::{FlagLine, Syntax};

/// Preset name → flags.
#[derive(Debug, Clone, Default)]
pub struct PresetStore {
    presets: BTreeMap<String, RawFlags>,
}

impl PresetStore {
    /// A store with no presets; every lookup misses.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the store from a JSON file.
    pub fn load(path: &Path, syntax: &Syntax) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| LearnError::io(path, e))?;
        Self::from_json_str(&content, syntax).map_err(|message| LearnError::Preset {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Load the store, degrading to an empty one when the file is missing
    /// or unreadable.
    pub fn load_or_empty(path: &Path, syntax: &Syntax) -> Self {
        match Self::load(path, syntax) {
            Ok(store) => store,
            Err(LearnError::NotFound(_)) => {
                tracing::debug!("no preset store at {}", path.display());
                Self::empty()
            }
            Err(e) => {
                tracing::warn!("ignoring presets: {e}");
                Self::empty()
            }
        }
    }

    /// Parse a JSON preset store. String values go through flag coercion.
    pub fn from_json_str(content: &str, syntax: &Syntax) -> std::result::Result<Self, String> {
        let parsed: BTreeMap<String, BTreeMap<String, serde_json::Value>> =
            serde_json::from_str(content).map_err(|e| e.to_string())?;

        let presets = parsed
            .into_iter()
            .map(|(name, table)| {
                let mut flags = RawFlags::new();
                for (flag, value) in table {
                    match json_to_flag_value(&value, syntax) {
                        Some(v) => flags.insert(&flag, v),
                        None => tracing::warn!(
                            "preset \"{name}\": unsupported value for {flag}, ignoring"
                        ),
                    }
                }
                (name, flags)
            })
            .collect();

        Ok(Self { presets })
    }

    pub fn get(&self, name: &str) -> Option<&RawFlags> {
        self.presets.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    /// Flags of the preset selected by the last `--preset` line, if any.
    ///
    /// A missing directive, or a name the store does not know, yields no
    /// flags; only the unknown name is logged.
    pub fn select(&self, flag_lines: &[FlagLine]) -> (Option<String>, RawFlags) {
        let Some(directive) = flag_lines
            .iter()
            .rev()
            .find(|f| f.name == PRESET_DIRECTIVE)
        else {
            return (None, RawFlags::new());
        };

        let name = match &directive.value {
            FlagValue::Bool(_) | FlagValue::List(_) => {
                tracing::warn!(
                    "line {}: --preset needs a preset name, ignoring",
                    directive.line
                );
                return (None, RawFlags::new());
            }
            other => other.to_string(),
        };

        match self.get(&name) {
            Some(flags) => (Some(name), flags.clone()),
            None => {
                tracing::warn!("unknown preset \"{name}\", ignoring");
                (Some(name), RawFlags::new())
            }
        }
    }
}

fn json_to_flag_value(value: &serde_json::Value, syntax: &Syntax) -> Option<FlagValue> {
    use serde_json::Value;

    match value {
        Value::Bool(b) => Some(FlagValue::Bool(*b)),
        Value::Number(n) => n
            .as_i64()
            .map(FlagValue::Integer)
            .or_else(|| n.as_f64().map(FlagValue::Float)),
        Value::String(s) => Some(syntax.coerce(s)),
        Value::Array(items) => Some(FlagValue::List(
            items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect(),
        )),
        Value::Null | Value::Object(_) => None,
    }
}
