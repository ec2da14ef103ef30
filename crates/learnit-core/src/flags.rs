//! Flag schema, layered flag merging and validation.
//!
//! Flags come from three places: a preset, `--flag` lines inside the
//! learndata file, and caller overrides (config file and command line).
//! [`RawFlags`] holds one layer, [`FlagsResolver`] validates the layers one
//! by one against a [`FlagSchema`] and produces a fully populated [`ResolvedFlags`].

use std::fmt;
use std::time::Duration;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::model::{AskFor, AskOrder};

/// Name of the directive that selects a preset. It is never a flag.
pub const PRESET_DIRECTIVE: &str = "preset";

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

/// A typed flag value, as produced by coercion or read from a preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<String>),
}

/// Primitive types a flag value can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlagType {
    Bool,
    Integer,
    Float,
    Text,
    List,
}

impl fmt::Display for FlagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagType::Bool => write!(f, "boolean"),
            FlagType::Integer => write!(f, "integer"),
            FlagType::Float => write!(f, "float"),
            FlagType::Text => write!(f, "string"),
            FlagType::List => write!(f, "list"),
        }
    }
}

impl FlagValue {
    pub fn kind(&self) -> FlagType {
        match self {
            FlagValue::Bool(_) => FlagType::Bool,
            FlagValue::Integer(_) => FlagType::Integer,
            FlagValue::Float(_) => FlagType::Float,
            FlagValue::Text(_) => FlagType::Text,
            FlagValue::List(_) => FlagType::List,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FlagValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FlagValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FlagValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FlagValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric view of integers and floats.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FlagValue::Integer(n) => Some(*n as f64),
            FlagValue::Float(x) => Some(*x),
            _ => None,
        }
    }
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagValue::Bool(b) => write!(f, "{b}"),
            FlagValue::Integer(n) => write!(f, "{n}"),
            FlagValue::Float(x) => write!(f, "{x}"),
            FlagValue::Text(s) => write!(f, "{s}"),
            FlagValue::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

impl From<bool> for FlagValue {
    fn from(b: bool) -> Self {
        FlagValue::Bool(b)
    }
}

impl From<&str> for FlagValue {
    fn from(s: &str) -> Self {
        FlagValue::Text(s.to_string())
    }
}

impl From<i64> for FlagValue {
    fn from(n: i64) -> Self {
        FlagValue::Integer(n)
    }
}

impl From<f64> for FlagValue {
    fn from(x: f64) -> Self {
        FlagValue::Float(x)
    }
}

impl From<Vec<String>> for FlagValue {
    fn from(items: Vec<String>) -> Self {
        FlagValue::List(items)
    }
}

// ---------------------------------------------------------------------------
// Raw layers
// ---------------------------------------------------------------------------

/// One layer of unvalidated flags, in declaration order.
///
/// Inserting a name that is already present replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFlags {
    entries: Vec<(String, FlagValue)>,
}

impl RawFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a flag, stripping leading dashes from its name.
    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<FlagValue>) {
        let name = name.as_ref().trim_start_matches('-');
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name.to_string(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FlagValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn remove(&mut self, name: &str) -> Option<FlagValue> {
        let idx = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(idx).1)
    }

    /// Overlay `other` on top of `self`; values from `other` win.
    pub fn merge(&mut self, other: &RawFlags) {
        for (name, value) in &other.entries {
            self.insert(name, value.clone());
        }
    }


    pub fn iter(&self) -> impl Iterator<Item = (&str, &FlagValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: AsRef<str>, V: Into<FlagValue>> FromIterator<(S, V)> for RawFlags {
    fn from_iter<I: IntoIterator<Item = (S, V)>>(iter: I) -> Self {
        let mut flags = RawFlags::new();
        for (name, value) in iter {
            flags.insert(name, value);
        }
        flags
    }
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// Const-friendly default value of a schema entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlagDefault {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(&'static str),
    EmptyList,
}

impl FlagDefault {
    pub fn to_value(self) -> FlagValue {
        match self {
            FlagDefault::Bool(b) => FlagValue::Bool(b),
            FlagDefault::Integer(n) => FlagValue::Integer(n),
            FlagDefault::Float(x) => FlagValue::Float(x),
            FlagDefault::Text(s) => FlagValue::Text(s.to_string()),
            FlagDefault::EmptyList => FlagValue::List(Vec::new()),
        }
    }
}

/// How a supplied value is checked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlagRule {
    /// The value's type must be one of these.
    Types(&'static [FlagType]),
    /// The value must be a string equal (ignoring case) to one of these.
    OneOf(&'static [&'static str]),
}

impl FlagRule {
    /// Check `value`, returning the normalized value when it is accepted.
    pub fn accept(&self, value: &FlagValue) -> Option<FlagValue> {
        match self {
            FlagRule::Types(types) => types.contains(&value.kind()).then(|| value.clone()),
            FlagRule::OneOf(allowed) => {
                let text = value.as_str()?.trim();
                allowed
                    .iter()
                    .find(|a| a.eq_ignore_ascii_case(text))
                    .map(|a| FlagValue::Text(a.to_string()))
            }
        }
    }

    /// Human-readable description of what the rule accepts.
    pub fn describe(&self) -> String {
        match self {
            FlagRule::Types(types) => types
                .iter()
                .map(|t| t.to_string())
                .collect::<Vec<_>>()
                .join(" or "),
            FlagRule::OneOf(allowed) => allowed.join(", "),
        }
    }
}

/// One entry of the flag schema.
#[derive(Debug, Clone, Copy)]
pub struct FlagSpec {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub default: FlagDefault,
    pub rule: FlagRule,
    pub help: &'static str,
}

const BOOL: FlagRule = FlagRule::Types(&[FlagType::Bool]);
const TEXT: FlagRule = FlagRule::Types(&[FlagType::Text]);
const LIST: FlagRule = FlagRule::Types(&[FlagType::List]);
const NUMBER: FlagRule = FlagRule::Types(&[FlagType::Integer, FlagType::Float]);
const INTEGER: FlagRule = FlagRule::Types(&[FlagType::Integer]);

const STANDARD_FLAGS: &[FlagSpec] = &[
    FlagSpec {
        name: "always-show-grade",
        aliases: &[],
        default: FlagDefault::Bool(false),
        rule: BOOL,
        help: "Print the running grade after every answer in testing mode",
    },
    FlagSpec {
        name: "and-lists",
        aliases: &[],
        default: FlagDefault::Bool(false),
        rule: BOOL,
        help: "Treat answers starting with <<AND>> as lists that must all be given",
    },
    FlagSpec {
        name: "ask-for",
        aliases: &[],
        default: FlagDefault::Text("answers"),
        rule: FlagRule::OneOf(&["questions", "answers", "both"]),
        help: "Which side of each item the user has to type",
    },
    FlagSpec {
        name: "ask-order",
        aliases: &[],
        default: FlagDefault::Text("random"),
        rule: FlagRule::OneOf(&["random", "alphabetical", "inverted", "keep", "normal"]),
        help: "Order in which items are asked",
    },
    FlagSpec {
        name: "ask-sentence",
        aliases: &[],
        default: FlagDefault::Text("<>"),
        rule: TEXT,
        help: "Prompt template, <> is replaced by the question",
    },
    FlagSpec {
        name: "auto-blacklist",
        aliases: &[],
        default: FlagDefault::Bool(false),
        rule: BOOL,
        help: "Add correctly answered questions to the file's blacklist after a test",
    },
    FlagSpec {
        name: "blacklist",
        aliases: &[],
        default: FlagDefault::EmptyList,
        rule: LIST,
        help: "Questions never asked",
    },
    FlagSpec {
        name: "case-sensitive",
        aliases: &[],
        default: FlagDefault::Bool(false),
        rule: BOOL,
        help: "Compare answers case-sensitively",
    },
    FlagSpec {
        name: "allow-typos",
        aliases: &["ask-for-typos"],
        default: FlagDefault::Bool(false),
        rule: BOOL,
        help: "Offer a retry when a wrong answer was a typo",
    },
    FlagSpec {
        name: "debug",
        aliases: &[],
        default: FlagDefault::Bool(false),
        rule: BOOL,
        help: "Print resolved flags and the askable items before the session",
    },
    FlagSpec {
        name: "fail-sentence",
        aliases: &[],
        default: FlagDefault::Text("✕ Fail"),
        rule: TEXT,
        help: "Printed after a wrong answer",
    },
    FlagSpec {
        name: "good-grade",
        aliases: &[],
        default: FlagDefault::Float(0.5),
        rule: NUMBER,
        help: "Fraction of grade-max from which a grade counts as good",
    },
    FlagSpec {
        name: "grade-max",
        aliases: &[],
        default: FlagDefault::Integer(20),
        rule: NUMBER,
        help: "Maximum grade",
    },
    FlagSpec {
        name: "grade-precision",
        aliases: &[],
        default: FlagDefault::Integer(2),
        rule: INTEGER,
        help: "Decimal places kept when rounding the grade",
    },
    FlagSpec {
        name: "header",
        aliases: &[],
        default: FlagDefault::Text("---- <> ----"),
        rule: TEXT,
        help: "Header template, <> is replaced by the title",
    },
    FlagSpec {
        name: "header-color",
        aliases: &[],
        default: FlagDefault::Text("cyan"),
        rule: FlagRule::OneOf(&[
            "black", "red", "green", "yellow", "blue", "magenta", "cyan", "white",
        ]),
        help: "Header color",
    },
    FlagSpec {
        name: "hide-timeout",
        aliases: &[],
        default: FlagDefault::Integer(0),
        rule: NUMBER,
        help: "Seconds before a revealed answer is cleared in training mode (0 keeps it)",
    },
    FlagSpec {
        name: "or-syntax",
        aliases: &[],
        default: FlagDefault::Text("||"),
        rule: TEXT,
        help: "Separator between alternative answers on an answer line",
    },
    FlagSpec {
        name: "show-answer-in-testing-mode",
        aliases: &[],
        default: FlagDefault::Bool(true),
        rule: BOOL,
        help: "Reveal the expected answer after a mistake in testing mode",
    },
    FlagSpec {
        name: "show-items-count",
        aliases: &[],
        default: FlagDefault::Bool(true),
        rule: BOOL,
        help: "Print how many items were loaded",
    },
    FlagSpec {
        name: "strict-learn-about",
        aliases: &[],
        default: FlagDefault::Bool(true),
        rule: BOOL,
        help: "With ask-for both, require both directions for an item to count as found",
    },
    FlagSpec {
        name: "success-sentence",
        aliases: &[],
        default: FlagDefault::Text("✓ Success!"),
        rule: TEXT,
        help: "Printed after a correct answer",
    },
    FlagSpec {
        name: "title",
        aliases: &[],
        default: FlagDefault::Text("untitled"),
        rule: TEXT,
        help: "Title shown in the header",
    },
    FlagSpec {
        name: "warn-unknown-flags",
        aliases: &[],
        default: FlagDefault::Bool(true),
        rule: BOOL,
        help: "Warn about flags the schema does not know",
    },
    FlagSpec {
        name: "whitelist",
        aliases: &[],
        default: FlagDefault::EmptyList,
        rule: LIST,
        help: "Only these questions are asked",
    },
];

/// The set of recognized flags with their defaults and validation rules.
///
/// Built once at startup and passed by reference to whoever needs it.
#[derive(Debug, Clone)]
pub struct FlagSchema {
    specs: Vec<FlagSpec>,
}

impl FlagSchema {
    pub fn new(specs: Vec<FlagSpec>) -> Self {
        Self { specs }
    }

    /// The schema of every flag learnit understands.
    pub fn standard() -> Self {
        Self::new(STANDARD_FLAGS.to_vec())
    }

    pub fn specs(&self) -> &[FlagSpec] {
        &self.specs
    }

    pub fn get(&self, name: &str) -> Option<&FlagSpec> {
        self.specs.iter().find(|s| s.name == name)
    }

    /// Map a flag name or alias to the canonical schema name.
    pub fn canonical_name(&self, name: &str) -> Option<&'static str> {
        self.specs
            .iter()
            .find(|s| s.name == name || s.aliases.contains(&name))
            .map(|s| s.name)
    }

    /// Flags with every value at its default.
    pub fn defaults(&self) -> ResolvedFlags {
        ResolvedFlags {
            values: self
                .specs
                .iter()
                .map(|s| (s.name, s.default.to_value()))
                .collect(),
        }
    }
}

impl Default for FlagSchema {
    fn default() -> Self {
        Self::standard()
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Something worth telling the user about while resolving flags.
#[derive(Debug, Clone, PartialEq)]
pub enum FlagDiagnostic {
    /// A flag the schema does not declare. Its value was dropped.
    Unknown { flag: String },
    /// A value that failed validation. The default was used instead.
    IllegalValue {
        flag: String,
        value: FlagValue,
        expected: String,
    },
    /// Both lists were set; the whitelist is used and the blacklist ignored.
    WhitelistOverridesBlacklist,
}

impl fmt::Display for FlagDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagDiagnostic::Unknown { flag } => write!(f, "unknown flag \"{flag}\", ignoring"),
            FlagDiagnostic::IllegalValue {
                flag,
                value,
                expected,
            } => write!(
                f,
                "illegal value \"{value}\" for flag --{flag}, ignoring (accepted: {expected})"
            ),
            FlagDiagnostic::WhitelistOverridesBlacklist => write!(
                f,
                "both a whitelist and a blacklist were specified; the blacklist will be ignored"
            ),
        }
    }
}

/// Resolved flags plus what went wrong on the way.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub flags: ResolvedFlags,
    pub diagnostics: Vec<FlagDiagnostic>,
}

/// Validates flag layers against a schema.
pub struct FlagsResolver<'a> {
    schema: &'a FlagSchema,
}

impl<'a> FlagsResolver<'a> {
    pub fn new(schema: &'a FlagSchema) -> Self {
        Self { schema }
    }

    /// Resolve a single layer of flags.
    pub fn resolve(&self, raw: &RawFlags) -> Resolution {
        self.resolve_layers([raw])
    }

    /// Resolve several layers, lowest priority first (preset, inline,
    /// overrides).
    ///
    /// Never fails. Names are folded to their canonical form inside each
    /// layer. A value replaces the one below it only when it passes the
    /// flag's rule; a rejected value leaves the lower layer's value (or the
    /// default) in place. Unknown flags are dropped.
    pub fn resolve_layers<'r>(&self, layers: impl IntoIterator<Item = &'r RawFlags>) -> Resolution {
        let mut diagnostics = Vec::new();
        let mut unknown: Vec<String> = Vec::new();
        let mut current: Vec<(&'static str, FlagValue)> = self
            .schema
            .specs()
            .iter()
            .map(|s| (s.name, s.default.to_value()))
            .collect();

        for layer in layers {
            let mut supplied = RawFlags::new();
            for (name, value) in layer.iter() {
                if name == PRESET_DIRECTIVE {
                    continue;
                }
                match self.schema.canonical_name(name) {
                    Some(canonical) => supplied.insert(canonical, value.clone()),
                    None if !unknown.iter().any(|u| u == name) => unknown.push(name.to_string()),
                    None => {}
                }
            }

            for (spec, slot) in self.schema.specs().iter().zip(current.iter_mut()) {
                let Some(value) = supplied.get(spec.name) else {
                    continue;
                };
                match spec.rule.accept(value) {
                    Some(accepted) => slot.1 = accepted,
                    None => {
                        tracing::warn!(
                            "illegal value \"{}\" for flag --{}, ignoring",
                            value,
                            spec.name
                        );
                        diagnostics.push(FlagDiagnostic::IllegalValue {
                            flag: spec.name.to_string(),
                            value: value.clone(),
                            expected: spec.rule.describe(),
                        });
                    }
                }
            }
        }
        let flags = ResolvedFlags { values: current };

        if flags.warn_unknown_flags() {
            for flag in unknown {
                tracing::warn!("unknown flag \"{flag}\", ignoring");
                diagnostics.push(FlagDiagnostic::Unknown { flag });
            }
        }

        if !flags.whitelist().is_empty() && !flags.blacklist().is_empty() {
            tracing::warn!("both a whitelist and a blacklist were specified, ignoring the blacklist");
            diagnostics.push(FlagDiagnostic::WhitelistOverridesBlacklist);
        }

        Resolution { flags, diagnostics }
    }
}

/// Every schema flag with a validated value.
///
/// Holds exactly the schema's key set, in schema order. Typed accessors
/// exist for each standard flag; [`ResolvedFlags::get`] accepts both the
/// dashed flag name and its underscored attribute form.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFlags {
    values: Vec<(&'static str, FlagValue)>,
}

impl ResolvedFlags {
    pub fn get(&self, name: &str) -> Option<&FlagValue> {
        let name = name.replace('_', "-");
        self.values
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.values.iter().map(|(n, _)| *n)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FlagValue)> {
        self.values.iter().map(|(n, v)| (*n, v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn flag_bool(&self, name: &str) -> bool {
        self.get(name).and_then(FlagValue::as_bool).unwrap_or(false)
    }

    fn flag_str(&self, name: &str) -> &str {
        self.get(name).and_then(FlagValue::as_str).unwrap_or("")
    }

    fn flag_list(&self, name: &str) -> &[String] {
        self.get(name).and_then(FlagValue::as_list).unwrap_or(&[])
    }

    fn flag_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(FlagValue::as_f64)
    }

    pub fn always_show_grade(&self) -> bool {
        self.flag_bool("always-show-grade")
    }

    pub fn and_lists(&self) -> bool {
        self.flag_bool("and-lists")
    }

    pub fn ask_for(&self) -> AskFor {
        self.flag_str("ask-for").parse().unwrap_or_default()
    }

    pub fn ask_order(&self) -> AskOrder {
        self.flag_str("ask-order").parse().unwrap_or_default()
    }

    pub fn ask_sentence(&self) -> &str {
        self.flag_str("ask-sentence")
    }

    pub fn auto_blacklist(&self) -> bool {
        self.flag_bool("auto-blacklist")
    }

    pub fn blacklist(&self) -> &[String] {
        self.flag_list("blacklist")
    }

    pub fn case_sensitive(&self) -> bool {
        self.flag_bool("case-sensitive")
    }

    pub fn allow_typos(&self) -> bool {
        self.flag_bool("allow-typos")
    }

    pub fn debug(&self) -> bool {
        self.flag_bool("debug")
    }

    pub fn fail_sentence(&self) -> &str {
        self.flag_str("fail-sentence")
    }

    pub fn good_grade(&self) -> f64 {
        self.flag_f64("good-grade").unwrap_or(0.5)
    }

    pub fn grade_max(&self) -> f64 {
        self.flag_f64("grade-max").unwrap_or(20.0)
    }

    /// Clamped to `0..=10` decimal places.
    pub fn grade_precision(&self) -> u32 {
        self.get("grade-precision")
            .and_then(FlagValue::as_i64)
            .map(|p| p.clamp(0, 10) as u32)
            .unwrap_or(2)
    }

    pub fn header(&self) -> &str {
        self.flag_str("header")
    }

    pub fn header_color(&self) -> &str {
        self.flag_str("header-color")
    }

    /// Zero (and negative values) mean the answer stays on screen.
    pub fn hide_timeout(&self) -> Duration {
        let secs = self.flag_f64("hide-timeout").unwrap_or(0.0);
        if secs.is_finite() && secs > 0.0 {
            Duration::from_secs_f64(secs)
        } else {
            Duration::ZERO
        }
    }

    pub fn or_syntax(&self) -> &str {
        self.flag_str("or-syntax")
    }

    pub fn show_answer_in_testing_mode(&self) -> bool {
        self.flag_bool("show-answer-in-testing-mode")
    }

    pub fn show_items_count(&self) -> bool {
        self.flag_bool("show-items-count")
    }

    pub fn strict_learn_about(&self) -> bool {
        self.flag_bool("strict-learn-about")
    }

    pub fn success_sentence(&self) -> &str {
        self.flag_str("success-sentence")
    }

    pub fn title(&self) -> &str {
        self.flag_str("title")
    }

    /// `None` while the title is left at `untitled`.
    pub fn custom_title(&self) -> Option<&str> {
        let title = self.title();
        (!title.is_empty() && title != "untitled").then_some(title)
    }

    pub fn warn_unknown_flags(&self) -> bool {
        self.flag_bool("warn-unknown-flags")
    }

    pub fn whitelist(&self) -> &[String] {
        self.flag_list("whitelist")
    }

    /// Fill the `<>` placeholder of `ask-sentence` with a question.
    pub fn ask_sentence_for(&self, question: &str) -> String {
        self.ask_sentence().replace("<>", question)
    }

    /// Fill the `<>` placeholder of `header` with `text`.
    pub fn header_for(&self, text: &str) -> String {
        self.header().replace("<>", text)
    }
}

impl Serialize for ResolvedFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
