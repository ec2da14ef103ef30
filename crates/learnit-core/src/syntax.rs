//! Line classification and flag value coercion.
//!
//! A learndata line is either a flag declaration (`--name value`,
//! `--name=value` or a bare `--name`), a comment (`# text`, `// text`) or
//! data. Flag values are coerced by a fixed chain of narrow parsers:
//! boolean keyword, bracketed list, integer, float, quoted string, and
//! finally the raw trimmed text.

use regex::Regex;

use crate::flags::FlagValue;

const TRUTHY: &[&str] = &["true", "yes", "on"];
const FALSY: &[&str] = &["false", "no", "off"];

/// A flag declared on one line of a learndata file.
#[derive(Debug, Clone, PartialEq)]
pub struct FlagLine {
    /// Flag name without leading dashes.
    pub name: String,
    /// Coerced value; `true` for a bare `--name`.
    pub value: FlagValue,
    /// 1-based line number in the source.
    pub line: usize,
}

/// A learndata file split into flag declarations and data lines.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifiedLines {
    pub flags: Vec<FlagLine>,
    /// Non-flag, non-comment lines with blank runs trimmed at both ends.
    pub data: Vec<String>,
}

/// Compiled patterns of the learndata mini-language.
#[derive(Debug, Clone)]
pub struct Syntax {
    flag: Regex,
    comment: Regex,
    list: Regex,
}

impl Syntax {
    pub fn new() -> Self {
        Self {
            flag: Regex::new(r"^--(\w[\w-]*)(?:[ =](.*))?$").expect("valid flag pattern"),
            comment: Regex::new(r"^(?://|#\s)").expect("valid comment pattern"),
            list: Regex::new(r"^\[(.*)\]$").expect("valid list pattern"),
        }
    }

    /// Match a flag declaration, returning its name and raw value.
    pub fn flag_declaration<'l>(&self, line: &'l str) -> Option<(&'l str, Option<&'l str>)> {
        let caps = self.flag.captures(line)?;
        let name = caps.get(1)?.as_str();
        let value = caps
            .get(2)
            .map(|m| m.as_str())
            .filter(|v| !v.trim().is_empty());
        Some((name, value))
    }

    pub fn is_comment(&self, line: &str) -> bool {
        self.comment.is_match(line)
    }

    /// Parse one `--flag` line into a [`FlagLine`].
    pub fn parse_flag_line(&self, line: &str, line_number: usize) -> Option<FlagLine> {
        let (name, raw) = self.flag_declaration(line)?;
        let value = match raw {
            Some(raw) => self.coerce(raw),
            None => FlagValue::Bool(true),
        };
        Some(FlagLine {
            name: name.to_string(),
            value,
            line: line_number,
        })
    }

    /// Turn a raw textual flag value into a typed one. Never fails.
    pub fn coerce(&self, raw: &str) -> FlagValue {
        let value = raw.trim();
        let lowered = value.to_lowercase();
        if TRUTHY.contains(&lowered.as_str()) {
            return FlagValue::Bool(true);
        }
        if FALSY.contains(&lowered.as_str()) {
            return FlagValue::Bool(false);
        }

        if let Some(caps) = self.list.captures(value) {
            let inner = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            let items = inner
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect();
            return FlagValue::List(items);
        }

        if let Ok(n) = value.parse::<i64>() {
            return FlagValue::Integer(n);
        }
        if looks_numeric(value) {
            if let Ok(x) = value.parse::<f64>() {
                return FlagValue::Float(x);
            }
        }

        if let Some(inner) = unquote(value) {
            return FlagValue::Text(inner.to_string());
        }

        FlagValue::Text(value.to_string())
    }

    /// Split raw file lines into flag declarations and cleaned data lines.
    ///
    /// Trailing newlines and carriage returns are dropped, a leading BOM is
    /// ignored, comment lines are removed and blank lines are trimmed from
    /// both ends of the data (interior blanks are kept as separators).
    pub fn classify<S: AsRef<str>>(&self, lines: &[S]) -> ClassifiedLines {
        let mut flags = Vec::new();
        let mut data = Vec::new();

        for (idx, raw) in lines.iter().enumerate() {
            let mut line = raw.as_ref().trim_end_matches(['\n', '\r']);
            if idx == 0 {
                line = line.trim_start_matches('\u{feff}');
            }

            if let Some(flag) = self.parse_flag_line(line, idx + 1) {
                flags.push(flag);
            } else if !self.is_comment(line) {
                data.push(line.trim_end().to_string());
            }
        }

        ClassifiedLines {
            flags,
            data: strip_blank_edges(data),
        }
    }
}

impl Default for Syntax {
    fn default() -> Self {
        Self::new()
    }
}

/// Remove blank lines at the start and the end, keeping interior ones.
pub fn strip_blank_edges(mut lines: Vec<String>) -> Vec<String> {
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    let leading = lines
        .iter()
        .take_while(|l| l.trim().is_empty())
        .count();
    lines.drain(..leading);
    lines
}

/// Only digits, signs, dots and exponents; keeps `inf`/`nan` as strings.
fn looks_numeric(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_digit())
        && s
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
}

fn unquote(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return Some(&s[1..s.len() - 1]);
        }
    }
    None
}
