//! Learndata parser.
//!
//! Loads learndata files, splits them into flags and question/answer
//! blocks, and validates them.

use std::path::Path;

use crate::error::{LearnError, Result};
use crate::flags::{
    FlagDiagnostic, FlagSchema, FlagsResolver, RawFlags, Resolution, PRESET_DIRECTIVE,
};
use crate::model::LearnData;
use crate::preset::PresetStore;
use crate::syntax::Syntax;

/// One learndata file after parsing, before flag resolution.
#[derive(Debug, Clone)]
pub struct ParsedLearndata {
    /// Display name of the source (usually the file path).
    pub source: String,
    pub data: LearnData,
    /// Flags declared in the file itself, `--preset` excluded.
    pub inline_flags: RawFlags,
    /// Name given to the last `--preset` directive, if any.
    pub preset: Option<String>,
    /// Flags contributed by that preset (empty when it is unknown).
    pub preset_flags: RawFlags,
    /// Questions declared more than once; the last answer was kept.
    pub duplicates: Vec<String>,
}

impl ParsedLearndata {
    /// Resolve this file's flags against `schema`: preset, then inline
    /// flags, then caller overrides.
    pub fn resolve(&self, schema: &FlagSchema, overrides: &RawFlags) -> Resolution {
        FlagsResolver::new(schema).resolve_layers([&self.preset_flags, &self.inline_flags, overrides])
    }
}

/// Question/answer blocks in declaration order, duplicates included.
///
/// A line starts a block when it is the first line or follows a blank
/// line; the next line (or `""` at the end of input) is its answer. Blank
/// lines never start a block.
pub fn question_blocks<S: AsRef<str>>(lines: &[S]) -> Vec<(String, String)> {
    let mut blocks = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        let starts_block = i == 0 || lines[i - 1].as_ref().is_empty();
        if !starts_block || line.is_empty() {
            continue;
        }
        let answer = lines.get(i + 1).map(|l| l.as_ref()).unwrap_or("");
        blocks.push((line.to_string(), answer.to_string()));
    }
    blocks
}

/// Parse cleaned data lines into the question→answer mapping.
///
/// `["foo", "bar", "", "baz", "quux"]` gives `{foo: bar, baz: quux}`.
pub fn parse_data<S: AsRef<str>>(lines: &[S]) -> LearnData {
    question_blocks(lines).into_iter().collect()
}

/// Turns raw learndata text into [`ParsedLearndata`].
#[derive(Debug, Clone, Copy)]
pub struct LearndataParser<'a> {
    syntax: &'a Syntax,
    presets: &'a PresetStore,
}

impl<'a> LearndataParser<'a> {
    pub fn new(syntax: &'a Syntax, presets: &'a PresetStore) -> Self {
        Self { syntax, presets }
    }

    /// Parse raw lines (trailing newlines allowed).
    pub fn parse_lines<S: AsRef<str>>(&self, lines: &[S], source: &str) -> ParsedLearndata {
        let classified = self.syntax.classify(lines);
        let (preset, preset_flags) = self.presets.select(&classified.flags);

        let inline_flags: RawFlags = classified
            .flags
            .iter()
            .filter(|f| f.name != PRESET_DIRECTIVE)
            .map(|f| (f.name.as_str(), f.value.clone()))
            .collect();

        let blocks = question_blocks(&classified.data);
        let mut seen = std::collections::HashSet::new();
        let mut duplicates = Vec::new();
        for (question, _) in &blocks {
            if !seen.insert(question.as_str()) && !duplicates.contains(question) {
                duplicates.push(question.clone());
            }
        }
        let data: LearnData = blocks.into_iter().collect();

        tracing::debug!(
            "parsed {}: {} items, {} inline flags, preset {:?}",
            source,
            data.len(),
            inline_flags.len(),
            preset
        );

        ParsedLearndata {
            source: source.to_string(),
            data,
            inline_flags,
            preset,
            preset_flags,
            duplicates,
        }
    }

    /// Parse a whole learndata text (useful for testing).
    pub fn parse_str(&self, content: &str, source: &str) -> ParsedLearndata {
        let lines: Vec<&str> = content.lines().collect();
        self.parse_lines(&lines, source)
    }

    /// Read and parse a learndata file.
    pub fn parse_file(&self, path: &Path) -> Result<ParsedLearndata> {
        let content = std::fs::read_to_string(path).map_err(|e| LearnError::io(path, e))?;
        Ok(self.parse_str(&content, &path.display().to_string()))
    }

    /// Recursively parse every `.txt` file under `dir`, in path order.
    pub fn parse_directory(&self, dir: &Path) -> Result<Vec<ParsedLearndata>> {
        if !dir.is_dir() {
            return Err(LearnError::NotFound(dir.to_path_buf()));
        }

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(|e| LearnError::io(dir, e))? {
            let entry = entry.map_err(|e| LearnError::io(dir, e))?;
            paths.push(entry.path());
        }
        paths.sort();

        let mut parsed = Vec::new();
        for path in paths {
            if path.is_dir() {
                parsed.extend(self.parse_directory(&path)?);
            } else if path.extension().is_some_and(|ext| ext == "txt") {
                match self.parse_file(&path) {
                    Ok(file) => parsed.push(file),
                    Err(e) => tracing::warn!("skipping {}: {}", path.display(), e),
                }
            }
        }
        Ok(parsed)
    }
}

/// A warning from learndata validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationWarning {
    /// The question concerned, if any.
    pub question: Option<String>,
    pub message: String,
}

/// Check a parsed file for problems the drill would silently paper over.
pub fn validate_learndata(
    parsed: &ParsedLearndata,
    schema: &FlagSchema,
    overrides: &RawFlags,
) -> Vec<ValidationWarning> {
    let mut warnings = diagnostic_warnings(&parsed.resolve(schema, overrides).diagnostics);

    if let Some(name) = &parsed.preset {
        if parsed.preset_flags.is_empty() {
            warnings.push(ValidationWarning {
                question: None,
                message: format!("preset \"{name}\" is unknown or empty"),
            });
        }
    }

    for question in &parsed.duplicates {
        warnings.push(ValidationWarning {
            question: Some(question.clone()),
            message: "question declared more than once, only the last answer is kept".into(),
        });
    }

    for (question, answer) in parsed.data.iter() {
        if answer.trim().is_empty() {
            warnings.push(ValidationWarning {
                question: Some(question.to_string()),
                message: "answer is empty".into(),
            });
        }
    }

    if parsed.data.is_empty() {
        warnings.push(ValidationWarning {
            question: None,
            message: "no items".into(),
        });
    }

    warnings
}

/// Flag diagnostics as validation warnings.
pub fn diagnostic_warnings(diagnostics: &[FlagDiagnostic]) -> Vec<ValidationWarning> {
    diagnostics
        .iter()
        .map(|d| ValidationWarning {
            question: None,
            message: d.to_string(),
        })
        .collect()
}
