//! Auto-blacklist: record mastered questions in the learndata file itself.

use std::path::Path;

use crate::error::{LearnError, Result};
use crate::flags::FlagValue;
use crate::syntax::Syntax;

const BLACKLIST_FLAG: &str = "blacklist";
const BOM: char = '\u{feff}';

/// Rewrite `content` so that a single `--blacklist [..]` line at the top
/// holds the previous entries followed by `questions`, without duplicates.
///
/// Returns the new text and the merged list.
pub fn merge_blacklist(
    content: &str,
    questions: &[String],
    syntax: &Syntax,
) -> (String, Vec<String>) {
    let (bom, body) = match content.strip_prefix(BOM) {
        Some(rest) => (BOM.to_string(), rest),
        None => (String::new(), content),
    };

    let mut merged: Vec<String> = Vec::new();
    let mut kept: Vec<&str> = Vec::new();
    for line in body.lines() {
        match syntax.flag_declaration(line.trim_end_matches('\r')) {
            Some((BLACKLIST_FLAG, raw)) => {
                if let Some(FlagValue::List(entries)) = raw.map(|r| syntax.coerce(r)) {
                    merged.extend(entries);
                }
            }
            _ => kept.push(line),
        }
    }
    merged.extend(questions.iter().cloned());

    let mut deduped: Vec<String> = Vec::with_capacity(merged.len());
    for entry in merged {
        if !deduped.contains(&entry) {
            deduped.push(entry);
        }
    }

    let mut text = format!("{bom}--{BLACKLIST_FLAG} [{}]\n", deduped.join(", "));
    for line in kept {
        text.push_str(line);
        text.push('\n');
    }
    (text, deduped)
}

/// Merge `questions` into the blacklist of the learndata file at `path`.
pub fn merge_into_file(path: &Path, questions: &[String], syntax: &Syntax) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(|e| LearnError::io(path, e))?;
    let (text, merged) = merge_blacklist(&content, questions, syntax);
    std::fs::write(path, text).map_err(|e| LearnError::io(path, e))?;
    tracing::info!(
        "blacklisted {} question(s) in {}",
        questions.len(),
        path.display()
    );
    Ok(merged)
}
