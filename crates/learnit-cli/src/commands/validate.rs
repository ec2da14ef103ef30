//! The `learnit validate` command.

use std::path::PathBuf;

use anyhow::Result;

use learnit_core::parser::{validate_learndata, LearndataParser};

use super::Context;

pub fn execute(paths: Vec<PathBuf>, flags: Vec<String>, config_path: Option<PathBuf>) -> Result<()> {
    let context = Context::load(config_path.as_deref())?;
    let overrides = context.overrides(&flags, false)?;
    let parser = LearndataParser::new(&context.syntax, &context.presets);

    let mut files = Vec::new();
    for path in &paths {
        if path.is_dir() {
            files.extend(parser.parse_directory(path)?);
        } else {
            files.push(parser.parse_file(&context.resolve_path(path)?)?);
        }
    }

    let mut total_warnings = 0;

    for parsed in &files {
        let preset = parsed
            .preset
            .as_ref()
            .map(|name| format!(", preset {name}"))
            .unwrap_or_default();
        println!("{}: {} items{preset}", parsed.source, parsed.data.len());

        let warnings = validate_learndata(parsed, &context.schema, &overrides);
        for w in &warnings {
            let prefix = w
                .question
                .as_ref()
                .map(|q| format!("  [{q}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All learndata files valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
