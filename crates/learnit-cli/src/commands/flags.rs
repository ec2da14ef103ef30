//! The `learnit flags` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use learnit_core::flags::RawFlags;
use learnit_core::parser::LearndataParser;

use super::Context;

pub fn execute(
    file: PathBuf,
    json: bool,
    flags: Vec<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let context = Context::load(config_path.as_deref())?;
    let overrides = context.overrides(&flags, false)?;
    let path = context.resolve_path(&file)?;
    let parsed = LearndataParser::new(&context.syntax, &context.presets).parse_file(&path)?;
    let resolution = parsed.resolve(&context.schema, &overrides);

    if json {
        println!("{}", serde_json::to_string_pretty(&resolution.flags)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Flag", "Value", "Source"]);
    for (name, value) in resolution.flags.iter() {
        let source = origin(name, &context, &parsed.preset_flags, &parsed.inline_flags, &overrides);
        table.add_row(vec![
            Cell::new(name),
            Cell::new(value.to_string()),
            Cell::new(source),
        ]);
    }
    println!("{table}");

    for diagnostic in &resolution.diagnostics {
        println!("WARNING: {diagnostic}");
    }

    Ok(())
}

/// The highest-priority layer holding an accepted value for `name`,
/// aliases included.
fn origin(
    name: &str,
    context: &Context,
    preset: &RawFlags,
    inline: &RawFlags,
    overrides: &RawFlags,
) -> &'static str {
    let Some(spec) = context.schema.get(name) else {
        return "default";
    };
    let declares = |layer: &RawFlags| {
        layer.iter().any(|(raw, value)| {
            context.schema.canonical_name(raw) == Some(name) && spec.rule.accept(value).is_some()
        })
    };
    if declares(overrides) {
        "override"
    } else if declares(inline) {
        "file"
    } else if declares(preset) {
        "preset"
    } else {
        "default"
    }
}
