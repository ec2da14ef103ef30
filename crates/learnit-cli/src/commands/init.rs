//! The `learnit init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    write_if_missing(Path::new("learnit.toml"), SAMPLE_CONFIG)?;
    write_if_missing(Path::new("presets.json"), SAMPLE_PRESETS)?;

    std::fs::create_dir_all("learndata")?;
    write_if_missing(Path::new("learndata/example.txt"), EXAMPLE_LEARNDATA)?;

    println!("\nNext steps:");
    println!("  1. Run: learnit validate learndata/example.txt");
    println!("  2. Run: learnit train learndata/example.txt");
    println!("  3. Run: learnit test learndata/example.txt");

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# learnit configuration

learndata_root = "learndata"
presets_file = "presets.json"
# default_mode = "test"

[flags]
# ask-order = "alphabetical"
# grade-max = 100
"#;

const SAMPLE_PRESETS: &str = r#"{
  "vocabulary": {
    "ask-for": "both",
    "ask-sentence": "What is the translation of <> ?",
    "allow-typos": true
  },
  "exam": {
    "ask-order": "random",
    "grade-max": 100,
    "show-answer-in-testing-mode": false
  }
}
"#;

const EXAMPLE_LEARNDATA: &str = "\
--title Capitals
--ask-sentence What is the capital of <> ?
# Questions and answers alternate, items are separated by a blank line.
# Several accepted answers are joined with ||.

France
Paris

Italy
Rome

Germany
Berlin

Netherlands
Amsterdam || The Hague
";
