//! CLI integration tests using assert_cmd.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn learnit() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("learnit").unwrap();
    cmd.env_remove("LEARNIT_PRESETS").env_remove("LEARNIT_ROOT");
    cmd
}

fn write(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

const SMALL: &str = "foo\nbar\n\nbaz\nspam\n";

#[test]
fn test_session_grades_answers() {
    learnit()
        .args(["test", "../../learndata/capitals.txt", "--flag", "ask-order=keep"])
        .write_stdin("Paris\nrome\nMunich\nMadrid\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("---- Capitals ----"))
        .stdout(predicate::str::contains("Loaded 4 of 4 item(s)"))
        .stdout(predicate::str::contains("What is the capital of Germany ?"))
        .stdout(predicate::str::contains("The correct answer was: Berlin"))
        .stdout(predicate::str::contains("Your grade: 15/20 (3/4)"))
        .stdout(predicate::str::contains("You need to learn about:"));
}

#[test]
fn perfect_test_has_no_recap() {
    learnit()
        .args(["test", "../../learndata/capitals.txt", "-f", "ask-order=keep"])
        .write_stdin("Paris\nRome\nBerlin\nMadrid\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Your grade: 20/20 (4/4)"))
        .stdout(predicate::str::contains("You need to learn about").not());
}

#[test]
fn training_repeats_until_learned() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "one.txt", "foo\nbar\n");

    learnit()
        .current_dir(dir.path())
        .args(["train", "one.txt", "--seed", "7"])
        .write_stdin("nope\nbar\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("The correct answer was: bar"))
        .stdout(predicate::str::contains("Everything learned!"));
}

#[test]
fn end_of_input_cancels_session() {
    learnit()
        .args(["test", "../../learndata/capitals.txt", "-f", "ask-order=keep"])
        .write_stdin("Lyon\n")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Process closed by user."))
        .stdout(predicate::str::contains("France"))
        .stderr(predicate::str::contains("Error:").not());
}

#[test]
fn empty_selection_exits_with_two() {
    learnit()
        .args(["test", "../../learndata/capitals.txt", "-f", "whitelist=[atlantis]"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no items to ask"));
}

#[test]
fn missing_learndata_file() {
    learnit()
        .args(["train", "nonexistent.txt"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("learndata file not found"));
}

#[test]
fn drill_asks_for_mode() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "one.txt", "foo\nbar\n");

    learnit()
        .current_dir(dir.path())
        .args(["drill", "one.txt"])
        .write_stdin("x\n2\nbar\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Choose a mode"))
        .stdout(predicate::str::contains("2: Testing"))
        .stdout(predicate::str::contains("\"x\" is not a valid choice"))
        .stdout(predicate::str::contains("Your grade: 20/20"));
}

#[test]
fn drill_asks_for_mode_once_per_run() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "one.txt", "foo\nbar\n");
    write(dir.path(), "two.txt", "baz\nspam\n");

    learnit()
        .current_dir(dir.path())
        .args(["drill", "one.txt", "two.txt"])
        .write_stdin("2\nbar\nspam\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Choose a mode").count(1))
        .stdout(predicate::str::contains("Your grade: 20/20").count(2));
}

#[test]
fn illegal_override_keeps_file_value() {
    learnit()
        .args([
            "test",
            "../../learndata/capitals.txt",
            "-f",
            "ask-order=keep",
            "-f",
            "ask-sentence=[not, text]",
        ])
        .write_stdin("Paris\nRome\nBerlin\nMadrid\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("What is the capital of France ?"))
        .stdout(predicate::str::contains("Your grade: 20/20"));
}

#[test]
fn config_supplies_mode_root_and_flags() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "learnit.toml",
        "learndata_root = \"decks\"\ndefault_mode = \"test\"\n\n[flags]\ngrade-max = 100\n",
    );
    write(dir.path(), "decks/one.txt", "foo\nbar\n");

    learnit()
        .current_dir(dir.path())
        .args(["drill", "one"])
        .write_stdin("bar\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Choose a mode").not())
        .stdout(predicate::str::contains("Your grade: 100%"));
}

#[test]
fn auto_blacklist_rewrites_file() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "deck.txt", SMALL);

    learnit()
        .current_dir(dir.path())
        .args(["test", "deck.txt", "-f", "auto-blacklist", "-f", "ask-order=keep"])
        .write_stdin("bar\nwrong\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Blacklisted 1 question(s)"));

    let content = std::fs::read_to_string(dir.path().join("deck.txt")).unwrap();
    assert!(content.starts_with("--blacklist [foo]\n"));

    learnit()
        .current_dir(dir.path())
        .args(["test", "deck.txt"])
        .write_stdin("spam\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Loaded 1 of 2 item(s)"));

    learnit()
        .current_dir(dir.path())
        .args(["test", "deck.txt", "--no-blacklist", "-f", "ask-order=keep"])
        .write_stdin("bar\nspam\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Loaded 2 of 2 item(s)"));
}

#[test]
fn cancelled_session_writes_nothing() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "deck.txt", SMALL);

    learnit()
        .current_dir(dir.path())
        .args(["test", "deck.txt", "-f", "auto-blacklist", "-f", "ask-order=keep"])
        .write_stdin("bar\n")
        .assert()
        .code(1);

    let content = std::fs::read_to_string(dir.path().join("deck.txt")).unwrap();
    assert_eq!(content, SMALL);
}

#[test]
fn validate_learndata_directory() {
    learnit()
        .args(["validate", "../../learndata"])
        .assert()
        .success()
        .stdout(predicate::str::contains("capitals.txt: 4 items"))
        .stdout(predicate::str::contains("verbs.txt: 5 items"))
        .stdout(predicate::str::contains("All learndata files valid."));
}

#[test]
fn validate_reports_warnings() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "messy.txt",
        "--bogus yes\n--ask-order sideways\n\nfoo\nbar\n\nfoo\nbaz\n",
    );

    learnit()
        .current_dir(dir.path())
        .args(["validate", "messy.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("messy.txt: 1 items"))
        .stdout(predicate::str::contains("unknown flag \"bogus\""))
        .stdout(predicate::str::contains("illegal value \"sideways\""))
        .stdout(predicate::str::contains("[foo] WARNING"))
        .stdout(predicate::str::contains("3 warning(s) found."));
}

#[test]
fn validate_nonexistent_file() {
    learnit()
        .args(["validate", "nonexistent.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn flags_table_shows_sources() {
    learnit()
        .args(["flags", "../../learndata/capitals.txt", "-f", "grade-max=100"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Capitals"))
        .stdout(predicate::str::contains("file"))
        .stdout(predicate::str::contains("override"))
        .stdout(predicate::str::contains("default"));
}

#[test]
fn flags_table_ignores_rejected_override() {
    learnit()
        .args(["flags", "../../learndata/verbs.txt", "--json", "-f", "ask-order=sideways"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"ask-order\": \"alphabetical\""));
}

#[test]
fn flags_json_uses_presets() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "presets.json",
        r#"{ "exam": { "grade-max": 100, "ask-order": "keep" } }"#,
    );
    write(dir.path(), "deck.txt", "--preset exam\n--ask-order alphabetical\n\nfoo\nbar\n");

    learnit()
        .current_dir(dir.path())
        .args(["flags", "deck.txt", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"grade-max\": 100"))
        .stdout(predicate::str::contains("\"ask-order\": \"alphabetical\""));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    learnit()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created learnit.toml"))
        .stdout(predicate::str::contains("Created presets.json"))
        .stdout(predicate::str::contains("Created learndata/example.txt"));

    assert!(dir.path().join("learnit.toml").exists());
    assert!(dir.path().join("learndata/example.txt").exists());

    learnit()
        .current_dir(dir.path())
        .args(["validate", "learndata"])
        .assert()
        .success()
        .stdout(predicate::str::contains("example.txt: 4 items"));
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "learnit.toml", "# mine\n");

    learnit()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("learnit.toml already exists, skipping."));

    let content = std::fs::read_to_string(dir.path().join("learnit.toml")).unwrap();
    assert_eq!(content, "# mine\n");
}

#[test]
fn help_output() {
    learnit()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Flashcard training and testing"));
}

#[test]
fn version_output() {
    learnit()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("learnit"));
}
