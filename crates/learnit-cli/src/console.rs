//! Console output for drill sessions.

use std::io::IsTerminal;
use std::sync::Mutex;

use comfy_table::{Cell, Table};

use learnit_core::engine::{Direction, DrillReporter};
use learnit_core::flags::ResolvedFlags;
use learnit_core::grading::Grade;
use learnit_core::model::LearnItem;

/// Console drill reporter.
///
/// Remembers every missed item so an interrupted session can still show
/// what needs work.
#[derive(Default)]
pub struct ConsoleReporter {
    missed: Mutex<Vec<LearnItem>>,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Items missed so far, each once, in the order they were first missed.
    pub fn missed(&self) -> Vec<LearnItem> {
        self.missed
            .lock()
            .map(|missed| missed.clone())
            .unwrap_or_default()
    }
}

impl DrillReporter for ConsoleReporter {
    fn on_pass_start(&self, direction: Direction, items: usize) {
        tracing::debug!("starting {direction:?} pass over {items} item(s)");
        if direction == Direction::Backward {
            println!("\nNow the other way round: answer with the question.\n");
        }
    }

    fn on_answer(&self, direction: Direction, item: &LearnItem, correct: bool) {
        tracing::trace!(?direction, question = %item.question, correct);
        if correct {
            return;
        }
        if let Ok(mut missed) = self.missed.lock() {
            if !missed.iter().any(|m| m.question == item.question) {
                missed.push(item.clone());
            }
        }
    }
}

/// Print `text` through the `header` template, colored with `header-color`.
pub fn print_header(flags: &ResolvedFlags, text: &str) {
    println!("{}", paint(&flags.header_for(text), flags.header_color()));
}

/// Print the final grade, green when it is good and red otherwise.
pub fn print_grade(grade: &Grade) {
    let color = if grade.is_good() { "green" } else { "red" };
    println!("\n{}", paint(&grade.to_string(), color));
}

/// Print the items to review, if any.
pub fn print_recap(missed: &[LearnItem]) {
    if missed.is_empty() {
        return;
    }
    println!("\nYou need to learn about:");
    println!("{}", items_table(missed, "Question", "Answers"));
}

/// Resolved flags and the askable sequence, for `--debug`.
pub fn print_debug(flags: &ResolvedFlags, items: &[LearnItem]) {
    print_header(flags, "DEBUG");

    let mut table = Table::new();
    table.set_header(vec!["FLAG", "VALUE"]);
    for (name, value) in flags.iter() {
        table.add_row(vec![Cell::new(name), Cell::new(value.to_string())]);
    }
    println!("{table}");
    println!("{}", items_table(items, "KEYS", "VALUES"));
}

fn items_table(items: &[LearnItem], question: &str, answers: &str) -> Table {
    let mut table = Table::new();
    table.set_header(vec![question, answers]);
    for item in items {
        table.add_row(vec![
            Cell::new(&item.question),
            Cell::new(item.answers_display()),
        ]);
    }
    table
}

/// Wrap `text` in the ANSI code for `color` when stdout is a terminal.
pub fn paint(text: &str, color: &str) -> String {
    match ansi_code(color) {
        Some(code) if std::io::stdout().is_terminal() => format!("\x1b[{code}m{text}\x1b[0m"),
        _ => text.to_string(),
    }
}

fn ansi_code(color: &str) -> Option<u8> {
    let code = match color {
        "black" => 30,
        "red" => 31,
        "green" => 32,
        "yellow" => 33,
        "blue" => 34,
        "magenta" => 35,
        "cyan" => 36,
        "white" => 37,
        _ => return None,
    };
    Some(code)
}
