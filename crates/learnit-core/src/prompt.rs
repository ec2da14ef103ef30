//! Terminal interaction.
//!
//! The drill engine talks to the user only through [`Prompter`]. The CLI
//! plugs in a [`TerminalPrompter`] over stdin/stdout; tests use a
//! [`ScriptedPrompter`] fed with canned answers.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::time::Duration;

use crate::error::{LearnError, Result};

/// ANSI sequence that clears the screen and homes the cursor.
const CLEAR_SCREEN: &str = "\x1B[2J\x1B[1;1H";

// ---------------------------------------------------------------------------
// Prompter trait
// ---------------------------------------------------------------------------

/// Line-oriented user interaction.
pub trait Prompter {
    /// Show `message` and read one line of input, without its line ending.
    ///
    /// End of input is a user cancellation.
    fn ask(&mut self, message: &str) -> Result<String>;

    /// Print one line.
    fn say(&mut self, message: &str) -> Result<()>;

    /// Clear the screen.
    fn clear(&mut self) -> Result<()>;

    /// Wait before the next step.
    fn pause(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }

    /// Ask a yes/no question.
    fn confirm(&mut self, message: &str) -> Result<bool> {
        let answer = self.ask(&format!("(y/n) {message}"))?;
        Ok(is_yes(&answer))
    }
}

/// Answers starting with `y` (or its Cyrillic keyboard twins) mean yes.
pub fn is_yes(answer: &str) -> bool {
    answer
        .trim()
        .to_lowercase()
        .starts_with(['y', 'ы', 'я'])
}

// ---------------------------------------------------------------------------
// Terminal
// ---------------------------------------------------------------------------

/// A prompter over any line reader and writer.
pub struct TerminalPrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }
}

impl TerminalPrompter<io::StdinLock<'static>, io::Stdout> {
    /// The process's standard input and output.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn ask(&mut self, message: &str) -> Result<String> {
        write!(self.output, "{message}\n>").map_err(LearnError::Terminal)?;
        self.output.flush().map_err(LearnError::Terminal)?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .map_err(LearnError::Terminal)?;
        if read == 0 {
            return Err(LearnError::Cancelled);
        }
        Ok(line.trim_end_matches(['\n', '\r']).to_string())
    }

    fn say(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "{message}").map_err(LearnError::Terminal)
    }

    fn clear(&mut self) -> Result<()> {
        write!(self.output, "{CLEAR_SCREEN}").map_err(LearnError::Terminal)?;
        self.output.flush().map_err(LearnError::Terminal)
    }
}

// ---------------------------------------------------------------------------
// Scripted
// ---------------------------------------------------------------------------

/// A prompter that replays canned answers and records everything shown.
///
/// Running out of answers behaves like end of input.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    /// Every prompt and message, in order.
    pub transcript: Vec<String>,
    /// Number of questions asked so far.
    pub asked: usize,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            transcript: Vec::new(),
            asked: 0,
        }
    }

    /// Answers not consumed yet.
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    /// `true` if any recorded line contains `needle`.
    pub fn saw(&self, needle: &str) -> bool {
        self.transcript.iter().any(|line| line.contains(needle))
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, message: &str) -> Result<String> {
        self.transcript.push(message.to_string());
        self.asked += 1;
        self.answers.pop_front().ok_or(LearnError::Cancelled)
    }

    fn say(&mut self, message: &str) -> Result<()> {
        self.transcript.push(message.to_string());
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        Ok(())
    }

    fn pause(&mut self, _duration: Duration) {}
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Shortcuts for `choices`: lower-cased first letters, or `1`, `2`, ... when
/// two choices would share one.
pub fn shortcuts<S: AsRef<str>>(choices: &[S]) -> Vec<String> {
    let letters: Vec<String> = choices
        .iter()
        .map(|c| {
            c.as_ref()
                .chars()
                .next()
                .map(|first| first.to_lowercase().collect())
                .unwrap_or_default()
        })
        .collect();

    let mut unique = letters.clone();
    unique.sort();
    unique.dedup();
    let ambiguous = unique.len() != letters.len() || letters.iter().any(String::is_empty);

    if ambiguous {
        (1..=choices.len()).map(|n| n.to_string()).collect()
    } else {
        letters
    }
}

/// Ask the user to pick one of `choices`, re-prompting until the answer is
/// a valid shortcut. Returns the index of the chosen entry.
pub fn select<S: AsRef<str>>(
    prompter: &mut dyn Prompter,
    message: &str,
    choices: &[S],
) -> Result<usize> {
    let keys = shortcuts(choices);
    let numbered = keys.first().is_some_and(|k| k == "1");

    let listing: Vec<String> = choices
        .iter()
        .zip(&keys)
        .map(|(choice, key)| {
            let choice = choice.as_ref();
            if numbered {
                format!("{key}: {choice}")
            } else {
                let rest: String = choice.chars().skip(1).collect();
                format!("[{}]{rest}", key.to_uppercase())
            }
        })
        .collect();

    let mut answer = prompter.ask(&format!("{message}\n{}", listing.join("\n")))?;
    loop {
        let wanted = answer.trim().to_lowercase();
        if let Some(index) = keys.iter().position(|k| *k == wanted) {
            return Ok(index);
        }
        prompter.say(&format!("\"{wanted}\" is not a valid choice. Please try again"))?;
        answer = prompter.ask("")?;
    }
}
