//! Core data model types for learnit.
//!
//! [`LearnData`] is the raw question→answer mapping read from a file,
//! [`LearnItem`] is one entry of the askable sequence the drill engine walks.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The question→answer mapping exactly as parsed, in first-insertion order.
///
/// Assigning a question that already exists replaces its answer but keeps
/// its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnData {
    entries: Vec<(String, String)>,
}

impl LearnData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        let question = question.into();
        let answer = answer.into();
        match self.entries.iter_mut().find(|(q, _)| *q == question) {
            Some(entry) => entry.1 = answer,
            None => self.entries.push((question, answer)),
        }
    }

    pub fn get(&self, question: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(q, _)| q == question)
            .map(|(_, a)| a.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(q, a)| (q.as_str(), a.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<Q: Into<String>, A: Into<String>> FromIterator<(Q, A)> for LearnData {
    fn from_iter<I: IntoIterator<Item = (Q, A)>>(iter: I) -> Self {
        let mut data = LearnData::new();
        for (q, a) in iter {
            data.insert(q, a);
        }
        data
    }
}

/// A question and its accepted answers.
///
/// Answers are deduplicated in first-occurrence order and never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnItem {
    pub question: String,
    pub answers: Vec<String>,
}

impl LearnItem {
    pub fn new(question: impl Into<String>, answers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let mut deduped: Vec<String> = Vec::new();
        for answer in answers {
            let answer = answer.into();
            if !deduped.contains(&answer) {
                deduped.push(answer);
            }
        }
        if deduped.is_empty() {
            deduped.push(String::new());
        }
        Self {
            question: question.into(),
            answers: deduped,
        }
    }

    /// Accepted answers joined for display.
    pub fn answers_display(&self) -> String {
        self.answers.join(" / ")
    }
}

/// Drill algorithm to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Repeat until every item has been answered correctly.
    Training,
    /// Ask each item once and grade the result.
    Testing,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Training => write!(f, "Training"),
            Mode::Testing => write!(f, "Testing"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "train" | "training" => Ok(Mode::Training),
            "test" | "testing" => Ok(Mode::Testing),
            other => Err(format!("unknown mode: {other}")),
        }
    }
}

/// Which side of an item the user types (`--ask-for`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AskFor {
    /// Show answers, ask for questions.
    Questions,
    /// Show questions, ask for answers.
    #[default]
    Answers,
    /// Run both directions one after the other.
    Both,
}

impl FromStr for AskFor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "questions" => Ok(AskFor::Questions),
            "answers" => Ok(AskFor::Answers),
            "both" => Ok(AskFor::Both),
            other => Err(format!("unknown ask-for value: {other}")),
        }
    }
}

/// Order of the askable sequence (`--ask-order`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AskOrder {
    #[default]
    Random,
    Alphabetical,
    Inverted,
    /// Parse order (`keep` or `normal`).
    Keep,
}

impl FromStr for AskOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random" => Ok(AskOrder::Random),
            "alphabetical" => Ok(AskOrder::Alphabetical),
            "inverted" => Ok(AskOrder::Inverted),
            "keep" | "normal" => Ok(AskOrder::Keep),
            other => Err(format!("unknown ask-order value: {other}")),
        }
    }
}
