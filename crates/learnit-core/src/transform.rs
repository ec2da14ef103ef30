//! From parsed learndata to the askable sequence.
//!
//! The order produced here is the order the drill walks; nothing reorders
//! items afterwards.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{LearnError, Result};
use crate::flags::{FlagDiagnostic, FlagSchema, RawFlags, ResolvedFlags};
use crate::model::{AskOrder, LearnData, LearnItem};
use crate::parser::ParsedLearndata;

/// Split an answer line on the alternatives separator.
///
/// Parts are trimmed and empty parts dropped. An empty separator disables
/// splitting.
pub fn split_answers(answer: &str, or_syntax: &str) -> Vec<String> {
    if or_syntax.is_empty() {
        return vec![answer.trim().to_string()];
    }
    answer
        .split(or_syntax)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Build the askable sequence: split, fold, filter, order.
pub fn askable<R: Rng + ?Sized>(
    data: &LearnData,
    flags: &ResolvedFlags,
    rng: &mut R,
) -> Vec<LearnItem> {
    let fold = |s: &str| {
        if flags.case_sensitive() {
            s.to_string()
        } else {
            s.to_lowercase()
        }
    };

    // Folding may merge questions; the later one wins, in place.
    let mut items: Vec<LearnItem> = Vec::with_capacity(data.len());
    for (question, answer) in data.iter() {
        let item = LearnItem::new(
            fold(question),
            split_answers(answer, flags.or_syntax())
                .iter()
                .map(|a| fold(a.as_str())),
        );
        match items.iter_mut().find(|i| i.question == item.question) {
            Some(existing) => *existing = item,
            None => items.push(item),
        }
    }

    let whitelist: Vec<String> = flags.whitelist().iter().map(|w| fold(w.as_str())).collect();
    let blacklist: Vec<String> = flags.blacklist().iter().map(|b| fold(b.as_str())).collect();
    if !whitelist.is_empty() {
        items.retain(|item| whitelist.contains(&item.question));
    } else if !blacklist.is_empty() {
        items.retain(|item| !blacklist.contains(&item.question));
    }

    match flags.ask_order() {
        AskOrder::Random => items.shuffle(rng),
        AskOrder::Alphabetical => items.sort_by(|a, b| a.question.cmp(&b.question)),
        AskOrder::Inverted => items.reverse(),
        AskOrder::Keep => {}
    }

    tracing::debug!(
        "{} of {} items askable ({:?} order)",
        items.len(),
        data.len(),
        flags.ask_order()
    );
    items
}

/// Swap questions and answers.
///
/// Every accepted answer becomes a question whose accepted answers are the
/// original questions that listed it, in first-seen order. Empty answers
/// are not inverted.
pub fn invert(items: &[LearnItem]) -> Vec<LearnItem> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut inverted: Vec<(&str, Vec<String>)> = Vec::new();

    for item in items {
        for answer in item.answers.iter().filter(|a| !a.is_empty()) {
            let slot = *index.entry(answer.as_str()).or_insert_with(|| {
                inverted.push((answer.as_str(), Vec::new()));
                inverted.len() - 1
            });
            let questions = &mut inverted[slot].1;
            if !questions.contains(&item.question) {
                questions.push(item.question.clone());
            }
        }
    }

    inverted
        .into_iter()
        .map(|(answer, questions)| LearnItem::new(answer, questions))
        .collect()
}

/// A file ready to drill.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub source: String,
    pub flags: ResolvedFlags,
    pub diagnostics: Vec<FlagDiagnostic>,
    pub items: Vec<LearnItem>,
    /// Number of items in the file before filtering.
    pub total_parsed: usize,
}

/// Resolve flags and build the askable sequence for one parsed file.
///
/// Fails with [`LearnError::NoItems`] when filtering leaves nothing to ask.
pub fn prepare<R: Rng + ?Sized>(
    parsed: &ParsedLearndata,
    schema: &FlagSchema,
    overrides: &RawFlags,
    rng: &mut R,
) -> Result<Prepared> {
    let resolution = parsed.resolve(schema, overrides);
    let items = askable(&parsed.data, &resolution.flags, rng);
    if items.is_empty() {
        return Err(LearnError::NoItems {
            file: parsed.source.clone(),
        });
    }

    Ok(Prepared {
        source: parsed.source.clone(),
        flags: resolution.flags,
        diagnostics: resolution.diagnostics,
        items,
        total_parsed: parsed.data.len(),
    })
}
