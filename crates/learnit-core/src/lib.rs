//! learnit-core — Learndata parsing, flag resolution and the drill engine.
//!
//! This crate holds everything between a learndata file's raw lines and a
//! finished training or testing session: the line classifier and flag
//! coercion, the flag schema and resolver, presets, the question/answer
//! grammar, the askable-sequence transformer, answer matching, and the two
//! drill algorithms.

pub mod blacklist;
pub mod engine;
pub mod error;
pub mod flags;
pub mod grading;
pub mod matching;
pub mod model;
pub mod parser;
pub mod preset;
pub mod prompt;
pub mod syntax;
pub mod transform;

pub use error::{LearnError, Result};
