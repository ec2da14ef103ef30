//! Drill engine.
//!
//! Two algorithms walk the askable sequence: testing asks every item once
//! and grades the run, training keeps picking unlearned items at random
//! until each has been answered correctly. With `ask-for both` the chosen
//! algorithm runs over the sequence and then over its inverted form.

use rand::Rng;
use serde::Serialize;

use crate::error::Result;
use crate::flags::ResolvedFlags;
use crate::grading::{Grade, GradeScale};
use crate::matching::{AnswerMatcher, Verdict};
use crate::model::{AskFor, LearnItem, Mode};
use crate::prompt::Prompter;
use crate::transform::invert;

/// Which way items are asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Show the question, expect an answer.
    Forward,
    /// Show an answer, expect the question.
    Backward,
}

/// Session progress reporting.
pub trait DrillReporter: Send + Sync {
    fn on_pass_start(&self, direction: Direction, items: usize);
    fn on_answer(&self, direction: Direction, item: &LearnItem, correct: bool);
}

/// No-op drill reporter.
pub struct NoopReporter;

impl DrillReporter for NoopReporter {
    fn on_pass_start(&self, _: Direction, _: usize) {}
    fn on_answer(&self, _: Direction, _: &LearnItem, _: bool) {}
}

/// Outcome of one testing pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PassResult {
    pub found: Vec<String>,
    pub not_found: Vec<String>,
}

impl PassResult {
    pub fn total(&self) -> usize {
        self.found.len() + self.not_found.len()
    }

    pub fn is_found(&self, question: &str) -> bool {
        self.found.iter().any(|q| q == question)
    }
}

/// Outcome of one training pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TrainStats {
    /// Questions asked, retries included.
    pub asked: usize,
    pub learned: usize,
}

/// Asks questions and walks item sequences.
pub struct Drill<'a> {
    flags: &'a ResolvedFlags,
    matcher: AnswerMatcher,
    prompter: &'a mut dyn Prompter,
    reporter: &'a dyn DrillReporter,
}

impl<'a> Drill<'a> {
    pub fn new(
        flags: &'a ResolvedFlags,
        prompter: &'a mut dyn Prompter,
        reporter: &'a dyn DrillReporter,
    ) -> Self {
        Self {
            flags,
            matcher: AnswerMatcher::from_flags(flags),
            prompter,
            reporter,
        }
    }

    /// Ask one item until it is matched, missed, or no retry is wanted.
    pub fn ask_item(&mut self, item: &LearnItem) -> Result<bool> {
        let sentence = self.flags.ask_sentence_for(&item.question);
        loop {
            match self.attempt(&sentence, item)? {
                Verdict::Match => return Ok(true),
                Verdict::Mismatch => return Ok(false),
                Verdict::RetryRequested => continue,
            }
        }
    }

    fn attempt(&mut self, sentence: &str, item: &LearnItem) -> Result<Verdict> {
        let input = self.prompter.ask(sentence)?;
        if self.matcher.is_correct(&input, &item.answers) {
            return Ok(Verdict::Match);
        }
        if self.flags.allow_typos()
            && !input.trim().is_empty()
            && self.prompter.confirm("Was this a typo ?")?
        {
            return Ok(Verdict::RetryRequested);
        }
        Ok(Verdict::Mismatch)
    }

    /// Ask every item once, in order.
    pub fn test_pass(&mut self, items: &[LearnItem], direction: Direction) -> Result<PassResult> {
        self.reporter.on_pass_start(direction, items.len());
        let scale = GradeScale::from_flags(self.flags);
        let mut result = PassResult::default();

        for item in items {
            let correct = self.ask_item(item)?;
            self.reporter.on_answer(direction, item, correct);

            if correct {
                self.prompter.say(self.flags.success_sentence())?;
                result.found.push(item.question.clone());
            } else {
                if self.flags.show_answer_in_testing_mode() {
                    self.prompter.say(&format!(
                        "The correct answer was: {}",
                        item.answers_display()
                    ))?;
                } else {
                    self.prompter.say(self.flags.fail_sentence())?;
                }
                result.not_found.push(item.question.clone());
            }

            if self.flags.always_show_grade() {
                if let Some(grade) = scale.grade(result.found.len(), items.len()) {
                    self.prompter.say(&grade.to_string())?;
                }
            }
        }

        Ok(result)
    }

    /// Drill until every item has been answered correctly once.
    pub fn train_pass<R: Rng + ?Sized>(
        &mut self,
        items: &[LearnItem],
        direction: Direction,
        rng: &mut R,
    ) -> Result<TrainStats> {
        self.reporter.on_pass_start(direction, items.len());
        let mut unlearned: Vec<&LearnItem> = items.iter().collect();
        let mut stats = TrainStats::default();

        while !unlearned.is_empty() {
            let index = rng.gen_range(0..unlearned.len());
            let item = unlearned[index];
            stats.asked += 1;

            let correct = self.ask_item(item)?;
            self.reporter.on_answer(direction, item, correct);

            if correct {
                self.prompter.say(self.flags.success_sentence())?;
                unlearned.swap_remove(index);
                stats.learned += 1;
            } else {
                self.prompter.say(self.flags.fail_sentence())?;
                self.prompter.say(&format!(
                    "The correct answer was: {}",
                    item.answers_display()
                ))?;
                let timeout = self.flags.hide_timeout();
                if !timeout.is_zero() {
                    self.prompter.pause(timeout);
                    self.prompter.clear()?;
                }
            }
        }

        Ok(stats)
    }
}

/// Result of a completed testing session.
#[derive(Debug, Clone, Serialize)]
pub struct TestReport {
    pub forward: Option<PassResult>,
    pub backward: Option<PassResult>,
    /// Original questions counted as found, in sequence order.
    pub found: Vec<String>,
    /// Graded items that were missed.
    pub missed: Vec<LearnItem>,
    /// `None` only when nothing was graded.
    pub grade: Option<Grade>,
}

/// Result of a completed session.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum SessionOutcome {
    Training { passes: Vec<(Direction, TrainStats)> },
    Testing(TestReport),
}

impl SessionOutcome {
    pub fn mode(&self) -> Mode {
        match self {
            SessionOutcome::Training { .. } => Mode::Training,
            SessionOutcome::Testing(_) => Mode::Testing,
        }
    }
}

/// Run a whole session over `items` in `mode`, honoring `ask-for`.
pub fn run_session<R: Rng + ?Sized>(
    mode: Mode,
    items: &[LearnItem],
    flags: &ResolvedFlags,
    prompter: &mut dyn Prompter,
    reporter: &dyn DrillReporter,
    rng: &mut R,
) -> Result<SessionOutcome> {
    let ask_for = flags.ask_for();
    let inverted = match ask_for {
        AskFor::Answers => Vec::new(),
        AskFor::Questions | AskFor::Both => invert(items),
    };
    let mut drill = Drill::new(flags, prompter, reporter);

    match mode {
        Mode::Training => {
            let mut passes = Vec::new();
            if ask_for != AskFor::Questions {
                passes.push((Direction::Forward, drill.train_pass(items, Direction::Forward, rng)?));
            }
            if ask_for != AskFor::Answers {
                passes.push((
                    Direction::Backward,
                    drill.train_pass(&inverted, Direction::Backward, rng)?,
                ));
            }
            Ok(SessionOutcome::Training { passes })
        }
        Mode::Testing => {
            let forward = match ask_for {
                AskFor::Questions => None,
                _ => Some(drill.test_pass(items, Direction::Forward)?),
            };
            let backward = match ask_for {
                AskFor::Answers => None,
                _ => Some(drill.test_pass(&inverted, Direction::Backward)?),
            };
            Ok(SessionOutcome::Testing(combine(
                items,
                &inverted,
                forward,
                backward,
                flags,
            )))
        }
    }
}

/// Fold the pass results into one report.
///
/// An original question is recalled backward when every inverted item
/// listing it was found. Both directions must succeed when
/// `strict-learn-about` is on, either one otherwise. Asking for questions
/// only grades the inverted items themselves.
fn combine(
    items: &[LearnItem],
    inverted: &[LearnItem],
    forward: Option<PassResult>,
    backward: Option<PassResult>,
    flags: &ResolvedFlags,
) -> TestReport {
    let strict = flags.strict_learn_about();
    let recalled_backward = |question: &str| -> Option<bool> {
        let backward = backward.as_ref()?;
        let mut containing = inverted
            .iter()
            .filter(|inv| inv.answers.iter().any(|a| a == question))
            .peekable();
        containing.peek()?;
        Some(containing.all(|inv| backward.is_found(&inv.question)))
    };

    let mut found = Vec::new();
    let mut missed_items = Vec::new();
    for item in items {
        let fwd = forward.as_ref().map(|f| f.is_found(&item.question));
        let bwd = recalled_backward(&item.question);
        let ok = match (fwd, bwd) {
            (Some(f), Some(b)) if strict => f && b,
            (Some(f), Some(b)) => f || b,
            (Some(f), None) => f,
            (None, Some(b)) => b,
            (None, None) => false,
        };
        if ok {
            found.push(item.question.clone());
        } else {
            missed_items.push(item.clone());
        }
    }

    let scale = GradeScale::from_flags(flags);
    let (grade, missed) = match (&forward, &backward) {
        (None, Some(back)) => (
            scale.grade(back.found.len(), back.total()),
            inverted
                .iter()
                .filter(|inv| !back.is_found(&inv.question))
                .cloned()
                .collect(),
        ),
        _ => (scale.grade(found.len(), items.len()), missed_items),
    };

    TestReport {
        forward,
        backward,
        found,
        missed,
        grade,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::{FlagSchema, FlagValue, FlagsResolver, RawFlags};
    use crate::prompt::ScriptedPrompter;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Mutex;

    fn flags(pairs: &[(&str, FlagValue)]) -> ResolvedFlags {
        let schema = FlagSchema::standard();
        let raw: RawFlags = pairs.iter().cloned().collect();
        FlagsResolver::new(&schema).resolve(&raw).flags
    }

    fn capitals() -> Vec<LearnItem> {
        vec![
            LearnItem::new("france", ["paris"]),
            LearnItem::new("italy", ["rome"]),
            LearnItem::new("spain", ["madrid"]),
            LearnItem::new("japan", ["tokyo"]),
        ]
    }

    #[derive(Default)]
    struct Recorder {
        answers: Mutex<Vec<(Direction, String, bool)>>,
    }

    impl DrillReporter for Recorder {
        fn on_pass_start(&self, _: Direction, _: usize) {}
        fn on_answer(&self, direction: Direction, item: &LearnItem, correct: bool) {
            self.answers
                .lock()
                .unwrap()
                .push((direction, item.question.clone(), correct));
        }
    }

    #[test]
    fn testing_one_wrong_out_of_four() {
        let flags = flags(&[]);
        let mut prompter = ScriptedPrompter::new(["Paris", "rome", "barcelona", " tokyo "]);
        let outcome = run_session(
            Mode::Testing,
            &capitals(),
            &flags,
            &mut prompter,
            &NoopReporter,
            &mut StdRng::seed_from_u64(1),
        )
        .unwrap();

        let SessionOutcome::Testing(report) = outcome else {
            panic!("expected a testing outcome");
        };
        assert_eq!(report.grade.unwrap().display_score(), "15/20");
        assert_eq!(report.missed.len(), 1);
        assert_eq!(report.missed[0].question, "spain");
        assert!(prompter.saw("The correct answer was: madrid"));
        assert!(prompter.saw("✓ Success!"));
    }

    #[test]
    fn testing_hides_answer_when_asked() {
        let flags = flags(&[("show-answer-in-testing-mode", false.into())]);
        let mut prompter = ScriptedPrompter::new(["x"]);
        let mut drill = Drill::new(&flags, &mut prompter, &NoopReporter);
        let result = drill
            .test_pass(&[LearnItem::new("france", ["paris"])], Direction::Forward)
            .unwrap();
        assert_eq!(result.not_found, vec!["france"]);
        assert!(prompter.saw("✕ Fail"));
        assert!(!prompter.saw("paris"));
    }

    #[test]
    fn always_show_grade_prints_running_grade() {
        let flags = flags(&[("always-show-grade", true.into())]);
        let mut prompter = ScriptedPrompter::new(["paris", "x"]);
        let mut drill = Drill::new(&flags, &mut prompter, &NoopReporter);
        drill.test_pass(&capitals()[..2], Direction::Forward).unwrap();
        assert!(prompter.saw("Your grade: 10/20 (1/2)"));
    }

    #[test]
    fn ask_sentence_is_used() {
        let flags = flags(&[("ask-sentence", "What is the capital of <> ?".into())]);
        let mut prompter = ScriptedPrompter::new(["paris"]);
        let mut drill = Drill::new(&flags, &mut prompter, &NoopReporter);
        assert!(drill.ask_item(&capitals()[0]).unwrap());
        assert_eq!(prompter.transcript[0], "What is the capital of france ?");
    }

    #[test]
    fn typo_retry_loops_until_no() {
        let flags = flags(&[("allow-typos", true.into())]);
        let mut prompter = ScriptedPrompter::new(["pariz", "y", "parsi", "yes", "paris"]);
        let mut drill = Drill::new(&flags, &mut prompter, &NoopReporter);
        assert!(drill.ask_item(&capitals()[0]).unwrap());

        let mut prompter = ScriptedPrompter::new(["pariz", "n"]);
        let mut drill = Drill::new(&flags, &mut prompter, &NoopReporter);
        assert!(!drill.ask_item(&capitals()[0]).unwrap());
    }

    #[test]
    fn typo_prompt_skipped_for_empty_input_or_when_disabled() {
        let flags_on = flags(&[("allow-typos", true.into())]);
        let mut prompter = ScriptedPrompter::new([""]);
        let mut drill = Drill::new(&flags_on, &mut prompter, &NoopReporter);
        assert!(!drill.ask_item(&capitals()[0]).unwrap());
        assert_eq!(prompter.asked, 1);

        let flags_off = flags(&[]);
        let mut prompter = ScriptedPrompter::new(["pariz"]);
        let mut drill = Drill::new(&flags_off, &mut prompter, &NoopReporter);
        assert!(!drill.ask_item(&capitals()[0]).unwrap());
        assert_eq!(prompter.asked, 1);
    }

    #[test]
    fn end_of_input_cancels() {
        let flags = flags(&[]);
        let mut prompter = ScriptedPrompter::new(["paris"]);
        let err = run_session(
            Mode::Testing,
            &capitals(),
            &flags,
            &mut prompter,
            &NoopReporter,
            &mut StdRng::seed_from_u64(1),
        )
        .unwrap_err();
        assert!(err.is_cancelled());
    }

    /// Answers each prompt correctly only on its second appearance.
    struct Stubborn {
        items: Vec<LearnItem>,
        seen: Vec<String>,
        asked: usize,
    }

    impl Prompter for Stubborn {
        fn ask(&mut self, message: &str) -> Result<String> {
            self.asked += 1;
            let item = self
                .items
                .iter()
                .find(|i| i.question == message)
                .expect("asked an unknown question");
            if self.seen.iter().any(|s| s == message) {
                Ok(item.answers[0].clone())
            } else {
                self.seen.push(message.to_string());
                Ok("wrong".into())
            }
        }
        fn say(&mut self, _: &str) -> Result<()> {
            Ok(())
        }
        fn clear(&mut self) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn training_repeats_until_learned() {
        let flags = flags(&[]);
        let items = capitals();
        let mut prompter = Stubborn {
            items: items.clone(),
            seen: Vec::new(),
            asked: 0,
        };
        let recorder = Recorder::default();
        let outcome = run_session(
            Mode::Training,
            &items,
            &flags,
            &mut prompter,
            &recorder,
            &mut StdRng::seed_from_u64(3),
        )
        .unwrap();

        let SessionOutcome::Training { passes } = outcome else {
            panic!("expected a training outcome");
        };
        assert_eq!(
            passes,
            vec![(
                Direction::Forward,
                TrainStats {
                    asked: 8,
                    learned: 4
                }
            )]
        );
        assert_eq!(prompter.asked, 8);
        let answers = recorder.answers.lock().unwrap();
        assert_eq!(answers.iter().filter(|(_, _, ok)| *ok).count(), 4);
    }

    #[test]
    fn training_hide_timeout_clears() {
        let flags = flags(&[("hide-timeout", FlagValue::Float(0.5))]);
        let mut prompter = ScriptedPrompter::new(["nope", "paris"]);
        let mut drill = Drill::new(&flags, &mut prompter, &NoopReporter);
        let stats = drill
            .train_pass(
                &capitals()[..1],
                Direction::Forward,
                &mut StdRng::seed_from_u64(0),
            )
            .unwrap();
        assert_eq!(stats, TrainStats { asked: 2, learned: 1 });
        assert!(prompter.saw("The correct answer was: paris"));
    }

    fn shared_answers() -> Vec<LearnItem> {
        vec![
            LearnItem::new("baz", ["spam"]),
            LearnItem::new("eggs", ["spam"]),
            LearnItem::new("foo", ["bar"]),
        ]
    }

    #[test]
    fn both_directions_strict() {
        // Backward items: spam -> [baz, eggs], bar -> [foo].
        let flags = flags(&[("ask-for", "both".into())]);
        let mut prompter = ScriptedPrompter::new(["spam", "spam", "bar", "baz", "nope"]);
        let outcome = run_session(
            Mode::Testing,
            &shared_answers(),
            &flags,
            &mut prompter,
            &NoopReporter,
            &mut StdRng::seed_from_u64(1),
        )
        .unwrap();
        let SessionOutcome::Testing(report) = outcome else {
            panic!("expected a testing outcome");
        };
        assert_eq!(report.forward.as_ref().unwrap().found.len(), 3);
        assert_eq!(report.backward.as_ref().unwrap().found, vec!["spam"]);
        assert_eq!(report.found, vec!["baz", "eggs"]);
        assert_eq!(report.grade.unwrap().found, 2);
        assert_eq!(report.grade.unwrap().total, 3);
    }

    #[test]
    fn both_directions_lenient() {
        let flags = flags(&[
            ("ask-for", "both".into()),
            ("strict-learn-about", false.into()),
        ]);
        let mut prompter = ScriptedPrompter::new(["x", "x", "bar", "nope", "foo"]);
        let outcome = run_session(
            Mode::Testing,
            &shared_answers(),
            &flags,
            &mut prompter,
            &NoopReporter,
            &mut StdRng::seed_from_u64(1),
        )
        .unwrap();
        let SessionOutcome::Testing(report) = outcome else {
            panic!("expected a testing outcome");
        };
        assert_eq!(report.found, vec!["foo"]);
    }

    #[test]
    fn questions_only_grades_inverted_items() {
        let flags = flags(&[("ask-for", "questions".into())]);
        let mut prompter = ScriptedPrompter::new(["eggs", "nope"]);
        let outcome = run_session(
            Mode::Testing,
            &shared_answers(),
            &flags,
            &mut prompter,
            &NoopReporter,
            &mut StdRng::seed_from_u64(1),
        )
        .unwrap();
        let SessionOutcome::Testing(report) = outcome else {
            panic!("expected a testing outcome");
        };
        assert!(report.forward.is_none());
        let grade = report.grade.unwrap();
        assert_eq!((grade.found, grade.total), (1, 2));
        assert_eq!(report.missed.len(), 1);
        assert_eq!(report.missed[0].question, "bar");
        assert_eq!(report.found, vec!["baz", "eggs"]);
    }
}
