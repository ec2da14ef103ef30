//! Answer comparison.

use crate::flags::ResolvedFlags;

/// Prefix marking an accepted answer as an AND-list when `and-lists` is on.
pub const AND_LIST_PREFIX: &str = "<<AND>>";

/// Outcome of one attempt at a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Match,
    Mismatch,
    /// The user flagged a mismatch as a typo and wants to answer again.
    RetryRequested,
}

/// Compares user input against accepted answers.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnswerMatcher {
    pub case_sensitive: bool,
    pub and_lists: bool,
}

impl AnswerMatcher {
    pub fn from_flags(flags: &ResolvedFlags) -> Self {
        Self {
            case_sensitive: flags.case_sensitive(),
            and_lists: flags.and_lists(),
        }
    }

    /// Trim, collapse whitespace runs (non-breaking spaces included) and
    /// fold case unless matching is case-sensitive.
    pub fn normalize(&self, text: &str) -> String {
        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if self.case_sensitive {
            collapsed
        } else {
            collapsed.to_lowercase()
        }
    }

    /// `true` if `input` matches any accepted answer.
    pub fn is_correct<S: AsRef<str>>(&self, input: &str, accepted: &[S]) -> bool {
        let input = self.normalize(input);
        accepted.iter().any(|answer| {
            let answer = answer.as_ref();
            match and_list_elements(answer) {
                Some(elements) if self.and_lists => self.matches_and_list(&input, elements),
                _ => input == self.normalize(answer),
            }
        })
    }

    /// Every comma-separated element must be given, in any order, with no
    /// extras.
    fn matches_and_list(&self, input: &str, elements: &str) -> bool {
        let expected = self.element_set(elements);
        !expected.is_empty() && self.element_set(input) == expected
    }

    fn element_set(&self, list: &str) -> Vec<String> {
        let mut elements: Vec<String> = list
            .split(',')
            .map(|e| self.normalize(e))
            .filter(|e| !e.is_empty())
            .collect();
        elements.sort();
        elements.dedup();
        elements
    }
}

/// The element list of an AND-list answer. The prefix survives case folding.
fn and_list_elements(answer: &str) -> Option<&str> {
    let len = AND_LIST_PREFIX.len();
    answer
        .get(..len)
        .filter(|prefix| prefix.eq_ignore_ascii_case(AND_LIST_PREFIX))
        .map(|_| &answer[len..])
}

#[cfg(test)]
mod tests {
    use super::*;

    const INSENSITIVE: AnswerMatcher = AnswerMatcher {
        case_sensitive: false,
        and_lists: false,
    };
    const SENSITIVE: AnswerMatcher = AnswerMatcher {
        case_sensitive: true,
        and_lists: false,
    };

    #[test]
    fn case_folding() {
        assert!(INSENSITIVE.is_correct("Paris", &["paris"]));
        assert!(!SENSITIVE.is_correct("Paris", &["paris"]));
        assert!(SENSITIVE.is_correct("Paris", &["Paris"]));
    }

    #[test]
    fn whitespace_is_normalized() {
        assert!(INSENSITIVE.is_correct("  paris  ", &["paris"]));
        assert!(INSENSITIVE.is_correct("long   value\u{a0}name", &["long value name"]));
        assert!(INSENSITIVE.is_correct("\tx\n", &["x "]));
    }

    #[test]
    fn alternatives_are_or() {
        let accepted = ["was", "were"];
        assert!(INSENSITIVE.is_correct("were", &accepted));
        assert!(INSENSITIVE.is_correct("was", &accepted));
        assert!(!INSENSITIVE.is_correct("was, were", &accepted));
        assert!(!INSENSITIVE.is_correct("", &accepted));
    }

    #[test]
    fn empty_answer_matches_empty_input() {
        assert!(INSENSITIVE.is_correct("   ", &[""]));
    }

    #[test]
    fn and_lists_require_every_element() {
        let matcher = AnswerMatcher {
            case_sensitive: false,
            and_lists: true,
        };
        let accepted = ["<<AND>>red, green, blue"];
        assert!(matcher.is_correct("blue, red, green", &accepted));
        assert!(matcher.is_correct("Red,Green,Blue", &accepted));
        assert!(!matcher.is_correct("red, green", &accepted));
        assert!(!matcher.is_correct("red, green, blue, black", &accepted));
        assert!(matcher.is_correct("green, blue, red", &["<<and>>red, green, blue"]));
    }

    #[test]
    fn and_prefix_is_literal_when_disabled() {
        let accepted = ["<<AND>>red, green"];
        assert!(!INSENSITIVE.is_correct("red, green", &accepted));
        assert!(INSENSITIVE.is_correct("<<and>>red, green", &accepted));
    }
}
