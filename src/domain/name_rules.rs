//! Heuristics that flag placeholder or junk temple names.
//!
//! Rules are evaluated in table order against the trimmed English name and
//! the first match decides the reported reason. New heuristics are added as
//! rows in [`NAME_RULES`].

use std::fmt::{Display, Formatter};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Why a proposed name was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidNameReason {
    PlaceholderTest,
    PlaceholderHello,
    TestTemple,
    ShortLettersOnly,
    ContainsDigit,
    RepeatedPattern,
    LeadingNonLetter,
    TooShort,
}

impl InvalidNameReason {
    pub const fn code(self) -> &'static str {
        match self {
            Self::PlaceholderTest => "placeholder_test",
            Self::PlaceholderHello => "placeholder_hello",
            Self::TestTemple => "test_temple",
            Self::ShortLettersOnly => "short_letters_only",
            Self::ContainsDigit => "contains_digit",
            Self::RepeatedPattern => "repeated_pattern",
            Self::LeadingNonLetter => "leading_non_letter",
            Self::TooShort => "too_short",
        }
    }

    /// Human readable explanation shown to moderators.
    pub const fn description(self) -> &'static str {
        match self {
            Self::PlaceholderTest => "name is the placeholder \"test\"",
            Self::PlaceholderHello => "name is the placeholder \"hello\"",
            Self::TestTemple => "name looks like a \"test temple\" entry",
            Self::ShortLettersOnly => "name is five letters or fewer",
            Self::ContainsDigit => "name contains digits",
            Self::RepeatedPattern => "name is a short repeated letter pattern",
            Self::LeadingNonLetter => "name does not start with a letter",
            Self::TooShort => "name is shorter than three characters",
        }
    }
}

impl Display for InvalidNameReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

/// How a rule inspects the lower-cased, trimmed name.
pub enum NameMatcher {
    Regex(Regex),
    Predicate(fn(&str) -> bool),
}

impl NameMatcher {
    fn matches(&self, name: &str) -> bool {
        match self {
            Self::Regex(re) => re.is_match(name),
            Self::Predicate(predicate) => predicate(name),
        }
    }
}

pub struct NameRule {
    pub reason: InvalidNameReason,
    pub matcher: NameMatcher,
}

fn regex_rule(reason: InvalidNameReason, pattern: &str) -> NameRule {
    NameRule {
        reason,
        matcher: NameMatcher::Regex(Regex::new(pattern).expect("name rule pattern must compile")),
    }
}

/// Ordered rule table.
pub static NAME_RULES: LazyLock<Vec<NameRule>> = LazyLock::new(|| {
    use InvalidNameReason::*;

    vec![
        regex_rule(PlaceholderTest, r"^test$"),
        regex_rule(PlaceholderHello, r"^hello$"),
        regex_rule(TestTemple, r"test.*temple"),
        regex_rule(ShortLettersOnly, r"^[a-z]{1,5}$"),
        regex_rule(ContainsDigit, r"\d"),
        NameRule {
            reason: RepeatedPattern,
            matcher: NameMatcher::Predicate(is_repeated_chunk),
        },
        regex_rule(LeadingNonLetter, r"^[^a-z\s]"),
        regex_rule(TooShort, r"^.{1,2}$"),
    ]
});

/// `true` when the whole name is one 2 to 4 letter chunk repeated at least
/// twice, e.g. `ksks` or `abcabcabc`.
fn is_repeated_chunk(name: &str) -> bool {
    if !name.bytes().all(|b| b.is_ascii_lowercase()) {
        return false;
    }
    (2..=4).any(|chunk| {
        name.len() >= chunk * 2
            && name.len() % chunk == 0
            && name
                .as_bytes()
                .chunks(chunk)
                .all(|part| part == &name.as_bytes()[..chunk])
    })
}

/// Returns the first rule the name violates.
pub fn check_name(name: &str) -> Result<(), InvalidNameReason> {
    let normalized = name.trim().to_lowercase();
    match NAME_RULES
        .iter()
        .find(|rule| rule.matcher.matches(&normalized))
    {
        Some(rule) => Err(rule.reason),
        None => Ok(()),
    }
}

pub fn is_valid_name(name: &str) -> bool {
    check_name(name).is_ok()
}
