//! Evaluation of remote read label matchers against rows.
//!
//! Semantics follow Prometheus: regular expressions are fully anchored with
//! `.` matching newlines, and a label that is absent from a row matches as
//! the empty string.

use regex::Regex;

use crate::error::{Error, Result};
use crate::model::Row;
use crate::proto::{LabelMatcher, MatchType};

/// A label matcher with its regular expression compiled.
#[derive(Debug, Clone)]
pub enum Matcher {
    Equal(String, String),
    NotEqual(String, String),
    Regex(String, Regex),
    NotRegex(String, Regex),
}

impl Matcher {
    /// Compile a protocol matcher.
    pub fn compile(matcher: &LabelMatcher) -> Result<Self> {
        let name = matcher.name.clone();
        Ok(match matcher.r#type() {
            MatchType::Eq => Matcher::Equal(name, matcher.value.clone()),
            MatchType::Neq => Matcher::NotEqual(name, matcher.value.clone()),
            MatchType::Re => Matcher::Regex(name, anchored(&matcher.value)?),
            MatchType::Nre => Matcher::NotRegex(name, anchored(&matcher.value)?),
        })
    }

    /// Returns true if the row satisfies this matcher.
    pub fn matches(&self, row: &Row) -> bool {
        match self {
            Matcher::Equal(name, value) => row.label(name).unwrap_or("") == value,
            Matcher::NotEqual(name, value) => row.label(name).unwrap_or("") != value,
            Matcher::Regex(name, re) => re.is_match(row.label(name).unwrap_or("")),
            Matcher::NotRegex(name, re) => !re.is_match(row.label(name).unwrap_or("")),
        }
    }
}

fn anchored(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^(?s:{})$", pattern))
        .map_err(|e| Error::Storage(format!("invalid matcher regex {:?}: {}", pattern, e)))
}

/// Compile all matchers of a query.
pub fn compile_all(matchers: &[LabelMatcher]) -> Result<Vec<Matcher>> {
    matchers.iter().map(Matcher::compile).collect()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn row() -> Row {
        Row::new(1.0, "2024-01-01T00:00:00Z")
            .with_label("__name__", "up")
            .with_label("job", "node")
    }

    #[rstest]
    #[case(MatchType::Eq, "job", "node", true)]
    #[case(MatchType::Eq, "job", "api", false)]
    #[case(MatchType::Eq, "missing", "", true)]
    #[case(MatchType::Neq, "job", "api", true)]
    #[case(MatchType::Neq, "job", "node", false)]
    #[case(MatchType::Re, "job", "no.*", true)]
    #[case(MatchType::Re, "job", "no", false)]
    #[case(MatchType::Re, "job", "api|node", true)]
    #[case(MatchType::Nre, "job", "api|web", true)]
    #[case(MatchType::Nre, "missing", ".+", true)]
    fn should_evaluate_matcher(
        #[case] match_type: MatchType,
        #[case] name: &str,
        #[case] value: &str,
        #[case] expected: bool,
    ) {
        // given
        let matcher = Matcher::compile(&LabelMatcher::new(match_type, name, value)).unwrap();

        // when/then
        assert_eq!(matcher.matches(&row()), expected);
    }

    #[test]
    fn should_match_newlines_with_dot() {
        // given
        let row = Row::new(1.0, "2024-01-01T00:00:00Z").with_label("msg", "first\nsecond");
        let matcher = Matcher::compile(&LabelMatcher::new(MatchType::Re, "msg", "first.second"))
            .unwrap();

        // when/then
        assert!(matcher.matches(&row));
    }

    #[test]
    fn should_reject_invalid_regex() {
        // given
        let matcher = LabelMatcher::new(MatchType::Re, "job", "(unclosed");

        // when
        let result = Matcher::compile(&matcher);

        // then
        assert!(matches!(result, Err(Error::Storage(msg)) if msg.contains("unclosed")));
    }
}
