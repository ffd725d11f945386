use super::{Expr, Path};

/// Pattern match against a string property.
///
/// The pattern uses SQL wildcards: `%` matches any run of characters, `_`
/// matches a single character, and `\` escapes the next character.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprLike {
    pub property: Path,
    pub pattern: String,
}

impl Expr {
    pub fn like(property: impl Into<Path>, pattern: impl Into<String>) -> Self {
        ExprLike {
            property: property.into(),
            pattern: pattern.into(),
        }
        .into()
    }
}

impl ExprLike {
    /// Evaluates the pattern against a concrete string.
    pub fn matches(&self, input: &str) -> bool {
        like_match(&self.pattern, input)
    }
}

fn like_match(pattern: &str, input: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let input: Vec<char> = input.chars().collect();
    like_match_at(&pattern, &input)
}

fn like_match_at(pattern: &[char], input: &[char]) -> bool {
    match pattern.split_first() {
        None => input.is_empty(),
        Some(('%', rest)) => {
            // Try every split point, including the empty match
            (0..=input.len()).any(|i| like_match_at(rest, &input[i..]))
        }
        Some(('_', rest)) => !input.is_empty() && like_match_at(rest, &input[1..]),
        Some(('\\', rest)) => match (rest.split_first(), input.split_first()) {
            (Some((escaped, rest)), Some((c, input))) => c == escaped && like_match_at(rest, input),
            _ => false,
        },
        Some((c, rest)) => match input.split_first() {
            Some((i, input)) => i == c && like_match_at(rest, input),
            None => false,
        },
    }
}

impl From<ExprLike> for Expr {
    fn from(value: ExprLike) -> Self {
        Self::Like(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn like(pattern: &str) -> ExprLike {
        ExprLike {
            property: Path::parse("name"),
            pattern: pattern.to_string(),
        }
    }

    #[test]
    fn percent_matches_any_run() {
        assert!(like("Main%").matches("Main Street"));
        assert!(like("%Street").matches("Main Street"));
        assert!(like("%in%").matches("Main Street"));
        assert!(!like("Main%").matches("Side Street"));
    }

    #[test]
    fn underscore_matches_one() {
        assert!(like("r_ad").matches("road"));
        assert!(!like("r_ad").matches("rad"));
    }

    #[test]
    fn escape_matches_literal() {
        assert!(like("100\\%").matches("100%"));
        assert!(!like("100\\%").matches("1000"));
    }
}
