//! Match pattern + replacement template pair applied to whole file contents.
use crate::error::{Result, RfsubError};
use regex::Regex;

/// A compiled match pattern together with a checked replacement template.
///
/// The `regex` crate guarantees linear-time matching, so a hostile pattern
/// cannot blow up on a large file.
#[derive(Debug, Clone)]
pub struct PatternEngine {
    regex: Regex,
    template: ReplacementTemplate,
}

impl PatternEngine {
    pub fn new(pattern: &str, template: &str) -> Result<Self> {
        let regex = Regex::new(pattern)?;
        let template = ReplacementTemplate::parse(&regex, template)?;
        Ok(Self { regex, template })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Whether the pattern occurs anywhere in `content`.
    pub fn is_match(&self, content: &str) -> bool {
        self.regex.is_match(content)
    }

    /// Replaces all non-overlapping matches, expanding group references.
    pub fn replace(&self, content: &str) -> String {
        self.regex
            .replace_all(content, self.template.as_str())
            .into_owned()
    }
}

/// A replacement string whose `$` references all name real capture groups.
///
/// Syntax: `$1`, `$name`, `${name}` and `$$` for a literal dollar. A `$` not
/// followed by a name is kept literally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementTemplate {
    raw: String,
}

impl ReplacementTemplate {
    pub fn parse(regex: &Regex, template: &str) -> Result<Self> {
        let invalid = |reason: String| RfsubError::InvalidTemplate {
            template: template.to_string(),
            reason,
        };

        let mut rest = template;
        while let Some(pos) = rest.find('$') {
            rest = &rest[pos + 1..];

            if let Some(after) = rest.strip_prefix('$') {
                rest = after;
                continue;
            }

            let name = if let Some(braced) = rest.strip_prefix('{') {
                let close = braced
                    .find('}')
                    .ok_or_else(|| invalid("unterminated '${'".to_string()))?;
                let name = &braced[..close];
                if name.is_empty() {
                    return Err(invalid("empty group reference '${}'".to_string()));
                }
                rest = &braced[close + 1..];
                name
            } else {
                let end = rest
                    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                    .unwrap_or(rest.len());
                let name = &rest[..end];
                rest = &rest[end..];
                name
            };

            if name.is_empty() {
                continue;
            }
            check_group(regex, name).map_err(invalid)?;
        }

        Ok(Self {
            raw: template.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

fn check_group(regex: &Regex, name: &str) -> std::result::Result<(), String> {
    if let Ok(index) = name.parse::<usize>() {
        let groups = regex.captures_len();
        if index >= groups {
            return Err(format!(
                "group ${index} does not exist (pattern has {} group(s))",
                groups - 1
            ));
        }
        return Ok(());
    }

    if regex.capture_names().flatten().any(|n| n == name) {
        Ok(())
    } else {
        Err(format!("no capture group named '{name}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_match_is_false_not_error() {
        let engine = PatternEngine::new("foo", "FOO").unwrap();
        assert!(!engine.is_match("bar baz"));
        assert!(engine.is_match("a foo b"));
    }

    #[test]
    fn test_replace_all_occurrences() {
        let engine = PatternEngine::new("foo", "FOO").unwrap();
        assert_eq!(engine.replace("foo bar foo"), "FOO bar FOO");
    }

    #[test]
    fn test_numbered_and_named_groups() {
        let engine = PatternEngine::new(r"(\w+)@(?P<host>\w+)", "${host}:$1").unwrap();
        assert_eq!(engine.replace("me@home you@work"), "home:me work:you");
    }

    #[test]
    fn test_literal_dollar() {
        let engine = PatternEngine::new("price", "$$5 $").unwrap();
        assert_eq!(engine.replace("price"), "$5 $");
    }

    #[test]
    fn test_unknown_group_index_is_rejected() {
        let err = PatternEngine::new("(a)", "$2").unwrap_err();
        assert!(matches!(err, RfsubError::InvalidTemplate { .. }));
    }

    #[test]
    fn test_ambiguous_trailing_name_is_rejected() {
        // `$1a` names a group called "1a", not group 1 followed by "a".
        let err = PatternEngine::new("(a)", "$1a").unwrap_err();
        assert!(matches!(err, RfsubError::InvalidTemplate { .. }));
        assert!(PatternEngine::new("(a)", "${1}a").is_ok());
    }

    #[test]
    fn test_unterminated_brace_is_rejected() {
        let err = PatternEngine::new("(a)", "${1").unwrap_err();
        assert!(err.to_string().contains("unterminated"));
    }

    #[test]
    fn test_malformed_pattern_is_regex_error() {
        let err = PatternEngine::new("(unclosed", "x").unwrap_err();
        assert!(matches!(err, RfsubError::Regex(_)));
    }

    #[test]
    fn test_second_pass_without_matches_is_stable() {
        let engine = PatternEngine::new("foo", "bar").unwrap();
        let once = engine.replace("foo foo");
        assert!(!engine.is_match(&once));
        assert_eq!(engine.replace(&once), once);
    }

    #[test]
    fn test_whole_content_match_spans_lines() {
        let engine = PatternEngine::new(r"(?m)^old$", "new").unwrap();
        assert_eq!(engine.replace("old\nkeep\nold"), "new\nkeep\nnew");
    }
}
