//! Credential resolution
//!
//! A configured value becomes a [`Credential`] only after sanitation and
//! sanity checks. Anything else is treated as "absent" and forces the mock
//! path; it is never an error.

use std::fmt;

/// Shortest sanitized value accepted as a real credential.
pub const MIN_CREDENTIAL_LEN: usize = 20;

const PLACEHOLDERS: &[&str] = &[
    "changeme",
    "placeholder",
    "none",
    "null",
    "undefined",
    "test",
    "apikey",
    "api-key",
    "secret",
];

/// A sanitized, plausibly valid upstream credential.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Keep only ASCII alphanumerics and hyphens.
    pub fn sanitize(raw: &str) -> String {
        raw.chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
            .collect()
    }

    /// Resolve a configured value, or `None` when it should be treated as absent.
    pub fn resolve(raw: Option<&str>) -> Option<Self> {
        let sanitized = Self::sanitize(raw?);

        if sanitized.is_empty() || is_placeholder(&sanitized) {
            return None;
        }

        if sanitized.len() < MIN_CREDENTIAL_LEN {
            return None;
        }

        Some(Self(sanitized))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential(***)")
    }
}

fn is_placeholder(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();

    if PLACEHOLDERS.contains(&lower.as_str()) {
        return true;
    }

    if lower.starts_with("your") || lower.contains("placeholder") || lower.contains("insert") {
        return true;
    }

    // sk-xxxxxxxx... style masks
    lower
        .trim_start_matches("sk-")
        .chars()
        .all(|c| c == 'x' || c == '-' || c == '*')
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    #[case(Some("   "))]
    #[case(Some("your-api-key"))]
    #[case(Some("YOUR_OPENAI_API_KEY_GOES_HERE_PLEASE"))]
    #[case(Some("<insert-your-key-here-1234567890>"))]
    #[case(Some("sk-xxxxxxxxxxxxxxxxxxxxxxxxxxxx"))]
    #[case(Some("changeme"))]
    #[case(Some("sk-short"))]
    #[case(Some("!!!@@@###$$$%%%^^^&&&***((()))"))]
    fn test_absent_credentials(#[case] raw: Option<&str>) {
        assert!(Credential::resolve(raw).is_none());
    }

    #[test]
    fn test_sanitizes_surrounding_noise() {
        let credential = Credential::resolve(Some("  \"sk-proj-abcDEF0123456789xyz\"\n")).unwrap();
        assert_eq!(credential.expose(), "sk-proj-abcDEF0123456789xyz");
    }

    #[test]
    fn test_strips_disallowed_characters() {
        assert_eq!(Credential::sanitize("sk_a.b/c-d e"), "skabc-de");
    }

    #[test]
    fn test_debug_is_redacted() {
        let credential = Credential::resolve(Some("sk-live-0123456789abcdefghij")).unwrap();
        assert_eq!(format!("{:?}", credential), "Credential(***)");
    }
}
