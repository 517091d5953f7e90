//! Intent name rules.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{BriefError, Result};

/// Longest accepted intent name.
pub const MAX_NAME_LEN: usize = 64;

static SLUG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("slug pattern is valid")
});

/// Checks that `name` is a slug: lowercase letters, digits and single hyphens.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(BriefError::validation("Intent name must not be empty"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(BriefError::validation(format!(
            "Intent name '{}' exceeds {} characters",
            name, MAX_NAME_LEN
        )));
    }
    if !SLUG.is_match(name) {
        return Err(BriefError::validation(format!(
            "Intent name '{}' may only contain lowercase letters, digits and hyphens",
            name
        )));
    }
    Ok(())
}

/// Derives a human-readable title: `fix-login-bug` becomes `Fix Login Bug`.
pub fn display_name(name: &str) -> String {
    name.split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_slugs() {
        for name in ["fix-bug", "a", "v2-migration", "123"] {
            assert!(validate_name(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn test_rejects_non_slugs() {
        for name in ["", "Fix-bug", "fix_bug", "-lead", "trail-", "dou--ble", "sp ace"] {
            assert!(
                validate_name(name).unwrap_err().is_validation(),
                "{name:?} should be rejected"
            );
        }
        assert!(validate_name(&"a".repeat(MAX_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("fix-bug"), "Fix Bug");
        assert_eq!(display_name("v2-api"), "V2 Api");
        assert_eq!(display_name("single"), "Single");
    }
}
