//! Input limits, sanitization and validation
//!
//! The decision engine stays correct on inputs of any size, but callers
//! are expected to bound what they pass in. These helpers implement the
//! caps used at the HTTP boundary and by the profile store.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};
use crate::types::{ControlType, CustomParentControl, SitePolicy};

/// Longest control value or site pattern accepted from a parent
pub const MAX_RULE_VALUE_CHARS: usize = 500;

/// Longest site-policy note accepted from a parent
pub const MAX_NOTES_CHARS: usize = 1000;

/// Keyword controls are short phrases
pub const MAX_KEYWORD_WORDS: usize = 5;

/// Size caps applied to an evaluation request before it reaches the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputLimits {
    #[serde(default = "default_max_url_chars")]
    pub max_url_chars: usize,

    #[serde(default = "default_max_content_chars")]
    pub max_content_chars: usize,

    #[serde(default = "default_max_title_chars")]
    pub max_title_chars: usize,

    #[serde(default = "default_max_description_chars")]
    pub max_description_chars: usize,

    #[serde(default = "default_max_controls")]
    pub max_controls: usize,

    #[serde(default = "default_max_policies")]
    pub max_policies: usize,
}

impl Default for InputLimits {
    fn default() -> Self {
        Self {
            max_url_chars: default_max_url_chars(),
            max_content_chars: default_max_content_chars(),
            max_title_chars: default_max_title_chars(),
            max_description_chars: default_max_description_chars(),
            max_controls: default_max_controls(),
            max_policies: default_max_policies(),
        }
    }
}

fn default_max_url_chars() -> usize {
    2000
}

fn default_max_content_chars() -> usize {
    10_000
}

fn default_max_title_chars() -> usize {
    500
}

fn default_max_description_chars() -> usize {
    1000
}

fn default_max_controls() -> usize {
    100
}

fn default_max_policies() -> usize {
    200
}

/// Truncate to at most `max_chars` characters, respecting char boundaries
pub fn truncate_chars(input: &str, max_chars: usize) -> &str {
    match input.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &input[..byte_index],
        None => input,
    }
}

/// Trim, drop control characters and cap the length of a URL
pub fn sanitize_url(url: &str, max_chars: usize) -> String {
    let cleaned: String = url.trim().chars().filter(|c| !c.is_control()).collect();
    truncate_chars(&cleaned, max_chars).to_string()
}

/// Trim and cap the length of free text
pub fn sanitize_text(input: &str, max_chars: usize) -> String {
    truncate_chars(input.trim(), max_chars).to_string()
}

/// Whether `input` looks like an http(s) URL, with or without a scheme
pub fn is_valid_url(input: &str) -> bool {
    let input = input.trim();
    if input.is_empty() {
        return false;
    }

    match Url::parse(input) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host_str().is_some(),
        Err(_) => Url::parse(&format!("https://{}", input))
            .ok()
            .and_then(|url| url.host_str().map(|host| host.contains('.')))
            .unwrap_or(false),
    }
}

/// Validate the value of a custom control for its type
pub fn validate_control_value(value: &str, control_type: ControlType) -> Result<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("control value cannot be empty"));
    }
    if trimmed.chars().count() > MAX_RULE_VALUE_CHARS {
        return Err(Error::validation(format!(
            "control value must be {} characters or less",
            MAX_RULE_VALUE_CHARS
        )));
    }

    match control_type {
        ControlType::Url if !is_valid_url(trimmed) => {
            Err(Error::validation("invalid URL format"))
        }
        ControlType::Keyword if trimmed.split_whitespace().count() > MAX_KEYWORD_WORDS => {
            Err(Error::validation(format!(
                "keywords should be short phrases ({} words or less)",
                MAX_KEYWORD_WORDS
            )))
        }
        _ => Ok(()),
    }
}

/// Validate a whole custom control
pub fn validate_control(control: &CustomParentControl) -> Result<()> {
    validate_control_value(&control.value, control.control_type)
}

/// Validate a site policy before it is stored
pub fn validate_site_policy(policy: &SitePolicy) -> Result<()> {
    let pattern = policy.site_pattern.trim();
    if pattern.is_empty() {
        return Err(Error::validation("site pattern is required"));
    }
    if pattern.chars().count() > MAX_RULE_VALUE_CHARS {
        return Err(Error::validation(format!(
            "site pattern must be {} characters or less",
            MAX_RULE_VALUE_CHARS
        )));
    }
    if let Some(notes) = &policy.notes {
        if notes.chars().count() > MAX_NOTES_CHARS {
            return Err(Error::validation(format!(
                "notes must be {} characters or less",
                MAX_NOTES_CHARS
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AccessAction, AgeGroup, PolicyType};
    use proptest::prelude::*;

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("short", 100), "short");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn test_sanitize_url_strips_control_chars() {
        let url = sanitize_url("  https://exa\u{0}mple.com/\n ", 2000);
        assert_eq!(url, "https://example.com/");
    }

    #[test]
    fn test_sanitize_url_caps_length() {
        let long = format!("https://example.com/{}", "a".repeat(5000));
        assert_eq!(sanitize_url(&long, 2000).chars().count(), 2000);
    }

    #[test]
    fn test_is_valid_url() {
        assert!(is_valid_url("https://roblox.com/games"));
        assert!(is_valid_url("roblox.com"));
        assert!(!is_valid_url("ftp://files.example.com"));
        assert!(!is_valid_url("not a url"));
        assert!(!is_valid_url(""));
    }

    #[test]
    fn test_validate_control_value() {
        assert!(validate_control_value("roblox.com", ControlType::Url).is_ok());
        assert!(validate_control_value("   ", ControlType::Interest).is_err());
        assert!(
            validate_control_value("one two three four five six", ControlType::Keyword).is_err()
        );
        assert!(validate_control_value("minecraft mods", ControlType::Keyword).is_ok());
        assert!(validate_control_value(&"x".repeat(501), ControlType::Interest).is_err());
    }

    #[test]
    fn test_validate_site_policy() {
        let mut policy = SitePolicy::new(
            "p1",
            "youtube.com",
            PolicyType::Domain,
            AgeGroup::Under10,
            AccessAction::Gate,
        );
        assert!(validate_site_policy(&policy).is_ok());

        policy.site_pattern = "  ".to_string();
        assert!(validate_site_policy(&policy).is_err());
    }

    #[test]
    fn test_default_limits() {
        let limits = InputLimits::default();
        assert_eq!(limits.max_url_chars, 2000);
        assert_eq!(limits.max_content_chars, 10_000);
        assert_eq!(limits.max_controls, 100);
        assert_eq!(limits.max_policies, 200);
    }

    proptest! {
        #[test]
        fn prop_truncate_never_exceeds_limit(input in ".{0,300}", max in 0usize..200) {
            let out = truncate_chars(&input, max);
            prop_assert!(out.chars().count() <= max);
            prop_assert!(input.starts_with(out));
        }
    }
}
