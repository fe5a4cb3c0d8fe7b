//! Custom parent control matching

use agileweb_core::{AccessAction, ControlType, CustomParentControl};

/// The control that decided a request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlMatch<'a> {
    pub action: AccessAction,
    pub control: &'a CustomParentControl,
}

impl ControlMatch<'_> {
    /// Audit reason, e.g. `Custom control: url - roblox.com`
    pub fn reason(&self) -> String {
        format!(
            "Custom control: {} - {}",
            self.control.control_type.as_str(),
            self.control.value
        )
    }
}

/// Whether a single control applies to the (lower-cased) URL and content
fn control_matches(control: &CustomParentControl, url: &str, content: &str) -> bool {
    let value = control.value.trim().to_lowercase();
    if value.is_empty() {
        return false;
    }

    match control.control_type {
        ControlType::Url => url.contains(&value),
        ControlType::Keyword | ControlType::Interest => {
            content.contains(&value) || url.contains(&value)
        }
    }
}

/// First control in list order that matches, if any.
///
/// `url` and `content` are compared case-insensitively. Blank controls
/// never match.
pub fn match_control<'a>(
    url: &str,
    content: &str,
    controls: &'a [CustomParentControl],
) -> Option<ControlMatch<'a>> {
    let url = url.to_lowercase();
    let content = content.to_lowercase();

    controls
        .iter()
        .find(|control| control_matches(control, &url, &content))
        .map(|control| ControlMatch {
            action: control.action,
            control,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn control(
        id: &str,
        control_type: ControlType,
        value: &str,
        action: AccessAction,
    ) -> CustomParentControl {
        CustomParentControl::new(id, control_type, value, action)
    }

    #[test]
    fn test_url_control_matches_url_only() {
        let controls = vec![control("c1", ControlType::Url, "roblox.com", AccessAction::Block)];

        let hit = match_control("https://ROBLOX.com/games", "", &controls).unwrap();
        assert_eq!(hit.action, AccessAction::Block);
        assert_eq!(hit.reason(), "Custom control: url - roblox.com");

        assert!(match_control("https://example.com", "I love roblox.com", &controls).is_none());
    }

    #[test]
    fn test_keyword_and_interest_match_content_or_url() {
        let controls = vec![
            control("c1", ControlType::Keyword, "Fortnite", AccessAction::Gate),
            control("c2", ControlType::Interest, "minecraft", AccessAction::Allow),
        ];

        let by_content =
            match_control("https://example.com", "new fortnite season", &controls).unwrap();
        assert_eq!(by_content.control.id, "c1");

        let by_url = match_control("https://minecraft.net", "", &controls).unwrap();
        assert_eq!(by_url.control.id, "c2");
        assert_eq!(by_url.action, AccessAction::Allow);
    }

    #[test]
    fn test_first_match_wins() {
        let controls = vec![
            control("c1", ControlType::Keyword, "games", AccessAction::Allow),
            control("c2", ControlType::Url, "roblox.com", AccessAction::Block),
        ];

        let hit = match_control("https://roblox.com/games", "", &controls).unwrap();
        assert_eq!(hit.control.id, "c1");
        assert_eq!(hit.action, AccessAction::Allow);
    }

    #[test]
    fn test_blank_controls_are_skipped() {
        let controls = vec![
            control("blank", ControlType::Keyword, "   ", AccessAction::Block),
            control("c2", ControlType::Keyword, "chess", AccessAction::Gate),
        ];

        let hit = match_control("https://example.com", "chess openings", &controls).unwrap();
        assert_eq!(hit.control.id, "c2");
        assert!(match_control("https://example.com", "", &controls).is_none());
    }

    #[test]
    fn test_no_controls() {
        assert!(match_control("https://example.com", "anything", &[]).is_none());
    }
}
