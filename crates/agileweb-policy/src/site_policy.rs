//! Site and app policy matching
//!
//! Policies are evaluated in list order; storage order is part of the
//! contract, so the first policy for the child's age group wins.

use agileweb_core::{AgeGroup, PolicyType, SitePolicy};
use url::Url;

/// Host of `url`, adding an `https://` scheme when none is given
fn host_of(url: &str) -> Option<String> {
    let has_scheme = url
        .get(..4)
        .map_or(false, |scheme| scheme.eq_ignore_ascii_case("http"));
    let candidate = if has_scheme {
        url.to_string()
    } else {
        format!("https://{}", url)
    };

    Url::parse(&candidate)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_lowercase))
}

/// Whether `url` falls under a single policy
pub fn matches_site_policy(url: &str, policy: &SitePolicy) -> bool {
    let pattern = policy.site_pattern.trim().to_lowercase();
    if url.is_empty() || pattern.is_empty() {
        return false;
    }

    let lower_url = url.to_lowercase();
    match policy.policy_type {
        PolicyType::Domain => match host_of(url) {
            Some(host) => host == pattern || host.ends_with(&format!(".{}", pattern)),
            None => lower_url.contains(&pattern),
        },
        // App identifiers are matched like URL fragments
        PolicyType::Url | PolicyType::App => lower_url.contains(&pattern),
    }
}

/// Every policy matching the URL, in list order
pub fn find_matches<'a>(url: &str, policies: &'a [SitePolicy]) -> Vec<&'a SitePolicy> {
    policies
        .iter()
        .filter(|policy| matches_site_policy(url, policy))
        .collect()
}

/// First matching policy for the given age group
pub fn find_applicable<'a>(
    url: &str,
    age_group: AgeGroup,
    policies: &'a [SitePolicy],
) -> Option<&'a SitePolicy> {
    policies
        .iter()
        .find(|policy| policy.age_group == age_group && matches_site_policy(url, policy))
}
