//! Keyword sets backed by Aho-Corasick automata

use aho_corasick::AhoCorasick;
use agileweb_core::Result;

/// Case-insensitive substring matcher over a fixed keyword list.
///
/// Keywords keep their list position, so callers that care about
/// precedence get list order back rather than haystack order.
#[derive(Debug, Clone)]
pub struct KeywordSet {
    matcher: AhoCorasick,
    keywords: Vec<&'static str>,
}

impl KeywordSet {
    /// Build a matcher for the given keywords
    pub fn new(keywords: &[&'static str]) -> Result<Self> {
        let matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(keywords)
            .map_err(|e| {
                agileweb_core::Error::detector(format!("Failed to build keyword matcher: {}", e))
            })?;

        Ok(Self {
            matcher,
            keywords: keywords.to_vec(),
        })
    }

    /// Whether any keyword occurs in the haystack
    pub fn is_match(&self, haystack: &str) -> bool {
        self.matcher.is_match(haystack)
    }

    /// Keywords present in the haystack, each once, in list order
    pub fn matches(&self, haystack: &str) -> Vec<&'static str> {
        let mut seen = vec![false; self.keywords.len()];
        for m in self.matcher.find_overlapping_iter(haystack) {
            seen[m.pattern().as_usize()] = true;
        }

        self.keywords
            .iter()
            .zip(seen)
            .filter_map(|(keyword, hit)| hit.then_some(*keyword))
            .collect()
    }

    /// Number of distinct keywords present in the haystack
    pub fn distinct_hits(&self, haystack: &str) -> usize {
        self.matches(haystack).len()
    }

    /// Earliest keyword in list order that occurs in the haystack
    pub fn first_in_list_order(&self, haystack: &str) -> Option<&'static str> {
        self.matcher
            .find_overlapping_iter(haystack)
            .map(|m| m.pattern().as_usize())
            .min()
            .map(|index| self.keywords[index])
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn keywords(&self) -> &[&'static str] {
        &self.keywords
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_keyword_set_matches_case_insensitively() {
        let set = KeywordSet::new(&["crypto", "get rich"]).unwrap();

        assert!(set.is_match("Buy CRYPTO today"));
        assert!(!set.is_match("a quiet afternoon"));
    }

    #[test]
    fn test_distinct_hits_counts_each_keyword_once() {
        let set = KeywordSet::new(&["help", "support", "therapy"]).unwrap();

        assert_eq!(set.distinct_hits("help help help"), 1);
        assert_eq!(set.distinct_hits("help and support and therapy"), 3);
        assert_eq!(set.distinct_hits("nothing here"), 0);
    }

    #[test]
    fn test_overlapping_keywords_are_all_found() {
        let set = KeywordSet::new(&["get help", "help"]).unwrap();
        assert_eq!(set.matches("please get help"), vec!["get help", "help"]);
    }

    #[test]
    fn test_first_in_list_order_ignores_haystack_position() {
        let set = KeywordSet::new(&["pornhub.com", "pornhub", "xxx"]).unwrap();

        assert_eq!(set.first_in_list_order("xxx.pornhub.com"), Some("pornhub.com"));
        assert_eq!(set.first_in_list_order("https://pornhub.org"), Some("pornhub"));
        assert_eq!(set.first_in_list_order("https://example.com"), None);
    }

    #[test]
    fn test_empty_set_never_matches() {
        let set = KeywordSet::new(&[]).unwrap();
        assert!(set.is_empty());
        assert!(!set.is_match("anything"));
    }

    proptest! {
        #[test]
        fn prop_matches_agree_with_substring_search(haystack in "[a-z ]{0,60}") {
            let keywords: &[&'static str] = &["help", "self", "elf", "hope", "cope"];
            let set = KeywordSet::new(keywords).unwrap();

            let expected: Vec<&str> = keywords
                .iter()
                .copied()
                .filter(|k| haystack.contains(k))
                .collect();
            prop_assert_eq!(set.matches(&haystack), expected.clone());
            prop_assert_eq!(set.first_in_list_order(&haystack), expected.first().copied());
        }
    }
}
