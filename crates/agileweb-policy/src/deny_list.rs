//! Adult-site deny list
//!
//! Known adult domains and path fragments, blocked for every age group.
//! Matching is case-insensitive substring containment on the URL.

use agileweb_classifiers::KeywordSet;
use agileweb_core::Result;

/// Category and content type reported for deny-list hits
pub const DENY_CATEGORY: (&str, &str) = ("sexual", "explicit-sexual");

pub static ADULT_SITE_DENY_LIST: &[&str] = &[
    // Major adult video sites
    "pornhub.com",
    "pornhub",
    "xvideos.com",
    "xvideos",
    "xhamster.com",
    "xhamster",
    "redtube.com",
    "redtube",
    "youporn.com",
    "youporn",
    "tube8.com",
    "tube8",
    "spankwire.com",
    "spankwire",
    "keezmovies.com",
    "keezmovies",
    "xtube.com",
    "xtube",
    "drtuber.com",
    "drtuber",
    "beeg.com",
    "beeg",
    "tnaflix.com",
    "tnaflix",
    "sunporno.com",
    "sunporno",
    "4tube.com",
    "4tube",
    "porn.com",
    "pornhubpremium.com",
    "pornhubpremium",
    // XXX sites
    "xxx.com",
    "xxx",
    "xxxvideos.net",
    "xxxvideos",
    "xxxvideos2.com",
    "xxxvideos2",
    // Adult content platforms
    "onlyfans.com",
    "onlyfans",
    "chaturbate.com",
    "chaturbate",
    "livejasmin.com",
    "livejasmin",
    "myfreecams.com",
    "myfreecams",
    "stripchat.com",
    "stripchat",
    "cam4.com",
    "cam4",
    "bongacams.com",
    "bongacams",
    "streamate.com",
    "streamate",
    // Adult dating
    "ashleymadison.com",
    "ashleymadison",
    "adultfriendfinder.com",
    "adultfriendfinder",
    "fetlife.com",
    "fetlife",
    // Adult content networks
    "brazzers.com",
    "brazzers",
    "realitykings.com",
    "realitykings",
    "bangbros.com",
    "bangbros",
    "naughtyamerica.com",
    "naughtyamerica",
    "vivid.com",
    "vivid",
    "wicked.com",
    "wicked",
    "evilangel.com",
    "evilangel",
    "kink.com",
    "kink",
    "hardx.com",
    "hardx",
    // Magazines
    "penthouse.com",
    "penthouse",
    "playboy.com",
    "playboy",
    "hustler.com",
    "hustler",
    "maxim.com",
    "maxim",
    // Forums
    "reddit.com/r/nsfw",
    "reddit.com/r/gonewild",
    "reddit.com/r/realgirls",
    "reddit.com/r/nsfw_gifs",
    "reddit.com/r/porn",
    "reddit.com/r/xxx",
    // Additional domains
    "pornmd.com",
    "pornmd",
    "porn300.com",
    "porn300",
    "pornhub.org",
    "xnxx.com",
    "xnxx",
    "xvideo.com",
    "xvideo",
    "xvideos2.com",
    "xvideos2",
    "pornotube.com",
    "pornotube",
    "extremetube.com",
    "extremetube",
    "youjizz.com",
    "youjizz",
    "spankbang.com",
    "spankbang",
    "eporner.com",
    "eporner",
    "porntrex.com",
    "porntrex",
    "nuvid.com",
    "nuvid",
    "pornhub.tv",
    "pornhub.net",
];

/// Compiled deny list
pub struct DenyList {
    entries: KeywordSet,
}

impl DenyList {
    pub fn new() -> Result<Self> {
        Self::with_entries(ADULT_SITE_DENY_LIST)
    }

    /// Build a deny list over custom entries
    pub fn with_entries(entries: &[&'static str]) -> Result<Self> {
        Ok(Self {
            entries: KeywordSet::new(entries)?,
        })
    }

    pub fn is_denied(&self, url: &str) -> bool {
        self.entries.is_match(url)
    }

    /// First entry in list order contained in the URL
    pub fn matched_entry(&self, url: &str) -> Option<&'static str> {
        self.entries.first_in_list_order(url)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
