//! Archive member classification and title normalization.
//!
//! Weekly audio editions ship one MP3 per article, named like
//! `Issue 9400 - 12 Finance and economics - Bond markets.mp3`. Only names of
//! that shape are transformable items; everything else in the archive (cover
//! art, notes, directories) is skipped without complaint.

use std::sync::LazyLock;

use regex::Regex;

static SOURCE_FILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:Issue *\d+ *- *)?(\d+) (.*?) - (.*\.mp3)$").unwrap()
});
static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^0-9A-Za-z_.]+").unwrap());
static UNDERSCORES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"__+").unwrap());
static LEAD_TRAIL_UNDERSCORE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^_|_$").unwrap());
static LONELY_S_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_s_").unwrap());
static LONELY_S_EXT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_s\.").unwrap());

/// A recognized archive member, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawItem {
    /// Track number as written in the name (not re-padded).
    pub track: String,
    /// Section title, e.g. `Finance and economics`.
    pub section: String,
    /// Article title including the `.mp3` extension.
    pub article: String,
}

/// Classify an archive member name.
///
/// Returns `None` for anything that is not an article track.
pub fn classify(name: &str) -> Option<RawItem> {
    let caps = SOURCE_FILE.captures(name)?;
    Some(RawItem {
        track: caps[1].to_string(),
        section: caps[2].to_string(),
        article: caps[3].to_string(),
    })
}

/// Normalize a section title into a directory-name fragment.
pub fn normalize_section(section: &str) -> String {
    let s = NON_WORD.replace_all(section, "_");
    let s = UNDERSCORES.replace_all(&s, "_");
    LEAD_TRAIL_UNDERSCORE.replace_all(&s, "").into_owned()
}

/// Normalize an article title (with extension) into a file-name fragment.
///
/// Apostrophes are dropped before anything else so `Editor's` becomes
/// `Editors`; a possessive written with a typographic apostrophe turns into
/// `_s_` and is folded back onto the preceding word.
pub fn normalize_article(article: &str) -> String {
    let s = article.replace('\'', "");
    let s = NON_WORD.replace_all(&s, "_");
    let s = UNDERSCORES.replace_all(&s, "_");
    let s = LONELY_S_WORD.replace_all(&s, "s_");
    let s = LONELY_S_EXT.replace_all(&s, "s.");
    LEAD_TRAIL_UNDERSCORE.replace_all(&s, "").into_owned()
}
