use std::sync::LazyLock;

use regex::Regex;

use crate::utils::lowercase_tr;

static TITLE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)rüyada\s+(\w+)\s+görmek",
        r"(?i)rüyada\s+(\w+)",
        r"(?i)(\w+)\s+görmek",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});
static QUOTED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[“"‘'«]([^“”"‘’'«»]{2,40})[”"’'»]"#).unwrap());
static COLON_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([^:]{2,40}):").unwrap());
static SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(\s*[|\-–]\s*[^|\-–]+$|\s+rüya(?:da)?\s+tabir(?:i|leri)?$|\s+ne\s+anlama\s+gelir\??$|\s+nedir\??$|\s+rüyası$)",
    )
    .unwrap()
});

/// Words that the title patterns can capture but that are never the subject.
const STOPWORDS: &[&str] = &[
    "ne", "nedir", "anlama", "gelir", "neye", "ve", "bir", "ile", "rüya", "rüyada", "rüyamda",
    "görmek",
];

/// Infer the dream subject from an article title. Returns "" when nothing
/// plausible is found.
pub fn extract_dream_symbol(title: &str) -> String {
    let title = title.trim();
    if title.is_empty() {
        return String::new();
    }

    for re in TITLE_PATTERNS.iter() {
        if let Some(caps) = re.captures(title) {
            let symbol = lowercase_tr(&caps[1]);
            if !STOPWORDS.contains(&symbol.as_str()) {
                return symbol;
            }
        }
    }

    if let Some(caps) = QUOTED_RE.captures(title) {
        if let Some(s) = short_phrase(&caps[1]) {
            return s;
        }
    }
    if let Some(caps) = COLON_RE.captures(title) {
        if let Some(s) = short_phrase(&caps[1]) {
            return s;
        }
    }

    let stripped = SUFFIX_RE.replace(title, "");
    if stripped.len() < title.len() {
        if let Some(s) = short_phrase(&stripped) {
            return s;
        }
    }
    String::new()
}

/// At most three words, lowercased; stopword-only phrases rejected.
fn short_phrase(s: &str) -> Option<String> {
    let words: Vec<&str> = s.split_whitespace().collect();
    if words.is_empty() || words.len() > 3 {
        return None;
    }
    let phrase = lowercase_tr(&words.join(" "));
    if STOPWORDS.contains(&phrase.as_str()) {
        return None;
    }
    Some(phrase)
}
