use std::sync::LazyLock;

use itertools::Itertools;
use regex::Regex;

use crate::record::Property;
use crate::utils::lowercase_tr;

static SEO_NOISE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\bseo\b|\bamp\b|milliyet|pembenar|netcore)").unwrap()
});

/// Generic tags that say nothing about the dream itself.
const GENERIC: &[&str] = &["1", "2", "3", "ruya", "rüya", "rüya tabiri", "rüya tabirleri"];

/// Trim, lowercase, drop SEO noise and generic words, de-duplicate in order.
pub fn clean_tags(tags: &[String]) -> Vec<String> {
    tags.iter()
        .map(|t| lowercase_tr(t.trim()))
        .filter(|t| t.chars().count() > 1)
        .filter(|t| !SEO_NOISE_RE.is_match(t))
        .filter(|t| !GENERIC.contains(&t.as_str()))
        .unique()
        .collect()
}

#[derive(Debug, Default, PartialEq)]
pub struct SeoContent {
    pub title: String,
    pub description: String,
}

pub fn extract_seo(properties: &[Property]) -> SeoContent {
    let mut seo = SeoContent::default();
    for prop in properties {
        let value = prop.value.trim();
        if value.is_empty() {
            continue;
        }
        match prop.ix_name.to_lowercase().as_str() {
            "seotitle" => seo.title = value.to_string(),
            "seodescription" => seo.description = value.to_string(),
            _ => {}
        }
    }
    seo
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn drops_noise_and_dedupes() {
        let tags = strings(&[
            " Fare ", "fare", "SEO", "milliyet rüya", "amp", "1", "rüya", "x", "", "bereket", "Kamp",
        ]);
        assert_eq!(clean_tags(&tags), vec!["fare", "bereket", "kamp"]);
    }

    #[test]
    fn turkish_capitals_dedupe() {
        let tags = strings(&["İnek", "inek", "IRMAK"]);
        assert_eq!(clean_tags(&tags), vec!["inek", "ırmak"]);
    }

    #[test]
    fn seo_properties() {
        let props = vec![
            Property {
                ix_name: "SeoTitle".into(),
                value: " Rüyada Fare Görmek ".into(),
            },
            Property {
                ix_name: "seodescription".into(),
                value: "Fare rüyası".into(),
            },
            Property {
                ix_name: "Canonical".into(),
                value: "https://x".into(),
            },
        ];
        let seo = extract_seo(&props);
        assert_eq!(seo.title, "Rüyada Fare Görmek");
        assert_eq!(seo.description, "Fare rüyası");
    }
}
