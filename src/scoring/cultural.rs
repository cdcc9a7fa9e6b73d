//! Turkish / Islamic dream-interpretation context.

use crate::utils::lowercase_tr;

/// Keywords whose presence marks text as traditional dream interpretation.
pub const CULTURAL_KEYWORDS: [&str; 19] = [
    "rüya",
    "rüyada",
    "görmek",
    "tabir",
    "yorumlanır",
    "delalet",
    "işaret",
    "anlam",
    "düşman",
    "hayır",
    "şer",
    "bereket",
    "rızk",
    "manevi",
    "maddi",
    "hane",
    "zarar",
    "fayda",
    "hayırlı",
];

pub const CULTURAL_BONUS: i32 = 20;

/// Markers of the traditional interpretation literature.
pub const TRADITIONAL_INDICATORS: [&str; 11] = [
    "alim",
    "tabir",
    "delalet",
    "işaret",
    "imam",
    "diyanet",
    "islami",
    "geleneksel",
    "halk",
    "kültür",
    "türk",
];

pub const ISLAMIC_KEYWORDS: [&str; 11] = [
    "allah",
    "peygamber",
    "dua",
    "namaz",
    "haram",
    "helal",
    "sevap",
    "günah",
    "ahiret",
    "cennet",
    "cehennem",
];

/// Number of distinct keywords present (substring match on lowercased text).
pub fn score(text: &str) -> usize {
    if text.is_empty() {
        return 0;
    }
    let lower = lowercase_tr(text);
    CULTURAL_KEYWORDS
        .iter()
        .filter(|k| lower.contains(*k))
        .count()
}

/// Distinct (traditional, islamic) markers present in `text`.
pub fn context_counts(text: &str) -> (usize, usize) {
    let lower = lowercase_tr(text);
    let count = |words: &[&str]| words.iter().filter(|w| lower.contains(*w)).count();
    (count(&TRADITIONAL_INDICATORS), count(&ISLAMIC_KEYWORDS))
}

/// Strong context earns a bonus, no context at all is penalized.
pub fn bonus(matches: usize, min_indicators: usize) -> i32 {
    if matches == 0 {
        -CULTURAL_BONUS
    } else if matches >= min_indicators {
        CULTURAL_BONUS
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_distinct_keywords_not_occurrences() {
        assert_eq!(score("tabir tabir tabir"), 1);
        assert_eq!(score("Bu rüya eski bir tabir ile delalet olarak bilinir."), 3);
    }

    #[test]
    fn case_insensitive() {
        assert_eq!(score("BEREKET ve Zarar"), 2);
    }

    #[test]
    fn overlapping_keywords_each_count() {
        // "rüyada" contains "rüya", "hayırlı" contains "hayır".
        assert_eq!(score("rüyada hayırlı"), 4);
    }

    #[test]
    fn empty_and_unrelated() {
        assert_eq!(score(""), 0);
        assert_eq!(score("Bugün hava çok güzeldi ve yürüyüşe çıktık."), 0);
    }

    #[test]
    fn bonus_boundaries() {
        assert_eq!(bonus(3, 3), 20);
        assert_eq!(bonus(7, 3), 20);
        assert_eq!(bonus(2, 3), 0);
        assert_eq!(bonus(1, 3), 0);
        assert_eq!(bonus(0, 3), -20);
        assert_eq!(bonus(0, 0), -20);
        assert_eq!(bonus(1, 0), 20);
    }

    #[test]
    fn dotted_capital_i_matches() {
        assert_eq!(score("İşaret eder"), 1);
        assert_eq!(score("RÜYA TABİRİ"), 2);
        assert_eq!(context_counts("İMAM VE DİYANET"), (2, 0));
    }

    #[test]
    fn traditional_and_islamic_context() {
        let (traditional, islamic) =
            context_counts("Alimlere göre bu tabir hayra delalet eder, dua etmek gerekir.");
        assert_eq!(traditional, 3);
        assert_eq!(islamic, 1);
        assert_eq!(context_counts("Bugün hava güzeldi."), (0, 0));
    }

    #[test]
    fn scenario_text_has_strong_context() {
        let text = "Rüyada fare görmek, tabire göre bereket ve rızk işaretidir.";
        assert!(score(text) >= 4);
    }
}
