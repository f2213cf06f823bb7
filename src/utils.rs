// src/utils.rs

//! Text normalization shared by the structural filter, the scorer and the
//! aggregator. All address/city comparisons go through `normalize_token`
//! so the three stages agree on what "matches" means.

/// Lowercase, replace every non-alphanumeric character with a space,
/// collapse runs of whitespace, trim.
pub fn normalize_token(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut last_space = true;
    for ch in value.chars() {
        let ch = ch.to_ascii_lowercase();
        if ch.is_ascii_alphanumeric() {
            out.push(ch);
            last_space = false;
        } else if !last_space {
            out.push(' ');
            last_space = true;
        }
    }
    out.trim_end().to_string()
}

/// The city portion of a free-form area label ("San Francisco, CA" →
/// raw "San Francisco", normalized "san francisco").
#[derive(Debug, Clone, PartialEq)]
pub struct CityToken {
    pub raw: String,
    pub normalized: String,
}

pub fn city_token(area_label: &str) -> Option<CityToken> {
    let raw = area_label.split(',').next().unwrap_or("").trim();
    let normalized = normalize_token(raw);
    if normalized.is_empty() {
        return None;
    }
    Some(CityToken {
        raw: raw.to_string(),
        normalized,
    })
}

/// Initials of a multi-word normalized city token ("san francisco" → "sf").
/// Single-word tokens get no initials; one letter matches far too much.
pub fn city_initials(normalized: &str) -> Option<String> {
    let words: Vec<&str> = normalized.split_whitespace().collect();
    if words.len() < 2 {
        return None;
    }
    Some(words.iter().filter_map(|w| w.chars().next()).collect())
}

/// Whether a room's free-text A/V field carries a positive indicator.
pub fn has_av_indicator(av: &str) -> bool {
    let av = av.to_lowercase();
    av.contains("yes") || av.contains("av") || av.contains("projector") || av.contains("mic")
}

/// Collapse internal whitespace runs to single spaces and trim.
pub fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_punctuation_and_case() {
        assert_eq!(normalize_token("San Francisco, CA!"), "san francisco ca");
        assert_eq!(normalize_token("  123 Mission St.  "), "123 mission st");
        assert_eq!(normalize_token("---"), "");
    }

    #[test]
    fn city_token_takes_first_segment() {
        let token = city_token("San Francisco, CA").unwrap();
        assert_eq!(token.raw, "San Francisco");
        assert_eq!(token.normalized, "san francisco");
        assert!(city_token(" , CA").is_none());
    }

    #[test]
    fn initials_only_for_multi_word_tokens() {
        assert_eq!(city_initials("san francisco").as_deref(), Some("sf"));
        assert_eq!(city_initials("new york city").as_deref(), Some("nyc"));
        assert_eq!(city_initials("oakland"), None);
    }

    #[test]
    fn av_indicators() {
        assert!(has_av_indicator("Yes - projector and mics"));
        assert!(has_av_indicator("Full AV setup"));
        assert!(!has_av_indicator("None"));
    }

    #[test]
    fn collapse_whitespace_flattens_runs() {
        assert_eq!(
            collapse_whitespace("  cozy\n\twine   cellar "),
            "cozy wine cellar"
        );
        assert_eq!(collapse_whitespace("   "), "");
    }
}
