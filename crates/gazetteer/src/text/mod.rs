//! Query and name text helpers: normalization, tokenization, street
//! synonyms.
//!
//! Everything the search core compares is passed through [`normalize`]
//! first, both at hierarchy load time and at query time, so token equality
//! is plain string equality.

pub mod house_numbers;

use ahash::AHashSet;
use once_cell::sync::Lazy;

/// Lowercases, folds Latin diacritics and unifies typographic punctuation.
pub fn normalize(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        for lower in c.to_lowercase() {
            fold_char(lower, &mut out);
        }
    }
    out
}

fn fold_char(c: char, out: &mut String) {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => out.push('a'),
        'ç' | 'ć' | 'č' => out.push('c'),
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => out.push('e'),
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' | 'ı' => out.push('i'),
        'ñ' | 'ń' | 'ň' => out.push('n'),
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ō' | 'ő' => out.push('o'),
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' => out.push('u'),
        'ý' | 'ÿ' => out.push('y'),
        'ś' | 'š' => out.push('s'),
        'ź' | 'ż' | 'ž' => out.push('z'),
        'ď' | 'đ' => out.push('d'),
        'ğ' => out.push('g'),
        'ł' => out.push('l'),
        'ř' => out.push('r'),
        'ť' => out.push('t'),
        'ß' => out.push_str("ss"),
        'æ' => out.push_str("ae"),
        'œ' => out.push_str("oe"),
        '’' | '‘' | 'ʼ' => out.push('\''),
        '“' | '”' | '„' => out.push('"'),
        '–' | '—' | '―' => out.push('-'),
        _ => out.push(c),
    }
}

/// Splits on whitespace and punctuation. Empty tokens are dropped; order is
/// preserved.
pub fn tokenize(s: &str) -> Vec<String> {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .collect()
}

static STREET_SYNONYMS: Lazy<AHashSet<&'static str>> = Lazy::new(|| {
    [
        // en
        "street", "st", "road", "rd", "avenue", "ave", "av", "boulevard", "blvd", "lane", "ln",
        "drive", "dr", "way", "court", "ct", "place", "square", "sq", "highway", "hwy", "terrace",
        // fr
        "rue", "chaussee", "allee", "quai", "impasse",
        // es / it
        "calle", "carrera", "via", "viale", "corso",
        // de
        "strasse", "str", "gasse", "weg", "platz",
        // ru (transliterated)
        "ulitsa", "ul", "prospekt", "pr", "pereulok", "per", "ploshchad",
    ]
    .into_iter()
    .collect()
});

/// True for generic road-type words ("street", "rue", "strasse", ...).
/// Expects a normalized token.
pub fn is_street_synonym(token: &str) -> bool {
    STREET_SYNONYMS.contains(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_lowercases_and_folds() {
        assert_eq!(normalize("Île-de-France"), "ile-de-france");
        assert_eq!(normalize("Köln"), "koln");
        assert_eq!(normalize("Weißenburg"), "weissenburg");
        assert_eq!(normalize("Œuvre d’art"), "oeuvre d'art");
        assert_eq!(normalize("São Paulo"), "sao paulo");
    }

    #[test]
    fn normalize_keeps_plain_ascii() {
        assert_eq!(normalize("rue de rivoli 12"), "rue de rivoli 12");
    }

    #[test]
    fn tokenize_splits_on_punctuation_and_whitespace() {
        assert_eq!(tokenize("rue, de   rivoli"), ["rue", "de", "rivoli"]);
        assert_eq!(tokenize("ile-de-france"), ["ile", "de", "france"]);
        assert_eq!(tokenize("  "), Vec::<String>::new());
        assert_eq!(tokenize(""), Vec::<String>::new());
    }

    #[test]
    fn tokenize_preserves_order() {
        assert_eq!(tokenize("1 rue de rivoli"), ["1", "rue", "de", "rivoli"]);
    }

    #[test]
    fn street_synonyms() {
        for tok in ["street", "st", "rue", "strasse", "ulitsa", "ave"] {
            assert!(is_street_synonym(tok), "{tok} should be a street synonym");
        }
        for tok in ["paris", "rivoli", "12", ""] {
            assert!(!is_street_synonym(tok), "{tok} is not a street synonym");
        }
    }
}
