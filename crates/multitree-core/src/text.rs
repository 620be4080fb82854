//! Text folding helpers shared by the code normalizer and the Glottolog
//! name index.

use deunicode::deunicode_char;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Encoding artifacts that leak into MultiTree display names.
///
/// The source export double-decoded a closing curly quote, leaving the
/// Mac Roman rendering of its UTF-8 bytes behind.
const NAME_ARTIFACTS: &[&str] = &["\u{201a}\u{c4}\u{f9}"];

/// Fold a string to its closest ASCII equivalent.
///
/// Characters are decomposed (NFKD) and combining marks are dropped.
/// Whatever is still outside ASCII is transliterated with `deunicode`,
/// so letters of non-Latin scripts survive as romanizations. Characters
/// with no known romanization are removed.
///
/// # Examples
///
/// ```
/// use multitree_core::text::transliterate;
///
/// assert_eq!(transliterate("Mbya Guaraní"), "Mbya Guarani");
/// assert_eq!(transliterate("Sørlandsk"), "Sorlandsk");
/// assert_eq!(transliterate("ελλ"), "ell");
/// ```
pub fn transliterate(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.nfkd() {
        if c.is_ascii() {
            out.push(c);
        } else if is_combining_mark(c) {
            continue;
        } else if let Some(ascii) = deunicode_char(c) {
            out.push_str(ascii);
        }
    }
    out
}

/// Strip known encoding artifacts and surrounding whitespace from a
/// display name.
pub fn clean_name(name: &str) -> String {
    let mut cleaned = name.to_string();
    for artifact in NAME_ARTIFACTS {
        cleaned = cleaned.replace(artifact, "");
    }
    cleaned.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transliterate_ascii_is_unchanged() {
        assert_eq!(transliterate("abc_DEF-1"), "abc_DEF-1");
    }

    #[test]
    fn test_transliterate_strips_diacritics() {
        assert_eq!(transliterate("Tiếng Việt"), "Tieng Viet");
        assert_eq!(transliterate("Ñandeva"), "Nandeva");
    }

    #[test]
    fn test_transliterate_special_letters() {
        assert_eq!(transliterate("Straße"), "Strasse");
        assert_eq!(transliterate("Łemko"), "Lemko");
        assert_eq!(transliterate("Færøsk"), "Faerosk");
    }

    #[test]
    fn test_transliterate_compatibility_forms() {
        assert_eq!(transliterate("ﬁx"), "fix");
        assert_eq!(transliterate("Ａｂ"), "Ab");
    }

    #[test]
    fn test_transliterate_non_latin_scripts() {
        assert_eq!(transliterate("ελλ"), "ell");

        let russian = transliterate("Русский");
        let chinese = transliterate("中文");
        assert!(russian.starts_with("Russk"));
        assert!(!chinese.trim().is_empty());
        assert!(chinese.is_ascii());
        assert_ne!(russian, chinese);
    }

    #[test]
    fn test_clean_name_removes_artifact() {
        assert_eq!(clean_name("Yoruba\u{201a}\u{c4}\u{f9}"), "Yoruba");
        assert_eq!(clean_name("  Hausa "), "Hausa");
    }

    #[test]
    fn test_clean_name_can_become_empty() {
        assert_eq!(clean_name("\u{201a}\u{c4}\u{f9}"), "");
    }
}
