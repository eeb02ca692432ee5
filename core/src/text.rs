//! Text cleanup and cheap lexical vectors.

/// Lowercase, replace every run of non-letters with a single space, trim.
///
/// # Example
/// ```
/// use granite_core::text::clean_text;
///
/// assert_eq!(clean_text("  The lazy, LAZY dog!! 42 "), "the lazy lazy dog");
/// ```
pub fn clean_text(text: &str) -> String {
    let lowered = crate::utils::normalize(text).to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut pending_space = false;
    for ch in lowered.chars() {
        if ch.is_alphabetic() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(ch);
        } else {
            pending_space = true;
        }
    }
    out
}

/// Width of the ASCII vectors.
pub const ASCII_WIDTH: usize = 128;

/// Occurrence count of each ASCII character. Non-ASCII characters are ignored.
pub fn ascii_frequency_vector(text: &str) -> Vec<f64> {
    let mut v = vec![0.0; ASCII_WIDTH];
    for b in text.bytes().filter(u8::is_ascii) {
        v[b as usize] += 1.0;
    }
    v
}

/// Sum of 1-based positions at which each ASCII character occurs, so that
/// strings with the same letters in a different order still differ.
pub fn ascii_position_vector(text: &str) -> Vec<f64> {
    let mut v = vec![0.0; ASCII_WIDTH];
    for (i, b) in text.bytes().enumerate() {
        if b.is_ascii() {
            v[b as usize] += (i + 1) as f64;
        }
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probability::cosine;

    #[test]
    fn clean_text_collapses_separators() {
        assert_eq!(clean_text("a--b__c"), "a b c");
        assert_eq!(clean_text("!!!"), "");
        assert_eq!(clean_text(""), "");
        assert_eq!(clean_text("Ünïcode wörds"), "ünïcode wörds");
    }

    #[test]
    fn frequency_vector_counts_letters() {
        let v = ascii_frequency_vector("abba");
        assert_eq!(v[b'a' as usize], 2.0);
        assert_eq!(v[b'b' as usize], 2.0);
        assert_eq!(v.iter().sum::<f64>(), 4.0);
    }

    #[test]
    fn anagrams_match_on_frequency_but_not_position() {
        let f = cosine(&ascii_frequency_vector("listen"), &ascii_frequency_vector("silent"));
        assert!((f - 1.0).abs() < 1e-12);
        let p = cosine(&ascii_position_vector("listen"), &ascii_position_vector("silent"));
        assert!(p < 1.0);
    }
}
