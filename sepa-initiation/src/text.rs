//! Free-text normalization
//!
//! Names, address lines and remittance text are rewritten into the SEPA
//! character set before they reach the document:
//!
//! 1. After NFC composition, German umlauts and sharp s become their
//!    two-letter forms (`ö` -> `oe`)
//! 2. Remaining diacritics are folded by canonical decomposition (`é` -> `e`)
//! 3. Characters outside the SEPA set are dropped (`&`, `!`, ...)
//! 4. The result is trimmed and cut to the field's maximum length

use crate::validation::is_sepa_char;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Maximum length of party names
pub const MAX_NAME_LENGTH: usize = 70;

/// Maximum length of a postal address line
pub const MAX_ADDRESS_LINE_LENGTH: usize = 70;

/// Maximum length of unstructured remittance information
pub const MAX_REMITTANCE_LENGTH: usize = 140;

fn transliterate(c: char) -> Option<&'static str> {
    let replacement = match c {
        'ä' => "ae",
        'ö' => "oe",
        'ü' => "ue",
        'Ä' => "Ae",
        'Ö' => "Oe",
        'Ü' => "Ue",
        'ß' => "ss",
        'æ' => "ae",
        'Æ' => "AE",
        'ø' => "o",
        'Ø' => "O",
        'œ' => "oe",
        'Œ' => "OE",
        'ł' => "l",
        'Ł' => "L",
        'đ' => "d",
        'Đ' => "D",
        '€' => "E",
        _ => return None,
    };
    Some(replacement)
}

/// Rewrite `text` into the SEPA character set without length limit
pub fn convert(text: &str) -> String {
    // Compose first so `u` + U+0308 is transliterated like `ü`
    let mut expanded = String::with_capacity(text.len());
    for c in text.nfc() {
        match transliterate(c) {
            Some(replacement) => expanded.push_str(replacement),
            None => expanded.push(c),
        }
    }

    let converted: String = expanded
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .filter(|c| is_sepa_char(*c))
        .collect();

    converted.trim().to_string()
}

/// Rewrite `text` into the SEPA character set and cut it to `max_length` characters
pub fn sanitize(text: &str, max_length: usize) -> String {
    let converted = convert(text);
    if converted.chars().count() <= max_length {
        return converted;
    }
    let truncated: String = converted.chars().take(max_length).collect();
    truncated.trim_end().to_string()
}

/// Sanitized party name
pub fn name(text: &str) -> String {
    sanitize(text, MAX_NAME_LENGTH)
}

/// Sanitized address line, `None` when nothing printable remains
pub fn address_line(text: Option<&str>) -> Option<String> {
    text.map(|line| sanitize(line, MAX_ADDRESS_LINE_LENGTH))
        .filter(|line| !line.is_empty())
}

/// Sanitized unstructured remittance information
pub fn remittance(text: &str) -> String {
    sanitize(text, MAX_REMITTANCE_LENGTH)
}
