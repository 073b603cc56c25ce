//! Field validation
//!
//! Format checks shared by accounts and transactions:
//! - BIC (ISO 9362)
//! - IBAN (ISO 13616, mod-97 checksum)
//! - SEPA creditor identifier (mod-97 checksum over the national part)
//! - SEPA character set and identifier lengths

use crate::error::ValidationErrors;
use once_cell::sync::Lazy;
use regex::Regex;

/// Longest identifier accepted in `InstrId`, `EndToEndId`, `MndtId` and `Ref`
pub const MAX_IDENTIFIER_LENGTH: usize = 35;

static BIC_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{6}[A-Z2-9][A-NP-Z0-9]([A-Z0-9]{3})?$").expect("valid BIC pattern"));

static IBAN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{2}[0-9]{2}[A-Z0-9]{11,30}$").expect("valid IBAN pattern"));

static CREDITOR_IDENTIFIER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z]{2}[0-9]{2}[A-Za-z0-9+?/:().,'-]{3}[A-Za-z0-9+?/:().,'-]{1,28}$")
        .expect("valid creditor identifier pattern")
});

static CURRENCY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{3}$").expect("valid currency pattern"));

static COUNTRY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{2}$").expect("valid country pattern"));

/// Characters permitted in SEPA free text and identifiers
pub fn is_sepa_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '/' | '-' | '?' | ':' | '(' | ')' | '.' | ',' | '\'' | '+' | ' ')
}

/// `true` when every character is in the SEPA character set
pub fn is_sepa_text(text: &str) -> bool {
    text.chars().all(is_sepa_char)
}

/// BIC format: 4 letters (institution) + 2 letters (country) + 2 alphanumeric (location) + optional 3 alphanumeric (branch)
pub fn is_valid_bic(bic: &str) -> bool {
    BIC_REGEX.is_match(bic)
}

/// IBAN format and checksum
pub fn is_valid_iban(iban: &str) -> bool {
    IBAN_REGEX.is_match(iban) && mod97(&format!("{}{}", &iban[4..], &iban[..4])) == Some(1)
}

/// SEPA creditor identifier format and checksum
///
/// Layout is country (2), check digits (2), creditor business code (3, not
/// covered by the checksum) and the national identifier.
pub fn is_valid_creditor_identifier(identifier: &str) -> bool {
    if !CREDITOR_IDENTIFIER_REGEX.is_match(identifier) {
        return false;
    }
    let national = &identifier[7..];
    mod97(&format!("{}{}", national, &identifier[..4])) == Some(1)
}

/// ISO 4217 alpha-3 shape
pub fn is_valid_currency(currency: &str) -> bool {
    CURRENCY_REGEX.is_match(currency)
}

/// ISO 3166 alpha-2 shape
pub fn is_valid_country(country: &str) -> bool {
    COUNTRY_REGEX.is_match(country)
}

/// Remainder of the base-36 expansion of `value` modulo 97
///
/// Letters expand to 10..=35; anything else yields `None`.
fn mod97(value: &str) -> Option<u32> {
    let mut remainder: u32 = 0;
    for c in value.chars() {
        let digit = c.to_digit(36)?;
        remainder = if digit < 10 {
            (remainder * 10 + digit) % 97
        } else {
            (remainder * 100 + digit) % 97
        };
    }
    Some(remainder)
}

/// Record an error unless `value` is a 1-35 character SEPA identifier
pub fn check_identifier(errors: &mut ValidationErrors, field: &str, value: &str) {
    let length = value.chars().count();
    if length == 0 {
        errors.add(field, "can't be blank");
    } else if length > MAX_IDENTIFIER_LENGTH {
        errors.add(
            field,
            format!("is too long ({} characters, max {})", length, MAX_IDENTIFIER_LENGTH),
        );
    } else if !is_sepa_text(value) {
        errors.add(field, "contains characters outside the SEPA character set");
    }
}

/// Record an error unless `iban` is valid
pub fn check_iban(errors: &mut ValidationErrors, field: &str, iban: &str) {
    if iban.is_empty() {
        errors.add(field, "can't be blank");
    } else if !is_valid_iban(iban) {
        errors.add(field, format!("is not a valid IBAN: {}", iban));
    }
}

/// Record an error when a present `bic` is malformed
pub fn check_bic(errors: &mut ValidationErrors, field: &str, bic: Option<&str>) {
    if let Some(bic) = bic {
        if !is_valid_bic(bic) {
            errors.add(field, format!("is not a valid BIC: {}", bic));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bic_validation() {
        assert!(is_valid_bic("BANKDEFFXXX"));
        assert!(is_valid_bic("SPUEDE2UXXX"));
        assert!(is_valid_bic("GENODEF1JEV"));
        assert!(is_valid_bic("DEUTDEFF"));
        assert!(!is_valid_bic("INVALID"));
        assert!(!is_valid_bic("CHAS"));
        assert!(!is_valid_bic("deutdeff"));
        assert!(!is_valid_bic("DEUTDEFF1"));
    }

    #[test]
    fn test_iban_validation() {
        assert!(is_valid_iban("DE87200500001234567890"));
        assert!(is_valid_iban("DE21500500009876543210"));
        assert!(is_valid_iban("AT611904300234573201"));
        assert!(is_valid_iban("CH9300762011623852957"));
        // Checksum mismatch
        assert!(!is_valid_iban("DE87200500001234567891"));
        // Lowercase and spaces are not normalized here
        assert!(!is_valid_iban("de87200500001234567890"));
        assert!(!is_valid_iban("DE87 2005 0000 1234 5678 90"));
        assert!(!is_valid_iban("DE87"));
    }

    #[test]
    fn test_creditor_identifier_validation() {
        assert!(is_valid_creditor_identifier("DE98ZZZ09999999999"));
        assert!(!is_valid_creditor_identifier("DE99ZZZ09999999999"));
        assert!(!is_valid_creditor_identifier("DE98ZZZ"));
        assert!(!is_valid_creditor_identifier("not an identifier"));
    }

    #[test]
    fn test_sepa_text() {
        assert!(is_sepa_text("XYZ/2013-08-ABO/12345"));
        assert!(is_sepa_text("Rechnung (1), Teil 2: 10.08.2013 + 'Zusatz'?"));
        assert!(!is_sepa_text("Zahlemann & Söhne"));
        assert!(!is_sepa_text("Einkauf!"));
    }

    #[test]
    fn test_check_identifier() {
        let mut errors = ValidationErrors::new();
        check_identifier(&mut errors, "reference", "");
        check_identifier(&mut errors, "instruction_id", &"X".repeat(36));
        check_identifier(&mut errors, "mandate_id", "K-02&2011");
        check_identifier(&mut errors, "reference", "OK-123");
        assert_eq!(errors.len(), 3);
        assert!(errors.contains_field("instruction_id"));
        assert!(errors.contains_field("mandate_id"));
    }
}
