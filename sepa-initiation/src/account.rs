//! Initiating party account

use crate::{
    error::ValidationErrors,
    text,
    validation::{self, check_bic, check_iban},
};
use serde::{Deserialize, Serialize};

/// Account of the party initiating the message
///
/// Debtor of a credit transfer, creditor of a direct debit. Direct debits
/// additionally need the SEPA creditor identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account holder name
    pub name: String,

    /// ISO 3166 country of the postal address
    pub country: Option<String>,

    /// First postal address line
    pub address_line1: Option<String>,

    /// Second postal address line
    pub address_line2: Option<String>,

    /// Account IBAN
    pub iban: String,

    /// BIC of the servicing bank
    pub bic: Option<String>,

    /// SEPA creditor identifier, required for direct debits
    pub creditor_identifier: Option<String>,
}

impl Account {
    /// Create new account
    pub fn new(name: impl Into<String>, iban: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            country: None,
            address_line1: None,
            address_line2: None,
            iban: iban.into(),
            bic: None,
            creditor_identifier: None,
        }
    }

    /// Set BIC
    pub fn with_bic(mut self, bic: impl Into<String>) -> Self {
        self.bic = Some(bic.into());
        self
    }

    /// Set creditor identifier
    pub fn with_creditor_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.creditor_identifier = Some(identifier.into());
        self
    }

    /// Set postal address
    pub fn with_address(
        mut self,
        country: impl Into<String>,
        line1: impl Into<String>,
        line2: Option<String>,
    ) -> Self {
        self.country = Some(country.into());
        self.address_line1 = Some(line1.into());
        self.address_line2 = line2;
        self
    }

    /// Check fields required of every initiating account
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();

        if text::name(&self.name).is_empty() {
            errors.add("name", "can't be blank");
        }
        check_iban(&mut errors, "iban", &self.iban);
        check_bic(&mut errors, "bic", self.bic.as_deref());

        if let Some(country) = &self.country {
            if !validation::is_valid_country(country) {
                errors.add("country", format!("is not an ISO 3166 country code: {}", country));
            }
        }

        errors
    }

    /// Check fields required of a direct debit creditor
    pub fn validate_as_creditor(&self) -> ValidationErrors {
        let mut errors = self.validate();

        match self.creditor_identifier.as_deref() {
            None | Some("") => errors.add("creditor_identifier", "can't be blank"),
            Some(identifier) if !validation::is_valid_creditor_identifier(identifier) => {
                errors.add(
                    "creditor_identifier",
                    format!("is not a valid creditor identifier: {}", identifier),
                );
            }
            Some(_) => {}
        }

        errors
    }

    /// Sanitized address lines that carry content
    pub fn address_lines(&self) -> Vec<String> {
        [self.address_line1.as_deref(), self.address_line2.as_deref()]
            .into_iter()
            .filter_map(text::address_line)
            .collect()
    }
}
