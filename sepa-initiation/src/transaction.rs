//! Transaction variants
//!
//! A [`Transaction`] is either a credit transfer or a direct debit. Both share
//! [`TransactionDetails`]; each variant adds its own fields.

use crate::{
    error::ValidationErrors,
    text,
    types::{self, LocalInstrument, SequenceType, ServiceLevel, DEFAULT_CURRENCY, NOT_PROVIDED},
    validation::{self, check_bic, check_iban, check_identifier},
};
use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fields shared by every transaction variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDetails {
    /// Counterparty name
    pub name: String,

    /// Counterparty IBAN
    pub iban: String,

    /// Counterparty bank BIC
    pub bic: Option<String>,

    /// Amount, positive with at most two decimals
    pub amount: Decimal,

    /// ISO 4217 currency code
    pub currency: String,

    /// Instruction identification, only meaningful to the initiating party
    pub instruction_id: Option<String>,

    /// End-to-end reference passed on to the counterparty
    pub reference: String,

    /// Requested execution (transfer) or collection (debit) date
    pub requested_date: NaiveDate,

    /// Ask the bank for a single booking per payment information block
    pub batch_booking: bool,

    /// Unstructured remittance text
    pub remittance_information: Option<String>,

    /// Structured creditor reference (ISO 11649)
    pub creditor_reference: Option<String>,

    /// First counterparty address line
    pub address_line1: Option<String>,

    /// Second counterparty address line
    pub address_line2: Option<String>,
}

impl TransactionDetails {
    fn new(name: String, iban: String, amount: Decimal, requested_date: NaiveDate) -> Self {
        Self {
            name,
            iban,
            bic: None,
            amount,
            currency: DEFAULT_CURRENCY.to_string(),
            instruction_id: None,
            reference: NOT_PROVIDED.to_string(),
            requested_date,
            batch_booking: true,
            remittance_information: None,
            creditor_reference: None,
            address_line1: None,
            address_line2: None,
        }
    }

    /// Check shared fields, collecting every failure
    pub fn validate(&self, today: NaiveDate) -> ValidationErrors {
        let mut errors = ValidationErrors::new();

        if text::name(&self.name).is_empty() {
            errors.add("name", "can't be blank");
        }
        check_iban(&mut errors, "iban", &self.iban);
        check_bic(&mut errors, "bic", self.bic.as_deref());

        if self.amount <= Decimal::ZERO {
            errors.add("amount", "must be greater than 0");
        } else if self.amount.normalize().scale() > 2 {
            errors.add("amount", format!("has more than two decimals: {}", self.amount));
        } else if self.amount > types::max_amount() {
            errors.add(
                "amount",
                format!("exceeds limit {}", types::format_amount(types::max_amount())),
            );
        }

        if !validation::is_valid_currency(&self.currency) {
            errors.add("currency", format!("is not an ISO 4217 code: {}", self.currency));
        }

        if let Some(instruction_id) = &self.instruction_id {
            check_identifier(&mut errors, "instruction_id", instruction_id);
        }
        check_identifier(&mut errors, "reference", &self.reference);

        if self.requested_date < today {
            errors.add("requested_date", "is in the past");
        }

        match (&self.remittance_information, &self.creditor_reference) {
            (Some(_), Some(_)) => {
                errors.add(
                    "creditor_reference",
                    "can't be combined with remittance_information",
                );
            }
            (Some(remittance), None) => {
                if text::remittance(remittance).is_empty() {
                    errors.add("remittance_information", "can't be blank");
                }
            }
            (None, Some(reference)) => {
                check_identifier(&mut errors, "creditor_reference", reference);
            }
            (None, None) => {}
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

macro_rules! detail_setters {
    ($ty:ty) => {
        impl $ty {
            /// Set counterparty BIC
            pub fn with_bic(mut self, bic: impl Into<String>) -> Self {
                self.details.bic = Some(bic.into());
                self
            }

            /// Set currency
            pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
                self.details.currency = currency.into();
                self
            }

            /// Set instruction identification
            pub fn with_instruction_id(mut self, instruction_id: impl Into<String>) -> Self {
                self.details.instruction_id = Some(instruction_id.into());
                self
            }

            /// Set end-to-end reference
            pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
                self.details.reference = reference.into();
                self
            }

            /// Set requested date
            pub fn with_requested_date(mut self, date: NaiveDate) -> Self {
                self.details.requested_date = date;
                self
            }

            /// Set batch booking flag
            pub fn with_batch_booking(mut self, batch_booking: bool) -> Self {
                self.details.batch_booking = batch_booking;
                self
            }

            /// Set unstructured remittance text
            pub fn with_remittance_information(mut self, text: impl Into<String>) -> Self {
                self.details.remittance_information = Some(text.into());
                self
            }

            /// Set structured creditor reference
            pub fn with_creditor_reference(mut self, reference: impl Into<String>) -> Self {
                self.details.creditor_reference = Some(reference.into());
                self
            }

            /// Set counterparty address lines
            pub fn with_address_lines(
                mut self,
                line1: impl Into<String>,
                line2: Option<String>,
            ) -> Self {
                self.details.address_line1 = Some(line1.into());
                self.details.address_line2 = line2;
                self
            }
        }
    };
}

/// Outgoing payment to a creditor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditTransferTransaction {
    /// Shared fields, counterparty is the creditor
    pub details: TransactionDetails,

    /// Service level, absent for non-SEPA transfers
    pub service_level: Option<ServiceLevel>,
}

impl CreditTransferTransaction {
    /// Create new transfer, executed today unless a date is set
    pub fn new(name: impl Into<String>, iban: impl Into<String>, amount: Decimal) -> Self {
        Self {
            details: TransactionDetails::new(name.into(), iban.into(), amount, types::today()),
            service_level: None,
        }
    }

    /// Set service level
    pub fn with_service_level(mut self, service_level: ServiceLevel) -> Self {
        self.service_level = Some(service_level);
        self
    }

    /// Check all fields
    pub fn validate(&self, today: NaiveDate) -> ValidationErrors {
        self.details.validate(today)
    }
}

detail_setters!(CreditTransferTransaction);

/// Collection from a debtor under a mandate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectDebitTransaction {
    /// Shared fields, counterparty is the debtor
    pub details: TransactionDetails,

    /// Mandate reference
    pub mandate_id: String,

    /// Date the debtor signed the mandate
    pub mandate_date_of_signature: NaiveDate,

    /// Scheme variant
    pub local_instrument: LocalInstrument,

    /// Position in the mandate's series of collections
    pub sequence_type: SequenceType,
}

impl DirectDebitTransaction {
    /// Create new collection, due tomorrow unless a date is set
    pub fn new(
        name: impl Into<String>,
        iban: impl Into<String>,
        amount: Decimal,
        mandate_id: impl Into<String>,
        mandate_date_of_signature: NaiveDate,
    ) -> Self {
        let today = types::today();
        let tomorrow = today.checked_add_days(Days::new(1)).unwrap_or(today);
        Self {
            details: TransactionDetails::new(name.into(), iban.into(), amount, tomorrow),
            mandate_id: mandate_id.into(),
            mandate_date_of_signature,
            local_instrument: LocalInstrument::default(),
            sequence_type: SequenceType::default(),
        }
    }

    /// Set local instrument
    pub fn with_local_instrument(mut self, local_instrument: LocalInstrument) -> Self {
        self.local_instrument = local_instrument;
        self
    }

    /// Set sequence type
    pub fn with_sequence_type(mut self, sequence_type: SequenceType) -> Self {
        self.sequence_type = sequence_type;
        self
    }

    /// Check all fields
    pub fn validate(&self, today: NaiveDate) -> ValidationErrors {
        let mut errors = self.details.validate(today);

        check_identifier(&mut errors, "mandate_id", &self.mandate_id);
        if self.mandate_date_of_signature > today {
            errors.add("mandate_date_of_signature", "is in the future");
        }

        errors
    }
}

detail_setters!(DirectDebitTransaction);

/// Transaction of either message kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transaction {
    /// Credit transfer
    CreditTransfer(CreditTransferTransaction),
    /// Direct debit
    DirectDebit(DirectDebitTransaction),
}

impl Transaction {
    /// Shared fields
    pub fn details(&self) -> &TransactionDetails {
        match self {
            Transaction::CreditTransfer(tx) => &tx.details,
            Transaction::DirectDebit(tx) => &tx.details,
        }
    }

    /// Check all fields of the variant
    pub fn validate(&self, today: NaiveDate) -> ValidationErrors {
        match self {
            Transaction::CreditTransfer(tx) => tx.validate(today),
            Transaction::DirectDebit(tx) => tx.validate(today),
        }
    }

    /// Amount
    pub fn amount(&self) -> Decimal {
        self.details().amount
    }
}

impl From<CreditTransferTransaction> for Transaction {
    fn from(tx: CreditTransferTransaction) -> Self {
        Transaction::CreditTransfer(tx)
    }
}

impl From<DirectDebitTransaction> for Transaction {
    fn from(tx: DirectDebitTransaction) -> Self {
        Transaction::DirectDebit(tx)
    }
}
