//! Schema registry
//!
//! Every wire format version is a static [`Schema`] whose compatibility rule
//! is a list of [`Requirement`]s. A transaction is compatible with a schema
//! when it meets every requirement; adding a version means adding a constant
//! and listing it in the preference order of its message kind.
//!
//! | schema            | requirements                               |
//! |-------------------|--------------------------------------------|
//! | `pain.001.003.03` | EUR                                        |
//! | `pain.001.002.03` | BIC, service level SEPA, EUR               |
//! | `pain.001.001.03` | BIC                                        |
//! | `pain.008.003.02` | EUR                                        |
//! | `pain.008.002.02` | BIC, EUR, local instrument CORE or B2B     |
//! | `pain.008.001.02` | BIC                                        |

use crate::{
    error::{SchemaIncompatibility, SchemaRejection},
    message::MessageKind,
    transaction::Transaction,
    types::{LocalInstrument, ServiceLevel},
};
use std::fmt;

/// Single condition a transaction must meet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Counterparty BIC present
    Bic,
    /// Currency equals the given code
    Currency(&'static str),
    /// Credit transfer carries the given service level
    ServiceLevel(ServiceLevel),
    /// Direct debit uses one of the given local instruments
    LocalInstrument(&'static [LocalInstrument]),
}

impl Requirement {
    /// `true` when `transaction` meets this requirement
    ///
    /// Variant specific requirements are met by the other variant.
    pub fn is_met_by(&self, transaction: &Transaction) -> bool {
        match (self, transaction) {
            (Requirement::Bic, tx) => tx.details().bic.as_deref().map_or(false, |b| !b.is_empty()),
            (Requirement::Currency(code), tx) => tx.details().currency == *code,
            (Requirement::ServiceLevel(level), Transaction::CreditTransfer(tx)) => {
                tx.service_level == Some(*level)
            }
            (Requirement::LocalInstrument(allowed), Transaction::DirectDebit(tx)) => {
                allowed.contains(&tx.local_instrument)
            }
            (Requirement::ServiceLevel(_), Transaction::DirectDebit(_))
            | (Requirement::LocalInstrument(_), Transaction::CreditTransfer(_)) => true,
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Bic => write!(f, "BIC"),
            Requirement::Currency(code) => write!(f, "currency {}", code),
            Requirement::ServiceLevel(level) => write!(f, "service level {}", level),
            Requirement::LocalInstrument(allowed) => {
                let codes: Vec<&str> = allowed.iter().map(|l| l.as_str()).collect();
                write!(f, "local instrument {}", codes.join(" or "))
            }
        }
    }
}

/// Versioned wire format
#[derive(Debug, PartialEq, Eq)]
pub struct Schema {
    /// Version identifier, e.g. `pain.001.003.03`
    pub id: &'static str,

    /// Message kind rendered by this version
    pub kind: MessageKind,

    /// Conditions every transaction must meet
    pub requirements: &'static [Requirement],
}

impl Schema {
    /// XML namespace of the document
    pub fn namespace(&self) -> String {
        format!("urn:iso:std:iso:20022:tech:xsd:{}", self.id)
    }

    /// Value of `xsi:schemaLocation`
    pub fn schema_location(&self) -> String {
        format!("{} {}.xsd", self.namespace(), self.id)
    }

    /// First requirement `transaction` does not meet
    pub fn unmet_requirement(&self, transaction: &Transaction) -> Option<Requirement> {
        self.requirements
            .iter()
            .find(|r| !r.is_met_by(transaction))
            .copied()
    }

    /// `true` when `transaction` meets every requirement
    pub fn is_compatible(&self, transaction: &Transaction) -> bool {
        self.unmet_requirement(transaction).is_none()
    }

    /// First violation across `transactions`, stopping at the first offending transaction
    pub fn check(&self, transactions: &[Transaction]) -> Result<(), SchemaRejection> {
        for (index, transaction) in transactions.iter().enumerate() {
            if let Some(requirement) = self.unmet_requirement(transaction) {
                return Err(SchemaRejection {
                    schema: self.id,
                    requirement,
                    transaction_index: index,
                });
            }
        }
        Ok(())
    }
}

/// German DK variant of the credit transfer initiation
pub static PAIN_001_003_03: Schema = Schema {
    id: "pain.001.003.03",
    kind: MessageKind::CreditTransfer,
    requirements: &[Requirement::Currency("EUR")],
};

/// EPC SEPA credit transfer initiation
pub static PAIN_001_002_03: Schema = Schema {
    id: "pain.001.002.03",
    kind: MessageKind::CreditTransfer,
    requirements: &[
        Requirement::Bic,
        Requirement::ServiceLevel(ServiceLevel::Sepa),
        Requirement::Currency("EUR"),
    ],
};

/// ISO 20022 base credit transfer initiation
pub static PAIN_001_001_03: Schema = Schema {
    id: "pain.001.001.03",
    kind: MessageKind::CreditTransfer,
    requirements: &[Requirement::Bic],
};

/// German DK variant of the direct debit initiation
pub static PAIN_008_003_02: Schema = Schema {
    id: "pain.008.003.02",
    kind: MessageKind::DirectDebit,
    requirements: &[Requirement::Currency("EUR")],
};

/// EPC SEPA direct debit initiation
pub static PAIN_008_002_02: Schema = Schema {
    id: "pain.008.002.02",
    kind: MessageKind::DirectDebit,
    requirements: &[
        Requirement::Bic,
        Requirement::Currency("EUR"),
        Requirement::LocalInstrument(&[LocalInstrument::Core, LocalInstrument::B2b]),
    ],
};

/// ISO 20022 base direct debit initiation
pub static PAIN_008_001_02: Schema = Schema {
    id: "pain.008.001.02",
    kind: MessageKind::DirectDebit,
    requirements: &[Requirement::Bic],
};

static CREDIT_TRANSFER_SCHEMAS: [&Schema; 3] = [&PAIN_001_003_03, &PAIN_001_002_03, &PAIN_001_001_03];

static DIRECT_DEBIT_SCHEMAS: [&Schema; 3] = [&PAIN_008_003_02, &PAIN_008_002_02, &PAIN_008_001_02];

/// Known schemas of `kind`, most preferred first
pub fn known_schemas(kind: MessageKind) -> &'static [&'static Schema] {
    match kind {
        MessageKind::CreditTransfer => &CREDIT_TRANSFER_SCHEMAS,
        MessageKind::DirectDebit => &DIRECT_DEBIT_SCHEMAS,
    }
}

/// Look up a schema of `kind` by identifier
pub fn find(kind: MessageKind, id: &str) -> Option<&'static Schema> {
    known_schemas(kind).iter().copied().find(|s| s.id == id)
}

/// First schema of `kind` compatible with every transaction
pub fn select(
    kind: MessageKind,
    transactions: &[Transaction],
) -> Result<&'static Schema, SchemaIncompatibility> {
    let mut rejections = Vec::new();

    for schema in known_schemas(kind) {
        match schema.check(transactions) {
            Ok(()) => return Ok(*schema),
            Err(rejection) => {
                tracing::debug!(
                    schema = schema.id,
                    requirement = %rejection.requirement,
                    transaction = rejection.transaction_index,
                    "Schema rejected"
                );
                rejections.push(rejection);
            }
        }
    }

    tracing::warn!(
        kind = ?kind,
        transactions = transactions.len(),
        "No known schema accepts the transactions"
    );
    Err(SchemaIncompatibility { rejections })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::{CreditTransferTransaction, DirectDebitTransaction};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn transfer(bic: Option<&str>) -> Transaction {
        let tx = CreditTransferTransaction::new("Telekomiker AG", "DE37112589611964645802", dec!(10));
        match bic {
            Some(bic) => tx.with_bic(bic).into(),
            None => tx.into(),
        }
    }

    fn debit() -> DirectDebitTransaction {
        DirectDebitTransaction::new(
            "Meier & Schulze oHG",
            "DE68210501700012345678",
            dec!(750),
            "K-08-2010-42123",
            NaiveDate::from_ymd_opt(2010, 7, 25).unwrap(),
        )
    }

    #[test]
    fn test_namespace() {
        assert_eq!(
            PAIN_001_003_03.namespace(),
            "urn:iso:std:iso:20022:tech:xsd:pain.001.003.03"
        );
        assert_eq!(
            PAIN_008_001_02.schema_location(),
            "urn:iso:std:iso:20022:tech:xsd:pain.008.001.02 pain.008.001.02.xsd"
        );
    }

    #[test]
    fn test_requirements() {
        assert!(!PAIN_001_001_03.is_compatible(&transfer(None)));
        assert!(PAIN_001_001_03.is_compatible(&transfer(Some("PBNKDEFF370"))));
        assert!(PAIN_001_003_03.is_compatible(&transfer(None)));

        // Service level is part of the EPC variant
        assert_eq!(
            PAIN_001_002_03.unmet_requirement(&transfer(Some("PBNKDEFF370"))),
            Some(Requirement::ServiceLevel(ServiceLevel::Sepa))
        );
    }

    #[test]
    fn test_select_prefers_first_compatible() {
        let txs = vec![transfer(None), transfer(Some("PBNKDEFF370"))];
        assert_eq!(select(MessageKind::CreditTransfer, &txs).unwrap().id, "pain.001.003.03");
    }

    #[test]
    fn test_select_falls_back_for_foreign_currency() {
        let chf: Transaction = CreditTransferTransaction::new("Bergbahn AG", "CH9300762011623852957", dec!(10))
            .with_bic("UBSWCHZH80A")
            .with_currency("CHF")
            .into();
        assert_eq!(select(MessageKind::CreditTransfer, &[chf]).unwrap().id, "pain.001.001.03");
    }

    #[test]
    fn test_select_reports_every_schema() {
        let chf_without_bic: Transaction =
            CreditTransferTransaction::new("Bergbahn AG", "CH9300762011623852957", dec!(10))
                .with_currency("CHF")
                .into();
        let txs = vec![transfer(Some("PBNKDEFF370")), chf_without_bic];

        let err = select(MessageKind::CreditTransfer, &txs).unwrap_err();
        assert_eq!(err.rejections.len(), 3);
        assert_eq!(err.rejections[0].requirement, Requirement::Currency("EUR"));
        assert_eq!(err.rejections[0].transaction_index, 1);
        assert_eq!(err.rejections[2].schema, "pain.001.001.03");
        assert_eq!(err.rejections[2].requirement, Requirement::Bic);
    }

    #[test]
    fn test_direct_debit_local_instrument() {
        let cor1: Transaction = debit()
            .with_bic("GENODEF1JEV")
            .with_local_instrument(LocalInstrument::Cor1)
            .into();
        assert!(!PAIN_008_002_02.is_compatible(&cor1));
        assert!(PAIN_008_003_02.is_compatible(&cor1));
        assert_eq!(
            Requirement::LocalInstrument(&[LocalInstrument::Core, LocalInstrument::B2b]).to_string(),
            "local instrument CORE or B2B"
        );
    }

    #[test]
    fn test_find() {
        assert!(find(MessageKind::DirectDebit, "pain.008.002.02").is_some());
        assert!(find(MessageKind::DirectDebit, "pain.001.001.03").is_none());
        assert!(find(MessageKind::CreditTransfer, "pain.999").is_none());
    }
}
