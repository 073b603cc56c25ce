//! SEPA payment initiation
//!
//! Builds ISO 20022 customer payment initiation documents: SEPA credit
//! transfers (`pain.001`) and SEPA direct debits (`pain.008`).
//!
//! # Pipeline
//!
//! A [`Message`] owns the initiating [`Account`] and an ordered list of
//! transactions. Rendering runs four stages:
//!
//! 1. **Validation**: account and every transaction are checked, all field
//!    errors are collected
//! 2. **Schema selection**: the first known schema version that every
//!    transaction satisfies is picked
//! 3. **Grouping**: transactions are partitioned into payment information
//!    blocks in first-occurrence order
//! 4. **Serialization**: the document is assembled and written as XML
//!
//! # Example
//!
//! ```no_run
//! use chrono::Local;
//! use rust_decimal::Decimal;
//! use sepa_initiation::{Account, CreditTransferTransaction, Message};
//!
//! fn main() -> sepa_initiation::Result<()> {
//!     let account = Account::new("Schuldner GmbH", "DE87200500001234567890")
//!         .with_bic("BANKDEFFXXX");
//!     let mut message = Message::credit_transfer(account);
//!
//!     message.add_transaction(
//!         CreditTransferTransaction::new(
//!             "Telekomiker AG",
//!             "DE37112589611964645802",
//!             Decimal::new(10242, 2),
//!         )
//!         .with_bic("PBNKDEFF370")
//!         .with_remittance_information("Rechnung 123 vom 22.08.2013")
//!         .with_requested_date(Local::now().date_naive()),
//!     )?;
//!
//!     let xml = message.render()?;
//!     println!("{xml}");
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod account;
mod builder;
pub mod config;
pub mod conformance;
mod document;
pub mod error;
pub mod grouping;
pub mod message;
pub mod schema;
pub mod text;
pub mod transaction;
pub mod types;
pub mod validation;

// Re-exports
pub use account::Account;
pub use config::Config;
pub use error::{Error, Result, SchemaIncompatibility, ValidationError, ValidationErrors};
pub use grouping::{GroupKey, PaymentGroup};
pub use message::{Message, MessageKind};
pub use schema::{Requirement, Schema};
pub use transaction::{CreditTransferTransaction, DirectDebitTransaction, Transaction};
pub use types::{LocalInstrument, SequenceType, ServiceLevel};
