//! Payment initiation message
//!
//! A [`Message`] collects validated transactions for one initiating account
//! and renders them into a `pain.001` or `pain.008` document.
//!
//! Transactions are checked when added and rejected as a whole on any field
//! error, so the collection only ever holds valid entries. Rendering checks
//! everything again (a requested date may have passed since), picks a schema,
//! groups and serializes. It never mutates the message; equal state renders
//! equal documents.

use crate::{
    account::Account,
    builder,
    config::Config,
    error::{Error, Result, SchemaIncompatibility, ValidationErrors},
    grouping::{self, PaymentGroup},
    schema::{self, Schema},
    transaction::Transaction,
    types,
    validation::{self, MAX_IDENTIFIER_LENGTH},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of payment initiation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    /// SEPA credit transfer, `pain.001`
    CreditTransfer,
    /// SEPA direct debit, `pain.008`
    DirectDebit,
}

impl MessageKind {
    /// Payment method code of every payment information block
    pub fn payment_method(&self) -> &'static str {
        match self {
            MessageKind::CreditTransfer => "TRF",
            MessageKind::DirectDebit => "DD",
        }
    }

    /// Element directly below `Document`
    pub fn root_tag(&self) -> &'static str {
        match self {
            MessageKind::CreditTransfer => "CstmrCdtTrfInitn",
            MessageKind::DirectDebit => "CstmrDrctDbtInitn",
        }
    }

    /// `true` when `transaction` is the variant this kind carries
    pub fn accepts(&self, transaction: &Transaction) -> bool {
        matches!(
            (self, transaction),
            (MessageKind::CreditTransfer, Transaction::CreditTransfer(_))
                | (MessageKind::DirectDebit, Transaction::DirectDebit(_))
        )
    }

    fn describe(&self) -> &'static str {
        match self {
            MessageKind::CreditTransfer => "credit transfer",
            MessageKind::DirectDebit => "direct debit",
        }
    }
}

/// Payment initiation message
#[derive(Debug, Clone)]
pub struct Message {
    kind: MessageKind,
    account: Account,
    transactions: Vec<Transaction>,
    message_identification: String,
    creation_date_time: DateTime<Utc>,
    config: Config,
}

impl Message {
    /// Create empty credit transfer message, `account` is the debtor
    pub fn credit_transfer(account: Account) -> Self {
        Self::build(MessageKind::CreditTransfer, account, Config::default())
    }

    /// Create empty direct debit message, `account` is the creditor
    pub fn direct_debit(account: Account) -> Self {
        Self::build(MessageKind::DirectDebit, account, Config::default())
    }

    /// Create empty message with explicit configuration
    pub fn with_config(kind: MessageKind, account: Account, config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(kind, account, config))
    }

    fn build(kind: MessageKind, account: Account, config: Config) -> Self {
        let message_identification: String =
            format!("{}/{}", config.message_id_prefix, Uuid::new_v4().simple())
                .chars()
                .take(MAX_IDENTIFIER_LENGTH)
                .collect();

        Self {
            kind,
            account,
            transactions: Vec::new(),
            message_identification,
            creation_date_time: Utc::now(),
            config,
        }
    }

    /// Message kind
    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    /// Initiating account
    pub fn account(&self) -> &Account {
        &self.account
    }

    /// Accepted transactions in insertion order
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Builder configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Message identification (`GrpHdr/MsgId`)
    pub fn message_identification(&self) -> &str {
        &self.message_identification
    }

    /// Replace the generated message identification
    pub fn set_message_identification(&mut self, identification: impl Into<String>) -> Result<()> {
        let identification = identification.into();
        let mut errors = ValidationErrors::new();
        validation::check_identifier(&mut errors, "message_identification", &identification);
        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }
        self.message_identification = identification;
        Ok(())
    }

    /// Creation timestamp (`GrpHdr/CreDtTm`)
    pub fn creation_date_time(&self) -> DateTime<Utc> {
        self.creation_date_time
    }

    /// Replace the creation timestamp
    pub fn set_creation_date_time(&mut self, timestamp: DateTime<Utc>) {
        self.creation_date_time = timestamp;
    }

    /// Validate and append a transaction
    ///
    /// On error the message is unchanged and every invalid field is reported.
    pub fn add_transaction(&mut self, transaction: impl Into<Transaction>) -> Result<()> {
        let transaction = transaction.into();

        if !self.kind.accepts(&transaction) {
            let mut errors = ValidationErrors::new();
            errors.add(
                "transaction",
                format!("can't be added to a {} message", self.kind.describe()),
            );
            return Err(Error::Validation(errors));
        }

        let errors = transaction.validate(types::today());
        if !errors.is_empty() {
            tracing::debug!(
                message = %self.message_identification,
                errors = %errors,
                "Transaction rejected"
            );
            return Err(Error::Validation(errors));
        }

        self.transactions.push(transaction);
        tracing::debug!(
            message = %self.message_identification,
            count = self.transactions.len(),
            "Transaction added"
        );
        Ok(())
    }

    /// Check account and every transaction, collecting all errors
    pub fn validate(&self) -> Result<()> {
        let today = types::today();
        let mut errors = ValidationErrors::new();

        let account_errors = match self.kind {
            MessageKind::CreditTransfer => self.account.validate(),
            MessageKind::DirectDebit => self.account.validate_as_creditor(),
        };
        errors.merge("account", account_errors);

        if self.transactions.is_empty() {
            errors.add("transactions", "can't be empty");
        }
        for (index, transaction) in self.transactions.iter().enumerate() {
            errors.merge(&format!("transactions[{}]", index), transaction.validate(today));
        }

        errors.into_result().map_err(Error::from)
    }

    /// Most preferred schema every transaction is compatible with
    pub fn select_schema(&self) -> Result<&'static Schema> {
        schema::select(self.kind, &self.transactions).map_err(Error::from)
    }

    /// `true` when every transaction is compatible with schema `id`
    pub fn is_schema_compatible(&self, id: &str) -> bool {
        schema::find(self.kind, id).map_or(false, |s| s.check(&self.transactions).is_ok())
    }

    /// Transactions partitioned into payment information blocks
    pub fn payment_groups(&self) -> Vec<PaymentGroup<'_>> {
        grouping::group(&self.transactions)
    }

    /// Sum of all transaction amounts
    pub fn control_sum(&self) -> Decimal {
        grouping::control_sum(&self.transactions)
    }

    /// Render with the most preferred compatible schema
    pub fn render(&self) -> Result<String> {
        self.validate()?;
        let schema = self.select_schema()?;
        self.render_document(schema)
    }

    /// Render with schema `id`
    pub fn render_with_schema(&self, id: &str) -> Result<String> {
        let schema = schema::find(self.kind, id).ok_or_else(|| Error::UnknownSchema(id.to_string()))?;
        self.validate()?;
        schema
            .check(&self.transactions)
            .map_err(|rejection| SchemaIncompatibility {
                rejections: vec![rejection],
            })?;
        self.render_document(schema)
    }

    fn render_document(&self, schema: &'static Schema) -> Result<String> {
        let document = builder::build(self, schema)?;
        let xml = builder::to_xml(&document, &self.config)?;

        tracing::info!(
            message = %self.message_identification,
            schema = schema.id,
            transactions = self.transactions.len(),
            groups = self.payment_groups().len(),
            "Rendered payment initiation"
        );
        Ok(xml)
    }
}
