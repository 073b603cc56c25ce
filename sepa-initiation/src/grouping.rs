//! Payment information grouping
//!
//! Transactions that share execution semantics are rendered into one
//! `PmtInf` block. The partition is stable:
//!
//! ```text
//! transactions:  t1(A)  t2(B)  t3(B)  t4(A)
//! groups:        A = [t1, t4]
//!                B = [t2, t3]
//! ```
//!
//! Groups appear in the order their key is first seen and members keep their
//! insertion order. Nothing is sorted.

use crate::{
    transaction::Transaction,
    types::{LocalInstrument, SequenceType, ServiceLevel},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Variant specific part of the grouping key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Discriminator {
    /// Credit transfers split by service level
    CreditTransfer {
        /// Service level
        service_level: Option<ServiceLevel>,
    },
    /// Direct debits split by scheme and sequence position
    DirectDebit {
        /// Local instrument
        local_instrument: LocalInstrument,
        /// Sequence type
        sequence_type: SequenceType,
    },
}

/// Attributes shared by every transaction of one payment information block
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey {
    /// Requested execution or collection date
    pub requested_date: NaiveDate,

    /// Batch booking flag
    pub batch_booking: bool,

    /// Currency code
    pub currency: String,

    /// Variant specific attributes
    pub discriminator: Discriminator,
}

impl GroupKey {
    /// Key of `transaction`
    pub fn of(transaction: &Transaction) -> Self {
        let details = transaction.details();
        let discriminator = match transaction {
            Transaction::CreditTransfer(tx) => Discriminator::CreditTransfer {
                service_level: tx.service_level,
            },
            Transaction::DirectDebit(tx) => Discriminator::DirectDebit {
                local_instrument: tx.local_instrument,
                sequence_type: tx.sequence_type,
            },
        };

        Self {
            requested_date: details.requested_date,
            batch_booking: details.batch_booking,
            currency: details.currency.clone(),
            discriminator,
        }
    }
}

/// One payment information block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentGroup<'a> {
    /// Shared attributes
    pub key: GroupKey,

    /// Members in insertion order
    pub transactions: Vec<&'a Transaction>,
}

impl<'a> PaymentGroup<'a> {
    /// Number of transactions
    pub fn count(&self) -> usize {
        self.transactions.len()
    }

    /// Sum of amounts
    pub fn control_sum(&self) -> Decimal {
        control_sum(self.transactions.iter().copied())
    }
}

/// Sum of amounts of `transactions`
pub fn control_sum<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Decimal {
    transactions.into_iter().map(Transaction::amount).sum()
}

/// Partition `transactions` into groups in first-occurrence order
pub fn group(transactions: &[Transaction]) -> Vec<PaymentGroup<'_>> {
    let mut groups: Vec<PaymentGroup<'_>> = Vec::new();
    let mut index_by_key: HashMap<GroupKey, usize> = HashMap::new();

    for transaction in transactions {
        let key = GroupKey::of(transaction);
        match index_by_key.get(&key) {
            Some(&index) => groups[index].transactions.push(transaction),
            None => {
                index_by_key.insert(key.clone(), groups.len());
                groups.push(PaymentGroup {
                    key,
                    transactions: vec![transaction],
                });
            }
        }
    }

    groups
}
