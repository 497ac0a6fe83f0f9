//! Transaction module for the entries recorded against the account.
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::bank::types::{Money, serialize_money};

/// Enum representing the type of transaction.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionType {
    Deposit,
    Withdrawal,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionType::Deposit => f.write_str("Deposit"),
            TransactionType::Withdrawal => f.write_str("Withdrawal"),
        }
    }
}

/// Represents a completed transaction. Never modified after creation.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Transaction {
    /// The type of transaction (Deposit or Withdrawal).
    #[serde(rename = "type")]
    tx_type: TransactionType,

    /// The amount moved, always positive.
    #[serde(serialize_with = "serialize_money")]
    amount: Money,

    /// When the balance change happened.
    #[serde(rename = "date")]
    timestamp: DateTime<Utc>,
}

impl Transaction {
    pub(crate) fn new(tx_type: TransactionType, amount: Money, timestamp: DateTime<Utc>) -> Self {
        Transaction {
            tx_type,
            amount,
            timestamp,
        }
    }

    /// Gets the type of the transaction.
    pub fn get_type(&self) -> TransactionType {
        self.tx_type
    }

    /// Gets the amount of the transaction.
    pub fn get_amount(&self) -> Money {
        self.amount
    }

    /// Gets the time the transaction was recorded.
    pub fn get_timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
