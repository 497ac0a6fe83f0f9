//! The single ATM account and the balance arithmetic behind it.
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::bank::{
    Ledger, Transaction, TransactionType,
    types::{Money, format_money},
};

/// Represents the bank account behind the ATM.
#[derive(Debug)]
pub struct Account {
    /// The PIN callers must present to open a session.
    pin: String,

    /// The available balance. Never negative.
    balance: Money,

    /// Every deposit and withdrawal applied to `balance`.
    ledger: Ledger,
}

impl Account {
    /// Creates the account with its PIN and opening balance.
    pub fn new(pin: impl Into<String>, opening_balance: Money) -> Self {
        debug_assert!(opening_balance >= 0, "opening balance must not be negative");
        Account {
            pin: pin.into(),
            balance: opening_balance,
            ledger: Ledger::new(),
        }
    }

    /// Exact comparison of a candidate PIN against the stored one.
    pub fn verify_pin(&self, candidate: &str) -> bool {
        self.pin == candidate
    }

    pub fn balance(&self) -> Money {
        self.balance
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Deposits the specified amount and records it. Returns the new balance.
    pub fn deposit(&mut self, amount: Money, at: DateTime<Utc>) -> Result<Money, TransactionError> {
        check_positive(amount)?;
        let balance = self
            .balance
            .checked_add(amount)
            .ok_or(TransactionError::InvalidAmount(AmountRejection::OutOfRange))?;

        self.balance = balance;
        self.ledger
            .append(Transaction::new(TransactionType::Deposit, amount, at));
        Ok(self.balance)
    }

    /// Withdraws the specified amount and records it. Returns an error if there
    /// are insufficient funds, in which case nothing changes.
    pub fn withdraw(&mut self, amount: Money, at: DateTime<Utc>) -> Result<Money, TransactionError> {
        check_positive(amount)?;
        if amount > self.balance {
            return Err(TransactionError::InsufficientFunds {
                requested: amount,
                available: self.balance,
            });
        }

        self.balance -= amount;
        self.ledger
            .append(Transaction::new(TransactionType::Withdrawal, amount, at));
        Ok(self.balance)
    }
}

fn check_positive(amount: Money) -> Result<(), TransactionError> {
    if amount <= 0 {
        Err(TransactionError::InvalidAmount(AmountRejection::NotPositive))
    } else {
        Ok(())
    }
}

/// Why an amount was refused.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountRejection {
    #[error("amount is not a number")]
    NotANumber,
    #[error("amount must be greater than zero")]
    NotPositive,
    #[error("amount is smaller than the smallest unit of 0.0001")]
    BelowPrecision,
    #[error("amount is too large")]
    OutOfRange,
}

/// Errors that can occur during transaction processing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(AmountRejection),
    #[error(
        "Insufficient funds for transaction: requested {}, available {}",
        format_money(*requested),
        format_money(*available)
    )]
    InsufficientFunds { requested: Money, available: Money },
}
