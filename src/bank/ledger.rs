//! Append-only record of the account's transactions.
use std::slice;

use crate::bank::Transaction;

/// Transactions in the order they were applied.
#[derive(Debug, Default)]
pub struct Ledger {
    entries: Vec<Transaction>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a transaction after every existing entry.
    pub(crate) fn append(&mut self, transaction: Transaction) {
        self.entries.push(transaction);
    }

    /// Iterates over every entry, oldest first. The iterator can be cloned to
    /// walk the ledger again.
    pub fn all(&self) -> slice::Iter<'_, Transaction> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
