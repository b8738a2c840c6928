//! The data-source seam.
//!
//! The pipeline never reads files itself; it consumes whatever a
//! `TransactionSource` hands it. The CSV loader and the synthetic generator
//! in the runner implement this trait; tests use `InMemorySource`.

use crate::error::EvalResult;
use crate::record::{CustomerProfile, TransactionRecord};

pub trait TransactionSource {
    /// All purchase line items, in no particular order.
    fn transactions(&mut self) -> EvalResult<Vec<TransactionRecord>>;

    /// The customer-profile table. May be empty when the source has no
    /// behaviour file; only the segment breakdown needs it.
    fn customers(&mut self) -> EvalResult<Vec<CustomerProfile>>;
}

/// A source backed by vectors already in memory.
pub struct InMemorySource {
    pub transactions: Vec<TransactionRecord>,
    pub customers: Vec<CustomerProfile>,
}

impl InMemorySource {
    pub fn new(transactions: Vec<TransactionRecord>, customers: Vec<CustomerProfile>) -> Self {
        Self {
            transactions,
            customers,
        }
    }
}

impl TransactionSource for InMemorySource {
    fn transactions(&mut self) -> EvalResult<Vec<TransactionRecord>> {
        Ok(self.transactions.clone())
    }

    fn customers(&mut self) -> EvalResult<Vec<CustomerProfile>> {
        Ok(self.customers.clone())
    }
}
