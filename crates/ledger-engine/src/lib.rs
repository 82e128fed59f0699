pub mod accounts;
pub mod balance;
pub mod customers;
pub mod engine;
pub mod error;
pub mod lookup;
pub mod model;
pub mod request;
pub mod store;
pub mod transaction;
pub mod validation;

use std::sync::Arc;

use accounts::AccountService;
use customers::CustomerService;
use engine::TransactionEngine;
use store::LedgerStore;

pub use error::{ErrorCategory, LedgerError, LedgerResult, TransactionKey};

/// Customer, account and transaction services sharing one store.
///
/// Cloning is cheap and every clone sees the same data, so a ledger can be
/// handed to as many threads as needed.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    store: Arc<LedgerStore>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn customers(&self) -> CustomerService {
        CustomerService::new(Arc::clone(&self.store))
    }

    pub fn accounts(&self) -> AccountService {
        AccountService::new(Arc::clone(&self.store))
    }

    pub fn transactions(&self) -> TransactionEngine {
        TransactionEngine::new(Arc::clone(&self.store))
    }

    pub fn store(&self) -> &LedgerStore {
        &self.store
    }
}
