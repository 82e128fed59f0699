use std::sync::{Arc, Mutex};

use dashmap::DashMap;

use crate::model::AccountId;

/// One mutex per account, created on first use and never removed.
#[derive(Debug, Default)]
pub(crate) struct AccountLocks {
    locks: DashMap<AccountId, Arc<Mutex<()>>>,
}

impl AccountLocks {
    /// Locks for `accounts`, deduplicated and in ascending id order.
    ///
    /// Every caller acquiring more than one lock must go through here so
    /// two transfers in opposite directions cannot deadlock.
    pub(crate) fn ordered(&self, accounts: &[AccountId]) -> Vec<Arc<Mutex<()>>> {
        let mut ids = accounts.to_vec();
        ids.sort_unstable();
        ids.dedup();
        ids.into_iter()
            .map(|id| Arc::clone(self.locks.entry(id).or_default().value()))
            .collect()
    }
}
