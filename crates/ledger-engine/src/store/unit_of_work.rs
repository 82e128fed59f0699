use chrono::Utc;
use tracing::debug;

use crate::error::{LedgerError, LedgerResult};
use crate::model::{AccountId, TransactionId};
use crate::transaction::{NewTransaction, Transaction};

use super::LedgerStore;

#[derive(Debug)]
struct Staged {
    expected_current: Option<TransactionId>,
    draft: NewTransaction,
}

/// Atomic group of demotions and inserts scoped to a fixed set of accounts.
///
/// Nothing touches the tables until [`UnitOfWork::commit`]. Dropping a unit
/// of work without committing discards everything staged in it.
#[derive(Debug)]
pub struct UnitOfWork<'s> {
    store: &'s LedgerStore,
    scope: Vec<AccountId>,
    staged: Vec<Staged>,
}

impl<'s> UnitOfWork<'s> {
    pub(crate) fn begin(store: &'s LedgerStore, scope: &[AccountId]) -> Self {
        Self {
            store,
            scope: scope.to_vec(),
            staged: Vec::with_capacity(scope.len()),
        }
    }

    /// Current transaction of an account inside the scope.
    pub fn current(&self, account_id: AccountId) -> LedgerResult<Option<Transaction>> {
        self.ensure_in_scope(account_id)?;
        self.store.current_transaction(account_id)
    }

    /// Stages `draft` as the new current row of its account, replacing `previous`.
    ///
    /// `previous` must be what [`UnitOfWork::current`] returned for the same
    /// account; commit refuses to apply if it is no longer current.
    pub fn supersede(
        &mut self,
        previous: Option<&Transaction>,
        draft: NewTransaction,
    ) -> LedgerResult<()> {
        let account_id = draft.account_id;
        self.ensure_in_scope(account_id)?;
        if let Some(previous) = previous {
            if previous.account_id != account_id || !previous.is_current {
                return Err(LedgerError::Storage(format!(
                    "transaction {} is not the current row of account {account_id}",
                    previous.id
                )));
            }
        }
        if self.staged.iter().any(|s| s.draft.account_id == account_id) {
            return Err(LedgerError::Storage(format!(
                "account {account_id} already has a staged row in this unit of work"
            )));
        }
        self.staged.push(Staged {
            expected_current: previous.map(|tx| tx.id),
            draft,
        });
        Ok(())
    }

    /// Applies every staged row at once, in staging order.
    pub fn commit(self) -> LedgerResult<Vec<Transaction>> {
        let store = self.store;
        let mut table = store
            .transactions
            .write()
            .map_err(|_| LedgerError::lock_poisoned("transaction table"))?;

        for staged in &self.staged {
            let account_id = staged.draft.account_id;
            if table.current_id(account_id) != staged.expected_current {
                return Err(LedgerError::ConcurrentModification { account_id });
            }
        }

        let now = Utc::now();
        let committed: Vec<Transaction> = self
            .staged
            .into_iter()
            .map(|staged| table.append(staged.expected_current, staged.draft, now))
            .collect();
        debug!(rows = committed.len(), "unit of work committed");
        Ok(committed)
    }

    pub fn rollback(self) {
        debug!(rows = self.staged.len(), "unit of work rolled back");
    }

    fn ensure_in_scope(&self, account_id: AccountId) -> LedgerResult<()> {
        if self.scope.contains(&account_id) {
            Ok(())
        } else {
            Err(LedgerError::Storage(format!(
                "account {account_id} is outside the unit of work"
            )))
        }
    }
}
