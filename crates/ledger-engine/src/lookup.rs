use crate::error::{LedgerError, LedgerResult};
use crate::model::{Account, AccountId, CustomerId};
use crate::store::LedgerStore;

/// Resolves the accounts a transaction request refers to
pub trait AccountLookup {
    fn exists(&self, account_id: AccountId) -> LedgerResult<bool>;

    /// The account with its owning customer embedded.
    fn find_by_id(&self, account_id: AccountId) -> LedgerResult<Account>;

    /// Like [`AccountLookup::find_by_id`], but also requires `customer_id` to own it.
    fn find_owned(&self, account_id: AccountId, customer_id: CustomerId) -> LedgerResult<Account> {
        let account = self.find_by_id(account_id)?;
        if account.customer_id() == customer_id {
            Ok(account)
        } else {
            Err(LedgerError::OwnershipMismatch {
                account_id,
                customer_id,
            })
        }
    }
}

impl AccountLookup for LedgerStore {
    fn exists(&self, account_id: AccountId) -> LedgerResult<bool> {
        self.account_exists(account_id)
    }

    fn find_by_id(&self, account_id: AccountId) -> LedgerResult<Account> {
        self.account(account_id)?
            .ok_or(LedgerError::AccountNotFound(account_id))
    }
}
