use std::sync::Arc;

use tracing::warn;

use crate::balance::BalanceResolver;
use crate::error::{LedgerError, LedgerResult};
use crate::lookup::AccountLookup;
use crate::model::{Account, AccountId, AccountView, CustomerId};
use crate::request::CreateAccount;
use crate::store::LedgerStore;
use crate::validation::Validate;

#[derive(Debug, Clone)]
pub struct AccountService {
    store: Arc<LedgerStore>,
}

impl AccountService {
    pub const fn new(store: Arc<LedgerStore>) -> Self {
        Self { store }
    }

    pub fn create(&self, request: CreateAccount) -> LedgerResult<Account> {
        request.validate().map_err(LedgerError::Validation)?;
        self.store
            .insert_account(request.customer_id, request.account_type)
            .inspect_err(|err| warn!("Account rejected: {err}"))
    }

    pub fn exists(&self, account_id: AccountId) -> LedgerResult<bool> {
        self.store.exists(account_id)
    }

    pub fn find_by_id(&self, account_id: AccountId) -> LedgerResult<AccountView> {
        let account = self.store.find_by_id(account_id)?;
        self.view(account)
    }

    /// All accounts of a customer with their balances.
    pub fn find_by_customer(&self, customer_id: CustomerId) -> LedgerResult<Vec<AccountView>> {
        if self.store.customer(customer_id)?.is_none() {
            return Err(LedgerError::CustomerNotFound(customer_id));
        }
        let accounts = self.store.accounts_for_customer(customer_id)?;
        if accounts.is_empty() {
            return Err(LedgerError::NoAccountsForCustomer(customer_id));
        }
        accounts.into_iter().map(|account| self.view(account)).collect()
    }

    /// Every account in id order, with balances.
    pub fn find_all(&self) -> LedgerResult<Vec<AccountView>> {
        self.store
            .account_ids()?
            .into_iter()
            .map(|id| self.find_by_id(id))
            .collect()
    }

    fn view(&self, account: Account) -> LedgerResult<AccountView> {
        let balance = self.store.current_balance(account.id)?;
        Ok(AccountView { account, balance })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;
    use crate::model::AccountType;
    use crate::validation::Ssn;
    use rust_decimal::Decimal;

    #[test]
    fn accounts_are_listed_per_customer() {
        let store = Arc::new(LedgerStore::new());
        let service = AccountService::new(Arc::clone(&store));
        let owner = store
            .insert_customer("Ada".to_owned(), Ssn::try_from(123_45_6789).unwrap())
            .unwrap();

        let err = service.find_by_customer(owner.id).unwrap_err();
        assert!(matches!(err, LedgerError::NoAccountsForCustomer(id) if id == owner.id));
        assert_eq!(err.category(), ErrorCategory::NotFound);
        assert!(matches!(
            service.find_by_customer(owner.id + 1),
            Err(LedgerError::CustomerNotFound(_))
        ));

        let account = service
            .create(CreateAccount {
                customer_id: owner.id,
                account_type: AccountType::Savings,
            })
            .unwrap();
        let views = service.find_by_customer(owner.id).unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].account, account);
        assert_eq!(views[0].balance, Decimal::ZERO);
        assert_eq!(service.find_all().unwrap(), views);
        assert!(service.exists(account.id).unwrap());
    }

    #[test]
    fn create_rejects_unknown_customer() {
        let service = AccountService::new(Arc::new(LedgerStore::new()));
        let err = service
            .create(CreateAccount {
                customer_id: 8,
                account_type: AccountType::Checking,
            })
            .unwrap_err();
        assert!(matches!(err, LedgerError::CustomerNotFound(8)));

        let err = service
            .create(CreateAccount {
                customer_id: 0,
                account_type: AccountType::Checking,
            })
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }
}
