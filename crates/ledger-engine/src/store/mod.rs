//! In-memory durable store: customer, account and transaction tables plus
//! the per-account locking used by every balance-changing unit of work.

mod locks;
mod unit_of_work;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard};

use chrono::{DateTime, Utc};

use crate::error::{LedgerError, LedgerResult};
use crate::model::{Account, AccountId, AccountType, Customer, CustomerId, TransactionId};
use crate::transaction::{NewTransaction, Transaction};
use crate::validation::Ssn;

use locks::AccountLocks;
pub use unit_of_work::UnitOfWork;

#[derive(Debug, Default)]
struct CustomerTable {
    rows: BTreeMap<CustomerId, Customer>,
    ssns: HashSet<Ssn>,
    last_id: CustomerId,
}

#[derive(Debug, Clone)]
struct AccountRow {
    id: AccountId,
    account_type: AccountType,
    customer_id: CustomerId,
    date_created: DateTime<Utc>,
    date_updated: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct AccountTable {
    rows: BTreeMap<AccountId, AccountRow>,
    by_customer: HashMap<CustomerId, Vec<AccountId>>,
    last_id: AccountId,
}

#[derive(Debug, Default)]
struct TransactionTable {
    rows: BTreeMap<TransactionId, Transaction>,
    by_account: HashMap<AccountId, Vec<TransactionId>>,
    current: HashMap<AccountId, TransactionId>,
    last_id: TransactionId,
}

impl TransactionTable {
    fn current_id(&self, account_id: AccountId) -> Option<TransactionId> {
        self.current.get(&account_id).copied()
    }

    fn append(
        &mut self,
        previous: Option<TransactionId>,
        draft: NewTransaction,
        now: DateTime<Utc>,
    ) -> Transaction {
        if let Some(row) = previous.and_then(|id| self.rows.get_mut(&id)) {
            row.is_current = false;
        }
        self.last_id += 1;
        let transaction = draft.into_transaction(self.last_id, now);
        self.by_account
            .entry(transaction.account_id)
            .or_default()
            .push(transaction.id);
        self.current.insert(transaction.account_id, transaction.id);
        self.rows.insert(transaction.id, transaction.clone());
        transaction
    }
}

#[derive(Debug, Default)]
pub struct LedgerStore {
    customers: RwLock<CustomerTable>,
    accounts: RwLock<AccountTable>,
    transactions: RwLock<TransactionTable>,
    locks: AccountLocks,
}

fn read<'a, T>(lock: &'a RwLock<T>, what: &str) -> LedgerResult<RwLockReadGuard<'a, T>> {
    lock.read().map_err(|_| LedgerError::lock_poisoned(what))
}

impl LedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a customer unless another one already holds `ssn`.
    pub fn insert_customer(&self, name: String, ssn: Ssn) -> LedgerResult<Customer> {
        let mut table = self
            .customers
            .write()
            .map_err(|_| LedgerError::lock_poisoned("customer table"))?;
        if !table.ssns.insert(ssn) {
            return Err(LedgerError::CustomerExistsWithSsn);
        }
        table.last_id += 1;
        let now = Utc::now();
        let customer = Customer {
            id: table.last_id,
            name,
            ssn,
            date_created: now,
            date_updated: now,
        };
        table.rows.insert(customer.id, customer.clone());
        Ok(customer)
    }

    pub fn customer(&self, customer_id: CustomerId) -> LedgerResult<Option<Customer>> {
        Ok(read(&self.customers, "customer table")?
            .rows
            .get(&customer_id)
            .cloned())
    }

    pub fn customers(&self) -> LedgerResult<Vec<Customer>> {
        Ok(read(&self.customers, "customer table")?
            .rows
            .values()
            .cloned()
            .collect())
    }

    /// Inserts an account for an existing customer.
    pub fn insert_account(
        &self,
        customer_id: CustomerId,
        account_type: AccountType,
    ) -> LedgerResult<Account> {
        // customers are never deleted, so the owner cannot vanish after this read
        let customer = self
            .customer(customer_id)?
            .ok_or(LedgerError::CustomerNotFound(customer_id))?;

        let mut table = self
            .accounts
            .write()
            .map_err(|_| LedgerError::lock_poisoned("account table"))?;
        table.last_id += 1;
        let now = Utc::now();
        let row = AccountRow {
            id: table.last_id,
            account_type,
            customer_id,
            date_created: now,
            date_updated: now,
        };
        table.by_customer.entry(customer_id).or_default().push(row.id);
        table.rows.insert(row.id, row.clone());
        drop(table);

        Ok(Self::join(row, customer))
    }

    pub fn account_exists(&self, account_id: AccountId) -> LedgerResult<bool> {
        Ok(read(&self.accounts, "account table")?
            .rows
            .contains_key(&account_id))
    }

    /// Account joined with its owning customer.
    pub fn account(&self, account_id: AccountId) -> LedgerResult<Option<Account>> {
        let row = read(&self.accounts, "account table")?
            .rows
            .get(&account_id)
            .cloned();
        row.map(|row| self.join_owner(row)).transpose()
    }

    pub fn accounts_for_customer(&self, customer_id: CustomerId) -> LedgerResult<Vec<Account>> {
        let rows: Vec<AccountRow> = {
            let table = read(&self.accounts, "account table")?;
            table
                .by_customer
                .get(&customer_id)
                .into_iter()
                .flatten()
                .filter_map(|id| table.rows.get(id).cloned())
                .collect()
        };
        rows.into_iter().map(|row| self.join_owner(row)).collect()
    }

    pub fn account_ids(&self) -> LedgerResult<Vec<AccountId>> {
        Ok(read(&self.accounts, "account table")?
            .rows
            .keys()
            .copied()
            .collect())
    }

    fn join_owner(&self, row: AccountRow) -> LedgerResult<Account> {
        let customer = self
            .customer(row.customer_id)?
            .ok_or(LedgerError::AccountHasNoCustomer(row.id))?;
        Ok(Self::join(row, customer))
    }

    fn join(row: AccountRow, customer: Customer) -> Account {
        Account {
            id: row.id,
            account_type: row.account_type,
            customer,
            date_created: row.date_created,
            date_updated: row.date_updated,
        }
    }

    pub fn transaction(&self, transaction_id: TransactionId) -> LedgerResult<Option<Transaction>> {
        Ok(read(&self.transactions, "transaction table")?
            .rows
            .get(&transaction_id)
            .cloned())
    }

    /// Every transaction of an account, oldest first.
    pub fn transactions_for_account(
        &self,
        account_id: AccountId,
    ) -> LedgerResult<Vec<Transaction>> {
        let table = read(&self.transactions, "transaction table")?;
        Ok(table
            .by_account
            .get(&account_id)
            .into_iter()
            .flatten()
            .filter_map(|id| table.rows.get(id).cloned())
            .collect())
    }

    /// The single row flagged current for the account, if any.
    pub fn current_transaction(&self, account_id: AccountId) -> LedgerResult<Option<Transaction>> {
        let table = read(&self.transactions, "transaction table")?;
        Ok(table
            .current_id(account_id)
            .and_then(|id| table.rows.get(&id).cloned()))
    }

    /// Runs `work` as one atomic unit over `accounts`.
    ///
    /// The account locks are taken in ascending id order and held until the
    /// commit or rollback finished. If `work` fails nothing it staged is
    /// written.
    pub fn unit_of_work<F>(&self, accounts: &[AccountId], work: F) -> LedgerResult<Vec<Transaction>>
    where
        F: FnOnce(&mut UnitOfWork<'_>) -> LedgerResult<()>,
    {
        let locks = self.locks.ordered(accounts);
        // the guarded value is (), a panic elsewhere leaves nothing half-written behind it
        let _held: Vec<_> = locks
            .iter()
            .map(|lock| lock.lock().unwrap_or_else(PoisonError::into_inner))
            .collect();

        let mut uow = UnitOfWork::begin(self, accounts);
        match work(&mut uow) {
            Ok(()) => uow.commit(),
            Err(err) => {
                uow.rollback();
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::transaction::TransactionType;

    fn store_with_account() -> (LedgerStore, Account) {
        let store = LedgerStore::new();
        let customer = store
            .insert_customer("Ada".to_owned(), Ssn::try_from(123_45_6789).unwrap())
            .unwrap();
        let account = store
            .insert_account(customer.id, AccountType::Checking)
            .unwrap();
        (store, account)
    }

    fn deposit(account: &Account, amount: Decimal, previous: Decimal) -> NewTransaction {
        NewTransaction::chained(
            account.id,
            account.customer_id(),
            TransactionType::Deposit,
            amount,
            previous,
            None,
        )
        .unwrap()
    }

    #[test]
    fn duplicate_ssn_is_rejected() {
        let (store, _) = store_with_account();
        let err = store
            .insert_customer("Bob".to_owned(), Ssn::try_from(123_45_6789).unwrap())
            .unwrap_err();
        assert!(matches!(err, LedgerError::CustomerExistsWithSsn));
        assert_eq!(store.customers().unwrap().len(), 1);
    }

    #[test]
    fn account_requires_existing_customer() {
        let store = LedgerStore::new();
        let err = store.insert_account(5, AccountType::Savings).unwrap_err();
        assert!(matches!(err, LedgerError::CustomerNotFound(5)));
    }

    #[test]
    fn account_is_joined_with_owner() {
        let (store, account) = store_with_account();
        let loaded = store.account(account.id).unwrap().unwrap();
        assert_eq!(loaded.customer.name, "Ada");
        assert_eq!(store.accounts_for_customer(loaded.customer_id()).unwrap().len(), 1);
        assert!(store.account(99).unwrap().is_none());
    }

    #[test]
    fn commit_demotes_previous_current() {
        let (store, account) = store_with_account();
        store
            .unit_of_work(&[account.id], |uow| {
                uow.supersede(None, deposit(&account, dec!(10), Decimal::ZERO))
            })
            .unwrap();
        let first = store.current_transaction(account.id).unwrap().unwrap();

        let committed = store
            .unit_of_work(&[account.id], |uow| {
                let previous = uow.current(account.id)?;
                uow.supersede(previous.as_ref(), deposit(&account, dec!(5), dec!(10)))
            })
            .unwrap();

        assert_eq!(committed.len(), 1);
        assert!(committed[0].id > first.id);
        assert!(!store.transaction(first.id).unwrap().unwrap().is_current);
        let current = store.current_transaction(account.id).unwrap().unwrap();
        assert_eq!(current.current_balance, dec!(15));
        assert_eq!(store.transactions_for_account(account.id).unwrap().len(), 2);
    }

    #[test]
    fn stale_read_fails_whole_commit() {
        let (store, account) = store_with_account();
        store
            .unit_of_work(&[account.id], |uow| {
                uow.supersede(None, deposit(&account, dec!(10), Decimal::ZERO))
            })
            .unwrap();

        // stage as if the account had no current row
        let mut uow = UnitOfWork::begin(&store, &[account.id]);
        uow.supersede(None, deposit(&account, dec!(1), Decimal::ZERO))
            .unwrap();
        let err = uow.commit().unwrap_err();

        assert!(matches!(err, LedgerError::ConcurrentModification { .. }));
        assert_eq!(store.transactions_for_account(account.id).unwrap().len(), 1);
        let current = store.current_transaction(account.id).unwrap().unwrap();
        assert_eq!(current.current_balance, dec!(10));
    }

    #[test]
    fn failed_work_writes_nothing() {
        let (store, account) = store_with_account();
        let err = store
            .unit_of_work(&[account.id], |uow| {
                uow.supersede(None, deposit(&account, dec!(10), Decimal::ZERO))?;
                Err(LedgerError::InsufficientFunds {
                    account_id: account.id,
                })
            })
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientFunds { .. }));
        assert!(store.current_transaction(account.id).unwrap().is_none());
    }

    #[test]
    fn unit_of_work_is_scoped() {
        let (store, account) = store_with_account();
        let err = store
            .unit_of_work(&[account.id], |uow| uow.current(account.id + 1).map(drop))
            .unwrap_err();
        assert!(matches!(err, LedgerError::Storage(_)));

        let err = store
            .unit_of_work(&[account.id], |uow| {
                uow.supersede(None, deposit(&account, dec!(1), Decimal::ZERO))?;
                uow.supersede(None, deposit(&account, dec!(1), Decimal::ZERO))
            })
            .unwrap_err();
        assert!(matches!(err, LedgerError::Storage(_)));
        assert!(store.current_transaction(account.id).unwrap().is_none());
    }
}
