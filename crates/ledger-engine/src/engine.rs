use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::balance::BalanceResolver;
use crate::error::{LedgerError, LedgerResult, TransactionKey};
use crate::lookup::AccountLookup;
use crate::model::{AccountId, CustomerId, TransactionId};
use crate::request::{CreateDeposit, CreateTransfer, CreateWithdrawal, TransactionRequest};
use crate::store::LedgerStore;
use crate::transaction::{NewTransaction, Transaction, TransactionType, TransferPair, TransferRole};
use crate::validation::Validate;

/// Main transaction processing engine
#[derive(Debug, Clone)]
pub struct TransactionEngine {
    store: Arc<LedgerStore>,
}

impl TransactionEngine {
    pub const fn new(store: Arc<LedgerStore>) -> Self {
        Self { store }
    }

    pub fn process(&self, request: TransactionRequest) -> LedgerResult<Vec<Transaction>> {
        match request {
            TransactionRequest::Deposit(request) => self.deposit(request).map(|tx| vec![tx]),
            TransactionRequest::Withdrawal(request) => self.withdraw(request).map(|tx| vec![tx]),
            TransactionRequest::Transfer(request) => {
                self.transfer(request).map(TransferPair::into_vec)
            }
        }
    }

    pub fn deposit(&self, request: CreateDeposit) -> LedgerResult<Transaction> {
        let account_id = request.account_id;
        self.process_deposit(request).inspect_err(|err| {
            warn!(account_id, "Deposit rejected: {err}");
        })
    }

    pub fn withdraw(&self, request: CreateWithdrawal) -> LedgerResult<Transaction> {
        let account_id = request.account_id;
        self.process_withdrawal(request).inspect_err(|err| {
            warn!(account_id, "Withdrawal rejected: {err}");
        })
    }

    pub fn transfer(&self, request: CreateTransfer) -> LedgerResult<TransferPair> {
        let source = request.source_account_id;
        let destination = request.destination_account_id;
        self.process_transfer(request).inspect_err(|err| {
            warn!(source, destination, "Transfer rejected: {err}");
        })
    }

    fn process_deposit(&self, request: CreateDeposit) -> LedgerResult<Transaction> {
        ensure_positive(request.amount)?;
        request.validate().map_err(LedgerError::Validation)?;

        let account = self
            .store
            .find_owned(request.account_id, request.customer_id)?;

        let committed = self.store.unit_of_work(&[account.id], |uow| {
            let previous = uow.current(account.id)?;
            let balance = previous
                .as_ref()
                .map_or(Decimal::ZERO, |tx| tx.current_balance);
            let deposit = NewTransaction::chained(
                account.id,
                account.customer_id(),
                TransactionType::Deposit,
                request.amount,
                balance,
                request.description.clone(),
            )?;
            uow.supersede(previous.as_ref(), deposit)
        })?;

        let deposit = single(committed)?;
        debug!(
            transaction_id = deposit.id,
            account_id = deposit.account_id,
            balance = %deposit.current_balance,
            "Deposit committed"
        );
        Ok(deposit)
    }

    fn process_withdrawal(&self, request: CreateWithdrawal) -> LedgerResult<Transaction> {
        ensure_positive(request.amount)?;
        request.validate().map_err(LedgerError::Validation)?;

        let account = self
            .store
            .find_owned(request.account_id, request.customer_id)?;

        let committed = self.store.unit_of_work(&[account.id], |uow| {
            let previous = uow.current(account.id)?;
            let balance = funded_balance(account.id, previous.as_ref(), request.amount)?;
            let withdrawal = NewTransaction::chained(
                account.id,
                account.customer_id(),
                TransactionType::Withdrawal,
                request.amount,
                balance,
                request.description.clone(),
            )?;
            uow.supersede(previous.as_ref(), withdrawal)
        })?;

        let withdrawal = single(committed)?;
        debug!(
            transaction_id = withdrawal.id,
            account_id = withdrawal.account_id,
            balance = %withdrawal.current_balance,
            "Withdrawal committed"
        );
        Ok(withdrawal)
    }

    fn process_transfer(&self, request: CreateTransfer) -> LedgerResult<TransferPair> {
        ensure_positive(request.amount)?;
        request.validate().map_err(LedgerError::Validation)?;

        let source = self
            .store
            .find_owned(request.source_account_id, request.customer_id)?;
        // the destination may belong to any customer
        let destination = self.store.find_by_id(request.destination_account_id)?;

        if source.id == destination.id {
            return Err(LedgerError::SourceEqualsDestination(source.id));
        }

        let committed = self
            .store
            .unit_of_work(&[source.id, destination.id], |uow| {
                let source_previous = uow.current(source.id)?;
                let source_balance =
                    funded_balance(source.id, source_previous.as_ref(), request.amount)?;

                let destination_previous = uow.current(destination.id)?;
                let destination_balance = destination_previous
                    .as_ref()
                    .map_or(Decimal::ZERO, |tx| tx.current_balance);

                let debit = NewTransaction::chained(
                    source.id,
                    source.customer_id(),
                    TransactionType::Transfer(TransferRole::Source),
                    request.amount,
                    source_balance,
                    request.description.clone(),
                )?;
                let credit = NewTransaction::chained(
                    destination.id,
                    destination.customer_id(),
                    TransactionType::Transfer(TransferRole::Destination),
                    request.amount,
                    destination_balance,
                    request.description.clone(),
                )?;
                uow.supersede(source_previous.as_ref(), debit)?;
                uow.supersede(destination_previous.as_ref(), credit)
            })?;

        // staged source first, commit keeps staging order
        let [source, destination] = <[Transaction; 2]>::try_from(committed).map_err(|rows| {
            LedgerError::Storage(format!("transfer committed {} rows", rows.len()))
        })?;
        debug!(
            source_id = source.id,
            destination_id = destination.id,
            amount = %destination.amount,
            "Transfer committed"
        );
        Ok(TransferPair {
            source,
            destination,
        })
    }

    pub fn find_by_id(&self, transaction_id: TransactionId) -> LedgerResult<Transaction> {
        self.store
            .transaction(transaction_id)?
            .ok_or(LedgerError::TransactionNotFound(TransactionKey::Id(transaction_id)))
    }

    /// Every transaction of the account, oldest first.
    pub fn find_all_for_account(&self, account_id: AccountId) -> LedgerResult<Vec<Transaction>> {
        if !self.store.exists(account_id)? {
            return Err(LedgerError::AccountNotFound(account_id));
        }
        let transactions = self.store.transactions_for_account(account_id)?;
        if transactions.is_empty() {
            return Err(LedgerError::TransactionNotFound(TransactionKey::Account(account_id)));
        }
        Ok(transactions)
    }

    /// A transaction looked up through the customer and account it must belong to.
    pub fn find_for_account(
        &self,
        customer_id: CustomerId,
        account_id: AccountId,
        transaction_id: TransactionId,
    ) -> LedgerResult<Transaction> {
        let transaction = self.find_by_id(transaction_id)?;
        if transaction.account_id != account_id {
            return Err(LedgerError::TransactionDoesNotBelongToAccount {
                transaction_id,
                account_id,
            });
        }
        if transaction.customer_id != customer_id {
            return Err(LedgerError::TransactionDoesNotBelongToCustomer {
                transaction_id,
                customer_id,
            });
        }
        Ok(transaction)
    }

    pub fn current_balance(&self, account_id: AccountId) -> LedgerResult<Decimal> {
        self.store.current_balance(account_id)
    }
}

fn ensure_positive(amount: Decimal) -> LedgerResult<()> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::InvalidAmount { amount });
    }
    Ok(())
}

/// Balance before a debit of `amount`, if the debit leaves it strictly positive.
fn funded_balance(
    account_id: AccountId,
    previous: Option<&Transaction>,
    amount: Decimal,
) -> LedgerResult<Decimal> {
    let Some(tx) = previous else {
        return Err(LedgerError::InsufficientFunds { account_id });
    };
    match tx.current_balance.checked_sub(amount) {
        Some(remaining) if remaining > Decimal::ZERO => Ok(tx.current_balance),
        Some(_) => Err(LedgerError::InsufficientFunds { account_id }),
        None => Err(LedgerError::BalanceOverflow { account_id }),
    }
}

fn single(mut committed: Vec<Transaction>) -> LedgerResult<Transaction> {
    match (committed.pop(), committed.is_empty()) {
        (Some(tx), true) => Ok(tx),
        _ => Err(LedgerError::Storage(
            "expected exactly one committed row".to_owned(),
        )),
    }
}
