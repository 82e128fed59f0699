use rust_decimal::Decimal;

use crate::error::LedgerResult;
use crate::model::AccountId;
use crate::store::LedgerStore;

/// Current balance of an account, read from its current transaction.
///
/// An account without transactions has a balance of exactly zero. History
/// is never summed.
pub trait BalanceResolver {
    fn current_balance(&self, account_id: AccountId) -> LedgerResult<Decimal>;
}

impl BalanceResolver for LedgerStore {
    fn current_balance(&self, account_id: AccountId) -> LedgerResult<Decimal> {
        Ok(self
            .current_transaction(account_id)?
            .map_or(Decimal::ZERO, |tx| tx.current_balance))
    }
}
