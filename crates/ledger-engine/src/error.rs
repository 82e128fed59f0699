use std::fmt;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::model::{AccountId, CustomerId, TransactionId};
use crate::validation::FieldErrors;

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Coarse category a caller can map onto its own presentation (HTTP status, exit code, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    BadRequest,
    NotFound,
    Conflict,
    Internal,
}

/// What a missing-transaction lookup was keyed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKey {
    Id(TransactionId),
    Account(AccountId),
}

impl fmt::Display for TransactionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "Transaction {id} not found"),
            Self::Account(id) => write!(f, "No transactions found for account {id}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Transaction amount must be greater than zero, got {amount}")]
    InvalidAmount { amount: Decimal },

    #[error("Account {0} not found")]
    AccountNotFound(AccountId),

    #[error("Account {account_id} does not belong to customer {customer_id}")]
    OwnershipMismatch {
        account_id: AccountId,
        customer_id: CustomerId,
    },

    #[error("Transaction source cannot equal destination (account {0})")]
    SourceEqualsDestination(AccountId),

    #[error("Transaction has insufficient funds on account {account_id}")]
    InsufficientFunds { account_id: AccountId },

    #[error("Transaction would overflow the balance of account {account_id}")]
    BalanceOverflow { account_id: AccountId },

    #[error("{0}")]
    TransactionNotFound(TransactionKey),

    #[error("Transaction {transaction_id} does not belong to account {account_id}")]
    TransactionDoesNotBelongToAccount {
        transaction_id: TransactionId,
        account_id: AccountId,
    },

    #[error("Transaction {transaction_id} does not belong to customer {customer_id}")]
    TransactionDoesNotBelongToCustomer {
        transaction_id: TransactionId,
        customer_id: CustomerId,
    },

    #[error("Customer {0} not found")]
    CustomerNotFound(CustomerId),

    #[error("No customers registered")]
    NoCustomers,

    #[error("No accounts for customer {0}")]
    NoAccountsForCustomer(CustomerId),

    #[error("Account {0} has no customer")]
    AccountHasNoCustomer(AccountId),

    #[error("Customer exists with SSN")]
    CustomerExistsWithSsn,

    #[error("Request contains validation errors: {0}")]
    Validation(FieldErrors),

    #[error("Current transaction of account {account_id} changed during processing")]
    ConcurrentModification { account_id: AccountId },

    #[error("Storage failure: {0}")]
    Storage(String),
}

impl LedgerError {
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidAmount { .. }
            | Self::OwnershipMismatch { .. }
            | Self::SourceEqualsDestination(_)
            | Self::InsufficientFunds { .. }
            | Self::BalanceOverflow { .. }
            | Self::TransactionDoesNotBelongToAccount { .. }
            | Self::TransactionDoesNotBelongToCustomer { .. }
            | Self::Validation(_) => ErrorCategory::BadRequest,
            Self::AccountNotFound(_)
            | Self::TransactionNotFound(_)
            | Self::CustomerNotFound(_)
            | Self::NoCustomers
            | Self::NoAccountsForCustomer(_)
            | Self::AccountHasNoCustomer(_) => ErrorCategory::NotFound,
            Self::CustomerExistsWithSsn => ErrorCategory::Conflict,
            Self::ConcurrentModification { .. } | Self::Storage(_) => ErrorCategory::Internal,
        }
    }

    pub(crate) fn lock_poisoned(what: &str) -> Self {
        Self::Storage(format!("{what} lock poisoned"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn categories_follow_taxonomy() {
        assert_eq!(
            LedgerError::InvalidAmount { amount: dec!(0) }.category(),
            ErrorCategory::BadRequest
        );
        assert_eq!(
            LedgerError::InsufficientFunds { account_id: 1 }.category(),
            ErrorCategory::BadRequest
        );
        assert_eq!(
            LedgerError::BalanceOverflow { account_id: 1 }.category(),
            ErrorCategory::BadRequest
        );
        assert_eq!(
            LedgerError::AccountNotFound(7).category(),
            ErrorCategory::NotFound
        );
        assert_eq!(
            LedgerError::CustomerExistsWithSsn.category(),
            ErrorCategory::Conflict
        );
        assert_eq!(
            LedgerError::ConcurrentModification { account_id: 1 }.category(),
            ErrorCategory::Internal
        );
    }

    #[test]
    fn messages_name_the_offending_ids() {
        let err = LedgerError::OwnershipMismatch {
            account_id: 3,
            customer_id: 9,
        };
        assert_eq!(err.to_string(), "Account 3 does not belong to customer 9");

        let err = LedgerError::TransactionNotFound(TransactionKey::Account(4));
        assert_eq!(err.to_string(), "No transactions found for account 4");
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }
}
