use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{LedgerError, LedgerResult};
use crate::model::{AccountId, CustomerId, TransactionId};

/// Side of a transfer a transaction row records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransferRole {
    Source,
    Destination,
}

impl TransferRole {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Source => "SOURCE",
            Self::Destination => "DESTINATION",
        }
    }
}

/// Transaction kind, the transfer role only exists for transfers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", content = "role", rename_all = "UPPERCASE")]
pub enum TransactionType {
    Deposit,
    Withdrawal,
    Transfer(TransferRole),
}

impl TransactionType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Deposit => "DEPOSIT",
            Self::Withdrawal => "WITHDRAWAL",
            Self::Transfer(_) => "TRANSFER",
        }
    }

    pub const fn transfer_role(self) -> Option<TransferRole> {
        match self {
            Self::Transfer(role) => Some(role),
            Self::Deposit | Self::Withdrawal => None,
        }
    }

    /// Applies the sign convention: credits are positive, debits negative.
    pub fn signed(self, amount: Decimal) -> Decimal {
        match self {
            Self::Deposit | Self::Transfer(TransferRole::Destination) => amount,
            Self::Withdrawal | Self::Transfer(TransferRole::Source) => -amount,
        }
    }
}

/// A committed ledger row.
///
/// Everything except `is_current` is fixed at commit; `is_current` is cleared
/// once, when a newer row on the same account supersedes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub account_id: AccountId,
    pub customer_id: CustomerId,
    pub amount: Decimal,
    pub current_balance: Decimal,
    pub is_current: bool,
    #[serde(flatten)]
    pub kind: TransactionType,
    pub description: Option<String>,
    pub date_created: DateTime<Utc>,
}

/// Row staged inside a unit of work, before an id is assigned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub account_id: AccountId,
    pub customer_id: CustomerId,
    pub amount: Decimal,
    pub current_balance: Decimal,
    pub kind: TransactionType,
    pub description: Option<String>,
}

impl NewTransaction {
    /// Builds the row that follows `previous_balance` on the chain.
    pub fn chained(
        account_id: AccountId,
        customer_id: CustomerId,
        kind: TransactionType,
        magnitude: Decimal,
        previous_balance: Decimal,
        description: Option<String>,
    ) -> LedgerResult<Self> {
        let amount = kind.signed(magnitude);
        let current_balance = previous_balance
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow { account_id })?;
        Ok(Self {
            account_id,
            customer_id,
            amount,
            current_balance,
            kind,
            description,
        })
    }

    pub(crate) fn into_transaction(self, id: TransactionId, now: DateTime<Utc>) -> Transaction {
        Transaction {
            id,
            account_id: self.account_id,
            customer_id: self.customer_id,
            amount: self.amount,
            current_balance: self.current_balance,
            is_current: true,
            kind: self.kind,
            description: self.description,
            date_created: now,
        }
    }
}

/// Both legs of a committed transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferPair {
    pub source: Transaction,
    pub destination: Transaction,
}

impl TransferPair {
    pub fn into_vec(self) -> Vec<Transaction> {
        vec![self.source, self.destination]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn sign_convention() {
        assert_eq!(TransactionType::Deposit.signed(dec!(5.00)), dec!(5.00));
        assert_eq!(TransactionType::Withdrawal.signed(dec!(5.00)), dec!(-5.00));
        assert_eq!(
            TransactionType::Transfer(TransferRole::Source).signed(dec!(5.00)),
            dec!(-5.00)
        );
        assert_eq!(
            TransactionType::Transfer(TransferRole::Destination).signed(dec!(5.00)),
            dec!(5.00)
        );
    }

    #[test]
    fn chained_balance_follows_previous() {
        let draft = NewTransaction::chained(
            1,
            1,
            TransactionType::Withdrawal,
            dec!(40.00),
            dec!(100.00),
            None,
        )
        .unwrap();
        assert_eq!(draft.amount, dec!(-40.00));
        assert_eq!(draft.current_balance, dec!(60.00));
    }

    #[test]
    fn chained_balance_past_decimal_range_is_an_error() {
        let result = NewTransaction::chained(
            4,
            1,
            TransactionType::Deposit,
            dec!(1.00),
            Decimal::MAX,
            None,
        );
        assert!(matches!(
            result,
            Err(LedgerError::BalanceOverflow { account_id: 4 })
        ));
    }

    #[test]
    fn only_transfers_carry_a_role() {
        assert_eq!(TransactionType::Deposit.transfer_role(), None);
        assert_eq!(
            TransactionType::Transfer(TransferRole::Destination).transfer_role(),
            Some(TransferRole::Destination)
        );
    }
}
