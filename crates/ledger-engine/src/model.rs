use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::validation::Ssn;

pub type CustomerId = u64;
pub type AccountId = u64;
pub type TransactionId = u64;

/// Account category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountType {
    Checking,
    Savings,
}

impl AccountType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Checking => "CHECKING",
            Self::Savings => "SAVINGS",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub ssn: Ssn,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}

/// Account together with its owning customer.
///
/// The balance is never part of the account itself, see [`AccountView`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub id: AccountId,
    pub account_type: AccountType,
    pub customer: Customer,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}

impl Account {
    pub const fn customer_id(&self) -> CustomerId {
        self.customer.id
    }
}

/// Account as presented to a caller, with the balance resolved at read time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountView {
    #[serde(flatten)]
    pub account: Account,
    pub balance: Decimal,
}
