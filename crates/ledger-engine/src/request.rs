use rust_decimal::Decimal;
use serde::Deserialize;

use crate::model::{AccountId, AccountType, CustomerId};
use crate::validation::{
    check_amount_scale, check_description, check_id, FieldErrors, Ssn, Validate, NAME_LENGTH,
};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCustomer {
    pub name: String,
    pub ssn: u64,
}

impl Validate for CreateCustomer {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.name.trim().is_empty() {
            errors.add("name", "Name required");
        } else if self.name.chars().count() > NAME_LENGTH {
            errors.add("name", format!("length must be at most {NAME_LENGTH}"));
        }
        if let Err(err) = Ssn::try_from(self.ssn) {
            errors.add("ssn", err.to_string());
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccount {
    pub customer_id: CustomerId,
    #[serde(rename = "type")]
    pub account_type: AccountType,
}

impl Validate for CreateAccount {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_id(&mut errors, "customerId", self.customer_id, "Invalid customer ID");
        errors.into_result()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeposit {
    pub account_id: AccountId,
    pub customer_id: CustomerId,
    pub amount: Decimal,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWithdrawal {
    pub account_id: AccountId,
    pub customer_id: CustomerId,
    pub amount: Decimal,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransfer {
    pub source_account_id: AccountId,
    pub customer_id: CustomerId,
    pub destination_account_id: AccountId,
    pub amount: Decimal,
    #[serde(default)]
    pub description: Option<String>,
}

fn validate_movement(
    account_id: AccountId,
    customer_id: CustomerId,
    amount: Decimal,
    description: Option<&str>,
) -> FieldErrors {
    let mut errors = FieldErrors::new();
    check_id(&mut errors, "accountId", account_id, "Invalid account ID");
    check_id(&mut errors, "customerId", customer_id, "Invalid customer ID");
    check_amount_scale(&mut errors, amount);
    check_description(&mut errors, description);
    errors
}

impl Validate for CreateDeposit {
    fn validate(&self) -> Result<(), FieldErrors> {
        validate_movement(
            self.account_id,
            self.customer_id,
            self.amount,
            self.description.as_deref(),
        )
        .into_result()
    }
}

impl Validate for CreateWithdrawal {
    fn validate(&self) -> Result<(), FieldErrors> {
        validate_movement(
            self.account_id,
            self.customer_id,
            self.amount,
            self.description.as_deref(),
        )
        .into_result()
    }
}

impl Validate for CreateTransfer {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = validate_movement(
            self.source_account_id,
            self.customer_id,
            self.amount,
            self.description.as_deref(),
        );
        check_id(
            &mut errors,
            "destinationAccountId",
            self.destination_account_id,
            "Invalid transfer destination account ID",
        );
        errors.into_result()
    }
}

/// Any money-movement request the engine can process
#[derive(Debug, Clone)]
pub enum TransactionRequest {
    Deposit(CreateDeposit),
    Withdrawal(CreateWithdrawal),
    Transfer(CreateTransfer),
}
