use std::io::{Read, Write};

use anyhow::{anyhow, Context, Result};
use ledger_engine::model::{AccountId, AccountType, CustomerId};
use ledger_engine::request::{
    CreateAccount, CreateCustomer, CreateDeposit, CreateTransfer, CreateWithdrawal,
    TransactionRequest,
};
use ledger_engine::transaction::Transaction;
use ledger_engine::Ledger;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Customer,
    Account,
    Deposit,
    Withdrawal,
    Transfer,
}

/// One input line, columns unused by an operation are left empty
#[derive(Debug, Clone, Deserialize)]
pub struct OperationRow {
    pub op: Operation,
    pub customer: Option<CustomerId>,
    pub account: Option<AccountId>,
    pub destination: Option<AccountId>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub amount: Option<Decimal>,
    pub description: Option<String>,
    pub name: Option<String>,
    pub ssn: Option<u64>,
    pub account_type: Option<AccountType>,
}

impl OperationRow {
    fn customer(&self) -> Result<CustomerId> {
        self.customer
            .ok_or_else(|| anyhow!("{:?} requires customer", self.op))
    }

    fn account(&self) -> Result<AccountId> {
        self.account
            .ok_or_else(|| anyhow!("{:?} requires account", self.op))
    }

    fn amount(&self) -> Result<Decimal> {
        self.amount
            .ok_or_else(|| anyhow!("{:?} requires amount", self.op))
    }
}

#[derive(Debug, Serialize)]
pub struct AccountOutput {
    pub account: AccountId,
    pub customer: CustomerId,
    #[serde(rename = "type")]
    pub account_type: &'static str,
    pub balance: Decimal,
}

#[derive(Debug, Serialize)]
pub struct TransactionOutput {
    pub id: u64,
    pub account: AccountId,
    pub customer: CustomerId,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub role: Option<&'static str>,
    pub amount: Decimal,
    pub balance: Decimal,
    pub current: bool,
    pub description: Option<String>,
}

impl From<Transaction> for TransactionOutput {
    fn from(tx: Transaction) -> Self {
        Self {
            id: tx.id,
            account: tx.account_id,
            customer: tx.customer_id,
            kind: tx.kind.as_str(),
            role: tx.kind.transfer_role().map(|role| role.as_str()),
            amount: tx.amount,
            balance: tx.current_balance,
            current: tx.is_current,
            description: tx.description,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub processed: usize,
    pub skipped: usize,
}

/// Applies every row of `input` to `ledger`; rejected rows are logged and skipped.
pub fn apply_operations<R: Read>(ledger: &Ledger, input: R) -> Result<Summary> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);

    let mut summary = Summary::default();

    for (index, result) in reader.deserialize().enumerate() {
        let line = index + 2;
        let row: OperationRow = match result {
            Ok(row) => row,
            Err(e) => {
                warn!("Failed to parse operation at line {line}: {e}");
                summary.skipped += 1;

                continue;
            }
        };

        if let Err(e) = apply(ledger, row) {
            warn!("Operation at line {line} rejected: {e}");
            summary.skipped += 1;
        } else {
            summary.processed += 1;
        }
    }

    info!(
        "Processed {} operations, skipped {} invalid operations",
        summary.processed, summary.skipped
    );

    Ok(summary)
}

fn apply(ledger: &Ledger, row: OperationRow) -> Result<()> {
    match row.op {
        Operation::Customer => {
            let request = CreateCustomer {
                name: row.name.clone().unwrap_or_default(),
                ssn: row.ssn.context("customer requires ssn")?,
            };
            ledger.customers().create(request)?;
        }
        Operation::Account => {
            let request = CreateAccount {
                customer_id: row.customer()?,
                account_type: row.account_type.context("account requires account_type")?,
            };
            ledger.accounts().create(request)?;
        }
        Operation::Deposit => {
            let request = CreateDeposit {
                account_id: row.account()?,
                customer_id: row.customer()?,
                amount: row.amount()?,
                description: row.description,
            };
            ledger
                .transactions()
                .process(TransactionRequest::Deposit(request))?;
        }
        Operation::Withdrawal => {
            let request = CreateWithdrawal {
                account_id: row.account()?,
                customer_id: row.customer()?,
                amount: row.amount()?,
                description: row.description,
            };
            ledger
                .transactions()
                .process(TransactionRequest::Withdrawal(request))?;
        }
        Operation::Transfer => {
            let request = CreateTransfer {
                source_account_id: row.account()?,
                customer_id: row.customer()?,
                destination_account_id: row.destination.context("transfer requires destination")?,
                amount: row.amount()?,
                description: row.description,
            };
            ledger
                .transactions()
                .process(TransactionRequest::Transfer(request))?;
        }
    }
    Ok(())
}

pub fn write_balances<W: Write>(ledger: &Ledger, output: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().from_writer(output);

    for view in ledger.accounts().find_all()? {
        let output = AccountOutput {
            account: view.account.id,
            customer: view.account.customer_id(),
            account_type: view.account.account_type.as_str(),
            balance: view.balance,
        };
        writer
            .serialize(&output)
            .context("Failed to serialize account")?;
    }

    writer.flush().context("Failed to flush output")?;

    Ok(())
}

pub fn write_history<W: Write>(ledger: &Ledger, output: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().from_writer(output);
    let store = ledger.store();

    for account_id in store.account_ids()? {
        for tx in store.transactions_for_account(account_id)? {
            writer
                .serialize(TransactionOutput::from(tx))
                .context("Failed to serialize transaction")?;
        }
    }

    writer.flush().context("Failed to flush output")?;

    Ok(())
}
