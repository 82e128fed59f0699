#![allow(dead_code)]

use ledger_engine::model::{Account, AccountType};
use ledger_engine::request::{
    CreateAccount, CreateCustomer, CreateDeposit, CreateTransfer, CreateWithdrawal,
};
use ledger_engine::transaction::Transaction;
use ledger_engine::Ledger;
use rust_decimal::Decimal;

/// Opens `count` checking accounts, each owned by its own customer.
pub fn open_accounts(ledger: &Ledger, count: u64) -> Vec<Account> {
    (0..count)
        .map(|i| {
            let customer = ledger
                .customers()
                .create(CreateCustomer {
                    name: format!("customer {i}"),
                    ssn: 123_45_6789 + i,
                })
                .unwrap();
            ledger
                .accounts()
                .create(CreateAccount {
                    customer_id: customer.id,
                    account_type: AccountType::Checking,
                })
                .unwrap()
        })
        .collect()
}

pub fn deposit(account: &Account, amount: Decimal) -> CreateDeposit {
    CreateDeposit {
        account_id: account.id,
        customer_id: account.customer_id(),
        amount,
        description: None,
    }
}

pub fn withdrawal(account: &Account, amount: Decimal) -> CreateWithdrawal {
    CreateWithdrawal {
        account_id: account.id,
        customer_id: account.customer_id(),
        amount,
        description: None,
    }
}

pub fn transfer(from: &Account, to: &Account, amount: Decimal) -> CreateTransfer {
    CreateTransfer {
        source_account_id: from.id,
        customer_id: from.customer_id(),
        destination_account_id: to.id,
        amount,
        description: None,
    }
}

/// History of an account, empty when it has none.
pub fn history(ledger: &Ledger, account: &Account) -> Vec<Transaction> {
    ledger
        .store()
        .transactions_for_account(account.id)
        .unwrap()
}

/// Asserts the balance chain of an account is intact: one current row whose
/// balance equals the sum of all signed amounts, each row chaining from the last.
pub fn assert_chain(ledger: &Ledger, account: &Account) {
    let rows = history(ledger, account);
    let balance = ledger.transactions().current_balance(account.id).unwrap();

    let current: Vec<_> = rows.iter().filter(|tx| tx.is_current).collect();
    if rows.is_empty() {
        assert!(current.is_empty());
        assert_eq!(balance, Decimal::ZERO);
        return;
    }
    assert_eq!(current.len(), 1, "account {} has {} current rows", account.id, current.len());
    assert_eq!(current[0].id, rows[rows.len() - 1].id);

    let mut running = Decimal::ZERO;
    for tx in &rows {
        running += tx.amount;
        assert_eq!(tx.current_balance, running, "row {} breaks the chain", tx.id);
    }
    assert_eq!(balance, running);
}
