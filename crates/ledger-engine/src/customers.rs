use std::sync::Arc;

use tracing::warn;

use crate::error::{LedgerError, LedgerResult};
use crate::model::{Customer, CustomerId};
use crate::request::CreateCustomer;
use crate::store::LedgerStore;
use crate::validation::{FieldErrors, Ssn, Validate};

#[derive(Debug, Clone)]
pub struct CustomerService {
    store: Arc<LedgerStore>,
}

impl CustomerService {
    pub const fn new(store: Arc<LedgerStore>) -> Self {
        Self { store }
    }

    pub fn create(&self, request: CreateCustomer) -> LedgerResult<Customer> {
        request.validate().map_err(LedgerError::Validation)?;
        let ssn = Ssn::try_from(request.ssn).map_err(|err| {
            let mut errors = FieldErrors::new();
            errors.add("ssn", err.to_string());
            LedgerError::Validation(errors)
        })?;
        self.store
            .insert_customer(request.name, ssn)
            .inspect_err(|err| warn!("Customer rejected: {err}"))
    }

    pub fn exists(&self, customer_id: CustomerId) -> LedgerResult<bool> {
        Ok(self.store.customer(customer_id)?.is_some())
    }

    pub fn find_by_id(&self, customer_id: CustomerId) -> LedgerResult<Customer> {
        self.store
            .customer(customer_id)?
            .ok_or(LedgerError::CustomerNotFound(customer_id))
    }

    pub fn find_all(&self) -> LedgerResult<Vec<Customer>> {
        let customers = self.store.customers()?;
        if customers.is_empty() {
            return Err(LedgerError::NoCustomers);
        }
        Ok(customers)
    }
}
