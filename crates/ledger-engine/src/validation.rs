//! Structural request validation.
//!
//! Checks here are purely about shape (lengths, scale, id ranges). Business
//! rules such as positive amounts or ownership live in the services.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

pub const NAME_LENGTH: usize = 32;
pub const DESCRIPTION_LENGTH: usize = 32;
pub const AMOUNT_SCALE: u32 = 2;

/// Field name to message, ordered by field name for stable output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

pub trait Validate {
    fn validate(&self) -> Result<(), FieldErrors>;
}

pub(crate) fn check_id(errors: &mut FieldErrors, field: &'static str, id: u64, message: &str) {
    if id < 1 {
        errors.add(field, message);
    }
}

pub(crate) fn check_amount_scale(errors: &mut FieldErrors, amount: Decimal) {
    if amount.normalize().scale() > AMOUNT_SCALE {
        errors.add("amount", "Invalid change fraction");
    }
}

pub(crate) fn check_description(errors: &mut FieldErrors, description: Option<&str>) {
    if description.is_some_and(|d| d.chars().count() > DESCRIPTION_LENGTH) {
        errors.add(
            "description",
            format!("length must be at most {DESCRIPTION_LENGTH}"),
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SsnError {
    #[error("Invalid SSN length")]
    Length,
    #[error("Invalid SSN area number")]
    AreaNumber,
    #[error("Invalid SSN group number")]
    GroupNumber,
    #[error("Invalid SSN serial number")]
    SerialNumber,
}

/// Nine digit national identifier, structurally checked on construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Ssn(u32);

impl Ssn {
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl TryFrom<u64> for Ssn {
    type Error = SsnError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        check_ssn_digits(&value.to_string())
            .inspect_err(|err| debug!("SSN validation failed: {err}"))?;
        u32::try_from(value)
            .map(Self)
            .map_err(|_| SsnError::Length)
    }
}

fn check_ssn_digits(digits: &str) -> Result<(), SsnError> {
    if digits.len() != 9 {
        return Err(SsnError::Length);
    }
    let (area, rest) = digits.split_at(3);
    let (group, serial) = rest.split_at(2);
    if area == "000" || area.starts_with("666") || area.starts_with('9') {
        return Err(SsnError::AreaNumber);
    }
    if group == "00" {
        return Err(SsnError::GroupNumber);
    }
    if serial == "0000" {
        return Err(SsnError::SerialNumber);
    }
    Ok(())
}

impl fmt::Display for Ssn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:09}", self.0)
    }
}
