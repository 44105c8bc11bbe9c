use shared::{domain::LessonId, protocol::PlaceOrderRequest};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OrderValidationError {
    #[error("name is required")]
    EmptyName,
    #[error("name may only contain letters")]
    InvalidName,
    #[error("phone is required")]
    EmptyPhone,
    #[error("phone may only contain digits")]
    InvalidPhone,
    #[error("cart is empty")]
    EmptyCart,
}

/// Contact form as typed by the user. Validity is recomputed on every read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderDraft {
    pub name: String,
    pub phone: String,
}

impl OrderDraft {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
        }
    }

    pub fn is_valid(&self) -> bool {
        is_order_valid(&self.name, &self.phone)
    }

    pub fn validate(&self) -> Result<ContactDetails, OrderValidationError> {
        if self.name.is_empty() {
            return Err(OrderValidationError::EmptyName);
        }
        if !self.name.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(OrderValidationError::InvalidName);
        }
        if self.phone.is_empty() {
            return Err(OrderValidationError::EmptyPhone);
        }
        if !self.phone.chars().all(|c| c.is_ascii_digit()) {
            return Err(OrderValidationError::InvalidPhone);
        }
        Ok(ContactDetails {
            name: self.name.clone(),
            phone: self.phone.clone(),
        })
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Name is non-empty ASCII letters and phone is non-empty ASCII digits.
pub fn is_order_valid(name: &str, phone: &str) -> bool {
    !name.is_empty()
        && name.chars().all(|c| c.is_ascii_alphabetic())
        && !phone.is_empty()
        && phone.chars().all(|c| c.is_ascii_digit())
}

/// Contact data that has passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactDetails {
    name: String,
    phone: String,
}

impl ContactDetails {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn order_for(&self, lesson_ids: Vec<LessonId>) -> PlaceOrderRequest {
        PlaceOrderRequest {
            name: self.name.clone(),
            phone: self.phone.clone(),
            lesson_ids,
        }
    }
}

#[cfg(test)]
#[path = "tests/order_tests.rs"]
mod tests;
