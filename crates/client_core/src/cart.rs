//! Cart ledger.
//!
//! One cart entry is one reserved seat. Every mutation of the cart goes
//! through [`CartLedger`], which moves the matching seat in or out of the
//! catalog so that for every lesson
//! `original spaces == current spaces + entries in cart`.

use std::collections::HashSet;

use shared::domain::{Lesson, LessonId};
use thiserror::Error;
use tracing::debug;

use crate::catalog::CatalogCache;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("lesson {0} has no spaces left")]
    InsufficientSpace(LessonId),
    #[error("lesson {0} is not in the catalog")]
    UnknownLesson(LessonId),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    entries: Vec<LessonId>,
}

impl Cart {
    pub fn entries(&self) -> &[LessonId] {
        &self.entries
    }

    pub fn lesson_ids(&self) -> Vec<LessonId> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, lesson_id: &LessonId) -> bool {
        self.entries.contains(lesson_id)
    }

    pub fn count_of(&self, lesson_id: &LessonId) -> usize {
        self.entries.iter().filter(|id| *id == lesson_id).count()
    }

    /// Distinct lesson identifiers in order of first appearance.
    pub fn distinct_lessons(&self) -> Vec<LessonId> {
        let mut seen = HashSet::new();
        self.entries
            .iter()
            .filter(|id| seen.insert(*id))
            .cloned()
            .collect()
    }

    /// Drops every entry without touching seat counts. Only valid once the
    /// seats are sold.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drops every entry for one lesson without touching seat counts. Used
    /// once the server has recorded those seats as sold.
    pub(crate) fn forget_lesson(&mut self, lesson_id: &LessonId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|id| id != lesson_id);
        before - self.entries.len()
    }

    /// Drops up to `count` of the most recently added entries for a lesson.
    pub(crate) fn release_last(&mut self, lesson_id: &LessonId, count: usize) {
        let mut remaining = count;
        let mut index = self.entries.len();
        while remaining > 0 && index > 0 {
            index -= 1;
            if self.entries.get(index) == Some(lesson_id) {
                self.entries.remove(index);
                remaining -= 1;
            }
        }
    }
}

pub fn has_spaces(lesson: &Lesson) -> bool {
    lesson.has_spaces()
}

/// Sum of the prices of every seat in the cart.
pub fn total_price(cart: &Cart, catalog: &CatalogCache) -> f64 {
    cart.entries
        .iter()
        .filter_map(|id| catalog.get(id))
        .map(|lesson| lesson.price)
        .sum()
}

/// Mutable view over the cart and the catalog it draws seats from.
#[derive(Debug)]
pub struct CartLedger<'a> {
    cart: &'a mut Cart,
    catalog: &'a mut CatalogCache,
}

impl<'a> CartLedger<'a> {
    pub fn new(cart: &'a mut Cart, catalog: &'a mut CatalogCache) -> Self {
        Self { cart, catalog }
    }

    pub fn add(&mut self, lesson_id: &LessonId) -> Result<(), CartError> {
        let lesson = self
            .catalog
            .get_mut(lesson_id)
            .ok_or_else(|| CartError::UnknownLesson(lesson_id.clone()))?;
        if !lesson.has_spaces() {
            return Err(CartError::InsufficientSpace(lesson_id.clone()));
        }

        lesson.spaces -= 1;
        self.cart.entries.push(lesson_id.clone());
        debug!(lesson_id = %lesson_id, spaces_left = lesson.spaces, "seat added to cart");
        Ok(())
    }

    /// Removes the first entry for `lesson_id` and hands the seat back.
    /// Returns `false` when the lesson was not in the cart.
    pub fn remove(&mut self, lesson_id: &LessonId) -> bool {
        let Some(index) = self.cart.entries.iter().position(|id| id == lesson_id) else {
            return false;
        };

        self.cart.entries.remove(index);
        if let Some(lesson) = self.catalog.get_mut(lesson_id) {
            lesson.spaces = lesson.spaces.saturating_add(1);
            debug!(lesson_id = %lesson_id, spaces_left = lesson.spaces, "seat removed from cart");
        }
        true
    }

    /// Empties the cart, returning every seat. Returns the number of entries
    /// removed.
    pub fn remove_all(&mut self) -> usize {
        let removed = self.cart.entries.len();
        for lesson_id in std::mem::take(&mut self.cart.entries) {
            if let Some(lesson) = self.catalog.get_mut(&lesson_id) {
                lesson.spaces = lesson.spaces.saturating_add(1);
            }
        }
        removed
    }
}

#[cfg(test)]
#[path = "tests/cart_tests.rs"]
mod tests;
