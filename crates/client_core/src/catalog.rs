//! Lesson catalog cache.
//!
//! The cache keeps two views: the ordered listing from the most recent fetch,
//! and every lesson the cart still holds seats for. A refetch narrowed by a
//! search query must not lose track of a held lesson, otherwise a later
//! removal or seat reconciliation would have nothing to act on.

use std::collections::{HashMap, HashSet};

use shared::domain::{Lesson, LessonId};
use tracing::{debug, warn};

use crate::cart::Cart;

#[derive(Debug, Clone, Default)]
pub struct CatalogCache {
    lessons: HashMap<LessonId, Lesson>,
    listing: Vec<LessonId>,
}

/// Cart entries dropped because the server reported fewer spaces than the
/// cart was holding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleasedHold {
    pub lesson_id: LessonId,
    pub released: usize,
}

impl CatalogCache {
    pub fn from_lessons(lessons: Vec<Lesson>) -> Self {
        let mut cache = Self::default();
        cache.apply_listing(lessons, &mut Cart::default());
        cache
    }

    /// Lessons from the last fetch, in server order.
    pub fn listed(&self) -> impl Iterator<Item = &Lesson> + '_ {
        self.listing.iter().filter_map(|id| self.lessons.get(id))
    }

    pub fn get(&self, lesson_id: &LessonId) -> Option<&Lesson> {
        self.lessons.get(lesson_id)
    }

    pub(crate) fn get_mut(&mut self, lesson_id: &LessonId) -> Option<&mut Lesson> {
        self.lessons.get_mut(lesson_id)
    }

    /// Finds a known lesson by its textual id, whatever its wire form.
    pub fn resolve_id(&self, raw: &str) -> Option<&LessonId> {
        self.lessons.keys().find(|id| id.to_segment() == raw)
    }

    pub fn len(&self) -> usize {
        self.listing.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listing.is_empty()
    }

    pub fn set_rating(&mut self, lesson_id: &LessonId, rating: u32) -> bool {
        match self.lessons.get_mut(lesson_id) {
            Some(lesson) => {
                lesson.rating = Some(rating);
                true
            }
            None => false,
        }
    }

    /// Replaces the listing with freshly fetched lessons.
    ///
    /// Seats the cart holds are not known to the server yet, so each fetched
    /// count is reduced by the cart's holds for that lesson. Settlement drops
    /// entries whose seat update reached the server, which keeps this true. When the
    /// server has fewer spaces than the cart holds, the surplus holds are
    /// released from the cart and reported back.
    pub fn apply_listing(&mut self, fetched: Vec<Lesson>, cart: &mut Cart) -> Vec<ReleasedHold> {
        let mut lessons = HashMap::with_capacity(fetched.len());
        let mut listing = Vec::with_capacity(fetched.len());
        let mut released = Vec::new();

        for mut lesson in fetched {
            if lessons.contains_key(&lesson.id) {
                warn!(lesson_id = %lesson.id, "duplicate lesson in listing; keeping first");
                continue;
            }

            let held = u32::try_from(cart.count_of(&lesson.id)).unwrap_or(u32::MAX);
            if held > lesson.spaces {
                let surplus = (held - lesson.spaces) as usize;
                cart.release_last(&lesson.id, surplus);
                released.push(ReleasedHold {
                    lesson_id: lesson.id.clone(),
                    released: surplus,
                });
                lesson.spaces = 0;
            } else {
                lesson.spaces -= held;
            }

            listing.push(lesson.id.clone());
            lessons.insert(lesson.id.clone(), lesson);
        }

        let held_ids: HashSet<&LessonId> = cart.entries().iter().collect();
        for (id, lesson) in self.lessons.drain() {
            if held_ids.contains(&id) && !lessons.contains_key(&id) {
                debug!(lesson_id = %id, "retaining held lesson outside listing");
                lessons.insert(id, lesson);
            }
        }

        self.lessons = lessons;
        self.listing = listing;
        released
    }
}

#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod tests;
