//! Filter and sort of the catalog listing for display.

use std::cmp::Ordering;

use shared::{
    domain::{Lesson, SortAttribute, SortDirection},
    protocol::LessonListQuery,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrowseState {
    pub search: String,
    pub sort: Option<SortAttribute>,
    pub direction: SortDirection,
}

impl BrowseState {
    pub fn new(search: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            ..Self::default()
        }
    }

    pub fn sorted_by(mut self, attribute: SortAttribute, direction: SortDirection) -> Self {
        self.sort = Some(attribute);
        self.direction = direction;
        self
    }

    /// Query parameters for `GET /lessons`. Unset sort keys go out as empty
    /// strings.
    pub fn to_query(&self) -> LessonListQuery {
        LessonListQuery {
            q: self.search.clone(),
            sort: self
                .sort
                .map(|attribute| attribute.as_str().to_string())
                .unwrap_or_default(),
            order: if self.sort.is_some() {
                self.direction.as_str().to_string()
            } else {
                String::new()
            },
        }
    }
}

/// Derives the display sequence. Pure: the same lessons and state always
/// yield the same order, and equal keys keep their input order.
pub fn filter_and_sort<'a, I>(lessons: I, state: &BrowseState) -> Vec<&'a Lesson>
where
    I: IntoIterator<Item = &'a Lesson>,
{
    let query = state.search.to_lowercase();
    let mut shown: Vec<&Lesson> = lessons
        .into_iter()
        .filter(|lesson| query.is_empty() || matches_query(lesson, &query))
        .collect();

    if let Some(attribute) = state.sort {
        // slice::sort_by is stable
        shown.sort_by(|a, b| {
            let ordering = compare_by(a, b, attribute);
            match state.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
    }

    shown
}

fn matches_query(lesson: &Lesson, lowered_query: &str) -> bool {
    lesson.subject.to_lowercase().contains(lowered_query)
        || lesson.location.to_lowercase().contains(lowered_query)
}

fn compare_by(a: &Lesson, b: &Lesson, attribute: SortAttribute) -> Ordering {
    match attribute {
        SortAttribute::Subject => a.subject.cmp(&b.subject),
        SortAttribute::Location => a.location.cmp(&b.location),
        SortAttribute::Price => a.price.total_cmp(&b.price),
        SortAttribute::Spaces => a.spaces.cmp(&b.spaces),
        // unrated lessons order before rated ones
        SortAttribute::Rating => a.rating.cmp(&b.rating),
    }
}

#[cfg(test)]
#[path = "tests/browse_tests.rs"]
mod tests;
