use std::{cmp::Ordering, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::error::{LessonError, ParseBrowseError};

/// Server-assigned lesson identifier. The API emits `_id` either as an
/// object-id string or as a plain number, and expects it back in the same
/// form in order bodies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LessonId {
    Number(Number),
    Text(String),
}

impl LessonId {
    pub fn new(id: impl Into<String>) -> Self {
        Self::Text(id.into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Text(text) if text.is_empty())
    }

    /// Path segment form, as used in `/lessons/{id}`.
    pub fn to_segment(&self) -> String {
        match self {
            Self::Number(number) => number.to_string(),
            Self::Text(text) => text.clone(),
        }
    }
}

impl fmt::Display for LessonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(number) => f.pad(&number.to_string()),
            Self::Text(text) => f.pad(text),
        }
    }
}

impl PartialOrd for LessonId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// numbers order before text; numbers by value, text lexicographically
impl Ord for LessonId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => number_key(a)
                .total_cmp(&number_key(b))
                .then_with(|| a.to_string().cmp(&b.to_string())),
            (Self::Number(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Number(_)) => Ordering::Greater,
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
        }
    }
}

fn number_key(number: &Number) -> f64 {
    number.as_f64().unwrap_or(f64::NAN)
}

impl From<&str> for LessonId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for LessonId {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<u64> for LessonId {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LessonRecord")]
pub struct Lesson {
    #[serde(rename = "_id")]
    pub id: LessonId,
    pub subject: String,
    pub location: String,
    pub price: f64,
    pub spaces: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u32>,
    #[serde(default)]
    pub image: String,
}

impl Lesson {
    pub fn new(
        id: impl Into<LessonId>,
        subject: impl Into<String>,
        location: impl Into<String>,
        price: f64,
        spaces: u32,
    ) -> Result<Self, LessonError> {
        let id = id.into();
        if id.is_empty() {
            return Err(LessonError::EmptyId);
        }
        if !price.is_finite() || price < 0.0 {
            return Err(LessonError::InvalidPrice {
                id: id.to_string(),
                price,
            });
        }
        Ok(Self {
            id,
            subject: subject.into(),
            location: location.into(),
            price,
            spaces,
            rating: None,
            image: String::new(),
        })
    }

    pub fn with_rating(mut self, rating: u32) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    pub fn has_spaces(&self) -> bool {
        self.spaces > 0
    }
}

#[derive(Deserialize)]
struct LessonRecord {
    #[serde(rename = "_id")]
    id: LessonId,
    subject: String,
    location: String,
    price: f64,
    spaces: u32,
    #[serde(default)]
    rating: Option<u32>,
    #[serde(default)]
    image: String,
}

impl TryFrom<LessonRecord> for Lesson {
    type Error = LessonError;

    fn try_from(record: LessonRecord) -> Result<Self, Self::Error> {
        let mut lesson = Lesson::new(
            record.id,
            record.subject,
            record.location,
            record.price,
            record.spaces,
        )?;
        lesson.rating = record.rating;
        lesson.image = record.image;
        Ok(lesson)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortAttribute {
    Subject,
    Location,
    Price,
    Spaces,
    Rating,
}

impl SortAttribute {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Subject => "subject",
            Self::Location => "location",
            Self::Price => "price",
            Self::Spaces => "spaces",
            Self::Rating => "rating",
        }
    }
}

impl fmt::Display for SortAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortAttribute {
    type Err = ParseBrowseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "subject" => Ok(Self::Subject),
            "location" => Ok(Self::Location),
            "price" => Ok(Self::Price),
            "spaces" => Ok(Self::Spaces),
            "rating" => Ok(Self::Rating),
            other => Err(ParseBrowseError::SortAttribute(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = ParseBrowseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Asc),
            "desc" | "descending" => Ok(Self::Desc),
            other => Err(ParseBrowseError::SortDirection(other.to_string())),
        }
    }
}
