use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::LessonId;

/// Body of `POST /orders/place`. Each entry in `lesson_ids` is one seat sold,
/// so repeated identifiers are meaningful.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceOrderRequest {
    pub name: String,
    pub phone: String,
    #[serde(rename = "lessonIds")]
    pub lesson_ids: Vec<LessonId>,
}

/// Body of `PUT /lessons/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSpacesRequest {
    pub spaces: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonListQuery {
    pub q: String,
    pub sort: String,
    pub order: String,
}

/// Loose JavaScript-style truthiness, which is how the API's `error` field is
/// meant to be read.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub fn reply_signals_error(reply: &Value) -> bool {
    reply.get("error").is_some_and(is_truthy)
}
