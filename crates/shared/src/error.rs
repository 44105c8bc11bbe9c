use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LessonError {
    #[error("lesson identifier must not be empty")]
    EmptyId,
    #[error("lesson {id} has invalid price {price}")]
    InvalidPrice { id: String, price: f64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseBrowseError {
    #[error("unknown sort attribute '{0}'")]
    SortAttribute(String),
    #[error("unknown sort direction '{0}'")]
    SortDirection(String),
}
