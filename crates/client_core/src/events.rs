//! User-visible notices and client events.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Failure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeContext {
    FetchLessons,
    Cart,
    PlaceOrder,
    UpdateSpaces,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    kind: NoticeKind,
    context: NoticeContext,
    message: String,
}

impl Notice {
    pub fn success(context: NoticeContext, message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            context,
            message: message.into(),
        }
    }

    pub fn failure(context: NoticeContext, message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Failure,
            context,
            message: message.into(),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.kind == NoticeKind::Failure
    }

    pub fn kind(&self) -> NoticeKind {
        self.kind
    }

    pub fn context(&self) -> NoticeContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    Notice(Notice),
    CatalogUpdated { listed: usize },
}
