use std::{collections::HashMap, sync::Arc, time::Duration};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use shared::{
    domain::{Lesson, LessonId},
    protocol::{reply_signals_error, LessonListQuery, PlaceOrderRequest},
};
use tokio::sync::{broadcast, Mutex};

use crate::{ClientEvent, ClientSettings, LessonApi, Notice, StorefrontClient};

pub(crate) fn lesson(id: u64, subject: &str, location: &str, price: f64, spaces: u32) -> Lesson {
    Lesson::new(id, subject, location, price, spaces).expect("valid lesson")
}

pub(crate) fn id(raw: u64) -> LessonId {
    LessonId::from(raw)
}

pub(crate) fn test_settings() -> ClientSettings {
    ClientSettings {
        request_timeout: Duration::from_millis(200),
        ..ClientSettings::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HangPoint {
    Fetch,
    Order,
    Seats,
}

#[derive(Default)]
pub(crate) struct FakeLessonApi {
    lessons: Mutex<Vec<Lesson>>,
    fetch_error: Option<String>,
    order_reply: Option<Value>,
    order_error: Option<String>,
    seat_replies: HashMap<LessonId, Value>,
    seat_errors: HashMap<LessonId, String>,
    hang: Option<HangPoint>,
    apply_seat_updates: bool,
    pub(crate) queries: Mutex<Vec<LessonListQuery>>,
    pub(crate) orders: Mutex<Vec<PlaceOrderRequest>>,
    pub(crate) seat_updates: Mutex<Vec<(LessonId, u32)>>,
}

impl FakeLessonApi {
    pub(crate) fn with_lessons(lessons: Vec<Lesson>) -> Self {
        Self {
            lessons: Mutex::new(lessons),
            ..Self::default()
        }
    }

    pub(crate) fn failing_fetch(mut self, err: impl Into<String>) -> Self {
        self.fetch_error = Some(err.into());
        self
    }

    pub(crate) fn order_reply(mut self, reply: Value) -> Self {
        self.order_reply = Some(reply);
        self
    }

    pub(crate) fn failing_order(mut self, err: impl Into<String>) -> Self {
        self.order_error = Some(err.into());
        self
    }

    pub(crate) fn seat_reply(mut self, lesson_id: LessonId, reply: Value) -> Self {
        self.seat_replies.insert(lesson_id, reply);
        self
    }

    pub(crate) fn failing_seat(mut self, lesson_id: LessonId, err: impl Into<String>) -> Self {
        self.seat_errors.insert(lesson_id, err.into());
        self
    }

    pub(crate) fn hanging(mut self, point: HangPoint) -> Self {
        self.hang = Some(point);
        self
    }

    /// Successful seat updates overwrite the served lesson's spaces, like the
    /// real server does.
    pub(crate) fn applying_seat_updates(mut self) -> Self {
        self.apply_seat_updates = true;
        self
    }

    pub(crate) async fn served_spaces(&self, lesson_id: &LessonId) -> Option<u32> {
        self.lessons
            .lock()
            .await
            .iter()
            .find(|lesson| &lesson.id == lesson_id)
            .map(|lesson| lesson.spaces)
    }

    pub(crate) async fn set_lessons(&self, lessons: Vec<Lesson>) {
        *self.lessons.lock().await = lessons;
    }

    async fn maybe_hang(&self, point: HangPoint) {
        if self.hang == Some(point) {
            std::future::pending::<()>().await;
        }
    }
}

#[async_trait]
impl LessonApi for FakeLessonApi {
    async fn fetch_lessons(&self, query: &LessonListQuery) -> Result<Vec<Lesson>> {
        self.queries.lock().await.push(query.clone());
        self.maybe_hang(HangPoint::Fetch).await;
        if let Some(err) = &self.fetch_error {
            return Err(anyhow!(err.clone()));
        }
        Ok(self.lessons.lock().await.clone())
    }

    async fn place_order(&self, request: &PlaceOrderRequest) -> Result<Value> {
        self.orders.lock().await.push(request.clone());
        self.maybe_hang(HangPoint::Order).await;
        if let Some(err) = &self.order_error {
            return Err(anyhow!(err.clone()));
        }
        Ok(self
            .order_reply
            .clone()
            .unwrap_or_else(|| json!({"message": "order placed"})))
    }

    async fn update_spaces(&self, lesson_id: &LessonId, spaces: u32) -> Result<Value> {
        self.seat_updates
            .lock()
            .await
            .push((lesson_id.clone(), spaces));
        self.maybe_hang(HangPoint::Seats).await;
        if let Some(err) = self.seat_errors.get(lesson_id) {
            return Err(anyhow!(err.clone()));
        }
        let reply = self
            .seat_replies
            .get(lesson_id)
            .cloned()
            .unwrap_or_else(|| json!({"message": "spaces updated"}));
        if self.apply_seat_updates && !reply_signals_error(&reply) {
            if let Some(lesson) = self
                .lessons
                .lock()
                .await
                .iter_mut()
                .find(|lesson| &lesson.id == lesson_id)
            {
                lesson.spaces = spaces;
            }
        }
        Ok(reply)
    }
}

pub(crate) fn client_with(api: Arc<FakeLessonApi>) -> StorefrontClient {
    StorefrontClient::with_api(test_settings(), api)
}

pub(crate) fn drain_notices(events: &mut broadcast::Receiver<ClientEvent>) -> Vec<Notice> {
    let mut notices = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let ClientEvent::Notice(notice) = event {
            notices.push(notice);
        }
    }
    notices
}
