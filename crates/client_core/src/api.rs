//! Transport for the lesson/order HTTP API.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use shared::{
    domain::{Lesson, LessonId},
    protocol::{LessonListQuery, PlaceOrderRequest, UpdateSpacesRequest},
};
use tracing::debug;
use url::Url;

use crate::config::ClientSettings;

/// Remote lesson service. Replies for writes are returned raw so callers can
/// inspect the `error` field the API uses for application failures.
#[async_trait]
pub trait LessonApi: Send + Sync {
    async fn fetch_lessons(&self, query: &LessonListQuery) -> Result<Vec<Lesson>>;
    async fn place_order(&self, request: &PlaceOrderRequest) -> Result<Value>;
    async fn update_spaces(&self, lesson_id: &LessonId, spaces: u32) -> Result<Value>;
}

pub struct HttpLessonApi {
    http: Client,
    api_base_url: String,
    asset_base_url: String,
}

impl HttpLessonApi {
    pub fn new(settings: &ClientSettings) -> Result<Self> {
        let http = Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            http,
            api_base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            asset_base_url: settings.asset_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn lesson_url(&self, lesson_id: &LessonId) -> Result<Url> {
        let mut url = Url::parse(&self.api_base_url)
            .with_context(|| format!("invalid api base url '{}'", self.api_base_url))?;
        url.path_segments_mut()
            .map_err(|()| anyhow!("api base url '{}' cannot carry a path", self.api_base_url))?
            .pop_if_empty()
            .push("lessons")
            .push(&lesson_id.to_segment());
        Ok(url)
    }
}

#[async_trait]
impl LessonApi for HttpLessonApi {
    async fn fetch_lessons(&self, query: &LessonListQuery) -> Result<Vec<Lesson>> {
        let lessons: Vec<Lesson> = self
            .http
            .get(format!("{}/lessons", self.api_base_url))
            .query(query)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("malformed lesson listing")?;
        debug!(count = lessons.len(), q = %query.q, "fetched lessons");

        Ok(lessons
            .into_iter()
            .map(|mut lesson| {
                lesson.image = asset_url(&self.asset_base_url, &lesson.image);
                lesson
            })
            .collect())
    }

    async fn place_order(&self, request: &PlaceOrderRequest) -> Result<Value> {
        let reply = self
            .http
            .post(format!("{}/orders/place", self.api_base_url))
            .json(request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("malformed order response")?;
        Ok(reply)
    }

    async fn update_spaces(&self, lesson_id: &LessonId, spaces: u32) -> Result<Value> {
        let reply = self
            .http
            .put(self.lesson_url(lesson_id)?)
            .json(&UpdateSpacesRequest { spaces })
            .send()
            .await?
            .error_for_status()
            .map_err(|e| anyhow!("failed to update lesson spaces: {e}"))?
            .json()
            .await
            .context("malformed seat update response")?;
        Ok(reply)
    }
}

/// Images come back as server-relative paths; absolute urls pass through.
pub fn asset_url(asset_base_url: &str, image: &str) -> String {
    if image.is_empty() || image.starts_with("http://") || image.starts_with("https://") {
        return image.to_string();
    }
    format!(
        "{}/{}",
        asset_base_url.trim_end_matches('/'),
        image.trim_start_matches('/')
    )
}
