use std::{future::Future, sync::Arc, time::Duration};

use anyhow::{anyhow, Result};
use shared::domain::{Lesson, LessonId, SortAttribute, SortDirection};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{info, warn};

pub mod api;
pub mod browse;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod events;
pub mod order;
pub mod settlement;

pub use api::{HttpLessonApi, LessonApi};
pub use browse::{filter_and_sort, BrowseState};
pub use cart::{Cart, CartError, CartLedger};
pub use catalog::CatalogCache;
pub use config::{load_settings, ClientSettings};
pub use events::{ClientEvent, Notice, NoticeContext, NoticeKind};
pub use order::{is_order_valid, ContactDetails, OrderDraft, OrderValidationError};
pub use settlement::{ReconciliationFailure, SettlementError, SettlementPhase, SettlementReport};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Catalog,
    Checkout,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to load lessons: {0}")]
pub struct FetchError(pub String);

/// Everything the storefront page holds for one session.
#[derive(Debug, Clone, Default)]
pub struct StorefrontState {
    catalog: CatalogCache,
    cart: Cart,
    order: OrderDraft,
    browse: BrowseState,
    view: ViewMode,
    phase: SettlementPhase,
}

impl StorefrontState {
    pub fn catalog(&self) -> &CatalogCache {
        &self.catalog
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn order(&self) -> &OrderDraft {
        &self.order
    }

    pub fn browse(&self) -> &BrowseState {
        &self.browse
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn phase(&self) -> SettlementPhase {
        self.phase
    }
}

/// Storefront view-model. All state changes go through `&mut self`, which
/// keeps the catalog's seat counts single-writer on any runtime.
pub struct StorefrontClient {
    api: Arc<dyn LessonApi>,
    settings: ClientSettings,
    state: StorefrontState,
    events: broadcast::Sender<ClientEvent>,
}

impl StorefrontClient {
    pub fn new(settings: ClientSettings) -> Result<Self> {
        let api = HttpLessonApi::new(&settings)?;
        Ok(Self::with_api(settings, Arc::new(api)))
    }

    pub fn with_api(settings: ClientSettings, api: Arc<dyn LessonApi>) -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            api,
            settings,
            state: StorefrontState::default(),
            events,
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    pub fn state(&self) -> &StorefrontState {
        &self.state
    }

    pub fn lesson(&self, lesson_id: &LessonId) -> Option<&Lesson> {
        self.state.catalog.get(lesson_id)
    }

    /// Current listing filtered and sorted for display.
    pub fn display_lessons(&self) -> Vec<&Lesson> {
        filter_and_sort(self.state.catalog.listed(), &self.state.browse)
    }

    /// Refetches the catalog with the current browse state. On failure the
    /// previous catalog stays in place.
    pub async fn load_lessons(&mut self) -> Result<usize, FetchError> {
        let query = self.state.browse.to_query();
        let fetched = with_timeout(
            self.settings.request_timeout,
            "lesson fetch",
            self.api.fetch_lessons(&query),
        )
        .await;

        let lessons = match fetched {
            Ok(lessons) => lessons,
            Err(err) => {
                let err = FetchError(format!("{err:#}"));
                self.notify(Notice::failure(NoticeContext::FetchLessons, err.to_string()));
                return Err(err);
            }
        };

        let released = self
            .state
            .catalog
            .apply_listing(lessons, &mut self.state.cart);
        for hold in released {
            self.notify(Notice::failure(
                NoticeContext::Cart,
                format!(
                    "Removed {} seat(s) of lesson {} from the cart: no longer available",
                    hold.released, hold.lesson_id
                ),
            ));
        }

        let listed = self.state.catalog.len();
        info!(listed, q = %query.q, sort = %query.sort, order = %query.order, "catalog refreshed");
        let _ = self.events.send(ClientEvent::CatalogUpdated { listed });
        Ok(listed)
    }

    pub async fn set_browse(&mut self, browse: BrowseState) -> Result<usize, FetchError> {
        self.state.browse = browse;
        self.load_lessons().await
    }

    pub async fn set_search(&mut self, search: impl Into<String>) -> Result<usize, FetchError> {
        self.state.browse.search = search.into();
        self.load_lessons().await
    }

    pub async fn set_sort(
        &mut self,
        sort: Option<SortAttribute>,
        direction: SortDirection,
    ) -> Result<usize, FetchError> {
        self.state.browse.sort = sort;
        self.state.browse.direction = direction;
        self.load_lessons().await
    }

    pub fn add_to_cart(&mut self, lesson_id: &LessonId) -> Result<(), CartError> {
        CartLedger::new(&mut self.state.cart, &mut self.state.catalog).add(lesson_id)
    }

    pub fn remove_from_cart(&mut self, lesson_id: &LessonId) -> bool {
        CartLedger::new(&mut self.state.cart, &mut self.state.catalog).remove(lesson_id)
    }

    pub fn clear_cart(&mut self) -> usize {
        CartLedger::new(&mut self.state.cart, &mut self.state.catalog).remove_all()
    }

    pub fn cart_total(&self) -> f64 {
        cart::total_price(&self.state.cart, &self.state.catalog)
    }

    pub fn has_spaces(&self, lesson_id: &LessonId) -> bool {
        self.state
            .catalog
            .get(lesson_id)
            .is_some_and(cart::has_spaces)
    }

    pub fn rate_lesson(&mut self, lesson_id: &LessonId, rating: u32) -> bool {
        self.state.catalog.set_rating(lesson_id, rating)
    }

    pub fn toggle_view(&mut self) -> ViewMode {
        self.state.view = match self.state.view {
            ViewMode::Catalog => ViewMode::Checkout,
            ViewMode::Checkout => ViewMode::Catalog,
        };
        self.state.view
    }

    pub fn order_draft_mut(&mut self) -> &mut OrderDraft {
        &mut self.state.order
    }

    pub fn set_contact(&mut self, name: impl Into<String>, phone: impl Into<String>) {
        self.state.order = OrderDraft::new(name, phone);
    }

    pub fn is_order_valid(&self) -> bool {
        self.state.order.is_valid()
    }

    fn notify(&self, notice: Notice) {
        if notice.is_failure() {
            warn!(context = ?notice.context(), "{}", notice.message());
        } else {
            info!(context = ?notice.context(), "{}", notice.message());
        }
        let _ = self.events.send(ClientEvent::Notice(notice));
    }
}

pub(crate) async fn with_timeout<T, F>(limit: Duration, operation: &str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(anyhow!(
            "{operation} timed out after {}ms",
            limit.as_millis()
        )),
    }
}

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
