//! Order settlement: submit the order, then persist each booked lesson's
//! seat count.
//!
//! ```text
//! Idle -> Validating -> Submitting -> Reconciling -> Settled
//!            |              |              |
//!            +--------------+--------------+--> Idle (failure notice)
//! ```

use std::time::Duration;

use futures::future::join_all;
use serde_json::Value;
use shared::{domain::LessonId, protocol::reply_signals_error};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::{
    api::LessonApi, events::Notice, events::NoticeContext, order::ContactDetails,
    order::OrderValidationError, with_timeout, StorefrontClient, ViewMode,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SettlementPhase {
    #[default]
    Idle,
    Validating,
    Submitting,
    Reconciling,
    Settled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationFailure {
    pub lesson_id: LessonId,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettlementError {
    #[error("order is not valid: {0}")]
    ValidationFailed(#[from] OrderValidationError),
    #[error("order submission failed: {0}")]
    SubmissionFailed(String),
    #[error("seat reconciliation failed: {}", summarize(.0))]
    ReconciliationFailed(Vec<ReconciliationFailure>),
}

fn summarize(failures: &[ReconciliationFailure]) -> String {
    failures
        .iter()
        .map(|failure| format!("lesson {}: {}", failure.lesson_id, failure.reason))
        .collect::<Vec<_>>()
        .join("; ")
}

/// What a settled order sent to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementReport {
    pub lesson_ids: Vec<LessonId>,
    pub seat_updates: Vec<(LessonId, u32)>,
}

impl StorefrontClient {
    pub fn settlement_phase(&self) -> SettlementPhase {
        self.state.phase
    }

    /// Submits the cart as an order and reconciles seat counts.
    ///
    /// Submission failure leaves cart and draft untouched. Reconciliation
    /// failure keeps the locally decremented seats, and keeps cart entries
    /// only for lessons whose seat update did not go through; the order has
    /// already been accepted at that point.
    pub async fn place_order(&mut self) -> Result<SettlementReport, SettlementError> {
        self.state.phase = SettlementPhase::Validating;
        let contact = match self.validated_contact() {
            Ok(contact) => contact,
            Err(err) => {
                self.state.phase = SettlementPhase::Idle;
                self.notify(Notice::failure(
                    NoticeContext::PlaceOrder,
                    format!("Order not submitted: {err}"),
                ));
                return Err(err.into());
            }
        };

        let lesson_ids = self.state.cart.lesson_ids();
        let request = contact.order_for(lesson_ids.clone());

        self.state.phase = SettlementPhase::Submitting;
        info!(seats = lesson_ids.len(), "submitting order");
        let submitted = with_timeout(
            self.settings.request_timeout,
            "order submission",
            self.api.place_order(&request),
        )
        .await
        .map_err(|err| format!("{err:#}"))
        .and_then(|reply| check_order_reply(&reply));
        if let Err(reason) = submitted {
            error!(%reason, "order submission failed");
            self.state.phase = SettlementPhase::Idle;
            self.notify(Notice::failure(
                NoticeContext::PlaceOrder,
                "There was an error placing the order.",
            ));
            return Err(SettlementError::SubmissionFailed(reason));
        }

        self.state.phase = SettlementPhase::Reconciling;
        let (seat_updates, mut failures) = self.pending_seat_updates();
        failures.extend(
            reconcile_seats(
                self.api.as_ref(),
                &seat_updates,
                self.settings.request_timeout,
            )
            .await,
        );

        if !failures.is_empty() {
            for failure in &failures {
                warn!(lesson_id = %failure.lesson_id, reason = %failure.reason, "seat update failed");
            }
            // seats of reconciled lessons are now sold server-side; a held
            // entry for them would be subtracted again on the next refetch
            for (lesson_id, _) in &seat_updates {
                if failures.iter().all(|failure| &failure.lesson_id != lesson_id) {
                    let dropped = self.state.cart.forget_lesson(lesson_id);
                    debug!(%lesson_id, dropped, "seat update persisted; dropping held entries");
                }
            }
            self.state.phase = SettlementPhase::Idle;
            self.notify(Notice::failure(
                NoticeContext::UpdateSpaces,
                "There was an error updating lesson spaces.",
            ));
            if self.settings.refetch_on_reconciliation_failure {
                // failure is already reported through the fetch notice
                let _ = self.load_lessons().await;
            }
            return Err(SettlementError::ReconciliationFailed(failures));
        }

        self.state.cart.clear();
        self.state.order.reset();
        self.state.view = ViewMode::Catalog;
        self.state.phase = SettlementPhase::Settled;
        info!(
            seats = lesson_ids.len(),
            lessons = seat_updates.len(),
            "order settled"
        );
        self.notify(Notice::success(
            NoticeContext::PlaceOrder,
            "Order submitted and lesson spaces updated.",
        ));

        Ok(SettlementReport {
            lesson_ids,
            seat_updates,
        })
    }

    fn validated_contact(&self) -> Result<ContactDetails, OrderValidationError> {
        let contact = self.state.order.validate()?;
        if self.state.cart.is_empty() {
            return Err(OrderValidationError::EmptyCart);
        }
        Ok(contact)
    }

    /// Current seat count for each distinct lesson in the cart.
    fn pending_seat_updates(&self) -> (Vec<(LessonId, u32)>, Vec<ReconciliationFailure>) {
        let mut updates = Vec::new();
        let mut missing = Vec::new();
        for lesson_id in self.state.cart.distinct_lessons() {
            match self.state.catalog.get(&lesson_id) {
                Some(lesson) => updates.push((lesson_id, lesson.spaces)),
                None => missing.push(ReconciliationFailure {
                    lesson_id,
                    reason: "lesson missing from catalog".into(),
                }),
            }
        }
        (updates, missing)
    }
}

fn check_order_reply(reply: &Value) -> Result<(), String> {
    if !reply.is_object() {
        return Err(format!("unexpected order response: {reply}"));
    }
    if reply_signals_error(reply) {
        return Err(format!("server rejected order: {}", reply["error"]));
    }
    Ok(())
}

/// Issues every seat update at once and waits for all of them.
async fn reconcile_seats(
    api: &dyn LessonApi,
    updates: &[(LessonId, u32)],
    limit: Duration,
) -> Vec<ReconciliationFailure> {
    let calls = updates.iter().map(|(lesson_id, spaces)| async move {
        let outcome = with_timeout(limit, "seat update", api.update_spaces(lesson_id, *spaces)).await;
        let reason = match outcome {
            Ok(reply) if reply_signals_error(&reply) => {
                format!("server reported error: {}", reply["error"])
            }
            Ok(_) => return None,
            Err(err) => format!("{err:#}"),
        };
        Some(ReconciliationFailure {
            lesson_id: lesson_id.clone(),
            reason,
        })
    });

    join_all(calls).await.into_iter().flatten().collect()
}

#[cfg(test)]
#[path = "tests/settlement_tests.rs"]
mod tests;
