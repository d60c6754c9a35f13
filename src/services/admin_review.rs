use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::api::{AdminBackend, ApiResult, RequestError};
use crate::errors::AppError;
use crate::models::kyc::{
    KycReviewRecord, KycStatus, ReviewAction, ReviewDecision, ReviewRequest, ReviewStatus,
};
use crate::services::operation::{Generations, OperationState};

pub const REASON_REQUIRED: &str = "Please provide a rejection reason";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminOperation {
    List,
    Detail,
    Review,
}

impl AdminOperation {
    fn index(self) -> usize {
        match self {
            AdminOperation::List => 0,
            AdminOperation::Detail => 1,
            AdminOperation::Review => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AdminOperation::List => "list",
            AdminOperation::Detail => "detail",
            AdminOperation::Review => "review",
        }
    }
}

/// Tally shown on the review desk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReviewCounts {
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

impl ReviewCounts {
    pub fn total(&self) -> usize {
        self.pending + self.approved + self.rejected
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdminState {
    pub records: Vec<KycReviewRecord>,
    /// Filter the current list was loaded with.
    pub filter: Option<ReviewStatus>,
    pub list: OperationState<usize>,
    pub detail: OperationState<KycReviewRecord>,
    pub review: OperationState<KycReviewRecord>,
}

impl AdminState {
    pub fn record(&self, id: u64) -> Option<&KycReviewRecord> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn filtered(&self, status: Option<ReviewStatus>) -> Vec<&KycReviewRecord> {
        self.records
            .iter()
            .filter(|r| status.map_or(true, |s| r.status().review_status() == s))
            .collect()
    }

    pub fn counts(&self) -> ReviewCounts {
        self.records.iter().fold(ReviewCounts::default(), |mut counts, record| {
            match record.status() {
                KycStatus::Pending => counts.pending += 1,
                KycStatus::Approved => counts.approved += 1,
                KycStatus::Rejected { .. } => counts.rejected += 1,
            }
            counts
        })
    }

    fn replace(&mut self, record: KycReviewRecord) -> bool {
        match self.records.iter_mut().find(|r| r.id() == record.id()) {
            Some(slot) => {
                *slot = record;
                true
            }
            None => false,
        }
    }

    fn mark_pending(&mut self, op: AdminOperation) {
        match op {
            AdminOperation::List => self.list = OperationState::Pending,
            AdminOperation::Detail => self.detail = OperationState::Pending,
            AdminOperation::Review => self.review = OperationState::Pending,
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    state: AdminState,
    generations: Generations<3>,
}

/// Reviewer-side store: the submission list plus approve / reject.
pub struct AdminReviewStore<B> {
    backend: B,
    inner: Mutex<Inner>,
}

impl<B: AdminBackend> AdminReviewStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend, inner: Mutex::new(Inner::default()) }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub async fn state(&self) -> AdminState {
        self.inner.lock().await.state.clone()
    }

    /// Loads submissions, optionally narrowed to one status.
    pub async fn list(&self, filter: Option<ReviewStatus>) -> ApiResult<Vec<KycReviewRecord>> {
        let generation = self.begin(AdminOperation::List).await;
        let result = self.backend.list(filter).await;

        self.finish(AdminOperation::List, generation, |state| match &result {
            Ok(records) => {
                info!(count = records.len(), filter = filter.map(|f| f.as_str()), "KYC list loaded");
                state.records = records.clone();
                state.filter = filter;
                state.list = OperationState::Succeeded(records.len());
            }
            Err(err) => state.list = OperationState::Failed(err.clone()),
        })
        .await;
        result
    }

    /// Fetches one submission and refreshes its row if it is listed.
    pub async fn detail(&self, id: u64) -> ApiResult<KycReviewRecord> {
        let generation = self.begin(AdminOperation::Detail).await;
        let result = self.backend.detail(id).await;

        self.finish(AdminOperation::Detail, generation, |state| {
            if let Ok(record) = &result {
                let mut fresh = record.clone();
                fresh.last_action = state.record(id).and_then(|r| r.last_action.clone());
                state.replace(fresh);
            }
            state.detail = OperationState::from_result(&result);
        })
        .await;
        result
    }

    pub async fn approve(&self, id: u64) -> ApiResult<KycReviewRecord> {
        self.review(id, ReviewDecision::Approved, None).await
    }

    /// Rejects with a reason. A blank reason never reaches the backend and
    /// leaves the store untouched.
    pub async fn reject(&self, id: u64, reason: &str) -> ApiResult<KycReviewRecord> {
        let reason = reason.trim();
        if reason.is_empty() {
            debug!(kyc_id = id, "rejection without reason blocked");
            return Err(RequestError::validation(REASON_REQUIRED));
        }
        self.review(id, ReviewDecision::Rejected, Some(reason.to_string())).await
    }

    async fn review(
        &self,
        id: u64,
        decision: ReviewDecision,
        reason: Option<String>,
    ) -> ApiResult<KycReviewRecord> {
        if let Some(current) = self.current_status(id).await {
            let checked = match &reason {
                Some(reason) => current.reject(reason),
                None => current.approve(),
            };
            if let Err(err) = checked {
                let message = match err {
                    AppError::ValidationError(message) => message,
                    other => other.to_string(),
                };
                warn!(kyc_id = id, %decision, error = %message, "review refused locally");
                return Err(RequestError::validation(message));
            }
        }

        let generation = self.begin(AdminOperation::Review).await;
        let request = ReviewRequest { status: decision, rejection_reason: reason.clone() };
        let result = self.backend.review(id, request).await.map(|mut record| {
            // Older backends echo a rejection without its reason.
            if let (KycStatus::Rejected { reason: echoed }, Some(sent)) =
                (&mut record.submission.status, &reason)
            {
                if echoed.is_empty() {
                    *echoed = sent.clone();
                }
            }
            record.last_action = Some(ReviewAction { decision, reason, reviewed_at: Utc::now() });
            record
        });

        self.finish(AdminOperation::Review, generation, |state| match &result {
            Ok(record) => {
                info!(kyc_id = id, %decision, "KYC reviewed");
                if !state.replace(record.clone()) {
                    debug!(kyc_id = id, "reviewed record is not in the loaded list");
                }
                state.review = OperationState::Succeeded(record.clone());
            }
            Err(err) => {
                warn!(kyc_id = id, %decision, error = %err, "review failed");
                state.review = OperationState::Failed(err.clone());
            }
        })
        .await;
        result
    }

    /// Clears errors and success markers.
    pub async fn clear(&self) {
        let mut inner = self.inner.lock().await;
        inner.state.list.settle();
        inner.state.detail.settle();
        inner.state.review.settle();
    }

    async fn current_status(&self, id: u64) -> Option<KycStatus> {
        let inner = self.inner.lock().await;
        inner.state.record(id).map(|r| r.status().clone())
    }

    async fn begin(&self, op: AdminOperation) -> u64 {
        let mut inner = self.inner.lock().await;
        inner.state.mark_pending(op);
        inner.generations.bump(op.index())
    }

    async fn finish(&self, op: AdminOperation, generation: u64, apply: impl FnOnce(&mut AdminState)) -> bool {
        let mut inner = self.inner.lock().await;
        if !inner.generations.is_current(op.index(), generation) {
            debug!(operation = op.name(), generation, "discarding stale response");
            return false;
        }
        apply(&mut inner.state);
        true
    }
}
