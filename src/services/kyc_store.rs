use chrono::NaiveDate;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::api::{ApiResult, KycBackend, RequestError};
use crate::errors::AppError;
use crate::models::form::KycForm;
use crate::models::kyc::{KycStatus, KycStatusReport, KycSubmission};
use crate::services::operation::{Generations, OperationState};
use crate::utils::form_data::FormPayload;
use crate::utils::validation::{self, Validator};

pub const UPDATE_REQUIRES_REJECTED: &str = "KYC can only be updated when status is 'rejected'.";

/// The lawyer-side operations the store tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KycOperation {
    Submit,
    Fetch,
    Update,
    Status,
}

impl KycOperation {
    fn index(self) -> usize {
        match self {
            KycOperation::Submit => 0,
            KycOperation::Fetch => 1,
            KycOperation::Update => 2,
            KycOperation::Status => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            KycOperation::Submit => "submit",
            KycOperation::Fetch => "fetch",
            KycOperation::Update => "update",
            KycOperation::Status => "status",
        }
    }
}

/// Snapshot of everything the lawyer-facing views render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KycState {
    /// Last submission the backend handed back.
    pub my_kyc: Option<KycSubmission>,
    /// Last status report.
    pub status: Option<KycStatusReport>,
    pub submit: OperationState<KycSubmission>,
    pub fetch: OperationState<Option<KycSubmission>>,
    pub update: OperationState<KycSubmission>,
    pub status_check: OperationState<KycStatusReport>,
}

impl KycState {
    pub fn is_loading(&self) -> bool {
        self.submit.is_loading()
            || self.fetch.is_loading()
            || self.update.is_loading()
            || self.status_check.is_loading()
    }

    /// First error among the tracked operations, if any.
    pub fn error(&self) -> Option<&str> {
        self.submit
            .error()
            .or_else(|| self.update.error())
            .or_else(|| self.fetch.error())
            .or_else(|| self.status_check.error())
    }

    /// Best known status: the cached submission first, then the status report.
    pub fn current_status(&self) -> Option<&KycStatus> {
        self.my_kyc
            .as_ref()
            .map(|kyc| &kyc.status)
            .or_else(|| self.status.as_ref().and_then(|report| report.status()))
    }

    fn mark_pending(&mut self, op: KycOperation) {
        match op {
            KycOperation::Submit => self.submit = OperationState::Pending,
            KycOperation::Fetch => self.fetch = OperationState::Pending,
            KycOperation::Update => self.update = OperationState::Pending,
            KycOperation::Status => self.status_check = OperationState::Pending,
        }
    }

    fn mark_failed(&mut self, op: KycOperation, err: RequestError) {
        match op {
            KycOperation::Submit => self.submit = OperationState::Failed(err),
            KycOperation::Fetch => self.fetch = OperationState::Failed(err),
            KycOperation::Update => self.update = OperationState::Failed(err),
            KycOperation::Status => self.status_check = OperationState::Failed(err),
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    state: KycState,
    generations: Generations<4>,
}

/// Client-side record of the signed-in lawyer's KYC.
///
/// Every operation writes its own [`OperationState`]; a response that
/// arrives after a newer dispatch of the same operation is dropped.
pub struct KycStore<B> {
    backend: B,
    inner: Mutex<Inner>,
}

impl<B: KycBackend> KycStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend, inner: Mutex::new(Inner::default()) }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub async fn state(&self) -> KycState {
        self.inner.lock().await.state.clone()
    }

    pub async fn my_kyc(&self) -> Option<KycSubmission> {
        self.inner.lock().await.state.my_kyc.clone()
    }

    /// Sends a first submission. The form is validated locally before
    /// anything goes over the wire.
    pub async fn submit(&self, form: &KycForm) -> ApiResult<KycSubmission> {
        self.submit_on(form, validation::today()).await
    }

    /// [`KycStore::submit`] with the age check evaluated on `today`.
    pub async fn submit_on(&self, form: &KycForm, today: NaiveDate) -> ApiResult<KycSubmission> {
        let payload = match Self::prepare(form, today) {
            Ok(payload) => payload,
            Err(err) => return Err(self.reject_locally(KycOperation::Submit, err).await),
        };

        let generation = self.begin(KycOperation::Submit).await;
        info!(generation, fields = payload.names().count(), "submitting KYC");
        let result = self.backend.submit(payload).await;

        self.finish(KycOperation::Submit, generation, |state| {
            if let Ok(submission) = &result {
                state.my_kyc = Some(submission.clone());
            }
            state.submit = OperationState::from_result(&result);
        })
        .await;
        result
    }

    /// Loads the caller's own submission. `Ok(None)` means nothing was submitted yet.
    pub async fn fetch_mine(&self) -> ApiResult<Option<KycSubmission>> {
        let generation = self.begin(KycOperation::Fetch).await;
        let result = self.backend.fetch_mine().await;

        self.finish(KycOperation::Fetch, generation, |state| {
            if let Ok(mine) = &result {
                state.my_kyc = mine.clone();
            }
            state.fetch = OperationState::from_result(&result);
        })
        .await;
        result
    }

    /// Resubmits after a rejection. Refused locally while the cached
    /// submission is in any other status.
    pub async fn update(&self, form: &KycForm) -> ApiResult<KycSubmission> {
        self.update_on(form, validation::today()).await
    }

    /// [`KycStore::update`] with the age check evaluated on `today`.
    pub async fn update_on(&self, form: &KycForm, today: NaiveDate) -> ApiResult<KycSubmission> {
        let cached = self.my_kyc().await;
        if let Some(kyc) = &cached {
            if kyc.status.resubmit().is_err() {
                let err = RequestError::validation(UPDATE_REQUIRES_REJECTED);
                return Err(self.reject_locally(KycOperation::Update, err).await);
            }
        }

        let payload = match Self::prepare(form, today) {
            Ok(payload) => payload,
            Err(err) => return Err(self.reject_locally(KycOperation::Update, err).await),
        };

        let generation = self.begin(KycOperation::Update).await;
        info!(generation, kyc_id = cached.as_ref().map(|k| k.id), "resubmitting KYC");
        let result = self.backend.update(payload).await;

        if let Ok(submission) = &result {
            if !submission.status.is_pending() {
                warn!(kyc_id = submission.id, status = %submission.status, "resubmission did not return to pending");
            }
        }

        self.finish(KycOperation::Update, generation, |state| {
            if let Ok(submission) = &result {
                state.my_kyc = Some(submission.clone());
            }
            state.update = OperationState::from_result(&result);
        })
        .await;
        result
    }

    /// Refreshes the lightweight status report. Leaves `my_kyc` alone.
    pub async fn fetch_status(&self) -> ApiResult<KycStatusReport> {
        let generation = self.begin(KycOperation::Status).await;
        let result = self.backend.fetch_status().await;

        self.finish(KycOperation::Status, generation, |state| {
            if let Ok(report) = &result {
                state.status = Some(report.clone());
            }
            state.status_check = OperationState::from_result(&result);
        })
        .await;
        result
    }

    /// Forgets errors and success markers. Cached data and in-flight
    /// operations are untouched.
    pub async fn clear(&self) {
        let mut inner = self.inner.lock().await;
        let state = &mut inner.state;
        state.submit.settle();
        state.fetch.settle();
        state.update.settle();
        state.status_check.settle();
    }

    fn prepare(form: &KycForm, today: NaiveDate) -> Result<FormPayload, RequestError> {
        let errors = Validator::validate_form(form, today);
        if let Some((field, message)) = errors.first() {
            debug!(field = %field, invalid = errors.len(), "form rejected before submission");
            return Err(RequestError::validation(message));
        }
        FormPayload::from_form(form).map_err(|e| match e {
            AppError::ValidationError(message) => RequestError::validation(message),
            other => RequestError::validation(other.to_string()),
        })
    }

    async fn begin(&self, op: KycOperation) -> u64 {
        let mut inner = self.inner.lock().await;
        inner.state.mark_pending(op);
        inner.generations.bump(op.index())
    }

    /// Records a failure that never reached the backend. Counts as a newer
    /// dispatch, so an older response for the same operation is dropped.
    async fn reject_locally(&self, op: KycOperation, err: RequestError) -> RequestError {
        let mut inner = self.inner.lock().await;
        inner.generations.bump(op.index());
        warn!(operation = op.name(), error = %err, "operation refused locally");
        inner.state.mark_failed(op, err.clone());
        err
    }

    async fn finish(&self, op: KycOperation, generation: u64, apply: impl FnOnce(&mut KycState)) -> bool {
        let mut inner = self.inner.lock().await;
        if !inner.generations.is_current(op.index(), generation) {
            debug!(operation = op.name(), generation, "discarding stale response");
            return false;
        }
        apply(&mut inner.state);
        true
    }
}
