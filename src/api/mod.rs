//! The backend seam.
//!
//! The KYC service itself is an external collaborator; the stores only talk
//! to it through these traits so tests can swap in a scripted double.

use std::future::Future;

use crate::models::kyc::{KycReviewRecord, KycStatusReport, KycSubmission, ReviewRequest, ReviewStatus};
use crate::utils::form_data::FormPayload;

pub mod client;
pub mod error;
pub mod types;

pub use client::HttpKycBackend;
pub use error::{RequestError, RequestErrorKind};

pub type ApiResult<T> = std::result::Result<T, RequestError>;

/// Lawyer-facing endpoints.
pub trait KycBackend: Send + Sync {
    /// `POST /kyc/submit/` (multipart).
    fn submit(&self, payload: FormPayload) -> impl Future<Output = ApiResult<KycSubmission>> + Send;

    /// `GET /kyc/my-kyc/`; `None` when nothing has been submitted yet.
    fn fetch_mine(&self) -> impl Future<Output = ApiResult<Option<KycSubmission>>> + Send;

    /// `PUT /kyc/update/` (multipart). Only accepted while rejected.
    fn update(&self, payload: FormPayload) -> impl Future<Output = ApiResult<KycSubmission>> + Send;

    /// `GET /kyc/status/`.
    fn fetch_status(&self) -> impl Future<Output = ApiResult<KycStatusReport>> + Send;
}

/// Reviewer endpoints.
pub trait AdminBackend: Send + Sync {
    /// `GET /kyc/admin/list/[?status=]`.
    fn list(
        &self,
        filter: Option<ReviewStatus>,
    ) -> impl Future<Output = ApiResult<Vec<KycReviewRecord>>> + Send;

    /// `GET /kyc/admin/detail/{id}/`.
    fn detail(&self, id: u64) -> impl Future<Output = ApiResult<KycReviewRecord>> + Send;

    /// `PATCH /kyc/admin/review/{id}/`.
    fn review(
        &self,
        id: u64,
        request: ReviewRequest,
    ) -> impl Future<Output = ApiResult<KycReviewRecord>> + Send;
}
