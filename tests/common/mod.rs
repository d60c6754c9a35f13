//! Scripted in-memory backend shared by the store and flow tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use lawkyc::api::{AdminBackend, ApiResult, KycBackend, RequestError};
use lawkyc::models::document::{DocumentFile, DocumentSlot};
use lawkyc::models::form::{
    DeclarationForm, DocumentsForm, KycForm, PersonalForm, ProfessionalForm,
};
use lawkyc::models::kyc::{
    Gender, KycReviewRecord, KycStatus, KycStatusReport, KycSubmission, ReviewRequest,
    ReviewStatus,
};
use lawkyc::utils::form_data::FormPayload;

/// Queue of canned responses, each with an optional delay.
pub struct Scripted<T>(Mutex<VecDeque<(Duration, ApiResult<T>)>>);

impl<T> Default for Scripted<T> {
    fn default() -> Self {
        Self(Mutex::new(VecDeque::new()))
    }
}

impl<T> Scripted<T> {
    pub fn push(&self, result: ApiResult<T>) {
        self.push_delayed(Duration::ZERO, result);
    }

    pub fn push_delayed(&self, delay: Duration, result: ApiResult<T>) {
        self.0.lock().unwrap().push_back((delay, result));
    }

    fn next(&self) -> (Duration, ApiResult<T>) {
        self.0
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| (Duration::ZERO, Err(RequestError::network("no scripted response"))))
    }
}

async fn respond<T>(scripted: &Scripted<T>) -> ApiResult<T> {
    let (delay, result) = scripted.next();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    result
}

#[derive(Default)]
pub struct ScriptedBackend {
    pub submit: Scripted<KycSubmission>,
    pub fetch_mine: Scripted<Option<KycSubmission>>,
    pub update: Scripted<KycSubmission>,
    pub status: Scripted<KycStatusReport>,
    pub list: Scripted<Vec<KycReviewRecord>>,
    pub detail: Scripted<KycReviewRecord>,
    pub review: Scripted<KycReviewRecord>,
    calls: Mutex<Vec<&'static str>>,
    payloads: Mutex<Vec<FormPayload>>,
    reviews: Mutex<Vec<(u64, ReviewRequest)>>,
    list_filters: Mutex<Vec<Option<ReviewStatus>>>,
}

impl ScriptedBackend {
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == name).count()
    }

    pub fn payloads(&self) -> Vec<FormPayload> {
        self.payloads.lock().unwrap().clone()
    }

    pub fn reviews(&self) -> Vec<(u64, ReviewRequest)> {
        self.reviews.lock().unwrap().clone()
    }

    pub fn list_filters(&self) -> Vec<Option<ReviewStatus>> {
        self.list_filters.lock().unwrap().clone()
    }

    fn record(&self, name: &'static str) {
        self.calls.lock().unwrap().push(name);
    }
}

impl KycBackend for ScriptedBackend {
    async fn submit(&self, payload: FormPayload) -> ApiResult<KycSubmission> {
        self.record("submit");
        self.payloads.lock().unwrap().push(payload);
        respond(&self.submit).await
    }

    async fn fetch_mine(&self) -> ApiResult<Option<KycSubmission>> {
        self.record("fetch_mine");
        respond(&self.fetch_mine).await
    }

    async fn update(&self, payload: FormPayload) -> ApiResult<KycSubmission> {
        self.record("update");
        self.payloads.lock().unwrap().push(payload);
        respond(&self.update).await
    }

    async fn fetch_status(&self) -> ApiResult<KycStatusReport> {
        self.record("fetch_status");
        respond(&self.status).await
    }
}

impl AdminBackend for ScriptedBackend {
    async fn list(&self, filter: Option<ReviewStatus>) -> ApiResult<Vec<KycReviewRecord>> {
        self.record("list");
        self.list_filters.lock().unwrap().push(filter);
        respond(&self.list).await
    }

    async fn detail(&self, _id: u64) -> ApiResult<KycReviewRecord> {
        self.record("detail");
        respond(&self.detail).await
    }

    async fn review(&self, id: u64, request: ReviewRequest) -> ApiResult<KycReviewRecord> {
        self.record("review");
        self.reviews.lock().unwrap().push((id, request));
        respond(&self.review).await
    }
}

pub fn submission(id: u64, status: KycStatus) -> KycSubmission {
    KycSubmission {
        id,
        user: Some(7),
        user_email: Some("ram.kumar@example.com".into()),
        status,
        personal_info: None,
        professional_info: None,
        identity_documents: None,
        declaration: None,
        created_at: None,
        updated_at: None,
    }
}

pub fn record(id: u64, status: KycStatus) -> KycReviewRecord {
    KycReviewRecord {
        submission: submission(id, status),
        user_name: Some(format!("Lawyer {}", id)),
        last_action: None,
    }
}

pub fn rejected(reason: &str) -> KycStatus {
    KycStatus::Rejected { reason: reason.into() }
}

pub fn personal() -> PersonalForm {
    PersonalForm {
        full_name: "Ram Kumar".into(),
        email: "ram.kumar@example.com".into(),
        phone: "+977 9841234567".into(),
        dob: "1990-05-14".into(),
        gender: Some(Gender::Male),
        permanent_address: "Ward 4, Kathmandu".into(),
        current_address: "Jhamsikhel, Lalitpur".into(),
    }
}

pub fn professional() -> ProfessionalForm {
    ProfessionalForm {
        bar_council_number: "NBC-20931".into(),
        law_firm_name: "Kumar & Associates".into(),
        years_of_experience: "5-10".into(),
        consultation_fee: "1500".into(),
        specializations: vec!["Criminal Law".into(), "Family Law".into()],
        availability_days: vec!["Monday".into(), "Wednesday".into()],
        available_from: "09:00".into(),
        available_until: "17:00".into(),
    }
}

pub fn documents() -> DocumentsForm {
    let upload = |name: &str| DocumentSlot::Upload(DocumentFile::new(name, vec![0x25, 0x50, 0x44, 0x46]));
    DocumentsForm {
        citizenship_front: upload("citizenship_front.pdf"),
        citizenship_back: upload("citizenship_back.pdf"),
        lawyer_license: upload("license.pdf"),
        passport_photo: upload("photo.png"),
        law_degree: upload("degree.pdf"),
        experience_certificate: upload("experience.pdf"),
    }
}

pub fn declaration() -> DeclarationForm {
    DeclarationForm { confirm_accuracy: true, authorize_verification: true, agree_terms: true }
}

/// A form that passes every tab.
pub fn valid_form() -> KycForm {
    KycForm {
        personal: personal(),
        professional: professional(),
        documents: documents(),
        declaration: declaration(),
    }
}
