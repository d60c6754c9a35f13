use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::errors::{AppError, Result};

/// Review state as it travels on the wire (`status` column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::Approved => "approved",
            ReviewStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        // The review desk has historically used a couple of synonyms for "pending".
        match s.trim().to_lowercase().as_str() {
            "pending" | "under_review" | "in_review" => Ok(ReviewStatus::Pending),
            "approved" => Ok(ReviewStatus::Approved),
            "rejected" => Ok(ReviewStatus::Rejected),
            other => Err(format!("unknown KYC status '{}'", other)),
        }
    }
}

impl TryFrom<String> for ReviewStatus {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

/// The decision an admin can record against a pending submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approved,
    Rejected,
}

impl fmt::Display for ReviewDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewDecision::Approved => f.write_str("approved"),
            ReviewDecision::Rejected => f.write_str("rejected"),
        }
    }
}

/// Lifecycle of a submission.
///
/// Legal moves are `Pending -> Approved`, `Pending -> Rejected` and
/// `Rejected -> Pending` (resubmission). `Approved` is terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StatusFields", into = "StatusFields")]
pub enum KycStatus {
    Pending,
    Approved,
    Rejected { reason: String },
}

/// Wire form of [`KycStatus`]: the `status` + `rejection_reason` pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusFields {
    pub status: ReviewStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

impl From<StatusFields> for KycStatus {
    fn from(fields: StatusFields) -> Self {
        match fields.status {
            ReviewStatus::Pending => KycStatus::Pending,
            ReviewStatus::Approved => KycStatus::Approved,
            ReviewStatus::Rejected => KycStatus::Rejected {
                reason: fields.rejection_reason.unwrap_or_default(),
            },
        }
    }
}

impl From<KycStatus> for StatusFields {
    fn from(status: KycStatus) -> Self {
        match status {
            KycStatus::Pending => StatusFields { status: ReviewStatus::Pending, rejection_reason: None },
            KycStatus::Approved => StatusFields { status: ReviewStatus::Approved, rejection_reason: None },
            KycStatus::Rejected { reason } => StatusFields {
                status: ReviewStatus::Rejected,
                rejection_reason: Some(reason),
            },
        }
    }
}

impl KycStatus {
    pub fn review_status(&self) -> ReviewStatus {
        match self {
            KycStatus::Pending => ReviewStatus::Pending,
            KycStatus::Approved => ReviewStatus::Approved,
            KycStatus::Rejected { .. } => ReviewStatus::Rejected,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, KycStatus::Pending)
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, KycStatus::Approved)
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, KycStatus::Rejected { .. })
    }

    pub fn rejection_reason(&self) -> Option<&str> {
        match self {
            KycStatus::Rejected { reason } if !reason.is_empty() => Some(reason),
            _ => None,
        }
    }

    /// Checks a move to `next` and returns the new status.
    pub fn transition_to(&self, next: KycStatus) -> Result<KycStatus> {
        let allowed = match (self, &next) {
            (KycStatus::Pending, KycStatus::Approved) => true,
            (KycStatus::Pending, KycStatus::Rejected { reason }) => {
                if reason.trim().is_empty() {
                    return Err(AppError::ValidationError(
                        "Please provide a rejection reason".to_string(),
                    ));
                }
                true
            }
            (KycStatus::Rejected { .. }, KycStatus::Pending) => true,
            _ => false,
        };

        if !allowed {
            return Err(AppError::InvalidTransition {
                from: self.review_status().to_string(),
                to: next.review_status().to_string(),
            });
        }
        Ok(next)
    }

    pub fn approve(&self) -> Result<KycStatus> {
        self.transition_to(KycStatus::Approved)
    }

    pub fn reject(&self, reason: &str) -> Result<KycStatus> {
        self.transition_to(KycStatus::Rejected { reason: reason.trim().to_string() })
    }

    pub fn resubmit(&self) -> Result<KycStatus> {
        self.transition_to(KycStatus::Pending)
    }
}

impl fmt::Display for KycStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.review_status().as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Gender {
    Female,
    Male,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Female, Gender::Male, Gender::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Female => "Female",
            Gender::Male => "Male",
            Gender::Other => "Other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "female" | "f" => Ok(Gender::Female),
            "male" | "m" => Ok(Gender::Male),
            "other" | "o" => Ok(Gender::Other),
            _ => Err(AppError::ValidationError("Select a valid gender".to_string())),
        }
    }
}

impl TryFrom<String> for Gender {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub dob: NaiveDate,
    pub gender: Gender,
    pub permanent_address: String,
    pub current_address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfessionalInfo {
    pub bar_council_number: String,
    #[serde(default)]
    pub law_firm_name: Option<String>,
    /// Kept as text: the form offers bands such as "5-10" and "10+".
    #[serde(deserialize_with = "decimal_as_string")]
    pub years_of_experience: String,
    /// Decimal as text, e.g. "1500.00".
    #[serde(deserialize_with = "decimal_as_string")]
    pub consultation_fee: String,
    #[serde(default, deserialize_with = "string_list")]
    pub specializations: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub availability_days: Vec<String>,
    pub available_from: String,
    pub available_until: String,
}

/// URLs of the documents the backend already holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredDocuments {
    pub citizenship_front: Option<String>,
    pub citizenship_back: Option<String>,
    pub lawyer_license: Option<String>,
    pub passport_photo: Option<String>,
    pub law_degree: Option<String>,
    pub experience_certificate: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    #[serde(default)]
    pub confirm_accuracy: bool,
    #[serde(default)]
    pub authorize_verification: bool,
    #[serde(default)]
    pub agree_terms: bool,
}

/// One lawyer's verification application as returned by the backend.
///
/// Decodes both the sectioned shape (`personal_info`, `professional_info`, ...)
/// and the flat one where every column sits at the top level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SubmissionWire")]
pub struct KycSubmission {
    pub id: u64,
    #[serde(default)]
    pub user: Option<u64>,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(flatten)]
    pub status: KycStatus,
    #[serde(default)]
    pub personal_info: Option<PersonalInfo>,
    #[serde(default)]
    pub professional_info: Option<ProfessionalInfo>,
    #[serde(default)]
    pub identity_documents: Option<StoredDocuments>,
    #[serde(default)]
    pub declaration: Option<Declaration>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct SubmissionWire {
    id: u64,
    #[serde(default)]
    user: Option<u64>,
    #[serde(default)]
    user_email: Option<String>,
    #[serde(flatten)]
    status: KycStatus,
    #[serde(default)]
    personal_info: Option<PersonalInfo>,
    #[serde(default)]
    professional_info: Option<ProfessionalInfo>,
    #[serde(default)]
    identity_documents: Option<StoredDocuments>,
    #[serde(default)]
    declaration: Option<Declaration>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    columns: Map<String, Value>,
}

const PERSONAL_COLUMNS: &[&str] =
    &["full_name", "email", "phone", "dob", "gender", "permanent_address", "current_address"];
const PROFESSIONAL_COLUMNS: &[&str] = &[
    "bar_council_number",
    "law_firm_name",
    "years_of_experience",
    "consultation_fee",
    "specializations",
    "availability_days",
    "available_from",
    "available_until",
];
const DOCUMENT_COLUMNS: &[&str] = &[
    "citizenship_front",
    "citizenship_back",
    "lawyer_license",
    "passport_photo",
    "law_degree",
    "experience_certificate",
];
const DECLARATION_COLUMNS: &[&str] = &["confirm_accuracy", "authorize_verification", "agree_terms"];

/// Reads a section out of top-level columns. `None` when none of its
/// columns are present or they do not form a complete section.
fn section<T: DeserializeOwned>(columns: &Value, keys: &[&str]) -> Option<T> {
    let present = keys.iter().any(|key| columns.get(*key).is_some_and(|v| !v.is_null()));
    if !present {
        return None;
    }
    T::deserialize(columns).ok()
}

impl From<SubmissionWire> for KycSubmission {
    fn from(wire: SubmissionWire) -> Self {
        let columns = Value::Object(wire.columns);
        KycSubmission {
            id: wire.id,
            user: wire.user,
            user_email: wire.user_email,
            status: wire.status,
            personal_info: wire.personal_info.or_else(|| section(&columns, PERSONAL_COLUMNS)),
            professional_info: wire
                .professional_info
                .or_else(|| section(&columns, PROFESSIONAL_COLUMNS)),
            identity_documents: wire
                .identity_documents
                .or_else(|| section(&columns, DOCUMENT_COLUMNS)),
            declaration: wire.declaration.or_else(|| section(&columns, DECLARATION_COLUMNS)),
            created_at: wire.created_at,
            updated_at: wire.updated_at,
        }
    }
}

impl KycSubmission {
    pub fn applicant_name(&self) -> &str {
        self.personal_info
            .as_ref()
            .map(|p| p.full_name.as_str())
            .or(self.user_email.as_deref())
            .unwrap_or("unknown applicant")
    }
}

/// Whether the caller has submitted anything yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState {
    NotSubmitted,
    Submitted(KycStatus),
}

/// Result of the lightweight status read.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "StatusReportWire")]
pub struct KycStatusReport {
    pub id: Option<u64>,
    pub state: SubmissionState,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl KycStatusReport {
    pub fn not_submitted() -> Self {
        Self { id: None, state: SubmissionState::NotSubmitted, created_at: None, updated_at: None }
    }

    pub fn status(&self) -> Option<&KycStatus> {
        match &self.state {
            SubmissionState::Submitted(status) => Some(status),
            SubmissionState::NotSubmitted => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusReportWire {
    #[serde(default)]
    id: Option<u64>,
    status: String,
    #[serde(default)]
    rejection_reason: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<StatusReportWire> for KycStatusReport {
    type Error = String;

    fn try_from(wire: StatusReportWire) -> std::result::Result<Self, Self::Error> {
        let state = if wire.status == "not_submitted" {
            SubmissionState::NotSubmitted
        } else {
            let status: ReviewStatus = wire.status.parse()?;
            SubmissionState::Submitted(KycStatus::from(StatusFields {
                status,
                rejection_reason: wire.rejection_reason,
            }))
        };
        Ok(Self { id: wire.id, state, created_at: wire.created_at, updated_at: wire.updated_at })
    }
}

/// What the reviewer did to a record during this session.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewAction {
    pub decision: ReviewDecision,
    pub reason: Option<String>,
    pub reviewed_at: DateTime<Utc>,
}

/// Admin-facing projection of a submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KycReviewRecord {
    #[serde(flatten)]
    pub submission: KycSubmission,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(skip)]
    pub last_action: Option<ReviewAction>,
}

impl KycReviewRecord {
    pub fn id(&self) -> u64 {
        self.submission.id
    }

    pub fn status(&self) -> &KycStatus {
        &self.submission.status
    }
}

/// Body of the admin review call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewRequest {
    pub status: ReviewDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

fn decimal_as_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("expected decimal, got {}", other))),
    }
}

// Multipart uploads carry lists as JSON text, so the backend may echo either shape.
fn string_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(Vec::new()),
        serde_json::Value::String(s) => serde_json::from_str(&s).map_err(serde::de::Error::custom),
        value => serde_json::from_value(value).map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_decodes_from_wire_pair() {
        let status: KycStatus =
            serde_json::from_value(json!({"status": "rejected", "rejection_reason": "Blurry license"}))
                .unwrap();
        assert_eq!(status, KycStatus::Rejected { reason: "Blurry license".into() });
        assert_eq!(status.rejection_reason(), Some("Blurry license"));

        let pending: KycStatus = serde_json::from_value(json!({"status": "under_review"})).unwrap();
        assert!(pending.is_pending());
    }

    #[test]
    fn only_documented_transitions_are_allowed() {
        assert!(KycStatus::Pending.approve().unwrap().is_approved());
        assert!(KycStatus::Pending.reject("Missing degree").unwrap().is_rejected());
        let rejected = KycStatus::Rejected { reason: "x".into() };
        assert!(rejected.resubmit().unwrap().is_pending());

        assert!(matches!(KycStatus::Approved.resubmit(), Err(AppError::InvalidTransition { .. })));
        assert!(matches!(KycStatus::Approved.reject("late"), Err(AppError::InvalidTransition { .. })));
        assert!(matches!(rejected.approve(), Err(AppError::InvalidTransition { .. })));
        assert!(matches!(KycStatus::Pending.resubmit(), Err(AppError::InvalidTransition { .. })));
    }

    #[test]
    fn rejection_needs_a_reason() {
        assert!(matches!(KycStatus::Pending.reject("   "), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn submission_decodes_nested_backend_payload() {
        let payload = json!({
            "id": 7,
            "user": 3,
            "user_email": "ram@x.com",
            "status": "pending",
            "personal_info": {
                "full_name": "Ram Kumar",
                "email": "ram@x.com",
                "phone": "9800000000",
                "dob": "1990-01-01",
                "gender": "Male",
                "permanent_address": "Kathmandu-1",
                "current_address": "Kathmandu-2"
            },
            "professional_info": {
                "bar_council_number": "NBC-12345",
                "law_firm_name": null,
                "years_of_experience": "5-10",
                "consultation_fee": "1500.00",
                "specializations": "[\"Civil Law\"]",
                "availability_days": ["Monday", "Friday"],
                "available_from": "09:00:00",
                "available_until": "17:00:00"
            },
            "identity_documents": {
                "citizenship_front": "/media/kyc/documents/front.png"
            },
            "declaration": {"confirm_accuracy": true, "authorize_verification": true, "agree_terms": true},
            "created_at": "2024-05-01T10:00:00Z"
        });
        let submission: KycSubmission = serde_json::from_value(payload).unwrap();
        assert_eq!(submission.id, 7);
        assert!(submission.status.is_pending());
        assert_eq!(submission.applicant_name(), "Ram Kumar");
        let professional = submission.professional_info.unwrap();
        assert_eq!(professional.consultation_fee, "1500.00");
        assert_eq!(professional.specializations, vec!["Civil Law".to_string()]);
        assert_eq!(professional.availability_days.len(), 2);
    }

    #[test]
    fn submission_decodes_flat_backend_payload() {
        let payload = json!({
            "id": 11,
            "user": 3,
            "user_email": "ram@x.com",
            "profile_image": null,
            "status": "rejected",
            "rejection_reason": "License photo is blurry",
            "verified_at": null,
            "full_name": "Ram Kumar",
            "email": "ram@x.com",
            "phone": "9800000000",
            "dob": "1990-01-01",
            "gender": "male",
            "permanent_address": "Kathmandu-1",
            "current_address": "Kathmandu-2",
            "bar_council_number": "NBC-12345",
            "law_firm_name": "",
            "years_of_experience": 5,
            "consultation_fee": "1500.00",
            "specializations": ["Civil Law"],
            "availability_days": ["Monday"],
            "available_from": "09:00:00",
            "available_until": "17:00:00",
            "citizenship_front": "/media/kyc/front.png",
            "citizenship_back": "/media/kyc/back.png",
            "lawyer_license": "/media/kyc/license.pdf",
            "passport_photo": "/media/kyc/photo.png",
            "law_degree": "/media/kyc/degree.pdf",
            "experience_certificate": null,
            "confirm_accuracy": true,
            "authorize_verification": true,
            "agree_terms": true,
            "created_at": "2024-05-01T10:00:00Z",
            "updated_at": "2024-05-02T10:00:00Z"
        });
        let submission: KycSubmission = serde_json::from_value(payload).unwrap();
        assert_eq!(submission.status.rejection_reason(), Some("License photo is blurry"));
        assert_eq!(submission.applicant_name(), "Ram Kumar");

        let personal = submission.personal_info.unwrap();
        assert_eq!(personal.gender, Gender::Male);
        let professional = submission.professional_info.unwrap();
        assert_eq!(professional.bar_council_number, "NBC-12345");
        assert_eq!(professional.years_of_experience, "5");
        let docs = submission.identity_documents.unwrap();
        assert_eq!(docs.lawyer_license.as_deref(), Some("/media/kyc/license.pdf"));
        assert_eq!(docs.experience_certificate, None);
        assert!(submission.declaration.unwrap().agree_terms);
    }

    #[test]
    fn submission_without_sections_decodes_empty() {
        let submission: KycSubmission =
            serde_json::from_value(json!({"id": 2, "status": "pending", "user_email": "a@b.com"})).unwrap();
        assert_eq!(submission.personal_info, None);
        assert_eq!(submission.identity_documents, None);
        assert_eq!(submission.declaration, None);
        assert_eq!(submission.applicant_name(), "a@b.com");
    }

    #[test]
    fn status_report_understands_not_submitted() {
        let report: KycStatusReport =
            serde_json::from_value(json!({"status": "not_submitted", "message": "KYC not yet submitted"}))
                .unwrap();
        assert_eq!(report.state, SubmissionState::NotSubmitted);

        let report: KycStatusReport =
            serde_json::from_value(json!({"id": 4, "status": "approved"})).unwrap();
        assert_eq!(report.status(), Some(&KycStatus::Approved));
    }
}
