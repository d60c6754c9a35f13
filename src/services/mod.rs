pub mod admin_review;
pub mod form_flow;
pub mod kyc_store;
pub mod operation;

pub use admin_review::{AdminReviewStore, AdminState, ReviewCounts};
pub use form_flow::{FlowMode, FlowPhase, KycWizard};
pub use kyc_store::{KycState, KycStore};
pub use operation::OperationState;
