pub mod document;
pub mod form;
pub mod kyc;
