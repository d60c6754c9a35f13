pub mod admin_handler;
pub mod kyc_handler;
