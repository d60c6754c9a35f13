//! Lawyer KYC client: the multi-step submission wizard, the lawyer-side
//! KYC store and the admin review desk, over the KYC REST backend.

pub mod api;
pub mod config;
pub mod errors;
pub mod models;
pub mod services;
pub mod utils;
