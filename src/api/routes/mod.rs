//! API route handlers

pub mod checkin;
pub mod health;
pub mod ingest;
pub mod insights;
