//! Complaint intake, triage, and resolution tracking.
//!
//! Students file complaints (optionally with an attachment), every complaint is triaged with a
//! keyword-based priority and a short summary, and administrators move complaints through their
//! status lifecycle with a written response.

pub mod accounts;
pub mod attachments;
pub mod complaints;
pub mod config;
pub mod error;
pub mod store;
pub mod telemetry;
