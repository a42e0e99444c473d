use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

use super::domain::ComplaintId;

pub const COMPLAINT_ID_PREFIX: &str = "CMP";

/// Source of human-facing complaint references.
pub trait ComplaintIdGenerator: Send + Sync {
    fn next_id(&self) -> ComplaintId;
}

static COMPLAINT_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// `CMP` + unix milliseconds + a four digit process-wide sequence.
///
/// The sequence keeps references distinct within one process even when several are minted in
/// the same millisecond; the repository still rejects a cross-process duplicate.
#[derive(Debug, Default, Clone, Copy)]
pub struct SequencedIdGenerator;

impl ComplaintIdGenerator for SequencedIdGenerator {
    fn next_id(&self) -> ComplaintId {
        let millis = Utc::now().timestamp_millis();
        let sequence = COMPLAINT_SEQUENCE.fetch_add(1, Ordering::Relaxed) % 10_000;
        ComplaintId(format!("{COMPLAINT_ID_PREFIX}{millis}{sequence:04}"))
    }
}
