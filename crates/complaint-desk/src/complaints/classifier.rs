use super::domain::Priority;

/// Safety-critical or blocking language. Any hit short-circuits to `High`.
const HIGH_KEYWORDS: &[&str] = &[
    "urgent",
    "emergency",
    "not working",
    "broken",
    "fire",
    "electrical",
    "safety",
    "dangerous",
    "immediately",
    "asap",
    "critical",
    "severe",
    "hazard",
];

/// Degraded-service language, consulted only when no high keyword matched.
const MEDIUM_KEYWORDS: &[&str] = &[
    "delay",
    "slow",
    "leakage",
    "cleanliness",
    "repair",
    "water",
    "network",
    "issue",
    "problem",
    "malfunction",
    "damage",
    "faulty",
];

/// Assign a priority from free text by case-insensitive substring matching.
///
/// Keywords embedded in longer words still count ("firewall" matches "fire").
pub fn classify(text: &str) -> Priority {
    let lowered = text.to_lowercase();

    if HIGH_KEYWORDS.iter().any(|keyword| lowered.contains(keyword)) {
        return Priority::High;
    }

    if MEDIUM_KEYWORDS
        .iter()
        .any(|keyword| lowered.contains(keyword))
    {
        return Priority::Medium;
    }

    Priority::Low
}
