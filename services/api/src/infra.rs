use bridge::listings::{Field, MemoryListingStore, RepositoryError, UserId};
use chrono::NaiveDateTime;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Users seeded into the in-memory directory for local runs.
pub(crate) const DEMO_USERS: [(&str, &[Field], &str); 4] = [
    ("bridge1", &[Field::Backend], "career1"),
    ("bridge2", &[Field::Frontend, Field::Design], "career2"),
    ("bridge3", &[Field::Ios], "career3"),
    ("bridge4", &[Field::Planning], "career4"),
];

pub(crate) fn seed_demo_users(store: &MemoryListingStore) -> Result<Vec<UserId>, RepositoryError> {
    DEMO_USERS
        .iter()
        .map(|(name, fields, career)| {
            store.register_user(*name, fields.to_vec(), Some(career.to_string()))
        })
        .collect()
}

pub(crate) fn parse_datetime(raw: &str) -> Result<NaiveDateTime, String> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DDTHH:MM:SS ({err})"))
}
