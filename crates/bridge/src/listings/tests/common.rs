use std::sync::Arc;

use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;
use tower::ServiceExt;

use crate::clock::FixedClock;
use crate::config::RankingConfig;
use crate::listings::domain::{Field, ListingId, ListingInput, RecruitmentInput, UserId};
use crate::listings::repository::{ListingStore, ListingTables, RepositoryError};
use crate::listings::{listing_router, ListingService, MemoryListingStore, CALLER_HEADER};

pub(super) type TestService = ListingService<MemoryListingStore, FixedClock>;

pub(super) fn at(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, min, sec))
        .expect("valid timestamp")
}

/// Fixed "now" used across the listing tests.
pub(super) fn now() -> NaiveDateTime {
    at(2026, 10, 14, 12, 0, 0)
}

pub(super) fn far_future() -> NaiveDateTime {
    at(2050, 1, 12, 0, 0, 0)
}

pub(super) struct Harness {
    pub(super) service: TestService,
    pub(super) store: Arc<MemoryListingStore>,
    pub(super) clock: Arc<FixedClock>,
}

pub(super) fn harness() -> Harness {
    harness_with(RankingConfig::default())
}

pub(super) fn harness_with(ranking: RankingConfig) -> Harness {
    let store = Arc::new(MemoryListingStore::new());
    let clock = Arc::new(FixedClock::new(now()));
    let service = ListingService::new(store.clone(), clock.clone(), ranking);
    Harness {
        service,
        store,
        clock,
    }
}

impl Harness {
    pub(super) fn user(&self, name: &str) -> UserId {
        self.store
            .register_user(name, Vec::new(), None)
            .expect("user registered")
    }

    pub(super) fn user_with_profile(&self, name: &str, fields: Vec<Field>, career: &str) -> UserId {
        self.store
            .register_user(name, fields, Some(career.to_string()))
            .expect("user registered")
    }

    pub(super) fn listing(&self, owner: UserId, title: &str) -> ListingId {
        self.listing_with(owner, listing_input(title, "overview", far_future(), backend_entry()))
    }

    pub(super) fn listing_with(&self, owner: UserId, input: ListingInput) -> ListingId {
        self.service.create(owner, input).expect("listing created")
    }

    pub(super) fn listing_count(&self) -> usize {
        self.store
            .snapshot(|tables| -> Result<usize, RepositoryError> {
                Ok(tables.scan(&|_: &crate::listings::Listing| true)?.len())
            })
            .expect("scan")
    }

    pub(super) fn bookmark_count(&self, listing: ListingId) -> usize {
        self.store
            .snapshot(|tables| tables.bookmark_count(listing))
            .expect("count")
    }

    pub(super) fn application_count(&self, listing: ListingId, user: UserId) -> usize {
        self.store
            .snapshot(|tables| tables.applications_between(listing, user))
            .expect("applications")
            .len()
    }
}

pub(super) fn entry(field: &str, recruit_num: i64, skills: &[&str]) -> RecruitmentInput {
    RecruitmentInput {
        field: field.to_string(),
        recruit_num,
        skills: skills.iter().map(|skill| skill.to_string()).collect(),
        requirement: "아무거나".to_string(),
    }
}

pub(super) fn backend_entry() -> Vec<RecruitmentInput> {
    vec![entry("BACKEND", 3, &["JAVA", "SPRINGBOOT"])]
}

pub(super) fn listing_input(
    title: &str,
    overview: &str,
    due_date: NaiveDateTime,
    recruit: Vec<RecruitmentInput>,
) -> ListingInput {
    ListingInput {
        title: title.to_string(),
        overview: overview.to_string(),
        due_date,
        start_date: at(2024, 1, 12, 0, 0, 0),
        end_date: at(2024, 3, 12, 0, 0, 0),
        recruit,
        tag_limit: Vec::new(),
        meeting_way: "Offline".to_string(),
        stage: "Before Start".to_string(),
    }
}

/// Store whose every transaction fails, standing in for an offline database.
pub(super) struct UnavailableStore;

impl ListingStore for UnavailableStore {
    fn transaction<T, E, F>(&self, _work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn ListingTables) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        Err(E::from(RepositoryError::Unavailable(
            "database offline".to_string(),
        )))
    }

    fn snapshot<T, E, F>(&self, _work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn ListingTables) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        Err(E::from(RepositoryError::Unavailable(
            "database offline".to_string(),
        )))
    }
}

pub(super) fn router_for(harness: &Harness) -> axum::Router {
    let service = ListingService::new(
        harness.store.clone(),
        harness.clock.clone(),
        RankingConfig::default(),
    );
    listing_router(Arc::new(service))
}

pub(super) fn request(
    method: &str,
    uri: &str,
    caller: Option<UserId>,
    body: Option<Value>,
) -> Request<axum::body::Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(caller) = caller {
        builder = builder.header(CALLER_HEADER, caller.0.to_string());
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from(
                serde_json::to_vec(&body).expect("serialize body"),
            ))
            .expect("request"),
        None => builder.body(axum::body::Body::empty()).expect("request"),
    }
}

pub(super) async fn send(
    router: &axum::Router,
    request: Request<axum::body::Body>,
) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.expect("router responds");
    let status = response.status();
    (status, read_json_body(response).await)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    if body.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&body).expect("json payload")
}
