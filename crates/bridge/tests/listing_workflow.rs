//! End-to-end scenarios for the listing lifecycle through the public service facade and router.
//!
//! Each scenario builds a fresh in-memory store with a pinned clock so deadline-based queries are
//! deterministic.

mod common {
    use std::sync::Arc;

    use chrono::{NaiveDate, NaiveDateTime};

    use bridge::clock::FixedClock;
    use bridge::config::RankingConfig;
    use bridge::listings::{
        Field, ListingInput, ListingService, MemoryListingStore, RecruitmentInput, UserId,
    };

    pub(super) type Service = ListingService<MemoryListingStore, FixedClock>;

    pub(super) fn timestamp(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        min: u32,
        sec: u32,
    ) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(hour, min, sec))
            .expect("valid timestamp")
    }

    pub(super) fn now() -> NaiveDateTime {
        timestamp(2026, 10, 14, 12, 0, 0)
    }

    pub(super) struct World {
        pub(super) service: Arc<Service>,
        pub(super) clock: Arc<FixedClock>,
        pub(super) owner: UserId,
        pub(super) members: Vec<UserId>,
    }

    pub(super) fn world() -> World {
        let store = Arc::new(MemoryListingStore::new());
        let owner = store
            .register_user("owner", vec![Field::Planning], None)
            .expect("owner registered");
        let members = (1..=3)
            .map(|n| {
                store
                    .register_user(
                        format!("bridge{n}"),
                        vec![Field::Backend],
                        Some(format!("career{n}")),
                    )
                    .expect("member registered")
            })
            .collect();
        let clock = Arc::new(FixedClock::new(now()));
        let service = Arc::new(ListingService::new(
            store,
            clock.clone(),
            RankingConfig::default(),
        ));
        World {
            service,
            clock,
            owner,
            members,
        }
    }

    pub(super) fn input(title: &str, due_date: NaiveDateTime) -> ListingInput {
        ListingInput {
            title: title.to_string(),
            overview: format!("{title} overview"),
            due_date,
            start_date: timestamp(2024, 1, 12, 0, 0, 0),
            end_date: timestamp(2024, 3, 12, 0, 0, 0),
            recruit: vec![RecruitmentInput {
                field: "BACKEND".to_string(),
                recruit_num: 3,
                skills: vec!["JAVA".to_string(), "SPRINGBOOT".to_string()],
                requirement: "아무거나".to_string(),
            }],
            tag_limit: Vec::new(),
            meeting_way: "Offline".to_string(),
            stage: "Before Start".to_string(),
        }
    }
}

use axum::body::Body;
use axum::http::{Request, StatusCode};
use bridge::listings::{
    listing_router, ApplicationStage, DeleteOutcome, ListingServiceError, CALLER_HEADER,
};
use chrono::Duration;
use common::*;
use tower::ServiceExt;

#[test]
fn recruiting_round_from_publish_to_close() {
    let world = world();
    let [first, second, third] = [world.members[0], world.members[1], world.members[2]];
    let listing = world
        .service
        .create(world.owner, input("Bridge", timestamp(2026, 11, 1, 0, 0, 0)))
        .expect("listing created");

    for member in [first, second, third] {
        world.service.apply(member, listing).expect("applied");
    }
    world.service.accept_apply(listing, first).expect("accepted");
    world.service.reject_apply(listing, third).expect("rejected");

    let pending = world.service.list_applicants(listing).expect("applicants");
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].name, "bridge2");

    let stages: Vec<&str> = [first, second, third]
        .iter()
        .map(|member| {
            world
                .service
                .list_my_applications(*member)
                .expect("applications")[0]
                .stage
        })
        .collect();
    assert_eq!(stages, vec!["수락", "결과 대기중", "거절"]);

    world.clock.advance(Duration::hours(1));
    let closed = world.service.close(listing).expect("closed");
    assert_eq!(closed.due_date, now() + Duration::hours(1));
    assert_eq!(world.service.imminent_projects(first).expect("imminent").len(), 1);

    world.clock.advance(Duration::seconds(1));
    assert!(world
        .service
        .imminent_projects(first)
        .expect("imminent")
        .is_empty());
    assert!(world.service.top_projects().expect("top").is_empty());
}

#[test]
fn terminal_decisions_are_final_until_reapplying() {
    let world = world();
    let member = world.members[0];
    let listing = world
        .service
        .create(world.owner, input("Locked", timestamp(2026, 12, 1, 0, 0, 0)))
        .expect("listing created");
    world.service.apply(member, listing).expect("applied");
    let record = world.service.reject_apply(listing, member).expect("rejected");
    assert_eq!(record.stage, ApplicationStage::Rejected);

    assert_eq!(
        world.service.accept_apply(listing, member).map(|_| ()),
        Err(ListingServiceError::StageLocked {
            stage: ApplicationStage::Rejected,
        })
    );

    let fresh = world.service.apply(member, listing).expect("reapplied");
    assert_eq!(fresh.stage, ApplicationStage::Applied);
    let accepted = world.service.accept_apply(listing, member).expect("accepted");
    assert_eq!(accepted.id, fresh.id);
}

#[test]
fn deleting_a_listing_removes_it_from_every_query() {
    let world = world();
    let member = world.members[0];
    let listing = world
        .service
        .create(world.owner, input("Short lived", timestamp(2026, 12, 1, 0, 0, 0)))
        .expect("listing created");
    world.service.apply(member, listing).expect("applied");
    world.service.scrap(member, listing).expect("scrapped");

    assert_eq!(
        world.service.delete(listing, member),
        Ok(DeleteOutcome::NotOwner)
    );
    assert_eq!(
        world.service.delete(listing, world.owner),
        Ok(DeleteOutcome::Deleted)
    );

    assert!(world.service.search(None, "Short").expect("search").is_empty());
    assert!(world.service.top_projects().expect("top").is_empty());
    assert!(world
        .service
        .list_my_applications(member)
        .expect("applications")
        .is_empty());
    assert!(world.service.list_by_owner(world.owner).expect("owned").is_empty());
}

#[tokio::test]
async fn router_serves_rankings_for_anonymous_callers() {
    let world = world();
    let popular = world
        .service
        .create(world.owner, input("Popular", timestamp(2026, 12, 1, 0, 0, 0)))
        .expect("listing created");
    world
        .service
        .create(world.owner, input("Quiet", timestamp(2026, 12, 2, 0, 0, 0)))
        .expect("listing created");
    for member in &world.members {
        world.service.scrap(*member, popular).expect("scrapped");
    }
    let router = listing_router(world.service.clone());

    let response = router
        .clone()
        .oneshot(
            Request::get("/api/v1/rankings/top")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("body");
    let top: serde_json::Value = serde_json::from_slice(&body).expect("json");
    assert_eq!(top[0]["title"], "Popular");
    assert_eq!(top[0]["bookmarks_num"], 3);
    assert_eq!(top[1]["bookmarks_num"], 0);

    let response = router
        .oneshot(
            Request::get("/api/v1/rankings/imminent")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn router_rejects_malformed_caller_header() {
    let world = world();
    let router = listing_router(world.service.clone());

    let response = router
        .oneshot(
            Request::get("/api/v1/me/applications")
                .header(CALLER_HEADER, "not-a-number")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
