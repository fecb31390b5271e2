//! Pure search, filter and ranking over listing snapshots.
//!
//! Every function treats a listing as past due when `due_date < now`.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;

use super::domain::{Field, Listing, Skill};

/// Case-sensitive substring match on title or overview.
pub fn matches_text(listing: &Listing, text: &str) -> bool {
    listing.title.contains(text) || listing.overview.contains(text)
}

/// At least one entry recruits `field` with a skill set covering `skills`.
pub fn matches_entry(listing: &Listing, field: Field, skills: &BTreeSet<Skill>) -> bool {
    listing
        .recruit
        .iter()
        .any(|entry| entry.covers(field, skills))
}

pub fn still_open(listing: &Listing, now: NaiveDateTime) -> bool {
    !listing.is_past_due(now)
}

/// Open listings by bookmark count, highest first, capped at `limit`.
///
/// The sort is stable, so equal counters keep storage order.
pub fn rank_by_bookmarks(listings: Vec<Listing>, now: NaiveDateTime, limit: usize) -> Vec<Listing> {
    let mut open: Vec<Listing> = listings
        .into_iter()
        .filter(|listing| still_open(listing, now))
        .collect();
    open.sort_by(|a, b| b.bookmarks_num.cmp(&a.bookmarks_num));
    open.truncate(limit);
    open
}

/// Open listings soonest deadline first, uncapped.
pub fn rank_by_deadline(listings: Vec<Listing>, now: NaiveDateTime) -> Vec<Listing> {
    let mut open: Vec<Listing> = listings
        .into_iter()
        .filter(|listing| still_open(listing, now))
        .collect();
    open.sort_by_key(|listing| listing.due_date);
    open
}
