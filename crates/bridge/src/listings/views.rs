use chrono::NaiveDateTime;
use serde::Serialize;

use super::domain::{
    ApplicationRecord, Field, Listing, ListingId, RecruitmentEntry, SearchWord, SearchWordId,
    UserId, UserProfile,
};

/// Full listing state returned by update and close.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingView {
    pub id: ListingId,
    pub owner: Option<UserId>,
    pub title: String,
    pub overview: String,
    pub due_date: NaiveDateTime,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub meeting_way: String,
    pub stage: String,
    pub tag_limit: Vec<String>,
    pub recruit: Vec<RecruitmentEntry>,
    pub bookmarks_num: u32,
}

impl From<Listing> for ListingView {
    fn from(listing: Listing) -> Self {
        Self {
            id: listing.id,
            owner: listing.owner,
            title: listing.title,
            overview: listing.overview,
            due_date: listing.due_date,
            start_date: listing.start_date,
            end_date: listing.end_date,
            meeting_way: listing.meeting_way,
            stage: listing.stage,
            tag_limit: listing.tag_limit,
            recruit: listing.recruit,
            bookmarks_num: listing.bookmarks_num,
        }
    }
}

/// Listing detail as seen by one caller. The flags are derived per request, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingDetailView {
    #[serde(flatten)]
    pub listing: ListingView,
    pub is_my_project: bool,
    pub is_scrap: bool,
}

/// Search and filter result row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingSummary {
    pub id: ListingId,
    pub title: String,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub recruit: Vec<RecruitmentEntry>,
}

impl From<&Listing> for ListingSummary {
    fn from(listing: &Listing) -> Self {
        Self {
            id: listing.id,
            title: listing.title.clone(),
            start_date: listing.start_date,
            end_date: listing.end_date,
            recruit: listing.recruit.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingListItem {
    pub id: ListingId,
    pub title: String,
    pub due_date: NaiveDateTime,
    pub recruit: Vec<RecruitmentEntry>,
    pub is_my_project: bool,
    pub is_scrap: bool,
}

impl ListingListItem {
    pub fn new(listing: &Listing, is_my_project: bool, is_scrap: bool) -> Self {
        Self {
            id: listing.id,
            title: listing.title.clone(),
            due_date: listing.due_date,
            recruit: listing.recruit.clone(),
            is_my_project,
            is_scrap,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopListingView {
    pub id: ListingId,
    pub title: String,
    pub due_date: NaiveDateTime,
    pub bookmarks_num: u32,
}

impl From<&Listing> for TopListingView {
    fn from(listing: &Listing) -> Self {
        Self {
            id: listing.id,
            title: listing.title.clone(),
            due_date: listing.due_date,
            bookmarks_num: listing.bookmarks_num,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImminentListingView {
    pub id: ListingId,
    pub title: String,
    pub due_date: NaiveDateTime,
    pub recruit: Vec<RecruitmentEntry>,
    pub is_scrap: bool,
}

/// Applicant row shown to a listing owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicantSummary {
    pub user_id: UserId,
    pub name: String,
    pub fields: Vec<&'static str>,
    pub career: Option<String>,
}

impl From<UserProfile> for ApplicantSummary {
    fn from(profile: UserProfile) -> Self {
        Self {
            user_id: profile.id,
            name: profile.name,
            fields: profile.fields.into_iter().map(Field::label).collect(),
            career: profile.career,
        }
    }
}

/// One of the caller's own applications with a user-facing stage label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MyApplicationView {
    pub listing_id: ListingId,
    pub title: String,
    pub overview: String,
    pub due_date: NaiveDateTime,
    pub stage: &'static str,
}

impl MyApplicationView {
    pub fn new(listing: &Listing, record: &ApplicationRecord) -> Self {
        Self {
            listing_id: listing.id,
            title: listing.title.clone(),
            overview: listing.overview.clone(),
            due_date: listing.due_date,
            stage: record.stage.label(),
        }
    }
}

/// Which branch a scrap toggle took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrapOutcome {
    Set,
    Unset,
}

impl ScrapOutcome {
    pub const fn message(self) -> &'static str {
        match self {
            ScrapOutcome::Set => "스크랩이 설정되었습니다.",
            ScrapOutcome::Unset => "스크랩이 해제되었습니다.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScrapView {
    pub listing_id: ListingId,
    pub outcome: ScrapOutcome,
    pub scrap: &'static str,
    pub bookmarks_num: u32,
}

/// One entry of the caller's search history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchWordView {
    pub search_word_id: SearchWordId,
    pub search_word: String,
}

impl From<SearchWord> for SearchWordView {
    fn from(entry: SearchWord) -> Self {
        Self {
            search_word_id: entry.id,
            search_word: entry.word,
        }
    }
}
