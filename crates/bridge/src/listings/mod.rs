//! Recruitment listings: lifecycle, applications, scraps and discovery queries.

pub mod domain;
pub mod identity;
pub mod memory;
pub mod query;
pub mod recruitment;
pub mod repository;
pub mod router;
pub mod service;
pub mod views;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicationId, ApplicationRecord, ApplicationStage, Bookmark, BookmarkId, Field, Listing,
    ListingId, ListingInput, NewListing, RecruitmentEntry, RecruitmentInput, SearchWord,
    SearchWordId, Skill, UserId, UserProfile,
};
pub use identity::{IdentityError, CALLER_HEADER};
pub use memory::MemoryListingStore;
pub use recruitment::RecruitmentError;
pub use repository::{ListingStore, ListingTables, RepositoryError};
pub use router::{listing_router, FilterRequest};
pub use service::{CreateRejected, DeleteOutcome, ListingService, ListingServiceError};
pub use views::{
    ApplicantSummary, ImminentListingView, ListingDetailView, ListingListItem, ListingSummary,
    ListingView, MyApplicationView, ScrapOutcome, ScrapView, SearchWordView, TopListingView,
};
