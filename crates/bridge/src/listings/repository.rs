use super::domain::{
    ApplicationId, ApplicationRecord, ApplicationStage, Bookmark, BookmarkId, Listing, ListingId,
    NewListing, SearchWord, SearchWordId, UserId, UserProfile,
};

/// Keyed tables visible inside one unit of work.
///
/// Listings are returned in storage (insertion) order. Child records refer to their listing by
/// id; deleting a listing removes its applications and bookmarks.
pub trait ListingTables {
    fn listing(&self, id: ListingId) -> Result<Option<Listing>, RepositoryError>;
    fn scan(&self, predicate: &dyn Fn(&Listing) -> bool) -> Result<Vec<Listing>, RepositoryError>;
    fn listings_by_owner(&self, owner: UserId) -> Result<Vec<Listing>, RepositoryError>;
    fn insert_listing(&mut self, listing: NewListing) -> Result<ListingId, RepositoryError>;
    fn update_listing(&mut self, listing: Listing) -> Result<(), RepositoryError>;
    fn delete_listing(&mut self, id: ListingId) -> Result<(), RepositoryError>;

    fn user(&self, id: UserId) -> Result<Option<UserProfile>, RepositoryError>;

    /// Applications between one user and one listing, oldest first.
    fn applications_between(
        &self,
        listing: ListingId,
        user: UserId,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError>;
    fn applications_for_listing(
        &self,
        listing: ListingId,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError>;
    fn applications_for_user(&self, user: UserId)
        -> Result<Vec<ApplicationRecord>, RepositoryError>;
    fn insert_application(
        &mut self,
        listing: ListingId,
        user: UserId,
        stage: ApplicationStage,
    ) -> Result<ApplicationRecord, RepositoryError>;
    fn update_application(&mut self, record: ApplicationRecord) -> Result<(), RepositoryError>;
    fn delete_application(&mut self, id: ApplicationId) -> Result<(), RepositoryError>;

    fn bookmark(&self, listing: ListingId, user: UserId)
        -> Result<Option<Bookmark>, RepositoryError>;
    fn bookmark_count(&self, listing: ListingId) -> Result<usize, RepositoryError>;
    fn insert_bookmark(
        &mut self,
        listing: ListingId,
        user: UserId,
    ) -> Result<Bookmark, RepositoryError>;
    fn delete_bookmark(&mut self, id: BookmarkId) -> Result<(), RepositoryError>;

    /// Search history of one user, oldest first.
    fn search_words_for_user(&self, user: UserId) -> Result<Vec<SearchWord>, RepositoryError>;
    fn insert_search_word(
        &mut self,
        user: UserId,
        word: String,
    ) -> Result<SearchWord, RepositoryError>;
    fn delete_search_word(&mut self, id: SearchWordId) -> Result<(), RepositoryError>;
}

/// Storage abstraction so the listing service can be exercised in isolation.
///
/// `transaction` commits every write made through the tables only when `work` returns `Ok`;
/// concurrent transactions never observe each other's partial state.
pub trait ListingStore: Send + Sync {
    fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn ListingTables) -> Result<T, E>,
        E: From<RepositoryError>;

    /// Read-only view; may run concurrently with writers.
    fn snapshot<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn ListingTables) -> Result<T, E>,
        E: From<RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
