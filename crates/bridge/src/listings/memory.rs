use std::collections::BTreeMap;
use std::sync::RwLock;

use super::domain::{
    ApplicationId, ApplicationRecord, ApplicationStage, Bookmark, BookmarkId, Field, Listing,
    ListingId, NewListing, SearchWord, SearchWordId, UserId, UserProfile,
};
use super::repository::{ListingStore, ListingTables, RepositoryError};

#[derive(Debug, Clone, Default)]
struct Tables {
    listings: BTreeMap<ListingId, Listing>,
    applications: BTreeMap<ApplicationId, ApplicationRecord>,
    bookmarks: BTreeMap<BookmarkId, Bookmark>,
    users: BTreeMap<UserId, UserProfile>,
    search_words: BTreeMap<SearchWordId, SearchWord>,
    next_listing: u64,
    next_application: u64,
    next_bookmark: u64,
    next_user: u64,
    next_search_word: u64,
}

/// Process-local listing store.
///
/// Transactions stage their writes on a copy of the tables and swap it in on success, holding
/// the write lock for the whole unit of work.
#[derive(Debug, Default)]
pub struct MemoryListingStore {
    tables: RwLock<Tables>,
}

fn poisoned() -> RepositoryError {
    RepositoryError::Unavailable("listing store lock poisoned".to_string())
}

impl MemoryListingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user directory entry and return its assigned id.
    pub fn register_user(
        &self,
        name: impl Into<String>,
        fields: Vec<Field>,
        career: Option<String>,
    ) -> Result<UserId, RepositoryError> {
        let mut tables = self.tables.write().map_err(|_| poisoned())?;
        tables.next_user += 1;
        let id = UserId(tables.next_user);
        tables.users.insert(
            id,
            UserProfile {
                id,
                name: name.into(),
                fields,
                career,
            },
        );
        Ok(id)
    }
}

impl ListingStore for MemoryListingStore {
    fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn ListingTables) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let mut guard = self.tables.write().map_err(|_| E::from(poisoned()))?;
        let mut staged = guard.clone();
        let value = work(&mut staged)?;
        *guard = staged;
        Ok(value)
    }

    fn snapshot<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn ListingTables) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let guard = self.tables.read().map_err(|_| E::from(poisoned()))?;
        work(&*guard)
    }
}

impl ListingTables for Tables {
    fn listing(&self, id: ListingId) -> Result<Option<Listing>, RepositoryError> {
        Ok(self.listings.get(&id).cloned())
    }

    fn scan(&self, predicate: &dyn Fn(&Listing) -> bool) -> Result<Vec<Listing>, RepositoryError> {
        Ok(self
            .listings
            .values()
            .filter(|listing| predicate(listing))
            .cloned()
            .collect())
    }

    fn listings_by_owner(&self, owner: UserId) -> Result<Vec<Listing>, RepositoryError> {
        self.scan(&|listing: &Listing| listing.is_owned_by(owner))
    }

    fn insert_listing(&mut self, listing: NewListing) -> Result<ListingId, RepositoryError> {
        self.next_listing += 1;
        let id = ListingId(self.next_listing);
        self.listings.insert(id, listing.into_listing(id));
        Ok(id)
    }

    fn update_listing(&mut self, listing: Listing) -> Result<(), RepositoryError> {
        match self.listings.get_mut(&listing.id) {
            Some(slot) => {
                *slot = listing;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn delete_listing(&mut self, id: ListingId) -> Result<(), RepositoryError> {
        self.listings.remove(&id).ok_or(RepositoryError::NotFound)?;
        self.applications.retain(|_, record| record.listing_id != id);
        self.bookmarks.retain(|_, bookmark| bookmark.listing_id != id);
        Ok(())
    }

    fn user(&self, id: UserId) -> Result<Option<UserProfile>, RepositoryError> {
        Ok(self.users.get(&id).cloned())
    }

    fn applications_between(
        &self,
        listing: ListingId,
        user: UserId,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        Ok(self
            .applications
            .values()
            .filter(|record| record.listing_id == listing && record.user_id == user)
            .cloned()
            .collect())
    }

    fn applications_for_listing(
        &self,
        listing: ListingId,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        Ok(self
            .applications
            .values()
            .filter(|record| record.listing_id == listing)
            .cloned()
            .collect())
    }

    fn applications_for_user(
        &self,
        user: UserId,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        Ok(self
            .applications
            .values()
            .filter(|record| record.user_id == user)
            .cloned()
            .collect())
    }

    fn insert_application(
        &mut self,
        listing: ListingId,
        user: UserId,
        stage: ApplicationStage,
    ) -> Result<ApplicationRecord, RepositoryError> {
        if !self.listings.contains_key(&listing) {
            return Err(RepositoryError::NotFound);
        }
        self.next_application += 1;
        let record = ApplicationRecord {
            id: ApplicationId(self.next_application),
            listing_id: listing,
            user_id: user,
            stage,
        };
        self.applications.insert(record.id, record.clone());
        Ok(record)
    }

    fn update_application(&mut self, record: ApplicationRecord) -> Result<(), RepositoryError> {
        match self.applications.get_mut(&record.id) {
            Some(slot) => {
                *slot = record;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn delete_application(&mut self, id: ApplicationId) -> Result<(), RepositoryError> {
        self.applications
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    fn bookmark(
        &self,
        listing: ListingId,
        user: UserId,
    ) -> Result<Option<Bookmark>, RepositoryError> {
        Ok(self
            .bookmarks
            .values()
            .find(|bookmark| bookmark.listing_id == listing && bookmark.user_id == user)
            .cloned())
    }

    fn bookmark_count(&self, listing: ListingId) -> Result<usize, RepositoryError> {
        Ok(self
            .bookmarks
            .values()
            .filter(|bookmark| bookmark.listing_id == listing)
            .count())
    }

    fn insert_bookmark(
        &mut self,
        listing: ListingId,
        user: UserId,
    ) -> Result<Bookmark, RepositoryError> {
        if self.bookmark(listing, user)?.is_some() {
            return Err(RepositoryError::Conflict);
        }
        self.next_bookmark += 1;
        let bookmark = Bookmark {
            id: BookmarkId(self.next_bookmark),
            listing_id: listing,
            user_id: user,
        };
        self.bookmarks.insert(bookmark.id, bookmark.clone());
        Ok(bookmark)
    }

    fn delete_bookmark(&mut self, id: BookmarkId) -> Result<(), RepositoryError> {
        self.bookmarks
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    fn search_words_for_user(&self, user: UserId) -> Result<Vec<SearchWord>, RepositoryError> {
        Ok(self
            .search_words
            .values()
            .filter(|entry| entry.user_id == user)
            .cloned()
            .collect())
    }

    fn insert_search_word(
        &mut self,
        user: UserId,
        word: String,
    ) -> Result<SearchWord, RepositoryError> {
        self.next_search_word += 1;
        let entry = SearchWord {
            id: SearchWordId(self.next_search_word),
            user_id: user,
            word,
        };
        self.search_words.insert(entry.id, entry.clone());
        Ok(entry)
    }

    fn delete_search_word(&mut self, id: SearchWordId) -> Result<(), RepositoryError> {
        self.search_words
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn draft(owner: UserId) -> NewListing {
        let at = NaiveDate::from_ymd_opt(2050, 1, 12)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .expect("valid timestamp");
        NewListing {
            owner: Some(owner),
            title: "title".to_string(),
            overview: "overview".to_string(),
            due_date: at,
            start_date: at,
            end_date: at,
            meeting_way: "Offline".to_string(),
            stage: "Before Start".to_string(),
            tag_limit: Vec::new(),
            recruit: Vec::new(),
        }
    }

    #[test]
    fn failed_transaction_leaves_tables_untouched() {
        let store = MemoryListingStore::new();
        let owner = store
            .register_user("owner", Vec::new(), None)
            .expect("user registered");

        let result: Result<(), RepositoryError> = store.transaction(|tables| {
            tables.insert_listing(draft(owner))?;
            Err(RepositoryError::Conflict)
        });
        assert_eq!(result, Err(RepositoryError::Conflict));

        let remaining: Vec<Listing> = store
            .snapshot(|tables| tables.scan(&|_: &Listing| true))
            .expect("scan");
        assert!(remaining.is_empty());
    }

    #[test]
    fn deleting_listing_cascades_to_children() {
        let store = MemoryListingStore::new();
        let owner = store
            .register_user("owner", Vec::new(), None)
            .expect("owner registered");
        let fan = store
            .register_user("fan", Vec::new(), None)
            .expect("fan registered");

        let id = store
            .transaction(|tables| -> Result<ListingId, RepositoryError> {
                let id = tables.insert_listing(draft(owner))?;
                tables.insert_application(id, fan, ApplicationStage::Applied)?;
                tables.insert_bookmark(id, fan)?;
                Ok(id)
            })
            .expect("seeded");

        store
            .transaction(|tables| tables.delete_listing(id))
            .expect("deleted");

        let (applications, bookmarks) = store
            .snapshot(|tables| -> Result<_, RepositoryError> {
                Ok((
                    tables.applications_for_user(fan)?,
                    tables.bookmark_count(id)?,
                ))
            })
            .expect("snapshot");
        assert!(applications.is_empty());
        assert_eq!(bookmarks, 0);
    }

    #[test]
    fn duplicate_bookmark_is_a_conflict() {
        let store = MemoryListingStore::new();
        let owner = store
            .register_user("owner", Vec::new(), None)
            .expect("owner registered");

        let result = store.transaction(|tables| -> Result<(), RepositoryError> {
            let id = tables.insert_listing(draft(owner))?;
            tables.insert_bookmark(id, owner)?;
            tables.insert_bookmark(id, owner)?;
            Ok(())
        });
        assert_eq!(result, Err(RepositoryError::Conflict));
    }

    #[test]
    fn search_words_are_kept_per_user() {
        let store = MemoryListingStore::new();
        let alice = store
            .register_user("alice", Vec::new(), None)
            .expect("alice registered");
        let bob = store
            .register_user("bob", Vec::new(), None)
            .expect("bob registered");

        let first = store
            .transaction(|tables| -> Result<SearchWordId, RepositoryError> {
                let first = tables.insert_search_word(alice, "어플".to_string())?;
                tables.insert_search_word(bob, "웹".to_string())?;
                tables.insert_search_word(alice, "게임".to_string())?;
                Ok(first.id)
            })
            .expect("seeded");

        store
            .transaction(|tables| tables.delete_search_word(first))
            .expect("deleted");

        let words: Vec<String> = store
            .snapshot(|tables| tables.search_words_for_user(alice))
            .expect("history")
            .into_iter()
            .map(|entry| entry.word)
            .collect();
        assert_eq!(words, vec!["게임".to_string()]);
        assert_eq!(
            store.transaction(|tables| tables.delete_search_word(first)),
            Err(RepositoryError::NotFound)
        );
    }
}
