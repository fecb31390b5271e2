use std::sync::Arc;

use tracing::{debug, info, warn};

use super::domain::{
    ApplicationRecord, ApplicationStage, Field, Listing, ListingId, ListingInput, NewListing,
    SearchWordId, UserId,
};
use super::query::{matches_entry, matches_text, rank_by_bookmarks, rank_by_deadline};
use super::recruitment::{build_entries, parse_field, parse_skills, RecruitmentError};
use super::repository::{ListingStore, ListingTables, RepositoryError};
use super::views::{
    ApplicantSummary, ImminentListingView, ListingDetailView, ListingListItem, ListingSummary,
    ListingView, MyApplicationView, ScrapOutcome, ScrapView, SearchWordView, TopListingView,
};
use crate::clock::Clock;
use crate::config::RankingConfig;

/// Service composing the listing store, the clock and ranking settings.
///
/// Every mutating operation runs as one store transaction, so the one-applied-application rule
/// and the bookmark counter hold under concurrent callers.
pub struct ListingService<S, C> {
    store: Arc<S>,
    clock: Arc<C>,
    ranking: RankingConfig,
}

/// Result of an owner-gated delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotOwner,
}

impl<S, C> ListingService<S, C>
where
    S: ListingStore + 'static,
    C: Clock + 'static,
{
    pub fn new(store: Arc<S>, clock: Arc<C>, ranking: RankingConfig) -> Self {
        Self {
            store,
            clock,
            ranking,
        }
    }

    /// Create a listing owned by `owner`. Failures are logged and collapsed into [`CreateRejected`].
    pub fn create(&self, owner: UserId, input: ListingInput) -> Result<ListingId, CreateRejected> {
        let result = self
            .store
            .transaction(|tables| -> Result<ListingId, ListingServiceError> {
                tables
                    .user(owner)?
                    .ok_or(ListingServiceError::UserNotFound(owner))?;
                let recruit = build_entries(&input.recruit)?;

                let id = tables.insert_listing(NewListing {
                    owner: Some(owner),
                    title: input.title,
                    overview: input.overview,
                    due_date: input.due_date,
                    start_date: input.start_date,
                    end_date: input.end_date,
                    meeting_way: input.meeting_way,
                    stage: input.stage,
                    tag_limit: input.tag_limit,
                    recruit,
                })?;
                Ok(id)
            });

        match result {
            Ok(id) => {
                info!(listing_id = %id, owner = %owner, "listing created");
                Ok(id)
            }
            Err(error) => {
                warn!(owner = %owner, %error, "listing creation rejected");
                Err(CreateRejected)
            }
        }
    }

    /// Replace the listing's scalar fields and its recruitment entries wholesale.
    pub fn update(
        &self,
        listing_id: ListingId,
        input: ListingInput,
    ) -> Result<ListingView, ListingServiceError> {
        let listing = self
            .store
            .transaction(|tables| -> Result<Listing, ListingServiceError> {
                let mut listing = require_listing(&*tables, listing_id)?;
                let recruit = build_entries(&input.recruit)?;

                listing.title = input.title;
                listing.overview = input.overview;
                listing.due_date = input.due_date;
                listing.start_date = input.start_date;
                listing.end_date = input.end_date;
                listing.meeting_way = input.meeting_way;
                listing.stage = input.stage;
                listing.tag_limit = input.tag_limit;
                listing.recruit = recruit;

                tables.update_listing(listing.clone())?;
                Ok(listing)
            })?;

        info!(listing_id = %listing_id, "listing updated");
        Ok(listing.into())
    }

    pub fn delete(
        &self,
        listing_id: ListingId,
        requester: UserId,
    ) -> Result<DeleteOutcome, ListingServiceError> {
        let outcome = self
            .store
            .transaction(|tables| -> Result<DeleteOutcome, ListingServiceError> {
                let listing = require_listing(&*tables, listing_id)?;
                if !listing.is_owned_by(requester) {
                    return Ok(DeleteOutcome::NotOwner);
                }
                tables.delete_listing(listing_id)?;
                Ok(DeleteOutcome::Deleted)
            })?;

        match outcome {
            DeleteOutcome::Deleted => info!(listing_id = %listing_id, "listing deleted"),
            DeleteOutcome::NotOwner => warn!(
                listing_id = %listing_id,
                requester = %requester,
                "delete refused for non-owner"
            ),
        }
        Ok(outcome)
    }

    /// Close recruiting by moving the deadline to now. A listing whose deadline has already been
    /// reached cannot be closed again.
    pub fn close(&self, listing_id: ListingId) -> Result<ListingView, ListingServiceError> {
        let listing = self
            .store
            .transaction(|tables| -> Result<Listing, ListingServiceError> {
                let mut listing = require_listing(&*tables, listing_id)?;
                let now = self.clock.now();
                if listing.due_date <= now {
                    return Err(ListingServiceError::AlreadyClosed(listing_id));
                }
                listing.due_date = now;
                tables.update_listing(listing.clone())?;
                Ok(listing)
            })?;

        info!(listing_id = %listing_id, due_date = %listing.due_date, "listing closed");
        Ok(listing.into())
    }

    pub fn get(
        &self,
        requester: UserId,
        listing_id: ListingId,
    ) -> Result<ListingDetailView, ListingServiceError> {
        self.store
            .snapshot(|tables| -> Result<ListingDetailView, ListingServiceError> {
                let listing = require_listing(tables, listing_id)?;
                let is_my_project = listing.is_owned_by(requester);
                let is_scrap = is_scrapped(tables, listing_id, Some(requester))?;
                Ok(ListingDetailView {
                    listing: listing.into(),
                    is_my_project,
                    is_scrap,
                })
            })
    }

    /// Whether `requester` owns the listing.
    pub fn is_owner(
        &self,
        requester: UserId,
        listing_id: ListingId,
    ) -> Result<bool, ListingServiceError> {
        self.store
            .snapshot(|tables| -> Result<bool, ListingServiceError> {
                Ok(require_listing(tables, listing_id)?.is_owned_by(requester))
            })
    }

    pub fn apply(
        &self,
        user: UserId,
        listing_id: ListingId,
    ) -> Result<ApplicationRecord, ListingServiceError> {
        let record = self
            .store
            .transaction(|tables| -> Result<ApplicationRecord, ListingServiceError> {
                require_listing(&*tables, listing_id)?;
                tables
                    .user(user)?
                    .ok_or(ListingServiceError::UserNotFound(user))?;

                let outstanding = tables
                    .applications_between(listing_id, user)?
                    .into_iter()
                    .any(|record| record.stage == ApplicationStage::Applied);
                if outstanding {
                    return Err(ListingServiceError::AlreadyApplied {
                        listing: listing_id,
                        user,
                    });
                }

                Ok(tables.insert_application(listing_id, user, ApplicationStage::Applied)?)
            })?;

        info!(listing_id = %listing_id, user = %user, "application submitted");
        Ok(record)
    }

    /// Withdraw the caller's application that is still awaiting a decision.
    ///
    /// Accepted and rejected records are history and cannot be cancelled.
    pub fn cancel_apply(
        &self,
        user: UserId,
        listing_id: ListingId,
    ) -> Result<(), ListingServiceError> {
        self.store
            .transaction(|tables| -> Result<(), ListingServiceError> {
                require_listing(&*tables, listing_id)?;
                let records = tables.applications_between(listing_id, user)?;
                if let Some(pending) = records
                    .iter()
                    .find(|record| record.stage == ApplicationStage::Applied)
                {
                    tables.delete_application(pending.id)?;
                    return Ok(());
                }
                match records.last() {
                    Some(decided) => Err(ListingServiceError::StageLocked {
                        stage: decided.stage,
                    }),
                    None => Err(ListingServiceError::ApplicationNotFound {
                        listing: listing_id,
                        user,
                    }),
                }
            })?;

        info!(listing_id = %listing_id, user = %user, "application cancelled");
        Ok(())
    }

    pub fn accept_apply(
        &self,
        listing_id: ListingId,
        user: UserId,
    ) -> Result<ApplicationRecord, ListingServiceError> {
        self.decide(listing_id, user, ApplicationStage::Accepted)
    }

    pub fn reject_apply(
        &self,
        listing_id: ListingId,
        user: UserId,
    ) -> Result<ApplicationRecord, ListingServiceError> {
        self.decide(listing_id, user, ApplicationStage::Rejected)
    }

    fn decide(
        &self,
        listing_id: ListingId,
        user: UserId,
        stage: ApplicationStage,
    ) -> Result<ApplicationRecord, ListingServiceError> {
        let record = self
            .store
            .transaction(|tables| -> Result<ApplicationRecord, ListingServiceError> {
                require_listing(&*tables, listing_id)?;
                let mut record = tables
                    .applications_between(listing_id, user)?
                    .pop()
                    .ok_or(ListingServiceError::ApplicationNotFound {
                        listing: listing_id,
                        user,
                    })?;
                if record.stage.is_terminal() {
                    return Err(ListingServiceError::StageLocked {
                        stage: record.stage,
                    });
                }
                record.stage = stage;
                tables.update_application(record.clone())?;
                Ok(record)
            })?;

        info!(
            listing_id = %listing_id,
            user = %user,
            stage = stage.code(),
            "application decided"
        );
        Ok(record)
    }

    /// Applicants still awaiting a decision, in application order.
    pub fn list_applicants(
        &self,
        listing_id: ListingId,
    ) -> Result<Vec<ApplicantSummary>, ListingServiceError> {
        self.store
            .snapshot(|tables| -> Result<Vec<ApplicantSummary>, ListingServiceError> {
                require_listing(tables, listing_id)?;
                tables
                    .applications_for_listing(listing_id)?
                    .into_iter()
                    .filter(|record| record.stage == ApplicationStage::Applied)
                    .map(|record| -> Result<ApplicantSummary, ListingServiceError> {
                        tables
                            .user(record.user_id)?
                            .map(ApplicantSummary::from)
                            .ok_or(ListingServiceError::UserNotFound(record.user_id))
                    })
                    .collect()
            })
    }

    pub fn list_my_applications(
        &self,
        user: UserId,
    ) -> Result<Vec<MyApplicationView>, ListingServiceError> {
        self.store
            .snapshot(|tables| -> Result<Vec<MyApplicationView>, ListingServiceError> {
                let mut views = Vec::new();
                for record in tables.applications_for_user(user)? {
                    if let Some(listing) = tables.listing(record.listing_id)? {
                        views.push(MyApplicationView::new(&listing, &record));
                    }
                }
                Ok(views)
            })
    }

    /// Toggle the caller's bookmark and keep the listing's counter in step with it.
    pub fn scrap(
        &self,
        user: UserId,
        listing_id: ListingId,
    ) -> Result<ScrapView, ListingServiceError> {
        let view = self
            .store
            .transaction(|tables| -> Result<ScrapView, ListingServiceError> {
                let mut listing = require_listing(&*tables, listing_id)?;
                tables
                    .user(user)?
                    .ok_or(ListingServiceError::UserNotFound(user))?;

                let outcome = match tables.bookmark(listing_id, user)? {
                    Some(bookmark) => {
                        tables.delete_bookmark(bookmark.id)?;
                        listing.bookmarks_num = listing.bookmarks_num.saturating_sub(1);
                        ScrapOutcome::Unset
                    }
                    None => {
                        tables.insert_bookmark(listing_id, user)?;
                        listing.bookmarks_num = listing.bookmarks_num.saturating_add(1);
                        ScrapOutcome::Set
                    }
                };
                tables.update_listing(listing.clone())?;

                Ok(ScrapView {
                    listing_id,
                    outcome,
                    scrap: outcome.message(),
                    bookmarks_num: listing.bookmarks_num,
                })
            })?;

        info!(
            listing_id = %listing_id,
            user = %user,
            outcome = ?view.outcome,
            bookmarks_num = view.bookmarks_num,
            "scrap toggled"
        );
        Ok(view)
    }

    /// Case-sensitive search on title or overview.
    ///
    /// A known caller's non-blank term is recorded in their search history, replacing an earlier
    /// record of the same term.
    pub fn search(
        &self,
        requester: Option<UserId>,
        text: &str,
    ) -> Result<Vec<ListingSummary>, ListingServiceError> {
        if let Some(user) = requester {
            self.record_search(user, text)?;
        }
        let listings = self
            .store
            .snapshot(|tables| -> Result<Vec<Listing>, ListingServiceError> {
                Ok(tables.scan(&|listing: &Listing| matches_text(listing, text))?)
            })?;
        debug!(matches = listings.len(), "search completed");
        Ok(listings.iter().map(ListingSummary::from).collect())
    }

    fn record_search(&self, user: UserId, text: &str) -> Result<(), ListingServiceError> {
        let word = text.trim();
        if word.is_empty() {
            return Ok(());
        }
        self.store
            .transaction(|tables| -> Result<(), ListingServiceError> {
                tables
                    .user(user)?
                    .ok_or(ListingServiceError::UserNotFound(user))?;
                for earlier in tables.search_words_for_user(user)? {
                    if earlier.word == word {
                        tables.delete_search_word(earlier.id)?;
                    }
                }
                tables.insert_search_word(user, word.to_string())?;
                Ok(())
            })?;
        debug!(user = %user, "search term recorded");
        Ok(())
    }

    /// The caller's search history, most recent first.
    pub fn recent_searches(
        &self,
        user: UserId,
    ) -> Result<Vec<SearchWordView>, ListingServiceError> {
        let mut history = self
            .store
            .snapshot(|tables| tables.search_words_for_user(user))?;
        history.reverse();
        Ok(history.into_iter().map(SearchWordView::from).collect())
    }

    /// Remove one entry from the caller's own search history.
    pub fn delete_search(
        &self,
        user: UserId,
        search_word_id: SearchWordId,
    ) -> Result<(), ListingServiceError> {
        self.store
            .transaction(|tables| -> Result<(), ListingServiceError> {
                let owned = tables
                    .search_words_for_user(user)?
                    .iter()
                    .any(|entry| entry.id == search_word_id);
                if !owned {
                    return Err(ListingServiceError::SearchWordNotFound(search_word_id));
                }
                tables.delete_search_word(search_word_id)?;
                Ok(())
            })?;

        info!(user = %user, search_word_id = %search_word_id, "search term deleted");
        Ok(())
    }

    /// Listings with an entry recruiting `field` whose skills cover every label in `skills`.
    pub fn filter<T: AsRef<str>>(
        &self,
        field: &str,
        skills: &[T],
    ) -> Result<Vec<ListingSummary>, ListingServiceError> {
        let field = parse_field(field)?;
        let skills = parse_skills(skills)?;
        let listings = self
            .store
            .snapshot(|tables| -> Result<Vec<Listing>, ListingServiceError> {
                Ok(tables.scan(&|listing: &Listing| matches_entry(listing, field, &skills))?)
            })?;
        debug!(field = field.code(), matches = listings.len(), "filter completed");
        Ok(listings.iter().map(ListingSummary::from).collect())
    }

    pub fn list_by_owner(&self, user: UserId) -> Result<Vec<ListingListItem>, ListingServiceError> {
        self.owned_listings(user, None)
    }

    pub fn list_by_owner_and_field(
        &self,
        user: UserId,
        field: &str,
    ) -> Result<Vec<ListingListItem>, ListingServiceError> {
        let field = parse_field(field)?;
        self.owned_listings(user, Some(field))
    }

    fn owned_listings(
        &self,
        user: UserId,
        field: Option<Field>,
    ) -> Result<Vec<ListingListItem>, ListingServiceError> {
        self.store
            .snapshot(|tables| -> Result<Vec<ListingListItem>, ListingServiceError> {
                tables
                    .listings_by_owner(user)?
                    .iter()
                    .filter(|listing| field.map_or(true, |field| listing.recruits(field)))
                    .map(|listing| list_item(tables, listing, Some(user)))
                    .collect()
            })
    }

    /// Every listing in storage order, annotated for the optional caller.
    pub fn all_projects(
        &self,
        requester: Option<UserId>,
    ) -> Result<Vec<ListingListItem>, ListingServiceError> {
        self.store
            .snapshot(|tables| -> Result<Vec<ListingListItem>, ListingServiceError> {
                tables
                    .scan(&|_: &Listing| true)?
                    .iter()
                    .map(|listing| list_item(tables, listing, requester))
                    .collect()
            })
    }

    /// Most-bookmarked open listings.
    pub fn top_projects(&self) -> Result<Vec<TopListingView>, ListingServiceError> {
        let now = self.clock.now();
        let listings = self
            .store
            .snapshot(|tables| -> Result<Vec<Listing>, ListingServiceError> {
                Ok(tables.scan(&|_: &Listing| true)?)
            })?;
        let ranked = rank_by_bookmarks(listings, now, self.ranking.top_projects_limit);
        debug!(returned = ranked.len(), "top projects ranked");
        Ok(ranked.iter().map(TopListingView::from).collect())
    }

    /// Open listings, soonest deadline first.
    pub fn imminent_projects(
        &self,
        requester: UserId,
    ) -> Result<Vec<ImminentListingView>, ListingServiceError> {
        let now = self.clock.now();
        self.store
            .snapshot(|tables| -> Result<Vec<ImminentListingView>, ListingServiceError> {
                let ranked = rank_by_deadline(tables.scan(&|_: &Listing| true)?, now);
                ranked
                    .into_iter()
                    .map(|listing| -> Result<ImminentListingView, ListingServiceError> {
                        let is_scrap = is_scrapped(tables, listing.id, Some(requester))?;
                        Ok(ImminentListingView {
                            id: listing.id,
                            title: listing.title,
                            due_date: listing.due_date,
                            recruit: listing.recruit,
                            is_scrap,
                        })
                    })
                    .collect()
            })
    }
}

fn require_listing(
    tables: &dyn ListingTables,
    listing_id: ListingId,
) -> Result<Listing, ListingServiceError> {
    tables
        .listing(listing_id)?
        .ok_or(ListingServiceError::ListingNotFound(listing_id))
}

fn is_scrapped(
    tables: &dyn ListingTables,
    listing_id: ListingId,
    requester: Option<UserId>,
) -> Result<bool, RepositoryError> {
    match requester {
        Some(user) => Ok(tables.bookmark(listing_id, user)?.is_some()),
        None => Ok(false),
    }
}

fn list_item(
    tables: &dyn ListingTables,
    listing: &Listing,
    requester: Option<UserId>,
) -> Result<ListingListItem, ListingServiceError> {
    let is_my_project = requester.map_or(false, |user| listing.is_owned_by(user));
    let is_scrap = is_scrapped(tables, listing.id, requester)?;
    Ok(ListingListItem::new(listing, is_my_project, is_scrap))
}

/// Opaque creation failure; the cause is only logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("listing could not be created")]
pub struct CreateRejected;

/// Error raised by the listing service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListingServiceError {
    #[error("listing {0} not found")]
    ListingNotFound(ListingId),
    #[error("user {0} not found")]
    UserNotFound(UserId),
    #[error("search word {0} not found")]
    SearchWordNotFound(SearchWordId),
    #[error("no application from user {user} to listing {listing}")]
    ApplicationNotFound { listing: ListingId, user: UserId },
    #[error("user {user} already has a pending application to listing {listing}")]
    AlreadyApplied { listing: ListingId, user: UserId },
    #[error("listing {0} is already closed")]
    AlreadyClosed(ListingId),
    #[error("application is already {}", .stage.code())]
    StageLocked { stage: ApplicationStage },
    #[error(transparent)]
    Recruitment(#[from] RecruitmentError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ListingServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ListingServiceError::ListingNotFound(_)
                | ListingServiceError::UserNotFound(_)
                | ListingServiceError::ApplicationNotFound { .. }
                | ListingServiceError::SearchWordNotFound(_)
                | ListingServiceError::Repository(RepositoryError::NotFound)
        )
    }
}
