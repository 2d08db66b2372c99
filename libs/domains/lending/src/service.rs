use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::instrument;
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::config::LendingPolicy;
use crate::directory::UserDirectory;
use crate::error::LendingResult;
use crate::history::{self, History, HistoryFilter};
use crate::ledger::RequestLedger;
use crate::models::{
    BorrowRequest, CategoryFilter, CreateItem, CreateUser, Dashboard, Item, ItemListing,
    RequestView, SearchQuery, User,
};
use crate::profile::ProfileSummary;
use crate::query;
use crate::registry::ItemRegistry;
use crate::trust::TrustScoreEngine;

/// Everything the service guards with its lock
#[derive(Debug)]
struct LendingState {
    users: UserDirectory,
    items: ItemRegistry,
    ledger: RequestLedger,
}

impl LendingState {
    fn new(policy: &LendingPolicy) -> Self {
        let trust = TrustScoreEngine::new(policy.trust);
        Self {
            users: UserDirectory::new(trust.initial_score()),
            items: ItemRegistry::new(),
            ledger: RequestLedger::new(trust, policy.allow_rerequest_after_reject),
        }
    }

    fn listing(&self, item: Item) -> LendingResult<ItemListing> {
        let owner = self.users.get(item.owner_id)?;
        Ok(ItemListing {
            owner_name: owner.name.clone(),
            owner_room: owner.room.clone(),
            item,
        })
    }

    fn listings(&self, items: Vec<Item>) -> LendingResult<Vec<ItemListing>> {
        items.into_iter().map(|i| self.listing(i)).collect()
    }

    fn request_view(&self, request: BorrowRequest) -> LendingResult<RequestView> {
        let item = self.items.get(request.item_id)?;
        let borrower = self.users.get(request.borrower_id)?;
        Ok(RequestView {
            item_name: item.name.clone(),
            borrower_name: borrower.name.clone(),
            request,
        })
    }

    fn request_views(&self, requests: Vec<BorrowRequest>) -> LendingResult<Vec<RequestView>> {
        requests
            .into_iter()
            .map(|r| self.request_view(r))
            .collect()
    }
}

/// Async facade over the lending core.
///
/// All state sits behind one `RwLock`: every mutation holds the write lock
/// for its whole check-then-write sequence, reads share the read lock.
/// The acting user is passed explicitly to every call that depends on it.
pub struct LendingService<C: Clock = SystemClock> {
    state: Arc<RwLock<LendingState>>,
    clock: Arc<C>,
    policy: LendingPolicy,
}

impl<C: Clock> Clone for LendingService<C> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            clock: Arc::clone(&self.clock),
            policy: self.policy,
        }
    }
}

impl LendingService<SystemClock> {
    pub fn new(policy: LendingPolicy) -> Self {
        Self::with_clock(policy, SystemClock)
    }
}

impl<C: Clock> LendingService<C> {
    pub fn with_clock(policy: LendingPolicy, clock: C) -> Self {
        Self {
            state: Arc::new(RwLock::new(LendingState::new(&policy))),
            clock: Arc::new(clock),
            policy,
        }
    }

    pub fn policy(&self) -> &LendingPolicy {
        &self.policy
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    /// Sign up a new user
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register_user(&self, input: CreateUser) -> LendingResult<User> {
        let now = self.now();
        let mut state = self.state.write().await;
        state
            .users
            .register(input, now)
            .inspect_err(|e| tracing::debug!(error = %e, "Signup rejected"))
    }

    pub async fn get_user(&self, user_id: Uuid) -> LendingResult<User> {
        let state = self.state.read().await;
        state.users.get(user_id).cloned()
    }

    /// Recompute a user's score from the closed-transaction log and cache it
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn recompute_trust_score(&self, user_id: Uuid) -> LendingResult<u8> {
        let mut state = self.state.write().await;
        state.users.get(user_id)?;

        let LendingState { users, ledger, .. } = &mut *state;
        Ok(ledger.trust().recompute(user_id, ledger.closed(), users))
    }

    // ------------------------------------------------------------------
    // Items
    // ------------------------------------------------------------------

    /// List a new item owned by `actor`
    #[instrument(skip(self, input), fields(owner_id = %actor, item_name = %input.name))]
    pub async fn list_item(&self, actor: Uuid, input: CreateItem) -> LendingResult<ItemListing> {
        let now = self.now();
        let mut state = self.state.write().await;
        state.users.get(actor)?;

        let item = state
            .items
            .create(actor, input, now)
            .inspect_err(|e| tracing::debug!(error = %e, "Listing rejected"))?;
        state.listing(item)
    }

    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn get_item(&self, item_id: Uuid) -> LendingResult<ItemListing> {
        let state = self.state.read().await;
        let item = state.items.get(item_id)?.clone();
        state.listing(item)
    }

    /// Resolve a scanned tracking token
    pub async fn find_by_tracking_token(&self, token: &str) -> LendingResult<Option<ItemListing>> {
        let state = self.state.read().await;
        state
            .items
            .find_by_tracking_token(token)
            .cloned()
            .map(|item| state.listing(item))
            .transpose()
    }

    /// Items `actor` has listed
    pub async fn my_items(&self, actor: Uuid) -> LendingResult<Vec<ItemListing>> {
        let state = self.state.read().await;
        let items = state.items.list_by_owner(actor);
        state.listings(items)
    }

    /// Available items `actor` could borrow
    pub async fn available_items(&self, actor: Uuid) -> LendingResult<Vec<ItemListing>> {
        let state = self.state.read().await;
        let items = state.items.list_available_excluding(actor);
        state.listings(items)
    }

    /// Items currently lent to `actor`
    pub async fn borrowed_items(&self, actor: Uuid) -> LendingResult<Vec<ItemListing>> {
        let state = self.state.read().await;
        let items = state.items.list_borrowed_by(actor);
        state.listings(items)
    }

    /// Search the whole catalog
    pub async fn search(&self, query: SearchQuery) -> LendingResult<Vec<ItemListing>> {
        let state = self.state.read().await;
        let items = query::search(state.items.all(), &query);
        state.listings(items)
    }

    /// Browse screen: search everything except `actor`'s own items
    pub async fn browse(
        &self,
        actor: Uuid,
        text: &str,
        category: CategoryFilter,
    ) -> LendingResult<Vec<ItemListing>> {
        self.search(SearchQuery {
            text: text.to_string(),
            category,
            exclude_owner: Some(actor),
        })
        .await
    }

    /// Every item, in listing order
    pub async fn catalog(&self) -> Vec<Item> {
        let state = self.state.read().await;
        state.items.all().to_vec()
    }

    // ------------------------------------------------------------------
    // Borrow requests
    // ------------------------------------------------------------------

    /// `actor` asks to borrow `item_id`
    #[instrument(skip(self), fields(borrower_id = %actor, item_id = %item_id))]
    pub async fn request_item(&self, actor: Uuid, item_id: Uuid) -> LendingResult<RequestView> {
        let now = self.now();
        let mut state = self.state.write().await;
        state.users.get(actor)?;

        let LendingState { items, ledger, .. } = &mut *state;
        let request = ledger
            .request(items, item_id, actor, now)
            .inspect_err(|e| tracing::debug!(error = %e, "Borrow request refused"))?;
        state.request_view(request)
    }

    /// Owner `actor` accepts, lending the item until `return_by`
    #[instrument(skip(self), fields(owner_id = %actor, request_id = %request_id))]
    pub async fn accept_request(
        &self,
        actor: Uuid,
        request_id: Uuid,
        return_by: DateTime<Utc>,
    ) -> LendingResult<RequestView> {
        let now = self.now();
        let mut state = self.state.write().await;

        let LendingState { items, ledger, .. } = &mut *state;
        let request = ledger
            .accept(items, actor, request_id, return_by, now)
            .inspect_err(|e| tracing::debug!(error = %e, "Accept refused"))?;
        state.request_view(request)
    }

    /// Owner `actor` declines
    #[instrument(skip(self), fields(owner_id = %actor, request_id = %request_id))]
    pub async fn reject_request(&self, actor: Uuid, request_id: Uuid) -> LendingResult<RequestView> {
        let now = self.now();
        let mut state = self.state.write().await;

        let LendingState { items, ledger, .. } = &mut *state;
        let request = ledger
            .reject(items, actor, request_id, now)
            .inspect_err(|e| tracing::debug!(error = %e, "Reject refused"))?;
        state.request_view(request)
    }

    /// Borrower or owner `actor` marks the item returned
    #[instrument(skip(self), fields(actor = %actor, request_id = %request_id))]
    pub async fn return_item(&self, actor: Uuid, request_id: Uuid) -> LendingResult<RequestView> {
        let now = self.now();
        let mut state = self.state.write().await;

        let LendingState {
            users,
            items,
            ledger,
        } = &mut *state;
        let request = ledger
            .return_item(items, users, actor, request_id, now)
            .inspect_err(|e| tracing::debug!(error = %e, "Return refused"))?;
        state.request_view(request)
    }

    pub async fn get_request(&self, request_id: Uuid) -> LendingResult<RequestView> {
        let state = self.state.read().await;
        let request = state.ledger.get(request_id)?.clone();
        state.request_view(request)
    }

    /// Pending requests on `actor`'s items
    pub async fn incoming_requests(&self, actor: Uuid) -> LendingResult<Vec<RequestView>> {
        let state = self.state.read().await;
        let requests = state.ledger.incoming_pending(actor);
        state.request_views(requests)
    }

    /// Requests `actor` has made, any status
    pub async fn outgoing_requests(&self, actor: Uuid) -> LendingResult<Vec<RequestView>> {
        let state = self.state.read().await;
        let requests = state.ledger.outgoing(actor);
        state.request_views(requests)
    }

    /// Every request, oldest first
    pub async fn requests(&self) -> Vec<BorrowRequest> {
        let state = self.state.read().await;
        state.ledger.all().to_vec()
    }

    // ------------------------------------------------------------------
    // Read models
    // ------------------------------------------------------------------

    pub async fn history(&self, actor: Uuid, filter: HistoryFilter) -> LendingResult<History> {
        let state = self.state.read().await;
        state.users.get(actor)?;
        Ok(history::history(
            actor,
            filter,
            &state.items,
            &state.ledger,
            &state.users,
        ))
    }

    pub async fn profile(&self, actor: Uuid) -> LendingResult<ProfileSummary> {
        let state = self.state.read().await;
        let user = state.users.get(actor)?.clone();
        let items_listed = state.items.list_by_owner(actor).len();
        Ok(ProfileSummary::new(user, items_listed))
    }

    #[instrument(skip(self), fields(user_id = %actor))]
    pub async fn dashboard(&self, actor: Uuid) -> LendingResult<Dashboard> {
        let state = self.state.read().await;
        let user = state.users.get(actor)?.clone();

        let mut featured = state.items.list_available_excluding(actor);
        featured.truncate(self.policy.featured_limit);

        Ok(Dashboard {
            user,
            listed: state.listings(state.items.list_by_owner(actor))?,
            borrowing: state.listings(state.items.list_borrowed_by(actor))?,
            incoming_requests: state.request_views(state.ledger.incoming_pending(actor))?,
            featured: state.listings(featured)?,
        })
    }
}
