//! Borrow requests and their accept/reject/return lifecycle.
//!
//! ```text
//! pending ──accept──▶ accepted ──return──▶ returned
//!    │
//!    └──reject──▶ rejected
//! ```
//!
//! Every mutating operation runs all of its checks first, then performs
//! the single fallible item transition, then updates the request. A failed
//! call therefore leaves both the request and its item untouched.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

use crate::directory::UserDirectory;
use crate::error::{LendingError, LendingResult};
use crate::models::{BorrowRequest, ClosedTransaction, ItemStatus, Loan, RequestStatus};
use crate::registry::ItemRegistry;
use crate::trust::TrustScoreEngine;

#[derive(Debug, Clone, Default)]
pub struct RequestLedger {
    requests: Vec<BorrowRequest>,
    index: HashMap<Uuid, usize>,
    closed: Vec<ClosedTransaction>,
    trust: TrustScoreEngine,
    allow_rerequest_after_reject: bool,
}

impl RequestLedger {
    pub fn new(trust: TrustScoreEngine, allow_rerequest_after_reject: bool) -> Self {
        Self {
            requests: Vec::new(),
            index: HashMap::new(),
            closed: Vec::new(),
            trust,
            allow_rerequest_after_reject,
        }
    }

    pub fn trust(&self) -> &TrustScoreEngine {
        &self.trust
    }

    /// Ask to borrow an available item
    pub fn request(
        &mut self,
        items: &mut ItemRegistry,
        item_id: Uuid,
        borrower_id: Uuid,
        now: DateTime<Utc>,
    ) -> LendingResult<BorrowRequest> {
        let item = items.get(item_id)?;
        let owner_id = item.owner_id;

        if owner_id == borrower_id {
            return Err(LendingError::SelfBorrow(borrower_id));
        }

        if !self.allow_rerequest_after_reject && self.was_rejected(item_id, borrower_id) {
            return Err(LendingError::RequestBlocked {
                user_id: borrower_id,
                item_id,
            });
        }

        // A pending request holds the item; a borrowed item is simply unavailable
        match self.active_for_item(item_id) {
            Some(active) if active.status == RequestStatus::Pending => {
                return Err(LendingError::DuplicateRequest(item_id));
            }
            _ if item.status != ItemStatus::Available => {
                return Err(LendingError::ItemUnavailable {
                    item_id,
                    status: item.status,
                });
            }
            Some(_) => return Err(LendingError::DuplicateRequest(item_id)),
            None => {}
        }

        items.set_status(item_id, ItemStatus::Requested, None, now)?;

        let request = BorrowRequest {
            id: Uuid::now_v7(),
            item_id,
            borrower_id,
            owner_id,
            status: RequestStatus::Pending,
            requested_at: now,
            return_by: None,
            decided_at: None,
            returned_at: None,
            late: None,
        };
        self.index.insert(request.id, self.requests.len());
        self.requests.push(request.clone());

        tracing::info!(
            request_id = %request.id,
            item_id = %item_id,
            borrower_id = %borrower_id,
            "Borrow request opened"
        );
        Ok(request)
    }

    /// Owner lends the item until `return_by`
    pub fn accept(
        &mut self,
        items: &mut ItemRegistry,
        actor: Uuid,
        request_id: Uuid,
        return_by: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> LendingResult<BorrowRequest> {
        let (item_id, borrower_id) = self.check_owner_decision(items, actor, request_id)?;

        if return_by <= now {
            return Err(LendingError::InvalidDate { now });
        }

        let loan = Loan {
            borrower_id,
            borrowed_at: now,
            return_by,
        };
        items.set_status(item_id, ItemStatus::Borrowed, Some(loan), now)?;

        let request = self.request_mut(request_id)?;
        request.status = RequestStatus::Accepted;
        request.return_by = Some(return_by);
        request.decided_at = Some(now);

        tracing::info!(request_id = %request_id, %return_by, "Borrow request accepted");
        Ok(request.clone())
    }

    /// Owner declines; the item goes back to `available`
    pub fn reject(
        &mut self,
        items: &mut ItemRegistry,
        actor: Uuid,
        request_id: Uuid,
        now: DateTime<Utc>,
    ) -> LendingResult<BorrowRequest> {
        let (item_id, _) = self.check_owner_decision(items, actor, request_id)?;

        items.set_status(item_id, ItemStatus::Available, None, now)?;

        let request = self.request_mut(request_id)?;
        request.status = RequestStatus::Rejected;
        request.decided_at = Some(now);

        tracing::info!(request_id = %request_id, "Borrow request rejected");
        Ok(request.clone())
    }

    /// Either party marks the item returned.
    ///
    /// Appends a closed transaction, bumps both users' counters and
    /// recomputes both trust scores.
    pub fn return_item(
        &mut self,
        items: &mut ItemRegistry,
        users: &mut UserDirectory,
        actor: Uuid,
        request_id: Uuid,
        now: DateTime<Utc>,
    ) -> LendingResult<BorrowRequest> {
        let request = self.get(request_id)?;

        if !request.is_party(actor) {
            return Err(LendingError::NotParty {
                user_id: actor,
                request_id,
            });
        }
        let (RequestStatus::Accepted, Some(return_by)) = (request.status, request.return_by) else {
            return Err(LendingError::NotAccepted(request_id));
        };

        let item_id = request.item_id;
        let borrower_id = request.borrower_id;
        let owner_id = request.owner_id;
        let borrowed_at = request.decided_at.unwrap_or(request.requested_at);

        items.set_status(item_id, ItemStatus::Available, None, now)?;

        let late = now > return_by;
        let request = self.request_mut(request_id)?;
        request.status = RequestStatus::Returned;
        request.returned_at = Some(now);
        request.late = Some(late);
        let returned = request.clone();

        self.closed.push(ClosedTransaction {
            request_id,
            item_id,
            borrower_id,
            owner_id,
            borrowed_at,
            return_by,
            returned_at: now,
            late,
        });

        users.record_completed_loan(owner_id, borrower_id);
        self.trust.recompute(borrower_id, &self.closed, users);
        self.trust.recompute(owner_id, &self.closed, users);

        if late {
            tracing::warn!(request_id = %request_id, borrower_id = %borrower_id, "Item returned late");
        } else {
            tracing::info!(request_id = %request_id, "Item returned");
        }
        Ok(returned)
    }

    /// Shared checks for accept and reject: actor owns the item, request is pending
    fn check_owner_decision(
        &self,
        items: &ItemRegistry,
        actor: Uuid,
        request_id: Uuid,
    ) -> LendingResult<(Uuid, Uuid)> {
        let request = self.get(request_id)?;
        let item = items.get(request.item_id)?;

        if item.owner_id != actor {
            return Err(LendingError::NotOwner {
                user_id: actor,
                item_id: item.id,
            });
        }
        if request.status != RequestStatus::Pending {
            return Err(LendingError::NotPending(request_id));
        }

        Ok((request.item_id, request.borrower_id))
    }

    fn request_mut(&mut self, request_id: Uuid) -> LendingResult<&mut BorrowRequest> {
        self.index
            .get(&request_id)
            .and_then(|&i| self.requests.get_mut(i))
            .ok_or(LendingError::RequestNotFound(request_id))
    }

    fn was_rejected(&self, item_id: Uuid, borrower_id: Uuid) -> bool {
        self.requests.iter().any(|r| {
            r.item_id == item_id
                && r.borrower_id == borrower_id
                && r.status == RequestStatus::Rejected
        })
    }

    pub fn get(&self, request_id: Uuid) -> LendingResult<&BorrowRequest> {
        self.index
            .get(&request_id)
            .and_then(|&i| self.requests.get(i))
            .ok_or(LendingError::RequestNotFound(request_id))
    }

    /// All requests, oldest first
    pub fn all(&self) -> &[BorrowRequest] {
        &self.requests
    }

    /// The pending or accepted request holding `item_id`, if any
    pub fn active_for_item(&self, item_id: Uuid) -> Option<&BorrowRequest> {
        self.requests
            .iter()
            .find(|r| r.item_id == item_id && r.status.is_active())
    }

    /// Pending requests awaiting `owner_id`'s decision
    pub fn incoming_pending(&self, owner_id: Uuid) -> Vec<BorrowRequest> {
        self.requests
            .iter()
            .filter(|r| r.owner_id == owner_id && r.status == RequestStatus::Pending)
            .cloned()
            .collect()
    }

    /// Every request `borrower_id` has made
    pub fn outgoing(&self, borrower_id: Uuid) -> Vec<BorrowRequest> {
        self.requests
            .iter()
            .filter(|r| r.borrower_id == borrower_id)
            .cloned()
            .collect()
    }

    /// The full closed-transaction log
    pub fn closed(&self) -> &[ClosedTransaction] {
        &self.closed
    }

    /// Closed transactions `user_id` took part in
    pub fn closed_for(&self, user_id: Uuid) -> Vec<ClosedTransaction> {
        self.closed
            .iter()
            .filter(|tx| tx.borrower_id == user_id || tx.owner_id == user_id)
            .cloned()
            .collect()
    }
}
