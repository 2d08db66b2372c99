//! Catalog of lendable items and their status transitions.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

use crate::error::{LendingError, LendingResult};
use crate::models::{CreateItem, Item, ItemStatus, Loan};

const TRACKING_TOKEN_PREFIX: &str = "LENDIT-ITEM-";

/// Owns every [`Item`]. Iteration follows insertion order.
#[derive(Debug, Clone, Default)]
pub struct ItemRegistry {
    items: Vec<Item>,
    index: HashMap<Uuid, usize>,
    issued_tokens: u64,
}

impl ItemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// List a new item as `available` with a fresh tracking token
    pub fn create(
        &mut self,
        owner_id: Uuid,
        input: CreateItem,
        now: DateTime<Utc>,
    ) -> LendingResult<Item> {
        input.validate()?;
        let category = input
            .category
            .ok_or_else(|| LendingError::Validation("category: required".to_string()))?;

        let item = Item {
            id: Uuid::now_v7(),
            name: input.name.trim().to_string(),
            category,
            description: input.description.trim().to_string(),
            owner_id,
            status: ItemStatus::Available,
            borrowed_by: None,
            borrowed_at: None,
            return_by: None,
            tracking_token: self.next_tracking_token(),
            created_at: now,
            updated_at: now,
        };

        self.index.insert(item.id, self.items.len());
        self.items.push(item.clone());

        tracing::info!(item_id = %item.id, owner_id = %owner_id, "Listed item");
        Ok(item)
    }

    fn next_tracking_token(&mut self) -> String {
        self.issued_tokens += 1;
        format!("{}{:03}", TRACKING_TOKEN_PREFIX, self.issued_tokens)
    }

    pub fn get(&self, item_id: Uuid) -> LendingResult<&Item> {
        self.index
            .get(&item_id)
            .and_then(|&i| self.items.get(i))
            .ok_or(LendingError::ItemNotFound(item_id))
    }

    /// Move an item along its lifecycle.
    ///
    /// Only the ledger calls this. Every check runs before the record is
    /// touched, so an error leaves the item unchanged.
    pub(crate) fn set_status(
        &mut self,
        item_id: Uuid,
        to: ItemStatus,
        loan: Option<Loan>,
        now: DateTime<Utc>,
    ) -> LendingResult<&Item> {
        let position = *self
            .index
            .get(&item_id)
            .ok_or(LendingError::ItemNotFound(item_id))?;
        let item = &mut self.items[position];
        let from = item.status;

        let allowed = matches!(
            (from, to),
            (ItemStatus::Available, ItemStatus::Requested)
                | (ItemStatus::Requested, ItemStatus::Borrowed)
                | (ItemStatus::Requested, ItemStatus::Available)
                | (ItemStatus::Borrowed, ItemStatus::Available)
        );
        // A loan accompanies exactly the move into `borrowed`
        if !allowed || loan.is_some() != (to == ItemStatus::Borrowed) {
            return Err(LendingError::InvalidTransition { item_id, from, to });
        }
        if let Some(loan) = loan {
            if loan.borrower_id == item.owner_id {
                return Err(LendingError::SelfBorrow(loan.borrower_id));
            }
        }

        item.status = to;
        match loan {
            Some(loan) => {
                item.borrowed_by = Some(loan.borrower_id);
                item.borrowed_at = Some(loan.borrowed_at);
                item.return_by = Some(loan.return_by);
            }
            None => item.clear_loan(),
        }
        item.updated_at = now;

        tracing::debug!(item_id = %item_id, %from, %to, "Item status changed");
        Ok(&*item)
    }

    /// All items, in listing order
    pub fn all(&self) -> &[Item] {
        &self.items
    }

    pub fn list_by_owner(&self, owner_id: Uuid) -> Vec<Item> {
        self.items
            .iter()
            .filter(|i| i.owner_id == owner_id)
            .cloned()
            .collect()
    }

    /// Available items that `user_id` did not list
    pub fn list_available_excluding(&self, user_id: Uuid) -> Vec<Item> {
        self.items
            .iter()
            .filter(|i| i.status == ItemStatus::Available && i.owner_id != user_id)
            .cloned()
            .collect()
    }

    /// Items currently lent to `user_id`
    pub fn list_borrowed_by(&self, user_id: Uuid) -> Vec<Item> {
        self.items
            .iter()
            .filter(|i| i.borrowed_by == Some(user_id))
            .cloned()
            .collect()
    }

    /// Resolve a scanned tracking token
    pub fn find_by_tracking_token(&self, token: &str) -> Option<&Item> {
        let token = token.trim();
        self.items
            .iter()
            .find(|i| i.tracking_token.eq_ignore_ascii_case(token))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemCategory;
    use chrono::Duration;

    fn charger() -> CreateItem {
        CreateItem {
            name: "iPhone Charger".to_string(),
            category: Some(ItemCategory::Electronics),
            description: "Original Apple lightning cable and adapter.".to_string(),
        }
    }

    fn loan(borrower_id: Uuid, now: DateTime<Utc>) -> Loan {
        Loan {
            borrower_id,
            borrowed_at: now,
            return_by: now + Duration::days(5),
        }
    }

    #[test]
    fn test_create_assigns_available_and_unique_tokens() {
        let mut registry = ItemRegistry::new();
        let owner = Uuid::now_v7();
        let now = Utc::now();

        let first = registry.create(owner, charger(), now).unwrap();
        let second = registry.create(owner, charger(), now).unwrap();

        assert_eq!(first.status, ItemStatus::Available);
        assert_eq!(first.tracking_token, "LENDIT-ITEM-001");
        assert_eq!(second.tracking_token, "LENDIT-ITEM-002");
        assert!(first.is_consistent());
    }

    #[test]
    fn test_create_rejects_missing_category() {
        let mut registry = ItemRegistry::new();
        let input = CreateItem {
            category: None,
            ..charger()
        };

        let result = registry.create(Uuid::now_v7(), input, Utc::now());
        assert!(matches!(result, Err(LendingError::Validation(_))));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_full_lifecycle_transitions() {
        let mut registry = ItemRegistry::new();
        let owner = Uuid::now_v7();
        let borrower = Uuid::now_v7();
        let now = Utc::now();
        let item = registry.create(owner, charger(), now).unwrap();

        registry
            .set_status(item.id, ItemStatus::Requested, None, now)
            .unwrap();
        let lent = registry
            .set_status(item.id, ItemStatus::Borrowed, Some(loan(borrower, now)), now)
            .unwrap();
        assert_eq!(lent.borrowed_by, Some(borrower));
        assert!(lent.is_consistent());

        let returned = registry
            .set_status(item.id, ItemStatus::Available, None, now)
            .unwrap();
        assert_eq!(returned.borrowed_by, None);
        assert_eq!(returned.return_by, None);
        assert!(returned.is_consistent());
    }

    #[test]
    fn test_invalid_transition_leaves_item_unchanged() {
        let mut registry = ItemRegistry::new();
        let now = Utc::now();
        let item = registry.create(Uuid::now_v7(), charger(), now).unwrap();

        let result = registry.set_status(
            item.id,
            ItemStatus::Borrowed,
            Some(loan(Uuid::now_v7(), now)),
            now,
        );
        assert!(matches!(
            result,
            Err(LendingError::InvalidTransition {
                from: ItemStatus::Available,
                to: ItemStatus::Borrowed,
                ..
            })
        ));
        assert_eq!(registry.get(item.id).unwrap(), &item);
    }

    #[test]
    fn test_borrowed_requires_loan() {
        let mut registry = ItemRegistry::new();
        let now = Utc::now();
        let item = registry.create(Uuid::now_v7(), charger(), now).unwrap();
        registry
            .set_status(item.id, ItemStatus::Requested, None, now)
            .unwrap();

        let result = registry.set_status(item.id, ItemStatus::Borrowed, None, now);
        assert!(matches!(result, Err(LendingError::InvalidTransition { .. })));
        assert_eq!(registry.get(item.id).unwrap().status, ItemStatus::Requested);
    }

    #[test]
    fn test_owner_cannot_be_borrower() {
        let mut registry = ItemRegistry::new();
        let owner = Uuid::now_v7();
        let now = Utc::now();
        let item = registry.create(owner, charger(), now).unwrap();
        registry
            .set_status(item.id, ItemStatus::Requested, None, now)
            .unwrap();

        let result = registry.set_status(item.id, ItemStatus::Borrowed, Some(loan(owner, now)), now);
        assert_eq!(result, Err(LendingError::SelfBorrow(owner)));
    }

    #[test]
    fn test_read_projections() {
        let mut registry = ItemRegistry::new();
        let alice = Uuid::now_v7();
        let bob = Uuid::now_v7();
        let now = Utc::now();
        let a1 = registry.create(alice, charger(), now).unwrap();
        let b1 = registry.create(bob, charger(), now).unwrap();
        let b2 = registry.create(bob, charger(), now).unwrap();
        registry
            .set_status(b2.id, ItemStatus::Requested, None, now)
            .unwrap();

        let ids = |items: Vec<Item>| items.into_iter().map(|i| i.id).collect::<Vec<_>>();
        assert_eq!(ids(registry.list_by_owner(bob)), vec![b1.id, b2.id]);
        assert_eq!(ids(registry.list_available_excluding(alice)), vec![b1.id]);
        assert_eq!(ids(registry.list_available_excluding(bob)), vec![a1.id]);
        assert_eq!(
            registry.find_by_tracking_token("lendit-item-002").map(|i| i.id),
            Some(b1.id)
        );
        assert!(registry.find_by_tracking_token("LENDIT-ITEM-999").is_none());
    }
}
