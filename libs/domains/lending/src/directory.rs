//! Canonical user records.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

use crate::error::{LendingError, LendingResult};
use crate::models::{CreateUser, User};

/// Owns every [`User`]; counters and scores change only through the ledger
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: HashMap<Uuid, User>,
    initial_score: u8,
}

impl UserDirectory {
    /// `initial_score` is what a new user starts with before any history
    pub fn new(initial_score: u8) -> Self {
        Self {
            users: HashMap::new(),
            initial_score,
        }
    }

    /// Sign up a new user
    pub fn register(&mut self, input: CreateUser, now: DateTime<Utc>) -> LendingResult<User> {
        input.validate()?;

        if self.find_by_email(&input.email).is_some() {
            return Err(LendingError::DuplicateEmail(input.email));
        }

        let user = User {
            id: Uuid::now_v7(),
            name: input.name.trim().to_string(),
            email: input.email.trim().to_string(),
            hostel: input.hostel.trim().to_string(),
            room: input.room,
            trust_score: self.initial_score,
            items_lent: 0,
            items_borrowed: 0,
            created_at: now,
        };
        self.users.insert(user.id, user.clone());

        tracing::info!(user_id = %user.id, "Registered user");
        Ok(user)
    }

    pub fn get(&self, id: Uuid) -> LendingResult<&User> {
        self.users.get(&id).ok_or(LendingError::UserNotFound(id))
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.users.contains_key(&id)
    }

    pub fn find_by_email(&self, email: &str) -> Option<&User> {
        let email = email.trim();
        self.users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Bump the counters for a completed loan
    pub(crate) fn record_completed_loan(&mut self, owner_id: Uuid, borrower_id: Uuid) {
        if let Some(owner) = self.users.get_mut(&owner_id) {
            owner.items_lent += 1;
        }
        if let Some(borrower) = self.users.get_mut(&borrower_id) {
            borrower.items_borrowed += 1;
        }
    }

    pub(crate) fn set_trust_score(&mut self, user_id: Uuid, score: u8) {
        if let Some(user) = self.users.get_mut(&user_id) {
            user.trust_score = score;
        }
    }
}
