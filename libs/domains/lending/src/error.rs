use thiserror::Error;
use uuid::Uuid;

use crate::models::ItemStatus;

/// How a caller should treat a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed input
    Validation,
    /// The current state does not permit the operation
    Conflict,
    /// The acting user may not perform the operation
    Authorization,
    NotFound,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LendingError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Return date must be after {now}")]
    InvalidDate { now: chrono::DateTime<chrono::Utc> },

    #[error("Item not found: {0}")]
    ItemNotFound(Uuid),

    #[error("Borrow request not found: {0}")]
    RequestNotFound(Uuid),

    #[error("User not found: {0}")]
    UserNotFound(Uuid),

    #[error("Item {item_id} is {status}, not available")]
    ItemUnavailable { item_id: Uuid, status: ItemStatus },

    #[error("Item {0} already has an open borrow request")]
    DuplicateRequest(Uuid),

    #[error("Borrow request {0} is not pending")]
    NotPending(Uuid),

    #[error("Borrow request {0} is not accepted")]
    NotAccepted(Uuid),

    #[error("Item {item_id} cannot move from {from} to {to}")]
    InvalidTransition {
        item_id: Uuid,
        from: ItemStatus,
        to: ItemStatus,
    },

    #[error("User with email '{0}' already exists")]
    DuplicateEmail(String),

    #[error("User {user_id} does not own item {item_id}")]
    NotOwner { user_id: Uuid, item_id: Uuid },

    #[error("User {user_id} is not a party to borrow request {request_id}")]
    NotParty { user_id: Uuid, request_id: Uuid },

    #[error("User {0} cannot borrow their own item")]
    SelfBorrow(Uuid),

    #[error("User {user_id} was already declined for item {item_id}")]
    RequestBlocked { user_id: Uuid, item_id: Uuid },
}

pub type LendingResult<T> = Result<T, LendingError>;

impl LendingError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            LendingError::Validation(_) | LendingError::InvalidDate { .. } => {
                ErrorCategory::Validation
            }
            LendingError::ItemNotFound(_)
            | LendingError::RequestNotFound(_)
            | LendingError::UserNotFound(_) => ErrorCategory::NotFound,
            LendingError::ItemUnavailable { .. }
            | LendingError::DuplicateRequest(_)
            | LendingError::NotPending(_)
            | LendingError::NotAccepted(_)
            | LendingError::InvalidTransition { .. }
            | LendingError::DuplicateEmail(_) => ErrorCategory::Conflict,
            LendingError::NotOwner { .. }
            | LendingError::NotParty { .. }
            | LendingError::SelfBorrow(_)
            | LendingError::RequestBlocked { .. } => ErrorCategory::Authorization,
        }
    }

    /// Conflicts may succeed after the caller reloads state
    pub fn is_retryable(&self) -> bool {
        self.category() == ErrorCategory::Conflict
    }
}

impl From<validator::ValidationErrors> for LendingError {
    fn from(err: validator::ValidationErrors) -> Self {
        LendingError::Validation(err.to_string())
    }
}
