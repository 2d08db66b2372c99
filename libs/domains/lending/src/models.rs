use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::LazyLock;
use strum::{Display, EnumIter, EnumString};
use uuid::Uuid;
use validator::Validate;

/// Room numbers look like `302`, `B-12` or `405A`
static ROOM_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9-]{1,10}$").expect("room pattern is valid"));

/// Rejects values that are empty once trimmed
fn not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("blank"));
    }
    Ok(())
}

fn validate_room(room: &str) -> Result<(), validator::ValidationError> {
    if !ROOM_NUMBER.is_match(room) {
        return Err(validator::ValidationError::new("invalid_room_number"));
    }
    Ok(())
}

/// Item categories offered when listing an item
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
pub enum ItemCategory {
    Electronics,
    Books,
    Sports,
    Kitchen,
    Appliances,
    #[serde(rename = "Musical Instruments")]
    #[strum(serialize = "Musical Instruments")]
    MusicalInstruments,
    Other,
}

/// Item lifecycle status
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ItemStatus {
    /// Listed and free to request
    #[default]
    Available,
    /// Held by a pending borrow request
    Requested,
    /// Lent out under an accepted request
    Borrowed,
}

/// Borrow request status
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    Pending,
    Accepted,
    /// Terminal
    Rejected,
    /// Terminal
    Returned,
}

impl RequestStatus {
    /// Whether the request holds the item's exclusivity lock
    pub fn is_active(&self) -> bool {
        matches!(self, RequestStatus::Pending | RequestStatus::Accepted)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestStatus::Rejected | RequestStatus::Returned)
    }
}

/// User entity - a resident who lends and borrows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Contact email (unique, case-insensitive)
    pub email: String,
    /// Residence building
    pub hostel: String,
    /// Room within the hostel
    pub room: String,
    /// Cached score derived from closed transactions (0-100)
    pub trust_score: u8,
    /// Closed transactions where the user was the owner
    pub items_lent: u32,
    /// Closed transactions where the user was the borrower
    pub items_borrowed: u32,
    pub created_at: DateTime<Utc>,
}

/// DTO for signing up a new user
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUser {
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub name: String,
    #[validate(email, length(max = 255))]
    pub email: String,
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub hostel: String,
    #[validate(custom(function = "validate_room"))]
    pub room: String,
}

/// Item entity - canonical record owned by the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Unique identifier
    pub id: Uuid,
    pub name: String,
    pub category: ItemCategory,
    pub description: String,
    /// Listing user
    pub owner_id: Uuid,
    pub status: ItemStatus,
    /// Set only while borrowed
    pub borrowed_by: Option<Uuid>,
    /// Set only while borrowed
    pub borrowed_at: Option<DateTime<Utc>>,
    /// Set only while borrowed
    pub return_by: Option<DateTime<Utc>>,
    /// Opaque token printed on the physical item (QR code)
    pub tracking_token: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Whether the borrow fields agree with `status`
    pub fn is_consistent(&self) -> bool {
        let loan_fields_set = self.borrowed_by.is_some() && self.return_by.is_some();
        let loan_fields_clear =
            self.borrowed_by.is_none() && self.borrowed_at.is_none() && self.return_by.is_none();

        match self.status {
            ItemStatus::Borrowed => {
                loan_fields_set && self.borrowed_by != Some(self.owner_id)
            }
            ItemStatus::Available => loan_fields_clear,
            ItemStatus::Requested => !loan_fields_set,
        }
    }

    pub(crate) fn clear_loan(&mut self) {
        self.borrowed_by = None;
        self.borrowed_at = None;
        self.return_by = None;
    }
}

/// DTO for listing a new item
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateItem {
    #[validate(length(min = 1, max = 120), custom(function = "not_blank"))]
    pub name: String,
    #[validate(required)]
    pub category: Option<ItemCategory>,
    #[validate(length(min = 1, max = 2000), custom(function = "not_blank"))]
    pub description: String,
}

/// Loan terms attached to an item when it becomes borrowed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Loan {
    pub borrower_id: Uuid,
    pub borrowed_at: DateTime<Utc>,
    pub return_by: DateTime<Utc>,
}

/// Borrow request entity - canonical record owned by the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowRequest {
    pub id: Uuid,
    pub item_id: Uuid,
    pub borrower_id: Uuid,
    pub owner_id: Uuid,
    pub status: RequestStatus,
    pub requested_at: DateTime<Utc>,
    /// Agreed due date, set on acceptance
    pub return_by: Option<DateTime<Utc>>,
    /// When the owner accepted or rejected
    pub decided_at: Option<DateTime<Utc>>,
    pub returned_at: Option<DateTime<Utc>>,
    /// Whether the return happened after `return_by`, set on return
    pub late: Option<bool>,
}

impl BorrowRequest {
    pub fn is_party(&self, user_id: Uuid) -> bool {
        self.borrower_id == user_id || self.owner_id == user_id
    }
}

/// A returned loan, the input of trust scoring and history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosedTransaction {
    pub request_id: Uuid,
    pub item_id: Uuid,
    pub borrower_id: Uuid,
    pub owner_id: Uuid,
    pub borrowed_at: DateTime<Utc>,
    pub return_by: DateTime<Utc>,
    pub returned_at: DateTime<Utc>,
    pub late: bool,
}

/// Category filter for browsing; `All` matches everything
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryFilter {
    #[default]
    All,
    Only(ItemCategory),
}

impl CategoryFilter {
    pub fn matches(&self, category: ItemCategory) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(wanted) => *wanted == category,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = strum::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(CategoryFilter::All);
        }
        ItemCategory::from_str(s).map(CategoryFilter::Only)
    }
}

impl From<ItemCategory> for CategoryFilter {
    fn from(category: ItemCategory) -> Self {
        CategoryFilter::Only(category)
    }
}

/// Browse query over the catalog
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    /// Case-insensitive substring of name or description; empty matches all
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub category: CategoryFilter,
    /// Hide items listed by this user
    pub exclude_owner: Option<Uuid>,
}

/// Item with owner display fields, recomputed on every read
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemListing {
    #[serde(flatten)]
    pub item: Item,
    pub owner_name: String,
    pub owner_room: String,
}

/// Request with item and borrower display fields, recomputed on every read
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestView {
    #[serde(flatten)]
    pub request: BorrowRequest,
    pub item_name: String,
    pub borrower_name: String,
}

/// Dashboard read model
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub user: User,
    /// Items the user listed
    pub listed: Vec<ItemListing>,
    /// Items the user currently has borrowed
    pub borrowing: Vec<ItemListing>,
    /// Pending requests on the user's items
    pub incoming_requests: Vec<RequestView>,
    /// A few available items listed by others
    pub featured: Vec<ItemListing>,
}
