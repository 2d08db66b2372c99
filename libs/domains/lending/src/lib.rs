//! Lending Domain
//!
//! Item lifecycle and borrow-request state model for a residence
//! lending community: residents list items, neighbours request them, owners
//! accept or decline, and returns feed a trust score.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────┐
//! │ LendingService │  ← async facade, single writer lock, explicit actor
//! └───────┬────────┘
//!         │
//! ┌───────▼────────┐   ┌──────────────────┐
//! │ RequestLedger  │──▶│ TrustScoreEngine │
//! └───────┬────────┘   └──────────────────┘
//!         │
//! ┌───────▼────────┐   ┌──────────────────┐
//! │  ItemRegistry  │──▶│      query       │
//! └───────┬────────┘   └──────────────────┘
//!         │
//! ┌───────▼────────┐
//! │     Models     │  ← entities, DTOs, read models
//! └────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_lending::{CreateItem, CreateUser, ItemCategory, LendingPolicy, LendingService};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = LendingService::new(LendingPolicy::default());
//!
//! let owner = service
//!     .register_user(CreateUser {
//!         name: "Sarah Chen".to_string(),
//!         email: "sarah@example.com".to_string(),
//!         hostel: "North Wing".to_string(),
//!         room: "405".to_string(),
//!     })
//!     .await?;
//!
//! service
//!     .list_item(
//!         owner.id,
//!         CreateItem {
//!             name: "USB-C Hub".to_string(),
//!             category: Some(ItemCategory::Electronics),
//!             description: "7-in-1 hub with HDMI.".to_string(),
//!         },
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod config;
pub mod directory;
pub mod error;
pub mod history;
pub mod ledger;
pub mod models;
pub mod profile;
pub mod query;
pub mod registry;
pub mod service;
pub mod trust;

// Re-export commonly used types
pub use clock::{Clock, SystemClock};
pub use config::{LendingPolicy, TrustPolicy};
pub use error::{ErrorCategory, LendingError, LendingResult};
pub use history::{History, HistoryEntry, HistoryFilter, HistoryOutcome, HistoryRole, HistorySummary};
pub use models::{
    BorrowRequest, CategoryFilter, ClosedTransaction, CreateItem, CreateUser, Dashboard, Item,
    ItemCategory, ItemListing, ItemStatus, RequestStatus, RequestView, SearchQuery, User,
};
pub use profile::{Achievement, ProfileSummary, TrustTier};
pub use service::LendingService;
pub use trust::TrustScoreEngine;
