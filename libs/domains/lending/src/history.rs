//! Borrowing history read model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::directory::UserDirectory;
use crate::ledger::RequestLedger;
use crate::models::{ItemCategory, RequestStatus};
use crate::registry::ItemRegistry;

/// Which side of the history to show
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum HistoryFilter {
    #[default]
    All,
    Borrowed,
    Lent,
}

/// The user's side of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum HistoryRole {
    Borrowed,
    Lent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum HistoryOutcome {
    /// Returned on or before the due date
    Completed,
    ReturnedLate,
    /// Still out on loan
    Active,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub request_id: Uuid,
    pub item_name: String,
    pub category: ItemCategory,
    pub role: HistoryRole,
    pub counterpart_id: Uuid,
    pub counterpart_name: String,
    pub counterpart_room: String,
    pub borrowed_at: DateTime<Utc>,
    pub return_by: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub outcome: HistoryOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct HistorySummary {
    pub total: usize,
    pub on_time: usize,
    /// Percentage of all transactions returned on time, rounded
    pub success_rate: u8,
}

impl HistorySummary {
    pub fn from_entries(entries: &[HistoryEntry]) -> Self {
        let total = entries.len();
        let on_time = entries
            .iter()
            .filter(|e| e.outcome == HistoryOutcome::Completed)
            .count();
        let success_rate = if total == 0 {
            0
        } else {
            // Rounded half up; on_time <= total keeps this within 0..=100
            ((on_time * 200 + total) / (total * 2)) as u8
        };

        Self {
            total,
            on_time,
            success_rate,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct History {
    pub entries: Vec<HistoryEntry>,
    /// Computed over the unfiltered history
    pub summary: HistorySummary,
}

/// Build `user_id`'s history, newest loans first
pub fn history(
    user_id: Uuid,
    filter: HistoryFilter,
    items: &ItemRegistry,
    ledger: &RequestLedger,
    users: &UserDirectory,
) -> History {
    let closed = ledger.closed_for(user_id).into_iter().map(|tx| {
        let outcome = if tx.late {
            HistoryOutcome::ReturnedLate
        } else {
            HistoryOutcome::Completed
        };
        Row {
            request_id: tx.request_id,
            item_id: tx.item_id,
            borrower_id: tx.borrower_id,
            owner_id: tx.owner_id,
            borrowed_at: tx.borrowed_at,
            return_by: tx.return_by,
            returned_at: Some(tx.returned_at),
            outcome,
        }
    });

    let active = ledger
        .all()
        .iter()
        .filter(|r| r.status == RequestStatus::Accepted && r.is_party(user_id))
        .filter_map(|r| {
            Some(Row {
                request_id: r.id,
                item_id: r.item_id,
                borrower_id: r.borrower_id,
                owner_id: r.owner_id,
                borrowed_at: r.decided_at.unwrap_or(r.requested_at),
                return_by: r.return_by?,
                returned_at: None,
                outcome: HistoryOutcome::Active,
            })
        });

    let mut entries: Vec<HistoryEntry> = closed
        .chain(active)
        .filter_map(|row| row.into_entry(user_id, items, users))
        .collect();
    entries.sort_by(|a, b| b.borrowed_at.cmp(&a.borrowed_at));

    let summary = HistorySummary::from_entries(&entries);
    entries.retain(|e| match filter {
        HistoryFilter::All => true,
        HistoryFilter::Borrowed => e.role == HistoryRole::Borrowed,
        HistoryFilter::Lent => e.role == HistoryRole::Lent,
    });

    History { entries, summary }
}

struct Row {
    request_id: Uuid,
    item_id: Uuid,
    borrower_id: Uuid,
    owner_id: Uuid,
    borrowed_at: DateTime<Utc>,
    return_by: DateTime<Utc>,
    returned_at: Option<DateTime<Utc>>,
    outcome: HistoryOutcome,
}

impl Row {
    fn into_entry(
        self,
        user_id: Uuid,
        items: &ItemRegistry,
        users: &UserDirectory,
    ) -> Option<HistoryEntry> {
        let item = items.get(self.item_id).ok()?;
        let (role, counterpart_id) = if self.borrower_id == user_id {
            (HistoryRole::Borrowed, self.owner_id)
        } else {
            (HistoryRole::Lent, self.borrower_id)
        };
        let counterpart = users.get(counterpart_id).ok()?;

        Some(HistoryEntry {
            request_id: self.request_id,
            item_name: item.name.clone(),
            category: item.category,
            role,
            counterpart_id,
            counterpart_name: counterpart.name.clone(),
            counterpart_room: counterpart.room.clone(),
            borrowed_at: self.borrowed_at,
            return_by: self.return_by,
            returned_at: self.returned_at,
            outcome: self.outcome,
        })
    }
}
