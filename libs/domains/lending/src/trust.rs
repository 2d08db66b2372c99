//! Trust scores derived from the closed-transaction log.

use uuid::Uuid;

use crate::config::TrustPolicy;
use crate::directory::UserDirectory;
use crate::models::ClosedTransaction;

pub const MIN_SCORE: i32 = 0;
pub const MAX_SCORE: i32 = 100;

/// Counts that feed a user's score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrustTally {
    /// Returns made after the due date, as borrower
    pub late_returns: u32,
    /// Returns received on time, as lender
    pub on_time_lends: u32,
}

impl TrustTally {
    pub fn from_log(user_id: Uuid, log: &[ClosedTransaction]) -> Self {
        log.iter().fold(Self::default(), |mut tally, tx| {
            if tx.borrower_id == user_id && tx.late {
                tally.late_returns += 1;
            }
            if tx.owner_id == user_id && !tx.late {
                tally.on_time_lends += 1;
            }
            tally
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TrustScoreEngine {
    policy: TrustPolicy,
}

impl TrustScoreEngine {
    pub fn new(policy: TrustPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &TrustPolicy {
        &self.policy
    }

    /// Score with no history
    pub fn initial_score(&self) -> u8 {
        clamp(i64::from(self.policy.base))
    }

    pub fn score_for(&self, tally: TrustTally) -> u8 {
        let raw = i64::from(self.policy.base)
            - i64::from(self.policy.late_return_penalty) * i64::from(tally.late_returns)
            + i64::from(self.policy.on_time_lend_bonus) * i64::from(tally.on_time_lends);
        clamp(raw)
    }

    /// Pure score of `user_id` over `log`
    pub fn score(&self, user_id: Uuid, log: &[ClosedTransaction]) -> u8 {
        self.score_for(TrustTally::from_log(user_id, log))
    }

    /// Recompute and cache the score on the user record
    pub fn recompute(
        &self,
        user_id: Uuid,
        log: &[ClosedTransaction],
        directory: &mut UserDirectory,
    ) -> u8 {
        let score = self.score(user_id, log);
        directory.set_trust_score(user_id, score);
        tracing::debug!(user_id = %user_id, score, "Recomputed trust score");
        score
    }
}

fn clamp(raw: i64) -> u8 {
    // The clamp bounds fit in u8
    raw.clamp(i64::from(MIN_SCORE), i64::from(MAX_SCORE)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn closed(borrower_id: Uuid, owner_id: Uuid, late: bool) -> ClosedTransaction {
        let now = Utc::now();
        ClosedTransaction {
            request_id: Uuid::now_v7(),
            item_id: Uuid::now_v7(),
            borrower_id,
            owner_id,
            borrowed_at: now - Duration::days(6),
            return_by: now - Duration::days(1),
            returned_at: now,
            late,
        }
    }

    #[test]
    fn test_no_history_is_base() {
        let engine = TrustScoreEngine::default();
        assert_eq!(engine.score(Uuid::now_v7(), &[]), 100);
        assert_eq!(engine.initial_score(), 100);
    }

    #[test]
    fn test_late_return_costs_borrower_only() {
        let engine = TrustScoreEngine::default();
        let borrower = Uuid::now_v7();
        let owner = Uuid::now_v7();
        let log = vec![closed(borrower, owner, true)];

        assert_eq!(engine.score(borrower, &log), 95);
        assert_eq!(engine.score(owner, &log), 100);
    }

    #[test]
    fn test_on_time_lends_recover_after_penalties() {
        let engine = TrustScoreEngine::default();
        let user = Uuid::now_v7();
        let other = Uuid::now_v7();
        let log = vec![
            closed(user, other, true),
            closed(user, other, true),
            closed(other, user, false),
            closed(other, user, false),
            closed(other, user, false),
        ];

        assert_eq!(
            TrustTally::from_log(user, &log),
            TrustTally {
                late_returns: 2,
                on_time_lends: 3
            }
        );
        assert_eq!(engine.score(user, &log), 93);
    }

    #[test]
    fn test_score_is_clamped() {
        let engine = TrustScoreEngine::default();
        assert_eq!(
            engine.score_for(TrustTally {
                late_returns: 500,
                on_time_lends: 0
            }),
            0
        );
        assert_eq!(
            engine.score_for(TrustTally {
                late_returns: 0,
                on_time_lends: 500
            }),
            100
        );
    }

    #[test]
    fn test_score_is_monotonic() {
        let engine = TrustScoreEngine::new(TrustPolicy {
            base: 60,
            ..TrustPolicy::default()
        });

        let mut previous = u8::MAX;
        for late_returns in 0..30 {
            let score = engine.score_for(TrustTally {
                late_returns,
                on_time_lends: 4,
            });
            assert!(score <= previous, "late returns must never raise the score");
            previous = score;
        }

        let mut previous = 0;
        for on_time_lends in 0..60 {
            let score = engine.score_for(TrustTally {
                late_returns: 3,
                on_time_lends,
            });
            assert!(score >= previous, "on-time lends must never lower the score");
            assert!(i32::from(score) <= MAX_SCORE);
            previous = score;
        }
    }

    #[test]
    fn test_score_is_monotonic_for_any_policy() {
        let policies = [
            TrustPolicy {
                base: 50,
                late_return_penalty: 0,
                on_time_lend_bonus: 0,
            },
            TrustPolicy {
                base: 50,
                late_return_penalty: 7,
                on_time_lend_bonus: 3,
            },
            TrustPolicy {
                base: -20,
                late_return_penalty: u32::MAX,
                on_time_lend_bonus: u32::MAX,
            },
        ];

        for policy in policies {
            let engine = TrustScoreEngine::new(policy);
            for late_returns in 0..10 {
                for on_time_lends in 0..10 {
                    let here = engine.score_for(TrustTally {
                        late_returns,
                        on_time_lends,
                    });
                    let one_more_late = engine.score_for(TrustTally {
                        late_returns: late_returns + 1,
                        on_time_lends,
                    });
                    let one_more_on_time = engine.score_for(TrustTally {
                        late_returns,
                        on_time_lends: on_time_lends + 1,
                    });
                    assert!(one_more_late <= here, "{:?}: late return raised the score", policy);
                    assert!(one_more_on_time >= here, "{:?}: on-time lend lowered the score", policy);
                }
            }
        }
    }

    #[test]
    fn test_recompute_updates_cached_score() {
        use crate::models::CreateUser;

        let engine = TrustScoreEngine::default();
        let mut directory = UserDirectory::new(engine.initial_score());
        let user = directory
            .register(
                CreateUser {
                    name: "John Smith".to_string(),
                    email: "john@example.com".to_string(),
                    hostel: "South Wing".to_string(),
                    room: "215".to_string(),
                },
                Utc::now(),
            )
            .unwrap();
        let log = vec![closed(user.id, Uuid::now_v7(), true)];

        assert_eq!(engine.recompute(user.id, &log, &mut directory), 95);
        assert_eq!(directory.get(user.id).unwrap().trust_score, 95);
    }
}
