use serde::Serialize;
use strum::{Display, EnumIter, IntoEnumIterator};

use crate::models::User;

/// Badge shown next to a trust score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum TrustTier {
    Excellent,
    #[strum(serialize = "Very Good")]
    VeryGood,
    Good,
    Fair,
}

impl TrustTier {
    pub fn for_score(score: u8) -> Self {
        match score {
            90.. => TrustTier::Excellent,
            80..=89 => TrustTier::VeryGood,
            70..=79 => TrustTier::Good,
            _ => TrustTier::Fair,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumIter)]
pub enum Achievement {
    /// Completed a first lend
    #[strum(serialize = "First Lend")]
    FirstLend,
    /// Lent 10 or more items
    #[strum(serialize = "Community Helper")]
    CommunityHelper,
    /// Score of at least 85
    #[strum(serialize = "On Time")]
    OnTime,
    /// Score of at least 80
    #[strum(serialize = "Trusted Member")]
    TrustedMember,
}

impl Achievement {
    pub fn is_unlocked(&self, user: &User) -> bool {
        match self {
            Achievement::FirstLend => user.items_lent > 0,
            Achievement::CommunityHelper => user.items_lent >= 10,
            Achievement::OnTime => user.trust_score >= 85,
            Achievement::TrustedMember => user.trust_score >= 80,
        }
    }

    /// Achievements `user` has unlocked, in display order
    pub fn unlocked_by(user: &User) -> Vec<Achievement> {
        Achievement::iter().filter(|a| a.is_unlocked(user)).collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileSummary {
    pub user: User,
    pub tier: TrustTier,
    /// Items the user has listed, whatever their status
    pub items_listed: usize,
    pub achievements: Vec<Achievement>,
}

impl ProfileSummary {
    pub fn new(user: User, items_listed: usize) -> Self {
        Self {
            tier: TrustTier::for_score(user.trust_score),
            achievements: Achievement::unlocked_by(&user),
            items_listed,
            user,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn user(trust_score: u8, items_lent: u32) -> User {
        User {
            id: Uuid::now_v7(),
            name: "Demo User".to_string(),
            email: "demo@example.com".to_string(),
            hostel: "North Wing".to_string(),
            room: "302".to_string(),
            trust_score,
            items_lent,
            items_borrowed: 8,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(TrustTier::for_score(100), TrustTier::Excellent);
        assert_eq!(TrustTier::for_score(90), TrustTier::Excellent);
        assert_eq!(TrustTier::for_score(89), TrustTier::VeryGood);
        assert_eq!(TrustTier::for_score(80), TrustTier::VeryGood);
        assert_eq!(TrustTier::for_score(70), TrustTier::Good);
        assert_eq!(TrustTier::for_score(69), TrustTier::Fair);
        assert_eq!(TrustTier::VeryGood.to_string(), "Very Good");
    }

    #[test]
    fn test_achievements_for_demo_user() {
        let summary = ProfileSummary::new(user(85, 12), 3);
        assert_eq!(summary.tier, TrustTier::VeryGood);
        assert_eq!(
            summary.achievements,
            vec![
                Achievement::FirstLend,
                Achievement::CommunityHelper,
                Achievement::OnTime,
                Achievement::TrustedMember
            ]
        );
    }

    #[test]
    fn test_new_user_has_score_badges_only() {
        let unlocked = Achievement::unlocked_by(&user(100, 0));
        assert_eq!(unlocked, vec![Achievement::OnTime, Achievement::TrustedMember]);

        assert!(Achievement::unlocked_by(&user(60, 0)).is_empty());
    }
}
