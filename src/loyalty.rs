//! loyalty.rs: per-user points balance and redeemed rewards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Points spent on every redemption.
pub const REDEEM_COST: u32 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoyaltyAccount {
    pub user: String,
    pub points: u32,
    pub rewards: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum LoyaltyError {
    #[error("points must be positive")]
    NoPoints,

    #[error("reward is required")]
    NoReward,

    #[error("Not enough points")]
    NotEnoughPoints { have: u32 },
}

impl LoyaltyAccount {
    /// Zero balance, nothing redeemed.
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            points: 0,
            rewards: Vec::new(),
            updated_at: None,
        }
    }

    pub fn add_points(&mut self, points: u32, now: DateTime<Utc>) -> Result<(), LoyaltyError> {
        if points == 0 {
            return Err(LoyaltyError::NoPoints);
        }
        self.points = self.points.saturating_add(points);
        self.updated_at = Some(now);
        Ok(())
    }

    pub fn redeem(&mut self, reward: &str, now: DateTime<Utc>) -> Result<(), LoyaltyError> {
        let reward = reward.trim();
        if reward.is_empty() {
            return Err(LoyaltyError::NoReward);
        }
        if self.points < REDEEM_COST {
            return Err(LoyaltyError::NotEnoughPoints { have: self.points });
        }
        self.points -= REDEEM_COST;
        self.rewards.push(reward.to_string());
        self.updated_at = Some(now);
        Ok(())
    }
}
