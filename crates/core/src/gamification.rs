//! Gamification: points and badges per user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::coerce;
use crate::error::{Error, Result};
use crate::limits::{MAX_BADGE_LEN, MAX_USER_ID_LEN};
use crate::settings::GamificationPoints;

/// Largest single award.
pub const MAX_POINTS_PER_AWARD: i64 = 100_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GamificationUser {
    pub user_id: String,
    pub points: i64,
    /// Sorted, no duplicates.
    pub badges: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

/// `POST /api/actions?type=gamification` body.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum GamificationAction {
    AwardPoints(AwardPointsInput),
    AwardBadge(AwardBadgeInput),
}

/// Trimmed user id; blank ids are rejected.
pub fn normalize_user_id(raw: &str) -> Result<String> {
    let user_id = raw.trim();
    if user_id.is_empty() {
        return Err(Error::validation("userId is required"));
    }
    if user_id.chars().count() > MAX_USER_ID_LEN {
        return Err(Error::validation(format!(
            "userId exceeds {} characters",
            MAX_USER_ID_LEN
        )));
    }
    Ok(user_id.to_string())
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AwardPointsInput {
    #[serde(alias = "userId")]
    pub user_id: String,
    #[serde(default, deserialize_with = "coerce::opt_i64")]
    pub points: Option<i64>,
    #[serde(default)]
    #[validate(length(max = 64))]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AwardBadgeInput {
    #[serde(alias = "userId")]
    pub user_id: String,
    #[serde(alias = "badgeId", alias = "badge_id")]
    pub badge: String,
}

impl AwardPointsInput {
    /// Normalized user id and the points to add: the explicit amount, or the
    /// amount configured for `reason`.
    pub fn resolve(&self, config: &GamificationPoints) -> Result<(String, i64)> {
        self.validate()?;
        let user_id = normalize_user_id(&self.user_id)?;
        let points = match (self.points, self.reason.as_deref()) {
            (Some(points), _) => points,
            (None, Some(reason)) => config.points_for(reason).ok_or_else(|| {
                Error::validation(format!("no points configured for reason: {}", reason))
            })?,
            (None, None) => return Err(Error::validation("points or reason is required")),
        };

        if points <= 0 || points > MAX_POINTS_PER_AWARD {
            return Err(Error::validation(format!(
                "points must be between 1 and {}",
                MAX_POINTS_PER_AWARD
            )));
        }
        Ok((user_id, points))
    }
}

impl AwardBadgeInput {
    /// Validated `(user_id, badge)`; badge ids are lowercased.
    pub fn normalized(&self) -> Result<(String, String)> {
        let user_id = normalize_user_id(&self.user_id)?;
        let badge = self.badge.trim().to_ascii_lowercase();
        let valid = !badge.is_empty()
            && badge.len() <= MAX_BADGE_LEN
            && badge
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(Error::validation(format!("invalid badge id: {}", self.badge)));
        }
        Ok((user_id, badge))
    }
}

/// Result of a badge award.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BadgeAward {
    pub user: GamificationUser,
    /// False when the user already held the badge.
    pub newly_awarded: bool,
}
