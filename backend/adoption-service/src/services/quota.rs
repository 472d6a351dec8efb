/// Daily allowance for image similarity searches
///
/// The profile stores the number of searches charged and the time of the
/// last one. Once more than `window` has passed since that search, the count
/// is treated as zero. Checking and charging are separate steps around the
/// search itself, so concurrent requests from one user can overshoot the limit.
use crate::error::{AppError, Result};
use crate::models::{AiUsage, UserProfile};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct QuotaStatus {
    pub limit: u32,
    pub used: u32,
    pub remaining: u32,
    /// When the used count drops back to zero, if anything is used
    pub resets_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy)]
pub struct DailyQuota {
    limit: u32,
    window: Duration,
}

impl DailyQuota {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self { limit, window }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    fn window_elapsed(&self, last: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        match last {
            Some(last) => now - last > self.window,
            None => true,
        }
    }

    /// Searches charged within the current window
    pub fn used(&self, profile: &UserProfile, now: DateTime<Utc>) -> u32 {
        if self.window_elapsed(profile.last_ai_search_at, now) {
            0
        } else {
            profile.ai_search_count.max(0) as u32
        }
    }

    pub fn status(&self, profile: &UserProfile, now: DateTime<Utc>) -> QuotaStatus {
        let used = self.used(profile, now);
        QuotaStatus {
            limit: self.limit,
            used,
            remaining: self.limit.saturating_sub(used),
            resets_at: match (used, profile.last_ai_search_at) {
                (0, _) | (_, None) => None,
                (_, Some(last)) => Some(last + self.window),
            },
        }
    }

    /// Fail with `QuotaExceeded` when nothing is left
    pub fn check(&self, profile: &UserProfile, now: DateTime<Utc>) -> Result<QuotaStatus> {
        let status = self.status(profile, now);
        if status.remaining == 0 {
            return Err(AppError::QuotaExceeded {
                limit: self.limit,
                resets_at: status.resets_at.unwrap_or(now + self.window),
            });
        }
        Ok(status)
    }

    /// Usage pair to store after a successful search
    pub fn charge(&self, profile: &UserProfile, now: DateTime<Utc>) -> AiUsage {
        let count = if self.window_elapsed(profile.last_ai_search_at, now) {
            1
        } else {
            profile.ai_search_count.max(0) + 1
        };
        AiUsage { count, last_at: now }
    }
}
