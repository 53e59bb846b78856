use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Custom wrapper for GitHub's `/rate_limit` response; only the core REST quota is of interest.
pub struct RateLimit {
    pub resources: RateLimitResources,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLimitResources {
    pub core: Quota,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quota {
    pub limit: u64,
    pub remaining: u64,
    /// Unix epoch (seconds) at which the quota gets replenished.
    pub reset: i64,
}

impl Quota {
    pub fn reset_time(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.reset, 0).single()
    }
}
