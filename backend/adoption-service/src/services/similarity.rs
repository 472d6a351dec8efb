/// Image similarity search
///
/// quota check → embed → dimension check → vector query → charge
///
/// The quota is charged only once the vector query succeeded, so a failed
/// search never costs the user anything.
use super::embedding::SharedModel;
use super::quota::{DailyQuota, QuotaStatus};
use crate::clients::{VectorIndex, VectorMatch};
use crate::db::ProfileRepository;
use crate::error::{AppError, Result};
use crate::metrics::AI_SEARCH_TOTAL;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

pub const DEFAULT_TOP_K: u32 = 10;
pub const MAX_TOP_K: u32 = 100;

/// `None` → 10, otherwise clamped into `1..=100`
pub fn clamp_top_k(top_k: Option<u32>) -> u32 {
    top_k.unwrap_or(DEFAULT_TOP_K).clamp(1, MAX_TOP_K)
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SearchResult {
    pub matches: Vec<VectorMatch>,
    /// Searches left in the current window after this one
    pub remaining: u32,
}

pub struct SimilaritySearch {
    model: Arc<SharedModel>,
    index: Arc<dyn VectorIndex>,
    profiles: Arc<dyn ProfileRepository>,
    quota: DailyQuota,
    dimension: usize,
}

impl SimilaritySearch {
    pub fn new(
        model: Arc<SharedModel>,
        index: Arc<dyn VectorIndex>,
        profiles: Arc<dyn ProfileRepository>,
        quota: DailyQuota,
        dimension: usize,
    ) -> Self {
        Self {
            model,
            index,
            profiles,
            quota,
            dimension,
        }
    }

    pub async fn quota_status(&self, user_id: Uuid) -> Result<QuotaStatus> {
        let profile = self.profiles.ensure(user_id).await?;
        Ok(self.quota.status(&profile, Utc::now()))
    }

    pub async fn search(
        &self,
        user_id: Uuid,
        image: Vec<u8>,
        top_k: Option<u32>,
    ) -> Result<SearchResult> {
        match self.run(user_id, image, top_k).await {
            Ok(result) => {
                AI_SEARCH_TOTAL.with_label_values(&["ok"]).inc();
                Ok(result)
            }
            Err(err) => {
                let outcome = match err {
                    AppError::QuotaExceeded { .. } => "quota_exceeded",
                    _ => "error",
                };
                AI_SEARCH_TOTAL.with_label_values(&[outcome]).inc();
                Err(err)
            }
        }
    }

    async fn run(&self, user_id: Uuid, image: Vec<u8>, top_k: Option<u32>) -> Result<SearchResult> {
        if image.is_empty() {
            return Err(AppError::BadRequest("image is empty".to_string()));
        }

        let now = Utc::now();
        let profile = self.profiles.ensure(user_id).await?;
        self.quota.check(&profile, now)?;

        let vector = self.model.embed(image).await?;
        if vector.len() != self.dimension {
            return Err(AppError::BadRequest(format!(
                "embedding has {} dimensions, index expects {}",
                vector.len(),
                self.dimension
            )));
        }

        let matches = self
            .index
            .query(&vector, clamp_top_k(top_k), None)
            .await?;

        let usage = self.quota.charge(&profile, now);
        self.profiles.record_ai_search(user_id, usage).await?;

        tracing::info!(
            user_id = %user_id,
            matches = matches.len(),
            used = usage.count,
            "similarity search completed"
        );

        Ok(SearchResult {
            matches,
            remaining: self.quota.limit().saturating_sub(usage.count.max(0) as u32),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_top_k() {
        assert_eq!(clamp_top_k(None), 10);
        assert_eq!(clamp_top_k(Some(0)), 1);
        assert_eq!(clamp_top_k(Some(500)), 100);
        assert_eq!(clamp_top_k(Some(42)), 42);
    }
}
