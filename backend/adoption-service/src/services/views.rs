/// View counting for notices and card-news
///
/// A view counts once per visitor, identified by a truncated hash of the
/// client IP, and only after the reader stayed on the page for the minimum
/// dwell time. The existence check and the insert are separate round trips,
/// so two simultaneous first views from one address can both be counted.
use crate::db::{ArticleRepository, ViewRepository};
use crate::error::{AppError, Result};
use crate::metrics::VIEW_RECORD_TOTAL;
use crate::models::ArticleStatus;
use crypto_core::hash::visitor_id;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ViewOutcome {
    /// Left before the minimum dwell time; nothing written
    TooShort,
    /// Visitor already counted for this article
    Duplicate { view_count: i64 },
    Counted { view_count: i64 },
}

impl ViewOutcome {
    fn label(&self) -> &'static str {
        match self {
            ViewOutcome::TooShort => "too_short",
            ViewOutcome::Duplicate { .. } => "duplicate",
            ViewOutcome::Counted { .. } => "counted",
        }
    }
}

pub struct ViewRecorder {
    articles: Arc<dyn ArticleRepository>,
    views: Arc<dyn ViewRepository>,
    min_dwell: Duration,
}

impl ViewRecorder {
    pub fn new(
        articles: Arc<dyn ArticleRepository>,
        views: Arc<dyn ViewRepository>,
        min_dwell: Duration,
    ) -> Self {
        Self {
            articles,
            views,
            min_dwell,
        }
    }

    pub async fn record(
        &self,
        article_id: Uuid,
        client_ip: &str,
        dwell: Duration,
    ) -> Result<ViewOutcome> {
        let outcome = self.record_inner(article_id, client_ip, dwell).await?;
        VIEW_RECORD_TOTAL.with_label_values(&[outcome.label()]).inc();
        Ok(outcome)
    }

    async fn record_inner(
        &self,
        article_id: Uuid,
        client_ip: &str,
        dwell: Duration,
    ) -> Result<ViewOutcome> {
        if dwell < self.min_dwell {
            return Ok(ViewOutcome::TooShort);
        }

        let article = self
            .articles
            .get(article_id)
            .await?
            .filter(|article| article.status != ArticleStatus::Draft)
            .ok_or_else(|| AppError::NotFound(format!("article {} not found", article_id)))?;

        let visitor = visitor_id(client_ip);
        if self.views.exists(article_id, &visitor).await? {
            return Ok(ViewOutcome::Duplicate {
                view_count: article.view_count,
            });
        }

        self.views.insert(article_id, &visitor).await?;
        let view_count = self.articles.increment_view_count(article_id).await?;

        tracing::debug!(article_id = %article_id, view_count, "view counted");
        Ok(ViewOutcome::Counted { view_count })
    }
}
