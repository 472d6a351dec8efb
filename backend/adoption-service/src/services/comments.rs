use crate::db::{CommentRepository, PostRepository, ProfileRepository};
use crate::error::{AppError, Result};
use crate::models::{Comment, CreateCommentRequest};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    posts: Arc<dyn PostRepository>,
    profiles: Arc<dyn ProfileRepository>,
}

impl CommentService {
    pub fn new(
        comments: Arc<dyn CommentRepository>,
        posts: Arc<dyn PostRepository>,
        profiles: Arc<dyn ProfileRepository>,
    ) -> Self {
        Self {
            comments,
            posts,
            profiles,
        }
    }

    async fn ensure_post(&self, post_id: Uuid) -> Result<()> {
        match self.posts.get(post_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound(format!("post {} not found", post_id))),
        }
    }

    pub async fn create_comment(
        &self,
        author_id: Uuid,
        post_id: Uuid,
        req: CreateCommentRequest,
    ) -> Result<Comment> {
        let req = CreateCommentRequest {
            content: req.content.trim().to_string(),
        };
        req.validate()?;
        self.ensure_post(post_id).await?;
        self.profiles.ensure(author_id).await?;

        self.comments.create(post_id, author_id, &req.content).await
    }

    pub async fn list_comments(&self, post_id: Uuid, limit: i64, offset: i64) -> Result<Vec<Comment>> {
        self.ensure_post(post_id).await?;
        self.comments.list_by_post(post_id, limit, offset).await
    }

    pub async fn delete_comment(&self, caller: Uuid, comment_id: Uuid) -> Result<()> {
        let comment = self
            .comments
            .get(comment_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("comment {} not found", comment_id)))?;

        if comment.author_id != caller {
            return Err(AppError::Forbidden(
                "only the author can delete this comment".to_string(),
            ));
        }

        self.comments.delete(comment_id).await?;
        Ok(())
    }
}
