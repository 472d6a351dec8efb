/// Post service - community board posts
use crate::db::{PostRepository, ProfileRepository};
use crate::error::{AppError, Result};
use crate::models::{CreatePostRequest, NewPost, Post, PostChanges, PostQuery, UpdatePostRequest};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

pub struct PostService {
    posts: Arc<dyn PostRepository>,
    profiles: Arc<dyn ProfileRepository>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>, profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { posts, profiles }
    }

    pub async fn create_post(&self, author_id: Uuid, req: CreatePostRequest) -> Result<Post> {
        let req = CreatePostRequest {
            title: req.title.trim().to_string(),
            content: req.content,
            tags: normalize_tags(req.tags),
        };
        req.validate()?;
        reject_blank(&req.content)?;

        self.profiles.ensure(author_id).await?;
        let post = self
            .posts
            .create(NewPost {
                author_id,
                title: req.title,
                content: req.content,
                tags: req.tags,
            })
            .await?;

        tracing::info!(post_id = %post.id, user_id = %author_id, "post created");
        Ok(post)
    }

    pub async fn get_post(&self, post_id: Uuid) -> Result<Post> {
        self.posts
            .get(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {} not found", post_id)))
    }

    pub async fn list_posts(&self, query: PostQuery) -> Result<Vec<Post>> {
        self.posts.list(&query).await
    }

    /// Only the author may edit a post
    pub async fn update_post(
        &self,
        caller: Uuid,
        post_id: Uuid,
        req: UpdatePostRequest,
    ) -> Result<Post> {
        let post = self.get_post(post_id).await?;
        if post.author_id != caller {
            return Err(AppError::Forbidden(
                "only the author can edit this post".to_string(),
            ));
        }

        let req = UpdatePostRequest {
            title: req.title.map(|t| t.trim().to_string()),
            content: req.content,
            tags: req.tags.map(normalize_tags),
        };
        req.validate()?;
        if let Some(content) = &req.content {
            reject_blank(content)?;
        }

        self.posts
            .update(
                post_id,
                PostChanges {
                    title: req.title,
                    content: req.content,
                    tags: req.tags,
                },
            )
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {} not found", post_id)))
    }

    pub async fn delete_post(&self, caller: Uuid, post_id: Uuid) -> Result<()> {
        let post = self.get_post(post_id).await?;
        if post.author_id != caller {
            return Err(AppError::Forbidden(
                "only the author can delete this post".to_string(),
            ));
        }

        self.posts.delete(post_id).await?;
        tracing::info!(post_id = %post_id, user_id = %caller, "post deleted");
        Ok(())
    }
}

/// Trim, drop empties and duplicates, keep first-seen order
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_string();
        if !tag.is_empty() && !seen.contains(&tag) {
            seen.push(tag);
        }
    }
    seen
}

fn reject_blank(content: &str) -> Result<()> {
    if content.trim().is_empty() {
        return Err(AppError::Validation("content must not be empty".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(title: &str, tags: usize) -> CreatePostRequest {
        CreatePostRequest {
            title: title.to_string(),
            content: "<p>Looking for a home</p>".to_string(),
            tags: (0..tags).map(|i| format!("tag{i}")).collect(),
        }
    }

    #[test]
    fn test_title_length_counts_characters() {
        assert!(request(&"가".repeat(100), 0).validate().is_ok());
        assert!(request(&"가".repeat(101), 0).validate().is_err());
        assert!(request("", 0).validate().is_err());
    }

    #[test]
    fn test_tag_limit() {
        assert!(request("title", 10).validate().is_ok());
        assert!(request("title", 11).validate().is_err());
    }

    #[test]
    fn test_normalize_tags() {
        let tags = vec![
            " 강아지 ".to_string(),
            "".to_string(),
            "강아지".to_string(),
            "입양".to_string(),
        ];
        assert_eq!(normalize_tags(tags), vec!["강아지", "입양"]);
    }
}
