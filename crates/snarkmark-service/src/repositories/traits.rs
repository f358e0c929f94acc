use crate::errors::ApiError;
use crate::models::{
    Article, ArticleWithRating, Mark, MarkWithArticle, MarkWithUser, NewMark, RecentMark, User,
    UserStats,
};
use crate::validation::PageParams;
use async_trait::async_trait;

/// One page of the catalog plus the pre-pagination match count.
#[derive(Debug, Clone)]
pub struct ArticlePage {
    pub items: Vec<ArticleWithRating>,
    pub total: i64,
}

#[derive(Debug, Clone)]
pub struct UserMarks {
    pub items: Vec<MarkWithArticle>,
    pub stats: UserStats,
}

#[async_trait]
pub trait ArticleRepository: Clone + Send + Sync + 'static {
    /// Paginated catalog listing, optionally filtered by a case-insensitive
    /// substring match on title or creators, newest publication first.
    async fn list(
        &self,
        params: &PageParams,
        search: Option<&str>,
    ) -> Result<ArticlePage, ApiError>;

    async fn get(&self, item_id: &str) -> Result<Option<Article>, ApiError>;
}

#[async_trait]
pub trait MarkRepository: Clone + Send + Sync + 'static {
    async fn create(&self, mark: &NewMark) -> Result<Mark, ApiError>;

    /// All marks on an article, newest first.
    async fn list_by_article(&self, item_id: &str) -> Result<Vec<MarkWithUser>, ApiError>;

    /// A user's most recent marks plus statistics over all of them.
    async fn list_by_user(&self, user_id: i32, limit: u32) -> Result<UserMarks, ApiError>;

    /// The most recent marks across all users and articles.
    async fn list_recent(&self, limit: u32) -> Result<Vec<RecentMark>, ApiError>;
}

#[async_trait]
pub trait UserRepository: Clone + Send + Sync + 'static {
    /// Lookup by username, creating the row on first sight. Idempotent after
    /// the first call; concurrent first calls converge on the unique index.
    async fn find_or_create(&self, username: &str) -> Result<User, ApiError>;

    /// Lookup without the create fallback.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError>;
}
