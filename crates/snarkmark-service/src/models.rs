use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::Serialize;

/// A catalog record. Articles are bulk-loaded from the upstream export;
/// the service only ever reads them.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Insertable, Serialize)]
#[diesel(table_name = crate::schema::articles)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Article {
    pub item_id: String,
    pub title: String,
    pub published_date: String,
    pub creators_string: String,
    pub url: String,
    pub content_type: String,
}

/// Article annotated with the mean of its non-null mark ratings, computed
/// fresh per query. Null when no rated marks exist.
#[derive(Debug, Clone, Serialize)]
pub struct ArticleWithRating {
    #[serde(flatten)]
    pub article: Article,
    pub avg_rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize)]
#[diesel(table_name = crate::schema::marks)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Mark {
    pub id: i32,
    pub item_id: String,
    pub user_id: i32,
    pub note: Option<String>,
    pub rating: Option<f64>,
    pub liked: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::marks)]
pub struct NewMark {
    pub item_id: String,
    pub user_id: i32,
    pub note: Option<String>,
    pub rating: Option<f64>,
    pub liked: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarkWithUser {
    #[serde(flatten)]
    pub mark: Mark,
    pub username: String,
}

/// Mark annotated for a user's activity feed.
#[derive(Debug, Clone, Serialize)]
pub struct MarkWithArticle {
    #[serde(flatten)]
    pub mark: Mark,
    pub username: String,
    pub article_title: String,
    pub article_creators: String,
}

/// Mark annotated for the global recent-activity feed.
#[derive(Debug, Clone, Serialize)]
pub struct RecentMark {
    #[serde(flatten)]
    pub mark: Mark,
    pub username: String,
    pub article_title: String,
    pub article_creators: String,
    pub article_published_date: String,
    pub article_content_type: String,
}

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser {
    pub username: String,
}

/// Aggregate statistics over all of a user's marks, not just the
/// returned page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_read: i64,
    pub total_liked: i64,
    pub avg_rating: Option<f64>,
}

/// Pagination envelope matching the original wire format (camelCase keys).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total: i64) -> Self {
        let total_pages = (total as u64).div_ceil(limit as u64) as i64;
        Pagination {
            page,
            limit,
            total,
            total_pages,
            has_next: (page as i64) < total_pages,
            has_prev: page > 1,
        }
    }
}
