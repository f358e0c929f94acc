use super::traits::{MarkRepository, UserMarks};
use crate::errors::ApiError;
use crate::models::{Mark, MarkWithArticle, MarkWithUser, NewMark, RecentMark, UserStats};
use crate::schema::{articles, marks, users};
use async_trait::async_trait;
use diesel::dsl::avg;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct SqliteMarkRepository {
    db: Arc<Mutex<SqliteConnection>>,
}

impl SqliteMarkRepository {
    pub fn new(db: Arc<Mutex<SqliteConnection>>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MarkRepository for SqliteMarkRepository {
    async fn create(&self, mark: &NewMark) -> Result<Mark, ApiError> {
        let mut conn = self.db.lock().unwrap();
        let result = diesel::insert_into(marks::table)
            .values(mark)
            .returning(Mark::as_returning())
            .get_result(&mut *conn)?;
        Ok(result)
    }

    async fn list_by_article(&self, item_id: &str) -> Result<Vec<MarkWithUser>, ApiError> {
        let mut conn = self.db.lock().unwrap();
        let rows: Vec<(Mark, String)> = marks::table
            .inner_join(users::table)
            .filter(marks::item_id.eq(item_id))
            .order((marks::created_at.desc(), marks::id.desc()))
            .select((Mark::as_select(), users::username))
            .load(&mut *conn)?;

        Ok(rows
            .into_iter()
            .map(|(mark, username)| MarkWithUser { mark, username })
            .collect())
    }

    async fn list_by_user(&self, user_id: i32, limit: u32) -> Result<UserMarks, ApiError> {
        let mut conn = self.db.lock().unwrap();
        let conn = &mut *conn;

        let rows: Vec<(Mark, String, String, String)> = marks::table
            .inner_join(users::table)
            .inner_join(articles::table)
            .filter(marks::user_id.eq(user_id))
            .order((marks::created_at.desc(), marks::id.desc()))
            .limit(limit as i64)
            .select((
                Mark::as_select(),
                users::username,
                articles::title,
                articles::creators_string,
            ))
            .load(conn)?;

        // Statistics cover every mark the user has, not just the page above.
        let total_read: i64 = marks::table
            .filter(marks::user_id.eq(user_id))
            .count()
            .get_result(conn)?;
        let total_liked: i64 = marks::table
            .filter(marks::user_id.eq(user_id))
            .filter(marks::liked.eq(true))
            .count()
            .get_result(conn)?;
        let avg_rating: Option<f64> = marks::table
            .filter(marks::user_id.eq(user_id))
            .select(avg(marks::rating))
            .get_result(conn)?;

        let items = rows
            .into_iter()
            .map(|(mark, username, article_title, article_creators)| MarkWithArticle {
                mark,
                username,
                article_title,
                article_creators,
            })
            .collect();

        Ok(UserMarks {
            items,
            stats: UserStats {
                total_read,
                total_liked,
                avg_rating,
            },
        })
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<RecentMark>, ApiError> {
        let mut conn = self.db.lock().unwrap();
        let rows: Vec<(Mark, String, String, String, String, String)> = marks::table
            .inner_join(users::table)
            .inner_join(articles::table)
            .order((marks::created_at.desc(), marks::id.desc()))
            .limit(limit as i64)
            .select((
                Mark::as_select(),
                users::username,
                articles::title,
                articles::creators_string,
                articles::published_date,
                articles::content_type,
            ))
            .load(&mut *conn)?;

        Ok(rows
            .into_iter()
            .map(
                |(
                    mark,
                    username,
                    article_title,
                    article_creators,
                    article_published_date,
                    article_content_type,
                )| RecentMark {
                    mark,
                    username,
                    article_title,
                    article_creators,
                    article_published_date,
                    article_content_type,
                },
            )
            .collect())
    }
}
