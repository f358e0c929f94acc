use super::traits::{ArticlePage, ArticleRepository};
use crate::errors::ApiError;
use crate::models::{Article, ArticleWithRating};
use crate::schema::{articles, marks};
use crate::validation::PageParams;
use async_trait::async_trait;
use diesel::dsl::{avg, count_star};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

diesel::define_sql_function! {
    /// SQL `lower`, for case-insensitive substring search.
    fn lower(text: diesel::sql_types::Text) -> diesel::sql_types::Text;
}

#[derive(Clone)]
pub struct SqliteArticleRepository {
    db: Arc<Mutex<SqliteConnection>>,
}

impl SqliteArticleRepository {
    pub fn new(db: Arc<Mutex<SqliteConnection>>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ArticleRepository for SqliteArticleRepository {
    async fn list(
        &self,
        params: &PageParams,
        search: Option<&str>,
    ) -> Result<ArticlePage, ApiError> {
        let mut conn = self.db.lock().unwrap();
        let conn = &mut *conn;

        let mut count_query = articles::table.select(count_star()).into_boxed();
        let mut page_query = articles::table.select(Article::as_select()).into_boxed();

        if let Some(needle) = search {
            let pattern = format!("%{}%", needle.to_lowercase());
            count_query = count_query.filter(
                lower(articles::title)
                    .like(pattern.clone())
                    .or(lower(articles::creators_string).like(pattern.clone())),
            );
            page_query = page_query.filter(
                lower(articles::title)
                    .like(pattern.clone())
                    .or(lower(articles::creators_string).like(pattern)),
            );
        }

        let total: i64 = count_query.get_result(conn)?;

        let rows: Vec<Article> = page_query
            .order((articles::published_date.desc(), articles::item_id.asc()))
            .limit(params.limit as i64)
            .offset(params.offset())
            .load(conn)?;

        // Mean ratings for just the returned page, merged in afterwards.
        let ids: Vec<String> = rows.iter().map(|a| a.item_id.clone()).collect();
        let ratings: HashMap<String, Option<f64>> = marks::table
            .filter(marks::item_id.eq_any(ids))
            .group_by(marks::item_id)
            .select((marks::item_id, avg(marks::rating)))
            .load::<(String, Option<f64>)>(conn)?
            .into_iter()
            .collect();

        let items = rows
            .into_iter()
            .map(|article| {
                let avg_rating = ratings.get(&article.item_id).copied().flatten();
                ArticleWithRating {
                    article,
                    avg_rating,
                }
            })
            .collect();

        Ok(ArticlePage { items, total })
    }

    async fn get(&self, item_id: &str) -> Result<Option<Article>, ApiError> {
        let mut conn = self.db.lock().unwrap();
        let result = articles::table
            .find(item_id)
            .select(Article::as_select())
            .first(&mut *conn)
            .optional()?;
        Ok(result)
    }
}
