use super::traits::{
    ArticlePage, ArticleRepository, MarkRepository, UserMarks, UserRepository,
};
use crate::errors::ApiError;
use crate::models::{
    Article, ArticleWithRating, Mark, MarkWithArticle, MarkWithUser, NewMark, RecentMark, User,
    UserStats,
};
use crate::validation::PageParams;
use async_trait::async_trait;
use chrono::Utc;
use std::cmp::Reverse;
use std::sync::{Arc, Mutex};

/// Fixture-backed implementation of all three stores, standing in for the
/// relational backend during demos and local development. Selected with
/// `SNARKMARK_BACKEND=memory`; never live alongside the SQLite backend.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

struct Inner {
    articles: Vec<Article>,
    marks: Vec<Mark>,
    users: Vec<User>,
    next_mark_id: i32,
    next_user_id: i32,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            inner: Arc::new(Mutex::new(Inner {
                articles: Vec::new(),
                marks: Vec::new(),
                users: Vec::new(),
                next_mark_id: 1,
                next_user_id: 1,
            })),
        }
    }

    /// A small catalog of well-known papers to browse against.
    pub fn with_fixture_catalog() -> Self {
        let store = Self::new();
        store.inner.lock().unwrap().articles = fixture_articles();
        store
    }

    pub fn insert_article(&self, article: Article) {
        self.inner.lock().unwrap().articles.push(article);
    }

    fn avg_rating_for(inner: &Inner, item_id: &str) -> Option<f64> {
        let ratings: Vec<f64> = inner
            .marks
            .iter()
            .filter(|m| m.item_id == item_id)
            .filter_map(|m| m.rating)
            .collect();
        if ratings.is_empty() {
            None
        } else {
            Some(ratings.iter().sum::<f64>() / ratings.len() as f64)
        }
    }

    fn username_for(inner: &Inner, user_id: i32) -> String {
        inner
            .users
            .iter()
            .find(|u| u.id == user_id)
            .map(|u| u.username.clone())
            .unwrap_or_default()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArticleRepository for MemoryStore {
    async fn list(
        &self,
        params: &PageParams,
        search: Option<&str>,
    ) -> Result<ArticlePage, ApiError> {
        let inner = self.inner.lock().unwrap();

        let needle = search.map(str::to_lowercase);
        let mut matches: Vec<&Article> = inner
            .articles
            .iter()
            .filter(|a| match &needle {
                Some(needle) => {
                    a.title.to_lowercase().contains(needle)
                        || a.creators_string.to_lowercase().contains(needle)
                }
                None => true,
            })
            .collect();
        matches.sort_by(|a, b| {
            b.published_date
                .cmp(&a.published_date)
                .then(a.item_id.cmp(&b.item_id))
        });

        let total = matches.len() as i64;
        let items = matches
            .into_iter()
            .skip(params.offset() as usize)
            .take(params.limit as usize)
            .map(|article| ArticleWithRating {
                avg_rating: Self::avg_rating_for(&inner, &article.item_id),
                article: article.clone(),
            })
            .collect();

        Ok(ArticlePage { items, total })
    }

    async fn get(&self, item_id: &str) -> Result<Option<Article>, ApiError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.articles.iter().find(|a| a.item_id == item_id).cloned())
    }
}

#[async_trait]
impl MarkRepository for MemoryStore {
    async fn create(&self, mark: &NewMark) -> Result<Mark, ApiError> {
        let mut inner = self.inner.lock().unwrap();

        // Same outcome as a foreign-key violation in the relational backend.
        if !inner.articles.iter().any(|a| a.item_id == mark.item_id)
            || !inner.users.iter().any(|u| u.id == mark.user_id)
        {
            return Err(ApiError::Internal);
        }

        let created = Mark {
            id: inner.next_mark_id,
            item_id: mark.item_id.clone(),
            user_id: mark.user_id,
            note: mark.note.clone(),
            rating: mark.rating,
            liked: mark.liked,
            created_at: Utc::now().naive_utc(),
        };
        inner.next_mark_id += 1;
        inner.marks.push(created.clone());
        Ok(created)
    }

    async fn list_by_article(&self, item_id: &str) -> Result<Vec<MarkWithUser>, ApiError> {
        let inner = self.inner.lock().unwrap();
        let mut marks: Vec<&Mark> = inner
            .marks
            .iter()
            .filter(|m| m.item_id == item_id)
            .collect();
        marks.sort_by_key(|m| Reverse((m.created_at, m.id)));

        Ok(marks
            .into_iter()
            .map(|mark| MarkWithUser {
                username: Self::username_for(&inner, mark.user_id),
                mark: mark.clone(),
            })
            .collect())
    }

    async fn list_by_user(&self, user_id: i32, limit: u32) -> Result<UserMarks, ApiError> {
        let inner = self.inner.lock().unwrap();
        let mut marks: Vec<&Mark> = inner
            .marks
            .iter()
            .filter(|m| m.user_id == user_id)
            .collect();
        marks.sort_by_key(|m| Reverse((m.created_at, m.id)));

        let total_read = marks.len() as i64;
        let total_liked = marks.iter().filter(|m| m.liked).count() as i64;
        let ratings: Vec<f64> = marks.iter().filter_map(|m| m.rating).collect();
        let avg_rating = if ratings.is_empty() {
            None
        } else {
            Some(ratings.iter().sum::<f64>() / ratings.len() as f64)
        };

        let items = marks
            .into_iter()
            .take(limit as usize)
            .map(|mark| {
                let article = inner.articles.iter().find(|a| a.item_id == mark.item_id);
                MarkWithArticle {
                    username: Self::username_for(&inner, mark.user_id),
                    article_title: article.map(|a| a.title.clone()).unwrap_or_default(),
                    article_creators: article
                        .map(|a| a.creators_string.clone())
                        .unwrap_or_default(),
                    mark: mark.clone(),
                }
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
        let inner = self.inner.lock().unwrap();
        let mut marks: Vec<&Mark> = inner.marks.iter().collect();
        marks.sort_by_key(|m| Reverse((m.created_at, m.id)));

        Ok(marks
            .into_iter()
            .take(limit as usize)
            .map(|mark| {
                let article = inner.articles.iter().find(|a| a.item_id == mark.item_id);
                RecentMark {
                    username: Self::username_for(&inner, mark.user_id),
                    article_title: article.map(|a| a.title.clone()).unwrap_or_default(),
                    article_creators: article
                        .map(|a| a.creators_string.clone())
                        .unwrap_or_default(),
                    article_published_date: article
                        .map(|a| a.published_date.clone())
                        .unwrap_or_default(),
                    article_content_type: article
                        .map(|a| a.content_type.clone())
                        .unwrap_or_default(),
                    mark: mark.clone(),
                }
            })
            .collect())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_or_create(&self, username: &str) -> Result<User, ApiError> {
        let mut inner = self.inner.lock().unwrap();

        if let Some(user) = inner.users.iter().find(|u| u.username == username) {
            return Ok(user.clone());
        }

        let user = User {
            id: inner.next_user_id,
            username: username.to_string(),
            email: None,
            created_at: Utc::now().naive_utc(),
        };
        inner.next_user_id += 1;
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().find(|u| u.username == username).cloned())
    }
}

fn fixture_articles() -> Vec<Article> {
    let papers = [
        (
            "1706.03762",
            "Attention Is All You Need",
            "2017-06-12",
            "Vaswani A., Shazeer N., Parmar N., Uszkoreit J.",
            "https://arxiv.org/abs/1706.03762",
        ),
        (
            "1810.04805",
            "BERT: Pre-training of Deep Bidirectional Transformers",
            "2019-05-24",
            "Devlin J., Chang M.W., Lee K., Toutanova K.",
            "https://arxiv.org/abs/1810.04805",
        ),
        (
            "2303.08774",
            "GPT-4 Technical Report",
            "2023-03-15",
            "OpenAI",
            "https://arxiv.org/abs/2303.08774",
        ),
        (
            "1512.03385",
            "Deep Residual Learning for Image Recognition",
            "2016-06-27",
            "He K., Zhang X., Ren S., Sun J.",
            "https://arxiv.org/abs/1512.03385",
        ),
        (
            "nips-4824",
            "ImageNet Classification with Deep Convolutional Neural Networks",
            "2012-12-03",
            "Krizhevsky A., Sutskever I., Hinton G.E.",
            "https://papers.nips.cc/paper/4824",
        ),
        (
            "1406.2661",
            "Generative Adversarial Networks",
            "2014-06-10",
            "Goodfellow I., Pouget-Abadie J., Mirza M.",
            "https://arxiv.org/abs/1406.2661",
        ),
    ];

    papers
        .into_iter()
        .map(
            |(item_id, title, published_date, creators_string, url)| Article {
                item_id: item_id.to_string(),
                title: title.to_string(),
                published_date: published_date.to_string(),
                creators_string: creators_string.to_string(),
                url: url.to_string(),
                content_type: "article".to_string(),
            },
        )
        .collect()
}
