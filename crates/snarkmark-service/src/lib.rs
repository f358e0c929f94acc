use axum::Router;
use diesel::sqlite::SqliteConnection;
use std::sync::{Arc, Mutex};

pub mod errors;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod schema;
pub mod validation;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

use repositories::{
    ArticleRepository, MarkRepository, MemoryStore, SqliteArticleRepository, SqliteMarkRepository,
    SqliteUserRepository, UserRepository,
};

pub trait AppState: Clone + Send + Sync + 'static {
    type Articles: ArticleRepository;
    type Marks: MarkRepository;
    type Users: UserRepository;

    fn article_repo(&self) -> Self::Articles;
    fn mark_repo(&self) -> Self::Marks;
    fn user_repo(&self) -> Self::Users;
}

/// SQLite-backed state used in production.
#[derive(Clone)]
pub struct DefaultAppState {
    articles: SqliteArticleRepository,
    marks: SqliteMarkRepository,
    users: SqliteUserRepository,
}

impl DefaultAppState {
    pub fn new(db: Arc<Mutex<SqliteConnection>>) -> Self {
        Self {
            articles: SqliteArticleRepository::new(db.clone()),
            marks: SqliteMarkRepository::new(db.clone()),
            users: SqliteUserRepository::new(db),
        }
    }
}

impl AppState for DefaultAppState {
    type Articles = SqliteArticleRepository;
    type Marks = SqliteMarkRepository;
    type Users = SqliteUserRepository;

    fn article_repo(&self) -> Self::Articles {
        self.articles.clone()
    }

    fn mark_repo(&self) -> Self::Marks {
        self.marks.clone()
    }

    fn user_repo(&self) -> Self::Users {
        self.users.clone()
    }
}

/// Fixture-backed state for demos and local development; selected with
/// `SNARKMARK_BACKEND=memory` and never combined with the SQLite backend.
#[derive(Clone, Default)]
pub struct MemoryAppState {
    store: MemoryStore,
}

impl MemoryAppState {
    pub fn new() -> Self {
        Self {
            store: MemoryStore::new(),
        }
    }

    pub fn with_fixture_catalog() -> Self {
        Self {
            store: MemoryStore::with_fixture_catalog(),
        }
    }
}

impl AppState for MemoryAppState {
    type Articles = MemoryStore;
    type Marks = MemoryStore;
    type Users = MemoryStore;

    fn article_repo(&self) -> Self::Articles {
        self.store.clone()
    }

    fn mark_repo(&self) -> Self::Marks {
        self.store.clone()
    }

    fn user_repo(&self) -> Self::Users {
        self.store.clone()
    }
}

pub fn create_app<S: AppState>(state: S) -> Router {
    routes::create_router().with_state(state)
}
