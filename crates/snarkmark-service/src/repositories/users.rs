use super::traits::UserRepository;
use crate::errors::ApiError;
use crate::models::{NewUser, User};
use crate::schema::users;
use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct SqliteUserRepository {
    db: Arc<Mutex<SqliteConnection>>,
}

impl SqliteUserRepository {
    pub fn new(db: Arc<Mutex<SqliteConnection>>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn find_or_create(&self, username: &str) -> Result<User, ApiError> {
        let mut conn = self.db.lock().unwrap();
        let conn = &mut *conn;

        if let Some(user) = users::table
            .filter(users::username.eq(username))
            .select(User::as_select())
            .first(conn)
            .optional()?
        {
            return Ok(user);
        }

        // First sight of this username. A concurrent first login may beat us
        // to the insert; the unique index turns the loser into a no-op and
        // the re-read below returns whichever row won.
        diesel::insert_or_ignore_into(users::table)
            .values(NewUser {
                username: username.to_string(),
            })
            .execute(conn)?;

        let user = users::table
            .filter(users::username.eq(username))
            .select(User::as_select())
            .first(conn)?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        let mut conn = self.db.lock().unwrap();
        let result = users::table
            .filter(users::username.eq(username))
            .select(User::as_select())
            .first(&mut *conn)
            .optional()?;
        Ok(result)
    }
}
