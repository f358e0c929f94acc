use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

pub fn establish_test_connection() -> SqliteConnection {
    let mut connection =
        SqliteConnection::establish(":memory:").expect("Failed to create in-memory database");

    diesel::sql_query("PRAGMA foreign_keys = ON")
        .execute(&mut connection)
        .expect("Failed to enable foreign keys");

    connection
        .run_pending_migrations(MIGRATIONS)
        .expect("Failed to run migrations");

    connection
}

pub mod server_utils {
    use super::*;
    use axum_test::TestServer;
    use snarkmark_service::{DefaultAppState, routes};
    use std::sync::{Arc, Mutex};

    pub fn create_test_server() -> (TestServer, Arc<Mutex<SqliteConnection>>) {
        let connection = establish_test_connection();
        let db = Arc::new(Mutex::new(connection));

        let state = DefaultAppState::new(db.clone());
        let app = routes::create_router().with_state(state);

        let server = TestServer::new(app).unwrap();
        (server, db)
    }
}

#[allow(dead_code)]
pub mod test_utils {
    use super::*;
    use chrono::NaiveDateTime;
    use snarkmark_service::models::{Article, NewMark, NewUser};
    use snarkmark_service::schema::{articles, marks, users};

    pub fn insert_article(
        conn: &mut SqliteConnection,
        item_id: &str,
        title: &str,
        published_date: &str,
        creators_string: &str,
    ) {
        diesel::insert_into(articles::table)
            .values(Article {
                item_id: item_id.to_string(),
                title: title.to_string(),
                published_date: published_date.to_string(),
                creators_string: creators_string.to_string(),
                url: format!("https://example.org/{item_id}"),
                content_type: "article".to_string(),
            })
            .execute(conn)
            .expect("Failed to insert article");
    }

    pub fn insert_user(conn: &mut SqliteConnection, username: &str) -> i32 {
        diesel::insert_into(users::table)
            .values(NewUser {
                username: username.to_string(),
            })
            .returning(users::id)
            .get_result(conn)
            .expect("Failed to insert user")
    }

    pub fn insert_mark(
        conn: &mut SqliteConnection,
        item_id: &str,
        user_id: i32,
        rating: Option<f64>,
        liked: bool,
    ) -> i32 {
        diesel::insert_into(marks::table)
            .values(NewMark {
                item_id: item_id.to_string(),
                user_id,
                note: None,
                rating,
                liked,
            })
            .returning(marks::id)
            .get_result(conn)
            .expect("Failed to insert mark")
    }

    pub fn set_mark_created_at(conn: &mut SqliteConnection, mark_id: i32, created_at: &str) {
        let timestamp = NaiveDateTime::parse_from_str(created_at, "%Y-%m-%dT%H:%M:%S")
            .expect("Invalid test timestamp");
        diesel::update(marks::table.find(mark_id))
            .set(marks::created_at.eq(timestamp))
            .execute(conn)
            .expect("Failed to update mark timestamp");
    }

    pub fn count_marks(conn: &mut SqliteConnection) -> i64 {
        marks::table
            .count()
            .get_result(conn)
            .expect("Failed to count marks")
    }

    pub fn count_users(conn: &mut SqliteConnection) -> i64 {
        users::table
            .count()
            .get_result(conn)
            .expect("Failed to count users")
    }
}
