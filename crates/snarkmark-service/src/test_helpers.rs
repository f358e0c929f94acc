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

pub mod test_utils {
    use super::*;
    use crate::models::Article;
    use crate::schema::articles;

    pub fn insert_article(
        conn: &mut SqliteConnection,
        item_id: &str,
        title: &str,
        published_date: &str,
    ) {
        diesel::insert_into(articles::table)
            .values(Article {
                item_id: item_id.to_string(),
                title: title.to_string(),
                published_date: published_date.to_string(),
                creators_string: String::new(),
                url: String::new(),
                content_type: "article".to_string(),
            })
            .execute(conn)
            .expect("Failed to insert article");
    }
}
