mod articles;
mod marks;
mod memory;
mod traits;
mod users;

pub use articles::SqliteArticleRepository;
pub use marks::SqliteMarkRepository;
pub use memory::MemoryStore;
pub use traits::{
    ArticlePage, ArticleRepository, MarkRepository, UserMarks, UserRepository,
};
pub use users::SqliteUserRepository;
