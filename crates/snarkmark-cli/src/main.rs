use clap::{Parser, Subcommand};
use reqwest::Client;
use serde::Deserialize;
use std::error::Error;

#[derive(Parser)]
#[command(name = "snarkmark")]
#[command(about = "A CLI for browsing and marking academic articles")]
struct Cli {
    /// Base URL for the Snarkmark service
    #[arg(long, default_value = "http://localhost:3000")]
    service_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the article catalog
    Articles {
        /// Page number (1-based)
        #[arg(short, long, default_value_t = 1)]
        page: u32,
        /// Articles per page
        #[arg(short, long, default_value_t = 20)]
        limit: u32,
        /// Filter by title or creators
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show one article with its marks
    Article {
        /// Catalog identifier of the article
        item_id: String,
    },
    /// Log a mark on an article
    Mark {
        /// Catalog identifier of the article
        item_id: String,
        /// Username to mark as (created on first use)
        #[arg(short, long)]
        username: String,
        /// Rating from 1 to 5
        #[arg(short, long)]
        rating: Option<f64>,
        /// Mark the article as liked
        #[arg(short, long)]
        liked: bool,
        /// Free-text note
        #[arg(short, long)]
        note: Option<String>,
    },
    /// Log in, creating the user on first sight
    Login {
        username: String,
    },
    /// Show a user's profile and reading stats
    Profile {
        username: String,
        /// Number of marks to show
        #[arg(short, long, default_value_t = 10)]
        limit: u32,
    },
    /// Show recent marks across all users
    Recent {
        /// Number of marks to show
        #[arg(short, long, default_value_t = 10)]
        limit: u32,
    },
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct ArticlesPage {
    data: Vec<Article>,
    pagination: Pagination,
}

#[derive(Deserialize)]
struct Article {
    item_id: String,
    title: String,
    published_date: String,
    creators_string: String,
    url: String,
    avg_rating: Option<f64>,
}

#[derive(Deserialize)]
struct Pagination {
    page: u32,
    #[serde(rename = "totalPages")]
    total_pages: i64,
    total: i64,
}

#[derive(Deserialize)]
struct Mark {
    rating: Option<f64>,
    liked: bool,
    note: Option<String>,
    created_at: String,
    username: Option<String>,
    article_title: Option<String>,
}

#[derive(Deserialize)]
struct MarksPage {
    data: Vec<Mark>,
    stats: Option<Stats>,
}

#[derive(Deserialize)]
struct Stats {
    #[serde(rename = "totalRead")]
    total_read: i64,
    #[serde(rename = "totalLiked")]
    total_liked: i64,
    #[serde(rename = "avgRating")]
    avg_rating: Option<f64>,
}

#[derive(Deserialize)]
struct User {
    id: i64,
    username: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let client = Client::new();

    match cli.command {
        Commands::Articles {
            page,
            limit,
            search,
        } => {
            list_articles(&client, &cli.service_url, page, limit, search).await?;
        }
        Commands::Article { item_id } => {
            show_article(&client, &cli.service_url, &item_id).await?;
        }
        Commands::Mark {
            item_id,
            username,
            rating,
            liked,
            note,
        } => {
            create_mark(
                &client,
                &cli.service_url,
                &item_id,
                &username,
                rating,
                liked,
                note,
            )
            .await?;
        }
        Commands::Login { username } => {
            login(&client, &cli.service_url, &username).await?;
        }
        Commands::Profile { username, limit } => {
            show_profile(&client, &cli.service_url, &username, limit).await?;
        }
        Commands::Recent { limit } => {
            show_recent(&client, &cli.service_url, limit).await?;
        }
    }

    Ok(())
}

fn format_rating(rating: Option<f64>) -> String {
    match rating {
        Some(rating) => format!("{rating:.1}"),
        None => "-".to_string(),
    }
}

async fn list_articles(
    client: &Client,
    service_url: &str,
    page: u32,
    limit: u32,
    search: Option<String>,
) -> Result<(), Box<dyn Error>> {
    let mut query = vec![
        ("page".to_string(), page.to_string()),
        ("limit".to_string(), limit.to_string()),
    ];
    if let Some(search) = search {
        query.push(("search".to_string(), search));
    }

    let response = client
        .get(format!("{service_url}/api/v1/articles"))
        .query(&query)
        .send()
        .await?;

    if !response.status().is_success() {
        eprintln!("Failed to list articles: {}", response.status());
        eprintln!("Response: {}", response.text().await?);
        return Ok(());
    }

    let articles: ArticlesPage = response.json().await?;
    for article in &articles.data {
        println!(
            "{:>4}  {}  {} ({})",
            format_rating(article.avg_rating),
            article.item_id,
            article.title,
            article.published_date
        );
        println!("      {}", article.creators_string);
    }
    println!(
        "Page {}/{} ({} articles)",
        articles.pagination.page, articles.pagination.total_pages, articles.pagination.total
    );

    Ok(())
}

async fn show_article(
    client: &Client,
    service_url: &str,
    item_id: &str,
) -> Result<(), Box<dyn Error>> {
    let response = client
        .get(format!("{service_url}/api/v1/article"))
        .query(&[("id", item_id)])
        .send()
        .await?;

    if !response.status().is_success() {
        eprintln!("Failed to fetch article: {}", response.status());
        eprintln!("Response: {}", response.text().await?);
        return Ok(());
    }

    let article: Envelope<Article> = response.json().await?;
    println!("{}", article.data.title);
    println!("{}", article.data.creators_string);
    println!("Published: {}", article.data.published_date);
    println!("{}", article.data.url);

    // The detail view composes two endpoint calls, like the web frontend
    let marks: MarksPage = client
        .get(format!("{service_url}/api/v1/marks"))
        .query(&[("item_id", item_id)])
        .send()
        .await?
        .json()
        .await?;

    println!("\n{} mark(s):", marks.data.len());
    for mark in &marks.data {
        println!(
            "  {:>4} {} {} {} {}",
            format_rating(mark.rating),
            if mark.liked { "♥" } else { " " },
            mark.username.as_deref().unwrap_or("?"),
            mark.created_at,
            mark.note.as_deref().unwrap_or("")
        );
    }

    Ok(())
}

async fn create_mark(
    client: &Client,
    service_url: &str,
    item_id: &str,
    username: &str,
    rating: Option<f64>,
    liked: bool,
    note: Option<String>,
) -> Result<(), Box<dyn Error>> {
    // Resolve (or lazily create) the user first, then attach the mark
    let response = client
        .get(format!("{service_url}/api/v1/user"))
        .query(&[("username", username)])
        .send()
        .await?;

    if !response.status().is_success() {
        eprintln!("Failed to log in: {}", response.status());
        eprintln!("Response: {}", response.text().await?);
        return Ok(());
    }

    let user: Envelope<User> = response.json().await?;

    let payload = serde_json::json!({
        "item_id": item_id,
        "user_id": user.data.id,
        "rating": rating,
        "liked": liked,
        "note": note,
    });

    let response = client
        .post(format!("{service_url}/api/v1/marks"))
        .json(&payload)
        .send()
        .await?;

    if response.status().is_success() {
        println!("Marked {item_id} as {}", user.data.username);
    } else {
        eprintln!("Failed to create mark: {}", response.status());
        eprintln!("Response: {}", response.text().await?);
    }

    Ok(())
}

async fn login(client: &Client, service_url: &str, username: &str) -> Result<(), Box<dyn Error>> {
    let response = client
        .get(format!("{service_url}/api/v1/user"))
        .query(&[("username", username)])
        .send()
        .await?;

    if response.status().is_success() {
        let user: Envelope<User> = response.json().await?;
        println!("Logged in as {} (id {})", user.data.username, user.data.id);
    } else {
        eprintln!("Failed to log in: {}", response.status());
        eprintln!("Response: {}", response.text().await?);
    }

    Ok(())
}

async fn show_profile(
    client: &Client,
    service_url: &str,
    username: &str,
    limit: u32,
) -> Result<(), Box<dyn Error>> {
    let response = client
        .get(format!("{service_url}/api/v1/user"))
        .query(&[("username", username), ("view_only", "true")])
        .send()
        .await?;

    if !response.status().is_success() {
        eprintln!("Failed to fetch user: {}", response.status());
        eprintln!("Response: {}", response.text().await?);
        return Ok(());
    }

    let user: Envelope<User> = response.json().await?;

    let marks: MarksPage = client
        .get(format!("{service_url}/api/v1/marks"))
        .query(&[
            ("user_id", user.data.id.to_string()),
            ("limit", limit.to_string()),
        ])
        .send()
        .await?
        .json()
        .await?;

    println!("{}", user.data.username);
    if let Some(stats) = &marks.stats {
        println!(
            "Read: {}  Liked: {}  Avg rating: {}",
            stats.total_read,
            stats.total_liked,
            format_rating(stats.avg_rating)
        );
    }
    for mark in &marks.data {
        println!(
            "  {:>4} {} {}  {}",
            format_rating(mark.rating),
            if mark.liked { "♥" } else { " " },
            mark.created_at,
            mark.article_title.as_deref().unwrap_or("?")
        );
    }

    Ok(())
}

async fn show_recent(client: &Client, service_url: &str, limit: u32) -> Result<(), Box<dyn Error>> {
    let response = client
        .get(format!("{service_url}/api/v1/marks"))
        .query(&[("limit", limit.to_string())])
        .send()
        .await?;

    if !response.status().is_success() {
        eprintln!("Failed to fetch recent marks: {}", response.status());
        eprintln!("Response: {}", response.text().await?);
        return Ok(());
    }

    let marks: MarksPage = response.json().await?;
    for mark in &marks.data {
        println!(
            "{}  {} marked {}  {}{}",
            mark.created_at,
            mark.username.as_deref().unwrap_or("?"),
            mark.article_title.as_deref().unwrap_or("?"),
            format_rating(mark.rating),
            if mark.liked { " ♥" } else { "" }
        );
    }

    Ok(())
}
