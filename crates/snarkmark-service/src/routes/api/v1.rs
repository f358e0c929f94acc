use axum::{
    Router,
    extract::{Json, Query, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info, instrument};

use crate::errors::ApiError;
use crate::models::{Article, ArticleWithRating, Mark, NewMark, Pagination, User};
use crate::validation::{self, PageParams, ValidationError};
use crate::{
    AppState,
    repositories::{ArticleRepository, MarkRepository, UserRepository},
};

#[derive(Debug, Serialize)]
struct DataResponse<T> {
    data: T,
}

// Numeric parameters arrive as raw strings so that malformed values can be
// clamped or defaulted instead of failing query deserialization.
#[derive(Debug, Deserialize)]
struct ListArticlesQuery {
    page: Option<String>,
    limit: Option<String>,
    search: Option<String>,
}

#[derive(Debug, Serialize)]
struct ArticlesResponse {
    data: Vec<ArticleWithRating>,
    pagination: Pagination,
}

#[instrument(skip_all, fields(page = ?query.page, limit = ?query.limit, has_search = query.search.is_some()))]
async fn list_articles<S: AppState>(
    State(state): State<S>,
    Query(query): Query<ListArticlesQuery>,
) -> Result<ResponseJson<ArticlesResponse>, ApiError> {
    debug!("Processing article list request");

    let params = PageParams::from_raw(query.page.as_deref(), query.limit.as_deref());
    let search = validation::normalize_search(query.search);

    let page = state.article_repo().list(&params, search.as_deref()).await?;
    let pagination = Pagination::new(params.page, params.limit, page.total);

    info!(
        returned_count = page.items.len(),
        total = page.total,
        "Successfully retrieved article list"
    );

    Ok(ResponseJson(ArticlesResponse {
        data: page.items,
        pagination,
    }))
}

#[derive(Debug, Deserialize)]
struct GetArticleQuery {
    id: Option<String>,
}

#[instrument(skip_all, fields(id = ?query.id))]
async fn get_article<S: AppState>(
    State(state): State<S>,
    Query(query): Query<GetArticleQuery>,
) -> Result<ResponseJson<DataResponse<Article>>, ApiError> {
    debug!("Processing article detail request");

    let id = query
        .id
        .filter(|s| !s.trim().is_empty())
        .ok_or(ValidationError::MissingArticleId)?;

    match state.article_repo().get(&id).await? {
        Some(article) => {
            info!(item_id = %article.item_id, "Successfully retrieved article");
            Ok(ResponseJson(DataResponse { data: article }))
        }
        None => {
            debug!("Article not found");
            Err(ApiError::NotFound("Article"))
        }
    }
}

#[derive(Debug, Deserialize)]
struct ListMarksQuery {
    item_id: Option<String>,
    user_id: Option<String>,
    limit: Option<String>,
}

/// Dispatches on which parameter is present: `item_id` lists an article's
/// marks, `user_id` lists a user's marks with aggregate stats, neither
/// falls through to the global recent feed.
#[instrument(skip_all, fields(item_id = ?query.item_id, user_id = ?query.user_id, limit = ?query.limit))]
async fn list_marks<S: AppState>(
    State(state): State<S>,
    Query(query): Query<ListMarksQuery>,
) -> Result<ResponseJson<Value>, ApiError> {
    debug!("Processing mark list request");

    if let Some(item_id) = query.item_id.filter(|s| !s.trim().is_empty()) {
        let data = state.mark_repo().list_by_article(&item_id).await?;
        info!(returned_count = data.len(), "Retrieved marks for article");
        return Ok(ResponseJson(json!({ "data": data })));
    }

    let limit = validation::parse_limit(query.limit.as_deref(), validation::DEFAULT_MARKS_LIMIT);

    if let Some(user_id) = validation::parse_user_id(query.user_id.as_deref()) {
        let result = state.mark_repo().list_by_user(user_id, limit).await?;
        info!(
            returned_count = result.items.len(),
            total_read = result.stats.total_read,
            "Retrieved marks for user"
        );
        return Ok(ResponseJson(
            json!({ "data": result.items, "stats": result.stats }),
        ));
    }

    let data = state.mark_repo().list_recent(limit).await?;
    info!(returned_count = data.len(), "Retrieved recent marks");
    Ok(ResponseJson(json!({ "data": data })))
}

#[derive(Debug, Deserialize)]
struct CreateMarkRequest {
    item_id: Option<String>,
    user_id: Option<i32>,
    note: Option<String>,
    rating: Option<f64>,
    liked: Option<bool>,
}

#[instrument(skip_all, fields(item_id = ?payload.item_id, user_id = ?payload.user_id, has_note = payload.note.is_some(), rating = ?payload.rating))]
async fn create_mark<S: AppState>(
    State(state): State<S>,
    Json(payload): Json<CreateMarkRequest>,
) -> Result<(StatusCode, ResponseJson<DataResponse<Mark>>), ApiError> {
    debug!("Processing mark creation request");

    let item_id = payload.item_id.filter(|s| !s.trim().is_empty());
    let (item_id, user_id) = match (item_id, payload.user_id) {
        (Some(item_id), Some(user_id)) => (item_id, user_id),
        _ => return Err(ValidationError::MissingMarkFields.into()),
    };

    let new_mark = NewMark {
        item_id,
        user_id,
        note: validation::normalize_note(payload.note),
        rating: payload.rating,
        liked: payload.liked.unwrap_or(false),
    };

    let mark = state.mark_repo().create(&new_mark).await?;
    info!(id = mark.id, item_id = %mark.item_id, "Successfully created mark");

    Ok((StatusCode::CREATED, ResponseJson(DataResponse { data: mark })))
}

#[derive(Debug, Deserialize)]
struct GetUserQuery {
    username: Option<String>,
    view_only: Option<String>,
}

#[instrument(skip_all, fields(username = ?query.username, view_only = ?query.view_only))]
async fn get_user<S: AppState>(
    State(state): State<S>,
    Query(query): Query<GetUserQuery>,
) -> Result<ResponseJson<DataResponse<User>>, ApiError> {
    debug!("Processing user lookup request");

    let username = validation::require_username(query.username)?;
    let view_only = matches!(query.view_only.as_deref(), Some("true") | Some("1"));

    let user = if view_only {
        // Profile view must distinguish an unknown user from a login
        state
            .user_repo()
            .find_by_username(&username)
            .await?
            .ok_or(ApiError::NotFound("User"))?
    } else {
        state.user_repo().find_or_create(&username).await?
    };

    info!(id = user.id, username = %user.username, "Resolved user");
    Ok(ResponseJson(DataResponse { data: user }))
}

pub fn create_api_v1_router<S: AppState>() -> Router<S> {
    Router::new()
        .route("/articles", get(list_articles::<S>))
        .route("/article", get(get_article::<S>))
        .route("/marks", get(list_marks::<S>).post(create_mark::<S>))
        .route("/user", get(get_user::<S>))
}
