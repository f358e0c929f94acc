use anyhow::Result;
use axum::http::StatusCode;
use serde_json::Value;

mod common;

use crate::common::{server_utils::create_test_server, test_utils};

#[tokio::test]
async fn test_list_articles_empty_catalog() -> Result<()> {
    let (server, _db) = create_test_server();

    let response = server.get("/api/v1/articles").await;
    response.assert_status_ok();

    let json_response: Value = response.json();
    assert_eq!(json_response["data"].as_array().unwrap().len(), 0);
    assert_eq!(json_response["pagination"]["page"], 1);
    assert_eq!(json_response["pagination"]["limit"], 20);
    assert_eq!(json_response["pagination"]["total"], 0);
    assert_eq!(json_response["pagination"]["totalPages"], 0);
    assert_eq!(json_response["pagination"]["hasNext"], false);
    assert_eq!(json_response["pagination"]["hasPrev"], false);

    Ok(())
}

#[tokio::test]
async fn test_list_articles_ordered_and_annotated_with_avg_rating() -> Result<()> {
    let (server, db) = create_test_server();

    {
        let mut conn = db.lock().unwrap();
        test_utils::insert_article(&mut conn, "a1", "Oldest Paper", "2012-12-03", "Hinton G.E.");
        test_utils::insert_article(&mut conn, "a2", "Middle Paper", "2017-06-12", "Vaswani A.");
        test_utils::insert_article(&mut conn, "a3", "Newest Paper", "2023-03-15", "OpenAI");

        let alice = test_utils::insert_user(&mut conn, "alice");
        let bob = test_utils::insert_user(&mut conn, "bob");
        test_utils::insert_mark(&mut conn, "a2", alice, Some(5.0), true);
        test_utils::insert_mark(&mut conn, "a2", bob, Some(3.0), false);
        // unrated mark must not drag the average down
        test_utils::insert_mark(&mut conn, "a2", alice, None, false);
    }

    let response = server.get("/api/v1/articles").await;
    response.assert_status_ok();

    let json_response: Value = response.json();
    let data = json_response["data"].as_array().unwrap();
    assert_eq!(data.len(), 3);
    assert_eq!(data[0]["item_id"], "a3");
    assert_eq!(data[1]["item_id"], "a2");
    assert_eq!(data[2]["item_id"], "a1");

    assert_eq!(data[1]["avg_rating"], 4.0);
    assert!(data[0]["avg_rating"].is_null());
    assert!(data[2]["avg_rating"].is_null());

    Ok(())
}

#[tokio::test]
async fn test_list_articles_pagination_flags() -> Result<()> {
    let (server, db) = create_test_server();

    {
        let mut conn = db.lock().unwrap();
        for i in 1..=5 {
            test_utils::insert_article(
                &mut conn,
                &format!("a{i}"),
                &format!("Paper {i}"),
                &format!("2020-01-0{i}"),
                "",
            );
        }
    }

    let response = server.get("/api/v1/articles?page=2&limit=2").await;
    response.assert_status_ok();

    let json_response: Value = response.json();
    assert_eq!(json_response["data"].as_array().unwrap().len(), 2);
    assert_eq!(json_response["pagination"]["total"], 5);
    assert_eq!(json_response["pagination"]["totalPages"], 3);
    assert_eq!(json_response["pagination"]["hasNext"], true);
    assert_eq!(json_response["pagination"]["hasPrev"], true);

    let last_page = server.get("/api/v1/articles?page=3&limit=2").await;
    let json_response: Value = last_page.json();
    assert_eq!(json_response["data"].as_array().unwrap().len(), 1);
    assert_eq!(json_response["pagination"]["hasNext"], false);
    assert_eq!(json_response["pagination"]["hasPrev"], true);

    Ok(())
}

#[tokio::test]
async fn test_list_articles_clamps_malformed_parameters() -> Result<()> {
    let (server, _db) = create_test_server();

    // Malformed numbers fall back to defaults instead of a 400
    let response = server.get("/api/v1/articles?page=abc&limit=lots").await;
    response.assert_status_ok();
    let json_response: Value = response.json();
    assert_eq!(json_response["pagination"]["page"], 1);
    assert_eq!(json_response["pagination"]["limit"], 20);

    let response = server.get("/api/v1/articles?page=0&limit=1000").await;
    response.assert_status_ok();
    let json_response: Value = response.json();
    assert_eq!(json_response["pagination"]["page"], 1);
    assert_eq!(json_response["pagination"]["limit"], 100);

    Ok(())
}

#[tokio::test]
async fn test_search_matches_title_and_creators_case_insensitively() -> Result<()> {
    let (server, db) = create_test_server();

    {
        let mut conn = db.lock().unwrap();
        test_utils::insert_article(
            &mut conn,
            "a1",
            "Attention Is All You Need",
            "2017-06-12",
            "Vaswani A., Shazeer N.",
        );
        test_utils::insert_article(
            &mut conn,
            "a2",
            "Deep Residual Learning",
            "2016-06-27",
            "He K., Zhang X.",
        );
    }

    for needle in ["attention", "ATTENTION", "Attention"] {
        let response = server
            .get(&format!("/api/v1/articles?search={needle}"))
            .await;
        response.assert_status_ok();
        let json_response: Value = response.json();
        assert_eq!(json_response["pagination"]["total"], 1, "needle {needle:?}");
        assert_eq!(json_response["data"][0]["item_id"], "a1");
    }

    let by_creator = server.get("/api/v1/articles?search=vaswani").await;
    let json_response: Value = by_creator.json();
    assert_eq!(json_response["pagination"]["total"], 1);
    assert_eq!(json_response["data"][0]["item_id"], "a1");

    let no_match = server.get("/api/v1/articles?search=nonexistent").await;
    let json_response: Value = no_match.json();
    assert_eq!(json_response["pagination"]["total"], 0);
    assert_eq!(json_response["data"].as_array().unwrap().len(), 0);

    Ok(())
}

#[tokio::test]
async fn test_get_article_requires_id() -> Result<()> {
    let (server, _db) = create_test_server();

    let response = server.get("/api/v1/article").await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let json_response: Value = response.json();
    assert!(json_response["error"].as_str().unwrap().contains("id"));

    Ok(())
}

#[tokio::test]
async fn test_get_article_not_found_vs_found() -> Result<()> {
    let (server, db) = create_test_server();

    {
        let mut conn = db.lock().unwrap();
        test_utils::insert_article(&mut conn, "a1", "Some Paper", "2020-01-01", "Author A.");
    }

    let missing = server.get("/api/v1/article?id=unknown").await;
    missing.assert_status(StatusCode::NOT_FOUND);
    let json_response: Value = missing.json();
    assert_eq!(json_response["error"], "Article not found");

    let found = server.get("/api/v1/article?id=a1").await;
    found.assert_status_ok();
    let json_response: Value = found.json();
    assert_eq!(json_response["data"]["item_id"], "a1");
    assert_eq!(json_response["data"]["title"], "Some Paper");
    assert_eq!(json_response["data"]["content_type"], "article");

    Ok(())
}

#[tokio::test]
async fn test_wrong_method_is_rejected() -> Result<()> {
    let (server, _db) = create_test_server();

    let response = server.post("/api/v1/article").await;
    response.assert_status(StatusCode::METHOD_NOT_ALLOWED);

    let response = server.post("/api/v1/articles").await;
    response.assert_status(StatusCode::METHOD_NOT_ALLOWED);

    Ok(())
}
