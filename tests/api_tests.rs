use std::io::Write;
use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::Value;

use moviematch_api::{
    api::{create_router, AppState},
    config::Config,
    models::{Movie, MovieSummary},
    recommender::build_index,
    services::{DisabledPosterProvider, PosterProvider},
};

/// Serves a poster only for movie 1
struct FixedPosters;

#[async_trait::async_trait]
impl PosterProvider for FixedPosters {
    async fn poster_url(&self, movie: &MovieSummary) -> Option<String> {
        (movie.id == 1).then(|| "https://img.test/a.jpg".to_string())
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

fn movie(id: i64, title: &str, tags: &str) -> Movie {
    Movie {
        id,
        title: title.to_string(),
        tags: tags.to_string(),
    }
}

fn sample_corpus() -> Vec<Movie> {
    vec![
        movie(1, "A", "ghost haunted house"),
        movie(2, "B", "love romance comedy"),
        movie(3, "C", "ghost comedy scary"),
    ]
}

fn create_test_server_with(posters: Arc<dyn PosterProvider>, config: Config) -> TestServer {
    let index = build_index(&sample_corpus()).unwrap();
    let state = AppState::new(index, posters, config);
    TestServer::new(create_router(state)).unwrap()
}

fn create_test_server() -> TestServer {
    create_test_server_with(Arc::new(FixedPosters), Config::default())
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_recommend_ghost() {
    let server = create_test_server();

    let response = server
        .get("/api/v1/recommendations")
        .add_query_param("q", "ghost")
        .add_query_param("n", 2)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["query"], "ghost");

    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["id"], 1);
    assert_eq!(results[0]["title"], "A");
    assert_eq!(results[0]["poster"]["kind"], "image");
    assert_eq!(results[0]["poster"]["url"], "https://img.test/a.jpg");
    assert_eq!(results[1]["id"], 3);
    assert_eq!(results[1]["poster"]["kind"], "placeholder");
    assert_eq!(results[1]["poster"]["text"], "C");
}

#[tokio::test]
async fn test_recommend_uses_default_count() {
    let mut config = Config::default();
    config.default_results = 2;
    let server = create_test_server_with(Arc::new(DisabledPosterProvider), config);

    let response = server
        .get("/api/v1/recommendations")
        .add_query_param("q", "comedy")
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["results"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_recommend_out_of_vocabulary_still_returns_rows() {
    let server = create_test_server();

    let response = server
        .get("/api/v1/recommendations")
        .add_query_param("q", "spaceship")
        .add_query_param("n", 3)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let ids: Vec<i64> = body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_recommend_blank_query_is_bad_request() {
    let server = create_test_server();

    let response = server
        .get("/api/v1/recommendations")
        .add_query_param("q", "   ")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "No query provided");

    let response = server.get("/api/v1/recommendations").await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_result_count_above_max_is_bad_request() {
    let mut config = Config::default();
    config.max_results = 3;
    let server = create_test_server_with(Arc::new(DisabledPosterProvider), config);

    let response = server
        .get("/api/v1/recommendations")
        .add_query_param("q", "ghost")
        .add_query_param("n", 100000)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Invalid input: n must be at most 3");

    let response = server
        .get("/api/v1/movies/1/similar")
        .add_query_param("n", 4)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .get("/api/v1/recommendations")
        .add_query_param("q", "ghost")
        .add_query_param("n", 3)
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["results"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_similar_movies() {
    let server = create_test_server();

    let response = server
        .get("/api/v1/movies/3/similar")
        .add_query_param("n", 5)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["movie"]["id"], 3);
    assert_eq!(body["movie"]["title"], "C");
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r["id"] != 3));
}

#[tokio::test]
async fn test_similar_unknown_movie_is_not_found() {
    let server = create_test_server();
    let response = server.get("/api/v1/movies/999/similar").await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_index_stats() {
    let server = create_test_server();
    let response = server.get("/api/v1/index").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["movies"], 3);
    assert_eq!(body["vocabulary_size"], 7);
    assert_eq!(body["max_features"], 5000);
}

#[tokio::test]
async fn test_request_id_is_generated_and_propagated() {
    let server = create_test_server();

    let response = server.get("/health").await;
    let generated = response.header("x-request-id");
    assert!(uuid::Uuid::parse_str(generated.to_str().unwrap()).is_ok());

    let id = uuid::Uuid::new_v4().to_string();
    let response = server
        .get("/health")
        .add_header(
            axum::http::HeaderName::from_static("x-request-id"),
            axum::http::HeaderValue::from_str(&id).unwrap(),
        )
        .await;
    assert_eq!(response.header("x-request-id").to_str().unwrap(), id);
}

#[tokio::test]
async fn test_reload_swaps_index() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        "movie_id,title,tags\n10,Space,space alien\n11,Western,cowboy desert\n12,Ghosts,ghost\n13,Aliens,alien invasion\n"
    )
    .unwrap();
    file.flush().unwrap();

    let config = Config {
        corpus_path: file.path().to_string_lossy().to_string(),
        ..Config::default()
    };
    let server = create_test_server_with(Arc::new(DisabledPosterProvider), config);

    let response = server.post("/api/v1/index/reload").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["movies"], 4);

    let response = server
        .get("/api/v1/recommendations")
        .add_query_param("q", "alien")
        .add_query_param("n", 2)
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    let ids: Vec<i64> = body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![10, 13]);
}

#[tokio::test]
async fn test_reload_failure_keeps_current_index() {
    let config = Config {
        corpus_path: "/definitely/not/here.csv".to_string(),
        ..Config::default()
    };
    let server = create_test_server_with(Arc::new(DisabledPosterProvider), config);

    let response = server.post("/api/v1/index/reload").await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    let response = server.get("/api/v1/index").await;
    let body: Value = response.json();
    assert_eq!(body["movies"], 3);
}
