use interview_prep::{
    AppConfig, AppState, InMemoryRepository, RepositoryState, create_router,
    models::{Question, RegisterUserResponse, UpvoteResponse},
    query::QueryResult,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Debug)]
pub struct TestApp {
    pub address: String,
}

async fn spawn_app() -> TestApp {
    let repo = Arc::new(InMemoryRepository::sample()) as RepositoryState;
    let state = AppState {
        repo,
        config: AppConfig::default(),
    };
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp { address }
}

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("req fail");
    assert!(response.status().is_success());
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = spawn_app().await;
    let doc: Value = reqwest::get(format!("{}/api-docs/openapi.json", app.address))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(doc["paths"]["/questions"].is_object());
    assert!(doc["paths"]["/admin/stats"].is_object());
}

#[tokio::test]
async fn test_question_lifecycle() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    // Register
    let response = client
        .post(format!("{}/register", app.address))
        .json(&json!({ "display_name": "Lin" }))
        .send()
        .await
        .expect("register fail");
    assert_eq!(response.status(), 201);
    let registered: RegisterUserResponse = response.json().await.unwrap();

    // Submit
    let response = client
        .post(format!("{}/questions", app.address))
        .bearer_auth(&registered.token)
        .json(&json!({
            "text": "How does a B-tree split?", "company": "Oracle", "topic": "Database",
            "role": "Engineer", "difficulty": "Hard"
        }))
        .send()
        .await
        .expect("post fail");
    assert_eq!(response.status(), 201);
    let question: Question = response.json().await.unwrap();

    // Vote
    let vote: UpvoteResponse = client
        .post(format!("{}/questions/{}/upvote", app.address, question.id))
        .bearer_auth(&registered.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(vote.upvoted);
    assert_eq!(vote.upvotes, 1);

    // Listed newest first, with the vote applied
    let listing: QueryResult = client
        .get(format!("{}/questions?sort=latest&page=1&pageSize=1", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listing.total_matched, 4);
    assert_eq!(listing.items[0].id, question.id);
    assert_eq!(listing.items[0].upvotes, 1);
}

#[tokio::test]
async fn test_anonymous_vote_is_rejected() {
    let app = spawn_app().await;
    let response = reqwest::Client::new()
        .post(format!("{}/questions/1/upvote", app.address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["redirect"], "/login");
}
