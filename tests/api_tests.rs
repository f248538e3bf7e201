use nz_walks_api::{
    AppConfig, AppState, TokenIssuer, create_router,
    models::{LoginResponse, RegionDto, WalkDifficultyDto, WalkDto},
    repository::InMemoryUserStore,
    seed::{DEFAULT_USERS, seed_users},
};
use reqwest::{Client, StatusCode, header};
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Debug)]
pub struct TestApp {
    pub address: String,
}

/// Serves the full router on an ephemeral port with in-memory storage and the
/// default reader/writer accounts.
async fn spawn_app() -> TestApp {
    let config = AppConfig::default();
    let tokens = TokenIssuer::new(&config.jwt).expect("local signing key is valid");

    let users = Arc::new(InMemoryUserStore::new());
    seed_users(users.as_ref(), &DEFAULT_USERS)
        .await
        .expect("Failed to seed default users");

    let state = AppState::in_memory(users, tokens);
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

async fn login(client: &Client, app: &TestApp, username: &str, password: &str) -> String {
    let response = client
        .post(format!("{}/login", app.address))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await
        .expect("req fail");
    assert_eq!(response.status(), StatusCode::OK);
    response.json::<LoginResponse>().await.unwrap().token
}

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;
    let client = Client::new();
    let response = client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("req fail");
    assert!(response.status().is_success());
}

#[tokio::test]
async fn test_login_rejects_wrong_password() {
    let app = spawn_app().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/login", app.address))
        .json(&json!({ "username": "readonly@user.com", "password": "readonly@user" }))
        .send()
        .await
        .expect("req fail");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_walk_lifecycle() {
    let app = spawn_app().await;
    let client = Client::new();
    let writer = login(&client, &app, "ReadWrite@User.com", "Readwrite@user").await;
    let reader = login(&client, &app, "readonly@user.com", "Readonly@user").await;

    // Create the referenced region and difficulty
    let region: RegionDto = client
        .post(format!("{}/regions", app.address))
        .bearer_auth(&writer)
        .json(&json!({
            "code": "MWT",
            "name": "Manawatu-Whanganui",
            "area": 22_221.0,
            "lat": -39.73,
            "long": 175.44,
            "population": 252_000
        }))
        .send()
        .await
        .expect("req fail")
        .json()
        .await
        .unwrap();

    let difficulty: WalkDifficultyDto = client
        .post(format!("{}/walkdifficulties", app.address))
        .bearer_auth(&writer)
        .json(&json!({ "code": "Hard" }))
        .send()
        .await
        .expect("req fail")
        .json()
        .await
        .unwrap();

    // Create
    let response = client
        .post(format!("{}/walks", app.address))
        .bearer_auth(&writer)
        .json(&json!({
            "name": "Tongariro Alpine Crossing",
            "length": 19.4,
            "regionId": region.id,
            "walkDifficultyId": difficulty.id
        }))
        .send()
        .await
        .expect("req fail");
    assert_eq!(response.status(), StatusCode::CREATED);
    let location = response.headers()[header::LOCATION]
        .to_str()
        .unwrap()
        .to_string();
    let walk: WalkDto = response.json().await.unwrap();
    assert_eq!(location, format!("/walks/{}", walk.id));

    // Reader can list, but cannot mutate
    let walks: Vec<WalkDto> = client
        .get(format!("{}/walks", app.address))
        .bearer_auth(&reader)
        .send()
        .await
        .expect("req fail")
        .json()
        .await
        .unwrap();
    assert_eq!(walks, vec![walk.clone()]);

    let response = client
        .delete(format!("{}{}", app.address, location))
        .bearer_auth(&reader)
        .send()
        .await
        .expect("req fail");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Update
    let updated: WalkDto = client
        .put(format!("{}{}", app.address, location))
        .bearer_auth(&writer)
        .json(&json!({
            "name": "Tongariro Alpine Crossing",
            "length": 20.0,
            "regionId": region.id,
            "walkDifficultyId": difficulty.id
        }))
        .send()
        .await
        .expect("req fail")
        .json()
        .await
        .unwrap();
    assert_eq!(updated.id, walk.id);
    assert_eq!(updated.length, 20.0);

    // Delete
    let response = client
        .delete(format!("{}{}", app.address, location))
        .bearer_auth(&writer)
        .send()
        .await
        .expect("req fail");
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .get(format!("{}{}", app.address, location))
        .bearer_auth(&reader)
        .send()
        .await
        .expect("req fail");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
