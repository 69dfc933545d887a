//! HTTP-level integration tests: envelope, auth, routing and error codes.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{
    body_json, delete_auth, get, get_auth, post_auth, post_json_auth, put_json_auth,
};
use serde_json::json;
use tower::ServiceExt;

/// Create a board over HTTP and return its id.
async fn create_board(app: axum::Router, token: &str, body: serde_json::Value) -> String {
    let response = post_json_auth(app, "/api/v1/boards", body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"]
        .as_str()
        .expect("board id should be a string")
        .to_string()
}

// ---------------------------------------------------------------------------
// Test: GET /health reports the in-memory store
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_check_returns_ok_with_json() {
    let app = common::build_test_app(common::test_state());
    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("x-request-id").is_some());

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["store"], "memory");
    assert_eq!(json["db_healthy"], true);
    assert!(json["version"].is_string());
}

// ---------------------------------------------------------------------------
// Test: missing or bad tokens are rejected with 401
// ---------------------------------------------------------------------------

#[tokio::test]
async fn requests_without_valid_token_are_unauthorized() {
    let state = common::test_state();

    let response = get(common::build_test_app(state.clone()), "/api/v1/me/rewards").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");

    let response = get_auth(
        common::build_test_app(state),
        "/api/v1/me/rewards",
        "not-a-jwt",
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Test: profile upsert, toggle and reward summary round-trip
// ---------------------------------------------------------------------------

#[tokio::test]
async fn toggle_over_http_updates_rewards() {
    let state = common::test_state();
    let user_id = bingoals_core::types::new_id();
    let token = common::token_for(user_id);

    let response = put_json_auth(
        common::build_test_app(state.clone()),
        "/api/v1/me",
        json!({ "email": "alice@test.com", "displayName": "Alice" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["id"], user_id.to_string());

    let board_id = create_board(
        common::build_test_app(state.clone()),
        &token,
        json!({ "title": "Year", "gridSize": 3 }),
    )
    .await;

    let response = post_auth(
        common::build_test_app(state.clone()),
        &format!("/api/v1/boards/{board_id}/goals/4/toggle"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["rewardDelta"], 5);
    assert_eq!(json["data"]["goal"]["status"], "completed");
    assert_eq!(json["data"]["goal"]["isCompleted"], true);
    assert_eq!(json["data"]["milestones"], json!([]));

    let response = get_auth(
        common::build_test_app(state),
        "/api/v1/me/rewards",
        &token,
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["totalRewards"], 5);
    assert_eq!(json["data"]["dailyStreak"], 1);
    assert_eq!(json["data"]["level"], "bronze");
}

// ---------------------------------------------------------------------------
// Test: board creation normalises out-of-range settings
// ---------------------------------------------------------------------------

#[tokio::test]
async fn board_creation_normalises_inputs() {
    let state = common::test_state();
    let alice = common::seed_user(&state, "alice").await;
    let token = common::token_for(alice.id);

    let board_id = create_board(
        common::build_test_app(state.clone()),
        &token,
        json!({ "title": "Odd", "gridSize": 4, "boardType": "team", "maxMembers": 0 }),
    )
    .await;

    let response = get_auth(
        common::build_test_app(state),
        &format!("/api/v1/boards/{board_id}"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["gridSize"], 5);
    assert_eq!(json["data"]["boardType"], "personal");
    assert_eq!(json["data"]["maxMembers"], 5);
    assert_eq!(json["data"]["isDefault"], true);
    assert_eq!(json["data"]["goals"], json!([]));
}

// ---------------------------------------------------------------------------
// Test: domain errors map to their HTTP codes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn invalid_position_returns_400() {
    let state = common::test_state();
    let alice = common::seed_user(&state, "alice").await;
    let token = common::token_for(alice.id);
    let board_id = create_board(
        common::build_test_app(state.clone()),
        &token,
        json!({ "title": "Small", "gridSize": 3 }),
    )
    .await;

    let response = post_auth(
        common::build_test_app(state),
        &format!("/api/v1/boards/{board_id}/goals/9/toggle"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_POSITION");
}

#[tokio::test]
async fn quota_overflow_returns_400() {
    let state = common::test_state();
    let alice = common::seed_user(&state, "alice").await;
    let token = common::token_for(alice.id);
    let board_id = create_board(
        common::build_test_app(state.clone()),
        &token,
        json!({ "title": "Quota" }),
    )
    .await;

    let response = put_json_auth(
        common::build_test_app(state.clone()),
        &format!("/api/v1/boards/{board_id}/goals/0"),
        json!({ "title": "Run a marathon" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let minis = format!("/api/v1/boards/{board_id}/goals/0/mini-goals");
    let response = post_json_auth(
        common::build_test_app(state.clone()),
        &minis,
        json!({ "title": "10k", "percentage": 80 }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = post_json_auth(
        common::build_test_app(state),
        &minis,
        json!({ "title": "Half", "percentage": 30 }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "QUOTA_EXCEEDED");
}

#[tokio::test]
async fn mini_goal_on_empty_cell_returns_404() {
    let state = common::test_state();
    let alice = common::seed_user(&state, "alice").await;
    let token = common::token_for(alice.id);
    let board_id = create_board(
        common::build_test_app(state.clone()),
        &token,
        json!({ "title": "Empty" }),
    )
    .await;

    let response = post_json_auth(
        common::build_test_app(state),
        &format!("/api/v1/boards/{board_id}/goals/3/mini-goals"),
        json!({ "title": "step", "percentage": 10 }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn other_users_board_returns_404() {
    let state = common::test_state();
    let alice = common::seed_user(&state, "alice").await;
    let mallory = common::seed_user(&state, "mallory").await;
    let board_id = create_board(
        common::build_test_app(state.clone()),
        &common::token_for(alice.id),
        json!({ "title": "Private" }),
    )
    .await;

    let response = get_auth(
        common::build_test_app(state.clone()),
        &format!("/api/v1/boards/{board_id}"),
        &common::token_for(mallory.id),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Board not found");

    let response = delete_auth(
        common::build_test_app(state),
        &format!("/api/v1/boards/{board_id}"),
        &common::token_for(mallory.id),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: comments flow and author-only delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn comments_are_listed_and_author_only_deletable() {
    let state = common::test_state();
    let alice = common::seed_user(&state, "alice").await;
    let bob = common::seed_user(&state, "bob").await;
    let alice_token = common::token_for(alice.id);
    let bob_token = common::token_for(bob.id);

    let board_id = create_board(
        common::build_test_app(state.clone()),
        &alice_token,
        json!({ "title": "Team", "boardType": "shared" }),
    )
    .await;
    let response = post_json_auth(
        common::build_test_app(state.clone()),
        &format!("/api/v1/boards/{board_id}/members"),
        json!({ "userId": bob.id }),
        &alice_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = put_json_auth(
        common::build_test_app(state.clone()),
        &format!("/api/v1/boards/{board_id}/goals/2"),
        json!({ "title": "Learn Rust" }),
        &alice_token,
    )
    .await;
    let goal_id = body_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let comments = format!("/api/v1/goals/{goal_id}/comments");
    let response = post_json_auth(
        common::build_test_app(state.clone()),
        &comments,
        json!({ "text": "You got this" }),
        &bob_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let comment_id = body_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = post_json_auth(
        common::build_test_app(state.clone()),
        &comments,
        json!({ "text": "   " }),
        &bob_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get_auth(common::build_test_app(state.clone()), &comments, &alice_token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["text"], "You got this");

    let response = delete_auth(
        common::build_test_app(state.clone()),
        &format!("/api/v1/comments/{comment_id}"),
        &alice_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = delete_auth(
        common::build_test_app(state.clone()),
        &format!("/api/v1/comments/{comment_id}"),
        &bob_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(
        common::build_test_app(state),
        &format!("/api/v1/boards/{board_id}/activity"),
        &alice_token,
    )
    .await;
    let json = body_json(response).await;
    let kinds: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|a| a["actionType"].as_str())
        .collect();
    assert_eq!(kinds, vec!["comment_added", "member_joined"]);
}

// ---------------------------------------------------------------------------
// Test: WebSocket route refuses non-upgrade requests after auth
// ---------------------------------------------------------------------------

#[tokio::test]
async fn socket_route_requires_token() {
    let state = common::test_state();
    let request = Request::builder()
        .method(Method::GET)
        .uri(format!("/api/v1/boards/{}/ws", uuid::Uuid::nil()))
        .body(Body::empty())
        .unwrap();

    let response = common::build_test_app(state).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Test: invite codes over HTTP, then the joined board in the list
// ---------------------------------------------------------------------------

#[tokio::test]
async fn invite_join_and_board_list() {
    let state = common::test_state();
    let alice = common::seed_user(&state, "alice").await;
    let bob = common::seed_user(&state, "bob").await;
    let alice_token = common::token_for(alice.id);
    let bob_token = common::token_for(bob.id);

    let board_id = create_board(
        common::build_test_app(state.clone()),
        &alice_token,
        json!({ "title": "Team", "boardType": "shared" }),
    )
    .await;

    let response = post_json_auth(
        common::build_test_app(state.clone()),
        &format!("/api/v1/boards/{board_id}/invites"),
        json!({ "maxUses": 1, "expiresIn": 48 }),
        &alice_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["maxUses"], 1);
    assert!(json["data"]["expiresAt"].is_string());
    let code = json["data"]["inviteCode"].as_str().unwrap().to_string();

    let response = post_auth(
        common::build_test_app(state.clone()),
        &format!("/api/v1/invites/{code}/join"),
        &bob_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["role"], "member");

    let carol = common::seed_user(&state, "carol").await;
    let response = post_auth(
        common::build_test_app(state.clone()),
        &format!("/api/v1/invites/{code}/join"),
        &common::token_for(carol.id),
    )
    .await;
    assert_eq!(response.status(), StatusCode::GONE);
    assert_eq!(body_json(response).await["code"], "GONE");

    let response = get_auth(common::build_test_app(state.clone()), "/api/v1/boards", &bob_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let boards = json["data"].as_array().unwrap();
    assert_eq!(boards.len(), 1);
    assert_eq!(boards[0]["id"], board_id.as_str());
    assert_eq!(boards[0]["memberCount"], 2);
    assert_eq!(boards[0]["completedCount"], 0);

    let response = get_auth(
        common::build_test_app(state),
        &format!("/api/v1/boards/{board_id}/members"),
        &bob_token,
    )
    .await;
    let json = body_json(response).await;
    let names: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|m| m["name"].as_str())
        .collect();
    assert_eq!(names, vec!["alice", "bob"]);
}

// ---------------------------------------------------------------------------
// Test: reactions toggle between 201 and 200, reflections are editable
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reactions_and_reflection_edits() {
    let state = common::test_state();
    let alice = common::seed_user(&state, "alice").await;
    let token = common::token_for(alice.id);
    let board_id = create_board(
        common::build_test_app(state.clone()),
        &token,
        json!({ "title": "Mine" }),
    )
    .await;

    let response = post_auth(
        common::build_test_app(state.clone()),
        &format!("/api/v1/boards/{board_id}/goals/4/toggle"),
        &token,
    )
    .await;
    let goal_id = body_json(response).await["data"]["goal"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let reactions = format!("/api/v1/goals/{goal_id}/reactions");
    let response = post_json_auth(
        common::build_test_app(state.clone()),
        &reactions,
        json!({ "type": "clap" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["added"], true);
    assert_eq!(json["data"]["type"], "clap");

    let response = get_auth(common::build_test_app(state.clone()), &reactions, &token).await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 1);

    let response = post_json_auth(
        common::build_test_app(state.clone()),
        &reactions,
        json!({ "type": "clap" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["added"], false);

    let response = post_json_auth(
        common::build_test_app(state.clone()),
        &reactions,
        json!({ "type": "thumbs" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = put_json_auth(
        common::build_test_app(state),
        &format!("/api/v1/boards/{board_id}/goals/4/reflection"),
        json!({ "obstacles": "Rainy weeks", "reflectionAnswer": "Start earlier" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["obstacles"], "Rainy weeks");
    assert_eq!(json["data"]["reflectionAnswer"], "Start earlier");
    assert!(json["data"]["reflectionPrompt"].is_string());
}

// ---------------------------------------------------------------------------
// Test: notifications are marked read one at a time or all at once
// ---------------------------------------------------------------------------

#[tokio::test]
async fn notification_read_state_over_http() {
    let state = common::test_state();
    let alice = common::seed_user(&state, "alice").await;
    let bob = common::seed_user(&state, "bob").await;
    for title in ["first", "second"] {
        state
            .store
            .create_notification(bingoals_db::models::NewNotification {
                user_id: alice.id,
                notification_type: "member_joined".into(),
                title: title.into(),
                body: String::new(),
                metadata: None,
            })
            .await
            .unwrap();
    }
    let token = common::token_for(alice.id);

    let response = get_auth(common::build_test_app(state.clone()), "/api/v1/me/notifications", &token).await;
    let id = body_json(response).await["data"][0]["id"]
        .as_str()
        .unwrap()
        .to_string();
    let uri = format!("/api/v1/me/notifications/{id}/read");

    let response = common::send(
        common::build_test_app(state.clone()),
        Method::PUT,
        &uri,
        Some(&common::token_for(bob.id)),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = common::send(
        common::build_test_app(state.clone()),
        Method::PUT,
        &uri,
        Some(&token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = post_auth(
        common::build_test_app(state),
        "/api/v1/me/notifications/read-all",
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["marked"], 1);
}
