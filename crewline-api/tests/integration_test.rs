/// Integration tests for the Crewline API
///
/// End-to-end coverage of the HTTP surface: authentication flow, team
/// membership rules (with the unassign cascade), task assignment rules, and
/// the completion summaries.
///
/// All tests here require a running PostgreSQL and are `#[ignore]`d by
/// default; see tests/common/mod.rs for how to run them.

mod common;

use axum::http::StatusCode;
use common::{request, TestContext};
use crewline_shared::models::task::{CreateTask, Task};
use serde_json::json;
use uuid::Uuid;

fn id_of(body: &serde_json::Value) -> Uuid {
    body["id"].as_str().unwrap().parse().unwrap()
}

#[tokio::test]
#[ignore = "requires a provisioned PostgreSQL (DATABASE_URL)"]
async fn test_register_login_logout_flow() {
    let ctx = TestContext::new().await.unwrap();

    let suffix = &Uuid::new_v4().simple().to_string()[..8];
    let username = format!("reg-{}", suffix);

    // Register
    let (status, body) = request(
        &ctx,
        "POST",
        "/users/register/",
        None,
        Some(json!({
            "username": username,
            "email": format!("{}@example.com", suffix),
            "password": "S3cret!pw",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
    assert_eq!(body["user"]["username"], username.as_str());
    assert!(body["access"].is_string());
    assert!(body["refresh"].is_string());
    let user_id: Uuid = body["user"]["id"].as_str().unwrap().parse().unwrap();
    let refresh = body["refresh"].as_str().unwrap().to_string();
    let access = body["access"].as_str().unwrap().to_string();

    // Login with the same credentials
    let (status, body) = request(
        &ctx,
        "POST",
        "/users/login/",
        None,
        Some(json!({ "username": username, "password": "S3cret!pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);

    // Wrong password is 401
    let (status, _) = request(
        &ctx,
        "POST",
        "/users/login/",
        None,
        Some(json!({ "username": username, "password": "Wr0ng!pw!" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Refresh works before logout
    let (status, body) = request(
        &ctx,
        "POST",
        "/users/refresh/",
        None,
        Some(json!({ "refresh": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "refresh failed: {}", body);

    // Logout revokes the refresh token
    let (status, _) = request(
        &ctx,
        "POST",
        "/users/logout/",
        Some(&access),
        Some(json!({ "refresh": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The revoked token can no longer mint access tokens
    let (status, _) = request(
        &ctx,
        "POST",
        "/users/refresh/",
        None,
        Some(json!({ "refresh": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    crewline_shared::models::user::User::delete(&ctx.db, user_id)
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a provisioned PostgreSQL (DATABASE_URL)"]
async fn test_register_enqueues_welcome_email() {
    let ctx = TestContext::new().await.unwrap();

    let suffix = &Uuid::new_v4().simple().to_string()[..8];
    let email = format!("{}@example.com", suffix);

    let (status, body) = request(
        &ctx,
        "POST",
        "/users/register/",
        None,
        Some(json!({
            "username": format!("mail-{}", suffix),
            "email": email,
            "password": "S3cret!pw",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let queued: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM email_jobs WHERE recipient = $1 AND state = 'queued'",
    )
    .bind(&email)
    .fetch_one(&ctx.db)
    .await
    .unwrap();
    assert_eq!(queued, 1, "registration should enqueue one welcome email");

    let user_id: Uuid = body["user"]["id"].as_str().unwrap().parse().unwrap();
    crewline_shared::models::user::User::delete(&ctx.db, user_id)
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a provisioned PostgreSQL (DATABASE_URL)"]
async fn test_unauthenticated_requests_rejected() {
    let ctx = TestContext::new().await.unwrap();

    let (status, _) = request(
        &ctx,
        "POST",
        "/teams/create/",
        None,
        Some(json!({ "name": "Eng" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = request(&ctx, "GET", "/teams/my-teams/", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a provisioned PostgreSQL (DATABASE_URL)"]
async fn test_team_create_detail_and_access() {
    let mut ctx = TestContext::new().await.unwrap();
    let alice = ctx.create_user("alice").await.unwrap();
    let bob = ctx.create_user("bob").await.unwrap();
    let alice_token = ctx.token_for(&alice);
    let bob_token = ctx.token_for(&bob);

    // Alice creates a team; member set starts empty
    let (status, body) = request(
        &ctx,
        "POST",
        "/teams/create/",
        Some(&alice_token),
        Some(json!({ "name": "Eng", "description": "Engineering" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {}", body);
    assert_eq!(body["created_by"], alice.username.as_str());
    assert_eq!(body["members"].as_array().unwrap().len(), 0);
    assert_eq!(body["slug"], "eng");
    let team_id = id_of(&body);

    // A nonexistent team is 404 even for strangers (existence before auth)
    let (status, _) = request(
        &ctx,
        "GET",
        &format!("/teams/{}/", Uuid::new_v4()),
        Some(&bob_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Bob is not a member yet: detail is 403
    let (status, _) = request(
        &ctx,
        "GET",
        &format!("/teams/{}/", team_id),
        Some(&bob_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Alice adds bob
    let (status, body) = request(
        &ctx,
        "POST",
        &format!("/teams/{}/add-member/", team_id),
        Some(&alice_token),
        Some(json!({ "username": bob.username })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "add-member failed: {}", body);
    assert_eq!(body["username"], bob.username.as_str());

    // Now bob sees the detail, and appears in the member list
    let (status, body) = request(
        &ctx,
        "GET",
        &format!("/teams/{}/", team_id),
        Some(&bob_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["members"].as_array().unwrap(),
        &vec![json!(bob.username)]
    );

    // Only the creator may add members
    let (status, _) = request(
        &ctx,
        "POST",
        &format!("/teams/{}/add-member/", team_id),
        Some(&bob_token),
        Some(json!({ "username": alice.username })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Both see the team in my-teams
    for token in [&alice_token, &bob_token] {
        let (status, body) = request(&ctx, "GET", "/teams/my-teams/", Some(token), None).await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<String> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["id"].as_str().unwrap().to_string())
            .collect();
        assert!(ids.contains(&team_id.to_string()));
    }

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a provisioned PostgreSQL (DATABASE_URL)"]
async fn test_add_member_idempotence_and_precedence() {
    let mut ctx = TestContext::new().await.unwrap();
    let alice = ctx.create_user("alice").await.unwrap();
    let bob = ctx.create_user("bob").await.unwrap();
    let alice_token = ctx.token_for(&alice);

    let (_, body) = request(
        &ctx,
        "POST",
        "/teams/create/",
        Some(&alice_token),
        Some(json!({ "name": "Eng" })),
    )
    .await;
    let team_id = id_of(&body);

    // Unknown username resolves to 404
    let (status, _) = request(
        &ctx,
        "POST",
        &format!("/teams/{}/add-member/", team_id),
        Some(&alice_token),
        Some(json!({ "username": "nobody-here" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // First add succeeds
    let (status, _) = request(
        &ctx,
        "POST",
        &format!("/teams/{}/add-member/", team_id),
        Some(&alice_token),
        Some(json!({ "username": bob.username })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Second add is a validation failure and leaves the set unchanged
    let (status, body) = request(
        &ctx,
        "POST",
        &format!("/teams/{}/add-member/", team_id),
        Some(&alice_token),
        Some(json!({ "username": bob.username })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["non_field_errors"][0]
        .as_str()
        .unwrap()
        .contains("already a member"));

    // Adding the creator is also "already a member"
    let (status, _) = request(
        &ctx,
        "POST",
        &format!("/teams/{}/add-member/", team_id),
        Some(&alice_token),
        Some(json!({ "username": alice.username })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = request(
        &ctx,
        "GET",
        &format!("/teams/{}/", team_id),
        Some(&alice_token),
        None,
    )
    .await;
    assert_eq!(body["members"].as_array().unwrap().len(), 1);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a provisioned PostgreSQL (DATABASE_URL)"]
async fn test_remove_creator_always_fails() {
    let mut ctx = TestContext::new().await.unwrap();
    let alice = ctx.create_user("alice").await.unwrap();
    let alice_token = ctx.token_for(&alice);

    let (_, body) = request(
        &ctx,
        "POST",
        "/teams/create/",
        Some(&alice_token),
        Some(json!({ "name": "Eng" })),
    )
    .await;
    let team_id = id_of(&body);

    let (status, body) = request(
        &ctx,
        "POST",
        &format!("/teams/{}/remove-member/", team_id),
        Some(&alice_token),
        Some(json!({ "username": alice.username })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["non_field_errors"][0]
        .as_str()
        .unwrap()
        .contains("creator"));

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a provisioned PostgreSQL (DATABASE_URL)"]
async fn test_remove_member_round_trip_clears_assignment() {
    let mut ctx = TestContext::new().await.unwrap();
    let alice = ctx.create_user("alice").await.unwrap();
    let bob = ctx.create_user("bob").await.unwrap();
    let alice_token = ctx.token_for(&alice);

    let (_, body) = request(
        &ctx,
        "POST",
        "/teams/create/",
        Some(&alice_token),
        Some(json!({ "name": "Eng" })),
    )
    .await;
    let team_id = id_of(&body);

    // Add bob, assign him a task
    request(
        &ctx,
        "POST",
        &format!("/teams/{}/add-member/", team_id),
        Some(&alice_token),
        Some(json!({ "username": bob.username })),
    )
    .await;

    let (status, body) = request(
        &ctx,
        "POST",
        "/teams/tasks/create/",
        Some(&alice_token),
        Some(json!({
            "team": team_id,
            "title": "Fix bug",
            "assigned_to": bob.username,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "task create failed: {}", body);
    let task_id = id_of(&body);
    assert_eq!(body["assigned_to"], bob.id.to_string().as_str());

    // Removing an outsider fails with "not a member"
    let carol = ctx.create_user("carol").await.unwrap();
    let (status, body) = request(
        &ctx,
        "POST",
        &format!("/teams/{}/remove-member/", team_id),
        Some(&alice_token),
        Some(json!({ "username": carol.username })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["non_field_errors"][0]
        .as_str()
        .unwrap()
        .contains("not a member"));

    // Remove bob: membership reverts and his assignment is cleared
    let (status, _) = request(
        &ctx,
        "POST",
        &format!("/teams/{}/remove-member/", team_id),
        Some(&alice_token),
        Some(json!({ "username": bob.username })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = request(
        &ctx,
        "GET",
        &format!("/teams/{}/", team_id),
        Some(&alice_token),
        None,
    )
    .await;
    assert_eq!(body["members"].as_array().unwrap().len(), 0);

    let task = Task::find_by_id(&ctx.db, task_id).await.unwrap().unwrap();
    assert_eq!(task.assigned_to, None);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a provisioned PostgreSQL (DATABASE_URL)"]
async fn test_task_create_creator_only() {
    let mut ctx = TestContext::new().await.unwrap();
    let alice = ctx.create_user("alice").await.unwrap();
    let carol = ctx.create_user("carol").await.unwrap();
    let alice_token = ctx.token_for(&alice);
    let carol_token = ctx.token_for(&carol);

    let (_, body) = request(
        &ctx,
        "POST",
        "/teams/create/",
        Some(&alice_token),
        Some(json!({ "name": "Eng" })),
    )
    .await;
    let team_id = id_of(&body);

    // Creator succeeds, unassigned task is fine
    let (status, body) = request(
        &ctx,
        "POST",
        "/teams/tasks/create/",
        Some(&alice_token),
        Some(json!({ "team": team_id, "title": "Fix bug" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["assigned_to"], serde_json::Value::Null);

    // Non-creator is forbidden
    let (status, _) = request(
        &ctx,
        "POST",
        "/teams/tasks/create/",
        Some(&carol_token),
        Some(json!({ "team": team_id, "title": "Sneaky task" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Unknown team is 404
    let (status, _) = request(
        &ctx,
        "POST",
        "/teams/tasks/create/",
        Some(&alice_token),
        Some(json!({ "team": Uuid::new_v4(), "title": "Orphan" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a provisioned PostgreSQL (DATABASE_URL)"]
async fn test_assignment_rules() {
    let mut ctx = TestContext::new().await.unwrap();
    let alice = ctx.create_user("alice").await.unwrap();
    let bob = ctx.create_user("bob").await.unwrap();
    let carol = ctx.create_user("carol").await.unwrap();
    let alice_token = ctx.token_for(&alice);
    let bob_token = ctx.token_for(&bob);

    let (_, body) = request(
        &ctx,
        "POST",
        "/teams/create/",
        Some(&alice_token),
        Some(json!({ "name": "Eng" })),
    )
    .await;
    let team_id = id_of(&body);

    request(
        &ctx,
        "POST",
        &format!("/teams/{}/add-member/", team_id),
        Some(&alice_token),
        Some(json!({ "username": bob.username })),
    )
    .await;

    // Creating a task assigned to an outsider fails validation
    let (status, body) = request(
        &ctx,
        "POST",
        "/teams/tasks/create/",
        Some(&alice_token),
        Some(json!({
            "team": team_id,
            "title": "Fix bug",
            "assigned_to": carol.username,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["non_field_errors"][0]
        .as_str()
        .unwrap()
        .contains("team member or the team creator"));

    // Assigning to the creator is allowed (implicit membership)
    let (status, body) = request(
        &ctx,
        "POST",
        "/teams/tasks/create/",
        Some(&alice_token),
        Some(json!({
            "team": team_id,
            "title": "Fix bug",
            "assigned_to": alice.username,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let task_id = id_of(&body);

    // Reassignment: only the team creator, and only to eligible users
    let (status, _) = request(
        &ctx,
        "PATCH",
        &format!("/teams/tasks/{}/assign/", task_id),
        Some(&bob_token),
        Some(json!({ "assigned_to": bob.username })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = request(
        &ctx,
        "PATCH",
        &format!("/teams/tasks/{}/assign/", task_id),
        Some(&alice_token),
        Some(json!({ "assigned_to": carol.username })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = request(
        &ctx,
        "PATCH",
        &format!("/teams/tasks/{}/assign/", task_id),
        Some(&alice_token),
        Some(json!({ "assigned_to": bob.username })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["assigned_to"], bob.id.to_string().as_str());

    // Clearing the assignment with null is allowed
    let (status, body) = request(
        &ctx,
        "PATCH",
        &format!("/teams/tasks/{}/assign/", task_id),
        Some(&alice_token),
        Some(json!({ "assigned_to": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["assigned_to"], serde_json::Value::Null);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a provisioned PostgreSQL (DATABASE_URL)"]
async fn test_update_status_assignee_only() {
    let mut ctx = TestContext::new().await.unwrap();
    let alice = ctx.create_user("alice").await.unwrap();
    let bob = ctx.create_user("bob").await.unwrap();
    let alice_token = ctx.token_for(&alice);
    let bob_token = ctx.token_for(&bob);

    let (_, body) = request(
        &ctx,
        "POST",
        "/teams/create/",
        Some(&alice_token),
        Some(json!({ "name": "Eng" })),
    )
    .await;
    let team_id = id_of(&body);

    request(
        &ctx,
        "POST",
        &format!("/teams/{}/add-member/", team_id),
        Some(&alice_token),
        Some(json!({ "username": bob.username })),
    )
    .await;

    let (_, body) = request(
        &ctx,
        "POST",
        "/teams/tasks/create/",
        Some(&alice_token),
        Some(json!({
            "team": team_id,
            "title": "Fix bug",
            "assigned_to": bob.username,
        })),
    )
    .await;
    let task_id = id_of(&body);

    // The creator is NOT the assignee: forbidden
    let (status, _) = request(
        &ctx,
        "PATCH",
        &format!("/teams/tasks/{}/update-status/", task_id),
        Some(&alice_token),
        Some(json!({ "completed": true })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The assignee may complete it
    let (status, body) = request(
        &ctx,
        "PATCH",
        &format!("/teams/tasks/{}/update-status/", task_id),
        Some(&bob_token),
        Some(json!({ "completed": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["completed"], true);

    // Unknown task is 404
    let (status, _) = request(
        &ctx,
        "PATCH",
        &format!("/teams/tasks/{}/update-status/", Uuid::new_v4()),
        Some(&bob_token),
        Some(json!({ "completed": false })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a provisioned PostgreSQL (DATABASE_URL)"]
async fn test_my_tasks_and_team_summary() {
    let mut ctx = TestContext::new().await.unwrap();
    let alice = ctx.create_user("alice").await.unwrap();
    let bob = ctx.create_user("bob").await.unwrap();
    let alice_token = ctx.token_for(&alice);
    let bob_token = ctx.token_for(&bob);

    let (_, body) = request(
        &ctx,
        "POST",
        "/teams/create/",
        Some(&alice_token),
        Some(json!({ "name": "Eng" })),
    )
    .await;
    let team_id = id_of(&body);

    request(
        &ctx,
        "POST",
        &format!("/teams/{}/add-member/", team_id),
        Some(&alice_token),
        Some(json!({ "username": bob.username })),
    )
    .await;

    // Four tasks for bob, three of them completed: rate is exactly 75.00
    for i in 0..4 {
        let task = Task::create(
            &ctx.db,
            CreateTask {
                team_id,
                title: format!("task-{}", i),
                description: None,
                due_date: None,
                assigned_to: Some(bob.id),
            },
        )
        .await
        .unwrap();

        if i < 3 {
            Task::set_completed(&ctx.db, task.id, true).await.unwrap();
        }
    }

    let (status, body) = request(&ctx, "GET", "/teams/tasks/my-tasks/", Some(&bob_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["completed"].as_array().unwrap().len(), 3);
    assert_eq!(body["incomplete"].as_array().unwrap().len(), 1);
    assert_eq!(body["completion_rate"], 75.0);

    // A user with no tasks gets an empty breakdown with rate 0
    let (status, body) = request(
        &ctx,
        "GET",
        "/teams/tasks/my-tasks/",
        Some(&alice_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["completion_rate"], 0.0);

    // Team summary: creator only
    let (status, body) = request(
        &ctx,
        "GET",
        &format!("/teams/tasks/{}/details/", team_id),
        Some(&alice_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["team"], team_id.to_string().as_str());
    assert_eq!(body["completion_rate"], 75.0);

    let (status, _) = request(
        &ctx,
        "GET",
        &format!("/teams/tasks/{}/details/", team_id),
        Some(&bob_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    ctx.cleanup().await.unwrap();
}
