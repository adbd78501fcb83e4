//! API Integration Tests
//!
//! Drive the full router (identity middleware included) against a real
//! database. Each test uses a fresh user ID, so no shared state leaks
//! between tests or runs.

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    middleware, Router,
};
use chrono::{Duration, Utc};
use habit_points::api::{self, AppState};
use habit_points::domain::AchievementCatalog;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::util::ServiceExt;
use uuid::Uuid;

mod common;

fn build_app(pool: PgPool) -> Router {
    api::create_router()
        .layer(middleware::from_fn(api::middleware::identity_middleware))
        .with_state(AppState::new(pool, AchievementCatalog::standard()))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    user_id: Option<Uuid>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user_id) = user_id {
        builder = builder.header("X-User-Id", user_id.to_string());
    }

    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn create_habit(app: &Router, user_id: Uuid, name: &str, goal_count: i32) -> Uuid {
    let (status, body) = send(
        app,
        "POST",
        "/habits",
        Some(user_id),
        Some(json!({ "name": name, "color": "#4A90D9", "goalCountPerDay": goal_count })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "habit creation failed: {body}");
    body["id"].as_str().unwrap().parse().unwrap()
}

async fn complete_at(
    app: &Router,
    user_id: Uuid,
    habit_id: Uuid,
    completed_at: Option<chrono::DateTime<Utc>>,
) -> (StatusCode, Value) {
    let body = completed_at.map(|at| json!({ "completedAt": at.to_rfc3339() }));
    send(
        app,
        "POST",
        &format!("/habits/{habit_id}/complete"),
        Some(user_id),
        body,
    )
    .await
}

#[tokio::test]
async fn test_missing_identity_is_rejected() {
    let Some(pool) = common::setup_test_db().await else {
        return;
    };
    let app = build_app(pool);

    let (status, body) = send(&app, "GET", "/habits", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_code"], "missing_user_identity");

    let request = Request::builder()
        .method("GET")
        .uri("/habits")
        .header("X-User-Id", "not-a-uuid")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_streak_points_grow_and_reset_over_a_gap() {
    let Some(pool) = common::setup_test_db().await else {
        return;
    };
    let app = build_app(pool);
    let user_id = Uuid::new_v4();
    let habit_id = create_habit(&app, user_id, "Read", 1).await;
    let now = Utc::now();

    // Three days ago: first completion of a fresh habit earns 1 point.
    let (status, body) = complete_at(&app, user_id, habit_id, Some(now - Duration::days(3))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["pointsEarned"], 1);
    assert_eq!(body["updatedHabit"]["currentStreak"], 1);

    // Two days ago: second consecutive day earns 2.
    let (status, body) = complete_at(&app, user_id, habit_id, Some(now - Duration::days(2))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["pointsEarned"], 2);
    assert_eq!(body["updatedHabit"]["currentStreak"], 2);
    assert_eq!(body["updatedHabit"]["totalPoints"], 3);

    // Yesterday was skipped: today restarts the streak at 1 point.
    let (status, body) = complete_at(&app, user_id, habit_id, Some(now)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["pointsEarned"], 1);
    assert_eq!(body["updatedHabit"]["currentStreak"], 1);
    assert_eq!(body["updatedHabit"]["maxStreak"], 2);
    assert_eq!(body["updatedHabit"]["totalPoints"], 4);
}

#[tokio::test]
async fn test_goal_count_gates_the_point_award() {
    let Some(pool) = common::setup_test_db().await else {
        return;
    };
    let app = build_app(pool);
    let user_id = Uuid::new_v4();
    let habit_id = create_habit(&app, user_id, "Hydrate", 3).await;

    let (_, first) = complete_at(&app, user_id, habit_id, None).await;
    assert_eq!(first["pointsEarned"], 0);
    assert_eq!(first["goalMet"], false);

    let (_, second) = complete_at(&app, user_id, habit_id, None).await;
    assert_eq!(second["pointsEarned"], 0);

    let (_, third) = complete_at(&app, user_id, habit_id, None).await;
    assert_eq!(third["pointsEarned"], 1);
    assert_eq!(third["goalMet"], true);
    assert_eq!(third["completionsToday"], 3);

    // Past the goal: recorded, but worthless.
    let (status, fourth) = complete_at(&app, user_id, habit_id, None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(fourth["pointsEarned"], 0);
    assert_eq!(fourth["updatedHabit"]["totalPoints"], 1);
}

#[tokio::test]
async fn test_plaster_requires_ten_points() {
    let Some(pool) = common::setup_test_db().await else {
        return;
    };
    let app = build_app(pool);
    let user_id = Uuid::new_v4();
    let habit_id = create_habit(&app, user_id, "Stretch", 1).await;
    let now = Utc::now();

    // One completion = 1 point, nowhere near the plaster cost.
    complete_at(&app, user_id, habit_id, Some(now)).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/habits/{habit_id}/complete-past"),
        Some(user_id),
        Some(json!({ "completedAt": (now - Duration::days(1)).to_rfc3339() })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "insufficient_points");
    assert_eq!(body["error"], "Not enough points for this!");
}

#[tokio::test]
async fn test_plaster_joins_runs_and_deducts_cost() {
    let Some(pool) = common::setup_test_db().await else {
        return;
    };
    let app = build_app(pool);
    let user_id = Uuid::new_v4();
    let habit_id = create_habit(&app, user_id, "Run", 1).await;
    let now = Utc::now();

    // Five consecutive days ending two days ago: 1+2+3+4+5 = 15 points.
    for days_ago in (2..=6).rev() {
        let (status, _) =
            complete_at(&app, user_id, habit_id, Some(now - Duration::days(days_ago))).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    // Plaster yesterday's miss: streak extends through it, 10 points off.
    let (status, body) = send(
        &app,
        "POST",
        &format!("/habits/{habit_id}/complete-past"),
        Some(user_id),
        Some(json!({ "completedAt": (now - Duration::days(1)).to_rfc3339() })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "plaster failed: {body}");
    assert_eq!(body["pointsCost"], 10);
    assert_eq!(body["updatedHabit"]["currentStreak"], 6);
    assert_eq!(body["updatedHabit"]["totalPoints"], 5);
    assert_eq!(body["updatedHabit"]["pointStreakReset"], true);
    assert_eq!(body["completion"]["isMissedCompletion"], true);

    // The next completion's point clock restarts from the plastered day.
    let (status, body) = complete_at(&app, user_id, habit_id, Some(now)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["pointsEarned"], 1);
    assert_eq!(body["updatedHabit"]["currentStreak"], 7);
    assert_eq!(body["updatedHabit"]["pointStreakReset"], false);

    // Seven straight days unlocks the week streak achievement.
    let (status, achievements) = send(&app, "GET", "/achievements", Some(user_id), None).await;
    assert_eq!(status, StatusCode::OK);
    let types: Vec<&str> = achievements
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["achievementType"].as_str().unwrap())
        .collect();
    assert!(types.contains(&"streak_7"), "got {types:?}");
}

#[tokio::test]
async fn test_streak_achievement_unlocks_only_once() {
    let Some(pool) = common::setup_test_db().await else {
        return;
    };
    let app = build_app(pool);
    let user_id = Uuid::new_v4();
    let habit_id = create_habit(&app, user_id, "Swim", 1).await;
    let now = Utc::now();

    // Six past days plus today reaches a 7-day streak and unlocks it.
    for days_ago in (1..=6).rev() {
        let (status, _) =
            complete_at(&app, user_id, habit_id, Some(now - Duration::days(days_ago))).await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (status, body) = complete_at(&app, user_id, habit_id, Some(now)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["updatedHabit"]["currentStreak"], 7);

    // Undo today, then redo it: the streak crosses 7 a second time.
    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/habits/{habit_id}/complete-today"),
        Some(user_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updatedHabit"]["currentStreak"], 6);

    let (status, body) = complete_at(&app, user_id, habit_id, Some(now)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["updatedHabit"]["currentStreak"], 7);

    // The second crossing must not produce a duplicate unlock.
    let (status, achievements) = send(&app, "GET", "/achievements", Some(user_id), None).await;
    assert_eq!(status, StatusCode::OK);
    let week_unlocks = achievements
        .as_array()
        .unwrap()
        .iter()
        .filter(|a| a["achievementType"] == "streak_7")
        .count();
    assert_eq!(week_unlocks, 1, "got {achievements}");
}

#[tokio::test]
async fn test_plaster_rejects_today_and_occupied_days() {
    let Some(pool) = common::setup_test_db().await else {
        return;
    };
    let app = build_app(pool);
    let user_id = Uuid::new_v4();
    let habit_id = create_habit(&app, user_id, "Journal", 1).await;
    let now = Utc::now();

    // Today is never plasterable, regardless of funds.
    let (status, body) = send(
        &app,
        "POST",
        &format!("/habits/{habit_id}/complete-past"),
        Some(user_id),
        Some(json!({ "completedAt": now.to_rfc3339() })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "date_not_in_past");

    // A day that already holds a completion conflicts.
    complete_at(&app, user_id, habit_id, Some(now - Duration::days(1))).await;
    let (status, body) = send(
        &app,
        "POST",
        &format!("/habits/{habit_id}/complete-past"),
        Some(user_id),
        Some(json!({ "completedAt": (now - Duration::days(1)).to_rfc3339() })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error_code"], "day_already_completed");

    // Garbage timestamps are a plain bad request.
    let (status, _) = send(
        &app,
        "POST",
        &format!("/habits/{habit_id}/complete-past"),
        Some(user_id),
        Some(json!({ "completedAt": "yesterday" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_remove_today_undoes_the_latest_completion() {
    let Some(pool) = common::setup_test_db().await else {
        return;
    };
    let app = build_app(pool);
    let user_id = Uuid::new_v4();
    let habit_id = create_habit(&app, user_id, "Meditate", 1).await;

    // Nothing recorded today yet.
    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/habits/{habit_id}/complete-today"),
        Some(user_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_code"], "completion_not_found");

    complete_at(&app, user_id, habit_id, None).await;

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/habits/{habit_id}/complete-today"),
        Some(user_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updatedHabit"]["currentStreak"], 0);
    assert_eq!(body["updatedHabit"]["totalPoints"], 0);
}

#[tokio::test]
async fn test_delete_completion_by_id_recomputes() {
    let Some(pool) = common::setup_test_db().await else {
        return;
    };
    let app = build_app(pool);
    let user_id = Uuid::new_v4();
    let habit_id = create_habit(&app, user_id, "Write", 1).await;
    let now = Utc::now();

    complete_at(&app, user_id, habit_id, Some(now - Duration::days(1))).await;
    let (_, body) = complete_at(&app, user_id, habit_id, Some(now)).await;
    assert_eq!(body["updatedHabit"]["totalPoints"], 3);
    let completion_id = body["completion"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/completions/{completion_id}"),
        Some(user_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updatedHabit"]["totalPoints"], 1);
    assert_eq!(body["updatedHabit"]["currentStreak"], 1);

    // A stranger cannot delete someone else's records.
    let (_, body) = complete_at(&app, user_id, habit_id, Some(now)).await;
    let completion_id = body["completion"]["id"].as_str().unwrap().to_string();
    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/completions/{completion_id}"),
        Some(Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_other_users_habits_are_off_limits() {
    let Some(pool) = common::setup_test_db().await else {
        return;
    };
    let app = build_app(pool);
    let owner = Uuid::new_v4();
    let stranger = Uuid::new_v4();
    let habit_id = create_habit(&app, owner, "Private", 1).await;

    let (status, _) = complete_at(&app, stranger, habit_id, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/habits/{habit_id}/completions"),
        Some(stranger),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/habits/{habit_id}"),
        Some(stranger),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_dashboard_assembles_the_view() {
    let Some(pool) = common::setup_test_db().await else {
        return;
    };
    let app = build_app(pool);
    let user_id = Uuid::new_v4();
    let habit_id = create_habit(&app, user_id, "Practice", 1).await;
    let now = Utc::now();

    complete_at(&app, user_id, habit_id, Some(now - Duration::days(1))).await;
    complete_at(&app, user_id, habit_id, Some(now)).await;

    let (status, body) = send(&app, "GET", "/dashboard", Some(user_id), None).await;
    assert_eq!(status, StatusCode::OK);

    let habits = body["habits"].as_array().unwrap();
    assert_eq!(habits.len(), 1);
    let habit = &habits[0];
    assert_eq!(habit["id"].as_str().unwrap(), habit_id.to_string());
    assert_eq!(habit["completionsToday"], 1);
    assert_eq!(habit["nextCompletionPoints"], 0);
    assert_eq!(habit["currentStreak"], 2);
    assert_eq!(habit["recentCompletions"].as_array().unwrap().len(), 2);
    assert_eq!(body["totalPoints"], 3);
    assert!(body["recentAchievements"].is_array());
}

#[tokio::test]
async fn test_available_achievements_flag_locked_entries() {
    let Some(pool) = common::setup_test_db().await else {
        return;
    };
    let app = build_app(pool);
    let user_id = Uuid::new_v4();

    let (status, body) = send(&app, "GET", "/achievements/available", Some(user_id), None).await;
    assert_eq!(status, StatusCode::OK);

    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), AchievementCatalog::standard().entries().len());

    let week = entries
        .iter()
        .find(|e| e["type"] == "streak_7")
        .expect("streak_7 missing from catalog");
    assert_eq!(week["locked"], true);

    // A brand-new user has everything locked.
    assert!(entries.iter().all(|e| e["locked"] == true));
}

#[tokio::test]
async fn test_habit_validation() {
    let Some(pool) = common::setup_test_db().await else {
        return;
    };
    let app = build_app(pool);
    let user_id = Uuid::new_v4();

    let (status, body) = send(
        &app,
        "POST",
        "/habits",
        Some(user_id),
        Some(json!({ "name": "", "color": "#FFF" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "invalid_request");

    let (status, body) = send(
        &app,
        "POST",
        "/habits",
        Some(user_id),
        Some(json!({ "name": "Read", "color": "#FFF", "goalCountPerDay": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "invalid_goal_count");

    // Icon defaults when omitted.
    let (status, body) = send(
        &app,
        "POST",
        "/habits",
        Some(user_id),
        Some(json!({ "name": "Read", "color": "#FFF" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["icon"], "star");
}
