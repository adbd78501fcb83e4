//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{DomainError, OperationContext};
use crate::error::AppError;
use crate::handlers::{
    DeleteCompletionCommand, DeleteCompletionHandler, RecordCompletionCommand,
    RecordCompletionHandler, RecordPastCompletionCommand, RecordPastCompletionHandler,
    RemoveTodayCommand, RemoveTodayHandler,
};
use crate::projection::DashboardService;
use crate::store::{Achievement, AchievementStore, Completion, Habit, HabitChanges, HabitStore, NewHabit};

use super::AppState;

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHabitRequest {
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default = "default_goal_count", rename = "goalCountPerDay")]
    pub goal_count: i32,
    #[serde(default = "default_goal_period_days")]
    pub goal_period_days: i32,
}

fn default_goal_count() -> i32 {
    1
}

fn default_goal_period_days() -> i32 {
    1
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHabitRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default, rename = "goalCountPerDay")]
    pub goal_count: Option<i32>,
    #[serde(default)]
    pub goal_period_days: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteRequest {
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletePastRequest {
    /// RFC 3339 timestamp within the missed day
    pub completed_at: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableAchievement {
    #[serde(rename = "type")]
    pub achievement_type: String,
    pub title: String,
    pub description: String,
    pub points: i32,
    pub locked: bool,
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<AppState> {
    Router::new()
        // Habit CRUD
        .route("/habits", get(list_habits))
        .route("/habits", post(create_habit))
        .route("/habits/:habit_id", put(update_habit))
        .route("/habits/:habit_id", delete(delete_habit))
        .route("/habits/:habit_id/completions", get(list_completions))
        // Recorder operations
        .route("/habits/:habit_id/complete", post(complete))
        .route("/habits/:habit_id/complete-past", post(complete_past))
        .route("/habits/:habit_id/complete-today", delete(remove_today))
        .route("/completions/:completion_id", delete(delete_completion))
        // Read side
        .route("/dashboard", get(get_dashboard))
        .route("/achievements", get(list_achievements))
        .route("/achievements/available", get(list_available_achievements))
}

// =========================================================================
// GET /habits
// =========================================================================

/// List the caller's habits
async fn list_habits(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
) -> Result<Json<Vec<Habit>>, AppError> {
    let habits = HabitStore::new(pool).list_for_user(context.user_id).await?;
    Ok(Json(habits))
}

// =========================================================================
// POST /habits
// =========================================================================

/// Create a new habit
async fn create_habit(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Json(request): Json<CreateHabitRequest>,
) -> Result<(StatusCode, Json<Habit>), AppError> {
    if request.name.trim().is_empty() {
        return Err(AppError::InvalidRequest("Habit name is required".to_string()));
    }
    if request.color.trim().is_empty() {
        return Err(AppError::InvalidRequest("Habit color is required".to_string()));
    }
    if request.goal_count < 1 {
        return Err(DomainError::InvalidGoalCount(request.goal_count).into());
    }
    if request.goal_period_days < 1 {
        return Err(AppError::InvalidRequest(
            "goalPeriodDays must be at least 1".to_string(),
        ));
    }

    let habit = HabitStore::new(pool)
        .insert(NewHabit {
            user_id: context.user_id,
            name: request.name,
            color: request.color,
            icon: request.icon,
            goal_count: request.goal_count,
            goal_period_days: request.goal_period_days,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(habit)))
}

// =========================================================================
// PUT /habits/:habit_id
// =========================================================================

/// Update a habit's client-editable fields
async fn update_habit(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Path(habit_id): Path<Uuid>,
    Json(request): Json<UpdateHabitRequest>,
) -> Result<Json<Habit>, AppError> {
    if let Some(goal_count) = request.goal_count {
        if goal_count < 1 {
            return Err(DomainError::InvalidGoalCount(goal_count).into());
        }
    }
    if matches!(request.name.as_deref(), Some(name) if name.trim().is_empty()) {
        return Err(AppError::InvalidRequest("Habit name cannot be empty".to_string()));
    }

    let store = HabitStore::new(pool);
    load_owned_habit(&store, habit_id, &context).await?;

    let habit = store
        .update_fields(
            habit_id,
            HabitChanges {
                name: request.name,
                color: request.color,
                icon: request.icon,
                goal_count: request.goal_count,
                goal_period_days: request.goal_period_days,
            },
        )
        .await?;

    Ok(Json(habit))
}

// =========================================================================
// DELETE /habits/:habit_id
// =========================================================================

/// Delete a habit; its completions and achievements cascade
async fn delete_habit(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Path(habit_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let store = HabitStore::new(pool);
    load_owned_habit(&store, habit_id, &context).await?;

    store.delete(habit_id).await?;
    Ok(Json(json!({ "success": true })))
}

// =========================================================================
// GET /habits/:habit_id/completions
// =========================================================================

/// Full completion history for one habit
async fn list_completions(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(habit_id): Path<Uuid>,
) -> Result<Json<Vec<Completion>>, AppError> {
    let store = HabitStore::new(state.pool.clone());
    load_owned_habit(&store, habit_id, &context).await?;

    let completions = crate::store::CompletionLedger::new(state.pool)
        .list_by_habit(habit_id)
        .await?;

    Ok(Json(completions))
}

// =========================================================================
// POST /habits/:habit_id/complete
// =========================================================================

/// Record a completion (now, or at an explicit timestamp)
async fn complete(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(habit_id): Path<Uuid>,
    body: Option<Json<CompleteRequest>>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let request = body.map(|Json(r)| r).unwrap_or_default();

    let handler = RecordCompletionHandler::new(state.pool, state.catalog);

    let command = RecordCompletionCommand::new(habit_id);
    let command = if let Some(completed_at) = request.completed_at {
        command.with_completed_at(completed_at)
    } else {
        command
    };

    let result = handler.execute(command, &context).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "completion": result.completion,
            "updatedHabit": result.habit,
            "pointsEarned": result.points_earned,
            "completionsToday": result.completions_today,
            "goalCount": result.goal_count,
            "goalMet": result.goal_met,
        })),
    ))
}

// =========================================================================
// POST /habits/:habit_id/complete-past
// =========================================================================

/// Plaster over a missed day in the past
async fn complete_past(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(habit_id): Path<Uuid>,
    Json(request): Json<CompletePastRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let completed_at = DateTime::parse_from_rfc3339(&request.completed_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            AppError::InvalidRequest("completedAt must be an RFC 3339 timestamp".to_string())
        })?;

    let handler = RecordPastCompletionHandler::new(state.pool, state.catalog);
    let command = RecordPastCompletionCommand::new(habit_id, completed_at);

    let result = handler.execute(command, &context).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "completion": result.completion,
            "updatedHabit": result.habit,
            "pointsEarned": 0,
            "pointsCost": result.points_cost,
            "message": result.message,
        })),
    ))
}

// =========================================================================
// DELETE /habits/:habit_id/complete-today
// =========================================================================

/// Undo today's most recent completion
async fn remove_today(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Path(habit_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let handler = RemoveTodayHandler::new(pool);
    let result = handler
        .execute(RemoveTodayCommand::new(habit_id), &context)
        .await?;

    Ok(Json(json!({ "updatedHabit": result.habit })))
}

// =========================================================================
// DELETE /completions/:completion_id
// =========================================================================

/// Delete one completion record by id
async fn delete_completion(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Path(completion_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let handler = DeleteCompletionHandler::new(pool);
    let result = handler
        .execute(DeleteCompletionCommand::new(completion_id), &context)
        .await?;

    Ok(Json(json!({ "success": true, "updatedHabit": result.habit })))
}

// =========================================================================
// GET /dashboard
// =========================================================================

/// Assembled dashboard view for the caller
async fn get_dashboard(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
) -> Result<Json<Value>, AppError> {
    let dashboard = DashboardService::new(pool)
        .dashboard(context.user_id)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!(dashboard)))
}

// =========================================================================
// GET /achievements
// =========================================================================

/// The caller's unlocked achievements, newest first
async fn list_achievements(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
) -> Result<Json<Vec<Achievement>>, AppError> {
    let achievements = AchievementStore::new(pool)
        .list_for_user(context.user_id)
        .await?;

    Ok(Json(achievements))
}

// =========================================================================
// GET /achievements/available
// =========================================================================

/// The full catalog, flagged with what the caller has not yet unlocked
async fn list_available_achievements(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
) -> Result<Json<Vec<AvailableAchievement>>, AppError> {
    let unlocked = AchievementStore::new(state.pool)
        .list_for_user(context.user_id)
        .await?;

    let available = state
        .catalog
        .entries()
        .iter()
        .map(|entry| AvailableAchievement {
            achievement_type: entry.achievement_type.to_string(),
            title: entry.title.to_string(),
            description: entry.description.to_string(),
            points: entry.points,
            locked: !unlocked
                .iter()
                .any(|a| a.achievement_type == entry.achievement_type),
        })
        .collect();

    Ok(Json(available))
}

// =========================================================================
// Helpers
// =========================================================================

/// Load a habit and verify the caller owns it.
async fn load_owned_habit(
    store: &HabitStore,
    habit_id: Uuid,
    context: &OperationContext,
) -> Result<Habit, AppError> {
    let habit = store
        .find(habit_id)
        .await?
        .ok_or_else(|| AppError::HabitNotFound(habit_id.to_string()))?;

    if habit.user_id != context.user_id {
        return Err(AppError::Forbidden("Habit belongs to another user".to_string()));
    }

    Ok(habit)
}
