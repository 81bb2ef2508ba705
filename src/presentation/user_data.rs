//! `/api/me/...`: the caller's own tasks, health and finance entries, and goals.

use crate::application::summary::{current_month, validate_month};
use crate::domain::entries::{
    GoalChanges, NewFinanceEntry, NewGoal, NewHealthEntry, NewTask, TaskChanges,
};
use crate::presentation::auth::AuthenticatedUser;
use crate::presentation::handlers::{ApiError, AppState};
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use tracing::{info, instrument};

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub month: Option<String>,
}

impl MonthQuery {
    fn resolve(self) -> Result<String, ApiError> {
        let month = self.month.unwrap_or_else(current_month);
        validate_month(&month)?;
        Ok(month)
    }
}

#[instrument(skip(state), fields(user_id = %user.user_id))]
pub async fn list_tasks(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let tasks = state.data_store.get_tasks(&user.user_id).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

#[instrument(skip(state, req), fields(user_id = %user.user_id))]
pub async fn add_task(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<NewTask>,
) -> Result<HttpResponse, ApiError> {
    let mut new = req.into_inner();
    new.user_id = user.user_id;
    let task = state.data_store.add_task(new).await?;
    info!(task_id = %task.id, "Task created");
    Ok(HttpResponse::Created().json(task))
}

#[instrument(skip(state, changes), fields(user_id = %user.user_id, task_id = %*path))]
pub async fn update_task(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    changes: web::Json<TaskChanges>,
) -> Result<HttpResponse, ApiError> {
    let task_id = path.into_inner();
    let task = state
        .data_store
        .update_task(&user.user_id, &task_id, changes.into_inner())
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Task not found: {}", task_id)))?;
    Ok(HttpResponse::Ok().json(task))
}

#[instrument(skip(state), fields(user_id = %user.user_id, task_id = %*path))]
pub async fn delete_task(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let task_id = path.into_inner();
    if state.data_store.delete_task(&user.user_id, &task_id).await? {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(ApiError::NotFound(format!("Task not found: {}", task_id)))
    }
}

#[instrument(skip(state), fields(user_id = %user.user_id))]
pub async fn list_health_entries(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let entries = state.data_store.get_health_entries(&user.user_id).await?;
    Ok(HttpResponse::Ok().json(entries))
}

#[instrument(skip(state, req), fields(user_id = %user.user_id))]
pub async fn add_health_entry(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<NewHealthEntry>,
) -> Result<HttpResponse, ApiError> {
    let mut new = req.into_inner();
    new.user_id = user.user_id;
    let entry = state.data_store.add_health_entry(new).await?;
    Ok(HttpResponse::Created().json(entry))
}

#[instrument(skip(state), fields(user_id = %user.user_id))]
pub async fn list_finance_entries(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let entries = state.data_store.get_finance_entries(&user.user_id).await?;
    Ok(HttpResponse::Ok().json(entries))
}

#[instrument(skip(state, req), fields(user_id = %user.user_id))]
pub async fn add_finance_entry(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<NewFinanceEntry>,
) -> Result<HttpResponse, ApiError> {
    let mut new = req.into_inner();
    new.user_id = user.user_id;
    let entry = state.data_store.add_finance_entry(new).await?;
    Ok(HttpResponse::Created().json(entry))
}

#[instrument(skip(state), fields(user_id = %user.user_id))]
pub async fn finance_summary(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    query: web::Query<MonthQuery>,
) -> Result<HttpResponse, ApiError> {
    let month = query.into_inner().resolve()?;
    let summary = state
        .data_store
        .finance_summary(&user.user_id, &month)
        .await?;
    Ok(HttpResponse::Ok().json(summary))
}

#[instrument(skip(state), fields(user_id = %user.user_id))]
pub async fn list_goals(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let goals = state.data_store.get_goals(&user.user_id).await?;
    Ok(HttpResponse::Ok().json(goals))
}

#[instrument(skip(state, req), fields(user_id = %user.user_id))]
pub async fn add_goal(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<NewGoal>,
) -> Result<HttpResponse, ApiError> {
    let mut new = req.into_inner();
    new.user_id = user.user_id;
    let goal = state.data_store.add_goal(new).await?;
    info!(goal_id = %goal.id, "Goal created");
    Ok(HttpResponse::Created().json(goal))
}

#[instrument(skip(state, changes), fields(user_id = %user.user_id, goal_id = %*path))]
pub async fn update_goal(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    changes: web::Json<GoalChanges>,
) -> Result<HttpResponse, ApiError> {
    let goal_id = path.into_inner();
    let goal = state
        .data_store
        .update_goal(&user.user_id, &goal_id, changes.into_inner())
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Goal not found: {}", goal_id)))?;
    Ok(HttpResponse::Ok().json(goal))
}

#[instrument(skip(state), fields(user_id = %user.user_id))]
pub async fn dashboard(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    query: web::Query<MonthQuery>,
) -> Result<HttpResponse, ApiError> {
    let month = query.into_inner().resolve()?;
    let dashboard = state.data_store.dashboard(&user.user_id, &month).await?;
    Ok(HttpResponse::Ok().json(dashboard))
}
