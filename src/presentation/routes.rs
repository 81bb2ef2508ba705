use crate::domain::records::{
    EmotionRecord, ExpenseRecord, HealthRecord, JournalEntry, Note, Recommendation, TaskRecord,
    UserRecord,
};
use crate::presentation::auth::{change_password, login, logout, me, signup, update_profile};
use crate::presentation::handlers::{
    AppContext, create_record, create_user_record, health_check, json_config, list_records,
    list_recommendations, query_config,
};
use crate::presentation::uploads::{fetch_upload, upload};
use crate::presentation::user_data::{
    add_finance_entry, add_goal, add_health_entry, add_task, dashboard, delete_task,
    finance_summary, list_finance_entries, list_goals, list_health_entries, list_tasks,
    update_goal, update_task,
};
use actix_web::web;

/// Registers shared state and every `/api` route.
pub fn configure(cfg: &mut web::ServiceConfig, ctx: &AppContext) {
    let records = &ctx.records;
    cfg.app_data(ctx.state.clone())
        .app_data(records.tasks.clone())
        .app_data(records.health.clone())
        .app_data(records.expenses.clone())
        .app_data(records.emotions.clone())
        .app_data(records.journal.clone())
        .app_data(records.notes.clone())
        .app_data(records.recommendations.clone())
        .app_data(records.users.clone())
        .app_data(json_config())
        .app_data(query_config())
        .service(
            web::scope("/api")
                .route("/health-check", web::get().to(health_check))
                // Record collections
                .route("/emotions", web::get().to(list_records::<EmotionRecord>))
                .route("/emotions", web::post().to(create_record::<EmotionRecord>))
                .route("/expenses", web::get().to(list_records::<ExpenseRecord>))
                .route("/expenses", web::post().to(create_record::<ExpenseRecord>))
                .route("/health", web::get().to(list_records::<HealthRecord>))
                .route("/health", web::post().to(create_record::<HealthRecord>))
                .route("/journal", web::get().to(list_records::<JournalEntry>))
                .route("/journal", web::post().to(create_record::<JournalEntry>))
                .route("/journal/get-all", web::get().to(list_records::<JournalEntry>))
                .route("/notes", web::get().to(list_records::<Note>))
                .route("/notes", web::post().to(create_record::<Note>))
                .route("/recommendations", web::get().to(list_recommendations))
                .route(
                    "/recommendations",
                    web::post().to(create_record::<Recommendation>),
                )
                .route("/tasks", web::get().to(list_records::<TaskRecord>))
                .route("/tasks", web::post().to(create_record::<TaskRecord>))
                .route("/users", web::get().to(list_records::<UserRecord>))
                .route("/users", web::post().to(create_user_record))
                // Uploads
                .route("/upload", web::post().to(upload))
                .route("/uploads/{name}", web::get().to(fetch_upload))
                // Authentication
                .route("/auth/signup", web::post().to(signup))
                .route("/auth/login", web::post().to(login))
                .route("/auth/logout", web::post().to(logout))
                .route("/auth/me", web::get().to(me))
                .route("/auth/profile", web::put().to(update_profile))
                .route("/auth/password", web::put().to(change_password))
                // Per-user data
                .route("/me/tasks", web::get().to(list_tasks))
                .route("/me/tasks", web::post().to(add_task))
                .route("/me/tasks/{id}", web::patch().to(update_task))
                .route("/me/tasks/{id}", web::delete().to(delete_task))
                .route("/me/health-entries", web::get().to(list_health_entries))
                .route("/me/health-entries", web::post().to(add_health_entry))
                .route("/me/finance-entries", web::get().to(list_finance_entries))
                .route("/me/finance-entries", web::post().to(add_finance_entry))
                .route(
                    "/me/finance-entries/summary",
                    web::get().to(finance_summary),
                )
                .route("/me/goals", web::get().to(list_goals))
                .route("/me/goals", web::post().to(add_goal))
                .route("/me/goals/{id}", web::patch().to(update_goal))
                .route("/me/dashboard", web::get().to(dashboard)),
        );
}
