use crate::application::auth_service::AuthService;
use crate::application::data_store::DataStore;
use crate::application::record_service::RecordService;
use crate::data::record_repository::KeyValueRecordRepository;
use crate::domain::error::DomainError;
use crate::domain::records::{
    EmotionRecord, ExpenseRecord, HealthRecord, JournalEntry, Note, Recommendation, Record,
    TaskRecord, UserDraft, UserRecord,
};
use crate::domain::repository::{KeyValueStore, UploadStore};
use crate::infrastructure::config::Config;
use crate::infrastructure::security::hash_password;
use actix_web::{HttpResponse, ResponseError, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

/// Services shared by every worker.
pub struct AppState {
    pub auth_service: Arc<AuthService<dyn KeyValueStore>>,
    pub data_store: Arc<DataStore<dyn KeyValueStore>>,
    pub uploads: Arc<dyn UploadStore>,
    pub max_upload_bytes: usize,
}

/// One service per `/api/<resource>` record kind, registered by type.
#[derive(Clone)]
pub struct RecordServices {
    pub tasks: web::Data<RecordService<TaskRecord>>,
    pub health: web::Data<RecordService<HealthRecord>>,
    pub expenses: web::Data<RecordService<ExpenseRecord>>,
    pub emotions: web::Data<RecordService<EmotionRecord>>,
    pub journal: web::Data<RecordService<JournalEntry>>,
    pub notes: web::Data<RecordService<Note>>,
    pub recommendations: web::Data<RecordService<Recommendation>>,
    pub users: web::Data<RecordService<UserRecord>>,
}

impl RecordServices {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            tasks: record_service(&store),
            health: record_service(&store),
            expenses: record_service(&store),
            emotions: record_service(&store),
            journal: record_service(&store),
            notes: record_service(&store),
            recommendations: record_service(&store),
            users: record_service(&store),
        }
    }
}

fn record_service<T: Record>(store: &Arc<dyn KeyValueStore>) -> web::Data<RecordService<T>> {
    let repository = KeyValueRecordRepository::<T, dyn KeyValueStore>::new(store.clone());
    web::Data::new(RecordService::new(Arc::new(repository)))
}

/// Everything the routes need, cheap to clone into each worker.
#[derive(Clone)]
pub struct AppContext {
    pub state: web::Data<AppState>,
    pub records: RecordServices,
}

impl AppContext {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        uploads: Arc<dyn UploadStore>,
        config: &Config,
    ) -> Self {
        let auth_service = AuthService::new(
            store.clone(),
            config.jwt_secret.clone(),
            config.token_ttl_secs,
        );
        let state = AppState {
            auth_service: Arc::new(auth_service),
            data_store: Arc::new(DataStore::new(store.clone())),
            uploads,
            max_upload_bytes: config.max_upload_bytes,
        };
        Self {
            state: web::Data::new(state),
            records: RecordServices::new(store),
        }
    }
}

// Uniform error response format
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    details: serde_json::Value,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn message(&self) -> &str {
        match self {
            ApiError::Validation(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Database(msg)
            | ApiError::Internal(msg) => msg,
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        match self {
            ApiError::Validation(_) => actix_web::http::StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => actix_web::http::StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => actix_web::http::StatusCode::CONFLICT,
            ApiError::Unauthorized(_) => actix_web::http::StatusCode::UNAUTHORIZED,
            ApiError::Database(_) => actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_msg = self.to_string();

        // Log error based on severity
        match self {
            ApiError::Validation(_) => {
                warn!(error = %error_msg, status = %status, "Validation error")
            }
            ApiError::NotFound(_) => {
                warn!(error = %error_msg, status = %status, "Resource not found")
            }
            ApiError::Conflict(_) => {
                warn!(error = %error_msg, status = %status, "Conflict")
            }
            ApiError::Unauthorized(_) => {
                warn!(error = %error_msg, status = %status, "Unauthorized")
            }
            ApiError::Database(_) => {
                error!(error = %error_msg, status = %status, "Database error")
            }
            ApiError::Internal(_) => {
                error!(error = %error_msg, status = %status, "Internal error")
            }
        }

        let error_response = ErrorResponse {
            error: error_msg,
            details: serde_json::json!({ "message": self.message() }),
        };

        HttpResponse::build(status).json(error_response)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => ApiError::Validation(msg),
            DomainError::NotFound(msg) => ApiError::NotFound(msg),
            DomainError::Conflict(msg) => ApiError::Conflict(msg),
            DomainError::Unauthorized(msg) => ApiError::Unauthorized(msg),
            DomainError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<DomainError>() {
            Ok(domain) => ApiError::from(domain),
            Err(err) => ApiError::Database(format!("{:#}", err)),
        }
    }
}

/// Malformed bodies become a 400 in the uniform error format.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        ApiError::Validation(format!("Invalid JSON body: {}", err)).into()
    })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        ApiError::Validation(format!("Invalid query string: {}", err)).into()
    })
}

// Handlers

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    timestamp: String,
}

#[instrument]
pub async fn health_check() -> HttpResponse {
    info!("Health check requested");
    let response = HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    };
    HttpResponse::Ok().json(response)
}

#[instrument(skip(service), fields(resource = T::RESOURCE))]
pub async fn list_records<T: Record>(
    service: web::Data<RecordService<T>>,
) -> Result<HttpResponse, ApiError> {
    let records = service.list().await.map_err(|e| {
        error!(error = %e, "Failed to list records");
        e
    })?;
    info!(count = records.len(), "Records listed");
    Ok(HttpResponse::Ok().json(records))
}

#[instrument(skip(service, draft), fields(resource = T::RESOURCE))]
pub async fn create_record<T: Record>(
    service: web::Data<RecordService<T>>,
    draft: web::Json<T::Draft>,
) -> Result<HttpResponse, ApiError> {
    let record = service.append(draft.into_inner()).await.map_err(|e| {
        error!(error = %e, "Failed to create record");
        e
    })?;
    info!(record_id = %record.id(), "Record created");
    Ok(HttpResponse::Ok().json(record))
}

#[instrument(skip(service))]
pub async fn list_recommendations(
    service: web::Data<RecordService<Recommendation>>,
) -> Result<HttpResponse, ApiError> {
    let recommendations = service.list_with_built_ins().await?;
    info!(count = recommendations.len(), "Recommendations listed");
    Ok(HttpResponse::Ok().json(recommendations))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUserRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Pre-hashed passwords are refused; only the server hashes.
    #[serde(default)]
    pub password_hash: Option<serde_json::Value>,
}

/// `POST /api/users`: the submitted password is hashed before it is stored.
#[instrument(skip(service, req))]
pub async fn create_user_record(
    service: web::Data<RecordService<UserRecord>>,
    req: web::Json<NewUserRecord>,
) -> Result<HttpResponse, ApiError> {
    let req = req.into_inner();
    if req.password_hash.is_some() {
        return Err(ApiError::Validation(
            "passwordHash is not accepted; send password instead".to_string(),
        ));
    }

    let password_hash = match req.password {
        Some(password) => Some(hash_password(&password).map_err(|e| {
            error!(error = %e, "Failed to hash password");
            ApiError::Internal(format!("Failed to hash password: {}", e))
        })?),
        None => None,
    };

    let record = service
        .append(UserDraft {
            name: req.name,
            email: req.email,
            password_hash,
        })
        .await?;
    info!(record_id = %record.id, "User record created");
    Ok(HttpResponse::Ok().json(record))
}
