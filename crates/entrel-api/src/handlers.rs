//! HTTP request handlers.
//!
//! Person and company endpoints using axum. Domain failures are mapped to
//! status codes in [`ApiError`]; no-op relation edits answer 200 with a
//! message instead of the updated records.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router as AxumRouter,
};
use entrel_domain::traits::EntityRegistry;
use entrel_domain::{Company, DomainError, EntityId, OwnershipSnapshot, Person};
use entrel_service::{OwnershipCoordinator, OwnershipError, RelationChange, RelationService};
use entrel_store::{MemoryStore, StoreError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Registry of persons and companies
    pub store: Arc<MemoryStore>,
    /// Share purchases
    pub coordinator: OwnershipCoordinator<MemoryStore>,
    /// Relation edits
    pub relations: RelationService<MemoryStore>,
}

impl AppState {
    /// Build the services around a shared store
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self {
            coordinator: OwnershipCoordinator::new(Arc::clone(&store)),
            relations: RelationService::new(Arc::clone(&store)),
            store,
        }
    }
}

/// Body of create and rename requests
#[derive(Debug, Deserialize)]
pub struct EntityRequest {
    /// Entity id
    pub id: i64,
    /// Entity name
    pub name: String,
}

/// `?id=` query
#[derive(Debug, Deserialize)]
pub struct IdQuery {
    /// Entity id
    pub id: i64,
}

/// `?person1Id=&person2Id=` query
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationQuery {
    /// First person
    pub person1_id: i64,
    /// Second person
    pub person2_id: i64,
}

/// `?personId=&companyId=&percentage=` query
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonBuyQuery {
    /// Buying person
    pub person_id: i64,
    /// Target company
    pub company_id: i64,
    /// Requested percentage
    pub percentage: i64,
}

/// `?entityId=&companyId=&percentage=` query
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityBuyQuery {
    /// Buying person or company
    pub entity_id: i64,
    /// Target company
    pub company_id: i64,
    /// Requested percentage
    pub percentage: i64,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Overall health status
    pub status: String,
    /// Number of persons
    pub persons: usize,
    /// Number of companies
    pub companies: usize,
    /// Number of person-to-person relations
    pub relations: usize,
}

/// Informational response
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message text
    pub message: String,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A domain rule rejected the request
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The target company exists but cannot be bought as requested, or is missing
    #[error("Company {0} cannot be bought: it does not exist or not enough shares are available")]
    CannotBuy(EntityId),

    /// Internal server error
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Domain(DomainError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::Domain(DomainError::DuplicateId(_) | DomainError::RetainedOwnerId(_)) => {
                StatusCode::CONFLICT
            }
            ApiError::Domain(
                DomainError::InsufficientShares { .. }
                | DomainError::InvalidPercentage(_)
                | DomainError::SelfRelation(_)
                | DomainError::SelfOwnership(_),
            )
            | ApiError::CannotBuy(_) => StatusCode::BAD_REQUEST,
            ApiError::Domain(DomainError::InvariantViolation(_)) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!("Request failed: {}", self);
        }
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Domain(e) => ApiError::Domain(e),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<OwnershipError> for ApiError {
    fn from(e: OwnershipError) -> Self {
        match e {
            OwnershipError::Domain(e) => ApiError::Domain(e),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

fn message(text: String) -> Response {
    Json(MessageResponse { message: text }).into_response()
}

fn relation_response(change: RelationChange, already: String) -> Response {
    if change.changed {
        Json(change.persons).into_response()
    } else {
        message(already)
    }
}

/// POST /person - Register a person
async fn create_person(
    State(state): State<AppState>,
    Json(request): Json<EntityRequest>,
) -> ApiResult<Person> {
    let person = state.store.create_person(EntityId::new(request.id), &request.name)?;
    Ok(Json(person))
}

/// GET /person - List all persons
async fn list_persons(State(state): State<AppState>) -> ApiResult<Vec<Person>> {
    Ok(Json(state.store.list_persons()?))
}

/// GET /person/:id - Get one person
async fn get_person(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Person> {
    let id = EntityId::new(id);
    let person = state
        .store
        .get_person(id)?
        .ok_or_else(|| DomainError::person_not_found(id))?;
    Ok(Json(person))
}

/// PUT /person - Rename a person
async fn update_person(
    State(state): State<AppState>,
    Json(request): Json<EntityRequest>,
) -> ApiResult<Person> {
    let person = state
        .store
        .update_person_name(EntityId::new(request.id), &request.name)?;
    Ok(Json(person))
}

/// DELETE /person?id= - Delete a person and their relations
async fn delete_person(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<Response, ApiError> {
    state.store.delete_person(EntityId::new(query.id))?;
    Ok(message(format!("person with id {} was successfully deleted.", query.id)))
}

/// POST /person/CreateRelations?person1Id=&person2Id=
async fn create_relations(
    State(state): State<AppState>,
    Query(query): Query<RelationQuery>,
) -> Result<Response, ApiError> {
    let change = state.relations.establish(
        EntityId::new(query.person1_id),
        EntityId::new(query.person2_id),
    )?;
    Ok(relation_response(
        change,
        format!(
            "Relationship between {} and {} was already set",
            query.person1_id, query.person2_id
        ),
    ))
}

/// POST /person/DeleteRelations?person1Id=&person2Id=
async fn delete_relations(
    State(state): State<AppState>,
    Query(query): Query<RelationQuery>,
) -> Result<Response, ApiError> {
    let change = state.relations.dissolve(
        EntityId::new(query.person1_id),
        EntityId::new(query.person2_id),
    )?;
    Ok(relation_response(
        change,
        format!(
            "Relationship between {} and {} already non existent",
            query.person1_id, query.person2_id
        ),
    ))
}

/// POST /person/buyCompany?personId=&companyId=&percentage= - Buy as a person
async fn person_buy_company(
    State(state): State<AppState>,
    Query(query): Query<PersonBuyQuery>,
) -> ApiResult<OwnershipSnapshot> {
    let buyer = EntityId::new(query.person_id);
    if state.store.get_person(buyer)?.is_none() {
        return Err(DomainError::person_not_found(buyer).into());
    }
    buy(&state, buyer, EntityId::new(query.company_id), query.percentage)
}

/// POST /company - Register a company
async fn create_company(
    State(state): State<AppState>,
    Json(request): Json<EntityRequest>,
) -> ApiResult<Company> {
    let company = state.store.create_company(EntityId::new(request.id), &request.name)?;
    Ok(Json(company))
}

/// GET /company - List all companies
async fn list_companies(State(state): State<AppState>) -> ApiResult<Vec<Company>> {
    Ok(Json(state.store.list_companies()?))
}

/// GET /company/:id - Get one company
async fn get_company(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Company> {
    let id = EntityId::new(id);
    let company = state
        .store
        .get_company(id)?
        .ok_or_else(|| DomainError::company_not_found(id))?;
    Ok(Json(company))
}

/// PUT /company - Rename a company
async fn update_company(
    State(state): State<AppState>,
    Json(request): Json<EntityRequest>,
) -> ApiResult<Company> {
    let company = state
        .store
        .update_company_name(EntityId::new(request.id), &request.name)?;
    Ok(Json(company))
}

/// DELETE /company?id= - Delete a company
async fn delete_company(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<Response, ApiError> {
    state.store.delete_company(EntityId::new(query.id))?;
    Ok(message(format!("Company {} deleted", query.id)))
}

/// POST /company/buyCompany?entityId=&companyId=&percentage= - Buy as any entity
async fn entity_buy_company(
    State(state): State<AppState>,
    Query(query): Query<EntityBuyQuery>,
) -> ApiResult<OwnershipSnapshot> {
    buy(
        &state,
        EntityId::new(query.entity_id),
        EntityId::new(query.company_id),
        query.percentage,
    )
}

fn buy(
    state: &AppState,
    buyer: EntityId,
    company: EntityId,
    percentage: i64,
) -> ApiResult<OwnershipSnapshot> {
    state
        .coordinator
        .buy(buyer, company, percentage)?
        .map(Json)
        .ok_or(ApiError::CannotBuy(company))
}

/// GET /health - Liveness and record counts
async fn health_check(State(state): State<AppState>) -> Result<Json<HealthCheckResponse>, ApiError> {
    let stats = state.store.stats()?;
    Ok(Json(HealthCheckResponse {
        status: "healthy".to_string(),
        persons: stats.persons,
        companies: stats.companies,
        relations: stats.relations,
    }))
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> AxumRouter {
    AxumRouter::new()
        .route(
            "/person",
            get(list_persons)
                .post(create_person)
                .put(update_person)
                .delete(delete_person),
        )
        .route("/person/:id", get(get_person))
        .route("/person/CreateRelations", post(create_relations))
        .route("/person/DeleteRelations", post(delete_relations))
        .route("/person/buyCompany", post(person_buy_company))
        .route(
            "/company",
            get(list_companies)
                .post(create_company)
                .put(update_company)
                .delete(delete_company),
        )
        .route("/company/:id", get(get_company))
        .route("/company/buyCompany", post(entity_buy_company))
        .route("/health", get(health_check))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt; // for oneshot

    fn create_test_state() -> AppState {
        AppState::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = create_router(create_test_state());

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_error_status_mapping() {
        let id = EntityId::new(1);
        assert_eq!(
            ApiError::from(DomainError::person_not_found(id)).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(DomainError::DuplicateId(id)).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(DomainError::RetainedOwnerId(id)).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(DomainError::InvalidPercentage(0)).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::CannotBuy(id).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::from(StoreError::LockPoisoned).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
