use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponseDto {
    #[schema(example = "ok")]
    pub status: String,
    pub message: String,
}

/// Liveness check
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is running", body = HealthResponseDto)
    )
)]
pub async fn health_check() -> Json<HealthResponseDto> {
    Json(HealthResponseDto {
        status: "ok".to_string(),
        message: "File sharing API is running".to_string(),
    })
}
