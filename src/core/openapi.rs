use utoipa::{Modify, OpenApi};

use crate::features::files::{dtos as files_dtos, handlers as files_handlers};
use crate::features::health::handler as health_handler;
use crate::shared::types::ApiResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        // Files
        files_handlers::upload_file,
        files_handlers::list_files,
        files_handlers::download_file,
        files_handlers::delete_file,
        // Health
        health_handler::health_check,
    ),
    components(
        schemas(
            // Shared
            ApiResponse,
            // Files
            files_dtos::UploadFileDto,
            files_dtos::FileResponseDto,
            files_dtos::UploadFileResponseDto,
            files_dtos::FileListResponseDto,
            // Health
            health_handler::HealthResponseDto,
        )
    ),
    tags(
        (name = "files", description = "File upload, download and management"),
        (name = "health", description = "Service health"),
    ),
    info(
        title = "Berkas API",
        version = "0.1.0",
        description = "File upload and sharing API",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_file_routes() {
        let mut openapi = ApiDoc::openapi();
        SwaggerInfoModifier {
            title: "Test".to_string(),
            version: "9.9.9".to_string(),
            description: "desc".to_string(),
        }
        .modify(&mut openapi);

        assert_eq!(openapi.info.title, "Test");
        assert_eq!(openapi.info.version, "9.9.9");
        for path in [
            "/api/files/upload",
            "/api/files/",
            "/api/files/{filename}/download",
            "/api/files/{filename}",
            "/api/health",
        ] {
            assert!(openapi.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
