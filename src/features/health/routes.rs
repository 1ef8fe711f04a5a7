use axum::{routing::get, Router};

use crate::features::health::handler::health_check;

pub fn routes() -> Router {
    Router::new().route("/api/health", get(health_check))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_test::TestServer;
    use serde_json::Value;

    #[tokio::test]
    async fn test_health_check() {
        let server = TestServer::new(routes()).unwrap();

        let response = server.get("/api/health").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "ok");
    }
}
