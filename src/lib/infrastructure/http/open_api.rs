//! OpenAPI module

use utoipa::OpenApi;

use crate::{
    domain::contact::ContactForm,
    infrastructure::http::{errors::ErrorResponse, handlers::v1::*},
};

/// OpenAPI document for the API
#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "Contact Gateway"),
    paths(contact::handler, uptime::handler),
    components(schemas(
        ContactForm,
        contact::SendMessageResponse,
        uptime::UptimeResponse,
        ErrorResponse,
    ))
)]
pub struct ApiDocs;

#[cfg(test)]
mod tests {
    use axum_test::TestServer;
    use testresult::TestResult;

    use crate::infrastructure::http::{router, state::test_state};

    #[tokio::test]
    async fn test_openapi_document_lists_contact_endpoint() -> TestResult {
        let response = TestServer::new(router(test_state(None)))?
            .get("/api/v1/openapi.json")
            .await;

        response.assert_status_ok();

        let json = response.json::<serde_json::Value>();

        assert_eq!(json["info"]["title"], "Contact Gateway");
        assert!(json["paths"]["/api/v1/contact"]["post"].is_object());

        Ok(())
    }
}
