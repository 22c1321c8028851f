//! The news proxy. Requests arrive in the shape the provider expects, plus an
//! `endpoint` parameter, and leave with the credential attached.

use actix_web::{
    http::{header, Method, StatusCode},
    web::{self, Data},
    HttpRequest, HttpResponse, Resource,
};
use headliner_news::{DirectTransport, NewsTransport, ProxyQuery, UpstreamQuery};

use crate::errors::{HandlerError, HandlerErrorKind, ALLOWED_METHODS};

/// The content type used when the provider does not declare one.
const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// The proxy resource, mounted at `path`.
pub fn resource(path: &str) -> Resource {
    web::resource(path)
        .route(web::get().to(forward))
        .route(web::method(Method::OPTIONS).to(preflight))
        .default_service(web::to(method_not_allowed))
}

/// Relay a request to the provider and its response back, unchanged.
#[tracing::instrument(skip(request, upstream))]
async fn forward(
    request: HttpRequest,
    upstream: Data<DirectTransport>,
) -> Result<HttpResponse, HandlerError> {
    let query: UpstreamQuery = ProxyQuery::from_query_string(request.query_string())
        .map_err(|error| {
            tracing::info!(
                r#type = "web.news.rejected",
                %error,
                "Rejected proxy request"
            );
            error
        })?
        .into();

    tracing::debug!(
        r#type = "web.news.forwarding",
        endpoint = %query.endpoint,
        params = ?query.param_names(),
        "Forwarding proxy request"
    );

    let response = upstream.send(&query).await.map_err(|error| {
        tracing::error!(
            r#type = "web.news.upstream-failed",
            kind = %error.kind(),
            ?error,
            "Error forwarding to the news service"
        );
        error
    })?;

    let status = StatusCode::from_u16(response.status).map_err(|error| {
        tracing::error!(
            r#type = "web.news.invalid-status",
            %error,
            status = response.status,
            "The news service answered with an invalid status"
        );
        HandlerError::internal()
    })?;

    tracing::debug!(
        r#type = "web.news.forwarded",
        status = response.status,
        "Forwarded proxy request"
    );

    Ok(HttpResponse::build(status)
        .content_type(
            response
                .content_type
                .as_deref()
                .unwrap_or(DEFAULT_CONTENT_TYPE),
        )
        .body(response.body))
}

/// Answer preflight requests, including ones that do not say what they want.
async fn preflight() -> HttpResponse {
    HttpResponse::Ok()
        .insert_header((header::ACCESS_CONTROL_ALLOW_METHODS, ALLOWED_METHODS))
        .insert_header((header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"))
        .finish()
}

/// Everything but `GET` and `OPTIONS`.
async fn method_not_allowed() -> Result<HttpResponse, HandlerError> {
    Err(HandlerErrorKind::MethodNotAllowed.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{body::to_bytes, test, App};
    use headliner_settings::Settings;
    use httpmock::MockServer;
    use pretty_assertions::assert_eq;
    use std::{
        io::Write,
        sync::{Arc, Mutex},
    };

    /// Collects formatted log lines.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLogs {
        fn write(&mut self, bytes: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(bytes);
            Ok(bytes.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    /// Test settings, whose provider can never be reached.
    fn unreachable_settings() -> Settings {
        Settings::load_for_tests(|_| ())
    }

    #[actix_rt::test]
    async fn options_is_an_empty_success() {
        let settings = unreachable_settings();
        let upstream = Data::new(DirectTransport::new(&settings.upstream).unwrap());
        let app =
            test::init_service(App::new().app_data(upstream).service(resource("/api/news")))
                .await;

        let request = test::TestRequest::default()
            .method(Method::OPTIONS)
            .uri("/api/news")
            .to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_METHODS)
                .unwrap(),
            "GET, OPTIONS"
        );
        let body = to_bytes(response.into_body()).await.unwrap();
        assert!(body.is_empty());
    }

    #[actix_rt::test]
    async fn other_methods_are_not_allowed() {
        let settings = unreachable_settings();
        let upstream = Data::new(DirectTransport::new(&settings.upstream).unwrap());
        let app =
            test::init_service(App::new().app_data(upstream).service(resource("/api/news")))
                .await;

        for method in [Method::POST, Method::PUT, Method::DELETE, Method::PATCH] {
            let request = test::TestRequest::default()
                .method(method.clone())
                .uri("/api/news?endpoint=everything&q=foo")
                .to_request();
            let response = test::call_service(&app, request).await;
            assert_eq!(
                response.status(),
                StatusCode::METHOD_NOT_ALLOWED,
                "method {}",
                method
            );
            assert_eq!(response.headers().get(header::ALLOW).unwrap(), "GET, OPTIONS");
        }
    }

    #[actix_rt::test]
    async fn unknown_endpoints_are_rejected() {
        let settings = unreachable_settings();
        let upstream = Data::new(DirectTransport::new(&settings.upstream).unwrap());
        let app =
            test::init_service(App::new().app_data(upstream).service(resource("/api/news")))
                .await;

        for uri in ["/api/news?endpoint=unknown", "/api/news?q=foo", "/api/news"] {
            let request = test::TestRequest::get().uri(uri).to_request();
            let response = test::call_service(&app, request).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "uri {}", uri);
        }
    }

    #[actix_rt::test]
    async fn unreachable_provider_is_a_network_error() {
        let settings = unreachable_settings();
        let upstream = Data::new(DirectTransport::new(&settings.upstream).unwrap());
        let app =
            test::init_service(App::new().app_data(upstream).service(resource("/api/news")))
                .await;

        let request = test::TestRequest::get()
            .uri("/api/news?endpoint=top-headlines&country=us")
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers().get("X-Headliner-Error").unwrap(),
            "network_error"
        );
    }

    #[actix_rt::test]
    async fn forwarding_never_logs_the_credential() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let provider = MockServer::start_async().await;
        let mock = provider
            .mock_async(|when, then| {
                when.path("/v2/everything")
                    .query_param("q", "foo")
                    .header("X-Api-Key", "test-api-key");
                then.status(200).body(r#"{"status":"ok","articles":[]}"#);
            })
            .await;
        let settings = Settings::load_for_tests(|settings| {
            settings.upstream.base_url = provider.base_url().parse().unwrap();
        });
        let upstream = Data::new(DirectTransport::new(&settings.upstream).unwrap());
        let app =
            test::init_service(App::new().app_data(upstream).service(resource("/api/news")))
                .await;

        let request = test::TestRequest::get()
            .uri("/api/news?endpoint=everything&q=foo")
            .to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        mock.assert_async().await;
        let logs = logs.text();
        assert!(logs.contains("Forwarding proxy request"), "logs: {}", logs);
        assert!(!logs.contains("test-api-key"), "logs: {}", logs);
    }
}
