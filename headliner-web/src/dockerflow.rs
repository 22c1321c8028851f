//! An actix-web service to implement [Dockerflow](https://github.com/mozilla-services/Dockerflow).

use actix_web::{
    get,
    web::{self, Data},
    HttpResponse,
};
use headliner_settings::Settings;
use serde::Serialize;

use crate::errors::HandlerError;

/// Handles required Dockerflow Endpoints.
pub fn configure(config: &mut web::ServiceConfig) {
    config
        .service(lbheartbeat)
        .service(heartbeat)
        .service(version)
        .service(test_error);
}

/// Used by the load balancer to indicate that the server can respond to
/// requests. Should just return OK.
#[get("/__lbheartbeat__")]
async fn lbheartbeat() -> HttpResponse {
    HttpResponse::Ok().body("")
}

/// Return the contents of the `version.json` file created by CI and stored
/// in the Docker root (or the TBD version stored in the repository).
#[get("/__version__")]
async fn version() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("application/json")
        .body(include_str!("../version.json"))
}

/// The body of `__heartbeat__`.
#[derive(Debug, Serialize)]
struct Heartbeat {
    /// The version of this crate.
    version: &'static str,
    /// Whether the proxy has a credential to give the provider.
    credential_configured: bool,
}

/// Returns a status message indicating the current state of the server.
#[get("/__heartbeat__")]
async fn heartbeat(settings: Data<Settings>) -> HttpResponse {
    HttpResponse::Ok().json(Heartbeat {
        version: env!("CARGO_PKG_VERSION"),
        credential_configured: settings.api_key_configured(),
    })
}

/// Returning an API error to test error handling.
#[get("/__error__")]
async fn test_error() -> Result<HttpResponse, HandlerError> {
    Err(HandlerError::internal())
}
