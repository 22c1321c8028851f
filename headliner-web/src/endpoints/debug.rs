//! An actix-web service to introspect Headliner if the `debug` setting is
//! enabled. The handlers here should all verify that debug is enabled.

use actix_web::{
    get,
    web::{self, Data},
    HttpResponse,
};
use headliner_settings::Settings;

/// Handles the debug endpoints.
pub fn configure(config: &mut web::ServiceConfig) {
    config.service(settings);
}

/// In debug mode, show the settings of the app. The credential is redacted.
#[get("settings")]
async fn settings(settings: Data<Settings>) -> HttpResponse {
    if settings.debug {
        HttpResponse::Ok().json(settings)
    } else {
        HttpResponse::NotFound().body("")
    }
}
