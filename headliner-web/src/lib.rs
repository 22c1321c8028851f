#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! Web server for [Headliner](../headliner/index.html)'s news proxy.
//!
//! Browsers cannot hold the news provider's credential, and the provider does
//! not allow cross-origin requests. This server accepts the same requests the
//! provider does, attaches the credential, and relays the provider's answer
//! unchanged.

mod dockerflow;
mod endpoints;
mod errors;
mod logging;

use actix_cors::Cors;
use actix_web::{
    dev::Server,
    get,
    web::{self, Data},
    App, HttpResponse, HttpServer,
};
use anyhow::{Context, Result};
use headliner_news::DirectTransport;
use headliner_settings::Settings;
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

pub use crate::errors::{HandlerError, HandlerErrorKind};
pub use crate::logging::HeadlinerRootSpanBuilder;

/// Run the web server
///
/// The returned server is a `Future` that must either be `.await`ed, or run it
/// as a background task using `tokio::spawn`.
///
/// Most of the details from `settings` will be respected, except for those that
/// go into building the listener (the host and port). If you want to respect the
/// settings specified in that object, you must include them in the construction
/// of `listener`.
///
/// # Errors
///
/// Returns an error if no upstream credential is configured, or if the server
/// cannot be started on the provided listener.
///
/// # Examples
///
/// Run the server in the foreground. This will only return if there is an error
/// that causes the server to shut down. This is used to run Headliner as a
/// service, such as in production.
///
/// ```no_run
/// # actix_rt::System::new().block_on(async {
/// let listener = std::net::TcpListener::bind("127.0.0.1:8080")
///     .expect("Failed to bind port");
/// let settings = headliner_settings::Settings::load()
///     .expect("Failed to load settings");
/// headliner_web::run(listener, settings)
///     .expect("Failed to start server")
///     .await
///     .expect("Fatal error while running server");
/// # })
/// ```
pub fn run(listener: TcpListener, settings: Settings) -> Result<Server> {
    let num_workers = settings.http.workers;
    let proxy_path = settings.proxy.path.clone();

    // The proxy talks to the provider exactly as a trusted client would.
    let upstream = Data::new(
        DirectTransport::new(&settings.upstream).context("Setting up the upstream transport")?,
    );
    let settings = Data::new(settings);

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(settings.clone())
            .app_data(upstream.clone())
            .wrap(TracingLogger::<HeadlinerRootSpanBuilder>::new())
            .wrap(cors())
            // The core functionality of Headliner
            .service(endpoints::news::resource(&proxy_path))
            .service(root_info)
            .service(web::scope("debug").configure(endpoints::debug::configure))
            // Add the behavior necessary to satisfy Dockerflow.
            .configure(dockerflow::configure)
    })
    .listen(listener)?;

    if let Some(n) = num_workers {
        server = server.workers(n);
    }

    Ok(server.run())
}

/// Any origin may read responses. Preflight requests are answered by the
/// proxy resource itself, so that a bare `OPTIONS` succeeds too.
fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .send_wildcard()
        .disable_preflight()
}

/// The root view, to provide information about what this service is.
///
/// This is intended to be seen by people trying to investigate what this service
/// is. It should redirect to documentation, if it is available, or provide a
/// short message otherwise.
#[get("/")]
async fn root_info(settings: Data<Settings>) -> HttpResponse {
    match &settings.public_documentation {
        Some(redirect_url) => HttpResponse::Found()
            .insert_header(("location", redirect_url.to_string()))
            .finish(),
        None => HttpResponse::Ok().content_type("text/plain").body(format!(
            "Headliner relays news searches to its provider. Send requests to {}.",
            settings.proxy.path
        )),
    }
}
