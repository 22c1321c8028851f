//! Tools for running tests

use crate::utils::logging::LogWatcher;
use headliner_settings::Settings;
use httpmock::MockServer;
use reqwest::{redirect, Client, ClientBuilder, Method, RequestBuilder};
use std::{future::Future, net::TcpListener};
use tracing_futures::{Instrument, WithSubscriber};
use tracing_subscriber::{fmt::MakeWriter, layer::SubscriberExt};

/// Run a test with a fully configured Headliner server.
///
/// The server will listen on a port assigned arbitrarily by the OS, and will
/// send every request for news to a mock server.
///
/// A suite of tools will be passed to the test function in the form of an
/// instance of [`TestingTools`]. It includes an HTTP client configured to use
/// the test server, the mock news service, the settings the server runs with,
/// and a log collector that can make assertions about logs that were printed.
///
/// # Example
///
/// ```
/// # use headliner_integration_tests::{headliner_test, TestingTools};
/// #[actix_rt::test]
/// async fn a_test() {
///     headliner_test(
///         |settings| settings.public_documentation = None,
///         |TestingTools { test_client, mut log_watcher, .. }| async move {
///             assert!(true) // Test goes here
///         }
///     ).await
/// }
/// ```
///
/// # Panics
/// May panic if tests could not be set up correctly.
pub async fn headliner_test<FSettings, FTest, Fut>(
    settings_changer: FSettings,
    test: FTest,
) -> Fut::Output
where
    FSettings: FnOnce(&mut Settings),
    FTest: Fn(TestingTools) -> Fut,
    Fut: Future,
{
    let test_span = tracing::info_span!("headliner_test");

    // Load settings
    let mut settings = Settings::load_for_tests(|_| ());

    // Set up logging
    let log_watcher = LogWatcher::default();
    let log_watcher_writer = log_watcher.make_writer();

    let env_filter: tracing_subscriber::EnvFilter = (&settings.logging.levels).into();
    let tracing_subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(move || log_watcher_writer.clone()),
        )
        .with(tracing_subscriber::fmt::layer().pretty().with_test_writer());

    let _tracing_subscriber_guard = tracing::subscriber::set_default(tracing_subscriber);

    // Set up a mock server for the proxy to send requests to
    let upstream_mock = MockServer::start_async().await;
    settings.upstream.base_url = upstream_mock
        .base_url()
        .parse()
        .expect("Mock server URL was invalid");

    settings_changer(&mut settings);

    // Run server in the background
    let listener = TcpListener::bind(settings.http.listen).expect("Failed to bind to a port");
    let address = listener.local_addr().unwrap().to_string();
    settings.client.proxy_url = format!("http://{}{}", address, settings.proxy.path)
        .parse()
        .expect("Proxy URL was invalid");

    let server = headliner_web::run(listener, settings.clone()).expect("Failed to start server");
    let server_handle = tokio::spawn(server.with_current_subscriber());
    let test_client = TestReqwestClient::new(address);

    // Assemble the tools
    let tools = TestingTools {
        test_client,
        upstream_mock,
        settings,
        log_watcher,
    };
    // Run the test
    let rv = test(tools).instrument(test_span).await;
    server_handle.abort();
    rv
}

/// A set of tools for tests, including mock servers and logging helpers.
///
/// The fields of this struct are marked as non-exhaustive, meaning that any
/// destructuring of this struct will require a `..` "and the rest" entry, even
/// if all present items are named. This makes adding tools in the future easier,
/// since old tests won't need to be rewritten to account for the added tools.
#[non_exhaustive]
pub struct TestingTools {
    /// A wrapper around a `reqwest::client` that automatically uses the
    /// Headliner server under test.
    pub test_client: TestReqwestClient,

    /// A [`httpmock::MockServer`] that the proxy sends requests for news to.
    /// Does not contain mock responses, any needed must be added.
    pub upstream_mock: MockServer,

    /// The settings the server is running with. `client.proxy_url` points at
    /// the server, so a proxied `NewsClient` built from these settings goes
    /// through it.
    pub settings: Settings,

    /// To make assertions about logs.
    pub log_watcher: LogWatcher,
}

/// A wrapper around a `[reqwest::client]` that automatically sends requests to
/// the test server.
///
/// The client is configured to not follow any redirects.
pub struct TestReqwestClient {
    /// The wrapped client.
    client: Client,

    /// The server address to implicitly use for all requests.
    address: String,
}

impl TestReqwestClient {
    /// Construct a new test client that uses `address` for every request given.
    pub fn new(address: String) -> Self {
        let client = ClientBuilder::new()
            .redirect(redirect::Policy::none())
            .build()
            .expect("Could not build test client");
        Self { client, address }
    }

    /// Start building a GET request to the test server with the path specified.
    ///
    /// The path should start with `/`, such as `/__heartbeat__`.
    pub fn get(&self, path: &str) -> RequestBuilder {
        self.request(Method::GET, path)
    }

    /// Start building a request with any method to the test server.
    ///
    /// The path should start with `/`, such as `/api/news`.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        assert!(path.starts_with('/'));
        let url = format!("http://{}{}", &self.address, path);
        self.client.request(method, url)
    }
}
