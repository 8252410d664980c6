//! `test-utils` is used for testing in both `pulse-lib` and `pulse-bin`.
//! This crate does not depend on `pulse-lib` or `pulse-bin`, else we would get dependency cycles.
//! Macros are used instead, so that the importer is responsible for providing the dependencies.

/// Create a mock web server, which responds with a predefined status to
/// every request, regardless of method and path
#[macro_export]
macro_rules! mock_server {
    ($status:expr $(, $func:tt ($($arg:expr),*))*) => {{
        let mock_server = wiremock::MockServer::start().await;
        let response_template = wiremock::ResponseTemplate::new(http::StatusCode::from($status));
        let template = response_template$(.$func($($arg),*))*;
        wiremock::Mock::given(wiremock::matchers::any()).respond_with(template).mount(&mock_server).await;
        mock_server
    }};
}

/// Mount a route on an existing mock server, answering `GET <path>` with
/// the given status
#[macro_export]
macro_rules! mock_route {
    ($mock_server:expr, $path:expr, $status:expr $(, $func:tt ($($arg:expr),*))*) => {{
        let response_template = wiremock::ResponseTemplate::new(http::StatusCode::from($status));
        let template = response_template$(.$func($($arg),*))*;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path($path))
            .respond_with(template)
            .mount(&$mock_server)
            .await;
    }};
}

/// Write an endpoint list to a temporary YAML file.
///
/// Returns the `NamedTempFile`; the file is deleted once it is dropped.
#[macro_export]
macro_rules! endpoints_file {
    ($yaml:expr) => {{
        use std::io::Write;
        let mut file = tempfile::Builder::new()
            .suffix(".yaml")
            .tempfile()
            .expect("Couldn't create endpoint file");
        file.write_all($yaml.as_bytes())
            .expect("Couldn't write endpoint file");
        file
    }};
}

/// Get the path to the `fixtures` directory.
#[macro_export]
macro_rules! fixtures_path {
    () => {
        std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .parent()
            .unwrap()
            .join("fixtures")
    };
}

/// Loads a fixture from the `fixtures` directory
#[macro_export]
macro_rules! load_fixture {
    ($filename:expr) => {{
        let path = fixtures_path!().join($filename);
        std::fs::read_to_string(path).unwrap()
    }};
}
