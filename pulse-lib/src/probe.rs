//! Execution of single probes.
//!
//! This module defines two structs, [`Prober`] and [`ProberBuilder`].
//! `Prober` sends one request per endpoint and records the outcome.
//! `ProberBuilder` exposes the knobs for building a `Prober`.
#![allow(clippy::module_name_repetitions)]

use std::time::{Duration, Instant};

use http::header::{self, HeaderMap, HeaderName, HeaderValue};
use log::{debug, warn};
use reqwest::{Method, Request, Response};
use typed_builder::TypedBuilder;
use url::Url;

use crate::{
    AdmissionGate, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, Endpoint, ErrorKind, MonitorConfig,
    ProbeStatus, Result, StatsAggregator,
};

/// Builder for [`Prober`].
#[derive(TypedBuilder, Debug, Clone)]
#[builder(field_defaults(default, setter(into)))]
#[builder(builder_method(doc = "
Create a builder for building `ProberBuilder`.

On the builder call, call methods with same name as its fields to set their values.

Finally, call `.build()` to create the instance of `ProberBuilder`.
"))]
pub struct ProberBuilder {
    /// Deadline per probe, measured from dispatch.
    ///
    /// `None` lets requests run for as long as the server takes.
    #[builder(default = Some(DEFAULT_TIMEOUT))]
    timeout: Option<Duration>,

    /// User-agent sent with every probe, unless the endpoint sets its own.
    #[builder(default_code = "String::from(DEFAULT_USER_AGENT)")]
    user_agent: String,

    /// When `true`, the bodies of non-2xx responses are read and logged.
    debug: bool,
}

impl Default for ProberBuilder {
    #[inline]
    fn default() -> Self {
        Self::builder().build()
    }
}

impl From<&MonitorConfig> for ProberBuilder {
    fn from(config: &MonitorConfig) -> Self {
        Self::builder()
            .timeout(config.effective_timeout())
            .user_agent(config.user_agent.clone())
            .debug(config.debug)
            .build()
    }
}

impl ProberBuilder {
    /// Instantiates a [`Prober`].
    ///
    /// # Errors
    ///
    /// Returns an `Err` if:
    /// - The user-agent is invalid.
    /// - The request client cannot be created.
    ///   See [here](https://docs.rs/reqwest/latest/reqwest/struct.ClientBuilder.html#errors).
    pub fn prober(self) -> Result<Prober> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            HeaderValue::from_str(&self.user_agent)
                .map_err(|_| ErrorKind::InvalidHeader(header::USER_AGENT.to_string()))?,
        );

        let client = reqwest::ClientBuilder::new()
            .gzip(true)
            .default_headers(headers)
            .build()
            .map_err(ErrorKind::BuildClient)?;

        Ok(Prober {
            client,
            timeout: self.timeout,
            debug: self.debug,
        })
    }
}

/// Sends probes and records their outcome.
///
/// The prober is cheap to clone; clones share the underlying connection pool.
///
/// See [`ProberBuilder`] which contains sane defaults for all configuration options.
#[derive(Debug, Clone)]
pub struct Prober {
    /// Underlying `reqwest` client instance that handles the HTTP requests.
    client: reqwest::Client,
    /// Deadline per probe.
    timeout: Option<Duration>,
    /// Read and log bodies of non-2xx responses.
    debug: bool,
}

impl Prober {
    /// Probe `endpoint` once and record the outcome in `stats`.
    ///
    /// A permit of `gate` is held while the request is in flight and given
    /// back before `stats` is updated. Counting follows these rules:
    ///
    /// - the domain's total is incremented exactly once, unless the method
    ///   or URL is unusable ([`ProbeStatus::Invalid`]); a URL without a
    ///   scheme or a malformed header is counted as a failure;
    /// - its success counter is incremented only for 2xx responses.
    ///
    /// Failures never propagate; they are logged and reflected in the
    /// returned status.
    pub async fn probe(
        &self,
        endpoint: &Endpoint,
        gate: &AdmissionGate,
        stats: &StatsAggregator,
    ) -> ProbeStatus {
        let request = match self.build_request(endpoint) {
            Ok(request) => request,
            Err(e) if e.fails_on_dispatch() => {
                debug!(
                    "{}, {} to {} failed: {e}",
                    endpoint.name, endpoint.method, endpoint.url
                );
                stats.record_probe(&endpoint.domain(), false);
                return ProbeStatus::Error(e);
            }
            Err(e) => {
                warn!(
                    "{}, {} to {}, error creating request: {e}",
                    endpoint.name, endpoint.method, endpoint.url
                );
                return ProbeStatus::Invalid(e);
            }
        };

        let (result, elapsed) = {
            let permit = match gate.acquire().await {
                Ok(permit) => permit,
                Err(e) => {
                    warn!("{}, {} to {}: {e}", endpoint.name, endpoint.method, endpoint.url);
                    return ProbeStatus::Invalid(e);
                }
            };
            let start = Instant::now();
            let result = self.client.execute(request).await;
            let elapsed = start.elapsed();
            permit.release();
            (result, elapsed)
        };
        debug!(
            "{}, {} to {} responded or was aborted in {elapsed:?}",
            endpoint.name, endpoint.method, endpoint.url
        );

        let (status, response) = match result {
            Ok(response) => (ProbeStatus::from_code(response.status()), Some(response)),
            Err(e) => (ProbeStatus::from_error(ErrorKind::NetworkRequest(e)), None),
        };

        stats.record_probe(&endpoint.domain(), status.is_success());

        match (&status, response) {
            (ProbeStatus::Up(_), _) => {
                debug!("{}, {} to {}: success", endpoint.name, endpoint.method, endpoint.url);
            }
            (ProbeStatus::Down(code), Some(response)) if self.debug => {
                debug!(
                    "{}, {} to {}, response {code}. Reading body...",
                    endpoint.name, endpoint.method, endpoint.url
                );
                log_body(endpoint, response).await;
            }
            (status, _) => {
                debug!(
                    "{}, {} to {} failed: {status}",
                    endpoint.name, endpoint.method, endpoint.url
                );
            }
        }

        status
    }

    /// Assemble the request for `endpoint` without sending it.
    fn build_request(&self, endpoint: &Endpoint) -> Result<Request> {
        let method = Method::from_bytes(endpoint.method.as_bytes())
            .map_err(|_| ErrorKind::InvalidMethod(endpoint.method.clone()))?;
        let url = Url::parse(&endpoint.url).map_err(|source| ErrorKind::InvalidUrl {
            url: endpoint.url.clone(),
            source,
        })?;

        let mut builder = self
            .client
            .request(method, url)
            .headers(endpoint_headers(endpoint)?);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if !endpoint.body.is_empty() {
            builder = builder.body(endpoint.body.clone());
        }

        builder.build().map_err(ErrorKind::BuildRequest)
    }
}

fn endpoint_headers(endpoint: &Endpoint) -> Result<HeaderMap> {
    let mut headers = HeaderMap::with_capacity(endpoint.headers.len());
    for (name, value) in &endpoint.headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ErrorKind::InvalidHeader(name.clone()))?;
        let header_value =
            HeaderValue::from_str(value).map_err(|_| ErrorKind::InvalidHeader(name.clone()))?;
        headers.insert(header_name, header_value);
    }
    Ok(headers)
}

/// Drain a failed response for debugging context. Stats have already been
/// recorded at this point, so a read failure only gets logged.
async fn log_body(endpoint: &Endpoint, response: Response) {
    match response.text().await {
        Ok(body) => debug!(
            "{}, {} to {}, body: {body}",
            endpoint.name, endpoint.method, endpoint.url
        ),
        Err(e) => debug!(
            "{}, {} to {}: {}",
            endpoint.name,
            endpoint.method,
            endpoint.url,
            ErrorKind::ReadResponseBody(e)
        ),
    }
}
