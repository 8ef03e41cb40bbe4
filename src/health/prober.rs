// src/health/prober.rs
use super::ProbeOutcome;
use crate::config::PollingConfig;
use async_trait::async_trait;
use futures::future::poll_fn;
use hyper::client::conn;
use hyper::client::HttpConnector;
use hyper::header::{HOST, USER_AGENT};
use hyper::service::Service;
use hyper::{Body, Request, StatusCode, Uri};
use hyper_tls::native_tls::TlsConnector;
use hyper_tls::{HttpsConnector, MaybeHttpsStream};
use tokio::net::TcpStream;
use tokio::time::{timeout, Duration};
use tracing::{debug, trace};
use url::Url;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Anything that can answer "is the target up right now".
///
/// The return type carries no error: every failure is already folded into
/// [`ProbeOutcome::Down`] by the implementation.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self) -> ProbeOutcome;
}

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("Failed to create TLS connector: {0}")]
    Client(#[source] hyper_tls::native_tls::Error),

    #[error("Invalid endpoint URI: {0}")]
    Uri(#[from] hyper::http::uri::InvalidUri),

    #[error("Connection failed: {0}")]
    Connect(#[source] BoxError),

    #[error("Connection not established within {0:?}")]
    ConnectTimeout(Duration),

    #[error("Failed to build request: {0}")]
    Build(#[from] hyper::http::Error),

    #[error("Request failed: {0}")]
    Request(#[source] hyper::Error),

    #[error("No response within {0:?} after connecting")]
    ReadTimeout(Duration),
}

/// Plain HTTP GET prober for a single endpoint.
///
/// The two phases are timed separately: DNS, TCP and TLS setup must finish
/// within `connect_timeout`, then the response head must arrive within
/// `read_timeout`.
#[derive(Debug, Clone)]
pub struct HttpProber {
    endpoint: Url,
    uri: Uri,
    connector: HttpsConnector<HttpConnector>,
    connect_timeout: Duration,
    read_timeout: Duration,
}

impl HttpProber {
    pub fn new(endpoint: Url, polling: &PollingConfig) -> Result<Self, ProbeError> {
        Self::with_timeouts(endpoint, polling.connect_timeout(), polling.read_timeout())
    }

    pub fn with_timeouts(
        endpoint: Url,
        connect_timeout: Duration,
        read_timeout: Duration,
    ) -> Result<Self, ProbeError> {
        let uri: Uri = endpoint.as_str().parse()?;

        let mut http = HttpConnector::new();
        http.enforce_http(false);
        http.set_nodelay(true);
        let tls = TlsConnector::new().map_err(ProbeError::Client)?;
        let connector = HttpsConnector::from((http, tls.into()));

        Ok(Self {
            endpoint,
            uri,
            connector,
            connect_timeout,
            read_timeout,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn connect(&self) -> Result<MaybeHttpsStream<TcpStream>, ProbeError> {
        let mut connector = self.connector.clone();
        poll_fn(|cx| connector.poll_ready(cx))
            .await
            .map_err(ProbeError::Connect)?;
        connector
            .call(self.uri.clone())
            .await
            .map_err(ProbeError::Connect)
    }

    fn request(&self) -> Result<Request<Body>, ProbeError> {
        let target = self
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        let host = match (self.endpoint.host_str(), self.endpoint.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => String::new(),
        };

        Ok(Request::get(target)
            .header(HOST, host)
            .header(USER_AGENT, concat!("ping-tray/", env!("CARGO_PKG_VERSION")))
            .body(Body::empty())?)
    }

    /// Issue one GET and return the status code. The body is never read.
    pub async fn check(&self) -> Result<StatusCode, ProbeError> {
        let request = self.request()?;

        let stream = timeout(self.connect_timeout, self.connect())
            .await
            .map_err(|_| ProbeError::ConnectTimeout(self.connect_timeout))??;

        // The read timer starts only once the connection is up.
        let (mut sender, connection) = conn::handshake(stream)
            .await
            .map_err(ProbeError::Request)?;
        let driver = tokio::spawn(connection);

        let response = timeout(self.read_timeout, sender.send_request(request)).await;
        driver.abort();

        let response = response
            .map_err(|_| ProbeError::ReadTimeout(self.read_timeout))?
            .map_err(ProbeError::Request)?;

        Ok(response.status())
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self) -> ProbeOutcome {
        match self.check().await {
            Ok(status) => {
                let outcome = ProbeOutcome::from_status(status);
                trace!(endpoint = %self.endpoint, %status, %outcome, "probe finished");
                outcome
            }
            Err(e) => {
                debug!(endpoint = %self.endpoint, error = %e, "probe failed");
                ProbeOutcome::Down
            }
        }
    }
}

/// One-shot probe without keeping a connector around.
pub async fn probe(endpoint: &Url, connect_timeout: Duration, read_timeout: Duration) -> ProbeOutcome {
    match HttpProber::with_timeouts(endpoint.clone(), connect_timeout, read_timeout) {
        Ok(prober) => prober.probe().await,
        Err(e) => {
            debug!(endpoint = %endpoint, error = %e, "probe failed");
            ProbeOutcome::Down
        }
    }
}
