//! Upstream transport.
//!
//! # Responsibilities
//! - Issue one GET with caller-supplied headers
//! - Hand back the response as soon as the head arrives (body stays a stream)
//! - Classify failures before the head as `UpstreamUnavailable`
//!
//! # Design Decisions
//! - Connection pooling lives here, never in the engine
//! - Connect and response-head deadlines come from `TimeoutConfig`
//! - Dropping the returned future or body cancels the upstream exchange

use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, Response, Uri};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::future::Future;
use std::time::Duration;

use crate::config::TimeoutConfig;
use crate::error::ProxyError;

/// Capability to issue a streamed upstream GET.
pub trait UpstreamTransport: Send + Sync + 'static {
    fn get(
        &self,
        uri: Uri,
        headers: HeaderMap,
    ) -> impl Future<Output = Result<Response<Body>, ProxyError>> + Send;
}

/// Pooled HTTP/1.1 transport backed by the hyper-util legacy client.
#[derive(Clone)]
pub struct HyperTransport {
    client: Client<HttpConnector, Body>,
    response_timeout: Duration,
}

impl HyperTransport {
    pub fn new(timeouts: &TimeoutConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(timeouts.connect_secs)));
        connector.set_nodelay(true);

        let client = Client::builder(TokioExecutor::new()).build(connector);

        Self {
            client,
            response_timeout: Duration::from_secs(timeouts.request_secs),
        }
    }
}

impl UpstreamTransport for HyperTransport {
    async fn get(&self, uri: Uri, mut headers: HeaderMap) -> Result<Response<Body>, ProxyError> {
        let endpoint = uri
            .authority()
            .map(|a| a.to_string())
            .unwrap_or_default();

        // The client derives Host from the URI; no request body is sent.
        headers.remove(header::HOST);
        headers.remove(header::CONTENT_LENGTH);
        headers.remove(header::TRANSFER_ENCODING);

        let mut request = Request::new(Body::empty());
        *request.method_mut() = Method::GET;
        *request.uri_mut() = uri;
        *request.headers_mut() = headers;

        match tokio::time::timeout(self.response_timeout, self.client.request(request)).await {
            Ok(Ok(response)) => Ok(response.map(Body::new)),
            Ok(Err(e)) => {
                let timed_out = is_timeout(&e);
                Err(ProxyError::UpstreamUnavailable {
                    endpoint,
                    reason: error_chain(&e),
                    timed_out,
                })
            }
            Err(_) => Err(ProxyError::UpstreamUnavailable {
                endpoint,
                reason: format!("no response within {:?}", self.response_timeout),
                timed_out: true,
            }),
        }
    }
}

fn is_timeout(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(io) = e.downcast_ref::<std::io::Error>() {
            if io.kind() == std::io::ErrorKind::TimedOut {
                return true;
            }
        }
        current = e.source();
    }
    false
}

fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut current = err.source();
    while let Some(e) = current {
        message.push_str(": ");
        message.push_str(&e.to_string());
        current = e.source();
    }
    message
}
