//! Axum integration.
//!
//! The console proxy runs as a `from_fn_with_state` middleware: the wrapped
//! router is the next handler, and forwarding errors become bare gateway
//! statuses via `ProxyError: IntoResponse`.

use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};
use std::sync::Arc;

use crate::error::ProxyError;
use crate::proxy::engine::ConsoleProxy;
use crate::proxy::transport::UpstreamTransport;

/// Middleware entry point.
pub async fn console_proxy<T: UpstreamTransport>(
    State(proxy): State<Arc<ConsoleProxy<T>>>,
    request: Request,
    next: Next,
) -> Result<Response, ProxyError> {
    let forwarded = proxy.forward(request, |req| next.run(req)).await?;
    Ok(forwarded.into_response())
}

/// Put the console proxy in front of every route of `router`, fallback included.
pub fn wrap<T: UpstreamTransport>(router: Router, proxy: Arc<ConsoleProxy<T>>) -> Router {
    router.layer(middleware::from_fn_with_state(proxy, console_proxy::<T>))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConsoleConfig;
    use crate::proxy::engine::tests::RecordingTransport;
    use axum::{
        body::Body,
        http::{Method, StatusCode},
        routing::get,
    };
    use tower::ServiceExt;

    fn app(transport: RecordingTransport) -> Router {
        let proxy = ConsoleProxy::new(&ConsoleConfig::default(), transport).unwrap();
        let router = Router::new()
            .route("/api/ping", get(|| async { "pong" }))
            .fallback(|| async { (StatusCode::NOT_FOUND, "fallback") });
        wrap(router, Arc::new(proxy))
    }

    async fn text(res: Response) -> String {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_routes_still_served() {
        let transport = RecordingTransport::default();
        let res = app(transport.clone())
            .oneshot(Request::builder().uri("/api/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(text(res).await, "pong");
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_console_intercepted_before_fallback() {
        let transport =
            RecordingTransport::replying(200, &[("content-length", "7")], b"console");
        let res = app(transport.clone())
            .oneshot(
                Request::builder()
                    .uri("/console/index.html")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(text(res).await, "console");
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_non_get_console_reaches_fallback() {
        let transport = RecordingTransport::default();
        let res = app(transport.clone())
            .oneshot(
                Request::builder()
                    .method(Method::DELETE)
                    .uri("/console/index.html")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(text(res).await, "fallback");
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_upstream_failure_becomes_bad_gateway() {
        let res = app(RecordingTransport::refusing())
            .oneshot(
                Request::builder()
                    .uri("/console/index.html")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
        assert!(text(res).await.is_empty());
    }
}
