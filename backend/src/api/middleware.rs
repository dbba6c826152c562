//! Pipeline stages wrapped around every route.

use crate::api::context::RequestContext;
use axum::{
    extract::{ConnectInfo, Request},
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Tags the request with a fresh id, in the context and on the response.
pub async fn set_request_id(mut request: Request, next: Next) -> Response {
    let request_id = Uuid::now_v7().to_string();
    request
        .extensions_mut()
        .insert(RequestContext::new(request_id.clone()));

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Logs the start and completion of every request.
pub async fn log_request(request: Request, next: Next) -> Response {
    let request_id = request
        .extensions()
        .get::<RequestContext>()
        .map(|context| context.request_id.clone())
        .unwrap_or_default();
    let remote_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let method = request.method().clone();
    let uri = request.uri().clone();

    tracing::info!(%remote_addr, %request_id, "started {} {}", method, uri);

    let start = Instant::now();
    let response = next.run(request).await;
    let status = response.status();

    tracing::info!(
        %remote_addr,
        %request_id,
        "completed with {} {} in {:?}",
        status.as_u16(),
        status.canonical_reason().unwrap_or(""),
        start.elapsed()
    );

    response
}

/// Cross-origin policy: any origin may call the API.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use crate::api::{AppState, router};
    use crate::auth::session::CookieSessionManager;
    use crate::repositories::MemoryUserRepository;
    use axum::{body::Body, http::Request};
    use std::io;
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn lines(&self) -> Vec<String> {
            let bytes = self.0.lock().unwrap();
            String::from_utf8_lossy(&bytes)
                .lines()
                .map(str::to_string)
                .collect()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[tokio::test]
    async fn test_log_request_records_start_and_completion() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let app = router(AppState::new(
            Arc::new(MemoryUserRepository::new()),
            Arc::new(CookieSessionManager::new(b"test-session-key", 3600)),
            "http://localhost:8080",
        ));
        let request = Request::builder()
            .method("GET")
            .uri("/private/whoami")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let request_id = response.headers()["x-request-id"]
            .to_str()
            .unwrap()
            .to_string();

        let lines = logs.lines();
        let tagged = format!("request_id={}", request_id);
        let started = lines
            .iter()
            .find(|line| line.contains("started"))
            .expect("start event");
        assert!(started.contains("GET /private/whoami"));
        assert!(started.contains("remote_addr=unknown"));
        assert!(started.contains(&tagged));

        let completed = lines
            .iter()
            .find(|line| line.contains("completed with"))
            .expect("completion event");
        assert!(completed.contains("401 Unauthorized"));
        assert!(completed.contains(&tagged));
        assert!(completed.contains(" in "));
    }
}
