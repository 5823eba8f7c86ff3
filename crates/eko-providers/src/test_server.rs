//! One-shot HTTP responder for client tests.

use axum::{
    body::Bytes,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    Router,
};
use std::sync::{Arc, Mutex};
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};

/// What the client sent.
pub(crate) struct Captured {
    pub method: Method,
    /// Path and query.
    pub target: String,
    pub headers: HeaderMap,
    pub body: String,
}

impl Captured {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Answer every request with `status` and a JSON `body`. Returns the base
/// URL and a handle yielding the first captured request.
pub(crate) async fn serve_once(status: u16, body: &str) -> (String, JoinHandle<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let status = StatusCode::from_u16(status).unwrap();
    let reply = body.to_string();

    let (tx, rx) = oneshot::channel();
    let tx = Arc::new(Mutex::new(Some(tx)));
    let app = Router::new().fallback(
        move |method: Method, uri: Uri, headers: HeaderMap, body: Bytes| {
            let tx = tx.clone();
            let reply = reply.clone();
            async move {
                if let Some(tx) = tx.lock().unwrap().take() {
                    let _ = tx.send(Captured {
                        method,
                        target: uri
                            .path_and_query()
                            .map(|pq| pq.as_str().to_string())
                            .unwrap_or_default(),
                        headers,
                        body: String::from_utf8_lossy(&body).to_string(),
                    });
                }
                (status, [(header::CONTENT_TYPE, "application/json")], reply)
            }
        },
    );

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    let handle = tokio::spawn(async move { rx.await.unwrap() });
    (base, handle)
}
