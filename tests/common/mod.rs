//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use axum::Router;
use time::{Duration, OffsetDateTime};
use tower::ServiceExt;
use tower_sessions::session_store;
use tower_sessions::SessionStore;
use tracing_subscriber::fmt::MakeWriter;

use session_gate::config::AppConfig;
use session_gate::pipeline;
use session_gate::session::{
    Account, BackendKind, MemoryStore, SessionBackend, SessionId, SessionRecord, ACCOUNT_KEY,
};

pub const TTL: Duration = Duration::minutes(10);

/// In-memory store that counts writes made through the pipeline.
///
/// Clones share the same records and counter.
#[derive(Debug, Clone, Default)]
pub struct CountingStore {
    shared: Arc<Counting>,
}

#[derive(Debug, Default)]
struct Counting {
    inner: MemoryStore,
    writes: AtomicUsize,
    fail_writes: bool,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes always fail.
    pub fn failing() -> Self {
        Self {
            shared: Arc::new(Counting {
                fail_writes: true,
                ..Counting::default()
            }),
        }
    }

    /// Put a signed-in session in the store without counting the write.
    pub async fn seed(&self, account: Account) -> SessionId {
        let mut record = SessionRecord {
            id: SessionId::default(),
            data: HashMap::from([(
                ACCOUNT_KEY.to_string(),
                serde_json::to_value(account).unwrap(),
            )]),
            expiry_date: OffsetDateTime::now_utc() + TTL,
        };
        self.shared.inner.create(&mut record).await.unwrap();
        record.id
    }

    pub fn store_count(&self) -> usize {
        self.shared.writes.load(Ordering::SeqCst)
    }

    pub async fn get(&self, id: &SessionId) -> Option<SessionRecord> {
        self.shared.inner.load(id).await.unwrap()
    }

    pub async fn account(&self, id: &SessionId) -> Option<Account> {
        let record = self.get(id).await?;
        let value = record.data.get(ACCOUNT_KEY)?.clone();
        Some(serde_json::from_value(value).unwrap())
    }

    fn count_write(&self) -> session_store::Result<()> {
        self.shared.writes.fetch_add(1, Ordering::SeqCst);
        if self.shared.fail_writes {
            return Err(session_store::Error::Backend("writes disabled".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl SessionStore for CountingStore {
    async fn create(&self, record: &mut SessionRecord) -> session_store::Result<()> {
        self.count_write()?;
        self.shared.inner.create(record).await
    }

    async fn save(&self, record: &SessionRecord) -> session_store::Result<()> {
        self.count_write()?;
        self.shared.inner.save(record).await
    }

    async fn load(&self, id: &SessionId) -> session_store::Result<Option<SessionRecord>> {
        self.shared.inner.load(id).await
    }

    async fn delete(&self, id: &SessionId) -> session_store::Result<()> {
        self.shared.inner.delete(id).await
    }
}

/// Wrap `routes` with the pipeline assembled from `config` over `store`.
pub fn app(config: &AppConfig, store: CountingStore, routes: Router) -> Router {
    let backend = SessionBackend::new(BackendKind::Memory, store);
    let pipeline = pipeline::assemble(config, backend).unwrap();
    pipeline.wrap(routes)
}

pub fn get(path: &str, session: Option<SessionId>) -> Request<Body> {
    let mut builder = Request::builder()
        .uri(path)
        .header("X-Forwarded-For", "198.51.100.4");
    if let Some(id) = session {
        builder = builder.header(header::COOKIE, format!("session={id}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

pub async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Collects formatted log output for assertions.
#[derive(Clone, Default)]
pub struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    /// Route this thread's events into the capture until the guard drops.
    ///
    /// Tests using this must run on the current-thread runtime (the default
    /// for `#[tokio::test]`) so every stage logs on the test thread.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .without_time()
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn lines(&self) -> Vec<String> {
        let buffer = self.buffer.lock().unwrap();
        String::from_utf8_lossy(&buffer)
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn lines_containing(&self, needle: &str) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|line| line.contains(needle))
            .collect()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
