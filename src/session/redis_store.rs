//! Redis-backed session store.
//!
//! Records are stored as JSON under `session:<id>` with a TTL matching the
//! record's expiry date, so expiry is handled by redis itself.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use time::OffsetDateTime;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store;
use tower_sessions::SessionStore;

use crate::config::RedisConfig;
use crate::session::backend::SessionError;

const KEY_PREFIX: &str = "session:";

/// Sessions stored in redis, spread over a fixed set of multiplexed connections.
pub struct RedisStore {
    connections: Vec<MultiplexedConnection>,
    counter: AtomicUsize,
    address: String,
}

impl RedisStore {
    /// Open `pool_size` connections and check the server answers `PING`.
    pub async fn connect(config: &RedisConfig) -> Result<Self, SessionError> {
        let address = format!("{}:{}", config.host, config.port);
        let client = redis::Client::open(config.url())?;
        let timeout = Duration::from_secs(config.connect_timeout_secs);

        let mut connections = Vec::with_capacity(config.pool_size.max(1));
        for _ in 0..config.pool_size.max(1) {
            let conn = tokio::time::timeout(timeout, client.get_multiplexed_async_connection())
                .await
                .map_err(|_| SessionError::ConnectTimeout {
                    address: address.clone(),
                })??;
            connections.push(conn);
        }

        let mut conn = connections[0].clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;

        tracing::debug!(address = %address, connections = connections.len(), "Redis session store connected");
        Ok(Self {
            connections,
            counter: AtomicUsize::new(0),
            address,
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Round-robin over the open connections.
    fn connection(&self) -> MultiplexedConnection {
        let index = self.counter.fetch_add(1, Ordering::Relaxed) % self.connections.len();
        self.connections[index].clone()
    }
}

impl fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStore")
            .field("address", &self.address)
            .field("connections", &self.connections.len())
            .finish()
    }
}

fn key(id: &Id) -> String {
    format!("{KEY_PREFIX}{id}")
}

/// Seconds until the record expires, or `None` once it has.
fn ttl_secs(record: &Record) -> Option<u64> {
    let remaining = (record.expiry_date - OffsetDateTime::now_utc()).whole_seconds();
    u64::try_from(remaining).ok().filter(|secs| *secs > 0)
}

fn backend_error(e: redis::RedisError) -> session_store::Error {
    session_store::Error::Backend(e.to_string())
}

fn encode(record: &Record) -> session_store::Result<String> {
    serde_json::to_string(record).map_err(|e| session_store::Error::Encode(e.to_string()))
}

#[async_trait]
impl SessionStore for RedisStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        let Some(ttl) = ttl_secs(record) else {
            return Ok(());
        };
        let mut conn = self.connection();
        loop {
            let json = encode(record)?;
            // SET NX so a colliding ID never overwrites another session.
            let created: Option<String> = redis::cmd("SET")
                .arg(key(&record.id))
                .arg(json)
                .arg("NX")
                .arg("EX")
                .arg(ttl)
                .query_async(&mut conn)
                .await
                .map_err(backend_error)?;
            if created.is_some() {
                return Ok(());
            }
            record.id = Id::default();
        }
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        let mut conn = self.connection();
        match ttl_secs(record) {
            Some(ttl) => {
                let json = encode(record)?;
                let _: () = conn
                    .set_ex(key(&record.id), json, ttl)
                    .await
                    .map_err(backend_error)?;
            }
            None => {
                let _: () = conn.del(key(&record.id)).await.map_err(backend_error)?;
            }
        }
        Ok(())
    }

    async fn load(&self, id: &Id) -> session_store::Result<Option<Record>> {
        let mut conn = self.connection();
        let raw: Option<String> = conn.get(key(id)).await.map_err(backend_error)?;
        raw.map(|json| {
            serde_json::from_str(&json).map_err(|e| session_store::Error::Decode(e.to_string()))
        })
        .transpose()
    }

    async fn delete(&self, id: &Id) -> session_store::Result<()> {
        let mut conn = self.connection();
        let _: () = conn.del(key(id)).await.map_err(backend_error)?;
        Ok(())
    }
}
