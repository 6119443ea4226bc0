use redis::AsyncCommands;
use redis::Client;
use std::fmt::Display;
use tokio::sync::mpsc;

use crate::error::{AppError, AppResult};

/// Catalog lookups worth caching. The display form is the Redis key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    TvDetails(u64),
    MovieDetails(u64),
    PopularTv(u32),
}

impl CacheKey {
    /// Seconds an entry stays valid
    pub fn ttl(&self) -> u64 {
        match self {
            CacheKey::TvDetails(_) | CacheKey::MovieDetails(_) => 6 * 60 * 60,
            CacheKey::PopularTv(_) => 60 * 60,
        }
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::TvDetails(id) => write!(f, "tmdb:tv:{}", id),
            CacheKey::MovieDetails(id) => write!(f, "tmdb:movie:{}", id),
            CacheKey::PopularTv(page) => write!(f, "tmdb:popular:tv:{}", page),
        }
    }
}

pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    Ok(Client::open(redis_url)?)
}

struct PendingWrite {
    key: String,
    value: String,
    ttl: u64,
}

/// Read-through cache for catalog lookups. Writes are queued to a background
/// task so a slow Redis never delays a response.
#[derive(Clone)]
pub struct Cache {
    redis_client: Client,
    writes: mpsc::UnboundedSender<PendingWrite>,
}

/// Stops the write task once the server has drained
pub struct CacheWriterHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl CacheWriterHandle {
    pub async fn shutdown(self) {
        if self.shutdown_tx.send(()).await.is_err() {
            tracing::warn!("Cache writer already stopped");
        }
    }
}

impl Cache {
    pub async fn new(redis_client: Client) -> (Self, CacheWriterHandle) {
        let (writes, queue) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        tokio::spawn(run_writer(redis_client.clone(), queue, shutdown_rx));

        (
            Self {
                redis_client,
                writes,
            },
            CacheWriterHandle { shutdown_tx },
        )
    }

    /// `Ok(None)` on a miss; a stored value that no longer decodes is an error
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let cached: Option<String> = conn.get(key.to_string()).await?;

        cached
            .map(|json| {
                serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Cached value under {} is unreadable: {}", key, e))
                })
            })
            .transpose()
    }

    pub fn set_in_background<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) {
        let value = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(key = %key, error = %e, "Cannot serialize value for cache");
                return;
            }
        };

        let write = PendingWrite {
            key: key.to_string(),
            value,
            ttl,
        };
        if self.writes.send(write).is_err() {
            tracing::warn!(key = %key, "Cache writer stopped, dropping write");
        }
    }
}

async fn run_writer(
    client: Client,
    mut queue: mpsc::UnboundedReceiver<PendingWrite>,
    mut shutdown_rx: mpsc::Receiver<()>,
) {
    tracing::debug!("Cache writer started");

    loop {
        tokio::select! {
            Some(write) = queue.recv() => store(&client, write).await,
            _ = shutdown_rx.recv() => break,
        }
    }

    // Providers may still hold senders, so drain without waiting for close
    let mut flushed = 0;
    while let Ok(write) = queue.try_recv() {
        store(&client, write).await;
        flushed += 1;
    }
    tracing::info!(flushed, "Cache writer stopped");
}

async fn store(client: &Client, write: PendingWrite) {
    let PendingWrite { key, value, ttl } = write;
    if let Err(e) = set_entry(client, &key, value, ttl).await {
        tracing::error!(key = %key, error = %e, "Cache write failed");
    }
}

async fn set_entry(client: &Client, key: &str, value: String, ttl: u64) -> AppResult<()> {
    let mut conn = client.get_multiplexed_async_connection().await?;
    let _: () = conn.set_ex(key, value, ttl).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_display_details() {
        assert_eq!(format!("{}", CacheKey::TvDetails(1396)), "tmdb:tv:1396");
        assert_eq!(format!("{}", CacheKey::MovieDetails(27205)), "tmdb:movie:27205");
    }

    #[test]
    fn test_cache_key_display_popular() {
        assert_eq!(format!("{}", CacheKey::PopularTv(1)), "tmdb:popular:tv:1");
    }

    #[test]
    fn test_cache_key_ttl() {
        assert_eq!(CacheKey::TvDetails(1).ttl(), 21_600);
        assert_eq!(CacheKey::PopularTv(1).ttl(), 3_600);
    }

    #[tokio::test]
    #[ignore = "requires a running Redis at REDIS_URL"]
    async fn test_set_in_background_writes_to_cache() {
        let redis_url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());

        let client = create_redis_client(&redis_url).unwrap();
        let (cache, handle) = Cache::new(client.clone()).await;

        let key = CacheKey::PopularTv(9999);
        let value = vec![1396u64, 1399];

        cache.set_in_background(&key, &value, 60);
        handle.shutdown().await;
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        let retrieved: Option<Vec<u64>> = cache.get_from_cache(&key).await.unwrap();
        assert_eq!(retrieved, Some(value));

        let mut conn = client.get_multiplexed_async_connection().await.unwrap();
        let _: () = conn.del(key.to_string()).await.unwrap();
    }
}
