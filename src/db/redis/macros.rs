/// Read-through caching over an optional Redis cache.
///
/// With no cache configured the block simply runs. A cache read error is
/// logged and treated as a miss; a computed value is written back in the
/// background with the given TTL.
///
/// # Arguments
/// * `$cache`: `Option<&Cache>`
/// * `$key`: the `CacheKey` to read and write
/// * `$ttl`: time-to-live in seconds
/// * `$block`: future producing `AppResult<T>` on a miss
///
/// # Example
/// ```rust,ignore
/// let details = cached!(self.cache.as_ref(), key, key.ttl(), async {
///     self.fetch_details(id).await
/// });
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        match $cache {
            Some(cache) => match cache.get_from_cache(&$key).await {
                Ok(Some(cached)) => Ok(cached),
                miss => {
                    if let Err(e) = miss {
                        tracing::warn!(
                            key = %$key,
                            error = %e,
                            "Cache read failed, treating as miss"
                        );
                    }
                    let value = $block.await?;
                    cache.set_in_background(&$key, &value, $ttl);
                    Ok(value)
                }
            },
            None => $block.await,
        }
    }};
}
