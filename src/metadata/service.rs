//! Metadata Service
//!
//! Owns one cache per metadata category and implements the cache-aside
//! lookup used by the player: check the cache, otherwise run the caller's
//! fetch outside any cache lock and populate the cache with the result.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::{CacheStatistics, TtlCache};
use crate::config::Settings;
use crate::error::{CacheError, Result};
use crate::metadata::{AlbumMetadata, ExternalMetadata, MetadataCategory, TrackMetadata};

/// Statistics for every category cache.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataStatistics {
    pub track: CacheStatistics,
    pub album: CacheStatistics,
    pub external: CacheStatistics,
}

/// The caches together with the settings they were built from, swapped
/// as one unit.
#[derive(Debug)]
struct CategoryCaches {
    settings: Settings,
    track: Arc<TtlCache<String, TrackMetadata>>,
    album: Arc<TtlCache<String, AlbumMetadata>>,
    external: Arc<TtlCache<String, ExternalMetadata>>,
}

impl CategoryCaches {
    fn build(settings: Settings) -> Result<Self> {
        Ok(Self {
            track: Arc::new(TtlCache::new(
                settings.cache_configuration(MetadataCategory::Track)?,
            )?),
            album: Arc::new(TtlCache::new(
                settings.cache_configuration(MetadataCategory::Album)?,
            )?),
            external: Arc::new(TtlCache::new(
                settings.cache_configuration(MetadataCategory::External)?,
            )?),
            settings,
        })
    }

    fn start_cleanup(&self) -> Result<()> {
        self.track.start_cleanup()?;
        self.album.start_cleanup()?;
        self.external.start_cleanup()
    }

    fn dispose(&self) {
        self.track.dispose();
        self.album.dispose();
        self.external.dispose();
    }
}

/// Cache-backed access to soundtrack metadata.
///
/// Reconfiguration never mutates a live cache: [`reconfigure`] builds new
/// caches from the new settings and swaps them in, so in-flight lookups
/// finish against the caches they started with.
///
/// [`reconfigure`]: MetadataService::reconfigure
#[derive(Debug)]
pub struct MetadataService {
    caches: RwLock<Arc<CategoryCaches>>,
    /// Serializes settings updates
    update_lock: Mutex<()>,
    background_cleanup: bool,
}

impl MetadataService {
    /// Creates the service without background sweepers; expired entries
    /// are then only removed lazily on read or by [`run_maintenance`].
    ///
    /// [`run_maintenance`]: MetadataService::run_maintenance
    pub fn new(settings: Settings) -> Result<Self> {
        Self::build(settings, false)
    }

    /// Creates the service and attaches a cleanup task to every cache.
    ///
    /// Must be called inside a tokio runtime.
    pub fn start(settings: Settings) -> Result<Self> {
        Self::build(settings, true)
    }

    fn build(settings: Settings, background_cleanup: bool) -> Result<Self> {
        info!(
            "Metadata service ready: max_entries={}, ttl(track/album/external)={}h/{}h/{}h",
            settings.max_entries,
            settings.track_ttl_hours,
            settings.album_ttl_hours,
            settings.external_ttl_hours
        );

        let caches = CategoryCaches::build(settings)?;
        if background_cleanup {
            caches.start_cleanup()?;
        }

        Ok(Self {
            caches: RwLock::new(Arc::new(caches)),
            update_lock: Mutex::new(()),
            background_cleanup,
        })
    }

    fn caches(&self) -> Arc<CategoryCaches> {
        Arc::clone(&self.caches.read())
    }

    // == Cache-aside lookups ==

    /// Returns cached track metadata or fetches and caches it.
    pub async fn track_or_fetch<F, Fut, E>(&self, key: &str, fetch: F) -> Result<Option<TrackMetadata>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<Option<TrackMetadata>, E>>,
        E: Display,
    {
        let caches = self.caches();
        get_or_fetch(&caches.track, MetadataCategory::Track, key, fetch).await
    }

    /// Returns cached album metadata or fetches and caches it.
    pub async fn album_or_fetch<F, Fut, E>(&self, key: &str, fetch: F) -> Result<Option<AlbumMetadata>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<Option<AlbumMetadata>, E>>,
        E: Display,
    {
        let caches = self.caches();
        get_or_fetch(&caches.album, MetadataCategory::Album, key, fetch).await
    }

    /// Returns a cached external lookup or performs and caches it.
    pub async fn external_or_fetch<F, Fut, E>(
        &self,
        key: &str,
        fetch: F,
    ) -> Result<Option<ExternalMetadata>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<Option<ExternalMetadata>, E>>,
        E: Display,
    {
        let caches = self.caches();
        get_or_fetch(&caches.external, MetadataCategory::External, key, fetch).await
    }

    // == Direct access ==

    pub fn cached_track(&self, key: &str) -> Option<TrackMetadata> {
        self.caches().track.try_get(key)
    }

    pub fn cached_album(&self, key: &str) -> Option<AlbumMetadata> {
        self.caches().album.try_get(key)
    }

    pub fn cached_external(&self, key: &str) -> Option<ExternalMetadata> {
        self.caches().external.try_get(key)
    }

    pub fn put_track(&self, key: impl Into<String>, track: TrackMetadata) {
        self.caches().track.add(key.into(), track, None);
    }

    pub fn put_album(&self, key: impl Into<String>, album: AlbumMetadata) {
        self.caches().album.add(key.into(), album, None);
    }

    pub fn put_external(&self, key: impl Into<String>, external: ExternalMetadata) {
        self.caches().external.add(key.into(), external, None);
    }

    /// Removes one entry; returns whether it was present.
    pub fn remove(&self, category: MetadataCategory, key: &str) -> bool {
        let caches = self.caches();
        match category {
            MetadataCategory::Track => caches.track.remove(key),
            MetadataCategory::Album => caches.album.remove(key),
            MetadataCategory::External => caches.external.remove(key),
        }
    }

    /// Clears every category cache, e.g. when the user refreshes metadata.
    pub fn invalidate_all(&self) {
        let caches = self.caches();
        caches.track.clear();
        caches.album.clear();
        caches.external.clear();
        info!("Metadata caches invalidated");
    }

    /// Pre-populates the track cache when warming is enabled.
    ///
    /// Returns the number of entries added, zero when warming is off.
    pub fn warm_tracks<I>(&self, tracks: I) -> usize
    where
        I: IntoIterator<Item = (String, TrackMetadata)>,
    {
        let caches = self.caches();
        if !caches.settings.enable_cache_warming {
            return 0;
        }
        let added = caches.track.warm(tracks);
        info!("Warmed track cache with {} entries", added);
        added
    }

    /// Runs one maintenance cycle on every cache.
    ///
    /// A failing cache does not stop the others; the first error is
    /// returned once all three have run.
    pub fn run_maintenance(&self) -> Result<()> {
        let caches = self.caches();
        let results = [
            (MetadataCategory::Track, caches.track.run_maintenance().map(drop)),
            (MetadataCategory::Album, caches.album.run_maintenance().map(drop)),
            (MetadataCategory::External, caches.external.run_maintenance().map(drop)),
        ];

        let mut first_error = None;
        for (category, result) in results {
            if let Err(e) = result {
                warn!("Maintenance failed for {} cache: {}", category, e);
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    pub fn statistics(&self) -> MetadataStatistics {
        let caches = self.caches();
        MetadataStatistics {
            track: caches.track.statistics(),
            album: caches.album.statistics(),
            external: caches.external.statistics(),
        }
    }

    /// Settings the current caches were built from.
    pub fn settings(&self) -> Settings {
        self.caches().settings.clone()
    }

    // == Reconfigure ==
    /// Replaces every cache with a fresh one built from `settings`.
    ///
    /// The new caches start empty. On error nothing changes.
    pub fn reconfigure(&self, settings: Settings) -> Result<()> {
        self.update_settings(|_| settings).map(drop)
    }

    /// Derives new settings from the current ones and rebuilds the caches.
    ///
    /// Updates are serialized, so concurrent callers each see the result
    /// of the previous update. Returns the settings now in effect.
    pub fn update_settings<F>(&self, update: F) -> Result<Settings>
    where
        F: FnOnce(&Settings) -> Settings,
    {
        let _guard = self.update_lock.lock();

        let settings = update(&self.caches().settings);
        let caches = CategoryCaches::build(settings)?;
        if self.background_cleanup {
            caches.start_cleanup()?;
        }

        info!(
            "Metadata caches reconfigured: capacity={}, ttl(track/album/external)={:?}/{:?}/{:?}",
            caches.track.configuration().max_capacity(),
            caches.track.configuration().default_ttl(),
            caches.album.configuration().default_ttl(),
            caches.external.configuration().default_ttl()
        );

        let applied = caches.settings.clone();
        let previous = std::mem::replace(&mut *self.caches.write(), Arc::new(caches));
        previous.dispose();
        Ok(applied)
    }

    /// Stops every background sweeper.
    pub fn dispose(&self) {
        self.caches().dispose();
    }
}

async fn get_or_fetch<V, F, Fut, E>(
    cache: &TtlCache<String, V>,
    category: MetadataCategory,
    key: &str,
    fetch: F,
) -> Result<Option<V>>
where
    V: Clone,
    F: FnOnce() -> Fut,
    Fut: Future<Output = std::result::Result<Option<V>, E>>,
    E: Display,
{
    if let Some(value) = cache.try_get(key) {
        debug!("Cache hit for {} '{}'", category, key);
        return Ok(Some(value));
    }

    debug!("Cache miss for {} '{}', fetching", category, key);
    let fetched = fetch()
        .await
        .map_err(|e| CacheError::Fetch(format!("{} '{}': {}", category, key, e)))?;

    // Absent results are not cached so a later fetch can find them.
    if let Some(value) = &fetched {
        cache.add(key.to_string(), value.clone(), None);
    }
    Ok(fetched)
}
