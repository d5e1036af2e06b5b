//! Concurrent, bounded chunk cache: least-recently-accessed
//! eviction subject to a per-entry TTL, with pinning so an in-flight mesh
//! job never has its chunk evicted out from under it.

use crate::constants::DEFAULT_CACHE_TTL_SECS;
use crate::world::chunk::Chunk;
use crate::world::core::ChunkCoordinate;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A chunk shared between the cache and whatever job currently holds it.
/// Readers (mesh builder, neighbor lookups) take a read lock; the
/// generator and light propagator take a write lock.
pub type SharedChunk = Arc<RwLock<Chunk>>;

struct Entry {
    chunk: SharedChunk,
    last_access: Instant,
    pins: Arc<AtomicUsize>,
}

/// RAII guard keeping an entry pinned (exempt from eviction) until dropped.
/// Held by a job for the duration of its generation/lighting/meshing work.
pub struct ChunkPin {
    pins: Arc<AtomicUsize>,
}

impl Drop for ChunkPin {
    fn drop(&mut self) {
        self.pins.fetch_sub(1, Ordering::AcqRel);
    }
}

pub struct ChunkCache {
    entries: DashMap<ChunkCoordinate, Entry>,
    max_cached_chunks: usize,
    ttl: Duration,
}

impl ChunkCache {
    pub fn new(max_cached_chunks: usize) -> Self {
        Self::with_ttl(max_cached_chunks, Duration::from_secs(DEFAULT_CACHE_TTL_SECS))
    }

    pub fn with_ttl(max_cached_chunks: usize, ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            max_cached_chunks,
            ttl,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up `coord`, refreshing its LRU timestamp on a hit.
    pub fn get(&self, coord: ChunkCoordinate) -> Option<SharedChunk> {
        let mut entry = self.entries.get_mut(&coord)?;
        entry.last_access = Instant::now();
        Some(Arc::clone(&entry.chunk))
    }

    /// Looks up `coord` without disturbing its LRU position.
    pub fn try_get(&self, coord: ChunkCoordinate) -> Option<SharedChunk> {
        self.entries.get(&coord).map(|entry| Arc::clone(&entry.chunk))
    }

    /// Inserts or replaces `coord`'s chunk, then evicts if the cache is over
    /// capacity. A fresh entry always starts unpinned.
    pub fn set(&self, coord: ChunkCoordinate, chunk: SharedChunk) {
        self.entries.insert(
            coord,
            Entry {
                chunk,
                last_access: Instant::now(),
                pins: Arc::new(AtomicUsize::new(0)),
            },
        );
        self.evict_expired();
        self.evict_over_capacity();
    }

    /// Pins `coord` so it survives eviction until the returned guard drops,
    /// and touches its LRU timestamp. Returns `None` if absent.
    pub fn pin(&self, coord: ChunkCoordinate) -> Option<(SharedChunk, ChunkPin)> {
        let mut entry = self.entries.get_mut(&coord)?;
        entry.last_access = Instant::now();
        entry.pins.fetch_add(1, Ordering::AcqRel);
        Some((Arc::clone(&entry.chunk), ChunkPin { pins: Arc::clone(&entry.pins) }))
    }

    fn is_pinned(entry: &Entry) -> bool {
        entry.pins.load(Ordering::Acquire) > 0
    }

    /// Drops entries whose TTL has elapsed and that no job currently holds
    /// pinned. Resource pressure (a full cache) is not an error; callers
    /// simply see `set` make room or, if everything is pinned, exceed
    /// `max_cached_chunks` transiently.
    fn evict_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| Self::is_pinned(entry) || now.duration_since(entry.last_access) < self.ttl);
    }

    fn evict_over_capacity(&self) {
        while self.entries.len() > self.max_cached_chunks {
            let victim = self
                .entries
                .iter()
                .filter(|kv| !Self::is_pinned(kv.value()))
                .min_by_key(|kv| kv.value().last_access)
                .map(|kv| *kv.key());
            match victim {
                Some(coord) => {
                    self.entries.remove(&coord);
                }
                None => break, // everything left pinned; over capacity is a pressure signal, not an error
            }
        }
    }
}
