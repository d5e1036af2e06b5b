//! Streaming controller: keeps a cube of chunks around the
//! viewer generated, lit, meshed and uploaded, tearing down whatever falls
//! out of range. Runs on the main thread; generation/lighting/meshing run
//! as jobs on whatever the host's `TaskScheduler` collaborator is.

use crate::constants::{CHUNK_HEIGHT, CHUNK_WIDTH};
use crate::world::cache::{ChunkCache, SharedChunk};
use crate::world::chunk::Chunk;
use crate::world::collaborators::{AtlasLookup, GraphicsUploader, JobHandle, TaskScheduler};
use crate::world::core::{BlockId, BlockRegistry, BlockType, ChunkCoordinate, Face, Ray, RaycastHit, WorldPos};
use crate::world::generation::{GenerationPipeline, GeneratorContext};
use crate::world::lighting;
use crate::world::mesh::{self, ChunkMeshData};
use crate::world::noise::NoiseSource;
use dashmap::DashMap;
use glam::Vec3;
use parking_lot::{Mutex, RwLockReadGuard};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

const RAYCAST_STEP: f32 = 0.1;
const MAX_GENERATION_ATTEMPTS: u32 = 3;
const BASE_BACKOFF_MS: u64 = 50;
const CANCELLED_SENTINEL: &str = "__cancelled__";

/// Caps how many chunks can be mid-generation at once, independent of
/// `max_concurrent_jobs`, so a player standing still waiting on a wide
/// render distance doesn't peg every core. Rebuild-only jobs
/// (remeshing an already-cached chunk) don't need a permit.
struct GenerationSemaphore {
    permits: usize,
    in_use: AtomicUsize,
}

impl GenerationSemaphore {
    fn new(permits: usize) -> Self {
        Self { permits: permits.max(1), in_use: AtomicUsize::new(0) }
    }

    fn try_acquire(self: &Arc<Self>) -> Option<GenerationPermit> {
        loop {
            let current = self.in_use.load(Ordering::Acquire);
            if current >= self.permits {
                return None;
            }
            if self.in_use.compare_exchange(current, current + 1, Ordering::AcqRel, Ordering::Acquire).is_ok() {
                return Some(GenerationPermit { sem: self.clone() });
            }
        }
    }
}

struct GenerationPermit {
    sem: Arc<GenerationSemaphore>,
}

impl Drop for GenerationPermit {
    fn drop(&mut self) {
        self.sem.in_use.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Tunables for the chunk cube kept resident around the viewer.
#[derive(Debug, Clone, Copy)]
pub struct StreamingConfig {
    pub horizontal_radius: i32,
    pub vertical_below: i32,
    pub vertical_above: i32,
    pub max_concurrent_jobs: usize,
    pub max_cached_chunks: usize,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            horizontal_radius: 4,
            vertical_below: 1,
            vertical_above: 0,
            max_concurrent_jobs: 4,
            max_cached_chunks: 512,
        }
    }
}

fn build_target_offsets(config: &StreamingConfig) -> Vec<(i32, i32, i32)> {
    let r = config.horizontal_radius;
    let mut offsets = Vec::new();
    for dy in -config.vertical_below..=config.vertical_above {
        for dz in -r..=r {
            for dx in -r..=r {
                offsets.push((dx, dy, dz));
            }
        }
    }
    offsets
}

struct ChunkSlot<H> {
    chunk: SharedChunk,
    mesh: ChunkMeshData,
    gpu_handle: H,
}

struct PendingJob {
    handle: Box<dyn JobHandle>,
    result: Arc<Mutex<Option<JobOutcome>>>,
    cancelled: Arc<AtomicBool>,
}

struct FailureState {
    attempts: u32,
    retry_at: Instant,
}

type JobOutcome = Result<(SharedChunk, ChunkMeshData), String>;

/// Owns the resident chunk cube, the in-flight job table, and the bounded
/// cache backing both. Generic over `U` so the GPU handle
/// type stored per slot matches whatever `GraphicsUploader` the host wires
/// in; the task scheduler and atlas lookup are plain trait objects since
/// nothing here needs to be generic over their concrete type.
pub struct StreamingController<U: GraphicsUploader> {
    cache: Arc<ChunkCache>,
    registry: Arc<BlockRegistry>,
    pipeline: GenerationPipeline,
    noise_template: NoiseSource,
    seed: u32,
    scheduler: Arc<dyn TaskScheduler>,
    atlas: Arc<dyn AtlasLookup>,
    uploader: Arc<U>,
    config: StreamingConfig,
    target_offsets: Vec<(i32, i32, i32)>,
    generation_semaphore: Arc<GenerationSemaphore>,

    active: HashMap<ChunkCoordinate, ChunkSlot<U::Handle>>,
    /// Chunk-only mirror of `active`, shared with worker jobs so their
    /// neighbor lookups see boundary chunks without locking the whole map.
    active_index: Arc<DashMap<ChunkCoordinate, SharedChunk>>,
    pending: HashMap<ChunkCoordinate, PendingJob>,
    rebuild_queue: VecDeque<ChunkCoordinate>,
    failures: HashMap<ChunkCoordinate, FailureState>,
}

impl<U: GraphicsUploader> StreamingController<U> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        registry: Arc<BlockRegistry>,
        pipeline: GenerationPipeline,
        noise_template: NoiseSource,
        seed: u32,
        scheduler: Arc<dyn TaskScheduler>,
        atlas: Arc<dyn AtlasLookup>,
        uploader: Arc<U>,
        config: StreamingConfig,
    ) -> Self {
        let cache = Arc::new(ChunkCache::new(config.max_cached_chunks));
        let target_offsets = build_target_offsets(&config);
        let generation_semaphore = Arc::new(GenerationSemaphore::new((num_cpus::get() / 2).max(1)));
        Self {
            cache,
            registry,
            pipeline,
            noise_template,
            seed,
            scheduler,
            atlas,
            uploader,
            config,
            target_offsets,
            generation_semaphore,
            active: HashMap::new(),
            active_index: Arc::new(DashMap::new()),
            pending: HashMap::new(),
            rebuild_queue: VecDeque::new(),
            failures: HashMap::new(),
        }
    }

    /// Rebuilds the cached offset cube; existing chunks and jobs are left
    /// alone and converge to the new shape over the next few ticks.
    pub fn set_config(&mut self, config: StreamingConfig) {
        self.target_offsets = build_target_offsets(&config);
        self.config = config;
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn active_coords(&self) -> HashSet<ChunkCoordinate> {
        self.active.keys().copied().collect()
    }

    pub fn is_active(&self, coord: ChunkCoordinate) -> bool {
        self.active.contains_key(&coord)
    }

    /// One update tick: schedule missing chunks, drain finished
    /// jobs into `active`, then unload and cancel whatever fell out of the
    /// target cube.
    pub fn tick(&mut self, viewer_world_pos: WorldPos) {
        let origin = viewer_world_pos.chunk();
        let targets: Vec<ChunkCoordinate> = self
            .target_offsets
            .iter()
            .map(|&(dx, dy, dz)| origin.offset(dx, dy, dz))
            .collect();
        let target_set: HashSet<ChunkCoordinate> = targets.iter().copied().collect();

        self.schedule_missing(&targets, &target_set);
        self.drain_completed();
        self.unload_out_of_range(&target_set);
    }

    fn is_backing_off(&self, coord: ChunkCoordinate) -> bool {
        self.failures
            .get(&coord)
            .map(|f| f.attempts > MAX_GENERATION_ATTEMPTS || f.retry_at > Instant::now())
            .unwrap_or(false)
    }

    fn schedule_missing(&mut self, targets: &[ChunkCoordinate], target_set: &HashSet<ChunkCoordinate>) {
        self.rebuild_queue.retain(|c| target_set.contains(c));

        loop {
            if self.pending.len() >= self.config.max_concurrent_jobs {
                break;
            }
            if let Some(idx) = self.rebuild_queue.iter().position(|c| !self.pending.contains_key(c)) {
                let coord = self.rebuild_queue.remove(idx).expect("index just found");
                self.spawn_job(coord);
                continue;
            }
            let missing = targets
                .iter()
                .find(|c| !self.active.contains_key(c) && !self.pending.contains_key(c) && !self.is_backing_off(**c))
                .copied();
            match missing {
                Some(coord) => {
                    if !self.spawn_job(coord) {
                        // generation semaphore exhausted; every remaining
                        // candidate would need a permit too, try again next tick
                        break;
                    }
                }
                None => break,
            }
        }
    }

    /// Returns `false` without scheduling anything if `coord` needs fresh
    /// generation and no generation permit is available right now.
    fn spawn_job(&mut self, coord: ChunkCoordinate) -> bool {
        let needs_generation = self.cache.try_get(coord).is_none();
        let generation_permit = if needs_generation {
            match self.generation_semaphore.try_acquire() {
                Some(permit) => Some(permit),
                None => return false,
            }
        } else {
            None
        };

        let cache = self.cache.clone();
        let registry = self.registry.clone();
        let pipeline = self.pipeline.clone();
        let noise = self.noise_template.clone();
        let seed = self.seed;
        let atlas = self.atlas.clone();
        let active_index = self.active_index.clone();

        let result = Arc::new(Mutex::new(None));
        let result_for_job = result.clone();
        let cancelled = Arc::new(AtomicBool::new(false));
        let cancelled_for_job = cancelled.clone();

        let job: Box<dyn FnOnce() + Send> = Box::new(move || {
            let outcome = run_chunk_job(coord, &cache, &registry, &pipeline, noise, seed, atlas.as_ref(), &active_index, &cancelled_for_job, generation_permit);
            if matches!(&outcome, Err(r) if r == CANCELLED_SENTINEL) {
                return;
            }
            *result_for_job.lock() = Some(outcome);
        });

        let handle = self.scheduler.schedule(coord, job);
        self.pending.insert(coord, PendingJob { handle, result, cancelled });
        true
    }

    fn drain_completed(&mut self) {
        let done: Vec<ChunkCoordinate> = self
            .pending
            .iter()
            .filter(|(_, job)| job.handle.is_complete())
            .map(|(&coord, _)| coord)
            .collect();

        for coord in done {
            let job = self.pending.remove(&coord).expect("coord came from pending");
            let outcome = job.result.lock().take();
            match outcome {
                Some(Ok((chunk, mesh))) => {
                    self.failures.remove(&coord);
                    let gpu_handle = self.uploader.upload_mesh(coord, &mesh);
                    self.active_index.insert(coord, chunk.clone());
                    let previous = self.active.insert(coord, ChunkSlot { chunk, mesh, gpu_handle });
                    match previous {
                        Some(prev) => self.uploader.dispose(prev.gpu_handle),
                        None => {
                            for neighbor in coord.neighbors() {
                                if self.active.contains_key(&neighbor) && !self.pending.contains_key(&neighbor) {
                                    self.rebuild_queue.push_back(neighbor);
                                }
                            }
                        }
                    }
                }
                Some(Err(reason)) => {
                    log::warn!("chunk {:?} generation failed: {}", coord, reason);
                    self.record_failure(coord);
                }
                None => {} // cancelled mid-flight; nothing committed, no bookkeeping needed
            }
        }
    }

    fn record_failure(&mut self, coord: ChunkCoordinate) {
        let state = self.failures.entry(coord).or_insert(FailureState {
            attempts: 0,
            retry_at: Instant::now(),
        });
        state.attempts += 1;
        if state.attempts > MAX_GENERATION_ATTEMPTS {
            return;
        }
        let backoff_ms = BASE_BACKOFF_MS * 2u64.pow(state.attempts - 1);
        state.retry_at = Instant::now() + Duration::from_millis(backoff_ms);
    }

    fn unload_out_of_range(&mut self, target_set: &HashSet<ChunkCoordinate>) {
        let stale: Vec<ChunkCoordinate> = self.active.keys().filter(|c| !target_set.contains(c)).copied().collect();
        for coord in stale {
            if let Some(slot) = self.active.remove(&coord) {
                self.uploader.dispose(slot.gpu_handle);
            }
            self.active_index.remove(&coord);
        }

        let cancel: Vec<ChunkCoordinate> = self.pending.keys().filter(|c| !target_set.contains(c)).copied().collect();
        for coord in cancel {
            if let Some(job) = self.pending.remove(&coord) {
                job.cancelled.store(true, Ordering::Release);
                job.handle.cancel();
            }
            self.failures.remove(&coord);
        }
    }

    /// Synchronous world-position voxel read against whatever's currently
    /// `active`. Chunks that aren't resident read as absent, not air.
    pub fn get_block_at(&self, world_pos: WorldPos) -> Option<(BlockId, &BlockType)> {
        let slot = self.active.get(&world_pos.chunk())?;
        let local = world_pos.local();
        let chunk = slot.chunk.read();
        let id = chunk.get_block(local.x, local.y, local.z).ok()?;
        Some((id, self.registry.get_by_id(id)))
    }

    /// Mutates the owning chunk and enqueues rebuilds for it and for any
    /// already-active neighbor whose boundary face touches this voxel
    ///. A no-op if the owning chunk isn't currently active.
    pub fn set_block_at(&mut self, world_pos: WorldPos, id: BlockId) {
        let coord = world_pos.chunk();
        let local = world_pos.local();
        let Some(slot) = self.active.get(&coord) else { return };

        let changed = {
            let mut chunk = slot.chunk.write();
            let previous = match chunk.get_block(local.x, local.y, local.z) {
                Ok(id) => id,
                Err(_) => return,
            };
            if previous == id {
                return;
            }
            let affects_light = self.registry.get_by_id(previous).is_opaque != self.registry.get_by_id(id).is_opaque
                || self.registry.get_by_id(previous).emits_light != self.registry.get_by_id(id).emits_light;
            if chunk.set_block(local.x, local.y, local.z, id, affects_light).is_err() {
                return;
            }
            chunk.is_modified = true;
            true
        };
        if !changed {
            return;
        }

        self.rebuild_queue.push_back(coord);
        for face in Face::ALL {
            let touches_boundary = match face {
                Face::Left => local.x == 0,
                Face::Right => local.x == CHUNK_WIDTH as i32 - 1,
                Face::Bottom => local.y == 0,
                Face::Top => local.y == CHUNK_HEIGHT as i32 - 1,
                Face::Back => local.z == 0,
                Face::Front => local.z == CHUNK_WIDTH as i32 - 1,
            };
            if !touches_boundary {
                continue;
            }
            let (dx, dy, dz) = face.offset();
            let neighbor = coord.offset(dx, dy, dz);
            if self.active.contains_key(&neighbor) {
                self.rebuild_queue.push_back(neighbor);
            }
        }
    }

    /// Steps along `dir` from `origin` in `0.1`-unit increments up to
    /// `max_distance`, returning the first non-air voxel hit.
    /// Chunks outside `active` are treated as transparent, not solid.
    pub fn raycast(&self, origin: Vec3, dir: Vec3, max_distance: f32) -> Option<RaycastHit> {
        let ray = Ray::new(origin, dir);
        if ray.direction == Vec3::ZERO {
            return None;
        }

        let mut traveled = 0.0f32;
        let mut previous = ray.origin;
        while traveled <= max_distance {
            let sample = ray.origin + ray.direction * traveled;
            let world = WorldPos::new(sample.x.floor() as i32, sample.y.floor() as i32, sample.z.floor() as i32);
            if let Some((block, _block_type)) = self.get_block_at(world) {
                if !block.is_air() {
                    return Some(RaycastHit {
                        block_world_pos: world,
                        block,
                        face_hit: face_crossed(previous, sample),
                    });
                }
            }
            previous = sample;
            traveled += RAYCAST_STEP;
        }
        None
    }
}

fn face_crossed(previous: Vec3, current: Vec3) -> Face {
    let prev_voxel = (previous.x.floor() as i32, previous.y.floor() as i32, previous.z.floor() as i32);
    let curr_voxel = (current.x.floor() as i32, current.y.floor() as i32, current.z.floor() as i32);
    let (dx, dy, dz) = (curr_voxel.0 - prev_voxel.0, curr_voxel.1 - prev_voxel.1, curr_voxel.2 - prev_voxel.2);
    if dx != 0 {
        if dx > 0 {
            Face::Left
        } else {
            Face::Right
        }
    } else if dy != 0 {
        if dy > 0 {
            Face::Bottom
        } else {
            Face::Top
        }
    } else if dz != 0 {
        if dz > 0 {
            Face::Back
        } else {
            Face::Front
        }
    } else {
        Face::Top // ray started inside the voxel; no boundary was crossed
    }
}

fn collect_neighbor_chunks(coord: ChunkCoordinate, active_index: &DashMap<ChunkCoordinate, SharedChunk>, cache: &ChunkCache) -> Vec<(ChunkCoordinate, SharedChunk)> {
    coord
        .neighbors()
        .into_iter()
        .filter_map(|nc| {
            let shared = active_index.get(&nc).map(|entry| entry.value().clone()).or_else(|| cache.try_get(nc));
            shared.map(|s| (nc, s))
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn run_chunk_job(
    coord: ChunkCoordinate,
    cache: &ChunkCache,
    registry: &BlockRegistry,
    pipeline: &GenerationPipeline,
    noise: NoiseSource,
    seed: u32,
    atlas: &dyn AtlasLookup,
    active_index: &DashMap<ChunkCoordinate, SharedChunk>,
    cancelled: &AtomicBool,
    generation_permit: Option<GenerationPermit>,
) -> JobOutcome {
    if cancelled.load(Ordering::Acquire) {
        return Err(CANCELLED_SENTINEL.to_string());
    }

    let (shared, _pin) = match cache.pin(coord) {
        Some(pinned) => {
            drop(generation_permit); // chunk already cached; no generation pass needed
            pinned
        }
        None => {
            let mut chunk = Chunk::new(coord);
            {
                let mut ctx = GeneratorContext::new(&mut chunk, registry, noise, seed);
                let result = pipeline.run(coord, &mut ctx).map_err(|e| e.to_string());
                drop(generation_permit); // release as soon as the generation pass itself is done
                result?;
            }
            cache.set(coord, Arc::new(parking_lot::RwLock::new(chunk)));
            cache.pin(coord).expect("chunk was just inserted")
        }
    };

    if cancelled.load(Ordering::Acquire) {
        return Err(CANCELLED_SENTINEL.to_string());
    }

    {
        let mut guard = shared.write();
        if guard.is_lighting_dirty {
            lighting::propagate(&mut guard, registry);
        }
    }

    if cancelled.load(Ordering::Acquire) {
        return Err(CANCELLED_SENTINEL.to_string());
    }

    let neighbor_chunks = collect_neighbor_chunks(coord, active_index, cache);
    let neighbor_guards: Vec<(ChunkCoordinate, RwLockReadGuard<'_, Chunk>)> = neighbor_chunks.iter().map(|(nc, s)| (*nc, s.read())).collect();
    let mesh_data = {
        let guard = shared.read();
        mesh::build_chunk_mesh(&guard, registry, atlas, |nc| neighbor_guards.iter().find(|(c, _)| *c == nc).map(|(_, g)| &**g))
    };

    Ok((shared, mesh_data))
}
