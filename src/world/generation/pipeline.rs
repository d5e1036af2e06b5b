use super::context::GeneratorContext;
use crate::error::{CoreError, CoreResult};
use crate::world::core::ChunkCoordinate;
use parking_lot::RwLock;
use std::sync::Arc;

/// One ordered step of terrain construction. Stages must be side-effect
/// free aside from mutating `ctx.chunk` and reading the registry. A failing
/// stage returns `Err`, which the caller turns into a `GenerationFailed`
/// error for the whole chunk.
pub trait GeneratorStage: Send + Sync {
    fn name(&self) -> &'static str;
    fn execute(&self, ctx: &mut GeneratorContext) -> Result<(), String>;
}

/// A mutable, ordered sequence of generator stages.
///
/// Mutation uses reader/writer discipline: `run` takes a cheap snapshot
/// (an `Arc<dyn GeneratorStage>` clone per stage) under a read lock and then
/// executes the snapshot lock-free, so a long-running generation task never
/// blocks `add_stage`/`remove_stage`/`clear` calls, and vice versa.
#[derive(Clone)]
pub struct GenerationPipeline {
    stages: Arc<RwLock<Vec<Arc<dyn GeneratorStage>>>>,
}

impl GenerationPipeline {
    pub fn new() -> Self {
        Self {
            stages: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn add_stage(&self, stage: Arc<dyn GeneratorStage>) {
        self.stages.write().push(stage);
    }

    pub fn remove_stage(&self, name: &str) {
        self.stages.write().retain(|s| s.name() != name);
    }

    pub fn clear(&self) {
        self.stages.write().clear();
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.read().iter().map(|s| s.name()).collect()
    }

    /// Runs every stage in order against `ctx`. A failing stage aborts the
    /// remaining stages for this chunk and returns `GenerationFailed`.
    pub fn run(&self, coord: ChunkCoordinate, ctx: &mut GeneratorContext) -> CoreResult<()> {
        let snapshot: Vec<Arc<dyn GeneratorStage>> = self.stages.read().clone();
        for stage in snapshot {
            log::debug!("chunk {:?}: running stage '{}'", coord, stage.name());
            stage.execute(ctx).map_err(|reason| CoreError::GenerationFailed {
                coord,
                stage: stage.name().to_string(),
                reason,
            })?;
        }
        Ok(())
    }
}

impl Default for GenerationPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::chunk::Chunk;
    use crate::world::core::BlockRegistry;
    use crate::world::noise::NoiseSource;

    struct Recording(&'static str, Arc<parking_lot::Mutex<Vec<&'static str>>>);

    impl GeneratorStage for Recording {
        fn name(&self) -> &'static str {
            self.0
        }
        fn execute(&self, _ctx: &mut GeneratorContext) -> Result<(), String> {
            self.1.lock().push(self.0);
            Ok(())
        }
    }

    struct Failing;
    impl GeneratorStage for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }
        fn execute(&self, _ctx: &mut GeneratorContext) -> Result<(), String> {
            Err("boom".to_string())
        }
    }

    fn fresh_ctx<'a>(chunk: &'a mut Chunk, registry: &'a BlockRegistry) -> GeneratorContext<'a> {
        GeneratorContext::new(chunk, registry, NoiseSource::new(1), 1)
    }

    #[test]
    fn stages_run_in_order() {
        let log = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let pipeline = GenerationPipeline::new();
        pipeline.add_stage(Arc::new(Recording("a", log.clone())));
        pipeline.add_stage(Arc::new(Recording("b", log.clone())));

        let mut chunk = Chunk::new(ChunkCoordinate::new(0, 0, 0));
        let coord = chunk.coord();
        let registry = BlockRegistry::new();
        let mut ctx = fresh_ctx(&mut chunk, &registry);
        pipeline.run(coord, &mut ctx).unwrap();

        assert_eq!(*log.lock(), vec!["a", "b"]);
    }

    #[test]
    fn remove_stage_drops_it_from_future_runs() {
        let log = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let pipeline = GenerationPipeline::new();
        pipeline.add_stage(Arc::new(Recording("a", log.clone())));
        pipeline.add_stage(Arc::new(Recording("b", log.clone())));
        pipeline.remove_stage("a");

        let mut chunk = Chunk::new(ChunkCoordinate::new(0, 0, 0));
        let coord = chunk.coord();
        let registry = BlockRegistry::new();
        let mut ctx = fresh_ctx(&mut chunk, &registry);
        pipeline.run(coord, &mut ctx).unwrap();

        assert_eq!(*log.lock(), vec!["b"]);
    }

    #[test]
    fn failing_stage_yields_generation_failed() {
        let pipeline = GenerationPipeline::new();
        pipeline.add_stage(Arc::new(Failing));

        let mut chunk = Chunk::new(ChunkCoordinate::new(3, 0, -2));
        let coord = chunk.coord();
        let registry = BlockRegistry::new();
        let mut ctx = fresh_ctx(&mut chunk, &registry);
        let err = pipeline.run(coord, &mut ctx).unwrap_err();
        match err {
            CoreError::GenerationFailed { coord, stage, .. } => {
                assert_eq!(coord, ChunkCoordinate::new(3, 0, -2));
                assert_eq!(stage, "failing");
            }
            other => panic!("expected GenerationFailed, got {:?}", other),
        }
    }
}
