//! Deterministic, seed-keyed multi-octave noise.
//!
//! `NoiseSource` is immutable after construction and `Clone`, so each
//! generation task gets its own copy instead of sharing mutable RNG state.

use noise::{NoiseFn, Perlin};

#[derive(Clone)]
pub struct NoiseSource {
    seed: u32,
    perlin: Perlin,
}

impl NoiseSource {
    pub fn new(seed: u32) -> Self {
        Self {
            seed,
            perlin: Perlin::new(seed),
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Single-octave 2-D sample in `[-1, 1]`.
    pub fn sample_2d(&self, x: f64, z: f64) -> f64 {
        self.perlin.get([x, z])
    }

    /// Single-octave 3-D sample in `[-1, 1]`, used by cave carving.
    pub fn sample_3d(&self, x: f64, y: f64, z: f64) -> f64 {
        self.perlin.get([x, y, z])
    }

    /// Multi-octave 2-D fractal sum, normalized back into `[-1, 1]`.
    pub fn octaves_2d(&self, x: f64, z: f64, octaves: u32, persistence: f64, scale: f64) -> f64 {
        let mut total = 0.0;
        let mut frequency = scale;
        let mut amplitude = 1.0;
        let mut max_amplitude = 0.0;
        for _ in 0..octaves.max(1) {
            total += self.sample_2d(x * frequency, z * frequency) * amplitude;
            max_amplitude += amplitude;
            amplitude *= persistence;
            frequency *= 2.0;
        }
        if max_amplitude > 0.0 {
            total / max_amplitude
        } else {
            0.0
        }
    }

    pub fn octaves_3d(&self, x: f64, y: f64, z: f64, octaves: u32, persistence: f64, scale: f64) -> f64 {
        let mut total = 0.0;
        let mut frequency = scale;
        let mut amplitude = 1.0;
        let mut max_amplitude = 0.0;
        for _ in 0..octaves.max(1) {
            total += self.sample_3d(x * frequency, y * frequency, z * frequency) * amplitude;
            max_amplitude += amplitude;
            amplitude *= persistence;
            frequency *= 2.0;
        }
        if max_amplitude > 0.0 {
            total / max_amplitude
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_and_position_is_deterministic() {
        let a = NoiseSource::new(42);
        let b = NoiseSource::new(42);
        assert_eq!(a.sample_2d(1.5, -3.25), b.sample_2d(1.5, -3.25));
        assert_eq!(
            a.octaves_2d(10.0, 20.0, 4, 0.5, 0.01),
            b.octaves_2d(10.0, 20.0, 4, 0.5, 0.01)
        );
    }

    #[test]
    fn different_seeds_usually_diverge() {
        let a = NoiseSource::new(1);
        let b = NoiseSource::new(2);
        assert_ne!(a.sample_2d(1.5, -3.25), b.sample_2d(1.5, -3.25));
    }

    #[test]
    fn clone_is_independent_and_identical() {
        let original = NoiseSource::new(7);
        let copy = original.clone();
        assert_eq!(original.sample_3d(1.0, 2.0, 3.0), copy.sample_3d(1.0, 2.0, 3.0));
    }

    #[test]
    fn octave_sum_stays_in_unit_range() {
        let noise = NoiseSource::new(99);
        for i in 0..20 {
            let v = noise.octaves_2d(i as f64 * 3.7, i as f64 * -1.3, 4, 0.5, 0.02);
            assert!((-1.0..=1.0).contains(&v), "value {} out of range", v);
        }
    }
}
