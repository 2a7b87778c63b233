//! Point clouds for the portal shimmer and the ambient fireflies.

use crate::config::FireflyField;
use crate::scene::Transform;
use glam::Vec3;
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Positions plus an optional per-point scalar.
///
/// Clouds are never edited after construction; each one carries a unique
/// generation so GPU buffers can tell a replacement from the cloud they hold.
#[derive(Clone, Debug, PartialEq)]
pub struct PointCloud {
    positions: Vec<Vec3>,
    scales: Vec<f32>,
    generation: u64,
}

impl PointCloud {
    pub fn new(positions: Vec<Vec3>) -> Self {
        Self::with_scales(positions, Vec::new())
    }

    /// `scales` is either empty or one value per position.
    pub fn with_scales(positions: Vec<Vec3>, scales: Vec<f32>) -> Self {
        debug_assert!(scales.is_empty() || scales.len() == positions.len());
        Self {
            positions,
            scales,
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
        }
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn scales(&self) -> &[f32] {
        &self.scales
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn bounding_box(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.positions.first()?;
        Some(
            self.positions
                .iter()
                .fold((first, first), |(lo, hi), p| (lo.min(*p), hi.max(*p))),
        )
    }

    /// Translate so the bounding-box centre sits at the origin. Returns the
    /// offset that was removed; empty clouds are left alone.
    pub fn center(&mut self) -> Vec3 {
        let Some((lo, hi)) = self.bounding_box() else {
            return Vec3::ZERO;
        };
        let c = (lo + hi) * 0.5;
        for p in &mut self.positions {
            *p -= c;
        }
        c
    }
}

/// Keep each source point independently with probability `density`, then
/// re-centre the survivors. Every call draws fresh, so two calls at the same
/// density keep different subsets.
pub fn sample_portal<R: Rng + ?Sized>(source: &[Vec3], density: f32, rng: &mut R) -> PointCloud {
    let kept: Vec<Vec3> = source
        .iter()
        .copied()
        .filter(|_| rng.gen::<f32>() < density)
        .collect();
    let mut cloud = PointCloud::new(kept);
    cloud.center();
    cloud
}

/// Scatter `field.count` fireflies: x/z uniform across the horizontal spread
/// centred on the origin, y uniform in [0, vertical spread), scale in [0, 1).
pub fn generate_fireflies<R: Rng + ?Sized>(field: &FireflyField, rng: &mut R) -> PointCloud {
    let mut positions = Vec::with_capacity(field.count);
    let mut scales = Vec::with_capacity(field.count);
    for _ in 0..field.count {
        let x = (rng.gen::<f32>() - 0.5) * field.horizontal_spread;
        let y = rng.gen::<f32>() * field.vertical_spread;
        let z = (rng.gen::<f32>() - 0.5) * field.horizontal_spread;
        positions.push(Vec3::new(x, y, z));
        scales.push(rng.gen::<f32>());
    }
    PointCloud::with_scales(positions, scales)
}

/// Source vertices of the portal disc and where the cloud is placed.
#[derive(Clone, Debug, PartialEq)]
pub struct PortalEmitter {
    source: Vec<Vec3>,
    placement: Transform,
}

impl PortalEmitter {
    pub fn new(source: Vec<Vec3>, placement: Transform) -> Self {
        Self { source, placement }
    }

    pub fn source(&self) -> &[Vec3] {
        &self.source
    }

    /// A fresh cloud at `density` together with the disc's placement. Scale is
    /// not carried over, only translation and rotation.
    pub fn emit<R: Rng + ?Sized>(&self, density: f32, rng: &mut R) -> (PointCloud, Transform) {
        let cloud = sample_portal(&self.source, density, rng);
        let transform =
            Transform::from_translation_rotation(self.placement.translation, self.placement.rotation);
        (cloud, transform)
    }
}
