use crate::math::*;
use serde::{Deserialize, Serialize};

/// Contains all of the particle data: positions and velocities, index aligned.
///
/// Particles are only ever appended, so a particle's index identifies it for the whole run.
/// Every particle has unit mass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParticleSet {
    pub(crate) positions: Vec<TV>,
    pub(crate) velocities: Vec<TV>,
}

impl ParticleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        ParticleSet {
            positions: Vec::with_capacity(capacity),
            velocities: Vec::with_capacity(capacity),
        }
    }

    /// Appends a particle.
    pub fn add_particle(&mut self, position: TV, velocity: TV) {
        self.positions.push(position);
        self.velocities.push(velocity);
    }

    pub fn count(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn position(&self, p: usize) -> TV {
        self.positions[p]
    }

    pub fn velocity(&self, p: usize) -> TV {
        self.velocities[p]
    }

    pub fn positions(&self) -> &[TV] {
        &self.positions
    }

    pub fn velocities(&self) -> &[TV] {
        &self.velocities
    }

    /// Iterates over `(position, velocity)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&TV, &TV)> + '_ {
        self.positions.iter().zip(&self.velocities)
    }

    pub(crate) fn is_consistent(&self) -> bool {
        self.positions.len() == self.velocities.len()
    }

    pub fn total_linear_momentum(&self) -> TV {
        self.velocities.iter().sum()
    }

    pub fn kinetic_energy(&self) -> T {
        0.5 * self.velocities.iter().map(|v| v.norm_squared()).sum::<T>()
    }

    /// Mean particle position, or `None` if there are no particles.
    pub fn centroid(&self) -> Option<TV> {
        if self.is_empty() {
            return None;
        }
        Some(self.positions.iter().sum::<TV>() / self.count() as T)
    }
}
