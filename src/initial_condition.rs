use crate::math::*;
use crate::particles::ParticleSet;
use crate::util::RangeExt;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::ops::Range;

pub trait InitialCondition {
    /// Checks that the parameters describe a finite set of particles.
    fn validate(&self) -> eyre::Result<()>;

    fn add_particles(&self, particles: &mut ParticleSet);
}

fn is_finite(x: &TV) -> bool {
    x.iter().all(|c| c.is_finite())
}

/// A rectangle filled with particles on a regular lattice, each displaced by a small random
/// jitter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub size: Range<TV>,
    pub spacing: T,
    pub jitter: TV,
    pub velocity: TV,
    pub seed: u64,
}

impl Default for Block {
    fn default() -> Self {
        Block {
            size: TV::new(0.2, 0.2)..TV::new(0.6, 0.8),
            spacing: 0.01,
            jitter: TV::from_element(0.01 / 4.),
            velocity: TV::zeros(),
            seed: 0,
        }
    }
}

impl Block {
    /// Number of lattice points along each axis.
    fn counts(&self) -> TV {
        (self.size.size() / self.spacing).map(|x| x.ceil())
    }
}

impl InitialCondition for Block {
    fn validate(&self) -> eyre::Result<()> {
        eyre::ensure!(
            self.spacing.is_finite() && self.spacing > 0.,
            "Block spacing must be positive, got {}",
            self.spacing
        );
        eyre::ensure!(
            is_finite(&self.size.start)
                && is_finite(&self.size.end)
                && self.size.size().iter().all(|&s| s > 0.),
            "Block must span a non-empty rectangle, got {:?}",
            self.size
        );
        eyre::ensure!(
            is_finite(&self.jitter) && is_finite(&self.velocity),
            "Block jitter and velocity must be finite"
        );

        let counts = self.counts();
        eyre::ensure!(
            counts.x * counts.y <= u32::MAX as T,
            "Block with spacing {} over {:?} has too many particles",
            self.spacing,
            self.size
        );
        Ok(())
    }

    fn add_particles(&self, particles: &mut ParticleSet) {
        let mut rng = StdRng::seed_from_u64(self.seed);

        let counts = self.counts().map(|x| x as usize);

        for (j, i) in itertools::iproduct!(0..counts.y, 0..counts.x) {
            let pos = UV::new(i, j).cast::<T>() * self.spacing + self.size.start;

            let rand: TV = rng.gen::<[T; DIM]>().into();
            let jitter = rand.component_mul(&self.jitter) - self.jitter / 2.;

            particles.add_particle(pos + jitter, self.velocity);
        }
    }
}

/// A disk of uniformly distributed particles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Disk {
    pub num_particles: usize,
    pub center: TV,
    pub radius: T,
    pub velocity: TV,
    pub seed: u64,
}

impl Default for Disk {
    fn default() -> Self {
        Disk {
            num_particles: 2000,
            center: TV::new(0.5, 0.6),
            radius: 0.2,
            velocity: TV::zeros(),
            seed: 0,
        }
    }
}

impl InitialCondition for Disk {
    fn validate(&self) -> eyre::Result<()> {
        eyre::ensure!(
            self.radius.is_finite() && self.radius >= 0.,
            "Disk radius must be non-negative, got {}",
            self.radius
        );
        eyre::ensure!(
            is_finite(&self.center) && is_finite(&self.velocity),
            "Disk center and velocity must be finite"
        );
        Ok(())
    }

    fn add_particles(&self, particles: &mut ParticleSet) {
        let mut rng = StdRng::seed_from_u64(self.seed);

        for _ in 0..self.num_particles {
            let pos = loop {
                let rand: TV = rng.gen::<[T; DIM]>().into();
                let pos = rand * 2. - TV::from_element(1.);

                if pos.norm_squared() < 1. {
                    break pos * self.radius + self.center;
                }
            };

            particles.add_particle(pos, self.velocity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_fills_the_rectangle() {
        let block = Block {
            size: TV::new(1., 1.)..TV::new(2., 1.5),
            spacing: 0.1,
            jitter: TV::from_element(0.02),
            velocity: TV::new(0.5, 0.),
            seed: 7,
        };

        let mut particles = ParticleSet::new();
        block.add_particles(&mut particles);

        assert_eq!(particles.count(), 10 * 5);
        let bounds = TV::new(0.98, 0.98)..TV::new(2.02, 1.52);
        assert!(particles.positions().iter().all(|x| bounds.contains_point(x)));
        assert!(particles.velocities().iter().all(|&v| v == TV::new(0.5, 0.)));
    }

    #[test]
    fn disk_is_deterministic_and_inside() {
        let disk = Disk {
            num_particles: 300,
            ..Disk::default()
        };

        let mut a = ParticleSet::new();
        let mut b = ParticleSet::new();
        disk.add_particles(&mut a);
        disk.add_particles(&mut b);

        assert_eq!(a, b);
        assert_eq!(a.count(), 300);
        for x in a.positions() {
            assert!((x - disk.center).norm() < disk.radius + 1e-6);
        }
    }

    #[test]
    fn validation_rejects_degenerate_scenes() {
        assert!(Block::default().validate().is_ok());
        assert!(Disk::default().validate().is_ok());

        for &spacing in [0., -0.1, 1e-30, T::NAN, T::INFINITY].iter() {
            let block = Block {
                spacing,
                ..Block::default()
            };
            assert!(block.validate().is_err(), "spacing {}", spacing);
        }

        let empty = Block {
            size: TV::new(0.5, 0.5)..TV::new(0.5, 0.8),
            ..Block::default()
        };
        assert!(empty.validate().is_err());

        let unbounded = Block {
            size: TV::new(0., 0.)..TV::new(T::INFINITY, 1.),
            ..Block::default()
        };
        assert!(unbounded.validate().is_err());

        for &radius in [-1., T::NAN].iter() {
            let disk = Disk {
                radius,
                ..Disk::default()
            };
            assert!(disk.validate().is_err());
        }
    }
}
