use crate::grid::{MacGrid, StaggeredGrid};
use crate::initial_condition::InitialCondition;
use crate::math::*;
use crate::parameters::SimulationParameters;
use crate::particles::ParticleSet;

/// Contains all of the state for the PIC simulation: the grid, the particles coupled to it, and
/// the parameters they were created from.
pub struct PicSimulation {
    pub grid: StaggeredGrid,
    pub particles: ParticleSet,
    pub params: SimulationParameters,
    pub time: T,
}

impl PicSimulation {
    /// Creates the grid and seeds it with the particles of `params.scene`.
    pub fn new(params: SimulationParameters) -> eyre::Result<Self> {
        let grid = StaggeredGrid::new(params.cells, params.lx)?;
        params.scene.validate()?;

        let mut particles = ParticleSet::new();
        params.scene.add_particles(&mut particles);

        tracing::info!(
            cells = ?params.cells,
            h = grid.h,
            particles = particles.count(),
            "created simulation"
        );

        Ok(PicSimulation {
            grid,
            particles,
            params,
            time: 0.,
        })
    }

    /// Adds a particle to the simulation.
    pub fn add_particle(&mut self, position: TV, velocity: TV) {
        self.particles.add_particle(position, velocity);
    }

    /// Advances the simulation by one substep of length `dt`: particles to grid, body forces on
    /// the grid, grid to particles, then particle advection.
    pub fn step(&mut self, dt: T) {
        self.particles.scatter_to_grid(&mut self.grid);
        self.finish_step(dt);
    }

    /// The part of a substep that follows the scatter, once `dt` is known.
    fn finish_step(&mut self, dt: T) {
        self.grid.add_body_force(dt, self.params.gravity);
        self.particles.gather_from_grid(&self.grid);
        self.particles.advect(&self.grid, dt);

        self.time += dt;
    }

    /// Advances the simulation by `frame_time`, in substeps limited by the CFL condition of the
    /// grid velocities scattered at the start of each substep. Returns the number of substeps
    /// taken.
    pub fn simulate_frame(&mut self) -> usize {
        let frame_time = self.params.frame_time;
        let mut t = 0.;
        let mut substeps = 0;

        while t < frame_time {
            if substeps == self.params.max_substeps {
                tracing::warn!(
                    substeps,
                    remaining = frame_time - t,
                    "frame ended early, reached the substep limit"
                );
                break;
            }

            self.particles.scatter_to_grid(&mut self.grid);
            let dt = self.grid.cfl().min(frame_time - t);
            self.finish_step(dt);

            t += dt;
            substeps += 1;
        }

        tracing::debug!(substeps, time = self.time, "simulated frame");
        substeps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::CellType;
    use crate::initial_condition::Block;
    use crate::parameters::Scene;

    fn params() -> SimulationParameters {
        SimulationParameters {
            cells: UV::new(16, 16),
            lx: 1.,
            frame_time: 0.02,
            max_substeps: 50,
            gravity: TV::zeros(),
            scene: Scene::Block(Block {
                size: TV::new(0.3, 0.3)..TV::new(0.7, 0.7),
                spacing: 0.05,
                jitter: TV::zeros(),
                velocity: TV::new(0.25, 0.),
                seed: 0,
            }),
        }
    }

    #[test]
    fn uniform_motion_without_forces() {
        let mut sim = PicSimulation::new(params()).unwrap();
        let before = sim.particles.clone();
        assert!(!before.is_empty());

        let substeps = sim.simulate_frame();
        assert!(substeps >= 1);
        assert!((sim.time - 0.02).abs() < 1e-6);

        for p in 0..sim.particles.count() {
            let moved = sim.particles.position(p) - before.position(p);
            assert!((moved - TV::new(0.005, 0.)).norm() < 1e-5);
            assert!((sim.particles.velocity(p) - TV::new(0.25, 0.)).norm() < 1e-5);
        }
        assert!(sim.grid.marker.iter().any(|&c| c == CellType::Fluid));
    }

    #[test]
    fn gravity_pulls_particles_down() {
        let mut sim = PicSimulation::new(SimulationParameters {
            gravity: TV::new(0., -10.),
            ..params()
        })
        .unwrap();
        let start = sim.particles.centroid().unwrap();

        for _ in 0..5 {
            sim.simulate_frame();
        }

        let end = sim.particles.centroid().unwrap();
        assert!(end.y < start.y);
        assert!(sim.particles.velocities().iter().all(|v| v.y < 0.));
    }

    #[test]
    fn fast_block_is_substepped_from_the_start() {
        let mut sim = PicSimulation::new(SimulationParameters {
            frame_time: 0.1,
            scene: Scene::Block(Block {
                size: TV::new(0.3, 0.3)..TV::new(0.35, 0.7),
                spacing: 0.025,
                jitter: TV::zeros(),
                velocity: TV::new(5., 0.),
                seed: 0,
            }),
            ..params()
        })
        .unwrap();
        let before = sim.particles.clone();

        // one cell is 0.0625 wide, so 5 units/s allows 0.0125 per substep
        let substeps = sim.simulate_frame();
        assert!(substeps >= 7, "took {} substeps", substeps);
        assert!((sim.time - 0.1).abs() < 1e-5);

        for p in 0..sim.particles.count() {
            let moved = sim.particles.position(p) - before.position(p);
            assert!(moved.x > 0.3 && moved.x < 0.5 + 1e-4, "moved {}", moved);
            assert!(moved.y.abs() < 1e-5);
            assert!((sim.particles.velocity(p) - TV::new(5., 0.)).norm() < 1e-4);
        }
    }

    #[test]
    fn substep_limit_is_respected() {
        let mut sim = PicSimulation::new(SimulationParameters {
            max_substeps: 1,
            frame_time: 10.,
            ..params()
        })
        .unwrap();

        assert_eq!(sim.simulate_frame(), 1);
    }

    #[test]
    fn rejects_invalid_grid() {
        let result = PicSimulation::new(SimulationParameters {
            cells: UV::new(1, 16),
            ..params()
        });
        assert!(result.is_err());
    }

    #[test]
    fn rejects_degenerate_scene() {
        let result = PicSimulation::new(SimulationParameters {
            scene: Scene::Block(Block {
                spacing: 0.,
                ..Block::default()
            }),
            ..params()
        });
        assert!(result.is_err());
    }
}
