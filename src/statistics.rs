use crate::math::*;
use crate::simulation::PicSimulation;

pub trait SimulationStatistics {
    fn total_time(&self) -> T;
    fn particle_count(&self) -> usize;
    fn total_linear_momentum(&self) -> TV;
    fn total_energy(&self) -> T;
    fn fluid_cells(&self) -> usize;
}

impl SimulationStatistics for PicSimulation {
    fn total_time(&self) -> T {
        self.time
    }

    fn particle_count(&self) -> usize {
        self.particles.count()
    }

    fn total_linear_momentum(&self) -> TV {
        self.particles.total_linear_momentum()
    }

    /// Kinetic energy only; potential energy depends on the forces applied to the grid.
    fn total_energy(&self) -> T {
        self.particles.kinetic_energy()
    }

    fn fluid_cells(&self) -> usize {
        self.grid.fluid_cells()
    }
}

/// Logs a one-line summary of `s` at info level.
pub fn log_statistics<S: SimulationStatistics>(frame: usize, s: &S) {
    let momentum = s.total_linear_momentum();
    tracing::info!(
        frame,
        time = s.total_time(),
        particles = s.particle_count(),
        fluid_cells = s.fluid_cells(),
        momentum_x = momentum.x,
        momentum_y = momentum.y,
        energy = s.total_energy(),
        "frame statistics"
    );
}
