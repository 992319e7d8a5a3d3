use crate::grid::MacGrid;
use crate::math::*;
use crate::particles::ParticleSet;
use rayon::prelude::*;
use std::ops::Range;

/// Distance, in cells, that particles are kept away from the domain boundary.
pub const BOUNDARY_MARGIN: T = 1.001;

/// The region particles are confined to while advecting through `grid`.
pub fn interior<G: MacGrid>(grid: &G) -> Range<TV> {
    let margin = BOUNDARY_MARGIN * grid.h();
    TV::new(margin, margin)..TV::new(grid.lx() - margin, grid.ly() - margin)
}

fn clamp_to(bounds: &Range<TV>, x: TV) -> TV {
    x.zip_zip_map(&bounds.start, &bounds.end, |x, min, max| {
        num::clamp(x, min, max)
    })
}

impl ParticleSet {
    /// Moves every particle through the grid velocity field for one time step with second order
    /// Runge-Kutta (midpoint), clamping both stages to the interior of the domain.
    #[tracing::instrument(skip(self, grid), fields(particles = self.count()))]
    pub fn advect<G: MacGrid + Sync>(&mut self, grid: &G, dt: T) {
        let bounds = interior(grid);

        self.positions.par_iter_mut().for_each(|x| {
            let gu = grid.sample_velocity(*x);
            let mid = clamp_to(&bounds, *x + 0.5 * dt * gu);

            let gu = grid.sample_velocity(mid);
            *x = clamp_to(&bounds, *x + dt * gu);
        });
    }
}
