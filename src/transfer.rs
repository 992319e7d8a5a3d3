//! Particle-grid transfers: P2G scatters particle velocities onto the staggered velocity
//! lattices, G2P overwrites particle velocities with the interpolated grid velocity (PIC).
use crate::grid::{Axis, CellType, MacGrid};
use crate::lattice::Lattice;
use crate::math::*;
use crate::particles::ParticleSet;
use rayon::prelude::*;

/// The four bilinear weights of a point at `fraction` inside a cell, paired with the offset of
/// the node each one belongs to. They always sum to 1.
fn bilinear_weights(fraction: TV) -> [((usize, usize), T); 4] {
    let (fx, fy) = (fraction.x, fraction.y);
    [
        ((0, 0), (1. - fx) * (1. - fy)),
        ((1, 0), fx * (1. - fy)),
        ((0, 1), (1. - fx) * fy),
        ((1, 1), fx * fy),
    ]
}

/// Distributes `q` onto the four nodes around `node + fraction`, adding the weighted quantity
/// to `target` and the weight itself to `weights`.
///
/// `node + (1, 1)` must be in bounds of both lattices.
pub fn accumulate(
    target: &mut Lattice<T>,
    weights: &mut Lattice<T>,
    q: T,
    node: UV,
    fraction: TV,
) {
    for &((di, dj), weight) in bilinear_weights(fraction).iter() {
        let n = (node.x + di, node.y + dj);
        target[n] += weight * q;
        weights[n] += weight;
    }
}

/// Divides every node with nonzero weight by that weight. Nodes no particle touched stay 0.
fn normalize(target: &mut Lattice<T>, weights: &Lattice<T>) {
    for (q, &w) in target.iter_mut().zip(weights.iter()) {
        if w != 0. {
            *q /= w;
        }
    }
}

impl ParticleSet {
    /// Rebuilds the `component` velocity lattice of `grid` as the weighted average of nearby
    /// particle velocities, returning the accumulated weight of each node.
    pub(crate) fn scatter_component<G: MacGrid + Sync>(
        &self,
        grid: &mut G,
        component: Axis,
    ) -> Lattice<T> {
        let stencils = {
            let grid = &*grid;
            self.positions
                .par_iter()
                .map(|&x| grid.staggered(component, x))
                .collect::<Vec<_>>()
        };

        let target = grid.velocity_mut(component);
        target.zero();

        let (nx, ny) = target.shape();
        let mut weights = Lattice::new(nx, ny);

        let c = component.index();
        for (&(node, fraction), u) in stencils.iter().zip(&self.velocities) {
            accumulate(target, &mut weights, u[c], node, fraction);
        }

        normalize(target, &weights);

        weights
    }

    /// Marks every cell containing at least one particle as fluid, and everything else as air.
    pub(crate) fn mark_fluid_cells<G: MacGrid + Sync>(&self, grid: &mut G) {
        let cells = {
            let grid = &*grid;
            self.positions
                .par_iter()
                .map(|&x| grid.cell_containing(x))
                .collect::<Vec<_>>()
        };

        let marker = grid.marker_mut();
        marker.zero();
        for cell in cells {
            marker[cell] = CellType::Fluid;
        }
    }

    /// Transfers particle velocities to the grid (P2G) and reclassifies fluid cells.
    #[tracing::instrument(skip_all, fields(particles = self.count()))]
    pub fn scatter_to_grid<G: MacGrid + Sync>(&self, grid: &mut G) {
        for &axis in Axis::ALL.iter() {
            let weights = self.scatter_component(grid, axis);
            tracing::trace!(?axis, total_weight = weights.sum(), "scattered component");
        }

        self.mark_fluid_cells(grid);
    }

    /// Transfers grid velocities back to the particles (G2P), replacing each particle's velocity
    /// with the grid velocity interpolated at its position.
    #[tracing::instrument(skip_all, fields(particles = self.count()))]
    pub fn gather_from_grid<G: MacGrid + Sync>(&mut self, grid: &G) {
        let positions = &self.positions;
        self.velocities
            .par_iter_mut()
            .zip(positions.par_iter())
            .for_each(|(u, &x)| {
                let (node, fraction) = grid.staggered(Axis::X, x);
                let gu = grid.velocity(Axis::X).bilerp(node, fraction);

                let (node, fraction) = grid.staggered(Axis::Y, x);
                let gv = grid.velocity(Axis::Y).bilerp(node, fraction);

                *u = TV::new(gu, gv);
            });
    }
}
