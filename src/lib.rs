//! Particle-grid transfer and advection for a 2D PIC fluid on a staggered (MAC) grid.
//!
//! The grid is an explicitly borrowed collaborator: particles scatter onto it, read back from
//! it and move through it, but never own it.
extern crate nalgebra as na;

pub mod advection;
pub mod grid;
pub mod initial_condition;
pub mod io;
pub mod lattice;
pub mod parameters;
pub mod particles;
pub mod simulation;
pub mod statistics;
pub mod transfer;
pub mod util;

pub use grid::{Axis, CellType, MacGrid, StaggeredGrid};
pub use lattice::Lattice;
pub use parameters::{Scene, SimulationParameters};
pub use particles::ParticleSet;
pub use simulation::PicSimulation;

pub mod math {
    pub const DIM: usize = 2;

    pub type T = f32;
    pub type TV = na::SVector<T, DIM>;
    pub type UV = na::SVector<usize, DIM>;
}

/// `num` evenly spaced samples over `[start, end]`.
pub fn linspace(start: f64, end: f64, num: usize) -> impl Iterator<Item = f64> {
    let step = if num > 1 {
        (end - start) / (num - 1) as f64
    } else {
        0.
    };
    (0..num).map(move |i| start + step * i as f64)
}
