//! The staggered (MAC) grid that particles are coupled to.
//!
//! The horizontal velocity `u` lives on vertical cell faces, `(i * h, (j + 0.5) * h)`, and the
//! vertical velocity `v` on horizontal cell faces, `((i + 0.5) * h, j * h)`. The marker field
//! has one value per cell.
use crate::lattice::Lattice;
use crate::math::*;
use num::ToPrimitive;
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub const ALL: [Axis; DIM] = [Axis::X, Axis::Y];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
        }
    }

    pub fn other(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }
}

/// Classification of a grid cell. Particles only ever write `Fluid`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellType {
    Air,
    Fluid,
    Solid,
}

impl Default for CellType {
    fn default() -> Self {
        CellType::Air
    }
}

/// The interface a grid has to provide so particles can be transferred to and from it.
///
/// Implementors are responsible for keeping the coordinate mappings in bounds: the index
/// returned by `face_aligned` and `cell_centered` must always leave `index + 1` inside the
/// corresponding lattice, whatever coordinate is passed in.
pub trait MacGrid {
    /// Cell spacing.
    fn h(&self) -> T;

    /// Domain extent along x.
    fn lx(&self) -> T;

    /// Domain extent along y.
    fn ly(&self) -> T;

    /// The velocity component aligned with `axis`.
    fn velocity(&self, axis: Axis) -> &Lattice<T>;

    fn velocity_mut(&mut self, axis: Axis) -> &mut Lattice<T>;

    fn marker(&self) -> &Lattice<CellType>;

    fn marker_mut(&mut self) -> &mut Lattice<CellType>;

    /// Maps a coordinate along `axis` onto the lattice of cell faces perpendicular to `axis`,
    /// returning the lower node and the fraction towards the next one.
    fn face_aligned(&self, axis: Axis, x: T) -> (usize, T);

    /// Maps a coordinate along `axis` onto the lattice of cell centers.
    fn cell_centered(&self, axis: Axis, x: T) -> (usize, T);

    /// Lower-left node and fractions of `position` on the lattice of the `component` velocity:
    /// face aligned along the component's own axis, cell centered along the other one.
    fn staggered(&self, component: Axis, position: TV) -> (UV, TV) {
        let mut node = UV::zeros();
        let mut fraction = TV::zeros();

        let own = component.index();
        let (i, f) = self.face_aligned(component, position[own]);
        node[own] = i;
        fraction[own] = f;

        let other = component.other().index();
        let (i, f) = self.cell_centered(component.other(), position[other]);
        node[other] = i;
        fraction[other] = f;

        (node, fraction)
    }

    /// Bilinearly interpolates the `component` velocity at `position`.
    fn sample_component(&self, component: Axis, position: TV) -> T {
        let (node, fraction) = self.staggered(component, position);
        self.velocity(component).bilerp(node, fraction)
    }

    /// Bilinearly interpolates both velocity components at `position`.
    fn sample_velocity(&self, position: TV) -> TV {
        TV::new(
            self.sample_component(Axis::X, position),
            self.sample_component(Axis::Y, position),
        )
    }

    /// The cell that contains `position`.
    fn cell_containing(&self, position: TV) -> UV {
        UV::new(
            self.face_aligned(Axis::X, position.x).0,
            self.face_aligned(Axis::Y, position.y).0,
        )
    }

    /// Adds `dt * force` to every velocity node.
    fn add_body_force(&mut self, dt: T, force: TV) {
        for &axis in Axis::ALL.iter() {
            let dv = dt * force[axis.index()];
            self.velocity_mut(axis).iter_mut().for_each(|u| *u += dv);
        }
    }

    /// The largest time step that moves nothing further than one cell.
    fn cfl(&self) -> T {
        let u = self.velocity(Axis::X).max_abs();
        let v = self.velocity(Axis::Y).max_abs();
        let max_v2 = (u * u + v * v).max(1e-16);
        self.h() / max_v2.sqrt()
    }
}

/// A uniform MAC grid over `[0, lx] x [0, ly]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaggeredGrid {
    /// The number of cells in each direction.
    pub cells: UV,
    /// Size of each grid cell.
    pub h: T,
    /// Horizontal velocity, `(nx + 1) x ny`.
    pub u: Lattice<T>,
    /// Vertical velocity, `nx x (ny + 1)`.
    pub v: Lattice<T>,
    /// Cell classification, `nx x ny`.
    pub marker: Lattice<CellType>,
}

impl StaggeredGrid {
    /// Creates a grid of `cells` cells spanning `lx` horizontally. The cells are square, so the
    /// vertical extent is `lx * ny / nx`.
    pub fn new(cells: UV, lx: T) -> eyre::Result<Self> {
        eyre::ensure!(
            cells.x >= 3 && cells.y >= 3,
            "A staggered grid needs at least 3 cells per axis, got {}x{}",
            cells.x,
            cells.y
        );
        eyre::ensure!(
            lx.is_finite() && lx > 0.,
            "Domain width must be positive, got {}",
            lx
        );

        let (nx, ny) = (cells.x, cells.y);
        Ok(StaggeredGrid {
            cells,
            h: lx / nx as T,
            u: Lattice::new(nx + 1, ny),
            v: Lattice::new(nx, ny + 1),
            marker: Lattice::new(nx, ny),
        })
    }

    /// Number of cells tagged `Fluid`.
    pub fn fluid_cells(&self) -> usize {
        self.marker
            .iter()
            .filter(|&&cell| cell == CellType::Fluid)
            .count()
    }
}

/// Splits a lattice-space coordinate into a lower node and a fraction, clamping to
/// `[0, max_lower]`. Coordinates past the end land on `max_lower` with fraction 1, so the
/// upper node is sampled exactly.
fn barycentric(s: T, max_lower: usize) -> (usize, T) {
    let floor = s.floor();
    match floor.to_usize() {
        Some(i) if i <= max_lower => (i, s - floor),
        Some(_) => (max_lower, 1.),
        None if floor >= 0. => (max_lower, 1.),
        // negative or NaN
        None => (0, 0.),
    }
}

impl MacGrid for StaggeredGrid {
    fn h(&self) -> T {
        self.h
    }

    fn lx(&self) -> T {
        self.h * self.cells.x as T
    }

    fn ly(&self) -> T {
        self.h * self.cells.y as T
    }

    fn velocity(&self, axis: Axis) -> &Lattice<T> {
        match axis {
            Axis::X => &self.u,
            Axis::Y => &self.v,
        }
    }

    fn velocity_mut(&mut self, axis: Axis) -> &mut Lattice<T> {
        match axis {
            Axis::X => &mut self.u,
            Axis::Y => &mut self.v,
        }
    }

    fn marker(&self) -> &Lattice<CellType> {
        &self.marker
    }

    fn marker_mut(&mut self) -> &mut Lattice<CellType> {
        &mut self.marker
    }

    fn face_aligned(&self, axis: Axis, x: T) -> (usize, T) {
        // n cells have n + 1 faces
        barycentric(x / self.h, self.cells[axis.index()] - 1)
    }

    fn cell_centered(&self, axis: Axis, x: T) -> (usize, T) {
        barycentric(x / self.h - 0.5, self.cells[axis.index()] - 2)
    }
}
