use crate::math::*;
use itertools::iproduct;
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// A dense 2D array of values stored at the nodes of a regular lattice.
///
/// Storage is x-fastest, so `(i, j)` lives at `i + nx * j`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lattice<E> {
    nx: usize,
    ny: usize,
    data: Vec<E>,
}

impl<E: Copy + Default> Lattice<E> {
    /// Creates a lattice of `nx * ny` nodes, all set to `E::default()`.
    pub fn new(nx: usize, ny: usize) -> Self {
        Lattice {
            nx,
            ny,
            data: vec![E::default(); nx * ny],
        }
    }

    pub fn fill(&mut self, value: E) {
        self.data.fill(value);
    }

    /// Resets every node to `E::default()`.
    pub fn zero(&mut self) {
        self.fill(E::default());
    }
}

impl<E> Lattice<E> {
    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    /// Returns `(nx, ny)`
    pub fn shape(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn coord_to_index(&self, i: usize, j: usize) -> usize {
        i + self.nx * j
    }

    pub fn index_to_coord(&self, index: usize) -> (usize, usize) {
        (index % self.nx, index / self.nx)
    }

    fn in_bounds(&self, i: usize, j: usize) -> bool {
        i < self.nx && j < self.ny
    }

    pub fn get(&self, i: usize, j: usize) -> Option<&E> {
        if !self.in_bounds(i, j) {
            return None;
        }
        self.data.get(self.coord_to_index(i, j))
    }

    pub fn get_mut(&mut self, i: usize, j: usize) -> Option<&mut E> {
        if !self.in_bounds(i, j) {
            return None;
        }
        let index = self.coord_to_index(i, j);
        self.data.get_mut(index)
    }

    /// Iterates over every node coordinate, in storage order.
    pub fn nodes(&self) -> impl Iterator<Item = (usize, usize)> {
        iproduct!(0..self.ny, 0..self.nx).map(|(j, i)| (i, j))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.data.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, E> {
        self.data.iter_mut()
    }
}

impl Lattice<T> {
    /// Bilinear interpolation inside the cell whose lower-left node is `node`.
    ///
    /// `node + (1, 1)` must be in bounds.
    pub fn bilerp(&self, node: UV, fraction: TV) -> T {
        let (i, j) = (node.x, node.y);
        let lower = lerp(self[(i, j)], self[(i + 1, j)], fraction.x);
        let upper = lerp(self[(i, j + 1)], self[(i + 1, j + 1)], fraction.x);
        lerp(lower, upper, fraction.y)
    }

    pub fn sum(&self) -> T {
        self.data.iter().sum()
    }

    /// The infinity norm of the lattice.
    pub fn max_abs(&self) -> T {
        self.data.iter().fold(0. as T, |max: T, x| max.max(x.abs()))
    }
}

fn lerp(a: T, b: T, f: T) -> T {
    (1. - f) * a + f * b
}

impl<E> Index<(usize, usize)> for Lattice<E> {
    type Output = E;

    fn index(&self, (i, j): (usize, usize)) -> &Self::Output {
        if !self.in_bounds(i, j) {
            panic!(
                "Attempted to get node ({}, {}) out of bounds of a {}x{} lattice",
                i, j, self.nx, self.ny
            );
        }
        &self.data[self.coord_to_index(i, j)]
    }
}

impl<E> IndexMut<(usize, usize)> for Lattice<E> {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut Self::Output {
        if !self.in_bounds(i, j) {
            panic!(
                "Attempted to get node ({}, {}) out of bounds of a {}x{} lattice",
                i, j, self.nx, self.ny
            );
        }
        let index = self.coord_to_index(i, j);
        &mut self.data[index]
    }
}

impl<E> Index<UV> for Lattice<E> {
    type Output = E;

    fn index(&self, node: UV) -> &Self::Output {
        &self[(node.x, node.y)]
    }
}

impl<E> IndexMut<UV> for Lattice<E> {
    fn index_mut(&mut self, node: UV) -> &mut Self::Output {
        &mut self[(node.x, node.y)]
    }
}
