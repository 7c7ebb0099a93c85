//! Neighbor search.
//!
//! The reference evaluation sums over every particle pair. Because every
//! kernel is exactly zero beyond the smoothing radius, a uniform grid with
//! cells of that size can restrict the sums to the 3x3x3 block around each
//! particle without changing the result. Candidate lists are kept sorted so
//! each sum visits particles in the same order as the all-pairs loop.

use std::collections::HashMap;
use std::iter::Copied;
use std::ops::Range;
use std::slice::Iter;

use bevy::prelude::*;
use rayon::prelude::*;

use super::particle::Particle;

/// How particle pairs are gathered for density and force sums.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Reflect)]
pub enum NeighborSearch {
    /// Sum over every particle, O(n²).
    #[default]
    AllPairs,
    /// Bucket particles into a uniform grid with cell size equal to the
    /// smoothing radius.
    UniformGrid,
}

/// The set of particles a sum for one particle runs over.
#[derive(Clone, Copy, Debug)]
pub enum Neighbors<'a> {
    /// Every particle in a collection of this length.
    All(usize),
    /// An explicit, ascending list of indices.
    Listed(&'a [usize]),
}

impl<'a> Neighbors<'a> {
    pub fn iter(&self) -> NeighborIter<'a> {
        match *self {
            Neighbors::All(count) => NeighborIter::All(0..count),
            Neighbors::Listed(indices) => NeighborIter::Listed(indices.iter().copied()),
        }
    }
}

impl<'a> IntoIterator for Neighbors<'a> {
    type Item = usize;
    type IntoIter = NeighborIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over neighbor indices.
pub enum NeighborIter<'a> {
    All(Range<usize>),
    Listed(Copied<Iter<'a, usize>>),
}

impl Iterator for NeighborIter<'_> {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        match self {
            NeighborIter::All(range) => range.next(),
            NeighborIter::Listed(indices) => indices.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            NeighborIter::All(range) => range.size_hint(),
            NeighborIter::Listed(indices) => indices.size_hint(),
        }
    }
}

/// Offsets of the 3x3x3 cell block around a cell.
fn neighbor_offsets() -> impl Iterator<Item = IVec3> {
    (-1..=1).flat_map(|x| (-1..=1).flat_map(move |y| (-1..=1).map(move |z| IVec3::new(x, y, z))))
}

/// Uniform grid over particle positions.
///
/// Cells are keyed by integer coordinate rather than stored densely, so
/// particles that have drifted outside the domain are still found.
#[derive(Default, Debug)]
pub struct NeighborGrid {
    cell_size: f32,
    cells: HashMap<IVec3, Vec<usize>>,
    /// Sorted candidates within `cell_size` of each particle, self included.
    lists: Vec<Vec<usize>>,
}

impl NeighborGrid {
    /// Create an empty grid.
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            ..default()
        }
    }

    /// Calculate the grid cell for a position.
    ///
    /// Coordinates beyond the `i32` range clamp to the outermost cell.
    pub fn position_to_cell(&self, position: Vec3) -> IVec3 {
        cell_of(position, self.cell_size)
    }

    /// Rebuild cells and per-particle neighbor lists.
    pub fn rebuild(&mut self, particles: &[Particle]) {
        for bucket in self.cells.values_mut() {
            bucket.clear();
        }
        for (i, particle) in particles.iter().enumerate() {
            let cell = self.position_to_cell(particle.position);
            self.cells.entry(cell).or_default().push(i);
        }
        self.cells.retain(|_, bucket| !bucket.is_empty());

        let radius_sq = self.cell_size * self.cell_size;
        let cells = &self.cells;
        let cell_size = self.cell_size;

        self.lists.resize_with(particles.len(), Vec::new);
        self.lists
            .par_iter_mut()
            .zip(particles.par_iter())
            .for_each(|(list, particle)| {
                list.clear();
                let cell = cell_of(particle.position, cell_size);
                for offset in neighbor_offsets() {
                    // Clamped cells can repeat across offsets; dedup below.
                    let Some(bucket) = cells.get(&cell.saturating_add(offset)) else {
                        continue;
                    };
                    list.extend(bucket.iter().copied().filter(|&j| {
                        (particles[j].position - particle.position).length_squared() <= radius_sq
                    }));
                }
                list.sort_unstable();
                list.dedup();
            });
    }

    /// Neighbors of particle `index` from the last rebuild.
    pub fn neighbors(&self, index: usize) -> Neighbors<'_> {
        Neighbors::Listed(&self.lists[index])
    }

    /// Number of occupied cells.
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }
}

fn cell_of(position: Vec3, cell_size: f32) -> IVec3 {
    (position / cell_size).floor().as_ivec3()
}

/// Neighbor lookup used by the stepper, selected by [`NeighborSearch`].
#[derive(Debug)]
pub enum NeighborTable {
    AllPairs { count: usize },
    Grid(NeighborGrid),
}

impl NeighborTable {
    pub fn new(search: NeighborSearch, smoothing_radius: f32) -> Self {
        match search {
            NeighborSearch::AllPairs => NeighborTable::AllPairs { count: 0 },
            NeighborSearch::UniformGrid => NeighborTable::Grid(NeighborGrid::new(smoothing_radius)),
        }
    }

    /// Refresh the table for the given positions.
    pub fn rebuild(&mut self, particles: &[Particle]) {
        match self {
            NeighborTable::AllPairs { count } => *count = particles.len(),
            NeighborTable::Grid(grid) => grid.rebuild(particles),
        }
    }

    #[inline]
    pub fn neighbors(&self, index: usize) -> Neighbors<'_> {
        match self {
            NeighborTable::AllPairs { count } => Neighbors::All(*count),
            NeighborTable::Grid(grid) => grid.neighbors(index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn particles_at(positions: &[Vec3]) -> Vec<Particle> {
        positions.iter().map(|&p| Particle::at(p)).collect()
    }

    #[test]
    fn test_position_to_cell() {
        let grid = NeighborGrid::new(1.0);
        assert_eq!(grid.position_to_cell(Vec3::new(0.5, 0.5, 0.5)), IVec3::ZERO);
        assert_eq!(
            grid.position_to_cell(Vec3::new(1.5, 0.5, 0.5)),
            IVec3::new(1, 0, 0)
        );
        assert_eq!(
            grid.position_to_cell(Vec3::new(-0.5, 0.0, 0.0)),
            IVec3::new(-1, 0, 0)
        );
    }

    #[test]
    fn test_neighbor_offsets_cover_block() {
        let offsets: Vec<IVec3> = neighbor_offsets().collect();
        assert_eq!(offsets.len(), 27);
        assert!(offsets.contains(&IVec3::ZERO));
        assert!(offsets.contains(&IVec3::new(-1, 1, -1)));
    }

    #[test]
    fn test_grid_neighbors() {
        let particles = particles_at(&[
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.1, 0.1, 0.1),
            Vec3::new(5.0, 5.0, 5.0),
            Vec3::new(-0.9, 0.0, 0.0),
            // Exactly on the support radius: kept, kernels are zero there anyway.
            Vec3::new(0.0, 1.0, 0.0),
        ]);
        let mut grid = NeighborGrid::new(1.0);
        grid.rebuild(&particles);

        let neighbors: Vec<usize> = grid.neighbors(0).iter().collect();
        assert_eq!(neighbors, vec![0, 1, 3, 4]);

        let far: Vec<usize> = grid.neighbors(2).iter().collect();
        assert_eq!(far, vec![2]);
    }

    #[test]
    fn test_grid_handles_particles_outside_domain() {
        let particles = particles_at(&[Vec3::splat(-100.0), Vec3::new(-100.2, -100.0, -100.0)]);
        let mut grid = NeighborGrid::new(1.0);
        grid.rebuild(&particles);
        assert_eq!(grid.neighbors(0).iter().count(), 2);
    }

    #[test]
    fn test_grid_handles_extreme_coordinates() {
        let particles = particles_at(&[
            Vec3::ZERO,
            Vec3::new(1e12, 0.0, 0.0),
            Vec3::splat(f32::MAX),
            Vec3::splat(f32::MIN),
            Vec3::new(1e12, 0.5, 0.0),
        ]);
        let mut grid = NeighborGrid::new(1.0);
        assert_eq!(grid.position_to_cell(particles[1].position).x, i32::MAX);
        grid.rebuild(&particles);

        let near_zero: Vec<usize> = grid.neighbors(0).iter().collect();
        assert_eq!(near_zero, vec![0]);
        let far: Vec<usize> = grid.neighbors(1).iter().collect();
        assert_eq!(far, vec![1, 4]);
        let max: Vec<usize> = grid.neighbors(2).iter().collect();
        assert_eq!(max, vec![2]);
        let min: Vec<usize> = grid.neighbors(3).iter().collect();
        assert_eq!(min, vec![3]);
    }

    #[test]
    fn test_rebuild_drops_stale_cells() {
        let mut grid = NeighborGrid::new(1.0);
        grid.rebuild(&particles_at(&[Vec3::ZERO, Vec3::splat(3.0)]));
        assert_eq!(grid.occupied_cells(), 2);
        grid.rebuild(&particles_at(&[Vec3::ZERO, Vec3::splat(0.2)]));
        assert_eq!(grid.occupied_cells(), 1);
    }

    #[test]
    fn test_all_pairs_table() {
        let particles = particles_at(&[Vec3::ZERO, Vec3::ONE, Vec3::splat(50.0)]);
        let mut table = NeighborTable::new(NeighborSearch::AllPairs, 1.0);
        table.rebuild(&particles);
        let all: Vec<usize> = table.neighbors(1).into_iter().collect();
        assert_eq!(all, vec![0, 1, 2]);
    }
}
