use rand::{Rng, SeedableRng, XorShiftRng};

use crate::cells::GridCoordinate;
use crate::errors::Result;
use crate::grid::Grid;
use crate::units::{Height, Width};

/// Generate a perfect maze: a uniform grid whose carved passages form a
/// spanning tree (exactly one path between any two cells), with one
/// entrance and one exit opened on the border.
///
/// The walk starts at a random cell and repeatedly carves into a random
/// unvisited neighbour; at a dead end it backtracks to the most recently
/// visited cell that still has an unvisited neighbour. Every cell is
/// visited exactly once and each carved passage reaches a previously
/// unreached cell, so the result is connected and acyclic by construction.
///
/// Fails with `InvalidDimensions` if either dimension is zero. A 1x1 grid
/// is carved with the single cell doubling as entrance (top opening) and
/// exit (bottom opening).
pub fn generate(width: Width, height: Height) -> Result<Grid> {
    let mut rng = rand::weak_rng();
    generate_with_rng(width, height, &mut rng)
}

/// As `generate`, but driven by a caller supplied random source so that a
/// fixed seed reproduces the same maze.
pub fn generate_with_rng(width: Width, height: Height, rng: &mut XorShiftRng) -> Result<Grid> {
    let mut grid = Grid::new(width, height)?;
    carve_spanning_tree(&mut grid, rng);
    carve_openings(&mut grid, rng);
    Ok(grid)
}

/// Build a reproducible random source from a single integer seed.
pub fn rng_from_seed(seed: u64) -> XorShiftRng {
    // The xorshift state must not be all zeroes; the fixed words guarantee that.
    XorShiftRng::from_seed([seed as u32, (seed >> 32) as u32, 0x193a_6754, 0xa8a7_d469])
}

fn carve_spanning_tree(grid: &mut Grid, rng: &mut XorShiftRng) {
    let cells_count = grid.size();
    let mut visited_order: Vec<GridCoordinate> = Vec::with_capacity(cells_count);

    let start = grid.random_cell(rng);
    grid.mark_visited(start);
    visited_order.push(start);

    let mut current = start;
    while visited_order.len() < cells_count {
        let unvisited = grid.unvisited_neighbours(current);
        if !unvisited.is_empty() {
            let next = unvisited[rng.gen::<usize>() % unvisited.len()];
            grid.carve_passage(current, next)
                .expect("an unvisited neighbour is always adjacent and in bounds");
            grid.mark_visited(next);
            visited_order.push(next);
            current = next;
        } else if let Some(backtracked) = find_backtrack_cell(grid, &visited_order) {
            current = backtracked;
        } else {
            // Only reachable once every cell is visited.
            break;
        }
    }
}

/// Most recently visited cell that still has an unvisited neighbour.
/// The visited order is append-only and scanned newest to oldest; stale
/// entries whose neighbourhoods are exhausted are fallen through, never
/// removed.
fn find_backtrack_cell(grid: &Grid, visited_order: &[GridCoordinate]) -> Option<GridCoordinate> {
    visited_order.iter()
                 .rev()
                 .cloned()
                 .find(|&coord| grid.has_unvisited_neighbour(coord))
}

fn carve_openings(grid: &mut Grid, rng: &mut XorShiftRng) {
    let mut candidates = grid.border_cells();

    let entrance = candidates.swap_remove(rng.gen::<usize>() % candidates.len());
    let exit = if candidates.is_empty() {
        // 1x1 grid: the sole border cell serves as both entrance and exit.
        entrance
    } else {
        candidates.swap_remove(rng.gen::<usize>() % candidates.len())
    };

    grid.carve_entrance(entrance)
        .expect("entrance cell lies on the border");
    grid.carve_exit(exit)
        .expect("exit cell has an outward wall remaining");
}
