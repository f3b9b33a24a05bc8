use std::fmt;

use rand::{Rng, XorShiftRng};

use crate::cells::{self, Cell, CoordinateSmallVec, DirectionSmallVec, GridCoordinate,
                   GridDirection, DIRECTIONS};
use crate::errors::{self, ErrorKind};
use crate::units::{ColumnIndex, Height, RowIndex, Width};

/// A rectangular maze grid: a fixed-size row-major arena of cells addressed
/// by `y * width + x`. The dimensions are immutable after creation; wall and
/// visited flags are mutated in place during generation and the whole grid
/// is read-only once handed to a renderer.
#[derive(Debug, Clone)]
pub struct Grid {
    width: Width,
    height: Height,
    cells: Vec<Cell>,
    entrance: Option<GridCoordinate>,
    exit: Option<GridCoordinate>,
}

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum PassageError {
    InvalidGridCoordinate,
    NotAdjacent,
}

impl Grid {
    pub fn new(width: Width, height: Height) -> errors::Result<Grid> {
        let Width(w) = width;
        let Height(h) = height;
        if w == 0 || h == 0 {
            return Err(ErrorKind::InvalidDimensions(w, h).into());
        }

        let cells = (0..w * h)
            .map(|index| Cell::new(GridCoordinate::from_row_major_index(index, width)))
            .collect();

        Ok(Grid {
            width: width,
            height: height,
            cells: cells,
            entrance: None,
            exit: None,
        })
    }

    #[inline]
    pub fn width(&self) -> Width {
        self.width
    }

    #[inline]
    pub fn height(&self) -> Height {
        self.height
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.width.0 * self.height.0
    }

    /// All cells in row-major order. This is the slice renderers consume.
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[inline]
    pub fn cell(&self, coord: GridCoordinate) -> Option<&Cell> {
        self.grid_coordinate_to_index(coord)
            .map(|index| &self.cells[index])
    }

    #[inline]
    pub fn entrance(&self) -> Option<GridCoordinate> {
        self.entrance
    }

    #[inline]
    pub fn exit(&self) -> Option<GridCoordinate> {
        self.exit
    }

    /// Is the grid coordinate within the grid's dimensions?
    #[inline]
    pub fn is_valid_coordinate(&self, coord: GridCoordinate) -> bool {
        (coord.x as usize) < self.width.0 && (coord.y as usize) < self.height.0
    }

    /// Convert a grid coordinate to a one dimensional index in the range
    /// 0..grid.size(). Returns None if the grid coordinate is invalid.
    #[inline]
    pub fn grid_coordinate_to_index(&self, coord: GridCoordinate) -> Option<usize> {
        if self.is_valid_coordinate(coord) {
            Some((coord.y as usize * self.width.0) + coord.x as usize)
        } else {
            None
        }
    }

    pub fn random_cell(&self, rng: &mut XorShiftRng) -> GridCoordinate {
        let index = rng.gen::<usize>() % self.size();
        GridCoordinate::from_row_major_index(index, self.width)
    }

    /// Cells to the north, south, east or west of a particular cell.
    pub fn neighbours(&self, coord: GridCoordinate) -> CoordinateSmallVec {
        DIRECTIONS.iter()
                  .filter_map(|&dir| self.neighbour_at_direction(coord, dir))
                  .collect()
    }

    pub fn neighbour_at_direction(&self,
                                  coord: GridCoordinate,
                                  direction: GridDirection)
                                  -> Option<GridCoordinate> {
        cells::offset_coordinate(coord, direction).and_then(|neighbour| {
            if self.is_valid_coordinate(neighbour) {
                Some(neighbour)
            } else {
                None
            }
        })
    }

    pub fn unvisited_neighbours(&self, coord: GridCoordinate) -> CoordinateSmallVec {
        self.neighbours(coord)
            .iter()
            .cloned()
            .filter(|&neighbour| !self.is_visited(neighbour))
            .collect()
    }

    pub fn has_unvisited_neighbour(&self, coord: GridCoordinate) -> bool {
        !self.unvisited_neighbours(coord).is_empty()
    }

    #[inline]
    pub fn is_visited(&self, coord: GridCoordinate) -> bool {
        self.grid_coordinate_to_index(coord)
            .map_or(false, |index| self.cells[index].is_visited())
    }

    /// Flag a cell as visited by the generation walk.
    /// Returns false if the coordinate is invalid.
    pub fn mark_visited(&mut self, coord: GridCoordinate) -> bool {
        if let Some(index) = self.grid_coordinate_to_index(coord) {
            self.cells[index].mark_visited();
            true
        } else {
            false
        }
    }

    /// Remove the wall pair between two grid-adjacent cells, opening a
    /// passage: the wall on `a`'s side facing `b` and the matching wall on
    /// `b`'s side facing `a`.
    pub fn carve_passage(&mut self,
                         a: GridCoordinate,
                         b: GridCoordinate)
                         -> Result<(), PassageError> {
        let a_index = self.grid_coordinate_to_index(a)
                          .ok_or(PassageError::InvalidGridCoordinate)?;
        let b_index = self.grid_coordinate_to_index(b)
                          .ok_or(PassageError::InvalidGridCoordinate)?;
        let dir = cells::direction_between(a, b).ok_or(PassageError::NotAdjacent)?;

        self.cells[a_index].remove_wall(dir);
        self.cells[b_index].remove_wall(dir.opposite());
        Ok(())
    }

    /// Are two adjacent cells connected by a carved passage?
    pub fn is_passage(&self, a: GridCoordinate, b: GridCoordinate) -> bool {
        match (self.grid_coordinate_to_index(a), cells::direction_between(a, b)) {
            (Some(a_index), Some(dir)) => !self.cells[a_index].has_wall(dir),
            _ => false,
        }
    }

    /// Is the given side of a cell open (wall removed)? Unlike `is_passage`
    /// this also reports carved border openings, which face no neighbour.
    pub fn is_open(&self, coord: GridCoordinate, dir: GridDirection) -> bool {
        self.grid_coordinate_to_index(coord)
            .map_or(false, |index| !self.cells[index].has_wall(dir))
    }

    /// Number of carved wall pairs. Each shared wall is counted once via its
    /// east/south side, so a perfect maze reports `size() - 1`.
    pub fn passages_count(&self) -> usize {
        self.iter()
            .map(|coord| {
                [GridDirection::East, GridDirection::South]
                    .iter()
                    .filter(|&&dir| {
                        self.neighbour_at_direction(coord, dir)
                            .map_or(false, |neighbour| self.is_passage(coord, neighbour))
                    })
                    .count()
            })
            .sum()
    }

    /// Cells on row 0, the last row, column 0 or the last column, in
    /// row-major order. These are the entrance/exit candidates.
    pub fn border_cells(&self) -> Vec<GridCoordinate> {
        let Width(w) = self.width;
        let Height(h) = self.height;
        self.iter()
            .filter(|coord| {
                coord.x == 0 || coord.y == 0 || coord.x as usize == w - 1 ||
                coord.y as usize == h - 1
            })
            .collect()
    }

    /// Border sides of a cell that face out of the grid, in the fixed
    /// priority order north, south, west, east (top, bottom, left, right).
    /// Empty for interior cells.
    pub fn outward_sides(&self, coord: GridCoordinate) -> DirectionSmallVec {
        let Width(w) = self.width;
        let Height(h) = self.height;
        let mut sides = DirectionSmallVec::new();
        if coord.y == 0 {
            sides.push(GridDirection::North);
        }
        if coord.y as usize == h - 1 {
            sides.push(GridDirection::South);
        }
        if coord.x == 0 {
            sides.push(GridDirection::West);
        }
        if coord.x as usize == w - 1 {
            sides.push(GridDirection::East);
        }
        sides
    }

    /// Open the maze entrance at a border cell and record it.
    /// Returns the side that was opened, or None if the cell is not on the
    /// border (or has no outward wall left to open).
    pub fn carve_entrance(&mut self, coord: GridCoordinate) -> Option<GridDirection> {
        let side = self.carve_outward_wall(coord)?;
        self.entrance = Some(coord);
        Some(side)
    }

    /// Open the maze exit at a border cell and record it. On a 1x1 grid the
    /// cell doubles as the entrance, so the first still-walled outward side
    /// in priority order is the one opened.
    pub fn carve_exit(&mut self, coord: GridCoordinate) -> Option<GridDirection> {
        let side = self.carve_outward_wall(coord)?;
        self.exit = Some(coord);
        Some(side)
    }

    fn carve_outward_wall(&mut self, coord: GridCoordinate) -> Option<GridDirection> {
        let index = self.grid_coordinate_to_index(coord)?;
        let side = self.outward_sides(coord)
                       .iter()
                       .cloned()
                       .find(|&dir| self.cells[index].has_wall(dir))?;
        self.cells[index].remove_wall(side);
        Some(side)
    }

    pub fn iter(&self) -> CellIter {
        CellIter {
            current_cell_number: 0,
            cells_count: self.size(),
            width: self.width,
        }
    }

    pub fn iter_row(&self) -> BatchIter {
        BatchIter {
            iter_type: BatchIterType::Row,
            current_index: 0,
            width: self.width,
            height: self.height,
        }
    }

    pub fn iter_column(&self) -> BatchIter {
        BatchIter {
            iter_type: BatchIterType::Column,
            current_index: 0,
            width: self.width,
            height: self.height,
        }
    }

    // Wall presence on the rendering lattice. Out-of-grid lattice rows and
    // columns read the facing wall of the nearest cell, so carved border
    // openings show up as gaps.
    fn horizontal_wall_at(&self, x: usize, lattice_y: usize) -> bool {
        let Width(w) = self.width;
        let Height(h) = self.height;
        if lattice_y < h {
            self.cells[lattice_y * w + x].has_wall(GridDirection::North)
        } else {
            self.cells[(h - 1) * w + x].has_wall(GridDirection::South)
        }
    }

    fn vertical_wall_at(&self, lattice_x: usize, y: usize) -> bool {
        let Width(w) = self.width;
        if lattice_x < w {
            self.cells[y * w + lattice_x].has_wall(GridDirection::West)
        } else {
            self.cells[y * w + (w - 1)].has_wall(GridDirection::East)
        }
    }
}

const WALL_L: &str = "╴";
const WALL_R: &str = "╶";
const WALL_U: &str = "╵";
const WALL_D: &str = "╷";
const WALL_LR_3: &str = "───";
const WALL_LR: &str = "─";
const WALL_UD: &str = "│";
const WALL_LD: &str = "┐";
const WALL_RU: &str = "└";
const WALL_LU: &str = "┘";
const WALL_RD: &str = "┌";
const WALL_LRU: &str = "┴";
const WALL_LRD: &str = "┬";
const WALL_LRUD: &str = "┼";
const WALL_RUD: &str = "├";
const WALL_LUD: &str = "┤";

/// Glyph for a lattice point given which wall segments meet there.
fn corner_glyph(left: bool, right: bool, up: bool, down: bool) -> &'static str {
    match (left, right, up, down) {
        (true, true, true, true) => WALL_LRUD,
        (true, true, true, false) => WALL_LRU,
        (true, true, false, true) => WALL_LRD,
        (true, false, true, true) => WALL_LUD,
        (false, true, true, true) => WALL_RUD,
        (true, true, false, false) => WALL_LR,
        (false, false, true, true) => WALL_UD,
        (false, true, true, false) => WALL_RU,
        (true, false, false, true) => WALL_LD,
        (true, false, true, false) => WALL_LU,
        (false, true, false, true) => WALL_RD,
        (true, false, false, false) => WALL_L,
        (false, true, false, false) => WALL_R,
        (false, false, true, false) => WALL_U,
        (false, false, false, true) => WALL_D,
        _ => " ",
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let Width(columns_count) = self.width;
        let Height(rows_count) = self.height;

        let mut output = String::new();
        for lattice_y in 0..=rows_count {

            // Lattice line: corner glyphs joined by the cells' north walls
            // (south walls for the bottom-most line).
            for x in 0..=columns_count {
                let up = lattice_y > 0 && self.vertical_wall_at(x, lattice_y - 1);
                let down = lattice_y < rows_count && self.vertical_wall_at(x, lattice_y);
                let left = x > 0 && self.horizontal_wall_at(x - 1, lattice_y);
                let right = x < columns_count && self.horizontal_wall_at(x, lattice_y);
                output.push_str(corner_glyph(left, right, up, down));

                if x < columns_count {
                    output.push_str(if self.horizontal_wall_at(x, lattice_y) {
                        WALL_LR_3
                    } else {
                        "   "
                    });
                }
            }
            output.push('\n');

            // Cell body line: west walls and room space.
            if lattice_y < rows_count {
                for x in 0..=columns_count {
                    output.push_str(if self.vertical_wall_at(x, lattice_y) {
                        WALL_UD
                    } else {
                        " "
                    });
                    if x < columns_count {
                        output.push_str("   ");
                    }
                }
                output.push('\n');
            }
        }

        write!(f, "{}", output)
    }
}

#[derive(Debug, Copy, Clone)]
pub struct CellIter {
    current_cell_number: usize,
    cells_count: usize,
    width: Width,
}

impl Iterator for CellIter {
    type Item = GridCoordinate;
    fn next(&mut self) -> Option<Self::Item> {
        if self.current_cell_number < self.cells_count {
            let coord = GridCoordinate::from_row_major_index(self.current_cell_number, self.width);
            self.current_cell_number += 1;
            Some(coord)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let lower_bound = self.cells_count - self.current_cell_number;
        (lower_bound, Some(lower_bound))
    }
}
impl ExactSizeIterator for CellIter {} // default impl using size_hint()

impl<'a> IntoIterator for &'a Grid {
    type Item = GridCoordinate;
    type IntoIter = CellIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Copy, Clone)]
enum BatchIterType {
    Row,
    Column,
}

#[derive(Debug, Copy, Clone)]
pub struct BatchIter {
    iter_type: BatchIterType,
    current_index: usize,
    width: Width,
    height: Height,
}

impl Iterator for BatchIter {
    type Item = Vec<GridCoordinate>;
    fn next(&mut self) -> Option<Self::Item> {
        let (batches_count, batch_length) = match self.iter_type {
            BatchIterType::Row => (self.height.0, self.width.0),
            BatchIterType::Column => (self.width.0, self.height.0),
        };

        if self.current_index < batches_count {
            let coords = (0..batch_length)
                .map(|i| {
                    if let BatchIterType::Row = self.iter_type {
                        GridCoordinate::from_row_column_indices(ColumnIndex(i),
                                                                RowIndex(self.current_index))
                    } else {
                        GridCoordinate::from_row_column_indices(ColumnIndex(self.current_index),
                                                                RowIndex(i))
                    }
                })
                .collect();
            self.current_index += 1;
            Some(coords)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let batches_count = match self.iter_type {
            BatchIterType::Row => self.height.0,
            BatchIterType::Column => self.width.0,
        };
        let lower_bound = batches_count - self.current_index;
        (lower_bound, Some(lower_bound))
    }
}
