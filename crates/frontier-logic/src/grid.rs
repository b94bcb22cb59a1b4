//! Grid A* pathfinding.
//!
//! `NavGrid` is a rectangle of cells, each walkable or blocked and carrying
//! a movement penalty. `find_path` runs A* with an octile heuristic; the
//! open set is an [`IndexedPriorityHeap`] sized to the cell count, and an
//! open node whose cost improves is repaired in place with `update_item`.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::config::{PathfindingConfig, MAX_GRID_CELLS};
use crate::error::PathError;
use crate::heap::{HeapHandle, IndexedPriorityHeap};

/// Default cost of an orthogonal step.
pub const ORTHOGONAL_COST: u32 = 10;

/// Default cost of a diagonal step (~10 * sqrt 2).
pub const DIAGONAL_COST: u32 = 14;

/// Grid coordinate `(x, y)`.
pub type Cell = (usize, usize);

/// A found path, start and goal inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridPath {
    pub cells: Vec<Cell>,
    /// Sum of step costs plus the penalties of every entered cell.
    pub cost: u32,
}

impl GridPath {
    /// Cells where the direction of travel changes, plus the goal.
    ///
    /// The start cell is dropped, since the walker is already standing on it.
    pub fn waypoints(&self) -> Vec<Cell> {
        let mut out = Vec::new();
        let mut last_dir: Option<(isize, isize)> = None;
        for pair in self.cells.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let dir = (b.0 as isize - a.0 as isize, b.1 as isize - a.1 as isize);
            if last_dir.is_some_and(|d| d != dir) {
                out.push(a);
            }
            last_dir = Some(dir);
        }
        if let Some(&goal) = self.cells.last() {
            if self.cells.len() > 1 {
                out.push(goal);
            }
        }
        out
    }
}

/// Open-set entry. Ordered so the lowest f-cost (then lowest h-cost) is
/// the greatest, i.e. the first out of the max-heap.
#[derive(Debug, Clone, Copy)]
struct OpenNode {
    cell: usize,
    g_cost: u32,
    h_cost: u32,
}

impl OpenNode {
    fn f_cost(&self) -> u32 {
        self.g_cost.saturating_add(self.h_cost)
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f_cost()
            .cmp(&self.f_cost())
            .then_with(|| other.h_cost.cmp(&self.h_cost))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenNode {}

/// Per-search bookkeeping for one cell.
#[derive(Debug, Clone, Copy)]
struct CellRecord {
    g_cost: u32,
    parent: Option<usize>,
    open: Option<HeapHandle>,
    closed: bool,
}

impl Default for CellRecord {
    fn default() -> Self {
        Self {
            g_cost: u32::MAX,
            parent: None,
            open: None,
            closed: false,
        }
    }
}

/// Walkability and penalty map for grid pathfinding.
#[derive(Debug, Clone)]
pub struct NavGrid {
    width: usize,
    height: usize,
    walkable: Vec<bool>,
    penalty: Vec<u32>,
    allow_diagonal: bool,
    orthogonal_cost: u32,
    diagonal_cost: u32,
}

impl NavGrid {
    /// Fully walkable grid with default step costs and diagonal movement.
    ///
    /// Fails when the cell count exceeds `MAX_GRID_CELLS`.
    pub fn new(width: usize, height: usize) -> Result<Self, PathError> {
        let cells = width
            .checked_mul(height)
            .filter(|&cells| cells <= MAX_GRID_CELLS)
            .ok_or(PathError::GridTooLarge { width, height })?;
        Ok(Self {
            width,
            height,
            walkable: vec![true; cells],
            penalty: vec![0; cells],
            allow_diagonal: true,
            orthogonal_cost: ORTHOGONAL_COST,
            diagonal_cost: DIAGONAL_COST,
        })
    }

    /// Fully walkable grid shaped and costed by `config`.
    ///
    /// Step costs are taken as given; run `validate_config` first.
    pub fn from_config(config: &PathfindingConfig) -> Result<Self, PathError> {
        let mut grid = Self::new(config.grid_width, config.grid_height)?;
        grid.allow_diagonal = config.allow_diagonal;
        grid.orthogonal_cost = config.orthogonal_cost;
        grid.diagonal_cost = config.diagonal_cost;
        Ok(grid)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cell_count(&self) -> usize {
        self.walkable.len()
    }

    pub fn set_allow_diagonal(&mut self, allow: bool) {
        self.allow_diagonal = allow;
    }

    pub fn set_blocked(&mut self, cell: Cell, blocked: bool) -> Result<(), PathError> {
        let i = self.index(cell)?;
        self.walkable[i] = !blocked;
        Ok(())
    }

    /// Extra cost paid for stepping into `cell`.
    pub fn set_penalty(&mut self, cell: Cell, penalty: u32) -> Result<(), PathError> {
        let i = self.index(cell)?;
        self.penalty[i] = penalty;
        Ok(())
    }

    /// Whether `cell` is inside the grid and not blocked.
    pub fn is_walkable(&self, cell: Cell) -> bool {
        self.index(cell).map(|i| self.walkable[i]).unwrap_or(false)
    }

    /// Walkable neighbours of `cell` with the step cost to each.
    ///
    /// Diagonal steps are only offered when both orthogonal cells they
    /// pass between are walkable.
    pub fn neighbours(&self, cell: Cell) -> Vec<(Cell, u32)> {
        let mut out = Vec::with_capacity(8);
        let (x, y) = (cell.0 as isize, cell.1 as isize);
        for dy in -1isize..=1 {
            for dx in -1isize..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let diagonal = dx != 0 && dy != 0;
                if diagonal && !self.allow_diagonal {
                    continue;
                }
                let Some(next) = self.offset(x + dx, y + dy) else {
                    continue;
                };
                if !self.is_walkable(next) {
                    continue;
                }
                if diagonal {
                    let side_a = self.offset(x + dx, y);
                    let side_b = self.offset(x, y + dy);
                    let clear = side_a.is_some_and(|c| self.is_walkable(c))
                        && side_b.is_some_and(|c| self.is_walkable(c));
                    if !clear {
                        continue;
                    }
                }
                let step = if diagonal {
                    self.diagonal_cost
                } else {
                    self.orthogonal_cost
                };
                out.push((next, step));
            }
        }
        out
    }

    /// Estimated cost between two cells, ignoring obstacles and penalties.
    pub fn distance(&self, a: Cell, b: Cell) -> u32 {
        let dx = a.0.abs_diff(b.0) as u32;
        let dy = a.1.abs_diff(b.1) as u32;
        if !self.allow_diagonal {
            return self.orthogonal_cost * (dx + dy);
        }
        let (long, short) = if dx > dy { (dx, dy) } else { (dy, dx) };
        self.diagonal_cost * short + self.orthogonal_cost * (long - short)
    }

    /// Cheapest path from `start` to `goal`.
    ///
    /// Returns `Ok(None)` when either end is blocked or the goal cannot be
    /// reached, and an error when either end lies outside the grid.
    pub fn find_path(&self, start: Cell, goal: Cell) -> Result<Option<GridPath>, PathError> {
        let start_i = self.index(start)?;
        let goal_i = self.index(goal)?;
        if !self.walkable[start_i] || !self.walkable[goal_i] {
            return Ok(None);
        }

        let mut records = vec![CellRecord::default(); self.cell_count()];
        let mut open = IndexedPriorityHeap::new(self.cell_count());

        records[start_i].g_cost = 0;
        records[start_i].open = Some(open.add(OpenNode {
            cell: start_i,
            g_cost: 0,
            h_cost: self.distance(start, goal),
        })?);

        let mut expanded = 0usize;
        while let Ok(current) = open.remove_first() {
            let current_i = current.cell;
            records[current_i].open = None;
            records[current_i].closed = true;
            expanded += 1;

            if current_i == goal_i {
                log::debug!(
                    "grid path {:?} -> {:?}: cost {} after {} expansions",
                    start,
                    goal,
                    current.g_cost,
                    expanded
                );
                return Ok(Some(self.retrace(&records, start_i, goal_i)));
            }

            let current_cell = self.cell_at(current_i);
            for (next, step) in self.neighbours(current_cell) {
                let next_i = next.1 * self.width + next.0;
                if records[next_i].closed {
                    continue;
                }

                // A cost past u32::MAX cannot be represented; treat as impassable.
                let Some(g_cost) = current
                    .g_cost
                    .checked_add(step)
                    .and_then(|g| g.checked_add(self.penalty[next_i]))
                else {
                    continue;
                };
                if g_cost >= records[next_i].g_cost {
                    continue;
                }

                let record = &mut records[next_i];
                record.g_cost = g_cost;
                record.parent = Some(current_i);
                match record.open {
                    Some(handle) => {
                        open.update_item(handle, |node| node.g_cost = g_cost)?;
                    }
                    None => {
                        let h_cost = self.distance(next, goal);
                        record.open = Some(open.add(OpenNode {
                            cell: next_i,
                            g_cost,
                            h_cost,
                        })?);
                    }
                }
            }
        }

        log::debug!(
            "grid path {:?} -> {:?}: unreachable after {} expansions",
            start,
            goal,
            expanded
        );
        Ok(None)
    }

    fn retrace(&self, records: &[CellRecord], start_i: usize, goal_i: usize) -> GridPath {
        let mut cells = vec![self.cell_at(goal_i)];
        let mut current = goal_i;
        while current != start_i {
            match records[current].parent {
                Some(p) => {
                    cells.push(self.cell_at(p));
                    current = p;
                }
                None => break,
            }
        }
        cells.reverse();
        GridPath {
            cells,
            cost: records[goal_i].g_cost,
        }
    }

    fn index(&self, cell: Cell) -> Result<usize, PathError> {
        if cell.0 >= self.width || cell.1 >= self.height {
            return Err(PathError::OutOfBounds {
                x: cell.0,
                y: cell.1,
                width: self.width,
                height: self.height,
            });
        }
        Ok(cell.1 * self.width + cell.0)
    }

    fn offset(&self, x: isize, y: isize) -> Option<Cell> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            None
        } else {
            Some((x as usize, y as usize))
        }
    }

    fn cell_at(&self, i: usize) -> Cell {
        (i % self.width, i / self.width)
    }
}
