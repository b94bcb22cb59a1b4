//! Integration tests for config → grid → path.
//!
//! Random grids are cross-checked against exhaustive relaxation over the
//! same neighbour function, so A* must return the true cheapest cost.

use frontier_logic::config::{validate_config, PathfindingConfig};
use frontier_logic::grid::{Cell, NavGrid};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ── Helpers ────────────────────────────────────────────────────────────

struct RandomGrid {
    grid: NavGrid,
    penalty: Vec<u32>,
}

fn random_grid(seed: u64, width: usize, height: usize, allow_diagonal: bool) -> RandomGrid {
    let mut rng = StdRng::seed_from_u64(seed);
    let config = PathfindingConfig {
        grid_width: width,
        grid_height: height,
        allow_diagonal,
        ..Default::default()
    };
    assert!(validate_config(&config).is_empty());

    let mut grid = NavGrid::from_config(&config).unwrap();
    let mut penalty = vec![0; width * height];
    for y in 0..height {
        for x in 0..width {
            if rng.gen_bool(0.25) {
                grid.set_blocked((x, y), true).unwrap();
            } else if rng.gen_bool(0.2) {
                let p = rng.gen_range(1..40);
                grid.set_penalty((x, y), p).unwrap();
                penalty[y * width + x] = p;
            }
        }
    }
    RandomGrid { grid, penalty }
}

/// Cheapest cost by repeated relaxation; no priority queue involved.
fn brute_force_cost(rg: &RandomGrid, start: Cell, goal: Cell) -> Option<u32> {
    let grid = &rg.grid;
    if !grid.is_walkable(start) || !grid.is_walkable(goal) {
        return None;
    }
    let width = grid.width();
    let mut dist = vec![u32::MAX; grid.cell_count()];
    dist[start.1 * width + start.0] = 0;
    loop {
        let mut changed = false;
        for y in 0..grid.height() {
            for x in 0..width {
                let d = dist[y * width + x];
                if d == u32::MAX {
                    continue;
                }
                for ((nx, ny), step) in grid.neighbours((x, y)) {
                    let ni = ny * width + nx;
                    let candidate = d + step + rg.penalty[ni];
                    if candidate < dist[ni] {
                        dist[ni] = candidate;
                        changed = true;
                    }
                }
            }
        }
        if !changed {
            break;
        }
    }
    let d = dist[goal.1 * width + goal.0];
    (d != u32::MAX).then_some(d)
}

fn check_random_grids(allow_diagonal: bool) {
    for seed in 0..40 {
        let rg = random_grid(seed, 12, 9, allow_diagonal);
        let mut rng = StdRng::seed_from_u64(seed + 1_000);
        for _ in 0..5 {
            let start = (rng.gen_range(0..12), rng.gen_range(0..9));
            let goal = (rng.gen_range(0..12), rng.gen_range(0..9));
            let found = rg.grid.find_path(start, goal).unwrap();
            let expected = brute_force_cost(&rg, start, goal);
            assert_eq!(
                found.as_ref().map(|p| p.cost),
                expected,
                "seed {seed}: {start:?} -> {goal:?}"
            );
            if let Some(path) = found {
                assert_eq!(path.cells.first(), Some(&start));
                assert_eq!(path.cells.last(), Some(&goal));
                assert!(path.cells.iter().all(|&c| rg.grid.is_walkable(c)));
            }
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────

#[test]
fn astar_matches_exhaustive_search_with_diagonals() {
    check_random_grids(true);
}

#[test]
fn astar_matches_exhaustive_search_orthogonal() {
    check_random_grids(false);
}

#[test]
fn config_from_json_drives_grid() {
    let config: PathfindingConfig = serde_json::from_str(
        r#"{ "grid_width": 6, "grid_height": 2, "allow_diagonal": false, "orthogonal_cost": 3 }"#,
    )
    .unwrap();
    assert!(validate_config(&config).is_empty());
    let grid = NavGrid::from_config(&config).unwrap();
    let path = grid.find_path((0, 0), (5, 1)).unwrap().unwrap();
    assert_eq!(path.cost, 6 * 3);
}

#[test]
fn path_cells_are_adjacent() {
    let rg = random_grid(3, 20, 20, true);
    for y in 0..20 {
        let Some(path) = rg.grid.find_path((0, y), (19, 19 - y)).unwrap() else {
            continue;
        };
        for pair in path.cells.windows(2) {
            assert!(pair[0].0.abs_diff(pair[1].0) <= 1);
            assert!(pair[0].1.abs_diff(pair[1].1) <= 1);
        }
    }
}
