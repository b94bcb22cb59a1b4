//! Frontier Headless Harness
//!
//! Validates the indexed heap and the pathfinders built on it.
//! Runs entirely in-process: no engine, no rendering.
//!
//! Usage:
//!   cargo run -p frontier-simtest
//!   cargo run -p frontier-simtest -- --verbose --seed 7
//!   RUST_LOG=debug cargo run -p frontier-simtest

use frontier_logic::config::{validate_config, PathfindingConfig};
use frontier_logic::grid::NavGrid;
use frontier_logic::heap::IndexedPriorityHeap;
use frontier_logic::pathfinding::{path_length, DoorEdge, NavGraph};
use frontier_logic::HeapError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

// ── Grid scenarios ──────────────────────────────────────────────────────
const SCENARIOS_JSON: &str = include_str!("../../../data/grid_scenarios.json");

#[derive(Debug, Deserialize)]
struct GridScenario {
    name: String,
    width: usize,
    height: usize,
    #[serde(default = "default_true")]
    allow_diagonal: bool,
    #[serde(default)]
    blocked: Vec<(usize, usize)>,
    #[serde(default)]
    penalties: Vec<(usize, usize, u32)>,
    start: (usize, usize),
    goal: (usize, usize),
    /// `None` means the goal must be unreachable.
    expected_cost: Option<u32>,
}

fn default_true() -> bool {
    true
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let verbose = args.iter().any(|a| a == "--verbose");
    let seed = args
        .iter()
        .position(|a| a == "--seed")
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(42);
    println!("=== Frontier Harness (seed {}) ===\n", seed);
    log::info!("verbose={} seed={}", verbose, seed);

    let mut results = Vec::new();

    // 1. Extraction order and update semantics
    results.extend(validate_heap_ordering(verbose));

    // 2. Capacity, empty, and clear boundaries
    results.extend(validate_heap_boundaries(verbose));

    // 3. Randomized invariant sweep
    results.extend(validate_heap_sweep(seed, verbose));

    // 4. Config validation
    results.extend(validate_config_rules(verbose));

    // 5. Grid A* scenarios
    results.extend(validate_grid_scenarios(verbose));

    // 6. Door-graph pathfinding
    results.extend(validate_door_graph(verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Heap Ordering ────────────────────────────────────────────────────

fn drain(heap: &mut IndexedPriorityHeap<i32>) -> Vec<i32> {
    let mut out = Vec::new();
    while let Ok(p) = heap.remove_first() {
        out.push(p);
    }
    out
}

fn validate_heap_ordering(verbose: bool) -> Vec<TestResult> {
    println!("--- Heap Ordering ---");
    let mut results = Vec::new();

    let mut heap = IndexedPriorityHeap::new(8);
    let added = [3, 1, 4, 1, 5, 9, 2, 6]
        .into_iter()
        .all(|p| heap.add(p).is_ok());
    let order = drain(&mut heap);
    if verbose {
        println!("  extraction order: {:?}", order);
    }
    results.push(TestResult {
        name: "heap_max_extraction_order".into(),
        passed: added && order == vec![9, 6, 5, 4, 3, 2, 1, 1],
        detail: format!("{:?}", order),
    });

    // Raise B over A, then B must come out first
    let mut heap = IndexedPriorityHeap::new(2);
    let first = match (heap.add(5), heap.add(3)) {
        (Ok(_), Ok(b)) => heap
            .update_item(b, |p| *p = 10)
            .and_then(|_| heap.remove_first()),
        (Err(e), _) | (_, Err(e)) => Err(e),
    };
    results.push(TestResult {
        name: "heap_update_reorders".into(),
        passed: first == Ok(10),
        detail: format!("after raising 3 → 10, first out = {:?}", first),
    });

    // Contains follows membership
    let mut heap = IndexedPriorityHeap::new(4);
    let membership = match heap.add(7) {
        Ok(h) => {
            let before = heap.contains(h);
            let removed = heap.remove_first();
            before && removed == Ok(7) && !heap.contains(h)
        }
        Err(_) => false,
    };
    results.push(TestResult {
        name: "heap_contains_tracks_membership".into(),
        passed: membership,
        detail: "contained after add, absent after removal".into(),
    });

    results
}

// ── 2. Heap Boundaries ──────────────────────────────────────────────────

fn validate_heap_boundaries(_verbose: bool) -> Vec<TestResult> {
    println!("--- Heap Boundaries ---");
    let mut results = Vec::new();

    let capacity = 16;
    let mut heap = IndexedPriorityHeap::new(capacity);
    let filled = (0..capacity as i32).all(|p| heap.add(p * 7 % 11).is_ok());
    let overflow = heap.add(100);
    results.push(TestResult {
        name: "heap_capacity_exceeded".into(),
        passed: filled
            && overflow == Err(HeapError::CapacityExceeded { capacity })
            && heap.count() == capacity
            && heap.check_invariants().is_ok(),
        detail: format!("{} adds ok, next → {:?}", capacity, overflow),
    });

    let mut empty: IndexedPriorityHeap<i32> = IndexedPriorityHeap::new(4);
    results.push(TestResult {
        name: "heap_empty_extraction".into(),
        passed: empty.remove_first() == Err(HeapError::Empty),
        detail: "remove_first on empty heap → Empty".into(),
    });

    heap.clear();
    let cleared = heap.count() == 0 && heap.remove_first() == Err(HeapError::Empty);
    let refill = heap.add(3).is_ok() && heap.remove_first() == Ok(3);
    results.push(TestResult {
        name: "heap_clear_resets".into(),
        passed: cleared && refill,
        detail: "clear → count 0, no removal until next add".into(),
    });

    results
}

// ── 3. Randomized Sweep ─────────────────────────────────────────────────

fn validate_heap_sweep(seed: u64, verbose: bool) -> Vec<TestResult> {
    println!("--- Heap Sweep ---");
    let mut results = Vec::new();

    let mut rng = StdRng::seed_from_u64(seed);
    let capacity = 128;
    let mut heap = IndexedPriorityHeap::new(capacity);
    let mut handles = Vec::new();
    let mut expected_count = 0usize;
    let mut violations = Vec::new();
    let mut ops = [0u32; 4];

    for step in 0..20_000 {
        match rng.gen_range(0..100) {
            0..=44 => {
                ops[0] += 1;
                match heap.add(rng.gen_range(0..1_000)) {
                    Ok(h) => {
                        handles.push(h);
                        expected_count += 1;
                    }
                    Err(HeapError::CapacityExceeded { .. }) if expected_count == capacity => {}
                    Err(e) => violations.push(format!("step {}: add failed: {}", step, e)),
                }
            }
            45..=74 => {
                ops[1] += 1;
                match heap.remove_first() {
                    Ok(_) => expected_count -= 1,
                    Err(HeapError::Empty) if expected_count == 0 => {}
                    Err(e) => violations.push(format!("step {}: remove failed: {}", step, e)),
                }
            }
            75..=98 => {
                ops[2] += 1;
                handles.retain(|&h| heap.contains(h));
                if !handles.is_empty() {
                    let h = handles[rng.gen_range(0..handles.len())];
                    let p = rng.gen_range(0..1_000);
                    if let Err(e) = heap.update_item(h, |v| *v = p) {
                        violations.push(format!("step {}: update failed: {}", step, e));
                    }
                }
            }
            _ => {
                ops[3] += 1;
                heap.clear();
                handles.clear();
                expected_count = 0;
            }
        }

        if heap.count() != expected_count {
            violations.push(format!(
                "step {}: count {} != expected {}",
                step,
                heap.count(),
                expected_count
            ));
        }
        if let Err(v) = heap.check_invariants() {
            violations.push(format!("step {}: {}", step, v));
        }
        if violations.len() > 5 {
            break;
        }
    }

    if verbose {
        println!(
            "  ops: {} add, {} remove, {} update, {} clear",
            ops[0], ops[1], ops[2], ops[3]
        );
    }
    results.push(TestResult {
        name: "heap_random_invariants".into(),
        passed: violations.is_empty(),
        detail: if violations.is_empty() {
            "heap property + index consistency held for 20000 ops".into()
        } else {
            violations.join("; ")
        },
    });

    results
}

// ── 4. Config ───────────────────────────────────────────────────────────

fn validate_config_rules(_verbose: bool) -> Vec<TestResult> {
    println!("--- Config ---");
    let mut results = Vec::new();

    let default_errors = validate_config(&PathfindingConfig::default());
    results.push(TestResult {
        name: "config_default_valid".into(),
        passed: default_errors.is_empty(),
        detail: format!("{:?}", default_errors),
    });

    let bad = PathfindingConfig {
        grid_width: 0,
        orthogonal_cost: 0,
        ..Default::default()
    };
    let bad_errors = validate_config(&bad);
    results.push(TestResult {
        name: "config_rejects_bad".into(),
        passed: bad_errors.len() >= 2,
        detail: format!("{} errors: {:?}", bad_errors.len(), bad_errors),
    });

    results
}

// ── 5. Grid Scenarios ───────────────────────────────────────────────────

fn validate_grid_scenarios(verbose: bool) -> Vec<TestResult> {
    println!("--- Grid Scenarios ---");
    let mut results = Vec::new();

    let scenarios: Vec<GridScenario> = match serde_json::from_str(SCENARIOS_JSON) {
        Ok(s) => s,
        Err(e) => {
            results.push(TestResult {
                name: "grid_scenarios_parse".into(),
                passed: false,
                detail: format!("JSON parse error: {}", e),
            });
            return results;
        }
    };

    for scenario in &scenarios {
        let name = format!("grid_{}", scenario.name);
        let setup = NavGrid::new(scenario.width, scenario.height).and_then(|mut grid| {
            grid.set_allow_diagonal(scenario.allow_diagonal);
            for &cell in &scenario.blocked {
                grid.set_blocked(cell, true)?;
            }
            for &(x, y, p) in &scenario.penalties {
                grid.set_penalty((x, y), p)?;
            }
            Ok(grid)
        });
        let grid = match setup {
            Ok(grid) => grid,
            Err(e) => {
                results.push(TestResult {
                    name,
                    passed: false,
                    detail: format!("bad scenario: {}", e),
                });
                continue;
            }
        };

        let result = match grid.find_path(scenario.start, scenario.goal) {
            Ok(path) => {
                let cost = path.as_ref().map(|p| p.cost);
                if verbose {
                    if let Some(p) = &path {
                        println!("  {}: {:?} waypoints {:?}", scenario.name, p.cells, p.waypoints());
                    }
                }
                TestResult {
                    name,
                    passed: cost == scenario.expected_cost,
                    detail: format!("cost {:?}, expected {:?}", cost, scenario.expected_cost),
                }
            }
            Err(e) => TestResult {
                name,
                passed: false,
                detail: format!("query failed: {}", e),
            },
        };
        results.push(result);
    }

    results
}

// ── 6. Door Graph ───────────────────────────────────────────────────────

fn validate_door_graph(_verbose: bool) -> Vec<TestResult> {
    println!("--- Door Graph ---");
    let mut results = Vec::new();

    // Build a small 5-room graph: A-B-C (deck 0), D-E (deck 1), B-D cross-deck
    let edges = vec![
        DoorEdge {
            room_a: 1,
            room_b: 2,
            door_x: 10.0,
            door_y: 5.0,
        },
        DoorEdge {
            room_a: 2,
            room_b: 3,
            door_x: 20.0,
            door_y: 5.0,
        },
        DoorEdge {
            room_a: 2,
            room_b: 4,
            door_x: 15.0,
            door_y: 0.0,
        }, // cross-deck
        DoorEdge {
            room_a: 4,
            room_b: 5,
            door_x: 15.0,
            door_y: 10.0,
        },
    ];
    let mut nav = NavGraph::from_doors(&edges);

    let same = nav.find_path(1, 1);
    results.push(TestResult {
        name: "pathfind_same_room".into(),
        passed: same.is_some_and(|p| p.is_empty()),
        detail: "same room → empty path".into(),
    });

    let multi = nav.find_path(1, 3);
    results.push(TestResult {
        name: "pathfind_multi_hop".into(),
        passed: multi.as_ref().is_some_and(|p| p.len() == 2),
        detail: format!(
            "1→3 = 2 hops, {:.1} units",
            multi.as_deref().map(path_length).unwrap_or(0.0)
        ),
    });

    let cross = nav.find_path(1, 5);
    results.push(TestResult {
        name: "pathfind_cross_deck".into(),
        passed: cross.is_some_and(|p| p.len() == 3),
        detail: "1→5 = 3 hops (via shaft)".into(),
    });

    let mut nav2 = NavGraph::from_doors(&[
        DoorEdge {
            room_a: 1,
            room_b: 2,
            door_x: 5.0,
            door_y: 5.0,
        },
        DoorEdge {
            room_a: 3,
            room_b: 4,
            door_x: 15.0,
            door_y: 5.0,
        },
    ]);
    results.push(TestResult {
        name: "pathfind_unreachable".into(),
        passed: nav2.find_path(1, 4).is_none(),
        detail: "disconnected graph → None".into(),
    });

    // Room 4 reached cheapest via 2, but the walk on from 3's door is shorter.
    let mut nav3 = NavGraph::from_doors(
        &[(1, 2, 0.0, 0.0), (1, 3, 0.0, 0.0), (2, 4, 0.0, 5.0), (3, 4, 6.0, 0.0), (4, 5, 12.0, 0.0)]
            .map(|(room_a, room_b, door_x, door_y)| DoorEdge {
                room_a,
                room_b,
                door_x,
                door_y,
            }),
    );
    let entry = nav3.find_path(1, 5);
    let rooms: Vec<u32> = entry.iter().flatten().map(|w| w.room_id).collect();
    let length = entry.as_deref().map(path_length).unwrap_or(0.0);
    results.push(TestResult {
        name: "pathfind_entry_door_cost".into(),
        passed: rooms == [3, 4, 5] && (length - 12.0).abs() < 0.01,
        detail: format!("1→5 via {:?}, {:.1} units (expected via 3, 12.0)", rooms, length),
    });

    // Larger graph stress test
    let mut big_edges = Vec::new();
    for i in 0..999u32 {
        big_edges.push(DoorEdge {
            room_a: i,
            room_b: i + 1,
            door_x: i as f32,
            door_y: 0.0,
        });
    }
    let mut big_nav = NavGraph::from_doors(&big_edges);
    let long_path = big_nav.find_path(0, 999);
    results.push(TestResult {
        name: "pathfind_1000_rooms".into(),
        passed: long_path.is_some_and(|p| p.len() == 999),
        detail: "1000-room chain pathfind succeeds".into(),
    });

    results
}
