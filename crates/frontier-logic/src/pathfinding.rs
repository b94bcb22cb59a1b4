//! Cheapest-path search over the door connectivity graph.
//!
//! `NavGraph` holds a pre-built adjacency list from door data and finds the
//! route with the shortest door-to-door walking distance. A search state is
//! a directed door traversal (the door used plus the room it enters), so
//! the open set is an [`IndexedPriorityHeap`] sized to twice the door
//! count. A traversal reached again more cheaply while still open is
//! repaired in place with `update_item`.
//! Results go through a small bounded cache.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::config::PathfindingConfig;
use crate::error::HeapError;
use crate::heap::{HeapHandle, IndexedPriorityHeap};

/// A door edge in the navigation graph.
#[derive(Debug, Clone, Copy)]
pub struct DoorEdge {
    pub room_a: u32,
    pub room_b: u32,
    pub door_x: f32,
    pub door_y: f32,
}

/// A single waypoint in a path: walk to this door position, enter this room.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    pub door_x: f32,
    pub door_y: f32,
    pub room_id: u32,
}

/// Walking distance from the first door of a path to its last.
pub fn path_length(path: &[Waypoint]) -> f32 {
    path.windows(2)
        .map(|w| door_distance((w[0].door_x, w[0].door_y), (w[1].door_x, w[1].door_y)))
        .sum()
}

fn door_distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    ((b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)).sqrt()
}

/// Open-set entry: cheapest door traversal first, fewer hops on equal cost.
#[derive(Debug, Clone, Copy)]
struct OpenStep {
    step: usize,
    cost: f32,
    hops: u32,
}

impl Ord for OpenStep {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.hops.cmp(&self.hops))
    }
}

impl PartialOrd for OpenStep {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for OpenStep {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenStep {}

#[derive(Debug, Clone, Copy)]
struct StepRecord {
    cost: f32,
    hops: u32,
    parent: Option<usize>,
    open: Option<HeapHandle>,
    closed: bool,
}

impl StepRecord {
    fn unvisited() -> Self {
        Self {
            cost: f32::INFINITY,
            hops: u32::MAX,
            parent: None,
            open: None,
            closed: false,
        }
    }
}

/// Per-query search state.
struct Search {
    open: IndexedPriorityHeap<OpenStep>,
    records: Vec<StepRecord>,
}

/// Pre-built navigation graph with cheapest-path search and path cache.
pub struct NavGraph {
    /// room_id → list of (neighbor_room_id, door_x, door_y)
    adj: HashMap<u32, Vec<(u32, f32, f32)>>,
    /// Every directed door traversal; `room_id` is the room being entered.
    steps: Vec<Waypoint>,
    /// room_id → id of the first traversal leaving it. The k-th entry of
    /// `adj[room]` is traversal `first_step[room] + k`.
    first_step: HashMap<u32, usize>,
    /// (from, to) → cached path. Simple bounded cache.
    cache: HashMap<(u32, u32), Vec<Waypoint>>,
    cache_capacity: usize,
}

impl NavGraph {
    /// Build a navigation graph from door edges.
    pub fn from_doors(doors: &[DoorEdge]) -> Self {
        Self::from_doors_with_cache(doors, 256)
    }

    /// Build a navigation graph sized by a pathfinding config.
    pub fn from_config(doors: &[DoorEdge], config: &PathfindingConfig) -> Self {
        Self::from_doors_with_cache(doors, config.path_cache_capacity)
    }

    /// Build a navigation graph with a specific cache capacity (0 disables it).
    pub fn from_doors_with_cache(doors: &[DoorEdge], cache_capacity: usize) -> Self {
        let mut adj: HashMap<u32, Vec<(u32, f32, f32)>> = HashMap::new();
        for door in doors {
            adj.entry(door.room_a)
                .or_default()
                .push((door.room_b, door.door_x, door.door_y));
            adj.entry(door.room_b)
                .or_default()
                .push((door.room_a, door.door_x, door.door_y));
        }

        let mut steps = Vec::with_capacity(doors.len() * 2);
        let mut first_step = HashMap::with_capacity(adj.len());
        for (&room, exits) in &adj {
            first_step.insert(room, steps.len());
            steps.extend(exits.iter().map(|&(next, door_x, door_y)| Waypoint {
                door_x,
                door_y,
                room_id: next,
            }));
        }

        Self {
            adj,
            steps,
            first_step,
            cache: HashMap::new(),
            cache_capacity,
        }
    }

    /// Find the cheapest path from `from_room` to `to_room`.
    ///
    /// Cost is the straight-line distance between consecutive doors; the
    /// first door is free to reach. Returns a list of waypoints (door
    /// positions + room entered), an empty vec if same room, `None` if
    /// unreachable.
    pub fn find_path(&mut self, from_room: u32, to_room: u32) -> Option<Vec<Waypoint>> {
        if from_room == to_room {
            return Some(vec![]);
        }

        let key = (from_room, to_room);
        if let Some(cached) = self.cache.get(&key) {
            return Some(cached.clone());
        }

        let result = self.search(from_room, to_room);

        if let Some(ref path) = result {
            if self.cache_capacity > 0 {
                if self.cache.len() >= self.cache_capacity {
                    // Evict an arbitrary entry (HashMap iteration order)
                    if let Some(&evict_key) = self.cache.keys().next() {
                        log::debug!("path cache full, evicting {:?}", evict_key);
                        self.cache.remove(&evict_key);
                    }
                }
                self.cache.insert(key, path.clone());
            }
        }

        result
    }

    /// Get neighbors of a room (for wandering to adjacent rooms).
    pub fn neighbors(&self, room_id: u32) -> &[(u32, f32, f32)] {
        self.adj.get(&room_id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Check if a room exists in the graph.
    pub fn has_room(&self, room_id: u32) -> bool {
        self.adj.contains_key(&room_id)
    }

    /// Number of rooms in the graph.
    pub fn room_count(&self) -> usize {
        self.adj.len()
    }

    /// Clear the path cache.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Number of cached paths.
    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }

    /// Search over door traversals rather than rooms: what it costs to cross
    /// a room depends on the door it was entered by, so two entries into
    /// the same room are distinct states.
    fn search(&self, from_room: u32, to_room: u32) -> Option<Vec<Waypoint>> {
        if !self.has_room(from_room) || !self.has_room(to_room) {
            return None;
        }

        // Every traversal enters the open set at most once at a time.
        let mut search = Search {
            open: IndexedPriorityHeap::new(self.steps.len()),
            records: vec![StepRecord::unvisited(); self.steps.len()],
        };

        if let Err(e) = self.expand(&mut search, from_room, None, 0.0, 0) {
            log::warn!("path {} -> {} aborted: {}", from_room, to_room, e);
            return None;
        }

        while let Ok(current) = search.open.remove_first() {
            let record = &mut search.records[current.step];
            record.open = None;
            record.closed = true;

            let room = self.steps[current.step].room_id;
            if room == to_room {
                log::debug!(
                    "path {} -> {}: cost {:.2}, {} hops",
                    from_room,
                    to_room,
                    current.cost,
                    current.hops
                );
                return Some(self.retrace(&search.records, current.step));
            }

            if let Err(e) = self.expand(
                &mut search,
                room,
                Some(current.step),
                current.cost,
                current.hops,
            ) {
                log::warn!("path {} -> {} aborted: {}", from_room, to_room, e);
                return None;
            }
        }

        None
    }

    /// Relax every traversal leaving `room`. `entered_by` is `None` for the
    /// start room, whose doors are free to reach.
    fn expand(
        &self,
        search: &mut Search,
        room: u32,
        entered_by: Option<usize>,
        cost: f32,
        hops: u32,
    ) -> Result<(), HeapError> {
        let Some(&first) = self.first_step.get(&room) else {
            return Ok(());
        };
        let entry_door = entered_by.map(|id| (self.steps[id].door_x, self.steps[id].door_y));

        for (k, &(_, door_x, door_y)) in self.neighbors(room).iter().enumerate() {
            let step = first + k;
            let leg = entry_door
                .map(|door| door_distance(door, (door_x, door_y)))
                .unwrap_or(0.0);
            let cost = cost + leg;
            let hops = hops + 1;

            let record = &mut search.records[step];
            if record.closed {
                continue;
            }
            let better = cost < record.cost || (cost == record.cost && hops < record.hops);
            if !better {
                continue;
            }

            record.cost = cost;
            record.hops = hops;
            record.parent = entered_by;
            record.open = Some(match record.open {
                Some(handle) => {
                    search.open.update_item(handle, |open| {
                        open.cost = cost;
                        open.hops = hops;
                    })?;
                    handle
                }
                None => search.open.add(OpenStep { step, cost, hops })?,
            });
        }

        Ok(())
    }

    fn retrace(&self, records: &[StepRecord], last: usize) -> Vec<Waypoint> {
        let mut path = vec![self.steps[last]];
        let mut current = last;
        while let Some(prev) = records[current].parent {
            path.push(self.steps[prev]);
            current = prev;
        }
        path.reverse();
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_graph() -> (Vec<DoorEdge>, NavGraph) {
        // A --door1--> B --door2--> C
        let doors = vec![
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
        ];
        let graph = NavGraph::from_doors(&doors);
        (doors, graph)
    }

    fn door(room_a: u32, room_b: u32, door_x: f32, door_y: f32) -> DoorEdge {
        DoorEdge {
            room_a,
            room_b,
            door_x,
            door_y,
        }
    }

    #[test]
    fn test_same_room() {
        let (_, mut graph) = linear_graph();
        let path = graph.find_path(1, 1);
        assert_eq!(path, Some(vec![]));
    }

    #[test]
    fn test_adjacent_rooms() {
        let (_, mut graph) = linear_graph();
        let path = graph.find_path(1, 2).unwrap();
        assert_eq!(path.len(), 1);
        assert_eq!(path[0].room_id, 2);
        assert!((path[0].door_x - 10.0).abs() < 0.01);
    }

    #[test]
    fn test_multi_hop() {
        let (_, mut graph) = linear_graph();
        let path = graph.find_path(1, 3).unwrap();
        assert_eq!(path.len(), 2);
        assert_eq!(path[0].room_id, 2);
        assert_eq!(path[1].room_id, 3);
        assert!((path_length(&path) - 10.0).abs() < 0.01);
    }

    #[test]
    fn test_reverse_direction() {
        let (_, mut graph) = linear_graph();
        let path = graph.find_path(3, 1).unwrap();
        assert_eq!(path.len(), 2);
        assert_eq!(path[0].room_id, 2);
        assert_eq!(path[1].room_id, 1);
    }

    #[test]
    fn test_unreachable() {
        let mut graph = NavGraph::from_doors(&[door(1, 2, 10.0, 5.0), door(3, 4, 0.0, 0.0)]);
        assert_eq!(graph.find_path(1, 99), None);
        assert_eq!(graph.find_path(1, 4), None);
        assert_eq!(graph.cache_size(), 0);
    }

    #[test]
    fn test_prefers_shorter_walk_over_fewer_hops() {
        // 1 -> 2 -> 5 walks 100 units; 1 -> 3 -> 4 -> 5 walks 2.
        let doors = vec![
            door(1, 2, 0.0, 0.0),
            door(2, 5, 100.0, 0.0),
            door(1, 3, 0.0, 0.0),
            door(3, 4, 1.0, 0.0),
            door(4, 5, 2.0, 0.0),
        ];
        let mut graph = NavGraph::from_doors(&doors);
        let path = graph.find_path(1, 5).unwrap();
        let rooms: Vec<u32> = path.iter().map(|w| w.room_id).collect();
        assert_eq!(rooms, vec![3, 4, 5]);
        assert!((path_length(&path) - 2.0).abs() < 0.01);
    }

    #[test]
    fn test_entry_door_decides_exit_cost() {
        // Room 4 is reached cheapest through 2, but its (0, 5) door is far
        // from the 4-5 door. Entering through 3 at (6, 0) is the shorter walk.
        let doors = vec![
            door(1, 2, 0.0, 0.0),
            door(1, 3, 0.0, 0.0),
            door(2, 4, 0.0, 5.0),
            door(3, 4, 6.0, 0.0),
            door(4, 5, 12.0, 0.0),
        ];
        let mut graph = NavGraph::from_doors(&doors);
        let path = graph.find_path(1, 5).unwrap();
        let rooms: Vec<u32> = path.iter().map(|w| w.room_id).collect();
        assert_eq!(rooms, vec![3, 4, 5]);
        assert!((path_length(&path) - 12.0).abs() < 0.01);
    }

    #[test]
    fn test_open_door_repaired_when_cheaper_entry_found() {
        // The 4-5 door is first offered from room 4 entered at (0, 0),
        // walking 10. Entering 4 at (10, 1) costs 4 but leaves 1 to go.
        let doors = vec![
            door(1, 2, 0.0, 0.0),
            door(2, 4, 0.0, 0.0),
            door(1, 3, 10.0, 5.0),
            door(3, 4, 10.0, 1.0),
            door(4, 5, 10.0, 0.0),
        ];
        let mut graph = NavGraph::from_doors(&doors);
        let path = graph.find_path(1, 5).unwrap();
        let rooms: Vec<u32> = path.iter().map(|w| w.room_id).collect();
        assert_eq!(rooms, vec![3, 4, 5]);
        assert!((path[1].door_y - 1.0).abs() < 0.01);
        assert!((path_length(&path) - 5.0).abs() < 0.01);
    }

    #[test]
    fn test_room_entered_by_two_doors() {
        // Parallel doors between the same rooms are separate traversals.
        let doors = vec![
            door(1, 2, 0.0, 0.0),
            door(1, 2, 20.0, 0.0),
            door(2, 3, 21.0, 0.0),
        ];
        let mut graph = NavGraph::from_doors(&doors);
        let path = graph.find_path(1, 3).unwrap();
        assert_eq!(path.len(), 2);
        assert!((path[0].door_x - 20.0).abs() < 0.01);
        assert!((path_length(&path) - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_cross_deck_via_shaft() {
        // Deck 0: rooms 1, 2, shaft 10
        // Deck 1: rooms 3, 4, shaft 11
        // Shaft 10 <-> Shaft 11 (cross-deck door)
        let doors = vec![
            door(1, 10, 5.0, 5.0),
            door(2, 10, 6.0, 5.0),
            door(10, 11, 5.0, 5.0), // shaft door
            door(11, 3, 5.0, 15.0),
            door(11, 4, 6.0, 15.0),
        ];
        let mut graph = NavGraph::from_doors(&doors);
        let path = graph.find_path(1, 4).unwrap();
        assert!(path.len() >= 3); // at least: shaft10, shaft11, room4
        assert_eq!(path.last().unwrap().room_id, 4);
    }

    #[test]
    fn test_cache_hit() {
        let (_, mut graph) = linear_graph();
        let path1 = graph.find_path(1, 3).unwrap();
        assert_eq!(graph.cache_size(), 1);
        let path2 = graph.find_path(1, 3).unwrap();
        assert_eq!(path1, path2);
        assert_eq!(graph.cache_size(), 1); // no new entry
        graph.clear_cache();
        assert_eq!(graph.cache_size(), 0);
    }

    #[test]
    fn test_cache_eviction() {
        let doors = vec![
            door(1, 2, 10.0, 5.0),
            door(2, 3, 20.0, 5.0),
            door(3, 4, 30.0, 5.0),
        ];
        let mut graph = NavGraph::from_doors_with_cache(&doors, 2);
        graph.find_path(1, 2); // cache: {(1,2)}
        graph.find_path(1, 3); // cache: {(1,2), (1,3)}
        assert_eq!(graph.cache_size(), 2);
        graph.find_path(1, 4); // evicts one, cache still at 2
        assert_eq!(graph.cache_size(), 2);
    }

    #[test]
    fn test_cache_disabled() {
        let config = PathfindingConfig {
            path_cache_capacity: 0,
            ..Default::default()
        };
        let (doors, _) = linear_graph();
        let mut graph = NavGraph::from_config(&doors, &config);
        assert!(graph.find_path(1, 3).is_some());
        assert_eq!(graph.cache_size(), 0);
    }

    #[test]
    fn test_neighbors() {
        let (_, graph) = linear_graph();
        let n = graph.neighbors(2);
        assert_eq!(n.len(), 2); // connected to room 1 and room 3
        assert!(graph.neighbors(99).is_empty());
    }

    #[test]
    fn test_has_room() {
        let (_, graph) = linear_graph();
        assert!(graph.has_room(1));
        assert!(graph.has_room(2));
        assert!(!graph.has_room(99));
        assert_eq!(graph.room_count(), 3);
    }

    #[test]
    fn test_branching_graph() {
        //     1
        //    / \
        //   2   3
        //  / \
        // 4   5
        let doors = vec![
            door(1, 2, 5.0, 5.0),
            door(1, 3, 15.0, 5.0),
            door(2, 4, 3.0, 10.0),
            door(2, 5, 7.0, 10.0),
        ];
        let mut graph = NavGraph::from_doors(&doors);
        // 3→1→2→5
        let path = graph.find_path(3, 5).unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(path[2].room_id, 5);
        // 3→1→2→4
        let path = graph.find_path(3, 4).unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(path[2].room_id, 4);
    }
}
