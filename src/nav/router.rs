use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, VecDeque};

use crate::maze::Maze;
use crate::types::Tile;

use super::graph::NavGraph;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileSearch {
    pub goal: Tile,
    pub first_step: Option<Tile>,
    pub distance: u32,
}

/// Dijkstra over the node graph. Returns `[start]` when `start == goal` or
/// when `goal` cannot be reached; callers treat that as "stay put".
pub fn shortest_path(graph: &NavGraph, start: Tile, goal: Tile) -> Vec<Tile> {
    if start == goal {
        return vec![start];
    }

    let mut dist: HashMap<Tile, u32> = HashMap::new();
    let mut prev: HashMap<Tile, Tile> = HashMap::new();
    let mut queue = BinaryHeap::new();
    dist.insert(start, 0);
    queue.push(Reverse((0u32, start)));

    while let Some(Reverse((cost, node))) = queue.pop() {
        if node == goal {
            break;
        }
        if dist.get(&node).is_some_and(|best| cost > *best) {
            continue;
        }
        for edge in graph.edges(node) {
            let next_cost = cost.saturating_add(edge.weight);
            let improved = dist
                .get(&edge.to)
                .map(|known| next_cost < *known)
                .unwrap_or(true);
            if improved {
                dist.insert(edge.to, next_cost);
                prev.insert(edge.to, node);
                queue.push(Reverse((next_cost, edge.to)));
            }
        }
    }

    if !prev.contains_key(&goal) {
        return vec![start];
    }
    let mut path = vec![goal];
    let mut cursor = goal;
    while let Some(parent) = prev.get(&cursor) {
        path.push(*parent);
        cursor = *parent;
        if cursor == start {
            break;
        }
    }
    path.reverse();
    path
}

pub fn path_cost(graph: &NavGraph, path: &[Tile]) -> Option<u32> {
    path.windows(2)
        .map(|pair| graph.weight(pair[0], pair[1]))
        .sum()
}

/// Breadth-first search from `from` until a tile satisfying `is_goal` is
/// dequeued. `from` itself is tested first.
pub fn search_tiles<F>(maze: &Maze, from: Tile, is_goal: F) -> Option<TileSearch>
where
    F: Fn(Tile) -> bool,
{
    if is_goal(from) {
        return Some(TileSearch {
            goal: from,
            first_step: None,
            distance: 0,
        });
    }

    let mut parents: HashMap<Tile, Tile> = HashMap::new();
    let mut queue = VecDeque::new();
    parents.insert(from, from);
    queue.push_back(from);

    while let Some(tile) = queue.pop_front() {
        for next in maze.neighbors(tile) {
            if parents.contains_key(&next) {
                continue;
            }
            parents.insert(next, tile);
            if is_goal(next) {
                return Some(trace_back(&parents, from, next));
            }
            queue.push_back(next);
        }
    }
    None
}

fn trace_back(parents: &HashMap<Tile, Tile>, from: Tile, goal: Tile) -> TileSearch {
    let mut step = goal;
    let mut distance = 1;
    while let Some(parent) = parents.get(&step) {
        if *parent == from {
            break;
        }
        step = *parent;
        distance += 1;
    }
    TileSearch {
        goal,
        first_step: Some(step),
        distance,
    }
}

pub fn nearest_node(maze: &Maze, graph: &NavGraph, from: Tile) -> Option<Tile> {
    search_tiles(maze, from, |tile| graph.contains(tile)).map(|found| found.goal)
}

pub fn step_toward_nearest_node(maze: &Maze, graph: &NavGraph, from: Tile) -> Option<Tile> {
    search_tiles(maze, from, |tile| graph.contains(tile)).and_then(|found| found.first_step)
}

pub fn step_toward(maze: &Maze, from: Tile, to: Tile) -> Option<Tile> {
    search_tiles(maze, from, |tile| tile == to).and_then(|found| found.first_step)
}
