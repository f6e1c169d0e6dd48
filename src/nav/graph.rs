use std::collections::{BTreeMap, BTreeSet};

use crate::maze::Maze;
use crate::types::{Direction, Tile};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TileKind {
    Wall,
    Isolated,
    DeadEnd,
    Corridor,
    Corner,
    Junction,
}

impl TileKind {
    pub fn is_decision_point(self) -> bool {
        matches!(self, Self::DeadEnd | Self::Corner | Self::Junction)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edge {
    pub to: Tile,
    pub weight: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NavGraph {
    nodes: BTreeSet<Tile>,
    adjacency: BTreeMap<Tile, Vec<Edge>>,
}

pub fn classify_tile(maze: &Maze, tile: Tile) -> TileKind {
    if !maze.is_walkable(tile) {
        return TileKind::Wall;
    }
    let neighbors = maze.neighbors(tile);
    match neighbors.as_slice() {
        [] => TileKind::Isolated,
        [_] => TileKind::DeadEnd,
        [a, b] => {
            let horizontal = a.y == tile.y && b.y == tile.y;
            let vertical = a.x == tile.x && b.x == tile.x;
            if horizontal || vertical {
                TileKind::Corridor
            } else {
                TileKind::Corner
            }
        }
        _ => TileKind::Junction,
    }
}

impl NavGraph {
    pub fn build(maze: &Maze) -> Self {
        let mut nodes = BTreeSet::new();
        for y in 0..maze.height() {
            for x in 0..maze.width() {
                let tile = Tile::new(x, y);
                if classify_tile(maze, tile).is_decision_point() {
                    nodes.insert(tile);
                }
            }
        }
        // The wrap move is decided at the tunnel mouths, so they are always nodes.
        if let Some((left, right)) = maze.tunnel_mouths() {
            for mouth in [left, right] {
                if maze.is_walkable(mouth) {
                    nodes.insert(mouth);
                }
            }
        }

        let mut graph = Self {
            adjacency: nodes.iter().map(|node| (*node, Vec::new())).collect(),
            nodes,
        };
        let origins: Vec<Tile> = graph.nodes.iter().copied().collect();
        for origin in origins {
            for dir in Direction::CARDINAL {
                if let Some(edge) = raycast(maze, &graph.nodes, origin, dir) {
                    graph.insert_edge(origin, edge);
                }
            }
        }
        graph.symmetrize();
        graph
    }

    pub fn with_home(&self, maze: &Maze, home: Tile) -> Self {
        let mut graph = self.clone();
        if graph.contains(home) || !maze.is_walkable(home) {
            return graph;
        }
        graph.nodes.insert(home);
        graph.adjacency.entry(home).or_default();
        for dir in Direction::CARDINAL {
            if let Some(edge) = raycast(maze, &graph.nodes, home, dir) {
                graph.insert_edge(home, edge);
                graph.insert_edge(
                    edge.to,
                    Edge {
                        to: home,
                        weight: edge.weight,
                    },
                );
            }
        }
        graph
    }

    pub fn from_edges(edges: &[(Tile, Tile, u32)]) -> Self {
        let mut graph = Self::default();
        for &(a, b, weight) in edges {
            for node in [a, b] {
                graph.nodes.insert(node);
                graph.adjacency.entry(node).or_default();
            }
            graph.insert_edge(a, Edge { to: b, weight });
            graph.insert_edge(b, Edge { to: a, weight });
        }
        graph
    }

    pub fn contains(&self, tile: Tile) -> bool {
        self.nodes.contains(&tile)
    }

    pub fn nodes(&self) -> impl Iterator<Item = Tile> + '_ {
        self.nodes.iter().copied()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edges(&self, node: Tile) -> &[Edge] {
        self.adjacency
            .get(&node)
            .map(|edges| edges.as_slice())
            .unwrap_or(&[])
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(|edges| edges.len()).sum()
    }

    pub fn weight(&self, from: Tile, to: Tile) -> Option<u32> {
        self.edges(from)
            .iter()
            .filter(|edge| edge.to == to)
            .map(|edge| edge.weight)
            .min()
    }

    pub fn is_symmetric(&self) -> bool {
        self.adjacency.iter().all(|(from, edges)| {
            edges.iter().all(|edge| {
                self.edges(edge.to)
                    .iter()
                    .any(|back| back.to == *from && back.weight == edge.weight)
            })
        })
    }

    fn insert_edge(&mut self, from: Tile, edge: Edge) {
        let edges = self.adjacency.entry(from).or_default();
        if !edges.contains(&edge) {
            edges.push(edge);
        }
    }

    fn symmetrize(&mut self) {
        let discovered: Vec<(Tile, Edge)> = self
            .adjacency
            .iter()
            .flat_map(|(from, edges)| edges.iter().map(move |edge| (*from, *edge)))
            .collect();
        for (from, edge) in discovered {
            self.insert_edge(
                edge.to,
                Edge {
                    to: from,
                    weight: edge.weight,
                },
            );
        }
    }
}

fn raycast(maze: &Maze, nodes: &BTreeSet<Tile>, origin: Tile, dir: Direction) -> Option<Edge> {
    let limit = (maze.width() * maze.height()).max(1) as u32;
    let mut current = origin;
    let mut distance = 0u32;
    loop {
        let next = maze.step(current, dir);
        if !maze.is_walkable(next) {
            return None;
        }
        distance += 1;
        if next == origin || distance > limit {
            return None;
        }
        if nodes.contains(&next) {
            return Some(Edge {
                to: next,
                weight: distance,
            });
        }
        current = next;
    }
}
