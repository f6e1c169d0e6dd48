use super::*;

use crate::motion::direction_between;

impl Ghost {
    pub(super) fn active_graph(&self) -> &NavGraph {
        if self.is_returning() {
            &self.return_graph
        } else {
            &self.base_graph
        }
    }

    pub fn choose_direction_to(&mut self, maze: &Maze, next: Tile) {
        self.dir = direction_between(maze, self.tile(), next);
    }

    /// Re-plans from a node of the active graph. Chase aims at the node
    /// nearest the opposing agent; returning aims at home. A one-node route
    /// leaves the ghost holding on its node.
    pub(super) fn recompute_path(&mut self, maze: &Maze, chase_tile: Tile) {
        let tile = self.tile();
        let returning = self.is_returning();
        let graph = self.active_graph();
        if !graph.contains(tile) {
            return;
        }
        let goal = if returning {
            Some(self.home)
        } else {
            nearest_node(maze, graph, chase_tile)
        };
        let Some(goal) = goal else {
            self.dir = Direction::None;
            self.target_node = None;
            return;
        };

        let path = shortest_path(graph, tile, goal);
        self.target_node = path.get(1).copied();
        self.path = path;
        match self.target_node {
            Some(next) => self.choose_direction_to(maze, next),
            None => self.dir = Direction::None,
        }
    }

    pub(super) fn step_toward_graph(&mut self, maze: &Maze) {
        let tile = self.tile();
        match step_toward_nearest_node(maze, self.active_graph(), tile) {
            Some(step) => self.choose_direction_to(maze, step),
            None if self.active_graph().contains(tile) => {}
            None => self.report_unreachable_graph(tile),
        }
    }

    pub(super) fn redirect(&mut self, maze: &Maze, chase_tile: Tile) {
        let tile = self.tile();
        if self.is_returning() {
            if let Some(step) = step_toward(maze, tile, self.home) {
                self.choose_direction_to(maze, step);
            }
        } else if self.base_graph.contains(tile) {
            self.recompute_path(maze, chase_tile);
        } else {
            self.step_toward_graph(maze);
        }
    }

    fn report_unreachable_graph(&mut self, tile: Tile) {
        if self.integrity_reported {
            return;
        }
        self.integrity_reported = true;
        eprintln!(
            "[ghost] no graph node reachable from ({},{}); maze is disconnected",
            tile.x, tile.y
        );
    }
}
