use super::*;

const ESCAPE_RADIUS: i32 = 3;

impl GameEngine {
    pub(super) fn choose_autopilot_direction(&mut self) -> Direction {
        let from = self.player.tile();
        let ghost_tile = self.ghost.tile();

        match self.ghost.mode() {
            GhostMode::Scatter => {
                if let Some(step) = step_toward(&self.maze, from, ghost_tile) {
                    return direction_between(&self.maze, from, step);
                }
            }
            GhostMode::Chase if manhattan(from, ghost_tile) <= ESCAPE_RADIUS => {
                return self.choose_escape_direction(from, ghost_tile);
            }
            _ => {}
        }

        let maze = &self.maze;
        let pellet = search_tiles(maze, from, |tile| {
            maze.code_at(tile).is_some_and(is_pellet_code)
        });
        if let Some(step) = pellet.and_then(|found| found.first_step) {
            return direction_between(maze, from, step);
        }
        self.choose_random_open_direction()
    }

    fn choose_escape_direction(&mut self, from: Tile, ghost_tile: Tile) -> Direction {
        let mut best = Direction::None;
        let mut best_dist = i32::MIN;
        for dir in [
            Direction::Up,
            Direction::Down,
            Direction::Left,
            Direction::Right,
        ] {
            if !self.player.can_move(&self.maze, dir) {
                continue;
            }
            let dist = manhattan(self.maze.step(from, dir), ghost_tile);
            if dist > best_dist {
                best_dist = dist;
                best = dir;
            }
        }
        if best == Direction::None {
            self.choose_random_open_direction()
        } else {
            best
        }
    }

    fn choose_random_open_direction(&mut self) -> Direction {
        for _ in 0..8 {
            let dir = random_direction(&mut self.rng);
            if self.player.can_move(&self.maze, dir) {
                return dir;
            }
        }
        Direction::None
    }
}
