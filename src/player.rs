use crate::constants::{agent_radius, PELLET_SCORE, POWER_PELLET_SCORE, TILE_PELLET, TILE_POWER_PELLET};
use crate::maze::Maze;
use crate::motion::{advance, is_at_tile_center, tile_at, tile_center, tunnel_teleport};
use crate::types::{AgentView, Direction, PixelPos, Tile};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlayerTick {
    pub points: i32,
    pub ate_pellet: bool,
    pub ate_power_pellet: Option<Tile>,
}

#[derive(Clone, Debug)]
pub struct Player {
    start: Tile,
    tile_size: i32,
    speed: f32,
    pos: PixelPos,
    dir: Direction,
    queued: Direction,
}

impl Player {
    pub fn new(maze: &Maze, speed: f32) -> Self {
        let start = maze
            .player_start()
            .or_else(|| maze.walkable_tiles().first().copied())
            .unwrap_or(Tile::new(0, 0));
        Self {
            start,
            tile_size: maze.tile_size(),
            speed,
            pos: tile_center(start, maze.tile_size()),
            dir: Direction::None,
            queued: Direction::None,
        }
    }

    pub fn reset(&mut self) {
        self.pos = tile_center(self.start, self.tile_size);
        self.dir = Direction::None;
        self.queued = Direction::None;
    }

    pub fn queue_direction(&mut self, dir: Direction) {
        self.queued = dir;
    }

    pub fn can_move(&self, maze: &Maze, dir: Direction) -> bool {
        dir != Direction::None && maze.is_walkable(maze.step(self.tile(), dir))
    }

    pub fn update(&mut self, maze: &mut Maze) -> PlayerTick {
        let mut tick = PlayerTick::default();

        if self.is_at_center() {
            let tile = self.tile();
            self.pos = tile_center(tile, self.tile_size);
            match maze.take_pellet(tile) {
                Some(TILE_PELLET) => {
                    tick.points += PELLET_SCORE;
                    tick.ate_pellet = true;
                }
                Some(TILE_POWER_PELLET) => {
                    tick.points += POWER_PELLET_SCORE;
                    tick.ate_power_pellet = Some(tile);
                }
                _ => {}
            }
            if self.can_move(maze, self.queued) {
                self.dir = self.queued;
                self.queued = Direction::None;
            }
        }

        if self.can_move(maze, self.dir) {
            self.pos = advance(self.pos, self.dir, self.speed, self.tile_size);
        } else if self.dir != Direction::None {
            let center = tile_center(self.tile(), self.tile_size);
            let short_of_center = match self.dir {
                Direction::Right => self.pos.x < center.x,
                Direction::Left => self.pos.x > center.x,
                Direction::Down => self.pos.y < center.y,
                Direction::Up => self.pos.y > center.y,
                Direction::None => false,
            };
            if short_of_center {
                self.pos = advance(self.pos, self.dir, self.speed, self.tile_size);
            } else {
                self.pos = center;
                self.dir = Direction::None;
            }
        }

        if let Some(pos) = tunnel_teleport(maze, self.pos, self.dir) {
            self.pos = pos;
        }
        tick
    }

    pub fn is_at_center(&self) -> bool {
        is_at_tile_center(self.pos, self.tile_size)
    }

    pub fn position(&self) -> PixelPos {
        self.pos
    }

    pub fn tile(&self) -> Tile {
        tile_at(self.pos, self.tile_size)
    }

    pub fn start(&self) -> Tile {
        self.start
    }

    pub fn direction(&self) -> Direction {
        self.dir
    }

    pub fn queued_direction(&self) -> Direction {
        self.queued
    }

    pub fn radius(&self) -> f32 {
        agent_radius(self.tile_size)
    }

    pub fn view(&self) -> AgentView {
        AgentView {
            x: self.pos.x,
            y: self.pos.y,
            tile: self.tile(),
            dir: self.dir,
        }
    }

    #[cfg(test)]
    pub(crate) fn place_at(&mut self, tile: Tile) {
        self.pos = tile_center(tile, self.tile_size);
        self.dir = Direction::None;
        self.queued = Direction::None;
    }
}
