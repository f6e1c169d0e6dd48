use crate::constants::{
    is_pellet_code, COLLISION_FACTOR, GHOST_TAKEDOWN_SCORE, INITIAL_LIVES, PLAYER_SPEED,
};
use crate::ghost::{Ghost, GhostOptions};
use crate::maze::Maze;
use crate::motion::{direction_between, manhattan};
use crate::nav::{search_tiles, step_toward};
use crate::player::Player;
use crate::render::{AgentKind, Renderer};
use crate::rng::Rng;
use crate::types::{
    Direction, GameOverReason, GameSummary, GhostMode, RuntimeEvent, Snapshot, Tile,
    VisualState,
};

mod autopilot;
mod rules;
mod utils;

use self::utils::{now_ms, random_direction};

#[derive(Clone, Debug, Default)]
struct RunStats {
    pellets_eaten: i32,
    power_pellets_eaten: i32,
    ghosts_taken_down: i32,
    times_caught: i32,
}

#[derive(Clone, Debug)]
pub struct GameEngineOptions {
    pub initial_lives: u32,
    pub player_speed: f32,
    pub ghost: GhostOptions,
    pub autopilot: bool,
}

impl Default for GameEngineOptions {
    fn default() -> Self {
        Self {
            initial_lives: INITIAL_LIVES,
            player_speed: PLAYER_SPEED,
            ghost: GhostOptions::default(),
            autopilot: false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct GameEngine {
    pub started_at_ms: u64,
    pub maze: Maze,

    options: GameEngineOptions,
    rng: Rng,
    player: Player,
    ghost: Ghost,
    events: Vec<RuntimeEvent>,
    stats: RunStats,
    lives: u32,
    score: i32,

    elapsed_ms: u64,
    tick_counter: u64,
    ended: bool,
    end_reason: Option<GameOverReason>,
}

impl GameEngine {
    pub fn new(maze: Maze, seed: u32, options: GameEngineOptions) -> Self {
        let mut rng = Rng::new(seed);
        let ghost = Ghost::new(&maze, options.ghost.clone(), rng.next_u32());
        let player = Player::new(&maze, options.player_speed);
        Self {
            started_at_ms: now_ms(),
            lives: options.initial_lives,
            maze,
            options,
            rng,
            player,
            ghost,
            events: Vec::new(),
            stats: RunStats::default(),
            score: 0,
            elapsed_ms: 0,
            tick_counter: 0,
            ended: false,
            end_reason: None,
        }
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn end_reason(&self) -> Option<GameOverReason> {
        self.end_reason
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn tick(&self) -> u64 {
        self.tick_counter
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn ghost(&self) -> &Ghost {
        &self.ghost
    }

    pub fn set_player_direction(&mut self, dir: Direction) {
        self.player.queue_direction(dir);
    }

    pub fn step(&mut self, dt_ms: u64) {
        if self.ended {
            return;
        }
        self.tick_counter += 1;
        self.elapsed_ms = self.elapsed_ms.saturating_add(dt_ms);
        let now_ms = self.started_at_ms.saturating_add(self.elapsed_ms);

        if self.options.autopilot && self.player.is_at_center() {
            let dir = self.choose_autopilot_direction();
            self.player.queue_direction(dir);
        }
        let tick = self.player.update(&mut self.maze);
        self.score += tick.points;
        if tick.ate_pellet {
            self.stats.pellets_eaten += 1;
        }
        if let Some(tile) = tick.ate_power_pellet {
            self.stats.power_pellets_eaten += 1;
            self.events.push(RuntimeEvent::PowerPelletEaten {
                x: tile.x,
                y: tile.y,
            });
            self.ghost.enter_scatter(now_ms);
            if let Some(until_ms) = self.ghost.scatter_until_ms() {
                self.events.push(RuntimeEvent::ScatterStarted { until_ms });
            }
        }

        let mode_before = self.ghost.mode();
        self.ghost.update(&self.maze, self.player.position(), now_ms);
        self.record_mode_change(mode_before, self.ghost.mode());

        self.resolve_collision();
        self.check_game_over();
    }

    pub fn build_snapshot(&mut self, include_events: bool) -> Snapshot {
        let snapshot = Snapshot {
            tick: self.tick_counter,
            now_ms: self.started_at_ms + self.elapsed_ms,
            lives: self.lives,
            score: self.score,
            remaining_pellets: self.maze.remaining_pellets(),
            player: self.player.view(),
            ghost: self.ghost.view(),
            events: if include_events {
                self.events.clone()
            } else {
                Vec::new()
            },
        };
        if include_events {
            self.events.clear();
        }
        snapshot
    }

    pub fn build_summary(&self) -> GameSummary {
        GameSummary {
            reason: self.end_reason,
            duration_ms: self.elapsed_ms,
            ticks: self.tick_counter,
            score: self.score,
            lives_left: self.lives,
            pellets_eaten: self.stats.pellets_eaten,
            power_pellets_eaten: self.stats.power_pellets_eaten,
            ghosts_taken_down: self.stats.ghosts_taken_down,
            times_caught: self.stats.times_caught,
            remaining_pellets: self.maze.remaining_pellets(),
        }
    }

    pub fn render<R: Renderer>(&self, renderer: &mut R) {
        renderer.begin_frame(self.maze.width(), self.maze.height(), self.maze.tile_size());
        for y in 0..self.maze.height() {
            for x in 0..self.maze.width() {
                let tile = Tile::new(x, y);
                if let Some(code) = self.maze.code_at(tile) {
                    renderer.draw_tile(tile, code);
                }
            }
        }
        renderer.draw_agent(
            AgentKind::Player,
            self.player.position(),
            VisualState::Normal,
        );
        renderer.draw_agent(
            AgentKind::Ghost,
            self.ghost.position(),
            self.ghost.visual_state(),
        );
        renderer.end_frame();
    }
}
