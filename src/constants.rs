pub const TICK_RATE: u32 = 60;
pub const TICK_MS: u64 = 1000 / TICK_RATE as u64;

pub const TILE_SIZE: i32 = 30;
pub const DEFAULT_TUNNEL_ROW: i32 = 9;
pub const CENTER_TOLERANCE: f32 = 1.0;

pub const TILE_EMPTY: u8 = 0;
pub const TILE_WALL: u8 = 1;
pub const TILE_PELLET: u8 = 2;
pub const TILE_POWER_PELLET: u8 = 3;
pub const TILE_GHOST_SPAWN: u8 = 5;
pub const TILE_PLAYER_START: u8 = 9;

pub const PLAYER_SPEED: f32 = 2.0;
pub const GHOST_NORMAL_SPEED: f32 = 2.0;
pub const GHOST_RETURN_SPEED: f32 = 5.0;

pub const SCATTER_MIN_MS: u64 = 5_000;
pub const SCATTER_MAX_MS: u64 = 8_000;

pub const INITIAL_LIVES: u32 = 3;
pub const PELLET_SCORE: i32 = 10;
pub const POWER_PELLET_SCORE: i32 = 50;
pub const GHOST_TAKEDOWN_SCORE: i32 = 200;
pub const COLLISION_FACTOR: f32 = 0.8;

pub fn agent_radius(tile_size: i32) -> f32 {
    (tile_size / 2 - 2) as f32
}

pub fn is_pellet_code(code: u8) -> bool {
    code == TILE_PELLET || code == TILE_POWER_PELLET
}
