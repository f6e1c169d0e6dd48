use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::constants::{
    is_pellet_code, DEFAULT_TUNNEL_ROW, TILE_EMPTY, TILE_GHOST_SPAWN, TILE_PLAYER_START,
    TILE_SIZE, TILE_WALL,
};
use crate::types::{Direction, Tile};

const DEFAULT_MAZE_JSON: &str = include_str!("../data/maze.json");
pub const DEFAULT_LEVEL: &str = "1";

#[derive(Debug)]
pub enum MazeError {
    Io { path: PathBuf, source: io::Error },
    Json(serde_json::Error),
    MissingLevel(String),
    Empty,
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },
    InvalidTileCode {
        x: usize,
        y: usize,
        found: char,
    },
    TunnelRowOutOfRange {
        row: i32,
        height: i32,
    },
}

impl fmt::Display for MazeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "failed to read {}: {source}", path.display()),
            Self::Json(error) => write!(f, "invalid maze json: {error}"),
            Self::MissingLevel(level) => write!(f, "maze file has no level {level:?}"),
            Self::Empty => write!(f, "maze has no rows"),
            Self::RaggedRow {
                row,
                expected,
                actual,
            } => write!(f, "row {row} has {actual} tiles, expected {expected}"),
            Self::InvalidTileCode { x, y, found } => {
                write!(f, "invalid tile code {found:?} at ({x},{y})")
            }
            Self::TunnelRowOutOfRange { row, height } => {
                write!(f, "tunnel row {row} is outside a maze of height {height}")
            }
        }
    }
}

impl std::error::Error for MazeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json(error) => Some(error),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for MazeError {
    fn from(error: serde_json::Error) -> Self {
        Self::Json(error)
    }
}

#[derive(Debug, Deserialize)]
struct LevelFile {
    map: Vec<String>,
    #[serde(rename = "tunnelRow")]
    tunnel_row: Option<i32>,
}

#[derive(Clone, Debug)]
pub struct Maze {
    width: i32,
    height: i32,
    tile_size: i32,
    tunnel_row: Option<i32>,
    tiles: Vec<Vec<u8>>,
    player_start: Option<Tile>,
}

impl Maze {
    pub fn from_rows<S: AsRef<str>>(
        rows: &[S],
        tunnel_row: Option<i32>,
    ) -> Result<Self, MazeError> {
        let Some(first) = rows.first() else {
            return Err(MazeError::Empty);
        };
        let width = first.as_ref().chars().count();
        if width == 0 {
            return Err(MazeError::Empty);
        }

        let mut tiles = Vec::with_capacity(rows.len());
        let mut player_start = None;
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let actual = row.chars().count();
            if actual != width {
                return Err(MazeError::RaggedRow {
                    row: y,
                    expected: width,
                    actual,
                });
            }
            let mut codes = Vec::with_capacity(width);
            for (x, ch) in row.chars().enumerate() {
                let Some(code) = ch.to_digit(10) else {
                    return Err(MazeError::InvalidTileCode { x, y, found: ch });
                };
                let mut code = code as u8;
                if code == TILE_PLAYER_START {
                    if player_start.is_none() {
                        player_start = Some(Tile::new(x as i32, y as i32));
                    }
                    code = TILE_EMPTY;
                }
                codes.push(code);
            }
            tiles.push(codes);
        }

        let height = tiles.len() as i32;
        if let Some(row) = tunnel_row {
            if row < 0 || row >= height {
                return Err(MazeError::TunnelRowOutOfRange { row, height });
            }
        }

        Ok(Self {
            width: width as i32,
            height,
            tile_size: TILE_SIZE,
            tunnel_row,
            tiles,
            player_start,
        })
    }

    pub fn from_json_str(text: &str, level: &str) -> Result<Self, MazeError> {
        let mut levels: HashMap<String, LevelFile> = serde_json::from_str(text)?;
        let Some(file) = levels.remove(level) else {
            return Err(MazeError::MissingLevel(level.to_string()));
        };
        let tunnel_row = file.tunnel_row.or_else(|| {
            (file.map.len() as i32 > DEFAULT_TUNNEL_ROW).then_some(DEFAULT_TUNNEL_ROW)
        });
        Self::from_rows(file.map.as_slice(), tunnel_row)
    }

    pub fn load(path: &Path, level: &str) -> Result<Self, MazeError> {
        let text = fs::read_to_string(path).map_err(|source| MazeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text, level)
    }

    pub fn bundled() -> Result<Self, MazeError> {
        Self::bundled_level(DEFAULT_LEVEL)
    }

    pub fn bundled_level(level: &str) -> Result<Self, MazeError> {
        Self::from_json_str(DEFAULT_MAZE_JSON, level)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn tile_size(&self) -> i32 {
        self.tile_size
    }

    pub fn tunnel_row(&self) -> Option<i32> {
        self.tunnel_row
    }

    pub fn player_start(&self) -> Option<Tile> {
        self.player_start
    }

    pub fn is_tunnel_row(&self, y: i32) -> bool {
        self.tunnel_row == Some(y)
    }

    pub fn tunnel_mouths(&self) -> Option<(Tile, Tile)> {
        self.tunnel_row
            .map(|row| (Tile::new(0, row), Tile::new(self.width - 1, row)))
    }

    pub fn in_bounds(&self, tile: Tile) -> bool {
        tile.x >= 0 && tile.y >= 0 && tile.x < self.width && tile.y < self.height
    }

    pub fn code_at(&self, tile: Tile) -> Option<u8> {
        if !self.in_bounds(tile) {
            return None;
        }
        self.tiles
            .get(tile.y as usize)
            .and_then(|row| row.get(tile.x as usize))
            .copied()
    }

    pub fn is_walkable(&self, tile: Tile) -> bool {
        self.code_at(tile).map(|code| code != TILE_WALL).unwrap_or(false)
    }

    /// Substitutes the opposite edge column for a horizontal step off the
    /// tunnel row. Every other tile passes through unchanged.
    pub fn wrap(&self, tile: Tile) -> Tile {
        if !self.is_tunnel_row(tile.y) {
            return tile;
        }
        if tile.x < 0 {
            Tile::new(self.width - 1, tile.y)
        } else if tile.x >= self.width {
            Tile::new(0, tile.y)
        } else {
            tile
        }
    }

    pub fn step(&self, tile: Tile, dir: Direction) -> Tile {
        self.wrap(tile.offset(dir))
    }

    pub fn neighbors(&self, tile: Tile) -> Vec<Tile> {
        Direction::CARDINAL
            .iter()
            .map(|dir| self.step(tile, *dir))
            .filter(|next| self.is_walkable(*next))
            .collect()
    }

    pub fn tiles_with_code(&self, code: u8) -> Vec<Tile> {
        let mut out = Vec::new();
        for (y, row) in self.tiles.iter().enumerate() {
            for (x, value) in row.iter().enumerate() {
                if *value == code {
                    out.push(Tile::new(x as i32, y as i32));
                }
            }
        }
        out
    }

    pub fn ghost_spawn_tiles(&self) -> Vec<Tile> {
        self.tiles_with_code(TILE_GHOST_SPAWN)
    }

    pub fn walkable_tiles(&self) -> Vec<Tile> {
        let mut out = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let tile = Tile::new(x, y);
                if self.is_walkable(tile) {
                    out.push(tile);
                }
            }
        }
        out
    }

    pub fn take_pellet(&mut self, tile: Tile) -> Option<u8> {
        let code = self.code_at(tile)?;
        if !is_pellet_code(code) {
            return None;
        }
        self.tiles[tile.y as usize][tile.x as usize] = TILE_EMPTY;
        Some(code)
    }

    pub fn remaining_pellets(&self) -> usize {
        self.tiles
            .iter()
            .flat_map(|row| row.iter())
            .filter(|code| is_pellet_code(**code))
            .count()
    }

    pub fn reachable_from(&self, start: Tile) -> HashSet<Tile> {
        let mut out = HashSet::new();
        if !self.is_walkable(start) {
            return out;
        }
        let mut queue = VecDeque::new();
        out.insert(start);
        queue.push_back(start);
        while let Some(tile) = queue.pop_front() {
            for next in self.neighbors(tile) {
                if out.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        out
    }

    pub fn is_connected(&self) -> bool {
        let walkable = self.walkable_tiles();
        let Some(first) = walkable.first() else {
            return false;
        };
        self.reachable_from(*first).len() == walkable.len()
    }

    #[cfg(test)]
    pub(crate) fn set_code(&mut self, tile: Tile, code: u8) {
        self.tiles[tile.y as usize][tile.x as usize] = code;
    }
}

#[cfg(test)]
mod tests {
    use super::{Maze, MazeError};
    use crate::constants::{TILE_EMPTY, TILE_POWER_PELLET, TILE_PELLET};
    use crate::types::Tile;

    #[test]
    fn bundled_maze_is_connected_with_open_tunnel() {
        let maze = Maze::bundled().expect("bundled maze loads");
        assert_eq!(maze.width(), 19);
        assert_eq!(maze.height(), 21);
        assert_eq!(maze.tunnel_row(), Some(9));
        assert!(maze.is_connected());
        let (left, right) = maze.tunnel_mouths().expect("tunnel row");
        assert!(maze.is_walkable(left));
        assert!(maze.is_walkable(right));
        assert_eq!(maze.ghost_spawn_tiles().len(), 4);
    }

    #[test]
    fn player_start_marker_is_recorded_and_cleared() {
        let maze = Maze::bundled().expect("bundled maze loads");
        let start = maze.player_start().expect("start marker");
        assert_eq!(start, Tile::new(9, 15));
        assert_eq!(maze.code_at(start), Some(TILE_EMPTY));
    }

    #[test]
    fn tunnel_row_neighbors_wrap_across_edges() {
        let maze = Maze::bundled().expect("bundled maze loads");
        let left = Tile::new(0, 9);
        let right = Tile::new(18, 9);
        assert!(maze.neighbors(left).contains(&right));
        assert!(maze.neighbors(right).contains(&left));
        assert_eq!(maze.wrap(Tile::new(-1, 9)), right);
        assert_eq!(maze.wrap(Tile::new(19, 9)), left);
        // Off the tunnel row nothing wraps.
        assert_eq!(maze.wrap(Tile::new(-1, 8)), Tile::new(-1, 8));
        assert!(!maze.is_walkable(Tile::new(-1, 8)));
    }

    #[test]
    fn taking_pellets_keeps_walkability() {
        let mut maze = Maze::bundled().expect("bundled maze loads");
        let before = maze.remaining_pellets();
        let pellet = Tile::new(1, 1);
        let power = Tile::new(1, 2);
        assert_eq!(maze.take_pellet(pellet), Some(TILE_PELLET));
        assert_eq!(maze.take_pellet(power), Some(TILE_POWER_PELLET));
        assert_eq!(maze.take_pellet(pellet), None);
        assert_eq!(maze.remaining_pellets(), before - 2);
        assert!(maze.is_walkable(pellet));
        assert!(maze.is_walkable(power));
    }

    #[test]
    fn rejects_malformed_grids() {
        let empty: [&str; 0] = [];
        assert!(matches!(Maze::from_rows(&empty, None), Err(MazeError::Empty)));
        assert!(matches!(
            Maze::from_rows(&["111", "11"], None),
            Err(MazeError::RaggedRow {
                row: 1,
                expected: 3,
                actual: 2
            })
        ));
        assert!(matches!(
            Maze::from_rows(&["111", "1x1"], None),
            Err(MazeError::InvalidTileCode { x: 1, y: 1, found: 'x' })
        ));
        assert!(matches!(
            Maze::from_rows(&["111", "101"], Some(2)),
            Err(MazeError::TunnelRowOutOfRange { row: 2, height: 2 })
        ));
    }

    #[test]
    fn json_loader_reports_missing_level_and_defaults_tunnel() {
        let text = r#"{"1": {"map": ["111", "101", "111"]}}"#;
        assert!(matches!(
            Maze::from_json_str(text, "2"),
            Err(MazeError::MissingLevel(_))
        ));
        let small = Maze::from_json_str(text, "1").expect("valid level");
        assert_eq!(small.tunnel_row(), None);
        assert!(matches!(
            Maze::from_json_str("{not json", "1"),
            Err(MazeError::Json(_))
        ));
    }

    #[test]
    fn out_of_bounds_is_never_walkable() {
        let maze = Maze::from_rows(&["000", "000"], None).expect("valid grid");
        assert!(maze.is_walkable(Tile::new(0, 0)));
        assert!(!maze.is_walkable(Tile::new(3, 0)));
        assert!(!maze.is_walkable(Tile::new(0, -1)));
        assert_eq!(maze.code_at(Tile::new(-1, 0)), None);
    }
}
