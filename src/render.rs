use crate::constants::{TILE_PELLET, TILE_POWER_PELLET, TILE_WALL};
use crate::motion::tile_at;
use crate::types::{PixelPos, Tile, VisualState};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AgentKind {
    Player,
    Ghost,
}

pub trait Renderer {
    fn begin_frame(&mut self, width: i32, height: i32, tile_size: i32);
    fn draw_tile(&mut self, tile: Tile, code: u8);
    fn draw_agent(&mut self, kind: AgentKind, pos: PixelPos, visual: VisualState);
    fn end_frame(&mut self);
}

#[derive(Clone, Debug, Default)]
pub struct AsciiRenderer {
    tile_size: i32,
    rows: Vec<Vec<char>>,
    frame: String,
}

impl AsciiRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame(&self) -> &str {
        &self.frame
    }

    fn put(&mut self, tile: Tile, glyph: char) {
        if tile.x < 0 || tile.y < 0 {
            return;
        }
        if let Some(cell) = self
            .rows
            .get_mut(tile.y as usize)
            .and_then(|row| row.get_mut(tile.x as usize))
        {
            *cell = glyph;
        }
    }
}

impl Renderer for AsciiRenderer {
    fn begin_frame(&mut self, width: i32, height: i32, tile_size: i32) {
        self.tile_size = tile_size;
        self.rows = vec![vec![' '; width.max(0) as usize]; height.max(0) as usize];
    }

    fn draw_tile(&mut self, tile: Tile, code: u8) {
        let glyph = match code {
            TILE_WALL => '#',
            TILE_PELLET => '.',
            TILE_POWER_PELLET => 'o',
            _ => ' ',
        };
        self.put(tile, glyph);
    }

    fn draw_agent(&mut self, kind: AgentKind, pos: PixelPos, visual: VisualState) {
        let glyph = match (kind, visual) {
            (AgentKind::Player, _) => 'C',
            (AgentKind::Ghost, VisualState::Normal) => 'G',
            (AgentKind::Ghost, VisualState::Scatter) => 'g',
        };
        self.put(tile_at(pos, self.tile_size), glyph);
    }

    fn end_frame(&mut self) {
        self.frame = self
            .rows
            .iter()
            .map(|row| row.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n");
    }
}
