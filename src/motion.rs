use crate::constants::CENTER_TOLERANCE;
use crate::maze::Maze;
use crate::types::{Direction, PixelPos, Tile};

pub fn tile_center(tile: Tile, tile_size: i32) -> PixelPos {
    let half = tile_size as f32 / 2.0;
    PixelPos::new(
        (tile.x * tile_size) as f32 + half,
        (tile.y * tile_size) as f32 + half,
    )
}

pub fn tile_at(pos: PixelPos, tile_size: i32) -> Tile {
    let size = tile_size as f32;
    Tile::new((pos.x / size).floor() as i32, (pos.y / size).floor() as i32)
}

pub fn offset_in_tile(value: f32, tile_size: i32) -> f32 {
    value.rem_euclid(tile_size as f32)
}

pub fn is_at_tile_center(pos: PixelPos, tile_size: i32) -> bool {
    let half = tile_size as f32 / 2.0;
    (offset_in_tile(pos.x, tile_size) - half).abs() <= CENTER_TOLERANCE
        && (offset_in_tile(pos.y, tile_size) - half).abs() <= CENTER_TOLERANCE
}

/// Moves `speed` pixels along `dir`, stopping on the next tile center ahead
/// if the step would pass it.
pub fn advance(pos: PixelPos, dir: Direction, speed: f32, tile_size: i32) -> PixelPos {
    let (dx, dy) = dir.delta();
    if dx != 0 {
        PixelPos::new(advance_axis(pos.x, dx, speed, tile_size), pos.y)
    } else if dy != 0 {
        PixelPos::new(pos.x, advance_axis(pos.y, dy, speed, tile_size))
    } else {
        pos
    }
}

fn advance_axis(value: f32, sign: i32, speed: f32, tile_size: i32) -> f32 {
    let size = tile_size as f32;
    let half = size / 2.0;
    let relative = (value - half) / size;
    let end = value + sign as f32 * speed;
    if sign > 0 {
        let next_center = (relative.floor() + 1.0) * size + half;
        end.min(next_center)
    } else {
        let next_center = (relative.ceil() - 1.0) * size + half;
        end.max(next_center)
    }
}

pub fn tunnel_teleport(maze: &Maze, pos: PixelPos, dir: Direction) -> Option<PixelPos> {
    let (left, right) = maze.tunnel_mouths()?;
    let tile_size = maze.tile_size();
    let tile = tile_at(pos, tile_size);
    if tile.y != left.y {
        return None;
    }
    let size = tile_size as f32;
    let half = size / 2.0;
    let offset = offset_in_tile(pos.x, tile_size);

    // Steps longer than half a tile can leave the grid outright.
    let span = maze.width() as f32 * size;
    if tile.x < left.x && dir == Direction::Left {
        return Some(PixelPos::new(pos.x + span, pos.y));
    }
    if tile.x > right.x && dir == Direction::Right {
        return Some(PixelPos::new(pos.x - span, pos.y));
    }

    if tile.x == left.x && dir == Direction::Left && offset < half {
        let mirrored = size - offset;
        let mirrored = if mirrored >= size { half } else { mirrored };
        return Some(PixelPos::new(right.x as f32 * size + mirrored, pos.y));
    }
    if tile.x == right.x && dir == Direction::Right && offset > half {
        let mirrored = size - offset;
        let mirrored = if mirrored <= 0.0 { half } else { mirrored };
        return Some(PixelPos::new(mirrored, pos.y));
    }
    None
}

pub fn manhattan(a: Tile, b: Tile) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

/// Direction that moves from `from` toward the adjacent-on-axis tile `to`.
/// Mouth-to-mouth moves on the tunnel row go through the wrap.
pub fn direction_between(maze: &Maze, from: Tile, to: Tile) -> Direction {
    if from == to {
        return Direction::None;
    }
    if from.y == to.y {
        if let Some((left, right)) = maze.tunnel_mouths() {
            if from.y == left.y {
                if from.x == left.x && to.x == right.x {
                    return Direction::Left;
                }
                if from.x == right.x && to.x == left.x {
                    return Direction::Right;
                }
            }
        }
        return if to.x > from.x {
            Direction::Right
        } else {
            Direction::Left
        };
    }
    if from.x == to.x {
        return if to.y > from.y {
            Direction::Down
        } else {
            Direction::Up
        };
    }

    // Not axis-aligned: greedy by distance after the move.
    let mut candidates = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];
    candidates.sort_by_key(|dir| manhattan(from.offset(*dir), to));
    candidates
        .into_iter()
        .find(|dir| maze.is_walkable(maze.step(from, *dir)))
        .unwrap_or(if to.x > from.x {
            Direction::Right
        } else {
            Direction::Left
        })
}
