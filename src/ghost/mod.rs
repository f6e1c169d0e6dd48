use crate::constants::{
    agent_radius, GHOST_NORMAL_SPEED, GHOST_RETURN_SPEED, SCATTER_MAX_MS, SCATTER_MIN_MS,
};
use crate::maze::Maze;
use crate::motion::{advance, is_at_tile_center, tile_at, tile_center, tunnel_teleport};
use crate::nav::{
    nearest_node, shortest_path, step_toward, step_toward_nearest_node, NavGraph,
};
use crate::rng::Rng;
use crate::types::{AgentView, Direction, GhostMode, GhostView, PixelPos, Tile, VisualState};

mod behavior;
mod steering;

#[derive(Clone, Debug)]
pub struct GhostOptions {
    pub normal_speed: f32,
    pub return_speed: f32,
    pub scatter_min_ms: u64,
    pub scatter_max_ms: u64,
    pub home: Option<Tile>,
}

impl Default for GhostOptions {
    fn default() -> Self {
        Self {
            normal_speed: GHOST_NORMAL_SPEED,
            return_speed: GHOST_RETURN_SPEED,
            scatter_min_ms: SCATTER_MIN_MS,
            scatter_max_ms: SCATTER_MAX_MS,
            home: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Ghost {
    options: GhostOptions,
    rng: Rng,
    tile_size: i32,
    base_graph: NavGraph,
    return_graph: NavGraph,
    home: Tile,

    pos: PixelPos,
    dir: Direction,
    speed: f32,
    path: Vec<Tile>,
    target_node: Option<Tile>,
    last_safe: Tile,

    mode: GhostMode,
    visual: VisualState,
    scatter_until_ms: Option<u64>,
    integrity_reported: bool,
}

impl Ghost {
    pub fn new(maze: &Maze, options: GhostOptions, seed: u32) -> Self {
        let mut rng = Rng::new(seed);
        let home = pick_home(maze, options.home, &mut rng);
        let base_graph = NavGraph::build(maze);
        let return_graph = base_graph.with_home(maze, home);
        let tile_size = maze.tile_size();

        let mut ghost = Self {
            speed: options.normal_speed,
            options,
            rng,
            tile_size,
            base_graph,
            return_graph,
            home,
            pos: tile_center(home, tile_size),
            dir: Direction::None,
            path: Vec::new(),
            target_node: None,
            last_safe: home,
            mode: GhostMode::Chase,
            visual: VisualState::Normal,
            scatter_until_ms: None,
            integrity_reported: false,
        };
        ghost.step_toward_graph(maze);
        ghost
    }

    pub fn update(&mut self, maze: &Maze, chase_target: PixelPos, now_ms: u64) {
        let chase_tile = tile_at(chase_target, self.tile_size);

        if is_at_tile_center(self.pos, self.tile_size) {
            let tile = self.tile();
            self.pos = tile_center(tile, self.tile_size);
            if maze.is_walkable(tile) {
                self.last_safe = tile;
            }
            if self.target_node == Some(tile) || self.active_graph().contains(tile) {
                self.recompute_path(maze, chase_tile);
            } else if self.dir == Direction::None {
                self.step_toward_graph(maze);
            }
        }

        self.integrate(maze, chase_tile);
        if let Some(pos) = tunnel_teleport(maze, self.pos, self.dir) {
            self.pos = pos;
        }
        self.guard_overshoot(maze, chase_tile);
        self.expire_scatter(now_ms);
        self.finish_return(maze);
    }

    fn integrate(&mut self, maze: &Maze, chase_tile: Tile) {
        if self.dir == Direction::None {
            return;
        }
        let from = self.tile();
        let next = advance(self.pos, self.dir, self.speed, self.tile_size);
        let to = tile_at(next, self.tile_size);
        if to == from || maze.is_walkable(maze.wrap(to)) {
            self.pos = next;
            return;
        }
        self.pos = tile_center(from, self.tile_size);
        self.dir = Direction::None;
        self.redirect(maze, chase_tile);
    }

    fn guard_overshoot(&mut self, maze: &Maze, chase_tile: Tile) {
        if maze.is_walkable(self.tile()) {
            return;
        }
        self.pos = tile_center(self.last_safe, self.tile_size);
        self.dir = Direction::None;
        self.target_node = None;
        self.redirect(maze, chase_tile);
    }

    pub fn position(&self) -> PixelPos {
        self.pos
    }

    pub fn tile(&self) -> Tile {
        tile_at(self.pos, self.tile_size)
    }

    pub fn direction(&self) -> Direction {
        self.dir
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn radius(&self) -> f32 {
        agent_radius(self.tile_size)
    }

    pub fn mode(&self) -> GhostMode {
        self.mode
    }

    pub fn visual_state(&self) -> VisualState {
        self.visual
    }

    pub fn is_returning(&self) -> bool {
        self.mode == GhostMode::ReturningToBase
    }

    pub fn home(&self) -> Tile {
        self.home
    }

    pub fn target_node(&self) -> Option<Tile> {
        self.target_node
    }

    pub fn path(&self) -> &[Tile] {
        &self.path
    }

    pub fn last_safe_tile(&self) -> Tile {
        self.last_safe
    }

    pub fn scatter_until_ms(&self) -> Option<u64> {
        self.scatter_until_ms
    }

    pub fn base_graph(&self) -> &NavGraph {
        &self.base_graph
    }

    pub fn return_graph(&self) -> &NavGraph {
        &self.return_graph
    }

    pub fn view(&self) -> GhostView {
        GhostView {
            agent: AgentView {
                x: self.pos.x,
                y: self.pos.y,
                tile: self.tile(),
                dir: self.dir,
            },
            mode: self.mode,
            visual: self.visual,
            home: self.home,
            target_node: self.target_node,
            scatter_until_ms: self.scatter_until_ms,
        }
    }

    #[cfg(test)]
    pub(crate) fn place_at(&mut self, tile: Tile) {
        self.pos = tile_center(tile, self.tile_size);
        self.dir = Direction::None;
        self.target_node = None;
        self.path.clear();
        self.last_safe = tile;
    }

    #[cfg(test)]
    pub(crate) fn force_pixel(&mut self, pos: PixelPos, dir: Direction) {
        self.pos = pos;
        self.dir = dir;
    }

    #[cfg(test)]
    pub(crate) fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }
}

fn pick_home(maze: &Maze, pinned: Option<Tile>, rng: &mut Rng) -> Tile {
    if let Some(tile) = pinned.filter(|tile| maze.is_walkable(*tile)) {
        return tile;
    }
    let spawns = maze.ghost_spawn_tiles();
    if !spawns.is_empty() {
        return spawns[rng.pick_index(spawns.len())];
    }
    let center = Tile::new(maze.width() / 2, maze.height() / 2);
    if maze.is_walkable(center) {
        return center;
    }
    match maze.walkable_tiles().first() {
        Some(tile) => *tile,
        None => {
            eprintln!("[ghost] maze has no walkable tile, parking at (0,0)");
            Tile::new(0, 0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Ghost, GhostOptions};
    use crate::constants::{GHOST_NORMAL_SPEED, GHOST_RETURN_SPEED, TICK_MS};
    use crate::maze::Maze;
    use crate::motion::tile_center;
    use crate::nav::classify_tile;
    use crate::rng::Rng;
    use crate::types::{Direction, GhostMode, PixelPos, Tile, VisualState};

    fn bundled() -> Maze {
        Maze::bundled().expect("bundled maze loads")
    }

    fn ghost_at_home(maze: &Maze, home: Tile) -> Ghost {
        Ghost::new(
            maze,
            GhostOptions {
                home: Some(home),
                ..GhostOptions::default()
            },
            7,
        )
    }

    fn tunnel_maze() -> Maze {
        Maze::from_rows(&["11111111", "00050000", "11111111"], Some(1)).expect("valid grid")
    }

    fn find_teleport(ghost: &mut Ghost, maze: &Maze, target: PixelPos) -> Option<(f32, f32)> {
        for frame in 0..200u64 {
            let before = ghost.position().x;
            ghost.update(maze, target, frame * TICK_MS);
            let after = ghost.position().x;
            if (after - before).abs() > 90.0 {
                return Some((before, after));
            }
        }
        None
    }

    #[test]
    fn spawns_on_a_spawn_marker_in_chase() {
        let maze = bundled();
        let spawns = maze.ghost_spawn_tiles();
        for seed in 1..=40u32 {
            let ghost = Ghost::new(&maze, GhostOptions::default(), seed);
            assert!(spawns.contains(&ghost.home()));
            assert_eq!(ghost.position(), tile_center(ghost.home(), maze.tile_size()));
            assert_eq!(ghost.mode(), GhostMode::Chase);
            assert_eq!(ghost.visual_state(), VisualState::Normal);
            assert_eq!(ghost.speed(), GHOST_NORMAL_SPEED);
            assert!(ghost.return_graph().contains(ghost.home()));
            assert_eq!(ghost.radius(), 13.0);
        }
    }

    #[test]
    fn corridor_tile_recovers_direction_in_one_update() {
        let maze = bundled();
        let mut ghost = ghost_at_home(&maze, Tile::new(9, 8));
        let target = tile_center(maze.player_start().expect("start"), maze.tile_size());
        for tile in maze.walkable_tiles() {
            if ghost.base_graph().contains(tile) {
                continue;
            }
            assert!(!classify_tile(&maze, tile).is_decision_point());
            ghost.place_at(tile);
            ghost.update(&maze, target, 0);
            assert_ne!(ghost.direction(), Direction::None, "stuck at {tile:?}");
        }
    }

    #[test]
    fn leaves_through_left_mouth_and_reappears_mirrored() {
        let maze = tunnel_maze();
        let mut ghost = ghost_at_home(&maze, Tile::new(3, 1));
        let target = tile_center(Tile::new(6, 1), maze.tile_size());
        assert_eq!(
            find_teleport(&mut ghost, &maze, target),
            Some((15.0, 227.0))
        );
        assert_eq!(ghost.tile(), Tile::new(7, 1));
        assert_eq!(ghost.direction(), Direction::Left);
    }

    #[test]
    fn leaves_through_right_mouth_and_reappears_mirrored() {
        let maze = tunnel_maze();
        let mut ghost = ghost_at_home(&maze, Tile::new(3, 1));
        ghost.place_at(Tile::new(6, 1));
        let target = tile_center(Tile::new(1, 1), maze.tile_size());
        assert_eq!(
            find_teleport(&mut ghost, &maze, target),
            Some((225.0, 13.0))
        );
        assert_eq!(ghost.tile(), Tile::new(0, 1));
    }

    #[test]
    fn never_ends_a_frame_inside_a_wall() {
        let maze = bundled();
        let walkable = maze.walkable_tiles();
        let mut rng = Rng::new(2024);
        for trial in 0..20 {
            let mut ghost = ghost_at_home(&maze, Tile::new(9, 8));
            let target_tile = walkable[rng.pick_index(walkable.len())];
            let target = tile_center(target_tile, maze.tile_size());
            for frame in 0..2_000u64 {
                ghost.set_speed(rng.int(1, 12) as f32);
                ghost.update(&maze, target, frame * TICK_MS);
                assert!(
                    maze.is_walkable(ghost.tile()),
                    "trial {trial} frame {frame} at {:?}",
                    ghost.position()
                );
            }
        }
    }

    #[test]
    fn taken_down_ghost_returns_home_and_resumes_chase() {
        let maze = bundled();
        let target = tile_center(maze.player_start().expect("start"), maze.tile_size());
        for home in maze.ghost_spawn_tiles() {
            let mut ghost = ghost_at_home(&maze, home);
            let mut frame = 0u64;
            while frame < 60 {
                ghost.update(&maze, target, frame * TICK_MS);
                frame += 1;
            }
            ghost.enter_scatter(frame * TICK_MS);
            assert_eq!(ghost.mode(), GhostMode::Scatter);
            while frame < 100 {
                ghost.update(&maze, target, frame * TICK_MS);
                frame += 1;
            }

            ghost.take_down_and_return_to_base();
            assert_eq!(ghost.mode(), GhostMode::ReturningToBase);
            assert_eq!(ghost.speed(), GHOST_RETURN_SPEED);
            assert_eq!(ghost.visual_state(), VisualState::Scatter);
            assert_eq!(ghost.scatter_until_ms(), None);

            let mut reached = false;
            while frame < 1_000 {
                ghost.update(&maze, target, frame * TICK_MS);
                frame += 1;
                if ghost.mode() == GhostMode::Chase {
                    reached = true;
                    break;
                }
            }
            assert!(reached, "never got home to {home:?}");
            assert_eq!(ghost.position(), tile_center(home, maze.tile_size()));
            assert_eq!(ghost.speed(), GHOST_NORMAL_SPEED);
            assert_eq!(ghost.visual_state(), VisualState::Normal);
        }
    }

    #[test]
    fn scatter_expires_without_disturbing_position() {
        let maze = bundled();
        let target = tile_center(maze.player_start().expect("start"), maze.tile_size());
        let mut scattered = ghost_at_home(&maze, Tile::new(9, 9));
        let mut control = scattered.clone();

        let mut frame = 0u64;
        while frame < 30 {
            scattered.update(&maze, target, frame * TICK_MS);
            control.update(&maze, target, frame * TICK_MS);
            frame += 1;
        }
        scattered.enter_scatter(frame * TICK_MS);
        let deadline = scattered.scatter_until_ms().expect("deadline set");
        assert!(deadline >= frame * TICK_MS + 5_000);
        assert!(deadline <= frame * TICK_MS + 8_000);

        while frame * TICK_MS <= deadline + TICK_MS {
            let now = frame * TICK_MS;
            scattered.update(&maze, target, now);
            control.update(&maze, target, now);
            assert_eq!(scattered.position(), control.position());
            if now < deadline {
                assert_eq!(scattered.mode(), GhostMode::Scatter);
            }
            frame += 1;
        }
        assert_eq!(scattered.mode(), GhostMode::Chase);
        assert_eq!(scattered.visual_state(), VisualState::Normal);
        assert_eq!(scattered.scatter_until_ms(), None);
    }

    #[test]
    fn scatter_is_ignored_while_returning_and_restarts_otherwise() {
        let maze = bundled();
        let mut ghost = ghost_at_home(&maze, Tile::new(9, 9));
        ghost.enter_scatter(1_000);
        let first = ghost.scatter_until_ms().expect("deadline set");
        ghost.enter_scatter(4_000);
        let second = ghost.scatter_until_ms().expect("deadline set");
        assert!(first <= 9_000);
        assert!(second >= 9_000);

        ghost.take_down_and_return_to_base();
        ghost.enter_scatter(5_000);
        assert_eq!(ghost.mode(), GhostMode::ReturningToBase);
        assert_eq!(ghost.scatter_until_ms(), None);
    }

    #[test]
    fn reset_to_spawn_restores_defaults() {
        let maze = bundled();
        let mut ghost = ghost_at_home(&maze, Tile::new(9, 8));
        let target = tile_center(maze.player_start().expect("start"), maze.tile_size());
        for frame in 0..50u64 {
            ghost.update(&maze, target, frame * TICK_MS);
        }
        ghost.enter_scatter(800);
        ghost.take_down_and_return_to_base();
        ghost.reset_to_spawn(&maze);
        assert_eq!(ghost.position(), tile_center(Tile::new(9, 8), maze.tile_size()));
        assert_eq!(ghost.mode(), GhostMode::Chase);
        assert_eq!(ghost.visual_state(), VisualState::Normal);
        assert_eq!(ghost.speed(), GHOST_NORMAL_SPEED);
        assert_eq!(ghost.last_safe_tile(), Tile::new(9, 8));
        assert!(ghost.path().is_empty());
    }

    fn corridor_maze() -> Maze {
        Maze::from_rows(&["11111111", "10000001", "11111111"], None).expect("valid grid")
    }

    #[test]
    fn holds_on_the_node_nearest_a_mid_corridor_target() {
        let maze = corridor_maze();
        let home = Tile::new(1, 1);
        let mut ghost = ghost_at_home(&maze, home);
        let parked = tile_center(home, maze.tile_size());

        let target = tile_center(Tile::new(3, 1), maze.tile_size());
        for frame in 0..10u64 {
            ghost.update(&maze, target, frame * TICK_MS);
            assert_eq!(ghost.direction(), Direction::None);
            assert_eq!(ghost.position(), parked);
            assert_eq!(ghost.path(), &[home]);
            assert_eq!(ghost.target_node(), None);
        }

        // Once the far dead end is nearer, the route has two nodes again.
        let target = tile_center(Tile::new(5, 1), maze.tile_size());
        ghost.update(&maze, target, 10 * TICK_MS);
        assert_eq!(ghost.target_node(), Some(Tile::new(6, 1)));
        assert_eq!(ghost.direction(), Direction::Right);
    }

    #[test]
    fn overshoot_into_a_wall_snaps_back_to_last_safe_tile() {
        let maze = corridor_maze();
        let mut ghost = ghost_at_home(&maze, Tile::new(1, 1));
        let target = tile_center(Tile::new(6, 1), maze.tile_size());
        assert_eq!(ghost.last_safe_tile(), Tile::new(1, 1));

        ghost.force_pixel(PixelPos::new(45.0, 20.0), Direction::Up);
        assert!(!maze.is_walkable(ghost.tile()));
        ghost.update(&maze, target, 0);
        assert_eq!(ghost.tile(), Tile::new(1, 1));
        assert_eq!(ghost.position(), tile_center(Tile::new(1, 1), maze.tile_size()));
        assert_eq!(ghost.direction(), Direction::Right);

        for frame in 1..120u64 {
            ghost.update(&maze, target, frame * TICK_MS);
            assert!(maze.is_walkable(ghost.tile()), "frame {frame}");
        }
        assert_eq!(ghost.tile(), Tile::new(6, 1));
    }

    #[test]
    fn overshoot_while_returning_heads_home() {
        let maze = corridor_maze();
        let mut ghost = ghost_at_home(&maze, Tile::new(6, 1));
        ghost.place_at(Tile::new(3, 1));
        ghost.take_down_and_return_to_base();
        let target = tile_center(Tile::new(1, 1), maze.tile_size());

        ghost.force_pixel(PixelPos::new(105.0, 70.0), Direction::Down);
        ghost.update(&maze, target, 0);
        assert_eq!(ghost.tile(), Tile::new(3, 1));
        assert_eq!(ghost.direction(), Direction::Right);
        assert_eq!(ghost.mode(), GhostMode::ReturningToBase);
    }

    #[test]
    fn chooses_wrap_direction_between_mouths() {
        let maze = tunnel_maze();
        let mut ghost = ghost_at_home(&maze, Tile::new(3, 1));
        ghost.place_at(Tile::new(0, 1));
        ghost.choose_direction_to(&maze, Tile::new(7, 1));
        assert_eq!(ghost.direction(), Direction::Left);
        ghost.place_at(Tile::new(7, 1));
        ghost.choose_direction_to(&maze, Tile::new(0, 1));
        assert_eq!(ghost.direction(), Direction::Right);
    }
}
