use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    None,
}

impl Direction {
    // Neighbor scan order shared by the graph builder and every BFS.
    pub const CARDINAL: [Direction; 4] = [
        Direction::Right,
        Direction::Left,
        Direction::Down,
        Direction::Up,
    ];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
            Self::None => (0, 0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Tile {
    pub x: i32,
    pub y: i32,
}

impl Tile {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dir: Direction) -> Self {
        let (dx, dy) = dir.delta();
        Self::new(self.x + dx, self.y + dy)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PixelPos {
    pub x: f32,
    pub y: f32,
}

impl PixelPos {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_sq(self, other: PixelPos) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostMode {
    Chase,
    Scatter,
    ReturningToBase,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualState {
    Normal,
    Scatter,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOverReason {
    AllDown,
    Cleared,
}

#[derive(Clone, Debug, Serialize)]
pub struct AgentView {
    pub x: f32,
    pub y: f32,
    pub tile: Tile,
    pub dir: Direction,
}

#[derive(Clone, Debug, Serialize)]
pub struct GhostView {
    #[serde(flatten)]
    pub agent: AgentView,
    pub mode: GhostMode,
    pub visual: VisualState,
    pub home: Tile,
    #[serde(rename = "targetNode")]
    pub target_node: Option<Tile>,
    #[serde(rename = "scatterUntilMs")]
    pub scatter_until_ms: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuntimeEvent {
    PowerPelletEaten {
        x: i32,
        y: i32,
    },
    ScatterStarted {
        #[serde(rename = "untilMs")]
        until_ms: u64,
    },
    ScatterEnded,
    GhostTakenDown,
    GhostReturnedHome,
    PlayerCaught {
        #[serde(rename = "livesLeft")]
        lives_left: u32,
    },
    GameOver {
        reason: GameOverReason,
    },
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    #[serde(rename = "nowMs")]
    pub now_ms: u64,
    pub lives: u32,
    pub score: i32,
    #[serde(rename = "remainingPellets")]
    pub remaining_pellets: usize,
    pub player: AgentView,
    pub ghost: GhostView,
    pub events: Vec<RuntimeEvent>,
}

#[derive(Clone, Debug, Serialize)]
pub struct GameSummary {
    pub reason: Option<GameOverReason>,
    #[serde(rename = "durationMs")]
    pub duration_ms: u64,
    pub ticks: u64,
    pub score: i32,
    #[serde(rename = "livesLeft")]
    pub lives_left: u32,
    #[serde(rename = "pelletsEaten")]
    pub pellets_eaten: i32,
    #[serde(rename = "powerPelletsEaten")]
    pub power_pellets_eaten: i32,
    #[serde(rename = "ghostsTakenDown")]
    pub ghosts_taken_down: i32,
    #[serde(rename = "timesCaught")]
    pub times_caught: i32,
    #[serde(rename = "remainingPellets")]
    pub remaining_pellets: usize,
}
