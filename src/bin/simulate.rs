use chrono::{SecondsFormat, Utc};
use clap::Parser;
use packman_ghost_nav::constants::TICK_MS;
use packman_ghost_nav::engine::{GameEngine, GameEngineOptions};
use packman_ghost_nav::maze::{Maze, DEFAULT_LEVEL};
use packman_ghost_nav::nav::NavGraph;
use packman_ghost_nav::render::AsciiRenderer;
use packman_ghost_nav::types::{GameSummary, RuntimeEvent, Snapshot};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

const MAZE_ENV: &str = "GHOST_NAV_MAZE";

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless ghost navigation run")]
struct Cli {
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value_t = 3_600)]
    frames: u64,
    /// Maze JSON file; falls back to $GHOST_NAV_MAZE, then the bundled maze.
    #[arg(long)]
    maze: Option<PathBuf>,
    #[arg(long, default_value = DEFAULT_LEVEL)]
    level: String,
    #[arg(long)]
    lives: Option<u32>,
    /// Keep the player still instead of using the autopilot.
    #[arg(long)]
    idle: bool,
    #[arg(long)]
    render_every: Option<u64>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
    #[arg(long)]
    run_id: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    tick: u64,
    message: String,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "runId")]
    run_id: String,
    seed: u32,
    #[serde(rename = "startedAt")]
    started_at: String,
    #[serde(rename = "finishedAt")]
    finished_at: String,
    #[serde(rename = "framesRun")]
    frames_run: u64,
    game: GameSummary,
    anomalies: Vec<String>,
    #[serde(rename = "anomalyRecords")]
    anomaly_records: Vec<AnomalyRecord>,
}

#[derive(Clone, Debug, Serialize)]
struct StructuredLogLine {
    #[serde(rename = "timestampMs")]
    timestamp_ms: u64,
    level: String,
    event: String,
    #[serde(rename = "runId")]
    run_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tick: Option<u64>,
    details: Value,
}

#[derive(Debug, Default)]
struct Anomalies {
    messages: Vec<String>,
    records: Vec<AnomalyRecord>,
    seen: HashSet<String>,
}

impl Anomalies {
    fn push(&mut self, tick: u64, message: String) {
        self.records.push(AnomalyRecord {
            tick,
            message: message.clone(),
        });
        if self.seen.insert(message.clone()) {
            self.messages.push(message);
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let seed = normalize_seed(cli.seed.unwrap_or_else(|| rand::random::<u32>() as u64));
    let started_at = rfc3339_now();
    let run_id = cli
        .run_id
        .clone()
        .unwrap_or_else(|| default_run_id(seed, now_ms()));

    let maze_path = cli
        .maze
        .clone()
        .or_else(|| std::env::var_os(MAZE_ENV).map(PathBuf::from));
    let maze = match load_maze(maze_path.as_deref(), &cli.level) {
        Ok(maze) => maze,
        Err(error) => {
            emit_log(
                "error",
                "maze_load_failed",
                &run_id,
                Some(seed),
                None,
                json!({
                    "path": maze_path.as_ref().map(|path| path.to_string_lossy().to_string()),
                    "level": cli.level,
                    "error": error.to_string(),
                }),
            );
            std::process::exit(2);
        }
    };

    let mut anomalies = Anomalies::default();
    for message in collect_maze_anomalies(&maze) {
        anomalies.push(0, message);
    }

    let defaults = GameEngineOptions::default();
    let mut engine = GameEngine::new(
        maze,
        seed,
        GameEngineOptions {
            initial_lives: cli.lives.unwrap_or(defaults.initial_lives).max(1),
            autopilot: !cli.idle,
            ..defaults
        },
    );
    if !engine.ghost().return_graph().is_symmetric() {
        anomalies.push(0, "return graph is not symmetric".to_string());
    }

    emit_log(
        "info",
        "run_started",
        &run_id,
        Some(seed),
        None,
        json!({
            "width": engine.maze.width(),
            "height": engine.maze.height(),
            "tunnelRow": engine.maze.tunnel_row(),
            "graphNodes": engine.ghost().base_graph().node_count(),
            "graphEdges": engine.ghost().base_graph().edge_count(),
            "home": engine.ghost().home(),
            "frames": cli.frames,
            "autopilot": !cli.idle,
        }),
    );

    let mut renderer = AsciiRenderer::new();
    let mut frames_run = 0u64;
    while frames_run < cli.frames && !engine.is_ended() {
        engine.step(TICK_MS);
        frames_run += 1;
        let snapshot = engine.build_snapshot(true);

        for event in &snapshot.events {
            emit_log(
                "info",
                event_key(event),
                &run_id,
                Some(seed),
                Some(snapshot.tick),
                serde_json::to_value(event).unwrap_or(Value::Null),
            );
        }
        for message in collect_snapshot_anomalies(&engine, &snapshot) {
            emit_log(
                "warn",
                "anomaly_detected",
                &run_id,
                Some(seed),
                Some(snapshot.tick),
                json!({ "message": message }),
            );
            anomalies.push(snapshot.tick, message);
        }
        if let Some(every) = cli.render_every.filter(|every| *every > 0) {
            if snapshot.tick % every == 0 {
                engine.render(&mut renderer);
                emit_log(
                    "debug",
                    "frame_rendered",
                    &run_id,
                    Some(seed),
                    Some(snapshot.tick),
                    json!({ "rows": renderer.frame().lines().collect::<Vec<_>>() }),
                );
            }
        }
    }

    let summary = RunSummary {
        run_id: run_id.clone(),
        seed,
        started_at,
        finished_at: rfc3339_now(),
        frames_run,
        game: engine.build_summary(),
        anomalies: anomalies.messages.clone(),
        anomaly_records: anomalies.records.clone(),
    };
    match serde_json::to_string(&summary.game) {
        Ok(line) => println!("{line}"),
        Err(error) => eprintln!("[simulate] failed to serialize result: {error}"),
    }

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                "error",
                "summary_write_failed",
                &run_id,
                Some(seed),
                None,
                json!({
                    "path": path.to_string_lossy(),
                    "error": error.to_string(),
                }),
            );
            std::process::exit(2);
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    emit_log(
        "info",
        "run_finished",
        &run_id,
        Some(seed),
        Some(engine.tick()),
        json!({
            "reason": summary.game.reason,
            "score": summary.game.score,
            "livesLeft": summary.game.lives_left,
            "anomalyCount": summary.anomaly_records.len(),
            "summaryOut": summary_out_written,
        }),
    );

    if !summary.anomalies.is_empty() {
        std::process::exit(1);
    }
}

fn load_maze(path: Option<&Path>, level: &str) -> Result<Maze, packman_ghost_nav::maze::MazeError> {
    match path {
        Some(path) => Maze::load(path, level),
        None => Maze::bundled_level(level),
    }
}

fn collect_maze_anomalies(maze: &Maze) -> Vec<String> {
    let mut anomalies = Vec::new();
    if !maze.is_connected() {
        anomalies.push("walkable tiles are not all connected".to_string());
    }
    let graph = NavGraph::build(maze);
    if graph.node_count() == 0 {
        anomalies.push("maze has no decision points".to_string());
    }
    if !graph.is_symmetric() {
        anomalies.push("base graph is not symmetric".to_string());
    }
    anomalies
}

fn collect_snapshot_anomalies(engine: &GameEngine, snapshot: &Snapshot) -> Vec<String> {
    let mut anomalies = Vec::new();
    if !engine.maze.is_walkable(snapshot.ghost.agent.tile) {
        anomalies.push(format!(
            "ghost inside wall at ({},{})",
            snapshot.ghost.agent.tile.x, snapshot.ghost.agent.tile.y
        ));
    }
    if !engine.maze.is_walkable(snapshot.player.tile) {
        anomalies.push(format!(
            "player inside wall at ({},{})",
            snapshot.player.tile.x, snapshot.player.tile.y
        ));
    }
    if !snapshot.ghost.agent.x.is_finite() || !snapshot.ghost.agent.y.is_finite() {
        anomalies.push("ghost position is not finite".to_string());
    }
    anomalies
}

fn event_key(event: &RuntimeEvent) -> &'static str {
    match event {
        RuntimeEvent::PowerPelletEaten { .. } => "power_pellet_eaten",
        RuntimeEvent::ScatterStarted { .. } => "scatter_started",
        RuntimeEvent::ScatterEnded => "scatter_ended",
        RuntimeEvent::GhostTakenDown => "ghost_taken_down",
        RuntimeEvent::GhostReturnedHome => "ghost_returned_home",
        RuntimeEvent::PlayerCaught { .. } => "player_caught",
        RuntimeEvent::GameOver { .. } => "game_over",
    }
}

fn normalize_seed(seed: u64) -> u32 {
    seed as u32
}

fn default_run_id(seed: u32, timestamp_ms: u64) -> String {
    format!("ghost-{seed}-{timestamp_ms}")
}

fn emit_log(
    level: &str,
    event: &str,
    run_id: &str,
    seed: Option<u32>,
    tick: Option<u64>,
    details: Value,
) {
    let log_line = StructuredLogLine {
        timestamp_ms: now_ms(),
        level: level.to_string(),
        event: event.to_string(),
        run_id: run_id.to_string(),
        seed,
        tick,
        details,
    };
    match serde_json::to_string(&log_line) {
        Ok(text) => eprintln!("{text}"),
        Err(error) => eprintln!("[simulate] failed to serialize log line {event}: {error}"),
    }
}

fn rfc3339_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).map_err(io::Error::other)?;
    std::fs::write(path, summary_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_summary() -> RunSummary {
        let engine = GameEngine::new(
            Maze::bundled().expect("bundled maze loads"),
            42,
            GameEngineOptions::default(),
        );
        RunSummary {
            run_id: "ghost-42-1".to_string(),
            seed: 42,
            started_at: rfc3339_now(),
            finished_at: rfc3339_now(),
            frames_run: 0,
            game: engine.build_summary(),
            anomalies: Vec::new(),
            anomaly_records: Vec::new(),
        }
    }

    #[test]
    fn default_run_id_contains_seed_and_timestamp() {
        assert_eq!(default_run_id(42, 123456789), "ghost-42-123456789");
    }

    #[test]
    fn write_summary_returns_error_when_parent_does_not_exist() {
        let target = std::env::temp_dir()
            .join(format!("ghost-nav-missing-{}", now_ms()))
            .join("summary.json");
        assert!(write_summary(&target, &make_summary()).is_err());
    }

    #[test]
    fn anomalies_keep_records_and_deduplicate_messages() {
        let mut anomalies = Anomalies::default();
        anomalies.push(10, "same anomaly".to_string());
        anomalies.push(11, "same anomaly".to_string());
        assert_eq!(anomalies.messages.len(), 1);
        assert_eq!(anomalies.records.len(), 2);
        assert_eq!(anomalies.records[1].tick, 11);
    }

    #[test]
    fn bundled_maze_has_no_anomalies() {
        let maze = Maze::bundled().expect("bundled maze loads");
        assert!(collect_maze_anomalies(&maze).is_empty());

        let mut engine = GameEngine::new(maze, 3, GameEngineOptions::default());
        engine.step(TICK_MS);
        let snapshot = engine.build_snapshot(true);
        assert!(collect_snapshot_anomalies(&engine, &snapshot).is_empty());
    }

    #[test]
    fn split_maze_is_reported() {
        let maze = Maze::from_rows(&["11111", "10101", "11111"], None).expect("valid grid");
        let anomalies = collect_maze_anomalies(&maze);
        assert!(anomalies.iter().any(|message| message.contains("connected")));
    }

    #[test]
    fn rfc3339_timestamps_use_utc_suffix() {
        assert!(rfc3339_now().ends_with('Z'));
    }
}
