use super::*;

impl GameEngine {
    pub(super) fn resolve_collision(&mut self) {
        let threshold = (self.player.radius() + self.ghost.radius()) * COLLISION_FACTOR;
        let dist_sq = self.player.position().distance_sq(self.ghost.position());
        if dist_sq > threshold * threshold {
            return;
        }

        match self.ghost.mode() {
            GhostMode::ReturningToBase => {}
            GhostMode::Scatter => {
                self.ghost.take_down_and_return_to_base();
                self.score += GHOST_TAKEDOWN_SCORE;
                self.stats.ghosts_taken_down += 1;
                self.events.push(RuntimeEvent::GhostTakenDown);
            }
            GhostMode::Chase => {
                self.lives = self.lives.saturating_sub(1);
                self.stats.times_caught += 1;
                self.events.push(RuntimeEvent::PlayerCaught {
                    lives_left: self.lives,
                });
                self.player.reset();
                self.ghost.reset_to_spawn(&self.maze);
            }
        }
    }

    pub(super) fn record_mode_change(&mut self, before: GhostMode, after: GhostMode) {
        match (before, after) {
            (GhostMode::Scatter, GhostMode::Chase) => self.events.push(RuntimeEvent::ScatterEnded),
            (GhostMode::ReturningToBase, GhostMode::Chase) => {
                self.events.push(RuntimeEvent::GhostReturnedHome)
            }
            _ => {}
        }
    }

    pub(super) fn check_game_over(&mut self) {
        let reason = if self.lives == 0 {
            GameOverReason::AllDown
        } else if self.maze.remaining_pellets() == 0 {
            GameOverReason::Cleared
        } else {
            return;
        };
        self.ended = true;
        self.end_reason = Some(reason);
        self.events.push(RuntimeEvent::GameOver { reason });
    }
}
