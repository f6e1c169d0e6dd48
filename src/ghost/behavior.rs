use super::*;

impl Ghost {
    /// Power-pellet trigger. Restarts the timer when already scattering and
    /// does nothing while returning to base.
    pub fn enter_scatter(&mut self, now_ms: u64) {
        if self.is_returning() {
            return;
        }
        let duration = self
            .rng
            .duration_ms(self.options.scatter_min_ms, self.options.scatter_max_ms);
        self.mode = GhostMode::Scatter;
        self.visual = VisualState::Scatter;
        self.scatter_until_ms = Some(now_ms.saturating_add(duration));
    }

    pub fn take_down_and_return_to_base(&mut self) {
        self.mode = GhostMode::ReturningToBase;
        self.visual = VisualState::Scatter;
        self.scatter_until_ms = None;
        self.speed = self.options.return_speed;
        self.target_node = None;
        self.path.clear();
    }

    pub fn reset_to_spawn(&mut self, maze: &Maze) {
        self.pos = tile_center(self.home, self.tile_size);
        self.dir = Direction::None;
        self.speed = self.options.normal_speed;
        self.path.clear();
        self.target_node = None;
        self.last_safe = self.home;
        self.mode = GhostMode::Chase;
        self.visual = VisualState::Normal;
        self.scatter_until_ms = None;
        self.step_toward_graph(maze);
    }

    pub(super) fn expire_scatter(&mut self, now_ms: u64) {
        if self.mode != GhostMode::Scatter {
            return;
        }
        if self.scatter_until_ms.is_some_and(|deadline| now_ms >= deadline) {
            self.mode = GhostMode::Chase;
            self.visual = VisualState::Normal;
            self.scatter_until_ms = None;
        }
    }

    pub(super) fn finish_return(&mut self, maze: &Maze) {
        if self.is_returning()
            && is_at_tile_center(self.pos, self.tile_size)
            && self.tile() == self.home
        {
            self.reset_to_spawn(maze);
        }
    }
}
