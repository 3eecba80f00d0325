/// Debounced update requests.
///
/// Models a single-shot, zero-delay timer: any number of requests within one loop turn
/// arm it once, and it fires on the next turn. Structural changes are remembered so the
/// render pass knows whether a sync is needed.
#[derive(Debug, Default)]
pub struct UpdateScheduler {
    pending_change: bool,
    armed: bool,
}

impl UpdateScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self, scene_changed: bool) {
        if scene_changed && !self.pending_change {
            self.pending_change = true;
        }

        if !self.armed {
            self.armed = true;
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn has_pending_change(&self) -> bool {
        self.pending_change
    }

    /// Fires the timer. Returns true when it was armed.
    pub fn take_due(&mut self) -> bool {
        std::mem::take(&mut self.armed)
    }

    /// Consumes the pending structural change, if any.
    pub fn take_pending_change(&mut self) -> bool {
        std::mem::take(&mut self.pending_change)
    }
}
