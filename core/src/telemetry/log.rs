use log::{debug, info};

const DEFAULT_TARGET: &str = "sweepcore::stage";

/// Stage summaries routed to one `log` target, so `RUST_LOG` can select them.
pub struct LogManager {
    target: &'static str,
}

impl LogManager {
    pub fn new() -> Self {
        Self::with_target(DEFAULT_TARGET)
    }

    pub fn with_target(target: &'static str) -> Self {
        Self { target }
    }

    pub fn stage(&self, stage: &str, detail: &str) {
        info!(target: self.target, "[{}] {}", stage, detail);
    }

    /// Per-column detail, too chatty for the default level.
    pub fn column(&self, stage: &str, column: usize, detail: &str) {
        debug!(target: self.target, "[{}] column {}: {}", stage, column, detail);
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new()
    }
}
