use log::{debug, info};

/// Component-scoped wrapper over the `log` facade.
pub struct LogManager {
    component: &'static str,
}

impl LogManager {
    pub fn new(component: &'static str) -> Self {
        Self { component }
    }

    pub fn component(&self) -> &'static str {
        self.component
    }

    /// Records a produced result.
    pub fn record(&self, message: &str) {
        info!("{}: {}", self.component, message);
    }

    /// Records why a call degraded to "no result".
    pub fn declined(&self, message: &str) {
        debug!("{} declined: {}", self.component, message);
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new("trackcore")
    }
}
