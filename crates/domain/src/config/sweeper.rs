use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Inactivity sweeper & shutdown configuration
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweeperConfig {
    /// How often the background sweeper scans sessions.
    #[serde(default = "d_period_secs")]
    pub period_secs: u64,

    /// A session idle longer than this is force-closed by the sweeper.
    #[serde(default = "d_idle_timeout_secs")]
    pub idle_timeout_secs: i64,

    /// Deadline for graceful shutdown of all sessions on process exit.
    #[serde(default = "d_shutdown_deadline_secs")]
    pub shutdown_deadline_secs: u64,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            period_secs: d_period_secs(),
            idle_timeout_secs: d_idle_timeout_secs(),
            shutdown_deadline_secs: d_shutdown_deadline_secs(),
        }
    }
}

fn d_period_secs() -> u64 {
    60
}
fn d_idle_timeout_secs() -> i64 {
    300
}
fn d_shutdown_deadline_secs() -> u64 {
    5
}
