use serde::{Deserialize, Serialize};

/// Sport a plan is written for. Decides target resolution and default speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SportMode {
    #[default]
    Running,
    Cycling,
}

impl SportMode {
    /// Numeric identifier used by the workout service.
    pub fn type_id(self) -> u32 {
        match self {
            SportMode::Running => 1,
            SportMode::Cycling => 2,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            SportMode::Running => "running",
            SportMode::Cycling => "cycling",
        }
    }
}

/// Default speeds used to turn planned time into planned distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedProfile {
    pub running_mps: f64,
    pub cycling_mps: f64,
}

impl SpeedProfile {
    pub const RUNNING_MPS: f64 = 2.94;
    pub const CYCLING_MPS: f64 = 6.94;

    pub fn speed_for(&self, sport: SportMode) -> f64 {
        match sport {
            SportMode::Running => self.running_mps,
            SportMode::Cycling => self.cycling_mps,
        }
    }
}

impl Default for SpeedProfile {
    fn default() -> Self {
        Self {
            running_mps: Self::RUNNING_MPS,
            cycling_mps: Self::CYCLING_MPS,
        }
    }
}
