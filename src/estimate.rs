use crate::sport::{SpeedProfile, SportMode};
use crate::steps::{Step, TimedStep};

/// Marker telling the service the estimate was derived from planned time.
pub const ESTIMATE_TYPE: &str = "TIME_ESTIMATED";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    pub duration_sec: u64,
    pub distance_meters: f64,
}

fn step_seconds(step: &TimedStep) -> u64 {
    u64::from(step.end.value())
}

/// Planned seconds across the tree. Lap-button steps count as zero and
/// repeat groups count their children once per iteration. Saturates at
/// `u64::MAX` instead of overflowing.
pub fn planned_seconds(steps: &[Step]) -> u64 {
    steps
        .iter()
        .map(|step| match step {
            Step::Timed(t) => step_seconds(t),
            Step::Repeat(r) => {
                let once = r
                    .children()
                    .into_iter()
                    .map(step_seconds)
                    .fold(0u64, u64::saturating_add);
                u64::from(r.iterations).saturating_mul(once)
            }
        })
        .fold(0, u64::saturating_add)
}

pub fn estimate(steps: &[Step], sport: SportMode, speeds: &SpeedProfile) -> Estimate {
    let duration_sec = planned_seconds(steps);
    Estimate {
        duration_sec,
        distance_meters: duration_sec as f64 * speeds.speed_for(sport),
    }
}
