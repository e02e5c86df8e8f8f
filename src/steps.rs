//! Expansion of a [`WorkoutSpec`] into the nested step tree.

use crate::row::{SegmentSpec, WorkoutSpec};
use crate::sport::SportMode;
use crate::target::{TargetSpec, resolve_target};

/// Description used for warmup, cooldown and recovery steps.
pub const EASY_DESCRIPTION: &str = "Z1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Warmup,
    Cooldown,
    Interval,
    Recovery,
}

impl StepKind {
    pub fn type_id(self) -> u32 {
        match self {
            StepKind::Warmup => 1,
            StepKind::Cooldown => 2,
            StepKind::Interval => 3,
            StepKind::Recovery => 4,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            StepKind::Warmup => "warmup",
            StepKind::Cooldown => "cooldown",
            StepKind::Interval => "interval",
            StepKind::Recovery => "recovery",
        }
    }
}

/// How an executable step ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndCondition {
    /// The athlete presses the lap button.
    LapButton,
    Time { seconds: u32 },
}

impl EndCondition {
    /// Timed when `seconds > 0`, otherwise ended by the lap button.
    pub fn from_seconds(seconds: u32) -> Self {
        if seconds > 0 {
            EndCondition::Time { seconds }
        } else {
            EndCondition::LapButton
        }
    }

    pub fn type_id(self) -> u32 {
        match self {
            EndCondition::LapButton => 1,
            EndCondition::Time { .. } => 2,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            EndCondition::LapButton => "lap.button",
            EndCondition::Time { .. } => "time",
        }
    }

    /// Value sent alongside the condition; `0` for the lap button.
    pub fn value(self) -> u32 {
        match self {
            EndCondition::LapButton => 0,
            EndCondition::Time { seconds } => seconds,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedStep {
    pub id: u32,
    pub order: u32,
    pub kind: StepKind,
    pub end: EndCondition,
    pub description: String,
    pub target: TargetSpec,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeatGroup {
    pub id: u32,
    pub order: u32,
    pub iterations: u32,
    pub interval: TimedStep,
    pub recovery: TimedStep,
}

impl RepeatGroup {
    pub const TYPE_ID: u32 = 6;
    pub const KEY: &'static str = "repeat";
    pub const END_CONDITION_ID: u32 = 7;
    pub const END_CONDITION_KEY: &'static str = "iterations";

    pub fn first_child_id(&self) -> u32 {
        self.interval.id
    }

    /// Children in emission order.
    pub fn children(&self) -> [&TimedStep; 2] {
        [&self.interval, &self.recovery]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Timed(TimedStep),
    Repeat(RepeatGroup),
}

/// Hands out step ids and orders for one workout. Both start at 1.
#[derive(Debug)]
pub struct StepBuilder {
    sport: SportMode,
    next_id: u32,
    next_order: u32,
}

impl StepBuilder {
    pub fn new(sport: SportMode) -> Self {
        Self {
            sport,
            next_id: 1,
            next_order: 1,
        }
    }

    fn allocate(&mut self) -> (u32, u32) {
        let ids = (self.next_id, self.next_order);
        self.next_id += 1;
        self.next_order += 1;
        ids
    }

    fn timed(&mut self, kind: StepKind, end: EndCondition, description: &str) -> TimedStep {
        let (id, order) = self.allocate();
        TimedStep {
            id,
            order,
            kind,
            end,
            description: description.to_string(),
            target: resolve_target(description, self.sport),
        }
    }

    fn segment(&mut self, segment: &SegmentSpec) -> Step {
        if segment.repeats > 0 {
            let (id, order) = self.allocate();
            let interval = self.timed(
                StepKind::Interval,
                EndCondition::from_seconds(segment.duration_sec),
                &segment.name,
            );
            let recovery = self.timed(
                StepKind::Recovery,
                EndCondition::from_seconds(segment.pause_sec),
                EASY_DESCRIPTION,
            );
            Step::Repeat(RepeatGroup {
                id,
                order,
                iterations: segment.repeats,
                interval,
                recovery,
            })
        } else {
            Step::Timed(self.timed(
                StepKind::Interval,
                EndCondition::from_seconds(segment.duration_sec),
                &segment.name,
            ))
        }
    }

    /// Build the top-level steps: optional warmup, one step per segment and
    /// a cooldown that is always present.
    pub fn build(mut self, spec: &WorkoutSpec) -> Vec<Step> {
        let mut steps = Vec::with_capacity(spec.segments.len() + 2);
        if spec.warmup_sec > 0 {
            steps.push(Step::Timed(self.timed(
                StepKind::Warmup,
                EndCondition::Time {
                    seconds: spec.warmup_sec,
                },
                EASY_DESCRIPTION,
            )));
        }
        for segment in &spec.segments {
            let step = self.segment(segment);
            steps.push(step);
        }
        steps.push(Step::Timed(self.timed(
            StepKind::Cooldown,
            EndCondition::from_seconds(spec.cooldown_sec),
            EASY_DESCRIPTION,
        )));
        steps
    }
}

/// Build the step tree for one workout with fresh counters.
pub fn build_steps(spec: &WorkoutSpec, sport: SportMode) -> Vec<Step> {
    StepBuilder::new(sport).build(spec)
}
