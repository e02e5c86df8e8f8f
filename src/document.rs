//! The workout document handed to the workout service, and its JSON shape.

use serde::Serialize;

use crate::estimate::{ESTIMATE_TYPE, Estimate};
use crate::sport::SportMode;
use crate::steps::{EndCondition, RepeatGroup, Step, StepKind, TimedStep};
use crate::target::TargetSpec;

/// One converted workout. Serializes to the service's nested JSON format.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "WorkoutPayload")]
pub struct WorkoutDocument {
    pub sport: SportMode,
    pub name: String,
    /// Top-level steps; repeat groups carry their own children.
    pub steps: Vec<Step>,
    pub estimate: Estimate,
}

pub fn assemble(
    sport: SportMode,
    name: &str,
    steps: Vec<Step>,
    estimate: Estimate,
) -> WorkoutDocument {
    WorkoutDocument {
        sport,
        name: name.to_string(),
        steps,
        estimate,
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SportTypeDto {
    sport_type_id: u32,
    sport_type_key: &'static str,
}

impl From<SportMode> for SportTypeDto {
    fn from(sport: SportMode) -> Self {
        Self {
            sport_type_id: sport.type_id(),
            sport_type_key: sport.key(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StepTypeDto {
    step_type_id: u32,
    step_type_key: &'static str,
}

impl From<StepKind> for StepTypeDto {
    fn from(kind: StepKind) -> Self {
        Self {
            step_type_id: kind.type_id(),
            step_type_key: kind.key(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EndConditionDto {
    condition_type_id: u32,
    condition_type_key: &'static str,
}

impl From<EndCondition> for EndConditionDto {
    fn from(end: EndCondition) -> Self {
        Self {
            condition_type_id: end.type_id(),
            condition_type_key: end.key(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TargetTypeDto {
    workout_target_type_id: u32,
    workout_target_type_key: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExecutableStepDto {
    step_id: u32,
    step_order: u32,
    step_type: StepTypeDto,
    end_condition: EndConditionDto,
    end_condition_value: u32,
    description: String,
    target_type: TargetTypeDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    zone_number: Option<u8>,
}

impl From<TimedStep> for ExecutableStepDto {
    fn from(step: TimedStep) -> Self {
        let zone_number = match step.target {
            TargetSpec::NoTarget => None,
            TargetSpec::PowerZone { zone_number } => Some(zone_number),
        };
        Self {
            step_id: step.id,
            step_order: step.order,
            step_type: step.kind.into(),
            end_condition: step.end.into(),
            end_condition_value: step.end.value(),
            description: step.description,
            target_type: TargetTypeDto {
                workout_target_type_id: step.target.type_id(),
                workout_target_type_key: step.target.key(),
            },
            zone_number,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RepeatGroupDto {
    step_id: u32,
    step_order: u32,
    step_type: StepTypeDto,
    number_of_iterations: u32,
    child_step_id: u32,
    smart_repeat: bool,
    end_condition: EndConditionDto,
    end_condition_value: u32,
    workout_steps: Vec<StepDto>,
}

impl From<RepeatGroup> for RepeatGroupDto {
    fn from(group: RepeatGroup) -> Self {
        Self {
            step_id: group.id,
            step_order: group.order,
            step_type: StepTypeDto {
                step_type_id: RepeatGroup::TYPE_ID,
                step_type_key: RepeatGroup::KEY,
            },
            number_of_iterations: group.iterations,
            child_step_id: group.first_child_id(),
            smart_repeat: false,
            end_condition: EndConditionDto {
                condition_type_id: RepeatGroup::END_CONDITION_ID,
                condition_type_key: RepeatGroup::END_CONDITION_KEY,
            },
            end_condition_value: group.iterations,
            workout_steps: vec![
                StepDto::Executable(group.interval.into()),
                StepDto::Executable(group.recovery.into()),
            ],
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum StepDto {
    #[serde(rename = "ExecutableStepDTO")]
    Executable(ExecutableStepDto),
    #[serde(rename = "RepeatGroupDTO")]
    Repeat(RepeatGroupDto),
}

impl From<Step> for StepDto {
    fn from(step: Step) -> Self {
        match step {
            Step::Timed(t) => StepDto::Executable(t.into()),
            Step::Repeat(r) => StepDto::Repeat(r.into()),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SegmentDto {
    segment_order: u32,
    sport_type: SportTypeDto,
    workout_steps: Vec<StepDto>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WorkoutPayload {
    sport_type: SportTypeDto,
    workout_name: String,
    workout_segments: Vec<SegmentDto>,
    estimated_duration_in_secs: u64,
    estimated_distance_in_meters: f64,
    estimate_type: &'static str,
}

impl From<WorkoutDocument> for WorkoutPayload {
    fn from(doc: WorkoutDocument) -> Self {
        Self {
            sport_type: doc.sport.into(),
            workout_name: doc.name,
            workout_segments: vec![SegmentDto {
                segment_order: 1,
                sport_type: doc.sport.into(),
                workout_steps: doc.steps.into_iter().map(StepDto::from).collect(),
            }],
            estimated_duration_in_secs: doc.estimate.duration_sec,
            estimated_distance_in_meters: doc.estimate.distance_meters,
            estimate_type: ESTIMATE_TYPE,
        }
    }
}
