//! Per-stage project checklist.
//!
//! Each working [`ProjectStage`] has a fixed list of items. Ticks are stored
//! in the project record under `stage_completion.<stage>.<item>` and saved
//! with a single PATCH.
//!
//! Items of a later stage may be ticked while an earlier stage is still
//! incomplete; [`StageChecklist::out_of_order_items`] reports such ticks for
//! display but nothing is rejected.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::completion::compute_percentage;
use crate::error::CoreError;
use crate::record::{Node, Record};
use crate::status::{Lifecycle, ProjectStage};

/// Record key holding checklist ticks.
pub const CHECKLIST_ROOT: &str = "stage_completion";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChecklistItem {
    pub key: &'static str,
    pub label: &'static str,
}

const fn item(key: &'static str, label: &'static str) -> ChecklistItem {
    ChecklistItem { key, label }
}

const INVOICING: &[ChecklistItem] = &[
    item("contract_countersigned", "Contract countersigned"),
    item("initial_invoice_sent", "Initial invoice sent"),
    item("deposit_received", "Deposit received"),
];

const LOGISTICS_PLANNING: &[ChecklistItem] = &[
    item("event_details_collected", "Event details collected"),
    item("travel_booked", "Travel booked"),
    item("hotel_confirmed", "Hotel confirmed"),
    item("av_requirements_confirmed", "AV requirements confirmed"),
];

const PRE_EVENT: &[ChecklistItem] = &[
    item("briefing_call_held", "Briefing call held"),
    item("materials_sent", "Presentation materials sent"),
    item("itinerary_shared", "Itinerary shared with speaker"),
];

const EVENT_WEEK: &[ChecklistItem] = &[
    item("final_confirmation", "Final confirmation with client"),
    item("speaker_checked_in", "Speaker checked in"),
    item("event_delivered", "Event delivered"),
];

const FOLLOW_UP: &[ChecklistItem] = &[
    item("final_invoice_sent", "Final invoice sent"),
    item("speaker_paid", "Speaker paid"),
    item("thank_you_sent", "Thank-you note sent"),
    item("feedback_collected", "Client feedback collected"),
];

/// Items for a stage. Terminal stages have none.
pub fn items_for(stage: ProjectStage) -> &'static [ChecklistItem] {
    match stage {
        ProjectStage::Invoicing => INVOICING,
        ProjectStage::LogisticsPlanning => LOGISTICS_PLANNING,
        ProjectStage::PreEvent => PRE_EVENT,
        ProjectStage::EventWeek => EVENT_WEEK,
        ProjectStage::FollowUp => FOLLOW_UP,
        ProjectStage::Completed | ProjectStage::Cancelled => &[],
    }
}

/// Stages whose checklists are shown while the project is at `current`:
/// every working stage up to and including it. Completed projects show the
/// whole pipeline; cancelled projects show nothing.
pub fn visible_stages(current: ProjectStage) -> &'static [ProjectStage] {
    match current {
        ProjectStage::Completed => ProjectStage::PIPELINE,
        ProjectStage::Cancelled => &[],
        stage => match stage.pipeline_position() {
            Some(position) => &ProjectStage::PIPELINE[..=position],
            None => &[],
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageProgress {
    pub completed: usize,
    pub total: usize,
    pub percentage: u8,
}

/// Ticked checklist items of one project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageChecklist {
    checked: BTreeMap<ProjectStage, BTreeSet<&'static str>>,
}

impl StageChecklist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read ticks from a project record. Only `true` booleans count; unknown
    /// keys are ignored.
    pub fn from_record(record: &Record) -> Self {
        let mut checklist = Self::new();
        let Some(Node::Branch(root)) = record.lookup(CHECKLIST_ROOT) else {
            return checklist;
        };
        for &stage in ProjectStage::PIPELINE {
            let Some(Node::Branch(ticks)) = root.get(stage.as_str()) else {
                continue;
            };
            for item in items_for(stage) {
                if matches!(ticks.get(item.key), Some(Node::Leaf(Value::Bool(true)))) {
                    checklist.checked.entry(stage).or_default().insert(item.key);
                }
            }
        }
        checklist
    }

    fn find_item(stage: ProjectStage, key: &str) -> Result<&'static ChecklistItem, CoreError> {
        items_for(stage)
            .iter()
            .find(|item| item.key == key)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Unknown checklist item '{key}' for stage '{}'",
                    stage.as_str()
                ))
            })
    }

    pub fn is_checked(&self, stage: ProjectStage, key: &str) -> bool {
        self.checked
            .get(&stage)
            .is_some_and(|items| items.contains(key))
    }

    pub fn set(&mut self, stage: ProjectStage, key: &str, checked: bool) -> Result<(), CoreError> {
        let item = Self::find_item(stage, key)?;
        if checked {
            self.checked.entry(stage).or_default().insert(item.key);
        } else if let Some(items) = self.checked.get_mut(&stage) {
            items.remove(item.key);
            if items.is_empty() {
                self.checked.remove(&stage);
            }
        }
        Ok(())
    }

    /// Flip an item; returns its new state.
    pub fn toggle(&mut self, stage: ProjectStage, key: &str) -> Result<bool, CoreError> {
        let next = !self.is_checked(stage, key);
        self.set(stage, key, next)?;
        Ok(next)
    }

    pub fn stage_progress(&self, stage: ProjectStage) -> StageProgress {
        let total = items_for(stage).len();
        let completed = self.checked.get(&stage).map_or(0, BTreeSet::len);
        StageProgress {
            completed,
            total,
            percentage: compute_percentage(total, completed),
        }
    }

    pub fn is_stage_complete(&self, stage: ProjectStage) -> bool {
        let progress = self.stage_progress(stage);
        progress.total > 0 && progress.completed == progress.total
    }

    /// Ticked items whose stage comes after an incomplete stage.
    pub fn out_of_order_items(&self) -> Vec<(ProjectStage, &'static str)> {
        let Some(first_incomplete) = ProjectStage::PIPELINE
            .iter()
            .position(|stage| !self.is_stage_complete(*stage))
        else {
            return Vec::new();
        };

        ProjectStage::PIPELINE[first_incomplete + 1..]
            .iter()
            .flat_map(|&stage| {
                items_for(stage)
                    .iter()
                    .filter(move |item| self.is_checked(stage, item.key))
                    .map(move |item| (stage, item.key))
            })
            .collect()
    }

    /// PATCH body carrying every pipeline item's state.
    pub fn to_patch(&self) -> Value {
        let stages: Map<String, Value> = ProjectStage::PIPELINE
            .iter()
            .map(|&stage| {
                let items: Map<String, Value> = items_for(stage)
                    .iter()
                    .map(|item| {
                        (
                            item.key.to_string(),
                            Value::Bool(self.is_checked(stage, item.key)),
                        )
                    })
                    .collect();
                (stage.as_str().to_string(), Value::Object(items))
            })
            .collect();

        let mut root = Map::new();
        root.insert(CHECKLIST_ROOT.to_string(), Value::Object(stages));
        Value::Object(root)
    }
}
