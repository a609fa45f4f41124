//! Status enums and transition tables for deals, projects, and invoices.
//!
//! Each status is a closed enum carrying its database string, display
//! label, badge [`Tone`], and allowed transitions in one place, so pages
//! no longer keep their own string-keyed colour maps.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Shared
// ---------------------------------------------------------------------------

/// Badge colour family shared by every status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Neutral,
    Info,
    Progress,
    Warning,
    Success,
    Danger,
}

impl Tone {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Info => "info",
            Self::Progress => "progress",
            Self::Warning => "warning",
            Self::Success => "success",
            Self::Danger => "danger",
        }
    }
}

/// A status with an explicit transition table.
pub trait Lifecycle: Copy + PartialEq + Sized + 'static {
    /// Entity name used in error messages.
    const ENTITY: &'static str;

    fn as_str(self) -> &'static str;

    /// Statuses reachable in one step. Terminal statuses return `&[]`.
    fn valid_transitions(self) -> &'static [Self];

    fn can_transition(self, to: Self) -> bool {
        self.valid_transitions().contains(&to)
    }

    fn is_terminal(self) -> bool {
        self.valid_transitions().is_empty()
    }

    fn validate_transition(self, to: Self) -> Result<(), CoreError> {
        if self.can_transition(to) {
            Ok(())
        } else {
            Err(CoreError::InvalidTransition {
                entity: Self::ENTITY,
                from: self.as_str(),
                to: to.as_str(),
            })
        }
    }
}

fn invalid_value(entity: &str, value: &str, allowed: &[&str]) -> CoreError {
    CoreError::Validation(format!(
        "Invalid {entity} status '{value}'. Must be one of: {}",
        allowed.join(", ")
    ))
}

// ---------------------------------------------------------------------------
// Deals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DealStatus {
    Lead,
    Qualified,
    Proposal,
    Negotiation,
    Won,
    Lost,
}

impl DealStatus {
    pub const ALL: &'static [Self] = &[
        Self::Lead,
        Self::Qualified,
        Self::Proposal,
        Self::Negotiation,
        Self::Won,
        Self::Lost,
    ];

    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                let allowed: Vec<&str> = Self::ALL.iter().map(|st| st.as_str()).collect();
                invalid_value(Self::ENTITY, s, &allowed)
            })
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Lead => "Lead",
            Self::Qualified => "Qualified",
            Self::Proposal => "Proposal Sent",
            Self::Negotiation => "Negotiation",
            Self::Won => "Won",
            Self::Lost => "Lost",
        }
    }

    pub fn tone(self) -> Tone {
        match self {
            Self::Lead => Tone::Neutral,
            Self::Qualified => Tone::Info,
            Self::Proposal => Tone::Progress,
            Self::Negotiation => Tone::Warning,
            Self::Won => Tone::Success,
            Self::Lost => Tone::Danger,
        }
    }

    /// Still in the pipeline (neither won nor lost).
    pub fn is_open(self) -> bool {
        !self.is_terminal()
    }
}

impl Lifecycle for DealStatus {
    const ENTITY: &'static str = "deal";

    fn as_str(self) -> &'static str {
        match self {
            Self::Lead => "lead",
            Self::Qualified => "qualified",
            Self::Proposal => "proposal",
            Self::Negotiation => "negotiation",
            Self::Won => "won",
            Self::Lost => "lost",
        }
    }

    fn valid_transitions(self) -> &'static [Self] {
        match self {
            Self::Lead => &[Self::Qualified, Self::Lost],
            Self::Qualified => &[Self::Proposal, Self::Lost],
            Self::Proposal => &[Self::Negotiation, Self::Won, Self::Lost],
            Self::Negotiation => &[Self::Proposal, Self::Won, Self::Lost],
            Self::Won | Self::Lost => &[],
        }
    }
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

/// Event-management stage of a booked project. Declaration order is
/// pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStage {
    Invoicing,
    LogisticsPlanning,
    PreEvent,
    EventWeek,
    FollowUp,
    Completed,
    Cancelled,
}

impl ProjectStage {
    pub const ALL: &'static [Self] = &[
        Self::Invoicing,
        Self::LogisticsPlanning,
        Self::PreEvent,
        Self::EventWeek,
        Self::FollowUp,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Working stages, in order. These carry checklists.
    pub const PIPELINE: &'static [Self] = &[
        Self::Invoicing,
        Self::LogisticsPlanning,
        Self::PreEvent,
        Self::EventWeek,
        Self::FollowUp,
    ];

    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        Self::ALL
            .iter()
            .copied()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| {
                let allowed: Vec<&str> = Self::ALL.iter().map(|st| st.as_str()).collect();
                invalid_value(Self::ENTITY, s, &allowed)
            })
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Invoicing => "Invoicing",
            Self::LogisticsPlanning => "Logistics Planning",
            Self::PreEvent => "Pre-Event",
            Self::EventWeek => "Event Week",
            Self::FollowUp => "Follow-Up",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    pub fn tone(self) -> Tone {
        match self {
            Self::Invoicing => Tone::Info,
            Self::LogisticsPlanning | Self::PreEvent => Tone::Progress,
            Self::EventWeek => Tone::Warning,
            Self::FollowUp => Tone::Neutral,
            Self::Completed => Tone::Success,
            Self::Cancelled => Tone::Danger,
        }
    }

    /// Position within [`PIPELINE`](Self::PIPELINE), if a working stage.
    pub fn pipeline_position(self) -> Option<usize> {
        Self::PIPELINE.iter().position(|stage| *stage == self)
    }

    pub fn is_active(self) -> bool {
        !self.is_terminal()
    }
}

impl Lifecycle for ProjectStage {
    const ENTITY: &'static str = "project";

    fn as_str(self) -> &'static str {
        match self {
            Self::Invoicing => "invoicing",
            Self::LogisticsPlanning => "logistics_planning",
            Self::PreEvent => "pre_event",
            Self::EventWeek => "event_week",
            Self::FollowUp => "follow_up",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    fn valid_transitions(self) -> &'static [Self] {
        match self {
            Self::Invoicing => &[Self::LogisticsPlanning, Self::Cancelled],
            Self::LogisticsPlanning => &[Self::PreEvent, Self::Cancelled],
            Self::PreEvent => &[Self::EventWeek, Self::Cancelled],
            Self::EventWeek => &[Self::FollowUp],
            Self::FollowUp => &[Self::Completed],
            Self::Completed | Self::Cancelled => &[],
        }
    }
}

// ---------------------------------------------------------------------------
// Invoices
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
    Overdue,
    Cancelled,
}

impl InvoiceStatus {
    pub const ALL: &'static [Self] = &[
        Self::Draft,
        Self::Sent,
        Self::Paid,
        Self::Overdue,
        Self::Cancelled,
    ];

    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                let allowed: Vec<&str> = Self::ALL.iter().map(|st| st.as_str()).collect();
                invalid_value(Self::ENTITY, s, &allowed)
            })
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Sent => "Sent",
            Self::Paid => "Paid",
            Self::Overdue => "Overdue",
            Self::Cancelled => "Cancelled",
        }
    }

    pub fn tone(self) -> Tone {
        match self {
            Self::Draft => Tone::Neutral,
            Self::Sent => Tone::Info,
            Self::Paid => Tone::Success,
            Self::Overdue => Tone::Danger,
            Self::Cancelled => Tone::Neutral,
        }
    }

    /// Money is still expected for this invoice.
    pub fn is_outstanding(self) -> bool {
        matches!(self, Self::Sent | Self::Overdue)
    }
}

impl Lifecycle for InvoiceStatus {
    const ENTITY: &'static str = "invoice";

    fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
            Self::Cancelled => "cancelled",
        }
    }

    fn valid_transitions(self) -> &'static [Self] {
        match self {
            Self::Draft => &[Self::Sent, Self::Cancelled],
            Self::Sent => &[Self::Paid, Self::Overdue, Self::Cancelled],
            Self::Overdue => &[Self::Paid, Self::Cancelled],
            Self::Paid | Self::Cancelled => &[],
        }
    }
}
