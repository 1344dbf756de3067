//! Onboarding step definitions and the per-step validation table.
//!
//! Every step owns one slice of the [`OnboardingRecord`]. The table below
//! decides, for each step, whether `Next` may leave it and how the slice is
//! persisted when it does.

use serde::{Deserialize, Serialize};

use crate::contact::{is_valid_email, is_valid_phone};
use crate::error::CoreError;
use crate::onboarding::record::OnboardingRecord;
use crate::reference::ReferenceData;

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

/// The seven steps of the onboarding wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    PersonalInfo,
    Location,
    Roles,
    Projects,
    Education,
    Skills,
    Complete,
}

/// Total number of steps in the wizard.
pub const TOTAL_STEPS: u8 = 7;

/// Minimum step number (1-based).
pub const MIN_STEP: u8 = 1;

/// Maximum step number (1-based).
pub const MAX_STEP: u8 = TOTAL_STEPS;

/// Minimum number of distinct skills the skills step accepts.
pub const MIN_SKILLS: usize = 3;

impl Step {
    pub const ALL: [Step; TOTAL_STEPS as usize] = [
        Self::PersonalInfo,
        Self::Location,
        Self::Roles,
        Self::Projects,
        Self::Education,
        Self::Skills,
        Self::Complete,
    ];

    /// Convert a 1-based step number to a `Step`.
    pub fn from_number(n: u8) -> Result<Self, CoreError> {
        match n {
            MIN_STEP..=MAX_STEP => Ok(Self::ALL[(n - 1) as usize]),
            _ => Err(CoreError::Validation(format!(
                "Invalid step number {n}. Must be between {MIN_STEP} and {MAX_STEP}"
            ))),
        }
    }

    /// Convert to a 1-based step number.
    pub fn number(self) -> u8 {
        match self {
            Self::PersonalInfo => 1,
            Self::Location => 2,
            Self::Roles => 3,
            Self::Projects => 4,
            Self::Education => 5,
            Self::Skills => 6,
            Self::Complete => 7,
        }
    }

    /// Human-readable label for the step.
    pub fn label(self) -> &'static str {
        match self {
            Self::PersonalInfo => "Personal Info",
            Self::Location => "Location",
            Self::Roles => "YM Roles",
            Self::Projects => "YM Projects",
            Self::Education => "Education",
            Self::Skills => "Skills",
            Self::Complete => "Complete",
        }
    }

    pub fn next(self) -> Option<Self> {
        Self::from_number(self.number() + 1).ok()
    }

    pub fn prev(self) -> Option<Self> {
        Self::from_number(self.number().checked_sub(1)?).ok()
    }

    /// Parse a `step` query parameter, rejecting anything that is not a
    /// step number in range.
    pub fn parse_strict(raw: &str) -> Result<Self, CoreError> {
        let n: u8 = raw.trim().parse().map_err(|_| {
            CoreError::Validation(format!("Step parameter '{raw}' is not a number"))
        })?;
        Self::from_number(n)
    }

    /// Parse a `step` query parameter leniently: missing, non-numeric and
    /// out-of-range values all land on the first step.
    pub fn from_query(raw: Option<&str>) -> Self {
        raw.and_then(|r| Self::parse_strict(r).ok())
            .unwrap_or(Self::PersonalInfo)
    }

    /// Rule governing this step.
    pub fn rule(self) -> &'static StepRule {
        &STEP_RULES[(self.number() - 1) as usize]
    }

    /// Completion percentage shown in the progress bar while on this step.
    pub fn progress_percent(self) -> u8 {
        ((u16::from(self.number() - 1) * 100) / u16::from(TOTAL_STEPS - 1)) as u8
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.number(), self.label())
    }
}

// ---------------------------------------------------------------------------
// Validation table
// ---------------------------------------------------------------------------

/// How a step's slice is persisted when the member presses `Next`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveMode {
    /// Awaited; a failure keeps the member on the step.
    Foreground,
    /// Fire-and-forget; navigation proceeds immediately.
    Background,
}

type Check = fn(&OnboardingRecord, &ReferenceData) -> Result<(), String>;

/// One row of the validation table.
pub struct StepRule {
    pub step: Step,
    /// `None` for the terminal step, which has nothing to persist.
    pub save_mode: Option<SaveMode>,
    check: Check,
}

impl StepRule {
    pub fn check(&self, record: &OnboardingRecord, reference: &ReferenceData) -> Result<(), String> {
        (self.check)(record, reference)
    }
}

pub static STEP_RULES: [StepRule; TOTAL_STEPS as usize] = [
    StepRule {
        step: Step::PersonalInfo,
        save_mode: Some(SaveMode::Background),
        check: check_personal_info,
    },
    StepRule {
        step: Step::Location,
        save_mode: Some(SaveMode::Foreground),
        check: check_location,
    },
    StepRule {
        step: Step::Roles,
        save_mode: Some(SaveMode::Foreground),
        check: check_roles,
    },
    StepRule {
        step: Step::Projects,
        save_mode: Some(SaveMode::Background),
        check: check_projects,
    },
    StepRule {
        step: Step::Education,
        save_mode: Some(SaveMode::Background),
        check: check_education,
    },
    StepRule {
        step: Step::Skills,
        save_mode: Some(SaveMode::Foreground),
        check: check_skills,
    },
    StepRule {
        step: Step::Complete,
        save_mode: None,
        check: check_complete,
    },
];

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn check_personal_info(record: &OnboardingRecord, _: &ReferenceData) -> Result<(), String> {
    if let Some(phone) = non_blank(&record.phone) {
        if !is_valid_phone(phone) {
            return Err("Phone number must have exactly 10 digits".to_string());
        }
    }
    if let Some(email) = non_blank(&record.personal_email) {
        if !is_valid_email(email) {
            return Err("Personal email is not a valid email address".to_string());
        }
    }
    Ok(())
}

fn check_location(record: &OnboardingRecord, reference: &ReferenceData) -> Result<(), String> {
    let subregion_id = record
        .subregion_id
        .ok_or_else(|| "A subregion is required".to_string())?;
    let neighbor_net_id = record
        .neighbor_net_id
        .ok_or_else(|| "A neighbor-net is required".to_string())?;

    let nn = reference
        .neighbor_net(neighbor_net_id)
        .ok_or_else(|| format!("Unknown neighbor-net {neighbor_net_id}"))?;
    if nn.subregion_id != subregion_id {
        return Err(format!(
            "Neighbor-net {neighbor_net_id} does not belong to subregion {subregion_id}"
        ));
    }
    Ok(())
}

fn check_roles(record: &OnboardingRecord, _: &ReferenceData) -> Result<(), String> {
    if record.ym_roles.is_empty() {
        return Err("At least one role is required".to_string());
    }
    for (i, role) in record.ym_roles.iter().enumerate() {
        role.validate().map_err(|e| format!("Role {}: {e}", i + 1))?;
    }
    Ok(())
}

fn check_projects(record: &OnboardingRecord, _: &ReferenceData) -> Result<(), String> {
    if record.ym_projects.is_empty() {
        return Err("At least one project is required".to_string());
    }
    for (i, project) in record.ym_projects.iter().enumerate() {
        project.validate().map_err(|e| format!("Project {}: {e}", i + 1))?;
    }
    Ok(())
}

fn check_education(record: &OnboardingRecord, _: &ReferenceData) -> Result<(), String> {
    if non_blank(&record.education_level).is_none() {
        return Err("An education level is required".to_string());
    }
    for (i, entry) in record.education.iter().enumerate() {
        entry.validate().map_err(|e| format!("Education {}: {e}", i + 1))?;
    }
    Ok(())
}

fn check_skills(record: &OnboardingRecord, _: &ReferenceData) -> Result<(), String> {
    let count = record.distinct_skill_count();
    if count < MIN_SKILLS {
        return Err(format!(
            "Select at least {MIN_SKILLS} skills ({count} selected)"
        ));
    }
    Ok(())
}

fn check_complete(_: &OnboardingRecord, _: &ReferenceData) -> Result<(), String> {
    Err("The final step is left by completing onboarding".to_string())
}

/// Run the validation predicate for `step` against the accumulated record.
pub fn validate_step(
    step: Step,
    record: &OnboardingRecord,
    reference: &ReferenceData,
) -> Result<(), CoreError> {
    step.rule()
        .check(record, reference)
        .map_err(|msg| CoreError::Validation(format!("Step {step}: {msg}")))
}
