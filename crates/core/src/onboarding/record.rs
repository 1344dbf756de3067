//! The onboarding record and its repeated sub-entries.
//!
//! The record is built up step by step; every field is optional until the
//! step that owns it validates. [`OnboardingPatch`] is the partial form a
//! client sends to merge into the record.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{DbId, Timestamp};

/// Earliest year accepted for start/end dates and graduation years.
pub const MIN_YEAR: i32 = 1950;

/// Latest year accepted for start/end dates and graduation years.
pub const MAX_YEAR: i32 = 2100;

// ---------------------------------------------------------------------------
// Designation
// ---------------------------------------------------------------------------

/// Either a reference to an existing row or free text typed by the member.
///
/// Holding both at once is unrepresentable, so "existing XOR custom" is
/// enforced by the type rather than by validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Designation<T> {
    Existing(T),
    Custom(String),
}

impl<T> Designation<T> {
    /// Split into the `(existing, custom)` column pair used by the database.
    pub fn into_columns(self) -> (Option<T>, Option<String>) {
        match self {
            Self::Existing(v) => (Some(v), None),
            Self::Custom(s) => (None, Some(s)),
        }
    }

    /// Rebuild from the column pair. The existing reference wins when both
    /// are set; blank custom text counts as absent.
    pub fn from_columns(existing: Option<T>, custom: Option<String>) -> Option<Self> {
        match (existing, custom) {
            (Some(v), _) => Some(Self::Existing(v)),
            (None, Some(s)) if !s.trim().is_empty() => Some(Self::Custom(s)),
            _ => None,
        }
    }

    fn is_present(&self) -> bool {
        match self {
            Self::Existing(_) => true,
            Self::Custom(s) => !s.trim().is_empty(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tenure
// ---------------------------------------------------------------------------

/// Start/end month-year pair shared by roles and projects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenure {
    pub start_month: Option<u32>,
    pub start_year: Option<i32>,
    pub end_month: Option<u32>,
    pub end_year: Option<i32>,
    #[serde(default)]
    pub is_current: bool,
}

fn check_month_year(label: &str, month: Option<u32>, year: Option<i32>) -> Result<(), String> {
    let (Some(month), Some(year)) = (month, year) else {
        return Err(format!("{label} month and year are required"));
    };
    if !(1..=12).contains(&month) {
        return Err(format!("{label} month {month} must be between 1 and 12"));
    }
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(format!("{label} year {year} must be between {MIN_YEAR} and {MAX_YEAR}"));
    }
    Ok(())
}

impl Tenure {
    /// Start month+year are always required; end month+year only when the
    /// entry is not current.
    pub fn validate(&self) -> Result<(), String> {
        check_month_year("Start", self.start_month, self.start_year)?;
        if !self.is_current {
            check_month_year("End", self.end_month, self.end_year)?;
        }
        Ok(())
    }

    /// First day of the start month, if both parts are set.
    pub fn start_date(&self) -> Option<NaiveDate> {
        month_year_to_date(self.start_month, self.start_year)
    }

    /// First day of the end month. Always `None` for current entries.
    pub fn end_date(&self) -> Option<NaiveDate> {
        if self.is_current {
            return None;
        }
        month_year_to_date(self.end_month, self.end_year)
    }

    /// Rebuild a tenure from stored first-of-month dates.
    pub fn from_dates(start: Option<NaiveDate>, end: Option<NaiveDate>, is_current: bool) -> Self {
        use chrono::Datelike;
        Self {
            start_month: start.map(|d| d.month()),
            start_year: start.map(|d| d.year()),
            end_month: end.map(|d| d.month()),
            end_year: end.map(|d| d.year()),
            is_current,
        }
    }
}

/// Convert a month/year pair to the first day of that month.
pub fn month_year_to_date(month: Option<u32>, year: Option<i32>) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year?, month?, 1)
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// Generate a client-side id for an entry that has not been persisted yet.
pub fn new_entry_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// One organizational role the member has held.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleEntry {
    #[serde(default = "new_entry_id")]
    pub id: String,
    pub role: Option<Designation<DbId>>,
    pub amir: Option<Designation<DbId>>,
    #[serde(flatten)]
    pub tenure: Tenure,
    pub description: Option<String>,
}

impl RoleEntry {
    /// An empty entry, as shown when the roles step first renders.
    pub fn empty() -> Self {
        Self {
            id: new_entry_id(),
            role: None,
            amir: None,
            tenure: Tenure::default(),
            description: None,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.role.as_ref().is_some_and(Designation::is_present) {
            return Err("A role is required".to_string());
        }
        self.tenure.validate()
    }
}

/// One project the member has worked on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectEntry {
    #[serde(default = "new_entry_id")]
    pub id: String,
    pub project_type: Option<Designation<String>>,
    /// Free-text role the member held on the project.
    pub role: Option<String>,
    pub amir: Option<Designation<DbId>>,
    #[serde(flatten)]
    pub tenure: Tenure,
    pub description: Option<String>,
}

impl ProjectEntry {
    pub fn empty() -> Self {
        Self {
            id: new_entry_id(),
            project_type: None,
            role: None,
            amir: None,
            tenure: Tenure::default(),
            description: None,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.project_type.as_ref().is_some_and(Designation::is_present) {
            return Err("A project type is required".to_string());
        }
        self.tenure.validate()
    }
}

/// One school attended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationEntry {
    #[serde(default = "new_entry_id")]
    pub id: String,
    pub school: Option<Designation<String>>,
    pub degree_type: Option<String>,
    pub field_of_study: Option<String>,
    pub graduation_year: Option<i32>,
}

impl EducationEntry {
    pub fn validate(&self) -> Result<(), String> {
        if !self.school.as_ref().is_some_and(Designation::is_present) {
            return Err("A school is required".to_string());
        }
        if let Some(year) = self.graduation_year {
            if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
                return Err(format!(
                    "Graduation year {year} must be between {MIN_YEAR} and {MAX_YEAR}"
                ));
            }
        }
        Ok(())
    }

    /// True when no field carries data; such entries are dropped on load.
    pub fn is_blank(&self) -> bool {
        self.school.is_none()
            && self.degree_type.is_none()
            && self.field_of_study.is_none()
            && self.graduation_year.is_none()
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// Everything collected by the onboarding wizard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingRecord {
    pub phone: Option<String>,
    pub personal_email: Option<String>,
    pub ethnicity: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub subregion_id: Option<DbId>,
    pub neighbor_net_id: Option<DbId>,
    #[serde(default)]
    pub ym_roles: Vec<RoleEntry>,
    #[serde(default)]
    pub ym_projects: Vec<ProjectEntry>,
    pub education_level: Option<String>,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub skills: Vec<String>,
    pub completed_at: Option<Timestamp>,
}

/// Collapse duplicate skills, ignoring case and surrounding whitespace.
/// The first spelling of each skill is kept, trimmed, in input order.
pub fn distinct_skills(skills: &[String]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(skills.len());
    let mut kept = Vec::with_capacity(skills.len());
    for skill in skills {
        let key = skill.trim().to_lowercase();
        if !key.is_empty() && !seen.contains(&key) {
            seen.push(key);
            kept.push(skill.trim().to_string());
        }
    }
    kept
}

impl OnboardingRecord {
    pub fn distinct_skill_count(&self) -> usize {
        distinct_skills(&self.skills).len()
    }
}

// ---------------------------------------------------------------------------
// Patch
// ---------------------------------------------------------------------------

/// Distinguish an absent field (`None`) from an explicit `null` (`Some(None)`).
fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

/// Partial update merged into an [`OnboardingRecord`].
///
/// Absent fields leave the record untouched; `null` clears an optional
/// field; a value replaces it. Lists are replaced wholesale.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OnboardingPatch {
    #[serde(default, deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub personal_email: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub ethnicity: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub date_of_birth: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    pub subregion_id: Option<Option<DbId>>,
    #[serde(default, deserialize_with = "double_option")]
    pub neighbor_net_id: Option<Option<DbId>>,
    pub ym_roles: Option<Vec<RoleEntry>>,
    pub ym_projects: Option<Vec<ProjectEntry>>,
    #[serde(default, deserialize_with = "double_option")]
    pub education_level: Option<Option<String>>,
    pub education: Option<Vec<EducationEntry>>,
    pub skills: Option<Vec<String>>,
}

fn merge<T>(target: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *target = v;
    }
}

impl OnboardingPatch {
    /// Shallow merge into `record`, last write wins per field.
    pub fn apply_to(self, record: &mut OnboardingRecord) {
        merge(&mut record.phone, self.phone);
        merge(&mut record.personal_email, self.personal_email);
        merge(&mut record.ethnicity, self.ethnicity);
        merge(&mut record.date_of_birth, self.date_of_birth);
        merge(&mut record.subregion_id, self.subregion_id);
        merge(&mut record.neighbor_net_id, self.neighbor_net_id);
        merge(&mut record.ym_roles, self.ym_roles);
        merge(&mut record.ym_projects, self.ym_projects);
        merge(&mut record.education_level, self.education_level);
        merge(&mut record.education, self.education);
        merge(&mut record.skills, self.skills);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tenure(start: Option<(u32, i32)>, end: Option<(u32, i32)>, is_current: bool) -> Tenure {
        Tenure {
            start_month: start.map(|s| s.0),
            start_year: start.map(|s| s.1),
            end_month: end.map(|e| e.0),
            end_year: end.map(|e| e.1),
            is_current,
        }
    }

    fn role(designation: Option<Designation<DbId>>, tenure: Tenure) -> RoleEntry {
        RoleEntry {
            role: designation,
            tenure,
            ..RoleEntry::empty()
        }
    }

    // -- RoleEntry / ProjectEntry validity --

    #[test]
    fn role_needs_designation_and_start() {
        let t = tenure(Some((1, 2020)), None, true);
        assert!(role(Some(Designation::Existing(1)), t.clone()).validate().is_ok());
        assert!(role(Some(Designation::Custom("Amir".into())), t.clone()).validate().is_ok());
        assert!(role(None, t.clone()).validate().is_err());
        assert!(role(Some(Designation::Custom("   ".into())), t).validate().is_err());
    }

    #[test]
    fn role_missing_start_part_is_invalid() {
        let d = Some(Designation::Existing(1));
        assert!(role(d.clone(), tenure(None, None, true)).validate().is_err());
        let only_month = Tenure {
            start_month: Some(3),
            is_current: true,
            ..Tenure::default()
        };
        assert!(role(d, only_month).validate().is_err());
    }

    #[test]
    fn end_date_required_only_when_not_current() {
        let d = Some(Designation::Existing(1));
        assert!(role(d.clone(), tenure(Some((1, 2020)), None, false)).validate().is_err());
        assert!(role(d.clone(), tenure(Some((1, 2020)), Some((6, 2021)), false))
            .validate()
            .is_ok());
        assert!(role(d, tenure(Some((1, 2020)), None, true)).validate().is_ok());
    }

    #[test]
    fn month_out_of_range_is_invalid() {
        let d = Some(Designation::Existing(1));
        assert!(role(d, tenure(Some((13, 2020)), None, true)).validate().is_err());
    }

    #[test]
    fn project_uses_project_type_designation() {
        let mut p = ProjectEntry::empty();
        p.tenure = tenure(Some((2, 2022)), None, true);
        assert!(p.validate().is_err());
        p.project_type = Some(Designation::Custom("Retreat".into()));
        assert!(p.validate().is_ok());
    }

    // -- Tenure dates --

    #[test]
    fn current_tenure_has_no_end_date() {
        let t = tenure(Some((4, 2019)), Some((5, 2020)), true);
        assert_eq!(t.start_date(), NaiveDate::from_ymd_opt(2019, 4, 1));
        assert_eq!(t.end_date(), None);
    }

    #[test]
    fn tenure_from_dates_restores_month_year() {
        let start = NaiveDate::from_ymd_opt(2018, 9, 1);
        let end = NaiveDate::from_ymd_opt(2020, 1, 1);
        let t = Tenure::from_dates(start, end, false);
        assert_eq!(t, tenure(Some((9, 2018)), Some((1, 2020)), false));
    }

    // -- Designation serde --

    #[test]
    fn designation_wire_shape() {
        let existing: Designation<DbId> =
            serde_json::from_value(json!({"type": "existing", "value": 7})).unwrap();
        assert_eq!(existing, Designation::Existing(7));
        let custom: Designation<DbId> =
            serde_json::from_value(json!({"type": "custom", "value": "Shura"})).unwrap();
        assert_eq!(custom.into_columns(), (None, Some("Shura".to_string())));
    }

    #[test]
    fn designation_from_columns_prefers_existing() {
        assert_eq!(
            Designation::from_columns(Some(3), Some("x".to_string())),
            Some(Designation::Existing(3))
        );
        assert_eq!(Designation::<DbId>::from_columns(None, Some(" ".to_string())), None);
    }

    // -- OnboardingPatch --

    #[test]
    fn patch_merges_only_present_fields() {
        let mut record = OnboardingRecord {
            phone: Some("5551234567".into()),
            ethnicity: Some("Somali".into()),
            ..Default::default()
        };
        let patch: OnboardingPatch =
            serde_json::from_value(json!({"ethnicity": "Turkish", "skills": ["a"]})).unwrap();
        patch.apply_to(&mut record);

        assert_eq!(record.phone.as_deref(), Some("5551234567"));
        assert_eq!(record.ethnicity.as_deref(), Some("Turkish"));
        assert_eq!(record.skills, vec!["a".to_string()]);
    }

    #[test]
    fn patch_null_clears_field() {
        let mut record = OnboardingRecord {
            phone: Some("5551234567".into()),
            ..Default::default()
        };
        let patch: OnboardingPatch = serde_json::from_value(json!({"phone": null})).unwrap();
        patch.apply_to(&mut record);
        assert_eq!(record.phone, None);
    }

    #[test]
    fn entry_id_generated_when_missing() {
        let entry: RoleEntry = serde_json::from_value(json!({
            "role": {"type": "existing", "value": 1},
            "amir": null,
            "start_month": 1,
            "start_year": 2020,
            "is_current": true,
            "description": null
        }))
        .unwrap();
        assert!(!entry.id.is_empty());
        assert!(entry.validate().is_ok());
    }

    // -- skills --

    #[test]
    fn distinct_skills_ignore_case_and_blanks() {
        let record = OnboardingRecord {
            skills: vec!["Design".into(), "design ".into(), "".into(), "Writing".into()],
            ..Default::default()
        };
        assert_eq!(record.distinct_skill_count(), 2);
        assert_eq!(distinct_skills(&record.skills), vec!["Design".to_string(), "Writing".to_string()]);
    }
}
