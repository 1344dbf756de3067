//! Shared query parameter types for API handlers.
//!
//! Multi-select filters travel as comma-separated lists
//! (`?regions=1,2&skills=public-speaking,design`).

use serde::Deserialize;
use ym_core::directory::{DirectoryFilters, YearsRange};
use ym_core::types::DbId;

use crate::error::AppError;

/// `?step=` on the wizard entry point. Parsed leniently by the sequencer.
#[derive(Debug, Deserialize)]
pub struct StepParams {
    pub step: Option<String>,
}

/// `?subregion_id=` for the dependent neighbor-net dropdown.
#[derive(Debug, Deserialize)]
pub struct SubregionParams {
    pub subregion_id: DbId,
}

/// Directory search parameters.
#[derive(Debug, Default, Deserialize)]
pub struct PeopleSearchParams {
    pub search: Option<String>,
    pub regions: Option<String>,
    pub subregions: Option<String>,
    pub neighbor_nets: Option<String>,
    pub roles: Option<String>,
    pub skills: Option<String>,
    pub years_min: Option<i32>,
    pub years_max: Option<i32>,
    /// Number of pages to reveal (default: 1, capped at the last page).
    pub pages: Option<usize>,
}

fn split_list(raw: Option<&str>) -> impl Iterator<Item = &str> {
    raw.unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Parse a comma-separated id list. Blank entries are skipped.
pub fn parse_id_list(field: &str, raw: Option<&str>) -> Result<Vec<DbId>, AppError> {
    split_list(raw)
        .map(|s| {
            s.parse::<DbId>()
                .map_err(|_| AppError::BadRequest(format!("Invalid id '{s}' in {field}")))
        })
        .collect()
}

impl PeopleSearchParams {
    pub fn to_filters(&self) -> Result<DirectoryFilters, AppError> {
        Ok(DirectoryFilters {
            search: self.search.clone().unwrap_or_default(),
            regions: parse_id_list("regions", self.regions.as_deref())?,
            subregions: parse_id_list("subregions", self.subregions.as_deref())?,
            neighbor_nets: parse_id_list("neighbor_nets", self.neighbor_nets.as_deref())?,
            roles: parse_id_list("roles", self.roles.as_deref())?,
            skills: split_list(self.skills.as_deref()).map(str::to_string).collect(),
            years_in_ym: YearsRange {
                min: self.years_min,
                max: self.years_max,
            },
        })
    }
}
