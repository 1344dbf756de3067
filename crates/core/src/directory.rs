//! Member directory: filtering, fuzzy search and paged visibility over a
//! read-only snapshot of every member.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::search::{clamp_pages, fuzzy_search, SearchKey, DEFAULT_THRESHOLD};
use crate::types::DbId;

/// Number of members revealed per page.
pub const PAGE_SIZE: usize = 20;

// ---------------------------------------------------------------------------
// Snapshot types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    pub id: DbId,
    pub name: String,
}

/// A role as shown in the directory. Custom roles have no id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleLabel {
    pub id: Option<DbId>,
    pub name: String,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonListItem {
    pub id: DbId,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub avatar_url: Option<String>,
    pub region: Option<NamedRef>,
    pub subregion: Option<NamedRef>,
    pub neighbor_net: Option<NamedRef>,
    pub roles: Vec<RoleLabel>,
    pub skills: Vec<String>,
    pub years_in_ym: Option<i32>,
    pub is_claimed: bool,
}

impl PersonListItem {
    pub fn full_name(&self) -> String {
        [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Whole years between joining and `today`, by calendar year.
pub fn years_in_ym(joined: NaiveDate, today: NaiveDate) -> i32 {
    today.year() - joined.year()
}

/// Skill option id: lowercased, whitespace runs replaced by `-`.
pub fn skill_slug(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearsRange {
    pub min: Option<i32>,
    pub max: Option<i32>,
}

impl YearsRange {
    pub fn is_set(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }

    fn contains(&self, years: Option<i32>) -> bool {
        if !self.is_set() {
            return true;
        }
        let Some(years) = years else {
            return false;
        };
        self.min.map_or(true, |min| years >= min) && self.max.map_or(true, |max| years <= max)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryFilters {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub regions: Vec<DbId>,
    #[serde(default)]
    pub subregions: Vec<DbId>,
    #[serde(default)]
    pub neighbor_nets: Vec<DbId>,
    #[serde(default)]
    pub roles: Vec<DbId>,
    /// Skill slugs, as produced by [`skill_slug`].
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub years_in_ym: YearsRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterCategory {
    Regions,
    Subregions,
    NeighborNets,
    Roles,
    Skills,
    YearsInYm,
}

impl DirectoryFilters {
    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty()
            && self.regions.is_empty()
            && self.subregions.is_empty()
            && self.neighbor_nets.is_empty()
            && self.roles.is_empty()
            && self.skills.is_empty()
            && !self.years_in_ym.is_set()
    }

    pub fn clear(&mut self, category: FilterCategory) {
        match category {
            FilterCategory::Regions => self.regions.clear(),
            FilterCategory::Subregions => self.subregions.clear(),
            FilterCategory::NeighborNets => self.neighbor_nets.clear(),
            FilterCategory::Roles => self.roles.clear(),
            FilterCategory::Skills => self.skills.clear(),
            FilterCategory::YearsInYm => self.years_in_ym = YearsRange::default(),
        }
    }

    /// Category filters only: AND across categories, OR within one.
    fn admits(&self, person: &PersonListItem) -> bool {
        fn any_of(selected: &[DbId], value: &Option<NamedRef>) -> bool {
            selected.is_empty() || value.as_ref().is_some_and(|r| selected.contains(&r.id))
        }

        any_of(&self.regions, &person.region)
            && any_of(&self.subregions, &person.subregion)
            && any_of(&self.neighbor_nets, &person.neighbor_net)
            && (self.roles.is_empty()
                || person
                    .roles
                    .iter()
                    .any(|r| r.id.is_some_and(|id| self.roles.contains(&id))))
            && (self.skills.is_empty() || self.skills.iter().any(|slug| has_skill(person, slug)))
            && self.years_in_ym.contains(person.years_in_ym)
    }
}

fn has_skill(person: &PersonListItem, slug: &str) -> bool {
    let needle = slug.replace('-', " ").to_lowercase();
    person
        .skills
        .iter()
        .any(|s| s.to_lowercase().contains(&needle))
}

fn search_keys() -> Vec<SearchKey<PersonListItem>> {
    vec![
        SearchKey {
            name: "first_name",
            weight: 2.0,
            values: |p| p.first_name.as_deref().into_iter().collect(),
        },
        SearchKey {
            name: "last_name",
            weight: 2.0,
            values: |p| p.last_name.as_deref().into_iter().collect(),
        },
        SearchKey {
            name: "roles",
            weight: 1.5,
            values: |p| p.roles.iter().map(|r| r.name.as_str()).collect(),
        },
        SearchKey {
            name: "region",
            weight: 1.0,
            values: |p| p.region.iter().map(|r| r.name.as_str()).collect(),
        },
        SearchKey {
            name: "subregion",
            weight: 1.0,
            values: |p| p.subregion.iter().map(|r| r.name.as_str()).collect(),
        },
        SearchKey {
            name: "skills",
            weight: 1.0,
            values: |p| p.skills.iter().map(String::as_str).collect(),
        },
        SearchKey {
            name: "email",
            weight: 1.0,
            values: |p| vec![p.email.as_str()],
        },
    ]
}

/// Apply search and category filters, returning snapshot indices.
///
/// With a search term the result is in relevance order; otherwise it keeps
/// snapshot order.
pub fn filter_people(people: &[PersonListItem], filters: &DirectoryFilters) -> Vec<usize> {
    if filters.search.trim().is_empty() {
        people
            .iter()
            .enumerate()
            .filter(|(_, p)| filters.admits(p))
            .map(|(i, _)| i)
            .collect()
    } else {
        fuzzy_search(people, &filters.search, &search_keys(), DEFAULT_THRESHOLD)
            .into_iter()
            .filter(|hit| filters.admits(hit.item))
            .map(|hit| hit.index)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// View
// ---------------------------------------------------------------------------

/// Filtered, paged view over a member snapshot. The snapshot is never
/// mutated.
#[derive(Debug, Clone)]
pub struct DirectoryView {
    people: Vec<PersonListItem>,
    filters: DirectoryFilters,
    filtered: Vec<usize>,
    visible_count: usize,
}

impl DirectoryView {
    pub fn new(people: Vec<PersonListItem>) -> Self {
        let filtered = (0..people.len()).collect();
        Self {
            people,
            filters: DirectoryFilters::default(),
            filtered,
            visible_count: PAGE_SIZE,
        }
    }

    pub fn filters(&self) -> &DirectoryFilters {
        &self.filters
    }

    pub fn update_filters(&mut self, filters: DirectoryFilters) {
        self.filters = filters;
        self.refilter();
    }

    pub fn clear_category(&mut self, category: FilterCategory) {
        self.filters.clear(category);
        self.refilter();
    }

    pub fn clear_all(&mut self) {
        self.filters = DirectoryFilters::default();
        self.refilter();
    }

    /// Reveal one more page. No-op when everything is visible.
    pub fn load_more(&mut self) {
        if self.has_more() {
            self.visible_count += PAGE_SIZE;
        }
    }

    /// Reveal the first `pages` pages at once, as if `load_more` had been
    /// pressed `pages - 1` times.
    pub fn show_pages(&mut self, pages: Option<usize>) {
        self.visible_count = clamp_pages(pages, self.filtered.len(), PAGE_SIZE) * PAGE_SIZE;
    }

    pub fn has_more(&self) -> bool {
        self.visible_count < self.filtered.len()
    }

    pub fn total(&self) -> usize {
        self.filtered.len()
    }

    pub fn visible(&self) -> Vec<&PersonListItem> {
        self.filtered
            .iter()
            .take(self.visible_count)
            .map(|&i| &self.people[i])
            .collect()
    }

    fn refilter(&mut self) {
        let filtered = filter_people(&self.people, &self.filters);
        if filtered.len() != self.filtered.len() {
            self.visible_count = PAGE_SIZE;
        }
        self.filtered = filtered;
    }
}

// ---------------------------------------------------------------------------
// Filter options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOption<I> {
    pub id: I,
    pub name: String,
    pub count: usize,
}

/// Selectable options for each category, with member counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub regions: Vec<FilterOption<DbId>>,
    pub subregions: Vec<FilterOption<DbId>>,
    pub neighbor_nets: Vec<FilterOption<DbId>>,
    pub roles: Vec<FilterOption<DbId>>,
    pub skills: Vec<FilterOption<String>>,
}

fn tally<I: Ord + Clone>(counts: &mut BTreeMap<I, FilterOption<I>>, id: I, name: &str) {
    counts
        .entry(id.clone())
        .or_insert_with(|| FilterOption {
            id,
            name: name.to_string(),
            count: 0,
        })
        .count += 1;
}

fn sorted<I>(counts: BTreeMap<I, FilterOption<I>>) -> Vec<FilterOption<I>> {
    let mut options: Vec<_> = counts.into_values().collect();
    options.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    options
}

/// Build the option lists from the snapshot. Each member counts at most once
/// per option; options are sorted by name.
pub fn build_filter_options(people: &[PersonListItem]) -> FilterOptions {
    let mut regions = BTreeMap::new();
    let mut subregions = BTreeMap::new();
    let mut neighbor_nets = BTreeMap::new();
    let mut roles = BTreeMap::new();
    let mut skills = BTreeMap::new();

    for person in people {
        if let Some(r) = &person.region {
            tally(&mut regions, r.id, &r.name);
        }
        if let Some(r) = &person.subregion {
            tally(&mut subregions, r.id, &r.name);
        }
        if let Some(r) = &person.neighbor_net {
            tally(&mut neighbor_nets, r.id, &r.name);
        }

        let mut role_ids: Vec<DbId> = Vec::new();
        for role in &person.roles {
            if let Some(id) = role.id {
                if !role_ids.contains(&id) {
                    role_ids.push(id);
                    tally(&mut roles, id, &role.name);
                }
            }
        }

        let mut slugs: Vec<String> = Vec::new();
        for skill in &person.skills {
            let slug = skill_slug(skill);
            if !slug.is_empty() && !slugs.contains(&slug) {
                tally(&mut skills, slug.clone(), skill.trim());
                slugs.push(slug);
            }
        }
    }

    FilterOptions {
        regions: sorted(regions),
        subregions: sorted(subregions),
        neighbor_nets: sorted(neighbor_nets),
        roles: sorted(roles),
        skills: sorted(skills),
    }
}
