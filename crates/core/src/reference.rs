//! Reference data used by the onboarding wizard.
//!
//! Subregions, neighbor-nets, role types and selectable users are loaded
//! once per wizard session through a [`ReferenceSource`] and then shared
//! read-only by every step.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use crate::error::CoreError;
use crate::types::DbId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subregion {
    pub id: DbId,
    pub name: String,
    pub region_id: Option<DbId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborNet {
    pub id: DbId,
    pub name: String,
    pub subregion_id: DbId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleType {
    pub id: DbId,
    pub name: String,
    pub category: Option<String>,
}

/// A member who can be picked as an amir on a role or project entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserOption {
    pub id: DbId,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
}

impl UserOption {
    /// `"First Last"`, falling back to the email when no name is set.
    pub fn display_label(&self) -> String {
        let name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if name.is_empty() {
            self.email.clone()
        } else {
            name
        }
    }
}

/// Everything the wizard needs for its dropdowns and cross-checks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReferenceData {
    pub subregions: Vec<Subregion>,
    pub neighbor_nets: Vec<NeighborNet>,
    pub role_types: Vec<RoleType>,
    pub users: Vec<UserOption>,
}

impl ReferenceData {
    pub fn neighbor_net(&self, id: DbId) -> Option<&NeighborNet> {
        self.neighbor_nets.iter().find(|nn| nn.id == id)
    }

    /// Neighbor-nets belonging to `subregion_id`, in source order.
    pub fn neighbor_nets_for(&self, subregion_id: DbId) -> Vec<NeighborNet> {
        self.neighbor_nets
            .iter()
            .filter(|nn| nn.subregion_id == subregion_id)
            .cloned()
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// Where reference data comes from. Errors are plain strings.
#[async_trait]
pub trait ReferenceSource: Send + Sync {
    async fn subregions(&self) -> Result<Vec<Subregion>, String>;

    /// All neighbor-nets, or only those of `subregion_id` when given.
    async fn neighbor_nets(&self, subregion_id: Option<DbId>) -> Result<Vec<NeighborNet>, String>;

    async fn role_types(&self) -> Result<Vec<RoleType>, String>;

    async fn selectable_users(&self) -> Result<Vec<UserOption>, String>;
}

/// Load all four collections concurrently.
///
/// Subregions, neighbor-nets and role types are required; a failure in any
/// of them fails the load. A users failure degrades to an empty list.
pub async fn load_reference_data(source: &dyn ReferenceSource) -> Result<ReferenceData, CoreError> {
    let (subregions, neighbor_nets, role_types, users) = tokio::join!(
        source.subregions(),
        source.neighbor_nets(None),
        source.role_types(),
        source.selectable_users(),
    );

    let subregions = subregions.map_err(|e| unavailable("subregions", e))?;
    let neighbor_nets = neighbor_nets.map_err(|e| unavailable("neighbor-nets", e))?;
    let role_types = role_types.map_err(|e| unavailable("role types", e))?;
    let users = users.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Selectable users failed to load; continuing without them");
        Vec::new()
    });

    Ok(ReferenceData {
        subregions,
        neighbor_nets,
        role_types,
        users,
    })
}

fn unavailable(what: &str, error: String) -> CoreError {
    tracing::error!(error = %error, "Failed to load {what}");
    CoreError::Unavailable(format!("Failed to load {what}: {error}"))
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

/// Loads reference data at most once per wizard session.
///
/// A failed load is not cached; the next call tries again.
pub struct ReferenceCache {
    source: Arc<dyn ReferenceSource>,
    data: OnceCell<ReferenceData>,
}

impl ReferenceCache {
    pub fn new(source: Arc<dyn ReferenceSource>) -> Self {
        Self {
            source,
            data: OnceCell::new(),
        }
    }

    pub async fn get(&self) -> Result<&ReferenceData, CoreError> {
        self.data
            .get_or_try_init(|| load_reference_data(self.source.as_ref()))
            .await
    }

    /// Neighbor-nets of one subregion, served from the cache.
    pub async fn neighbor_nets_for(&self, subregion_id: DbId) -> Result<Vec<NeighborNet>, CoreError> {
        Ok(self.get().await?.neighbor_nets_for(subregion_id))
    }

    pub fn is_loaded(&self) -> bool {
        self.data.initialized()
    }
}
