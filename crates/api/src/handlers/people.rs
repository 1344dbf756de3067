//! Handlers for the `/people` directory.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Serialize;
use ym_core::directory::{build_filter_options, DirectoryView, FilterOptions, PersonListItem};
use ym_core::error::CoreError;
use ym_core::member::PersonProfile;
use ym_core::types::DbId;
use ym_db::views::{load_directory, load_profile};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::PeopleSearchParams;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DirectorySnapshot {
    pub people: Vec<PersonListItem>,
    pub filters: FilterOptions,
}

#[derive(Debug, Serialize)]
pub struct PeoplePage {
    pub people: Vec<PersonListItem>,
    /// Members matching the filters.
    pub total: usize,
    pub has_more: bool,
}

async fn snapshot(state: &AppState) -> AppResult<Vec<PersonListItem>> {
    let today = chrono::Utc::now().date_naive();
    Ok(load_directory(&state.pool, today).await?)
}

/// GET /api/v1/people
pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<DataResponse<DirectorySnapshot>>> {
    let people = snapshot(&state).await?;
    let filters = build_filter_options(&people);
    Ok(Json(DataResponse {
        data: DirectorySnapshot { people, filters },
    }))
}

/// GET /api/v1/people/search
///
/// Applies the filters and reveals `pages` pages of results.
pub async fn search(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<PeopleSearchParams>,
) -> AppResult<Json<DataResponse<PeoplePage>>> {
    let filters = params.to_filters()?;

    let mut view = DirectoryView::new(snapshot(&state).await?);
    view.update_filters(filters);
    view.show_pages(params.pages);

    Ok(Json(DataResponse {
        data: PeoplePage {
            people: view.visible().into_iter().cloned().collect(),
            total: view.total(),
            has_more: view.has_more(),
        },
    }))
}

/// GET /api/v1/people/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<PersonProfile>>> {
    let profile = load_profile(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Person", id }))?;
    Ok(Json(DataResponse { data: profile }))
}
