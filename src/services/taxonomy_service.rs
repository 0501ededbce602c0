//! CRUD over platforms and genres, which share the [`TaxonomyEntity`] shape.

use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::{TaxonomyEntity, TaxonomyKind},
    dto::catalog::{ActionResponse, TaxonomyInput, TaxonomySummary},
    error::ServiceError,
    state::SharedState,
};

/// Entries of `kind` sorted by name.
pub async fn list(
    state: &SharedState,
    kind: TaxonomyKind,
) -> Result<Vec<TaxonomySummary>, ServiceError> {
    let store = state.require_catalog_store().await?;
    let entries = store.list_taxonomy(kind).await?;
    Ok(entries.into_iter().map(Into::into).collect())
}

pub async fn get(
    state: &SharedState,
    kind: TaxonomyKind,
    id: Uuid,
) -> Result<TaxonomySummary, ServiceError> {
    let store = state.require_catalog_store().await?;
    store
        .find_taxonomy(kind, id)
        .await?
        .map(Into::into)
        .ok_or_else(|| not_found(kind, id))
}

/// Create an entry unless its name is already used.
pub async fn create(
    state: &SharedState,
    kind: TaxonomyKind,
    input: TaxonomyInput,
) -> Result<TaxonomySummary, ServiceError> {
    input.validate()?;
    let store = state.require_catalog_store().await?;
    let name = input.name.trim().to_owned();

    if store.find_taxonomy_by_name(kind, name.clone()).await?.is_some() {
        return Err(ServiceError::Conflict(format!(
            "a {kind} named `{name}` already exists"
        )));
    }

    let entry = TaxonomyEntity {
        id: Uuid::new_v4(),
        name,
        abbreviation: clean_abbreviation(input.abbreviation),
    };
    store.insert_taxonomy(kind, entry.clone()).await?;
    info!(%kind, id = %entry.id, name = %entry.name, "taxonomy entry created");
    Ok(entry.into())
}

/// Overwrite name and abbreviation of an existing entry.
pub async fn update(
    state: &SharedState,
    kind: TaxonomyKind,
    id: Uuid,
    input: TaxonomyInput,
) -> Result<TaxonomySummary, ServiceError> {
    input.validate()?;
    let store = state.require_catalog_store().await?;
    let entry = TaxonomyEntity {
        id,
        name: input.name.trim().to_owned(),
        abbreviation: clean_abbreviation(input.abbreviation),
    };

    if !store.update_taxonomy(kind, entry.clone()).await? {
        return Err(not_found(kind, id));
    }
    info!(%kind, %id, "taxonomy entry updated");
    Ok(entry.into())
}

/// Delete an entry; unknown ids succeed without effect. Games keep their references.
pub async fn delete(
    state: &SharedState,
    kind: TaxonomyKind,
    id: Uuid,
) -> Result<ActionResponse, ServiceError> {
    let store = state.require_catalog_store().await?;
    if store.delete_taxonomy(kind, id).await? {
        info!(%kind, %id, "taxonomy entry deleted");
        Ok(ActionResponse::new(format!("{kind} `{id}` deleted")))
    } else {
        Ok(ActionResponse::new(format!(
            "{kind} `{id}` not found; nothing to delete"
        )))
    }
}

fn clean_abbreviation(abbreviation: Option<String>) -> Option<String> {
    abbreviation
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn not_found(kind: TaxonomyKind, id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("{kind} `{id}` not found"))
}
