//! Resource types exposed over HTTP
//!
//! Each resource is an [`Entity`] plus the request shapes and envelope names
//! its endpoints use. The generic handlers in [`crate::handlers::crud`] are
//! written once against [`Resource`].

pub mod organization;
pub mod todo;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::repository::{Entity, Filters, Repository};
use crate::state::Models;
use crate::validator::Validator;

pub use organization::{CreateOrganization, Organization, OrganizationFilter, OrganizationQuery, UpdateOrganization};
pub use todo::{CreateTodo, Todo, TodoFilter, TodoQuery, UpdateTodo};

/// An entity served under its own collection path
pub trait Resource: Entity + Serialize {
    /// Body of a create request
    type Create: DeserializeOwned + Send + 'static;

    /// Body of a partial update; absent fields are left unchanged
    type Patch: DeserializeOwned + Send + 'static;

    /// Query string of a list request
    type Query: DeserializeOwned + Send + 'static;

    /// Envelope key for a single item
    const ITEM_KEY: &'static str;

    /// Envelope key for a page of items
    const LIST_KEY: &'static str;

    /// Collection path, e.g. `/v1/todoitems`
    const COLLECTION_PATH: &'static str;

    /// Message returned after a successful delete
    const DELETED_MESSAGE: &'static str;

    /// A new, not yet persisted item
    fn from_create(input: Self::Create) -> Self;

    /// Overwrite every field present in `patch`
    fn apply_patch(&mut self, patch: Self::Patch);

    /// Resource filter and paging for a list request, recording problems in `v`
    fn list_params(query: &Self::Query, v: &mut Validator) -> (Self::Filter, Filters);

    /// The model for this resource
    fn repository(models: &Models) -> Arc<dyn Repository<Self>>;
}
