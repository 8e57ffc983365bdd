//! Built-in rule catalog.
//!
//! A representative slice of the AEP checks, enough to cover every
//! descriptor kind. Downstream catalogs extend the registry with their own
//! guides.

pub mod naming;
pub mod requests;

use crate::registry::{Registry, RegistryError};
use std::sync::Arc;

/// Build the registry with every built-in rule. Fails only on a catalog bug
/// (duplicate id or unknown section), which is a fatal, not a problem.
pub fn default_registry() -> Result<Registry, RegistryError> {
    let mut reg = Registry::new();
    reg.register(Arc::new(requests::get_request_required_fields()))?;
    reg.register(Arc::new(requests::list_request_required_fields()))?;
    reg.register(Arc::new(requests::create_request_required_fields()))?;
    reg.register(Arc::new(requests::update_request_required_fields()))?;
    reg.register(Arc::new(requests::delete_request_required_fields()))?;
    reg.register(Arc::new(naming::field_names()))?;
    reg.register(Arc::new(naming::enum_value_names()))?;
    reg.register(Arc::new(naming::method_names()))?;
    Ok(reg)
}
