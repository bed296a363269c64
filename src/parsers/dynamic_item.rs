//! Live-instance extraction interface.
//!
//! Some display names only exist inside a running installation (entity
//! types, job names, and similar registry contents). Adapters implementing
//! [`DynamicItem`] read one such registry and feed `(context, display
//! text)` pairs into the catalog. This crate ships the contract only; the
//! embedding application registers its adapters and provides the
//! [`LiveInstance`] handle.

use crate::catalog::Catalog;
use crate::error::Result;

/// Handle onto a running installation.
pub trait LiveInstance {
    /// Version string of the running installation, when it can be
    /// determined. Extraction refuses to start without one.
    fn version(&self) -> Option<String>;
}

/// A single-purpose adapter reading display names out of one registry.
pub trait DynamicItem {
    /// Short identifier used to pick adapters.
    fn label(&self) -> &'static str;

    /// Whether the registry this adapter reads is present in `instance`.
    fn is_available(&self, instance: &dyn LiveInstance) -> bool;

    /// Queries the registry and inserts one entry per discovered item,
    /// typically via [`Catalog::insert`] with the adapter's context label.
    fn collect(
        &self,
        catalog: &mut Catalog,
        version: &str,
        instance: &dyn LiveInstance,
    ) -> Result<()>;
}
