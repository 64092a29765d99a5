//! Collaborator traits for zonesync
//!
//! This module defines the abstract interfaces the engine runs against.
//!
//! - [`InstanceDirectory`]: List the hosts that should exist
//! - [`ZoneStore`]: Read and mutate address records in a zone

pub mod instance_directory;
pub mod zone_store;

pub use instance_directory::{HostFilter, InstanceDirectory, InstanceDirectoryFactory};
pub use zone_store::{ZoneStore, ZoneStoreFactory};
