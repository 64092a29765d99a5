// # zonesync-core
//
// Core library for reconciling instance inventories with DNS zones.
//
// ## Architecture Overview
//
// - **InstanceDirectory**: Trait for listing the hosts that should exist
// - **ZoneStore**: Trait for reading and mutating address records in a zone
// - **engine**: Pure diff / merge / render / plan / batch pipeline
// - **Reconciler**: Drives one run from both snapshots to submitted batches
// - **Registry**: Plugin-based registry for directories and zone stores
//
// ## Design Principles
//
// 1. **Pure Core**: Everything between the two snapshots and the plan is
//    synchronous and performs no I/O
// 2. **Stateless**: Every run re-derives the plan from fresh snapshots
// 3. **Plugin-Based**: Collaborators are registered by name, no hard-coded if-else
// 4. **Library-First**: The CLI is a thin layer over this crate

pub mod config;
pub mod engine;
pub mod error;
pub mod memory;
pub mod model;
pub mod registry;
pub mod traits;
pub mod wire;

// Re-export core types for convenience
pub use config::{DirectoryConfig, EngineConfig, SyncConfig, ZoneConfig, ZoneStoreConfig};
pub use engine::{ReconcileReport, Reconciler};
pub use error::{Error, Result};
pub use memory::{MemoryZoneStore, StaticDirectory};
pub use model::{HostChange, HostRecord, HostSnapshot, MutationAction, ZoneRecord, ZoneRef};
pub use registry::Registry;
pub use traits::{HostFilter, InstanceDirectory, ZoneStore};
