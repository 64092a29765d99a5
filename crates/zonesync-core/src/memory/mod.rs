// # In-Memory Collaborators
//
// Implementations of the collaborator traits that keep everything in
// process memory. Used for tests, dry runs against a fixed inventory, and
// embedding.

pub mod directory;
pub mod zone_store;

pub use directory::{StaticDirectory, StaticDirectoryFactory};
pub use zone_store::{MemoryZoneStore, MemoryZoneStoreFactory};
