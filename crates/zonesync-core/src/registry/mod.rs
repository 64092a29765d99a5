//! Plugin-based collaborator registry
//!
//! The registry allows instance directories and zone stores to be registered
//! dynamically at runtime, avoiding hardcoded if-else chains.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use zonesync_core::registry::Registry;
//! use zonesync_core::config::ZoneStoreConfig;
//!
//! // Create a registry with the in-process collaborators
//! let registry = Registry::with_builtins();
//!
//! // Register cloud collaborators
//! zonesync_provider_route53::register(&registry);
//!
//! // Create a zone store from config
//! let store = registry
//!     .create_zone_store(&ZoneStoreConfig::Route53 { region: None })
//!     .await?;
//! ```
//!
//! ## Registration
//!
//! Implementations should register themselves during initialization:
//!
//! ```rust,ignore
//! # use zonesync_core::registry::Registry;
//! // In zonesync-provider-route53 crate
//! pub fn register(registry: &Registry) {
//!     registry.register_zone_store("route53", Box::new(Route53Factory));
//! }
//! ```

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::config::{DirectoryConfig, ZoneStoreConfig};
use crate::error::{Error, Result};
use crate::memory::{MemoryZoneStoreFactory, StaticDirectoryFactory};
use crate::traits::{InstanceDirectory, InstanceDirectoryFactory, ZoneStore, ZoneStoreFactory};

type Factories<F> = RwLock<HashMap<String, Arc<F>>>;

/// Registry for plugin-based directory and zone store creation
///
/// The registry maintains maps of type names to factory objects, allowing
/// dynamic instantiation of collaborators based on configuration.
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes. Factories are reference counted so the lock
/// is released before the async `create` call.
#[derive(Default)]
pub struct Registry {
    /// Registered instance directory factories
    directories: Factories<dyn InstanceDirectoryFactory>,

    /// Registered zone store factories
    zone_stores: Factories<dyn ZoneStoreFactory>,
}

fn read<F: ?Sized>(factories: &Factories<F>) -> Result<RwLockReadGuard<'_, HashMap<String, Arc<F>>>> {
    factories
        .read()
        .map_err(|_| Error::Other("registry lock poisoned".to_string()))
}

fn write<F: ?Sized>(
    factories: &Factories<F>,
) -> Result<RwLockWriteGuard<'_, HashMap<String, Arc<F>>>> {
    factories
        .write()
        .map_err(|_| Error::Other("registry lock poisoned".to_string()))
}

impl Registry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the collaborators of this crate
    ///
    /// Registers the `static` directory and the `memory` zone store.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry.register_directory("static", Box::new(StaticDirectoryFactory));
        registry.register_zone_store("memory", Box::new(MemoryZoneStoreFactory));
        registry
    }

    /// Register an instance directory factory
    ///
    /// # Parameters
    ///
    /// - `name`: Directory type name (e.g., "ec2", "static")
    /// - `factory`: Factory object for creating directory instances
    ///
    /// A later registration under the same name replaces the earlier one.
    pub fn register_directory(
        &self,
        name: impl Into<String>,
        factory: Box<dyn InstanceDirectoryFactory>,
    ) {
        let name = name.into();
        match write(&self.directories) {
            Ok(mut directories) => {
                directories.insert(name, Arc::from(factory));
            }
            Err(e) => tracing::error!("Failed to register directory {}: {}", name, e),
        }
    }

    /// Register a zone store factory
    ///
    /// # Parameters
    ///
    /// - `name`: Zone store type name (e.g., "route53", "memory")
    /// - `factory`: Factory object for creating zone store instances
    pub fn register_zone_store(&self, name: impl Into<String>, factory: Box<dyn ZoneStoreFactory>) {
        let name = name.into();
        match write(&self.zone_stores) {
            Ok(mut stores) => {
                stores.insert(name, Arc::from(factory));
            }
            Err(e) => tracing::error!("Failed to register zone store {}: {}", name, e),
        }
    }

    /// Create an instance directory from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn InstanceDirectory>)`: Created directory instance
    /// - `Err(Error)`: If the type is not registered or creation fails
    pub async fn create_directory(
        &self,
        config: &DirectoryConfig,
    ) -> Result<Box<dyn InstanceDirectory>> {
        let directory_type = config.type_name();

        // Release the lock before calling async create
        let factory = read(&self.directories)?
            .get(directory_type)
            .cloned()
            .ok_or_else(|| Error::config(format!("Unknown directory type: {}", directory_type)))?;

        factory.create(config).await
    }

    /// Create a zone store from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn ZoneStore>)`: Created zone store instance
    /// - `Err(Error)`: If the type is not registered or creation fails
    pub async fn create_zone_store(&self, config: &ZoneStoreConfig) -> Result<Box<dyn ZoneStore>> {
        let store_type = config.type_name();

        let factory = read(&self.zone_stores)?
            .get(store_type)
            .cloned()
            .ok_or_else(|| Error::config(format!("Unknown zone store type: {}", store_type)))?;

        factory.create(config).await
    }

    /// List all registered directory types, sorted
    pub fn list_directories(&self) -> Vec<String> {
        let mut names: Vec<String> = read(&self.directories)
            .map(|directories| directories.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    /// List all registered zone store types, sorted
    pub fn list_zone_stores(&self) -> Vec<String> {
        let mut names: Vec<String> = read(&self.zone_stores)
            .map(|stores| stores.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    /// Check if a directory type is registered
    pub fn has_directory(&self, name: &str) -> bool {
        read(&self.directories)
            .map(|directories| directories.contains_key(name))
            .unwrap_or(false)
    }

    /// Check if a zone store type is registered
    pub fn has_zone_store(&self, name: &str) -> bool {
        read(&self.zone_stores)
            .map(|stores| stores.contains_key(name))
            .unwrap_or(false)
    }
}
