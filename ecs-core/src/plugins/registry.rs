// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Plugin registry and loader
//!
//! This module provides the registry for managing plugins, including:
//! - Static registration via direct API calls
//! - Dependency resolution and circular dependency detection
//! - Version compatibility checking

use std::collections::{BTreeMap, BTreeSet};

use semver::Version;
use tracing::{info, warn};

use crate::ecs::graph::topological_sort;
use crate::ecs::World;
use crate::error::{EcsError, Result};
use crate::plugins::api::{Plugin, PLUGIN_API_VERSION};

/// Plugin registry for managing and building plugins
///
/// Plugins are kept sorted by name, so plugins without an ordering constraint
/// between them are built alphabetically.
///
/// The registry remembers which plugins have been built into the world. A
/// failed [`Self::build_all`] can be retried without building the earlier
/// plugins twice, and a failed [`Self::shutdown_all`] resumes with the plugins
/// still running.
pub struct PluginRegistry {
    plugins: BTreeMap<String, Box<dyn Plugin>>,
    load_order: Vec<String>,
    active: BTreeSet<String>,
    built: bool,
}

impl PluginRegistry {
    /// Create a new plugin registry
    pub fn new() -> Self {
        PluginRegistry {
            plugins: BTreeMap::new(),
            load_order: Vec::new(),
            active: BTreeSet::new(),
            built: false,
        }
    }

    /// Register a plugin
    ///
    /// # Errors
    ///
    /// - [`EcsError::DuplicatePlugin`] if the name is taken
    /// - [`EcsError::IncompatiblePlugin`] if the API version does not match
    /// - [`EcsError::PluginFailed`] once [`Self::build_all`] has run
    pub fn register(&mut self, plugin: Box<dyn Plugin>) -> Result<()> {
        let name = plugin.name().to_string();
        if self.built {
            return Err(EcsError::PluginFailed {
                plugin: name,
                reason: "cannot register plugins after the registry was built".to_string(),
            });
        }
        if self.plugins.contains_key(&name) {
            return Err(EcsError::DuplicatePlugin(name));
        }

        let plugin_api = plugin.api_version();
        if !is_version_compatible(plugin_api, PLUGIN_API_VERSION) {
            warn!(plugin = %name, plugin_api, engine_api = PLUGIN_API_VERSION, "rejected incompatible plugin");
            return Err(EcsError::IncompatiblePlugin {
                plugin: name,
                plugin_api: plugin_api.to_string(),
                engine_api: PLUGIN_API_VERSION.to_string(),
            });
        }

        info!(plugin = %name, version = plugin.version(), "registered plugin");
        self.plugins.insert(name, plugin);
        Ok(())
    }

    /// Build every plugin into `world`, dependencies first
    ///
    /// # Errors
    ///
    /// - [`EcsError::MissingPluginDependency`] for an unregistered dependency
    /// - [`EcsError::PluginDependencyCycle`] if dependencies form a cycle
    /// - [`EcsError::PluginFailed`] wrapping the first failing build
    ///
    /// Plugins built before a failure stay built and are skipped on the next
    /// call.
    pub fn build_all(&mut self, world: &mut World) -> Result<()> {
        if self.built {
            return Ok(());
        }

        let mut dependencies: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (name, plugin) in &self.plugins {
            let mut deps = BTreeSet::new();
            for dep in plugin.dependencies() {
                if !self.plugins.contains_key(dep) {
                    return Err(EcsError::MissingPluginDependency {
                        plugin: name.clone(),
                        dependency: dep.to_string(),
                    });
                }
                deps.insert(dep.to_string());
            }
            dependencies.insert(name.clone(), deps);
        }

        self.load_order = topological_sort(&dependencies)
            .map_err(|plugins| EcsError::PluginDependencyCycle { plugins })?;

        for name in &self.load_order {
            if self.active.contains(name) {
                continue;
            }
            if let Some(plugin) = self.plugins.get_mut(name) {
                plugin.build(world).map_err(|err| EcsError::PluginFailed {
                    plugin: name.clone(),
                    reason: err.to_string(),
                })?;
                self.active.insert(name.clone());
                info!(plugin = %name, "built plugin");
            }
        }

        self.built = true;
        Ok(())
    }

    /// Shut every built plugin down in reverse build order
    ///
    /// Covers plugins built by a partially failed [`Self::build_all`] too. If
    /// a shutdown fails, the plugins after it in reverse order keep running
    /// and the next call starts with the failed one.
    pub fn shutdown_all(&mut self, world: &mut World) -> Result<()> {
        for name in self.load_order.iter().rev() {
            if !self.active.contains(name) {
                continue;
            }
            if let Some(plugin) = self.plugins.get_mut(name) {
                plugin.shutdown(world).map_err(|err| EcsError::PluginFailed {
                    plugin: name.clone(),
                    reason: err.to_string(),
                })?;
            }
            self.active.remove(name);
        }

        self.built = false;
        Ok(())
    }

    /// Get a plugin by name
    pub fn get(&self, name: &str) -> Option<&dyn Plugin> {
        self.plugins.get(name).map(|p| p.as_ref())
    }

    /// Get a mutable plugin by name
    pub fn get_mut(&mut self, name: &str) -> Option<&mut (dyn Plugin + '_)> {
        self.plugins.get_mut(name).map(|p| &mut **p as &mut (dyn Plugin + '_))
    }

    /// Get the number of registered plugins
    pub fn plugin_count(&self) -> usize {
        self.plugins.len()
    }

    /// Check if [`Self::build_all`] has completed
    pub fn is_built(&self) -> bool {
        self.built
    }

    /// Returns `true` if `name` has been built and not shut down
    pub fn is_active(&self, name: &str) -> bool {
        self.active.contains(name)
    }

    /// Names of plugins in the order they were built
    pub fn load_order(&self) -> &[String] {
        &self.load_order
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if a plugin API version is compatible with the engine
///
/// Uses semantic versioning rules:
/// - Major version must match
/// - For major version 0.x.y, minor versions must match (breaking changes)
/// - For major version >= 1, the plugin minor version must not be newer
/// - Patch version is ignored
pub fn is_version_compatible(plugin_version: &str, engine_version: &str) -> bool {
    let (Ok(plugin_ver), Ok(engine_ver)) =
        (Version::parse(plugin_version), Version::parse(engine_version))
    else {
        return false;
    };

    if plugin_ver.major != engine_ver.major {
        return false;
    }
    if plugin_ver.major != 0 {
        plugin_ver.minor <= engine_ver.minor
    } else {
        plugin_ver.minor == engine_ver.minor
    }
}

/// Register a plugin value, propagating the registration error
///
/// ```
/// # use std::any::Any;
/// # use ecs_core::ecs::World;
/// # use ecs_core::plugins::{Plugin, PluginRegistry};
/// # use ecs_core::register_plugin;
/// # struct Noop;
/// # impl Plugin for Noop {
/// #     fn name(&self) -> &str { "noop" }
/// #     fn version(&self) -> &str { "0.1.0" }
/// #     fn build(&mut self, _world: &mut World) -> ecs_core::Result<()> { Ok(()) }
/// #     fn as_any(&self) -> &dyn Any { self }
/// #     fn as_any_mut(&mut self) -> &mut dyn Any { self }
/// # }
/// let mut registry = PluginRegistry::new();
/// register_plugin!(registry, Noop).unwrap();
/// assert_eq!(registry.plugin_count(), 1);
/// ```
#[macro_export]
macro_rules! register_plugin {
    ($registry:expr, $plugin:expr) => {
        $registry.register(::std::boxed::Box::new($plugin))
    };
}
