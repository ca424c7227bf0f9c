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
//! Error types shared by every part of the ECS
//!
//! All failures are recoverable values. A missing component is an ordinary
//! outcome that callers branch on, so lookups return [`EcsError`] through
//! [`Result`] instead of panicking.

use std::collections::TryReserveError;

use crate::ecs::{Entity, SystemId};

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, EcsError>;

/// Errors produced by entity, component, system and plugin operations
#[derive(Debug, thiserror::Error)]
pub enum EcsError {
    /// The handle's generation no longer matches its slot (use after destroy)
    #[error("stale entity handle {entity}")]
    StaleHandle {
        /// The rejected handle
        entity: Entity,
    },

    /// The handle uses the reserved sentinel index
    #[error("invalid entity handle {entity}")]
    InvalidHandle {
        /// The rejected handle
        entity: Entity,
    },

    /// The entity is live but has no component of the requested type
    #[error("{entity} has no `{component}` component")]
    ComponentNotFound {
        /// Entity that was queried
        entity: Entity,
        /// Type name of the missing component
        component: &'static str,
    },

    /// No array has been registered for the component type
    #[error("component type `{component}` is not registered")]
    ComponentNotRegistered {
        /// Type name of the component
        component: &'static str,
    },

    /// The same component array was requested twice in one mutable borrow
    #[error("component type `{component}` requested twice in one borrow")]
    AliasedComponentAccess {
        /// Type name of the component
        component: &'static str,
    },

    /// No system exists with this id
    #[error("no system registered with id {id}")]
    SystemNotFound {
        /// The unknown id
        id: SystemId,
    },

    /// A dependency names a system that was never registered
    #[error("system `{system}` depends on unregistered system {dependency}")]
    UnknownDependency {
        /// Name of the system declaring the dependency
        system: String,
        /// The unknown dependency id
        dependency: SystemId,
    },

    /// The system dependency graph contains a cycle
    #[error("cyclic dependency among systems {systems:?}")]
    CyclicDependency {
        /// Systems that could not be ordered
        systems: Vec<SystemId>,
    },

    /// Storage growth failed because the allocator is exhausted
    #[error("out of memory: {0}")]
    OutOfMemory(#[from] TryReserveError),

    /// Every index below the sentinel is in use
    #[error("entity index space exhausted")]
    EntityLimitReached,

    /// A system reported its own failure while updating
    #[error("system `{system}` failed: {reason}")]
    SystemFailed {
        /// Name of the failing system
        system: String,
        /// Failure description supplied by the system
        reason: String,
    },

    /// A plugin with the same name is already registered
    #[error("plugin `{0}` is already registered")]
    DuplicatePlugin(String),

    /// A plugin was built against an incompatible plugin API version
    #[error("plugin `{plugin}` API version {plugin_api} is incompatible with engine API version {engine_api}")]
    IncompatiblePlugin {
        /// Plugin name
        plugin: String,
        /// API version declared by the plugin
        plugin_api: String,
        /// API version of this crate
        engine_api: String,
    },

    /// A plugin depends on a plugin that is not registered
    #[error("plugin `{plugin}` depends on `{dependency}` which is not registered")]
    MissingPluginDependency {
        /// Plugin declaring the dependency
        plugin: String,
        /// The missing plugin name
        dependency: String,
    },

    /// Plugin dependencies form a cycle
    #[error("circular dependency among plugins {plugins:?}")]
    PluginDependencyCycle {
        /// Plugins that could not be ordered
        plugins: Vec<String>,
    },

    /// A plugin failed while building or shutting down
    #[error("plugin `{plugin}` failed: {reason}")]
    PluginFailed {
        /// Plugin name
        plugin: String,
        /// Failure description
        reason: String,
    },
}

impl EcsError {
    /// Build a [`EcsError::SystemFailed`] from inside a system
    pub fn system(system: impl Into<String>, reason: impl Into<String>) -> Self {
        EcsError::SystemFailed {
            system: system.into(),
            reason: reason.into(),
        }
    }

    /// Returns `true` when the error means "the thing is not there"
    ///
    /// Stale handles count as absent: a destroyed entity has no components.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            EcsError::StaleHandle { .. }
                | EcsError::ComponentNotFound { .. }
                | EcsError::SystemNotFound { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        let entity = Entity::new(3, 1);
        assert!(EcsError::StaleHandle { entity }.is_not_found());
        assert!(EcsError::ComponentNotFound { entity, component: "Position" }.is_not_found());
        assert!(EcsError::SystemNotFound { id: SystemId::new(7) }.is_not_found());
        assert!(!EcsError::CyclicDependency { systems: vec![] }.is_not_found());
        assert!(!EcsError::system("movement", "boom").is_not_found());
    }

    #[test]
    fn test_messages() {
        let entity = Entity::new(4, 2);
        let err = EcsError::ComponentNotFound { entity, component: "Velocity" };
        assert_eq!(err.to_string(), "Entity(4, gen: 2) has no `Velocity` component");

        let err = EcsError::system("render_sync", "texture missing");
        assert_eq!(err.to_string(), "system `render_sync` failed: texture missing");

        let err = EcsError::EntityLimitReached;
        assert_eq!(err.to_string(), "entity index space exhausted");
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_out_of_memory_from_try_reserve() {
        let mut v: Vec<u64> = Vec::new();
        let reserve_err = v.try_reserve(usize::MAX).unwrap_err();
        let err: EcsError = reserve_err.into();
        assert!(matches!(err, EcsError::OutOfMemory(_)));
    }
}
