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
//! Plugin API definitions
//!
//! A plugin bundles component registrations and systems behind one name so a
//! feature can be added to a [`World`] in a single call.

use std::any::Any;

use crate::ecs::World;
use crate::error::Result;

/// Current plugin API version
///
/// Plugins must declare compatibility with this version. Incompatible versions
/// are rejected at registration time.
pub const PLUGIN_API_VERSION: &str = "0.1.0";

/// Base trait for all plugins
///
/// # Example
///
/// ```
/// use std::any::Any;
/// use ecs_core::ecs::World;
/// use ecs_core::ecs::components::Position;
/// use ecs_core::plugins::Plugin;
///
/// struct TransformPlugin;
///
/// impl Plugin for TransformPlugin {
///     fn name(&self) -> &str { "transform" }
///     fn version(&self) -> &str { "1.0.0" }
///     fn build(&mut self, world: &mut World) -> ecs_core::Result<()> {
///         world.register_component::<Position>()
///     }
///     fn as_any(&self) -> &dyn Any { self }
///     fn as_any_mut(&mut self) -> &mut dyn Any { self }
/// }
/// ```
pub trait Plugin {
    /// Unique name of this plugin
    fn name(&self) -> &str;

    /// Plugin version (semantic versioning)
    fn version(&self) -> &str;

    /// Plugin API version this plugin was built against
    fn api_version(&self) -> &str {
        PLUGIN_API_VERSION
    }

    /// Names of plugins that must be built before this one
    fn dependencies(&self) -> Vec<&str> {
        Vec::new()
    }

    /// Register components and systems with the world
    ///
    /// Called exactly once, after every dependency has been built.
    fn build(&mut self, world: &mut World) -> Result<()>;

    /// Release anything the plugin holds
    ///
    /// Called in reverse build order.
    fn shutdown(&mut self, _world: &mut World) -> Result<()> {
        Ok(())
    }

    /// Downcast to a concrete plugin type
    fn as_any(&self) -> &dyn Any;

    /// Downcast to a mutable concrete plugin type
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Minimal;

    impl Plugin for Minimal {
        fn name(&self) -> &str {
            "minimal"
        }

        fn version(&self) -> &str {
            "0.0.1"
        }

        fn build(&mut self, _world: &mut World) -> Result<()> {
            Ok(())
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn test_defaults() {
        let mut plugin = Minimal;
        assert_eq!(plugin.api_version(), PLUGIN_API_VERSION);
        assert!(plugin.dependencies().is_empty());
        assert!(plugin.shutdown(&mut World::new()).is_ok());
        assert!(plugin.as_any().is::<Minimal>());
    }
}
