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
//! Plugin system
//!
//! Plugins package component registrations and systems so features can be
//! composed into a [`World`](crate::ecs::World) without touching the core.
//!
//! # Features
//!
//! - **Dependency Management**: plugins are built after the plugins they name,
//!   with circular dependency detection
//! - **Version Checking**: API version compatibility is validated with `semver`
//!   at registration
//!
//! # Lifecycle
//!
//! 1. **Registration**: [`PluginRegistry::register`] (or [`register_plugin!`](crate::register_plugin))
//! 2. **Build**: [`PluginRegistry::build_all`] calls [`Plugin::build`] once per
//!    plugin in dependency order
//! 3. **Shutdown**: [`PluginRegistry::shutdown_all`] in reverse order

pub mod api;
pub mod registry;

pub use api::{Plugin, PLUGIN_API_VERSION};
pub use registry::{is_version_compatible, PluginRegistry};
