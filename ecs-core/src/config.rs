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
//! World configuration
//!
//! # Environment Configuration
//!
//! [`WorldConfig::from_env`] reads these variables on top of the defaults:
//!
//! ```bash
//! export ECS_CORE_ENTITY_CAPACITY=100000
//! export ECS_CORE_COMPONENT_CAPACITY=4096
//! export ECS_CORE_LOG_SYSTEM_TIMINGS=1
//! ```

use std::str::FromStr;

use tracing::warn;

/// Environment variable overriding [`WorldConfig::entity_capacity`]
pub const ENV_ENTITY_CAPACITY: &str = "ECS_CORE_ENTITY_CAPACITY";
/// Environment variable overriding [`WorldConfig::component_capacity`]
pub const ENV_COMPONENT_CAPACITY: &str = "ECS_CORE_COMPONENT_CAPACITY";
/// Environment variable overriding [`WorldConfig::log_system_timings`]
pub const ENV_LOG_SYSTEM_TIMINGS: &str = "ECS_CORE_LOG_SYSTEM_TIMINGS";

/// Configuration for a [`World`](crate::ecs::World)
#[derive(Debug, Clone, PartialEq)]
pub struct WorldConfig {
    /// Entity slots reserved up front
    pub entity_capacity: usize,
    /// Components reserved in each array when its type is registered
    pub component_capacity: usize,
    /// System slots reserved up front
    pub system_capacity: usize,
    /// Apply deferred destroys after every system instead of once per frame
    pub flush_deferred_per_system: bool,
    /// Emit a trace event with each system's run time
    pub log_system_timings: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            entity_capacity: 1024,
            component_capacity: 256,
            system_capacity: 16,
            flush_deferred_per_system: true,
            log_system_timings: false,
        }
    }
}

impl WorldConfig {
    /// Create a configuration with custom capacities
    pub fn new(entity_capacity: usize, component_capacity: usize) -> Self {
        WorldConfig {
            entity_capacity,
            component_capacity,
            ..Self::default()
        }
    }

    /// Defaults overlaid with the `ECS_CORE_*` environment variables
    ///
    /// Unparseable values are ignored with a warning.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Enable per-system timing events
    pub fn with_system_timings(mut self) -> Self {
        self.log_system_timings = true;
        self
    }

    /// Apply deferred destroys once at the end of each frame
    pub fn flush_deferred_per_frame(mut self) -> Self {
        self.flush_deferred_per_system = false;
        self
    }

    /// Set the number of system slots reserved up front
    pub fn with_system_capacity(mut self, capacity: usize) -> Self {
        self.system_capacity = capacity;
        self
    }

    fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = parse_var(&lookup, ENV_ENTITY_CAPACITY) {
            self.entity_capacity = value;
        }
        if let Some(value) = parse_var(&lookup, ENV_COMPONENT_CAPACITY) {
            self.component_capacity = value;
        }
        if let Some(raw) = lookup(ENV_LOG_SYSTEM_TIMINGS) {
            match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.log_system_timings = true,
                "0" | "false" | "no" | "off" => self.log_system_timings = false,
                other => warn!(variable = ENV_LOG_SYSTEM_TIMINGS, value = other, "ignoring unrecognised flag"),
            }
        }
        self
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(variable = key, value = %raw, "ignoring unparseable value");
            None
        }
    }
}
