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
//! 2D transform components
//!
//! Small plain-data components used by [`MovementSystem`](crate::ecs::systems::MovementSystem),
//! the examples and the benchmarks. Games define their own components the same
//! way: a `Copy` struct plus an empty `impl Component`.

use crate::ecs::Component;

/// 2D position in world units
///
/// # Examples
///
/// ```
/// use ecs_core::ecs::components::Position;
///
/// let pos = Position::new(1.0, 2.0);
/// assert_eq!(pos.x, 1.0);
/// assert!(pos.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    /// Horizontal coordinate
    pub x: f32,
    /// Vertical coordinate
    pub y: f32,
}

impl Position {
    /// Create a new position
    pub fn new(x: f32, y: f32) -> Self {
        Position { x, y }
    }

    /// The origin
    pub fn zero() -> Self {
        Position::new(0.0, 0.0)
    }

    /// Check if both coordinates are finite
    pub fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Move by `velocity` for `dt` seconds
    pub fn advance(&mut self, velocity: &Velocity, dt: f32) {
        self.x += velocity.dx * dt;
        self.y += velocity.dy * dt;
    }
}

impl Component for Position {}

/// 2D velocity in world units per second
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Velocity {
    /// Horizontal rate of change
    pub dx: f32,
    /// Vertical rate of change
    pub dy: f32,
}

impl Velocity {
    /// Create a new velocity
    pub fn new(dx: f32, dy: f32) -> Self {
        Velocity { dx, dy }
    }

    /// At rest
    pub fn zero() -> Self {
        Velocity::new(0.0, 0.0)
    }

    /// Magnitude of the velocity
    pub fn speed(&self) -> f32 {
        (self.dx * self.dx + self.dy * self.dy).sqrt()
    }

    /// Check if both components are finite
    pub fn is_valid(&self) -> bool {
        self.dx.is_finite() && self.dy.is_finite()
    }
}

impl Component for Velocity {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position() {
        let mut pos = Position::new(1.0, 2.0);
        assert!(pos.is_valid());
        pos.x = f32::NAN;
        assert!(!pos.is_valid());
        assert_eq!(Position::default(), Position::zero());
    }

    #[test]
    fn test_advance() {
        let mut pos = Position::new(1.0, 1.0);
        pos.advance(&Velocity::new(2.0, -1.0), 0.5);
        assert_eq!(pos, Position::new(2.0, 0.5));
    }

    #[test]
    fn test_velocity_speed() {
        assert_eq!(Velocity::new(3.0, 4.0).speed(), 5.0);
        assert!(Velocity::zero().is_valid());
        assert!(!Velocity::new(f32::INFINITY, 0.0).is_valid());
    }

    #[test]
    fn test_component_names() {
        assert!(Position::type_name().ends_with("Position"));
        assert!(Velocity::type_name().ends_with("Velocity"));
    }
}
