// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod dog;
pub mod point;
pub mod walk;

pub use dog::Dog;
pub use point::{LocationFix, WalkPoint};
pub use walk::{Walk, WalkTotals};
