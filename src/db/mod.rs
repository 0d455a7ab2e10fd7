// SPDX-License-Identifier: MIT

//! Database layer (in-memory tables).

pub mod memory;

pub use memory::MemoryDb;
