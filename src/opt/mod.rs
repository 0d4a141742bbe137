// Copyright (c) 2025-2026 the ssapre authors

//! Optimization infrastructure.
//!
//! This module implements infrastructure used by the optimization system which
//! operates on the IR.

mod pass;

pub use pass::*;

pub mod prelude {
    pub use super::pass::*;
}
