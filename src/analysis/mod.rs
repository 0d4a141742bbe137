// Copyright (c) 2025-2026 the ssapre authors

//! Analysis passes on the IR.
//!
//! This module implements various read-only analyses on the IR.

mod domtree;
mod idf;
mod preds;

pub use self::domtree::*;
pub use self::idf::*;
pub use self::preds::*;
