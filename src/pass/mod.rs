// Copyright (c) 2025-2026 the ssapre authors

//! Optimization and analysis passes on the IR.
//!
//! This module implements various passes that analyze or mutate the
//! intermediate representation.

pub mod const_folding;
pub mod dce;
pub mod pre;
pub mod simplify;

pub use const_folding::ConstFolding;
pub use dce::DeadCodeElim;
pub use pre::PartialRedundancyElim;
pub use simplify::InstSimplification;
