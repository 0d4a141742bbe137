// Copyright (c) 2025-2026 the ssapre authors

//! SSA partial redundancy elimination.
//!
//! This library provides a compact SSA intermediate representation together
//! with the analyses and transformation passes needed to perform partial
//! redundancy elimination on it. The centerpiece is the `pass::pre` module,
//! which implements the Chow/Kennedy/Lo SSA-PRE algorithm organized around
//! expression-level Φ placeholders.

#[macro_use]
extern crate log;

pub mod analysis;
pub mod ir;
pub mod opt;
pub mod pass;
pub mod table;
mod ty;
mod value;
pub mod verifier;

pub use crate::{ty::*, value::*};
