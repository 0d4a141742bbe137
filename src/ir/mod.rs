// Copyright (c) 2025-2026 the ssapre authors

//! Representation of SSA functions.
//!
//! This module implements the intermediate representation around which the
//! rest of the crate is built: functions made of basic blocks holding
//! instructions in SSA form.

use crate::{impl_table_key, ty::Type};

mod cfg;
mod dfg;
mod function;
mod inst;
mod layout;
mod module;
pub mod prelude;

pub use self::cfg::*;
pub use self::dfg::*;
pub use self::function::*;
pub use self::inst::*;
pub use self::layout::*;
pub use self::module::*;

impl_table_key! {
    /// An instruction.
    struct Inst(u32) as "i";

    /// A value.
    struct Value(u32) as "v";

    /// A basic block.
    struct Block(u32) as "bb";

    /// An argument of a `Function`.
    struct Arg(u32) as "arg";

    /// An external function.
    struct ExtUnit(u32) as "ext";

    /// A function in a `Module`.
    struct Func(u32) as "func";
}

/// Internal table storage for values.
#[derive(Debug)]
pub enum ValueData {
    /// The value is the result of an instruction.
    Inst { ty: Type, inst: Inst },
    /// The value is an argument of the `Function`.
    Arg { ty: Type, arg: Arg },
    /// The value is a placeholder, to be replaced later. Used during phi node
    /// construction.
    Placeholder { ty: Type },
}

impl ValueData {
    /// Check whether this is a placeholder value.
    pub fn is_placeholder(&self) -> bool {
        match self {
            ValueData::Placeholder { .. } => true,
            _ => false,
        }
    }
}

/// Internal table storage for basic blocks.
#[derive(Debug, Default)]
pub struct BlockData {
    /// The name of the block.
    pub name: Option<String>,
}

/// An external function referenced within a `Function`.
#[derive(Debug)]
pub struct ExtUnitData {
    /// The name of the referenced function.
    pub name: String,
    /// The signature of the referenced function.
    pub sig: Signature,
}

/// The position where new instructions will be inserted into a `Function`.
#[derive(Clone, Copy)]
pub(crate) enum InsertPos {
    None,
    Append(Block),
    Prepend(Block),
    After(Inst),
    Before(Inst),
}
