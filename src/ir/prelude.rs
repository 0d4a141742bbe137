// Copyright (c) 2025-2026 the ssapre authors

//! Re-exports of commonly used IR items.

pub use crate::ir::{
    Arg, Block, ControlFlowGraph, DataFlowGraph, ExtUnit, Func, Function, FunctionBuilder,
    FunctionLayout, Inst, InstBuilder, InstData, Module, Opcode, Signature, Value, ValueData,
};
