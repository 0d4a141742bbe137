// Copyright (c) 2025-2026 the ssapre authors

use crate::ir::prelude::*;
use rayon::prelude::*;

/// An optimization pass.
///
/// The optimization infrastructure will always call `run_on_module()`.
/// However, implementors of the trait should override the function at their
/// desired level of granularity. The `Pass` trait provides a sane default for
/// all `run_*()` functions.
pub trait Pass {
    /// Run this pass on an entire module.
    fn run_on_module(ctx: &PassContext, module: &mut Module) -> bool {
        module
            .par_functions_mut()
            .map(|func| Self::run_on_function(ctx, &mut FunctionBuilder::new(func)))
            .reduce(|| false, |a, b| a || b)
    }

    /// Run this pass on an entire function.
    fn run_on_function(ctx: &PassContext, unit: &mut FunctionBuilder) -> bool {
        let mut modified = false;
        let mut insts = vec![];
        for bb in unit.func.layout.blocks() {
            for inst in unit.func.layout.insts(bb) {
                insts.push(inst);
            }
        }
        for inst in insts {
            modified |= Self::run_on_inst(ctx, inst, unit);
        }
        modified
    }

    /// Run this pass on an instruction.
    #[allow(unused_variables)]
    fn run_on_inst(ctx: &PassContext, inst: Inst, unit: &mut FunctionBuilder) -> bool {
        false
    }
}

/// Additional context and configuration for optimizations.
pub struct PassContext;
