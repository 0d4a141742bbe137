// Copyright (c) 2025-2026 the ssapre authors

//! Constant Folding
//!
//! This module implements constant folding. It replaces instructions with
//! constant arguments with the corresponding result.

use crate::ir::prelude::*;
use crate::opt::prelude::*;
use crate::value::IntValue;

/// Constant Folding
///
/// This pass replaces instructions all of whose arguments are constants with
/// the folded constant, and conditional branches on constants with direct
/// jumps.
pub struct ConstFolding;

impl Pass for ConstFolding {
    fn run_on_function(ctx: &PassContext, unit: &mut FunctionBuilder) -> bool {
        info!("ConstFolding [{}]", unit.func.name);
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

    fn run_on_inst(_ctx: &PassContext, inst: Inst, unit: &mut FunctionBuilder) -> bool {
        unit.insert_after(inst);

        // Fold branches.
        if let InstData::Branch {
            opcode: Opcode::BrCond,
            args,
            bbs,
        } = unit.dfg()[inst]
        {
            return fold_branch(unit, inst, args[0], bbs).unwrap_or(false);
        }

        // Don't bother folding instructions which don't yield a result.
        if !unit.dfg().has_result(inst) {
            return false;
        }

        // Fold all other instructions.
        let value = unit.dfg().inst_result(inst);
        let replacement = match unit.dfg()[inst] {
            InstData::Unary { opcode, args, .. } => {
                let imm = constant_arg(unit, args[0]);
                imm.and_then(|imm| fold_unary(opcode, &imm))
                    .map(|folded| unit.ins().const_int(folded))
            }
            InstData::Binary { opcode, args, .. } => {
                let imms = (constant_arg(unit, args[0]), constant_arg(unit, args[1]));
                if let (Some(imm0), Some(imm1)) = imms {
                    fold_binary(opcode, &imm0, &imm1).map(|folded| unit.ins().const_int(folded))
                } else {
                    None
                }
            }
            InstData::Ternary {
                opcode: Opcode::Sel,
                args,
                ..
            } => constant_arg(unit, args[0]).map(|cond| args[if cond.is_zero() { 2 } else { 1 }]),
            _ => None,
        };

        if let Some(replacement) = replacement {
            debug!(
                "Replace {} with {}",
                inst.dump(unit.func),
                replacement.dump(unit.func)
            );
            let dfg = unit.dfg_mut();
            if let Some(name) = dfg.get_name(value).map(String::from) {
                dfg.set_name(replacement, name);
                dfg.clear_name(value);
            }
            dfg.replace_use(value, replacement);
            unit.prune_if_unused(inst);
            true
        } else {
            false
        }
    }
}

/// Resolve an argument to a constant, if it is one.
fn constant_arg(unit: &FunctionBuilder, arg: Value) -> Option<IntValue> {
    unit.dfg().get_const_int(arg).cloned()
}

/// Fold a unary instruction on constants.
pub fn fold_unary(opcode: Opcode, arg: &IntValue) -> Option<IntValue> {
    match opcode {
        Opcode::Not => Some(arg.not()),
        Opcode::Neg => Some(arg.neg()),
        _ => None,
    }
}

/// Fold a binary instruction on constants.
pub fn fold_binary(opcode: Opcode, imm0: &IntValue, imm1: &IntValue) -> Option<IntValue> {
    let flag = |b: bool| IntValue::from_usize(1, b as usize);
    Some(match opcode {
        Opcode::Add => imm0.add(imm1),
        Opcode::Sub => imm0.sub(imm1),
        Opcode::Mul => imm0.mul(imm1),
        Opcode::Sdiv if !imm1.is_zero() => imm0.sdiv(imm1),
        Opcode::Udiv if !imm1.is_zero() => imm0.udiv(imm1),
        Opcode::Srem if !imm1.is_zero() => imm0.srem(imm1),
        Opcode::Urem if !imm1.is_zero() => imm0.urem(imm1),
        Opcode::And => imm0.and(imm1),
        Opcode::Or => imm0.or(imm1),
        Opcode::Xor => imm0.xor(imm1),
        Opcode::Shl => imm0.shl(imm1),
        Opcode::Shr => imm0.shr(imm1),
        Opcode::Eq => flag(imm0.eq(imm1)),
        Opcode::Neq => flag(imm0.neq(imm1)),
        Opcode::Slt => flag(imm0.slt(imm1)),
        Opcode::Sgt => flag(imm0.sgt(imm1)),
        Opcode::Sle => flag(imm0.sle(imm1)),
        Opcode::Sge => flag(imm0.sge(imm1)),
        Opcode::Ult => flag(imm0.ult(imm1)),
        Opcode::Ugt => flag(imm0.ugt(imm1)),
        Opcode::Ule => flag(imm0.ule(imm1)),
        Opcode::Uge => flag(imm0.uge(imm1)),
        _ => return None,
    })
}

/// Fold a branch instruction.
fn fold_branch(
    unit: &mut FunctionBuilder,
    inst: Inst,
    arg: Value,
    bbs: [Block; 2],
) -> Option<bool> {
    let imm = unit.dfg().get_const_int(arg)?.clone();
    let bb = bbs[!imm.is_zero() as usize];
    debug!("Fold {} to br {}", inst.dump(unit.func), bb.dump(unit.func));
    unit.insert_before(inst);
    unit.ins().br(bb);
    unit.remove_inst(inst);
    let arg_inst = unit.dfg().get_value_inst(arg);
    if let Some(arg_inst) = arg_inst {
        unit.prune_if_unused(arg_inst);
    }
    Some(true)
}
