// Copyright (c) 2025-2026 the ssapre authors

//! Instruction Simplification
//!
//! This pass implements various instruction combinations and simplifications.

use crate::ir::prelude::*;
use crate::opt::prelude::*;
use crate::value::IntValue;

/// Instruction Simplification
///
/// This pass rewrites instructions whose result is already available as an
/// existing value or a trivial constant.
pub struct InstSimplification;

impl Pass for InstSimplification {
    fn run_on_inst(_ctx: &PassContext, inst: Inst, unit: &mut FunctionBuilder) -> bool {
        unit.insert_after(inst);
        if !unit.dfg().has_result(inst) {
            return false;
        }
        let value = unit.dfg().inst_result(inst);

        // Simplifications yielding an existing value.
        if let Some(existing) = simplified_operand(unit.dfg(), &unit.dfg()[inst]) {
            return replace(inst, value, existing, unit);
        }

        // Simplifications yielding a fresh constant.
        // xor %a, %a -> 0
        // sub %a, %a -> 0
        // [su]rem %a, %a -> 0
        match unit.dfg()[inst].opcode() {
            Opcode::Xor | Opcode::Sub | Opcode::Srem | Opcode::Urem => {
                let args = unit.dfg()[inst].args();
                if args[0] == args[1] {
                    let width = unit.dfg().value_type(value).unwrap_int();
                    let zero = unit.ins().const_int(IntValue::zero(width));
                    return replace(inst, value, zero, unit);
                }
            }
            _ => (),
        }

        false
    }
}

/// Check whether an instruction trivially reduces to one of its operands or
/// another existing value, and return that value.
///
/// This is the query form of the pass, consulted by the redundancy
/// elimination machinery to recognize expressions whose value is free.
pub fn simplified_operand(dfg: &DataFlowGraph, data: &InstData) -> Option<Value> {
    let args = data.args();
    let konst = |v: Value| dfg.get_const_int(v);
    match data.opcode() {
        // and %a, %a -> %a
        // or %a, %a -> %a
        Opcode::And | Opcode::Or if args[0] == args[1] => Some(args[0]),
        // add %a, 0 -> %a
        // or %a, 0 -> %a
        // xor %a, 0 -> %a
        // shl %a, 0 -> %a
        // shr %a, 0 -> %a
        Opcode::Add | Opcode::Or | Opcode::Xor | Opcode::Shl | Opcode::Shr => {
            if konst(args[1]).map(IntValue::is_zero).unwrap_or(false) {
                Some(args[0])
            } else if data.opcode().is_commutative()
                && konst(args[0]).map(IntValue::is_zero).unwrap_or(false)
            {
                Some(args[1])
            } else {
                None
            }
        }
        // sub %a, 0 -> %a
        Opcode::Sub if konst(args[1]).map(IntValue::is_zero).unwrap_or(false) => Some(args[0]),
        // mul %a, 1 -> %a
        Opcode::Mul => {
            if konst(args[1]).map(IntValue::is_one).unwrap_or(false) {
                Some(args[0])
            } else if konst(args[0]).map(IntValue::is_one).unwrap_or(false) {
                Some(args[1])
            } else {
                None
            }
        }
        // sel %c, %a, %a -> %a
        // sel const, %a, %b -> %a or %b
        Opcode::Sel => {
            if args[1] == args[2] {
                Some(args[1])
            } else if let Some(cond) = konst(args[0]) {
                Some(args[if cond.is_zero() { 2 } else { 1 }])
            } else {
                None
            }
        }
        _ => None,
    }
}

fn replace(from_inst: Inst, from_value: Value, to: Value, unit: &mut FunctionBuilder) -> bool {
    debug!(
        "Replace {} with {}",
        from_inst.dump(unit.func),
        to.dump(unit.func)
    );
    unit.dfg_mut().replace_use(from_value, to) > 0
}
