//! Shared helpers for the integration tests: function construction, IR
//! verification, and a small reference interpreter used for differential
//! testing of the transformation passes.

#![allow(dead_code)]

use ssapre::ir::prelude::*;
use ssapre::ir::InstData;
use ssapre::verifier::Verifier;
use ssapre::{IntValue, Type};
use std::collections::HashMap;

/// Build a function `@name` with the given argument types and return type,
/// populated by a callback receiving the builder and the argument values.
pub fn build_func(
    name: &str,
    args: &[Type],
    ret: Type,
    build: impl FnOnce(&mut FunctionBuilder, &[Value]),
) -> Function {
    let mut sig = Signature::new();
    for ty in args {
        sig.add_input(ty.clone());
    }
    sig.set_return_type(ret);
    let mut func = Function::new(name, sig);
    let arg_values: Vec<Value> = func.args().collect();
    let mut builder = FunctionBuilder::new(&mut func);
    build(&mut builder, &arg_values);
    func
}

/// Panic with a dump of the function if it fails verification.
pub fn verify(func: &Function) {
    let mut verifier = Verifier::new();
    verifier.verify_function(func);
    if let Err(errs) = verifier.finish() {
        panic!("verification failed:\n{}\nfor function:\n{}", errs, func);
    }
}

/// Count the instructions with the given opcode.
pub fn count_opcode(func: &Function, opcode: Opcode) -> usize {
    func.blocks()
        .flat_map(|bb| func.insts(bb))
        .filter(|&inst| func.dfg[inst].opcode() == opcode)
        .count()
}

/// The outcome of interpreting a function: the returned value and how many
/// instructions of each opcode were executed.
pub struct Execution {
    pub result: Option<IntValue>,
    pub counts: HashMap<Opcode, usize>,
}

impl Execution {
    pub fn executed(&self, opcode: Opcode) -> usize {
        self.counts.get(&opcode).cloned().unwrap_or(0)
    }
}

/// Interpret a function over concrete argument values.
///
/// Supports the scalar integer subset plus `var`/`ld`/`st`. Panics on calls
/// and on runaway execution.
pub fn interpret(func: &Function, args: &[IntValue]) -> Execution {
    let mut values: HashMap<Value, IntValue> = HashMap::new();
    let mut memory: HashMap<Value, IntValue> = HashMap::new();
    let mut counts: HashMap<Opcode, usize> = HashMap::new();

    for (value, imm) in func.args().zip(args.iter()) {
        values.insert(value, imm.clone());
    }

    let mut block = func.entry();
    let mut prev: Option<Block> = None;
    let mut steps = 0usize;

    loop {
        // Evaluate all phis of the block against the state at the end of the
        // predecessor, then commit them at once.
        let mut phi_updates = vec![];
        for inst in func.insts(block) {
            if let InstData::Phi { args, bbs, .. } = &func.dfg[inst] {
                let prev = prev.expect("phi in entry block");
                let index = bbs
                    .iter()
                    .position(|&bb| bb == prev)
                    .expect("phi misses an incoming block");
                let imm = values[&args[index]].clone();
                phi_updates.push((func.dfg.inst_result(inst), imm));
                *counts.entry(Opcode::Phi).or_insert(0) += 1;
            }
        }
        for (value, imm) in phi_updates {
            values.insert(value, imm);
        }

        let mut next = None;
        for inst in func.insts(block) {
            steps += 1;
            assert!(steps < 100_000, "interpreter ran away");
            let data = &func.dfg[inst];
            let opcode = data.opcode();
            if opcode.is_phi() {
                continue;
            }
            *counts.entry(opcode).or_insert(0) += 1;
            let arg = |i: usize| values[&data.args()[i]].clone();
            match data {
                InstData::ConstInt { imm, .. } => {
                    values.insert(func.dfg.inst_result(inst), imm.clone());
                }
                InstData::Nullary { .. } => return Execution { result: None, counts },
                InstData::Jump { bbs, .. } => next = Some(bbs[0]),
                InstData::Branch { bbs, .. } => {
                    next = Some(bbs[if arg(0).is_zero() { 0 } else { 1 }]);
                }
                InstData::Call { .. } => panic!("interpreter cannot execute calls"),
                _ => match opcode {
                    Opcode::RetValue => {
                        return Execution {
                            result: Some(arg(0)),
                            counts,
                        };
                    }
                    Opcode::Var => {
                        let ptr = func.dfg.inst_result(inst);
                        memory.insert(ptr, arg(0));
                        values.insert(ptr, IntValue::zero(1));
                    }
                    Opcode::Ld => {
                        let imm = memory[&data.args()[0]].clone();
                        values.insert(func.dfg.inst_result(inst), imm);
                    }
                    Opcode::St => {
                        memory.insert(data.args()[0], arg(1));
                    }
                    Opcode::Sel => {
                        let imm = if arg(0).is_zero() { arg(2) } else { arg(1) };
                        values.insert(func.dfg.inst_result(inst), imm);
                    }
                    Opcode::Not => {
                        let imm = arg(0).not();
                        values.insert(func.dfg.inst_result(inst), imm);
                    }
                    Opcode::Neg => {
                        let imm = arg(0).neg();
                        values.insert(func.dfg.inst_result(inst), imm);
                    }
                    _ => {
                        let (a, b) = (arg(0), arg(1));
                        let flag = |c: bool| IntValue::from_usize(1, c as usize);
                        let imm = match opcode {
                            Opcode::Add => a.add(&b),
                            Opcode::Sub => a.sub(&b),
                            Opcode::Mul => a.mul(&b),
                            Opcode::Sdiv => a.sdiv(&b),
                            Opcode::Udiv => a.udiv(&b),
                            Opcode::Srem => a.srem(&b),
                            Opcode::Urem => a.urem(&b),
                            Opcode::And => a.and(&b),
                            Opcode::Or => a.or(&b),
                            Opcode::Xor => a.xor(&b),
                            Opcode::Shl => a.shl(&b),
                            Opcode::Shr => a.shr(&b),
                            Opcode::Eq => flag(a.eq(&b)),
                            Opcode::Neq => flag(a.neq(&b)),
                            Opcode::Slt => flag(a.slt(&b)),
                            Opcode::Sgt => flag(a.sgt(&b)),
                            Opcode::Sle => flag(a.sle(&b)),
                            Opcode::Sge => flag(a.sge(&b)),
                            Opcode::Ult => flag(a.ult(&b)),
                            Opcode::Ugt => flag(a.ugt(&b)),
                            Opcode::Ule => flag(a.ule(&b)),
                            Opcode::Uge => flag(a.uge(&b)),
                            _ => panic!("interpreter cannot execute {}", opcode),
                        };
                        values.insert(func.dfg.inst_result(inst), imm);
                    }
                },
            }
        }

        prev = Some(block);
        block = next.expect("block fell through without a terminator");
    }
}
