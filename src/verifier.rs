// Copyright (c) 2025-2026 the ssapre authors

//! Verification of IR integrity.
//!
//! This module implements verification of the intermediate representation. It
//! checks that functions are well-formed: basic blocks have terminators, phi
//! nodes line up with control flow, and every use is dominated by its
//! definition.

use crate::{
    analysis::{DominatorTree, PredecessorTable},
    ir::prelude::*,
};

/// An IR verifier.
///
/// The `Verifier` acts as a context to call the various IR checking functions
/// on. It keeps track of errors.
#[derive(Default)]
pub struct Verifier {
    errors: VerifierErrors,
    unit: Option<String>,
}

impl Verifier {
    /// Create a new verifier.
    pub fn new() -> Self {
        Default::default()
    }

    /// Verify the integrity of a `Function`.
    pub fn verify_function(&mut self, func: &Function) {
        self.unit = Some(format!("func @{}", func.name));
        self.verify_layout(func);
        if self.errors.0.is_empty() && func.layout.first_block().is_some() {
            self.verify_ssa(func);
        }
        self.unit = None;
    }

    /// Verify the integrity of a `Module`.
    pub fn verify_module(&mut self, module: &Module) {
        for func in module.functions().collect::<Vec<_>>() {
            self.verify_function(&module[func]);
        }
    }

    /// Verify the block and instruction layout.
    fn verify_layout(&mut self, func: &Function) {
        if func.layout.first_block().is_none() {
            self.push(None, format!("layout has no entry block"));
        }
        for bb in func.layout.blocks() {
            if func.layout.first_inst(bb).is_none() {
                self.push(Some(format!("{}", bb)), format!("block is empty"));
                continue;
            }
            for inst in func.layout.insts(bb) {
                let opcode = func.dfg[inst].opcode();
                let last = Some(inst) == func.layout.last_inst(bb);
                if opcode.is_terminator() && !last {
                    self.push(
                        Some(format!("{}", inst)),
                        format!(
                            "terminator `{}` must be at the end of {}",
                            inst.dump(func),
                            bb
                        ),
                    );
                }
                if last && !opcode.is_terminator() {
                    self.push(
                        Some(format!("{}", bb)),
                        format!("last instruction `{}` must be a terminator", inst.dump(func)),
                    );
                }
            }
        }
    }

    /// Verify the SSA properties: phi arity matches control flow and every use
    /// is dominated by its definition.
    fn verify_ssa(&mut self, func: &Function) {
        let pt = PredecessorTable::new(func);
        let dt = DominatorTree::new(func, &pt);

        for bb in func.layout.blocks() {
            for inst in func.layout.insts(bb) {
                let data = &func.dfg[inst];
                if data.opcode().is_phi() {
                    let preds = pt.pred_set(bb);
                    if preds.len() != data.blocks().len() {
                        self.push(
                            Some(format!("{}", inst)),
                            format!(
                                "phi `{}` has {} incoming values but {} has {} predecessors",
                                inst.dump(func),
                                data.blocks().len(),
                                bb,
                                preds.len()
                            ),
                        );
                        continue;
                    }
                    for &in_bb in data.blocks() {
                        if !preds.contains(&in_bb) {
                            self.push(
                                Some(format!("{}", inst)),
                                format!(
                                    "phi `{}` names {} which is not a predecessor of {}",
                                    inst.dump(func),
                                    in_bb,
                                    bb
                                ),
                            );
                        }
                    }
                }
                for &arg in data.args() {
                    if func.dfg.is_placeholder(arg) {
                        self.push(
                            Some(format!("{}", inst)),
                            format!("instruction `{}` uses a placeholder", inst.dump(func)),
                        );
                        continue;
                    }
                    if !dt.value_dominates_inst(func, arg, inst) {
                        self.push(
                            Some(format!("{}", inst)),
                            format!(
                                "use of {} in `{}` is not dominated by its definition",
                                arg.dump(func),
                                inst.dump(func)
                            ),
                        );
                    }
                }
            }
        }
    }

    fn push(&mut self, object: Option<String>, message: String) {
        self.errors.0.push(VerifierError {
            unit: self.unit.clone(),
            object,
            message,
        });
    }

    /// Finish the verification.
    ///
    /// This returns `Err` with the list of accumulated errors if any of the
    /// checks failed, or `Ok` otherwise.
    pub fn finish(self) -> Result<(), VerifierErrors> {
        if self.errors.0.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// A verification error.
#[derive(Debug)]
pub struct VerifierError {
    /// The unit within which the error occurred.
    pub unit: Option<String>,
    /// The object which caused the error.
    pub object: Option<String>,
    /// The error message.
    pub message: String,
}

impl std::fmt::Display for VerifierError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if let Some(ref unit) = self.unit {
            write!(f, "{}: ", unit)?;
        }
        if let Some(ref object) = self.object {
            write!(f, "{}: ", object)?;
        }
        write!(f, "{}", self.message)
    }
}

/// A list of verification errors.
#[derive(Debug, Default)]
pub struct VerifierErrors(pub Vec<VerifierError>);

impl std::fmt::Display for VerifierErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for err in &self.0 {
            writeln!(f, "- {}", err)?;
        }
        Ok(())
    }
}
