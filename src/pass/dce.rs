// Copyright (c) 2025-2026 the ssapre authors

//! Dead Code Elimination
//!
//! This pass implements dead code elimination. It removes instructions whose
//! value is never used and blocks which cannot be reached.

use crate::ir::prelude::*;
use crate::opt::prelude::*;
use std::collections::HashSet;

/// Dead Code Elimination
pub struct DeadCodeElim;

impl Pass for DeadCodeElim {
    fn run_on_function(_ctx: &PassContext, unit: &mut FunctionBuilder) -> bool {
        info!("DCE [{}]", unit.func.name);
        let mut modified = false;

        // Gather the instructions which may be prunable.
        let mut insts = vec![];
        for bb in unit.func.layout.blocks() {
            let term = unit.func.layout.terminator(bb);
            for inst in unit.func.layout.insts(bb) {
                if inst != term && !unit.dfg()[inst].opcode().has_side_effects() {
                    insts.push(inst);
                }
            }
        }

        // Prune unused instructions.
        for inst in insts {
            modified |= unit.prune_if_unused(inst);
        }

        // Prune unreachable blocks.
        modified |= prune_blocks(unit);

        modified
    }
}

/// Eliminate unreachable blocks in a function layout.
fn prune_blocks(unit: &mut FunctionBuilder) -> bool {
    let mut modified = false;

    // Find all blocks reachable from the entry point.
    let first_bb = unit.func.layout.first_block().unwrap();
    let mut unreachable: HashSet<Block> = unit.func.layout.blocks().collect();
    let mut todo: Vec<Block> = Default::default();
    todo.push(first_bb);
    unreachable.remove(&first_bb);
    while let Some(block) = todo.pop() {
        let term_inst = unit.func.layout.terminator(block);
        for &bb in unit.dfg()[term_inst].blocks() {
            if unreachable.remove(&bb) {
                todo.push(bb);
            }
        }
    }

    // Remove all unreachable blocks.
    let mut unreachable: Vec<_> = unreachable.into_iter().collect();
    unreachable.sort();
    for bb in unreachable {
        debug!("Prune unreachable block {}", bb.dump(unit.func));
        modified |= true;
        unit.remove_block(bb);
    }

    modified
}
