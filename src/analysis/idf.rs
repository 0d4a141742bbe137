// Copyright (c) 2025-2026 the ssapre authors

//! Dominance frontiers and their iteration.

use crate::{
    analysis::{DominatorTree, PredecessorTable},
    ir::prelude::*,
};
use std::collections::{HashMap, HashSet};

/// The dominance frontiers of a function's blocks.
///
/// The dominance frontier of a block `B` is the set of blocks where `B`'s
/// dominance ends: blocks with a predecessor dominated by `B` (or equal to
/// `B`) which are not themselves strictly dominated by `B`.
#[derive(Debug, Clone)]
pub struct DominanceFrontier {
    frontiers: HashMap<Block, HashSet<Block>>,
}

impl DominanceFrontier {
    /// Compute the dominance frontiers of a function.
    pub fn new(dt: &DominatorTree, pt: &PredecessorTable) -> Self {
        let mut frontiers: HashMap<Block, HashSet<Block>> = HashMap::new();

        // A join block is in the frontier of every block on the dominator
        // chain from each of its predecessors up to, but excluding, its
        // immediate dominator.
        for &bb in dt.blocks_post_order() {
            let preds = pt.pred_set(bb);
            if preds.len() < 2 {
                continue;
            }
            let idom = dt.dominator(bb);
            for &pred in preds {
                if !dt.is_reachable(pred) {
                    continue;
                }
                let mut runner = pred;
                while runner != idom {
                    frontiers.entry(runner).or_default().insert(bb);
                    let next = dt.dominator(runner);
                    if next == runner {
                        break;
                    }
                    runner = next;
                }
            }
        }

        Self { frontiers }
    }

    /// Get the dominance frontier of a block.
    pub fn frontier(&self, bb: Block) -> Option<&HashSet<Block>> {
        self.frontiers.get(&bb)
    }

    /// Compute the forward iterated dominance frontier of a set of defining
    /// blocks.
    ///
    /// This is the transitive closure of the dominance frontier over the
    /// defining blocks, the placement set for merge points of a value defined
    /// in those blocks.
    pub fn iterated(&self, defs: impl IntoIterator<Item = Block>) -> Vec<Block> {
        let mut idf = HashSet::new();
        let mut worklist: Vec<Block> = defs.into_iter().collect();
        while let Some(bb) = worklist.pop() {
            if let Some(frontier) = self.frontier(bb) {
                for &fb in frontier {
                    if idf.insert(fb) {
                        worklist.push(fb);
                    }
                }
            }
        }
        let mut idf: Vec<_> = idf.into_iter().collect();
        idf.sort();
        idf
    }
}
