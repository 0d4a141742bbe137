// Copyright (c) 2025-2026 the ssapre authors

//! Block dominator trees.

use crate::{
    analysis::PredecessorTable,
    ir::{prelude::*, ValueData},
    table::TableKey,
};
use hibitset::BitSet;
use std::collections::{HashMap, HashSet};

/// A block dominator tree.
///
/// Records for every block which other blocks in the CFG *have* to be
/// traversed to reach it. And vice versa, which blocks a block precedes in
/// all cases.
#[derive(Debug, Clone)]
pub struct DominatorTree {
    /// Map from a block to the blocks it dominates.
    dominates: HashMap<Block, HashSet<Block>>,
    /// Map from a block to the blocks that dominate it.
    dominated: HashMap<Block, HashSet<Block>>,
    /// Vector of immediate dominators.
    doms: Vec<Block>,
    /// Dominator tree children of each block, ordered by block id.
    children: HashMap<Block, Vec<Block>>,
    /// Blocks in post-order.
    post_order: Vec<Block>,
    /// Post-order index for each block.
    inv_post_order: Vec<u32>,
}

impl DominatorTree {
    /// Compute the dominator tree of a function.
    ///
    /// This implementation is based on [1].
    ///
    /// [1]: https://www.cs.rice.edu/~keith/Embed/dom.pdf "Cooper, Keith D., Timothy J. Harvey, and Ken Kennedy. 'A simple, fast dominance algorithm.' Software Practice & Experience 4.1-10 (2001): 1-8."
    pub fn new(func: &Function, pred: &PredecessorTable) -> Self {
        let post_order = Self::compute_blocks_post_order(func, pred);
        let length = post_order.len();
        trace!("[DomTree] post-order {:?}", post_order);

        let undef = std::u32::MAX;
        let mut doms = vec![undef; length];
        let mut inv_post_order = vec![undef; func.cfg.block_id_bound()];
        for (i, &bb) in post_order.iter().enumerate() {
            inv_post_order[bb.index()] = i as u32;
        }

        for root in Some(func.layout.entry())
            .into_iter()
            .chain(func.layout.blocks().filter(|&id| pred.pred_set(id).is_empty()))
        {
            let poidx = inv_post_order[root.index()];
            doms[poidx as usize] = poidx; // root nodes
        }

        let mut changed = true;
        while changed {
            changed = false;

            for idx in (0..length).rev() {
                if doms[idx] == idx as u32 {
                    continue; // skip root nodes
                }
                let bb = post_order[idx];

                let mut preds = pred
                    .pred_set(bb)
                    .iter()
                    .map(|id| inv_post_order[id.index()])
                    .filter(|&p| doms[p as usize] != undef);
                let new_idom = preds.next().unwrap();
                let new_idom = preds.fold(new_idom, |mut i1, mut i2| {
                    let i1_init = i1;
                    while i1 != i2 {
                        if i1 < i2 {
                            if i1 == doms[i1 as usize] {
                                return i1;
                            }
                            i1 = doms[i1 as usize];
                        } else if i2 < i1 {
                            if i2 == doms[i2 as usize] {
                                return i1_init;
                            }
                            i2 = doms[i2 as usize];
                        }
                    }
                    i1
                });
                debug_assert!(new_idom < length as u32);
                if doms[idx] != new_idom {
                    doms[idx] = new_idom;
                    changed = true;
                }
            }
        }
        trace!("[DomTree] converged {:?}", doms);

        let mut doms_final = vec![Block::invalid(); func.cfg.block_id_bound()];
        for bb in &post_order {
            doms_final[bb.index()] = post_order[doms[inv_post_order[bb.index()] as usize] as usize];
        }

        // Compute the set of dominators of each block.
        let mut dominated = HashMap::new();
        for &block in &post_order {
            let mut s = HashSet::new();
            let mut bb = block;
            loop {
                s.insert(bb);
                let next = doms_final[bb.index()];
                if next == bb {
                    break;
                }
                bb = next;
            }
            dominated.insert(block, s);
        }

        // Invert the tree.
        let mut dominates: HashMap<Block, HashSet<Block>> =
            post_order.iter().map(|&bb| (bb, HashSet::new())).collect();
        for (&bb, dom) in &dominated {
            for d in dom {
                dominates.get_mut(d).unwrap().insert(bb);
            }
        }

        // Gather the children of each node in the dominator tree.
        let mut children: HashMap<Block, Vec<Block>> =
            post_order.iter().map(|&bb| (bb, vec![])).collect();
        for &bb in &post_order {
            let idom = doms_final[bb.index()];
            if idom != bb {
                children.get_mut(&idom).unwrap().push(bb);
            }
        }
        for c in children.values_mut() {
            c.sort();
        }

        Self {
            dominates,
            dominated,
            doms: doms_final,
            children,
            post_order,
            inv_post_order,
        }
    }

    fn compute_blocks_post_order(func: &Function, pred: &PredecessorTable) -> Vec<Block> {
        let mut order = Vec::with_capacity(pred.all_pred_sets().len());

        let mut stack = Vec::with_capacity(8);
        let mut discovered = BitSet::with_capacity(func.cfg.block_id_bound() as u32);
        let mut finished = BitSet::with_capacity(func.cfg.block_id_bound() as u32);

        stack.push(func.layout.entry());
        stack.extend(func.layout.blocks().filter(|&id| pred.pred_set(id).is_empty()));

        while let Some(&next) = stack.last() {
            if !discovered.add(next.index() as u32) {
                for &succ in pred.succ_set(next) {
                    if !discovered.contains(succ.index() as u32) {
                        stack.push(succ);
                    }
                }
            } else {
                stack.pop();
                if !finished.add(next.index() as u32) {
                    order.push(next);
                }
            }
        }

        order
    }

    /// Get the blocks in the original CFG in post-order.
    pub fn blocks_post_order(&self) -> &[Block] {
        &self.post_order
    }

    /// Get the blocks in the original CFG in reverse post-order.
    pub fn blocks_rev_post_order(&self) -> Vec<Block> {
        self.post_order.iter().cloned().rev().collect()
    }

    /// Get the post-order index of a block.
    pub fn block_order(&self, block: Block) -> usize {
        self.inv_post_order[block.index()] as usize
    }

    /// Check if a block is reachable from the entry.
    pub fn is_reachable(&self, block: Block) -> bool {
        block.index() < self.inv_post_order.len()
            && self.inv_post_order[block.index()] != std::u32::MAX
    }

    /// Check if a block dominates another.
    pub fn dominates(&self, dominator: Block, follower: Block) -> bool {
        self.dominates
            .get(&dominator)
            .map(|d| d.contains(&follower))
            .unwrap_or(false)
    }

    /// Get the immediate dominator of a block.
    pub fn dominator(&self, block: Block) -> Block {
        self.doms[block.index()]
    }

    /// Get the dominators of a block.
    pub fn dominators(&self, follower: Block) -> &HashSet<Block> {
        &self.dominated[&follower]
    }

    /// Get the followers of a block, i.e. the blocks it dominates.
    pub fn dominated_by(&self, dominator: Block) -> &HashSet<Block> {
        &self.dominates[&dominator]
    }

    /// Get the children of a block in the dominator tree, ordered by block id.
    pub fn children(&self, block: Block) -> &[Block] {
        &self.children[&block]
    }

    /// Check if a block dominates another block.
    pub fn block_dominates_block(&self, parent: Block, mut child: Block) -> bool {
        while parent != child {
            let next = self.dominator(child);
            if next == child {
                // Arrived at the root of the tree without encountering the
                // suspected parent.
                return false;
            }
            child = next;
        }
        true
    }

    /// Check if an instruction dominates a block.
    pub fn inst_dominates_block(&self, func: &Function, inst: Inst, block: Block) -> bool {
        match func.layout.inst_block(inst) {
            Some(bb) => self.block_dominates_block(bb, block),
            None => false,
        }
    }

    /// Check if a value definition dominates a block.
    pub fn value_dominates_block(&self, func: &Function, value: Value, block: Block) -> bool {
        match func.dfg[value] {
            ValueData::Inst { inst, .. } => self.inst_dominates_block(func, inst, block),
            ValueData::Arg { .. } => true,
            _ => false,
        }
    }

    /// Check if a block dominates an instruction.
    ///
    /// A block *does not* dominate instructions within itself.
    pub fn block_dominates_inst(&self, func: &Function, parent: Block, child: Inst) -> bool {
        match func.layout.inst_block(child) {
            Some(bb) => self.block_dominates_block(parent, bb),
            None => false,
        }
    }

    /// Check if an instruction dominates another instruction.
    pub fn inst_dominates_inst(&self, func: &Function, parent: Inst, child: Inst) -> bool {
        // Instructions dominate themselves.
        if parent == child {
            return true;
        }

        // Get the blocks where the instructions reside in, or return false if
        // any is not inserted.
        let parent_bb = func.layout.inst_block(parent);
        let child_bb = func.layout.inst_block(child);
        let (parent_bb, child_bb) = match (parent_bb, child_bb) {
            (Some(a), Some(b)) => (a, b),
            _ => return false,
        };

        // Handle the special case of a phi child instruction: a value used by
        // a phi only needs to dominate the end of the corresponding
        // predecessor.
        let data = &func.dfg[child];
        if let (Opcode::Phi, Some(parent_result)) =
            (data.opcode(), func.dfg.get_inst_result(parent))
        {
            for (&v, &bb) in data.args().iter().zip(data.blocks().iter()) {
                if v == parent_result {
                    return parent_bb == bb || self.inst_dominates_block(func, parent, bb);
                }
            }
        }

        // Handle the special case where both instructions are in the same
        // block.
        if parent_bb == child_bb {
            // Step backwards from both instructions towards the head of the
            // block. Whichever hits the head, or is found by the other, first
            // decides the answer.
            let mut pi = parent;
            let mut ci = child;
            loop {
                if let Some(pci) = func.layout.prev_inst(ci) {
                    if pci == parent {
                        return true;
                    }
                    ci = pci;
                } else {
                    return false;
                }
                if let Some(ppi) = func.layout.prev_inst(pi) {
                    if ppi == child {
                        return false;
                    }
                    pi = ppi;
                } else {
                    return true;
                }
            }
        }

        self.block_dominates_block(parent_bb, child_bb)
    }

    /// Check if a value definition dominates an instruction.
    pub fn value_dominates_inst(&self, func: &Function, parent: Value, child: Inst) -> bool {
        match func.dfg[parent] {
            ValueData::Inst { inst, .. } => self.inst_dominates_inst(func, inst, child),
            ValueData::Arg { .. } => true,
            _ => false,
        }
    }
}
