// Copyright (c) 2025-2026 the ssapre authors

//! Partial Redundancy Elimination
//!
//! This pass implements SSA-based partial redundancy elimination. It works on
//! one function at a time, identifies computations that are redundant on some
//! control-flow paths, and hoists or deletes them so that each value is
//! evaluated at most once on every path, without introducing new computations
//! on paths that did not previously contain them.
//!
//! The pass is organized around expression-level phi placeholders called
//! *factors*. It proceeds in six phases:
//!
//! 1. Every instruction is turned into an expression. Structurally identical
//!    expressions share a *proto*; each occurrence keeps its own *versioned*
//!    expression.
//! 2. Factors are placed at the iterated dominance frontier of each proto's
//!    defining blocks, and at the join blocks of phis appearing as operands.
//! 3. A renaming walk assigns SSA-like versions to occurrences and factors,
//!    and seeds the `HasRealUse` and `DownSafe` flags.
//! 4. A backward fixed-point clears `DownSafe` on factors whose value is not
//!    anticipated on every path to the exit.
//! 5. The `CanBeAvail`/`Later` fixed-points decide for each factor whether a
//!    single evaluation can be made available (`WillBeAvail`).
//! 6. A finalization sweep classifies occurrences as save, reload, or delete
//!    and schedules insertions; code motion then rewrites the IR, turning the
//!    factors that are actually demanded into real phi nodes.

use crate::{
    analysis::{DominanceFrontier, DominatorTree, PredecessorTable},
    impl_table_key,
    ir::{prelude::*, ValueData},
    opt::prelude::*,
    pass::{const_folding, simplify},
    table::TableKey,
    ty::Type,
};
use itertools::Itertools;
use std::collections::{HashMap, HashSet};

impl_table_key! {
    /// An expression in the pass-local arena.
    struct Expr(u32) as "x";
}

/// The ⊥ expression, the arena's first entry: no definition reaches here.
fn bottom() -> Expr {
    Expr::new(0)
}

/// The different kinds of expressions the pass models.
enum ExprKind {
    /// The ⊥ expression.
    Bottom,
    /// An instruction whose symbolic value is free (a constant or an
    /// argument); excluded from redundancy elimination.
    Ignored,
    /// An instruction the pass does not model (calls, memory).
    Unknown,
    /// An operation with opcode, result type, and operands in canonical
    /// order.
    Basic {
        opcode: Opcode,
        ty: Type,
        args: Vec<Value>,
    },
    /// A basic-shaped expression for an SSA phi, keyed to its parent block.
    Phi {
        ty: Type,
        args: Vec<Value>,
        block: Block,
    },
    /// An expression-level phi placeholder.
    Factor(FactorData),
}

/// The state of a factor expression.
struct FactorData {
    /// The block the factor is rooted at.
    block: Block,
    /// The predecessors of the block, fixing the operand slot order.
    preds: Vec<Block>,
    /// The definition reaching the factor through each predecessor, or ⊥.
    versions: Vec<Expr>,
    /// Whether the reaching definition is a real occurrence rather than
    /// another factor.
    has_real_use: Vec<bool>,
    /// Whether the factor's value is anticipated on every path to the exit.
    down_safe: bool,
    /// Whether the value can be made available here without speculation.
    can_be_avail: bool,
    /// Whether the evaluation could be placed strictly later without loss.
    later: bool,
}

/// An expression in the arena: a proto, a versioned occurrence, or a factor.
struct ExprData {
    kind: ExprKind,
    /// The owning proto-expression. Protos own themselves.
    proto: Expr,
    /// The SSA-like version within the proto class; `-1` means unassigned.
    version: i32,
    /// Finalization marks.
    save: bool,
    reload: bool,
    /// The originating instruction for real occurrences.
    inst: Option<Inst>,
}

/// The structural identity of an expression, used to collapse occurrences
/// into a single proto.
#[derive(PartialEq, Eq, Hash)]
enum ExprKey {
    Basic {
        opcode: Opcode,
        ty: Type,
        args: Vec<Value>,
    },
    Phi {
        ty: Type,
        args: Vec<Value>,
        block: Block,
    },
}

#[derive(Default)]
struct PreStats {
    saved: usize,
    reloaded: usize,
    inserted: usize,
    deleted: usize,
    phis: usize,
}

/// Partial Redundancy Elimination
pub struct PartialRedundancyElim;

impl Pass for PartialRedundancyElim {
    fn run_on_function(_ctx: &PassContext, unit: &mut FunctionBuilder) -> bool {
        info!("PRE [{}]", unit.func.name);

        let pt = PredecessorTable::new(unit.func);
        let dt = DominatorTree::new(unit.func, &pt);
        let df = DominanceFrontier::new(&dt, &pt);

        let mut pre = Pre::new(unit.func.sig.num_args());
        pre.collect(unit.func, &dt);
        pre.number(unit.func, &dt);
        pre.insert_factors(unit.func, &dt, &df, &pt);
        pre.rename(unit.func);
        pre.down_safety();
        pre.will_be_avail(unit.func, &dt, &pt);
        pre.finalize(unit.func, &dt);
        let needed = pre.needed_factors();
        let changed = pre.code_motion(unit, &needed);

        debug!(
            "PRE [{}] saved={} reloaded={} inserted={} deleted={} phis={}",
            unit.func.name,
            pre.stats.saved,
            pre.stats.reloaded,
            pre.stats.inserted,
            pre.stats.deleted,
            pre.stats.phis
        );
        changed
    }
}

/// The pass-local state: the expression arena and the maps tying it to the
/// function being transformed.
struct Pre {
    /// The expression arena. Index 0 is ⊥.
    exprs: Vec<ExprData>,
    /// The protos in creation order.
    protos: Vec<Expr>,
    /// Structural identity to proto.
    proto_map: HashMap<ExprKey, Expr>,
    /// Instruction to versioned expression.
    inst_expr: HashMap<Inst, Expr>,
    /// Proto to the blocks containing its occurrences.
    proto_blocks: HashMap<Expr, HashSet<Block>>,
    /// Block to the factors rooted there, in creation order.
    block_factors: HashMap<Block, Vec<Expr>>,
    /// All factors in creation order.
    factors: Vec<Expr>,
    /// Per-instruction index of the dominator-tree preorder with children in
    /// RPO order.
    instr_dfs: HashMap<Inst, u32>,
    /// Per-instruction index of the dominator-tree preorder with children in
    /// *reversed* RPO order. During an RPO walk these indices strictly
    /// decrease exactly when the walk re-ascends the dominator tree, which is
    /// the stack-popping signal used by renaming and code motion.
    instr_sdfs: HashMap<Inst, u32>,
    /// Blocks in reverse post-order.
    rpo: Vec<Block>,
    /// RPO index of each block.
    rpo_index: HashMap<Block, u32>,
    /// Number of function arguments, for operand ranking.
    num_args: usize,
    /// Proto to (version to current available definition).
    avail_def: HashMap<Expr, HashMap<i32, Expr>>,
    /// Block to the protos to materialize at its end, in schedule order.
    block_inserts: HashMap<Block, Vec<Expr>>,
    stats: PreStats,
}

impl Pre {
    fn new(num_args: usize) -> Self {
        Self {
            exprs: vec![ExprData {
                kind: ExprKind::Bottom,
                proto: bottom(),
                version: -1,
                save: false,
                reload: false,
                inst: None,
            }],
            protos: Default::default(),
            proto_map: Default::default(),
            inst_expr: Default::default(),
            proto_blocks: Default::default(),
            block_factors: Default::default(),
            factors: Default::default(),
            instr_dfs: Default::default(),
            instr_sdfs: Default::default(),
            rpo: Default::default(),
            rpo_index: Default::default(),
            num_args,
            avail_def: Default::default(),
            block_inserts: Default::default(),
            stats: Default::default(),
        }
    }

    fn alloc(&mut self, data: ExprData) -> Expr {
        let e = Expr::new(self.exprs.len());
        self.exprs.push(data);
        e
    }

    fn kind(&self, e: Expr) -> &ExprKind {
        &self.exprs[e.index()].kind
    }

    fn proto_of(&self, e: Expr) -> Expr {
        self.exprs[e.index()].proto
    }

    fn version_of(&self, e: Expr) -> i32 {
        self.exprs[e.index()].version
    }

    fn is_factor(&self, e: Expr) -> bool {
        matches!(self.kind(e), ExprKind::Factor(..))
    }

    /// Check whether an expression is a real occurrence, i.e. a basic or phi
    /// expression backed by an instruction.
    fn is_real(&self, e: Expr) -> bool {
        matches!(self.kind(e), ExprKind::Basic { .. } | ExprKind::Phi { .. })
    }

    fn factor(&self, e: Expr) -> &FactorData {
        match &self.exprs[e.index()].kind {
            ExprKind::Factor(fd) => fd,
            _ => panic!("expression {} is not a factor", e),
        }
    }

    fn factor_mut(&mut self, e: Expr) -> &mut FactorData {
        match &mut self.exprs[e.index()].kind {
            ExprKind::Factor(fd) => fd,
            _ => panic!("expression {} is not a factor", e),
        }
    }

    fn will_be_avail_of(&self, e: Expr) -> bool {
        let fd = self.factor(e);
        fd.can_be_avail && !fd.later
    }

    /// The result type of a proto-expression.
    fn proto_ty(&self, pe: Expr) -> Type {
        match self.kind(pe) {
            ExprKind::Basic { ty, .. } => ty.clone(),
            ExprKind::Phi { ty, .. } => ty.clone(),
            _ => panic!("expression {} has no type", pe),
        }
    }

    fn set_save(&mut self, e: Expr) {
        let data = &mut self.exprs[e.index()];
        if !data.save {
            data.save = true;
            self.stats.saved += 1;
        }
    }

    // ----- Phase 1: expression construction ------------------------------

    /// Turn every non-terminator instruction into a versioned expression and
    /// register its proto, walking the blocks in reverse post-order.
    fn collect(&mut self, func: &Function, dt: &DominatorTree) {
        self.rpo = dt.blocks_rev_post_order();
        for (i, &bb) in self.rpo.iter().enumerate() {
            self.rpo_index.insert(bb, i as u32 + 1);
        }

        for bb in self.rpo.clone() {
            for inst in func.layout.insts(bb).collect::<Vec<_>>() {
                if func.dfg[inst].opcode().is_terminator() {
                    continue;
                }
                let kind = self.make_kind(func, inst, bb);
                let key = match &kind {
                    ExprKind::Basic { opcode, ty, args } => Some(ExprKey::Basic {
                        opcode: *opcode,
                        ty: ty.clone(),
                        args: args.clone(),
                    }),
                    ExprKind::Phi { ty, args, block } => Some(ExprKey::Phi {
                        ty: ty.clone(),
                        args: args.clone(),
                        block: *block,
                    }),
                    _ => None,
                };

                let ve = self.alloc(ExprData {
                    kind,
                    proto: bottom(),
                    version: -1,
                    save: false,
                    reload: false,
                    inst: Some(inst),
                });
                self.inst_expr.insert(inst, ve);

                if let Some(key) = key {
                    let pe = match self.proto_map.get(&key) {
                        Some(&pe) => pe,
                        None => {
                            let kind = self.clone_kind(ve);
                            let pe = self.alloc(ExprData {
                                kind,
                                proto: bottom(),
                                version: -1,
                                save: false,
                                reload: false,
                                inst: None,
                            });
                            self.exprs[pe.index()].proto = pe;
                            self.proto_map.insert(key, pe);
                            self.protos.push(pe);
                            pe
                        }
                    };
                    self.exprs[ve.index()].proto = pe;
                    self.proto_blocks.entry(pe).or_default().insert(bb);
                }
            }
        }
    }

    fn clone_kind(&self, e: Expr) -> ExprKind {
        match self.kind(e) {
            ExprKind::Basic { opcode, ty, args } => ExprKind::Basic {
                opcode: *opcode,
                ty: ty.clone(),
                args: args.clone(),
            },
            ExprKind::Phi { ty, args, block } => ExprKind::Phi {
                ty: ty.clone(),
                args: args.clone(),
                block: *block,
            },
            _ => panic!("expression {} has no structural identity", e),
        }
    }

    /// Build the expression kind for an instruction: canonicalize the
    /// operands, consult the simplifier and folder, and demote expressions
    /// whose value is free.
    fn make_kind(&self, func: &Function, inst: Inst, bb: Block) -> ExprKind {
        let data = &func.dfg[inst];
        let mut opcode = data.opcode();
        match opcode {
            Opcode::ConstInt => return ExprKind::Ignored,
            Opcode::Phi => {
                return ExprKind::Phi {
                    ty: func.dfg.inst_type(inst),
                    args: data.args().to_vec(),
                    block: bb,
                };
            }
            Opcode::Call | Opcode::Var | Opcode::Ld | Opcode::St => return ExprKind::Unknown,
            _ => (),
        }

        let mut args = data.args().to_vec();
        if opcode.is_compare() {
            // Sort the operands so that `a slt b` and `b sgt a` collapse to
            // the same expression, mirroring the predicate alongside.
            if self.should_swap(func, args[0], args[1]) {
                args.swap(0, 1);
                opcode = opcode.swapped_compare();
            }
        } else if opcode.is_commutative() && args.len() == 2 {
            if self.should_swap(func, args[0], args[1]) {
                args.swap(0, 1);
            }
        }

        // Consult the constant folder. A foldable expression has no
        // redundancy value, its replacement is free.
        let folded = match args.len() {
            1 => func
                .dfg
                .get_const_int(args[0])
                .and_then(|imm| const_folding::fold_unary(opcode, imm)),
            2 => match (func.dfg.get_const_int(args[0]), func.dfg.get_const_int(args[1])) {
                (Some(imm0), Some(imm1)) => const_folding::fold_binary(opcode, imm0, imm1),
                _ => None,
            },
            _ => None,
        };
        if folded.is_some() {
            return ExprKind::Ignored;
        }

        // Consult the simplifier. If the expression reduces to a constant or
        // an argument it is likewise free.
        let probe = match args.len() {
            1 => Some(InstData::Unary {
                opcode,
                args: [args[0]],
            }),
            2 => Some(InstData::Binary {
                opcode,
                args: [args[0], args[1]],
            }),
            3 => Some(InstData::Ternary {
                opcode,
                args: [args[0], args[1], args[2]],
            }),
            _ => None,
        };
        if let Some(probe) = probe {
            if let Some(v) = simplify::simplified_operand(&func.dfg, &probe) {
                let free =
                    func.dfg.get_value_arg(v).is_some() || func.dfg.get_const_int(v).is_some();
                if free {
                    return ExprKind::Ignored;
                }
            }
        }

        ExprKind::Basic {
            opcode,
            ty: func.dfg.inst_type(inst),
            args,
        }
    }

    /// Global ranking of operands for canonical ordering. Constants rank
    /// lowest, then arguments by position, then instructions by DFS number.
    fn rank(&self, func: &Function, v: Value) -> u32 {
        match func.dfg[v] {
            ValueData::Arg { arg, .. } => 2 + arg.index() as u32,
            ValueData::Inst { inst, .. } => {
                if func.dfg[inst].opcode().is_const() {
                    1
                } else {
                    self.instr_dfs
                        .get(&inst)
                        .map(|&d| 3 + self.num_args as u32 + d)
                        .unwrap_or(std::u32::MAX)
                }
            }
            _ => std::u32::MAX,
        }
    }

    /// Decide whether two commutative operands should be swapped. Ranks give
    /// a weak ordering; value ids break the ties deterministically.
    fn should_swap(&self, func: &Function, a: Value, b: Value) -> bool {
        (self.rank(func, a), a.index()) > (self.rank(func, b), b.index())
    }

    // ----- Phase 1b: instruction numbering -------------------------------

    /// Assign the two dominator-tree preorder numberings. The first visits
    /// children in RPO order; the second in reversed RPO order.
    fn number(&mut self, func: &Function, dt: &DominatorTree) {
        let entry = func.entry();

        let mut count = 1u32;
        let mut stack = vec![entry];
        while let Some(bb) = stack.pop() {
            for inst in func.layout.insts(bb) {
                self.instr_dfs.insert(inst, count);
                count += 1;
            }
            // Push in reverse so the lowest RPO index is visited first.
            for &child in dt
                .children(bb)
                .iter()
                .sorted_by_key(|&&c| std::cmp::Reverse(self.rpo_index[&c]))
            {
                stack.push(child);
            }
        }

        let mut count = 1u32;
        let mut stack = vec![entry];
        while let Some(bb) = stack.pop() {
            for inst in func.layout.insts(bb) {
                self.instr_sdfs.insert(inst, count);
                count += 1;
            }
            for &child in dt
                .children(bb)
                .iter()
                .sorted_by_key(|&&c| self.rpo_index[&c])
            {
                stack.push(child);
            }
        }
    }

    // ----- Phase 2: factor insertion --------------------------------------

    /// Place factors at the iterated dominance frontier of each proto's
    /// defining blocks, and at the parent blocks of phis appearing as proto
    /// operands.
    fn insert_factors(
        &mut self,
        func: &Function,
        dt: &DominatorTree,
        df: &DominanceFrontier,
        pt: &PredecessorTable,
    ) {
        for pe in self.protos.clone() {
            let blocks = self.proto_blocks.get(&pe).cloned().unwrap_or_default();
            for bb in df.iterated(blocks) {
                self.add_factor(pe, bb, dt, pt);
            }

            // A phi joining an operand is evidence that the expression's
            // value may also differ along those edges. Phi-shaped protos
            // take part as well: their operands can themselves be phi
            // results.
            let args = match self.kind(pe) {
                ExprKind::Basic { args, .. } | ExprKind::Phi { args, .. } => args.clone(),
                _ => continue,
            };
            for arg in args {
                if let Some(inst) = func.dfg.get_value_inst(arg) {
                    if func.dfg[inst].opcode().is_phi() {
                        let bb = func.layout.inst_block(inst).unwrap();
                        self.add_factor(pe, bb, dt, pt);
                    }
                }
            }
        }
    }

    /// Create a factor for `pe` at `bb` unless one exists already or the
    /// block's neighborhood is not fully reachable.
    fn add_factor(&mut self, pe: Expr, bb: Block, dt: &DominatorTree, pt: &PredecessorTable) {
        if !dt.is_reachable(bb) || pt.pred(bb).any(|p| !dt.is_reachable(p)) {
            return;
        }
        if let Some(existing) = self.block_factors.get(&bb) {
            if existing.iter().any(|&f| self.proto_of(f) == pe) {
                return;
            }
        }
        let preds = pt.sorted_pred(bb);
        let n = preds.len();
        let fe = self.alloc(ExprData {
            kind: ExprKind::Factor(FactorData {
                block: bb,
                preds,
                versions: vec![bottom(); n],
                has_real_use: vec![false; n],
                down_safe: true,
                can_be_avail: true,
                later: true,
            }),
            proto: pe,
            version: -1,
            save: false,
            reload: false,
            inst: None,
        });
        self.factors.push(fe);
        self.block_factors.entry(bb).or_default().push(fe);
    }

    // ----- Phase 3: renaming ----------------------------------------------

    /// Walk the blocks in reverse post-order and assign versions to factors
    /// and real occurrences, maintaining one stack of reaching definitions
    /// per proto. Also seeds `HasRealUse` and `DownSafe`.
    fn rename(&mut self, func: &Function) {
        let mut counters: HashMap<Expr, i32> = self.protos.iter().map(|&p| (p, 0)).collect();
        let mut stacks: HashMap<Expr, Vec<(u32, Expr)>> =
            self.protos.iter().map(|&p| (p, vec![])).collect();

        for bb in self.rpo.clone() {
            let first = func.layout.first_inst(bb).expect("block is empty");
            let fsdfs = self.instr_sdfs[&first];

            // Factors take a fresh version and dominate the whole block.
            for fe in self.block_factors.get(&bb).cloned().unwrap_or_default() {
                let pe = self.proto_of(fe);
                let counter = counters.get_mut(&pe).unwrap();
                self.exprs[fe.index()].version = *counter;
                *counter += 1;
                stacks.get_mut(&pe).unwrap().push((fsdfs, fe));
            }

            for inst in func.layout.insts(bb).collect::<Vec<_>>() {
                let sdfs = self.instr_sdfs[&inst];

                // Backtrack every proto's stack when the walk re-ascended the
                // dominator tree: entries of sibling subtrees no longer
                // dominate this point.
                for stack in stacks.values_mut() {
                    while stack.last().map(|&(d, _)| d > sdfs).unwrap_or(false) {
                        stack.pop();
                    }
                }

                let data = &func.dfg[inst];
                if data.opcode().is_terminator() {
                    // Update the operand slots of every factor in a successor
                    // with the definition reaching the end of this block.
                    for succ in successors(data) {
                        for fe in self.block_factors.get(&succ).cloned().unwrap_or_default() {
                            let pe = self.proto_of(fe);
                            let top = stacks[&pe].last().cloned();
                            let pi = self.pred_index(fe, bb);
                            let (version, real) = match top {
                                Some((_, e)) => (e, self.is_real(e)),
                                None => (bottom(), false),
                            };
                            let fd = self.factor_mut(fe);
                            fd.versions[pi] = version;
                            fd.has_real_use[pi] = real;
                        }
                    }

                    // At a function exit, any factor still on top of a stack
                    // has its value die here: it is not anticipated.
                    if data.blocks().is_empty() {
                        let tops: Vec<Expr> =
                            stacks.values().filter_map(|s| s.last().map(|&(_, e)| e)).collect();
                        for e in tops {
                            if self.is_factor(e) {
                                self.factor_mut(e).down_safe = false;
                            }
                        }
                    }
                    continue;
                }

                let ve = self.inst_expr[&inst];
                if !self.is_real(ve) {
                    continue;
                }
                let pe = self.proto_of(ve);
                let stack = stacks.get_mut(&pe).unwrap();
                match stack.last() {
                    // A later occurrence of a value already on the stack:
                    // reuse its version. Without operand versioning every
                    // occurrence of a proto computes the same value, so this
                    // is always valid.
                    Some(&(_, top)) => {
                        let version = self.exprs[top.index()].version;
                        self.exprs[ve.index()].version = version;
                    }
                    // First occurrence on this path: draw a fresh version.
                    None => {
                        let counter = counters.get_mut(&pe).unwrap();
                        self.exprs[ve.index()].version = *counter;
                        *counter += 1;
                    }
                }
                stacks.get_mut(&pe).unwrap().push((sdfs, ve));
            }
        }
    }

    /// The operand slot of `fe` corresponding to predecessor `bb`.
    fn pred_index(&self, fe: Expr, bb: Block) -> usize {
        self.factor(fe)
            .preds
            .iter()
            .position(|&p| p == bb)
            .expect("block is not a predecessor of the factor's block")
    }

    // ----- Phase 4: down-safety -------------------------------------------

    /// Propagate "not anticipated" backwards: if a factor's result is not
    /// anticipated and a feeding factor has no real use here either, the
    /// feeding factor's value is not anticipated along this path.
    fn down_safety(&mut self) {
        for i in 0..self.factors.len() {
            let fe = self.factors[i];
            if self.factor(fe).down_safe {
                continue;
            }
            for slot in 0..self.factor(fe).versions.len() {
                self.reset_down_safety(fe, slot);
            }
        }
    }

    fn reset_down_safety(&mut self, fe: Expr, slot: usize) {
        let fd = self.factor(fe);
        if fd.has_real_use[slot] {
            return;
        }
        let e = fd.versions[slot];
        if !self.is_factor(e) || !self.factor(e).down_safe {
            return;
        }
        self.factor_mut(e).down_safe = false;
        for i in 0..self.factor(e).versions.len() {
            self.reset_down_safety(e, i);
        }
    }

    // ----- Phase 5: will-be-available -------------------------------------

    fn will_be_avail(&mut self, func: &Function, dt: &DominatorTree, pt: &PredecessorTable) {
        self.compute_can_be_avail(func, dt, pt);
        self.compute_later();
    }

    /// A factor with a ⊥ operand can only be made available if doing so is
    /// not speculative (down-safe) and the insertion is legal on every ⊥
    /// edge. Unavailability propagates forward through factor operands.
    fn compute_can_be_avail(&mut self, func: &Function, dt: &DominatorTree, pt: &PredecessorTable) {
        for i in 0..self.factors.len() {
            let fe = self.factors[i];
            let fd = self.factor(fe);
            if !fd.can_be_avail {
                continue;
            }
            let has_bottom = fd.versions.iter().any(|&v| v == bottom());
            if has_bottom && (!fd.down_safe || !self.insertable(func, dt, pt, fe)) {
                self.reset_can_be_avail(func, dt, pt, fe);
            }
        }
    }

    fn reset_can_be_avail(
        &mut self,
        func: &Function,
        dt: &DominatorTree,
        pt: &PredecessorTable,
        ge: Expr,
    ) {
        self.factor_mut(ge).can_be_avail = false;
        for i in 0..self.factors.len() {
            let fe = self.factors[i];
            let fd = self.factor(fe);
            let slots: Vec<usize> = fd
                .versions
                .iter()
                .enumerate()
                .filter(|&(i, &v)| v == ge && !fd.has_real_use[i])
                .map(|(i, _)| i)
                .collect();
            if slots.is_empty() {
                continue;
            }
            for slot in slots {
                self.factor_mut(fe).versions[slot] = bottom();
            }
            // The factor just gained a ⊥ operand it was never checked with:
            // re-validate it the same way the initial scan does, so a
            // down-safe factor whose scrubbed edge is illegal to insert on
            // does not stay available.
            let fd = self.factor(fe);
            if fd.can_be_avail && (!fd.down_safe || !self.insertable(func, dt, pt, fe)) {
                self.reset_can_be_avail(func, dt, pt, fe);
            }
        }
    }

    /// Check that materializing the proto at the end of every ⊥ predecessor
    /// of the factor is legal: the proto must be a plain operation, its
    /// operands must dominate the insertion point, and the edge must not be
    /// critical (an insertion at the predecessor's end would leak onto its
    /// other successors).
    fn insertable(&self, func: &Function, dt: &DominatorTree, pt: &PredecessorTable, fe: Expr) -> bool {
        let pe = self.proto_of(fe);
        let args = match self.kind(pe) {
            ExprKind::Basic { args, .. } => args,
            _ => return false,
        };
        let fd = self.factor(fe);
        fd.preds.iter().enumerate().all(|(i, &pred)| {
            fd.versions[i] != bottom()
                || (pt.succ_set(pred).len() == 1
                    && args.iter().all(|&a| dt.value_dominates_block(func, a, pred)))
        })
    }

    /// A factor is `Later` if the evaluation could be postponed: no real
    /// occurrence feeds it. `Later` factors and everything they feed are not
    /// profitable insertion points.
    fn compute_later(&mut self) {
        for i in 0..self.factors.len() {
            let fe = self.factors[i];
            let cba = self.factor(fe).can_be_avail;
            self.factor_mut(fe).later = cba;
        }
        for i in 0..self.factors.len() {
            let fe = self.factors[i];
            let fd = self.factor(fe);
            if !fd.later {
                continue;
            }
            let has_real = fd
                .versions
                .iter()
                .enumerate()
                .any(|(i, &v)| fd.has_real_use[i] && v != bottom());
            if has_real {
                self.reset_later(fe);
            }
        }
    }

    fn reset_later(&mut self, ge: Expr) {
        self.factor_mut(ge).later = false;
        for i in 0..self.factors.len() {
            let fe = self.factors[i];
            if fe == ge {
                continue;
            }
            if self.factor(fe).versions.iter().any(|&v| v == ge) && self.factor(fe).later {
                self.reset_later(fe);
            }
        }
    }

    // ----- Phase 6a: finalization -----------------------------------------

    /// Sweep the blocks in reverse post-order, recording for every proto and
    /// version the currently available definition. Real occurrences whose
    /// version is already defined become reloads; the definitions they read
    /// from are marked for saving. ⊥ edges into will-be-available factors
    /// get an insertion scheduled at the predecessor's end.
    fn finalize(&mut self, func: &Function, dt: &DominatorTree) {
        for bb in self.rpo.clone() {
            for fe in self.block_factors.get(&bb).cloned().unwrap_or_default() {
                if self.will_be_avail_of(fe) {
                    let pe = self.proto_of(fe);
                    let v = self.version_of(fe);
                    self.avail_def.entry(pe).or_default().insert(v, fe);
                }
            }

            for inst in func.layout.insts(bb).collect::<Vec<_>>() {
                let data = &func.dfg[inst];
                if data.opcode().is_terminator() {
                    for succ in successors(data) {
                        for fe in self.block_factors.get(&succ).cloned().unwrap_or_default() {
                            if !self.will_be_avail_of(fe) {
                                continue;
                            }
                            let pe = self.proto_of(fe);
                            let pi = self.pred_index(fe, bb);
                            let fd = self.factor(fe);
                            let o = fd.versions[pi];
                            let needs_insert = o == bottom()
                                || (!fd.has_real_use[pi]
                                    && self.is_factor(o)
                                    && !self.will_be_avail_of(o));
                            if needs_insert {
                                let list = self.block_inserts.entry(bb).or_default();
                                if !list.contains(&pe) {
                                    list.push(pe);
                                }
                            } else {
                                let ov = self.version_of(o);
                                let def = self
                                    .avail_def
                                    .get(&pe)
                                    .and_then(|defs| defs.get(&ov))
                                    .cloned();
                                if let Some(def) = def {
                                    if self.is_real(def) {
                                        self.set_save(def);
                                    }
                                }
                            }
                        }
                    }
                    continue;
                }

                let ve = self.inst_expr[&inst];
                if !self.is_real(ve) {
                    continue;
                }
                let pe = self.proto_of(ve);
                let v = self.version_of(ve);
                let def = self.avail_def.entry(pe).or_default().get(&v).cloned();
                match def {
                    // Defining occurrence of this version.
                    None => {
                        self.avail_def.get_mut(&pe).unwrap().insert(v, ve);
                    }
                    // The version is defined by a factor: the occurrence
                    // reloads the value the factor's phi will carry.
                    Some(def) if self.is_factor(def) => {
                        self.exprs[ve.index()].reload = true;
                        self.stats.reloaded += 1;
                    }
                    Some(def) => {
                        let def_inst = self.exprs[def.index()].inst.unwrap();
                        if dt.inst_dominates_inst(func, def_inst, inst) {
                            self.set_save(def);
                            self.exprs[ve.index()].reload = true;
                            self.stats.reloaded += 1;
                        } else {
                            // The recorded definition is on a parallel path;
                            // this occurrence takes over as the definition.
                            self.avail_def.get_mut(&pe).unwrap().insert(v, ve);
                        }
                    }
                }
            }
        }
    }

    /// The factors whose phi must actually be materialized: those some
    /// reload resolves to, and transitively the factors feeding them.
    fn needed_factors(&self) -> HashSet<Expr> {
        let mut work: Vec<Expr> = vec![];
        for (_, &ve) in &self.inst_expr {
            if !self.exprs[ve.index()].reload {
                continue;
            }
            let pe = self.proto_of(ve);
            let v = self.version_of(ve);
            if let Some(&def) = self.avail_def.get(&pe).and_then(|defs| defs.get(&v)) {
                if self.is_factor(def) {
                    work.push(def);
                }
            }
        }

        let mut needed = HashSet::new();
        while let Some(fe) = work.pop() {
            if !needed.insert(fe) {
                continue;
            }
            for &o in &self.factor(fe).versions {
                if self.is_factor(o) && self.will_be_avail_of(o) {
                    work.push(o);
                }
            }
        }
        needed
    }

    // ----- Phase 6b: code motion ------------------------------------------

    /// Apply the classification: keep saved occurrences, replace reloads with
    /// their available definition, materialize scheduled insertions and the
    /// demanded factor phis, and delete what remains unused.
    fn code_motion(&mut self, unit: &mut FunctionBuilder, needed: &HashSet<Expr>) -> bool {
        let mut changed = false;
        let mut counters: HashMap<Expr, i32> = self.protos.iter().map(|&p| (p, 0)).collect();
        let mut stacks: HashMap<Expr, Vec<(u32, Expr)>> =
            self.protos.iter().map(|&p| (p, vec![])).collect();
        // The phi each materialized factor was lowered to.
        let mut emitted: HashMap<Expr, Value> = HashMap::new();
        let mut materialized: Vec<Expr> = vec![];
        let mut kill: Vec<Inst> = vec![];

        for bb in self.rpo.clone() {
            // Collect the block's instructions up front; phi materialization
            // and insertions below must not be revisited by this walk.
            let insts: Vec<Inst> = unit.func.layout.insts(bb).collect();
            let fsdfs = self.instr_sdfs[&insts[0]];

            for fe in self.block_factors.get(&bb).cloned().unwrap_or_default() {
                let pe = self.proto_of(fe);
                let counter = counters.get_mut(&pe).unwrap();
                self.exprs[fe.index()].version = *counter;
                *counter += 1;

                if self.will_be_avail_of(fe) && needed.contains(&fe) {
                    // Materialize the factor as a real phi at the head of its
                    // block. The incoming values are not all known yet (a
                    // loop phi may be fed by itself), so placeholders stand
                    // in until the walk is complete.
                    let ty = self.proto_ty(pe);
                    let block = self.factor(fe).block;
                    let preds = self.factor(fe).preds.clone();
                    let args: Vec<Value> = preds
                        .iter()
                        .map(|_| unit.dfg_mut().add_placeholder(ty.clone()))
                        .collect();
                    unit.prepend_to(block);
                    let phi = unit.ins().phi(args, preds);
                    debug!(
                        "Materialize {} at {}",
                        unit.dfg().value_inst(phi).dump(unit.func),
                        block.dump(unit.func)
                    );
                    emitted.insert(fe, phi);
                    materialized.push(fe);
                    self.stats.phis += 1;
                    changed = true;
                }

                stacks.get_mut(&pe).unwrap().push((fsdfs, fe));
            }

            for inst in insts {
                let sdfs = self.instr_sdfs[&inst];
                for stack in stacks.values_mut() {
                    while stack.last().map(|&(d, _)| d > sdfs).unwrap_or(false) {
                        stack.pop();
                    }
                }

                if unit.dfg()[inst].opcode().is_terminator() {
                    // Materialize the insertions scheduled for this block so
                    // that they are what reaches the successors' factors.
                    for pe in self.block_inserts.get(&bb).cloned().unwrap_or_default() {
                        let ve = self.materialize_insert(unit, pe, inst, &mut counters);
                        stacks.get_mut(&pe).unwrap().push((sdfs, ve));
                        changed = true;
                    }

                    let succs = successors(&unit.dfg()[inst]);
                    for succ in succs {
                        for fe in self.block_factors.get(&succ).cloned().unwrap_or_default() {
                            let pe = self.proto_of(fe);
                            let top = stacks[&pe].last().cloned();
                            let pi = self.pred_index(fe, bb);
                            let (version, real) = match top {
                                Some((_, e)) => (e, self.is_real(e)),
                                None => (bottom(), false),
                            };
                            let fd = self.factor_mut(fe);
                            fd.versions[pi] = version;
                            fd.has_real_use[pi] = real;
                        }
                    }
                    continue;
                }

                let ve = self.inst_expr[&inst];
                if !self.is_real(ve) {
                    continue;
                }
                let pe = self.proto_of(ve);

                if self.exprs[ve.index()].save {
                    stacks.get_mut(&pe).unwrap().push((sdfs, ve));
                } else if self.exprs[ve.index()].reload {
                    let &(_, top) = stacks[&pe]
                        .last()
                        .expect("reload must have a reaching definition");
                    let replacement = if self.is_factor(top) {
                        *emitted
                            .get(&top)
                            .expect("reload must resolve to a materialized factor")
                    } else {
                        assert!(
                            self.exprs[top.index()].save,
                            "reload must resolve to a saved occurrence"
                        );
                        let top_inst = self.exprs[top.index()].inst.unwrap();
                        unit.dfg().inst_result(top_inst)
                    };
                    let result = unit.dfg().inst_result(inst);
                    debug!(
                        "Reload {} from {}",
                        inst.dump(unit.func),
                        replacement.dump(unit.func)
                    );
                    unit.dfg_mut().replace_use(result, replacement);
                    kill.push(inst);
                    changed = true;
                } else {
                    // A plain occurrence: the defining evaluation of its
                    // version if it is used, dead code otherwise.
                    let result = unit.dfg().inst_result(inst);
                    if unit.dfg().has_uses(result) {
                        stacks.get_mut(&pe).unwrap().push((sdfs, ve));
                    } else {
                        kill.push(inst);
                        self.stats.deleted += 1;
                        changed = true;
                    }
                }
            }
        }

        for inst in kill {
            debug!("Kill {}", inst.dump(unit.func));
            unit.remove_inst(inst);
        }

        // Resolve the placeholder incomings of the materialized phis from
        // the factor operand slots the walk left behind.
        for fe in materialized {
            let phi = emitted[&fe];
            let phi_inst = unit.dfg().value_inst(phi);
            for (i, o) in self.factor(fe).versions.clone().into_iter().enumerate() {
                let incoming = if self.is_factor(o) {
                    *emitted
                        .get(&o)
                        .expect("factor operand must be materialized")
                } else {
                    assert!(o != bottom(), "materialized factor has a ⊥ operand");
                    let o_inst = self.exprs[o.index()].inst.unwrap();
                    unit.dfg().inst_result(o_inst)
                };
                let placeholder = unit.dfg()[phi_inst].args()[i];
                unit.dfg_mut()[phi_inst].args_mut()[i] = incoming;
                unit.dfg_mut().remove_placeholder(placeholder);
            }
        }

        changed
    }

    /// Clone a proto-expression into a real instruction right before the
    /// given terminator.
    fn materialize_insert(
        &mut self,
        unit: &mut FunctionBuilder,
        pe: Expr,
        term: Inst,
        counters: &mut HashMap<Expr, i32>,
    ) -> Expr {
        let (opcode, ty, args) = match self.kind(pe) {
            ExprKind::Basic { opcode, ty, args } => (*opcode, ty.clone(), args.clone()),
            _ => panic!("only basic expressions can be inserted"),
        };
        let data = match args.len() {
            1 => InstData::Unary {
                opcode,
                args: [args[0]],
            },
            2 => InstData::Binary {
                opcode,
                args: [args[0], args[1]],
            },
            3 => InstData::Ternary {
                opcode,
                args: [args[0], args[1], args[2]],
            },
            _ => panic!("unsupported operand count {}", args.len()),
        };
        unit.insert_before(term);
        let inst = unit.build_inst(data, ty.clone());
        debug!(
            "Insert {} before {}",
            inst.dump(unit.func),
            term.dump(unit.func)
        );

        let counter = counters.get_mut(&pe).unwrap();
        let version = *counter;
        *counter += 1;
        let ve = self.alloc(ExprData {
            kind: ExprKind::Basic { opcode, ty, args },
            proto: pe,
            version,
            save: true,
            reload: false,
            inst: Some(inst),
        });
        self.stats.inserted += 1;
        ve
    }
}

/// The distinct successor blocks of a terminator, in operand order.
fn successors(data: &InstData) -> Vec<Block> {
    let mut succs = Vec::new();
    for &bb in data.blocks() {
        if !succs.contains(&bb) {
            succs.push(bb);
        }
    }
    succs
}
