mod common;

use common::*;
use ssapre::analysis::{DominanceFrontier, DominatorTree, PredecessorTable};
use ssapre::ir::prelude::*;
use ssapre::{int_ty, void_ty};

/// Build the canonical diamond: entry -> {left, right} -> join.
fn diamond() -> (Function, Vec<Block>) {
    let mut blocks = vec![];
    let func = build_func("diamond", &[int_ty(1)], void_ty(), |builder, args| {
        let entry = builder.named_block("entry");
        let left = builder.named_block("left");
        let right = builder.named_block("right");
        let join = builder.named_block("join");
        blocks.extend([entry, left, right, join].iter().cloned());
        builder.append_to(entry);
        builder.ins().br_cond(args[0], left, right);
        builder.append_to(left);
        builder.ins().br(join);
        builder.append_to(right);
        builder.ins().br(join);
        builder.append_to(join);
        builder.ins().ret();
    });
    (func, blocks)
}

/// Build a do-while loop: entry -> body, body -> {body, exit}.
fn simple_loop() -> (Function, Vec<Block>) {
    let mut blocks = vec![];
    let func = build_func("loop", &[int_ty(1)], void_ty(), |builder, args| {
        let entry = builder.named_block("entry");
        let body = builder.named_block("body");
        let exit = builder.named_block("exit");
        blocks.extend([entry, body, exit].iter().cloned());
        builder.append_to(entry);
        builder.ins().br(body);
        builder.append_to(body);
        builder.ins().br_cond(args[0], exit, body);
        builder.append_to(exit);
        builder.ins().ret();
    });
    (func, blocks)
}

#[test]
fn predecessors_of_diamond() {
    let (func, blocks) = diamond();
    let (entry, left, right, join) = (blocks[0], blocks[1], blocks[2], blocks[3]);
    let pt = PredecessorTable::new(&func);

    assert!(pt.pred_set(entry).is_empty());
    assert_eq!(pt.sorted_pred(join), vec![left, right]);
    assert_eq!(pt.succ_set(entry).len(), 2);
    assert!(pt.is_sole_pred(entry, left));
    assert!(pt.is_sole_succ(join, left));
}

#[test]
fn dominators_of_diamond() {
    let (func, blocks) = diamond();
    let (entry, left, right, join) = (blocks[0], blocks[1], blocks[2], blocks[3]);
    let pt = PredecessorTable::new(&func);
    let dt = DominatorTree::new(&func, &pt);

    assert!(dt.dominates(entry, left));
    assert!(dt.dominates(entry, right));
    assert!(dt.dominates(entry, join));
    assert!(!dt.dominates(left, join));
    assert!(!dt.dominates(right, join));
    assert_eq!(dt.dominator(join), entry);
    assert_eq!(dt.dominator(left), entry);

    let rpo = dt.blocks_rev_post_order();
    assert_eq!(rpo[0], entry);
    assert_eq!(rpo.len(), 4);
    assert_eq!(*rpo.last().unwrap(), join);

    // The dominator tree children of the entry are the other three blocks.
    let mut children = dt.children(entry).to_vec();
    children.sort();
    assert_eq!(children, vec![left, right, join]);
}

#[test]
fn dominators_of_loop() {
    let (func, blocks) = simple_loop();
    let (entry, body, exit) = (blocks[0], blocks[1], blocks[2]);
    let pt = PredecessorTable::new(&func);
    let dt = DominatorTree::new(&func, &pt);

    assert!(dt.dominates(entry, body));
    assert!(dt.dominates(body, exit));
    assert_eq!(dt.dominator(body), entry);
    assert_eq!(dt.dominator(exit), body);
}

#[test]
fn instruction_dominance() {
    let func = build_func("dom", &[int_ty(32)], int_ty(32), |builder, args| {
        let bb = builder.named_block("entry");
        builder.append_to(bb);
        let a = builder.ins().add(args[0], args[0]);
        let b = builder.ins().mul(a, args[0]);
        builder.ins().ret_value(b);
    });
    let pt = PredecessorTable::new(&func);
    let dt = DominatorTree::new(&func, &pt);

    let add = func.insts(func.entry()).next().unwrap();
    let mul = func.insts(func.entry()).nth(1).unwrap();
    assert!(dt.inst_dominates_inst(&func, add, mul));
    assert!(!dt.inst_dominates_inst(&func, mul, add));
    assert!(dt.inst_dominates_inst(&func, add, add));
}

#[test]
fn frontiers_of_diamond() {
    let (func, blocks) = diamond();
    let (entry, left, right, join) = (blocks[0], blocks[1], blocks[2], blocks[3]);
    let pt = PredecessorTable::new(&func);
    let dt = DominatorTree::new(&func, &pt);
    let df = DominanceFrontier::new(&dt, &pt);

    assert!(df.frontier(left).unwrap().contains(&join));
    assert!(df.frontier(right).unwrap().contains(&join));
    assert!(df.frontier(entry).is_none());

    assert_eq!(df.iterated(vec![left]), vec![join]);
    assert_eq!(df.iterated(vec![left, right]), vec![join]);
    assert_eq!(df.iterated(vec![entry]), vec![]);
}

#[test]
fn frontiers_of_loop() {
    let (func, blocks) = simple_loop();
    let (entry, body, _exit) = (blocks[0], blocks[1], blocks[2]);
    let pt = PredecessorTable::new(&func);
    let dt = DominatorTree::new(&func, &pt);
    let df = DominanceFrontier::new(&dt, &pt);

    // The body feeds its own backedge, so it sits in its own frontier.
    assert!(df.frontier(body).unwrap().contains(&body));
    assert_eq!(df.iterated(vec![body]), vec![body]);
    // A single definition in the entry reaches everything without a merge.
    assert_eq!(df.iterated(vec![entry]), vec![]);
}
