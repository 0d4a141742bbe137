mod common;

use common::*;
use ssapre::ir::prelude::*;
use ssapre::opt::{Pass, PassContext};
use ssapre::pass::PartialRedundancyElim;
use ssapre::{int_ty, IntValue};

fn run_pre(func: &mut Function) -> bool {
    PartialRedundancyElim::run_on_function(&PassContext, &mut FunctionBuilder::new(func))
}

fn imm1(v: usize) -> IntValue {
    IntValue::from_usize(1, v)
}

fn imm32(v: usize) -> IntValue {
    IntValue::from_usize(32, v)
}

/// A fully redundant pair of occurrences in straight-line code collapses to a
/// single evaluation.
#[test]
fn straightline_redundancy() {
    let build = || {
        build_func("straight", &[int_ty(32), int_ty(32)], int_ty(32), |b, args| {
            let bb = b.named_block("entry");
            b.append_to(bb);
            let t1 = b.ins().add(args[0], args[1]);
            let t2 = b.ins().add(args[0], args[1]);
            let prod = b.ins().mul(t1, t2);
            b.ins().ret_value(prod);
        })
    };

    let reference = build();
    let mut func = build();
    assert!(run_pre(&mut func));
    verify(&func);
    assert_eq!(count_opcode(&func, Opcode::Add), 1);

    let inputs = [imm32(3), imm32(4)];
    assert_eq!(
        interpret(&func, &inputs).result,
        interpret(&reference, &inputs).result
    );

    assert!(!run_pre(&mut func));
}

/// An expression available on only one path into a join gets an insertion on
/// the other path and a phi at the join; the occurrence at the join becomes a
/// reload.
#[test]
fn partial_redundancy_inserts_and_reloads() {
    let build = || {
        build_func(
            "partial",
            &[int_ty(1), int_ty(32), int_ty(32)],
            int_ty(32),
            |b, args| {
                let (cond, x, y) = (args[0], args[1], args[2]);
                let entry = b.named_block("entry");
                let left = b.named_block("left");
                let right = b.named_block("right");
                let join = b.named_block("join");
                b.append_to(entry);
                b.ins().br_cond(cond, left, right);
                b.append_to(left);
                b.ins().add(x, y);
                b.ins().br(join);
                b.append_to(right);
                b.ins().br(join);
                b.append_to(join);
                let u = b.ins().add(x, y);
                b.ins().ret_value(u);
            },
        )
    };

    let reference = build();
    let mut func = build();
    assert!(run_pre(&mut func));
    verify(&func);

    // One evaluation per arm, merged by a phi; the join's occurrence is gone.
    assert_eq!(count_opcode(&func, Opcode::Add), 2);
    assert_eq!(count_opcode(&func, Opcode::Phi), 1);

    for cond in 0..2 {
        let inputs = [imm1(cond), imm32(11), imm32(31)];
        let before = interpret(&reference, &inputs);
        let after = interpret(&func, &inputs);
        assert_eq!(before.result, after.result);
        // At most one evaluation on every path, where the original had two on
        // one of them.
        assert_eq!(after.executed(Opcode::Add), 1);
        assert!(after.executed(Opcode::Add) <= before.executed(Opcode::Add));
    }

    assert!(!run_pre(&mut func));
}

/// No insertion may be made when the join's value is not anticipated on every
/// outgoing path: hoisting into the empty arm would speculate.
#[test]
fn down_safety_blocks_speculation() {
    let build = || {
        build_func(
            "spec",
            &[int_ty(1), int_ty(1), int_ty(32), int_ty(32)],
            int_ty(32),
            |b, args| {
                let (c0, c1, x, y) = (args[0], args[1], args[2], args[3]);
                let entry = b.named_block("entry");
                let left = b.named_block("left");
                let right = b.named_block("right");
                let mid = b.named_block("mid");
                let quiet = b.named_block("quiet");
                let noisy = b.named_block("noisy");
                let exit = b.named_block("exit");
                b.append_to(entry);
                let ptr = b.ins().var(x);
                b.ins().br_cond(c0, left, right);
                b.append_to(left);
                let t = b.ins().add(x, y);
                b.ins().st(ptr, t);
                b.ins().br(mid);
                b.append_to(right);
                b.ins().br(mid);
                b.append_to(mid);
                b.ins().br_cond(c1, quiet, noisy);
                b.append_to(quiet);
                b.ins().br(exit);
                b.append_to(noisy);
                let u = b.ins().add(x, y);
                b.ins().st(ptr, u);
                b.ins().br(exit);
                b.append_to(exit);
                let r = b.ins().ld(ptr);
                b.ins().ret_value(r);
            },
        )
    };

    let reference = build();
    let mut func = build();
    assert!(!run_pre(&mut func));
    verify(&func);
    assert_eq!(count_opcode(&func, Opcode::Add), 2);
    assert_eq!(count_opcode(&func, Opcode::Phi), 0);

    for c0 in 0..2 {
        for c1 in 0..2 {
            let inputs = [imm1(c0), imm1(c1), imm32(5), imm32(6)];
            let before = interpret(&reference, &inputs);
            let after = interpret(&func, &inputs);
            assert_eq!(before.result, after.result);
            assert_eq!(before.executed(Opcode::Add), after.executed(Opcode::Add));
        }
    }
}

/// A loop-invariant expression is hoisted out of the loop: an insertion in
/// the preheader feeds a self-referential phi at the loop header, and the
/// body's evaluation becomes a reload.
#[test]
fn loop_invariant_hoisted() {
    let build = || {
        build_func(
            "loopinv",
            &[int_ty(32), int_ty(32), int_ty(32)],
            int_ty(32),
            |b, args| {
                let (x, y, n) = (args[0], args[1], args[2]);
                let entry = b.named_block("entry");
                let body = b.named_block("body");
                let exit = b.named_block("exit");
                b.append_to(entry);
                let zero = b.ins().const_int((32usize, 0isize));
                b.ins().br(body);
                b.append_to(body);
                let backedge = b.dfg_mut().add_placeholder(int_ty(32));
                let iphi = b.ins().phi(vec![zero, backedge], vec![entry, body]);
                let step = b.ins().add(x, y);
                let inext = b.ins().add(iphi, step);
                let again = b.ins().slt(inext, n);
                b.ins().br_cond(again, exit, body);
                // Patch the phi's backedge value now that it exists.
                b.dfg_mut().replace_use(backedge, inext);
                b.dfg_mut().remove_placeholder(backedge);
                b.append_to(exit);
                b.ins().ret_value(inext);
            },
        )
    };

    let reference = build();
    let mut func = build();
    assert!(run_pre(&mut func));
    verify(&func);

    // The invariant add sits in the entry now; only the induction add remains
    // in the body. A second phi (for the hoisted value) joins the loop.
    assert_eq!(count_opcode(&func, Opcode::Add), 2);
    assert_eq!(count_opcode(&func, Opcode::Phi), 2);
    let entry_adds = func
        .insts(func.entry())
        .filter(|&i| func.dfg[i].opcode() == Opcode::Add)
        .count();
    assert_eq!(entry_adds, 1);

    let inputs = [imm32(1), imm32(2), imm32(10)];
    let before = interpret(&reference, &inputs);
    let after = interpret(&func, &inputs);
    assert_eq!(before.result, after.result);
    assert_eq!(after.result, Some(imm32(12)));
    // Four iterations: the original evaluates the invariant in each of them,
    // the transformed function only once.
    assert_eq!(before.executed(Opcode::Add), 8);
    assert_eq!(after.executed(Opcode::Add), 5);

    assert!(!run_pre(&mut func));
}

/// Operand order does not matter for commutative operations: `x+y` and `y+x`
/// share a proto and are merged at the join.
#[test]
fn commutative_operands_share_proto() {
    let build = |swap: bool| {
        build_func(
            "commut",
            &[int_ty(1), int_ty(32), int_ty(32)],
            int_ty(32),
            move |b, args| {
                let (cond, x, y) = (args[0], args[1], args[2]);
                let entry = b.named_block("entry");
                let left = b.named_block("left");
                let right = b.named_block("right");
                let join = b.named_block("join");
                b.append_to(entry);
                b.ins().br_cond(cond, left, right);
                b.append_to(left);
                b.ins().add(x, y);
                b.ins().br(join);
                b.append_to(right);
                if swap {
                    b.ins().add(y, x);
                } else {
                    b.ins().add(x, y);
                }
                b.ins().br(join);
                b.append_to(join);
                let u = b.ins().add(x, y);
                b.ins().ret_value(u);
            },
        )
    };

    for &swap in &[false, true] {
        let reference = build(swap);
        let mut func = build(swap);
        assert!(run_pre(&mut func));
        verify(&func);

        // Both arm occurrences feed the phi; the join occurrence is a reload.
        assert_eq!(count_opcode(&func, Opcode::Add), 2);
        assert_eq!(count_opcode(&func, Opcode::Phi), 1);

        for cond in 0..2 {
            let inputs = [imm1(cond), imm32(8), imm32(9)];
            assert_eq!(
                interpret(&reference, &inputs).result,
                interpret(&func, &inputs).result
            );
            assert_eq!(interpret(&func, &inputs).executed(Opcode::Add), 1);
        }

        assert!(!run_pre(&mut func));
    }

    // Identical inputs produce identical outputs.
    let mut f1 = build(true);
    let mut f2 = build(true);
    run_pre(&mut f1);
    run_pre(&mut f2);
    assert_eq!(format!("{}", f1), format!("{}", f2));
}

/// `a < b` and `b > a` are the same comparison and share a proto.
#[test]
fn compare_predicates_normalized() {
    let build = || {
        build_func(
            "cmp",
            &[int_ty(1), int_ty(32), int_ty(32)],
            int_ty(1),
            |b, args| {
                let (cond, x, y) = (args[0], args[1], args[2]);
                let entry = b.named_block("entry");
                let left = b.named_block("left");
                let right = b.named_block("right");
                let join = b.named_block("join");
                b.append_to(entry);
                b.ins().br_cond(cond, left, right);
                b.append_to(left);
                b.ins().slt(x, y);
                b.ins().br(join);
                b.append_to(right);
                b.ins().sgt(y, x);
                b.ins().br(join);
                b.append_to(join);
                let u = b.ins().slt(x, y);
                b.ins().ret_value(u);
            },
        )
    };

    let reference = build();
    let mut func = build();
    assert!(run_pre(&mut func));
    verify(&func);

    // The join's comparison reloads from the phi over the two arms.
    assert_eq!(count_opcode(&func, Opcode::Slt), 1);
    assert_eq!(count_opcode(&func, Opcode::Sgt), 1);
    assert_eq!(count_opcode(&func, Opcode::Phi), 1);

    for cond in 0..2 {
        for &(x, y) in &[(3, 9), (9, 3), (5, 5)] {
            let inputs = [imm1(cond), imm32(x), imm32(y)];
            assert_eq!(
                interpret(&reference, &inputs).result,
                interpret(&func, &inputs).result
            );
        }
    }

    assert!(!run_pre(&mut func));
}

/// Full redundancy with no use at or below the join: nothing to reload, so
/// the pass leaves the program alone rather than creating a dead merge.
#[test]
fn full_redundancy_without_use_untouched() {
    let build = || {
        build_func(
            "fullred",
            &[int_ty(1), int_ty(32), int_ty(32)],
            int_ty(32),
            |b, args| {
                let (cond, x, y) = (args[0], args[1], args[2]);
                let entry = b.named_block("entry");
                let left = b.named_block("left");
                let right = b.named_block("right");
                let join = b.named_block("join");
                b.append_to(entry);
                let ptr = b.ins().var(x);
                b.ins().br_cond(cond, left, right);
                b.append_to(left);
                let t1 = b.ins().add(x, y);
                b.ins().st(ptr, t1);
                b.ins().br(join);
                b.append_to(right);
                let t2 = b.ins().add(x, y);
                b.ins().st(ptr, t2);
                b.ins().br(join);
                b.append_to(join);
                let r = b.ins().ld(ptr);
                b.ins().ret_value(r);
            },
        )
    };

    let reference = build();
    let mut func = build();
    assert!(!run_pre(&mut func));
    verify(&func);
    assert_eq!(count_opcode(&func, Opcode::Add), 2);
    assert_eq!(count_opcode(&func, Opcode::Phi), 0);

    let inputs = [imm1(1), imm32(2), imm32(3)];
    assert_eq!(
        interpret(&reference, &inputs).result,
        interpret(&func, &inputs).result
    );
}

/// Calls and memory operations are not modeled: the pass never saves,
/// reloads, inserts, or deletes them.
#[test]
fn unknown_expressions_untouched() {
    let mut func = build_func(
        "unknown",
        &[int_ty(1), int_ty(32)],
        int_ty(32),
        |b, args| {
            let mut sig = Signature::new();
            sig.add_input(int_ty(32));
            sig.set_return_type(int_ty(32));
            let ext = b.add_extern("opaque", sig);
            let (cond, x) = (args[0], args[1]);
            let entry = b.named_block("entry");
            let left = b.named_block("left");
            let right = b.named_block("right");
            let join = b.named_block("join");
            b.append_to(entry);
            b.ins().br_cond(cond, left, right);
            b.append_to(left);
            b.ins().call(ext, vec![x]);
            b.ins().br(join);
            b.append_to(right);
            b.ins().call(ext, vec![x]);
            b.ins().br(join);
            b.append_to(join);
            let z = b.ins().call(ext, vec![x]);
            b.ins().ret_value(z);
        },
    );

    assert!(!run_pre(&mut func));
    verify(&func);
    assert_eq!(count_opcode(&func, Opcode::Call), 3);
    assert_eq!(count_opcode(&func, Opcode::Phi), 0);
}

/// Structurally identical phis in one block collapse through the ordinary
/// save/reload path.
#[test]
fn identical_phis_deduped() {
    let build = || {
        build_func(
            "phidup",
            &[int_ty(1), int_ty(32), int_ty(32)],
            int_ty(32),
            |b, args| {
                let (cond, x, y) = (args[0], args[1], args[2]);
                let entry = b.named_block("entry");
                let left = b.named_block("left");
                let right = b.named_block("right");
                let join = b.named_block("join");
                b.append_to(entry);
                b.ins().br_cond(cond, left, right);
                b.append_to(left);
                b.ins().br(join);
                b.append_to(right);
                b.ins().br(join);
                b.append_to(join);
                let p1 = b.ins().phi(vec![x, y], vec![left, right]);
                let p2 = b.ins().phi(vec![x, y], vec![left, right]);
                let s = b.ins().xor(p1, p2);
                b.ins().ret_value(s);
            },
        )
    };

    let reference = build();
    let mut func = build();
    assert!(run_pre(&mut func));
    verify(&func);
    assert_eq!(count_opcode(&func, Opcode::Phi), 1);

    for cond in 0..2 {
        let inputs = [imm1(cond), imm32(17), imm32(4)];
        assert_eq!(
            interpret(&reference, &inputs).result,
            interpret(&func, &inputs).result
        );
    }

    assert!(!run_pre(&mut func));
}

/// Occurrences that are neither kept nor reloaded and have no uses are
/// deleted.
#[test]
fn dead_occurrence_deleted() {
    let mut func = build_func("deadocc", &[int_ty(32), int_ty(32)], int_ty(32), |b, args| {
        let bb = b.named_block("entry");
        b.append_to(bb);
        b.ins().add(args[0], args[1]);
        b.ins().ret_value(args[0]);
    });
    assert!(run_pre(&mut func));
    verify(&func);
    assert_eq!(count_opcode(&func, Opcode::Add), 0);
    assert!(!run_pre(&mut func));
}

/// Expressions the simplifier can resolve for free are ignored by the pass.
#[test]
fn free_expressions_ignored() {
    let mut func = build_func("free", &[int_ty(1), int_ty(32)], int_ty(32), |b, args| {
        let (cond, x) = (args[0], args[1]);
        let entry = b.named_block("entry");
        let left = b.named_block("left");
        let right = b.named_block("right");
        let join = b.named_block("join");
        b.append_to(entry);
        let zero = b.ins().const_int((32usize, 0isize));
        b.ins().br_cond(cond, left, right);
        b.append_to(left);
        let a = b.ins().add(x, zero);
        b.ins().br(join);
        b.append_to(right);
        let c = b.ins().add(x, zero);
        b.ins().br(join);
        b.append_to(join);
        let p = b.ins().phi(vec![a, c], vec![left, right]);
        b.ins().ret_value(p);
    });

    // `x + 0` is free, so there is nothing to merge or move.
    assert!(!run_pre(&mut func));
    verify(&func);
    assert_eq!(count_opcode(&func, Opcode::Add), 2);
    assert_eq!(count_opcode(&func, Opcode::Phi), 1);
}
