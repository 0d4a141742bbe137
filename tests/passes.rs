mod common;

use common::*;
use ssapre::ir::prelude::*;
use ssapre::opt::{Pass, PassContext};
use ssapre::pass::{ConstFolding, DeadCodeElim, InstSimplification};
use ssapre::{int_ty, IntValue};

fn run<P: Pass>(func: &mut Function) -> bool {
    P::run_on_function(&PassContext, &mut FunctionBuilder::new(func))
}

#[test]
fn fold_constant_arithmetic() {
    let mut func = build_func("fold", &[], int_ty(32), |builder, _| {
        let bb = builder.named_block("entry");
        builder.append_to(bb);
        let a = builder.ins().const_int((32usize, 20isize));
        let b = builder.ins().const_int((32usize, 22isize));
        let sum = builder.ins().add(a, b);
        builder.ins().ret_value(sum);
    });
    assert!(run::<ConstFolding>(&mut func));
    verify(&func);
    assert_eq!(count_opcode(&func, Opcode::Add), 0);
    let result = interpret(&func, &[]);
    assert_eq!(result.result, Some(IntValue::from_usize(32, 42)));
}

#[test]
fn fold_constant_branch() {
    let mut func = build_func("foldbr", &[int_ty(32)], int_ty(32), |builder, args| {
        let entry = builder.named_block("entry");
        let left = builder.named_block("left");
        let right = builder.named_block("right");
        builder.append_to(entry);
        let cond = builder.ins().const_int((1usize, 1isize));
        builder.ins().br_cond(cond, left, right);
        builder.append_to(left);
        builder.ins().ret_value(args[0]);
        builder.append_to(right);
        let doubled = builder.ins().add(args[0], args[0]);
        builder.ins().ret_value(doubled);
    });
    assert!(run::<ConstFolding>(&mut func));
    // The unreachable branch is left for DCE to sweep up.
    assert!(run::<DeadCodeElim>(&mut func));
    verify(&func);
    assert_eq!(count_opcode(&func, Opcode::BrCond), 0);
    assert_eq!(func.blocks().count(), 2);
    let result = interpret(&func, &[IntValue::from_usize(32, 7)]);
    assert_eq!(result.result, Some(IntValue::from_usize(32, 14)));
}

#[test]
fn simplify_identities() {
    let mut func = build_func("simp", &[int_ty(32)], int_ty(32), |builder, args| {
        let bb = builder.named_block("entry");
        builder.append_to(bb);
        let same = builder.ins().and(args[0], args[0]);
        let zero = builder.ins().const_int((32usize, 0isize));
        let sum = builder.ins().add(same, zero);
        builder.ins().ret_value(sum);
    });
    assert!(run::<InstSimplification>(&mut func));
    assert!(run::<DeadCodeElim>(&mut func));
    verify(&func);
    assert_eq!(count_opcode(&func, Opcode::And), 0);
    assert_eq!(count_opcode(&func, Opcode::Add), 0);
    let result = interpret(&func, &[IntValue::from_usize(32, 9)]);
    assert_eq!(result.result, Some(IntValue::from_usize(32, 9)));
}

#[test]
fn simplify_self_cancellation() {
    let mut func = build_func("xorself", &[int_ty(32)], int_ty(32), |builder, args| {
        let bb = builder.named_block("entry");
        builder.append_to(bb);
        let x = builder.ins().xor(args[0], args[0]);
        builder.ins().ret_value(x);
    });
    assert!(run::<InstSimplification>(&mut func));
    assert!(run::<DeadCodeElim>(&mut func));
    verify(&func);
    assert_eq!(count_opcode(&func, Opcode::Xor), 0);
    let result = interpret(&func, &[IntValue::from_usize(32, 123)]);
    assert_eq!(result.result, Some(IntValue::from_usize(32, 0)));
}

#[test]
fn dce_removes_unused_chains() {
    let mut func = build_func("dead", &[int_ty(32)], int_ty(32), |builder, args| {
        let bb = builder.named_block("entry");
        builder.append_to(bb);
        let a = builder.ins().add(args[0], args[0]);
        let _b = builder.ins().mul(a, args[0]);
        builder.ins().ret_value(args[0]);
    });
    assert!(run::<DeadCodeElim>(&mut func));
    verify(&func);
    assert_eq!(count_opcode(&func, Opcode::Add), 0);
    assert_eq!(count_opcode(&func, Opcode::Mul), 0);
}

#[test]
fn dce_keeps_side_effects() {
    let mut func = build_func("effects", &[int_ty(32)], int_ty(32), |builder, args| {
        let bb = builder.named_block("entry");
        builder.append_to(bb);
        let ptr = builder.ins().var(args[0]);
        builder.ins().st(ptr, args[0]);
        builder.ins().ret_value(args[0]);
    });
    run::<DeadCodeElim>(&mut func);
    verify(&func);
    assert_eq!(count_opcode(&func, Opcode::Var), 1);
    assert_eq!(count_opcode(&func, Opcode::St), 1);
}

#[test]
fn passes_run_on_module() {
    let mut module = Module::new();
    for &name in &["first", "second"] {
        let func = build_func(name, &[], int_ty(32), |builder, _| {
            let bb = builder.named_block("entry");
            builder.append_to(bb);
            let a = builder.ins().const_int((32usize, 4isize));
            let b = builder.ins().const_int((32usize, 5isize));
            let prod = builder.ins().mul(a, b);
            builder.ins().ret_value(prod);
        });
        module.add_function(func);
    }
    assert!(ConstFolding::run_on_module(&PassContext, &mut module));
    for func in module.functions().collect::<Vec<_>>() {
        verify(&module[func]);
        assert_eq!(count_opcode(&module[func], Opcode::Mul), 0);
    }
}
