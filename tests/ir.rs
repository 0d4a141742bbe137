mod common;

use common::*;
use ssapre::ir::prelude::*;
use ssapre::verifier::Verifier;
use ssapre::{int_ty, void_ty, IntValue};

#[test]
fn build_simple_function() {
    let func = build_func(
        "add",
        &[int_ty(32), int_ty(32)],
        int_ty(32),
        |builder, args| {
            let bb = builder.named_block("entry");
            builder.append_to(bb);
            let sum = builder.ins().name("sum").add(args[0], args[1]);
            builder.ins().ret_value(sum);
        },
    );
    verify(&func);
    assert_eq!(func.blocks().count(), 1);
    assert_eq!(func.insts(func.entry()).count(), 2);
    assert_eq!(count_opcode(&func, Opcode::Add), 1);

    let dump = format!("{}", func);
    assert!(dump.contains("func @add"));
    assert!(dump.contains("%sum = add i32"));
}

#[test]
fn layout_insertion_order() {
    let mut func = build_func("layout", &[int_ty(8)], void_ty(), |builder, args| {
        let bb = builder.named_block("entry");
        builder.append_to(bb);
        let a = builder.ins().not(args[0]);
        builder.ins().ret();
        // Insert in the middle of the block after the fact.
        let not_inst = builder.dfg().value_inst(a);
        builder.insert_after(not_inst);
        builder.ins().neg(a);
    });
    verify(&func);

    let opcodes: Vec<Opcode> = func
        .insts(func.entry())
        .map(|inst| func.dfg[inst].opcode())
        .collect();
    assert_eq!(opcodes, vec![Opcode::Not, Opcode::Neg, Opcode::Ret]);

    // Removing the middle instruction relinks the layout.
    let neg_inst = func.insts(func.entry()).nth(1).unwrap();
    let mut builder = FunctionBuilder::new(&mut func);
    builder.remove_inst(neg_inst);
    let opcodes: Vec<Opcode> = func
        .insts(func.entry())
        .map(|inst| func.dfg[inst].opcode())
        .collect();
    assert_eq!(opcodes, vec![Opcode::Not, Opcode::Ret]);
}

#[test]
fn replace_uses_and_prune() {
    let mut func = build_func("prune", &[int_ty(32)], int_ty(32), |builder, args| {
        let bb = builder.named_block("entry");
        builder.append_to(bb);
        let a = builder.ins().add(args[0], args[0]);
        let b = builder.ins().mul(args[0], args[0]);
        let _ = b;
        builder.ins().ret_value(a);
    });

    let entry = func.entry();
    let add = func.insts(entry).next().unwrap();
    let mul = func.insts(entry).nth(1).unwrap();
    let add_result = func.dfg.inst_result(add);
    let mul_result = func.dfg.inst_result(mul);

    assert!(func.dfg.has_uses(add_result));
    assert!(!func.dfg.has_uses(mul_result));

    let mut builder = FunctionBuilder::new(&mut func);
    assert!(!builder.prune_if_unused(add));
    assert!(builder.prune_if_unused(mul));

    // Replacing the remaining use makes the add prunable too.
    let arg = func.args().next().unwrap();
    func.dfg.replace_use(add_result, arg);
    let mut builder = FunctionBuilder::new(&mut func);
    assert!(builder.prune_if_unused(add));
    assert_eq!(func.insts(func.entry()).count(), 1);
}

#[test]
fn phi_round_trip() {
    let func = build_func("phi", &[int_ty(1), int_ty(32)], int_ty(32), |builder, args| {
        let entry = builder.named_block("entry");
        let left = builder.named_block("left");
        let right = builder.named_block("right");
        let join = builder.named_block("join");
        builder.append_to(entry);
        builder.ins().br_cond(args[0], left, right);
        builder.append_to(left);
        let x = builder.ins().add(args[1], args[1]);
        builder.ins().br(join);
        builder.append_to(right);
        let y = builder.ins().mul(args[1], args[1]);
        builder.ins().br(join);
        builder.append_to(join);
        let merged = builder.ins().phi(vec![x, y], vec![left, right]);
        builder.ins().ret_value(merged);
    });
    verify(&func);

    // cond = 0 takes the left branch.
    let result = interpret(&func, &[IntValue::from_usize(1, 0), IntValue::from_usize(32, 5)]);
    assert_eq!(result.result, Some(IntValue::from_usize(32, 10)));
    let result = interpret(&func, &[IntValue::from_usize(1, 1), IntValue::from_usize(32, 5)]);
    assert_eq!(result.result, Some(IntValue::from_usize(32, 25)));
}

#[test]
fn verifier_rejects_missing_terminator() {
    let func = build_func("bad", &[int_ty(32)], int_ty(32), |builder, args| {
        let bb = builder.named_block("entry");
        builder.append_to(bb);
        builder.ins().add(args[0], args[0]);
    });
    let mut verifier = Verifier::new();
    verifier.verify_function(&func);
    assert!(verifier.finish().is_err());
}

#[test]
fn verifier_rejects_wrong_phi_arity() {
    let func = build_func("badphi", &[int_ty(1), int_ty(32)], int_ty(32), |builder, args| {
        let entry = builder.named_block("entry");
        let left = builder.named_block("left");
        let right = builder.named_block("right");
        let join = builder.named_block("join");
        builder.append_to(entry);
        builder.ins().br_cond(args[0], left, right);
        builder.append_to(left);
        builder.ins().br(join);
        builder.append_to(right);
        builder.ins().br(join);
        builder.append_to(join);
        // Only one incoming value for a block with two predecessors.
        let merged = builder.ins().phi(vec![args[1]], vec![left]);
        builder.ins().ret_value(merged);
    });
    let mut verifier = Verifier::new();
    verifier.verify_function(&func);
    assert!(verifier.finish().is_err());
}

#[test]
fn interpreter_memory() {
    let func = build_func("mem", &[int_ty(32)], int_ty(32), |builder, args| {
        let bb = builder.named_block("entry");
        builder.append_to(bb);
        let ptr = builder.ins().var(args[0]);
        let doubled = builder.ins().add(args[0], args[0]);
        builder.ins().st(ptr, doubled);
        let loaded = builder.ins().ld(ptr);
        builder.ins().ret_value(loaded);
    });
    verify(&func);
    let result = interpret(&func, &[IntValue::from_usize(32, 21)]);
    assert_eq!(result.result, Some(IntValue::from_usize(32, 42)));
}
