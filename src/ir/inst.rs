// Copyright (c) 2025-2026 the ssapre authors

//! Representation of instructions.
//!
//! This module implements the instruction set of the intermediate
//! representation: a scalar integer core with constants, arithmetic, logic,
//! shifts, comparisons, select, memory and call instructions, phi nodes, and
//! control flow.

use crate::{
    ir::{Block, ExtUnit, Function, FunctionBuilder, Inst, Value},
    table::TableKey,
    ty::{int_ty, pointer_ty, void_ty, Type},
    value::IntValue,
};
use bitflags::bitflags;

bitflags! {
    /// Properties of an opcode.
    pub struct OpcodeProps: u8 {
        /// The instruction produces a constant.
        const CONST = 0b00001;
        /// The operands of the instruction may be swapped freely.
        const COMMUTATIVE = 0b00010;
        /// The instruction is a comparison.
        const COMPARE = 0b00100;
        /// The instruction terminates a basic block.
        const TERMINATOR = 0b01000;
        /// The instruction has side effects beyond its result.
        const SIDE_EFFECTS = 0b10000;
    }
}

/// An instruction opcode.
///
/// This enum represents the actual instruction, whereas `InstData` covers the
/// format and arguments of the instruction.
#[allow(missing_docs)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Opcode {
    ConstInt,

    Not,
    Neg,

    Add,
    Sub,
    Mul,
    Sdiv,
    Udiv,
    Srem,
    Urem,
    And,
    Or,
    Xor,
    Shl,
    Shr,

    Eq,
    Neq,
    Slt,
    Sgt,
    Sle,
    Sge,
    Ult,
    Ugt,
    Ule,
    Uge,

    Sel,

    Call,
    Var,
    Ld,
    St,

    Phi,
    Br,
    BrCond,
    Ret,
    RetValue,
}

impl Opcode {
    /// Return the properties of this opcode.
    pub fn props(self) -> OpcodeProps {
        match self {
            Opcode::ConstInt => OpcodeProps::CONST,
            Opcode::Add | Opcode::Mul | Opcode::And | Opcode::Or | Opcode::Xor => {
                OpcodeProps::COMMUTATIVE
            }
            Opcode::Eq | Opcode::Neq => OpcodeProps::COMPARE | OpcodeProps::COMMUTATIVE,
            Opcode::Slt
            | Opcode::Sgt
            | Opcode::Sle
            | Opcode::Sge
            | Opcode::Ult
            | Opcode::Ugt
            | Opcode::Ule
            | Opcode::Uge => OpcodeProps::COMPARE,
            Opcode::Call | Opcode::Var | Opcode::St => OpcodeProps::SIDE_EFFECTS,
            Opcode::Br | Opcode::BrCond | Opcode::Ret | Opcode::RetValue => {
                OpcodeProps::TERMINATOR
            }
            _ => OpcodeProps::empty(),
        }
    }

    /// Check if this instruction is a constant.
    pub fn is_const(self) -> bool {
        self.props().contains(OpcodeProps::CONST)
    }

    /// Check if the operands of this instruction may be swapped freely.
    pub fn is_commutative(self) -> bool {
        self.props().contains(OpcodeProps::COMMUTATIVE)
    }

    /// Check if this instruction is a comparison.
    pub fn is_compare(self) -> bool {
        self.props().contains(OpcodeProps::COMPARE)
    }

    /// Check if this instruction is a terminator.
    pub fn is_terminator(self) -> bool {
        self.props().contains(OpcodeProps::TERMINATOR)
    }

    /// Check if this instruction has side effects beyond its result.
    pub fn has_side_effects(self) -> bool {
        self.props().contains(OpcodeProps::SIDE_EFFECTS)
    }

    /// Check if this instruction is a phi node.
    pub fn is_phi(self) -> bool {
        self == Opcode::Phi
    }

    /// Check if this is a return instruction.
    pub fn is_return(self) -> bool {
        match self {
            Opcode::Ret | Opcode::RetValue => true,
            _ => false,
        }
    }

    /// Return the comparison opcode with its operands mirrored.
    ///
    /// `a slt b` holds exactly when `b sgt a` does, so `Slt` and `Sgt` are
    /// each other's mirror. Panics if the opcode is not a comparison.
    pub fn swapped_compare(self) -> Opcode {
        match self {
            Opcode::Eq => Opcode::Eq,
            Opcode::Neq => Opcode::Neq,
            Opcode::Slt => Opcode::Sgt,
            Opcode::Sgt => Opcode::Slt,
            Opcode::Sle => Opcode::Sge,
            Opcode::Sge => Opcode::Sle,
            Opcode::Ult => Opcode::Ugt,
            Opcode::Ugt => Opcode::Ult,
            Opcode::Ule => Opcode::Uge,
            Opcode::Uge => Opcode::Ule,
            _ => panic!("swapped_compare called on {}", self),
        }
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match *self {
                Opcode::ConstInt => "const",
                Opcode::Not => "not",
                Opcode::Neg => "neg",
                Opcode::Add => "add",
                Opcode::Sub => "sub",
                Opcode::Mul => "mul",
                Opcode::Sdiv => "sdiv",
                Opcode::Udiv => "udiv",
                Opcode::Srem => "srem",
                Opcode::Urem => "urem",
                Opcode::And => "and",
                Opcode::Or => "or",
                Opcode::Xor => "xor",
                Opcode::Shl => "shl",
                Opcode::Shr => "shr",
                Opcode::Eq => "eq",
                Opcode::Neq => "neq",
                Opcode::Slt => "slt",
                Opcode::Sgt => "sgt",
                Opcode::Sle => "sle",
                Opcode::Sge => "sge",
                Opcode::Ult => "ult",
                Opcode::Ugt => "ugt",
                Opcode::Ule => "ule",
                Opcode::Uge => "uge",
                Opcode::Sel => "sel",
                Opcode::Call => "call",
                Opcode::Var => "var",
                Opcode::Ld => "ld",
                Opcode::St => "st",
                Opcode::Phi => "phi",
                Opcode::Br => "br",
                Opcode::BrCond => "br",
                Opcode::Ret => "ret",
                Opcode::RetValue => "ret",
            }
        )
    }
}

/// An instruction format.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InstData {
    /// `a = const iN imm`
    ConstInt { opcode: Opcode, imm: IntValue },
    /// `opcode`
    Nullary { opcode: Opcode },
    /// `a = opcode type x`
    Unary { opcode: Opcode, args: [Value; 1] },
    /// `a = opcode type x, y`
    Binary { opcode: Opcode, args: [Value; 2] },
    /// `a = opcode type x, y, z`
    Ternary { opcode: Opcode, args: [Value; 3] },
    /// `opcode bb`
    Jump { opcode: Opcode, bbs: [Block; 1] },
    /// `opcode x, bb0, bb1`
    Branch {
        opcode: Opcode,
        args: [Value; 1],
        bbs: [Block; 2],
    },
    /// `a = phi type [x, bb],*`
    Phi {
        opcode: Opcode,
        args: Vec<Value>,
        bbs: Vec<Block>,
    },
    /// `a = call type unit (args)`
    Call {
        opcode: Opcode,
        unit: ExtUnit,
        args: Vec<Value>,
    },
}

impl InstData {
    /// Get the opcode of the instruction.
    pub fn opcode(&self) -> Opcode {
        match *self {
            InstData::ConstInt { opcode, .. } => opcode,
            InstData::Nullary { opcode, .. } => opcode,
            InstData::Unary { opcode, .. } => opcode,
            InstData::Binary { opcode, .. } => opcode,
            InstData::Ternary { opcode, .. } => opcode,
            InstData::Jump { opcode, .. } => opcode,
            InstData::Branch { opcode, .. } => opcode,
            InstData::Phi { opcode, .. } => opcode,
            InstData::Call { opcode, .. } => opcode,
        }
    }

    /// Get the arguments of an instruction.
    pub fn args(&self) -> &[Value] {
        match self {
            InstData::ConstInt { .. } => &[],
            InstData::Nullary { .. } => &[],
            InstData::Unary { args, .. } => args,
            InstData::Binary { args, .. } => args,
            InstData::Ternary { args, .. } => args,
            InstData::Jump { .. } => &[],
            InstData::Branch { args, .. } => args,
            InstData::Phi { args, .. } => args,
            InstData::Call { args, .. } => args,
        }
    }

    /// Mutable access to the arguments of an instruction.
    pub(crate) fn args_mut(&mut self) -> &mut [Value] {
        match self {
            InstData::ConstInt { .. } => &mut [],
            InstData::Nullary { .. } => &mut [],
            InstData::Unary { args, .. } => args,
            InstData::Binary { args, .. } => args,
            InstData::Ternary { args, .. } => args,
            InstData::Jump { .. } => &mut [],
            InstData::Branch { args, .. } => args,
            InstData::Phi { args, .. } => args,
            InstData::Call { args, .. } => args,
        }
    }

    /// Get the blocks of an instruction.
    pub fn blocks(&self) -> &[Block] {
        match self {
            InstData::Jump { bbs, .. } => bbs,
            InstData::Branch { bbs, .. } => bbs,
            InstData::Phi { bbs, .. } => bbs,
            _ => &[],
        }
    }

    /// Mutable access to the blocks of an instruction.
    pub(crate) fn blocks_mut(&mut self) -> &mut [Block] {
        match self {
            InstData::Jump { bbs, .. } => bbs,
            InstData::Branch { bbs, .. } => bbs,
            InstData::Phi { bbs, .. } => bbs,
            _ => &mut [],
        }
    }

    /// Replace all uses of a value with another.
    pub(crate) fn replace_value(&mut self, from: Value, to: Value) -> usize {
        let mut count = 0;
        for arg in self.args_mut() {
            if *arg == from {
                *arg = to;
                count += 1;
            }
        }
        count
    }

    /// Replace all uses of a block with another.
    pub(crate) fn replace_block(&mut self, from: Block, to: Block) -> usize {
        let mut count = 0;
        for bb in self.blocks_mut() {
            if *bb == from {
                *bb = to;
                count += 1;
            }
        }
        count
    }

    /// Remove all uses of a block.
    pub(crate) fn remove_block(&mut self, block: Block) -> usize {
        match self {
            InstData::Phi { bbs, args, .. } => {
                let mut count = 0;
                let mut i = 0;
                while i < bbs.len() {
                    if bbs[i] == block {
                        bbs.swap_remove(i);
                        args.swap_remove(i);
                        count += 1;
                    } else {
                        i += 1;
                    }
                }
                count
            }
            _ => self.replace_block(block, Block::invalid()),
        }
    }

    /// Return the const int constructed by this instruction.
    pub fn get_const_int(&self) -> Option<&IntValue> {
        match self {
            InstData::ConstInt { imm, .. } => Some(imm),
            _ => None,
        }
    }

    /// Return the external unit being called by this instruction.
    pub fn get_ext_unit(&self) -> Option<ExtUnit> {
        match self {
            InstData::Call { unit, .. } => Some(*unit),
            _ => None,
        }
    }
}

impl Default for InstData {
    fn default() -> InstData {
        InstData::Nullary {
            opcode: Opcode::Ret,
        }
    }
}

/// A temporary object used to construct a single instruction.
pub struct InstBuilder<'a, 'b> {
    builder: &'b mut FunctionBuilder<'a>,
    name: Option<String>,
}

impl<'a, 'b> InstBuilder<'a, 'b> {
    /// Create a new instruction builder that inserts into `builder`.
    pub fn new(builder: &'b mut FunctionBuilder<'a>) -> Self {
        Self {
            builder,
            name: None,
        }
    }

    /// Assign a name to the instruction being built.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl<'a, 'b> InstBuilder<'a, 'b> {
    /// Create a constant integer.
    pub fn const_int(&mut self, value: impl Into<IntValue>) -> Value {
        let value = value.into();
        let ty = value.ty();
        let inst = self.build(
            InstData::ConstInt {
                opcode: Opcode::ConstInt,
                imm: value,
            },
            ty,
        );
        self.inst_result(inst)
    }

    /// Create a `not` instruction.
    pub fn not(&mut self, x: Value) -> Value {
        let ty = self.value_type(x);
        let inst = self.build_unary(Opcode::Not, ty, x);
        self.inst_result(inst)
    }

    /// Create a `neg` instruction.
    pub fn neg(&mut self, x: Value) -> Value {
        let ty = self.value_type(x);
        let inst = self.build_unary(Opcode::Neg, ty, x);
        self.inst_result(inst)
    }

    /// Create an `add` instruction.
    pub fn add(&mut self, x: Value, y: Value) -> Value {
        let ty = self.value_type(x);
        let inst = self.build_binary(Opcode::Add, ty, x, y);
        self.inst_result(inst)
    }

    /// Create a `sub` instruction.
    pub fn sub(&mut self, x: Value, y: Value) -> Value {
        let ty = self.value_type(x);
        let inst = self.build_binary(Opcode::Sub, ty, x, y);
        self.inst_result(inst)
    }

    /// Create a `mul` instruction.
    pub fn mul(&mut self, x: Value, y: Value) -> Value {
        let ty = self.value_type(x);
        let inst = self.build_binary(Opcode::Mul, ty, x, y);
        self.inst_result(inst)
    }

    /// Create an `sdiv` instruction.
    pub fn sdiv(&mut self, x: Value, y: Value) -> Value {
        let ty = self.value_type(x);
        let inst = self.build_binary(Opcode::Sdiv, ty, x, y);
        self.inst_result(inst)
    }

    /// Create a `udiv` instruction.
    pub fn udiv(&mut self, x: Value, y: Value) -> Value {
        let ty = self.value_type(x);
        let inst = self.build_binary(Opcode::Udiv, ty, x, y);
        self.inst_result(inst)
    }

    /// Create an `srem` instruction.
    pub fn srem(&mut self, x: Value, y: Value) -> Value {
        let ty = self.value_type(x);
        let inst = self.build_binary(Opcode::Srem, ty, x, y);
        self.inst_result(inst)
    }

    /// Create a `urem` instruction.
    pub fn urem(&mut self, x: Value, y: Value) -> Value {
        let ty = self.value_type(x);
        let inst = self.build_binary(Opcode::Urem, ty, x, y);
        self.inst_result(inst)
    }

    /// Create an `and` instruction.
    pub fn and(&mut self, x: Value, y: Value) -> Value {
        let ty = self.value_type(x);
        let inst = self.build_binary(Opcode::And, ty, x, y);
        self.inst_result(inst)
    }

    /// Create an `or` instruction.
    pub fn or(&mut self, x: Value, y: Value) -> Value {
        let ty = self.value_type(x);
        let inst = self.build_binary(Opcode::Or, ty, x, y);
        self.inst_result(inst)
    }

    /// Create a `xor` instruction.
    pub fn xor(&mut self, x: Value, y: Value) -> Value {
        let ty = self.value_type(x);
        let inst = self.build_binary(Opcode::Xor, ty, x, y);
        self.inst_result(inst)
    }

    /// Create a `shl` instruction.
    pub fn shl(&mut self, x: Value, y: Value) -> Value {
        let ty = self.value_type(x);
        let inst = self.build_binary(Opcode::Shl, ty, x, y);
        self.inst_result(inst)
    }

    /// Create a `shr` instruction.
    pub fn shr(&mut self, x: Value, y: Value) -> Value {
        let ty = self.value_type(x);
        let inst = self.build_binary(Opcode::Shr, ty, x, y);
        self.inst_result(inst)
    }

    /// Create an `eq` comparison.
    pub fn eq(&mut self, x: Value, y: Value) -> Value {
        let inst = self.build_binary(Opcode::Eq, int_ty(1), x, y);
        self.inst_result(inst)
    }

    /// Create a `neq` comparison.
    pub fn neq(&mut self, x: Value, y: Value) -> Value {
        let inst = self.build_binary(Opcode::Neq, int_ty(1), x, y);
        self.inst_result(inst)
    }

    /// Create an `slt` comparison.
    pub fn slt(&mut self, x: Value, y: Value) -> Value {
        let inst = self.build_binary(Opcode::Slt, int_ty(1), x, y);
        self.inst_result(inst)
    }

    /// Create an `sgt` comparison.
    pub fn sgt(&mut self, x: Value, y: Value) -> Value {
        let inst = self.build_binary(Opcode::Sgt, int_ty(1), x, y);
        self.inst_result(inst)
    }

    /// Create an `sle` comparison.
    pub fn sle(&mut self, x: Value, y: Value) -> Value {
        let inst = self.build_binary(Opcode::Sle, int_ty(1), x, y);
        self.inst_result(inst)
    }

    /// Create an `sge` comparison.
    pub fn sge(&mut self, x: Value, y: Value) -> Value {
        let inst = self.build_binary(Opcode::Sge, int_ty(1), x, y);
        self.inst_result(inst)
    }

    /// Create an `ult` comparison.
    pub fn ult(&mut self, x: Value, y: Value) -> Value {
        let inst = self.build_binary(Opcode::Ult, int_ty(1), x, y);
        self.inst_result(inst)
    }

    /// Create an `ugt` comparison.
    pub fn ugt(&mut self, x: Value, y: Value) -> Value {
        let inst = self.build_binary(Opcode::Ugt, int_ty(1), x, y);
        self.inst_result(inst)
    }

    /// Create an `ule` comparison.
    pub fn ule(&mut self, x: Value, y: Value) -> Value {
        let inst = self.build_binary(Opcode::Ule, int_ty(1), x, y);
        self.inst_result(inst)
    }

    /// Create a `uge` comparison.
    pub fn uge(&mut self, x: Value, y: Value) -> Value {
        let inst = self.build_binary(Opcode::Uge, int_ty(1), x, y);
        self.inst_result(inst)
    }

    /// Create a `sel` instruction choosing between two values.
    pub fn sel(&mut self, cond: Value, x: Value, y: Value) -> Value {
        let ty = self.value_type(x);
        let inst = self.build_ternary(Opcode::Sel, ty, cond, x, y);
        self.inst_result(inst)
    }

    /// Create a `call` instruction.
    pub fn call(&mut self, unit: ExtUnit, args: Vec<Value>) -> Value {
        let ty = self.builder.extern_sig(unit).return_type();
        let inst = self.build(
            InstData::Call {
                opcode: Opcode::Call,
                unit,
                args,
            },
            ty,
        );
        self.inst_result(inst)
    }

    /// Create a `var` instruction allocating stack storage.
    pub fn var(&mut self, x: Value) -> Value {
        let ty = pointer_ty(self.value_type(x));
        let inst = self.build_unary(Opcode::Var, ty, x);
        self.inst_result(inst)
    }

    /// Create an `ld` instruction.
    pub fn ld(&mut self, x: Value) -> Value {
        let ty = self.value_type(x);
        assert!(ty.is_pointer(), "argument to `ld` must be of pointer type");
        let ty = ty.unwrap_pointer().clone();
        let inst = self.build_unary(Opcode::Ld, ty, x);
        self.inst_result(inst)
    }

    /// Create an `st` instruction.
    pub fn st(&mut self, x: Value, y: Value) -> Inst {
        self.build_binary(Opcode::St, void_ty(), x, y)
    }

    /// Create a phi node.
    pub fn phi(&mut self, args: Vec<Value>, bbs: Vec<Block>) -> Value {
        assert!(!args.is_empty());
        assert_eq!(args.len(), bbs.len());
        let ty = self.value_type(args[0]);
        let inst = self.build(
            InstData::Phi {
                opcode: Opcode::Phi,
                args,
                bbs,
            },
            ty,
        );
        self.inst_result(inst)
    }

    /// Create a `br` instruction.
    pub fn br(&mut self, bb: Block) -> Inst {
        self.build(
            InstData::Jump {
                opcode: Opcode::Br,
                bbs: [bb],
            },
            void_ty(),
        )
    }

    /// Create a conditional `br` instruction.
    ///
    /// Branches to `bb0` if `x` is zero, to `bb1` otherwise.
    pub fn br_cond(&mut self, x: Value, bb0: Block, bb1: Block) -> Inst {
        self.build(
            InstData::Branch {
                opcode: Opcode::BrCond,
                args: [x],
                bbs: [bb0, bb1],
            },
            void_ty(),
        )
    }

    /// Create a `ret` instruction.
    pub fn ret(&mut self) -> Inst {
        self.build(
            InstData::Nullary {
                opcode: Opcode::Ret,
            },
            void_ty(),
        )
    }

    /// Create a `ret` instruction returning a value.
    pub fn ret_value(&mut self, x: Value) -> Inst {
        self.build_unary(Opcode::RetValue, void_ty(), x)
    }
}

/// Convenience functions to construct the different instruction formats.
impl<'a, 'b> InstBuilder<'a, 'b> {
    /// `a = opcode type x`
    fn build_unary(&mut self, opcode: Opcode, ty: Type, x: Value) -> Inst {
        self.build(InstData::Unary { opcode, args: [x] }, ty)
    }

    /// `a = opcode type x, y`
    fn build_binary(&mut self, opcode: Opcode, ty: Type, x: Value, y: Value) -> Inst {
        self.build(
            InstData::Binary {
                opcode,
                args: [x, y],
            },
            ty,
        )
    }

    /// `a = opcode type x, y, z`
    fn build_ternary(&mut self, opcode: Opcode, ty: Type, x: Value, y: Value, z: Value) -> Inst {
        self.build(
            InstData::Ternary {
                opcode,
                args: [x, y, z],
            },
            ty,
        )
    }

    /// Convenience forward to `FunctionBuilder`.
    pub(crate) fn build(&mut self, data: InstData, ty: Type) -> Inst {
        let inst = self.builder.build_inst(data, ty);
        if let Some(name) = self.name.take() {
            if let Some(value) = self.builder.dfg().get_inst_result(inst) {
                self.builder.dfg_mut().set_name(value, name);
            }
        }
        inst
    }

    fn value_type(&self, value: Value) -> Type {
        self.builder.dfg().value_type(value)
    }

    fn inst_result(&self, inst: Inst) -> Value {
        self.builder.dfg().inst_result(inst)
    }
}

impl Inst {
    /// Dump the instruction in human-readable form.
    pub fn dump(self, func: &Function) -> InstDumper {
        InstDumper(self, func)
    }
}

impl Value {
    /// Dump the value in human-readable form.
    pub fn dump(self, func: &Function) -> ValueDumper {
        ValueDumper(self, func)
    }
}

/// Temporary object to dump an `Inst` in human-readable form for debugging.
pub struct InstDumper<'a>(Inst, &'a Function);

impl std::fmt::Display for InstDumper<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let inst = self.0;
        let func = self.1;
        let data = &func.dfg[inst];
        if func.dfg.has_result(inst) {
            let result = func.dfg.inst_result(inst);
            write!(
                f,
                "{} = {} {}",
                result.dump(func),
                data.opcode(),
                func.dfg.value_type(result)
            )?;
        } else {
            write!(f, "{}", data.opcode())?;
        }
        if let InstData::Call { unit, .. } = *data {
            write!(f, " @{} (", func.dfg[unit].name)?;
            for (i, arg) in data.args().iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", arg.dump(func))?;
            }
            write!(f, ")")?;
        } else if let InstData::Phi { .. } = *data {
            write!(f, " ")?;
            for (i, (arg, block)) in data.args().iter().zip(data.blocks().iter()).enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "[{}, {}]", arg.dump(func), block.dump(func))?;
            }
        } else {
            let mut comma = false;
            for arg in data.args() {
                if comma {
                    write!(f, ",")?;
                }
                write!(f, " {}", arg.dump(func))?;
                comma = true;
            }
            for block in data.blocks() {
                if comma {
                    write!(f, ",")?;
                }
                write!(f, " {}", block.dump(func))?;
                comma = true;
            }
            if let InstData::ConstInt { imm, .. } = data {
                write!(f, " {}", imm.value)?;
            }
        }
        Ok(())
    }
}

/// Temporary object to dump a `Value` in human-readable form for debugging.
pub struct ValueDumper<'a>(Value, &'a Function);

impl std::fmt::Display for ValueDumper<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if let Some(name) = self.1.dfg.get_name(self.0) {
            write!(f, "%{}", name)
        } else {
            write!(f, "%{}", self.0.index())
        }
    }
}

impl Block {
    /// Dump the block in human-readable form.
    pub fn dump(self, func: &Function) -> BlockDumper {
        BlockDumper(self, func)
    }
}

/// Temporary object to dump a `Block` in human-readable form for debugging.
pub struct BlockDumper<'a>(Block, &'a Function);

impl std::fmt::Display for BlockDumper<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if let Some(name) = self.1.cfg.get_name(self.0) {
            write!(f, "%{}", name)
        } else {
            write!(f, "{}", self.0)
        }
    }
}
