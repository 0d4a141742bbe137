// Copyright (c) 2025-2026 the ssapre authors

//! Representation of functions.

use crate::{
    ir::{
        Arg, Block, ControlFlowGraph, DataFlowGraph, ExtUnit, ExtUnitData, FunctionLayout,
        InsertPos, Inst, InstBuilder, InstData, Value,
    },
    table::TableKey,
    ty::{void_ty, Type},
};

/// A function signature: argument types and a return type.
#[derive(Debug, Clone, Default)]
pub struct Signature {
    args: Vec<Type>,
    retty: Option<Type>,
}

impl Signature {
    /// Create a new signature.
    pub fn new() -> Self {
        Default::default()
    }

    /// Add an argument of the given type.
    pub fn add_input(&mut self, ty: Type) -> Arg {
        self.args.push(ty);
        Arg::new(self.args.len() - 1)
    }

    /// Set the return type.
    pub fn set_return_type(&mut self, ty: Type) {
        self.retty = Some(ty);
    }

    /// Get the return type.
    pub fn return_type(&self) -> Type {
        self.retty.clone().unwrap_or_else(void_ty)
    }

    /// Check whether the signature has a non-void return type.
    pub fn has_return_type(&self) -> bool {
        self.retty.as_ref().map(|ty| !ty.is_void()).unwrap_or(false)
    }

    /// Iterate over the arguments.
    pub fn args<'a>(&'a self) -> impl Iterator<Item = Arg> + 'a {
        (0..self.args.len()).map(Arg::new)
    }

    /// Get the type of an argument.
    pub fn arg_type(&self, arg: Arg) -> Type {
        self.args[arg.index()].clone()
    }

    /// The number of arguments.
    pub fn num_args(&self) -> usize {
        self.args.len()
    }
}

/// A function.
pub struct Function {
    /// The name of the function.
    pub name: String,
    /// The signature of the function.
    pub sig: Signature,
    /// The data flow graph of the function.
    pub dfg: DataFlowGraph,
    /// The control flow graph of the function.
    pub cfg: ControlFlowGraph,
    /// The block and instruction layout of the function.
    pub layout: FunctionLayout,
}

impl Function {
    /// Create a new function.
    pub fn new(name: impl Into<String>, sig: Signature) -> Self {
        let mut func = Self {
            name: name.into(),
            sig,
            dfg: DataFlowGraph::new(),
            cfg: ControlFlowGraph::new(),
            layout: FunctionLayout::new(),
        };
        func.dfg.make_args_for_signature(&func.sig);
        func
    }

    /// Get the entry block of the function.
    pub fn entry(&self) -> Block {
        self.layout.entry()
    }

    /// Iterate over the blocks in layout order.
    pub fn blocks<'a>(&'a self) -> impl Iterator<Item = Block> + 'a {
        self.layout.blocks()
    }

    /// Iterate over the instructions of a block in layout order.
    pub fn insts<'a>(&'a self, bb: Block) -> impl Iterator<Item = Inst> + 'a {
        self.layout.insts(bb)
    }

    /// Get the terminator instruction of a block.
    pub fn terminator(&self, bb: Block) -> Inst {
        self.layout.terminator(bb)
    }

    /// Get the block containing an instruction.
    pub fn inst_block(&self, inst: Inst) -> Option<Block> {
        self.layout.inst_block(inst)
    }

    /// Iterate over the argument values of the function.
    pub fn args<'a>(&'a self) -> impl Iterator<Item = Value> + 'a {
        self.sig.args().map(move |arg| self.dfg.arg_value(arg))
    }

    /// Get the argument value at position `pos`.
    pub fn arg(&self, pos: usize) -> Value {
        self.args()
            .nth(pos)
            .expect("argument position out of bounds")
    }
}

impl std::fmt::Display for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "func @{} {{", self.name)?;
        for bb in self.layout.blocks() {
            writeln!(f, "{}:", bb.dump(self))?;
            for inst in self.layout.insts(bb) {
                writeln!(f, "    {}", inst.dump(self))?;
            }
        }
        write!(f, "}}")
    }
}

/// Temporary object used to populate a `Function`.
pub struct FunctionBuilder<'u> {
    /// The function currently being built.
    pub func: &'u mut Function,
    /// The position where new instructions are inserted.
    pos: InsertPos,
}

impl<'u> FunctionBuilder<'u> {
    /// Create a new function builder.
    pub fn new(func: &'u mut Function) -> Self {
        Self {
            func,
            pos: InsertPos::None,
        }
    }

    /// Add a new instruction using an `InstBuilder`.
    pub fn ins(&mut self) -> InstBuilder<'u, '_> {
        InstBuilder::new(self)
    }

    /// Add a new instruction at the current insertion position.
    pub fn build_inst(&mut self, data: InstData, ty: Type) -> Inst {
        let inst = self.func.dfg.add_inst(data, ty);
        self.pos.add_inst(inst, &mut self.func.layout);
        inst
    }

    /// Remove an instruction.
    pub fn remove_inst(&mut self, inst: Inst) {
        self.pos.remove_inst(inst, &self.func.layout);
        self.func.layout.remove_inst(inst);
        self.func.dfg.remove_inst(inst);
    }

    /// Create a new block appended at the end of the function.
    pub fn block(&mut self) -> Block {
        let bb = self.func.cfg.add_block();
        self.func.layout.append_block(bb);
        bb
    }

    /// Create a new named block.
    pub fn named_block(&mut self, name: impl Into<String>) -> Block {
        let bb = self.block();
        self.func.cfg.set_name(bb, name.into());
        bb
    }

    /// Remove a block, its instructions, and all uses of it.
    pub fn remove_block(&mut self, bb: Block) {
        let insts: Vec<_> = self.func.layout.insts(bb).collect();
        self.func.dfg.remove_block_use(bb);
        self.func.layout.remove_block(bb);
        self.func.cfg.remove_block(bb);
        for inst in insts {
            if self.func.dfg.has_result(inst) {
                let value = self.func.dfg.inst_result(inst);
                self.func.dfg.replace_use(value, Value::invalid());
            }
            self.func.dfg.remove_inst(inst);
        }
    }

    /// Append all following instructions to the end of `bb`.
    pub fn append_to(&mut self, bb: Block) {
        self.pos = InsertPos::Append(bb);
    }

    /// Prepend all following instructions to the beginning of `bb`.
    pub fn prepend_to(&mut self, bb: Block) {
        self.pos = InsertPos::Prepend(bb);
    }

    /// Insert all following instructions after `inst`.
    pub fn insert_after(&mut self, inst: Inst) {
        self.pos = InsertPos::After(inst);
    }

    /// Insert all following instructions before `inst`.
    pub fn insert_before(&mut self, inst: Inst) {
        self.pos = InsertPos::Before(inst);
    }

    /// Get the DFG of the function being built.
    pub fn dfg(&self) -> &DataFlowGraph {
        &self.func.dfg
    }

    /// Get the mutable DFG of the function being built.
    pub fn dfg_mut(&mut self) -> &mut DataFlowGraph {
        &mut self.func.dfg
    }

    /// Get the CFG of the function being built.
    pub fn cfg(&self) -> &ControlFlowGraph {
        &self.func.cfg
    }

    /// Get the mutable CFG of the function being built.
    pub fn cfg_mut(&mut self) -> &mut ControlFlowGraph {
        &mut self.func.cfg
    }

    /// Get the layout of the function being built.
    pub fn layout(&self) -> &FunctionLayout {
        &self.func.layout
    }

    /// Get the mutable layout of the function being built.
    pub fn layout_mut(&mut self) -> &mut FunctionLayout {
        &mut self.func.layout
    }

    /// Import an external function for use within this function.
    pub fn add_extern(&mut self, name: impl Into<String>, sig: Signature) -> ExtUnit {
        self.func.dfg.ext_units.add(ExtUnitData {
            name: name.into(),
            sig,
        })
    }

    /// Return the signature of an external function.
    pub fn extern_sig(&self, ext: ExtUnit) -> &Signature {
        &self.func.dfg[ext].sig
    }

    /// Remove an instruction if its value is not being read.
    ///
    /// Returns true if the instruction was removed.
    pub fn prune_if_unused(&mut self, inst: Inst) -> bool {
        if self.func.dfg.has_result(inst)
            && !self.func.dfg.has_uses(self.func.dfg.inst_result(inst))
        {
            let inst_args: Vec<_> = self.func.dfg[inst]
                .args()
                .iter()
                .cloned()
                .flat_map(|arg| self.func.dfg.get_value_inst(arg))
                .collect();
            self.remove_inst(inst);
            for inst in inst_args {
                self.prune_if_unused(inst);
            }
            true
        } else {
            false
        }
    }
}

impl<'u> std::ops::Deref for FunctionBuilder<'u> {
    type Target = Function;
    fn deref(&self) -> &Function {
        self.func
    }
}

impl<'u> std::ops::DerefMut for FunctionBuilder<'u> {
    fn deref_mut(&mut self) -> &mut Function {
        self.func
    }
}

impl InsertPos {
    /// Insert an instruction at this position and advance.
    fn add_inst(&mut self, inst: Inst, layout: &mut FunctionLayout) {
        match *self {
            InsertPos::None => panic!("no insertion position set"),
            InsertPos::Append(bb) => layout.append_inst(inst, bb),
            InsertPos::Prepend(bb) => {
                layout.prepend_inst(inst, bb);
                *self = InsertPos::After(inst);
            }
            InsertPos::After(other) => {
                layout.insert_inst_after(inst, other);
                *self = InsertPos::After(inst);
            }
            InsertPos::Before(other) => layout.insert_inst_before(inst, other),
        }
    }

    /// Adjust this position such that it no longer refers to `inst`.
    fn remove_inst(&mut self, inst: Inst, layout: &FunctionLayout) {
        match *self {
            InsertPos::After(other) if other == inst => {
                *self = match layout.prev_inst(inst) {
                    Some(prev) => InsertPos::After(prev),
                    None => InsertPos::Prepend(layout.inst_block(inst).unwrap()),
                };
            }
            InsertPos::Before(other) if other == inst => {
                *self = match layout.next_inst(inst) {
                    Some(next) => InsertPos::Before(next),
                    None => InsertPos::Append(layout.inst_block(inst).unwrap()),
                };
            }
            _ => (),
        }
    }
}
