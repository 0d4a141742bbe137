// Copyright (c) 2025-2026 the ssapre authors

//! Representation of the control flow in a `Function`.

use crate::{
    impl_table_indexing,
    ir::{Block, BlockData},
    table::PrimaryTable2,
};

/// A control flow graph.
///
/// This is the main container for basic blocks and control flow related
/// information. Every `Function` has an associated control flow graph.
#[derive(Default)]
pub struct ControlFlowGraph {
    /// The basic blocks in the graph.
    pub(crate) blocks: PrimaryTable2<Block, BlockData>,
}

impl_table_indexing!(ControlFlowGraph, blocks, Block, BlockData);

impl ControlFlowGraph {
    /// Create a new control flow graph.
    pub fn new() -> Self {
        Default::default()
    }

    /// Add a block to the graph.
    pub(crate) fn add_block(&mut self) -> Block {
        self.blocks.add(BlockData { name: None })
    }

    /// Remove a block from the graph.
    pub(crate) fn remove_block(&mut self, bb: Block) {
        self.blocks.remove(bb);
    }

    /// Return the name of a block.
    pub fn get_name(&self, bb: Block) -> Option<&str> {
        self[bb].name.as_ref().map(AsRef::as_ref)
    }

    /// Set the name of a block.
    pub fn set_name(&mut self, bb: Block, name: String) {
        self[bb].name = Some(name);
    }

    /// The upper bound on block ids in this graph.
    pub fn block_id_bound(&self) -> usize {
        self.blocks.capacity()
    }
}
