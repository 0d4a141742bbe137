// Copyright (c) 2025-2026 the ssapre authors

//! Representation of a module as a collection of functions.

use crate::{
    impl_table_indexing,
    ir::{Func, Function},
    table::PrimaryTable,
};
use rayon::prelude::*;

/// A module, a collection of functions.
#[derive(Default)]
pub struct Module {
    /// The functions in the module.
    functions: PrimaryTable<Func, Function>,
}

impl_table_indexing!(Module, functions, Func, Function);

impl Module {
    /// Create a new module.
    pub fn new() -> Self {
        Default::default()
    }

    /// Add a function to the module.
    pub fn add_function(&mut self, func: Function) -> Func {
        self.functions.add(func)
    }

    /// Remove a function from the module.
    pub fn remove_function(&mut self, func: Func) {
        self.functions.remove(func);
    }

    /// Iterate over the functions in the module.
    pub fn functions<'a>(&'a self) -> impl Iterator<Item = Func> + 'a {
        self.functions.keys()
    }

    /// Iterate over the functions in the module in parallel.
    pub fn par_functions_mut<'a>(
        &'a mut self,
    ) -> impl ParallelIterator<Item = &'a mut Function> + 'a {
        self.functions.storage.par_iter_mut().map(|(_, f)| f)
    }
}

impl std::fmt::Display for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut funcs: Vec<_> = self.functions.iter().collect();
        funcs.sort_by_key(|&(k, _)| k);
        for (i, (_, func)) in funcs.into_iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "{}", func)?;
        }
        Ok(())
    }
}
