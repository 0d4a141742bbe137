// Copyright (c) 2025-2026 the ssapre authors

//! Types of values.

use std::sync::Arc;

/// A type.
pub type Type = Arc<TypeKind>;

/// The different kinds of types.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TypeKind {
    /// The `void` type.
    VoidType,
    /// Integer types like `i32`.
    IntType(usize),
    /// Pointer types like `i32*`.
    PointerType(Type),
}

pub use self::TypeKind::*;

impl std::fmt::Display for TypeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            VoidType => write!(f, "void"),
            IntType(w) => write!(f, "i{}", w),
            PointerType(ref ty) => write!(f, "{}*", ty),
        }
    }
}

impl TypeKind {
    /// Check if this is a void type.
    pub fn is_void(&self) -> bool {
        match *self {
            VoidType => true,
            _ => false,
        }
    }

    /// Check if this is an integer type.
    pub fn is_int(&self) -> bool {
        match *self {
            IntType(..) => true,
            _ => false,
        }
    }

    /// Check if this is a pointer type.
    pub fn is_pointer(&self) -> bool {
        match *self {
            PointerType(..) => true,
            _ => false,
        }
    }

    /// Unwrap the width of an integer type, or panic.
    pub fn unwrap_int(&self) -> usize {
        match *self {
            IntType(w) => w,
            _ => panic!("unwrap_int called on {}", self),
        }
    }

    /// Unwrap the pointee of a pointer type, or panic.
    pub fn unwrap_pointer(&self) -> &Type {
        match *self {
            PointerType(ref ty) => ty,
            _ => panic!("unwrap_pointer called on {}", self),
        }
    }
}

/// Create a void type.
pub fn void_ty() -> Type {
    Arc::new(VoidType)
}

/// Create an integer type of the given width.
pub fn int_ty(width: usize) -> Type {
    Arc::new(IntType(width))
}

/// Create a pointer type to the given pointee.
pub fn pointer_ty(ty: Type) -> Type {
    Arc::new(PointerType(ty))
}
