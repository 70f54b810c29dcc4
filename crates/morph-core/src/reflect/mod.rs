//! Runtime view over live values
//!
//! The engine never branches on concrete types. Every value it touches is seen
//! through [`Reflect::reflect_mut`], which yields a [`ValueMut`] handle in one of
//! a closed set of categories: a record, a sequence, a map, a leaf, a wrapper
//! to unwrap, or nil.
//!
//! Leaves are never aliased directly. A transformer works on an owned [`Leaf`]
//! taken out of its [`LeafSlot`] and the result is stored back afterwards, which
//! is also how values living inside map storage get rewritten.
//!
//! Copyright (c) 2025 Morph Team
//! Licensed under the Apache-2.0 license

mod impls;
mod json;

use crate::Result;
use std::any::TypeId;
use std::fmt;

/// Runtime category of a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Bool,
    Int,
    Uint,
    F32,
    F64,
    Char,
    String,
    /// A record with named fields
    Struct,
    Slice,
    Array,
    Map,
    Nil,
}

impl Kind {
    /// Lowercase name used in error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Uint => "uint",
            Kind::F32 => "f32",
            Kind::F64 => "f64",
            Kind::Char => "char",
            Kind::String => "string",
            Kind::Struct => "struct",
            Kind::Slice => "slice",
            Kind::Array => "array",
            Kind::Map => "map",
            Kind::Nil => "nil",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Owned working copy of a value handed to transformers
#[derive(Debug, Clone, PartialEq)]
pub enum Leaf {
    Bool(bool),
    Int(i64),
    Uint(u64),
    F32(f32),
    F64(f64),
    Char(char),
    String(String),
    /// A container reached without `dive`. Transformers can only reject it.
    Opaque(Kind),
}

impl Leaf {
    /// Runtime category of this leaf
    pub fn kind(&self) -> Kind {
        match self {
            Leaf::Bool(_) => Kind::Bool,
            Leaf::Int(_) => Kind::Int,
            Leaf::Uint(_) => Kind::Uint,
            Leaf::F32(_) => Kind::F32,
            Leaf::F64(_) => Kind::F64,
            Leaf::Char(_) => Kind::Char,
            Leaf::String(_) => Kind::String,
            Leaf::Opaque(kind) => *kind,
        }
    }

    /// Borrow the text of a string leaf
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Leaf::String(value) => Some(value),
            _ => None,
        }
    }
}

/// Storage location of a leaf value
pub trait LeafSlot {
    /// Category of the stored value
    fn kind(&self) -> Kind;

    /// Move the stored value out into a working copy
    fn take(&mut self) -> Leaf;

    /// Write a working copy back.
    ///
    /// Fails with the kind of the rejected leaf when it does not fit this slot.
    fn store(&mut self, leaf: Leaf) -> std::result::Result<(), Kind>;
}

/// Ordered, indexable collection
pub trait Sequence {
    /// `Slice` for growable sequences, `Array` for fixed-size ones
    fn kind(&self) -> Kind {
        Kind::Slice
    }

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn element_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;
}

/// Visitor over map values
pub type ValueVisitor<'v> = dyn FnMut(&mut dyn Reflect) -> Result<()> + 'v;

/// Visitor over whole map entries, key first
pub type EntryVisitor<'v> = dyn FnMut(&mut dyn Reflect, &mut dyn Reflect) -> Result<()> + 'v;

/// Associative container
pub trait Mapping {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Visit every value in place, keys untouched. Stops at the first error.
    fn visit_values(&mut self, visit: &mut ValueVisitor<'_>) -> Result<()>;

    /// Remove every entry, hand key and value to `visit`, then reinsert the
    /// entry under its possibly rewritten key.
    ///
    /// Each original entry is visited exactly once, even when a key is
    /// renamed to one that was already visited. On error the failing entry
    /// and all unvisited entries are reinserted before returning.
    fn rekey_entries(&mut self, visit: &mut EntryVisitor<'_>) -> Result<()>;
}

/// A record shape with positional field access
pub trait Record {
    fn shape(&self) -> Shape;

    /// Live handle to the field at `index`, or `None` for unexported fields
    fn field_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;
}

/// Anything the engine can walk
pub trait Reflect {
    fn reflect_mut(&mut self) -> ValueMut<'_>;

    /// Whether this is a nil of no particular type, such as `()` or JSON
    /// `null`, as opposed to an empty `Option`
    fn is_untyped_nil(&self) -> bool {
        false
    }
}

/// Live handle to the value currently being visited
pub enum ValueMut<'a> {
    /// Absent value: `None`, JSON `null`, `()`
    Nil,
    /// Optional, boxed or dynamically-typed wrapper around another value
    Indirect(&'a mut dyn Reflect),
    Record(&'a mut dyn Record),
    Sequence(&'a mut dyn Sequence),
    Map(&'a mut dyn Mapping),
    Leaf(&'a mut dyn LeafSlot),
}

impl<'a> ValueMut<'a> {
    /// Follow wrappers until a concrete value or nil is reached
    pub fn resolve(self) -> ValueMut<'a> {
        match self {
            ValueMut::Indirect(inner) => inner.reflect_mut().resolve(),
            other => other,
        }
    }

    /// Category of a resolved handle. Unresolved wrappers report `Nil`.
    pub fn kind(&self) -> Kind {
        match self {
            ValueMut::Nil | ValueMut::Indirect(_) => Kind::Nil,
            ValueMut::Record(_) => Kind::Struct,
            ValueMut::Sequence(sequence) => sequence.kind(),
            ValueMut::Map(_) => Kind::Map,
            ValueMut::Leaf(slot) => slot.kind(),
        }
    }
}

impl fmt::Debug for ValueMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueMut::Indirect(_) => write!(f, "ValueMut::Indirect"),
            other => write!(f, "ValueMut({})", other.kind()),
        }
    }
}

/// Stable identity of a record shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeId(TypeId);

impl ShapeId {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self(TypeId::of::<T>())
    }
}

/// Static description of a record shape
#[derive(Debug, Clone, Copy)]
pub struct Shape {
    id: ShapeId,
    name: &'static str,
    fields: &'static [FieldInfo],
}

impl Shape {
    /// Describe the record type `T`
    pub fn of<T: ?Sized + 'static>(name: &'static str, fields: &'static [FieldInfo]) -> Self {
        Self {
            id: ShapeId::of::<T>(),
            name,
            fields,
        }
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Fields in declaration order, exported or not
    pub fn fields(&self) -> &'static [FieldInfo] {
        self.fields
    }
}

/// Static description of one record field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldInfo {
    pub name: &'static str,
    pub index: usize,
    pub exported: bool,
    /// `(key, annotation)` pairs attached to the field
    pub tags: &'static [(&'static str, &'static str)],
}

impl FieldInfo {
    pub const fn new(
        name: &'static str,
        index: usize,
        exported: bool,
        tags: &'static [(&'static str, &'static str)],
    ) -> Self {
        Self {
            name,
            index,
            exported,
            tags,
        }
    }

    /// Annotation stored under `key`, first one wins
    pub fn tag(&self, key: &str) -> Option<&'static str> {
        self.tags
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| *value)
    }
}
