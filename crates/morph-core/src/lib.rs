//! Morph Core - Annotation-driven in-place normalization of nested records
//!
//! Record fields carry short annotations such as `"trim,lower"` or
//! `"dive,keys,trim,exit,upper"`. A [`Morpher`] compiles each annotation once
//! per record shape and applies it to live values, diving into sequences and
//! maps and recursing into nested records on the way.
//!
//! # Main Components
//!
//! - **Reflection**: A closed set of value categories every walkable type maps onto
//! - **Transformers**: The `cache`/`transform` protocol and the built-in normalizations
//! - **Chains**: Compiled annotations with their embedded key sub-chains
//! - **Engine**: Shape descriptor cache and traversal behind [`Morpher`]
//!
//! # Example
//!
//! ```
//! use morph_core::{Morpher, Record};
//! use std::collections::HashMap;
//!
//! #[derive(Record)]
//! struct Inventory {
//!     #[morph("dive,keys,trim,upper,exit,precision=2")]
//!     pub prices: HashMap<String, f64>,
//! }
//!
//! let mut inventory = Inventory {
//!     prices: HashMap::from([(" apple ".to_string(), 1.567)]),
//! };
//!
//! Morpher::new().morph(&mut inventory)?;
//! assert_eq!(inventory.prices.get("APPLE"), Some(&1.56));
//! # Ok::<(), morph_core::Error>(())
//! ```

// Lets the derive macro's `::morph_core` paths resolve inside this crate too.
extern crate self as morph_core;

mod cache;
pub mod chain;
pub mod config;
pub mod engine;
pub mod error;
pub mod reflect;
pub mod transformer;

pub use chain::{Chain, Instruction, DEFAULT_TAG};
pub use config::MorphConfig;
pub use engine::Morpher;
pub use error::{Error, ErrorCategory, Result};
pub use reflect::{
    FieldInfo, Kind, Leaf, LeafSlot, Mapping, Record, Reflect, Sequence, Shape, ShapeId, ValueMut,
};
pub use transformer::{FnTransformer, KeyOwner, ParamTable, ParamsKey, Transformer};

#[cfg(feature = "derive")]
pub use morph_derive::Record;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
