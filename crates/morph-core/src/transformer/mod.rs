//! Transformer protocol and built-in transformers
//!
//! A transformer is the unit of work behind every non-navigation directive of
//! an annotation. The engine resolves directive names to transformers through
//! its registry, compiles their parameters once per annotation occurrence and
//! invokes them on working copies of leaf values.
//!
//! # Module Organization
//!
//! - [`types`] - The [`Transformer`] trait, parameter keys and the parameter store
//! - [`built_in`] - Text and floating point normalizations registered by default
//!
//! # Examples
//!
//! ```
//! use morph_core::{FnTransformer, Leaf, Morpher};
//!
//! let morpher = Morpher::new();
//! morpher
//!     .register("redact", FnTransformer::new(|value: &mut Leaf| {
//!         *value = Leaf::String("***".to_string());
//!         Ok(())
//!     }))
//!     .unwrap();
//!
//! let mut secret = serde_json::json!("hunter2");
//! morpher.apply(&mut secret, "redact").unwrap();
//! assert_eq!(secret, "***");
//! ```
//!
//! Copyright (c) 2025 Morph Team
//! Licensed under the Apache-2.0 license

pub mod built_in;
pub mod types;


pub use types::{parse_param, FnTransformer, KeyOwner, ParamTable, ParamsKey, Transformer};
