//! Built-in transformers for common normalizations
//!
//! Text: `trim`, `lower`, `upper`, `truncate=N`.
//! Floating point: `ceil`, `floor`, `round`, `precision=N`.
//!
//! Copyright (c) 2025 Morph Team
//! Licensed under the Apache-2.0 license

use super::types::{parse_param, ParamTable, ParamsKey, Transformer};
use crate::reflect::Leaf;
use crate::{Error, Result};
use std::sync::Arc;

pub const TAG_TRIM: &str = "trim";
pub const TAG_LOWER: &str = "lower";
pub const TAG_UPPER: &str = "upper";
pub const TAG_TRUNCATE: &str = "truncate";
pub const TAG_CEIL: &str = "ceil";
pub const TAG_FLOOR: &str = "floor";
pub const TAG_ROUND: &str = "round";
pub const TAG_PRECISION: &str = "precision";

/// Smallest magnitude at which every `f64` is an integer
const INTEGRAL_FLOOR: f64 = 4_503_599_627_370_496.0;

/// Every built-in transformer under its directive name
pub fn defaults() -> Vec<(&'static str, Arc<dyn Transformer>)> {
    vec![
        (TAG_TRIM, Arc::new(Trim)),
        (TAG_LOWER, Arc::new(Lower)),
        (TAG_UPPER, Arc::new(Upper)),
        (TAG_TRUNCATE, Arc::new(Truncate::default())),
        (TAG_CEIL, Arc::new(Ceil)),
        (TAG_FLOOR, Arc::new(Floor)),
        (TAG_ROUND, Arc::new(Round)),
        (TAG_PRECISION, Arc::new(Precision::default())),
    ]
}

fn text<'v>(value: &'v mut Leaf, tag: &str) -> Result<&'v mut String> {
    match value {
        Leaf::String(text) => Ok(text),
        other => Err(Error::unexpected_value(other.kind(), tag)),
    }
}

/// Apply `op` to a float leaf of either width
fn float(value: &mut Leaf, tag: &str, op: impl Fn(f64) -> f64) -> Result<()> {
    match value {
        Leaf::F64(number) => *number = op(*number),
        Leaf::F32(number) => *number = op(f64::from(*number)) as f32,
        other => return Err(Error::unexpected_value(other.kind(), tag)),
    }
    Ok(())
}

/// Removes leading and trailing whitespace
#[derive(Debug, Default)]
pub struct Trim;

impl Transformer for Trim {
    fn cache(&self, _params: &str, _key: &ParamsKey) -> Result<()> {
        Ok(())
    }

    fn transform(&self, value: &mut Leaf, _key: &ParamsKey) -> Result<()> {
        let text = text(value, TAG_TRIM)?;
        let trimmed = text.trim();
        if trimmed.len() != text.len() {
            *text = trimmed.to_string();
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct Lower;

impl Transformer for Lower {
    fn cache(&self, _params: &str, _key: &ParamsKey) -> Result<()> {
        Ok(())
    }

    fn transform(&self, value: &mut Leaf, _key: &ParamsKey) -> Result<()> {
        let text = text(value, TAG_LOWER)?;
        *text = text.to_lowercase();
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct Upper;

impl Transformer for Upper {
    fn cache(&self, _params: &str, _key: &ParamsKey) -> Result<()> {
        Ok(())
    }

    fn transform(&self, value: &mut Leaf, _key: &ParamsKey) -> Result<()> {
        let text = text(value, TAG_UPPER)?;
        *text = text.to_uppercase();
        Ok(())
    }
}

/// Cuts text down to at most `N` characters
#[derive(Debug, Default)]
pub struct Truncate {
    limits: ParamTable<usize>,
}

impl Transformer for Truncate {
    fn cache(&self, params: &str, key: &ParamsKey) -> Result<()> {
        let limit = parse_param(params, TAG_TRUNCATE)?;
        self.limits.insert(key, limit);
        Ok(())
    }

    fn transform(&self, value: &mut Leaf, key: &ParamsKey) -> Result<()> {
        let text = text(value, TAG_TRUNCATE)?;
        let limit = self.limits.require(key, TAG_TRUNCATE)?;
        if let Some((cut, _)) = text.char_indices().nth(limit) {
            text.truncate(cut);
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct Ceil;

impl Transformer for Ceil {
    fn cache(&self, _params: &str, _key: &ParamsKey) -> Result<()> {
        Ok(())
    }

    fn transform(&self, value: &mut Leaf, _key: &ParamsKey) -> Result<()> {
        float(value, TAG_CEIL, f64::ceil)
    }
}

#[derive(Debug, Default)]
pub struct Floor;

impl Transformer for Floor {
    fn cache(&self, _params: &str, _key: &ParamsKey) -> Result<()> {
        Ok(())
    }

    fn transform(&self, value: &mut Leaf, _key: &ParamsKey) -> Result<()> {
        float(value, TAG_FLOOR, f64::floor)
    }
}

/// Rounds half away from zero
#[derive(Debug, Default)]
pub struct Round;

impl Transformer for Round {
    fn cache(&self, _params: &str, _key: &ParamsKey) -> Result<()> {
        Ok(())
    }

    fn transform(&self, value: &mut Leaf, _key: &ParamsKey) -> Result<()> {
        float(value, TAG_ROUND, f64::round)
    }
}

/// Keeps at most `N` decimal digits, truncating toward zero
#[derive(Debug, Default)]
pub struct Precision {
    digits: ParamTable<u32>,
}

impl Precision {
    /// Truncate `number` to `digits` decimals.
    ///
    /// `epsilon` is the machine epsilon of the stored width. A scaled value
    /// within a few epsilons of an integer is snapped to it, so `1.16` stays
    /// `1.16` instead of becoming `1.15` through `115.99999999999999`.
    fn truncate(number: f64, digits: u32, epsilon: f64) -> f64 {
        // Beyond this every finite f64 is already exact.
        if digits > 17 || !number.is_finite() {
            return number;
        }
        let factor = 10f64.powi(digits as i32);
        let scaled = number * factor;
        // From 2^52 on a float has no fractional part left to drop, and an
        // overflowed product must not replace a finite value.
        if !scaled.is_finite() || scaled.abs() >= INTEGRAL_FLOOR {
            return number;
        }
        let nearest = scaled.round();
        let tolerance = scaled.abs().max(1.0) * epsilon * 4.0;
        let kept = if (scaled - nearest).abs() <= tolerance {
            nearest
        } else {
            scaled.trunc()
        };
        kept / factor
    }
}

impl Transformer for Precision {
    fn cache(&self, params: &str, key: &ParamsKey) -> Result<()> {
        let digits = parse_param(params, TAG_PRECISION)?;
        self.digits.insert(key, digits);
        Ok(())
    }

    fn transform(&self, value: &mut Leaf, key: &ParamsKey) -> Result<()> {
        let digits = match value {
            Leaf::F32(_) | Leaf::F64(_) => self.digits.require(key, TAG_PRECISION)?,
            other => return Err(Error::unexpected_value(other.kind(), TAG_PRECISION)),
        };

        match value {
            Leaf::F64(number) => *number = Self::truncate(*number, digits, f64::EPSILON),
            Leaf::F32(number) => {
                *number = Self::truncate(f64::from(*number), digits, f64::from(f32::EPSILON)) as f32
            }
            _ => {}
        }
        Ok(())
    }
}
