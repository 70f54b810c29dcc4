//! Reflection for dynamically typed JSON documents
//!
//! `null` is nil, arrays are sequences, objects are maps and everything else
//! is a leaf. Every number an `f64` holds exactly surfaces as `F64`, so the
//! float directives apply to `2` as well as `2.5`. Integers beyond 2^53 stay
//! `Int` or `Uint` to keep their value. A number that was written as an
//! integer is written back as one when the result is still integral.
//!
//! Copyright (c) 2025 Morph Team
//! Licensed under the Apache-2.0 license

use super::impls::rekey_drained;
use super::{EntryVisitor, Kind, Leaf, LeafSlot, Mapping, Reflect, ValueMut, ValueVisitor};
use crate::Result;
use serde_json::{Map, Number, Value};

/// Largest magnitude below which every integer is an exact `f64`
const EXACT_INTEGER: u64 = 1 << 53;

fn kind_of(value: &Value) -> Kind {
    match value {
        Value::Null => Kind::Nil,
        Value::Bool(_) => Kind::Bool,
        Value::Number(number) => number_leaf(number).kind(),
        Value::String(_) => Kind::String,
        Value::Array(_) => Kind::Slice,
        Value::Object(_) => Kind::Map,
    }
}

fn number_leaf(number: &Number) -> Leaf {
    if let Some(value) = number.as_i64() {
        if value.unsigned_abs() <= EXACT_INTEGER {
            Leaf::F64(value as f64)
        } else {
            Leaf::Int(value)
        }
    } else if let Some(value) = number.as_u64() {
        if value <= EXACT_INTEGER {
            Leaf::F64(value as f64)
        } else {
            Leaf::Uint(value)
        }
    } else {
        number.as_f64().map_or(Leaf::Opaque(Kind::F64), Leaf::F64)
    }
}

/// Store `value` as an integer when `previous` was one and nothing fractional
/// was introduced
fn float_number(previous: &Value, value: f64) -> Option<Value> {
    let was_integer = previous.is_i64() || previous.is_u64();
    if was_integer && value.fract() == 0.0 && value.abs() <= EXACT_INTEGER as f64 {
        return Some(Value::from(value as i64));
    }
    Number::from_f64(value).map(Value::Number)
}

impl LeafSlot for Value {
    fn kind(&self) -> Kind {
        kind_of(self)
    }

    fn take(&mut self) -> Leaf {
        match std::mem::take(self) {
            Value::Bool(value) => Leaf::Bool(value),
            Value::Number(number) => {
                let leaf = number_leaf(&number);
                *self = Value::Number(number);
                leaf
            }
            Value::String(value) => Leaf::String(value),
            other => {
                let kind = kind_of(&other);
                *self = other;
                Leaf::Opaque(kind)
            }
        }
    }

    fn store(&mut self, leaf: Leaf) -> std::result::Result<(), Kind> {
        *self = match leaf {
            Leaf::Bool(value) => Value::Bool(value),
            Leaf::Int(value) => Value::from(value),
            Leaf::Uint(value) => Value::from(value),
            Leaf::F32(value) => float_number(self, f64::from(value)).ok_or(Kind::F32)?,
            Leaf::F64(value) => float_number(self, value).ok_or(Kind::F64)?,
            Leaf::Char(value) => Value::String(value.to_string()),
            Leaf::String(value) => Value::String(value),
            Leaf::Opaque(kind) => {
                if kind == kind_of(self) {
                    return Ok(());
                }
                return Err(kind);
            }
        };
        Ok(())
    }
}

impl Reflect for Value {
    fn reflect_mut(&mut self) -> ValueMut<'_> {
        match self {
            Value::Null => ValueMut::Nil,
            Value::Array(items) => ValueMut::Sequence(items),
            Value::Object(entries) => ValueMut::Map(entries),
            _ => ValueMut::Leaf(self),
        }
    }

    fn is_untyped_nil(&self) -> bool {
        self.is_null()
    }
}

impl Mapping for Map<String, Value> {
    fn len(&self) -> usize {
        Map::len(self)
    }

    fn visit_values(&mut self, visit: &mut ValueVisitor<'_>) -> Result<()> {
        for value in self.values_mut() {
            visit(value)?;
        }
        Ok(())
    }

    fn rekey_entries(&mut self, visit: &mut EntryVisitor<'_>) -> Result<()> {
        let drained = std::mem::take(self);
        rekey_drained(drained, visit, |key, value| {
            self.insert(key, value);
        })
    }
}

impl Reflect for Map<String, Value> {
    fn reflect_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Map(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_categories() {
        let mut value = json!({"a": [1, "x", null, 1.5]});
        assert_eq!(value.reflect_mut().kind(), Kind::Map);

        let mut value = json!([1]);
        assert_eq!(value.reflect_mut().kind(), Kind::Slice);

        let mut value = json!(null);
        assert!(matches!(value.reflect_mut(), ValueMut::Nil));

        assert_eq!(kind_of(&json!(-3)), Kind::F64);
        assert_eq!(kind_of(&json!(i64::MIN)), Kind::Int);
        assert_eq!(kind_of(&json!(u64::MAX)), Kind::Uint);
        assert_eq!(kind_of(&json!(1.5)), Kind::F64);
    }

    #[test]
    fn test_integers_surface_as_floats() {
        let mut value = json!(2);
        assert_eq!(LeafSlot::take(&mut value), Leaf::F64(2.0));
        assert_eq!(value.store(Leaf::F64(2.0)), Ok(()));
        assert_eq!(value.to_string(), "2");

        assert_eq!(value.store(Leaf::F64(2.5)), Ok(()));
        assert_eq!(value, json!(2.5));

        let mut float = json!(3.0);
        assert_eq!(LeafSlot::take(&mut float), Leaf::F64(3.0));
        assert_eq!(float.store(Leaf::F64(3.0)), Ok(()));
        assert_eq!(float.to_string(), "3.0");
    }

    #[test]
    fn test_large_integers_keep_their_value() {
        let mut value = json!(u64::MAX);
        assert_eq!(LeafSlot::take(&mut value), Leaf::Uint(u64::MAX));
        assert_eq!(value.store(Leaf::Uint(u64::MAX)), Ok(()));
        assert_eq!(value, json!(u64::MAX));

        let mut value = json!(-9_007_199_254_740_993i64);
        assert_eq!(LeafSlot::take(&mut value), Leaf::Int(-9_007_199_254_740_993));
    }

    #[test]
    fn test_number_round_trip_through_leaf() {
        let mut value = json!(1.567);
        let leaf = LeafSlot::take(&mut value);
        assert_eq!(leaf, Leaf::F64(1.567));
        assert_eq!(value.store(Leaf::F64(1.56)), Ok(()));
        assert_eq!(value, json!(1.56));
    }

    #[test]
    fn test_nan_is_rejected() {
        let mut value = json!(1.0);
        assert_eq!(value.store(Leaf::F64(f64::NAN)), Err(Kind::F64));
    }
}
