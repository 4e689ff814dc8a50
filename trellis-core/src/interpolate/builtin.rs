//! Generic interpolators.
//!
//! Each returns `None` when it cannot handle the pair, so the dispatcher can
//! try the next one. Array and object interpolators recurse element-wise
//! through the same generic chain; pairs nothing understands snap.

use std::sync::Arc;

use serde_json::{Map, Number, Value};

use super::{snap, Interpolator};

/// Largest integer an f64 holds exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Number, then array, then object. First match wins.
pub(crate) fn generic(from: &Value, to: &Value) -> Option<Interpolator> {
    number(from, to)
        .or_else(|| array(from, to))
        .or_else(|| object(from, to))
}

/// Interpolator for one member of a compound value. Never fails.
fn member(from: &Value, to: &Value) -> Interpolator {
    if from == to {
        return snap(to.clone());
    }
    generic(from, to).unwrap_or_else(|| snap(to.clone()))
}

/// Linear interpolation between two numbers.
///
/// Numeric strings (`"12.5"`) count as numbers. Uses the two-product form so
/// both endpoints come out exact. Results are JSON integers only when both
/// endpoints are integers, so a float target such as `2.0` stays a float.
pub fn number(from: &Value, to: &Value) -> Option<Interpolator> {
    let start = as_number(from)?;
    let end = as_number(to)?;

    if start.value == end.value {
        let value = to.clone();
        return Some(Arc::new(move |_: f64| value.clone()));
    }

    let integral = start.integral && end.integral;
    let (start, end) = (start.value, end.value);
    Some(Arc::new(move |t: f64| {
        number_value(start * (1.0 - t) + end * t, integral)
    }))
}

/// Element-wise interpolation between two arrays.
///
/// Elements past the shorter array are carried through unchanged.
pub fn array(from: &Value, to: &Value) -> Option<Interpolator> {
    let (Value::Array(from), Value::Array(to)) = (from, to) else {
        return None;
    };

    let shared = from.len().min(to.len());
    let parts: Vec<Interpolator> = from
        .iter()
        .zip(to.iter())
        .map(|(a, b)| member(a, b))
        .collect();
    let surplus: Vec<Value> = if from.len() > shared {
        from[shared..].to_vec()
    } else {
        to[shared..].to_vec()
    };

    Some(Arc::new(move |t: f64| {
        let mut out: Vec<Value> = parts.iter().map(|part| part(t)).collect();
        out.extend(surplus.iter().cloned());
        Value::Array(out)
    }))
}

/// Per-key interpolation between two objects.
///
/// Keys present on only one side are carried through unchanged.
pub fn object(from: &Value, to: &Value) -> Option<Interpolator> {
    let (Value::Object(from), Value::Object(to)) = (from, to) else {
        return None;
    };

    let mut parts: Vec<(String, Interpolator)> = Vec::new();
    let mut carried = Map::new();

    for (key, a) in from {
        match to.get(key) {
            Some(b) => parts.push((key.clone(), member(a, b))),
            None => {
                carried.insert(key.clone(), a.clone());
            }
        }
    }
    for (key, b) in to {
        if !from.contains_key(key) {
            carried.insert(key.clone(), b.clone());
        }
    }

    Some(Arc::new(move |t: f64| {
        let mut out = carried.clone();
        for (key, part) in &parts {
            out.insert(key.clone(), part(t));
        }
        Value::Object(out)
    }))
}

/// A numeric endpoint and whether it was written as an integer.
struct Endpoint {
    value: f64,
    integral: bool,
}

fn as_number(value: &Value) -> Option<Endpoint> {
    match value {
        Value::Number(n) => Some(Endpoint {
            value: n.as_f64()?,
            integral: n.is_i64() || n.is_u64(),
        }),
        Value::String(s) => {
            let s = s.trim();
            let value = s.parse::<f64>().ok().filter(|n| n.is_finite())?;
            Some(Endpoint {
                value,
                integral: s.parse::<i64>().is_ok(),
            })
        }
        _ => None,
    }
}

/// Between integer endpoints, integral results become JSON integers so
/// `t = 1` reproduces an integer target exactly. Everything else stays a
/// float.
fn number_value(n: f64, integral: bool) -> Value {
    if integral && n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        Value::from(n as i64)
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn number_hits_both_endpoints() {
        let lerp = number(&json!(0.1), &json!(0.3)).unwrap();
        assert_eq!(lerp(0.0), json!(0.1));
        assert_eq!(lerp(1.0), json!(0.3));
    }

    #[test]
    fn float_endpoints_stay_floats() {
        let from = json!(0.0);
        let to = json!(2.0);
        let lerp = number(&from, &to).unwrap();

        assert!(lerp(0.0) == from);
        assert!(lerp(1.0) == to);
        assert_eq!(lerp(0.5), json!(1.0));

        // Mixed integer and float endpoints interpolate as floats.
        let mixed = number(&json!(0), &json!(4.0)).unwrap();
        assert_eq!(mixed(0.5), json!(2.0));
    }

    #[test]
    fn equal_numbers_of_different_types_yield_the_target() {
        let lerp = number(&json!(1), &json!(1.0)).unwrap();
        assert_eq!(lerp(0.0), json!(1.0));
        assert_eq!(lerp(1.0), json!(1.0));
    }

    #[test]
    fn number_accepts_numeric_strings() {
        let lerp = number(&json!("10"), &json!(20)).unwrap();
        assert_eq!(lerp(0.5), json!(15));
        assert!(number(&json!("10px"), &json!(20)).is_none());
        assert!(number(&json!(""), &json!(20)).is_none());
    }

    #[test]
    fn equal_numbers_are_constant() {
        let lerp = number(&json!("5"), &json!(5)).unwrap();
        assert_eq!(lerp(0.0), json!(5));
        assert_eq!(lerp(0.7), json!(5));
    }

    #[test]
    fn array_carries_surplus() {
        let longer_to = array(&json!([0, 0]), &json!([10, 20, 30])).unwrap();
        assert_eq!(longer_to(0.5), json!([5, 10, 30]));

        let longer_from = array(&json!([0, 0, "x"]), &json!([10, 20])).unwrap();
        assert_eq!(longer_from(1.0), json!([10, 20, "x"]));
    }

    #[test]
    fn array_members_that_cannot_interpolate_snap() {
        let lerp = array(&json!(["a", 0]), &json!(["b", 4])).unwrap();
        assert_eq!(lerp(0.25), json!(["b", 1]));
    }

    #[test]
    fn object_interpolates_shared_keys() {
        let lerp = object(
            &json!({ "x": 0, "only_from": true }),
            &json!({ "x": 100, "only_to": "yes" }),
        )
        .unwrap();

        assert_eq!(
            lerp(0.5),
            json!({ "x": 50, "only_from": true, "only_to": "yes" })
        );
    }

    #[test]
    fn nested_structures_recurse() {
        let lerp = generic(
            &json!({ "points": [{ "x": 0 }, { "x": 10 }] }),
            &json!({ "points": [{ "x": 10 }, { "x": 20 }] }),
        )
        .unwrap();

        assert_eq!(lerp(0.5), json!({ "points": [{ "x": 5 }, { "x": 15 }] }));
    }

    #[test]
    fn mismatched_kinds_are_declined() {
        assert!(generic(&json!([1]), &json!({ "a": 1 })).is_none());
        assert!(generic(&json!("a"), &json!("b")).is_none());
        assert!(generic(&json!(null), &json!(1)).is_none());
    }
}
