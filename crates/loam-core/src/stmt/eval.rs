//! In-memory filter evaluation.
//!
//! Filter fragments the query translator cannot push into SQL are applied
//! here, against fully materialized features. Missing or unmapped properties
//! evaluate to `Null`, so a residual predicate behaves like its SQL
//! counterpart would if the column existed.

use super::{Expr, Path, Value};
use crate::feature::{Feature, Geometry, PropertyValue};
use crate::{Error, Result};

use std::cmp::Ordering;

impl Expr {
    /// Evaluates the filter against a materialized feature.
    pub fn eval(&self, feature: &Feature) -> Result<bool> {
        match self {
            Expr::And(expr) => {
                for operand in &expr.operands {
                    if !operand.eval(feature)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Expr::Or(expr) => {
                for operand in &expr.operands {
                    if operand.eval(feature)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Expr::Not(expr) => Ok(!expr.operand.eval(feature)?),
            Expr::BinaryOp(expr) => {
                let lhs = eval_scalar(&expr.lhs, feature)?;
                let rhs = eval_scalar(&expr.rhs, feature)?;
                if lhs.is_null() || rhs.is_null() {
                    return Ok(false);
                }
                let Some(ord) = lhs.compare(&rhs) else {
                    return Ok(false);
                };
                Ok(match expr.op {
                    super::BinaryOp::Eq => ord == Ordering::Equal,
                    super::BinaryOp::Ne => ord != Ordering::Equal,
                    super::BinaryOp::Ge => ord != Ordering::Less,
                    super::BinaryOp::Gt => ord == Ordering::Greater,
                    super::BinaryOp::Le => ord != Ordering::Greater,
                    super::BinaryOp::Lt => ord == Ordering::Less,
                })
            }
            Expr::Between(expr) => {
                let value = eval_scalar(&expr.expr, feature)?;
                let low = eval_scalar(&expr.low, feature)?;
                let high = eval_scalar(&expr.high, feature)?;
                if value.is_null() {
                    return Ok(false);
                }
                let ge_low = matches!(
                    value.compare(&low),
                    Some(Ordering::Greater | Ordering::Equal)
                );
                let le_high = matches!(value.compare(&high), Some(Ordering::Less | Ordering::Equal));
                Ok(ge_low && le_high)
            }
            Expr::IsNull(expr) => {
                let value = property_value(feature, &expr.property);
                Ok(value.is_null() != expr.negate)
            }
            Expr::Like(expr) => {
                let value = property_value(feature, &expr.property);
                match value.as_str() {
                    Some(input) => Ok(expr.matches(input)),
                    None => Ok(false),
                }
            }
            Expr::Bbox(expr) => {
                // Without a property the predicate tests the feature's
                // overall envelope, matching what the indexed bounding-box
                // columns hold in BLOB-backed storage.
                let envelope = match &expr.property {
                    None => feature.envelope(),
                    Some(path) => {
                        property_geometry(feature, Some(path)).and_then(|g| g.envelope)
                    }
                };
                Ok(match envelope {
                    Some(envelope) => envelope.intersects(&expr.envelope),
                    None => false,
                })
            }
            Expr::Value(Value::Bool(value)) => Ok(*value),
            Expr::Value(value) => Err(Error::type_conversion(value.variant_name(), "bool")),
            Expr::Property(expr) => property_value(feature, &expr.path).to_bool(),
        }
    }
}

fn eval_scalar(expr: &Expr, feature: &Feature) -> Result<Value> {
    match expr {
        Expr::Value(value) => Ok(value.clone()),
        Expr::Property(prop) => Ok(property_value(feature, &prop.path)),
        _ => Err(crate::err!(
            "expected a scalar operand, found {expr:?}"
        )),
    }
}

/// Resolves a property path against an in-memory feature.
///
/// Returns the first matching property's scalar projection. Feature
/// references project to their id, geometries and structured values without
/// a deeper path project to `Null`, and missing properties project to
/// `Null`.
pub fn property_value(feature: &Feature, path: &Path) -> Value {
    properties_value(&feature.properties, path.segments())
}

fn properties_value(properties: &[crate::feature::Property], segments: &[String]) -> Value {
    let [first, rest @ ..] = segments else {
        return Value::Null;
    };

    for property in properties {
        if property.name != *first {
            continue;
        }
        return match (&property.value, rest.is_empty()) {
            (PropertyValue::Primitive(value), true) => value.clone(),
            (PropertyValue::Feature(feature_ref), true) => match feature_ref.id() {
                Some(id) => Value::String(id.as_str().to_string()),
                None => Value::Null,
            },
            (PropertyValue::Complex(children), false) => properties_value(children, rest),
            _ => Value::Null,
        };
    }

    Value::Null
}

fn property_geometry<'a>(feature: &'a Feature, path: Option<&Path>) -> Option<&'a Geometry> {
    let Some(path) = path else {
        return feature.geometry();
    };

    let (first, rest) = path.split_first()?;
    if !rest.is_empty() {
        // Structured geometry paths resolve one level at a time
        for property in &feature.properties {
            if property.name == first {
                if let PropertyValue::Complex(children) = &property.value {
                    return children.iter().find_map(|p| match &p.value {
                        PropertyValue::Geometry(g) if p.name == rest[0] => Some(g),
                        _ => None,
                    });
                }
            }
        }
        return None;
    }

    feature.properties.iter().find_map(|p| match &p.value {
        PropertyValue::Geometry(g) if p.name == first => Some(g),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::{Crs, Envelope};

    fn road() -> Feature {
        let mut feature = Feature::new("Road").with_id("ROAD_1");
        feature.push_property("name", PropertyValue::Primitive(Value::from("Main Street")));
        feature.push_property("lanes", PropertyValue::Primitive(Value::I32(4)));
        feature.push_property(
            "geom",
            PropertyValue::Geometry(Geometry {
                id: None,
                data: vec![1, 2, 3],
                crs: Crs::new("EPSG:4326"),
                envelope: Some(Envelope::new(0.0, 0.0, 10.0, 10.0)),
            }),
        );
        feature.push_property(
            "address",
            PropertyValue::Complex(vec![crate::feature::Property {
                name: "city".to_string(),
                value: PropertyValue::Primitive(Value::from("Bonn")),
            }]),
        );
        feature
    }

    #[test]
    fn eq_on_property() {
        let filter = Expr::eq(Expr::property("name"), Expr::value("Main Street"));
        assert!(filter.eval(&road()).unwrap());
    }

    #[test]
    fn missing_property_is_null_and_never_matches() {
        let filter = Expr::eq(Expr::property("note"), Expr::value("x"));
        assert!(!filter.eval(&road()).unwrap());

        let filter = Expr::is_null("note");
        assert!(filter.eval(&road()).unwrap());
    }

    #[test]
    fn dotted_path_reaches_into_complex() {
        let filter = Expr::eq(Expr::property("address.city"), Expr::value("Bonn"));
        assert!(filter.eval(&road()).unwrap());
    }

    #[test]
    fn between_inclusive() {
        let filter = Expr::between(Expr::property("lanes"), Expr::value(4), Expr::value(6));
        assert!(filter.eval(&road()).unwrap());

        let filter = Expr::between(Expr::property("lanes"), Expr::value(5), Expr::value(6));
        assert!(!filter.eval(&road()).unwrap());
    }

    #[test]
    fn bbox_against_geometry_envelope() {
        let filter = Expr::bbox(Envelope::new(5.0, 5.0, 15.0, 15.0));
        assert!(filter.eval(&road()).unwrap());

        let filter = Expr::bbox(Envelope::new(11.0, 11.0, 15.0, 15.0));
        assert!(!filter.eval(&road()).unwrap());
    }
}
