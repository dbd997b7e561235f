//! Partial-update schema

use serde_json::Value;

use super::patient::{
    check_age, check_height, check_name, check_weight, parse_gender, Gender, PatientFields,
};
use crate::validation::{FieldReader, Presence, ValidationError};

/// Field-level patch; `None` leaves the stored value untouched
///
/// Explicit nulls are rejected while parsing: every record field is
/// non-nullable, so a null could never produce a valid merged record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientPatch {
    pub name: Option<String>,
    pub city: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<Gender>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
}

impl PatientPatch {
    /// Validate only the fields present in `input`
    ///
    /// Unknown keys (including `id`) are ignored.
    pub fn from_json(input: &Value) -> Result<Self, ValidationError> {
        let mut reader = FieldReader::new(input, Presence::Partial)?;

        let name = reader.string("name");
        let name = reader.keep(name, |s| check_name(s));
        let city = reader.string("city");
        let age = reader.integer("age");
        let age = reader.keep(age, |a| check_age(*a));
        let gender = match reader.string("gender").map(parse_gender) {
            Some(Ok(g)) => Some(g),
            Some(Err(violation)) => {
                reader.push(violation);
                None
            }
            None => None,
        };
        let height = reader.float("height");
        let height = reader.keep(height, |h| check_height(*h));
        let weight = reader.float("weight");
        let weight = reader.keep(weight, |w| check_weight(*w));

        reader.finish().into_result()?;

        Ok(Self {
            name: name.map(str::to_string),
            city: city.map(str::to_string),
            age: age.map(|a| a as u32),
            gender,
            height,
            weight,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.city.is_none()
            && self.age.is_none()
            && self.gender.is_none()
            && self.height.is_none()
            && self.weight.is_none()
    }

    /// Present fields overwrite, absent fields keep `current`
    pub fn apply(&self, current: &PatientFields) -> PatientFields {
        PatientFields {
            name: self.name.clone().unwrap_or_else(|| current.name.clone()),
            city: self.city.clone().unwrap_or_else(|| current.city.clone()),
            age: self.age.unwrap_or(current.age),
            gender: self.gender.unwrap_or(current.gender),
            height: self.height.unwrap_or(current.height),
            weight: self.weight.unwrap_or(current.weight),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ViolationKind;
    use serde_json::json;

    fn stored() -> PatientFields {
        PatientFields {
            name: "James Bond".into(),
            city: "London".into(),
            age: 40,
            gender: Gender::Male,
            height: 1.83,
            weight: 85.0,
        }
    }

    #[test]
    fn test_weight_only_patch() {
        let patch = PatientPatch::from_json(&json!({"weight": 90})).unwrap();
        let merged = patch.apply(&stored());
        assert_eq!(merged.weight, 90.0);
        assert_eq!(
            PatientFields {
                weight: 85.0,
                ..merged
            },
            stored()
        );
    }

    #[test]
    fn test_empty_patch_is_valid_noop() {
        let patch = PatientPatch::from_json(&json!({})).unwrap();
        assert!(patch.is_empty());
        assert_eq!(patch.apply(&stored()), stored());
    }

    #[test]
    fn test_present_fields_still_constrained() {
        let err = PatientPatch::from_json(&json!({
            "age": 0,
            "height": -2,
            "gender": "unknown",
            "city": null
        }))
        .unwrap_err();
        assert!(err.has("age", ViolationKind::OutOfRange));
        assert!(err.has("height", ViolationKind::OutOfRange));
        assert!(err.has("gender", ViolationKind::NotAllowed));
        assert!(err.has("city", ViolationKind::Null));
        assert_eq!(err.violations().len(), 4);
    }

    #[test]
    fn test_id_key_ignored() {
        let patch = PatientPatch::from_json(&json!({"id": "P999", "city": "Paris"})).unwrap();
        assert_eq!(patch.apply(&stored()).city, "Paris");
    }
}
