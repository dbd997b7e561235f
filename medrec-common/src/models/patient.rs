//! Patient record schema
//!
//! A [`Patient`] can only be obtained through validation, so holding one means
//! every field constraint holds. The stored shape is [`PatientFields`]; the
//! response shape with derived values is [`PatientView`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::derived::{self, Verdict};
use crate::error::DomainError;
use crate::validation::{
    check_gt, check_int_between, check_length, FieldReader, Presence, ValidationError, Violation,
    ViolationKind, Violations,
};

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 50;
/// Exclusive bounds
pub const AGE_GT: i64 = 0;
pub const AGE_LT: i64 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Others,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Others];

    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Others => "others",
        }
    }

    pub fn parse(value: &str) -> Option<Gender> {
        Gender::ALL.into_iter().find(|g| g.as_str() == value)
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// Per-field rules, shared with the partial-update schema

pub(crate) fn check_id(id: &str) -> Option<Violation> {
    if id.trim().is_empty() {
        Some(Violation::new("id", ViolationKind::Length, "id may not be blank"))
    } else {
        None
    }
}

pub(crate) fn check_name(name: &str) -> Option<Violation> {
    check_length("name", name, NAME_MIN_CHARS, NAME_MAX_CHARS)
}

pub(crate) fn check_age(age: i64) -> Option<Violation> {
    check_int_between("age", age, AGE_GT, AGE_LT)
}

pub(crate) fn check_height(height: f64) -> Option<Violation> {
    check_gt("height", height, 0.0)
}

pub(crate) fn check_weight(weight: f64) -> Option<Violation> {
    check_gt("weight", weight, 0.0)
}

pub(crate) fn parse_gender(value: &str) -> Result<Gender, Violation> {
    Gender::parse(value).ok_or_else(|| {
        Violation::new(
            "gender",
            ViolationKind::NotAllowed,
            format!("'{}' is not one of [male, female, others]", value),
        )
    })
}

/// Persisted fields of a record: everything except the id and derived values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientFields {
    pub name: String,
    pub city: String,
    pub age: u32,
    pub gender: Gender,
    /// Meters
    pub height: f64,
    /// Kilograms
    pub weight: f64,
}

impl PatientFields {
    /// Check every typed constraint, reporting all failures
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut violations = Violations::new();
        violations.push_opt(check_name(&self.name));
        violations.push_opt(check_age(i64::from(self.age)));
        violations.push_opt(check_height(self.height));
        violations.push_opt(check_weight(self.weight));
        violations.into_result()
    }
}

/// A validated patient record
#[derive(Debug, Clone, PartialEq)]
pub struct Patient {
    id: String,
    fields: PatientFields,
}

impl Patient {
    /// Validate typed fields into a record
    pub fn new(id: impl Into<String>, fields: PatientFields) -> Result<Self, ValidationError> {
        let id = id.into();
        let mut violations = Violations::new();
        violations.push_opt(check_id(&id));
        if let Err(e) = fields.validate() {
            for v in e.into_violations() {
                violations.push(v);
            }
        }
        violations.into_result()?;
        Ok(Self { id, fields })
    }

    /// Build from untyped JSON, reporting every violation at once
    pub fn from_json(input: &Value) -> Result<Self, ValidationError> {
        let mut reader = FieldReader::new(input, Presence::Required)?;

        let id = reader.string("id");
        let id = reader.keep(id, |s| check_id(s));
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

        let violations = reader.finish();
        let (Some(id), Some(name), Some(city), Some(age), Some(gender), Some(height), Some(weight)) =
            (id, name, city, age, gender, height, weight)
        else {
            return Err(violations.into_error());
        };
        violations.into_result()?;

        Ok(Self {
            id: id.to_string(),
            fields: PatientFields {
                name: name.to_string(),
                city: city.to_string(),
                // check_age bounded it to 1..=119
                age: age as u32,
                gender,
                height,
                weight,
            },
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn fields(&self) -> &PatientFields {
        &self.fields
    }

    pub fn into_parts(self) -> (String, PatientFields) {
        (self.id, self.fields)
    }

    pub fn bmi(&self) -> Result<f64, DomainError> {
        derived::bmi(self.fields.height, self.fields.weight)
    }

    pub fn verdict(&self) -> Result<Verdict, DomainError> {
        self.bmi().map(derived::verdict)
    }

    pub fn view(&self) -> Result<PatientView, DomainError> {
        PatientView::from_stored(&self.id, &self.fields)
    }
}

/// Record as returned to callers, derived values recomputed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientView {
    pub id: String,
    pub name: String,
    pub city: String,
    pub age: u32,
    pub gender: Gender,
    pub height: f64,
    pub weight: f64,
    pub bmi: f64,
    pub verdict: Verdict,
}

impl PatientView {
    pub fn from_stored(id: &str, fields: &PatientFields) -> Result<Self, DomainError> {
        let bmi = derived::bmi(fields.height, fields.weight)?;
        Ok(Self {
            id: id.to_string(),
            name: fields.name.clone(),
            city: fields.city.clone(),
            age: fields.age,
            gender: fields.gender,
            height: fields.height,
            weight: fields.weight,
            bmi,
            verdict: derived::verdict(bmi),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bond() -> Value {
        json!({
            "id": "P007",
            "name": "James Bond",
            "city": "London",
            "age": 40,
            "gender": "male",
            "height": 1.83,
            "weight": 85
        })
    }

    #[test]
    fn test_valid_record() {
        let patient = Patient::from_json(&bond()).unwrap();
        assert_eq!(patient.id(), "P007");
        assert_eq!(patient.fields().weight, 85.0);
        assert_eq!(patient.bmi().unwrap(), 25.38);
        assert_eq!(patient.verdict().unwrap(), Verdict::Overweight);
    }

    #[test]
    fn test_every_violation_reported() {
        let input = json!({
            "id": "P008",
            "name": "J",
            "age": 120,
            "gender": "robot",
            "height": 0,
            "weight": "heavy"
        });
        let err = Patient::from_json(&input).unwrap_err();
        assert!(err.has("name", ViolationKind::Length));
        assert!(err.has("city", ViolationKind::Missing));
        assert!(err.has("age", ViolationKind::OutOfRange));
        assert!(err.has("gender", ViolationKind::NotAllowed));
        assert!(err.has("height", ViolationKind::OutOfRange));
        assert!(err.has("weight", ViolationKind::WrongType));
        assert_eq!(err.violations().len(), 6);
    }

    #[test]
    fn test_age_bounds_are_exclusive() {
        let mut input = bond();
        input["age"] = json!(0);
        assert!(Patient::from_json(&input).is_err());
        input["age"] = json!(1);
        assert!(Patient::from_json(&input).is_ok());
        input["age"] = json!(119);
        assert!(Patient::from_json(&input).is_ok());
    }

    #[test]
    fn test_extra_keys_ignored() {
        let mut input = bond();
        input["bmi"] = json!(99.0);
        input["verdict"] = json!("Obese");
        let view = Patient::from_json(&input).unwrap().view().unwrap();
        assert_eq!(view.bmi, 25.38);
        assert_eq!(view.verdict, Verdict::Overweight);
    }

    #[test]
    fn test_blank_id_rejected() {
        let mut input = bond();
        input["id"] = json!("  ");
        let err = Patient::from_json(&input).unwrap_err();
        assert!(err.has("id", ViolationKind::Length));
    }

    #[test]
    fn test_new_validates_typed_fields() {
        let fields = PatientFields {
            name: "Ann".into(),
            city: "Pune".into(),
            age: 130,
            gender: Gender::Female,
            height: -1.0,
            weight: 60.0,
        };
        let err = Patient::new("P1", fields).unwrap_err();
        assert_eq!(err.violations().len(), 2);
    }

    #[test]
    fn test_view_serializes_gender_and_verdict() {
        let view = Patient::from_json(&bond()).unwrap().view().unwrap();
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["gender"], "male");
        assert_eq!(json["verdict"], "Overweight");
        assert_eq!(json["bmi"], 25.38);
    }
}
