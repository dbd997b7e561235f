//! Insurance premium model inputs
//!
//! [`UserInput`] is what a client submits; [`ModelInput`] is what the
//! classifier consumes after the derived features are computed.

use serde::Serialize;
use serde_json::Value;

use crate::config::Literals;
use crate::derived::{self, AgeGroup, LifestyleRisk};
use crate::error::DomainError;
use crate::validation::{
    check_gt, check_int_between, check_lt, check_one_of, FieldReader, Presence, ValidationError,
};

/// Upper bound on height in meters, exclusive
pub const HEIGHT_LT: f64 = 2.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserInput {
    pub age: u32,
    pub height: f64,
    pub weight: f64,
    /// Annual income in lakhs per annum
    pub income_lpa: f64,
    pub smoker: bool,
    /// Normalized to title case
    pub city: String,
    pub occupation: String,
}

impl UserInput {
    pub fn from_json(input: &Value, literals: &Literals) -> Result<Self, ValidationError> {
        let mut reader = FieldReader::new(input, Presence::Required)?;

        let age = reader.integer("age");
        let age = reader.keep(age, |a| check_int_between("age", *a, 0, 120));
        let height = reader.float("height");
        let height = reader.keep(height, |h| {
            check_gt("height", *h, 0.0).or_else(|| check_lt("height", *h, HEIGHT_LT))
        });
        let weight = reader.float("weight");
        let weight = reader.keep(weight, |w| check_gt("weight", *w, 0.0));
        let income_lpa = reader.float("income_lpa");
        let income_lpa = reader.keep(income_lpa, |i| check_gt("income_lpa", *i, 0.0));
        let smoker = reader.boolean("smoker");
        let city = reader.string("city").map(normalize_city);
        let occupation = reader.string("occupation");
        let occupation = reader.keep(occupation, |o| {
            check_one_of("occupation", o, &literals.occupations)
        });

        let violations = reader.finish();
        let (Some(age), Some(height), Some(weight), Some(income_lpa), Some(smoker), Some(city), Some(occupation)) =
            (age, height, weight, income_lpa, smoker, city, occupation)
        else {
            return Err(violations.into_error());
        };
        violations.into_result()?;

        Ok(Self {
            age: age as u32,
            height,
            weight,
            income_lpa,
            smoker,
            city,
            occupation: occupation.to_string(),
        })
    }

    pub fn bmi(&self) -> Result<f64, DomainError> {
        derived::bmi(self.height, self.weight)
    }

    pub fn model_input(&self, literals: &Literals) -> Result<ModelInput, DomainError> {
        let bmi = self.bmi()?;
        Ok(ModelInput {
            income_lpa: self.income_lpa,
            occupation: self.occupation.clone(),
            bmi,
            lifestyle_risk: derived::lifestyle_risk(self.smoker, bmi),
            city_tier: derived::city_tier(&self.city, literals),
            age_group: derived::age_group(self.age),
        })
    }
}

/// Feature row handed to the premium classifier
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInput {
    pub income_lpa: f64,
    pub occupation: String,
    pub bmi: f64,
    pub lifestyle_risk: LifestyleRisk,
    pub city_tier: u8,
    pub age_group: AgeGroup,
}

impl ModelInput {
    /// Numeric features by name
    pub fn numeric(&self) -> [(&'static str, f64); 2] {
        [("income_lpa", self.income_lpa), ("bmi", self.bmi)]
    }

    /// Categorical features as `name=value` one-hot keys
    pub fn categorical(&self) -> [String; 4] {
        [
            format!("occupation={}", self.occupation),
            format!("lifestyle_risk={}", self.lifestyle_risk.as_str()),
            format!("city_tier={}", self.city_tier),
            format!("age_group={}", self.age_group.as_str()),
        ]
    }
}

/// Trim and title-case a city name ("new york " -> "New York")
pub fn normalize_city(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut prev_alpha = false;
    for c in raw.trim().chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}
