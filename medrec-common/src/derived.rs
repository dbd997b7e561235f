//! Derived fields
//!
//! Values computed on read from stored inputs and never persisted:
//! BMI and its verdict for patient records, plus the categorical features the
//! premium model consumes.

use serde::Serialize;

use crate::config::Literals;
use crate::error::DomainError;

/// BMI band lower bounds; each band is inclusive on its upper end
pub const UNDERWEIGHT_BELOW: f64 = 18.5;
pub const NORMAL_MAX: f64 = 25.0;
pub const OVERWEIGHT_MAX: f64 = 30.0;

/// Round half away from zero to 2 decimals
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `weight / height²`, rounded to 2 decimals
///
/// Fails instead of returning infinity/NaN when `height` is not positive.
pub fn bmi(height: f64, weight: f64) -> Result<f64, DomainError> {
    if !(height.is_finite() && height > 0.0) {
        return Err(DomainError::NonPositiveHeight(height));
    }
    let value = weight / (height * height);
    if !value.is_finite() {
        return Err(DomainError::NonFiniteBmi { height, weight });
    }
    Ok(round2(value))
}

/// Health verdict for a BMI value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Underweight => "Underweight",
            Verdict::Normal => "Normal",
            Verdict::Overweight => "Overweight",
            Verdict::Obese => "Obese",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn verdict(bmi: f64) -> Verdict {
    if bmi < UNDERWEIGHT_BELOW {
        Verdict::Underweight
    } else if bmi <= NORMAL_MAX {
        Verdict::Normal
    } else if bmi <= OVERWEIGHT_MAX {
        Verdict::Overweight
    } else {
        Verdict::Obese
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifestyleRisk {
    Low,
    Medium,
    High,
}

impl LifestyleRisk {
    pub fn as_str(self) -> &'static str {
        match self {
            LifestyleRisk::Low => "low",
            LifestyleRisk::Medium => "medium",
            LifestyleRisk::High => "high",
        }
    }
}

/// Only smokers carry elevated risk
pub fn lifestyle_risk(smoker: bool, bmi: f64) -> LifestyleRisk {
    if smoker && bmi > 30.0 {
        LifestyleRisk::High
    } else if smoker && bmi > 27.0 {
        LifestyleRisk::Medium
    } else {
        LifestyleRisk::Low
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeGroup {
    Young,
    Adult,
    MiddleAged,
    Senior,
}

impl AgeGroup {
    pub fn as_str(self) -> &'static str {
        match self {
            AgeGroup::Young => "young",
            AgeGroup::Adult => "adult",
            AgeGroup::MiddleAged => "middle_aged",
            AgeGroup::Senior => "senior",
        }
    }
}

pub fn age_group(age: u32) -> AgeGroup {
    match age {
        0..=24 => AgeGroup::Young,
        25..=44 => AgeGroup::Adult,
        45..=59 => AgeGroup::MiddleAged,
        _ => AgeGroup::Senior,
    }
}

/// 1 for tier-1 cities, 2 for tier-2, 3 for everything else
pub fn city_tier(city: &str, literals: &Literals) -> u8 {
    if literals.tier_1_cities.iter().any(|c| c == city) {
        1
    } else if literals.tier_2_cities.iter().any(|c| c == city) {
        2
    } else {
        3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bmi_matches_formula() {
        assert_eq!(bmi(1.83, 85.0).unwrap(), 25.38);
        assert_eq!(bmi(1.75, 70.0).unwrap(), 22.86);
        assert_eq!(bmi(2.0, 100.0).unwrap(), 25.0);
    }

    #[test]
    fn test_bmi_rejects_non_positive_height() {
        assert_eq!(bmi(0.0, 80.0), Err(DomainError::NonPositiveHeight(0.0)));
        assert!(bmi(-1.5, 80.0).is_err());
        assert!(bmi(f64::NAN, 80.0).is_err());
    }

    #[test]
    fn test_verdict_band_edges() {
        assert_eq!(verdict(18.49), Verdict::Underweight);
        assert_eq!(verdict(18.5), Verdict::Normal);
        assert_eq!(verdict(25.0), Verdict::Normal);
        assert_eq!(verdict(25.01), Verdict::Overweight);
        assert_eq!(verdict(30.0), Verdict::Overweight);
        assert_eq!(verdict(30.01), Verdict::Obese);
    }

    #[test]
    fn test_verdict_is_monotonic() {
        let mut last = verdict(0.0);
        for step in 0..5000 {
            let v = verdict(step as f64 / 100.0);
            assert!(v as u8 >= last as u8);
            last = v;
        }
    }

    #[test]
    fn test_lifestyle_risk() {
        assert_eq!(lifestyle_risk(true, 31.0), LifestyleRisk::High);
        assert_eq!(lifestyle_risk(true, 30.0), LifestyleRisk::Medium);
        assert_eq!(lifestyle_risk(true, 27.0), LifestyleRisk::Low);
        assert_eq!(lifestyle_risk(false, 40.0), LifestyleRisk::Low);
    }

    #[test]
    fn test_age_group_edges() {
        assert_eq!(age_group(24), AgeGroup::Young);
        assert_eq!(age_group(25), AgeGroup::Adult);
        assert_eq!(age_group(45), AgeGroup::MiddleAged);
        assert_eq!(age_group(60), AgeGroup::Senior);
    }

    #[test]
    fn test_city_tier() {
        let literals = Literals::default();
        assert_eq!(city_tier("Mumbai", &literals), 1);
        assert_eq!(city_tier("Jaipur", &literals), 2);
        assert_eq!(city_tier("London", &literals), 3);
    }
}
