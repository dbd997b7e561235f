//! Insertion-ordered id -> fields mapping

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::models::PatientFields;

/// The whole store content, in insertion order
///
/// Serializes as a single JSON object keyed by patient id, keys written in
/// insertion order. Lookups are linear; a store is loaded and rewritten in
/// full on every operation anyway.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientMap {
    entries: Vec<(String, PatientFields)>,
}

impl PatientMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn get(&self, id: &str) -> Option<&PatientFields> {
        self.entries.iter().find(|(k, _)| k == id).map(|(_, v)| v)
    }

    /// Append a new entry; returns false (and changes nothing) if `id` exists
    pub fn insert(&mut self, id: impl Into<String>, fields: PatientFields) -> bool {
        let id = id.into();
        if self.contains(&id) {
            return false;
        }
        self.entries.push((id, fields));
        true
    }

    /// Overwrite in place, keeping the entry's position
    pub fn replace(&mut self, id: &str, fields: PatientFields) -> Option<PatientFields> {
        let idx = self.position(id)?;
        Some(std::mem::replace(&mut self.entries[idx].1, fields))
    }

    pub fn remove(&mut self, id: &str) -> Option<PatientFields> {
        let idx = self.position(id)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PatientFields)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl Serialize for PatientMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (id, fields) in &self.entries {
            map.serialize_entry(id, fields)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PatientMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PatientMapVisitor;

        impl<'de> Visitor<'de> for PatientMapVisitor {
            type Value = PatientMap;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("an object mapping patient ids to patient fields")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<PatientMap, A::Error> {
                let mut patients = PatientMap {
                    entries: Vec::with_capacity(access.size_hint().unwrap_or(0)),
                };
                while let Some((id, fields)) = access.next_entry::<String, PatientFields>()? {
                    if patients.contains(&id) {
                        return Err(serde::de::Error::custom(format!(
                            "duplicate patient id '{}'",
                            id
                        )));
                    }
                    patients.entries.push((id, fields));
                }
                Ok(patients)
            }
        }

        deserializer.deserialize_map(PatientMapVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Gender;

    fn fields(name: &str) -> PatientFields {
        PatientFields {
            name: name.to_string(),
            city: "Pune".into(),
            age: 30,
            gender: Gender::Female,
            height: 1.6,
            weight: 55.0,
        }
    }

    #[test]
    fn test_insertion_order_survives_serde() {
        let mut map = PatientMap::new();
        map.insert("P010", fields("Zara"));
        map.insert("P002", fields("Anya"));
        map.insert("P005", fields("Mira"));

        let text = serde_json::to_string(&map).unwrap();
        let back: PatientMap = serde_json::from_str(&text).unwrap();
        let ids: Vec<&str> = back.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["P010", "P002", "P005"]);
        assert_eq!(back, map);
    }

    #[test]
    fn test_insert_refuses_existing() {
        let mut map = PatientMap::new();
        assert!(map.insert("P001", fields("Ana")));
        assert!(!map.insert("P001", fields("Bea")));
        assert_eq!(map.get("P001").unwrap().name, "Ana");
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut map = PatientMap::new();
        map.insert("A1", fields("One"));
        map.insert("B2", fields("Two"));
        let old = map.replace("A1", fields("Uno")).unwrap();
        assert_eq!(old.name, "One");
        assert_eq!(map.iter().next().unwrap().1.name, "Uno");
        assert!(map.replace("Z9", fields("None")).is_none());
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let text = r#"{
            "P1": {"name":"Ann","city":"X","age":3,"gender":"female","height":1.0,"weight":10.0},
            "P1": {"name":"Bob","city":"Y","age":4,"gender":"male","height":1.0,"weight":10.0}
        }"#;
        let err = serde_json::from_str::<PatientMap>(text).unwrap_err();
        assert!(err.to_string().contains("duplicate patient id"));
    }

    #[test]
    fn test_legacy_derived_keys_ignored() {
        let text = r#"{"P1": {"name":"Ann","city":"X","age":3,"gender":"female",
            "height":1.0,"weight":10.0,"bmi":10.0,"verdict":"Underweight"}}"#;
        let map: PatientMap = serde_json::from_str(text).unwrap();
        let out = serde_json::to_value(&map).unwrap();
        assert!(out["P1"].get("bmi").is_none());
    }
}
