//! crates/study_match_core/src/normalize.rs
//!
//! Maps heterogeneous stored profile documents into the canonical
//! [`Profile`] shape. Older schema versions wrote capitalized field names
//! (`FullName`, `Classes`); newer ones write camelCase. Each field is
//! resolved through a fixed priority list here, once, so nothing past this
//! boundary ever branches on raw key spellings.

use serde_json::Value;
use std::collections::BTreeMap;

use crate::domain::{Proficiency, Profile, RawProfile, StudyTime, Year};

const FULL_NAME_KEYS: &[&str] = &["fullName", "FullName"];
const STUDY_TIME_KEYS: &[&str] = &["preferredStudyTime", "PreferredStudyTime"];
const CLASSES_KEYS: &[&str] = &["classes", "Classes"];
const MAJOR_KEYS: &[&str] = &["major", "Major"];
const YEAR_KEYS: &[&str] = &["year", "Year"];
const DESCRIPTION_KEYS: &[&str] = &["description", "Description"];

/// Returns the first present value among `keys`, in priority order.
fn resolve<'a>(doc: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| doc.get(*k))
}

fn resolve_str<'a>(doc: &'a Value, keys: &[&str]) -> Option<&'a str> {
    resolve(doc, keys).and_then(Value::as_str)
}

/// Interprets one stored class-proficiency value. Integers and numeric
/// strings in {0, 1, 2} are accepted; everything else is dropped.
fn parse_level(value: &Value) -> Option<Proficiency> {
    let level = match value {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    Proficiency::from_level(level)
}

fn parse_classes(value: Option<&Value>) -> BTreeMap<String, Proficiency> {
    let Some(Value::Object(entries)) = value else {
        return BTreeMap::new();
    };
    entries
        .iter()
        .filter_map(|(name, level)| parse_level(level).map(|p| (name.clone(), p)))
        .collect()
}

/// Normalizes one stored profile document into the canonical shape.
///
/// The study time stays `None` when missing or unrecognized; it is the
/// output boundary's job to pick a default, not ours. Year, major and
/// description carry no matching semantics and take safe defaults here.
pub fn normalize(raw: &RawProfile) -> Profile {
    let doc = &raw.doc;
    Profile {
        uid: raw.uid.clone(),
        full_name: resolve_str(doc, FULL_NAME_KEYS).unwrap_or_default().to_string(),
        study_time: resolve_str(doc, STUDY_TIME_KEYS).and_then(StudyTime::parse),
        classes: parse_classes(resolve(doc, CLASSES_KEYS)),
        major: resolve_str(doc, MAJOR_KEYS).unwrap_or_default().to_string(),
        year: resolve_str(doc, YEAR_KEYS)
            .and_then(Year::parse)
            .unwrap_or_default(),
        description: resolve_str(doc, DESCRIPTION_KEYS)
            .unwrap_or_default()
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(doc: Value) -> RawProfile {
        RawProfile {
            uid: "u1".to_string(),
            doc,
        }
    }

    #[test]
    fn resolves_capitalized_legacy_keys() {
        let p = normalize(&raw(json!({
            "FullName": "Ada Lovelace",
            "PreferredStudyTime": "morning",
            "Classes": {"Calc": 2},
        })));
        assert_eq!(p.full_name, "Ada Lovelace");
        assert_eq!(p.study_time, Some(StudyTime::Morning));
        assert_eq!(p.classes.get("Calc"), Some(&Proficiency::Strong));
    }

    #[test]
    fn camel_case_wins_over_legacy_when_both_present() {
        let p = normalize(&raw(json!({
            "fullName": "New Name",
            "FullName": "Old Name",
        })));
        assert_eq!(p.full_name, "New Name");
    }

    #[test]
    fn night_maps_to_evening() {
        let p = normalize(&raw(json!({"preferredStudyTime": "NIGHT"})));
        assert_eq!(p.study_time, Some(StudyTime::Evening));
    }

    #[test]
    fn unknown_study_time_stays_unknown() {
        for doc in [json!({}), json!({"preferredStudyTime": "whenever"})] {
            assert_eq!(normalize(&raw(doc)).study_time, None);
        }
    }

    #[test]
    fn invalid_class_entries_are_dropped_not_rejected() {
        let p = normalize(&raw(json!({
            "classes": {
                "Calc": 2,
                "Chem": "1",
                "Bio": 7,
                "Physics": "strong",
                "History": null,
            },
        })));
        assert_eq!(p.classes.len(), 2);
        assert_eq!(p.classes.get("Calc"), Some(&Proficiency::Strong));
        assert_eq!(p.classes.get("Chem"), Some(&Proficiency::Okay));
    }

    #[test]
    fn missing_year_defaults_to_freshman() {
        let p = normalize(&raw(json!({"year": "5th"})));
        assert_eq!(p.year, Year::Freshman);
        let p = normalize(&raw(json!({"year": "Senior"})));
        assert_eq!(p.year, Year::Senior);
    }
}
