//! In-memory taxonomy editing.
//!
//! These operations never fail. Malformed input (an empty class name, or an
//! attribute list that is empty once trimmed) leaves the list untouched; the
//! completeness of a taxonomy is only enforced when a project is saved, so a
//! list may transiently hold zero classes while it is being edited.

use tracing::debug;

use crate::project::TaxonomyClass;

/// Split a comma-separated attribute list.
///
/// Entries are trimmed, empty entries are dropped, and repeated values keep
/// only their first occurrence.
#[must_use]
pub fn parse_attributes(csv: &str) -> Vec<String> {
    let mut attributes: Vec<String> = Vec::new();
    for attr in csv.split(',').map(str::trim).filter(|a| !a.is_empty()) {
        if !attributes.iter().any(|a| a == attr) {
            attributes.push(attr.to_string());
        }
    }
    attributes
}

/// Append a class built from `class_name` and `attributes_csv`.
///
/// Returns whether a class was appended. Nothing happens if the trimmed name
/// or the parsed attribute list is empty.
pub fn add_class(list: &mut Vec<TaxonomyClass>, class_name: &str, attributes_csv: &str) -> bool {
    match build_class(class_name, attributes_csv) {
        Some(class) => {
            debug!("Added taxonomy class {}", class);
            list.push(class);
            true
        }
        None => false,
    }
}

/// Replace the class at `index`.
///
/// Returns whether the entry was replaced. Nothing happens if `index` is out
/// of range, or the new name or attribute list is empty.
pub fn edit_class(
    list: &mut [TaxonomyClass],
    index: usize,
    new_name: &str,
    new_attributes_csv: &str,
) -> bool {
    let Some(slot) = list.get_mut(index) else {
        return false;
    };
    match build_class(new_name, new_attributes_csv) {
        Some(class) => {
            debug!("Replaced taxonomy class {} with {}", slot, class);
            *slot = class;
            true
        }
        None => false,
    }
}

/// Remove the class at `index`, returning it. Out-of-range is a no-op.
pub fn remove_class(list: &mut Vec<TaxonomyClass>, index: usize) -> Option<TaxonomyClass> {
    if index < list.len() {
        let removed = list.remove(index);
        debug!("Removed taxonomy class {}", removed);
        Some(removed)
    } else {
        None
    }
}

fn build_class(name: &str, attributes_csv: &str) -> Option<TaxonomyClass> {
    let name = name.trim();
    let attributes = parse_attributes(attributes_csv);
    if name.is_empty() || attributes.is_empty() {
        return None;
    }
    Some(TaxonomyClass::new(name, attributes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_attributes() {
        assert_eq!(parse_attributes("Sunny, Cloudy"), vec!["Sunny", "Cloudy"]);
        assert_eq!(parse_attributes(" a ,, b ,"), vec!["a", "b"]);
        assert_eq!(parse_attributes("x, y, x"), vec!["x", "y"]);
        assert!(parse_attributes(" , ,").is_empty());
        assert!(parse_attributes("").is_empty());
    }

    #[test]
    fn test_add_class_only_counts_valid_input() {
        let mut list = Vec::new();
        let inputs = [
            ("Weather", "Sunny, Cloudy", true),
            ("", "Heavy", false),
            ("Traffic", "Heavy, Light", true),
            ("Road", " , ", false),
            ("  Surface ", "Paved", true),
            ("   ", "", false),
        ];

        for (name, csv, valid) in inputs {
            let before = list.len();
            assert_eq!(add_class(&mut list, name, csv), valid);
            assert_eq!(list.len(), before + usize::from(valid));
        }

        let names: Vec<_> = list.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Weather", "Traffic", "Surface"]);
    }

    #[test]
    fn test_edit_class_replaces_entry() {
        let mut list = Vec::new();
        add_class(&mut list, "Weather", "Sunny");

        assert!(edit_class(&mut list, 0, "Sky", "Clear, Overcast"));
        assert_eq!(
            list[0],
            TaxonomyClass::new("Sky", vec!["Clear".into(), "Overcast".into()])
        );
    }

    #[test]
    fn test_edit_class_aborts_on_bad_input() {
        let mut list = Vec::new();
        add_class(&mut list, "Weather", "Sunny");
        let original = list.clone();

        assert!(!edit_class(&mut list, 0, "", "Clear"));
        assert!(!edit_class(&mut list, 0, "Sky", " ,"));
        assert!(!edit_class(&mut list, 3, "Sky", "Clear"));
        assert_eq!(list, original);
    }

    #[test]
    fn test_remove_class() {
        let mut list = Vec::new();
        add_class(&mut list, "Weather", "Sunny");
        add_class(&mut list, "Traffic", "Heavy");

        assert!(remove_class(&mut list, 5).is_none());
        assert_eq!(list.len(), 2);

        let removed = remove_class(&mut list, 0).unwrap();
        assert_eq!(removed.name, "Weather");
        assert_eq!(list[0].name, "Traffic");

        remove_class(&mut list, 0);
        assert!(list.is_empty());
    }
}
