use std::collections::BTreeMap;
use std::fmt;

use super::model::Table;

// ---------------------------------------------------------------------------
// Semantic column roles
// ---------------------------------------------------------------------------

/// A semantic category assigned to a column by name heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    Income,
    Gender,
    Region,
    Time,
    Latitude,
    Longitude,
}

impl Role {
    /// Roles whose filter is a set of accepted values (everything but time
    /// and the geographic pair).
    pub fn is_categorical(self) -> bool {
        matches!(self, Role::Income | Role::Gender | Role::Region)
    }

    /// Human-readable label for filter headers and combo boxes.
    pub fn label(self) -> &'static str {
        match self {
            Role::Income => "Income group",
            Role::Gender => "Gender",
            Role::Region => "Neighborhood / municipality",
            Role::Time => "Time",
            Role::Latitude => "Latitude",
            Role::Longitude => "Longitude",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Trigger substrings per role. Roles are data, not control flow: adding a
/// role means adding a row here.
pub const ROLE_TRIGGERS: &[(Role, &[&str])] = &[
    (Role::Income, &["income"]),
    (Role::Gender, &["gender"]),
    (Role::Region, &["neigh", "municipality"]),
    (Role::Time, &["year", "month", "date"]),
    (Role::Latitude, &["lat"]),
    (Role::Longitude, &["lon", "lng"]),
];

/// Role → column name. Any role may be unmapped; downstream logic for an
/// unmapped role is skipped, never an error.
pub type ColumnRoleMap = BTreeMap<Role, String>;

/// Canonical form used for matching: trimmed, lowercased, separators
/// collapsed to single underscores.
pub fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_sep = false;
    for ch in name.trim().chars() {
        if ch.is_whitespace() || ch == '-' || ch == '_' {
            if !last_sep && !out.is_empty() {
                out.push('_');
            }
            last_sep = true;
        } else {
            out.extend(ch.to_lowercase());
            last_sep = false;
        }
    }
    if out.ends_with('_') {
        out.pop();
    }
    out
}

/// Scan column names in table order and map each role to the first column
/// whose normalized name contains one of the role's trigger substrings.
pub fn infer_roles(table: &Table) -> ColumnRoleMap {
    let normalized: Vec<(String, &str)> = table
        .column_names()
        .map(|name| (normalize_name(name), name))
        .collect();

    let mut roles = ColumnRoleMap::new();
    for &(role, triggers) in ROLE_TRIGGERS {
        let hit = normalized.iter().find(|(norm, _)| {
            triggers.iter().any(|t| norm.contains(t))
        });
        if let Some((_, original)) = hit {
            roles.insert(role, original.to_string());
        }
    }
    roles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Column;

    fn table_with_columns(names: &[&str]) -> Table {
        let columns = names
            .iter()
            .map(|n| Column::from_text(*n, &["1"]))
            .collect();
        Table::new(columns).unwrap()
    }

    #[test]
    fn normalization_collapses_separators() {
        assert_eq!(normalize_name("  Income Group "), "income_group");
        assert_eq!(normalize_name("Lat-Long  Pair"), "lat_long_pair");
        assert_eq!(normalize_name("YEAR"), "year");
    }

    #[test]
    fn first_match_wins_in_column_order() {
        let table = table_with_columns(&["report_year", "survey_date", "income_group"]);
        let roles = infer_roles(&table);
        assert_eq!(roles.get(&Role::Time).map(String::as_str), Some("report_year"));
        assert_eq!(roles.get(&Role::Income).map(String::as_str), Some("income_group"));
    }

    #[test]
    fn triggers_are_case_insensitive() {
        let table = table_with_columns(&["Municipality Name", "GENDER"]);
        let roles = infer_roles(&table);
        assert_eq!(
            roles.get(&Role::Region).map(String::as_str),
            Some("Municipality Name")
        );
        assert_eq!(roles.get(&Role::Gender).map(String::as_str), Some("GENDER"));
    }

    #[test]
    fn absent_triggers_yield_no_mapping() {
        let table = table_with_columns(&["value_a", "value_b"]);
        let roles = infer_roles(&table);
        assert!(roles.is_empty());
    }

    #[test]
    fn mapped_column_always_contains_its_trigger() {
        let table = table_with_columns(&[
            "income_group",
            "gender",
            "municipality",
            "year",
            "latitude",
            "longitude",
        ]);
        let roles = infer_roles(&table);
        for (&role, col) in &roles {
            let triggers = ROLE_TRIGGERS
                .iter()
                .find(|(r, _)| *r == role)
                .map(|(_, t)| *t)
                .unwrap();
            let norm = normalize_name(col);
            assert!(triggers.iter().any(|t| norm.contains(t)), "{role:?} → {col}");
        }
        assert_eq!(roles.len(), 6);
    }
}
