//! Moves name-bearing general columns to the front.

/// General columns after reordering.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PrioritizedColumns {
    /// Name columns first, then the rest, each in input order.
    pub ordered: Vec<String>,
    /// The columns recognised as name columns.
    pub name_columns: Vec<String>,
}

/// Whether a column name contains any of the terms, ignoring case.
pub fn is_name_column(name: &str, terms: &[String]) -> bool {
    let lowered = name.to_lowercase();
    terms
        .iter()
        .filter(|t| !t.is_empty())
        .any(|t| lowered.contains(&t.to_lowercase()))
}

/// Stable partition of general columns: name columns first.
pub fn prioritize_name_columns(general: &[String], terms: &[String]) -> PrioritizedColumns {
    let (names, others): (Vec<String>, Vec<String>) = general
        .iter()
        .cloned()
        .partition(|column| is_name_column(column, terms));

    let mut ordered = names.clone();
    ordered.extend(others);

    PrioritizedColumns {
        ordered,
        name_columns: names,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_name_columns_first_in_order() {
        let general = columns(&["Section", "Last Name", "Email", "First Name"]);
        let terms = columns(&["name"]);

        let result = prioritize_name_columns(&general, &terms);
        assert_eq!(result.ordered, columns(&["Last Name", "First Name", "Section", "Email"]));
        assert_eq!(result.name_columns, columns(&["Last Name", "First Name"]));
    }

    #[test]
    fn test_case_insensitive() {
        let terms = columns(&["Nombre"]);
        assert!(is_name_column("NOMBRE COMPLETO", &terms));
        assert!(is_name_column("primer nombre", &terms));
        assert!(!is_name_column("Sección", &terms));
    }

    #[test]
    fn test_no_terms_keeps_order() {
        let general = columns(&["B", "A"]);
        let result = prioritize_name_columns(&general, &[]);
        assert_eq!(result.ordered, general);
        assert!(result.name_columns.is_empty());
    }
}
