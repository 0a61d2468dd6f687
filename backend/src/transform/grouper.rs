//! Group graded columns by grading category and compute category averages.
//!
//! ```text
//! Graded columns (input order)            →  Category groups (first-seen order)
//! ┌──────────────────────────────────┐      ┌───────────────────────────────┐
//! │ [2] Quiz 1   (Homework)          │      │ Homework: [2] Quiz 1, [4] HW 2│
//! │ [3] Midterm  (Exams)             │  →   │           + Average Homework  │
//! │ [4] HW 2     (Homework)          │      ├───────────────────────────────┤
//! └──────────────────────────────────┘      │ Exams:    [3] Midterm         │
//!                                           │           + Average Exams     │
//!                                           └───────────────────────────────┘
//! ```
//!
//! Averages skip missing values: anything that does not coerce to a number
//! is left out of both the sum and the count, and a row with no numeric
//! member has no average at all.

use std::collections::HashMap;

use crate::models::{CellValue, GradedColumn, Table};

/// Graded columns that share one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryGroup {
    pub category: String,
    /// Members sorted by input position.
    pub members: Vec<GradedColumn>,
}

impl CategoryGroup {
    /// Smallest input position among the members.
    pub fn first_index(&self) -> usize {
        self.members.iter().map(|m| m.index).min().unwrap_or(usize::MAX)
    }
}

/// Group graded columns by category.
///
/// Groups are ordered by the first input position of any member; members
/// are ordered by input position. Output does not depend on the order of
/// the slice.
pub fn group_by_category(graded: &[GradedColumn]) -> Vec<CategoryGroup> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<GroupBuilder> = Vec::new();

    for column in graded {
        let slot = *positions.entry(column.category.as_str()).or_insert_with(|| {
            groups.push(GroupBuilder::new(&column.category));
            groups.len() - 1
        });
        groups[slot].add_member(column);
    }

    let mut built: Vec<CategoryGroup> = groups.into_iter().map(GroupBuilder::build).collect();
    built.sort_by_key(CategoryGroup::first_index);
    built
}

/// Row-wise averages of a group's member columns.
///
/// Members missing from the table count as missing values.
pub fn category_averages(table: &Table, group: &CategoryGroup) -> Vec<Option<f64>> {
    let columns: Vec<usize> = group
        .members
        .iter()
        .filter_map(|m| table.column_index(&m.name))
        .collect();

    table
        .rows()
        .iter()
        .map(|row| mean_skip_missing(columns.iter().map(|&c| &row[c])))
        .collect()
}

/// Arithmetic mean of the values that coerce to numbers.
pub fn mean_skip_missing<'a>(values: impl IntoIterator<Item = &'a CellValue>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .filter_map(CellValue::as_number)
        .fold((0.0_f64, 0usize), |(sum, count), n| (sum + n, count + 1));

    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Accumulates the members of one category while grouping.
struct GroupBuilder {
    category: String,
    members: Vec<GradedColumn>,
}

impl GroupBuilder {
    fn new(category: &str) -> Self {
        Self {
            category: category.to_string(),
            members: Vec::new(),
        }
    }

    fn add_member(&mut self, column: &GradedColumn) {
        self.members.push(column.clone());
    }

    fn build(mut self) -> CategoryGroup {
        self.members.sort_by_key(|m| m.index);
        CategoryGroup {
            category: self.category,
            members: self.members,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graded(name: &str, category: &str, index: usize) -> GradedColumn {
        GradedColumn {
            name: name.to_string(),
            display_name: format!("{} {}", name, category),
            category: category.to_string(),
            index,
        }
    }

    #[test]
    fn test_groups_in_first_seen_order() {
        let columns = vec![
            graded("Quiz 1", "Homework", 2),
            graded("Midterm", "Exams", 3),
            graded("HW 2", "Homework", 4),
        ];

        let groups = group_by_category(&columns);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].category, "Homework");
        assert_eq!(groups[0].members.len(), 2);
        assert_eq!(groups[1].category, "Exams");
    }

    #[test]
    fn test_order_independent_of_input_slice() {
        let columns = vec![
            graded("HW 2", "Homework", 4),
            graded("Midterm", "Exams", 3),
            graded("Quiz 1", "Homework", 2),
        ];

        let groups = group_by_category(&columns);
        assert_eq!(groups[0].category, "Homework");
        assert_eq!(groups[0].first_index(), 2);
        let names: Vec<_> = groups[0].members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Quiz 1", "HW 2"]);
        assert_eq!(groups[1].category, "Exams");
    }

    #[test]
    fn test_mean_skips_missing() {
        let values = vec![
            CellValue::Number(80.0),
            CellValue::Number(90.0),
            CellValue::Text("Missing".into()),
        ];
        assert_eq!(mean_skip_missing(&values), Some(85.0));
    }

    #[test]
    fn test_mean_all_missing_is_none() {
        let values = vec![CellValue::Empty, CellValue::Text("Excused".into())];
        assert_eq!(mean_skip_missing(&values), None);
    }

    #[test]
    fn test_category_averages_per_row() {
        let table = Table::new(
            vec!["Name".into(), "Q1".into(), "Q2".into()],
            vec![
                vec!["Ana".into(), 10.0.into(), 6.0.into()],
                vec!["Luis".into(), CellValue::Empty, 7.0.into()],
                vec!["Eva".into(), "Missing".into(), CellValue::Empty],
            ],
        )
        .unwrap();
        let group = CategoryGroup {
            category: "Quizzes".into(),
            members: vec![graded("Q1", "Quizzes", 1), graded("Q2", "Quizzes", 2)],
        };

        assert_eq!(category_averages(&table, &group), vec![Some(8.0), Some(7.0), None]);
    }
}
