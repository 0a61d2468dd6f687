//! Pure gradebook transform: input table in, reordered table and display
//! hints out. Nothing here touches the filesystem or the spreadsheet writer.

use super::assembler::{assemble, average_column_name, GradebookOutput};
use super::classifier::ColumnClassifier;
use super::grouper::{group_by_category, CategoryGroup};
use super::prioritizer::{prioritize_name_columns, PrioritizedColumns};
use crate::config::TransformConfig;
use crate::error::TransformError;
use crate::models::{ClassifiedColumn, ColumnClass, GradedColumn, Language, Table};

/// What will happen to each input column, before any values are touched.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnPlan {
    pub classified: Vec<ClassifiedColumn>,
    pub general: PrioritizedColumns,
    pub groups: Vec<CategoryGroup>,
    pub language: Language,
}

impl ColumnPlan {
    /// Output column names, in order. Collision suffixes are applied only at
    /// assembly time.
    pub fn output_columns(&self) -> Vec<String> {
        let mut names = self.general.ordered.clone();
        for group in &self.groups {
            names.extend(group.members.iter().map(|m| m.display_name.clone()));
            names.push(average_column_name(&group.category, self.language));
        }
        names
    }

    /// Input columns that will not appear in the output.
    pub fn removed_columns(&self) -> impl Iterator<Item = &ClassifiedColumn> {
        self.classified.iter().filter(|c| !c.class.is_retained())
    }
}

/// Classify, prioritise and group the columns of a header row.
pub fn plan_columns(
    headers: &[String],
    config: &TransformConfig,
    language: Language,
) -> Result<ColumnPlan, TransformError> {
    let classifier = ColumnClassifier::new(config)?;
    let classified = classifier.classify_all(headers);

    let mut general = Vec::new();
    let mut graded: Vec<GradedColumn> = Vec::new();
    for column in &classified {
        match &column.class {
            ColumnClass::General => general.push(column.name.clone()),
            ColumnClass::Graded(g) => graded.push(g.clone()),
            ColumnClass::Dropped(_) | ColumnClass::RemovedId => {}
        }
    }

    let general = prioritize_name_columns(&general, config.name_terms.for_language(language));
    let groups = group_by_category(&graded);

    Ok(ColumnPlan {
        classified,
        general,
        groups,
        language,
    })
}

/// Transform a gradebook table.
///
/// # Example
/// ```ignore
/// use gradebook::{transform_gradebook, Language, Table, TransformConfig};
///
/// let output = transform_gradebook(&table, &TransformConfig::default(), Language::English)?;
/// println!("{} average columns", output.average_columns.len());
/// ```
pub fn transform_gradebook(
    table: &Table,
    config: &TransformConfig,
    language: Language,
) -> Result<GradebookOutput, TransformError> {
    let plan = plan_columns(table.headers(), config, language)?;
    assemble(table, &plan.general, &plan.groups, language)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CellValue;
    use crate::parser::parse_csv;

    const GRADEBOOK: &str = "\
Unique User ID,Overall,Section,Last Name,\"Quiz 1 (Grading Category: Homework, max 10)\",\"Midterm (Grading Category: Exams, max 100)\",First Name,\"Quiz 2 (Grading Category: Homework, max 10)\",Teacher Comments
u1,88,A,Diaz,8,75,Ana,Missing,great
u2,70,A,Ruiz,Missing,Missing,Luis,6,
";

    fn table() -> Table {
        parse_csv(GRADEBOOK, ',').unwrap()
    }

    #[test]
    fn test_full_transform_order() {
        let output =
            transform_gradebook(&table(), &TransformConfig::default(), Language::English).unwrap();

        assert_eq!(
            output.table.headers(),
            [
                "Last Name",
                "First Name",
                "Section",
                "Quiz 1 Homework",
                "Quiz 2 Homework",
                "Average Homework",
                "Midterm Exams",
                "Average Exams",
            ]
        );
        assert_eq!(output.name_columns, vec!["Last Name", "First Name"]);
        assert_eq!(output.average_columns, vec!["Average Homework", "Average Exams"]);
    }

    #[test]
    fn test_full_transform_values() {
        let output =
            transform_gradebook(&table(), &TransformConfig::default(), Language::English).unwrap();
        let t = &output.table;

        // Ana: Quiz 1 = 8, Quiz 2 = Missing
        assert_eq!(t.cell(0, 3), Some(&CellValue::Number(8.0)));
        assert_eq!(t.cell(0, 4), Some(&CellValue::Empty));
        assert_eq!(t.cell(0, 5), Some(&CellValue::Number(8.0)));
        assert_eq!(t.cell(0, 7), Some(&CellValue::Number(75.0)));

        // Luis: Midterm missing entirely → no average
        assert_eq!(t.cell(1, 5), Some(&CellValue::Number(6.0)));
        assert_eq!(t.cell(1, 6), Some(&CellValue::Empty));
        assert_eq!(t.cell(1, 7), Some(&CellValue::Empty));
    }

    #[test]
    fn test_retained_columns_appear_once() {
        let input = table();
        let config = TransformConfig::default();
        let plan = plan_columns(input.headers(), &config, Language::English).unwrap();
        let output = transform_gradebook(&input, &config, Language::English).unwrap();

        let retained = plan.classified.iter().filter(|c| c.class.is_retained()).count();
        assert_eq!(output.table.column_count(), retained + output.average_columns.len());

        for removed in plan.removed_columns() {
            assert!(!output.table.headers().contains(&removed.name));
        }
        let removed: Vec<_> = plan.removed_columns().map(|c| c.name.as_str()).collect();
        assert_eq!(removed, vec!["Unique User ID", "Overall", "Teacher Comments"]);
    }

    #[test]
    fn test_language_changes_labels_only() {
        let input = table();
        let config = TransformConfig::default();
        let en = transform_gradebook(&input, &config, Language::English).unwrap();
        let es = transform_gradebook(&input, &config, Language::Spanish).unwrap();

        assert_eq!(es.average_columns, vec!["Promedio Homework", "Promedio Exams"]);
        assert_eq!(en.table.rows().len(), es.table.rows().len());

        // Same values once the name columns are lined up (Spanish terms do not
        // match English headers, so general order falls back to input order).
        let value = |out: &GradebookOutput, row: usize, name: &str| {
            let col = out.table.column_index(name).unwrap();
            out.table.cell(row, col).cloned()
        };
        for row in 0..2 {
            assert_eq!(value(&en, row, "Average Homework"), value(&es, row, "Promedio Homework"));
            assert_eq!(value(&en, row, "Midterm Exams"), value(&es, row, "Midterm Exams"));
        }
        assert!(es.name_columns.is_empty());
    }

    #[test]
    fn test_deterministic_output() {
        let input = table();
        let config = TransformConfig::default();
        let first = transform_gradebook(&input, &config, Language::English).unwrap();
        let second = transform_gradebook(&input, &config, Language::English).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_plan_output_columns_match_transform() {
        let input = table();
        let config = TransformConfig::default();
        let plan = plan_columns(input.headers(), &config, Language::English).unwrap();
        let output = transform_gradebook(&input, &config, Language::English).unwrap();
        assert_eq!(plan.output_columns(), output.table.headers());
    }
}
