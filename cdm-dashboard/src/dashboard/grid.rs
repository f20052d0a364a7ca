use super::columns::ColumnDef;
use serde::Serialize;
use serde_json::Value;
use std::fmt::Write;

/// Renders `rows` as a fixed-width text table.
pub fn render_grid<T: Serialize>(columns: &[ColumnDef], rows: &[T]) -> String {
    let values: Vec<Value> = rows
        .iter()
        .map(|row| serde_json::to_value(row).unwrap_or(Value::Null))
        .collect();

    let headers: Vec<String> = columns.iter().map(ColumnDef::header).collect();
    let cells: Vec<Vec<String>> = values
        .iter()
        .map(|row| columns.iter().map(|c| c.cell(row)).collect())
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            cells
                .iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    write_row(&mut out, &headers, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    write_row(&mut out, &rule, &widths);
    for row in &cells {
        write_row(&mut out, row, &widths);
    }
    if cells.is_empty() {
        let _ = writeln!(out, "(no rows)");
    }
    out
}

fn write_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect();
    let _ = writeln!(out, "{}", line.join(" | ").trim_end());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::columns::ColumnSet;
    use cdm::Position;

    #[test]
    fn test_grid_layout() {
        let mut columns = ColumnSet::default();
        columns.rebuild();
        let rows = vec![Position {
            security: "AAPL".into(),
            quantity: 1500,
            ..Default::default()
        }];

        let text = render_grid(&columns.positions, &rows);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Security | Quantity | Updated");
        assert!(lines[2].starts_with("AAPL     | 1500"));
    }

    #[test]
    fn test_empty_grid() {
        let mut columns = ColumnSet::default();
        columns.rebuild();
        let rows: Vec<Position> = Vec::new();
        assert!(render_grid(&columns.positions, &rows).contains("(no rows)"));
    }
}
