use super::FlowLayout;
use super::projector::project;
use itertools::Itertools;

/// Renders a solved layout as a plain-text grid, one line per row.
///
/// Each cell shows its node's label in its top-left corner; the rest of the rectangle is
/// filled with `|` below the label and `-` to its right.
pub struct GridFormatter;

impl GridFormatter {
    pub fn format(layout: &FlowLayout) -> String {
        let height = layout.row_total();
        let width = layout.column_count();
        let mut grid = vec![vec![String::new(); width]; height];

        for cell in project(layout) {
            for row in cell.row..cell.row + cell.row_span {
                for column in cell.column..cell.column + cell.column_span {
                    let text = if column > cell.column {
                        "-".to_string()
                    } else if row > cell.row {
                        "|".to_string()
                    } else {
                        cell.label.clone()
                    };
                    if let Some(slot) = grid
                        .get_mut(row.wrapping_sub(1))
                        .and_then(|line| line.get_mut(column.wrapping_sub(1)))
                    {
                        *slot = text;
                    }
                }
            }
        }

        let widths: Vec<usize> = (0..width)
            .map(|column| {
                grid.iter()
                    .map(|line| line[column].chars().count())
                    .max()
                    .unwrap_or(0)
                    .max(1)
            })
            .collect();

        let mut output = String::new();
        for line in &grid {
            let rendered = line
                .iter()
                .zip(&widths)
                .map(|(text, &width)| format!("{:<width$}", text, width = width))
                .join(" ");
            output.push_str(rendered.trim_end());
            output.push('\n');
        }
        output
    }
}
