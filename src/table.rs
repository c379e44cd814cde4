//! Plain-text table formatting shared by the page and heap reports.
//!
//! Output follows psql's aligned format:
//!
//! ```text
//!  ctid  | state
//! -------+---------------
//!  (0,1) | redirect to 4
//! ```

/// A text table with a fixed set of columns.
#[derive(Debug, Clone)]
pub(crate) struct TextTable {
    headers: Vec<String>,
    right_aligned: Vec<bool>,
    rows: Vec<Vec<String>>,
}

impl TextTable {
    pub(crate) fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            right_aligned: vec![false; headers.len()],
            rows: Vec::new(),
        }
    }

    /// Right-align a column (numbers).
    pub(crate) fn align_right(mut self, column: usize) -> Self {
        self.right_aligned[column] = true;
        self
    }

    /// Appends a row. Missing cells render empty; extra cells are dropped.
    pub(crate) fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    pub(crate) fn render(&self) -> String {
        let widths: Vec<usize> = (0..self.headers.len())
            .map(|col| {
                self.rows
                    .iter()
                    .map(|row| row[col].chars().count())
                    .chain(std::iter::once(self.headers[col].chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut out = String::new();
        out.push_str(&self.format_line(&self.headers, &widths, false));
        let separator: Vec<String> = widths.iter().map(|w| "-".repeat(w + 2)).collect();
        out.push_str(&separator.join("+"));
        out.push('\n');
        for row in &self.rows {
            out.push_str(&self.format_line(row, &widths, true));
        }
        out
    }

    fn format_line(&self, cells: &[String], widths: &[usize], align: bool) -> String {
        let formatted: Vec<String> = cells
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(col, (cell, &width))| {
                if align && self.right_aligned[col] {
                    format!(" {:>width$} ", cell, width = width)
                } else {
                    format!(" {:<width$} ", cell, width = width)
                }
            })
            .collect();
        let mut line = formatted.join("|").trim_end().to_string();
        line.push('\n');
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_aligned() {
        let mut table = TextTable::new(&["blkno", "state"]).align_right(0);
        table.push_row(vec!["0".to_string(), "normal".to_string()]);
        table.push_row(vec!["12".to_string(), "redirect to 4".to_string()]);

        let expected = "\
 blkno | state
-------+---------------
     0 | normal
    12 | redirect to 4
";
        assert_eq!(table.render(), expected);
    }

    #[test]
    fn test_render_pads_short_rows() {
        let mut table = TextTable::new(&["a", "b"]);
        table.push_row(vec!["x".to_string()]);
        assert_eq!(table.render(), " a | b\n---+---\n x |\n");
    }
}
