//
//  bitbucket-provider
//  output/table.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Table Output Formatting
//!
//! Builds `comfy_table` tables with a UTF-8 border preset and dynamic column
//! widths. Header cells are colored when the terminal supports it and the
//! user has not opted out (`NO_COLOR`, `CLICOLOR=0`).
//!
//! ## Example
//!
//! ```rust
//! use bitbucket_provider::output::table::TableBuilder;
//!
//! let rendered = TableBuilder::new()
//!     .color(false)
//!     .headers(["Field", "Type"])
//!     .row(["owner", "string"])
//!     .render();
//! assert!(rendered.contains("owner"));
//! ```

use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

/// A new table with the default preset applied.
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Fluent builder over [`create_table`].
pub struct TableBuilder {
    table: Table,
    color: bool,
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TableBuilder {
    /// Creates a builder over [`create_table`].
    ///
    /// Color follows `console::colors_enabled()`, which honours `NO_COLOR`,
    /// `CLICOLOR` and `CLICOLOR_FORCE`.
    pub fn new() -> Self {
        Self {
            table: create_table(),
            color: console::colors_enabled(),
        }
    }

    /// Overrides color detection.
    ///
    /// # Parameters
    ///
    /// * `enabled` - `true` to color header cells, `false` for plain text
    ///
    /// # Returns
    ///
    /// The builder instance for method chaining.
    pub fn color(mut self, enabled: bool) -> Self {
        self.color = enabled;
        self
    }

    pub fn headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let headers: Vec<String> = headers.into_iter().map(Into::into).collect();
        if self.color {
            self.table
                .set_header(headers.iter().map(|h| Cell::new(h).fg(Color::Cyan)));
        } else {
            self.table.set_header(headers);
        }
        self
    }

    pub fn row<I, S>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let row: Vec<String> = cells.into_iter().map(Into::into).collect();
        self.table.add_row(row);
        self
    }

    pub fn rows<I, R, S>(mut self, rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for row in rows {
            self = self.row(row);
        }
        self
    }

    pub fn render(&self) -> String {
        self.table.to_string()
    }

    pub fn print(self) {
        println!("{}", self.table);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_are_rendered() {
        let rendered = TableBuilder::new()
            .color(false)
            .headers(["Name", "Value"])
            .rows(vec![vec!["foo", "1"], vec!["bar", "2"]])
            .render();
        assert!(rendered.contains("foo"));
        assert!(rendered.contains("bar"));
        assert!(rendered.contains("Value"));
    }

    #[test]
    fn test_color_follows_console_detection() {
        console::set_colors_enabled(false);
        let plain = TableBuilder::new().headers(["Field"]).render();
        assert!(!plain.contains("\u{1b}["));

        console::set_colors_enabled(true);
        let builder = TableBuilder::new();
        assert!(builder.color);
        console::set_colors_enabled(false);
    }
}
