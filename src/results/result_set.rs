use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use crate::types::SqlValue;

use super::row::{Row, build_column_index};

/// Buffered rows of an executed statement, consumed front to back.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    rows: VecDeque<Row>,
    /// Rows affected (DML) or produced (queries) by the execution.
    pub rows_affected: u64,
    column_names: Option<Arc<Vec<String>>>,
    column_index: Option<Arc<HashMap<String, usize>>>,
}

impl ResultSet {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> ResultSet {
        ResultSet {
            rows: VecDeque::with_capacity(capacity),
            rows_affected: 0,
            column_names: None,
            column_index: None,
        }
    }

    /// A result without rows, e.g. from an INSERT.
    #[must_use]
    pub fn affected(rows_affected: u64) -> ResultSet {
        ResultSet {
            rows_affected,
            ..ResultSet::default()
        }
    }

    /// Set the column names shared by every row added afterwards.
    pub fn set_column_names(&mut self, column_names: Arc<Vec<String>>) {
        self.column_index = Some(Arc::new(build_column_index(&column_names)));
        self.column_names = Some(column_names);
    }

    /// Append a row. Ignored until column names are set.
    pub fn add_row_values(&mut self, row_values: Vec<SqlValue>) {
        if let (Some(names), Some(index)) = (&self.column_names, &self.column_index) {
            self.rows.push_back(Row::with_index(
                Arc::clone(names),
                row_values,
                Arc::clone(index),
            ));
            self.rows_affected += 1;
        }
    }

    /// Take the next row.
    pub fn next_row(&mut self) -> Option<Row> {
        self.rows.pop_front()
    }

    /// Take every remaining row.
    pub fn drain(&mut self) -> Vec<Row> {
        self.rows.drain(..).collect()
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }
}
