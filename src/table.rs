//! Columnar tables of named numeric and categorical columns.
//!
//! A [`Table`] is the raw input to the feature transformer: the training
//! features loaded from CSV, or a single inference row built from the form.
//! Columns are looked up by name, so their order carries no meaning.

use crate::preprocessing::PreprocessingError;
use crate::schema::ColumnKind;

/// A single column of values.
#[derive(Clone, Debug, PartialEq)]
pub enum Column {
    Numeric(Vec<f64>),
    Categorical(Vec<String>),
}

impl Column {
    /// Build a categorical column from anything string-like.
    pub fn categorical<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Column::Categorical(values.into_iter().map(Into::into).collect())
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(v) => v.len(),
            Column::Categorical(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            Column::Numeric(_) => ColumnKind::Numeric,
            Column::Categorical(_) => ColumnKind::Categorical,
        }
    }

    fn take(&self, indices: &[usize]) -> Column {
        match self {
            Column::Numeric(v) => Column::Numeric(indices.iter().map(|&i| v[i]).collect()),
            Column::Categorical(v) => {
                Column::Categorical(indices.iter().map(|&i| v[i].clone()).collect())
            }
        }
    }
}

/// An ordered collection of equally long, uniquely named columns.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    columns: Vec<(String, Column)>,
    n_rows: usize,
}

impl Table {
    /// Create an empty table with no columns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column, replacing any existing column of the same name.
    ///
    /// # Errors
    /// Returns [`PreprocessingError::InvalidShape`] if the column length differs
    /// from the rows already in the table.
    pub fn with_column(
        mut self,
        name: impl Into<String>,
        column: Column,
    ) -> Result<Self, PreprocessingError> {
        self.insert(name, column)?;
        Ok(self)
    }

    /// In-place variant of [`Table::with_column`].
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        column: Column,
    ) -> Result<(), PreprocessingError> {
        let name = name.into();
        let replacing_only_column = self.columns.len() == 1 && self.columns[0].0 == name;
        if !self.columns.is_empty() && !replacing_only_column && column.len() != self.n_rows {
            return Err(PreprocessingError::InvalidShape {
                expected: format!("{} rows", self.n_rows),
                got: format!("{} rows in column '{}'", column.len(), name),
            });
        }

        self.n_rows = column.len();
        match self.columns.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = column,
            None => self.columns.push((name, column)),
        }
        Ok(())
    }

    /// Remove a column by name and return it.
    pub fn remove(&mut self, name: &str) -> Option<Column> {
        let idx = self.columns.iter().position(|(n, _)| n == name)?;
        let (_, column) = self.columns.remove(idx);
        if self.columns.is_empty() {
            self.n_rows = 0;
        }
        Some(column)
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
    }

    /// Borrow a numeric column.
    pub fn numeric(&self, name: &str) -> Result<&[f64], PreprocessingError> {
        match self.column(name) {
            Some(Column::Numeric(v)) => Ok(v),
            Some(other) => Err(PreprocessingError::ColumnType {
                column: name.to_string(),
                expected: ColumnKind::Numeric,
                got: other.kind(),
            }),
            None => Err(PreprocessingError::MissingColumn(name.to_string())),
        }
    }

    /// Borrow a categorical column.
    pub fn categorical(&self, name: &str) -> Result<&[String], PreprocessingError> {
        match self.column(name) {
            Some(Column::Categorical(v)) => Ok(v),
            Some(other) => Err(PreprocessingError::ColumnType {
                column: name.to_string(),
                expected: ColumnKind::Categorical,
                got: other.kind(),
            }),
            None => Err(PreprocessingError::MissingColumn(name.to_string())),
        }
    }

    /// Select rows by index, in the given order. Indices must be in bounds.
    pub fn take_rows(&self, indices: &[usize]) -> Table {
        Table {
            columns: self
                .columns
                .iter()
                .map(|(n, c)| (n.clone(), c.take(indices)))
                .collect(),
            n_rows: if self.columns.is_empty() {
                0
            } else {
                indices.len()
            },
        }
    }
}
