use serde_json::Value;

/// One CSV row: ordered (column, cell) pairs
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OutputRecord {
    fields: Vec<(&'static str, String)>,
}

impl OutputRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column; `None` renders as an empty cell
    pub fn push(&mut self, column: &'static str, cell: impl Into<Cell>) {
        self.fields.push((column, cell.into().0));
    }

    /// Builder form of [`OutputRecord::push`]
    pub fn with(mut self, column: &'static str, cell: impl Into<Cell>) -> Self {
        self.push(column, cell);
        self
    }

    /// Overwrite an existing column, keeping its position
    pub fn set(&mut self, column: &'static str, cell: impl Into<Cell>) {
        let cell = cell.into().0;
        match self.fields.iter_mut().find(|(name, _)| *name == column) {
            Some((_, value)) => *value = cell,
            None => self.fields.push((column, cell)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(name, _)| *name)
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Rendered CSV cell
#[derive(Debug, Clone, PartialEq)]
pub struct Cell(pub String);

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell(value.to_string())
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell(value.to_string())
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell(value.to_string())
    }
}

impl From<&Value> for Cell {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Cell(String::new()),
            Value::String(s) => Cell(s.clone()),
            other => Cell(other.to_string()),
        }
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Cell(String::new()))
    }
}
