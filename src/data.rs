use anyhow::{anyhow, Result};
use serde_json::Value;

use crate::error::{BarplotError, BarplotResult};

/// Raw string cells as read from CSV or JSON, before any index is chosen.
#[derive(Debug, Clone)]
pub struct PlotData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl PlotData {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Create PlotData from a JSON Array of Objects
    pub fn from_json(value: &Value) -> Result<Self> {
        let array = value
            .as_array()
            .ok_or_else(|| anyhow!("Input data must be a JSON array of objects"))?;

        if array.is_empty() {
            return Err(anyhow!("Input data array is empty"));
        }

        // Extract headers from the first object
        let first_obj = array[0]
            .as_object()
            .ok_or_else(|| anyhow!("Items in array must be objects"))?;

        let headers: Vec<String> = first_obj.keys().cloned().collect();

        let mut rows = Vec::new();
        for item in array {
            let obj = item
                .as_object()
                .ok_or_else(|| anyhow!("Items in array must be objects"))?;

            let mut row = Vec::new();
            for header in &headers {
                let val_str = match obj.get(header) {
                    Some(Value::String(s)) => s.clone(),
                    Some(Value::Number(n)) => n.to_string(),
                    Some(Value::Bool(b)) => b.to_string(),
                    Some(Value::Null) | None => "".to_string(),
                    _ => return Err(anyhow!("Unsupported value type for field '{}'", header)),
                };
                row.push(val_str);
            }
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    fn column_index(&self, name: &str) -> BarplotResult<usize> {
        self.headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| BarplotError::MissingColumn(name.to_string()))
    }

    /// Build a multi-indexed table from the named columns.
    ///
    /// `index_cols` go from outermost to innermost level. When `value_col` is
    /// `None` the first column that is neither an index nor the std column is
    /// used.
    pub fn to_table(
        &self,
        index_cols: &[String],
        value_col: Option<&str>,
        std_col: Option<&str>,
    ) -> BarplotResult<Table> {
        let index_idx = index_cols
            .iter()
            .map(|c| self.column_index(c))
            .collect::<BarplotResult<Vec<_>>>()?;
        let std_idx = std_col.map(|c| self.column_index(c)).transpose()?;

        let value_idx = match value_col {
            Some(c) => self.column_index(c)?,
            None => (0..self.headers.len())
                .find(|i| !index_idx.contains(i) && Some(*i) != std_idx)
                .ok_or_else(|| BarplotError::MissingColumn("<value>".to_string()))?,
        };

        let mut value_names = vec![self.headers[value_idx].clone()];
        if let Some(i) = std_idx {
            value_names.push(self.headers[i].clone());
        }

        let mut rows = Vec::with_capacity(self.rows.len());
        for (row_idx, cells) in self.rows.iter().enumerate() {
            let index = index_idx
                .iter()
                .map(|&i| cells.get(i).cloned().unwrap_or_default())
                .collect();

            let mut values = vec![parse_cell(cells, value_idx, &self.headers, row_idx)?];
            if let Some(i) = std_idx {
                values.push(parse_cell(cells, i, &self.headers, row_idx)?);
            }
            rows.push(Row { index, values });
        }

        let index_names = index_idx.iter().map(|&i| self.headers[i].clone()).collect();
        Table::new(index_names, value_names, rows)
    }
}

fn parse_cell(cells: &[String], col: usize, headers: &[String], row: usize) -> BarplotResult<f64> {
    let raw = cells.get(col).map(String::as_str).unwrap_or("");
    raw.trim().parse::<f64>().map_err(|_| BarplotError::InvalidValue {
        row: row + 1,
        column: headers[col].clone(),
        value: raw.to_string(),
    })
}

/// One table row: its categorical index (outermost first) and numeric values.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub index: Vec<String>,
    pub values: Vec<f64>,
}

/// Rows keyed by a multi-level categorical index.
///
/// The first value column is the bar height, the optional second one its
/// standard deviation.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    index_names: Vec<String>,
    value_names: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(
        index_names: Vec<String>,
        value_names: Vec<String>,
        rows: Vec<Row>,
    ) -> BarplotResult<Self> {
        let expected = index_names.len();
        for (row, r) in rows.iter().enumerate() {
            if r.index.len() != expected {
                return Err(BarplotError::InconsistentIndex {
                    row,
                    expected,
                    found: r.index.len(),
                });
            }
        }
        Ok(Self {
            index_names,
            value_names,
            rows,
        })
    }

    /// Shorthand used mostly by tests: unnamed levels, one value column.
    pub fn from_records<I, S>(records: I) -> BarplotResult<Self>
    where
        I: IntoIterator<Item = (Vec<S>, f64)>,
        S: Into<String>,
    {
        let rows: Vec<Row> = records
            .into_iter()
            .map(|(index, value)| Row {
                index: index.into_iter().map(Into::into).collect(),
                values: vec![value],
            })
            .collect();
        let depth = rows.first().map(|r| r.index.len()).unwrap_or(0);
        let index_names = (0..depth).map(|i| format!("level_{}", i)).collect();
        Self::new(index_names, vec!["value".to_string()], rows)
    }

    /// Number of index levels
    pub fn depth(&self) -> usize {
        self.index_names.len()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn index_names(&self) -> &[String] {
        &self.index_names
    }

    pub fn value_name(&self) -> Option<&str> {
        self.value_names.first().map(String::as_str)
    }

    /// Split off the outer `depth - 2` levels.
    ///
    /// Returns `(key, sub_table)` pairs in row order of first occurrence; each
    /// sub-table keeps only the inner two levels. Tables with two levels or
    /// fewer come back whole under an empty key.
    pub fn partition_outer(&self) -> Vec<(Vec<String>, Table)> {
        let depth = self.depth();
        if depth <= 2 {
            return vec![(Vec::new(), self.clone())];
        }
        let cut = depth - 2;

        let mut partitions: Vec<(Vec<String>, Table)> = Vec::new();
        for row in &self.rows {
            let key = &row.index[..cut];
            let inner = Row {
                index: row.index[cut..].to_vec(),
                values: row.values.clone(),
            };
            match partitions.iter_mut().find(|(k, _)| k.as_slice() == key) {
                Some((_, table)) => table.rows.push(inner),
                None => partitions.push((
                    key.to_vec(),
                    Table {
                        index_names: self.index_names[cut..].to_vec(),
                        value_names: self.value_names.clone(),
                        rows: vec![inner],
                    },
                )),
            }
        }
        partitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_inconsistent_index_rejected() {
        let rows = vec![
            Row { index: strings(&["A", "x"]), values: vec![1.0] },
            Row { index: strings(&["B"]), values: vec![2.0] },
        ];
        let err = Table::new(strings(&["g", "s"]), strings(&["v"]), rows).unwrap_err();
        assert_eq!(err, BarplotError::InconsistentIndex { row: 1, expected: 2, found: 1 });
    }

    #[test]
    fn test_to_table_with_std() {
        let data = PlotData::new(
            strings(&["model", "metric", "score", "err"]),
            vec![strings(&["cnn", "auroc", "0.9", "0.01"]), strings(&["mlp", "auroc", "0.8", "0.02"])],
        );
        let table = data
            .to_table(&strings(&["model", "metric"]), Some("score"), Some("err"))
            .unwrap();
        assert_eq!(table.depth(), 2);
        assert_eq!(table.rows()[1].values, vec![0.8, 0.02]);
        assert_eq!(table.value_name(), Some("score"));
    }

    #[test]
    fn test_to_table_picks_first_free_value_column() {
        let data = PlotData::new(strings(&["g", "v"]), vec![strings(&["A", "3"])]);
        let table = data.to_table(&strings(&["g"]), None, None).unwrap();
        assert_eq!(table.value_name(), Some("v"));
    }

    #[test]
    fn test_to_table_bad_number() {
        let data = PlotData::new(strings(&["g", "v"]), vec![strings(&["A", "abc"])]);
        let err = data.to_table(&strings(&["g"]), Some("v"), None).unwrap_err();
        assert!(matches!(err, BarplotError::InvalidValue { row: 1, .. }));
    }

    #[test]
    fn test_to_table_missing_column() {
        let data = PlotData::new(strings(&["g", "v"]), vec![]);
        let err = data.to_table(&strings(&["nope"]), None, None).unwrap_err();
        assert_eq!(err, BarplotError::MissingColumn("nope".to_string()));
    }

    #[test]
    fn test_from_json() {
        let value = json!([{"g": "A", "v": 1}, {"g": "B", "v": 2.5}]);
        let data = PlotData::from_json(&value).unwrap();
        assert_eq!(data.headers.len(), 2);
        assert_eq!(data.rows.len(), 2);
        assert!(PlotData::from_json(&json!([])).is_err());
    }

    #[test]
    fn test_partition_outer() {
        let table = Table::from_records(vec![
            (vec!["run1", "A", "x"], 1.0),
            (vec!["run2", "A", "x"], 2.0),
            (vec!["run1", "B", "y"], 3.0),
        ])
        .unwrap();
        let parts = table.partition_outer();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].0, strings(&["run1"]));
        assert_eq!(parts[0].1.len(), 2);
        assert_eq!(parts[0].1.depth(), 2);
        assert_eq!(parts[0].1.rows()[1].index, strings(&["B", "y"]));
    }

    #[test]
    fn test_partition_shallow_table_is_whole() {
        let table = Table::from_records(vec![(vec!["A", "x"], 1.0)]).unwrap();
        let parts = table.partition_outer();
        assert_eq!(parts.len(), 1);
        assert!(parts[0].0.is_empty());
    }
}
