//! Query shape shared by every backend: equality filters, ordering, limit.
//!
//! The HTTP client renders a `Query` as PostgREST parameters; the in-memory
//! backend evaluates it directly against JSON rows.

use std::cmp::Ordering;

use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub column: String,
    pub ascending: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    select: Option<String>,
    filters: Vec<(String, Value)>,
    order: Vec<OrderBy>,
    limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Query matching a single row by primary key.
    pub fn by_id(id: &Value) -> Self {
        Self::new().eq("id", id.clone())
    }

    pub fn select(mut self, columns: &str) -> Self {
        self.select = Some(columns.to_string());
        self
    }

    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filters.push((column.to_string(), value.into()));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.order.push(OrderBy {
            column: column.to_string(),
            ascending,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn filters(&self) -> &[(String, Value)] {
        &self.filters
    }

    pub fn has_filters(&self) -> bool {
        !self.filters.is_empty()
    }

    /// Render as PostgREST query parameters.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![(
            "select".to_string(),
            self.select.clone().unwrap_or_else(|| "*".to_string()),
        )];

        for (column, value) in &self.filters {
            params.push((column.clone(), format!("eq.{}", render_value(value))));
        }

        if !self.order.is_empty() {
            let order = self
                .order
                .iter()
                .map(|o| format!("{}.{}", o.column, if o.ascending { "asc" } else { "desc" }))
                .collect::<Vec<_>>()
                .join(",");
            params.push(("order".to_string(), order));
        }

        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }

        params
    }

    /// Whether a row satisfies every equality filter.
    pub fn matches(&self, row: &Value) -> bool {
        self.filters.iter().all(|(column, expected)| {
            row.get(column)
                .map(|actual| values_equal(actual, expected))
                .unwrap_or(false)
        })
    }

    /// Filter, sort and truncate rows the way the REST backend would.
    pub fn apply(&self, rows: &[Value]) -> Vec<Value> {
        let mut selected: Vec<Value> = rows.iter().filter(|r| self.matches(r)).cloned().collect();

        if !self.order.is_empty() {
            selected.sort_by(|a, b| {
                for o in &self.order {
                    let ord = compare_for_order(a.get(&o.column), b.get(&o.column), o.ascending);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                Ordering::Equal
            });
        }

        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }
        selected
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

fn values_equal(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        // ids arrive as strings from the command line
        (Value::Number(a), Value::String(b)) | (Value::String(b), Value::Number(a)) => {
            a.to_string() == *b
        }
        _ => actual == expected,
    }
}

/// Postgres default: nulls sort last ascending, first descending.
fn compare_for_order(a: Option<&Value>, b: Option<&Value>, ascending: bool) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    let ord = match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => compare_values(a, b),
    };
    if ascending {
        ord
    } else {
        ord.reverse()
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_params() {
        let q = Query::new()
            .eq("is_active", true)
            .order("category", true)
            .order("display_order", true)
            .limit(5);
        assert_eq!(
            q.to_params(),
            vec![
                ("select".to_string(), "*".to_string()),
                ("is_active".to_string(), "eq.true".to_string()),
                ("order".to_string(), "category.asc,display_order.asc".to_string()),
                ("limit".to_string(), "5".to_string()),
            ]
        );
    }

    #[test]
    fn test_string_filter_renders_unquoted() {
        let q = Query::new().eq("slug", "hello-world");
        assert!(q
            .to_params()
            .contains(&("slug".to_string(), "eq.hello-world".to_string())));
    }

    #[test]
    fn test_apply_filters_orders_and_limits() {
        let rows = vec![
            json!({"id": 1, "is_active": true, "display_order": 3}),
            json!({"id": 2, "is_active": false, "display_order": 1}),
            json!({"id": 3, "is_active": true, "display_order": 1}),
            json!({"id": 4, "is_active": true, "display_order": null}),
        ];
        let q = Query::new().eq("is_active", true).order("display_order", true);
        let ids: Vec<i64> = q.apply(&rows).iter().map(|r| r["id"].as_i64().unwrap()).collect();
        assert_eq!(ids, vec![3, 1, 4]);

        let limited = q.limit(1).apply(&rows);
        assert_eq!(limited.len(), 1);
    }

    #[test]
    fn test_descending_order() {
        let rows = vec![
            json!({"id": 1, "created_at": "2025-01-01"}),
            json!({"id": 2, "created_at": "2025-03-01"}),
        ];
        let q = Query::new().order("created_at", false);
        assert_eq!(q.apply(&rows)[0]["id"], json!(2));
    }

    #[test]
    fn test_string_id_matches_numeric_column() {
        let row = json!({"id": 7});
        assert!(Query::by_id(&json!("7")).matches(&row));
        assert!(!Query::by_id(&json!("8")).matches(&row));
    }
}
