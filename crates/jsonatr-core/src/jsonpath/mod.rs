//! Path resolver for transformation expressions
//!
//! Supports the JSONPath subset used by transformation specs: field and index
//! access, slices, unions, wildcards, recursive descent, and filters with
//! comparison and logical operators.
//!
//! A path is either *singular* (only field and index access) and resolves to
//! exactly one value, or *multi-match* and resolves to a JSON array holding
//! every match in document order.
//!
//! Copyright (c) 2025 Jsonatr Team
//! Licensed under the Apache-2.0 license

pub mod ast;
pub mod error;
pub mod executor;
pub mod filter;
pub mod parser;
pub mod selector;

#[cfg(test)]
mod prop_tests;

pub use ast::{PathExpression, Selector};
pub use error::{PathError, PathResult};
pub use executor::{ExecutionContext, Executor};
pub use filter::{is_truthy, value_type_name, values_equal};
pub use parser::Parser;

use serde_json::Value;

/// A parsed path query ready for repeated resolution
#[derive(Debug, Clone, PartialEq)]
pub struct PathQuery {
    expression: PathExpression,
}

impl PathQuery {
    /// Parse a path expression starting with `$`
    pub fn parse(path: &str) -> PathResult<Self> {
        let expression = Parser::new(path)?.parse()?;
        Ok(Self { expression })
    }

    /// Whether the query resolves to a single value rather than a sequence
    pub fn is_singular(&self) -> bool {
        self.expression.is_singular()
    }

    /// Resolve against a document.
    ///
    /// Singular queries return the addressed value or fail; multi-match
    /// queries return an array of all matches, possibly empty.
    pub fn resolve(&self, data: &Value) -> PathResult<Value> {
        self.resolve_with(&Executor::new(), data)
    }

    /// Resolve using a caller-supplied executor
    pub fn resolve_with(&self, executor: &Executor, data: &Value) -> PathResult<Value> {
        if self.is_singular() {
            executor.resolve_singular(&self.expression, data).cloned()
        } else {
            let matches = executor.execute(&self.expression, data)?;
            Ok(Value::Array(matches.into_iter().cloned().collect()))
        }
    }

    /// Borrow every matching node without cloning
    pub fn select<'a>(&self, data: &'a Value) -> PathResult<Vec<&'a Value>> {
        Executor::new().execute(&self.expression, data)
    }

    /// Get the parsed expression for inspection
    pub fn expression(&self) -> &PathExpression {
        &self.expression
    }
}

impl std::fmt::Display for PathQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.expression)
    }
}

/// Parse and resolve in one step
pub fn resolve(path: &str, data: &Value) -> PathResult<Value> {
    PathQuery::parse(path)?.resolve(data)
}

/// Parse and select in one step
pub fn select<'a>(path: &str, data: &'a Value) -> PathResult<Vec<&'a Value>> {
    PathQuery::parse(path)?.select(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn book_store() -> Value {
        json!({
            "store": {
                "book": [
                    {"category": "reference", "author": "Nigel Rees",
                     "title": "Sayings of the Century", "price": 8.95},
                    {"category": "fiction", "author": "Evelyn Waugh",
                     "title": "Sword of Honour", "price": 12.99},
                    {"category": "fiction", "author": "Herman Melville",
                     "title": "Moby Dick", "isbn": "0-553-21311-3", "price": 8.99},
                    {"category": "fiction", "author": "J. R. R. Tolkien",
                     "title": "The Lord of the Rings", "isbn": "0-395-19395-8", "price": 22.99}
                ],
                "bicycle": {"color": "red", "price": 19.95}
            }
        })
    }

    #[test]
    fn test_fiction_titles_in_document_order() {
        let data = book_store();
        let titles = resolve("$..book[?(@.category=='fiction')].title", &data)
            .expect("query should resolve");
        assert_eq!(
            titles,
            json!(["Sword of Honour", "Moby Dick", "The Lord of the Rings"])
        );
    }

    #[test]
    fn test_singular_path_returns_value() {
        let data = book_store();
        assert_eq!(
            resolve("$.store.bicycle.color", &data),
            Ok(json!("red"))
        );
        assert_eq!(
            resolve("$['store']['book'][0]['author']", &data),
            Ok(json!("Nigel Rees"))
        );
    }

    #[test]
    fn test_singular_path_missing_is_error() {
        let data = book_store();
        assert!(matches!(
            resolve("$.store.car", &data),
            Err(PathError::NotFound { .. })
        ));
    }

    #[test]
    fn test_multi_match_missing_is_empty_sequence() {
        let data = book_store();
        assert_eq!(resolve("$..car", &data), Ok(json!([])));
    }

    #[test]
    fn test_slices_and_unions() {
        let data = book_store();
        assert_eq!(
            resolve("$.store.book[-2:].price", &data),
            Ok(json!([8.99, 22.99]))
        );
        assert_eq!(
            resolve("$.store.book[0,3].author", &data),
            Ok(json!(["Nigel Rees", "J. R. R. Tolkien"]))
        );
        assert_eq!(
            resolve("$.store.book[::-2].title", &data),
            Ok(json!(["The Lord of the Rings", "Sword of Honour"]))
        );
    }

    #[test]
    fn test_recursive_prices() {
        let data = book_store();
        assert_eq!(
            resolve("$..price", &data),
            Ok(json!([8.95, 12.99, 8.99, 22.99, 19.95]))
        );
    }

    #[test]
    fn test_wildcard_over_object() {
        let data = book_store();
        let matches = select("$.store.*", &data).expect("query should resolve");
        assert_eq!(matches.len(), 2);
        assert!(matches[0].is_array());
    }

    #[test]
    fn test_filter_with_existence_and_comparison() {
        let data = book_store();
        assert_eq!(
            resolve("$..book[?(@.isbn && @.price < 20)].title", &data),
            Ok(json!(["Moby Dick"]))
        );
    }

    #[test]
    fn test_display() {
        let query = PathQuery::parse("$.store.book[0]").expect("query should parse");
        assert_eq!(query.to_string(), "$.store.book[0]");
        assert!(query.is_singular());
    }
}
