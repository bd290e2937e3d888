//! Abstract syntax tree definitions for path expressions
//!
//! Copyright (c) 2025 Jsonatr Team
//! Licensed under the Apache-2.0 license

use std::fmt;

/// A parsed path expression. The leading `$` is implicit.
#[derive(Debug, Clone, PartialEq)]
pub struct PathExpression {
    /// Chain of selectors applied after the root
    pub selectors: Vec<Selector>,
}

/// Individual selector in a path expression
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    /// Child property selector (.property or ['property'])
    Child(ChildSelector),
    /// Array index selector ([index])
    Index(IndexSelector),
    /// Array slice selector ([start:end:step])
    Slice(SliceSelector),
    /// Wildcard selector (*)
    Wildcard,
    /// Recursive descent selector (..)
    RecursiveDescent,
    /// Union selector ([0,2] or ['a','b'])
    Union(UnionSelector),
    /// Filter selector ([?(filter_expr)])
    Filter(FilterSelector),
}

/// Child property selector variants
#[derive(Debug, Clone, PartialEq)]
pub enum ChildSelector {
    /// Property name (e.g., .property)
    Property(String),
    /// Quoted property name (e.g., ['property'])
    QuotedProperty(String),
}

/// Array index selector variants
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndexSelector {
    /// Positive index from start
    Positive(usize),
    /// Negative index from end, stored without its sign
    Negative(usize),
}

/// Array slice selector
#[derive(Debug, Clone, PartialEq)]
pub struct SliceSelector {
    /// Start index (inclusive), None means start from the beginning
    pub start: Option<i64>,
    /// End index (exclusive), None means go to the end
    pub end: Option<i64>,
    /// Step size, never zero
    pub step: i64,
}

/// Union selector containing multiple index or property selectors
#[derive(Debug, Clone, PartialEq)]
pub struct UnionSelector {
    pub selectors: Vec<Selector>,
}

/// Filter selector with filter expression
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSelector {
    pub filter: FilterExpression,
}

/// Filter expression AST
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpression {
    /// Current node reference (@)
    Current,
    /// Document root reference ($)
    Root,
    /// Property access (@.property)
    Property {
        base: Box<FilterExpression>,
        property: String,
    },
    /// Index access (@[index])
    Index {
        base: Box<FilterExpression>,
        index: i64,
    },
    /// Literal value
    Literal(FilterLiteral),
    /// Binary operation
    Binary {
        left: Box<FilterExpression>,
        operator: BinaryOperator,
        right: Box<FilterExpression>,
    },
    /// Logical negation
    Not(Box<FilterExpression>),
}

/// Filter literal values
#[derive(Debug, Clone, PartialEq)]
pub enum FilterLiteral {
    String(String),
    Number(f64),
    Boolean(bool),
    Null,
}

/// Binary operators for filter expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    /// Equality (==)
    Equal,
    /// Inequality (!=)
    NotEqual,
    /// Less than (<)
    LessThan,
    /// Less than or equal (<=)
    LessThanOrEqual,
    /// Greater than (>)
    GreaterThan,
    /// Greater than or equal (>=)
    GreaterThanOrEqual,
    /// Logical AND (&&)
    And,
    /// Logical OR (||)
    Or,
}

impl PathExpression {
    /// Create a new expression from its selectors
    pub fn new(selectors: Vec<Selector>) -> Self {
        Self { selectors }
    }

    /// Whether the expression addresses at most one value.
    ///
    /// Only plain field and index access are singular; every other selector
    /// may match any number of nodes and yields a sequence.
    pub fn is_singular(&self) -> bool {
        self.selectors
            .iter()
            .all(|s| matches!(s, Selector::Child(_) | Selector::Index(_)))
    }

    /// Whether the expression is just `$`
    pub fn is_root(&self) -> bool {
        self.selectors.is_empty()
    }
}

impl ChildSelector {
    /// The member name this selector addresses
    pub fn name(&self) -> &str {
        match self {
            ChildSelector::Property(name) | ChildSelector::QuotedProperty(name) => name,
        }
    }
}

impl BinaryOperator {
    /// Source form of the operator
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::LessThan => "<",
            BinaryOperator::LessThanOrEqual => "<=",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::GreaterThanOrEqual => ">=",
            BinaryOperator::And => "&&",
            BinaryOperator::Or => "||",
        }
    }
}

impl fmt::Display for PathExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$")?;
        let mut after_descent = false;
        for selector in &self.selectors {
            match selector {
                // `..name` rather than `...name`
                Selector::Child(ChildSelector::Property(name)) if after_descent => write!(f, "{}", name)?,
                Selector::Wildcard if after_descent => write!(f, "*")?,
                other => write!(f, "{}", other)?,
            }
            after_descent = matches!(selector, Selector::RecursiveDescent);
        }
        Ok(())
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Child(child) => write!(f, "{}", child),
            Selector::Index(index) => write!(f, "[{}]", index),
            Selector::Slice(slice) => write!(f, "{}", slice),
            Selector::Wildcard => write!(f, "[*]"),
            Selector::RecursiveDescent => write!(f, ".."),
            Selector::Union(union) => write!(f, "{}", union),
            Selector::Filter(filter) => write!(f, "[?({})]", filter.filter),
        }
    }
}

impl fmt::Display for ChildSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChildSelector::Property(name) => write!(f, ".{}", name),
            ChildSelector::QuotedProperty(name) => write!(f, "['{}']", name),
        }
    }
}

impl fmt::Display for IndexSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexSelector::Positive(index) => write!(f, "{}", index),
            IndexSelector::Negative(index) => write!(f, "-{}", index),
        }
    }
}

impl fmt::Display for SliceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        if let Some(start) = self.start {
            write!(f, "{}", start)?;
        }
        write!(f, ":")?;
        if let Some(end) = self.end {
            write!(f, "{}", end)?;
        }
        if self.step != 1 {
            write!(f, ":{}", self.step)?;
        }
        write!(f, "]")
    }
}

impl fmt::Display for UnionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, selector) in self.selectors.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            match selector {
                Selector::Index(index) => write!(f, "{}", index)?,
                Selector::Child(child) => write!(f, "'{}'", child.name())?,
                other => write!(f, "{}", other)?,
            }
        }
        write!(f, "]")
    }
}

impl fmt::Display for FilterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterExpression::Current => write!(f, "@"),
            FilterExpression::Root => write!(f, "$"),
            FilterExpression::Property { base, property } => write!(f, "{}.{}", base, property),
            FilterExpression::Index { base, index } => write!(f, "{}[{}]", base, index),
            FilterExpression::Literal(literal) => write!(f, "{}", literal),
            FilterExpression::Binary { left, operator, right } => {
                write!(f, "{} {} {}", left, operator.symbol(), right)
            }
            FilterExpression::Not(operand) => write!(f, "!({})", operand),
        }
    }
}

impl fmt::Display for FilterLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterLiteral::String(s) => write!(f, "'{}'", s),
            FilterLiteral::Number(n) => write!(f, "{}", n),
            FilterLiteral::Boolean(b) => write!(f, "{}", b),
            FilterLiteral::Null => write!(f, "null"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singular_classification() {
        let singular = PathExpression::new(vec![
            Selector::Child(ChildSelector::Property("a".into())),
            Selector::Index(IndexSelector::Negative(1)),
        ]);
        assert!(singular.is_singular());

        let multi = PathExpression::new(vec![
            Selector::RecursiveDescent,
            Selector::Child(ChildSelector::Property("book".into())),
        ]);
        assert!(!multi.is_singular());

        assert!(PathExpression::new(vec![]).is_singular());
    }

    #[test]
    fn test_display_round_trips_shape() {
        let expr = PathExpression::new(vec![
            Selector::RecursiveDescent,
            Selector::Child(ChildSelector::Property("book".into())),
            Selector::Filter(FilterSelector {
                filter: FilterExpression::Binary {
                    left: Box::new(FilterExpression::Property {
                        base: Box::new(FilterExpression::Current),
                        property: "category".into(),
                    }),
                    operator: BinaryOperator::Equal,
                    right: Box::new(FilterExpression::Literal(FilterLiteral::String(
                        "fiction".into(),
                    ))),
                },
            }),
            Selector::Child(ChildSelector::Property("title".into())),
        ]);
        assert_eq!(expr.to_string(), "$..book[?(@.category == 'fiction')].title");
    }

    #[test]
    fn test_slice_display() {
        let slice = SliceSelector { start: Some(-2), end: None, step: 1 };
        assert_eq!(slice.to_string(), "[-2:]");
        let slice = SliceSelector { start: None, end: None, step: -1 };
        assert_eq!(slice.to_string(), "[::-1]");
    }
}
