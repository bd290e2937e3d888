//! Path expression parser
//!
//! A recursive descent parser over the supported subset:
//! `$`, `.name`, `['name']`, `[i]`, `[-i]`, `[start:end:step]`, `[i,j]`,
//! `*`, `..` and filters `[?(...)]` with comparison and logical operators.
//!
//! Copyright (c) 2025 Jsonatr Team
//! Licensed under the Apache-2.0 license

use super::ast::*;
use super::error::*;
use std::iter::Peekable;
use std::str::Chars;

/// Path expression parser
pub struct Parser<'a> {
    /// Input string being parsed
    input: &'a str,
    /// Character iterator
    chars: Peekable<Chars<'a>>,
    /// Current byte offset in input
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new parser for the given input
    pub fn new(input: &'a str) -> PathResult<Self> {
        if input.trim().is_empty() {
            return Err(PathError::parse("Empty path expression", 0, input));
        }

        Ok(Self {
            input,
            chars: input.chars().peekable(),
            position: 0,
        })
    }

    /// Parse the path expression into an AST
    pub fn parse(mut self) -> PathResult<PathExpression> {
        self.parse_root()?;
        let mut selectors = Vec::new();

        loop {
            self.skip_whitespace();
            if self.is_at_end() {
                break;
            }
            self.parse_selector(&mut selectors)?;
        }

        Ok(PathExpression::new(selectors))
    }

    /// Parse the root selector ($)
    fn parse_root(&mut self) -> PathResult<()> {
        self.skip_whitespace();

        if self.current_char() != Some('$') {
            return Err(self.unexpected("Path must start with $", vec!["$".to_string()]));
        }

        self.advance();
        Ok(())
    }

    /// Parse one selector, or two for `..name`
    fn parse_selector(&mut self, selectors: &mut Vec<Selector>) -> PathResult<()> {
        match self.current_char() {
            Some('.') => self.parse_dot_selector(selectors),
            Some('[') => {
                let selector = self.parse_bracket_selector()?;
                selectors.push(selector);
                Ok(())
            }
            Some(_) => Err(self.unexpected(
                "Unexpected character in selector",
                vec![".".to_string(), "[".to_string()],
            )),
            None => Err(PathError::parse(
                "Unexpected end of input",
                self.position,
                self.input,
            )),
        }
    }

    /// Parse dot notation selector (.property, .*, or ..)
    fn parse_dot_selector(&mut self, selectors: &mut Vec<Selector>) -> PathResult<()> {
        self.advance(); // consume '.'

        if self.current_char() == Some('.') {
            self.advance(); // consume second '.'
            selectors.push(Selector::RecursiveDescent);

            return match self.current_char() {
                Some('[') => {
                    let selector = self.parse_bracket_selector()?;
                    selectors.push(selector);
                    Ok(())
                }
                Some('*') => {
                    self.advance();
                    selectors.push(Selector::Wildcard);
                    Ok(())
                }
                _ => {
                    let property = self.parse_identifier()?;
                    selectors.push(Selector::Child(ChildSelector::Property(property)));
                    Ok(())
                }
            };
        }

        if self.current_char() == Some('*') {
            self.advance();
            selectors.push(Selector::Wildcard);
            return Ok(());
        }

        let property = self.parse_identifier()?;
        selectors.push(Selector::Child(ChildSelector::Property(property)));
        Ok(())
    }

    /// Parse bracket notation selector
    fn parse_bracket_selector(&mut self) -> PathResult<Selector> {
        self.advance(); // consume '['
        self.skip_whitespace();

        match self.current_char() {
            Some('?') => return self.parse_filter_selector(),
            Some('*') => {
                self.advance();
                self.skip_whitespace();
                self.expect_char(']')?;
                return Ok(Selector::Wildcard);
            }
            Some('\'') | Some('"') => return self.parse_quoted_selector(),
            _ => {}
        }

        // Numeric index, slice, or union of indices
        let start_pos = self.position;
        let mut has_colon = false;
        let mut union_parts = Vec::new();
        let mut current_part = String::new();

        while self.current_char() != Some(']') {
            match self.current_char() {
                Some(':') => {
                    has_colon = true;
                    current_part.push(':');
                    self.advance();
                }
                Some(',') => {
                    union_parts.push(current_part.trim().to_string());
                    current_part.clear();
                    self.advance();
                }
                Some(ch) if ch.is_ascii_digit() || ch == '-' || ch.is_whitespace() => {
                    if !ch.is_whitespace() {
                        current_part.push(ch);
                    }
                    self.advance();
                }
                Some(_) => {
                    return Err(self.unexpected(
                        "Invalid character in bracket selector",
                        vec!["digit".to_string(), ":".to_string(), ",".to_string(), "]".to_string()],
                    ));
                }
                None => {
                    return Err(PathError::parse(
                        "Unterminated bracket selector",
                        start_pos,
                        self.input,
                    ));
                }
            }
        }

        union_parts.push(current_part.trim().to_string());
        self.expect_char(']')?;

        if union_parts.len() > 1 {
            if has_colon {
                return Err(PathError::parse(
                    "Slices cannot appear in a union",
                    start_pos,
                    self.input,
                ));
            }
            let mut selectors = Vec::with_capacity(union_parts.len());
            for part in &union_parts {
                selectors.push(self.parse_index_from_string(part, start_pos)?);
            }
            return Ok(Selector::Union(UnionSelector { selectors }));
        }

        let part = &union_parts[0];
        if has_colon {
            self.parse_slice_from_string(part, start_pos)
        } else {
            self.parse_index_from_string(part, start_pos)
        }
    }

    /// Parse `['name']` or `['a','b']`
    fn parse_quoted_selector(&mut self) -> PathResult<Selector> {
        let mut names = vec![self.parse_quoted_string()?];

        loop {
            self.skip_whitespace();
            if self.current_char() == Some(',') {
                self.advance();
                self.skip_whitespace();
                names.push(self.parse_quoted_string()?);
            } else {
                break;
            }
        }

        self.expect_char(']')?;

        if names.len() == 1 {
            let name = names.remove(0);
            return Ok(Selector::Child(ChildSelector::QuotedProperty(name)));
        }

        Ok(Selector::Union(UnionSelector {
            selectors: names
                .into_iter()
                .map(|name| Selector::Child(ChildSelector::QuotedProperty(name)))
                .collect(),
        }))
    }

    /// Parse a filter selector [?(...)]
    fn parse_filter_selector(&mut self) -> PathResult<Selector> {
        self.advance(); // consume '?'
        self.skip_whitespace();

        let filter = self.parse_logical_or()?;

        self.skip_whitespace();
        self.expect_char(']')?;

        Ok(Selector::Filter(FilterSelector { filter }))
    }

    /// Parse logical OR expression
    fn parse_logical_or(&mut self) -> PathResult<FilterExpression> {
        let mut expr = self.parse_logical_and()?;

        loop {
            self.skip_whitespace();
            if !self.match_operator("||") {
                break;
            }
            let right = self.parse_logical_and()?;
            expr = FilterExpression::Binary {
                left: Box::new(expr),
                operator: BinaryOperator::Or,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    /// Parse logical AND expression
    fn parse_logical_and(&mut self) -> PathResult<FilterExpression> {
        let mut expr = self.parse_comparison()?;

        loop {
            self.skip_whitespace();
            if !self.match_operator("&&") {
                break;
            }
            let right = self.parse_comparison()?;
            expr = FilterExpression::Binary {
                left: Box::new(expr),
                operator: BinaryOperator::And,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    /// Parse a single (non-associative) comparison
    fn parse_comparison(&mut self) -> PathResult<FilterExpression> {
        let left = self.parse_unary()?;
        self.skip_whitespace();

        // Two-character operators must be tried before their prefixes
        let operator = if self.match_operator("==") {
            BinaryOperator::Equal
        } else if self.match_operator("!=") {
            BinaryOperator::NotEqual
        } else if self.match_operator("<=") {
            BinaryOperator::LessThanOrEqual
        } else if self.match_operator(">=") {
            BinaryOperator::GreaterThanOrEqual
        } else if self.match_operator("<") {
            BinaryOperator::LessThan
        } else if self.match_operator(">") {
            BinaryOperator::GreaterThan
        } else {
            return Ok(left);
        };

        let right = self.parse_unary()?;
        Ok(FilterExpression::Binary {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        })
    }

    /// Parse unary expressions
    fn parse_unary(&mut self) -> PathResult<FilterExpression> {
        self.skip_whitespace();

        if self.current_char() == Some('!') && self.peek_char() != Some('=') {
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(FilterExpression::Not(Box::new(operand)));
        }

        self.parse_primary()
    }

    /// Parse primary expressions
    fn parse_primary(&mut self) -> PathResult<FilterExpression> {
        self.skip_whitespace();

        match self.current_char() {
            Some('(') => {
                self.advance();
                let expr = self.parse_logical_or()?;
                self.skip_whitespace();
                self.expect_char(')')?;
                Ok(expr)
            }
            Some('@') => {
                self.advance();
                self.parse_path_expression(FilterExpression::Current)
            }
            Some('$') => {
                self.advance();
                self.parse_path_expression(FilterExpression::Root)
            }
            Some('\'') | Some('"') => {
                let value = self.parse_quoted_string()?;
                Ok(FilterExpression::Literal(FilterLiteral::String(value)))
            }
            Some(ch) if ch.is_ascii_digit() || ch == '-' => {
                let number = self.parse_number()?;
                Ok(FilterExpression::Literal(FilterLiteral::Number(number)))
            }
            Some(ch) if ch.is_alphabetic() => {
                let start = self.position;
                let ident = self.parse_identifier()?;
                match ident.as_str() {
                    "true" => Ok(FilterExpression::Literal(FilterLiteral::Boolean(true))),
                    "false" => Ok(FilterExpression::Literal(FilterLiteral::Boolean(false))),
                    "null" => Ok(FilterExpression::Literal(FilterLiteral::Null)),
                    _ => Err(PathError::parse(
                        format!("Unexpected identifier: {}", ident),
                        start,
                        self.input,
                    )),
                }
            }
            Some(_) => Err(self.unexpected(
                "Unexpected character in filter expression",
                vec![
                    "@".to_string(),
                    "$".to_string(),
                    "'".to_string(),
                    "\"".to_string(),
                    "digit".to_string(),
                    "true/false/null".to_string(),
                ],
            )),
            None => Err(PathError::parse(
                "Unexpected end of input in filter expression",
                self.position,
                self.input,
            )),
        }
    }

    /// Parse relative path steps after `@` or `$` inside a filter
    fn parse_path_expression(&mut self, base: FilterExpression) -> PathResult<FilterExpression> {
        let mut expr = base;

        loop {
            match self.current_char() {
                Some('.') => {
                    self.advance();
                    let property = self.parse_identifier()?;
                    expr = FilterExpression::Property {
                        base: Box::new(expr),
                        property,
                    };
                }
                Some('[') => {
                    self.advance();
                    self.skip_whitespace();
                    if matches!(self.current_char(), Some('\'') | Some('"')) {
                        let property = self.parse_quoted_string()?;
                        self.skip_whitespace();
                        self.expect_char(']')?;
                        expr = FilterExpression::Property {
                            base: Box::new(expr),
                            property,
                        };
                    } else {
                        let start = self.position;
                        let number = self.parse_number()?;
                        if number.fract() != 0.0 {
                            return Err(PathError::parse(
                                format!("Invalid array index: {}", number),
                                start,
                                self.input,
                            ));
                        }
                        self.skip_whitespace();
                        self.expect_char(']')?;
                        expr = FilterExpression::Index {
                            base: Box::new(expr),
                            index: number as i64,
                        };
                    }
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    /// Parse slice from string representation
    fn parse_slice_from_string(&self, s: &str, position: usize) -> PathResult<Selector> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() > 3 {
            return Err(PathError::parse(
                format!("Invalid slice: {}", s),
                position,
                self.input,
            ));
        }

        let bound = |part: Option<&&str>, what: &str| -> PathResult<Option<i64>> {
            match part {
                Some(text) if !text.is_empty() => text.parse().map(Some).map_err(|_| {
                    PathError::parse(format!("Invalid slice {}: {}", what, text), position, self.input)
                }),
                _ => Ok(None),
            }
        };

        let start = bound(parts.first(), "start")?;
        let end = bound(parts.get(1), "end")?;
        let step = bound(parts.get(2), "step")?.unwrap_or(1);

        if step == 0 {
            return Err(PathError::parse("Slice step cannot be zero", position, self.input));
        }

        Ok(Selector::Slice(SliceSelector { start, end, step }))
    }

    /// Parse index from string representation
    fn parse_index_from_string(&self, s: &str, position: usize) -> PathResult<Selector> {
        let index: i64 = s.parse().map_err(|_| {
            PathError::parse(format!("Invalid array index: '{}'", s), position, self.input)
        })?;

        let index_selector = if index < 0 {
            IndexSelector::Negative(index.unsigned_abs() as usize)
        } else {
            IndexSelector::Positive(index as usize)
        };

        Ok(Selector::Index(index_selector))
    }

    /// Parse an identifier
    fn parse_identifier(&mut self) -> PathResult<String> {
        let mut identifier = String::new();

        if !self
            .current_char()
            .map(|c| c.is_alphabetic() || c == '_')
            .unwrap_or(false)
        {
            return Err(self.unexpected("Expected identifier", vec!["letter or _".to_string()]));
        }

        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' {
                identifier.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        Ok(identifier)
    }

    /// Parse a quoted string
    fn parse_quoted_string(&mut self) -> PathResult<String> {
        let start = self.position;
        let quote_char = match self.advance() {
            Some(ch @ ('\'' | '"')) => ch,
            _ => {
                return Err(PathError::parse("Expected quoted string", start, self.input));
            }
        };

        let mut string = String::new();
        let mut escaped = false;

        while let Some(ch) = self.advance() {
            if escaped {
                match ch {
                    'n' => string.push('\n'),
                    'r' => string.push('\r'),
                    't' => string.push('\t'),
                    '\\' | '\'' | '"' => string.push(ch),
                    _ => {
                        string.push('\\');
                        string.push(ch);
                    }
                }
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == quote_char {
                return Ok(string);
            } else {
                string.push(ch);
            }
        }

        Err(PathError::parse("Unterminated string literal", start, self.input))
    }

    /// Parse a number
    fn parse_number(&mut self) -> PathResult<f64> {
        let start = self.position;
        let mut number_str = String::new();

        if self.current_char() == Some('-') {
            number_str.push('-');
            self.advance();
        }

        self.take_digits(&mut number_str);

        if self.current_char() == Some('.') && self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
            number_str.push('.');
            self.advance();
            self.take_digits(&mut number_str);
        }

        if let Some(ch @ ('e' | 'E')) = self.current_char() {
            number_str.push(ch);
            self.advance();
            if let Some(sign @ ('+' | '-')) = self.current_char() {
                number_str.push(sign);
                self.advance();
            }
            self.take_digits(&mut number_str);
        }

        number_str.parse().map_err(|_| {
            PathError::parse(format!("Invalid number: '{}'", number_str), start, self.input)
        })
    }

    fn take_digits(&mut self, out: &mut String) {
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                out.push(ch);
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Match and consume an operator
    fn match_operator(&mut self, op: &str) -> bool {
        if self.input[self.position..].starts_with(op) {
            for _ in op.chars() {
                self.advance();
            }
            true
        } else {
            false
        }
    }

    /// Skip whitespace characters
    fn skip_whitespace(&mut self) {
        while self.current_char().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    /// Get current character without advancing
    fn current_char(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    /// Get next character without advancing
    fn peek_char(&self) -> Option<char> {
        let mut clone = self.chars.clone();
        clone.next();
        clone.next()
    }

    /// Advance to next character
    fn advance(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        self.position += ch.len_utf8();
        Some(ch)
    }

    /// Check if at end of input
    fn is_at_end(&mut self) -> bool {
        self.current_char().is_none()
    }

    /// Expect a specific character
    fn expect_char(&mut self, expected: char) -> PathResult<()> {
        match self.current_char() {
            Some(ch) if ch == expected => {
                self.advance();
                Ok(())
            }
            Some(_) => Err(self.unexpected(
                format!("Expected '{}'", expected),
                vec![expected.to_string()],
            )),
            None => Err(PathError::parse(
                format!("Expected '{}' but reached end of input", expected),
                self.position,
                self.input,
            )),
        }
    }

    fn unexpected(&mut self, message: impl Into<String>, expected: Vec<String>) -> PathError {
        let found = self
            .current_char()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "EOF".to_string());
        PathError::syntax(message, self.position, self.input, expected, found)
    }
}
