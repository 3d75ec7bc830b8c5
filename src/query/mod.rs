//! Query parsing and execution
//!
//! ## Supported SQL Subset
//!
//! Read path for pulling training rows out of a registered table:
//! - SELECT with column list or *
//! - FROM single table (no JOINs)
//! - WHERE with simple predicates (>, <, =, >=, <=, !=) joined by AND
//! - LIMIT
//!
//! Aggregations, GROUP BY, ORDER BY and sub-queries are rejected.
//!
//! References:
//! - sqlparser-rs: <https://docs.rs/sqlparser>

mod executor;

pub use executor::QueryExecutor;

use sqlparser::ast::{
    BinaryOperator, Expr, GroupByExpr, Query, Select, SelectItem, SetExpr, Statement,
    UnaryOperator, Value,
};
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

use crate::{Error, Result};

/// Parsed SQL query with extracted components
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    /// Selected columns (or * for all)
    pub columns: Vec<String>,
    /// Table name
    pub table: String,
    /// WHERE clause predicates, all of which must hold
    pub filter: Vec<Predicate>,
    /// LIMIT count (optional)
    pub limit: Option<usize>,
}

impl QueryPlan {
    /// True when the projection is `*`
    #[must_use]
    pub fn selects_all(&self) -> bool {
        self.columns.len() == 1 && self.columns[0] == "*"
    }
}

/// Comparison operator of a WHERE predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// `>`
    Gt,
    /// `>=`
    GtEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `=`
    Eq,
    /// `!=` or `<>`
    NotEq,
}

impl Comparison {
    /// Evaluate `lhs op rhs`
    #[must_use]
    pub fn holds(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Self::Gt => lhs > rhs,
            Self::GtEq => lhs >= rhs,
            Self::Lt => lhs < rhs,
            Self::LtEq => lhs <= rhs,
            Self::Eq => (lhs - rhs).abs() < f64::EPSILON,
            Self::NotEq => (lhs - rhs).abs() >= f64::EPSILON,
        }
    }

    /// Operator with its operands swapped (`5 < x` is `x > 5`)
    const fn flipped(self) -> Self {
        match self {
            Self::Gt => Self::Lt,
            Self::GtEq => Self::LtEq,
            Self::Lt => Self::Gt,
            Self::LtEq => Self::GtEq,
            Self::Eq => Self::Eq,
            Self::NotEq => Self::NotEq,
        }
    }

    fn from_operator(op: &BinaryOperator) -> Option<Self> {
        match op {
            BinaryOperator::Gt => Some(Self::Gt),
            BinaryOperator::GtEq => Some(Self::GtEq),
            BinaryOperator::Lt => Some(Self::Lt),
            BinaryOperator::LtEq => Some(Self::LtEq),
            BinaryOperator::Eq => Some(Self::Eq),
            BinaryOperator::NotEq => Some(Self::NotEq),
            _ => None,
        }
    }
}

/// A single `column op literal` predicate
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    /// Column the predicate reads
    pub column: String,
    /// Comparison operator
    pub op: Comparison,
    /// Numeric literal compared against
    pub value: f64,
}

/// Query parser
#[derive(Debug)]
pub struct QueryEngine {
    dialect: GenericDialect,
}

impl Default for QueryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryEngine {
    /// Create a new query engine
    #[must_use]
    pub const fn new() -> Self {
        Self {
            dialect: GenericDialect {},
        }
    }

    /// Parse SQL query into query plan
    ///
    /// # Errors
    /// Returns error if:
    /// - SQL syntax is invalid or the query is empty
    /// - Query uses unsupported features (JOINs, aggregates, etc.)
    /// - Multiple statements provided
    ///
    /// # Example
    /// ```
    /// use credit_sweep::query::QueryEngine;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let engine = QueryEngine::new();
    /// let plan = engine.parse("SELECT age, cred FROM credit WHERE age >= 18 AND cred = 1")?;
    /// assert_eq!(plan.table, "credit");
    /// assert_eq!(plan.filter.len(), 2);
    /// # Ok(())
    /// # }
    /// ```
    pub fn parse(&self, sql: &str) -> Result<QueryPlan> {
        if sql.trim().is_empty() {
            return Err(Error::ParseError("Empty query".to_string()));
        }

        let statements = Parser::parse_sql(&self.dialect, sql)
            .map_err(|e| Error::ParseError(e.to_string()))?;

        if statements.len() != 1 {
            return Err(Error::ParseError(
                "Only single statements supported".to_string(),
            ));
        }

        let Statement::Query(query) = &statements[0] else {
            return Err(Error::ParseError(
                "Only SELECT queries supported".to_string(),
            ));
        };

        Self::parse_select_query(query)
    }

    fn parse_select_query(query: &Query) -> Result<QueryPlan> {
        let SetExpr::Select(select) = query.body.as_ref() else {
            return Err(Error::ParseError(
                "Only SELECT queries supported".to_string(),
            ));
        };

        if query.order_by.is_some() {
            return Err(Error::ParseError("ORDER BY not supported".to_string()));
        }
        Self::reject_grouping(select)?;

        let table = Self::extract_table_name(select)?;
        let columns = Self::extract_columns(&select.projection)?;

        let mut filter = Vec::new();
        if let Some(selection) = &select.selection {
            Self::extract_predicates(selection, &mut filter)?;
        }

        let limit = query.limit.as_ref().map(Self::extract_limit).transpose()?;

        Ok(QueryPlan {
            columns,
            table,
            filter,
            limit,
        })
    }

    fn reject_grouping(select: &Select) -> Result<()> {
        let grouped = match &select.group_by {
            GroupByExpr::All(_) => true,
            GroupByExpr::Expressions(exprs, _) => !exprs.is_empty(),
        };
        if grouped || select.having.is_some() {
            return Err(Error::ParseError("GROUP BY not supported".to_string()));
        }
        Ok(())
    }

    fn extract_table_name(select: &Select) -> Result<String> {
        match select.from.as_slice() {
            [] => Err(Error::ParseError("Missing FROM clause".to_string())),
            [table_with_joins] => {
                if !table_with_joins.joins.is_empty() {
                    return Err(Error::ParseError("JOINs not supported".to_string()));
                }
                Ok(table_with_joins.relation.to_string())
            }
            _ => Err(Error::ParseError(
                "Multiple tables not supported".to_string(),
            )),
        }
    }

    fn extract_columns(projection: &[SelectItem]) -> Result<Vec<String>> {
        let mut columns = Vec::new();

        for item in projection {
            match item {
                SelectItem::Wildcard(_) => columns.push("*".to_string()),
                SelectItem::UnnamedExpr(expr) => columns.push(Self::column_name(expr)?),
                SelectItem::ExprWithAlias { .. } => {
                    return Err(Error::ParseError("Column aliases not supported".to_string()))
                }
                SelectItem::QualifiedWildcard(..) => {
                    return Err(Error::ParseError(
                        "Qualified wildcards not supported".to_string(),
                    ))
                }
            }
        }

        if columns.len() > 1 && columns.iter().any(|c| c == "*") {
            return Err(Error::ParseError(
                "* cannot be mixed with named columns".to_string(),
            ));
        }

        Ok(columns)
    }

    fn column_name(expr: &Expr) -> Result<String> {
        match expr {
            Expr::Identifier(ident) => Ok(ident.value.clone()),
            Expr::CompoundIdentifier(parts) => parts
                .last()
                .map(|ident| ident.value.clone())
                .ok_or_else(|| Error::ParseError("Empty identifier".to_string())),
            other => Err(Error::ParseError(format!(
                "Unsupported select expression: {other}"
            ))),
        }
    }

    fn extract_predicates(expr: &Expr, out: &mut Vec<Predicate>) -> Result<()> {
        match expr {
            Expr::Nested(inner) => Self::extract_predicates(inner, out),
            Expr::BinaryOp {
                left,
                op: BinaryOperator::And,
                right,
            } => {
                Self::extract_predicates(left, out)?;
                Self::extract_predicates(right, out)
            }
            Expr::BinaryOp { left, op, right } => {
                let comparison = Comparison::from_operator(op).ok_or_else(|| {
                    Error::ParseError(format!("Unsupported operator in WHERE: {op}"))
                })?;

                let predicate = match (Self::column_name(left), Self::literal(right)) {
                    (Ok(column), Some(value)) => Predicate {
                        column,
                        op: comparison,
                        value,
                    },
                    _ => match (Self::literal(left), Self::column_name(right)) {
                        (Some(value), Ok(column)) => Predicate {
                            column,
                            op: comparison.flipped(),
                            value,
                        },
                        _ => {
                            return Err(Error::ParseError(format!(
                                "Predicate must compare a column with a number: {expr}"
                            )))
                        }
                    },
                };
                out.push(predicate);
                Ok(())
            }
            other => Err(Error::ParseError(format!(
                "Unsupported WHERE expression: {other}"
            ))),
        }
    }

    fn literal(expr: &Expr) -> Option<f64> {
        match expr {
            Expr::Value(Value::Number(n, _)) => n.parse().ok(),
            Expr::UnaryOp {
                op: UnaryOperator::Minus,
                expr,
            } => Self::literal(expr).map(|v| -v),
            Expr::Nested(inner) => Self::literal(inner),
            _ => None,
        }
    }

    fn extract_limit(expr: &Expr) -> Result<usize> {
        if let Expr::Value(Value::Number(n, _)) = expr {
            n.parse()
                .map_err(|_| Error::ParseError(format!("Invalid LIMIT: {n}")))
        } else {
            Err(Error::ParseError(format!("Invalid LIMIT: {expr}")))
        }
    }
}
