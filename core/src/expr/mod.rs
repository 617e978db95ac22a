//! Boolean expression trees over entity properties.
//!
//! An [`Expr`] is the typed stand-in for a filter lambda: members name
//! properties (optionally carrying a captured value), constants carry values,
//! and method calls cover `LIKE`/`IN`. [`compile_where`] renders a tree into a
//! SQL fragment usable directly after `WHERE`.
//!
//! ```
//! use crudite_core::expr::{col, compile_where};
//! use crudite_core::Value;
//!
//! let filter = col("Age").gt(18).and(col("Name").eq(Value::Null));
//! assert_eq!(compile_where(Some(&filter)).unwrap(), "(Age>18 AND Name is null)");
//! ```

mod compile;

pub use compile::compile_where;

use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Add,
    Subtract,
    Multiply,
    Divide,
    And,
    Or,
}

impl BinaryOp {
    pub const fn as_sql(&self) -> &'static str {
        match self {
            BinaryOp::Eq => "=",
            BinaryOp::Ne => "<>",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::And => " AND ",
            BinaryOp::Or => " OR ",
        }
    }

    pub const fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Gt | BinaryOp::Ge | BinaryOp::Lt | BinaryOp::Le
        )
    }

    pub const fn is_logical(&self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }
}

/// Method pseudo-operators surfaced through [`Expr::MethodCall`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Like,
    NotLike,
    In,
    NotIn,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// A property reference; `value` is the captured host value used when the
    /// member appears on the value side. Enums are captured as their
    /// integer discriminant.
    Member {
        name: String,
        value: Option<Value>,
    },
    MethodCall {
        method: Method,
        args: Vec<Expr>,
    },
    Constant(Value),
    /// Conversion wrapper; compiles as its operand on the value side.
    Unary(Box<Expr>),
    Array(Vec<Expr>),
}

/// Shorthand for [`Expr::member`].
pub fn col(name: impl Into<String>) -> Expr {
    Expr::member(name)
}

impl Expr {
    pub fn member(name: impl Into<String>) -> Self {
        Expr::Member {
            name: name.into(),
            value: None,
        }
    }

    /// A member carrying a captured value, e.g. `user.age` read from a local.
    pub fn bound(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Expr::Member {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    pub fn constant(value: impl Into<Value>) -> Self {
        Expr::Constant(value.into())
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn call(method: Method, args: Vec<Expr>) -> Self {
        Expr::MethodCall { method, args }
    }

    pub fn unary(operand: Expr) -> Self {
        Expr::Unary(Box::new(operand))
    }

    pub fn array<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Expr::Array(items.into_iter().map(Expr::constant).collect())
    }

    pub fn eq(self, rhs: impl Into<Value>) -> Self {
        Self::binary(BinaryOp::Eq, self, Expr::constant(rhs))
    }

    pub fn ne(self, rhs: impl Into<Value>) -> Self {
        Self::binary(BinaryOp::Ne, self, Expr::constant(rhs))
    }

    pub fn gt(self, rhs: impl Into<Value>) -> Self {
        Self::binary(BinaryOp::Gt, self, Expr::constant(rhs))
    }

    pub fn ge(self, rhs: impl Into<Value>) -> Self {
        Self::binary(BinaryOp::Ge, self, Expr::constant(rhs))
    }

    pub fn lt(self, rhs: impl Into<Value>) -> Self {
        Self::binary(BinaryOp::Lt, self, Expr::constant(rhs))
    }

    pub fn le(self, rhs: impl Into<Value>) -> Self {
        Self::binary(BinaryOp::Le, self, Expr::constant(rhs))
    }

    pub fn and(self, rhs: Expr) -> Self {
        Self::binary(BinaryOp::And, self, rhs)
    }

    pub fn or(self, rhs: Expr) -> Self {
        Self::binary(BinaryOp::Or, self, rhs)
    }

    pub fn like(self, pattern: impl Into<Value>) -> Self {
        Self::call(Method::Like, vec![self, Expr::constant(pattern)])
    }

    pub fn not_like(self, pattern: impl Into<Value>) -> Self {
        Self::call(Method::NotLike, vec![self, Expr::constant(pattern)])
    }

    pub fn in_list<I, V>(self, items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::call(Method::In, vec![self, Expr::array(items)])
    }

    pub fn not_in<I, V>(self, items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::call(Method::NotIn, vec![self, Expr::array(items)])
    }

    /// Compiles this tree; see [`compile_where`].
    pub fn to_sql(&self) -> crate::Result<String> {
        compile_where(Some(self))
    }
}

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        Expr::Constant(value)
    }
}
