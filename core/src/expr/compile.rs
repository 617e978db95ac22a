use super::{BinaryOp, Expr, Method};
use crate::error::{CruditeError, Result};

/// Which side of an operator a node is compiled on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    /// Members render their property name
    Identifier,
    /// Members render their captured value
    Value,
}

const NULL: &str = "null";

/// Compiles an expression tree into a SQL boolean fragment.
///
/// `None` means "no filter" and yields an empty string. Values are
/// interpolated as literals, not bound.
pub fn compile_where(expr: Option<&Expr>) -> Result<String> {
    match expr {
        None => Ok(String::new()),
        Some(expr) => compile(expr, Side::Identifier),
    }
}

fn compile(expr: &Expr, side: Side) -> Result<String> {
    match expr {
        Expr::Binary { op, left, right } => binary(*op, left, right, true),
        Expr::Member { name, value } => match side {
            Side::Identifier => Ok(name.clone()),
            Side::Value => value.as_ref().map(|v| v.to_literal()).ok_or_else(|| {
                CruditeError::unsupported(format!(
                    "member `{name}` has no captured value on the value side"
                ))
            }),
        },
        Expr::Constant(value) => Ok(value.to_literal()),
        Expr::MethodCall { method, args } => method_call(*method, args),
        Expr::Unary(operand) => compile(operand, Side::Value),
        Expr::Array(_) => Err(CruditeError::unsupported(
            "an array is only valid as the list of IN / NOT IN",
        )),
    }
}

fn binary(op: BinaryOp, left: &Expr, right: &Expr, parenthesize: bool) -> Result<String> {
    let lhs = operand(op, left, Side::Identifier)?;
    let rhs = operand(op, right, Side::Value)?;

    let body = match (op, rhs.as_str()) {
        (BinaryOp::Eq, NULL) => format!("{lhs} is null"),
        (BinaryOp::Ne, NULL) => format!("{lhs} is not null"),
        _ => format!("{lhs}{}{rhs}", op.as_sql()),
    };

    Ok(if parenthesize {
        format!("({body})")
    } else {
        body
    })
}

/// Comparisons directly under AND / OR are emitted bare.
fn operand(parent: BinaryOp, child: &Expr, side: Side) -> Result<String> {
    match child {
        Expr::Binary { op, left, right } if parent.is_logical() && op.is_comparison() => {
            binary(*op, left, right, false)
        }
        _ => compile(child, side),
    }
}

fn method_call(method: Method, args: &[Expr]) -> Result<String> {
    let [target, argument] = args else {
        return Err(CruditeError::unsupported(format!(
            "{method:?} takes 2 arguments, got {}",
            args.len()
        )));
    };

    let target = compile(target, Side::Identifier)?;
    Ok(match method {
        Method::Like => format!("({target} LIKE {})", compile(argument, Side::Value)?),
        Method::NotLike => format!("({target} NOT LIKE {})", compile(argument, Side::Value)?),
        Method::In => format!("{target} IN ({})", list(argument)?),
        Method::NotIn => format!("{target} NOT IN ({})", list(argument)?),
    })
}

fn list(argument: &Expr) -> Result<String> {
    match argument {
        Expr::Array(items) if items.is_empty() => Err(CruditeError::unsupported(
            "IN / NOT IN needs at least one item",
        )),
        Expr::Array(items) => Ok(items
            .iter()
            .map(|item| compile(item, Side::Value))
            .collect::<Result<Vec<_>>>()?
            .join(",")),
        other => compile(other, Side::Value),
    }
}
