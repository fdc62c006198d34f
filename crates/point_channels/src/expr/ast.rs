//! Expression tree and its interpreter.
use std::fmt;

/// Runtime value: expressions mix numbers and booleans freely.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value {
    Number(f64),
    Bool(bool),
}

impl Value {
    /// Numeric coercion (`true` is 1, `false` is 0).
    #[inline]
    pub fn to_number(self) -> f64 {
        match self {
            Value::Number(n) => n,
            Value::Bool(b) => f64::from(u8::from(b)),
        }
    }

    /// Truthiness: zero and NaN are false.
    #[inline]
    pub fn truthy(self) -> bool {
        match self {
            Value::Number(n) => n != 0.0 && !n.is_nan(),
            Value::Bool(b) => b,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    StrictEq,
    StrictNe,
    And,
    Or,
}

/// Built-in functions callable from expressions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Func {
    Abs,
    Acos,
    Asin,
    Atan,
    Atan2,
    Cbrt,
    Ceil,
    Cos,
    Exp,
    Floor,
    Log,
    Log10,
    Log2,
    Max,
    Min,
    Pow,
    Round,
    Sign,
    Sin,
    Sqrt,
    Tan,
    Trunc,
}

impl Func {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "abs" => Func::Abs,
            "acos" => Func::Acos,
            "asin" => Func::Asin,
            "atan" => Func::Atan,
            "atan2" => Func::Atan2,
            "cbrt" => Func::Cbrt,
            "ceil" => Func::Ceil,
            "cos" => Func::Cos,
            "exp" => Func::Exp,
            "floor" => Func::Floor,
            "log" => Func::Log,
            "log10" => Func::Log10,
            "log2" => Func::Log2,
            "max" => Func::Max,
            "min" => Func::Min,
            "pow" => Func::Pow,
            "round" => Func::Round,
            "sign" => Func::Sign,
            "sin" => Func::Sin,
            "sqrt" => Func::Sqrt,
            "tan" => Func::Tan,
            "trunc" => Func::Trunc,
            _ => return None,
        })
    }

    /// Required argument count; `None` for variadic functions.
    pub fn arity(self) -> Option<usize> {
        match self {
            Func::Max | Func::Min => None,
            Func::Atan2 | Func::Pow => Some(2),
            _ => Some(1),
        }
    }

    fn call(self, args: &[f64]) -> f64 {
        let a = args.first().copied().unwrap_or(f64::NAN);
        let b = args.get(1).copied().unwrap_or(f64::NAN);
        match self {
            Func::Abs => a.abs(),
            Func::Acos => a.acos(),
            Func::Asin => a.asin(),
            Func::Atan => a.atan(),
            Func::Atan2 => a.atan2(b),
            Func::Cbrt => a.cbrt(),
            Func::Ceil => a.ceil(),
            Func::Cos => a.cos(),
            Func::Exp => a.exp(),
            Func::Floor => a.floor(),
            Func::Log => a.ln(),
            Func::Log10 => a.log10(),
            Func::Log2 => a.log2(),
            Func::Max => args.iter().copied().fold(f64::NEG_INFINITY, nan_max),
            Func::Min => args.iter().copied().fold(f64::INFINITY, nan_min),
            Func::Pow => a.powf(b),
            Func::Round => (a + 0.5).floor(),
            Func::Sign => {
                if a == 0.0 || a.is_nan() {
                    a
                } else {
                    a.signum()
                }
            }
            Func::Sin => a.sin(),
            Func::Sqrt => a.sqrt(),
            Func::Tan => a.tan(),
            Func::Trunc => a.trunc(),
        }
    }
}

// NaN-propagating variants; f64::max ignores NaN.
fn nan_max(acc: f64, x: f64) -> f64 {
    if acc.is_nan() || x.is_nan() {
        f64::NAN
    } else {
        acc.max(x)
    }
}

fn nan_min(acc: f64, x: f64) -> f64 {
    if acc.is_nan() || x.is_nan() {
        f64::NAN
    } else {
        acc.min(x)
    }
}

/// Compiled expression tree over a single parameter.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Literal(Value),
    Param,
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Conditional {
        test: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    Call(Func, Vec<Expr>),
}

impl Expr {
    /// Height of the tree; literals and the parameter count as 1.
    pub fn depth(&self) -> usize {
        match self {
            Expr::Literal(_) | Expr::Param => 1,
            Expr::Unary(_, inner) => 1 + inner.depth(),
            Expr::Binary(_, lhs, rhs) => 1 + lhs.depth().max(rhs.depth()),
            Expr::Conditional {
                test,
                then,
                otherwise,
            } => 1 + test.depth().max(then.depth()).max(otherwise.depth()),
            Expr::Call(_, args) => 1 + args.iter().map(Expr::depth).max().unwrap_or(0),
        }
    }

    /// Evaluate with the parameter bound to `x`.
    pub fn eval(&self, x: f64) -> Value {
        match self {
            Expr::Literal(v) => *v,
            Expr::Param => Value::Number(x),
            Expr::Unary(op, inner) => {
                let v = inner.eval(x);
                match op {
                    UnaryOp::Neg => Value::Number(-v.to_number()),
                    UnaryOp::Plus => Value::Number(v.to_number()),
                    UnaryOp::Not => Value::Bool(!v.truthy()),
                }
            }
            Expr::Binary(BinaryOp::And, lhs, rhs) => {
                let l = lhs.eval(x);
                if l.truthy() {
                    rhs.eval(x)
                } else {
                    l
                }
            }
            Expr::Binary(BinaryOp::Or, lhs, rhs) => {
                let l = lhs.eval(x);
                if l.truthy() {
                    l
                } else {
                    rhs.eval(x)
                }
            }
            Expr::Binary(op, lhs, rhs) => binary(*op, lhs.eval(x), rhs.eval(x)),
            Expr::Conditional {
                test,
                then,
                otherwise,
            } => {
                if test.eval(x).truthy() {
                    then.eval(x)
                } else {
                    otherwise.eval(x)
                }
            }
            Expr::Call(func, args) => {
                let values: Vec<f64> = args.iter().map(|a| a.eval(x).to_number()).collect();
                Value::Number(func.call(&values))
            }
        }
    }
}

fn binary(op: BinaryOp, l: Value, r: Value) -> Value {
    let (a, b) = (l.to_number(), r.to_number());
    match op {
        BinaryOp::Add => Value::Number(a + b),
        BinaryOp::Sub => Value::Number(a - b),
        BinaryOp::Mul => Value::Number(a * b),
        BinaryOp::Div => Value::Number(a / b),
        BinaryOp::Rem => Value::Number(a % b),
        BinaryOp::Pow => Value::Number(a.powf(b)),
        BinaryOp::Lt => Value::Bool(a < b),
        BinaryOp::Le => Value::Bool(a <= b),
        BinaryOp::Gt => Value::Bool(a > b),
        BinaryOp::Ge => Value::Bool(a >= b),
        BinaryOp::Eq => Value::Bool(a == b),
        BinaryOp::Ne => Value::Bool(a != b),
        BinaryOp::StrictEq => Value::Bool(strict_eq(l, r)),
        BinaryOp::StrictNe => Value::Bool(!strict_eq(l, r)),
        BinaryOp::And | BinaryOp::Or => unreachable!("logical operators short-circuit in eval"),
    }
}

fn strict_eq(l: Value, r: Value) -> bool {
    match (l, r) {
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        _ => false,
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: f64) -> Box<Expr> {
        Box::new(Expr::Literal(Value::Number(n)))
    }

    #[test]
    fn coercions_follow_numeric_truthiness() {
        assert_eq!(Value::Bool(true).to_number(), 1.0);
        assert_eq!(Value::Bool(false).to_number(), 0.0);
        assert!(!Value::Number(0.0).truthy());
        assert!(!Value::Number(f64::NAN).truthy());
        assert!(Value::Number(-2.0).truthy());
    }

    #[test]
    fn logical_operators_return_operands() {
        let or = Expr::Binary(BinaryOp::Or, num(0.0), num(7.0));
        assert_eq!(or.eval(0.0), Value::Number(7.0));
        let and = Expr::Binary(BinaryOp::And, num(0.0), num(7.0));
        assert_eq!(and.eval(0.0), Value::Number(0.0));
    }

    #[test]
    fn strict_equality_distinguishes_types() {
        let loose = Expr::Binary(
            BinaryOp::Eq,
            Box::new(Expr::Literal(Value::Bool(true))),
            num(1.0),
        );
        let strict = Expr::Binary(
            BinaryOp::StrictEq,
            Box::new(Expr::Literal(Value::Bool(true))),
            num(1.0),
        );
        assert_eq!(loose.eval(0.0), Value::Bool(true));
        assert_eq!(strict.eval(0.0), Value::Bool(false));
    }

    #[test]
    fn functions_match_math_semantics() {
        assert_eq!(Func::Round.call(&[2.5]), 3.0);
        assert_eq!(Func::Round.call(&[-2.5]), -2.0);
        assert_eq!(Func::Sign.call(&[0.0]), 0.0);
        assert_eq!(Func::Sign.call(&[-4.0]), -1.0);
        assert_eq!(Func::Max.call(&[1.0, 9.0, 3.0]), 9.0);
        assert!(Func::Min.call(&[1.0, f64::NAN]).is_nan());
        assert_eq!(Func::Max.call(&[]), f64::NEG_INFINITY);
    }

    #[test]
    fn comparisons_with_nan_are_false() {
        let gt = Expr::Binary(BinaryOp::Gt, Box::new(Expr::Param), num(5.0));
        assert_eq!(gt.eval(f64::NAN), Value::Bool(false));
    }
}
