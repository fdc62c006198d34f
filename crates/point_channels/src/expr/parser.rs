//! Recursive-descent parser from tokens to [`Expr`].
//!
//! Precedence, loosest first: `?:`, `||`, `&&`, equality, relational, additive,
//! multiplicative, unary, `**` (right-associative). A unary operator directly before `**`
//! is rejected (`-2 ** 2`); write `(-2) ** 2` or `-(2 ** 2)`.
//!
//! Nesting is capped at [`MAX_DEPTH`], both for parser recursion and for the height of the
//! resulting tree, so evaluation never recurses deeper than that either.
use crate::error::{Error, Result};
use crate::expr::ast::{BinaryOp, Expr, Func, UnaryOp, Value};
use crate::expr::lexer::{tokenize, Token};

/// Deepest nesting an expression may have.
pub const MAX_DEPTH: usize = 128;

/// Parse a function body. `param` is the only identifier that may appear as a variable.
///
/// Accepted shapes: `expr`, `return expr`, `{ return expr; }`, each with an optional `;`.
pub(crate) fn parse_body(src: &str, param: &str) -> Result<Expr> {
    let tokens = tokenize(src)?;
    let mut p = Parser {
        tokens,
        pos: 0,
        depth: 0,
        param,
        src,
    };

    let braced = p.eat(&Token::LBrace);
    p.eat(&Token::Return);
    let expr = p.expression()?;
    p.eat(&Token::Semicolon);
    if braced {
        p.expect(&Token::RBrace)?;
        p.eat(&Token::Semicolon);
    }
    if let Some(tok) = p.peek() {
        return Err(p.error(format!("unexpected trailing token {tok:?}")));
    }
    Ok(expr)
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    param: &'a str,
    src: &'a str,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, tok: &Token) -> bool {
        if self.peek() == Some(tok) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, tok: &Token) -> Result<()> {
        if self.eat(tok) {
            Ok(())
        } else {
            Err(self.error(format!("expected {tok:?}")))
        }
    }

    fn error(&self, msg: String) -> Error {
        Error::Expression(format!("{msg} in '{}'", self.src))
    }

    fn too_deep(&self) -> Error {
        Error::Expression(format!(
            "expression nested too deeply (limit {MAX_DEPTH})"
        ))
    }

    /// Run `parse` one level deeper, failing once the nesting limit is reached.
    fn descend(&mut self, parse: fn(&mut Self) -> Result<Expr>) -> Result<Expr> {
        if self.depth >= MAX_DEPTH {
            return Err(self.too_deep());
        }
        self.depth += 1;
        let expr = parse(self);
        self.depth -= 1;
        expr
    }

    /// Accept a freshly built node if the tree stays within the nesting limit.
    fn node(&self, expr: Expr) -> Result<Expr> {
        if expr.depth() > MAX_DEPTH {
            return Err(self.too_deep());
        }
        Ok(expr)
    }

    fn expression(&mut self) -> Result<Expr> {
        self.descend(Self::conditional)
    }

    fn conditional(&mut self) -> Result<Expr> {
        let test = self.or()?;
        if !self.eat(&Token::Question) {
            return Ok(test);
        }
        let then = self.expression()?;
        self.expect(&Token::Colon)?;
        let otherwise = self.expression()?;
        self.node(Expr::Conditional {
            test: Box::new(test),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        })
    }

    fn or(&mut self) -> Result<Expr> {
        let mut lhs = self.and()?;
        while self.eat(&Token::OrOr) {
            let rhs = self.and()?;
            lhs = self.node(Expr::Binary(BinaryOp::Or, Box::new(lhs), Box::new(rhs)))?;
        }
        Ok(lhs)
    }

    fn and(&mut self) -> Result<Expr> {
        let mut lhs = self.equality()?;
        while self.eat(&Token::AndAnd) {
            let rhs = self.equality()?;
            lhs = self.node(Expr::Binary(BinaryOp::And, Box::new(lhs), Box::new(rhs)))?;
        }
        Ok(lhs)
    }

    fn equality(&mut self) -> Result<Expr> {
        self.left_assoc(Self::relational, |t| match t {
            Token::EqEq => Some(BinaryOp::Eq),
            Token::NotEq => Some(BinaryOp::Ne),
            Token::StrictEq => Some(BinaryOp::StrictEq),
            Token::StrictNe => Some(BinaryOp::StrictNe),
            _ => None,
        })
    }

    fn relational(&mut self) -> Result<Expr> {
        self.left_assoc(Self::additive, |t| match t {
            Token::Lt => Some(BinaryOp::Lt),
            Token::Le => Some(BinaryOp::Le),
            Token::Gt => Some(BinaryOp::Gt),
            Token::Ge => Some(BinaryOp::Ge),
            _ => None,
        })
    }

    fn additive(&mut self) -> Result<Expr> {
        self.left_assoc(Self::multiplicative, |t| match t {
            Token::Plus => Some(BinaryOp::Add),
            Token::Minus => Some(BinaryOp::Sub),
            _ => None,
        })
    }

    fn multiplicative(&mut self) -> Result<Expr> {
        self.left_assoc(Self::unary, |t| match t {
            Token::Star => Some(BinaryOp::Mul),
            Token::Slash => Some(BinaryOp::Div),
            Token::Percent => Some(BinaryOp::Rem),
            _ => None,
        })
    }

    fn left_assoc(
        &mut self,
        next: fn(&mut Self) -> Result<Expr>,
        op_for: fn(&Token) -> Option<BinaryOp>,
    ) -> Result<Expr> {
        let mut lhs = next(self)?;
        while let Some(op) = self.peek().and_then(op_for) {
            self.pos += 1;
            let rhs = next(self)?;
            lhs = self.node(Expr::Binary(op, Box::new(lhs), Box::new(rhs)))?;
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr> {
        let op = match self.peek() {
            Some(Token::Minus) => UnaryOp::Neg,
            Some(Token::Plus) => UnaryOp::Plus,
            Some(Token::Bang) => UnaryOp::Not,
            _ => return self.power(),
        };
        self.pos += 1;
        let operand = self.descend(Self::operand)?;
        if self.peek() == Some(&Token::StarStar) {
            return Err(self.error(
                "unary operator before '**' needs parentheses".to_string(),
            ));
        }
        self.node(Expr::Unary(op, Box::new(operand)))
    }

    /// Operand of a unary operator: another unary expression or a primary, never `a ** b`.
    fn operand(&mut self) -> Result<Expr> {
        match self.peek() {
            Some(Token::Minus | Token::Plus | Token::Bang) => self.unary(),
            _ => self.primary(),
        }
    }

    fn power(&mut self) -> Result<Expr> {
        let base = self.primary()?;
        if !self.eat(&Token::StarStar) {
            return Ok(base);
        }
        let exp = self.descend(Self::unary)?;
        self.node(Expr::Binary(BinaryOp::Pow, Box::new(base), Box::new(exp)))
    }

    fn primary(&mut self) -> Result<Expr> {
        match self.advance() {
            Some(Token::Number(n)) => Ok(Expr::Literal(Value::Number(n))),
            Some(Token::LParen) => {
                let inner = self.expression()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            Some(Token::Ident(name)) => self.identifier(name),
            Some(tok) => Err(self.error(format!("unexpected token {tok:?}"))),
            None => Err(self.error("unexpected end of expression".to_string())),
        }
    }

    fn identifier(&mut self, name: String) -> Result<Expr> {
        if self.peek() == Some(&Token::LParen) {
            let Some(func) = Func::from_name(&name) else {
                return Err(self.error(format!("unknown function '{name}'")));
            };
            self.pos += 1;
            let args = self.arguments()?;
            if let Some(n) = func.arity() {
                if args.len() != n {
                    return Err(self.error(format!(
                        "'{name}' takes {n} argument(s) but got {}",
                        args.len()
                    )));
                }
            }
            return self.node(Expr::Call(func, args));
        }

        if name == self.param {
            return Ok(Expr::Param);
        }
        let literal = match name.as_str() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            "NaN" => Value::Number(f64::NAN),
            "Infinity" => Value::Number(f64::INFINITY),
            "PI" => Value::Number(std::f64::consts::PI),
            "E" => Value::Number(std::f64::consts::E),
            _ => return Err(self.error(format!("unknown identifier '{name}'"))),
        };
        Ok(Expr::Literal(literal))
    }

    fn arguments(&mut self) -> Result<Vec<Expr>> {
        let mut args = Vec::new();
        if self.eat(&Token::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.expression()?);
            if self.eat(&Token::RParen) {
                return Ok(args);
            }
            self.expect(&Token::Comma)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(src: &str, x: f64) -> Value {
        parse_body(src, "x").expect("parses").eval(x)
    }

    #[test]
    fn respects_precedence() {
        assert_eq!(eval("1 + 2 * 3", 0.0), Value::Number(7.0));
        assert_eq!(eval("(1 + 2) * 3", 0.0), Value::Number(9.0));
        assert_eq!(eval("2 ** 3 ** 2", 0.0), Value::Number(512.0));
        assert_eq!(eval("(-2) ** 2", 0.0), Value::Number(4.0));
        assert_eq!(eval("-(2 ** 2)", 0.0), Value::Number(-4.0));
        assert_eq!(eval("2 ** -1", 0.0), Value::Number(0.5));
        assert_eq!(eval("-x * 2", 3.0), Value::Number(-6.0));
        assert_eq!(eval("10 - 4 - 3", 0.0), Value::Number(3.0));
    }

    #[test]
    fn rejects_unary_operand_before_power() {
        assert!(parse_body("-2 ** 2", "x").is_err());
        assert!(parse_body("!x ** 2", "x").is_err());
        assert!(parse_body("2 ** -2 ** 2", "x").is_err());
    }

    #[test]
    fn nesting_is_bounded() {
        let parens = format!("{}x{}", "(".repeat(100_000), ")".repeat(100_000));
        assert!(matches!(parse_body(&parens, "x"), Err(Error::Expression(_))));
        let nots = format!("{}x", "!".repeat(100_000));
        assert!(matches!(parse_body(&nots, "x"), Err(Error::Expression(_))));
        let negs = format!("{}x", "- ".repeat(100_000));
        assert!(parse_body(&negs, "x").is_err());
        let chain = vec!["x"; 100_000].join(" + ");
        assert!(parse_body(&chain, "x").is_err());
        let powers = vec!["x"; 100_000].join(" ** ");
        assert!(parse_body(&powers, "x").is_err());

        let ok = format!("{}x{}", "(".repeat(MAX_DEPTH / 2), ")".repeat(MAX_DEPTH / 2));
        assert_eq!(parse_body(&ok, "x").unwrap().eval(2.0), Value::Number(2.0));
        let short_chain = vec!["x"; 50].join(" + ");
        assert_eq!(parse_body(&short_chain, "x").unwrap().eval(1.0), Value::Number(50.0));
    }

    #[test]
    fn binds_the_parameter() {
        assert_eq!(eval("x * x", 3.0), Value::Number(9.0));
        assert_eq!(eval("x > 5", 7.0), Value::Bool(true));
        assert_eq!(eval("x > 5 && x < 8", 9.0), Value::Bool(false));
        assert_eq!(eval("x === 2", 2.0), Value::Bool(true));
        assert_eq!(eval("(x > 1) !== true", 2.0), Value::Bool(false));
    }

    #[test]
    fn accepts_return_and_block_forms() {
        assert_eq!(eval("return x + 1", 1.0), Value::Number(2.0));
        assert_eq!(eval("{ return x + 1; }", 1.0), Value::Number(2.0));
        assert_eq!(eval("x + 1;", 1.0), Value::Number(2.0));
    }

    #[test]
    fn ternaries_nest_to_the_right() {
        let src = "x < 0 ? -1 : x == 0 ? 0 : 1";
        assert_eq!(eval(src, -3.0), Value::Number(-1.0));
        assert_eq!(eval(src, 0.0), Value::Number(0.0));
        assert_eq!(eval(src, 3.0), Value::Number(1.0));
    }

    #[test]
    fn calls_builtin_functions() {
        assert_eq!(eval("Math.sqrt(x)", 16.0), Value::Number(4.0));
        assert_eq!(eval("max(x, 2, 10)", 4.0), Value::Number(10.0));
        assert_eq!(eval("pow(x, 2) + abs(-1)", 3.0), Value::Number(10.0));
        assert_eq!(eval("Math.PI > 3", 0.0), Value::Bool(true));
    }

    #[test]
    fn rejects_unknown_names_and_bad_arity() {
        assert!(parse_body("y + 1", "x").is_err());
        assert!(parse_body("frobnicate(x)", "x").is_err());
        assert!(parse_body("pow(x)", "x").is_err());
    }

    #[test]
    fn rejects_incomplete_input() {
        assert!(parse_body("", "x").is_err());
        assert!(parse_body("x +", "x").is_err());
        assert!(parse_body("(x", "x").is_err());
        assert!(parse_body("{ return x", "x").is_err());
        assert!(parse_body("x x", "x").is_err());
    }

    #[test]
    fn parameter_may_shadow_builtin_constants() {
        assert_eq!(parse_body("E * 2", "E").unwrap().eval(4.0), Value::Number(8.0));
    }
}
