//! Lenguaje de filtrado de filas.
//!
//! Gramática:
//!   expr    := or
//!   or      := and ("or" and)*
//!   and     := unary ("and" unary)*
//!   unary   := "not" unary | primary
//!   primary := "(" expr ")" | campo op literal
//!   op      := == | = | != | <> | < | <= | > | >=
//!   literal := número | 'texto' | "texto" | true | false
//!
//! Las palabras clave no distinguen mayúsculas.
use std::cmp::Ordering;
use std::fmt;

use review_core::CellValue;

use crate::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Num(f64),
    Str(String),
    Bool(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    Cmp { field: String, op: CmpOp, value: Literal },
    And(Box<FilterExpr>, Box<FilterExpr>),
    Or(Box<FilterExpr>, Box<FilterExpr>),
    Not(Box<FilterExpr>),
}

impl FilterExpr {
    /// Campos referenciados (en orden de aparición, con repetidos).
    pub fn fields(&self) -> Vec<&str> {
        match self {
            FilterExpr::Cmp { field, .. } => vec![field.as_str()],
            FilterExpr::And(a, b) | FilterExpr::Or(a, b) => {
                let mut v = a.fields();
                v.extend(b.fields());
                v
            }
            FilterExpr::Not(e) => e.fields(),
        }
    }

    /// Evalúa la expresión sobre una fila. Las comparaciones contra celdas
    /// nulas o ausentes son falsas.
    pub fn eval<'a>(&self, row: &dyn Fn(&str) -> Option<&'a CellValue>) -> bool {
        match self {
            FilterExpr::Cmp { field, op, value } => match row(field) {
                Some(cell) => compare(cell, *op, value),
                None => false,
            },
            FilterExpr::And(a, b) => a.eval(row) && b.eval(row),
            FilterExpr::Or(a, b) => a.eval(row) || b.eval(row),
            FilterExpr::Not(e) => !e.eval(row),
        }
    }
}

fn compare(cell: &CellValue, op: CmpOp, value: &Literal) -> bool {
    let ord: Option<Ordering> = match (cell, value) {
        (CellValue::Null, _) => return false,
        (CellValue::Int(_) | CellValue::Float(_), Literal::Num(n)) => cell.as_f64().and_then(|c| c.partial_cmp(n)),
        (CellValue::Str(s), Literal::Str(l)) => Some(s.as_str().cmp(l.as_str())),
        (CellValue::Bool(b), Literal::Bool(l)) => Some(b.cmp(l)),
        // Tipos distintos: sólo la desigualdad se cumple.
        _ => return op == CmpOp::Ne,
    };
    let Some(ord) = ord else {
        return false;
    };
    match op {
        CmpOp::Eq => ord == Ordering::Equal,
        CmpOp::Ne => ord != Ordering::Equal,
        CmpOp::Lt => ord == Ordering::Less,
        CmpOp::Le => ord != Ordering::Greater,
        CmpOp::Gt => ord == Ordering::Greater,
        CmpOp::Ge => ord != Ordering::Less,
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Num(f64),
    Str(String),
    Op(CmpOp),
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Result<Vec<Token>, DomainError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '\'' | '"' => {
                let quote = c;
                let mut s = String::new();
                i += 1;
                loop {
                    match chars.get(i) {
                        None => return Err(DomainError::FilterError("unterminated string literal".into())),
                        Some(&ch) if ch == quote => {
                            i += 1;
                            break;
                        }
                        Some(&ch) => {
                            s.push(ch);
                            i += 1;
                        }
                    }
                }
                tokens.push(Token::Str(s));
            }
            '=' | '!' | '<' | '>' => {
                let next = chars.get(i + 1).copied();
                let (op, width) = match (c, next) {
                    ('=', Some('=')) => (CmpOp::Eq, 2),
                    ('=', _) => (CmpOp::Eq, 1),
                    ('!', Some('=')) => (CmpOp::Ne, 2),
                    ('<', Some('>')) => (CmpOp::Ne, 2),
                    ('<', Some('=')) => (CmpOp::Le, 2),
                    ('<', _) => (CmpOp::Lt, 1),
                    ('>', Some('=')) => (CmpOp::Ge, 2),
                    ('>', _) => (CmpOp::Gt, 1),
                    _ => return Err(DomainError::FilterError(format!("unexpected '{c}' at {i}"))),
                };
                tokens.push(Token::Op(op));
                i += width;
            }
            c if c.is_ascii_digit() || ((c == '-' || c == '.') && chars.get(i + 1).is_some_and(|d| d.is_ascii_digit())) => {
                let start = i;
                i += 1;
                while i < chars.len() && (chars[i].is_ascii_digit() || matches!(chars[i], '.' | 'e' | 'E')) {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let n = text.parse::<f64>()
                            .map_err(|_| DomainError::FilterError(format!("invalid number '{text}'")))?;
                tokens.push(Token::Num(n));
            }
            c if c.is_alphanumeric() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '.') {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            other => return Err(DomainError::FilterError(format!("unexpected '{other}' at {i}"))),
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        t
    }

    fn keyword(&self, kw: &str) -> bool {
        matches!(self.peek(), Some(Token::Ident(s)) if s.eq_ignore_ascii_case(kw))
    }

    fn or(&mut self) -> Result<FilterExpr, DomainError> {
        let mut left = self.and()?;
        while self.keyword("or") {
            self.pos += 1;
            let right = self.and()?;
            left = FilterExpr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and(&mut self) -> Result<FilterExpr, DomainError> {
        let mut left = self.unary()?;
        while self.keyword("and") {
            self.pos += 1;
            let right = self.unary()?;
            left = FilterExpr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<FilterExpr, DomainError> {
        if self.keyword("not") {
            self.pos += 1;
            return Ok(FilterExpr::Not(Box::new(self.unary()?)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<FilterExpr, DomainError> {
        match self.next() {
            Some(Token::LParen) => {
                let inner = self.or()?;
                match self.next() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err(DomainError::FilterError("expected ')'".into())),
                }
            }
            Some(Token::Ident(field)) => {
                let op = match self.next() {
                    Some(Token::Op(op)) => op,
                    _ => return Err(DomainError::FilterError(format!("expected comparison after '{field}'"))),
                };
                let value = match self.next() {
                    Some(Token::Num(n)) => Literal::Num(n),
                    Some(Token::Str(s)) => Literal::Str(s),
                    Some(Token::Ident(s)) if s.eq_ignore_ascii_case("true") => Literal::Bool(true),
                    Some(Token::Ident(s)) if s.eq_ignore_ascii_case("false") => Literal::Bool(false),
                    _ => return Err(DomainError::FilterError(format!("expected literal after '{field} {op}'"))),
                };
                Ok(FilterExpr::Cmp { field, op, value })
            }
            other => Err(DomainError::FilterError(format!("unexpected token {other:?}"))),
        }
    }
}

/// Parsea una expresión de filtrado.
pub fn parse_filter(input: &str) -> Result<FilterExpr, DomainError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(DomainError::FilterError("empty filter".into()));
    }
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.or()?;
    if parser.pos < parser.tokens.len() {
        return Err(DomainError::FilterError(format!("trailing input after token {}", parser.pos)));
    }
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn row(pairs: &[(&str, CellValue)]) -> HashMap<String, CellValue> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    fn eval(expr: &str, r: &HashMap<String, CellValue>) -> bool {
        parse_filter(expr).unwrap().eval(&|name| r.get(name))
    }

    #[test]
    fn precedence_and_binds_tighter_than_or() {
        let e = parse_filter("a == 1 or b == 2 and c == 3").unwrap();
        assert!(matches!(e, FilterExpr::Or(_, _)));
        assert_eq!(e.fields(), vec!["a", "b", "c"]);
    }

    #[test]
    fn evaluates_mixed_expressions() {
        let r = row(&[("rating", CellValue::Int(4)),
                      ("lang", CellValue::Str("en".into())),
                      ("verified", CellValue::Bool(true))]);
        assert!(eval("rating >= 4 and lang == 'en'", &r));
        assert!(eval("NOT (rating < 3) AND verified = true", &r));
        assert!(!eval("rating > 4 or lang != \"en\"", &r));
        assert!(eval("rating <> 2.5", &r));
    }

    #[test]
    fn nulls_and_type_mismatches() {
        let r = row(&[("x", CellValue::Null), ("s", CellValue::Str("3".into()))]);
        assert!(!eval("x == 1", &r));
        assert!(!eval("x != 1", &r));
        assert!(!eval("s == 3", &r));
        assert!(eval("s != 3", &r));
    }

    #[test]
    fn negative_numbers_and_errors() {
        let r = row(&[("d", CellValue::Float(-0.5))]);
        assert!(eval("d < -0.25", &r));
        assert!(parse_filter("").is_err());
        assert!(parse_filter("a ==").is_err());
        assert!(parse_filter("(a == 1").is_err());
        assert!(parse_filter("a == 'x").is_err());
        assert!(parse_filter("a == 1 b").is_err());
    }
}
