use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

/// Why a numeric input was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    #[error("empty expression")]
    Empty,

    #[error("unexpected character '{0}' at position {1}")]
    UnexpectedChar(char, usize),

    #[error("expression ended unexpectedly")]
    UnexpectedEnd,

    #[error("'{0}' is not a number")]
    InvalidNumber(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("result exceeds decimal range")]
    Overflow,
}

/// Parse a numeric field value: a plain number, or `=` followed by an
/// arithmetic expression.
pub fn parse_number_input(raw: &str) -> Result<Decimal, FormulaError> {
    let trimmed = raw.trim();
    match trimmed.strip_prefix('=') {
        Some(expr) => evaluate_formula(expr),
        None if trimmed.is_empty() => Err(FormulaError::Empty),
        None => Decimal::from_str(trimmed).map_err(|_| FormulaError::InvalidNumber(trimmed.into())),
    }
}

/// Evaluate `+ - * / %` over decimals with parentheses and unary signs.
/// `%` is the remainder operator.
pub fn evaluate_formula(expr: &str) -> Result<Decimal, FormulaError> {
    if let Some((pos, ch)) = expr
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_digit() || c.is_whitespace() || "+-*/().%".contains(*c)))
    {
        return Err(FormulaError::UnexpectedChar(ch, pos));
    }

    let tokens: Vec<(usize, u8)> = expr
        .bytes()
        .enumerate()
        .filter(|(_, b)| !b.is_ascii_whitespace())
        .collect();
    if tokens.is_empty() {
        return Err(FormulaError::Empty);
    }

    let mut parser = Parser { tokens, pos: 0 };
    let value = parser.expression()?;
    match parser.peek() {
        None => Ok(value),
        Some((pos, b)) => Err(FormulaError::UnexpectedChar(b as char, pos)),
    }
}

struct Parser {
    /// Non-whitespace bytes with their offsets in the source
    tokens: Vec<(usize, u8)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<(usize, u8)> {
        self.tokens.get(self.pos).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    // expression := term (("+" | "-") term)*
    fn expression(&mut self) -> Result<Decimal, FormulaError> {
        let mut acc = self.term()?;
        while let Some((_, op @ (b'+' | b'-'))) = self.peek() {
            self.bump();
            let rhs = self.term()?;
            acc = match op {
                b'+' => acc.checked_add(rhs),
                _ => acc.checked_sub(rhs),
            }
            .ok_or(FormulaError::Overflow)?;
        }
        Ok(acc)
    }

    // term := factor (("*" | "/" | "%") factor)*
    fn term(&mut self) -> Result<Decimal, FormulaError> {
        let mut acc = self.factor()?;
        while let Some((_, op @ (b'*' | b'/' | b'%'))) = self.peek() {
            self.bump();
            let rhs = self.factor()?;
            acc = match op {
                b'*' => acc.checked_mul(rhs).ok_or(FormulaError::Overflow)?,
                _ if rhs.is_zero() => return Err(FormulaError::DivisionByZero),
                b'/' => acc.checked_div(rhs).ok_or(FormulaError::Overflow)?,
                _ => acc.checked_rem(rhs).ok_or(FormulaError::Overflow)?,
            };
        }
        Ok(acc)
    }

    // factor := ("+" | "-") factor | "(" expression ")" | number
    fn factor(&mut self) -> Result<Decimal, FormulaError> {
        match self.peek() {
            None => Err(FormulaError::UnexpectedEnd),
            Some((_, b'-')) => {
                self.bump();
                Ok(-self.factor()?)
            }
            Some((_, b'+')) => {
                self.bump();
                self.factor()
            }
            Some((_, b'(')) => {
                self.bump();
                let value = self.expression()?;
                match self.peek() {
                    Some((_, b')')) => {
                        self.bump();
                        Ok(value)
                    }
                    Some((pos, b)) => Err(FormulaError::UnexpectedChar(b as char, pos)),
                    None => Err(FormulaError::UnexpectedEnd),
                }
            }
            Some((_, b)) if b.is_ascii_digit() || b == b'.' => self.number(),
            Some((pos, b)) => Err(FormulaError::UnexpectedChar(b as char, pos)),
        }
    }

    fn number(&mut self) -> Result<Decimal, FormulaError> {
        let mut text = String::new();
        while let Some((_, b)) = self.peek() {
            if b.is_ascii_digit() || b == b'.' {
                text.push(b as char);
                self.bump();
            } else {
                break;
            }
        }
        if text == "." || text.matches('.').count() > 1 {
            return Err(FormulaError::InvalidNumber(text));
        }
        let normalised = if text.starts_with('.') {
            format!("0{text}")
        } else {
            text.trim_end_matches('.').to_string()
        };
        Decimal::from_str(&normalised).map_err(|_| FormulaError::InvalidNumber(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_plain_numbers() {
        assert_eq!(parse_number_input("950").unwrap(), dec!(950));
        assert_eq!(parse_number_input(" 0.11 ").unwrap(), dec!(0.11));
        assert!(parse_number_input("abc").is_err());
        assert_eq!(parse_number_input(""), Err(FormulaError::Empty));
    }

    #[test]
    fn test_precedence_and_parentheses() {
        assert_eq!(parse_number_input("=2+3*4").unwrap(), dec!(14));
        assert_eq!(parse_number_input("=(2+3)*4").unwrap(), dec!(20));
        assert_eq!(parse_number_input("=10-4-3").unwrap(), dec!(3));
        assert_eq!(parse_number_input("=1332 * 206.46").unwrap(), dec!(275004.72));
    }

    #[test]
    fn test_unary_and_fractions() {
        assert_eq!(parse_number_input("=-5+8").unwrap(), dec!(3));
        assert_eq!(parse_number_input("=-(2*3)").unwrap(), dec!(-6));
        assert_eq!(parse_number_input("=.5*4").unwrap(), dec!(2));
        assert_eq!(parse_number_input("=11/100").unwrap(), dec!(0.11));
    }

    #[test]
    fn test_remainder() {
        assert_eq!(parse_number_input("=10%3").unwrap(), dec!(1));
        assert_eq!(parse_number_input("=2+10%4").unwrap(), dec!(4));
    }

    #[test]
    fn test_rejections() {
        assert_eq!(parse_number_input("=1/0"), Err(FormulaError::DivisionByZero));
        assert_eq!(parse_number_input("=5%0"), Err(FormulaError::DivisionByZero));
        assert_eq!(parse_number_input("=2+"), Err(FormulaError::UnexpectedEnd));
        assert_eq!(parse_number_input("=(2+3"), Err(FormulaError::UnexpectedEnd));
        assert_eq!(parse_number_input("="), Err(FormulaError::Empty));
        assert!(matches!(
            parse_number_input("=2^3"),
            Err(FormulaError::UnexpectedChar('^', _))
        ));
        assert!(matches!(
            parse_number_input("=alert(1)"),
            Err(FormulaError::UnexpectedChar('a', 0))
        ));
        assert!(matches!(
            parse_number_input("=1.2.3"),
            Err(FormulaError::InvalidNumber(_))
        ));
        assert!(matches!(parse_number_input("=2)"), Err(FormulaError::UnexpectedChar(')', _))));
    }

    #[test]
    fn test_overflow_rejected() {
        let huge = "=79228162514264337593543950335*10";
        assert_eq!(parse_number_input(huge), Err(FormulaError::Overflow));
    }
}
