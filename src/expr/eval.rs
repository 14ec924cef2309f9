use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("unexpected `{found}` at byte {at}")]
    Unexpected { at: usize, found: char },

    #[error("expression ended early")]
    UnexpectedEnd,

    #[error("division by zero")]
    DivisionByZero,

    #[error("integer overflow")]
    Overflow,
}

/// Evaluate an integer expression over `+ - * /` and parentheses, with C
/// semantics: division truncates toward zero.
pub fn evaluate(expression: &str) -> Result<i64, EvalError> {
    let mut parser = Evaluator {
        input: expression.as_bytes(),
        pos: 0,
    };
    let value = parser.expression()?;
    parser.skip_whitespace();
    match parser.peek() {
        None => Ok(value),
        Some(found) => Err(EvalError::Unexpected {
            at: parser.pos,
            found: found as char,
        }),
    }
}

struct Evaluator<'a> {
    input: &'a [u8],
    pos: usize,
}

impl Evaluator<'_> {
    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn next_operator(&mut self, candidates: &[u8]) -> Option<u8> {
        self.skip_whitespace();
        let op = self.peek().filter(|b| candidates.contains(b))?;
        self.pos += 1;
        Some(op)
    }

    fn expression(&mut self) -> Result<i64, EvalError> {
        let mut value = self.term()?;
        while let Some(op) = self.next_operator(b"+-") {
            let rhs = self.term()?;
            value = match op {
                b'+' => value.checked_add(rhs),
                _ => value.checked_sub(rhs),
            }
            .ok_or(EvalError::Overflow)?;
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<i64, EvalError> {
        let mut value = self.unary()?;
        while let Some(op) = self.next_operator(b"*/") {
            let rhs = self.unary()?;
            value = match op {
                b'*' => value.checked_mul(rhs).ok_or(EvalError::Overflow)?,
                _ if rhs == 0 => return Err(EvalError::DivisionByZero),
                _ => value.checked_div(rhs).ok_or(EvalError::Overflow)?,
            };
        }
        Ok(value)
    }

    fn unary(&mut self) -> Result<i64, EvalError> {
        if self.next_operator(b"-").is_some() {
            return self.unary()?.checked_neg().ok_or(EvalError::Overflow);
        }
        if self.next_operator(b"+").is_some() {
            return self.unary();
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<i64, EvalError> {
        self.skip_whitespace();
        match self.peek() {
            None => Err(EvalError::UnexpectedEnd),
            Some(b'(') => {
                self.pos += 1;
                let value = self.expression()?;
                self.skip_whitespace();
                match self.peek() {
                    Some(b')') => {
                        self.pos += 1;
                        Ok(value)
                    }
                    Some(found) => Err(EvalError::Unexpected {
                        at: self.pos,
                        found: found as char,
                    }),
                    None => Err(EvalError::UnexpectedEnd),
                }
            }
            Some(b) if b.is_ascii_digit() => {
                let mut value: i64 = 0;
                while let Some(digit) = self.peek().filter(u8::is_ascii_digit) {
                    value = value
                        .checked_mul(10)
                        .and_then(|v| v.checked_add(i64::from(digit - b'0')))
                        .ok_or(EvalError::Overflow)?;
                    self.pos += 1;
                }
                Ok(value)
            }
            Some(found) => Err(EvalError::Unexpected {
                at: self.pos,
                found: found as char,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_and_parentheses() {
        assert_eq!(evaluate("( 3 * 4 + 2 )"), Ok(14));
        assert_eq!(evaluate("( (7 - 2) + 3 )"), Ok(8));
        assert_eq!(evaluate("( 10 - 3 - 2 - 1 )"), Ok(4));
    }

    #[test]
    fn unary_minus() {
        assert_eq!(evaluate("( 5 + -5 )"), Ok(0));
        assert_eq!(evaluate("- ( 40 + 2 )"), Ok(-42));
    }

    #[test]
    fn division_truncates_toward_zero() {
        assert_eq!(evaluate("7 / 2"), Ok(3));
        assert_eq!(evaluate("-7 / 2"), Ok(-3));
        assert_eq!(evaluate("1 / 0"), Err(EvalError::DivisionByZero));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(evaluate("( 1 + )"), Err(EvalError::Unexpected { .. })));
        assert_eq!(evaluate("( 1 + 2"), Err(EvalError::UnexpectedEnd));
        assert!(matches!(evaluate("1 2"), Err(EvalError::Unexpected { .. })));
    }
}
