use super::eval::evaluate;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use thiserror::Error;

type SmallRng = Xoshiro256StarStar;

/// Largest magnitude rewritten. Generated intermediates reach at most
/// 25 times the literal plus a small constant, which must stay inside `int`.
pub const MAX_LITERAL: i64 = (i32::MAX as i64 - 64) / 25;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LiteralError {
    #[error("`{text}` is not a decimal integer literal")]
    NotInteger { text: String },

    #[error("literal `{text}` is too large to rewrite without overflowing `int`")]
    OutOfRange { text: String },

    #[error("generated `{expression}` does not evaluate to {expected}")]
    ValueMismatch { expression: String, expected: i64 },
}

/// Produces arithmetic expressions that evaluate to a given integer.
///
/// Seeded generators are reproducible: the same seed and the same sequence
/// of requests yield the same expressions.
pub struct ExpressionGenerator {
    rng: SmallRng,
}

impl ExpressionGenerator {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    /// Rewrite an integer literal's text as an equivalent expression.
    ///
    /// The result is re-evaluated before it is returned; a literal whose
    /// expression would not round-trip is refused.
    pub fn rewrite_literal(&mut self, text: &str) -> Result<String, LiteralError> {
        let value = parse_literal(text)?;
        let expression = self.generate(value);
        match evaluate(&expression) {
            Ok(found) if found == value => Ok(expression),
            _ => Err(LiteralError::ValueMismatch {
                expression,
                expected: value,
            }),
        }
    }

    /// Expression for `n`. A negative value keeps its sign outside the
    /// generated sub-expression: `- ( … )`.
    pub fn generate(&mut self, n: i64) -> String {
        if n < 0 {
            format!("- {}", self.non_negative(n.saturating_neg()))
        } else {
            self.non_negative(n)
        }
    }

    fn non_negative(&mut self, n: i64) -> String {
        let complexity = (n / 5 + 1).clamp(1, 3);
        let operands = self.between(2, complexity + 2) as usize;
        match self.between(0, 3) {
            0 => self.addition(n, operands),
            1 => self.multiplicative(n, operands),
            2 => self.subtraction(n, operands),
            _ => self.mixed(n, operands),
        }
    }

    /// Uniform in `[low, high]`, or `low` when the range is empty.
    fn between(&mut self, low: i64, high: i64) -> i64 {
        if low >= high {
            low
        } else {
            self.rng.gen_range(low..=high)
        }
    }

    fn addition(&mut self, n: i64, operands: usize) -> String {
        if operands <= 2 {
            if n == 0 {
                let a = self.between(1, 10);
                return format!("( {a} + -{a} )");
            }
            let a = self.between(0, n);
            return format!("( {a} + {} )", n - a);
        }

        let mut terms = Vec::with_capacity(operands);
        let mut remaining = n;
        for i in 0..operands - 1 {
            if remaining <= 0 {
                terms.push(0);
                continue;
            }
            let reserve = (operands - i - 2) as i64;
            let term = self.between(0, (remaining - reserve).max(0));
            terms.push(term);
            remaining -= term;
        }
        terms.push(remaining);
        format!("( {} )", join(&terms, " + "))
    }

    fn multiplicative(&mut self, n: i64, operands: usize) -> String {
        if n == 0 {
            let k = self.between(1, 10);
            return format!("( 0 * {k} )");
        }

        if operands <= 2 {
            if self.between(0, 1) == 0 && n > 1 {
                let factors: Vec<i64> = (2..n.min(20)).filter(|f| n % f == 0).collect();
                if !factors.is_empty() {
                    let f = factors[self.rng.gen_range(0..factors.len())];
                    return format!("( {f} * {} )", n / f);
                }
            }
            let m = self.between(2, 10);
            return format!("( {} / {m} )", n * m);
        }

        if self.between(0, 1) == 0 {
            let f = self.between(2, n.min(10));
            let (q, r) = (n / f, n % f);
            if r == 0 {
                return format!("( {f} * {q} )");
            }
            if operands > 3 && r > 1 {
                let r1 = self.between(1, r - 1);
                return format!("( {f} * {q} + {r1} + {} )", r - r1);
            }
            return format!("( {f} * {q} + {r} )");
        }

        let m = self.between(2, 5);
        let d = self.between(2, 5);
        format!("( ( {} * {m} ) / ( {m} * {d} ) )", n * d)
    }

    fn subtraction(&mut self, n: i64, operands: usize) -> String {
        if operands <= 2 {
            let s = self.between(1, 20);
            return format!("( {} - {s} )", n + s);
        }

        let min_base = n + operands as i64 - 1;
        let base = self.between(min_base, min_base + 20);
        let mut remaining = base - n;
        let mut parts = vec![base];
        for _ in 0..operands - 2 {
            if remaining <= 0 {
                parts.push(0);
                continue;
            }
            let sub = self.between(1, remaining.min(10));
            parts.push(sub);
            remaining -= sub;
        }
        parts.push(remaining.max(0));
        format!("( {} )", join(&parts, " - "))
    }

    fn mixed(&mut self, n: i64, operands: usize) -> String {
        if operands <= 2 {
            if n == 0 {
                let v = self.between(1, 10);
                return format!("( {v} - {v} )");
            }
            return match self.between(0, 2) {
                0 => self.addition(n, 2),
                1 => self.subtraction(n, 2),
                _ => self.multiplicative(n, 2),
            };
        }

        match self.between(0, 3) {
            0 if n > 1 => {
                let f = self.between(1, n.min(10));
                let (q, r) = (n / f, n % f);
                if r > 0 {
                    format!("( {f} * {q} + {r} )")
                } else {
                    format!("( {f} * {q} )")
                }
            }
            1 if n != 0 => {
                let d = self.between(2, 5);
                let product = n * d;
                if operands > 3 {
                    let mut parts = Vec::with_capacity(operands - 1);
                    let mut remaining = product;
                    for _ in 0..operands - 2 {
                        if remaining <= 1 {
                            parts.push(0);
                            continue;
                        }
                        let part = self.between(1, remaining - 1);
                        parts.push(part);
                        remaining -= part;
                    }
                    parts.push(remaining);
                    format!("( ({}) / {d} )", join(&parts, " + "))
                } else {
                    let a = self.between(1, product - 1);
                    format!("( ({a} + {}) / {d} )", product - a)
                }
            }
            2 if n >= 2 => {
                let difference = self.between(1, n - 1);
                let c = n - difference;
                let a = difference + self.between(1, 10);
                let b = a - difference;
                format!("( ({a} - {b}) + {c} )")
            }
            3 if n == 0 => {
                let v = self.between(1, 10);
                let k = self.between(1, 5);
                format!("( ({v} - {v}) * {k} )")
            }
            3 => {
                let d = self.between(1, 5);
                let product = n * d;
                if product > 2 {
                    let f = self.between(2, (product - 1).min(5));
                    let (q, r) = (product / f, product % f);
                    if r > 0 {
                        format!("( ({f} * {q} + {r}) / {d} )")
                    } else {
                        format!("( ({f} * {q}) / {d} )")
                    }
                } else {
                    format!("( {product} / {d} )")
                }
            }
            _ => self.addition(n, operands),
        }
    }
}

/// Parse a decimal integer literal, optionally signed.
///
/// Octal-looking text (a leading `0` followed by more digits) is refused: it
/// would change value if read as decimal.
fn parse_literal(text: &str) -> Result<i64, LiteralError> {
    let trimmed = text.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, trimmed),
    };
    let not_integer = || LiteralError::NotInteger {
        text: text.to_string(),
    };
    if digits.is_empty()
        || !digits.bytes().all(|b| b.is_ascii_digit())
        || (digits.len() > 1 && digits.starts_with('0'))
    {
        return Err(not_integer());
    }

    let magnitude: i64 = digits.parse().map_err(|_| LiteralError::OutOfRange {
        text: text.to_string(),
    })?;
    if magnitude > MAX_LITERAL {
        return Err(LiteralError::OutOfRange {
            text: text.to_string(),
        });
    }
    Ok(if negative { -magnitude } else { magnitude })
}

fn join(values: &[i64], separator: &str) -> String {
    values
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(separator)
}
