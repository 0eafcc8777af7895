use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ExpressionError;
use crate::chemistry::ElementalFormula;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sign {
    Plus,
    Minus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Operand {
    Precursor,
    Chain,
    Literal(ElementalFormula),
}

/// Fragment formula as a signed sum of `$PRECURSOR`, `$CHAIN` and literal formulas,
/// e.g. `$PRECURSOR-$CHAIN-H2O` or `$CHAIN-H`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FormulaExpression {
    source: String,
    terms: Vec<(Sign, Operand)>,
}

impl FormulaExpression {
    /// The expression text
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether the expression references `$CHAIN`
    pub fn uses_chain(&self) -> bool {
        self.terms.iter().any(|(_, op)| *op == Operand::Chain)
    }

    /// Whether the expression references `$PRECURSOR`
    pub fn uses_precursor(&self) -> bool {
        self.terms.iter().any(|(_, op)| *op == Operand::Precursor)
    }

    /// Evaluate against a precursor and optional chain formula.
    ///
    /// The result must not contain negative element counts.
    pub fn evaluate(
        &self,
        precursor: &ElementalFormula,
        chain: Option<&ElementalFormula>,
    ) -> Result<ElementalFormula, ExpressionError> {
        let mut result = ElementalFormula::new();
        for (sign, operand) in &self.terms {
            let formula = match operand {
                Operand::Precursor => precursor,
                Operand::Chain => chain.ok_or(ExpressionError::MissingChain)?,
                Operand::Literal(formula) => formula,
            };
            match sign {
                Sign::Plus => result += formula,
                Sign::Minus => result -= formula,
            }
        }
        result.ensure_non_negative()?;
        Ok(result)
    }
}

impl FromStr for FormulaExpression {
    type Err = ExpressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let source = s.trim();
        if source.is_empty() {
            return Err(ExpressionError::Empty);
        }

        let mut terms = Vec::new();
        let mut sign = Sign::Plus;
        let mut token = String::new();
        let mut started = false;

        for c in source.chars().chain(std::iter::once('+')) {
            if c == '+' || c == '-' {
                let text = token.trim();
                if text.is_empty() {
                    // a single leading sign is allowed
                    if started {
                        return Err(ExpressionError::DanglingOperator(source.to_string()));
                    }
                } else {
                    terms.push((sign, parse_operand(text)?));
                    token.clear();
                }
                started = true;
                sign = if c == '-' { Sign::Minus } else { Sign::Plus };
            } else {
                token.push(c);
            }
        }

        Ok(Self {
            source: source.to_string(),
            terms,
        })
    }
}

fn parse_operand(text: &str) -> Result<Operand, ExpressionError> {
    match text.strip_prefix('$') {
        Some(name) => match name.to_ascii_uppercase().as_str() {
            "PRECURSOR" => Ok(Operand::Precursor),
            "CHAIN" => Ok(Operand::Chain),
            _ => Err(ExpressionError::UnknownPlaceholder(name.to_string())),
        },
        None => Ok(Operand::Literal(text.parse()?)),
    }
}

impl TryFrom<String> for FormulaExpression {
    type Error = ExpressionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FormulaExpression> for String {
    fn from(value: FormulaExpression) -> Self {
        value.source
    }
}

impl fmt::Display for FormulaExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
