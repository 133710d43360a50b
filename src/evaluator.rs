//! Reduces a token sequence to a single numeric value.
//!
//! Operators are reduced with two stacks (pending values, pending
//! operators). An incoming `+` or `-` first collapses everything already
//! pending; an incoming `*` or `/` only collapses pending `*` and `/`. Any
//! operators still pending at the end of the scan are collapsed top-down.
//! This is the evaluation order the engine has always had and callers rely
//! on it; it is not conventional operator precedence (`2 + 3 * 4` evaluates
//! to 14 here, but `sqrt 4 * 9` evaluates to 6, not `sqrt(4) * 9`).
//!
//! Functions are not applied where they appear in the text. They collect on
//! a third stack during the scan and are drained in reverse-encounter order
//! once all operators are resolved, each one consuming whatever value is on
//! top of the operand stack at that point.

use crate::lexer::{Func, Op, Token, TokenKind};
use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

#[derive(Diagnostic, Debug, Error, PartialEq)]
pub enum EvalError {
    #[error("malformed expression: '{op}' is missing an operand")]
    MissingOperand {
        op: Op,
        #[label("this operator")]
        at: SourceSpan,
    },

    #[error("malformed expression: '{func}' has no operand to apply to")]
    MissingFunctionOperand {
        func: Func,
        #[label("this function")]
        at: SourceSpan,
    },

    #[error("expression produced no value")]
    EmptyExpression,
}

pub fn evaluate(tokens: &[Token<'_>]) -> Result<f64, EvalError> {
    let mut values: Vec<f64> = Vec::new();
    let mut ops: Vec<(Op, SourceSpan)> = Vec::new();
    let mut funcs: Vec<(Func, SourceSpan)> = Vec::new();

    for token in tokens {
        let span = SourceSpan::from(token.offset..token.offset + token.slice.len());

        match token.kind {
            TokenKind::Number(value) => values.push(value),
            TokenKind::Op(op) => {
                while let Some(&(pending, at)) = ops.last() {
                    let collapses = matches!(op, Op::Plus | Op::Minus)
                        || matches!(pending, Op::Star | Op::Slash);
                    if !collapses {
                        break;
                    }
                    ops.pop();
                    apply_pending(&mut values, pending, at)?;
                }
                ops.push((op, span));
            }
            TokenKind::Func(func) => funcs.push((func, span)),
        }
    }

    while let Some((op, at)) = ops.pop() {
        apply_pending(&mut values, op, at)?;
    }

    while let Some((func, at)) = funcs.pop() {
        let value = values
            .pop()
            .ok_or(EvalError::MissingFunctionOperand { func, at })?;
        values.push(apply_function(func, value));
    }

    values.pop().ok_or(EvalError::EmptyExpression)
}

fn apply_pending(values: &mut Vec<f64>, op: Op, at: SourceSpan) -> Result<(), EvalError> {
    let b = values.pop().ok_or(EvalError::MissingOperand { op, at })?;
    let a = values.pop().ok_or(EvalError::MissingOperand { op, at })?;
    values.push(apply_operator(op, a, b));
    Ok(())
}

// Division by zero and domain violations follow IEEE semantics (inf/NaN),
// they are never errors.
fn apply_operator(op: Op, a: f64, b: f64) -> f64 {
    match op {
        Op::Plus => a + b,
        Op::Minus => a - b,
        Op::Star => a * b,
        Op::Slash => a / b,
    }
}

fn apply_function(func: Func, a: f64) -> f64 {
    match func {
        Func::Log => a.ln(),
        Func::Sin => a.sin(),
        Func::Abs => a.abs(),
        Func::Acos => a.acos(),
        Func::Asin => a.asin(),
        Func::Ceil => a.ceil(),
        Func::Cos => a.cos(),
        Func::Exp => a.exp(),
        Func::Floor => a.floor(),
        // fractional part, the integral part is discarded
        Func::Modf => a.fract(),
        Func::Sqrt => a.sqrt(),
        Func::Tan => a.tan(),
        // accepted words with no defined transformation
        Func::Deg | Func::Rad => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn eval_str(input: &str) -> Result<f64, EvalError> {
        evaluate(&tokenize(input))
    }

    #[test]
    fn test_single_number() {
        assert_eq!(eval_str("42"), Ok(42.0));
        assert_eq!(eval_str("3.14"), Ok(3.14));
    }

    #[test]
    fn test_binary_operators() {
        assert_eq!(eval_str("1 + 2"), Ok(3.0));
        assert_eq!(eval_str("5 - 2"), Ok(3.0));
        assert_eq!(eval_str("3 * 4"), Ok(12.0));
        assert_eq!(eval_str("10 / 4"), Ok(2.5));
    }

    #[test]
    fn test_left_to_right_chain() {
        assert_eq!(eval_str("1 + 2 + 3"), Ok(6.0));
        assert_eq!(eval_str("100 - 10 - 10"), Ok(80.0));
        assert_eq!(eval_str("8 / 4 / 2"), Ok(1.0));
    }

    // The evaluation order documented in the module docs: '*' after '+'
    // pushes without collapsing, so the end-of-scan drain computes 3 * 4
    // first and then 2 + 12.
    #[test]
    fn test_mixed_operator_chain() {
        assert_eq!(eval_str("2 + 3 * 4"), Ok(14.0));
        assert_eq!(eval_str("2 * 3 + 4"), Ok(10.0));
        assert_eq!(eval_str("1 + 2 * 3 + 4"), Ok(11.0));
        assert_eq!(eval_str("10 - 4 / 2"), Ok(8.0));
    }

    #[test]
    fn test_function_application() {
        assert_eq!(eval_str("sqrt 9"), Ok(3.0));
        assert_eq!(eval_str("abs 3"), Ok(3.0));
        assert_eq!(eval_str("ceil 2.1"), Ok(3.0));
        assert_eq!(eval_str("floor 2.9"), Ok(2.0));
        assert_eq!(eval_str("exp 0"), Ok(1.0));
        assert_eq!(eval_str("log 1"), Ok(0.0));
        assert_eq!(eval_str("modf 3.75"), Ok(0.75));
        assert_eq!(eval_str("cos 0"), Ok(1.0));
    }

    // Functions apply to the operand stack only after every operator has
    // been resolved, so they see the combined result, not the next literal.
    #[test]
    fn test_function_applies_after_operators() {
        assert_eq!(eval_str("sqrt 4 * 9"), Ok(6.0));
        assert_eq!(eval_str("sqrt 9 + 16"), Ok(5.0));
    }

    #[test]
    fn test_functions_drain_in_reverse_order() {
        // cos runs first, then sin: sin(cos(0))
        assert_eq!(eval_str("sin cos 0"), Ok(1f64.sin()));
        assert_eq!(eval_str("sqrt abs 0 - 16"), Ok(4.0));
    }

    #[test]
    fn test_deg_and_rad_have_no_transformation() {
        assert_eq!(eval_str("deg 90"), Ok(0.0));
        assert_eq!(eval_str("rad 3.14"), Ok(0.0));
    }

    #[test]
    fn test_unknown_word_is_ignored() {
        assert_eq!(eval_str("foo 5"), Ok(5.0));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(eval_str("1 / 0"), Ok(f64::INFINITY));
        assert!(eval_str("0 / 0").unwrap().is_nan());
    }

    #[test]
    fn test_domain_violations_yield_nan() {
        assert!(eval_str("sqrt 0 - 1").unwrap().is_nan());
        assert!(eval_str("log 0 - 1").unwrap().is_nan());
        assert!(eval_str("asin 2").unwrap().is_nan());
    }

    #[test]
    fn test_empty_expression() {
        assert_eq!(eval_str(""), Err(EvalError::EmptyExpression));
        assert_eq!(eval_str("foo"), Err(EvalError::EmptyExpression));
    }

    #[test]
    fn test_operator_missing_operand() {
        assert!(matches!(
            eval_str("+ 5"),
            Err(EvalError::MissingOperand { op: Op::Plus, .. })
        ));
        assert!(matches!(
            eval_str("1 + + 2"),
            Err(EvalError::MissingOperand { op: Op::Plus, .. })
        ));
    }

    #[test]
    fn test_function_missing_operand() {
        assert!(matches!(
            eval_str("sqrt"),
            Err(EvalError::MissingFunctionOperand {
                func: Func::Sqrt,
                ..
            })
        ));
    }

    #[test]
    fn test_display_round_trip() {
        for value in [0.1, 2.5, 3.141592653589793, 1e15, 123456.789012345] {
            let rendered = format!("{value}");
            assert_eq!(eval_str(&rendered), Ok(value));
        }
    }

    #[test]
    fn test_extra_values_leave_top_of_stack() {
        assert_eq!(eval_str("3 4"), Ok(4.0));
    }
}
