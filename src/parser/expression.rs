//! Expression Parsing
//!
//! The Pratt main loop plus every NUD/LED handler registered in the
//! lookup tables. Compound assignment is desugared here so the
//! evaluator only ever sees plain `=`.

use crate::ast::types::Expr;
use crate::parser::lexer::{Literal, Token, TokenType};
use crate::parser::lookups::{binding_power_of, led_handler, nud_handler};
use crate::parser::parser::Parser;
use crate::parser::types::{BindingPower, ParseException};

/// Pratt main loop: parse a prefix expression, then keep folding infix
/// operators while their binding power exceeds `bp`.
pub fn parse_expression(p: &mut Parser, bp: BindingPower) -> Result<Expr, ParseException> {
    if p.is_eof() {
        return Err(ParseException::new(
            "Unexpected end of file expression (EOF)",
            p.current_line(),
        ));
    }

    let token_type = p.current_token_type();
    let nud = nud_handler(token_type).ok_or_else(|| {
        ParseException::new(
            format!("Unrecognized token found: {}", token_type.as_str()),
            p.current_line(),
        )
    })?;

    let mut left = nud(p)?;

    while !p.is_eof() && binding_power_of(p.current_token_type()) > bp {
        let token_type = p.current_token_type();
        let led = led_handler(token_type).ok_or_else(|| {
            ParseException::new(
                format!("Unrecognized token found: {}", token_type.as_str()),
                p.current_line(),
            )
        })?;

        left = led(p, left, binding_power_of(token_type))?;
    }

    Ok(left)
}

/// NUD for literals, identifiers and parenthesised groups.
pub fn parse_primary_expression(p: &mut Parser) -> Result<Expr, ParseException> {
    match p.current_token_type() {
        TokenType::Number => {
            let token = p.advance();
            match token.literal {
                Some(Literal::Number(value)) => Ok(Expr::Number(value)),
                _ => Err(ParseException::new(
                    format!("Malformed number literal '{}'", token.lexeme),
                    token.line,
                )),
            }
        }
        TokenType::Str => {
            let token = p.advance();
            match token.literal {
                Some(Literal::Str(value)) => Ok(Expr::Str(value)),
                _ => Err(ParseException::new(
                    format!("Malformed string literal '{}'", token.lexeme),
                    token.line,
                )),
            }
        }
        TokenType::Identifier => {
            let token = p.advance();
            Ok(Expr::Symbol(token.lexeme))
        }
        TokenType::LeftParenthesis => {
            p.advance(); // eat '('
            let value = parse_expression(p, BindingPower::Default)?;
            p.expect(TokenType::RightParenthesis)?;
            Ok(value)
        }
        other => Err(ParseException::new(
            format!("Unrecognized token found: {}", other.as_str()),
            p.current_line(),
        )),
    }
}

/// NUD for prefix `-` and `not`.
pub fn parse_unary_expression(p: &mut Parser) -> Result<Expr, ParseException> {
    let operator = p.advance();
    let operand = parse_expression(p, BindingPower::Unary)?;

    Ok(Expr::Unary {
        operator,
        operand: Box::new(operand),
    })
}

/// NUD for array literals: [a, b, c] with an optional trailing comma.
pub fn parse_array_expression(p: &mut Parser) -> Result<Expr, ParseException> {
    p.advance(); // eat '['

    let mut elements = Vec::new();
    while !p.is_eof() && p.current_token_type() != TokenType::RightBracket {
        elements.push(parse_expression(p, BindingPower::Default)?);
        if p.current_token_type() != TokenType::RightBracket {
            p.expect(TokenType::Comma)?;
        }
    }
    p.expect(TokenType::RightBracket)?;

    Ok(Expr::Array { elements })
}

/// LED for indexing an already-parsed object: a[i].
pub fn parse_index_expression(
    p: &mut Parser,
    left: Expr,
    _bp: BindingPower,
) -> Result<Expr, ParseException> {
    p.advance(); // eat '['
    let index = parse_expression(p, BindingPower::Default)?;
    p.expect(TokenType::RightBracket)?;

    Ok(Expr::Index {
        object: Box::new(left),
        index: Box::new(index),
    })
}

/// LED for calls: callee(arg, ...) with an optional trailing comma.
pub fn parse_call_expression(
    p: &mut Parser,
    left: Expr,
    _bp: BindingPower,
) -> Result<Expr, ParseException> {
    p.advance(); // eat '('

    let mut arguments = Vec::new();
    while !p.is_eof() && p.current_token_type() != TokenType::RightParenthesis {
        arguments.push(parse_expression(p, BindingPower::Default)?);
        if p.current_token_type() != TokenType::RightParenthesis {
            p.expect(TokenType::Comma)?;
        }
    }
    p.expect(TokenType::RightParenthesis)?;

    Ok(Expr::Call {
        callee: Box::new(left),
        arguments,
    })
}

/// LED for postfix `++` and `--`.
pub fn parse_postfix_expression(
    p: &mut Parser,
    left: Expr,
    _bp: BindingPower,
) -> Result<Expr, ParseException> {
    let operator = p.advance();

    Ok(Expr::Postfix {
        operator,
        operand: Box::new(left),
    })
}

/// The arithmetic token a compound assignment operator desugars to.
fn arithmetic_token_for(operator: &Token) -> Option<(TokenType, &'static str)> {
    match operator.token_type {
        TokenType::PlusEquals => Some((TokenType::Plus, "+")),
        TokenType::MinusEquals => Some((TokenType::Minus, "-")),
        TokenType::StarEquals => Some((TokenType::Star, "*")),
        TokenType::SlashEquals => Some((TokenType::Slash, "/")),
        TokenType::ModuloEquals => Some((TokenType::Modulo, "%")),
        _ => None,
    }
}

/// LED for `=` and the compound assignment operators.
///
/// `x op= v` desugars to `x = x op v`. An `Index` assignee becomes an
/// `IndexAssign` node so `a[i] = v` mutates the array in place.
pub fn parse_assignment_expression(
    p: &mut Parser,
    left: Expr,
    _bp: BindingPower,
) -> Result<Expr, ParseException> {
    let operator = p.advance();
    let rhs = parse_expression(p, BindingPower::Assignment)?;

    let new_value = match arithmetic_token_for(&operator) {
        Some((token_type, lexeme)) => Expr::Binary {
            left: Box::new(left.clone()),
            right: Box::new(rhs),
            operator: Token::new(token_type, lexeme, operator.line),
        },
        None => rhs,
    };

    match left {
        Expr::Symbol(_) => Ok(Expr::Assignment {
            assignee: Box::new(left),
            new_value: Box::new(new_value),
        }),
        Expr::Index { object, index } => Ok(Expr::IndexAssign {
            object,
            index,
            new_value: Box::new(new_value),
        }),
        _ => Err(ParseException::new("Invalid assignment target", operator.line)),
    }
}

/// LED for every plain infix operator. Parsing the right operand with
/// the operator's own binding power makes same-power chains fold left
/// through the main loop.
pub fn parse_binary_expression(
    p: &mut Parser,
    left: Expr,
    bp: BindingPower,
) -> Result<Expr, ParseException> {
    let operator = p.advance();
    let right = parse_expression(p, bp)?;

    Ok(Expr::Binary {
        left: Box::new(left),
        right: Box::new(right),
        operator,
    })
}

// ============================================================================
// Tests
// ============================================================================
