//! Statement Parsing
//!
//! Handlers registered in the statement lookup table, plus the shared
//! brace-block parser.

use crate::ast::types::Stmt;
use crate::parser::expression::parse_expression;
use crate::parser::lexer::TokenType;
use crate::parser::parser::{parse_statement, Parser};
use crate::parser::types::{BindingPower, ParseException};

/// var (mut | imm) name (= value)? ;
pub fn parse_variable_declaration(p: &mut Parser) -> Result<Stmt, ParseException> {
    p.advance(); // eat 'var'

    let mutability = p.expect_any(&[TokenType::Mutable, TokenType::Immutable])?;
    let is_mutable = mutability.token_type == TokenType::Mutable;

    let name = p.expect(TokenType::Identifier)?.lexeme;

    let value = if p.current_token_type() != TokenType::Semicolon {
        p.expect(TokenType::Assignment)?;
        Some(parse_expression(p, BindingPower::Default)?)
    } else {
        None
    };

    p.expect(TokenType::Semicolon)?;

    Ok(Stmt::VarDecl {
        is_mutable,
        name,
        value,
    })
}

/// Brace-delimited statement list. Assumes the opening `{` has already
/// been consumed.
pub fn parse_block(p: &mut Parser) -> Result<Stmt, ParseException> {
    let mut body = Vec::new();

    while !p.is_eof() && p.current_token_type() != TokenType::RightBrace {
        body.push(parse_statement(p)?);
    }

    p.expect(TokenType::RightBrace)?;

    Ok(Stmt::Block { body })
}

/// if cond { ... } (else if ... | else { ... })?
///
/// Parentheses around the condition are optional; `else if` recurses.
pub fn parse_if_statement(p: &mut Parser) -> Result<Stmt, ParseException> {
    p.advance(); // eat 'if'

    let has_parens = p.current_token_type() == TokenType::LeftParenthesis;
    if has_parens {
        p.advance();
    }

    let condition = parse_expression(p, BindingPower::Default)?;

    if has_parens {
        p.expect(TokenType::RightParenthesis)?;
    }

    p.expect(TokenType::LeftBrace)?;
    let consequent = Box::new(parse_block(p)?);

    let alternate = if p.current_token_type() == TokenType::Else {
        p.advance(); // eat 'else'

        if p.current_token_type() == TokenType::If {
            Some(Box::new(parse_if_statement(p)?))
        } else {
            p.expect(TokenType::LeftBrace)?;
            Some(Box::new(parse_block(p)?))
        }
    } else {
        None
    };

    Ok(Stmt::If {
        condition,
        consequent,
        alternate,
    })
}

/// while cond { ... } with optional parentheses, like `if`.
pub fn parse_while_statement(p: &mut Parser) -> Result<Stmt, ParseException> {
    p.advance(); // eat 'while'

    let has_parens = p.current_token_type() == TokenType::LeftParenthesis;
    if has_parens {
        p.advance();
    }

    let condition = parse_expression(p, BindingPower::Default)?;

    if has_parens {
        p.expect(TokenType::RightParenthesis)?;
    }

    p.expect(TokenType::LeftBrace)?;
    let body = Box::new(parse_block(p)?);

    Ok(Stmt::While { condition, body })
}

/// for (var-decl; cond; incr) { ... }
///
/// Parentheses are mandatory here. The initializer is a full variable
/// declaration and consumes its own semicolon.
pub fn parse_for_statement(p: &mut Parser) -> Result<Stmt, ParseException> {
    p.advance(); // eat 'for'

    p.expect(TokenType::LeftParenthesis)?;

    if p.current_token_type() != TokenType::Var {
        return Err(ParseException::new(
            "Expected a variable declaration in for loop initializer",
            p.current_line(),
        ));
    }
    let initializer = Box::new(parse_variable_declaration(p)?);

    let condition = parse_expression(p, BindingPower::Default)?;
    p.expect(TokenType::Semicolon)?;

    let increment = parse_expression(p, BindingPower::Default)?;
    p.expect(TokenType::RightParenthesis)?;

    p.expect(TokenType::LeftBrace)?;
    let body = Box::new(parse_block(p)?);

    Ok(Stmt::For {
        initializer,
        condition,
        increment,
        body,
    })
}

/// fn name(params?) { ... } with an optional trailing comma in the
/// parameter list.
pub fn parse_function_declaration(p: &mut Parser) -> Result<Stmt, ParseException> {
    p.advance(); // eat 'fn'

    let name = p.expect(TokenType::Identifier)?.lexeme;

    p.expect(TokenType::LeftParenthesis)?;
    let mut parameters = Vec::new();
    while !p.is_eof() && p.current_token_type() != TokenType::RightParenthesis {
        parameters.push(p.expect(TokenType::Identifier)?.lexeme);
        if p.current_token_type() != TokenType::RightParenthesis {
            p.expect(TokenType::Comma)?;
        }
    }
    p.expect(TokenType::RightParenthesis)?;

    p.expect(TokenType::LeftBrace)?;
    let body = Box::new(parse_block(p)?);

    Ok(Stmt::FunctionDecl {
        name,
        parameters,
        body,
    })
}

/// return value? ;
pub fn parse_return_statement(p: &mut Parser) -> Result<Stmt, ParseException> {
    p.advance(); // eat 'return'

    let value = if p.current_token_type() != TokenType::Semicolon {
        Some(parse_expression(p, BindingPower::Default)?)
    } else {
        None
    };

    p.expect(TokenType::Semicolon)?;

    Ok(Stmt::Return { value })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::types::Expr;
    use crate::diagnostics::CollectingSink;
    use crate::parser::lexer::Scanner;
    use crate::parser::parser::parse;

    fn parse_one(source: &str) -> Stmt {
        let mut sink = CollectingSink::new();
        let tokens = Scanner::new(source)
            .scan_tokens(&mut sink)
            .expect("expected a clean scan");
        match parse(tokens).expect("expected a clean parse") {
            Stmt::Block { mut body } => {
                assert_eq!(body.len(), 1, "expected exactly one statement");
                body.remove(0)
            }
            other => panic!("expected a block, got {:?}", other),
        }
    }

    fn parse_err(source: &str) -> ParseException {
        let mut sink = CollectingSink::new();
        let tokens = Scanner::new(source)
            .scan_tokens(&mut sink)
            .expect("expected a clean scan");
        parse(tokens).unwrap_err()
    }

    #[test]
    fn test_mutable_declaration() {
        let stmt = parse_one("var mut x = 1;");
        match stmt {
            Stmt::VarDecl {
                is_mutable,
                name,
                value,
            } => {
                assert!(is_mutable);
                assert_eq!(name, "x");
                assert_eq!(value, Some(Expr::Number(1.0)));
            }
            other => panic!("expected a declaration, got {:?}", other),
        }
    }

    #[test]
    fn test_immutable_declaration() {
        let stmt = parse_one("var imm x = 1;");
        assert!(matches!(stmt, Stmt::VarDecl { is_mutable: false, .. }));
    }

    #[test]
    fn test_declaration_without_initializer() {
        let stmt = parse_one("var mut x;");
        assert!(matches!(stmt, Stmt::VarDecl { value: None, .. }));
    }

    #[test]
    fn test_declaration_requires_mutability_keyword() {
        let err = parse_err("var x = 1;");
        assert!(err.message.contains("Expected MUTABLE or IMMUTABLE"));
    }

    #[test]
    fn test_declaration_requires_semicolon() {
        let err = parse_err("var mut x = 1");
        assert!(err.message.contains("Expected SEMICOLON"));
    }

    #[test]
    fn test_if_without_parens() {
        let stmt = parse_one("if x < 1 { x; }");
        assert!(matches!(stmt, Stmt::If { alternate: None, .. }));
    }

    #[test]
    fn test_if_with_parens() {
        let stmt = parse_one("if (x < 1) { x; }");
        assert!(matches!(stmt, Stmt::If { .. }));
    }

    #[test]
    fn test_if_else() {
        let stmt = parse_one("if x { 1; } else { 2; }");
        match stmt {
            Stmt::If { alternate, .. } => {
                assert!(matches!(alternate.as_deref(), Some(Stmt::Block { .. })));
            }
            other => panic!("expected an if statement, got {:?}", other),
        }
    }

    #[test]
    fn test_else_if_chain() {
        let stmt = parse_one("if a { 1; } else if b { 2; } else { 3; }");
        match stmt {
            Stmt::If { alternate, .. } => match alternate.as_deref() {
                Some(Stmt::If { alternate, .. }) => {
                    assert!(matches!(alternate.as_deref(), Some(Stmt::Block { .. })));
                }
                other => panic!("expected a nested if, got {:?}", other),
            },
            other => panic!("expected an if statement, got {:?}", other),
        }
    }

    #[test]
    fn test_if_requires_braces() {
        let err = parse_err("if x return 1;");
        assert!(err.message.contains("Expected LEFT_BRACE"));
    }

    #[test]
    fn test_while_statement() {
        let stmt = parse_one("while i < 3 { i++; }");
        assert!(matches!(stmt, Stmt::While { .. }));
    }

    #[test]
    fn test_for_statement() {
        let stmt = parse_one("for (var mut i = 0; i < 5; i += 1) { i; }");
        match stmt {
            Stmt::For {
                initializer,
                condition,
                increment,
                ..
            } => {
                assert!(matches!(*initializer, Stmt::VarDecl { .. }));
                assert!(matches!(condition, Expr::Binary { .. }));
                assert!(matches!(increment, Expr::Assignment { .. }));
            }
            other => panic!("expected a for statement, got {:?}", other),
        }
    }

    #[test]
    fn test_for_requires_parens() {
        let err = parse_err("for var mut i = 0; i < 5; i += 1 { i; }");
        assert!(err.message.contains("Expected LEFT_PARENTHESIS"));
    }

    #[test]
    fn test_for_requires_declaration_initializer() {
        let err = parse_err("for (i = 0; i < 5; i += 1) { i; }");
        assert!(err
            .message
            .contains("Expected a variable declaration in for loop initializer"));
    }

    #[test]
    fn test_function_declaration() {
        let stmt = parse_one("fn add(a, b) { return a + b; }");
        match stmt {
            Stmt::FunctionDecl {
                name, parameters, ..
            } => {
                assert_eq!(name, "add");
                assert_eq!(parameters, vec!["a".to_string(), "b".to_string()]);
            }
            other => panic!("expected a function declaration, got {:?}", other),
        }
    }

    #[test]
    fn test_function_parameters_allow_trailing_comma() {
        let stmt = parse_one("fn f(a, b,) { }");
        match stmt {
            Stmt::FunctionDecl { parameters, .. } => assert_eq!(parameters.len(), 2),
            other => panic!("expected a function declaration, got {:?}", other),
        }
    }

    #[test]
    fn test_function_without_parameters() {
        let stmt = parse_one("fn f() { }");
        assert!(matches!(stmt, Stmt::FunctionDecl { .. }));
    }

    #[test]
    fn test_return_with_value() {
        let stmt = parse_one("return 1 + 2;");
        assert!(matches!(stmt, Stmt::Return { value: Some(_) }));
    }

    #[test]
    fn test_bare_return() {
        let stmt = parse_one("return;");
        assert!(matches!(stmt, Stmt::Return { value: None }));
    }

    #[test]
    fn test_unclosed_block() {
        let err = parse_err("if x { 1;");
        assert!(err.message.contains("Expected RIGHT_BRACE"));
    }
}
