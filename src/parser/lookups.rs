//! Pratt Parser Lookup Tables
//!
//! Three expression tables keyed on token type (null denotation,
//! left denotation and binding power) plus a statement table
//! keyed on leading keyword. Populated once; `(` and `[` appear in both
//! NUD and LED roles (grouping vs call, array literal vs indexing).

use std::collections::HashMap;

use crate::parser::expression::{
    parse_array_expression, parse_assignment_expression, parse_binary_expression,
    parse_call_expression, parse_index_expression, parse_postfix_expression,
    parse_primary_expression, parse_unary_expression,
};
use crate::parser::lexer::TokenType;
use crate::parser::statement::{
    parse_for_statement, parse_function_declaration, parse_if_statement,
    parse_return_statement, parse_variable_declaration, parse_while_statement,
};
use crate::parser::types::{BindingPower, LedHandler, NudHandler, StatementHandler};

struct Lookups {
    binding_power: HashMap<TokenType, BindingPower>,
    nud: HashMap<TokenType, NudHandler>,
    led: HashMap<TokenType, LedHandler>,
    statement: HashMap<TokenType, StatementHandler>,
}

impl Lookups {
    fn nud(&mut self, token_type: TokenType, handler: NudHandler) {
        self.binding_power.entry(token_type).or_insert(BindingPower::Primary);
        self.nud.insert(token_type, handler);
    }

    fn led(&mut self, token_type: TokenType, bp: BindingPower, handler: LedHandler) {
        self.binding_power.insert(token_type, bp);
        self.led.insert(token_type, handler);
    }

    fn statement(&mut self, token_type: TokenType, handler: StatementHandler) {
        self.binding_power.insert(token_type, BindingPower::Default);
        self.statement.insert(token_type, handler);
    }
}

lazy_static::lazy_static! {
    static ref LOOKUPS: Lookups = {
        let mut lu = Lookups {
            binding_power: HashMap::new(),
            nud: HashMap::new(),
            led: HashMap::new(),
            statement: HashMap::new(),
        };

        // Literals and symbols
        lu.nud(TokenType::Number, parse_primary_expression);
        lu.nud(TokenType::Str, parse_primary_expression);
        lu.nud(TokenType::Identifier, parse_primary_expression);
        lu.nud(TokenType::LeftParenthesis, parse_primary_expression);

        // Arrays
        lu.nud(TokenType::LeftBracket, parse_array_expression);
        lu.led(TokenType::LeftBracket, BindingPower::Call, parse_index_expression);

        // Prefix
        lu.nud(TokenType::Not, parse_unary_expression);
        lu.nud(TokenType::Minus, parse_unary_expression);

        // Assignment and compound assignment
        lu.led(TokenType::Assignment, BindingPower::Assignment, parse_assignment_expression);
        lu.led(TokenType::PlusEquals, BindingPower::Assignment, parse_assignment_expression);
        lu.led(TokenType::MinusEquals, BindingPower::Assignment, parse_assignment_expression);
        lu.led(TokenType::StarEquals, BindingPower::Assignment, parse_assignment_expression);
        lu.led(TokenType::SlashEquals, BindingPower::Assignment, parse_assignment_expression);
        lu.led(TokenType::ModuloEquals, BindingPower::Assignment, parse_assignment_expression);

        // Increment/decrement (postfix)
        lu.led(TokenType::PlusPlus, BindingPower::Postfix, parse_postfix_expression);
        lu.led(TokenType::MinusMinus, BindingPower::Postfix, parse_postfix_expression);

        // Relational
        lu.led(TokenType::Less, BindingPower::Relational, parse_binary_expression);
        lu.led(TokenType::LessEqual, BindingPower::Relational, parse_binary_expression);
        lu.led(TokenType::Greater, BindingPower::Relational, parse_binary_expression);
        lu.led(TokenType::GreaterEqual, BindingPower::Relational, parse_binary_expression);
        lu.led(TokenType::EqualTo, BindingPower::Relational, parse_binary_expression);
        lu.led(TokenType::NotEqual, BindingPower::Relational, parse_binary_expression);

        // Additive and multiplicative
        lu.led(TokenType::Plus, BindingPower::Additive, parse_binary_expression);
        lu.led(TokenType::Minus, BindingPower::Additive, parse_binary_expression);
        lu.led(TokenType::Star, BindingPower::Multiplicative, parse_binary_expression);
        lu.led(TokenType::Slash, BindingPower::Multiplicative, parse_binary_expression);
        lu.led(TokenType::Modulo, BindingPower::Multiplicative, parse_binary_expression);

        // Logical
        lu.led(TokenType::And, BindingPower::Logical, parse_binary_expression);
        lu.led(TokenType::Or, BindingPower::Logical, parse_binary_expression);

        // Calls
        lu.led(TokenType::LeftParenthesis, BindingPower::Call, parse_call_expression);

        // Statements
        lu.statement(TokenType::Var, parse_variable_declaration);
        lu.statement(TokenType::If, parse_if_statement);
        lu.statement(TokenType::While, parse_while_statement);
        lu.statement(TokenType::For, parse_for_statement);
        lu.statement(TokenType::Function, parse_function_declaration);
        lu.statement(TokenType::Return, parse_return_statement);

        lu
    };
}

pub fn binding_power_of(token_type: TokenType) -> BindingPower {
    LOOKUPS
        .binding_power
        .get(&token_type)
        .copied()
        .unwrap_or(BindingPower::Default)
}

pub fn nud_handler(token_type: TokenType) -> Option<NudHandler> {
    LOOKUPS.nud.get(&token_type).copied()
}

pub fn led_handler(token_type: TokenType) -> Option<LedHandler> {
    LOOKUPS.led.get(&token_type).copied()
}

pub fn statement_handler(token_type: TokenType) -> Option<StatementHandler> {
    LOOKUPS.statement.get(&token_type).copied()
}
