use pest::iterators::Pair;
use pest::Parser;

use super::super::ast::{
    ASTNode, BinaryOperation, Literal, NodeKind, TypeAnnotation, UnaryOperation,
};
use super::{AstParser, ParseError};

/// Pest Minnow Parser parses a string into a series of tokens.
/// These tokens are defined as a Context-Free-Grammar in the
/// src/minnow.pest file. The tokens generated from this parser are then
/// formalised into the generic abstract syntax tree implementation.
#[derive(Parser)]
#[grammar = "minnow.pest"]
struct MinnowParser;

/// PestMinnowParser is a concrete AstParser.
/// It uses the pest library to generate a token sequence from a source
/// string that is then converted into an ASTNode tree, recording the
/// source line of every token into the node attribute.
pub struct PestMinnowParser;

impl AstParser for PestMinnowParser {
    fn default() -> Self {
        PestMinnowParser
    }

    fn parse(self, source: &str) -> Result<ASTNode, ParseError> {
        self.parse_into_node_tree(source)
    }
}

/// Source line of a pest token pair.
fn line_of(pair: &Pair<Rule>) -> u32 {
    pair.as_span().start_pos().line_col().0 as u32
}

impl PestMinnowParser {
    /// Parses source string into the root ASTNode.
    fn parse_into_node_tree(&self, source: &str) -> Result<ASTNode, ParseError> {
        let pairs = MinnowParser::parse(Rule::program, source)
            .map_err(|error| ParseError(error.to_string()))?;
        for pair in pairs {
            if pair.as_rule() == Rule::program {
                return self.parse_pair_program(pair);
            }
        }
        Err(ParseError(String::from(
            "program has been parsed without error but is empty",
        )))
    }

    fn parse_pair_program(&self, pair: Pair<Rule>) -> Result<ASTNode, ParseError> {
        let line = line_of(&pair);
        let mut classes = vec![];
        for inner in pair.into_inner() {
            if inner.as_rule() == Rule::class_decl {
                classes.push(self.parse_pair_class(inner)?);
            }
        }
        Ok(ASTNode::new(NodeKind::PROGRAM(classes), line))
    }

    fn parse_pair_class(&self, pair: Pair<Rule>) -> Result<ASTNode, ParseError> {
        let line = line_of(&pair);
        let mut pairs = pair.into_inner().peekable();

        let class_id = self.parse_pair_class_id(pairs.next().unwrap());
        let super_class_id = match pairs.peek() {
            Some(next) if next.as_rule() == Rule::class_id => {
                Some(Box::new(self.parse_pair_class_id(pairs.next().unwrap())))
            }
            _ => None,
        };

        let mut declarations = vec![];
        let mut methods = vec![];
        for inner in pairs {
            match inner.as_rule() {
                Rule::declaration => declarations.push(self.parse_pair_declaration(inner)?),
                Rule::method => methods.push(self.parse_pair_method(inner)?),
                _ => panic!("Whoops! Unprocessed pest rule in class: {:?}", inner.as_rule()),
            }
        }

        Ok(ASTNode::new(
            NodeKind::CLASS {
                class_id: Box::new(class_id),
                super_class_id,
                declarations,
                methods,
            },
            line,
        ))
    }

    fn parse_pair_declaration(&self, pair: Pair<Rule>) -> Result<ASTNode, ParseError> {
        let line = line_of(&pair);
        let mut variable_ids = vec![];
        let mut datatype = None;
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::variable_id => variable_ids.push(self.parse_pair_variable_id(inner)),
                _ => datatype = Some(self.parse_pair_datatype(inner)),
            }
        }
        Ok(ASTNode::new(
            NodeKind::DECLARATION {
                datatype: Box::new(datatype.unwrap()),
                variable_ids,
            },
            line,
        ))
    }

    fn parse_pair_method(&self, pair: Pair<Rule>) -> Result<ASTNode, ParseError> {
        let line = line_of(&pair);
        let mut pairs = pair.into_inner();

        let method_id = self.parse_pair_method_id(pairs.next().unwrap());
        let mut parameters = vec![];
        let mut return_type = None;
        let mut body = None;
        for inner in pairs {
            match inner.as_rule() {
                Rule::parameter => parameters.push(self.parse_pair_parameter(inner)),
                Rule::method_body => body = Some(self.parse_pair_method_body(inner)?),
                _ => return_type = Some(self.parse_pair_datatype(inner)),
            }
        }

        Ok(ASTNode::new(
            NodeKind::METHOD {
                method_id: Box::new(method_id),
                parameters,
                return_type: Box::new(return_type.unwrap()),
                body: Box::new(body.unwrap()),
            },
            line,
        ))
    }

    fn parse_pair_parameter(&self, pair: Pair<Rule>) -> ASTNode {
        let line = line_of(&pair);
        let mut pairs = pair.into_inner();
        let variable_id = self.parse_pair_variable_id(pairs.next().unwrap());
        let datatype = self.parse_pair_datatype(pairs.next().unwrap());
        ASTNode::new(
            NodeKind::PARAMETER {
                variable_id: Box::new(variable_id),
                datatype: Box::new(datatype),
            },
            line,
        )
    }

    fn parse_pair_method_body(&self, pair: Pair<Rule>) -> Result<ASTNode, ParseError> {
        let line = line_of(&pair);
        let mut declarations = vec![];
        let mut statements = vec![];
        let mut ret = None;
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::declaration => declarations.push(self.parse_pair_declaration(inner)?),
                Rule::return_statement => ret = Some(self.parse_pair_return_statement(inner)?),
                _ => statements.push(self.parse_pair_statement(inner)?),
            }
        }
        Ok(ASTNode::new(
            NodeKind::METHOD_BODY {
                declarations,
                statements,
                ret: Box::new(ret.unwrap()),
            },
            line,
        ))
    }

    fn parse_pair_statement(&self, pair: Pair<Rule>) -> Result<ASTNode, ParseError> {
        match pair.as_rule() {
            Rule::assign_statement => self.parse_pair_assign_statement(pair),
            Rule::if_statement => self.parse_pair_if_statement(pair),
            Rule::print_statement => self.parse_pair_print_statement(pair),
            _ => panic!("Whoops! Unprocessed pest statement rule: {:?}", pair.as_rule()),
        }
    }

    fn parse_pair_assign_statement(&self, pair: Pair<Rule>) -> Result<ASTNode, ParseError> {
        let line = line_of(&pair);
        let mut pairs = pair.into_inner();
        let variable_id = self.parse_pair_variable_id(pairs.next().unwrap());
        let expression = self.parse_pair_expression(pairs.next().unwrap())?;
        Ok(ASTNode::new(
            NodeKind::ASSIGNMENT {
                variable_id: Box::new(variable_id),
                expression: Box::new(expression),
            },
            line,
        ))
    }

    fn parse_pair_if_statement(&self, pair: Pair<Rule>) -> Result<ASTNode, ParseError> {
        let line = line_of(&pair);
        let mut pairs = pair.into_inner();
        let condition = self.parse_pair_expression(pairs.next().unwrap())?;
        let body = self.parse_pair_statement(pairs.next().unwrap())?;
        Ok(ASTNode::new(
            NodeKind::IF {
                condition: Box::new(condition),
                body: Box::new(body),
            },
            line,
        ))
    }

    fn parse_pair_print_statement(&self, pair: Pair<Rule>) -> Result<ASTNode, ParseError> {
        let line = line_of(&pair);
        let expression = self.parse_pair_expression(pair.into_inner().next().unwrap())?;
        Ok(ASTNode::new(
            NodeKind::PRINT {
                expression: Box::new(expression),
            },
            line,
        ))
    }

    fn parse_pair_return_statement(&self, pair: Pair<Rule>) -> Result<ASTNode, ParseError> {
        let line = line_of(&pair);
        let expression = match pair.into_inner().next() {
            Some(inner) => Some(Box::new(self.parse_pair_expression(inner)?)),
            None => None,
        };
        Ok(ASTNode::new(NodeKind::RETURN { expression }, line))
    }

    fn parse_pair_datatype(&self, pair: Pair<Rule>) -> ASTNode {
        let line = line_of(&pair);
        let annotation = match pair.as_rule() {
            Rule::t_integer => TypeAnnotation::T_INTEGER,
            Rule::t_boolean => TypeAnnotation::T_BOOLEAN,
            Rule::t_nothing => TypeAnnotation::T_NOTHING,
            Rule::t_object => {
                let class_id = pair.into_inner().next().unwrap();
                TypeAnnotation::T_OBJECT(String::from(class_id.as_str()))
            }
            _ => panic!("Whoops! Unprocessed pest datatype rule: {:?}", pair.as_rule()),
        };
        ASTNode::new(NodeKind::DATATYPE(annotation), line)
    }

    /// Parses all pest expression token pairs into a valid ASTNode
    fn parse_pair_expression(&self, pair: Pair<Rule>) -> Result<ASTNode, ParseError> {
        match pair.as_rule() {
            Rule::conjunction | Rule::comparison | Rule::term | Rule::factor => {
                self.parse_pair_binary_expression(pair)
            }
            Rule::unary => self.parse_pair_unary_expression(pair),
            Rule::integer | Rule::boolean => self.parse_pair_literal(pair),
            Rule::method_call => self.parse_pair_method_call(pair),
            Rule::self_call => self.parse_pair_self_call(pair),
            Rule::variable => self.parse_pair_variable(pair),
            _ => panic!("Whoops! Unprocessed pest rule: {:?}", pair.as_rule()),
        }
    }

    /// Parses a pest token pair into an AST binary expression
    fn parse_pair_binary_expression(&self, pair: Pair<Rule>) -> Result<ASTNode, ParseError> {
        let line = line_of(&pair);
        let mut pair = pair.into_inner();

        // Convert linear list of binary operations of equal precedence
        // into an AST tree of binary operations
        let mut lhs = self.parse_pair_expression(pair.next().unwrap())?;
        while pair.peek().is_some() {
            let op = self.parse_pair_binary_op(pair.next().unwrap());
            let rhs = self.parse_pair_expression(pair.next().unwrap())?;
            lhs = ASTNode::new(
                NodeKind::BINARY_OP {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                line,
            );
        }

        Ok(lhs)
    }

    fn parse_pair_binary_op(&self, pair: Pair<Rule>) -> BinaryOperation {
        match pair.as_str() {
            "&&" => BinaryOperation::AND,
            "<" => BinaryOperation::LESS_THAN,
            "<=" => BinaryOperation::LESS_EQUAL,
            "+" => BinaryOperation::ADD,
            "-" => BinaryOperation::SUB,
            "*" => BinaryOperation::MUL,
            "/" => BinaryOperation::DIV,
            op => panic!("Whoops! Unprocessed binary operator: {:?}", op),
        }
    }

    /// Parses a pest token pair into an AST unary expression
    fn parse_pair_unary_expression(&self, pair: Pair<Rule>) -> Result<ASTNode, ParseError> {
        let line = line_of(&pair);
        let mut pair = pair.into_inner();
        let primary_or_operator = pair.next().unwrap();
        // Unary
        if pair.peek().is_some() {
            let op = match primary_or_operator.as_str() {
                "!" => UnaryOperation::NOT,
                "-" => UnaryOperation::NEGATE,
                op => panic!("Whoops! Unprocessed unary operator: {:?}", op),
            };
            let expression = self.parse_pair_expression(pair.next().unwrap())?;
            Ok(ASTNode::new(
                NodeKind::UNARY_OP {
                    op,
                    expression: Box::new(expression),
                },
                line,
            ))
        // Skip as primary
        } else {
            self.parse_pair_expression(primary_or_operator)
        }
    }

    /// Parses a pest token pair into an AST literal
    fn parse_pair_literal(&self, pair: Pair<Rule>) -> Result<ASTNode, ParseError> {
        let line = line_of(&pair);
        let literal = match pair.as_rule() {
            Rule::integer => {
                let value = pair.as_str().parse().map_err(|_| {
                    ParseError(format!(
                        "integer literal out of range on line {}: {}",
                        line,
                        pair.as_str()
                    ))
                })?;
                Literal::INTEGER(value)
            }
            Rule::boolean => Literal::BOOL(pair.as_str() == "true"),
            _ => panic!("Whoops! Unprocessed literal rule: {:?}", pair.as_rule()),
        };
        Ok(ASTNode::new(NodeKind::LITERAL(literal), line))
    }

    fn parse_pair_method_call(&self, pair: Pair<Rule>) -> Result<ASTNode, ParseError> {
        let line = line_of(&pair);
        let mut pairs = pair.into_inner();
        let variable_id = self.parse_pair_variable_id(pairs.next().unwrap());
        let method_id = self.parse_pair_method_id(pairs.next().unwrap());
        let mut arguments = vec![];
        for inner in pairs {
            arguments.push(self.parse_pair_expression(inner)?);
        }
        Ok(ASTNode::new(
            NodeKind::METHOD_CALL {
                variable_id: Box::new(variable_id),
                method_id: Box::new(method_id),
                arguments,
            },
            line,
        ))
    }

    fn parse_pair_self_call(&self, pair: Pair<Rule>) -> Result<ASTNode, ParseError> {
        let line = line_of(&pair);
        let mut pairs = pair.into_inner();
        let method_id = self.parse_pair_method_id(pairs.next().unwrap());
        let mut arguments = vec![];
        for inner in pairs {
            arguments.push(self.parse_pair_expression(inner)?);
        }
        Ok(ASTNode::new(
            NodeKind::SELF_CALL {
                method_id: Box::new(method_id),
                arguments,
            },
            line,
        ))
    }

    fn parse_pair_variable(&self, pair: Pair<Rule>) -> Result<ASTNode, ParseError> {
        let line = line_of(&pair);
        let variable_id = self.parse_pair_variable_id(pair.into_inner().next().unwrap());
        Ok(ASTNode::new(
            NodeKind::VARIABLE {
                variable_id: Box::new(variable_id),
            },
            line,
        ))
    }

    fn parse_pair_class_id(&self, pair: Pair<Rule>) -> ASTNode {
        let line = line_of(&pair);
        ASTNode::new(NodeKind::CLASS_ID(String::from(pair.as_str())), line)
    }

    fn parse_pair_variable_id(&self, pair: Pair<Rule>) -> ASTNode {
        let line = line_of(&pair);
        ASTNode::new(NodeKind::VARIABLE_ID(String::from(pair.as_str())), line)
    }

    fn parse_pair_method_id(&self, pair: Pair<Rule>) -> ASTNode {
        let line = line_of(&pair);
        ASTNode::new(NodeKind::METHOD_ID(String::from(pair.as_str())), line)
    }
}
