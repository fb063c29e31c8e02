use super::super::ast::class_table::ClassTable;
use super::super::ast::datatype::{BaseType, CompoundType, DataType, MethodType, Symbol};
use super::super::ast::symbol_table::SymTab;
use super::super::ast::{ASTNode, AbstractSyntaxTree, Literal, NodeKind, TypeAnnotation};
use super::super::ast::{BinaryOperation, UnaryOperation};
use super::{SemanticAnalyser, TypeError};

/// MinnowTypeChecker is a concrete SemanticAnalyser.
///
/// It walks the tree once, decorating node attributes with inferred
/// types, building the scope tree and the class table, and stopping at
/// the first semantic rule violation. Definitions are handled partly
/// pre-order (a class or method symbol is visible before its body is
/// walked, so self references resolve) while expressions are typed
/// post-order (children first).
pub struct MinnowTypeChecker {
    symbol_table: SymTab,
    class_table: ClassTable,
}

impl SemanticAnalyser for MinnowTypeChecker {
    fn default() -> Self {
        MinnowTypeChecker {
            symbol_table: SymTab::new(),
            class_table: ClassTable::new(),
        }
    }

    fn analyse(mut self, root: ASTNode) -> Result<AbstractSyntaxTree, TypeError> {
        let mut root = root;
        self.check_program(&mut root)?;
        Ok(AbstractSyntaxTree::new(
            root,
            self.symbol_table,
            self.class_table,
        ))
    }
}

/// An operand satisfies a primitive requirement either directly or as a
/// function whose return base type matches.
fn accepts_operand(datatype: &DataType, expected: BaseType) -> bool {
    datatype.base_type == expected
        || (datatype.base_type == BaseType::Function
            && datatype.method_type.return_type.base_type == expected)
}

impl MinnowTypeChecker {
    fn check_program(&mut self, node: &mut ASTNode) -> Result<(), TypeError> {
        let ASTNode { kind, attribute } = node;
        let classes = match kind {
            NodeKind::PROGRAM(classes) => classes,
            _ => panic!("Malformed AST! Root node is not a program."),
        };

        for class in classes.iter_mut() {
            // The Program class must come last
            if self.class_table.exists("Program") {
                return Err(TypeError::NoProgram(attribute.lineno));
            }
            self.check_class(class)?;
        }

        if !self.class_table.exists("Program") {
            return Err(TypeError::NoProgram(attribute.lineno));
        }
        Ok(())
    }

    fn check_class(&mut self, node: &mut ASTNode) -> Result<(), TypeError> {
        let ASTNode { kind, attribute } = node;
        let line = attribute.lineno;
        let (class_id, super_class_id, declarations, methods) = match kind {
            NodeKind::CLASS {
                class_id,
                super_class_id,
                declarations,
                methods,
            } => (class_id, super_class_id, declarations, methods),
            _ => panic!("Malformed AST! Expected a class node."),
        };

        let name = class_id
            .identifier_name()
            .expect("Malformed AST! Class name is not an identifier.")
            .to_string();
        if self.class_table.exists(&name) {
            return Err(TypeError::DuplicateIdentifier(line));
        }

        // A subclass opens its scope inside the superclass scope so that
        // inherited fields and methods stay visible; the close below still
        // restores the program scope.
        let scope = match super_class_id {
            Some(super_id) => {
                let super_name = super_id
                    .identifier_name()
                    .expect("Malformed AST! Superclass name is not an identifier.")
                    .to_string();
                let super_scope = match self.class_table.lookup(&super_name) {
                    Some(super_node) => super_node.scope,
                    None => return Err(TypeError::SymbolUndefined(line)),
                };
                let scope = self.symbol_table.open_scope_at(super_scope);
                self.class_table.insert(&name, Some(&super_name), scope);
                scope
            }
            None => {
                let scope = self.symbol_table.open_scope();
                self.class_table.insert(&name, None, scope);
                scope
            }
        };
        attribute.scope = Some(scope);

        for declaration in declarations.iter_mut() {
            self.check_declaration(declaration)?;
        }
        for method in methods.iter_mut() {
            self.check_method(method)?;
        }

        // The entry class must define start() -> Nothing with no parameters
        if name == "Program" {
            match self.symbol_table.lookup("start") {
                None => return Err(TypeError::NoStart(line)),
                Some(start) => {
                    if start.method_type.return_type.base_type != BaseType::Nothing {
                        return Err(TypeError::NoStart(line));
                    }
                    if !start.method_type.args_type.is_empty() {
                        return Err(TypeError::StartArgs(line));
                    }
                }
            }
        }

        self.symbol_table.close_scope();
        Ok(())
    }

    fn check_declaration(&mut self, node: &mut ASTNode) -> Result<(), TypeError> {
        let ASTNode { kind, attribute } = node;
        let line = attribute.lineno;
        let (datatype, variable_ids) = match kind {
            NodeKind::DECLARATION {
                datatype,
                variable_ids,
            } => (datatype, variable_ids),
            _ => panic!("Malformed AST! Expected a declaration node."),
        };

        self.check_type_annotation(datatype)?;
        let decl_type = datatype.attribute.datatype.clone();

        for variable_id in variable_ids.iter() {
            let name = variable_id
                .identifier_name()
                .expect("Malformed AST! Declared variable is not an identifier.");
            if !self.symbol_table.insert(name, decl_type.clone()) {
                return Err(TypeError::DuplicateIdentifier(line));
            }
        }

        attribute.datatype = decl_type;
        Ok(())
    }

    fn check_method(&mut self, node: &mut ASTNode) -> Result<(), TypeError> {
        let ASTNode { kind, attribute } = node;
        let line = attribute.lineno;
        let (method_id, parameters, return_type, body) = match kind {
            NodeKind::METHOD {
                method_id,
                parameters,
                return_type,
                body,
            } => (method_id, parameters, return_type, body),
            _ => panic!("Malformed AST! Expected a method node."),
        };

        let name = method_id
            .identifier_name()
            .expect("Malformed AST! Method name is not an identifier.")
            .to_string();

        // The method symbol goes into the class scope before the body is
        // walked so recursive self calls resolve. The signature is
        // completed once the return type and parameters are known.
        let class_scope = self.symbol_table.current_scope();
        if !self
            .symbol_table
            .insert(&name, Symbol::function(MethodType::undef()))
        {
            return Err(TypeError::DuplicateIdentifier(line));
        }

        let method_scope = self.symbol_table.open_scope();
        attribute.scope = Some(method_scope);

        self.check_type_annotation(return_type)?;
        let ret_annotation = return_type.attribute.datatype.clone();
        let mut method_type = MethodType {
            return_type: CompoundType {
                base_type: ret_annotation.base_type,
                class_id: ret_annotation.class_type.class_id.clone(),
            },
            args_type: vec![],
        };

        for parameter in parameters.iter_mut() {
            self.check_parameter(parameter)?;
            method_type
                .args_type
                .push(parameter.attribute.datatype.class_type.clone());
        }

        self.symbol_table
            .update_at(class_scope, &name, Symbol::function(method_type.clone()));
        attribute.datatype = DataType::function(method_type);

        self.check_method_body(body)?;

        // The body carries the type of its return statement
        let body_type = &body.attribute.datatype;
        if body_type.base_type != ret_annotation.base_type {
            return Err(TypeError::ReturnTypeMismatch(line));
        }
        if ret_annotation.base_type == BaseType::Object
            && ret_annotation.class_type.class_id != body_type.class_type.class_id
        {
            return Err(TypeError::ReturnTypeMismatch(line));
        }

        self.symbol_table.close_scope();
        Ok(())
    }

    fn check_method_body(&mut self, node: &mut ASTNode) -> Result<(), TypeError> {
        let ASTNode { kind, attribute } = node;
        let (declarations, statements, ret) = match kind {
            NodeKind::METHOD_BODY {
                declarations,
                statements,
                ret,
            } => (declarations, statements, ret),
            _ => panic!("Malformed AST! Expected a method body node."),
        };

        for declaration in declarations.iter_mut() {
            self.check_declaration(declaration)?;
        }
        for statement in statements.iter_mut() {
            self.check_statement(statement)?;
        }
        self.check_return(ret)?;

        attribute.datatype = ret.attribute.datatype.clone();
        Ok(())
    }

    fn check_parameter(&mut self, node: &mut ASTNode) -> Result<(), TypeError> {
        let ASTNode { kind, attribute } = node;
        let line = attribute.lineno;
        let (variable_id, datatype) = match kind {
            NodeKind::PARAMETER {
                variable_id,
                datatype,
            } => (variable_id, datatype),
            _ => panic!("Malformed AST! Expected a parameter node."),
        };

        self.check_type_annotation(datatype)?;
        let param_type = datatype.attribute.datatype.clone();

        let name = variable_id
            .identifier_name()
            .expect("Malformed AST! Parameter name is not an identifier.");
        if !self.symbol_table.insert(name, param_type.clone()) {
            return Err(TypeError::DuplicateIdentifier(line));
        }

        attribute.datatype = param_type;
        Ok(())
    }

    fn check_statement(&mut self, node: &mut ASTNode) -> Result<(), TypeError> {
        match &node.kind {
            NodeKind::ASSIGNMENT { .. } => self.check_assignment(node),
            NodeKind::IF { .. } => self.check_if(node),
            NodeKind::PRINT { .. } => self.check_print(node),
            _ => panic!("Malformed AST! Node is not a statement."),
        }
    }

    fn check_assignment(&mut self, node: &mut ASTNode) -> Result<(), TypeError> {
        let ASTNode { kind, attribute } = node;
        let line = attribute.lineno;
        let (variable_id, expression) = match kind {
            NodeKind::ASSIGNMENT {
                variable_id,
                expression,
            } => (variable_id, expression),
            _ => panic!("Malformed AST! Expected an assignment node."),
        };

        let name = variable_id
            .identifier_name()
            .expect("Malformed AST! Assignment target is not an identifier.");
        let symbol = match self.symbol_table.lookup(name) {
            Some(symbol) => symbol.clone(),
            None => return Err(TypeError::SymbolUndefined(line)),
        };
        if symbol.base_type == BaseType::Function {
            return Err(TypeError::SymbolTypeMismatch(line));
        }

        self.check_expression(expression)?;

        if symbol.base_type != expression.attribute.datatype.base_type {
            return Err(TypeError::IncompatibleAssignment(line));
        }
        Ok(())
    }

    fn check_if(&mut self, node: &mut ASTNode) -> Result<(), TypeError> {
        let ASTNode { kind, attribute } = node;
        let line = attribute.lineno;
        let (condition, body) = match kind {
            NodeKind::IF { condition, body } => (condition, body),
            _ => panic!("Malformed AST! Expected an if node."),
        };

        self.check_expression(condition)?;
        self.check_statement(body)?;

        if condition.attribute.datatype.base_type != BaseType::Boolean {
            return Err(TypeError::IfPredicate(line));
        }
        Ok(())
    }

    fn check_print(&mut self, node: &mut ASTNode) -> Result<(), TypeError> {
        let expression = match &mut node.kind {
            NodeKind::PRINT { expression } => expression,
            _ => panic!("Malformed AST! Expected a print node."),
        };
        self.check_expression(expression)
    }

    fn check_return(&mut self, node: &mut ASTNode) -> Result<(), TypeError> {
        let ASTNode { kind, attribute } = node;
        let expression = match kind {
            NodeKind::RETURN { expression } => expression,
            _ => panic!("Malformed AST! Expected a return node."),
        };

        // Return type agreement with the declaration is checked at the
        // method level; here the type just propagates up.
        match expression {
            Some(expression) => {
                self.check_expression(expression)?;
                attribute.datatype = expression.attribute.datatype.clone();
            }
            None => {
                attribute.datatype = DataType::primitive(BaseType::Nothing);
            }
        }
        Ok(())
    }

    fn check_type_annotation(&mut self, node: &mut ASTNode) -> Result<(), TypeError> {
        let ASTNode { kind, attribute } = node;
        let line = attribute.lineno;
        let annotation = match kind {
            NodeKind::DATATYPE(annotation) => annotation,
            _ => panic!("Malformed AST! Expected a type annotation node."),
        };

        attribute.datatype = match annotation {
            TypeAnnotation::T_INTEGER => DataType::primitive(BaseType::Integer),
            TypeAnnotation::T_BOOLEAN => DataType::primitive(BaseType::Boolean),
            TypeAnnotation::T_NOTHING => DataType::primitive(BaseType::Nothing),
            TypeAnnotation::T_OBJECT(class_id) => {
                if !self.class_table.exists(class_id) {
                    return Err(TypeError::SymbolUndefined(line));
                }
                DataType::object(class_id.clone())
            }
        };
        Ok(())
    }

    fn check_expression(&mut self, node: &mut ASTNode) -> Result<(), TypeError> {
        let ASTNode { kind, attribute } = node;
        let line = attribute.lineno;
        let datatype = match kind {
            NodeKind::BINARY_OP { op, lhs, rhs } => self.check_binary_op(*op, lhs, rhs, line)?,
            NodeKind::UNARY_OP { op, expression } => {
                self.check_unary_op(*op, expression, line)?
            }
            NodeKind::METHOD_CALL {
                variable_id,
                method_id,
                arguments,
            } => self.check_method_call(variable_id, method_id, arguments, line)?,
            NodeKind::SELF_CALL {
                method_id,
                arguments,
            } => self.check_self_call(method_id, arguments, line)?,
            NodeKind::VARIABLE { variable_id } => self.check_variable(variable_id, line)?,
            NodeKind::LITERAL(Literal::INTEGER(_)) => DataType::primitive(BaseType::Integer),
            NodeKind::LITERAL(Literal::BOOL(_)) => DataType::primitive(BaseType::Boolean),
            NodeKind::NOTHING => DataType::primitive(BaseType::Nothing),
            _ => panic!("Malformed AST! Node in expression position is not an expression."),
        };
        attribute.datatype = datatype;
        Ok(())
    }

    fn check_binary_op(
        &mut self,
        op: BinaryOperation,
        lhs: &mut ASTNode,
        rhs: &mut ASTNode,
        line: u32,
    ) -> Result<DataType, TypeError> {
        self.check_expression(lhs)?;
        self.check_expression(rhs)?;

        let (operand_type, result_type) = match op {
            BinaryOperation::ADD
            | BinaryOperation::SUB
            | BinaryOperation::MUL
            | BinaryOperation::DIV => (BaseType::Integer, BaseType::Integer),
            BinaryOperation::LESS_THAN | BinaryOperation::LESS_EQUAL => {
                (BaseType::Integer, BaseType::Boolean)
            }
            BinaryOperation::AND => (BaseType::Boolean, BaseType::Boolean),
        };

        if !accepts_operand(&lhs.attribute.datatype, operand_type)
            || !accepts_operand(&rhs.attribute.datatype, operand_type)
        {
            return Err(TypeError::ExpressionType(line));
        }
        Ok(DataType::primitive(result_type))
    }

    fn check_unary_op(
        &mut self,
        op: UnaryOperation,
        expression: &mut ASTNode,
        line: u32,
    ) -> Result<DataType, TypeError> {
        self.check_expression(expression)?;

        let operand_type = match op {
            UnaryOperation::NEGATE => BaseType::Integer,
            UnaryOperation::NOT => BaseType::Boolean,
        };
        if !accepts_operand(&expression.attribute.datatype, operand_type) {
            return Err(TypeError::ExpressionType(line));
        }
        Ok(DataType::primitive(operand_type))
    }

    fn check_method_call(
        &mut self,
        variable_id: &ASTNode,
        method_id: &ASTNode,
        arguments: &mut Vec<ASTNode>,
        line: u32,
    ) -> Result<DataType, TypeError> {
        for argument in arguments.iter_mut() {
            self.check_expression(argument)?;
        }

        // The receiver must be a declared variable of object type
        let receiver_name = variable_id
            .identifier_name()
            .expect("Malformed AST! Call receiver is not an identifier.");
        let receiver = match self.symbol_table.lookup(receiver_name) {
            Some(symbol) => symbol.clone(),
            None => return Err(TypeError::SymbolUndefined(line)),
        };
        if receiver.base_type != BaseType::Object {
            return Err(TypeError::SymbolTypeMismatch(line));
        }

        // Class existence was checked when the receiver was declared
        let class_node = self
            .class_table
            .lookup(&receiver.class_type.class_id)
            .unwrap_or_else(|| {
                panic!(
                    "Malformed AST! Class {} missing from class table.",
                    receiver.class_type.class_id
                )
            });

        // The class scope chains into its superclass scopes, so this
        // lookup resolves inherited methods as well
        let method_name = method_id
            .identifier_name()
            .expect("Malformed AST! Called method is not an identifier.");
        let method = match self.symbol_table.lookup_from(class_node.scope, method_name) {
            Some(symbol) => symbol.clone(),
            None => return Err(TypeError::NoClassMethod(line)),
        };
        if method.base_type != BaseType::Function {
            return Err(TypeError::SymbolTypeMismatch(line));
        }

        self.check_call_arguments(&method, arguments, line)?;
        Ok(Self::call_result_type(&method))
    }

    fn check_self_call(
        &mut self,
        method_id: &ASTNode,
        arguments: &mut Vec<ASTNode>,
        line: u32,
    ) -> Result<DataType, TypeError> {
        for argument in arguments.iter_mut() {
            self.check_expression(argument)?;
        }

        let method_name = method_id
            .identifier_name()
            .expect("Malformed AST! Called method is not an identifier.");
        let method = match self.symbol_table.lookup(method_name) {
            Some(symbol) => symbol.clone(),
            None => return Err(TypeError::NoClassMethod(line)),
        };
        if method.base_type != BaseType::Function {
            return Err(TypeError::SymbolTypeMismatch(line));
        }

        self.check_call_arguments(&method, arguments, line)?;
        Ok(Self::call_result_type(&method))
    }

    fn check_call_arguments(
        &self,
        method: &Symbol,
        arguments: &[ASTNode],
        line: u32,
    ) -> Result<(), TypeError> {
        let expected = &method.method_type.args_type;
        let mut n = 0;
        for argument in arguments {
            if n == expected.len() {
                return Err(TypeError::CallArgCountMismatch(line));
            }
            if argument.attribute.datatype.base_type != expected[n].base_type {
                return Err(TypeError::CallArgsMismatch(line));
            }
            n += 1;
        }
        if n < expected.len() {
            return Err(TypeError::CallArgCountMismatch(line));
        }
        Ok(())
    }

    /// A call expression takes on the return type of the resolved method.
    fn call_result_type(method: &Symbol) -> DataType {
        let return_type = &method.method_type.return_type;
        DataType {
            base_type: return_type.base_type,
            class_type: return_type.clone(),
            method_type: MethodType::undef(),
        }
    }

    fn check_variable(&mut self, variable_id: &ASTNode, line: u32) -> Result<DataType, TypeError> {
        let name = variable_id
            .identifier_name()
            .expect("Malformed AST! Variable reference is not an identifier.");
        let symbol = match self.symbol_table.lookup(name) {
            Some(symbol) => symbol.clone(),
            None => return Err(TypeError::SymbolUndefined(line)),
        };
        if symbol.base_type == BaseType::Function {
            return Err(TypeError::SymbolTypeMismatch(line));
        }
        Ok(symbol)
    }
}
