use super::super::ast::class_table::ClassTable;
use super::super::ast::datatype::{BaseType, CompoundType};
use super::super::ast::offset_table::OffsetTable;
use super::super::ast::symbol_table::SymTab;
use super::super::ast::{
    ASTNode, AbstractSyntaxTree, BinaryOperation, Literal, NodeKind, UnaryOperation,
};
use super::assembly_builder::AssemblyBuilder;
use super::BackEndGenerator;

/// X86AssemblyGenerator is a backend for Minnow.
/// It emits 32-bit x86 assembly text from a type-checked Abstract Syntax
/// Tree, for assembly and linkage against a C runtime supplying printf.
///
/// # Implementation Details
///   + Expressions evaluate onto the program stack; every expression
///     node pushes exactly one 4-byte value and statements consume them.
///
///   + Objects live in a heap arena handed to the emitted `Start` entry;
///     `_heap_top` bumps upward at declaration sites of object type and
///     nothing is ever freed.
///
///   + Method dispatch is static: the superclass chain of the receiver's
///     declared class is walked until the defining class is found and
///     the call targets its `ClassName_methodName` label directly.
///
/// # Stack Frame Structure
/// SP ->   temporaries
///         LOCAL VAR n     (-4 - 4n from FP)
///         ...
///         LOCAL VAR 0     (-4 from FP)
/// FP ->   PREV FRAME PTR
///         RETURN ADDRESS  (+4)
///         RECEIVER PTR    (+8)
///         FUNC PARAMETER 0 (+12)
///         ...
///         FUNC PARAMETER n
///
/// The caller pushes arguments in reverse source order, the receiver
/// pointer last, and cleans up all of them after the call. The callee
/// hands its return value back in %ebx, which the caller re-pushes as
/// the value of the call expression.
pub struct X86AssemblyGenerator {
    builder: AssemblyBuilder,
    symbol_table: SymTab,
    class_table: ClassTable,

    current_class: String,
    method_offsets: OffsetTable,
    in_method: bool,
}

/// Basic size of a word (integers, booleans and object references) in
/// bytes.
const WORD_SIZE: i32 = 4;

impl BackEndGenerator for X86AssemblyGenerator {
    /// Creates a default configuration of X86AssemblyGenerator
    fn default() -> Self {
        Self {
            builder: AssemblyBuilder::new(),
            symbol_table: SymTab::new(),
            class_table: ClassTable::new(),
            current_class: String::new(),
            method_offsets: OffsetTable::new(),
            in_method: false,
        }
    }

    /// Generates assembly text from an Abstract Syntax Tree
    fn generate(mut self, tree: AbstractSyntaxTree) -> String {
        let (root, symbol_table, class_table) = tree.into_parts();
        self.symbol_table = symbol_table;
        self.class_table = class_table;

        self.generate_node(&root);

        self.builder.finalize()
    }
}

/// # Description:
///     + This implementation block holds the business logic of emitting
///       assembly from ASTNodes. Expression nodes leave their value on
///       the stack; statement nodes consume values and emit control flow.
///       Offsets are recorded in the per-class and per-method offset
///       tables as declarations are walked, matching the incremental
///       %esp adjustment emitted at each declaration site.
impl X86AssemblyGenerator {
    fn generate_node(&mut self, node: &ASTNode) {
        match &node.kind {
            NodeKind::PROGRAM(classes) => {
                self.generate_program(classes);
            }
            NodeKind::CLASS { .. } => {
                self.generate_class(node);
            }
            NodeKind::DECLARATION { .. } => {
                self.generate_declaration(node);
            }
            NodeKind::METHOD { .. } => {
                self.generate_method(node);
            }
            NodeKind::METHOD_BODY {
                declarations,
                statements,
                ret,
            } => {
                for declaration in declarations {
                    self.generate_node(declaration);
                }
                for statement in statements {
                    self.generate_node(statement);
                }
                self.generate_node(ret);
            }
            NodeKind::ASSIGNMENT {
                variable_id,
                expression,
            } => {
                self.generate_assignment(variable_id, expression);
            }
            NodeKind::IF { condition, body } => {
                self.generate_if(condition, body);
            }
            NodeKind::PRINT { expression } => {
                self.generate_print(expression);
            }
            NodeKind::RETURN { expression } => {
                self.generate_return(node, expression.as_deref());
            }
            NodeKind::BINARY_OP { op, lhs, rhs } => {
                self.generate_binary_op(*op, lhs, rhs);
            }
            NodeKind::UNARY_OP { op, expression } => {
                self.generate_unary_op(*op, expression);
            }
            NodeKind::METHOD_CALL {
                variable_id,
                method_id,
                arguments,
            } => {
                self.generate_method_call(variable_id, method_id, arguments);
            }
            NodeKind::SELF_CALL {
                method_id,
                arguments,
            } => {
                self.generate_self_call(method_id, arguments);
            }
            NodeKind::VARIABLE { variable_id } => {
                self.generate_variable(variable_id);
            }
            NodeKind::LITERAL(literal) => {
                self.generate_literal(literal);
            }
            NodeKind::NOTHING => {}
            _ => {
                panic!("Malformed AST! Node should not be directly generated.");
            }
        }
    }

    fn generate_program(&mut self, classes: &[ASTNode]) {
        self.generate_runtime_header();

        for class in classes {
            self.generate_node(class);
        }

        // The first heap object is the Program instance itself
        let program_size = self
            .class_table
            .lookup("Program")
            .expect("Program class missing after type check")
            .offset
            .total_size();
        self.generate_start(program_size);
    }

    /// Runtime header: heap pointer globals and the Print shim wrapping
    /// printf with the project calling convention.
    fn generate_runtime_header(&mut self) {
        self.builder.emit(".text");
        self.builder.emit("");
        self.builder.emit(".comm _heap_start,4,4");
        self.builder.emit(".comm _heap_top,4,4");
        self.builder.emit("");
        self.builder.emit(".LC0:");
        self.builder.emit("       .string \"%d\\n\"");
        self.builder.emit("       .text");
        self.builder.emit("       .globl  Print");
        self.builder.emit("       .type   Print, @function");
        self.builder.emit("");
        self.builder.emit(".global Print");
        self.builder.emit("Print:");
        self.builder.emit("       pushl   %ebp");
        self.builder.emit("       movl    %esp, %ebp");
        self.builder.emit("       movl    8(%ebp), %eax");
        self.builder.emit("       pushl   %eax");
        self.builder.emit("       pushl   $.LC0");
        self.builder.emit("       call    printf");
        self.builder.emit("       addl    $8, %esp");
        self.builder.emit("       leave");
        self.builder.emit("       ret");
        self.builder.emit("");
    }

    /// Program entry: store the heap base handed in by the host runtime,
    /// reserve the Program instance and invoke its start method.
    fn generate_start(&mut self, program_size: i32) {
        self.builder.comment("# Start Function");
        self.builder.emit(".global Start");
        self.builder.emit("Start:");
        self.builder.emit("        pushl   %ebp");
        self.builder.emit("        movl    %esp, %ebp");
        self.builder.emit("        movl    8(%ebp), %ecx");
        self.builder.emit("        movl    %ecx, _heap_start");
        self.builder.emit("        movl    %ecx, _heap_top");
        self.builder
            .emit(format!("        addl    ${}, _heap_top", program_size));
        self.builder.emit("        pushl   _heap_start");
        self.builder.emit("        call    Program_start");
        self.builder.emit("        leave");
        self.builder.emit("        ret");
    }

    fn generate_class(&mut self, node: &ASTNode) {
        let (class_id, super_class_id, declarations, methods) = match &node.kind {
            NodeKind::CLASS {
                class_id,
                super_class_id,
                declarations,
                methods,
            } => (class_id, super_class_id, declarations, methods),
            _ => panic!("Malformed AST! Expected a class node."),
        };

        self.builder.comment("############ CLASS");

        let name = class_id
            .identifier_name()
            .expect("Malformed AST! Class name is not an identifier.")
            .to_string();
        self.current_class = name.clone();

        // Seed the field layout from the superclass so inherited fields
        // keep their offsets and new fields append after them
        if let Some(super_id) = super_class_id {
            let super_name = super_id
                .identifier_name()
                .expect("Malformed AST! Superclass name is not an identifier.");
            let super_offsets = self
                .class_table
                .lookup(super_name)
                .unwrap_or_else(|| panic!("superclass {} missing after type check", super_name))
                .offset
                .clone();
            self.class_table
                .lookup_mut(&name)
                .expect("class missing after type check")
                .offset = super_offsets;
        }

        self.in_method = false;
        for declaration in declarations {
            self.generate_node(declaration);
        }
        for method in methods {
            self.generate_node(method);
        }

        self.builder.comment("############");
        self.builder.emit("");
    }

    fn generate_declaration(&mut self, node: &ASTNode) {
        let (datatype, variable_ids) = match &node.kind {
            NodeKind::DECLARATION {
                datatype,
                variable_ids,
            } => (datatype, variable_ids),
            _ => panic!("Malformed AST! Expected a declaration node."),
        };

        self.builder.comment("#### DECLARATION");

        let decl_type = &datatype.attribute.datatype;
        assert!(
            matches!(
                decl_type.base_type,
                BaseType::Integer | BaseType::Boolean | BaseType::Object
            ),
            "declaration of non-storable type survived the type check"
        );

        for variable_id in variable_ids {
            let name = variable_id
                .identifier_name()
                .expect("Malformed AST! Declared variable is not an identifier.");

            if self.in_method {
                if decl_type.base_type == BaseType::Object {
                    // The new stack slot is created already holding the
                    // fresh object pointer, then the heap top bumps past
                    // the allocated instance
                    let instance_size = self
                        .class_table
                        .lookup(&decl_type.class_type.class_id)
                        .unwrap_or_else(|| {
                            panic!(
                                "class {} missing after type check",
                                decl_type.class_type.class_id
                            )
                        })
                        .offset
                        .total_size();
                    self.builder.emit("  pushl   _heap_top");
                    self.builder
                        .emit(format!("  addl    ${}, _heap_top", instance_size));
                } else {
                    self.builder.emit(format!("  subl ${}, %esp", WORD_SIZE));
                }
                let offset = self.method_offsets.total_size();
                self.method_offsets
                    .insert(name, -offset, WORD_SIZE, decl_type.class_type.clone());
                self.method_offsets.set_total_size(offset + WORD_SIZE);
            } else {
                // Fields only claim heap layout, no code is emitted
                let class = self
                    .class_table
                    .lookup_mut(&self.current_class)
                    .expect("class missing after type check");
                let offset = class.offset.total_size();
                class
                    .offset
                    .insert(name, offset, WORD_SIZE, decl_type.class_type.clone());
                class.offset.set_total_size(offset + WORD_SIZE);
            }
        }

        self.builder.comment("####");
    }

    fn generate_method(&mut self, node: &ASTNode) {
        let (method_id, parameters, body) = match &node.kind {
            NodeKind::METHOD {
                method_id,
                parameters,
                body,
                ..
            } => (method_id, parameters, body),
            _ => panic!("Malformed AST! Expected a method node."),
        };

        self.in_method = true;
        self.builder.comment("######## METHOD");

        let method_name = method_id
            .identifier_name()
            .expect("Malformed AST! Method name is not an identifier.");
        self.builder
            .emit(format!("{}_{}:", self.current_class, method_name));

        // Prologue
        self.builder.emit("  pushl %ebp");
        self.builder.emit("  movl %esp, %ebp");

        // Fresh local layout; the total starts at 4 accounting for the
        // saved %ebp. Parameters sit above the return address and the
        // receiver pointer, so the first one lands at +12.
        self.method_offsets = OffsetTable::new();
        self.method_offsets.set_total_size(WORD_SIZE);
        let mut offset = 12;
        for parameter in parameters {
            let (variable_id, datatype) = match &parameter.kind {
                NodeKind::PARAMETER {
                    variable_id,
                    datatype,
                } => (variable_id, datatype),
                _ => panic!("Malformed AST! Expected a parameter node."),
            };
            let name = variable_id
                .identifier_name()
                .expect("Malformed AST! Parameter name is not an identifier.");
            self.method_offsets.insert(
                name,
                offset,
                WORD_SIZE,
                datatype.attribute.datatype.class_type.clone(),
            );
            offset += WORD_SIZE;
        }
        self.method_offsets.set_param_size(offset - 12);

        self.generate_node(body);

        // Epilogue: walk %esp back past the locals, restore the caller
        // frame and return
        let local_size = self.method_offsets.total_size() - WORD_SIZE;
        self.builder.emit(format!("  addl ${}, %esp", local_size));
        self.builder.emit("  leave");
        self.builder.emit("  ret");
        self.builder.comment("########");

        self.in_method = false;
    }

    fn generate_assignment(&mut self, variable_id: &ASTNode, expression: &ASTNode) {
        self.builder.comment("#### ASSIGN");

        self.generate_node(expression);

        let name = variable_id
            .identifier_name()
            .expect("Malformed AST! Assignment target is not an identifier.");
        let (offset, in_class, _) = self.resolve_variable(name);

        self.builder.emit("  popl %eax");
        if in_class {
            // Field store goes through the receiver pointer
            self.builder.emit("  movl 8(%ebp), %ebx");
            self.builder.emit(format!("  movl %eax, {}(%ebx)", offset));
        } else {
            self.builder.emit(format!("  movl %eax, {}(%ebp)", offset));
        }
        self.builder.comment("####");
    }

    fn generate_if(&mut self, condition: &ASTNode, body: &ASTNode) {
        self.builder.comment("#### CNDTL");

        let end_label = self.builder.create_label();

        self.generate_node(condition);
        self.builder.emit("  popl %eax");
        self.builder.emit("  cmp  $1, %eax");
        self.builder
            .emit(format!("  jne {}", AssemblyBuilder::label_name(end_label)));

        self.generate_node(body);

        self.builder.set_label(end_label);
        self.builder.comment("####");
    }

    fn generate_print(&mut self, expression: &ASTNode) {
        self.builder.comment("#### PRINT");

        self.generate_node(expression);

        self.builder.emit("  call Print");
        // Clean up the parameter
        self.builder.emit(format!("  addl ${}, %esp", WORD_SIZE));
        self.builder.comment("####");
    }

    fn generate_return(&mut self, node: &ASTNode, expression: Option<&ASTNode>) {
        if let Some(expression) = expression {
            self.generate_node(expression);
        }

        self.builder.comment("#### RETRN");
        // The result travels back in %ebx, which nothing clobbers between
        // here and the epilogue
        if node.attribute.datatype.base_type != BaseType::Nothing {
            self.builder.emit("  popl %ebx");
        } else {
            self.builder.emit("  movl $0, %ebx");
        }
        self.builder.comment("####");
    }

    fn generate_binary_op(&mut self, op: BinaryOperation, lhs: &ASTNode, rhs: &ASTNode) {
        match op {
            BinaryOperation::ADD => {
                self.builder.comment("#### ADD");
                self.generate_node(lhs);
                self.generate_node(rhs);
                self.builder.emit("  popl %ebx");
                self.builder.emit("  popl %eax");
                self.builder.emit("  addl %ebx, %eax");
                self.builder.emit("  pushl %eax");
                self.builder.comment("####");
            }
            BinaryOperation::SUB => {
                self.builder.comment("#### SUB");
                self.generate_node(lhs);
                self.generate_node(rhs);
                self.builder.emit("  popl %ebx");
                self.builder.emit("  popl %eax");
                self.builder.emit("  subl %ebx, %eax");
                self.builder.emit("  pushl %eax");
                self.builder.comment("####");
            }
            BinaryOperation::MUL => {
                self.builder.comment("#### MLT");
                self.generate_node(lhs);
                self.generate_node(rhs);
                self.builder.emit("  popl %ebx");
                self.builder.emit("  popl %eax");
                self.builder.emit("  imul %ebx, %eax");
                self.builder.emit("  pushl %eax");
                self.builder.comment("####");
            }
            BinaryOperation::DIV => {
                self.builder.comment("#### DIV");
                self.generate_node(lhs);
                self.generate_node(rhs);
                // Clear the dividend high word, then sign extend
                self.builder.emit("  movl $0, %edx");
                self.builder.emit("  popl %ebx");
                self.builder.emit("  popl %eax");
                self.builder.emit("  cdq");
                self.builder.emit("  idiv %ebx");
                self.builder.emit("  pushl %eax");
                self.builder.comment("####");
            }
            BinaryOperation::AND => {
                self.builder.comment("#### AND");
                let false_label = self.builder.create_label();
                let end_label = self.builder.create_label();
                self.generate_node(lhs);
                self.generate_node(rhs);
                self.builder.emit("  popl %ebx");
                self.builder.emit("  popl %eax");
                self.builder.emit("  cmp $0, %eax");
                self.builder
                    .emit(format!("  je {}", AssemblyBuilder::label_name(false_label)));
                self.builder.emit("  cmp $0, %ebx");
                self.builder
                    .emit(format!("  je {}", AssemblyBuilder::label_name(false_label)));
                self.builder.emit("  mov $1, %eax");
                self.builder
                    .emit(format!("  jmp {}", AssemblyBuilder::label_name(end_label)));
                self.builder.set_label(false_label);
                self.builder.emit("  mov $0, %eax");
                self.builder.set_label(end_label);
                self.builder.emit("  pushl %eax");
                self.builder.comment("####");
            }
            BinaryOperation::LESS_THAN | BinaryOperation::LESS_EQUAL => {
                self.builder.comment("#### LT");
                let true_label = self.builder.create_label();
                let end_label = self.builder.create_label();
                let jump = match op {
                    BinaryOperation::LESS_THAN => "jl",
                    _ => "jle",
                };
                self.generate_node(lhs);
                self.generate_node(rhs);
                self.builder.emit("  popl %ebx");
                self.builder.emit("  popl %eax");
                self.builder.emit("  cmp %ebx, %eax");
                self.builder.emit(format!(
                    "  {} {}",
                    jump,
                    AssemblyBuilder::label_name(true_label)
                ));
                self.builder.emit("  pushl $0");
                self.builder
                    .emit(format!("  jmp {}", AssemblyBuilder::label_name(end_label)));
                self.builder.set_label(true_label);
                self.builder.emit("  pushl $1");
                self.builder.set_label(end_label);
                self.builder.comment("####");
            }
        }
    }

    fn generate_unary_op(&mut self, op: UnaryOperation, expression: &ASTNode) {
        match op {
            UnaryOperation::NEGATE => {
                self.builder.comment("#### NEG");
                self.generate_node(expression);
                self.builder.emit("  popl %eax");
                self.builder.emit("  negl %eax");
                self.builder.emit("  pushl %eax");
                self.builder.comment("####");
            }
            UnaryOperation::NOT => {
                self.builder.comment("#### NOT");
                let false_label = self.builder.create_label();
                let end_label = self.builder.create_label();
                self.generate_node(expression);
                self.builder.emit("  popl %eax");
                self.builder.emit("  cmp $0, %eax");
                self.builder
                    .emit(format!("  jne {}", AssemblyBuilder::label_name(false_label)));
                self.builder.emit("  mov $1, %eax");
                self.builder
                    .emit(format!("  jmp {}", AssemblyBuilder::label_name(end_label)));
                self.builder.set_label(false_label);
                self.builder.emit("  mov $0, %eax");
                self.builder.set_label(end_label);
                self.builder.emit("  pushl %eax");
                self.builder.comment("####");
            }
        }
    }

    fn generate_method_call(
        &mut self,
        variable_id: &ASTNode,
        method_id: &ASTNode,
        arguments: &[ASTNode],
    ) {
        self.builder.comment("#### METHC");

        let receiver_name = variable_id
            .identifier_name()
            .expect("Malformed AST! Call receiver is not an identifier.");
        let (offset, in_class, receiver_type) = self.resolve_variable(receiver_name);

        // Arguments evaluate in reverse source order so they land on the
        // stack in convention order
        for argument in arguments.iter().rev() {
            self.generate_node(argument);
        }

        // The receiver pointer goes last so the callee sees it at 8(%ebp)
        if in_class {
            self.builder.emit("  movl 8(%ebp), %ebx");
            self.builder.emit(format!("  pushl {}(%ebx)", offset));
        } else {
            self.builder.emit(format!("  pushl {}(%ebp)", offset));
        }
        let num_params = arguments.len() as i32 + 1;

        let method_name = method_id
            .identifier_name()
            .expect("Malformed AST! Called method is not an identifier.");
        let defining_class = self.resolve_method_class(&receiver_type.class_id, method_name);
        self.builder
            .emit(format!("  call {}_{}", defining_class, method_name));

        // Clean up arguments and receiver, then re-push the result
        self.builder
            .emit(format!("  addl ${}, %esp", num_params * WORD_SIZE));
        self.builder.emit("  pushl %ebx");
        self.builder.comment("####");
    }

    fn generate_self_call(&mut self, method_id: &ASTNode, arguments: &[ASTNode]) {
        self.builder.comment("#### SELFC");

        for argument in arguments.iter().rev() {
            self.generate_node(argument);
        }

        // The current receiver is forwarded as the callee's receiver
        self.builder.emit("  pushl 8(%ebp)");
        let num_params = arguments.len() as i32 + 1;

        let method_name = method_id
            .identifier_name()
            .expect("Malformed AST! Called method is not an identifier.");
        let current_class = self.current_class.clone();
        let defining_class = self.resolve_method_class(&current_class, method_name);
        self.builder
            .emit(format!("  call {}_{}", defining_class, method_name));

        self.builder
            .emit(format!("  addl ${}, %esp", num_params * WORD_SIZE));
        self.builder.emit("  pushl %ebx");
        self.builder.comment("####");
    }

    fn generate_variable(&mut self, variable_id: &ASTNode) {
        self.builder.comment("## VAR");

        let name = variable_id
            .identifier_name()
            .expect("Malformed AST! Variable reference is not an identifier.");
        let (offset, in_class, _) = self.resolve_variable(name);

        if in_class {
            // Field load goes through the receiver pointer
            self.builder.emit("  movl 8(%ebp), %eax");
            self.builder.emit(format!("  pushl {}(%eax)", offset));
        } else {
            self.builder.emit(format!("  pushl {}(%ebp)", offset));
        }
        self.builder.comment("##");
    }

    fn generate_literal(&mut self, literal: &Literal) {
        self.builder.emit(format!("  pushl ${}", literal.as_word()));
    }

    /// Locate a variable's activation-record or field layout entry.
    /// Returns its offset, whether it is a field of the current class,
    /// and its declared compound type.
    fn resolve_variable(&self, name: &str) -> (i32, bool, CompoundType) {
        if let Some(entry) = self.method_offsets.get(name) {
            return (entry.offset, false, entry.decl_type.clone());
        }
        let class = self
            .class_table
            .lookup(&self.current_class)
            .expect("class missing after type check");
        match class.offset.get(name) {
            Some(entry) => (entry.offset, true, entry.decl_type.clone()),
            None => panic!("variable {} must be in some scope", name),
        }
    }

    /// Walk the superclass chain from the receiver's declared class until
    /// the class whose scope defines the method is found.
    fn resolve_method_class(&self, class_name: &str, method_name: &str) -> String {
        let mut node = self
            .class_table
            .lookup(class_name)
            .unwrap_or_else(|| panic!("class {} missing after type check", class_name));
        while !self.symbol_table.exists_local_in(node.scope, method_name) {
            let super_name = node.super_class.as_deref().unwrap_or_else(|| {
                panic!(
                    "method {} unresolvable from class {}",
                    method_name, class_name
                )
            });
            node = self
                .class_table
                .lookup(super_name)
                .unwrap_or_else(|| panic!("class {} missing after type check", super_name));
        }
        node.name.clone()
    }
}
