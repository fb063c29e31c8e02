use std::collections::HashSet;

use crate::compiler::{
    CompileError, Compiler, MinnowTypeChecker, PestMinnowParser, X86AssemblyGenerator,
};

fn try_compile(source: &str) -> Result<String, CompileError> {
    let compiler: Compiler<PestMinnowParser, MinnowTypeChecker, X86AssemblyGenerator> =
        Compiler::default();
    compiler.compile_str(source)
}

fn compile(source: &str) -> String {
    try_compile(source).expect("source should compile")
}

fn index_of(assembly: &str, needle: &str) -> usize {
    assembly
        .find(needle)
        .unwrap_or_else(|| panic!("`{}` not found in assembly", needle))
}

const MINIMAL: &str = r#"class Program {
    start() -> Nothing {
        Print(1);
        return;
    }
}"#;

#[test]
fn test_runtime_header_and_print_shim() {
    let assembly = compile(MINIMAL);

    assert!(assembly.starts_with(".text\n"));
    assert!(assembly.contains(".comm _heap_start,4,4"));
    assert!(assembly.contains(".comm _heap_top,4,4"));
    assert!(assembly.contains("       .string \"%d\\n\""));
    assert!(assembly.contains(".global Print"));
    assert!(assembly.contains("       pushl   $.LC0"));
    assert!(assembly.contains("       call    printf"));
}

#[test]
fn test_minimal_program_emission() {
    let assembly = compile(MINIMAL);

    assert!(assembly.contains("Program_start:"));
    assert!(assembly.contains("  pushl $1"));
    assert!(assembly.contains("  call Print"));
    assert!(assembly.contains("  addl $4, %esp"));

    // Start stores the heap base, reserves the Program instance and
    // invokes the entry method
    assert!(assembly.contains(".global Start"));
    assert!(assembly.contains("        movl    %ecx, _heap_start"));
    assert!(assembly.contains("        movl    %ecx, _heap_top"));
    assert!(assembly.contains("        pushl   _heap_start"));
    assert!(assembly.contains("        call    Program_start"));

    // Start comes after the class bodies
    assert!(index_of(&assembly, "Program_start:") < index_of(&assembly, ".global Start"));
}

#[test]
fn test_empty_return_moves_zero_into_ebx() {
    let assembly = compile(MINIMAL);
    assert!(assembly.contains("  movl $0, %ebx"));
}

#[test]
fn test_arithmetic_expression_sequence() {
    let assembly = compile(
        r#"class Program {
    start() -> Nothing {
        Print((1 + 2) * 3);
        return;
    }
}"#,
    );

    assert!(assembly.contains("  pushl $1"));
    assert!(assembly.contains("  pushl $2"));
    assert!(assembly.contains("  pushl $3"));
    assert!(assembly.contains("  addl %ebx, %eax"));
    assert!(assembly.contains("  imul %ebx, %eax"));
    // The sum is computed before the product consumes it
    assert!(index_of(&assembly, "  addl %ebx, %eax") < index_of(&assembly, "  imul %ebx, %eax"));
}

#[test]
fn test_division_clears_and_sign_extends() {
    let assembly = compile(
        r#"class Program {
    start() -> Nothing {
        Print(7 / 2);
        return;
    }
}"#,
    );

    assert!(assembly.contains("  movl $0, %edx"));
    assert!(assembly.contains("  cdq"));
    assert!(assembly.contains("  idiv %ebx"));
}

#[test]
fn test_control_flow_emission() {
    let assembly = compile(
        r#"class Program {
    start() -> Nothing {
        if (5 < 7) Print(42);
        return;
    }
}"#,
    );

    // The if mints its end label before the comparison mints its own
    assert!(assembly.contains("  cmp %ebx, %eax"));
    assert!(assembly.contains("  jl L1"));
    assert!(assembly.contains("  cmp  $1, %eax"));
    assert!(assembly.contains("  jne L0"));
    assert!(assembly.contains("  pushl $42"));
    assert!(assembly.contains("L0:"));
    assert!(assembly.contains("L1:"));
    assert!(assembly.contains("L2:"));
}

#[test]
fn test_short_circuit_and_not() {
    let assembly = compile(
        r#"class Program {
    start() -> Nothing {
        if (true && !false) Print(1);
        return;
    }
}"#,
    );

    assert!(assembly.contains("  cmp $0, %eax"));
    assert!(assembly.contains("  cmp $0, %ebx"));
    assert!(assembly.contains("  mov $1, %eax"));
    assert!(assembly.contains("  mov $0, %eax"));
    // true/false literals lower to words
    assert!(assembly.contains("  pushl $1"));
    assert!(assembly.contains("  pushl $0"));
}

#[test]
fn test_unary_minus() {
    let assembly = compile(
        r#"class Program {
    start() -> Nothing {
        Print(-5);
        return;
    }
}"#,
    );

    assert!(assembly.contains("  pushl $5"));
    assert!(assembly.contains("  negl %eax"));
}

#[test]
fn test_local_variable_offsets_grow_downward() {
    let assembly = compile(
        r#"class Program {
    start() -> Nothing {
        var i : Integer;
        var j : Integer;
        i = 5;
        j = 6;
        Print(i + j);
        return;
    }
}"#,
    );

    // Each declaration claims one word below the frame pointer
    assert!(assembly.contains("  subl $4, %esp"));
    assert!(assembly.contains("  movl %eax, -4(%ebp)"));
    assert!(assembly.contains("  movl %eax, -8(%ebp)"));
    assert!(assembly.contains("  pushl -4(%ebp)"));
    assert!(assembly.contains("  pushl -8(%ebp)"));
    // The epilogue walks %esp back past both locals
    assert!(assembly.contains("  addl $8, %esp"));
}

#[test]
fn test_parameters_and_receiver_offsets() {
    let assembly = compile(
        r#"class Program {
    add(a : Integer, b : Integer) -> Integer {
        return a + b;
    }
    start() -> Nothing {
        Print(add(1, 2));
        return;
    }
}"#,
    );

    // Parameters live above the return address and receiver pointer
    assert!(assembly.contains("Program_add:"));
    assert!(assembly.contains("  pushl 12(%ebp)"));
    assert!(assembly.contains("  pushl 16(%ebp)"));
    // The value returns in %ebx and the caller re-pushes it
    assert!(assembly.contains("  popl %ebx"));
    assert!(assembly.contains("  pushl %ebx"));

    // Arguments are evaluated in reverse source order and the receiver
    // pointer goes last; the caller cleans all three words
    assert!(index_of(&assembly, "  pushl $2") < index_of(&assembly, "  pushl $1"));
    assert!(assembly.contains("  pushl 8(%ebp)"));
    assert!(assembly.contains("  call Program_add"));
    assert!(assembly.contains("  addl $12, %esp"));
}

#[test]
fn test_object_allocation_bumps_heap_top() {
    let assembly = compile(
        r#"class Counter {
    var value : Integer;
    get() -> Integer {
        return value;
    }
}
class Program {
    start() -> Nothing {
        var c : Counter;
        Print(c.get());
        return;
    }
}"#,
    );

    // The local slot is created holding the fresh object pointer
    assert!(assembly.contains("  pushl   _heap_top"));
    assert!(assembly.contains("  addl    $4, _heap_top"));
    // The receiver is the local at -4 and dispatch lands on Counter
    assert!(assembly.contains("  pushl -4(%ebp)"));
    assert!(assembly.contains("  call Counter_get"));
}

#[test]
fn test_field_access_goes_through_receiver() {
    let assembly = compile(
        r#"class Counter {
    var value : Integer;
    bump() -> Nothing {
        value = value + 1;
        return;
    }
}
class Program {
    start() -> Nothing {
        return;
    }
}"#,
    );

    // Load through 8(%ebp), store through the same pointer
    assert!(assembly.contains("  movl 8(%ebp), %eax"));
    assert!(assembly.contains("  pushl 0(%eax)"));
    assert!(assembly.contains("  movl 8(%ebp), %ebx"));
    assert!(assembly.contains("  movl %eax, 0(%ebx)"));
}

#[test]
fn test_subclass_fields_extend_superclass_layout() {
    let assembly = compile(
        r#"class A {
    var x : Integer;
}
class B : A {
    var y : Integer;
    set() -> Nothing {
        x = 1;
        y = 2;
        return;
    }
}
class Program {
    start() -> Nothing {
        var b : B;
        return;
    }
}"#,
    );

    // x keeps its superclass offset and y appends after it
    assert!(assembly.contains("  movl %eax, 0(%ebx)"));
    assert!(assembly.contains("  movl %eax, 4(%ebx)"));
    // A B instance spans both fields
    assert!(assembly.contains("  addl    $8, _heap_top"));
}

#[test]
fn test_inherited_method_dispatches_to_defining_class() {
    let assembly = compile(
        r#"class A {
    f() -> Integer {
        return 1;
    }
}
class B : A {
}
class Program {
    start() -> Nothing {
        var b : B;
        Print(b.f());
        return;
    }
}"#,
    );

    assert!(assembly.contains("  call A_f"));
    assert!(!assembly.contains("  call B_f"));
}

#[test]
fn test_self_call_forwards_receiver() {
    let assembly = compile(
        r#"class Program {
    f() -> Integer {
        return 1;
    }
    start() -> Nothing {
        Print(f());
        return;
    }
}"#,
    );

    assert!(assembly.contains("  pushl 8(%ebp)"));
    assert!(assembly.contains("  call Program_f"));
}

#[test]
fn test_program_instance_size_reserved_in_start() {
    let assembly = compile(
        r#"class Program {
    var n : Integer;
    start() -> Nothing {
        n = 3;
        Print(n);
        return;
    }
}"#,
    );

    assert!(assembly.contains("        addl    $4, _heap_top"));
}

#[test]
fn test_emitted_labels_are_unique() {
    let assembly = compile(
        r#"class Program {
    start() -> Nothing {
        if (1 < 2) Print(1);
        if (true && false) Print(2);
        if (!true) Print(3);
        return;
    }
}"#,
    );

    let mut seen = HashSet::new();
    for line in assembly.lines() {
        let trimmed = line.trim_end();
        if trimmed.len() > 2
            && trimmed.starts_with('L')
            && trimmed.ends_with(':')
            && trimmed[1..trimmed.len() - 1].chars().all(|c| c.is_ascii_digit())
        {
            assert!(seen.insert(trimmed.to_string()), "duplicate label {}", trimmed);
        }
    }
    assert!(!seen.is_empty());
}

#[test]
fn test_compilation_is_deterministic() {
    let source = r#"class A {
    var x : Integer;
    f(n : Integer) -> Integer {
        if (n <= 0) x = 1;
        return x + n;
    }
}
class Program {
    start() -> Nothing {
        var a : A;
        Print(a.f(4));
        return;
    }
}"#;

    assert_eq!(compile(source), compile(source));
}

#[test]
fn test_semantic_error_stops_before_codegen() {
    let result = try_compile(
        r#"class Program {
    start() -> Nothing {
        Print(missing);
        return;
    }
}"#,
    );
    match result {
        Err(CompileError::Semantic(error)) => {
            assert!(error.to_string().contains("symbol by name undefined"));
        }
        _ => panic!("expected a semantic error"),
    }
}
