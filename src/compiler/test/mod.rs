mod codegen_test;
mod parser_test;
