// External Modules
extern crate exitcode;
extern crate pest;
#[macro_use]
extern crate pest_derive;

// Internal Modules
mod compiler;
use compiler::{CompileError, Compiler};

// Standard Imports
use clap::Parser;
use std::io::Read;

// Basic Compiler Configuration
type PARSER = compiler::PestMinnowParser;
type ANALYSER = compiler::MinnowTypeChecker;
type GENERATOR = compiler::X86AssemblyGenerator;

/// Command Line interface struct
/// Describes possible arguments using the clap library
#[derive(Parser)]
struct CompilerCLIOptions {
    /// Path of file to compile. Minnow source files end in .mn
    /// Source is read from standard input when omitted.
    #[clap(parse(from_os_str))]
    path: Option<std::path::PathBuf>,

    /// Path to output file. Assembly is written to standard output when
    /// omitted.
    #[clap(short, long, parse(from_os_str))]
    output: Option<std::path::PathBuf>,

    // Flags

    /// Dump the symbol table to stderr after type checking
    #[clap(long, action)]
    dump_symbols: bool,
}

fn main() {
    // Parse Command line arguments
    let cli_args = CompilerCLIOptions::parse();

    let compiler: Compiler<PARSER, ANALYSER, GENERATOR> =
        Compiler::default().set_symbol_dump(cli_args.dump_symbols);

    // Compile from the source file if given, otherwise from stdin
    let result = match &cli_args.path {
        Some(path) => compiler.compile(path.as_path()),
        None => {
            let mut source = String::new();
            match std::io::stdin().read_to_string(&mut source) {
                Ok(_) => compiler.compile_str(source.as_str()),
                Err(why) => Err(CompileError::from(why)),
            }
        }
    };

    let assembly = match result {
        Ok(assembly) => assembly,
        Err(CompileError::Io(why)) => {
            eprintln!("{}", why);
            std::process::exit(exitcode::IOERR);
        }
        Err(why) => {
            // Syntax and semantic diagnostics share the stderr contract
            // and the exit code of 1
            eprintln!("{}", why);
            std::process::exit(1);
        }
    };

    // Check if output should be to stdout
    match &cli_args.output {
        Some(dest_path) => {
            if let Err(why) = std::fs::write(dest_path, assembly) {
                eprintln!("Couldn't write to {}: {}", dest_path.display(), why);
                std::process::exit(exitcode::IOERR);
            }
        }
        None => {
            print!("{}", assembly);
        }
    }

    std::process::exit(exitcode::OK);
}
