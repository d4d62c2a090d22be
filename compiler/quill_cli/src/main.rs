//! Quill CLI
//!
//! `quill run <file>`, `quill eval <expression>` and `quill repl`.

mod report;

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use quill_eval::{Bindings, Engine, EvalError, ScriptFile, Session, Value};
use quill_parse::QuillParser;

fn main() {
    quill_eval::tracing_setup::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        return;
    }

    let engine = match Engine::new(Arc::new(QuillParser)) {
        Ok(engine) => engine,
        Err(err) => {
            report::fault(&err);
            std::process::exit(1);
        }
    };

    let command = &args[1];
    tracing::debug!(%command, "dispatching");
    let ok = match command.as_str() {
        "run" => {
            if args.len() < 3 {
                eprintln!("Usage: quill run <file>");
                std::process::exit(1);
            }
            run_file(&engine, &args[2])
        }
        "eval" => {
            if args.len() < 3 {
                eprintln!("Usage: quill eval <expression>");
                std::process::exit(1);
            }
            eval_expression(&engine, &args[2..].join(" "))
        }
        "repl" => repl(&engine),
        "help" | "--help" | "-h" => {
            print_usage();
            true
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            false
        }
    };
    if !ok {
        std::process::exit(1);
    }
}

fn print_usage() {
    println!("Quill scripting engine");
    println!();
    println!("Usage: quill <command> [args]");
    println!();
    println!("Commands:");
    println!("  run <file>          Run a script file and print its result");
    println!("  eval <expression>   Evaluate a single expression");
    println!("  repl                Interactive prompt; bindings persist between lines");
    println!();
    println!("Environment:");
    println!("  RUST_LOG            Enable tracing output (e.g. RUST_LOG=quill_eval=debug)");
    println!("  QUILL_LOG_TREE      Render tracing spans as a tree");
}

fn run_file(engine: &Engine, path: &str) -> bool {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("error: unable to read {path}: {err}");
            return false;
        }
    };
    if let Err(err) = quill_parse::parse_program(&source) {
        report::parse_error(path, &source, &err);
        return false;
    }
    let outcome = ScriptFile::from_file(path, engine.services().parser.clone())
        .and_then(|script| script.execute(engine, &Bindings::default()));
    finish(outcome)
}

fn eval_expression(engine: &Engine, source: &str) -> bool {
    if let Err(err) = quill_parse::parse_expression(source) {
        report::parse_error("<eval>", source, &err);
        return false;
    }
    finish(engine.evaluate_expression(source, &Bindings::default()))
}

fn repl(engine: &Engine) -> bool {
    let session = match engine.begin_repl(&Bindings::default()) {
        Ok(session) => session,
        Err(err) => {
            report::fault(&err);
            return false;
        }
    };
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        // A prompt that fails to flush is cosmetic; keep reading.
        let _ = io::stdout().flush();
        let Some(Ok(line)) = lines.next() else {
            println!();
            return true;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        repl_line(engine, &session, line);
    }
}

fn repl_line(engine: &Engine, session: &Session, line: &str) {
    let outcome = if is_program(line) {
        if let Err(err) = quill_parse::parse_program(line) {
            report::parse_error("<repl>", line, &err);
            return;
        }
        engine.evaluate_program_in(line, session)
    } else {
        if let Err(err) = quill_parse::parse_expression(line) {
            report::parse_error("<repl>", line, &err);
            return;
        }
        engine.evaluate_expression_in(line, session)
    };
    finish(outcome);
}

/// Lines ending in `;` or `}` are statements; anything else is an
/// expression whose value gets printed.
fn is_program(line: &str) -> bool {
    line.ends_with(';') || line.ends_with('}')
}

fn finish(outcome: Result<Value, EvalError>) -> bool {
    match outcome {
        Ok(value) => {
            if !value.is_null() {
                println!("{value}");
            }
            true
        }
        Err(err) => {
            report::fault(&err);
            false
        }
    }
}

#[cfg(test)]
mod tests;
