//! # Em
//!
//! This binary is the driver of M. It bundles the interactive session and
//! the file runner over both execution back-ends.
mod cli;

use cli::*;

use std::{fs, process::exit};

use log::error;
use m_lang::engine::{Engine, EvalEngine, VmEngine};
use m_lang::repl;

fn main() {
    let args = Cli::init();

    simple_logger::init_with_level((&args.verbosity).into()).unwrap();

    let mut engine: Box<dyn Engine> = match args.engine {
        EngineKind::Vm => Box::new(VmEngine::new()),
        EngineKind::Eval => Box::new(EvalEngine::new()),
    };

    match args.files.as_slice() {
        [] => {
            println!("Hello! This is the M programming language!");
            println!("Feel free to type in commands");
            if let Err(err) = repl::start(engine.as_mut()) {
                error!("{err}");
                exit(1);
            }
        }
        [file] => {
            let code = match fs::read_to_string(file) {
                Ok(code) => code,
                Err(err) => {
                    eprintln!("Sorry, M doesn't know how to run {}: {}", file.display(), err);
                    exit(1);
                }
            };
            match engine.evaluate(&code) {
                Ok(result) => print!("{result}"),
                Err(err) => {
                    repl::print_errors(&mut std::io::stderr(), err.as_ref());
                    exit(1);
                }
            }
        }
        _ => {
            eprintln!("Sorry, M only knows how to run one file at a time for now");
            exit(1);
        }
    }
}
