//! # Cli
//!
//! This module contains everything needed for parsing the CLI arguments for Em.

use clap::{Parser, ValueEnum};

/// Struct containing the CLI configuration for Em.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// The path to an M source file. Without a file, an interactive session
    /// is started.
    #[arg(index = 1)]
    pub files: Vec<std::path::PathBuf>,

    /// The execution back-end for this session.
    #[arg(long, value_enum, default_value_t = EngineKind::default())]
    pub engine: EngineKind,

    /// Specify the log level of the interpreter.
    #[arg(value_enum, short, long, default_value_t = LogLevel::default())]
    pub verbosity: LogLevel,
}

impl Cli {
    pub fn init() -> Self {
        Cli::parse()
    }
}

/// Enum for selecting the execution back-end.
#[derive(ValueEnum, Copy, Clone, Debug, Default)]
pub enum EngineKind {
    /// Compile to bytecode and run it on the stack machine.
    #[default]
    Vm,

    /// Walk the syntax tree directly.
    Eval,
}

/// Enum for specifying the log level of Em.
#[derive(ValueEnum, Clone, Default, Debug)]
pub enum LogLevel {
    /// The default log level. Only critical errors will be logged.
    #[default]
    #[value(alias("0"))]
    Error,

    /// A log level, where also warnings are logged.
    #[value(alias("1"))]
    Warn,

    /// Also log information about the general state of the interpreter.
    #[value(alias("2"))]
    Info,

    /// Log everything which happens internally, e.g. the disassembly of
    /// each compiled chunk.
    #[value(alias("3"))]
    Debug,

    /// Log extra information. This output can be quite clunky.
    #[value(alias("4"))]
    Trace,
}

impl From<&LogLevel> for log::Level {
    fn from(value: &LogLevel) -> Self {
        match value {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}
