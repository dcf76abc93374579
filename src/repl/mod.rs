use std::error::Error;
use std::io::Write;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::engine::Engine;

const PROMPT: &str = ">> ";

const MONKEY_FACE: &str = r#"            __,__
   .--.  .-"     "-.  .--.
  / .. \/  .-. .-.  \/ .. \
 | |  '|  /   Y   \  |'  | |
 | \   \  \ 0 | 0 /  /   / |
  \ '- ,\.-"""""""-./, -' /
   ''-' /_   ^ ^   _\ '-''
       |  \._   _./  |
       \   \ '~' /   /
        '._ '-=-' _.'
           '-----'
"#;

/// Read-evaluate-print loop over the given engine. Quits on `exit`,
/// `exit()`, Ctrl-C or Ctrl-D.
pub fn start(engine: &mut dyn Engine) -> Result<(), Box<dyn Error>> {
    let mut editor = DefaultEditor::new()?;

    loop {
        match editor.readline(PROMPT) {
            Ok(line) => {
                if line == "exit" || line == "exit()" {
                    println!();
                    break;
                }
                let _ = editor.add_history_entry(line.as_str());

                match engine.evaluate(&line) {
                    Ok(result) => println!("{result}"),
                    Err(error) => print_errors(&mut std::io::stdout(), error.as_ref()),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("keyboard interupt.");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!();
                break;
            }
            Err(error) => return Err(Box::new(error)),
        }
    }

    Ok(())
}

/// The error banner shown for any failed evaluation.
pub fn print_errors(out: &mut dyn Write, error: &dyn Error) {
    let _ = write!(out, "{MONKEY_FACE}");
    let _ = writeln!(out, "Woops! We ran into some monkey business here!");
    let _ = writeln!(out, " parser errors:");
    let _ = writeln!(out, "\t{error}");
}
