use std::io::IsTerminal;

use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::info;

use imago_core::{InputStream, Value};
use imago_eval::{repl, Interpreter};

#[derive(Parser)]
#[command(name = "imago", about = "imago: a small self-contained Lisp", version)]
struct Cli {
    /// Verbosity level 0..2
    #[arg(short = 'v', value_name = "N", default_value_t = 0)]
    verbose: u8,

    /// Boot file, evaluated before anything else
    #[arg(short = 'b', value_name = "PATH", default_value = "lisp/boot.inc")]
    boot: String,

    /// Source files, evaluated in order after the boot file
    files: Vec<String>,
}

fn usage() -> ! {
    println!("imago [switches] [filename ...]");
    println!("eg. imago -v 1 prog.lisp");
    println!("reads from stdin after any files.");
    println!("-v N:  verbosity level 0..2, default 0");
    println!("-b P:  boot file, default lisp/boot.inc");
    std::process::exit(0);
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(_) => usage(),
    };

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let interp = Interpreter::new();
    let verbose = cli.verbose > 0;

    // A failure on the boot stream stops the interpreter.
    info!(boot = %cli.boot, "loading boot file");
    let boot = match InputStream::from_path(&cli.boot) {
        Ok(stream) => Value::instream(stream),
        Err(e) => {
            eprintln!("cannot open boot file {}: {e}", cli.boot);
            std::process::exit(1);
        }
    };
    if repl(&interp.ctx, &boot, &cli.boot, verbose).is_err() {
        std::process::exit(1);
    }

    // An error terminates the file's stream only; later files still run.
    for file in &cli.files {
        info!(file = %file, "loading file");
        match InputStream::from_path(file) {
            Ok(stream) => {
                let _ = repl(&interp.ctx, &Value::instream(stream), file, verbose);
            }
            Err(e) => eprintln!("cannot open {file}: {e}"),
        }
    }

    if std::io::stdin().is_terminal() {
        interactive(&interp);
    } else {
        let stdin = Value::instream(InputStream::stdin());
        let _ = repl(&interp.ctx, &stdin, "stdin", true);
    }
}

fn interactive(interp: &Interpreter) {
    let Ok(mut rl) = DefaultEditor::new() else {
        eprintln!("cannot initialise line editor");
        return;
    };
    let history_path = home_dir().join(".imago").join("history.txt");
    let _ = rl.load_history(&history_path);

    println!(";;;;;;;;;;;;;");
    println!("; imago {} ;", env!("CARGO_PKG_VERSION"));
    println!(";;;;;;;;;;;;;");

    let mut buffer = String::new();
    let mut in_multiline = false;

    loop {
        let prompt = if in_multiline { "  ... " } else { "imago> " };
        match rl.readline(prompt) {
            Ok(line) => {
                if in_multiline {
                    buffer.push('\n');
                    buffer.push_str(&line);
                } else {
                    buffer = line;
                }
                if !is_balanced(&buffer) {
                    in_multiline = true;
                    continue;
                }
                in_multiline = false;
                let input = std::mem::take(&mut buffer);
                if input.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&input);
                match interp.eval_str(&input) {
                    Ok(v) => println!("{v}"),
                    Err(e) => eprintln!("{e}"),
                }
            }
            Err(ReadlineError::Interrupted) => {
                if in_multiline {
                    buffer.clear();
                    in_multiline = false;
                    println!("^C");
                    continue;
                }
                break;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{e}");
                break;
            }
        }
    }

    let _ = std::fs::create_dir_all(history_path.parent().unwrap_or(std::path::Path::new(".")));
    let _ = rl.save_history(&history_path);
}

/// Unclosed parens mean the form continues on the next line. String
/// bodies (`"..."` and `{...}`) and `;` comments don't count.
fn is_balanced(input: &str) -> bool {
    let mut depth = 0i32;
    let mut chars = input.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                for c in chars.by_ref() {
                    if c == '"' {
                        break;
                    }
                }
            }
            '{' => {
                for c in chars.by_ref() {
                    if c == '}' {
                        break;
                    }
                }
            }
            ';' => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
    }
    depth <= 0
}

fn home_dir() -> std::path::PathBuf {
    std::env::var("HOME")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| std::path::PathBuf::from("."))
}
