use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{error, info};
use rustyline::error::ReadlineError;
use rustyline::history::FileHistory;
use rustyline::{config::Config as EditorConfig, Editor, Helper};
use simplelog::{Config as LogConfig, LevelFilter, SimpleLogger};

mod input;
mod lang;

use input::{fixup_input, strip_comments, ReplHelper};
use lang::runtime::Runtime;

const HISTORY_FILE: &str = ".denari_history";
const PROMPT: &str = "(denari) ";

#[derive(Parser)]
#[command(version, about)]
struct Opt {
    /// Show debug output
    #[arg(short, long)]
    debug: bool,
    /// Evaluate a script instead of starting a REPL
    script: Option<PathBuf>,
}

fn init_logging(debug: bool) -> Result<()> {
    let filter = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Error
    };

    match SimpleLogger::init(filter, LogConfig::default()) {
        Ok(_) => Ok(()),
        Err(e) => bail!("Failed to init logger: {}", e),
    }
}

fn init_editor() -> Result<Editor<ReplHelper, FileHistory>> {
    let config = EditorConfig::builder().auto_add_history(true).build();
    let mut editor = Editor::with_config(config)?;
    editor.set_helper(Some(ReplHelper::new()));

    Ok(editor)
}

fn init_history<H: Helper>(editor: &mut Editor<H, FileHistory>) {
    let _ = editor.load_history(HISTORY_FILE);
}

fn save_history<H: Helper>(editor: &mut Editor<H, FileHistory>) -> Result<()> {
    match editor.save_history(HISTORY_FILE) {
        Ok(_) => Ok(()),
        Err(e) => bail!("Failed to save history: {}", e),
    }
}

fn welcome() {
    println!("denari v{}", env!("CARGO_PKG_VERSION"));
    println!("Type 'help' for help");
    println!();
}

fn print_help() {
    let help = vec![
        ("Commands", ""),
        ("--------------------", ""),
        ("help", "Print help"),
        ("quit", "Exit the calculator"),
        ("", ""),
        ("Language", ""),
        ("--------------------", ""),
        ("2 + 3 * 4", "Arithmetic with the usual precedence; () to group"),
        ("$12.50, €3, £0.99", "Money literals; mixed-currency arithmetic fails"),
        ("price = $8", "Assign a variable; statements separated by ';'"),
        ("print x (x * 2)", "Apply a function to the factors that follow it"),
        ("abs, neg, round, print", "Builtin functions"),
        ("# comment", "Rest of the line is ignored"),
    ];

    let width = help
        .iter()
        .max_by_key(|p| p.0.len())
        .map_or(0, |p| p.0.len() + 4);
    for (l, r) in help {
        println!("{:width$}{}", l, r, width = width);
    }
}

fn run_script(path: &Path) -> Result<()> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read script: {}", path.display()))?;

    let mut sink = io::stdout();
    let mut runtime = Runtime::new(&mut sink);
    match runtime.eval(&strip_comments(&source)) {
        Ok(Some(value)) => println!("{}", value),
        Ok(None) => (),
        Err(e) => bail!("{}: {}", path.display(), e),
    }

    Ok(())
}

fn repl() -> Result<()> {
    let mut editor = init_editor()?;
    init_history(&mut editor);
    welcome();

    let mut sink = io::stdout();
    let mut runtime = Runtime::new(&mut sink);

    loop {
        match editor.readline(PROMPT) {
            Ok(line) => {
                info!("read: {}", &line);

                let line = strip_comments(&fixup_input(&line));
                match line.trim() {
                    "" => continue,
                    "quit" => break,
                    "help" => {
                        print_help();
                        continue;
                    }
                    _ => (),
                }

                match runtime.eval(&line) {
                    Ok(Some(value)) => println!("{}", value),
                    Ok(None) => (),
                    Err(e) => {
                        eprintln!("{}", e);
                        continue;
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                eprintln!("Press Ctrl-D or type 'quit' to quit");
            }
            Err(ReadlineError::Eof) => {
                println!("quit");
                break;
            }
            Err(e) => {
                error!("Unexpected error: {}", e);
                println!("quit");
                break;
            }
        }
    }

    save_history(&mut editor)?;

    Ok(())
}

fn main() -> Result<()> {
    let opts = Opt::parse();
    init_logging(opts.debug)?;

    match &opts.script {
        Some(path) => run_script(path),
        None => repl(),
    }
}
