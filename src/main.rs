use cfront::analyze;
use cfront::lexer::LexerError;
use cfront::parser::ParseError;
use cfront::type_checker::TypeCheckerError;
use clap::Parser;
use colored::Colorize;
use std::fs;
use std::path::Path;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path of the input source file
    file: String,

    /// Print the parsed AST on success
    #[arg(long, short)]
    ast: bool,
}

fn main() -> std::io::Result<()> {
    let cli = Cli::parse();

    let path = Path::new(&cli.file);
    let text = fs::read_to_string(path)?;

    match analyze(&text) {
        Ok(program) => {
            if cli.ast {
                println!("{program:#?}");
            }
        }
        Err(err) => {
            let token = err
                .downcast_ref::<LexerError>()
                .map(|e| &e.token)
                .or_else(|| err.downcast_ref::<ParseError>().map(|e| &e.token))
                .or_else(|| err.downcast_ref::<TypeCheckerError>().map(|e| &e.token));

            let msg = match token {
                Some(token) => format!(
                    "error {}:{} (at {}): {}",
                    token.line,
                    token.column,
                    token,
                    err.root_cause()
                ),
                None => format!("error: {err}"),
            };
            eprintln!("{}", msg.red());

            std::process::exit(1);
        }
    };

    Ok(())
}
