use anyhow::{Context, Result};
use clap::{Parser as ClapParser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use ugo_rust::lexer::lex;
use ugo_rust::parser::parse_file;
use ugo_rust::{compile_expr_source, compile_source, TokenKind, BUILTIN_RUNTIME};

#[derive(ClapParser)]
#[command(name = "ugoc")]
#[command(about = "Compiler for the µGo toy language", long_about = None)]
struct Cli {
    /// Log pipeline stages (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Tokenize the input file and print tokens
    Lex {
        /// Input file path
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Also print comments
        #[arg(short, long)]
        comments: bool,
    },
    /// Parse the input file and print the AST
    Parse {
        /// Input file path
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Compile the input file to LLVM IR
    Compile {
        /// Input file path
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output file path (defaults to stdout)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },
    /// Compile a single expression; the program exits with its value
    Expr {
        /// Expression source, e.g. "1+2*3"
        #[arg(value_name = "EXPR")]
        expr: String,

        /// Output file path (defaults to stdout)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },
    /// Print the builtin runtime module to link with compiled programs
    Runtime {
        /// Output file path (defaults to stdout)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match cli.command {
        Commands::Lex { file, comments } => lex_file(&file, comments)?,
        Commands::Parse { file } => dump_ast(&file)?,
        Commands::Compile { file, output } => {
            let input = read_source(&file)?;
            let ir = compile_source(&file.display().to_string(), &input)
                .with_context(|| format!("failed to compile '{}'", file.display()))?;
            write_output(output.as_deref(), &ir)?;
        }
        Commands::Expr { expr, output } => {
            let ir = compile_expr_source("<expr>", &expr)
                .with_context(|| format!("failed to compile expression '{expr}'"))?;
            write_output(output.as_deref(), &ir)?;
        }
        Commands::Runtime { output } => write_output(output.as_deref(), BUILTIN_RUNTIME)?,
    }

    Ok(())
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read file '{}'", path.display()))
}

fn write_output(output: Option<&Path>, text: &str) -> Result<()> {
    match output {
        Some(path) => fs::write(path, text)
            .with_context(|| format!("failed to write '{}'", path.display())),
        None => {
            print!("{text}");
            Ok(())
        }
    }
}

fn lex_file(path: &Path, show_comments: bool) -> Result<()> {
    let input = read_source(path)?;
    let name = path.display().to_string();

    let (tokens, comments) = lex(&name, &input);
    for token in &tokens {
        println!("{} {}", token.pos.position(&name, &input), token);
    }
    if show_comments {
        for comment in &comments {
            println!("{} {}", comment.pos.position(&name, &input), comment);
        }
    }

    if let Some(bad) = tokens.iter().find(|tok| tok.kind == TokenKind::Error) {
        anyhow::bail!("{}: {}", bad.pos.position(&name, &input), bad.lexeme);
    }
    Ok(())
}

fn dump_ast(path: &Path) -> Result<()> {
    let input = read_source(path)?;
    let file = parse_file(&path.display().to_string(), &input)
        .with_context(|| format!("failed to parse '{}'", path.display()))?;

    println!("package {}", file.package.name);
    for import in &file.imports {
        println!("import {:?}", import.path);
    }
    for spec in &file.consts {
        println!("{spec:#?}");
    }
    for spec in &file.types {
        println!("{spec:#?}");
    }
    for spec in &file.globals {
        println!("{spec:#?}");
    }
    for func in &file.funcs {
        println!("{func:#?}");
    }
    Ok(())
}
