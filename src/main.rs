use clap::{Parser, Subcommand};
use mathline::{evaluate, tokenize};
use miette::{IntoDiagnostic, WrapErr};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::fs;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the token stream of a file
    Tokenize { filename: PathBuf },
    /// Evaluate a .math file line by line, writing one result per line to a .resu file
    Run { input: PathBuf, output: PathBuf },
    /// Evaluate expressions interactively
    Repl,
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Tokenize { filename } => {
            let file_contents = fs::read_to_string(&filename)
                .into_diagnostic()
                .wrap_err_with(|| format!("reading '{}' failed", filename.display()))?;

            for token in tokenize(&file_contents) {
                println!("{:?}", token);
            }
        }
        Commands::Run { input, output } => {
            ensure_extension(&input, "math")?;
            ensure_extension(&output, "resu")?;

            let file_contents = fs::read_to_string(&input)
                .into_diagnostic()
                .wrap_err_with(|| format!("reading '{}' failed", input.display()))?;

            let results = run_batch(&file_contents)?;

            fs::write(&output, results)
                .into_diagnostic()
                .wrap_err_with(|| format!("writing '{}' failed", output.display()))?;

            println!(
                "Processing complete. Results have been written to {}",
                output.display()
            );
        }
        Commands::Repl => {
            let stdin = io::stdin();
            repl(stdin.lock(), io::stdout()).into_diagnostic()?;
        }
    }

    Ok(())
}

fn ensure_extension(path: &Path, extension: &str) -> miette::Result<()> {
    if path.extension().and_then(|ext| ext.to_str()) != Some(extension) {
        miette::bail!("'{}' must end with .{}", path.display(), extension);
    }
    Ok(())
}

/// Evaluates every line of `contents`, returning one result line per input
/// line in input order. The first malformed line aborts the batch.
fn run_batch(contents: &str) -> miette::Result<String> {
    let mut results = String::new();

    for (index, line) in contents.lines().enumerate() {
        let tokens = tokenize(line);
        let value = evaluate(&tokens)
            .map_err(|err| miette::Report::new(err).with_source_code(line.to_string()))
            .wrap_err_with(|| format!("could not evaluate line {}", index + 1))?;

        results.push_str(&format!("{value}\n"));
    }

    Ok(results)
}

fn repl(mut input: impl BufRead, mut output: impl Write) -> io::Result<()> {
    let mut line = String::new();

    loop {
        write!(output, "Enter an equation (or type 'exit' to quit): ")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let expression = line.strip_suffix('\n').unwrap_or(&line);
        let expression = expression.strip_suffix('\r').unwrap_or(expression);
        if expression.is_empty() {
            continue;
        }

        // exact match only, no case folding or trimming
        if expression == "exit" {
            writeln!(output, "Exiting the program.")?;
            break;
        }

        let tokens = tokenize(expression);
        match evaluate(&tokens) {
            Ok(value) => writeln!(output, "Result: {value}")?,
            Err(err) => {
                let report = miette::Report::new(err).with_source_code(expression.to_string());
                writeln!(output, "{report:?}")?;
            }
        }
    }

    Ok(())
}
