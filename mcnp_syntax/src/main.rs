use mcnp_syntax::pipeline::{self, PipelineError, ProcessedInput, ProcessingOptions};
use mcnp_syntax::{logging, FormatVersion};
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
struct CliOptions {
    check_mode: bool,
    fail_fast: bool,
    version: Option<FormatVersion>,
    out: Option<PathBuf>,
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize global logging system
    logging::init_global_logging()?;

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <input> [options]", args[0]);
        eprintln!("       {} --help", args[0]);
        std::process::exit(1);
    }

    if args[1] == "--help" {
        print_help(&args[0]);
        return Ok(());
    }

    let input_path = Path::new(&args[1]);
    if !input_path.is_file() {
        eprintln!("Error: Input must be a file");
        eprintln!("  File: {}", input_path.display());
        std::process::exit(1);
    }

    let cli = parse_options(&args[2..]);
    let mut options = ProcessingOptions::default();
    options.check_mode |= cli.check_mode;
    options.fail_fast |= cli.fail_fast;
    if let Some(version) = cli.version {
        options = options.with_version(version);
    }

    match pipeline::process_file(input_path, &options) {
        Ok(input) => report_success(input_path, &input, &cli)?,
        Err(error) => {
            eprintln!("\nFAILED: {}", error);
            print_detailed_error(&error);
            print_collected();
            std::process::exit(1);
        }
    }

    Ok(())
}

fn print_help(program_name: &str) {
    println!("mcnp_syntax v{}", env!("CARGO_PKG_VERSION"));
    println!("Format-preserving round trip of fixed-column input decks");
    println!();
    println!("USAGE:");
    println!("    {} <input> [options]", program_name);
    println!();
    println!("OPTIONS:");
    println!("    --help              Show this help message");
    println!("    --check             Report record errors as warnings and keep going");
    println!("    --fail-fast         Stop at the first record that fails to parse");
    println!("    --version X.Y.Z     Format version for column limits (default: 6.3.0)");
    println!("    --out FILE          Write the round-tripped deck to FILE");
    println!("    --json              Print a JSON summary instead of text");
    println!();
    println!("EXAMPLES:");
    println!("    {} deck.i --check", program_name);
    println!("    {} deck.i --version 6.1.0 --out copy.i", program_name);
}

fn parse_options(args: &[String]) -> CliOptions {
    let mut options = CliOptions::default();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--check" => {
                options.check_mode = true;
            }
            "--fail-fast" => {
                options.fail_fast = true;
            }
            "--json" => {
                options.json = true;
            }
            "--version" => {
                if i + 1 < args.len() {
                    match args[i + 1].parse::<FormatVersion>() {
                        Ok(version) => options.version = Some(version),
                        Err(_) => {
                            eprintln!("Warning: Invalid version '{}', using default", args[i + 1])
                        }
                    }
                    i += 1;
                } else {
                    eprintln!("Warning: --version requires X.Y.Z");
                }
            }
            "--out" => {
                if i + 1 < args.len() {
                    options.out = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                } else {
                    eprintln!("Warning: --out requires a file name");
                }
            }
            _ => {
                eprintln!("Warning: Unknown option '{}'", args[i]);
            }
        }
        i += 1;
    }

    options
}

fn report_success(
    path: &Path,
    input: &ProcessedInput,
    cli: &CliOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut warnings = match &cli.out {
        Some(out) => input.write_file(out)?,
        None => input.write_with_warnings()?.1,
    };
    warnings.extend(input.warnings.iter().cloned());

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&input.summary())?);
    } else {
        println!("Processing file: {}", path.display());
        for error in &input.errors {
            eprintln!("{}", error.render());
        }
        for warning in &warnings {
            eprintln!("{}", warning);
        }
        let summary = input.summary();
        println!(
            "  {} cells, {} surfaces, {} data records ({} kept as written, {} included)",
            summary.cells, summary.surfaces, summary.data, summary.opaque, summary.included
        );
        if let Some(out) = &cli.out {
            println!("  Output written to {}", out.display());
        }
        print_collected();
    }

    if input.has_errors() {
        eprintln!("\nFAILED: {} record(s) could not be parsed", input.errors.len());
        std::process::exit(1);
    }
    if !cli.json {
        println!("\nSUCCESS: Deck parsed and written back");
    }
    Ok(())
}

fn print_collected() {
    if let Some(summary) = logging::cargo_style_summary() {
        if !summary.trim().is_empty() {
            eprintln!("\n{}", summary);
        }
    }
}

fn print_detailed_error(error: &PipelineError) {
    match error {
        PipelineError::Reader(ref reader_err) => {
            eprintln!("Block reading failed:");
            eprintln!("  {}", reader_err);
        }
        PipelineError::Record(ref record_err) => {
            eprintln!("Record could not be parsed:");
            eprint!("{}", record_err.render());
        }
        other => {
            eprintln!("{} error:", other.category());
            eprintln!("  {}", other);
        }
    }
    let action = error.recommended_action();
    if action != "No specific action available" {
        eprintln!("  = help: {}", action);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_options() {
        let args = vec![
            "--check".to_string(),
            "--version".to_string(),
            "6.1.0".to_string(),
            "--out".to_string(),
            "copy.i".to_string(),
            "--json".to_string(),
        ];

        let options = parse_options(&args);
        assert!(options.check_mode);
        assert!(!options.fail_fast);
        assert_eq!(options.version, Some(FormatVersion::new(6, 1, 0)));
        assert_eq!(options.out, Some(PathBuf::from("copy.i")));
        assert!(options.json);
    }

    #[test]
    fn test_parse_options_invalid() {
        let args = vec![
            "--version".to_string(),
            "six".to_string(),
            "--unknown-option".to_string(),
        ];

        let options = parse_options(&args);
        assert_eq!(options.version, None);
        assert!(!options.check_mode);
    }
}
