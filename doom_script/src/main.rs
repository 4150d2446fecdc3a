use doom_script::config::runtime::RuntimeConfig;
use doom_script::file_processor::FileProcessor;
use doom_script::patch::{parse_patch, patch_kernel, PatchDocument, PatchTag};
use doom_script::preprocess::{FileSystemResolver, Preprocessor};
use doom_script::syntax::ParseFailure;
use doom_script::{logging, TokenKind};
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, PartialEq)]
struct CliOptions {
    script: PathBuf,
    json: bool,
    tokens: bool,
    newlines: bool,
    defines: Vec<(String, String)>,
    include_dirs: Vec<PathBuf>,
    config: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <script.dh> [options]", args[0]);
        eprintln!("       {} --help", args[0]);
        std::process::exit(1);
    }

    if args[1] == "--help" {
        print_help(&args[0]);
        return Ok(());
    }

    let options = parse_options(&args[1..]);

    let runtime = match &options.config {
        Some(path) => RuntimeConfig::load(path)?,
        None => RuntimeConfig::default(),
    };
    logging::config::init_runtime_preferences(runtime.logging.clone())?;
    logging::init_global_logging()?;

    let mut preprocessor = match build_preprocessor(&options, &runtime) {
        Ok(preprocessor) => preprocessor,
        Err(error) => {
            eprintln!("FAILED: {}", error);
            std::process::exit(1);
        }
    };

    if options.tokens {
        print_tokens(&mut preprocessor);
        return Ok(());
    }

    match parse_patch(preprocessor, &runtime.parser) {
        Ok(document) if options.json => {
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
        Ok(document) => print_summary(&options.script, &document),
        Err(failure) => {
            print_failure(&failure);
            std::process::exit(1);
        }
    }

    Ok(())
}

fn print_help(program_name: &str) {
    println!("Doom Script v{}", env!("CARGO_PKG_VERSION"));
    println!("Preprocess and parse a patch script");
    println!();
    println!("USAGE:");
    println!("    {} <script.dh> [options]", program_name);
    println!();
    println!("OPTIONS:");
    println!("    --help                Show this help message");
    println!("    --json                Print the parsed patch document as JSON");
    println!("    --tokens              Print the preprocessed token stream instead of parsing");
    println!("    --newlines            Include newline tokens in --tokens output");
    println!("    --define NAME=VALUE   Define a macro before reading the script");
    println!("    --include-dir DIR     Add an include search directory");
    println!("    --config FILE         Load preferences from a TOML file");
    println!();
    println!("EXAMPLES:");
    println!("    {} patch.dh --json", program_name);
    println!("    {} patch.dh --define DEBUG=1 --include-dir lib/", program_name);
    println!();
    println!("{}", doom_script::config::build_info::source_info());
}

fn parse_options(args: &[String]) -> CliOptions {
    let mut options = CliOptions::default();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--json" => options.json = true,
            "--tokens" => options.tokens = true,
            "--newlines" => options.newlines = true,
            "--define" => {
                if let Some(definition) = args.get(i + 1) {
                    let (name, value) = definition
                        .split_once('=')
                        .unwrap_or((definition.as_str(), ""));
                    options.defines.push((name.to_string(), value.to_string()));
                    i += 1;
                } else {
                    eprintln!("Warning: --define requires NAME=VALUE");
                }
            }
            "--include-dir" => {
                if let Some(dir) = args.get(i + 1) {
                    options.include_dirs.push(PathBuf::from(dir));
                    i += 1;
                } else {
                    eprintln!("Warning: --include-dir requires a directory");
                }
            }
            "--config" => {
                if let Some(path) = args.get(i + 1) {
                    options.config = Some(PathBuf::from(path));
                    i += 1;
                } else {
                    eprintln!("Warning: --config requires a file");
                }
            }
            other if other.starts_with("--") => {
                eprintln!("Warning: Unknown option '{}'", other);
            }
            other => options.script = PathBuf::from(other),
        }
        i += 1;
    }

    options
}

fn build_preprocessor(
    options: &CliOptions,
    runtime: &RuntimeConfig,
) -> Result<Preprocessor<PatchTag>, Box<dyn std::error::Error>> {
    let source = FileProcessor::new().read_source(&options.script)?;

    let resolver = options
        .include_dirs
        .iter()
        .fold(FileSystemResolver::new(), |resolver, dir| {
            resolver.with_search_root(dir)
        });

    let mut preferences = runtime.preprocessor.clone();
    preferences.emit_newlines = options.tokens && (options.newlines || preferences.emit_newlines);

    let mut preprocessor = Preprocessor::new(patch_kernel(), source.stream_name(), &source.text)
        .with_resolver(resolver)
        .with_preferences(preferences);
    for (name, value) in &options.defines {
        preprocessor.define(name, value)?;
    }
    Ok(preprocessor)
}

fn print_tokens(preprocessor: &mut Preprocessor<PatchTag>) {
    loop {
        match preprocessor.next_token() {
            Ok(token) if token.is_end() => break,
            Ok(token) => {
                let text = if token.kind == TokenKind::Newline {
                    "\\n".to_string()
                } else {
                    token.lexeme.clone()
                };
                println!("{}\t{}\t{}", token.location, token.kind.name(), text);
            }
            Err(error) => {
                eprintln!("FAILED: {}", error);
                std::process::exit(1);
            }
        }
    }
}

fn print_summary(script: &Path, document: &PatchDocument) {
    println!("Parsed {} (format {})", script.display(), document.format);
    for table in [
        &document.things,
        &document.weapons,
        &document.ammo,
        &document.states,
    ] {
        if !table.is_empty() {
            println!("  {}: {} entries", table.kind(), table.len());
        }
    }
    if !document.strings.is_empty() {
        println!("  strings: {}", document.strings.len());
    }
    if !document.misc.is_empty() {
        println!("  misc: {} values", document.misc.len());
    }
}

fn print_failure(failure: &ParseFailure) {
    for line in failure.lines() {
        eprintln!("{}", line);
    }
    if let ParseFailure::Aggregate(aggregate) = failure {
        if aggregate.is_truncated() {
            eprintln!("(further errors not reported)");
        }
    }
}
