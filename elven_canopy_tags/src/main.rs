// Edition builder CLI entry point.
//
// Reads one rendered LilyPond file, runs the edition pipeline described by a
// JSON build configuration, and writes the result. All the work happens in
// the library; this file only brackets it with file I/O and prints the step
// messages.
//
// Usage:
//   cargo run -p elven_canopy_tags -- <input.ly> --config <build.json>
//     [--output <output.ly>] [--untagged]
//
// Without `--output` the result replaces the input file. `--untagged`
// additionally strips every tag comment (redundant indicators become
// visible again). Set `RUST_LOG=debug` for more detail.

use elven_canopy_tags::{BuildConfig, BuildError, Pipeline, export_untagged};
use std::path::{Path, PathBuf};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().collect();
    let Some(input) = args.get(1).filter(|s| !s.starts_with("--")) else {
        eprintln!("usage: build_edition <input.ly> --config <build.json> [--output <output.ly>] [--untagged]");
        std::process::exit(2);
    };
    let Some(config_path) = parse_flag::<PathBuf>(&args, "--config") else {
        eprintln!("--config requires a path");
        std::process::exit(2);
    };
    let output = parse_flag::<PathBuf>(&args, "--output").unwrap_or_else(|| PathBuf::from(input));
    let untagged = args.iter().any(|a| a == "--untagged");

    if let Err(e) = build(Path::new(input), &config_path, &output, untagged) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn build(input: &Path, config_path: &Path, output: &Path, untagged: bool) -> Result<(), BuildError> {
    let config = BuildConfig::load(config_path)?;
    let text = std::fs::read_to_string(input)?;

    println!("=== Building edition {} ===", config.edition.edition);
    if let Some(identifier) = &config.edition.identifier {
        println!("Identifier: {identifier}");
    }
    println!("Input: {}", input.display());

    let pipeline = Pipeline::from_config(&config);
    let run = pipeline.run(&text, &config)?;
    for step in &run.steps {
        println!("  [{}] {}", step.pass.name(), step.message());
    }

    let text = if untagged {
        export_untagged(&run.text)?
    } else {
        run.text
    };
    std::fs::write(output, text)?;
    println!("Wrote {}", output.display());
    Ok(())
}

fn parse_flag<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
}
