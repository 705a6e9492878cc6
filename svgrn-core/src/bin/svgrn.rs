use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;
use svgrn_core::flavor::component_name_from_stem;
use svgrn_core::{convert_bytes, inspect, is_failure, FlavorId, OutputFlavor};
use tracing_subscriber::EnvFilter;

/// Convert SVG files into react-native-svg components.
#[derive(Parser, Debug)]
#[command(name = "svgrn", version)]
struct Cli {
    /// SVG files to convert. `-` reads standard input.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Built-in output flavor.
    #[arg(short, long, default_value = "generic")]
    flavor: FlavorId,

    /// YAML flavor definition; takes precedence over --flavor.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Component name. Defaults to the PascalCased file name.
    #[arg(short, long)]
    name: Option<String>,

    /// Write `<Name>.jsx`/`.tsx` files into this directory instead of stdout.
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Print the normalized tree as JSON instead of generating code.
    #[arg(long)]
    dump_tree: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("error: {:#}", e);
            process::exit(2);
        }
    }
}

/// Returns whether every input converted.
fn run(cli: &Cli) -> Result<bool> {
    let base = match &cli.config {
        Some(path) => {
            let yaml = fs::read_to_string(path)
                .with_context(|| format!("Failed to read flavor config {}", path.display()))?;
            OutputFlavor::from_yaml(&yaml)
                .with_context(|| format!("Invalid flavor config {}", path.display()))?
        }
        None => cli.flavor.preset(),
    };

    if let Some(dir) = &cli.out {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let mut all_ok = true;
    for input in &cli.inputs {
        let raw = read_input(input)?;

        if cli.dump_tree {
            let text = String::from_utf8_lossy(&raw);
            match inspect(&text) {
                Ok((tree, sizing)) => {
                    let json = serde_json::json!({ "sizing": sizing, "tree": tree });
                    println!("{}", serde_json::to_string_pretty(&json)?);
                }
                Err(e) => {
                    eprintln!("✗ {}: {}", input.display(), e);
                    all_ok = false;
                }
            }
            continue;
        }

        let flavor = match &cli.name {
            Some(name) => base.clone().with_component_name(name.clone()),
            None if base_name_is_default(&base, cli.config.is_some()) => {
                base.clone().with_component_name(default_name(input))
            }
            None => base.clone(),
        };

        let result = convert_bytes(&raw, &flavor);
        if is_failure(&result) {
            eprintln!("✗ {}: {}", input.display(), result);
            all_ok = false;
            continue;
        }

        match &cli.out {
            Some(dir) => {
                let target = dir.join(format!(
                    "{}.{}",
                    flavor.component_name,
                    flavor.file_extension()
                ));
                fs::write(&target, &result)
                    .with_context(|| format!("Failed to write {}", target.display()))?;
                eprintln!("✓ {} -> {}", input.display(), target.display());
            }
            None => print!("{}", result),
        }
    }
    Ok(all_ok)
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    if path.as_os_str() == "-" {
        let mut buf = Vec::new();
        io::stdin()
            .read_to_end(&mut buf)
            .context("Failed to read standard input")?;
        return Ok(buf);
    }
    fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// A configured component name is kept; the preset name is replaced by the
/// file name.
fn base_name_is_default(flavor: &OutputFlavor, from_config: bool) -> bool {
    !from_config || flavor.component_name == OutputFlavor::generic().component_name
}

fn default_name(input: &Path) -> String {
    input
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| *s != "-")
        .map(component_name_from_stem)
        .unwrap_or_else(|| OutputFlavor::generic().component_name)
}
