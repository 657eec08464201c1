//! pagefields CLI - extraction template tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;

use pagefields::{load_template, rescale_template, save_template, JsonFormat, TemplateItem};

#[derive(Parser)]
#[command(name = "pagefields")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Inspect, rescale and convert extraction templates", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the items of a template
    Info {
        /// Template XML file
        #[arg(value_name = "TEMPLATE")]
        input: PathBuf,
    },

    /// Re-author a template for a different page width
    Rescale {
        /// Template XML file
        #[arg(value_name = "TEMPLATE")]
        input: PathBuf,

        /// Target page width
        #[arg(short = 'w', long, value_name = "WIDTH")]
        page_width: f64,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Convert a template to JSON
    Json {
        /// Template XML file
        #[arg(value_name = "TEMPLATE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Info { input } => cmd_info(&input),
        Commands::Rescale {
            input,
            page_width,
            output,
        } => cmd_rescale(&input, page_width, output.as_deref()),
        Commands::Json {
            input,
            output,
            compact,
        } => cmd_json(&input, output.as_deref(), compact),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let template = load_template(input)?;
    log::debug!("Loaded {} items from {}", template.len(), input.display());

    println!("{}", "Template Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Items".bold(), template.len());

    if template.is_empty() {
        return Ok(());
    }

    println!();
    println!("{}", "Items".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for item in &template {
        println!("{}", describe(item));
    }

    Ok(())
}

fn describe(item: &TemplateItem) -> String {
    let rect = item.rectangle();
    let mut line = format!(
        "{:<8} {} (page width {}) at ({}, {}) {}x{}",
        item.kind_name().yellow(),
        item.name().bold(),
        item.page_width(),
        rect.x,
        rect.y,
        rect.width,
        rect.height
    );

    match item {
        TemplateItem::Field(f) if f.is_hidden => {
            line.push_str(&format!(" {} \"{}\"", "hidden".dimmed(), f.value));
        }
        TemplateItem::Table(t) => {
            let columns: Vec<String> = t
                .layout
                .vertical_separators
                .iter()
                .map(|p| p.to_string())
                .collect();
            line.push_str(&format!(" {} [{}]", "columns".dimmed(), columns.join(", ")));
        }
        _ => {}
    }

    line
}

fn cmd_rescale(
    input: &Path,
    page_width: f64,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let template = load_template(input)?;
    let rescaled = rescale_template(&template, page_width)?;
    log::debug!("Rescaled {} items to page width {}", rescaled.len(), page_width);

    if let Some(path) = output {
        save_template(&rescaled, path)?;
        println!(
            "{} {} items to {}",
            "Rescaled".green(),
            rescaled.len(),
            path.display()
        );
    } else {
        println!("{}", pagefields::template::xml::to_xml_string(&rescaled)?);
    }

    Ok(())
}

fn cmd_json(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    let json = pagefields::template_file_to_json(input, format)?;

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pagefields".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Extraction template tool");
    println!();
    println!("License: MIT");
}
