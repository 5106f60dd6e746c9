//! Provgraph CLI
//!
//! Builds the provenance record for an ADAMA annotation lookup (or any
//! scenario table given with `--scenario`), prints it as PROV-N and
//! PROV-JSON on stdout, and renders it to a PNG diagram.

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

use provgraph_export::{
    render_dot, render_image_with, to_prov_json, to_provn, DotOptions, GraphvizCli,
};
use provgraph_model::ProvDocument;
use provgraph_scenario::{AttributeSchema, Scenario, SystemClock};

#[derive(Parser)]
#[command(name = "provgraph")]
#[command(
    author,
    version,
    about = "Provgraph: provenance records for Araport annotation lookups"
)]
struct Cli {
    /// Attribute schema used to spell scenario facts (v1|v2)
    #[arg(long, default_value = "v1")]
    schema: AttributeSchema,

    /// Scenario table (JSON) to build instead of the built-in annotation lookup
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Where to write the rendered diagram
    #[arg(long, default_value = "Sources.png")]
    image: PathBuf,

    /// Skip rendering the diagram
    #[arg(long, conflicts_with = "image")]
    no_image: bool,

    /// Also write the Graphviz DOT source
    #[arg(long)]
    dot: Option<PathBuf>,

    /// Graphviz layout program
    #[arg(long, default_value = "dot")]
    layout_program: PathBuf,

    /// Attach attribute notes to nodes in the diagram
    #[arg(long)]
    show_attributes: bool,

    /// Raise the log level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn build(cli: &Cli) -> Result<ProvDocument> {
    let scenario = match &cli.scenario {
        Some(path) => Scenario::from_path(path)
            .with_context(|| format!("loading scenario {}", path.display()))?,
        None => Scenario::annotation_lookup().context("loading built-in scenario")?,
    };
    let doc = scenario
        .build(cli.schema, &SystemClock)
        .with_context(|| format!("building scenario `{}`", scenario.name))?;
    tracing::info!(
        scenario = %scenario.name,
        schema = %cli.schema,
        elements = doc.element_count(),
        relations = doc.relation_count(),
        "built provenance document"
    );
    Ok(doc)
}

fn run(cli: &Cli) -> Result<()> {
    let doc = build(cli)?;

    println!("{}", to_provn(&doc));
    println!("{}", to_prov_json(&doc).context("serializing PROV-JSON")?);

    let options = DotOptions {
        show_attributes: cli.show_attributes,
        ..DotOptions::default()
    };

    if let Some(path) = &cli.dot {
        fs::write(path, render_dot(&doc, &options))
            .with_context(|| format!("writing {}", path.display()))?;
        eprintln!("{} {}", "wrote".green().bold(), path.display().to_string().bold());
    }

    if cli.no_image {
        return Ok(());
    }
    let engine = GraphvizCli::new(&cli.layout_program);
    render_image_with(&doc, &cli.image, &options, &engine)
        .with_context(|| format!("rendering {}", cli.image.display()))?;
    eprintln!(
        "{} {}",
        "wrote".green().bold(),
        cli.image.display().to_string().bold()
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    run(&cli)
}
