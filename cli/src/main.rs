#![allow(clippy::print_stdout, clippy::print_stderr)]

mod bnf2html;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueHint};
use manticrdf::NamedNode;
use manticttl::{NQuadsParser, NQuadsSerializer, TurtleParser};
use std::ffi::OsStr;
use std::fs::File;
use std::io::{self, stdin, stdout, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Parser)]
#[command(about, version, name = "mantic")]
/// Mantic command line toolkit.
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a Turtle/TriG/N3-subset or N-Quads document to canonical N-Quads.
    ///
    /// Statements without a graph annotation can be assigned a target named
    /// graph with --graph. The output is one line per quad, in canonical
    /// order, with all IRIs fully expanded and blank nodes relabeled.
    #[command(name = "to-nquads")]
    ToNQuads {
        /// File to read. If absent, stdin is read.
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
        /// File to write. If absent, stdout is written.
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
        /// IRI of the named graph to assign to statements lacking one.
        #[arg(short, long, value_hint = ValueHint::Url)]
        graph: Option<String>,
        /// Base IRI relative IRIs are resolved against.
        #[arg(short, long, value_hint = ValueHint::Url)]
        base: Option<String>,
        /// The format of the input: "turtle" (also "ttl", "trig", "n3") or
        /// "nquads" (also "nq", "nt").
        ///
        /// By default the format is guessed from the input file extension,
        /// falling back to Turtle.
        #[arg(long)]
        format: Option<String>,
    },
    /// Render an EBNF grammar description as an HTML page.
    ///
    /// Each `[id] name ::= expression` production becomes an anchored row and
    /// every non-terminal reference becomes a hyperlink to its definition.
    #[command(name = "bnf2html")]
    Bnf2Html {
        /// File to read. If absent, stdin is read.
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
        /// File to write. If absent, stdout is written.
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
        /// Title of the generated page.
        #[arg(long, default_value = "Grammar")]
        title: String,
    },
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum InputFormat {
    Turtle,
    NQuads,
}

pub fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
    let matches = Args::parse();
    match matches.command {
        Command::ToNQuads {
            file,
            output,
            graph,
            base,
            format,
        } => to_nquads(file, output, graph, base, format),
        Command::Bnf2Html {
            file,
            output,
            title,
        } => {
            let input = read_input(file.as_deref())?;
            let html = bnf2html::render(&input, &title);
            let mut writer = open_output(output.as_deref())?;
            writer.write_all(html.as_bytes())?;
            writer.flush()?;
            Ok(())
        }
    }
}

fn to_nquads(
    file: Option<PathBuf>,
    output: Option<PathBuf>,
    graph: Option<String>,
    base: Option<String>,
    format: Option<String>,
) -> anyhow::Result<()> {
    let format = match format {
        Some(name) => format_from_name(&name)?,
        None => file
            .as_deref()
            .and_then(Path::extension)
            .and_then(OsStr::to_str)
            .map_or(InputFormat::Turtle, format_from_extension),
    };
    let graph = graph
        .map(|iri| {
            NamedNode::new(iri.clone())
                .with_context(|| format!("invalid target graph IRI <{iri}>"))
        })
        .transpose()?;
    let input = read_input(file.as_deref())?;
    info!(
        bytes = input.len(),
        "parsing {}",
        file.as_deref()
            .map_or_else(|| "standard input".to_owned(), |f| f.display().to_string())
    );

    let dataset = match format {
        InputFormat::Turtle => {
            let mut parser = TurtleParser::new();
            if let Some(base) = &base {
                parser = parser
                    .with_base_iri(base.clone())
                    .with_context(|| format!("invalid base IRI <{base}>"))?;
            }
            if let Some(graph) = graph {
                parser = parser.with_default_graph(graph);
            }
            parser.parse_str(&input)?.into_dataset()
        }
        InputFormat::NQuads => {
            let mut parser = NQuadsParser::new();
            if let Some(graph) = graph {
                parser = parser.with_default_graph(graph);
            }
            parser.parse_str(&input)?
        }
    };
    debug!(quads = dataset.len(), "parsed");

    let mut writer = open_output(output.as_deref())?;
    NQuadsSerializer::new().serialize_dataset(&dataset, &mut writer)?;
    writer.flush()?;
    info!(quads = dataset.len(), "conversion done");
    Ok(())
}

fn format_from_name(name: &str) -> anyhow::Result<InputFormat> {
    match name.to_ascii_lowercase().as_str() {
        "turtle" | "ttl" | "trig" | "n3" => Ok(InputFormat::Turtle),
        "nquads" | "n-quads" | "nq" | "ntriples" | "n-triples" | "nt" => Ok(InputFormat::NQuads),
        _ => bail!("unknown input format '{name}'"),
    }
}

fn format_from_extension(extension: &str) -> InputFormat {
    match extension.to_ascii_lowercase().as_str() {
        "nq" | "nt" => InputFormat::NQuads,
        _ => InputFormat::Turtle,
    }
}

fn read_input(file: Option<&Path>) -> anyhow::Result<String> {
    let mut input = String::new();
    match file {
        Some(file) => {
            File::open(file)
                .with_context(|| format!("failed to open {}", file.display()))?
                .read_to_string(&mut input)
                .with_context(|| format!("failed to read {}", file.display()))?;
        }
        None => {
            stdin()
                .lock()
                .read_to_string(&mut input)
                .context("failed to read standard input")?;
        }
    }
    Ok(input)
}

fn open_output(file: Option<&Path>) -> anyhow::Result<Box<dyn Write>> {
    Ok(match file {
        Some(file) => Box::new(BufWriter::new(File::create(file).with_context(|| {
            format!("failed to create {}", file.display())
        })?)),
        None => Box::new(BufWriter::new(stdout().lock())),
    })
}
