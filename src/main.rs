use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use lingo_tools::config::{RowPolicy, Settings};
use lingo_tools::io::xml_write::{ClassificationInfo, HierarchyLayout};
use lingo_tools::sync::{self, Operation, OperationReport, OutputTarget, XmlShape};
use lingo_tools::{Result, ToolError};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging() {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
    match run(cli) {
        Ok(report) if report.success => println!("{}", report.message),
        Ok(report) => {
            eprintln!("error: {}", report.message);
            std::process::exit(1);
        }
        Err(error) => {
            eprintln!("error: {error}");
            std::process::exit(1);
        }
    }
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| ToolError::Logging(err.to_string()))
}

fn run(cli: Cli) -> Result<OperationReport> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if cli.sheet.is_some() {
        settings.sheet = cli.sheet.clone();
    }

    Ok(match cli.command {
        Command::ToSheet(args) => {
            if args.strict {
                settings.row_policy = RowPolicy::Strict;
            }
            if args.nested {
                settings.include_nested = true;
            }
            let target = OutputTarget::new(args.output_dir, args.name);
            OperationReport::from_result(
                Operation::XmlToSpreadsheet,
                sync::xml_to_spreadsheet(&args.input, &target, &settings),
            )
        }
        Command::ToXml(args) => {
            if args.outline {
                print!("{}", sync::hierarchy_outline(&args.input, &settings)?);
            }
            let shape = args.shape();
            let target = OutputTarget::new(args.output_dir, args.name);
            OperationReport::from_result(
                Operation::SpreadsheetToXml,
                sync::spreadsheet_to_xml(&args.input, &target, &shape, &settings),
            )
        }
        Command::Reconcile(args) => OperationReport::from_result(
            Operation::Reconcile,
            sync::reconcile_files(&args.source, &args.destination, &settings),
        ),
    })
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Convert localization strings between spreadsheets and XML."
)]
struct Cli {
    /// Optional JSON settings file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Worksheet to read instead of the first one.
    #[arg(long, global = true)]
    sheet: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a language XML document into a KEY/VALUE1 spreadsheet.
    ToSheet(ToSheetArgs),
    /// Convert a spreadsheet into XML.
    ToXml(ToXmlArgs),
    /// Merge a source table into a destination spreadsheet in place.
    Reconcile(ReconcileArgs),
}

#[derive(clap::Args)]
struct ToSheetArgs {
    /// Input XML file.
    #[arg(long)]
    input: PathBuf,

    /// Output folder. Defaults to the input's folder.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Output file base name.
    #[arg(long)]
    name: String,

    /// Fail on the first undecodable entry instead of skipping it.
    #[arg(long)]
    strict: bool,

    /// Also collect entries nested under `Children`.
    #[arg(long)]
    nested: bool,
}

#[derive(clap::Args)]
struct ToXmlArgs {
    /// Input spreadsheet.
    #[arg(long)]
    input: PathBuf,

    /// Output folder. Defaults to the input's folder.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Output file base name.
    #[arg(long)]
    name: String,

    /// Document shape to produce.
    #[arg(long, value_enum, default_value_t = ShapeKind::Flat)]
    shape: ShapeKind,

    /// Container used by the hierarchy shape.
    #[arg(long, value_enum, default_value_t = LayoutKind::Language)]
    layout: LayoutKind,

    /// Print the rebuilt tree before writing.
    #[arg(long)]
    outline: bool,

    /// Classification system name.
    #[arg(long, default_value = "")]
    system_name: String,

    /// Classification edition version.
    #[arg(long, default_value = "")]
    edition_version: String,

    /// Edition year.
    #[arg(long, default_value = "")]
    year: String,

    /// Edition month.
    #[arg(long, default_value = "")]
    month: String,

    /// Edition day.
    #[arg(long, default_value = "")]
    day: String,

    /// Classification system description.
    #[arg(long, default_value = "")]
    description: String,

    /// Publisher of the classification system.
    #[arg(long, default_value = "")]
    source: String,
}

impl ToXmlArgs {
    fn shape(&self) -> XmlShape {
        match self.shape {
            ShapeKind::Flat => XmlShape::Flat,
            ShapeKind::Hierarchy => XmlShape::Hierarchy(self.layout()),
            ShapeKind::Resources => XmlShape::Resources,
            ShapeKind::Template => XmlShape::Template,
        }
    }

    fn layout(&self) -> HierarchyLayout {
        match self.layout {
            LayoutKind::Language => HierarchyLayout::LanguageStrings,
            LayoutKind::Classification => HierarchyLayout::Classification(ClassificationInfo {
                name: self.system_name.clone(),
                edition_version: self.edition_version.clone(),
                year: self.year.clone(),
                month: self.month.clone(),
                day: self.day.clone(),
                description: self.description.clone(),
                source: self.source.clone(),
            }),
        }
    }
}

#[derive(clap::Args)]
struct ReconcileArgs {
    /// Spreadsheet or resource-string XML providing the new values.
    #[arg(long)]
    source: PathBuf,

    /// Spreadsheet to update in place.
    #[arg(long)]
    destination: PathBuf,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ShapeKind {
    Flat,
    Hierarchy,
    Resources,
    Template,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum LayoutKind {
    Language,
    Classification,
}
