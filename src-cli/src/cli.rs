use clap::{Parser, Subcommand};
use scorelift_ports::types::ConversionMode;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "scorelift",
    version,
    about = "Convert scanned sheet-music PDFs into MusicXML with Audiveris",
    long_about = "Convert scanned sheet-music PDFs into MusicXML with Audiveris.\n\
                  Run without a subcommand for interactive prompts."
)]
pub struct Cli {
    /// Log level: error, warn, info, debug or trace. RUST_LOG takes precedence.
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Path to audiveris.jar (overrides stored settings)
    #[arg(long, global = true)]
    pub jar: Option<PathBuf>,

    /// Java executable to launch Audiveris with
    #[arg(long, global = true)]
    pub java: Option<PathBuf>,

    /// MuseScore executable used for rendering
    #[arg(long, global = true)]
    pub musescore: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Recognize a PDF score and export MusicXML
    Convert(ConvertArgs),
    /// Engrave a MusicXML file into PDF with MuseScore
    Render {
        xml: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Open the PDF with the default viewer
        #[arg(long)]
        open: bool,
    },
    /// Show or update stored settings
    Config(ConfigArgs),
    /// Write a diagnostics bundle (settings, platform, resolved tools) to DIR
    Diagnostics { dir: PathBuf },
}

#[derive(clap::Args, Debug)]
pub struct ConvertArgs {
    pub input: PathBuf,
    /// Output directory (defaults to the configured one)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// full-automatic (alias: auto) or manual-assisted (alias: manual)
    #[arg(short, long)]
    pub mode: Option<ConversionMode>,
    /// Render the MusicXML to PDF with MuseScore afterwards
    #[arg(long)]
    pub render: bool,
    /// Open the result with the default application
    #[arg(long)]
    pub open: bool,
    /// Keep Audiveris output in <output>/audiveris.log
    #[arg(long)]
    pub write_log: bool,
}

#[derive(clap::Args, Debug)]
pub struct ConfigArgs {
    /// Persist --jar/--java/--musescore and the options below
    #[arg(long)]
    pub save: bool,
    #[arg(long)]
    pub output_dir: Option<String>,
    /// Default conversion mode: full-automatic or manual-assisted
    #[arg(long)]
    pub mode: Option<ConversionMode>,
    #[arg(long)]
    pub write_log: Option<bool>,
}
