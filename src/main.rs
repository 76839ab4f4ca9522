use std::path::{Path, PathBuf};

use clap::Parser;

use labelsheet::image_loader::load_image_file;
use labelsheet::model::records_from_json;
use labelsheet::{render, render_preview, FontContext, LabelError, LayoutConfig};

#[derive(Parser, Debug)]
#[command(name = "labelsheet", version, about = "Render offer records onto a printable label sheet PDF")]
struct Cli {
    /// JSON array of records
    #[arg(required_unless_present = "print_config")]
    records: Option<PathBuf>,

    /// Output PDF path
    #[arg(short, long, default_value = "labels.pdf")]
    output: PathBuf,

    /// JSON object of layout options, merged over the built-in calibration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Regular TrueType/OpenType font (needed for Arabic)
    #[arg(long)]
    font: Option<PathBuf>,

    /// Bold font; synthetic bold is used without it
    #[arg(long)]
    bold_font: Option<PathBuf>,

    /// Render only the first page
    #[arg(long, default_value_t = false)]
    preview: bool,

    /// Scanned sheet drawn beneath the preview page
    #[arg(long, requires = "preview")]
    background: Option<PathBuf>,

    /// Print the effective configuration as JSON and exit
    #[arg(long, default_value_t = false)]
    print_config: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), LabelError> {
    let mut config = LayoutConfig::preset();
    if let Some(path) = &cli.config {
        config.merge(&LayoutConfig::from_json(&read_text(path)?)?);
    }
    if cli.print_config {
        println!("{}", config.to_json_pretty()?);
        return Ok(());
    }

    let Some(records_path) = &cli.records else {
        return Err(LabelError::invalid("records", "no records file given"));
    };
    let records = records_from_json(&read_text(records_path)?)?;

    let fonts = FontContext::load_configured(&config, cli.font.as_deref(), cli.bold_font.as_deref())?;

    let bytes = if cli.preview {
        let background = match &cli.background {
            Some(path) => match load_image_file(path) {
                Ok(image) => Some(image),
                Err(e) => {
                    log::warn!("{}; previewing without a template", e);
                    None
                }
            },
            None => None,
        };
        render_preview(&records, &config, &fonts, background.as_ref())?
    } else {
        render(&records, &config, &fonts)?
    };

    std::fs::write(&cli.output, &bytes)?;
    println!("Wrote {} ({} bytes)", cli.output.display(), bytes.len());
    Ok(())
}

fn read_text(path: &Path) -> Result<String, LabelError> {
    std::fs::read_to_string(path).map_err(|e| {
        LabelError::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })
}
