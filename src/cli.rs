use clap::{Parser, Subcommand};
use smartcatalog::session::SessionView;
use std::fmt::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "smartcatalog")]
#[command(about = "SmartCatalog client", long_about = None)]
pub struct Cli {
    /// Configuration file (overrides SMARTCATALOG_CONFIG)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print the final session view as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch and print the current catalog
    Catalog,
    /// Validate images, upload them and print the returned catalog
    Upload(UploadArgs),
}

#[derive(clap::Args, Debug)]
pub struct UploadArgs {
    /// Image files to upload as one batch
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

pub fn render(view: &SessionView) -> String {
    let mut out = String::new();

    if let Some(error) = &view.error {
        let _ = writeln!(out, "error: {error}");
    }

    if !view.previews.is_empty() {
        let _ = writeln!(out, "Selected:");
        for preview in &view.previews {
            let _ = writeln!(out, "  {} ({})", preview.name, preview.uri);
        }
    }

    if view.catalog.is_empty() {
        let _ = writeln!(out, "Catalog is empty");
        return out;
    }

    let _ = writeln!(out, "Catalog ({} items):", view.catalog.len());
    for entry in &view.catalog {
        let _ = writeln!(out, "- {}", entry.name);
        if !entry.description.is_empty() {
            let _ = writeln!(out, "  {}", entry.description);
        }
        let _ = writeln!(out, "  image: {}", entry.image_url);
        for (key, value) in &entry.specifications {
            let _ = writeln!(out, "  {key}: {value}");
        }
    }

    out
}
