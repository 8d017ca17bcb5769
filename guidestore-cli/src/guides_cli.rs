//! Guidestore CLI commands
//!
//! Thin wrappers over [`GuideService`]: documents go to stdout, logs to stderr.

use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::PathBuf;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

use guidestore_core::sync::SyncReport;
use guidestore_core::GuideService;

#[derive(Subcommand, Debug)]
pub enum GuidesCommand {
    /// List known namespaces and their local state
    Namespaces,

    /// Download a namespace's guides from its remote source
    Download {
        /// Namespace to download (e.g., rails, turbo)
        namespace: String,

        /// Re-download files even if unchanged on disk
        #[clap(long)]
        force: bool,

        /// Print a status line for every file
        #[clap(long, short)]
        verbose: bool,

        /// Print the counts as JSON
        #[clap(long)]
        json: bool,
    },

    /// Import local markdown files into an import-only namespace
    Import {
        /// A markdown file, or a directory whose markdown files are imported
        path: PathBuf,

        /// Target namespace
        #[clap(long, default_value = "custom")]
        namespace: String,

        /// Re-import files even if unchanged
        #[clap(long)]
        force: bool,

        /// Print a status line for every file
        #[clap(long, short)]
        verbose: bool,

        /// Print the counts as JSON
        #[clap(long)]
        json: bool,
    },

    /// Show the guide a name resolves to
    Show {
        /// Namespace to search
        namespace: String,

        /// Guide name; partial names and section paths are accepted
        name: String,
    },

    /// Show a namespace's guide index
    Index {
        /// Namespace to list
        namespace: String,
    },

    /// Read a resource URI such as rails://guides/routing
    Read {
        /// Resource URI
        uri: String,
    },
}

impl GuidesCommand {
    pub fn execute(self, service: &GuideService) -> Result<()> {
        match self {
            GuidesCommand::Namespaces => execute_namespaces(service),
            GuidesCommand::Download {
                namespace,
                force,
                verbose,
                json,
            } => {
                let report = service
                    .download(&namespace, force, verbose)
                    .with_context(|| format!("Failed to download '{namespace}'"))?;
                print_report(&report, verbose);
                if json {
                    println!("{}", serde_json::to_string_pretty(&report.download_counts())?);
                } else {
                    let counts = report.download_counts();
                    println!(
                        "{}: {} downloaded, {} skipped, {} failed",
                        namespace, counts.downloaded, counts.skipped, counts.failed
                    );
                }
                Ok(())
            }
            GuidesCommand::Import {
                path,
                namespace,
                force,
                verbose,
                json,
            } => {
                let report = service
                    .import(&namespace, &path, force, verbose)
                    .with_context(|| {
                        format!("Failed to import {} into '{namespace}'", path.display())
                    })?;
                print_report(&report, verbose);
                if json {
                    println!("{}", serde_json::to_string_pretty(&report.import_counts())?);
                } else {
                    let counts = report.import_counts();
                    println!(
                        "{}: {} imported, {} skipped, {} failed",
                        namespace, counts.imported, counts.skipped, counts.failed
                    );
                }
                Ok(())
            }
            GuidesCommand::Show { namespace, name } => {
                let document = service.resolve_and_render(&namespace, &name)?;
                println!("{document}");
                Ok(())
            }
            GuidesCommand::Index { namespace } => {
                let document = service.render_index(&namespace)?;
                println!("{document}");
                Ok(())
            }
            GuidesCommand::Read { uri } => {
                println!("{}", service.read_uri(&uri));
                Ok(())
            }
        }
    }
}

/// Per-file lines: every file when verbose, failures otherwise
fn print_report(report: &SyncReport, verbose: bool) {
    for file in &report.files {
        if verbose || file.outcome.is_failed() {
            println!("  {file}");
        }
    }
}

/// Table row for the namespace listing
#[derive(Tabled)]
struct NamespaceRow {
    #[tabled(rename = "Namespace")]
    name: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Files")]
    files: String,
}

fn execute_namespaces(service: &GuideService) -> Result<()> {
    let statuses = service.namespaces()?;

    let rows: Vec<NamespaceRow> = statuses
        .iter()
        .map(|status| {
            let definition = &status.definition;
            NamespaceRow {
                name: definition.name.clone(),
                label: definition.label.clone(),
                source: definition
                    .base_url
                    .clone()
                    .unwrap_or_else(|| "local import".to_string()),
                files: if status.synced {
                    status.file_count.to_string()
                } else {
                    "-".to_string()
                },
            }
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .to_string();

    println!("Config root: {}\n", service.context().root().display());
    println!("{table}");
    Ok(())
}
