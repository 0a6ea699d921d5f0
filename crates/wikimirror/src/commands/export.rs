//! `wikimirror export` command implementation.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use wm_config::{CliSettings, Config, ExportConfig};
use wm_confluence::ConfluenceClient;
use wm_export::{ExportOptions, Exporter};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the export command.
#[derive(Args)]
pub(crate) struct ExportArgs {
    /// Root page ID (overrides config).
    #[arg(long)]
    page_id: Option<String>,

    /// Confluence base URL (overrides config).
    #[arg(long)]
    url: Option<String>,

    /// Confluence username (overrides config).
    #[arg(short, long)]
    username: Option<String>,

    /// Confluence password (overrides config).
    #[arg(long, env = "WIKIMIRROR_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Output directory (overrides config).
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Content file name inside each page directory (overrides config).
    #[arg(long)]
    index_name: Option<String>,

    /// Verify TLS certificates (default: enabled).
    #[arg(long)]
    verify_ssl: bool,

    /// Skip TLS certificate verification.
    #[arg(long, conflicts_with = "verify_ssl")]
    no_verify_ssl: bool,

    /// Path to configuration file (default: auto-discover wikimirror.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output (per-page progress).
    #[arg(short, long)]
    pub verbose: bool,
}

impl ExportArgs {
    /// Execute the export command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is incomplete or the export fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let verify_ssl = self.resolve_verify_ssl();
        let cli_settings = CliSettings {
            base_url: self.url,
            username: self.username,
            password: self.password,
            verify_ssl,
            root_page_id: self.page_id,
            output_dir: self.out,
            index_name: self.index_name,
            ..Default::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let confluence = config.require_confluence()?;
        let root_page_id = config.require_root_page_id()?;
        let export = &config.export_resolved;

        output.field("Confluence", &confluence.base_url);
        output.field("Root page", root_page_id);
        output.field("Output", export.output_dir.display());
        if !confluence.verify_ssl {
            output.warning("TLS certificate verification is disabled");
        }

        let client = ConfluenceClient::from_config(
            &confluence.base_url,
            &confluence.username,
            &confluence.password,
            confluence.verify_ssl,
            Duration::from_secs(confluence.timeout_secs),
        );
        let exporter = Exporter::new(&client, export_options(export));
        let summary = exporter.run(root_page_id, &export.output_dir)?;

        output.success(&format!(
            "Exported {} pages ({} attachments downloaded, {} already present)",
            summary.pages, summary.downloaded, summary.skipped
        ));
        if summary.failed > 0 {
            output.warning(&format!(
                "{} attachments could not be fetched; rerun to retry",
                summary.failed
            ));
        }
        Ok(())
    }

    /// Resolve `verify_ssl` from --verify-ssl/--no-verify-ssl flags.
    fn resolve_verify_ssl(&self) -> Option<bool> {
        if self.no_verify_ssl {
            Some(false)
        } else {
            self.verify_ssl.then_some(true)
        }
    }
}

fn export_options(export: &ExportConfig) -> ExportOptions {
    ExportOptions {
        index_name: export.index_name.clone(),
        children_title: export.children_title.clone(),
        page_size: export.page_size,
        attachment_page_size: export.attachment_page_size,
        strict_attachments: export.strict_attachments,
    }
}
