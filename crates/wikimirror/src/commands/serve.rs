//! `wikimirror serve` command implementation.

use std::path::PathBuf;

use clap::Args;
use wm_config::{CliSettings, Config};
use wm_server::{run_server, server_config_from_config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover wikimirror.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory to serve (default: the export output directory).
    #[arg(short, long, env = "WIKIMIRROR_SERVE_DIR")]
    dir: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// File served for directory requests (overrides config).
    #[arg(long)]
    index_name: Option<String>,

    /// Enable verbose output (request logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            host: self.host,
            port: self.port,
            index_name: self.index_name,
            serve_dir: self.dir,
            ..Default::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let server_config = server_config_from_config(&config);

        output.info(&format!(
            "Serving on http://{}:{}/",
            server_config.host, server_config.port
        ));
        output.field("Directory", server_config.root_dir.display());
        output.field("Index", &server_config.index_name);

        run_server(server_config).await?;
        Ok(())
    }
}
