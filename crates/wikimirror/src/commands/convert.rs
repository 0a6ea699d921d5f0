//! `wikimirror convert` command implementation.

use std::path::PathBuf;

use clap::Args;
use wm_export::HtmlExportConverter;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the convert command.
#[derive(Args)]
pub(crate) struct ConvertArgs {
    /// HTML export directory to read.
    #[arg(short, long)]
    input: PathBuf,

    /// Directory receiving the Markdown tree.
    #[arg(short, long)]
    output: PathBuf,

    /// Enable verbose output (per-file progress).
    #[arg(short, long)]
    pub verbose: bool,
}

impl ConvertArgs {
    /// Execute the convert command.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is missing or a file cannot be read or written.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        output.field("Input", self.input.display());
        output.field("Output", self.output.display());

        let summary = HtmlExportConverter::new(&self.input, &self.output).run()?;

        output.success(&format!(
            "Converted {} pages, copied {} files",
            summary.converted, summary.copied
        ));
        if summary.converted > summary.with_page_id {
            output.info(&format!(
                "{} pages had no page ID; links to them by ID stay unresolved",
                summary.converted - summary.with_page_id
            ));
        }
        Ok(())
    }
}
