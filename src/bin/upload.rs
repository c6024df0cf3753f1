// Entrypoint for the batch uploader.
// Exit code 0 on success (or when nothing was readable), 1 on any error.

use std::io;
use std::process::ExitCode;

use crossterm::style::Stylize;
use pinecone_webhook_cli::{
    config::UploadConfig,
    ui::{self, rule},
};

fn main() -> ExitCode {
    pinecone_webhook_cli::init_logging();

    let config = UploadConfig::from_env();
    println!("{}", rule('='));
    println!("Uploading directory contents to Pinecone");
    println!("{}", rule('='));
    println!("Directory: {}", config.data_dir.display());
    println!("Webhook URL: {}", config.webhook_url);
    println!("Namespace: {}", config.namespace);
    println!("{}", rule('='));

    let mut stdout = io::stdout().lock();
    match ui::run_upload(&config, &mut stdout) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "upload failed");
            println!("\n{} Error: {:#}", "✗".red(), e);
            ExitCode::FAILURE
        }
    }
}
