use clap::Parser;
use knowbase::config::{Args, Command};
use knowbase::{ApiClient, Config, UploadFile, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI args
    let args = Args::parse();

    // Load configuration
    let config = Config::load(&args)?;

    // If --validate flag is set, exit successfully after config validation
    if args.validate {
        println!("Configuration is valid.");
        return Ok(());
    }

    telemetry::init_telemetry(&config.log_filter)?;

    tracing::debug!("{:?}", args);

    let Some(command) = args.command else {
        anyhow::bail!("No command given, run with --help to see the available commands");
    };

    let client = ApiClient::new(&config.client)?;
    tracing::info!(base_url = %client.base_url(), "Using KnowBase API");

    let body = match command {
        Command::Health => client.check_health().await?,
        Command::Chat { message } => client.send_message(&message).await?,
        Command::Upload { path } => {
            let file = UploadFile::from_path(&path)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
            let on_progress: knowbase::ProgressCallback = Box::new(|percent| eprintln!("upload: {percent}%"));
            client.upload_document(Some(file), Some(on_progress)).await?
        }
    };

    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}
