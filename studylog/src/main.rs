use std::path::Path;

use clap::Parser;
use studylog::cli::Cli;
use studylog::commands::run;

#[tokio::main]
async fn main() {
    {
        let env_file = Path::new(".env");
        if env_file.exists() {
            if let Err(err) = dotenv::from_filename(".env") {
                eprintln!("Could not read .env: {}", err);
            }
        }
    }
    pretty_env_logger::formatted_timed_builder()
        .parse_filters(&std::env::var("RUST_LOG").unwrap_or("WARN".to_string()))
        .init();

    let cli = Cli::parse();
    log::debug!("Data directory: {}", cli.data_dir.display());

    let mut stdout = std::io::stdout();
    if let Err(err) = run(cli, &mut stdout).await {
        log::error!("{:#}", err);
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
