mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use linkembed::app::App;
use linkembed::config::Config;
use linkembed::parsers::DocumentKind;
use std::path::PathBuf;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing_subscriber::EnvFilter;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[tokio::main]
async fn main() -> Result<(), AnyError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("linkembed=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Rewrite(args) => {
            if args.no_urlize {
                config.render.urlize_all = false;
            }
            config.render.params.extend(args.params);

            let document = read_input(args.input).await?;
            let app = App::from_config(&config).await?;
            let output = app.rewrite(&document, kind(args.html)).await?;

            let mut stdout = tokio::io::stdout();
            stdout.write_all(output.as_bytes()).await?;
            stdout.flush().await?;
        }
        Commands::Extract(args) => {
            let document = read_input(args.input).await?;
            let app = App::from_config(&config).await?;
            let extraction = app.extract(&document, kind(args.html)).await?;

            let report = serde_json::json!({
                "urls": extraction.urls,
                "resolved": extraction.resolved,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn kind(html: bool) -> DocumentKind {
    if html { DocumentKind::Html } else { DocumentKind::Text }
}

async fn read_input(path: Option<PathBuf>) -> Result<String, AnyError> {
    match path {
        Some(path) => Ok(tokio::fs::read_to_string(path).await?),
        None => {
            let mut buffer = String::new();
            tokio::io::stdin().read_to_string(&mut buffer).await?;
            Ok(buffer)
        }
    }
}
