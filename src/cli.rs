use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "linkembed")]
#[command(about = "Replace bare URLs with oEmbed markup", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to $LINKEMBED_CONFIG or config/linkembed.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rewrite a document, printing the result to stdout
    Rewrite(RewriteArgs),
    /// List the URLs of a document and their metadata as JSON
    Extract(ExtractArgs),
}

#[derive(clap::Args, Debug)]
pub struct RewriteArgs {
    /// Treat the input as HTML
    #[arg(long)]
    pub html: bool,

    /// Leave URLs without metadata untouched
    #[arg(long)]
    pub no_urlize: bool,

    /// Extra provider parameter, repeatable (e.g. --param maxwidth=600)
    #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
    pub params: Vec<(String, String)>,

    /// Input file, stdin when omitted
    pub input: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct ExtractArgs {
    /// Treat the input as HTML
    #[arg(long)]
    pub html: bool,

    /// Input file, stdin when omitted
    pub input: Option<PathBuf>,
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rewrite_args() {
        let cli = Cli::parse_from([
            "linkembed",
            "rewrite",
            "--html",
            "--param",
            "maxwidth=600",
            "page.html",
        ]);
        let Commands::Rewrite(args) = cli.command else {
            panic!("expected rewrite");
        };
        assert!(args.html);
        assert!(!args.no_urlize);
        assert_eq!(args.params, vec![("maxwidth".to_string(), "600".to_string())]);
        assert_eq!(args.input, Some(PathBuf::from("page.html")));
    }

    #[test]
    fn test_parse_param_rejects_missing_value() {
        assert!(parse_param("maxwidth").is_err());
        assert!(parse_param("=1").is_err());
        assert_eq!(parse_param("a=b=c").unwrap(), ("a".to_string(), "b=c".to_string()));
    }
}
