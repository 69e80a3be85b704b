use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::json;
use url::Url;

use edge_rewrite::config::{load_config, parse_config, ConfigError, RewriterConfig};
use edge_rewrite::Rewriter;

#[derive(Parser)]
#[command(name = "rewrite-cli")]
#[command(about = "Offline tooling for edge-rewrite rule sets", long_about = None)]
struct Cli {
    /// Configuration file. Built-in defaults when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show what each path or URL is fetched as
    Check {
        /// Paths (`/blog/a/b`) or absolute URLs
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Print one JSON object per input
        #[arg(long)]
        json: bool,
    },
    /// List configured rules in evaluation order
    Rules,
    /// Validate the configuration file
    Validate,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Check { inputs, json } => {
            let rewriter = config.build_rewriter();
            let mut failed = false;
            for input in &inputs {
                match check(&rewriter, input) {
                    Ok((to, rule)) if json => {
                        println!("{}", json!({ "input": input, "output": to, "rule": rule }));
                    }
                    Ok((to, Some(rule))) => println!("rewritten {} -> {} ({})", input, to, rule),
                    Ok((_, None)) => println!("unchanged {}", input),
                    Err(e) => {
                        eprintln!("Error: {}: {}", input, e);
                        failed = true;
                    }
                }
            }
            if failed {
                return ExitCode::FAILURE;
            }
        }
        Commands::Rules => {
            for (i, rule) in config.rules.iter().enumerate() {
                println!("{}. {} {}/<category>/<item> -> {}/<item>", i + 1, rule.name, rule.prefix, rule.prefix);
            }
            if config.rules.is_empty() {
                println!("no rules configured, all requests pass through");
            }
        }
        Commands::Validate => {
            // Reaching this point means the file loaded and validated.
            println!("configuration is valid ({} rules)", config.rules.len());
        }
    }

    ExitCode::SUCCESS
}

fn load(path: Option<&std::path::Path>) -> Result<RewriterConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => parse_config(""),
    }
}

/// Rewrite a path or URL, returning the output and the matching rule.
fn check(rewriter: &Rewriter, input: &str) -> Result<(String, Option<String>), url::ParseError> {
    if input.starts_with('/') {
        let split = input.find(|c: char| c == '?' || c == '#').unwrap_or(input.len());
        let (path, suffix) = input.split_at(split);
        return Ok(match rewriter.evaluate(path) {
            Some(m) => (format!("{}{}", m.path, suffix), Some(m.rule.to_string())),
            None => (input.to_string(), None),
        });
    }

    let url = Url::parse(input)?;
    let rule = rewriter.evaluate(url.path()).map(|m| m.rule.to_string());
    Ok((rewriter.rewrite_url(&url).to_string(), rule))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_paths() {
        let rewriter = Rewriter::blog();
        assert_eq!(
            check(&rewriter, "/blog/category/post-item?ref=x#top").unwrap(),
            ("/blog/post-item?ref=x#top".to_string(), Some("blog".to_string()))
        );
        assert_eq!(check(&rewriter, "/about").unwrap(), ("/about".to_string(), None));
    }

    #[test]
    fn test_check_urls() {
        let rewriter = Rewriter::blog();
        assert_eq!(
            check(&rewriter, "https://www.example.com/blog/news/2024-launch#top").unwrap().0,
            "https://www.example.com/blog/2024-launch#top"
        );
        assert!(check(&rewriter, "not a url").is_err());
    }
}
