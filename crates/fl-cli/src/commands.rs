use anyhow::Context;
use colored::Colorize;
use fl_ledger::LedgerReader;
use fl_pointer::{FilePointerStore, PointerStore};
use fl_server::{open_ledger, ContentStoreConfig, FeedServer, ServerConfig};
use fl_types::PostRecord;
use serde_json::json;

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args).await,
        Command::Pointer(args) => cmd_pointer(args, cli.format),
        Command::Posts(args) => cmd_posts(args, cli.format).await,
    }
}

fn load_config(arg: &ConfigArg) -> anyhow::Result<ServerConfig> {
    match &arg.config {
        Some(path) => ServerConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => Ok(ServerConfig::default()),
    }
}

async fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = load_config(&args.config)?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    println!(
        "{} FeedLedger on {} (pointer: {})",
        "▶".green().bold(),
        config.bind_addr.to_string().bold(),
        config.pointer_path.display()
    );
    FeedServer::new(config).serve().await?;
    Ok(())
}

fn cmd_pointer(args: ConfigArg, format: OutputFormat) -> anyhow::Result<()> {
    let config = load_config(&args)?;
    if matches!(config.content_store, ContentStoreConfig::Memory) {
        anyhow::bail!("the in-memory content store keeps its pointer in memory; nothing to read");
    }
    let pointer = FilePointerStore::new(&config.pointer_path).read()?;
    match format {
        OutputFormat::Json => println!("{}", json!({ "pointer": pointer })),
        OutputFormat::Text => match pointer {
            Some(p) => println!("{}", p.address().as_str().cyan()),
            None => println!("No pointer yet. The ledger is empty."),
        },
    }
    Ok(())
}

async fn cmd_posts(args: PostsArgs, format: OutputFormat) -> anyhow::Result<()> {
    let config = load_config(&args.config)?;
    let ledger = open_ledger(&config)?;
    let posts = match &args.author {
        Some(author) => ledger.get_by_author(author).await?,
        None => ledger.get_all().await?,
    };
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&posts)?),
        OutputFormat::Text => print_posts(&posts),
    }
    Ok(())
}

fn print_posts(posts: &[PostRecord]) {
    if posts.is_empty() {
        println!("No posts.");
        return;
    }
    for post in posts {
        println!(
            "{}  {}  {} likes  ({})",
            post.id.as_str().yellow().bold(),
            post.author.as_str().cyan(),
            post.like_count,
            post.media_type
        );
        if !post.description.is_empty() {
            println!("  {}", post.description);
        }
        if let Some(image) = &post.image_ref {
            println!("  {}", image.blue());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn missing_config_file_is_an_error() {
        let arg = ConfigArg {
            config: Some(PathBuf::from("/nonexistent/feedledger.toml")),
        };
        assert!(load_config(&arg).is_err());
    }

    #[test]
    fn config_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed.toml");
        std::fs::write(&path, "bind_addr = \"127.0.0.1:9001\"\n").unwrap();
        let config = load_config(&ConfigArg { config: Some(path) }).unwrap();
        assert_eq!(config.bind_addr.port(), 9001);
    }

    #[test]
    fn pointer_needs_a_durable_store() {
        assert!(cmd_pointer(ConfigArg { config: None }, OutputFormat::Text).is_err());
    }

    #[tokio::test]
    async fn posts_on_empty_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed.toml");
        std::fs::write(
            &path,
            format!("pointer_path = {:?}\n", dir.path().join("ptr.json")),
        )
        .unwrap();
        let args = PostsArgs {
            config: ConfigArg { config: Some(path) },
            author: None,
        };
        cmd_posts(args, OutputFormat::Json).await.unwrap();
    }
}
