//! Search for news from a trusted local context, using the configured
//! transport.
//!
//! With no arguments, prints the current top headlines. Otherwise the
//! arguments are joined into a topic to search for.

use anyhow::{Context, Result};
use headliner_news::{Article, NewsClient};
use headliner_settings::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    let topic = std::env::args()
        .skip(1)
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string();

    let settings = Settings::load().context("Loading settings")?;
    // Keep stdout for results.
    settings.logging.init(std::io::stderr)?;

    let client = NewsClient::from_settings(&settings).context("Setting up the news client")?;

    let result = if topic.is_empty() {
        client.fetch_top_headlines().await
    } else {
        client.fetch_news(&topic).await
    };

    match result {
        Ok(articles) if articles.is_empty() => println!("No articles found."),
        Ok(articles) => articles.iter().for_each(print_article),
        Err(error) => {
            eprintln!("{} ({})", error, error.kind());
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Print one article as a short block of text.
fn print_article(article: &Article) {
    println!("{}", article.title);
    println!(
        "  {} | {}",
        article.source_name,
        article.published_at.format("%Y-%m-%d %H:%M UTC")
    );
    if let Some(description) = &article.description {
        println!("  {}", description);
    }
    println!("  {}", article.url);
    println!();
}
