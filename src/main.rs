use anyhow::bail;
use clap::Parser;
use inquire::error::InquireResult;

mod app;
mod cli;
mod config;
mod extract;
mod links;
mod scrape;
mod search;
mod storage;
mod url_policy;

use app::{local::is_contentless, AppError, AppFactory, LinkCreate, SaveOpts};
use links::SavedLink;
use search::{display_score, Highlighter};

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dex=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn confirm(message: &str) -> anyhow::Result<bool> {
    match inquire::prompt_confirmation(message) {
        InquireResult::Ok(answer) => Ok(answer),
        InquireResult::Err(err) => bail!("An error occurred: {}", err),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_link(link: &SavedLink, highlighter: Option<&Highlighter>) {
    let mark = |text: &str| match highlighter {
        Some(hl) => hl.apply(text),
        None => text.to_string(),
    };

    let read = if link.read { "x" } else { " " };
    println!("[{read}] {}", mark(&link.title));
    println!("    {}", link.url);
    if link.description.is_empty() {
        println!("    <No description>");
    } else {
        println!("    {}", mark(&link.description));
    }

    let content_note = if is_contentless(link) {
        " (no content)"
    } else {
        ""
    };
    println!(
        "    {}{content_note}",
        link.date_added.with_timezone(&chrono::Local).format("%Y-%m-%d")
    );
}

fn main() -> anyhow::Result<()> {
    init_logging();

    let args = cli::Args::parse();
    tracing::debug!(command = ?args.command, "parsed arguments");
    let app_mgr = AppFactory::create_default_app()?;

    match args.command {
        cli::Command::Save {
            url,
            description,
            title,
            no_extract,
        } => {
            let link = app_mgr.save(
                LinkCreate {
                    url,
                    title,
                    description,
                },
                SaveOpts {
                    extract: !no_extract,
                },
            )?;

            if is_contentless(&link) {
                println!("Link saved without content extraction.");
            } else {
                println!("Link saved successfully with content!");
            }
            print_link(&link, None);
            Ok(())
        }

        cli::Command::Search { query, limit, json } => {
            let query = query.join(" ");
            let mut results = match app_mgr.search(&query) {
                Ok(results) => results,
                Err(AppError::Search(err)) => bail!("Please enter valid search terms: {err}"),
                Err(err) => return Err(err.into()),
            };

            if let Some(limit) = limit {
                results.truncate(limit);
            }

            if json {
                return print_json(&results);
            }

            if results.is_empty() {
                println!("No results found for \"{query}\"");
                return Ok(());
            }

            let highlighter = app_mgr.highlighter(&query)?;
            for result in &results {
                print_link(&result.link, Some(&highlighter));
                println!("    Relevance: {}", display_score(result.score));
                println!();
            }
            println!("Found {} results", results.len());
            Ok(())
        }

        cli::Command::List { unread, json } => {
            let links = app_mgr.list(unread)?;

            if json {
                return print_json(&links);
            }

            if links.is_empty() {
                println!("No saved webpages yet.");
                return Ok(());
            }

            for link in &links {
                print_link(link, None);
            }
            Ok(())
        }

        cli::Command::Random { json } => {
            let Some(link) = app_mgr.random()? else {
                println!("No saved links yet");
                return Ok(());
            };

            if json {
                return print_json(&link);
            }
            print_link(&link, None);
            Ok(())
        }

        cli::Command::Read { url, unread } => {
            app_mgr.set_read(&url, !unread)?;
            println!("Marked as {}", if unread { "unread" } else { "read" });
            Ok(())
        }

        cli::Command::Delete { url, yes } => {
            if !yes && !confirm(&format!("Are you sure you want to delete {url}?"))? {
                return Ok(());
            }

            if app_mgr.delete(&url)? {
                println!("Link deleted");
            } else {
                println!("Link was not saved");
            }
            Ok(())
        }

        cli::Command::Export { output } => {
            let count = app_mgr.export(&output)?;
            println!("{count} links exported to {}", output.display());
            Ok(())
        }

        cli::Command::Import { input, yes } => {
            if !yes
                && !confirm("This replaces every saved link with the file contents. Are you really sure?")?
            {
                return Ok(());
            }

            let count = app_mgr.import(&input)?;
            println!("{count} links imported");
            Ok(())
        }

        cli::Command::Refresh { url } => {
            match app_mgr.refresh(&url)? {
                Some(draft) => print_json(&draft)?,
                None => println!("This page can't be saved"),
            }
            Ok(())
        }
    }
}
