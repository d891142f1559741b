//! Command-line interface definitions.
//!
//! One binary, two subcommands: `parse` scrapes articles into Markdown and
//! JSON, `import` pushes the Markdown files into a Notion database. Token
//! and database id for `import` may come from positional arguments or from
//! the `NOTION_TOKEN` / `NOTION_DATABASE_ID` environment variables;
//! command-line values take precedence.

use clap::{Parser, Subcommand};

/// Scrape news articles into Markdown and import them into Notion.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch articles and write Markdown files plus parsed_articles.json
    Parse {
        /// Article URLs to process
        urls: Vec<String>,

        /// File with one URL per line (blank lines and # comments ignored)
        #[arg(long)]
        file: Option<String>,

        /// Maximum number of concurrent fetches (clamped to 1..=50)
        #[arg(long, default_value_t = 10)]
        concurrent: usize,

        /// Output path for the JSON run artifact
        #[arg(long, default_value = "parsed_articles.json")]
        json_output: String,

        /// Output directory for per-article Markdown files
        #[arg(long, default_value = "articles_markdown")]
        markdown_dir: String,
    },

    /// Import previously parsed Markdown files into a Notion database
    Import {
        /// Notion API token
        #[arg(env = "NOTION_TOKEN")]
        token: Option<String>,

        /// Notion database id
        #[arg(env = "NOTION_DATABASE_ID")]
        database_id: Option<String>,

        /// Directory with the Markdown files produced by `parse`
        #[arg(long, default_value = "articles_markdown")]
        markdown_dir: String,

        /// JSON run artifact used to recover exact titles, dates, and URLs
        #[arg(long, default_value = "parsed_articles.json")]
        json_file: String,

        /// YAML file mapping Markdown labels to multi-select properties
        #[arg(long)]
        field_map: Option<String>,
    },
}
