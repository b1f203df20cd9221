use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use tracing_subscriber::EnvFilter;

use tracksformer::{cli, config, error, spotify::search::SearchFilters};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with Spotify API
    Auth(AuthOptions),

    /// Search tracks by artist and title
    Search(SearchOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct AuthOptions {
    /// Receive the redirect on a local server instead of pasting it
    #[clap(long)]
    pub listen: bool,

    /// Print the consent URL instead of opening a browser (with --listen)
    #[clap(long, requires = "listen")]
    pub no_browser: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct SearchOptions {
    /// Artist name
    #[clap(long)]
    pub artist: String,

    /// Track title
    #[clap(long)]
    pub title: String,

    /// Maximum number of results (1-50)
    #[clap(long, value_parser = clap::value_parser!(u8).range(1..=50))]
    pub limit: Option<u8>,

    /// Market as ISO 3166-1 alpha-2 country code
    #[clap(long)]
    pub market: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Auth(opt) => cli::auth(opt.listen, !opt.no_browser).await,
        Command::Search(opt) => {
            let filters = SearchFilters {
                limit: opt.limit,
                market: opt.market,
            };
            cli::search(opt.artist, opt.title, filters).await
        }
        Command::Completions(opt) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
