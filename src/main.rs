use clap::{
    ArgAction, CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use swipecli::{cli, config, error, types::{DEFAULT_YEAR_RANGE, MusicFilter}};

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
    Auth,

    /// Clear the stored login
    Logout,

    /// Fetch one batch of recommendations
    Discover(DiscoverOptions),

    /// Interactive like/dislike discovery loop
    Swipe(SwipeOptions),

    /// Authentication and session status
    Info,

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct DiscoverOptions {
    /// Maximum number of tracks in the batch
    #[clap(long, default_value_t = 20)]
    pub limit: usize,

    #[clap(flatten)]
    pub filter: FilterArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct SwipeOptions {
    /// Export liked tracks into a new private playlist with this name
    #[clap(long)]
    pub playlist: Option<String>,

    #[clap(flatten)]
    pub filter: FilterArgs,
}

/// Discovery filter flags shared by `discover` and `swipe`.
#[derive(Parser, Debug, Clone)]
pub struct FilterArgs {
    /// Genre to search within; can be repeated
    #[clap(long = "genre", action = ArgAction::Append, num_args = 1)]
    pub genres: Vec<String>,

    /// Lower bound of the release year range
    #[clap(long)]
    pub year_from: Option<u16>,

    /// Upper bound of the release year range
    #[clap(long)]
    pub year_to: Option<u16>,

    /// Prefer the newest releases in the year range
    #[clap(long = "new")]
    pub include_new: bool,

    /// Prefer the earliest decade of the year range
    #[clap(long = "classics")]
    pub include_classics: bool,

    /// Prefer popular tracks
    #[clap(long = "popular")]
    pub include_popular: bool,
}

impl FilterArgs {
    fn into_filter(self) -> MusicFilter {
        let (default_lo, default_hi) = DEFAULT_YEAR_RANGE;
        MusicFilter {
            selected_genres: self.genres,
            year_range: (
                self.year_from.unwrap_or(default_lo),
                self.year_to.unwrap_or(default_hi),
            ),
            include_new: self.include_new,
            include_classics: self.include_classics,
            include_popular: self.include_popular,
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Auth => cli::auth().await,
        Command::Logout => cli::logout().await,
        Command::Discover(opt) => cli::discover(opt.limit, opt.filter.into_filter()).await,
        Command::Swipe(opt) => cli::swipe(opt.playlist, opt.filter.into_filter()).await,
        Command::Info => cli::info().await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
