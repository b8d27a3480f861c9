use clap::{Args, Parser, Subcommand, ValueEnum};

use kura_core::assistant::StudioMode;

#[derive(Debug, Parser)]
#[command(name = "kura", version, about = "Site content, assistant and offline cache for the A.R.M")]
pub struct Cli {
    /// Access code for admin commands
    #[arg(long, global = true, env = "KURA_ADMIN_CODE", hide_env_values = true)]
    pub admin_code: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the current site content
    Show,

    /// Switch the display language (fr, en, es, ar)
    Lang { code: String },

    /// Replace the flash bulletin (admin)
    Bulletin { text: String },

    /// Manage the leadership list (admin)
    #[command(subcommand)]
    Member(MemberCommand),

    /// Manage the agenda (admin)
    #[command(subcommand)]
    Event(EventCommand),

    /// Manage news articles (admin)
    #[command(subcommand)]
    News(NewsCommand),

    /// Restore every stored slot to its initial content (admin)
    Reset,

    /// Ask the party assistant a question
    Ask {
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },

    /// Draft a statement or a social post (admin)
    Studio {
        #[arg(value_enum)]
        mode: StudioArg,
        #[arg(required = true, num_args = 1..)]
        prompt: Vec<String>,
    },

    /// Offline cache worker
    #[command(subcommand)]
    Cache(CacheCommand),

    /// Submit a membership application
    Join(JoinArgs),

    /// Inspect or write the configuration file (admin)
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Simulate a donation
    Donate {
        /// Amount in euros; defaults to the suggested amount
        #[arg(long)]
        amount: Option<u32>,
    },
}

#[derive(Debug, Subcommand)]
pub enum MemberCommand {
    Add {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        role: Option<String>,
        #[arg(long)]
        location: Option<String>,
    },
    Update {
        index: usize,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        role: Option<String>,
        #[arg(long)]
        location: Option<String>,
    },
    Rm { index: usize },
}

#[derive(Debug, Subcommand)]
pub enum EventCommand {
    /// Add an event; without fields a placeholder is created
    Add(EventFields),
    Update {
        id: String,
        #[command(flatten)]
        fields: EventFields,
        /// Drop the event image
        #[arg(long, conflicts_with = "image")]
        no_image: bool,
    },
    Rm { id: String },
}

#[derive(Debug, Args)]
pub struct EventFields {
    #[arg(long)]
    pub title: Option<String>,
    /// Date as YYYY-MM-DD
    #[arg(long)]
    pub date: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub image: Option<String>,
}

impl EventFields {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.date.is_none()
            && self.description.is_none()
            && self.location.is_none()
            && self.image.is_none()
    }
}

#[derive(Debug, Subcommand)]
pub enum NewsCommand {
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        date: String,
        #[arg(long)]
        summary: String,
        #[arg(long, default_value = "")]
        content: String,
    },
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        summary: Option<String>,
        #[arg(long)]
        content: Option<String>,
    },
    Rm { id: String },
}

#[derive(Debug, Subcommand)]
pub enum CacheCommand {
    /// Install and activate the configured cache generation
    Install,
    /// Fetch a URL through the cache worker
    Fetch {
        url: String,
        /// Treat the request as a page navigation
        #[arg(long)]
        navigate: bool,
    },
    /// List cache namespaces and their entries
    Status,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file path and the effective settings
    Show,
    /// Write the effective settings to the config file
    Init {
        /// Replace an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Args)]
pub struct JoinArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub phone: String,
    /// Region of residence, or "diaspora"
    #[arg(long)]
    pub region: String,
    #[arg(long)]
    pub profession: Option<String>,
    /// Accept the party statutes
    #[arg(long)]
    pub accept_statutes: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StudioArg {
    Campaign,
    Social,
}

impl From<StudioArg> for StudioMode {
    fn from(arg: StudioArg) -> Self {
        match arg {
            StudioArg::Campaign => StudioMode::Campaign,
            StudioArg::Social => StudioMode::Social,
        }
    }
}

impl Command {
    /// Whether the command belongs to the admin console.
    pub fn requires_admin(&self) -> bool {
        matches!(
            self,
            Command::Bulletin { .. }
                | Command::Member(_)
                | Command::Event(_)
                | Command::News(_)
                | Command::Reset
                | Command::Studio { .. }
                | Command::Config(_)
        )
    }
}
