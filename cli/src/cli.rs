use std::path::PathBuf;

/// Precinct map CLI
#[derive(clap::Parser, Debug)]
#[command(name = "precinctmap", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Map configuration (JSON); built-in defaults otherwise
    #[arg(short, long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Decode a shapefile archive and summarize its precincts
    Inspect(InspectArgs),

    /// Render an SVG snapshot plus legend for an election or race
    Render(RenderArgs),

    /// Validate and submit a message to a precinct's PCO
    Contact(ContactArgs),
}

#[derive(clap::Args, Debug)]
pub struct InspectArgs {
    /// Archive path or http(s) URL
    pub archive: String,

    /// Also write the decoded features as GeoJSON
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub geojson: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct FeedArgs {
    /// Directory of exported statistics (votes/, results/, catalog.json, ...)
    #[arg(long, value_hint = clap::ValueHint::DirPath)]
    pub data_dir: Option<PathBuf>,

    /// Host AJAX endpoint, used instead of a data directory
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Nonce sent with every AJAX request
    #[arg(long)]
    pub nonce: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct RenderArgs {
    /// Boundary archive path or URL; defaults to the configured one
    pub archive: Option<String>,

    /// Voting reference archive (population, legislative district)
    #[arg(long)]
    pub reference: Option<String>,

    #[command(flatten)]
    pub feed: FeedArgs,

    /// Election date (YYYY-MM-DD); the latest in the catalog if omitted
    #[arg(short, long)]
    pub election: Option<String>,

    /// Race within the election
    #[arg(short, long, requires = "election")]
    pub race: Option<String>,

    /// Render district colors only, without fetching statistics
    #[arg(long, conflicts_with_all = ["election", "race"])]
    pub districts: bool,

    /// Precinct to select; its popup is printed
    #[arg(short, long)]
    pub select: Option<String>,

    /// Output SVG file
    #[arg(short, long, value_hint = clap::ValueHint::FilePath, default_value = "map.svg")]
    pub output: PathBuf,

    /// SVG width in pixels
    #[arg(long, default_value_t = 1200)]
    pub width: i32,

    /// Also write legend and popup as JSON
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub json: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct ContactArgs {
    #[command(flatten)]
    pub feed: FeedArgs,

    /// Precinct number
    #[arg(short, long)]
    pub precinct: String,

    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub email: String,

    #[arg(short, long)]
    pub message: String,

    /// Ask to become the precinct's PCO instead of contacting the current one
    #[arg(long)]
    pub become_pco: bool,
}
