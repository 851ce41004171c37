use super::*;
#[derive(Parser)]
#[command(name = "vspc", author, version, about = "Backup portal dashboards")]
pub(super) struct Cli {
    #[arg(long, global = true, help = "Print machine-readable JSON")]
    pub(super) json: bool,
    #[arg(
        long,
        global = true,
        help = "Print the captured log trail when a command fails"
    )]
    pub(super) verbose: bool,
    #[arg(long, global = true, help = "Use this config file instead of the default")]
    pub(super) config: Option<PathBuf>,
    #[command(subcommand)]
    pub(super) command: Commands,
}

#[derive(clap::Subcommand)]
pub(super) enum Commands {
    #[command(about = "Sign in to a portal and store the session")]
    Login(LoginArgs),
    #[command(about = "Forget the stored session")]
    Logout,
    #[command(about = "Show the stored session")]
    Session,
    #[command(about = "Job statuses, SLA and daily trend")]
    Dashboard(DashboardArgs),
    #[command(about = "List jobs with their last run")]
    Jobs,
    #[command(about = "Company usage counters")]
    Usage,
    #[command(about = "Storage quota usage")]
    Billing,
    #[command(about = "Machines flagged by malware detection")]
    Threats,
    #[command(about = "Active alarms")]
    Alarms,
    #[command(about = "Manage config")]
    Config(ConfigArgs),
}

#[derive(Parser)]
pub(super) struct LoginArgs {
    #[arg(long, help = "Portal host; scheme, port and API path are added")]
    pub(super) url: String,
    #[arg(long)]
    pub(super) username: String,
    #[arg(long, env = "VSPC_PASSWORD", hide_env_values = true)]
    pub(super) password: String,
}

#[derive(Parser)]
pub(super) struct DashboardArgs {
    #[arg(long, help = "Job status window in hours")]
    pub(super) window_hours: Option<i64>,
    #[arg(long, help = "Days in the daily trend")]
    pub(super) days: Option<u32>,
}

#[derive(Parser)]
pub(super) struct ConfigArgs {
    #[command(subcommand)]
    pub(super) command: ConfigCommands,
}

#[derive(clap::Subcommand)]
pub(super) enum ConfigCommands {
    #[command(about = "Write the config file, keeping values not given")]
    Init(InitArgs),
    #[command(about = "Print the effective config")]
    Show,
}

#[derive(Parser)]
pub(super) struct InitArgs {
    #[arg(long, value_enum)]
    pub(super) store: Option<StoreValue>,
    #[arg(long)]
    pub(super) session_path: Option<PathBuf>,
    #[arg(long)]
    pub(super) timeout_secs: Option<u64>,
    #[arg(long)]
    pub(super) accept_invalid_certs: Option<bool>,
    #[arg(long)]
    pub(super) window_hours: Option<i64>,
    #[arg(long)]
    pub(super) trend_days: Option<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(super) enum StoreValue {
    File,
    Keyring,
}

impl From<StoreValue> for StoreBackend {
    fn from(value: StoreValue) -> Self {
        match value {
            StoreValue::File => StoreBackend::File,
            StoreValue::Keyring => StoreBackend::Keyring,
        }
    }
}
