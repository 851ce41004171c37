use super::*;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;

const TRAIL_CAPACITY: usize = 200;
const TRAIL_FILTER: &str = "vspc=debug,vspc_api=debug,vspc_core=debug";

pub(super) async fn run(local_offset: UtcOffset) -> anyhow::Result<()> {
    let trail = logging::LogTrail::new(TRAIL_CAPACITY);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(EnvFilter::from_default_env()),
        )
        .with(logging::TrailLayer::new(trail.clone()).with_filter(EnvFilter::new(TRAIL_FILTER)))
        .init();

    let cli = Cli::parse();
    info!(command = command_label(&cli.command), "Running command");
    let output = Output { json: cli.json };
    let context = AppContext {
        config_path: cli.config,
        local_offset,
    };

    let result = dispatch(cli.command, &context, output).await;
    if let Err(err) = &result {
        eprintln!("Request failed: {err:#}");
        if cli.verbose {
            eprintln!("Recent log:");
            for entry in trail.entries() {
                eprintln!("  {}", entry.format_line());
            }
        }
    }
    result
}

async fn dispatch(command: Commands, context: &AppContext, output: Output) -> anyhow::Result<()> {
    match command {
        Commands::Login(args) => handle_login(args, context, output).await,
        Commands::Logout => handle_logout(context, output),
        Commands::Session => handle_session(context, output),
        Commands::Dashboard(args) => handle_dashboard(args, context, output).await,
        Commands::Jobs => handle_jobs(context, output).await,
        Commands::Usage => handle_usage(context, output).await,
        Commands::Billing => handle_billing(context, output).await,
        Commands::Threats => handle_threats(context, output).await,
        Commands::Alarms => handle_alarms(context, output).await,
        Commands::Config(args) => handle_config(args, context, output),
    }
}

fn command_label(command: &Commands) -> &'static str {
    match command {
        Commands::Login(_) => "login",
        Commands::Logout => "logout",
        Commands::Session => "session",
        Commands::Dashboard(_) => "dashboard",
        Commands::Jobs => "jobs",
        Commands::Usage => "usage",
        Commands::Billing => "billing",
        Commands::Threats => "threats",
        Commands::Alarms => "alarms",
        Commands::Config(_) => "config",
    }
}

#[derive(Clone, Copy)]
pub(super) struct Output {
    pub(super) json: bool,
}

impl Output {
    /// Prints the value as pretty JSON, or the text rendering otherwise.
    pub(super) fn emit<T: Serialize>(
        &self,
        value: &T,
        text: impl FnOnce(&T) -> String,
    ) -> anyhow::Result<()> {
        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(value).context("serialize output")?
            );
        } else {
            print!("{}", text(value));
        }
        Ok(())
    }
}

pub(super) struct AppContext {
    pub(super) config_path: Option<PathBuf>,
    pub(super) local_offset: UtcOffset,
}

impl AppContext {
    pub(super) fn config_path(&self) -> anyhow::Result<PathBuf> {
        match &self.config_path {
            Some(path) => Ok(path.clone()),
            None => default_config_path(),
        }
    }

    pub(super) fn load_config(&self) -> anyhow::Result<AppConfig> {
        let path = self.config_path()?;
        AppConfig::load(&path).with_context(|| format!("load config {}", path.display()))
    }

    pub(super) fn clock(&self) -> ViewClock {
        ViewClock::now(self.local_offset)
    }

    pub(super) fn session_store(&self, config: &AppConfig) -> anyhow::Result<SessionStore> {
        let backend: Arc<dyn KeyValueStore> = match config.store {
            StoreBackend::File => Arc::new(FileStore::new(config.session_path()?)),
            StoreBackend::Keyring => Arc::new(KeyringStore::default()),
        };
        Ok(SessionStore::new(backend))
    }

    pub(super) fn portal_client(&self, config: &AppConfig) -> anyhow::Result<PortalClient> {
        let http = build_client(&http_options(config)).context("build http client")?;
        let tokens = Arc::new(TokenManager::new(http.clone(), self.session_store(config)?));
        Ok(PortalClient::new(http, tokens))
    }
}

fn http_options(config: &AppConfig) -> HttpOptions {
    if config.accept_invalid_certs {
        warn!("TLS certificate verification is disabled");
    }
    HttpOptions {
        timeout: std::time::Duration::from_secs(config.request_timeout_secs),
        accept_invalid_certs: config.accept_invalid_certs,
    }
}
