use super::app::{AppContext, Output};
use super::*;

pub(super) fn handle_config(
    args: ConfigArgs,
    context: &AppContext,
    output: Output,
) -> anyhow::Result<()> {
    match args.command {
        ConfigCommands::Init(args) => {
            let path = context.config_path()?;
            let mut config = context.load_config()?;
            apply_init(&mut config, args);
            config.save(&path)?;
            info!(path = %path.display(), "Config written");
            output.emit(&config, |_| format!("Config written to {}\n", path.display()))
        }
        ConfigCommands::Show => {
            let config = context.load_config()?;
            output.emit(&config, render::render_config)
        }
    }
}

pub(super) fn apply_init(config: &mut AppConfig, args: InitArgs) {
    if let Some(store) = args.store {
        config.store = store.into();
    }
    if let Some(path) = args.session_path {
        config.session_path = Some(path);
    }
    if let Some(timeout) = args.timeout_secs {
        config.request_timeout_secs = timeout;
    }
    if let Some(accept) = args.accept_invalid_certs {
        config.accept_invalid_certs = accept;
    }
    if let Some(hours) = args.window_hours {
        config.sla_window_hours = hours;
    }
    if let Some(days) = args.trend_days {
        config.trend_days = days;
    }
}
