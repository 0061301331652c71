mod console;

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use console::{ConsoleMessages, ConsoleNavigation, ConsoleOverlay};
use nova_core::{
    HttpBackend, Localization, NavigationOutcome, Navigator, NovaConfig, Services, Session,
    StateParams,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("nova")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Resolve, open and inspect Nova artifacts")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .global(true)
                .help("Server base URL (overrides the configuration file)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Debug logging"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Print results and logs as JSON"),
        )
        .subcommand(
            Command::new("resolve")
                .about("Print what an id resolves to")
                .arg(Arg::new("id").required(true).help("Item id")),
        )
        .subcommand(
            Command::new("open")
                .about("Navigate to an item and print the selected artifact")
                .arg(Arg::new("id").required(true).help("Item id"))
                .arg(Arg::new("version").long("version").help("Published version to open"))
                .arg(
                    Arg::new("path")
                        .long("path")
                        .help("Breadcrumb path; skips explorer selection"),
                ),
        )
        .subcommand(
            Command::new("process")
                .about("Load a process artifact and print its shapes and links")
                .arg(Arg::new("id").required(true).help("Process artifact id"))
                .arg(Arg::new("version").long("version").help("Published version to load")),
        )
}

fn init_tracing(verbose: bool, json: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(matches: &ArgMatches) -> Result<NovaConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => NovaConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => NovaConfig::default().with_env_overrides(),
    };
    if let Some(url) = matches.get_one::<String>("base-url") {
        config = config.with_base_url(url.clone());
    }
    Ok(config)
}

fn services(config: NovaConfig) -> Result<Services> {
    let backend = Arc::new(HttpBackend::new(&config)?);
    tracing::debug!(base_url = %config.base_url, locale = %config.locale, "backend ready");
    Ok(Services {
        config: Arc::new(config),
        localization: Arc::new(Localization::new()),
        item_info: backend.clone(),
        artifacts: backend.clone(),
        processes: backend.clone(),
        diagrams: backend.clone(),
        projects: backend,
        navigation: Arc::new(ConsoleNavigation),
        messages: Arc::new(ConsoleMessages),
        loading: Arc::new(ConsoleOverlay::default()),
    })
}

fn state_params(args: &ArgMatches) -> Result<StateParams> {
    let Some(id) = args.get_one::<String>("id") else {
        bail!("missing id");
    };
    let mut params = StateParams::new(id.clone());
    if let Some(version) = args.get_one::<String>("version") {
        params = params.with_version(version.clone());
    }
    if let Some(path) = args.try_get_one::<String>("path").ok().flatten() {
        params = params.with_path(path.clone());
    }
    Ok(params)
}

fn print(json: bool, value: &serde_json::Value, text: impl FnOnce() -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", text());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    let json = matches.get_flag("json");
    init_tracing(matches.get_flag("verbose"), json);

    let config = load_config(&matches)?;
    let session = Session::new(services(config)?);

    match matches.subcommand() {
        Some(("resolve", args)) => {
            let params = state_params(args)?;
            let info = session
                .item_state_service()
                .get_item_info_result(&params.id)
                .await?;
            let value = serde_json::to_value(&info)?;
            print(json, &value, || {
                format!(
                    "{} {:?} {} (type {}, {} versions)",
                    info.id,
                    info.kind(),
                    info.name,
                    info.predefined_type,
                    info.version_count
                )
            })?;
        }
        Some(("open", args)) => {
            let outcome = Navigator::new(Arc::clone(&session))
                .navigate(state_params(args)?)
                .await?;
            match outcome {
                NavigationOutcome::Selected { artifact, tab } => {
                    artifact.get_observable().await?;
                    let state = artifact.artifact_state();
                    let value = serde_json::json!({
                        "id": artifact.id(),
                        "name": artifact.name(),
                        "type": artifact.predefined_type().code(),
                        "tab": tab,
                        "historical": state.historical,
                        "deleted": state.deleted,
                        "readOnly": state.is_read_only(),
                    });
                    print(json, &value, || {
                        format!(
                            "{} {} [{}]{}",
                            artifact.id(),
                            artifact.name(),
                            tab.as_str(),
                            if state.historical { " (historical)" } else { "" }
                        )
                    })?;
                }
                NavigationOutcome::Redirected(target) => {
                    println!("redirected to {}", target.id);
                }
                NavigationOutcome::VersionNotFound {
                    requested,
                    available,
                } => bail!("version {requested} not found (latest is {available})"),
                NavigationOutcome::NotAvailable(kind) => bail!("{kind} cannot be opened"),
            }
        }
        Some(("process", args)) => {
            let params = state_params(args)?;
            let id = nova_core::parse_item_id(&params.id)?;
            let model = nova_artifact::ArtifactModel::new(
                id,
                0,
                "",
                nova_artifact::ItemTypePredefined::Process,
            );
            let handle = session.factory().create_stateful_artifact(model);
            if let Some(version) = params.requested_version() {
                handle.base().pin_version(version);
            }
            let Some(process) = handle.as_process() else {
                bail!("artifact {id} is not a process");
            };
            process.get_observable().await?;

            let shapes = process.shapes();
            let links = process.links();
            let value = serde_json::json!({
                "id": id,
                "name": process.name(),
                "shapes": shapes,
                "links": links,
            });
            print(json, &value, || {
                let mut out = format!("{} {}\n", id, process.name());
                for shape in &shapes {
                    out.push_str(&format!("  shape {} {}\n", shape.id, shape.name));
                }
                for link in &links {
                    out.push_str(&format!(
                        "  link {} -> {} ({})\n",
                        link.source_id, link.destination_id, link.orderindex
                    ));
                }
                out.trim_end().to_string()
            })?;
        }
        _ => bail!("unknown command"),
    }
    Ok(())
}
