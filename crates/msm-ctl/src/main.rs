//! Operator CLI for parent-owned collections (hosts of a worker-manager,
//! conditions of a rule, services of an app, ...)

mod settings;

use anyhow::{bail, Context};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use msm_collection::{ItemId, ParentEntity, ParentId};
use msm_repository::HttpRepository;
use msm_sync::{
    CollectionBinding, CollectionSynchronizer, CommitOutcome, MembershipCache, Notification,
    Selection, SyncObserver,
};
use settings::Settings;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Prints notifications the way a dashboard would toast them
struct ConsoleObserver;

impl SyncObserver for ConsoleObserver {
    fn on_notification(&self, notification: &Notification) {
        if notification.is_error() {
            eprintln!("{}", notification.message);
        } else {
            println!("{}", notification.message);
        }
    }
}

fn cli() -> Command {
    let binding = Arg::new("binding")
        .required(true)
        .help("Collection binding (see `msm-ctl bindings`)");
    let parent = Arg::new("parent").required(true).help("Parent id");
    let items = Arg::new("items")
        .required(true)
        .num_args(1..)
        .help("Item ids");

    Command::new("msm-ctl")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Inspect and edit parent-owned collections of the manager API")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML settings file (default: MSM_* environment variables)"),
        )
        .arg(
            Arg::new("api-url")
                .long("api-url")
                .global(true)
                .help("Override the API base URL"),
        )
        .subcommand(Command::new("bindings").about("List built-in collection bindings"))
        .subcommand(
            Command::new("list")
                .about("Show a parent's collection")
                .arg(binding.clone())
                .arg(parent.clone())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("assign")
                .about("Add items to a parent's collection in one request")
                .arg(binding.clone())
                .arg(parent.clone())
                .arg(items.clone()),
        )
        .subcommand(
            Command::new("unassign")
                .about("Remove items from a parent's collection in one request")
                .arg(binding)
                .arg(parent)
                .arg(items),
        )
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();
    if let Err(e) = run(&matches).await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(matches: &ArgMatches) -> anyhow::Result<()> {
    let settings = Settings::load(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?
        .with_api_url(matches.get_one::<String>("api-url"));

    match matches.subcommand() {
        Some(("bindings", _)) => {
            for binding in CollectionBinding::presets() {
                println!(
                    "{:<26} {:<44} {} -> {}",
                    binding.name, binding.path, binding.labels.parent, binding.labels.plural
                );
            }
            Ok(())
        }
        Some(("list", args)) => {
            let sync = open(&settings, args).await?;
            let rows = sync.rows(&Selection::new());
            if args.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                let labels = &sync.binding().labels;
                println!("{} {}", rows.len(), labels.noun(rows.len()));
                for row in rows {
                    println!("  {}", row.item);
                }
            }
            Ok(())
        }
        Some(("assign", args)) => {
            let sync = open(&settings, args).await?;
            let items = item_args(args);
            sync.set_known(items.iter().cloned());
            for item in items {
                sync.add(item)?;
            }
            let parent = parent_arg(args);
            if sync.commit(parent).await? == CommitOutcome::NothingStaged {
                println!("nothing to {}", sync.binding().labels.add_verb);
            }
            Ok(())
        }
        Some(("unassign", args)) => {
            let sync = open(&settings, args).await?;
            sync.remove(&item_args(args)).await?;
            Ok(())
        }
        Some((other, _)) => bail!("unknown command {other}"),
        None => bail!("no command given"),
    }
}

/// Build a synchronizer for the binding named in `args` and load its parent
async fn open(
    settings: &Settings,
    args: &ArgMatches,
) -> anyhow::Result<CollectionSynchronizer<HttpRepository>> {
    let name = args.get_one::<String>("binding").map(String::as_str).unwrap_or_default();
    let binding = CollectionBinding::preset(name)
        .with_context(|| format!("unknown binding {name:?}; try `msm-ctl bindings`"))?;

    let repository = HttpRepository::new(&settings.repository, binding.path.clone())?;
    let sync = CollectionSynchronizer::new(repository, binding)
        .with_cache(MembershipCache::from_config(&settings.sync))
        .with_observer(Arc::new(ConsoleObserver));

    sync.select_parent(ParentEntity::Persisted(parent_arg(args)))
        .await
        .into_result()?;
    Ok(sync)
}

fn parent_arg(args: &ArgMatches) -> ParentId {
    args.get_one::<String>("parent")
        .map(ParentId::new)
        .unwrap_or_else(|| ParentId::new(""))
}

fn item_args(args: &ArgMatches) -> Vec<ItemId> {
    args.get_many::<String>("items")
        .map(|values| values.map(ItemId::new).collect())
        .unwrap_or_default()
}
