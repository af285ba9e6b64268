use anyhow::Result;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use lastwish_cli::{
    build_demo, check_report, load_config, load_session, pin_document, render_document,
    write_document, DemoOptions, OutputFormat,
};
use lastwish_services::HttpBackend;
use lastwish_core::{FileStore, GenerationPolicy, LastWishConfig};
use lastwish_document::DocumentMeta;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn store_arg() -> Arg {
    Arg::new("store")
        .long("store")
        .default_value(".lastwish")
        .value_parser(value_parser!(PathBuf))
        .help("Directory holding the persisted session")
}

fn cli() -> Command {
    Command::new("lastwish")
        .version(env!("CARGO_PKG_VERSION"))
        .about("LastWish digital estate planning")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .subcommand(
            Command::new("check")
                .about("Show the readiness checklist for the stored session")
                .arg(store_arg()),
        )
        .subcommand(
            Command::new("generate")
                .about("Generate the estate document from the stored session")
                .arg(store_arg())
                .arg(
                    Arg::new("advisory")
                        .long("advisory")
                        .action(ArgAction::SetTrue)
                        .help("Generate even if requirements are unmet, with warnings"),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .default_value("text")
                        .value_parser(value_parser!(OutputFormat))
                        .help("Output format: text or json"),
                )
                .arg(
                    Arg::new("out")
                        .long("out")
                        .value_parser(value_parser!(PathBuf))
                        .help("Output file or directory; stdout when omitted"),
                )
                .arg(
                    Arg::new("pin")
                        .long("pin")
                        .action(ArgAction::SetTrue)
                        .help("Pin the document JSON to IPFS and print its content id"),
                ),
        )
        .subcommand(
            Command::new("demo")
                .about("Build and store a complete sample session")
                .arg(store_arg())
                .arg(
                    Arg::new("discover")
                        .long("discover")
                        .help("Discover assets for this address instead of using demo data"),
                )
                .arg(
                    Arg::new("unpaid")
                        .long("unpaid")
                        .action(ArgAction::SetTrue)
                        .help("Leave the payment step undone"),
                ),
        )
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn store_dir(args: &ArgMatches) -> &Path {
    args.get_one::<PathBuf>("store")
        .map_or(Path::new(".lastwish"), PathBuf::as_path)
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("log-json"));

    let config = load_config(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?;

    match matches.subcommand() {
        Some(("check", args)) => check(store_dir(args), &config),
        Some(("generate", args)) => generate(args, &config).await,
        Some(("demo", args)) => {
            let options = DemoOptions {
                discover: args.get_one::<String>("discover").cloned(),
                unpaid: args.get_flag("unpaid"),
            };
            let state = build_demo(store_dir(args), &config, &options).await?;
            println!(
                "Stored demo session with {} asset(s) and {} beneficiary(ies) in {}",
                state.asset_keys().len(),
                state.beneficiaries.len(),
                store_dir(args).display()
            );
            Ok(())
        }
        _ => unreachable!("subcommand required"),
    }
}

fn check(dir: &Path, config: &LastWishConfig) -> Result<()> {
    let state = load_session(&FileStore::open(dir)?, config)?;
    let (ready, report) = check_report(&state);
    print!("{report}");
    if ready {
        println!("\nReady for final generation.");
        Ok(())
    } else {
        std::process::exit(1);
    }
}

async fn generate(args: &ArgMatches, config: &LastWishConfig) -> Result<()> {
    let state = load_session(&FileStore::open(store_dir(args))?, config)?;
    let policy = if args.get_flag("advisory") {
        GenerationPolicy::Advisory
    } else {
        config.generation_policy
    };
    let format = args
        .get_one::<OutputFormat>("format")
        .copied()
        .unwrap_or_default();

    let (document, rendered) = render_document(&state, policy, format, DocumentMeta::generate())?;
    match args.get_one::<PathBuf>("out") {
        Some(out) => {
            let path = write_document(out, &document, &rendered)?;
            println!("Wrote {} ({})", path.display(), document.meta.document_id);
        }
        None => print!("{rendered}"),
    }
    if args.get_flag("pin") {
        let backend = HttpBackend::from_config(&config.services)?;
        let pinned = pin_document(&backend, &document).await?;
        let origin = if pinned.local { "local" } else { "ipfs" };
        eprintln!("Pinned ({origin}): {}", pinned.cid);
    }
    Ok(())
}
