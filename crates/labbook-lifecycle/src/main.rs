use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use labbook_core::{Capabilities, Decimal, EngineConfig, Record, Role, SystemClock};
use labbook_lifecycle::LifecycleEngine;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Command::new("labbook")
        .version(labbook_lifecycle::VERSION)
        .about("Lab notebook lifecycle and inventory rules")
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Engine configuration (TOML)"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Output as JSON"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(
            Command::new("status")
                .about("Derive the status of one inventory item")
                .arg(
                    Arg::new("quantity")
                        .long("quantity")
                        .required(true)
                        .value_parser(value_parser!(Decimal))
                        .help("Quantity on hand"),
                )
                .arg(
                    Arg::new("expiry")
                        .long("expiry")
                        .value_parser(value_parser!(NaiveDate))
                        .help("Expiry date (YYYY-MM-DD)"),
                ),
        )
        .subcommand(
            Command::new("inventory")
                .about("Re-derive every inventory item in a JSON record dump")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON array of records"),
                ),
        )
        .subcommand(
            Command::new("capabilities")
                .about("Show what a role may do")
                .arg(
                    Arg::new("role")
                        .required(true)
                        .value_parser(value_parser!(Role))
                        .help("admin, principal_investigator, research_associate, accounts or guest"),
                ),
        )
        .subcommand(
            Command::new("dashboard")
                .about("Summarize a JSON record dump")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON array of records"),
                ),
        );

    let matches = cli.get_matches();
    init_tracing(matches.get_flag("log-json"));

    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let engine = LifecycleEngine::new(SystemClock, config);
    let json = matches.get_flag("json");

    match matches.subcommand() {
        Some(("status", args)) => status(&engine, args, json),
        Some(("inventory", args)) => inventory(&engine, file_arg(args)?, json),
        Some(("capabilities", args)) => {
            let role = *args
                .get_one::<Role>("role")
                .context("missing role argument")?;
            capabilities(role, json)
        }
        Some(("dashboard", args)) => dashboard(&engine, file_arg(args)?, json),
        _ => Ok(()),
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn file_arg(args: &ArgMatches) -> Result<&Path> {
    args.get_one::<PathBuf>("file")
        .map(PathBuf::as_path)
        .context("missing file argument")
}

fn load_records(path: &Path) -> Result<Vec<Record>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let records: Vec<Record> = serde_json::from_str(&text)
        .with_context(|| format!("parsing records from {}", path.display()))?;
    tracing::debug!(count = records.len(), path = %path.display(), "Loaded records");
    Ok(records)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn status(engine: &LifecycleEngine, args: &ArgMatches, json: bool) -> Result<()> {
    let quantity = *args
        .get_one::<Decimal>("quantity")
        .context("missing quantity")?;
    let expiry = args.get_one::<NaiveDate>("expiry").copied();
    let status = engine.derive_status(quantity, expiry);

    if json {
        print_json(&serde_json::json!({
            "quantity": quantity,
            "expiry_date": expiry,
            "status": status,
        }))
    } else {
        println!("{status}");
        Ok(())
    }
}

#[derive(Serialize)]
struct InventoryLine<'a> {
    business_id: &'a str,
    name: &'a str,
    stored: labbook_core::RecordStatus,
    derived: labbook_core::RecordStatus,
    expiring_soon: bool,
}

fn inventory(engine: &LifecycleEngine, path: &Path, json: bool) -> Result<()> {
    let records = load_records(path)?;
    let lines: Vec<InventoryLine<'_>> = records
        .iter()
        .filter(|r| r.kind.has_derived_status())
        .map(|r| InventoryLine {
            business_id: &r.business_id,
            name: r.display_name(),
            stored: r.status,
            derived: engine.display_status(r),
            expiring_soon: engine.is_expiring_soon(r),
        })
        .collect();

    if json {
        return print_json(&lines);
    }

    println!("Inventory ({} items)", lines.len());
    println!("=====================");
    for line in &lines {
        let stale = if line.stored == line.derived { "" } else { " (stale)" };
        let soon = if line.expiring_soon { "  [expiring soon]" } else { "" };
        println!(
            "{:<16} {:<32} {}{stale}{soon}",
            line.business_id, line.name, line.derived
        );
    }
    Ok(())
}

fn capabilities(role: Role, json: bool) -> Result<()> {
    let caps = Capabilities::for_role(role);
    if json {
        return print_json(&serde_json::json!({ "role": role, "capabilities": caps }));
    }

    println!("Role: {role}");
    println!("  can_edit:       {}", caps.can_edit);
    println!("  can_approve:    {}", caps.can_approve);
    println!("  can_edit_any:   {}", caps.can_edit_any);
    println!("  view_only:      {}", caps.view_only);
    println!("  inventory_only: {}", caps.inventory_only);
    Ok(())
}

fn dashboard(engine: &LifecycleEngine, path: &Path, json: bool) -> Result<()> {
    let records = load_records(path)?;
    let summary = engine.dashboard(&records);
    if json {
        return print_json(&summary);
    }

    println!("Lab Dashboard");
    println!("=============");
    for (kind, count) in &summary.counts {
        println!("  {:<20} {count}", kind.table());
    }
    println!();
    println!("Stock:");
    println!("  Available:    {}", summary.stock.available);
    println!("  Low Stock:    {}", summary.stock.low_stock);
    println!("  Out of Stock: {}", summary.stock.out_of_stock);
    println!("  Expired:      {}", summary.stock.expired);
    println!();
    println!("Expiring soon ({}):", summary.expiring_soon.len());
    for alert in &summary.expiring_soon {
        println!(
            "  {:<16} {:<32} {} ({} days)",
            alert.business_id, alert.name, alert.expiry_date, alert.days_until
        );
    }
    println!();
    println!("Awaiting review ({}):", summary.pending_reviews.len());
    for pending in &summary.pending_reviews {
        println!(
            "  {:<12} {:<16} {}",
            pending.kind.table(),
            pending.business_id,
            pending.title
        );
    }
    Ok(())
}
