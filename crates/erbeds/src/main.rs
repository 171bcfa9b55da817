//! `erbeds` - CLI for ER bed availability
//!
//! This binary runs the HTTP API server and offers direct command-line access
//! to the same data.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use tracing::warn;

use erbeds::cli::{
    BedsCommand, Cli, Command, ConfigCommand, LocateCommand, OutputFormat, ShowCommand,
};
use erbeds::view::{self, HospitalCard, HospitalDetail, HospitalList};
use erbeds::{beds, enrich, init_logging, region, server};
use erbeds::{BedQuery, Config, Geocoder, KakaoClient, PublicDataClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Configuration is loaded per command so that `config validate` and
    // `regions` work even when the active config file is broken
    let config_path = cli.config;
    match cli.command {
        Command::Serve(cmd) => handle_serve(load_config(config_path)?, cmd.bind).await,
        Command::Beds(cmd) => handle_beds(&load_config(config_path)?, &cmd).await,
        Command::Show(cmd) => handle_show(&load_config(config_path)?, &cmd).await,
        Command::Locate(cmd) => handle_locate(&load_config(config_path)?, &cmd).await,
        Command::Regions(cmd) => handle_regions(cmd.json),
        Command::Config(cmd) => handle_config(config_path, cmd),
    }
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<Config> {
    Config::load_from(path).context("loading configuration")
}

async fn handle_serve(mut config: Config, bind: Option<String>) -> anyhow::Result<()> {
    if let Some(bind) = bind {
        config.server.bind_address = bind;
        config.validate()?;
    }
    server::serve(config).await?;
    Ok(())
}

async fn handle_beds(config: &Config, cmd: &BedsCommand) -> anyhow::Result<()> {
    let client = PublicDataClient::from_config(config)?;
    let query = BedQuery::new(cmd.region(), cmd.rows.unwrap_or(config.beds.default_rows));
    if !region::is_known(&query.region) {
        warn!(region = %query.region, "Region is not in the built-in catalog");
    }

    let fetched = beds::fetch_hospitals(&client, &query)
        .await
        .context("fetching bed availability")?;
    let mut hospitals = view::search(fetched, &cmd.search);

    if cmd.locate {
        let geocoder = KakaoClient::from_config(config)?;
        let report = enrich::locate_all(&geocoder, &mut hospitals, config.geocode_delay()).await;
        if report.all_failed() {
            warn!(failed = report.failed, "Every location lookup failed");
        }
    }

    let list = HospitalList::new(query.region, &cmd.search, &hospitals);
    match cmd.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&list)?),
        OutputFormat::Plain => print_plain(&list, &hospitals),
        OutputFormat::Table => print_table(&list, &hospitals),
    }
    Ok(())
}

fn print_plain(list: &HospitalList, hospitals: &[erbeds::Hospital]) {
    for (card, hospital) in list.hospitals.iter().zip(hospitals) {
        let position = hospital
            .location
            .map(|p| format!(" @ {:.5},{:.5}", p.lat, p.lon))
            .unwrap_or_default();
        println!("{}\t{}\t{}\t{}{position}", card.id, card.name, card.badge, card.phone);
    }
}

fn print_table(list: &HospitalList, hospitals: &[erbeds::Hospital]) {
    println!("Region: {}", list.region);
    println!(
        "Hospitals: {}  ER beds: {}  With beds: {}",
        list.stats.total_hospitals, list.stats.total_beds, list.stats.available_hospitals
    );
    println!();
    println!(
        "{:<10} {:<30} {:>4} {:>4} {:>4} {:>5}  {:<9} {:<14} {}",
        "ID", "NAME", "GEN", "PED", "NGT", "TOTAL", "STATUS", "PHONE", "LOCATION"
    );
    for (card, hospital) in list.hospitals.iter().zip(hospitals) {
        let location = hospital
            .location
            .map_or_else(|| "-".to_string(), |p| format!("{:.5},{:.5}", p.lat, p.lon));
        println!(
            "{:<10} {:<30} {:>4} {:>4} {:>4} {:>5}  {:<9} {:<14} {}",
            card.id,
            card.name,
            card.er_general,
            card.er_pediatric,
            card.er_night,
            card.er_total,
            card.status,
            card.phone,
            location
        );
    }
}

async fn handle_show(config: &Config, cmd: &ShowCommand) -> anyhow::Result<()> {
    let client = PublicDataClient::from_config(config)?;
    let hospital = beds::find_hospital(&client, &cmd.id, config.beds.detail_rows).await?;
    let detail = HospitalDetail::from(&hospital);

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&detail)?);
        return Ok(());
    }

    print_detail(&detail);
    Ok(())
}

fn print_detail(detail: &HospitalDetail) {
    let card: &HospitalCard = &detail.card;
    println!("{} ({})", card.name, card.id);
    println!("{}", "=".repeat(40));
    println!("Phone:          {}", card.phone);
    println!("Status:         {} ({})", detail.status_label, card.badge);
    println!();
    println!("[Emergency room]");
    println!("  General:        {}", card.er_general);
    println!("  Pediatric:      {}", card.er_pediatric);
    println!("  Night:          {}", card.er_night);
    println!();
    println!("[Intensive care]");
    for row in &detail.icu {
        println!("  {:<16}{}", format!("{}:", row.label), row.value);
    }
    println!();
    println!("[Wards]");
    for row in &detail.wards {
        println!("  {:<20}{}", format!("{}:", row.label), row.value);
    }
    println!();
    println!("[Equipment]");
    for row in &detail.equipment {
        println!("  {:<16}{}", format!("{}:", row.label), row.text);
    }
    if let Some(updated_at) = detail.updated_at {
        println!();
        println!("Updated:        {}", updated_at.format("%Y-%m-%d %H:%M:%S"));
    }
}

async fn handle_locate(config: &Config, cmd: &LocateCommand) -> anyhow::Result<()> {
    let name = cmd.name.trim();
    if name.is_empty() {
        bail!("hospital name is required");
    }
    let geocoder = KakaoClient::from_config(config)?;
    let Some(location) = geocoder.locate(name).await? else {
        bail!("no location found for {name:?}");
    };

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&location)?);
    } else {
        println!("{}", location.name);
        println!("  Address:   {}", location.address);
        println!("  Position:  {:.6}, {:.6}", location.lat, location.lon);
    }
    Ok(())
}

fn handle_regions(json: bool) -> anyhow::Result<()> {
    let catalog = region::catalog();
    if json {
        println!("{}", serde_json::to_string_pretty(catalog)?);
        return Ok(());
    }
    for province in catalog {
        println!("{}", province.name);
        for district in province.districts {
            println!("  {district}");
        }
    }
    Ok(())
}

fn handle_config(config_path: Option<PathBuf>, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = &load_config(config_path)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&redacted(config))?);
            } else {
                let key_state = |key: &Option<String>| {
                    if key.as_deref().is_some_and(|k| !k.trim().is_empty()) {
                        "set"
                    } else {
                        "not set"
                    }
                };
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Server]");
                println!("  Bind address:       {}", config.server.bind_address);
                println!();
                println!("[Beds]");
                println!("  Base URL:           {}", config.beds.base_url);
                println!("  Service key:        {}", key_state(&config.beds.service_key));
                println!("  Default rows:       {}", config.beds.default_rows);
                println!("  Detail rows:        {}", config.beds.detail_rows);
                println!("  Timeout (s):        {}", config.beds.timeout_secs);
                println!();
                println!("[Geocode]");
                println!("  Base URL:           {}", config.geocode.base_url);
                println!("  REST key:           {}", key_state(&config.geocode.rest_key));
                println!("  Category:           {}", config.geocode.category_group_code);
                println!("  Delay (ms):         {}", config.geocode.delay_ms);
                println!("  Timeout (s):        {}", config.geocode.timeout_secs);
                println!();
                println!("[Map]");
                println!(
                    "  Center:             {}, {}",
                    config.map.center_lat, config.map.center_lon
                );
                println!("  Level:              {}", config.map.level);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .or(config_path)
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            validate_config_file(&path)?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}

/// Load and validate one configuration file.
fn validate_config_file(path: &Path) -> anyhow::Result<Config> {
    if !path.is_file() {
        bail!("configuration file {} does not exist", path.display());
    }
    Config::load_from(Some(path.to_path_buf()))
        .with_context(|| format!("configuration file {} is invalid", path.display()))
}

/// Configuration with credentials masked.
fn redacted(config: &Config) -> Config {
    let mask = |key: &Option<String>| key.as_ref().map(|_| "********".to_string());
    let mut config = config.clone();
    config.beds.service_key = mask(&config.beds.service_key);
    config.geocode.rest_key = mask(&config.geocode.rest_key);
    config
}
