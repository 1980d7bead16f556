//! CLI entry point: scan a subnet for the command API, query every
//! responsive device, and print the inventory table.

use std::io::{self, BufRead, Write};

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use inventory_core::config::{DEFAULT_CONFIG_FILE, DEFAULT_CREDENTIALS_SECTION};
use inventory_core::ConfigSource;

use inventory_discover::config::ScanSettings;
use inventory_discover::report::build_inventory;
use inventory_discover::table::render_table;
use inventory_discover::{HttpsProbe, Subnet, SubnetScanner};

#[derive(Parser)]
#[command(name = "inventory-discover")]
#[command(about = "Discover devices exposing the JSON-RPC command API and print an inventory")]
struct Cli {
    /// Subnet to scan (CIDR notation, e.g., 192.168.56.0/24). Prompted for if omitted.
    #[arg(short, long)]
    subnet: Option<String>,

    /// INI file holding credentials and optional [scan] settings.
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: String,

    /// Section holding `user` and `password`.
    #[arg(long, default_value = DEFAULT_CREDENTIALS_SECTION)]
    section: String,

    /// Maximum probes in flight (overrides [scan] max_in_flight).
    #[arg(long)]
    max_in_flight: Option<usize>,

    /// Probe timeout in seconds (overrides [scan] probe_timeout_secs).
    #[arg(long)]
    probe_timeout_secs: Option<u64>,

    /// Validate TLS certificates instead of accepting self-signed ones.
    #[arg(long)]
    verify_certs: bool,

    /// Emit logs as JSON.
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let logs = fmt().with_env_filter(filter).with_writer(io::stderr);
    if cli.log_json {
        logs.json().init();
    } else {
        logs.init();
    }

    // Credentials are required before any network activity.
    let source = ConfigSource::load(&cli.config)?;
    let credentials = source.credentials(&cli.section)?;
    let settings = resolve_settings(&cli, &source)?;

    let subnet = match cli.subnet.as_deref() {
        Some(raw) => Subnet::parse(raw)?,
        None => prompt_subnet()?,
    };

    let probe = HttpsProbe::new(&settings.probe_config())?;
    let scanner = SubnetScanner::new(probe, settings.max_in_flight);
    let devices = scanner.scan(&subnet).await;

    if devices.is_empty() {
        println!("\nNo devices running eAPI found.");
        return Ok(());
    }

    let rows = build_inventory(
        &devices,
        &credentials,
        &settings.query_config(),
        settings.query_concurrency,
    )
    .await;
    print!("{}", render_table(&rows));

    Ok(())
}

fn resolve_settings(cli: &Cli, source: &ConfigSource) -> anyhow::Result<ScanSettings> {
    let mut settings = source.section::<ScanSettings>("scan")?.unwrap_or_default();
    if let Some(n) = cli.max_in_flight {
        settings.max_in_flight = n;
    }
    if let Some(secs) = cli.probe_timeout_secs {
        settings.probe_timeout_secs = secs;
    }
    if cli.verify_certs {
        settings.accept_invalid_certs = false;
    }
    if settings.accept_invalid_certs {
        tracing::warn!("TLS certificate validation disabled (pass --verify-certs to enable)");
    }
    Ok(settings)
}

/// Ask for a subnet on stdin until one parses.
fn prompt_subnet() -> anyhow::Result<Subnet> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    loop {
        print!("Enter subnet in CIDR format: ");
        io::stdout().flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            anyhow::bail!("No subnet entered");
        }

        match Subnet::parse(&line) {
            Ok(subnet) => return Ok(subnet),
            Err(e) => {
                tracing::debug!(error = %e, "Rejected subnet input");
                println!("Enter a valid IP subnet. Try again.");
            }
        }
    }
}
