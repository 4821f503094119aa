use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use modem_core::device::{self, DeviceDescriptor, DeviceTable, KernelDevice};
use modem_core::modes::{ModeRequest, ModeSet, load_supported_modes, modem_mode_any};
use modem_core::protocol::{self, IpConfigQuery};
use modem_core::session::{ModemSession, SessionConfig};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about = "u-blox / MBIM modem capability tool", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a single AT reply
    Parse {
        #[arg(value_enum)]
        kind: ReplyKind,
        /// Reply text, e.g. '+CFUN: 1,0'
        reply: String,
    },
    /// Show the combinations a +URAT=? reply allows for a model
    Modes {
        /// Device model, e.g. TOBY-L201
        #[arg(long)]
        model: Option<String>,
        reply: String,
    },
    /// Encode a +URAT= set command
    SetRat {
        /// Allowed technologies, e.g. '2g,3g' or 'any'
        #[arg(long)]
        allowed: ModeSet,
        /// Preferred technology
        #[arg(long, default_value = "none")]
        preferred: ModeSet,
    },
    /// List modem device candidates
    Devices {
        /// Include devices flagged for manual scans only
        #[arg(long)]
        manual: bool,
        /// Read devices from a TOML table instead of the USB bus
        #[arg(long)]
        table: Option<PathBuf>,
        /// Only USB devices of this vendor (hex)
        #[arg(long, value_parser = parse_hex_u16)]
        vendor: Option<u16>,
    },
    /// Run a dry-run bring-up against scripted ports
    Simulate {
        /// Session configuration (TOML)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Write the effective configuration here and exit
        #[arg(long)]
        save_config: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ReplyKind {
    Pin,
    UsbProfile,
    NetMode,
    IpConfig,
    Power,
    UratTest,
    UratRead,
}

fn parse_hex_u16(s: &str) -> Result<u16, String> {
    let digits = s.trim_start_matches("0x").trim_start_matches("0X");
    u16::from_str_radix(digits, 16).map_err(|e| format!("invalid hex id '{s}': {e}"))
}

fn parse_reply(kind: ReplyKind, reply: &str) -> Result<()> {
    match kind {
        ReplyKind::Pin => {
            let counts = protocol::parse_upincnt_response(reply)?;
            println!(
                "PIN: {}  PIN2: {}  PUK: {}  PUK2: {}",
                counts.pin, counts.pin2, counts.puk, counts.puk2
            );
        }
        ReplyKind::UsbProfile => {
            println!("{:?}", protocol::parse_uusbconf_response(reply)?);
        }
        ReplyKind::NetMode => {
            println!("{:?}", protocol::parse_ubmconf_response(reply)?);
        }
        ReplyKind::IpConfig => {
            let config = protocol::parse_uipaddr_response(reply, IpConfigQuery::all())?;
            let show = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".into());
            println!("cid:        {}", config.cid.map_or("-".into(), |c| c.to_string()));
            println!("interface:  {}", show(&config.if_name));
            println!("ipv4:       {}", show(&config.ipv4_address));
            println!("ipv4 mask:  {}", show(&config.ipv4_subnet));
            println!("ipv6:       {}", show(&config.ipv6_global_address));
            println!("ipv6 link:  {}", show(&config.ipv6_link_local_address));
        }
        ReplyKind::Power => {
            println!("{:?}", protocol::parse_cfun_response(reply)?);
        }
        ReplyKind::UratTest => {
            for combination in protocol::parse_urat_test_response(reply)? {
                println!("{combination}");
            }
        }
        ReplyKind::UratRead => {
            println!("{}", protocol::parse_urat_read_response(reply)?);
        }
    }
    Ok(())
}

fn show_modes(model: Option<&str>, reply: &str) -> Result<()> {
    let combinations = load_supported_modes(model, reply)?;
    for combination in &combinations {
        println!("{combination}");
    }
    match modem_mode_any(&combinations) {
        Ok(any) => {
            let command = protocol::build_set_current_modes_command(&combinations, ModeRequest::Any)?;
            println!("any: {any} ({command})");
        }
        Err(e) => println!("any: unavailable ({e})"),
    }
    Ok(())
}

fn print_device(device: &DeviceDescriptor) {
    println!(
        "{:<8} {:<12} {:04x}:{:04x}  uid={}  driver={}",
        device.subsystem(),
        device.name(),
        device.physdev_vid(),
        device.physdev_pid(),
        device.physdev_uid().unwrap_or("-"),
        device.driver().unwrap_or("-"),
    );
}

fn list_devices(manual: bool, table: Option<PathBuf>, vendor: Option<u16>) -> Result<()> {
    let devices = match table {
        Some(path) => DeviceTable::load_from_file(path)?.devices,
        None => device::enumerate(vendor)?,
    };

    let candidates: Vec<_> = devices.iter().filter(|d| d.is_candidate(manual)).collect();
    info!(total = devices.len(), candidates = candidates.len(), "Device scan done");
    for device in candidates {
        print_device(device);
    }
    Ok(())
}

async fn simulate(config: Option<PathBuf>, save_config: Option<PathBuf>) -> Result<()> {
    let config = match config {
        Some(path) => SessionConfig::load_from_file(path)?,
        None => SessionConfig::default(),
    };
    if let Some(path) = save_config {
        config.save_to_file(&path)?;
        info!(path = %path.display(), "Configuration written");
        return Ok(());
    }

    let report = ModemSession::new(config).run().await?;

    println!("state:       {}", report.state);
    if let Some(power) = report.power_state {
        println!("power:       {power:?}");
    }
    if let Some(current) = report.current_modes {
        println!("current:     {current}");
    }
    if let Some(port) = &report.sim_port {
        println!("sim port:    {port}");
    }
    println!("supported:   {} combinations", report.supported_modes.len());
    for combination in &report.supported_modes {
        println!("  {combination}");
    }
    for diagnostic in &report.diagnostics {
        println!("diagnostic:  {diagnostic}");
    }
    Ok(())
}

async fn run(args: Args) -> Result<()> {
    match args.command {
        Command::Parse { kind, reply } => parse_reply(kind, &reply),
        Command::Modes { model, reply } => show_modes(model.as_deref(), &reply),
        Command::SetRat { allowed, preferred } => {
            println!("{}", protocol::build_urat_set_command(allowed, preferred)?);
            Ok(())
        }
        Command::Devices {
            manual,
            table,
            vendor,
        } => list_devices(manual, table, vendor),
        Command::Simulate {
            config,
            save_config,
        } => simulate(config, save_config).await,
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(if args.verbose {
                    tracing::Level::DEBUG.into()
                } else {
                    tracing::Level::INFO.into()
                })
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    if let Err(e) = run(args).await {
        error!("Error: {:#}", e);
        std::process::exit(1);
    }
}
