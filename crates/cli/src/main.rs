//! # zonequery
//!
//! Sends one query to every authoritative server of a zone and reports
//! each answer side by side.

mod bootstrap;
mod di;
mod event;
mod output;

use anyhow::Context;
use clap::{ArgAction, Parser};
use std::time::Duration;
use tracing::info;
use zonequery_domain::config::QueryConfig;
use zonequery_domain::{
    ClientSubnet, DomainError, IpVersion, QueryOptions, RecordType, Section, ZoneQuery,
};

#[derive(Parser, Debug)]
#[command(name = "zonequery")]
#[command(version)]
#[command(about = "Query all authoritative servers of a zone")]
struct Cli {
    /// Zone whose NS set is queried
    #[arg(required_unless_present = "event")]
    zone: Option<String>,

    /// Query name
    #[arg(required_unless_present = "event")]
    qname: Option<String>,

    /// Query type (mnemonic or TYPEnnn)
    #[arg(required_unless_present = "event")]
    qtype: Option<String>,

    /// Use IPv4 transport only
    #[arg(short = '4', conflicts_with = "ipv6")]
    ipv4: bool,

    /// Use IPv6 transport only
    #[arg(short = '6')]
    ipv6: bool,

    /// EDNS buffer size in octets
    #[arg(long, value_name = "N", conflicts_with = "noedns")]
    bufsize: Option<u16>,

    /// Don't use EDNS
    #[arg(long)]
    noedns: bool,

    /// Send NSID EDNS option
    #[arg(long)]
    nsid: bool,

    /// EDNS Client Subnet (e.g. 1.2.3.4/24)
    #[arg(long, value_name = "ADDR/LEN")]
    subnet: Option<String>,

    /// Set DNSSEC-OK bit in queries
    #[arg(long)]
    dnssec: bool,

    /// Per-attempt timeout in seconds
    #[arg(long, value_name = "N")]
    timeout: Option<u64>,

    /// Number of UDP attempts
    #[arg(long, value_name = "N")]
    retries: Option<u8>,

    /// Do not fall back to TCP on truncation
    #[arg(long)]
    notcpfallback: bool,

    /// Use TCP only
    #[arg(long)]
    tcp: bool,

    /// Response section to display
    #[arg(long, value_name = "NAME", value_parser = ["answer", "authority", "additional", "all"])]
    section: Option<String>,

    /// Emit abbreviated text output (default is JSON)
    #[arg(long)]
    text: bool,

    /// Increase output verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Maximum number of targets queried at once
    #[arg(long, value_name = "N")]
    concurrency: Option<usize>,

    /// Destination port
    #[arg(long, value_name = "N")]
    port: Option<u16>,

    /// TOML config file
    #[arg(long, value_name = "PATH")]
    config: Option<String>,

    /// Run a serverless JSON event file instead of positional arguments
    #[arg(long, value_name = "PATH", conflicts_with_all = ["zone", "qname", "qtype"])]
    event: Option<String>,
}

impl Cli {
    /// Flags override config file values, which override built-in defaults.
    fn apply_overrides(&self, query_config: &mut QueryConfig) {
        if let Some(timeout) = self.timeout {
            query_config.timeout = timeout;
        }
        if let Some(retries) = self.retries {
            query_config.retries = retries;
        }
        if let Some(bufsize) = self.bufsize {
            query_config.bufsize = bufsize;
        }
        if let Some(concurrency) = self.concurrency {
            query_config.concurrency = concurrency;
        }
        if let Some(port) = self.port {
            query_config.port = port;
        }
    }

    fn ip_version(&self) -> IpVersion {
        match (self.ipv4, self.ipv6) {
            (true, _) => IpVersion::V4Only,
            (_, true) => IpVersion::V6Only,
            _ => IpVersion::Both,
        }
    }

    fn to_query(&self, query_config: &QueryConfig) -> Result<ZoneQuery, DomainError> {
        let missing = |what: &str| DomainError::InvalidOption(format!("missing {}", what));
        let zone = self.zone.as_deref().ok_or_else(|| missing("zone"))?;
        let qname = self.qname.as_deref().ok_or_else(|| missing("qname"))?;
        let qtype: RecordType = self
            .qtype
            .as_deref()
            .ok_or_else(|| missing("qtype"))?
            .parse()
            .map_err(DomainError::InvalidRecordType)?;

        let client_subnet = self
            .subnet
            .as_deref()
            .map(str::parse::<ClientSubnet>)
            .transpose()?;
        let section = self
            .section
            .as_deref()
            .map(str::parse::<Section>)
            .transpose()?
            .unwrap_or_default();

        let options = QueryOptions {
            edns_bufsize: (!self.noedns).then_some(query_config.bufsize),
            nsid: self.nsid,
            client_subnet,
            dnssec_ok: self.dnssec,
            timeout: Duration::from_secs(query_config.timeout),
            retries: query_config.retries,
            tcp_fallback: !self.notcpfallback,
            tcp_only: self.tcp,
            ip_version: self.ip_version(),
            section,
        };

        ZoneQuery::new(zone, qname, qtype, options)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = bootstrap::load_config(cli.config.as_deref(), |config| {
        cli.apply_overrides(&mut config.query)
    })?;

    bootstrap::init_logging(&config.logging, cli.verbose);
    info!(
        config_file = cli.config.as_deref().unwrap_or("default"),
        timeout = config.query.timeout,
        retries = config.query.retries,
        concurrency = config.query.concurrency,
        port = config.query.port,
        "Configuration loaded"
    );

    let use_case = di::build_use_case(&config.query)?;

    if let Some(path) = &cli.event {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read event file {}", path))?;
        let event: serde_json::Value =
            serde_json::from_str(&raw).with_context(|| format!("invalid event JSON in {}", path))?;
        let result = event::handle_event(&use_case, event, &config.query).await?;
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let query = cli.to_query(&config.query)?;
    let batch = use_case.execute(query).await?;

    if cli.text {
        println!("{}", output::render_text(&batch));
    } else {
        println!("{}", output::render_json(&batch)?);
    }

    Ok(())
}
