use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use samples_core::{ClientConfig, SampleClient, SampleFilter, SampleQuery, Transport, UreqTransport};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "samples-cli",
    version = env!("CARGO_PKG_VERSION"),
    about = "Query and feed the geo samples API"
)]
struct Cli {
    /// API base address (absolute origin, or a prefix such as /api); overrides SAMPLES_API_BASE
    #[arg(long, global = true)]
    base: Option<String>,
    /// Page URL a relative base is resolved against; overrides SAMPLES_PAGE_LOCATION
    #[arg(long, global = true)]
    location: Option<String>,
    /// Log requests to stderr
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List samples, newest first
    List {
        #[arg(long, default_value_t = 200)]
        limit: u32,
        #[arg(long, default_value_t = 0)]
        offset: u32,
        /// Inclusive lower time bound (ISO 8601)
        #[arg(long)]
        from_time: Option<String>,
        /// Inclusive upper time bound (ISO 8601)
        #[arg(long)]
        to_time: Option<String>,
    },
    /// Ingest one sample or a list of samples from a JSON file
    Ingest {
        /// JSON payload file, or - for stdin
        #[arg(long)]
        file: String,
    },
    /// Filter samples inside a polygon
    Filter {
        /// JSON file holding the polygon (sent as-is), or - for stdin
        #[arg(long)]
        polygon: String,
        #[arg(long)]
        from_time: Option<String>,
        #[arg(long)]
        to_time: Option<String>,
        #[arg(long, default_value_t = 5000)]
        limit: u32,
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = resolve_config(ClientConfig::from_env(), cli.base.clone(), cli.location.clone());
    let client = SampleClient::new(&config, UreqTransport::new())
        .with_context(|| format!("invalid base address {:?}", config.base_url))?;
    tracing::debug!(
        base = client.base().as_str(),
        absolute = client.base().is_absolute(),
        location = ?config.location,
        "client configured"
    );

    let result = run(&client, cli.command)?;
    print_json(&mut io::stdout().lock(), &result)
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "samples_core=debug,samples_cli=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .init();
}

/// Flags win over the environment.
fn resolve_config(env: ClientConfig, base: Option<String>, location: Option<String>) -> ClientConfig {
    ClientConfig {
        base_url: base.unwrap_or(env.base_url),
        location: location.or(env.location),
    }
}

fn run<T: Transport>(client: &SampleClient<T>, command: Command) -> Result<Value> {
    let value = match command {
        Command::List {
            limit,
            offset,
            from_time,
            to_time,
        } => client.get_samples(&SampleQuery {
            limit,
            offset,
            from_time,
            to_time,
        })?,
        Command::Ingest { file } => {
            let payload = read_json(&file)?;
            client.ingest_samples(&payload)?
        }
        Command::Filter {
            polygon,
            from_time,
            to_time,
            limit,
            offset,
        } => {
            let mut filter = SampleFilter::new(read_json(&polygon)?);
            filter.from_time = from_time;
            filter.to_time = to_time;
            filter.limit = limit;
            filter.offset = offset;
            client.filter_samples(&filter)?
        }
    };
    Ok(value)
}

fn read_json(source: &str) -> Result<Value> {
    let raw = if source == "-" {
        let mut raw = String::new();
        io::stdin()
            .read_to_string(&mut raw)
            .context("failed to read JSON from stdin")?;
        raw
    } else {
        fs::read_to_string(Path::new(source)).with_context(|| format!("failed to read {source}"))?
    };
    serde_json::from_str(&raw).with_context(|| format!("{source} is not valid JSON"))
}

fn print_json(out: &mut impl Write, value: &Value) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value).context("failed to write output")?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_environment() {
        let env = ClientConfig::new("http://env:8000").with_location("http://page/");
        let config = resolve_config(env.clone(), Some("/api".to_string()), None);
        assert_eq!(config.base_url, "/api");
        assert_eq!(config.location.as_deref(), Some("http://page/"));

        assert_eq!(resolve_config(env.clone(), None, None), env);
    }

    #[test]
    fn relative_base_flag_builds_page_relative_client() {
        let env = ClientConfig::new("http://env:8000").with_location("http://page.example/map");
        let config = resolve_config(env, Some("/api".to_string()), None);
        let client = SampleClient::new(&config, UreqTransport::new()).unwrap();
        assert_eq!(client.base().as_str(), "/api");
        assert!(!client.base().is_absolute());
        assert_eq!(
            client.api_url("samples", &[]).unwrap(),
            "http://page.example/api/samples"
        );
    }

    #[test]
    fn list_defaults_match_client_defaults() {
        let cli = Cli::try_parse_from(["samples-cli", "list"]).unwrap();
        let Command::List { limit, offset, from_time, to_time } = cli.command else {
            panic!("expected list");
        };
        let defaults = SampleQuery::default();
        assert_eq!((limit, offset), (defaults.limit, defaults.offset));
        assert!(from_time.is_none() && to_time.is_none());
    }

    #[test]
    fn filter_requires_polygon() {
        assert!(Cli::try_parse_from(["samples-cli", "filter"]).is_err());
        let cli = Cli::try_parse_from(["samples-cli", "--base", "/api", "filter", "--polygon", "p.json"]).unwrap();
        assert_eq!(cli.base.as_deref(), Some("/api"));
        let Command::Filter { limit, offset, .. } = cli.command else {
            panic!("expected filter");
        };
        assert_eq!((limit, offset), (5000, 0));
    }

    #[test]
    fn list_against_stub_server() {
        let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = std_listener.local_addr().unwrap();
        std_listener.set_nonblocking(true).unwrap();
        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async {
                let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
                mock_server::run(listener).await
            })
            .unwrap();
        });

        let config = ClientConfig::new(format!("http://{addr}"));
        let client = SampleClient::new(&config, UreqTransport::new()).unwrap();
        let cli = Cli::try_parse_from(["samples-cli", "list", "--limit", "5"]).unwrap();
        let value = run(&client, cli.command).unwrap();

        let mut out = Vec::new();
        print_json(&mut out, &value).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "[]\n");
    }

    #[test]
    fn unreadable_payload_file_is_reported() {
        let err = read_json("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
