use anyhow::Result;
use clap::{Arg, Command};
use fund_me_descriptor::{
    config::Config, contract::registry::DescriptorRegistry, server::DescriptorServer,
};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries MCP frames and one-shot output, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let matches = Command::new("fund-me-descriptor")
        .version("0.1.0")
        .about("Address and ABI of the Fund Me contract, per network")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Path to configuration file"),
        )
        .arg(
            Arg::new("network")
                .short('n')
                .long("network")
                .value_name("NETWORK")
                .help("Default network to use (anvil, anvil-legacy, zksync)"),
        )
        .arg(
            Arg::new("address")
                .short('a')
                .long("address")
                .value_name("ADDRESS")
                .help("Contract address for the default network"),
        )
        .arg(
            Arg::new("print-descriptor")
                .long("print-descriptor")
                .help("Print the descriptor of the default network as JSON and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .help("Generate a sample configuration file and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config-path")
                .long("config-path")
                .help("Print the default configuration file path and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    if matches.get_flag("generate-config") {
        println!("{}", Config::generate_sample());
        return Ok(());
    }

    if matches.get_flag("config-path") {
        match Config::default_config_path() {
            Ok(path) => {
                println!("{}", path.display());
                return Ok(());
            }
            Err(e) => {
                error!("Could not determine default config path: {}", e);
                return Err(e);
            }
        }
    }

    let config_path = matches.get_one::<String>("config").map(|s| s.as_str());
    let mut config = Config::load(config_path).await?;

    // Command line arguments win over the environment, which wins over the file
    let network = matches
        .get_one::<String>("network")
        .cloned()
        .or_else(|| std::env::var("FUND_ME_NETWORK").ok());
    let address = matches
        .get_one::<String>("address")
        .cloned()
        .or_else(|| std::env::var("FUND_ME_ADDRESS").ok());
    config.apply_overrides(network, address);

    let registry = DescriptorRegistry::from_config(&config).await?;

    if matches.get_flag("print-descriptor") {
        let descriptor = registry.get(None)?;
        println!("{}", serde_json::to_string_pretty(descriptor)?);
        return Ok(());
    }

    info!("Default network: {}", registry.default_network());
    info!(
        "Known networks: {}",
        registry.available_networks().join(", ")
    );

    let server = DescriptorServer::new(registry);

    if let Err(e) = server.run().await {
        error!("Server error: {}", e);
        return Err(e);
    }

    Ok(())
}
