use clap::{Args, Parser, Subcommand};
use registrator::ServiceInstance;
use std::path::PathBuf;
use std::time::Duration;

/// Registers running service instances against a catalog of declared services.
#[derive(Parser, Debug)]
#[command(name = "registrar")]
#[command(about = "Service registration against a declared-service catalog", long_about = None)]
pub struct Cli {
    /// Path to the configuration file (optional).
    #[arg(short, long, global = true, default_value = "registrar.toml")]
    pub config: PathBuf,

    /// Connection URI, e.g. etcdcatalog://10.0.0.1:2379. Overrides the configuration.
    #[arg(short, long, global = true)]
    pub uri: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check that the store is reachable.
    Ping,
    /// Register an instance under its service.
    Register(InstanceArgs),
    /// Remove an instance.
    Deregister(InstanceArgs),
    /// Re-register an instance, restarting its TTL.
    Refresh(InstanceArgs),
    /// Print where an instance would be registered, without writing.
    Resolve(InstanceArgs),
    /// List the declared services.
    Catalog,
}

/// The runtime facts describing one instance.
#[derive(Args, Debug, Clone)]
pub struct InstanceArgs {
    /// Instance name, possibly suffixed with `-<exposed port>`.
    #[arg(long)]
    pub name: String,

    /// Unique instance identifier.
    #[arg(long)]
    pub id: String,

    /// Address the instance is reachable on.
    #[arg(long)]
    pub ip: String,

    /// Port the instance is reachable on.
    #[arg(long)]
    pub port: u16,

    /// Registration time-to-live in seconds (0 disables expiry).
    #[arg(long, default_value_t = 30)]
    pub ttl: u64,

    /// Container port the instance was exposed from.
    #[arg(long, default_value = "")]
    pub exposed_port: String,
}

impl InstanceArgs {
    pub fn to_instance(&self) -> ServiceInstance {
        ServiceInstance::new(
            self.name.as_str(),
            self.id.as_str(),
            self.ip.as_str(),
            self.port,
            Duration::from_secs(self.ttl),
            self.exposed_port.as_str(),
        )
    }
}
