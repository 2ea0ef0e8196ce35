use anyhow::{bail, Context};
use clap::Parser;
use log::{error, info};
use registrator::RegistryAdapter;
use registrator_core::factory::{SCHEME, SCHEME_ALIAS};
use registrator_core::{
    factory_for, parse_uri, AdapterOptions, CatalogAdapterFactory, RegistrationController,
};
use url::Url;

pub mod args;
pub mod settings;

use args::{Cli, Commands};
use settings::RegistrarConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = RegistrarConfig::load(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    )
    .init();

    let uri = parse_uri(cli.uri.as_deref().unwrap_or(&config.uri))?;
    let options = config.adapter_options();

    match &cli.command {
        Commands::Ping => {
            connect_adapter(&uri, options).await?.ping().await?;
            info!("Store reachable for {}", uri);
        }
        Commands::Register(args) => {
            connect_adapter(&uri, options)
                .await?
                .register(&args.to_instance())
                .await?;
        }
        Commands::Deregister(args) => {
            connect_adapter(&uri, options)
                .await?
                .deregister(&args.to_instance())
                .await?;
        }
        Commands::Refresh(args) => {
            connect_adapter(&uri, options)
                .await?
                .refresh(&args.to_instance())
                .await?;
        }
        Commands::Resolve(args) => {
            let controller = connect_controller(&uri, options).await?;
            let resolved = controller.resolve(&args.to_instance());
            let image = controller
                .catalog()
                .get(&resolved.service)
                .map(|service| service.get_image())
                .unwrap_or("<undeclared>");
            println!("service:  {}", resolved.service);
            println!("image:    {}", image);
            println!("details:  {}", controller.namer().details_path(&resolved.service));
            println!("instance: {}", resolved.instance_path);
        }
        Commands::Catalog => {
            let controller = connect_controller(&uri, options).await?;
            println!("# {}", controller.namer().get_root());
            for service in controller.catalog().iter() {
                println!(
                    "{}\t{}\t{}",
                    service.get_service_name(),
                    service.get_image(),
                    service.details_json()?
                );
            }
        }
    }

    Ok(())
}

/// Builds whichever adapter is published under the URI scheme.
async fn connect_adapter(
    uri: &Url,
    options: AdapterOptions,
) -> anyhow::Result<Box<dyn RegistryAdapter>> {
    let factory = factory_for(uri.scheme(), options)?;
    match factory.new_adapter(uri).await {
        Ok(adapter) => Ok(adapter),
        Err(e) => {
            if e.is_fatal() {
                error!("Refusing to start: {}", e);
            }
            Err(e.into())
        }
    }
}

/// Builds the catalog adapter itself, for the commands that inspect its catalog.
async fn connect_controller(
    uri: &Url,
    options: AdapterOptions,
) -> anyhow::Result<RegistrationController> {
    if uri.scheme() != SCHEME && uri.scheme() != SCHEME_ALIAS {
        bail!("Scheme '{}' has no catalog to inspect", uri.scheme());
    }
    Ok(CatalogAdapterFactory::new(options).connect(uri).await?)
}
