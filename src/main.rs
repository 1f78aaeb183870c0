#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]

use crate::command::{page, school};
use crate::configuration::{Configuration, ObservabilityConfig};
use argh::FromArgs;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::{SpanExporter, WithExportConfig};
use opentelemetry_sdk::trace::{RandomIdGenerator, Sampler, SdkTracerProvider};
use opentelemetry_sdk::Resource;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

mod cache;
mod command;
mod configuration;
mod document_store;
mod instrumentation;
mod kv_store;
mod web;

fn set_tracing(config: Option<ObservabilityConfig>) -> Result<(), configuration::Error> {
    if let Some(ObservabilityConfig {
        tracing: Some(tracing_config),
    }) = config
    {
        let resource = Resource::builder()
            .with_service_name(env!("CARGO_PKG_NAME"))
            .with_attribute(KeyValue::new("service.version", env!("CARGO_PKG_VERSION")))
            .build();
        let otlp_exporter = SpanExporter::builder()
            .with_tonic()
            .with_endpoint(&tracing_config.endpoint)
            .with_timeout(std::time::Duration::from_secs(10))
            .build()?;

        let tracer_provider = SdkTracerProvider::builder()
            .with_batch_exporter(otlp_exporter)
            .with_id_generator(RandomIdGenerator::default())
            .with_resource(resource)
            .with_sampler(Sampler::TraceIdRatioBased(tracing_config.sampling_rate))
            .build();

        let tracer = tracer_provider.tracer(env!("CARGO_PKG_NAME"));
        let _ = global::set_tracer_provider(tracer_provider);
        let telemetry = tracing_opentelemetry::layer().with_tracer(tracer);

        let _ = tracing_subscriber::registry()
            .with(EnvFilter::from_default_env())
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .with(telemetry)
            .try_init();
    } else {
        let _ = tracing_subscriber::registry()
            .with(EnvFilter::from_default_env())
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init();
    }
    Ok(())
}

#[derive(FromArgs, PartialEq, Debug)]
/// Call-recording cache, memoized page fetches and school documents
struct GlobalArguments {
    #[argh(option, short = 'c', default = "String::from(\"config.toml\")")]
    /// the path to the configuration file, defaults to `config.toml`
    config: String,

    #[argh(subcommand)]
    subcommand: SubCommand,
}

#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand)]
enum SubCommand {
    Store(command::cache::StoreOptions),
    Get(command::cache::GetOptions),
    Replay(command::cache::ReplayOptions),
    GetPage(page::Options),
    School(school::Options),
}

fn main() -> Result<(), command::Error> {
    let cli_args: GlobalArguments = argh::from_env();

    let config = Configuration::load(&cli_args.config)?;

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to create Tokio runtime")
        .block_on(run_command(cli_args, config))
}

async fn run_command(
    cli_args: GlobalArguments,
    config: Configuration,
) -> Result<(), command::Error> {
    set_tracing(config.observability.clone())?;

    match cli_args.subcommand {
        SubCommand::Store(options) => {
            let command =
                command::cache::Command::new(&config.key_value_store, &config.cache).await?;
            println!("{}", command.store(&options).await?);
        }
        SubCommand::Get(options) => {
            let command =
                command::cache::Command::new(&config.key_value_store, &config.cache).await?;
            match command.get(&options).await? {
                Some(value) => println!("{value}"),
                None => println!("(nil)"),
            }
        }
        SubCommand::Replay(options) => {
            let command =
                command::cache::Command::new(&config.key_value_store, &config.cache).await?;
            println!("{}", command.replay(&options).await?);
        }
        SubCommand::GetPage(options) => {
            let command =
                page::Command::new(&config.key_value_store, &config.page_cache, &config.http)?;
            println!("{}", command.run(&options).await?);
        }
        SubCommand::School(options) => {
            let command = school::Command::new(&config.document_store).await?;
            for line in command.run(&options).await? {
                println!("{line}");
            }
        }
    }

    Ok(())
}
