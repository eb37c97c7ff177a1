mod commands;
mod status;

use clap::{builder::NonEmptyStringValueParser, Parser};
use purge_core::{AwsConnector, Connector, PurgeConfig};
use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::status::Status;

#[derive(Parser, Debug)]
#[command(name = "s3-purge")]
#[command(about = "Delete every object version and delete marker from an S3 bucket", long_about = None)]
struct Cli {
    /// Target bucket name
    #[arg(short, long, value_parser = NonEmptyStringValueParser::new())]
    bucket: String,

    /// Named credential profile to use instead of the default credential chain
    #[arg(short, long)]
    profile: Option<String>,

    /// Delete the bucket once it is empty
    #[arg(short = 'd', long = "delete_bucket")]
    delete_bucket: bool,

    /// Region override
    #[arg(long)]
    region: Option<String>,

    /// Custom endpoint for S3-compatible services (MinIO/LocalStack/etc)
    #[arg(long, env = "AWS_ENDPOINT_URL")]
    endpoint_url: Option<String>,
}

impl Cli {
    fn config(&self) -> PurgeConfig {
        PurgeConfig::new(self.bucket.clone())
            .with_profile(self.profile.clone())
            .with_delete_bucket(self.delete_bucket)
    }

    fn connector(&self) -> AwsConnector {
        AwsConnector {
            region: self.region.clone(),
            endpoint_url: self.endpoint_url.clone(),
        }
    }
}

async fn launch<I, T, C, F>(args: I, connect: F, out: &mut impl Write) -> Status
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    C: Connector + 'static,
    C::Store: 'static,
    F: FnOnce(&Cli) -> C,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => {
            if err.print().is_err() {
                return Status::Unexpected;
            }
            return Status::Parser(err.exit_code());
        }
    };

    let connector = connect(&cli);
    let result = commands::purge::execute(cli.config(), connector).await;
    status::report(&result, out)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Logs go to stderr; stdout only ever carries a storage error code
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "s3_purge=warn,purge_core=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    launch(std::env::args_os(), Cli::connector, &mut std::io::stdout())
        .await
        .into()
}
