use crate::{keys::EventTime, upload::upload_batch};
use color_eyre::owo_colors::OwoColorize;
use std::env::args;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod aws;
mod keys;
mod manifest;
mod upload;

#[macro_use]
extern crate tracing;

pub fn setup() {
    if cfg!(debug_assertions) {
        for (key, value) in &[
            ("RUST_SPANTRACE", "full"),
            ("RUST_LIB_BACKTRACE", "full"),
            ("RUST_BACKTRACE", "full"),
            ("RUST_LOG", "info"),
        ] {
            match std::env::var(key) {
                Err(_) => unsafe {
                    std::env::set_var(key, value);
                },
                Ok(found) => {
                    trace!(%key, %found, "Found existing env var");
                }
            }
        }
    }

    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Error finding env vars: {e:?}")
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    color_eyre::install().expect("unable to install color-eyre");
}

/// One event batch, parsed from the four positional arguments.
pub struct Args {
    pub time: EventTime,
    pub monitor: String,
    pub description: String,
    pub dir: String,
}

impl Args {
    pub fn parse() -> Self {
        let mut args = args().skip(1);

        if let (Some(timestamp), Some(monitor), Some(description), Some(dir)) =
            (args.next(), args.next(), args.next(), args.next())
        {
            match EventTime::parse(&timestamp) {
                Ok(time) => {
                    return Self {
                        time,
                        monitor,
                        description,
                        dir,
                    };
                }
                Err(e) => eprintln!("invalid {}: {e}", "[TIMESTAMP]".blue()),
            }
        } else {
            eprintln!("expected 4 arguments");
        }

        eprintln!();
        eprintln!(
            "{} uploads one ZoneMinder event directory to an S3 bucket",
            "zm-upload".bold()
        );
        eprintln!();
        eprintln!(
            "Usage: {} {} {} {} {}",
            "zm-upload".bold(),
            "[TIMESTAMP]".blue(),
            "[MONITOR]".blue(),
            "[DESCRIPTION]".blue(),
            "[DIR]".blue()
        );
        eprintln!();
        eprintln!(
            "  {} - event start time, {}",
            "[TIMESTAMP]".blue(),
            "YYYY-MM-DD HH:MM:SS".italic()
        );
        eprintln!("  {} - name of the capturing monitor", "[MONITOR]".blue());
        eprintln!(
            "  {} - event cause text, scanned for {} and detected object labels",
            "[DESCRIPTION]".blue(),
            "Motion".italic()
        );
        eprintln!(
            "  {} - directory holding the event's frames",
            "[DIR]".blue()
        );
        eprintln!();
        eprintln!(
            "  eg. `{}`",
            "zm-upload \"2023-01-05 14:30:00\" monitor1 \"Motion: car\" ./events/12345".cyan()
        );
        eprintln!();
        eprintln!("{}", "Environment Variables".underline());
        eprintln!("{} - the name of the S3 bucket", "BUCKET_NAME".green());
        eprintln!(
            "{} - the secret key ID for the S3 bucket",
            "AWS_ACCESS_KEY_ID".green()
        );
        eprintln!(
            "{} - the secret access key for the S3 bucket",
            "AWS_SECRET_ACCESS_KEY".green()
        );
        eprintln!(
            "{} - the endpoint of the S3 bucket",
            "AWS_ENDPOINT_URL_S3".green()
        );

        std::process::exit(1);
    }
}

async fn run(batch: Args) -> color_eyre::Result<()> {
    let bucket = aws::get_bucket()?;
    upload_batch(&bucket, &batch).await
}

fn main() {
    let args = Args::parse();
    setup();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("unable to build runtime");

    runtime.block_on(async move {
        if let Err(e) = run(args).await {
            error!(?e, "Error uploading event batch");
            std::process::exit(1);
        }
    });
}
