use color_eyre::eyre::eyre;
use s3::{Bucket, Region, creds::Credentials};
use std::env;

pub const MANIFEST_LOCATION: &str = "manifest.json";

pub fn get_bucket() -> color_eyre::Result<Box<Bucket>> {
    let bucket_name = env::var("BUCKET_NAME").map_err(|_| {
        let environment: Vec<String> = env::vars().map(|(k, v)| format!("  {k}={v}")).collect();
        eyre!(
            "no BUCKET_NAME environment variable, current environment:\n{}",
            environment.join("\n")
        )
    })?;
    let endpoint = env::var("AWS_ENDPOINT_URL_S3")
        .map_err(|_| eyre!("expected env var AWS_ENDPOINT_URL_S3"))?;
    let region = Region::Custom {
        region: "auto".to_owned(),
        endpoint,
    };
    Ok(Bucket::new(&bucket_name, region, get_aws_creds()?)?)
}

fn get_aws_creds() -> color_eyre::Result<Credentials> {
    let access_key =
        env::var("AWS_ACCESS_KEY_ID").map_err(|_| eyre!("expected env var AWS_ACCESS_KEY_ID"))?;
    let secret_key = env::var("AWS_SECRET_ACCESS_KEY")
        .map_err(|_| eyre!("expected env var AWS_SECRET_ACCESS_KEY"))?;

    Ok(Credentials::new(
        Some(&access_key),
        Some(&secret_key),
        None,
        None,
        None,
    )?)
}
