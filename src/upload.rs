use crate::{Args, aws::MANIFEST_LOCATION, keys::key_prefix, manifest::Manifest};
use color_eyre::eyre::bail;
use futures::{StreamExt, stream::FuturesUnordered};
use s3::{Bucket, error::S3Error};
use std::path::{Path, PathBuf};
use tokio::{fs::File, io::AsyncReadExt};
use walkdir::WalkDir;

/// Frames written by the detection pass get their own sub-path.
const ANALYSIS_FRAME_SUFFIX: &str = "analyse.jpg";
const ALARM_FRAMES_SEGMENT: &str = "alarm-frames/";

struct PlannedObject {
    key: String,
    path: PathBuf,
}

fn object_key(prefix: &str, file_name: &str) -> String {
    if file_name.ends_with(ANALYSIS_FRAME_SUFFIX) {
        format!("{prefix}{ALARM_FRAMES_SEGMENT}{file_name}")
    } else {
        format!("{prefix}{file_name}")
    }
}

/// Non-recursive listing of the event directory. Every regular file becomes
/// one object, no filtering by type.
fn plan_objects(dir: &str, prefix: &str) -> color_eyre::Result<Vec<PlannedObject>> {
    let mut objects = vec![];
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        if !entry.path().is_file() {
            continue;
        }
        let Some(file_name) = entry.file_name().to_str() else {
            bail!("non UTF-8 file name in {dir:?}: {:?}", entry.file_name());
        };
        objects.push(PlannedObject {
            key: object_key(prefix, file_name),
            path: entry.path().to_path_buf(),
        });
    }
    Ok(objects)
}

async fn read_file(path: &Path) -> color_eyre::Result<Vec<u8>> {
    let mut file = File::open(path).await?;
    let mut contents = vec![];
    file.read_to_end(&mut contents).await?;
    Ok(contents)
}

async fn put_object(
    bucket: &Bucket,
    key: String,
    contents: Vec<u8>,
    content_type: String,
) -> Result<String, S3Error> {
    bucket
        .put_object_with_content_type(&key, &contents, &content_type)
        .await?;
    Ok(key)
}

/// Uploads every file of one event batch plus its manifest, each as an
/// independent request. Per-upload failures are logged and swallowed; only
/// local filesystem errors abort the batch.
pub async fn upload_batch(bucket: &Bucket, batch: &Args) -> color_eyre::Result<()> {
    let prefix = key_prefix(&batch.monitor, &batch.time, &batch.description);
    let objects = plan_objects(&batch.dir, &prefix)?;

    info!(%prefix, files = objects.len(), "Uploading event batch");

    let mut manifest = Manifest::new(objects.len() as u64, &batch.description, &prefix);

    let mut uploads = FuturesUnordered::new();
    for PlannedObject { key, path } in objects {
        let contents = read_file(&path).await?;
        let content_type = new_mime_guess::from_path(&path)
            .first_or_octet_stream()
            .essence_str()
            .to_owned();

        manifest.record_attempt();
        uploads.push(put_object(bucket, key, contents, content_type));
    }

    manifest.record_attempt();
    uploads.push(put_object(
        bucket,
        format!("{prefix}{MANIFEST_LOCATION}"),
        manifest.to_json_bytes()?,
        mime::APPLICATION_JSON.essence_str().to_owned(),
    ));

    // Drain every upload before returning so the process cannot exit with
    // requests still in flight. Outcomes stay independent of each other.
    while let Some(outcome) = uploads.next().await {
        match outcome {
            Ok(key) => info!("COMPLETED: {key}"),
            Err(e) => error!("ERROR: {e}"),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn analysis_frames_get_their_own_segment() {
        assert_eq!(object_key("p/", "00042-capture.jpg"), "p/00042-capture.jpg");
        assert_eq!(
            object_key("p/", "00042-analyse.jpg"),
            "p/alarm-frames/00042-analyse.jpg"
        );
    }

    #[test]
    fn plan_covers_every_file_once_without_recursing() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["00001-capture.jpg", "00002-capture.jpg", "00002-analyse.jpg"] {
            fs::write(dir.path().join(name), b"jpeg").unwrap();
        }
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/00003-capture.jpg"), b"jpeg").unwrap();

        let prefix = "2023-01-05/14:30_m1/";
        let mut objects = plan_objects(dir.path().to_str().unwrap(), prefix).unwrap();
        objects.sort_by(|a, b| a.key.cmp(&b.key));

        let keys: Vec<_> = objects.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(
            keys,
            [
                "2023-01-05/14:30_m1/00001-capture.jpg",
                "2023-01-05/14:30_m1/00002-capture.jpg",
                "2023-01-05/14:30_m1/alarm-frames/00002-analyse.jpg",
            ]
        );
    }

    #[test]
    fn manifest_counts_files_plus_itself() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..3 {
            fs::write(dir.path().join(format!("0000{i}-capture.jpg")), b"jpeg").unwrap();
        }

        let objects = plan_objects(dir.path().to_str().unwrap(), "p/").unwrap();
        let mut manifest = Manifest::new(objects.len() as u64, "desc", "p/");
        assert_eq!(manifest.expected, 4);

        for _ in &objects {
            manifest.record_attempt();
        }
        manifest.record_attempt();
        assert_eq!(manifest.received, manifest.expected);
    }

    #[test]
    fn plan_fails_on_missing_directory() {
        assert!(plan_objects("/definitely/not/a/dir", "p/").is_err());
    }
}
