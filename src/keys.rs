use color_eyre::eyre::bail;

/// Object labels the detection pipeline can report, in the order they are
/// appended to a key suffix. Matching is by substring, so labels must be
/// chosen to avoid overlapping each other.
pub const OBJECT_LABELS: [&str; 8] = [
    "person",
    "bicycle",
    "car",
    "motorbike",
    "bus",
    "truck",
    "dog",
    "cat",
];

/// Event start time, split out of the `YYYY-MM-DD HH:MM:SS` string ZoneMinder
/// hands us. Seconds are discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventTime {
    pub date: String,
    pub hours: String,
    pub minutes: String,
}

impl EventTime {
    pub fn parse(timestamp: &str) -> color_eyre::Result<Self> {
        let Some((date, time)) = timestamp.split_once(' ') else {
            bail!("timestamp {timestamp:?} has no space between date and time");
        };
        let Some((hours, rest)) = time.split_once(':') else {
            bail!("timestamp {timestamp:?} has no colon in its time part");
        };
        let minutes = rest.split(':').next().unwrap_or(rest);

        Ok(Self {
            date: date.to_owned(),
            hours: hours.to_owned(),
            minutes: minutes.to_owned(),
        })
    }
}

/// Key prefix grouping every object of one event batch, always with a
/// trailing slash: `{date}/{hours}:{minutes}_{monitor}{suffix}/`.
pub fn key_prefix(monitor: &str, time: &EventTime, description: &str) -> String {
    format!(
        "{}/{}:{}_{}{}/",
        time.date,
        time.hours,
        time.minutes,
        monitor,
        description_suffix(description)
    )
}

/// Scans the event description for the `Motion` marker and for each
/// recognized object label, in list order. Substring matches only, no
/// deduplication.
pub fn description_suffix(description: &str) -> String {
    let mut suffix = String::new();

    if description.contains("Motion") {
        suffix.push_str("_Motion");
    }
    for label in OBJECT_LABELS {
        if description.contains(label) {
            suffix.push('-');
            suffix.push_str(label);
        }
    }

    suffix
}
