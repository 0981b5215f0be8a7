use std::{
    fs::{self, File},
    io::{self, BufWriter, Write as _},
    path::Path,
};

use anyhow::Context;

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

/// Writes `value` as pretty JSON, replacing `path` only once the new content is complete.
pub fn write_json_file<T, P>(file_kind: &str, path: P, value: &T) -> anyhow::Result<()>
where
    T: serde::Serialize + ?Sized,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let tmp_path = path.with_extension("json.tmp");
    let file = File::create(&tmp_path).with_context(|| {
        format!(
            "Failed to create {} file: {}",
            file_kind,
            tmp_path.display()
        )
    })?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .with_context(|| format!("Failed to write {} file: {}", file_kind, tmp_path.display()))?;
    writeln!(writer)
        .and_then(|()| writer.flush())
        .with_context(|| format!("Failed to write {} file: {}", file_kind, tmp_path.display()))?;
    drop(writer);

    fs::rename(&tmp_path, path).with_context(|| {
        format!(
            "Failed to move {} file into place: {}",
            file_kind,
            path.display()
        )
    })?;
    Ok(())
}

pub fn print_json<T>(value: &T) -> anyhow::Result<()>
where
    T: serde::Serialize + ?Sized,
{
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value).context("Failed to write JSON to stdout")?;
    writeln!(stdout).context("Failed to write JSON to stdout")?;
    Ok(())
}

/// Seed derived from the wall clock, for runs that were not given one.
#[expect(clippy::cast_sign_loss)]
pub fn clock_seed() -> u64 {
    let now = chrono::Utc::now();
    now.timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp()) as u64
}
