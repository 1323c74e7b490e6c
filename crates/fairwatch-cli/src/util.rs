use std::{
    fs::File,
    io::{self, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;

#[derive(Debug)]
pub enum Output {
    Stdout {
        writer: StdoutLock<'static>,
    },
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    pub fn from_output_path(output_path: Option<PathBuf>) -> anyhow::Result<Self> {
        match output_path {
            Some(path) => Output::open(path),
            None => Ok(Output::stdout()),
        }
    }

    pub fn stdout() -> Self {
        Output::Stdout {
            writer: io::stdout().lock(),
        }
    }

    pub fn open(path: PathBuf) -> anyhow::Result<Self> {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn display_path(&self) -> String {
        match self {
            Output::Stdout { .. } => "stdout".to_string(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout { writer } => writer.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout { writer } => writer.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

/// Writes rows as a CSV table to stdout or a file.
pub fn save_csv<T, I>(rows: I, output_path: Option<PathBuf>) -> anyhow::Result<()>
where
    T: serde::Serialize,
    I: IntoIterator<Item = T>,
{
    let mut output = Output::from_output_path(output_path)?;
    let target = output.display_path();
    let mut writer = csv::Writer::from_writer(&mut output);
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("Failed to write CSV row to {target}"))?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to flush CSV output to {target}"))?;
    drop(writer);
    output
        .flush()
        .with_context(|| format!("Failed to flush output to {target}"))?;
    Ok(())
}

/// Reads a whole CSV table.
pub fn read_csv_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<Vec<T>>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;
    csv::Reader::from_reader(io::BufReader::new(file))
        .deserialize()
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| {
            format!(
                "Failed to parse {} CSV file: {}",
                file_kind,
                path.display()
            )
        })
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Row {
        name: String,
        value: f64,
    }

    #[test]
    fn test_csv_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.csv");
        let rows = vec![
            Row {
                name: "a".to_owned(),
                value: 1.5,
            },
            Row {
                name: "b".to_owned(),
                value: -2.0,
            },
        ];
        save_csv(&rows, Some(path.clone())).unwrap();
        let read: Vec<Row> = read_csv_file("test", &path).unwrap();
        assert_eq!(read, rows);
    }
}
