use std::{
    fs::File,
    io::{self, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use xpstat_analysis::{
    config::AnalysisConfig, frame::Frame, source::JsonDataSource, study::StudyData,
};
use xpstat_stats::Estimate;

/// Where a command writes its JSON or CSV output
#[derive(Debug)]
pub enum Output {
    Stdout(StdoutLock<'static>),
    File {
        path: PathBuf,
        writer: BufWriter<File>,
    },
}

impl Output {
    /// Serializes `value` as pretty JSON to `path`, or to stdout if `None`.
    pub fn save_json<T>(value: &T, path: Option<PathBuf>) -> anyhow::Result<()>
    where
        T: serde::Serialize + ?Sized,
    {
        Self::create(path)?.json(value)
    }

    /// Creates the file at `path` with any missing parent directories, or
    /// locks stdout if `path` is `None`.
    pub fn create(path: Option<PathBuf>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::Stdout(io::stdout().lock()));
        };
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
        let file = File::create(&path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Self::File {
            path,
            writer: BufWriter::new(file),
        })
    }

    fn target(&self) -> String {
        match self {
            Self::Stdout(_) => "stdout".to_owned(),
            Self::File { path, .. } => path.display().to_string(),
        }
    }

    pub fn json<T>(mut self, value: &T) -> anyhow::Result<()>
    where
        T: serde::Serialize + ?Sized,
    {
        serde_json::to_writer_pretty(&mut self, value)
            .with_context(|| format!("Failed to write JSON to {}", self.target()))?;
        self.line("")?;
        self.finish()
    }

    /// Writes a CSV document: `header`, then one line per row.
    pub fn csv<I>(mut self, header: &str, rows: I) -> anyhow::Result<()>
    where
        I: IntoIterator<Item = String>,
    {
        self.line(header)?;
        for row in rows {
            self.line(&row)?;
        }
        self.finish()
    }

    fn line(&mut self, text: &str) -> anyhow::Result<()> {
        writeln!(self, "{text}").with_context(|| format!("Failed to write to {}", self.target()))
    }

    fn finish(mut self) -> anyhow::Result<()> {
        self.flush()
            .with_context(|| format!("Failed to flush output to {}", self.target()))
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Stdout(out) => out.write(buf),
            Self::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Stdout(out) => out.flush(),
            Self::File { writer, .. } => writer.flush(),
        }
    }
}

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

/// A loaded study with its analysis frame
#[derive(Debug)]
pub struct Study {
    pub data: StudyData,
    pub frame: Frame,
}

/// Load and validate a dataset file, then build the analysis frame
///
/// # Errors
///
/// Returns error if the file cannot be read, fails validation, or has
/// inconsistent outcome variables
pub fn load_study<P>(path: P, config: &AnalysisConfig) -> anyhow::Result<Study>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    tracing::info!("Loading dataset from {}", path.display());
    let source = JsonDataSource::new(path);
    let data = StudyData::load(&source, config)
        .with_context(|| format!("Failed to load dataset: {}", path.display()))?;
    let frame = Frame::from_study(&data)
        .with_context(|| format!("Failed to build analysis frame: {}", path.display()))?;
    tracing::info!(
        "Loaded {} participants, {} sessions, {} stimuli",
        data.participants().len(),
        data.sessions().len(),
        data.stimuli().len()
    );
    Ok(Study { data, frame })
}

/// Format a p-value for display
pub fn format_p(p: f64) -> String {
    if p < 0.0001 {
        format!("{p:.2e}")
    } else {
        format!("{p:.4}")
    }
}

/// Format an estimate with `f`, or the reason it is undefined
pub fn format_estimate<T, F>(estimate: &Estimate<T>, f: F) -> String
where
    F: FnOnce(&T) -> String,
{
    match estimate {
        Estimate::Defined(value) => f(value),
        Estimate::Undefined { reason } => format!("undefined ({reason})"),
    }
}

/// Print a section title underlined to its width
pub fn print_heading(title: &str) {
    println!("{title}");
    println!("{}", "=".repeat(title.chars().count()));
}

#[cfg(test)]
mod tests {
    use std::{env, fs, process};

    use xpstat_stats::UndefinedReason;

    use super::*;

    #[test]
    fn test_csv_creates_parent_directories() {
        let dir = env::temp_dir().join(format!("xpstat-output-{}", process::id()));
        let path = dir.join("nested").join("points.csv");
        Output::create(Some(path.clone()))
            .unwrap()
            .csv("x,y", ["1,2".to_owned(), "3,4".to_owned()])
            .unwrap();
        let written = fs::read_to_string(&path).unwrap();
        fs::remove_dir_all(&dir).unwrap();
        assert_eq!(written, "x,y\n1,2\n3,4\n");
    }

    #[test]
    fn test_save_json_to_file() {
        let path = env::temp_dir().join(format!("xpstat-output-{}.json", process::id()));
        Output::save_json(&[1, 2], Some(path.clone())).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(serde_json::from_str::<Vec<i32>>(&written).unwrap(), [1, 2]);
        assert!(written.ends_with('\n'));
    }

    #[test]
    fn test_format_p() {
        assert_eq!(format_p(0.05), "0.0500");
        assert_eq!(format_p(0.000_012_3), "1.23e-5");
    }

    #[test]
    fn test_format_estimate() {
        let defined = Estimate::Defined(0.5);
        assert_eq!(format_estimate(&defined, |v| format!("{v:.1}")), "0.5");
        let undefined = Estimate::<f64>::undefined(UndefinedReason::ConstantInput);
        assert_eq!(
            format_estimate(&undefined, |v| format!("{v:.1}")),
            "undefined (input is constant)"
        );
    }
}
