//! Access to the study tables
//!
//! The analysis never talks to storage directly. Everything it reads goes
//! through a [`DataSource`], which hands out owned snapshots of each table.
//!
//! Two sources are provided:
//!
//! - [`JsonDataSource`]: a dataset file on disk, parsed once per snapshot
//! - [`Dataset`]: an in-memory snapshot, used by tests and generated data

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use crate::{
    dataset::{Dataset, OutcomeRecord, Participant, Session, Stimulus},
    error::DataError,
};

/// A provider of study records.
pub trait DataSource {
    /// Reads every participant record.
    fn participants(&self) -> Result<Vec<Participant>, DataError>;

    /// Reads every session record.
    fn sessions(&self) -> Result<Vec<Session>, DataError>;

    /// Reads every stimulus record.
    fn stimuli(&self) -> Result<Vec<Stimulus>, DataError>;

    /// Reads every outcome measurement.
    fn outcomes(&self) -> Result<Vec<OutcomeRecord>, DataError>;

    /// Reads all four tables together.
    ///
    /// Sources backed by a single document override this to read it once.
    fn snapshot(&self) -> Result<Dataset, DataError> {
        Ok(Dataset {
            participants: self.participants()?,
            sessions: self.sessions()?,
            stimuli: self.stimuli()?,
            outcomes: self.outcomes()?,
        })
    }
}

impl DataSource for Dataset {
    fn participants(&self) -> Result<Vec<Participant>, DataError> {
        Ok(self.participants.clone())
    }

    fn sessions(&self) -> Result<Vec<Session>, DataError> {
        Ok(self.sessions.clone())
    }

    fn stimuli(&self) -> Result<Vec<Stimulus>, DataError> {
        Ok(self.stimuli.clone())
    }

    fn outcomes(&self) -> Result<Vec<OutcomeRecord>, DataError> {
        Ok(self.outcomes.clone())
    }
}

/// A dataset stored as a JSON file.
///
/// The file is opened and closed by each read, so the source holds no open
/// handle between calls. Each table method parses the whole file; use
/// [`DataSource::snapshot`] to get every table from a single parse.
#[derive(Debug, Clone)]
pub struct JsonDataSource {
    path: PathBuf,
}

impl JsonDataSource {
    #[must_use]
    pub fn new<P>(path: P) -> Self
    where
        P: Into<PathBuf>,
    {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self, table: &'static str) -> Result<Dataset, DataError> {
        let unavailable = |reason: String| DataError::DataUnavailable { table, reason };
        let file = File::open(&self.path)
            .map_err(|e| unavailable(format!("failed to open {}: {e}", self.path.display())))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .map_err(|e| unavailable(format!("failed to parse {}: {e}", self.path.display())))
    }
}

impl DataSource for JsonDataSource {
    fn participants(&self) -> Result<Vec<Participant>, DataError> {
        Ok(self.read("participants")?.participants)
    }

    fn sessions(&self) -> Result<Vec<Session>, DataError> {
        Ok(self.read("sessions")?.sessions)
    }

    fn stimuli(&self) -> Result<Vec<Stimulus>, DataError> {
        Ok(self.read("stimuli")?.stimuli)
    }

    fn outcomes(&self) -> Result<Vec<OutcomeRecord>, DataError> {
        Ok(self.read("outcomes")?.outcomes)
    }

    fn snapshot(&self) -> Result<Dataset, DataError> {
        self.read("dataset")
    }
}
