// src/session.rs

use log::warn;
use std::path::Path;
use std::sync::Arc;

use crate::data_input::log_data::LogDataset;
use crate::error::ImportError;
use crate::log_import::import_log_file;
use crate::settings::ImportOptions;

/// Holds the currently loaded log for an application.
///
/// A successful import swaps the new dataset in as a whole; a failed one leaves the previous
/// dataset current. Readers hold `Arc` clones, so a swap never changes data they are using.
#[derive(Debug, Default)]
pub struct LogSession {
    options: ImportOptions,
    current: Option<Arc<LogDataset>>,
}

impl LogSession {
    pub fn new(options: ImportOptions) -> Self {
        Self { options, current: None }
    }

    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    pub fn current(&self) -> Option<Arc<LogDataset>> {
        self.current.clone()
    }

    pub fn import(&mut self, path: &Path) -> Result<Arc<LogDataset>, ImportError> {
        match import_log_file(path, &self.options) {
            Ok(dataset) => Ok(self.publish(dataset)),
            Err(e) => {
                if self.current.is_some() {
                    warn!("Import of '{}' failed, keeping previous log: {}", path.display(), e);
                }
                Err(e)
            }
        }
    }

    /// Makes an already built dataset the current one.
    pub fn publish(&mut self, dataset: LogDataset) -> Arc<LogDataset> {
        let dataset = Arc::new(dataset);
        self.current = Some(Arc::clone(&dataset));
        dataset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_import::import_log_reader;

    #[test]
    fn failed_import_keeps_previous_dataset() {
        let options = ImportOptions::default();
        let mut session = LogSession::new(options.clone());
        let first = import_log_reader("first.csv", "A\n1\n".as_bytes(), &options).unwrap();
        let published = session.publish(first);

        let err = session.import(Path::new("/nonexistent/flight.csv")).unwrap_err();
        assert!(matches!(err, ImportError::Io(_)));

        let current = session.current().unwrap();
        assert!(Arc::ptr_eq(&current, &published));
        assert_eq!(current.source_name(), "first.csv");
    }

    #[test]
    fn readers_keep_their_snapshot_across_reimport() {
        let options = ImportOptions::default();
        let mut session = LogSession::new(options.clone());
        let reader_copy = session.publish(import_log_reader("a.csv", "A\n1\n".as_bytes(), &options).unwrap());
        session.publish(import_log_reader("b.csv", "B\n2\n3\n".as_bytes(), &options).unwrap());

        assert_eq!(reader_copy.source_name(), "a.csv");
        assert_eq!(reader_copy.row_count(), 1);
        assert_eq!(session.current().unwrap().source_name(), "b.csv");
    }
}

// src/session.rs
