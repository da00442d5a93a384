//! Best-effort extraction over a list of candidate files.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::invoice::{base_name, DocumentExtractor, InvoiceExtractor};
use crate::models::record::InvoiceRecord;

/// Receives per-file progress notifications from a batch.
///
/// `on_item` is called once per candidate, in processing order, before that
/// candidate is extracted. Implementations must not block for long; a host
/// that renders progress on another thread should only hand the values over.
pub trait ProgressObserver {
    /// About to process candidate `current` (1-based) of `total`.
    fn on_item(&self, current: usize, total: usize, label: &str);

    /// The batch has finished.
    fn on_finish(&self, _outcome: &BatchOutcome) {}
}

impl<F> ProgressObserver for F
where
    F: Fn(usize, usize, &str),
{
    fn on_item(&self, current: usize, total: usize, label: &str) {
        self(current, total, label)
    }
}

/// Observer that ignores all notifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_item(&self, _current: usize, _total: usize, _label: &str) {}
}

/// Records and failures collected by a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Successfully extracted records, in processing order.
    pub records: Vec<InvoiceRecord>,
    /// Base names of files that failed or were ignored.
    pub failed_file_names: Vec<String>,
    /// Number of candidates handed to the batch.
    pub total_candidates: usize,
    /// Whether the batch stopped early on a cancellation request.
    pub cancelled: bool,
}

impl BatchOutcome {
    /// Number of valid records.
    pub fn total_valid_records(&self) -> usize {
        self.records.len()
    }

    /// Whether no record survived extraction.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Drives an extractor over every candidate file.
pub struct BatchProcessor<E = DocumentExtractor> {
    extractor: E,
    cancel: Option<Arc<AtomicBool>>,
}

impl Default for BatchProcessor {
    fn default() -> Self {
        Self::new(DocumentExtractor::default())
    }
}

impl<E: InvoiceExtractor> BatchProcessor<E> {
    /// Create a processor around an extractor.
    pub fn new(extractor: E) -> Self {
        Self {
            extractor,
            cancel: None,
        }
    }

    /// Stop between files once `flag` is set.
    pub fn with_cancellation(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Process `candidates` in ascending path order.
    ///
    /// A failing file never aborts the batch; its base name is appended to
    /// `failed_file_names` instead.
    pub fn process(
        &self,
        candidates: &[PathBuf],
        observer: &dyn ProgressObserver,
    ) -> BatchOutcome {
        let mut ordered = candidates.to_vec();
        ordered.sort();

        let total = ordered.len();
        let mut outcome = BatchOutcome {
            total_candidates: total,
            ..Default::default()
        };

        for (index, path) in ordered.iter().enumerate() {
            if self.is_cancelled() {
                info!("Batch cancelled after {} of {} file(s)", index, total);
                outcome.cancelled = true;
                break;
            }

            let current = index + 1;
            let name = base_name(path);
            observer.on_item(current, total, &name);
            debug!("[{}/{}] Reading {}", current, total, name);

            match self.extractor.extract_file(path) {
                Ok(record) => outcome.records.push(record),
                Err(e) => {
                    if e.is_structural_mismatch() {
                        debug!("{}", e);
                    } else {
                        warn!("{}", e);
                    }
                    outcome.failed_file_names.push(e.file_name().to_string());
                }
            }
        }

        if total == 0 {
            warn!("No candidate files to process");
        }
        observer.on_finish(&outcome);
        outcome
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::fs;

    fn nfe(id: &str) -> String {
        format!(r#"<NFe><infNFe Id="{id}"><emit><xNome>E</xNome></emit></infNFe></NFe>"#)
    }

    #[test]
    fn test_partitions_valid_and_invalid_files() {
        let dir = tempfile::tempdir().unwrap();
        let files = [
            ("e.xml", nfe("NFe5")),
            ("a.xml", nfe("NFe1")),
            ("c.xml", "<other/>".to_string()),
            ("b.xml", "garbage".to_string()),
            ("d.xml", nfe("NFe4")),
        ];
        let candidates: Vec<PathBuf> = files
            .iter()
            .map(|(name, content)| {
                let path = dir.path().join(name);
                fs::write(&path, content).unwrap();
                path
            })
            .collect();

        let calls = RefCell::new(Vec::new());
        let observer = |current: usize, total: usize, label: &str| {
            calls.borrow_mut().push((current, total, label.to_string()));
        };

        let outcome = BatchProcessor::default().process(&candidates, &observer);

        assert_eq!(outcome.total_candidates, 5);
        assert_eq!(outcome.total_valid_records(), 3);
        assert_eq!(outcome.failed_file_names, vec!["b.xml", "c.xml"]);
        assert_eq!(
            outcome.records.iter().map(|r| r.key.as_str()).collect::<Vec<_>>(),
            vec!["1", "4", "5"]
        );

        let calls = calls.into_inner();
        assert_eq!(calls.len(), 5);
        assert_eq!(
            calls.iter().map(|c| c.0).collect::<Vec<_>>(),
            vec![1, 2, 3, 4, 5]
        );
        assert!(calls.iter().all(|c| c.1 == 5));
        assert_eq!(calls[0].2, "a.xml");
        assert_eq!(calls[4].2, "e.xml");
    }

    #[test]
    fn test_missing_file_is_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let outcome =
            BatchProcessor::default().process(&[dir.path().join("gone.xml")], &NoProgress);

        assert!(outcome.is_empty());
        assert_eq!(outcome.failed_file_names, vec!["gone.xml"]);
    }

    #[test]
    fn test_empty_candidates() {
        let outcome = BatchProcessor::default().process(&[], &NoProgress);
        assert_eq!(outcome, BatchOutcome::default());
    }

    #[test]
    fn test_cancellation_checked_between_files() {
        let dir = tempfile::tempdir().unwrap();
        let candidates: Vec<PathBuf> = (1..=3)
            .map(|i| {
                let path = dir.path().join(format!("{i}.xml"));
                fs::write(&path, nfe(&format!("NFe{i}"))).unwrap();
                path
            })
            .collect();

        let flag = Arc::new(AtomicBool::new(false));
        let processor = BatchProcessor::default().with_cancellation(flag.clone());
        let observer = |current: usize, _total: usize, _label: &str| {
            if current == 2 {
                flag.store(true, Ordering::Relaxed);
            }
        };

        let outcome = processor.process(&candidates, &observer);
        assert!(outcome.cancelled);
        assert_eq!(outcome.total_valid_records(), 2);
    }
}
