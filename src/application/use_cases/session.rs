// ============================================================
// SESSION STORE
// ============================================================
// Per-client collections of ingested datasets. Reports are shared
// immutably; edits and re-uploads swap in a new report.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;
use uuid::Uuid;

use crate::domain::dataset::{CellValue, Column, ColumnKind, DecimalSeparator, IngestReport};
use crate::domain::error::{AppError, Result};
use crate::infrastructure::dataset::{parse_integer, parse_number};

type Sessions = HashMap<Uuid, Vec<Arc<IngestReport>>>;

/// In-memory session registry
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<Sessions>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new, empty session
    pub fn create_session(&self) -> Result<Uuid> {
        let id = Uuid::new_v4();
        self.lock()?.insert(id, Vec::new());
        info!(session = %id, "Session created");
        Ok(id)
    }

    /// Store a report, replacing any earlier one with the same filename
    /// while keeping its position
    pub fn insert(&self, session: Uuid, report: IngestReport) -> Result<Arc<IngestReport>> {
        let report = Arc::new(report);
        let mut sessions = self.lock()?;
        let files = sessions
            .get_mut(&session)
            .ok_or_else(|| session_not_found(session))?;

        match files.iter_mut().find(|r| r.filename == report.filename) {
            Some(slot) => *slot = Arc::clone(&report),
            None => files.push(Arc::clone(&report)),
        }
        Ok(report)
    }

    pub fn get(&self, session: Uuid, filename: &str) -> Result<Arc<IngestReport>> {
        let sessions = self.lock()?;
        let files = sessions
            .get(&session)
            .ok_or_else(|| session_not_found(session))?;

        files
            .iter()
            .find(|r| r.filename == filename)
            .cloned()
            .ok_or_else(|| file_not_found(session, filename))
    }

    /// Filenames in upload order
    pub fn list(&self, session: Uuid) -> Result<Vec<String>> {
        let sessions = self.lock()?;
        let files = sessions
            .get(&session)
            .ok_or_else(|| session_not_found(session))?;
        Ok(files.iter().map(|r| r.filename.clone()).collect())
    }

    /// Every report of a session, in upload order
    pub fn reports(&self, session: Uuid) -> Result<Vec<Arc<IngestReport>>> {
        let sessions = self.lock()?;
        sessions
            .get(&session)
            .cloned()
            .ok_or_else(|| session_not_found(session))
    }

    /// Replace one cell. The stored table is never mutated: a new report
    /// with an edited copy of the table takes its place. The lock is held
    /// from lookup to swap so concurrent edits to the same file all land.
    pub fn edit_cell(
        &self,
        session: Uuid,
        filename: &str,
        column: &str,
        row: usize,
        value: Option<&str>,
    ) -> Result<Arc<IngestReport>> {
        let mut sessions = self.lock()?;
        let slot = sessions
            .get_mut(&session)
            .ok_or_else(|| session_not_found(session))?
            .iter_mut()
            .find(|r| r.filename == filename)
            .ok_or_else(|| file_not_found(session, filename))?;

        let cell = parse_edit(slot.table.column(column)?, value, slot.decimal_separator)?;
        let table = slot.table.with_cell(column, row, cell)?;
        let edited = Arc::new(IngestReport {
            table,
            ..(**slot).clone()
        });
        *slot = Arc::clone(&edited);

        info!(session = %session, file = filename, column, row, "Cell edited");
        Ok(edited)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Sessions>> {
        self.sessions
            .lock()
            .map_err(|_| AppError::Internal("session store lock poisoned".to_string()))
    }
}

/// Numeric edits follow the decimal convention the file was ingested with
fn parse_edit(
    column: &Column,
    value: Option<&str>,
    decimal: DecimalSeparator,
) -> Result<CellValue> {
    let raw = match value.map(str::trim) {
        None | Some("") => return Ok(CellValue::Missing),
        Some(raw) => raw,
    };

    let parsed = match column.kind() {
        ColumnKind::Integer => parse_integer(raw, decimal).map(CellValue::Integer),
        ColumnKind::Float => parse_number(raw, decimal).map(CellValue::Float),
        _ => return column.parse_cell(Some(raw)),
    };

    parsed.ok_or_else(|| {
        AppError::ValidationError(format!(
            "'{}' is not a valid {} value for column '{}'",
            raw,
            column.kind(),
            column.name()
        ))
    })
}

fn session_not_found(session: Uuid) -> AppError {
    AppError::NotFound(format!("session {}", session))
}

fn file_not_found(session: Uuid, filename: &str) -> AppError {
    AppError::NotFound(format!("file '{}' in session {}", filename, session))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::IngestionUseCase;
    use crate::domain::dataset::{DecimalHint, IngestConfig};
    use std::sync::Barrier;
    use std::thread;

    fn report(filename: &str, text: &str) -> IngestReport {
        IngestionUseCase::default().ingest_text(filename, text).unwrap()
    }

    #[test]
    fn test_sessions_are_isolated() {
        let store = SessionStore::new();
        let a = store.create_session().unwrap();
        let b = store.create_session().unwrap();

        store.insert(a, report("one.csv", "v\n1")).unwrap();
        assert_eq!(store.list(a).unwrap(), vec!["one.csv"]);
        assert!(store.list(b).unwrap().is_empty());
        assert!(matches!(store.get(b, "one.csv"), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_reupload_replaces_in_place() {
        let store = SessionStore::new();
        let s = store.create_session().unwrap();

        store.insert(s, report("a.csv", "v\n1")).unwrap();
        store.insert(s, report("b.csv", "v\n2")).unwrap();
        store.insert(s, report("a.csv", "v\n3\n4")).unwrap();

        assert_eq!(store.list(s).unwrap(), vec!["a.csv", "b.csv"]);
        assert_eq!(store.get(s, "a.csv").unwrap().table.row_count(), 2);
    }

    #[test]
    fn test_edit_cell_is_copy_on_write() {
        let store = SessionStore::new();
        let s = store.create_session().unwrap();
        let before = store.insert(s, report("a.csv", "v\n1\n2")).unwrap();

        let after = store.edit_cell(s, "a.csv", "v", 1, Some("20")).unwrap();

        assert_eq!(before.table.column("v").unwrap().value(1), Some(CellValue::Integer(2)));
        assert_eq!(after.table.column("v").unwrap().value(1), Some(CellValue::Integer(20)));
        assert_eq!(
            store.get(s, "a.csv").unwrap().table.column("v").unwrap().value(1),
            Some(CellValue::Integer(20))
        );
    }

    #[test]
    fn test_edit_cell_rejects_wrong_kind() {
        let store = SessionStore::new();
        let s = store.create_session().unwrap();
        store.insert(s, report("a.csv", "v\n1")).unwrap();

        assert!(matches!(
            store.edit_cell(s, "a.csv", "v", 0, Some("abc")),
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            store.insert(Uuid::new_v4(), report("x.csv", "v\n1")),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_concurrent_edits_are_all_kept() {
        let text = format!("v\n{}", vec!["0"; 8].join("\n"));
        let store = Arc::new(SessionStore::new());
        let s = store.create_session().unwrap();
        store.insert(s, report("a.csv", &text)).unwrap();

        let barrier = Arc::new(Barrier::new(8));
        let handles: Vec<_> = (0..8)
            .map(|row| {
                let store = Arc::clone(&store);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    let value = (row + 1).to_string();
                    store.edit_cell(s, "a.csv", "v", row, Some(&value)).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let column_values: Vec<_> = {
            let current = store.get(s, "a.csv").unwrap();
            let column = current.table.column("v").unwrap();
            (0..8).map(|row| column.value(row)).collect()
        };
        let expected: Vec<_> = (1..=8).map(|n| Some(CellValue::Integer(n))).collect();
        assert_eq!(column_values, expected);
    }

    #[test]
    fn test_edit_follows_file_decimal_convention() {
        let use_case =
            IngestionUseCase::new(IngestConfig::default().with_decimal_separator(DecimalHint::Auto));
        let eu = use_case
            .ingest_text("eu.csv", "city;temp\nRoma;12,5\nTorino;8,25")
            .unwrap();

        let store = SessionStore::new();
        let s = store.create_session().unwrap();
        store.insert(s, eu).unwrap();

        let after = store.edit_cell(s, "eu.csv", "temp", 0, Some("13,75")).unwrap();
        assert_eq!(after.table.column("temp").unwrap().value(0), Some(CellValue::Float(13.75)));

        for bad in ["NaN", "inf", "abc"] {
            assert!(matches!(
                store.edit_cell(s, "eu.csv", "temp", 0, Some(bad)),
                Err(AppError::ValidationError(_))
            ));
        }
        let cleared = store.edit_cell(s, "eu.csv", "temp", 1, Some(" ")).unwrap();
        assert_eq!(cleared.table.column("temp").unwrap().value(1), Some(CellValue::Missing));
    }

    #[test]
    fn test_reports_in_upload_order() {
        let store = SessionStore::new();
        let s = store.create_session().unwrap();
        store.insert(s, report("a.csv", "v\n1")).unwrap();
        store.insert(s, report("b.csv", "v\n2")).unwrap();

        let names: Vec<_> = store.reports(s).unwrap().iter().map(|r| r.filename.clone()).collect();
        assert_eq!(names, vec!["a.csv", "b.csv"]);
        assert!(matches!(store.reports(Uuid::new_v4()), Err(AppError::NotFound(_))));
    }
}
