use std::fs;
use studylog_core::db::open_db_in_memory;
use studylog_core::{
    render_log, ImportReport, LogService, LogServiceError, NoteService, NoteServiceError,
    SqliteLogRepository, SqliteNoteRepository, Vault, VaultError, VaultLayout, WeekLabel,
    WeeklyEntry,
};

fn sample_entry(week: u32) -> WeeklyEntry {
    let mut entry = WeeklyEntry::labeled(WeekLabel::new(week), format!("week {week}"));
    entry.focus = vec!["interview prep".to_string()];
    entry.key_learnings = vec!["`copy.deepcopy` vs slicing".to_string()];
    entry
}

#[test]
fn export_then_import_into_fresh_store_restores_everything() {
    let dir = tempfile::tempdir().unwrap();
    let vault = Vault::new(VaultLayout::new(dir.path()));

    let source = open_db_in_memory().unwrap();
    let log = LogService::new(SqliteLogRepository::try_new(&source).unwrap());
    let notes = NoteService::new(SqliteNoteRepository::try_new(&source).unwrap());
    log.append(&sample_entry(0)).unwrap();
    log.append(&sample_entry(2)).unwrap();
    notes.upsert("python-core", "# Traps\n\n- mutable defaults\n").unwrap();
    notes.upsert("golang-basics", "").unwrap();

    let exported = vault.export(&log, &notes).unwrap();
    assert_eq!(exported.entries, 2);
    assert_eq!(exported.notes, 2);
    assert!(dir.path().join("progress-log.md").is_file());
    assert_eq!(
        fs::read_to_string(dir.path().join("notes/python-core.md")).unwrap(),
        "# Traps\n\n- mutable defaults\n"
    );

    let target = open_db_in_memory().unwrap();
    let log_copy = LogService::new(SqliteLogRepository::try_new(&target).unwrap());
    let notes_copy = NoteService::new(SqliteNoteRepository::try_new(&target).unwrap());
    let imported = vault.import(&log_copy, &notes_copy).unwrap();

    assert_eq!(imported.entries_added, 2);
    assert_eq!(imported.notes_created, 2);
    assert_eq!(log_copy.list().unwrap(), log.list().unwrap());
    assert_eq!(notes_copy.list_notes().unwrap(), notes.list_notes().unwrap());
}

#[test]
fn reimporting_unchanged_vault_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let vault = Vault::new(VaultLayout::new(dir.path()));
    let conn = open_db_in_memory().unwrap();
    let log = LogService::new(SqliteLogRepository::try_new(&conn).unwrap());
    let notes = NoteService::new(SqliteNoteRepository::try_new(&conn).unwrap());
    log.append(&sample_entry(1)).unwrap();
    notes.upsert("rust", "ownership").unwrap();
    vault.export(&log, &notes).unwrap();

    let report = vault.import(&log, &notes).unwrap();
    assert_eq!(
        report,
        ImportReport {
            entries_skipped: 1,
            notes_unchanged: 1,
            ..ImportReport::default()
        }
    );
}

#[test]
fn conflicting_week_in_vault_aborts_with_duplicate_week() {
    let dir = tempfile::tempdir().unwrap();
    let layout = VaultLayout::new(dir.path());
    fs::write(
        layout.log_path(),
        "# Weekly Progress Log\n\n## Week 1\n_Dates: other_\n\n### Focus\n- something else\n",
    )
    .unwrap();

    let conn = open_db_in_memory().unwrap();
    let log = LogService::new(SqliteLogRepository::try_new(&conn).unwrap());
    let notes = NoteService::new(SqliteNoteRepository::try_new(&conn).unwrap());
    log.append(&sample_entry(1)).unwrap();

    let err = Vault::new(layout).import(&log, &notes).unwrap_err();
    assert!(matches!(
        err,
        VaultError::Log(LogServiceError::DuplicateWeek(label)) if label.number() == 1
    ));
    assert_eq!(log.list().unwrap(), vec![sample_entry(1)]);
}

#[test]
fn week_repeated_in_log_file_rejects_whole_vault_without_writes() {
    let dir = tempfile::tempdir().unwrap();
    let layout = VaultLayout::new(dir.path());
    let mut conflicting = sample_entry(1);
    conflicting.gaps = vec!["rewritten later".to_string()];
    fs::write(
        layout.log_path(),
        render_log(&[sample_entry(1), sample_entry(2), conflicting]),
    )
    .unwrap();
    fs::create_dir_all(layout.notes_dir()).unwrap();
    fs::write(layout.note_path("rust"), "edited in the vault").unwrap();
    fs::write(layout.note_path("golang"), "new topic").unwrap();

    let conn = open_db_in_memory().unwrap();
    let log = LogService::new(SqliteLogRepository::try_new(&conn).unwrap());
    let notes = NoteService::new(SqliteNoteRepository::try_new(&conn).unwrap());
    log.append(&sample_entry(1)).unwrap();
    notes.upsert("rust", "ownership").unwrap();

    let err = Vault::new(layout).import(&log, &notes).unwrap_err();
    assert!(matches!(
        err,
        VaultError::Log(LogServiceError::DuplicateWeek(label)) if label.number() == 1
    ));
    assert_eq!(log.list().unwrap(), vec![sample_entry(1)]);
    assert_eq!(notes.list_topics().unwrap(), vec!["rust"]);
    assert_eq!(notes.get("rust").unwrap().body, "ownership");
}

#[test]
fn invalid_note_file_name_rejects_vault_before_log_is_written() {
    let dir = tempfile::tempdir().unwrap();
    let layout = VaultLayout::new(dir.path());
    fs::write(layout.log_path(), render_log(&[sample_entry(1)])).unwrap();
    fs::create_dir_all(layout.notes_dir()).unwrap();
    fs::write(layout.notes_dir().join("python core.md"), "spaces").unwrap();

    let conn = open_db_in_memory().unwrap();
    let log = LogService::new(SqliteLogRepository::try_new(&conn).unwrap());
    let notes = NoteService::new(SqliteNoteRepository::try_new(&conn).unwrap());

    let err = Vault::new(layout).import(&log, &notes).unwrap_err();
    assert!(matches!(err, VaultError::Note(NoteServiceError::Validation(_))));
    assert!(log.list().unwrap().is_empty());
    assert!(notes.list_topics().unwrap().is_empty());
}

#[test]
fn import_of_missing_vault_is_empty_and_malformed_log_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_db_in_memory().unwrap();
    let log = LogService::new(SqliteLogRepository::try_new(&conn).unwrap());
    let notes = NoteService::new(SqliteNoteRepository::try_new(&conn).unwrap());

    let empty = Vault::new(VaultLayout::new(dir.path().join("absent")))
        .import(&log, &notes)
        .unwrap();
    assert_eq!(empty, ImportReport::default());

    let layout = VaultLayout::new(dir.path());
    fs::write(layout.log_path(), "## Week one\n").unwrap();
    let err = Vault::new(layout.clone()).import(&log, &notes).unwrap_err();
    match err {
        VaultError::Parse { path, source } => {
            assert_eq!(path, layout.log_path());
            assert_eq!(source.line, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn import_ignores_non_markdown_files_in_notes_dir() {
    let dir = tempfile::tempdir().unwrap();
    let layout = VaultLayout::new(dir.path());
    fs::create_dir_all(layout.notes_dir()).unwrap();
    fs::write(layout.note_path("python-core"), "body").unwrap();
    fs::write(layout.notes_dir().join("scratch.txt"), "ignored").unwrap();

    let conn = open_db_in_memory().unwrap();
    let log = LogService::new(SqliteLogRepository::try_new(&conn).unwrap());
    let notes = NoteService::new(SqliteNoteRepository::try_new(&conn).unwrap());
    let report = Vault::new(layout).import(&log, &notes).unwrap();

    assert_eq!(report.notes_created, 1);
    assert_eq!(notes.list_topics().unwrap(), vec!["python-core"]);
}
