use arbiter_core::model::{CheckOutcome, CheckResult, LogRecord};
use arbiter_core::storage::Store;
use arbiter_core::taxonomy::CheckName;
use tempfile::tempdir;

fn sample_record(filepath: &str) -> LogRecord {
    LogRecord {
        filepath: filepath.into(),
        agent_name: Some("wiki".into()),
        provider: Some("openai".into()),
        model: Some("gpt-4o".into()),
        user_prompt: Some("where do capybaras live?".into()),
        instructions: Some("answer relevant".into()),
        assistant_answer: Some("Capybaras live near water in South America.".into()),
        raw_transcript: Some("{}".into()),
        ..Default::default()
    }
}

fn check(log_id: i64, name: CheckName, outcome: CheckOutcome) -> CheckResult {
    CheckResult {
        log_id,
        check_name: name,
        outcome,
        details: Some(format!("{} rationale", name.as_str())),
    }
}

#[test]
fn schema_is_idempotent_and_ids_increase() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let store = Store::open(&dir.path().join("audit.db"))?;
    store.ensure_schema()?;
    // Safe to call again on a populated store.
    let first = store.insert_log(&sample_record("a.json"))?;
    store.ensure_schema()?;
    let second = store.insert_log(&sample_record("b.json"))?;
    let third = store.insert_log(&sample_record("c.json"))?;

    assert!(second > first);
    assert!(third > second);
    Ok(())
}

#[test]
fn tri_state_pass_survives_a_round_trip() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let store = Store::open(&dir.path().join("audit.db"))?;
    store.ensure_schema()?;
    let log_id = store.insert_log(&sample_record("a.json"))?;

    store.insert_checks(&[
        check(log_id, CheckName::InstructionsFollow, CheckOutcome::Passed),
        check(log_id, CheckName::AnswerRelevant, CheckOutcome::Failed),
    ])?;
    store.insert_checks(&[check(
        log_id,
        CheckName::AnswerRelevant,
        CheckOutcome::Unknown,
    )])?;

    let checks = store.checks_for_log(log_id)?;
    assert_eq!(checks.len(), 3);
    assert_eq!(checks[0].outcome, CheckOutcome::Passed);
    assert_eq!(checks[1].outcome, CheckOutcome::Failed);
    assert_eq!(checks[2].outcome, CheckOutcome::Unknown);
    assert_eq!(
        checks[0].details.as_deref(),
        Some("instructions_follow rationale")
    );
    Ok(())
}

#[test]
fn empty_batch_is_a_no_op() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let db_path = dir.path().join("audit.db");
    let store = Store::open(&db_path)?;
    store.ensure_schema()?;
    let log_id = store.insert_log(&sample_record("a.json"))?;
    store.insert_checks(&[check(log_id, CheckName::AnswerRelevant, CheckOutcome::Passed)])?;

    store.insert_checks(&[])?;

    let conn = rusqlite::Connection::open(&db_path)?;
    let count: i64 = conn.query_row("SELECT count(*) FROM check_results", [], |r| r.get(0))?;
    assert_eq!(count, 1);
    Ok(())
}

#[test]
fn stored_check_name_outside_the_taxonomy_is_flagged_on_read() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let db_path = dir.path().join("audit.db");
    let store = Store::open(&db_path)?;
    store.ensure_schema()?;
    let log_id = store.insert_log(&sample_record("a.json"))?;

    // A row written outside the store API, with a name no taxonomy
    // member maps to.
    let conn = rusqlite::Connection::open(&db_path)?;
    conn.execute(
        "INSERT INTO check_results(log_id, check_name, passed, details, created_at)
         VALUES (?1, 'tone_of_voice', 1, 'rogue', 'unix:0')",
        rusqlite::params![log_id],
    )?;

    let err = store.checks_for_log(log_id).unwrap_err();
    assert!(err.to_string().contains("not in the taxonomy"));
    Ok(())
}

#[test]
fn check_for_missing_log_is_rejected() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let store = Store::open(&dir.path().join("audit.db"))?;
    store.ensure_schema()?;

    let orphan = check(9999, CheckName::AnswerRelevant, CheckOutcome::Passed);
    assert!(store.insert_checks(&[orphan]).is_err());
    Ok(())
}

#[test]
fn deleting_a_log_cascades_to_its_checks() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let db_path = dir.path().join("audit.db");
    let store = Store::open(&db_path)?;
    store.ensure_schema()?;

    let keep = store.insert_log(&sample_record("keep.json"))?;
    let drop = store.insert_log(&sample_record("drop.json"))?;
    store.insert_checks(&[
        check(keep, CheckName::AnswerRelevant, CheckOutcome::Passed),
        check(drop, CheckName::AnswerRelevant, CheckOutcome::Failed),
        check(drop, CheckName::InstructionsFollow, CheckOutcome::Failed),
    ])?;

    assert!(store.delete_log(drop)?);
    assert!(!store.delete_log(drop)?);

    assert!(store.checks_for_log(drop)?.is_empty());
    assert_eq!(store.checks_for_log(keep)?.len(), 1);

    let conn = rusqlite::Connection::open(&db_path)?;
    let count: i64 = conn.query_row("SELECT count(*) FROM check_results", [], |r| r.get(0))?;
    assert_eq!(count, 1);
    Ok(())
}

#[test]
fn find_log_by_filepath_returns_latest() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let store = Store::open(&dir.path().join("audit.db"))?;
    store.ensure_schema()?;

    assert_eq!(store.find_log_by_filepath("a.json")?, None);
    let _first = store.insert_log(&sample_record("a.json"))?;
    let second = store.insert_log(&sample_record("a.json"))?;
    assert_eq!(store.find_log_by_filepath("a.json")?, Some(second));
    Ok(())
}

#[test]
fn recent_logs_lists_check_counts() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let store = Store::open(&dir.path().join("audit.db"))?;
    store.ensure_schema()?;

    let a = store.insert_log(&sample_record("a.json"))?;
    let b = store.insert_log(&sample_record("b.json"))?;
    store.insert_checks(&[
        check(a, CheckName::AnswerRelevant, CheckOutcome::Passed),
        check(a, CheckName::InstructionsFollow, CheckOutcome::Passed),
    ])?;

    let logs = store.recent_logs(10)?;
    assert_eq!(logs.len(), 2);
    // Newest first; b was ingested but not yet evaluated, a valid state.
    assert_eq!(logs[0].id, b);
    assert_eq!(logs[0].check_count, 0);
    assert_eq!(logs[1].id, a);
    assert_eq!(logs[1].check_count, 2);
    Ok(())
}
