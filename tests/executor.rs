use snowlift::testing::RecordingWarehouse;
use snowlift::{Error, LoadExecutor, LoadPlan};

fn plan(job: &str) -> LoadPlan {
    LoadPlan {
        staging: vec![
            format!("STAGE {job} 1"),
            format!("STAGE {job} 2"),
        ],
        load: vec![format!("LOAD {job} 1"), format!("LOAD {job} 2")],
    }
}

fn plans() -> Vec<(String, LoadPlan)> {
    vec![
        ("alpha".to_string(), plan("alpha")),
        ("beta".to_string(), plan("beta")),
    ]
}

#[test]
fn all_staging_runs_before_any_load() -> anyhow::Result<()> {
    let warehouse = RecordingWarehouse::new();
    LoadExecutor::new(&warehouse).execute(&plans())?;

    let statements = warehouse.statements();
    assert_eq!(
        statements,
        vec![
            "STAGE alpha 1",
            "STAGE alpha 2",
            "STAGE beta 1",
            "STAGE beta 2",
            "LOAD alpha 1",
            "LOAD alpha 2",
            "LOAD beta 1",
            "LOAD beta 2",
        ]
    );
    Ok(())
}

#[test]
fn phases_run_on_separate_sessions() -> anyhow::Result<()> {
    let warehouse = RecordingWarehouse::new();
    LoadExecutor::new(&warehouse).execute(&plans())?;

    let sessions = warehouse.sessions();
    for (session, statement) in &sessions {
        let expected = if statement.starts_with("STAGE") { 0 } else { 1 };
        assert_eq!(*session, expected, "wrong session for `{statement}`");
    }
    Ok(())
}

#[test]
fn statement_failure_aborts_the_remaining_run() {
    let warehouse = RecordingWarehouse::new();
    warehouse.fail_containing("STAGE beta 1");

    let err = LoadExecutor::new(&warehouse).execute(&plans()).unwrap_err();
    assert!(matches!(err, Error::WarehouseStatement { .. }));

    let statements = warehouse.statements();
    assert_eq!(statements, vec!["STAGE alpha 1", "STAGE alpha 2"]);
}

#[test]
fn load_failure_leaves_staging_complete() {
    let warehouse = RecordingWarehouse::new();
    warehouse.fail_containing("LOAD alpha 2");

    let err = LoadExecutor::new(&warehouse).execute(&plans()).unwrap_err();
    assert!(matches!(err, Error::WarehouseStatement { .. }));

    let statements = warehouse.statements();
    assert_eq!(statements.iter().filter(|s| s.starts_with("STAGE")).count(), 4);
    assert_eq!(statements.last().unwrap(), "LOAD alpha 1");
}
