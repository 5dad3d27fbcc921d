use snowlift::testing::{MemorySource, RecordingWarehouse};
use snowlift::{
    ColumnDescriptor, Error, Job, LoadTarget, RunConfig, SourceParams, SourceType, Value,
    WarehouseParams, run,
};
use std::collections::HashMap;

fn source_params() -> SourceParams {
    SourceParams {
        driver: "ODBC Driver 18 for SQL Server".to_string(),
        server: "db.internal".to_string(),
        trusted_connection: true,
        username: None,
        password: None,
    }
}

fn warehouse_params() -> WarehouseParams {
    WarehouseParams {
        account: "acme-prod".to_string(),
        user: "LOADER".to_string(),
        password: "secret".to_string(),
        database: "ANALYTICS".to_string(),
        load_warehouse: "LOAD_WH".to_string(),
    }
}

fn job(name: &str, query: &str) -> Job {
    Job {
        name: name.to_string(),
        query: query.to_string(),
        target: LoadTarget {
            database: "analytics".to_string(),
            schema: "raw".to_string(),
            table: name.to_string(),
        },
    }
}

fn full_type_map() -> HashMap<SourceType, String> {
    HashMap::from([
        (SourceType::Integer, "NUMBER".to_string()),
        (SourceType::Text, "VARCHAR".to_string()),
        (SourceType::Decimal, "NUMBER(38,2)".to_string()),
    ])
}

fn orders_columns() -> Vec<ColumnDescriptor> {
    vec![
        ColumnDescriptor::new("id", SourceType::Integer),
        ColumnDescriptor::new("name", SourceType::Text),
        ColumnDescriptor::new("amt", SourceType::Decimal),
    ]
}

fn rows(n: usize) -> Vec<Vec<Value>> {
    (0..n)
        .map(|i| {
            vec![
                Value::Int(i as i64),
                Value::Text(format!("row-{i}")),
                Value::Float(i as f64),
            ]
        })
        .collect()
}

#[test]
fn single_job_runs_both_phases() -> anyhow::Result<()> {
    let mut source = MemorySource::new();
    source.insert("select * from dbo.orders", orders_columns(), rows(1200));
    let warehouse = RecordingWarehouse::new();

    let config = RunConfig {
        source: source_params(),
        warehouse: warehouse_params(),
        jobs: vec![job("orders", "select * from dbo.orders")],
        type_map: full_type_map(),
    };
    run(&config, &source, &warehouse)?;

    let statements = warehouse.statements();
    assert_eq!(statements.len(), 12);
    assert!(statements[6].starts_with("PUT 'file://"));
    assert!(statements[6].contains("ORDERS.*.csv.gz"));

    let ddl = statements
        .iter()
        .find(|s| s.starts_with("CREATE OR REPLACE TABLE"))
        .unwrap();
    assert!(ddl.contains("\"ID\" NUMBER"));
    assert!(ddl.contains("\"NAME\" VARCHAR"));
    assert!(ddl.contains("\"AMT\" NUMBER(38,2)"));
    assert!(ddl.contains("t.$3"));
    assert!(!ddl.contains("t.$4"));
    assert_eq!(statements.last().unwrap(), "DROP STAGE \"ORDERS\";");
    Ok(())
}

#[test]
fn staging_of_every_job_precedes_any_load() -> anyhow::Result<()> {
    let mut source = MemorySource::new();
    source.insert("select * from dbo.orders", orders_columns(), rows(40));
    source.insert("select * from dbo.customers", orders_columns(), rows(7));
    let warehouse = RecordingWarehouse::new();

    let config = RunConfig {
        source: source_params(),
        warehouse: warehouse_params(),
        jobs: vec![
            job("orders", "select * from dbo.orders"),
            job("customers", "select * from dbo.customers"),
        ],
        type_map: full_type_map(),
    };
    run(&config, &source, &warehouse)?;

    let statements = warehouse.statements();
    let last_put = statements
        .iter()
        .rposition(|s| s.starts_with("PUT"))
        .unwrap();
    let first_table = statements
        .iter()
        .position(|s| s.starts_with("CREATE OR REPLACE TABLE"))
        .unwrap();
    assert!(last_put < first_table, "all uploads must precede any load");

    // Job order holds within each phase.
    let orders_put = statements
        .iter()
        .position(|s| s.starts_with("PUT") && s.contains("ORDERS"))
        .unwrap();
    let customers_put = statements
        .iter()
        .position(|s| s.starts_with("PUT") && s.contains("CUSTOMERS"))
        .unwrap();
    assert!(orders_put < customers_put);
    Ok(())
}

#[test]
fn probe_failure_aborts_before_any_side_effect() {
    let mut source = MemorySource::new();
    source.insert("select * from dbo.orders", orders_columns(), rows(5));
    source.insert("select * from dbo.broken", orders_columns(), rows(5));
    source.fail_query("select * from dbo.broken");
    let warehouse = RecordingWarehouse::new();

    let config = RunConfig {
        source: source_params(),
        warehouse: warehouse_params(),
        jobs: vec![
            job("orders", "select * from dbo.orders"),
            job("bad_job", "select * from dbo.broken"),
        ],
        type_map: full_type_map(),
    };
    let err = run(&config, &source, &warehouse).unwrap_err();
    assert!(matches!(err, Error::SourceQuery(_)));
    assert!(warehouse.statements().is_empty());
}

#[test]
fn unmapped_type_aborts_before_any_side_effect() {
    let mut source = MemorySource::new();
    source.insert("select * from dbo.orders", orders_columns(), rows(5));
    let warehouse = RecordingWarehouse::new();

    let mut type_map = full_type_map();
    type_map.remove(&SourceType::Decimal);
    let config = RunConfig {
        source: source_params(),
        warehouse: warehouse_params(),
        jobs: vec![job("orders", "select * from dbo.orders")],
        type_map,
    };
    let err = run(&config, &source, &warehouse).unwrap_err();
    assert!(matches!(err, Error::UnmappedType(SourceType::Decimal)));
    assert!(warehouse.statements().is_empty());
}

#[test]
fn missing_source_credentials_fail_validation() {
    let source = MemorySource::new();
    let warehouse = RecordingWarehouse::new();
    let config = RunConfig {
        source: SourceParams {
            trusted_connection: false,
            username: None,
            password: None,
            ..source_params()
        },
        warehouse: warehouse_params(),
        jobs: vec![],
        type_map: full_type_map(),
    };
    let err = run(&config, &source, &warehouse).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}
