use crate::cli::*;

#[test]
fn test_diff_prints_one_event_per_line() -> std::io::Result<()> {
    let dumps = TestDumps::new()?;
    let (old, new) = initial_and_updated(&dumps)?;

    let output = schema_refresh().arg("diff").arg(&old).arg(&new).output()?;

    assert!(output.status.success());
    let mut lines = stdout_lines(&output);
    lines.sort();
    assert_eq!(
        lines,
        vec![
            "aggregate shop.total(int) dropped",
            "keyspace analytics created",
            "keyspace ks1 updated",
            "table ks1.t2 dropped",
            "table ks1.t3 created",
            "table shop.orders updated",
            "view shop.orders_by_customer dropped",
        ]
    );
    Ok(())
}

#[test]
fn test_diff_identical_dumps() -> std::io::Result<()> {
    let dumps = TestDumps::new()?;
    let old = dumps.write("initial.json", fixtures::INITIAL_SCHEMA)?;
    let new = dumps.write("reordered.json", fixtures::INITIAL_SCHEMA_REORDERED)?;

    let output = schema_refresh().arg("diff").arg(&old).arg(&new).output()?;

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    Ok(())
}

#[test]
fn test_diff_with_keyspace_filter() -> std::io::Result<()> {
    let dumps = TestDumps::new()?;
    let (old, new) = initial_and_updated(&dumps)?;
    let config = dumps.write_config(
        r#"
[schema]
refreshed_keyspaces = ["ks1"]
"#,
    )?;

    let output = schema_refresh()
        .arg("diff")
        .arg(&old)
        .arg(&new)
        .arg("-c")
        .arg(&config)
        .output()?;

    assert!(output.status.success());
    assert_eq!(
        stdout_lines(&output),
        vec![
            "keyspace ks1 updated",
            "table ks1.t2 dropped",
            "table ks1.t3 created"
        ]
    );
    Ok(())
}

#[test]
fn test_diff_invalid_schema() -> std::io::Result<()> {
    let dumps = TestDumps::new()?;
    let old = dumps.write("initial.json", fixtures::INITIAL_SCHEMA)?;
    let new = dumps.write("invalid.json", fixtures::INVALID_SCHEMA)?;

    let output = schema_refresh().arg("diff").arg(&old).arg(&new).output()?;

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid data type in column ks1.t1.pk"));
    Ok(())
}

#[test]
fn test_diff_missing_file() -> std::io::Result<()> {
    let dumps = TestDumps::new()?;
    let old = dumps.write("initial.json", fixtures::INITIAL_SCHEMA)?;

    let output = schema_refresh()
        .arg("diff")
        .arg(&old)
        .arg(dumps.dir.path().join("missing.json"))
        .output()?;

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to read"));
    Ok(())
}

#[test]
fn test_invalid_config() -> std::io::Result<()> {
    let dumps = TestDumps::new()?;
    let (old, new) = initial_and_updated(&dumps)?;
    let config = dumps.write_config("[schema]\nevent_channel_capacity = 0\n")?;

    schema_refresh()
        .arg("-c")
        .arg(&config)
        .arg("diff")
        .arg(&old)
        .arg(&new)
        .assert()
        .failure();
    Ok(())
}
