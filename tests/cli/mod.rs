use assert_cmd::prelude::*; // Add methods on commands
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::process::Command; // Run programs
use tempfile::{Builder, TempDir};

use crate::fixtures;

mod diff;

const TEST_CONFIG_FILE: &str = "schema-refresh-test.toml";

struct TestDumps {
    dir: TempDir,
}

impl TestDumps {
    fn new() -> std::io::Result<Self> {
        let dir = Builder::new()
            .prefix("schema-refresh-test-dir")
            .rand_bytes(5)
            .tempdir()?;
        Ok(Self { dir })
    }

    fn write(&self, name: &str, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.dir.path().join(name);
        let mut file = File::create(&path)?;
        write!(file, "{contents}")?;
        Ok(path)
    }

    fn write_config(&self, contents: &str) -> std::io::Result<PathBuf> {
        self.write(TEST_CONFIG_FILE, contents)
    }
}

fn schema_refresh() -> Command {
    let mut cmd = Command::cargo_bin("schema-refresh").expect("schema-refresh bin exists");
    cmd.env("RUST_LOG", "off");
    cmd
}

fn stdout_lines(output: &std::process::Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}

fn initial_and_updated(dumps: &TestDumps) -> std::io::Result<(PathBuf, PathBuf)> {
    Ok((
        dumps.write("initial.json", fixtures::INITIAL_SCHEMA)?,
        dumps.write("updated.json", fixtures::UPDATED_SCHEMA)?,
    ))
}
