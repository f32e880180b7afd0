use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const MPI_CSV: &str = "\
Border_Name,Norm_MPI_0.02,Norm_MPI_0.03,Norm_MPI_0.05
Busia,1.0,1.0,1.0
Malaba,0.8123,0.7,0.55
";

const CI_CSV: &str = "\
Border_Name,year,CI
Busia,2020,5
Busia,2020,3
Malaba,2019,1
";

fn data_dir() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("mpi_border_results.csv"), MPI_CSV).unwrap();
    fs::write(tmp.path().join("ci_results.csv"), CI_CSV).unwrap();
    tmp
}

fn hub(tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("hub").unwrap();
    cmd.current_dir(tmp.path()).arg("--data-dir").arg(tmp.path());
    cmd
}

#[test]
fn test_inspect_lists_datasets() {
    let tmp = data_dir();
    let mut cmd = Command::cargo_bin("hub").unwrap();
    cmd.current_dir(tmp.path())
        .arg("inspect")
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("mpi_border_results.csv"))
        .stdout(predicate::str::contains("missing"))
        .stdout(predicate::str::contains("Busia, Malaba"));
}

#[test]
fn test_inspect_names_missing_file() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("mpi_border_results.csv"), MPI_CSV).unwrap();
    hub(&tmp)
        .arg("inspect")
        .assert()
        .failure()
        .stderr(predicate::str::contains("ci_results.csv"));
}

#[test]
fn test_bars_filters_borders() {
    let tmp = data_dir();
    hub(&tmp)
        .args(["bars", "--borders", "Malaba"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Malaba"))
        .stdout(predicate::str::contains("0.8123"))
        .stdout(predicate::str::contains("Busia").not());
}

#[test]
fn test_bars_empty_selection_reports_no_data() {
    let tmp = data_dir();
    hub(&tmp)
        .args(["bars", "--borders", ""])
        .assert()
        .success()
        .stdout(predicate::str::contains("No data for selected borders."));
}

#[test]
fn test_ci_heatmap_sums_duplicates() {
    let tmp = data_dir();
    hub(&tmp)
        .args(["heatmap", "--ci"])
        .assert()
        .success()
        .stdout(predicate::str::contains("8.0000"));
}

#[test]
fn test_heatmap_rejects_unknown_decay() {
    let tmp = data_dir();
    hub(&tmp)
        .args(["heatmap", "--decay", "0.04"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown decay"));
}

#[test]
fn test_trends_year_snapshot() {
    let tmp = data_dir();
    hub(&tmp)
        .args(["trends", "--year", "2020"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CI 2020"))
        .stdout(predicate::str::contains("8.0000"));
}

#[test]
fn test_trends_year_and_borders_conflict() {
    let tmp = data_dir();
    hub(&tmp)
        .args(["trends", "--year", "2020", "--borders", "Busia"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_export_to_stdout_is_exact() {
    let tmp = data_dir();
    hub(&tmp)
        .args(["export", "ci_results"])
        .assert()
        .success()
        .stdout(CI_CSV);
}

#[test]
fn test_export_to_file_with_filter() {
    let tmp = data_dir();
    let out = tmp.path().join("out.csv");
    hub(&tmp)
        .args(["export", "mpi_border_results", "--borders", "Busia", "-o"])
        .arg(&out)
        .assert()
        .success();
    assert_eq!(
        fs::read_to_string(&out).unwrap(),
        "Border_Name,Norm_MPI_0.02,Norm_MPI_0.03,Norm_MPI_0.05\nBusia,1.0,1.0,1.0\n"
    );
}

#[test]
fn test_slides_lists_deck() {
    let tmp = TempDir::new().unwrap();
    Command::cargo_bin("hub")
        .unwrap()
        .current_dir(tmp.path())
        .arg("slides")
        .assert()
        .success()
        .stdout(predicate::str::contains("Relational Networks"));
}

#[test]
fn test_explicit_config_must_exist() {
    let tmp = TempDir::new().unwrap();
    Command::cargo_bin("hub")
        .unwrap()
        .current_dir(tmp.path())
        .args(["--config", "nope.yaml", "slides"])
        .assert()
        .failure();
}
