// End-to-end tests for the `padconv` binary.
//
// Each test lays out a settings file and branch directories in a temp dir,
// runs the binary against it and checks exit code, stdout and written files.
//
// Run with: cargo test -p padconv-cli --test run_tests -- --nocapture

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

const EXECUTIVE_TAX_ID: &str = "87612826000190";
const LEGISLATIVE_TAX_ID: &str = "12292535000162";

fn padconv() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_padconv"));
    cmd.env_remove("PADCONV_CONFIG").env_remove("RUST_LOG");
    cmd
}

fn header(tax_id: &str) -> String {
    format!("{tax_id}010120233101202305022023PREFEITURA MUNICIPAL")
}

/// EMPENHO line: org code, commitment key, date, signed amount.
fn commitment(org: u32, year: u32, entity: u32, seq: u32, date: &str, cents: i64) -> String {
    let sign = if cents < 0 { '-' } else { '+' };
    let line = format!(
        "{org:02}010412200010002001033903900010000{year:05}{entity:02}{seq:06}{date}{:013}{sign}{:010}",
        cents.abs(),
        4400 + seq
    );
    assert_eq!(line.chars().count(), 80, "{line}");
    line
}

/// LIQUIDAC / PAGAMENT line prefix: key, document number, date, signed amount.
fn movement(year: u32, entity: u32, seq: u32, date: &str, cents: i64) -> String {
    let sign = if cents < 0 { '-' } else { '+' };
    let line = format!("{year:05}{entity:02}{seq:06}{:020}{date}{:013}{sign}", seq, cents.abs());
    assert_eq!(line.chars().count(), 55, "{line}");
    line
}

fn write_source(dir: &Path, kind: &str, tax_id: &str, lines: &[String]) {
    fs::create_dir_all(dir).unwrap();
    let mut text = header(tax_id);
    for line in lines {
        text.push('\n');
        text.push_str(line);
    }
    text.push_str(&format!("\nFINALIZADOR{:07}\n", lines.len()));
    fs::write(dir.join(format!("{kind}.txt")), text).unwrap();
}

const SETTINGS: &str = r#"
[input]
sources = ["data/{year}-{month}/branch1", "data/{year}-{month}/branch2"]
kinds = ["EMPENHO", "LIQUIDAC", "PAGAMENT"]

[output]
dir = "out/{year}-{month}"
writers = ["csv", "json"]

[cache]
dir = "cache/{year}-{month}"
"#;

/// Two branches for January 2023:
/// - branch1 (executive tax id): one prior-year obligation fully settled in
///   the period, one pension fund obligation of 2023 itself;
/// - branch2 (legislative tax id): one older obligation, untouched.
fn fixture(settings: &str) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    let branch1 = root.join("data/2023-01/branch1");
    let branch2 = root.join("data/2023-01/branch2");

    write_source(
        &branch1,
        "EMPENHO",
        EXECUTIVE_TAX_ID,
        &[
            commitment(3, 2022, 1, 10, "15032022", 100000),
            commitment(12, 2023, 1, 20, "02012023", 50000),
        ],
    );
    write_source(
        &branch1,
        "LIQUIDAC",
        EXECUTIVE_TAX_ID,
        &[movement(2022, 1, 10, "10012023", 100000)],
    );
    write_source(
        &branch1,
        "PAGAMENT",
        EXECUTIVE_TAX_ID,
        &[movement(2022, 1, 10, "20012023", 100000)],
    );
    write_source(
        &branch2,
        "EMPENHO",
        LEGISLATIVE_TAX_ID,
        &[commitment(1, 2021, 2, 5, "10052021", 30000)],
    );

    let config = root.join("padconv.toml");
    fs::write(&config, settings).unwrap();
    (tmp, config)
}

fn run(config: &Path, extra: &[&str]) -> Output {
    padconv()
        .args(["run", "--year", "2023", "--month", "1", "--config"])
        .arg(config)
        .args(extra)
        .output()
        .expect("padconv run")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ===========================================================================
// padconv run
// ===========================================================================

#[test]
fn run_writes_tables_and_reports_json() {
    let (tmp, config) = fixture(SETTINGS);
    let output = run(&config, &["--json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("stdout is one JSON value");
    assert_eq!(report["period"], "01/2023");
    assert_eq!(report["summary"]["obligations_carried"], 2);
    assert_eq!(report["summary"]["obligations_in_year"], 1);
    assert_eq!(report["summary"]["total_close_unliquidated"], 30000);
    assert_eq!(report["summary"]["entity_counts"]["legislative"], 1);
    assert_eq!(report["summary"]["entity_counts"]["executive"], 1);
    assert_eq!(report["summary"]["entity_counts"]["pension_fund"], 1);
    assert_eq!(report["rejected"].as_array().unwrap().len(), 0);

    let kinds = report["kinds"].as_array().unwrap();
    let empenho = kinds.iter().find(|k| k["kind"] == "EMPENHO").unwrap();
    assert_eq!(empenho["files_read"], 2);
    assert_eq!(empenho["rows"], 3);
    let liquidac = kinds.iter().find(|k| k["kind"] == "LIQUIDAC").unwrap();
    assert_eq!(liquidac["files_read"], 1);

    let out = tmp.path().join("out/2023-01");
    for name in ["EMPENHO.csv", "LIQUIDAC.csv", "RESTOS_PAGAR.csv", "MOVIMENTO_ANUAL.json", "metadata/RESTOS_PAGAR.txt"] {
        assert!(out.join(name).is_file(), "missing {name}");
    }

    let restos = fs::read_to_string(out.join("RESTOS_PAGAR.csv")).unwrap();
    let mut lines = restos.lines();
    assert!(lines.next().unwrap().starts_with("commitment_year;commitment_entity_code;commitment_seq;entity;"));
    let older = lines.next().unwrap();
    assert!(older.starts_with("2021;2;5;legislative;10-05-2021;"), "{older}");
    assert!(older.contains(";300,00;"), "{older}");
    let settled = lines.next().unwrap();
    assert!(settled.starts_with("2022;1;10;executive;"), "{settled}");

    let movement: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("MOVIMENTO_ANUAL.json")).unwrap()).unwrap();
    assert_eq!(movement[0]["entity"], "pension_fund");
    assert_eq!(movement[0]["committed_net"], "500.00");
    assert_eq!(movement[0]["to_pay"], "500.00");

    let cache = tmp.path().join("cache/2023-01");
    assert!(cache.join("RESTOS_PAGAR.json").is_file());
    assert!(cache.join("EMPENHO.json").is_file());
    assert!(!tmp.path().join("cache/2023-01.staging").exists());
    assert!(!tmp.path().join("out/2023-01.staging").exists());
}

#[test]
fn rerun_produces_identical_output() {
    let (tmp, config) = fixture(SETTINGS);
    let path = tmp.path().join("out/2023-01/RESTOS_PAGAR.csv");

    assert!(run(&config, &[]).status.success());
    let first = fs::read(&path).unwrap();
    assert!(run(&config, &[]).status.success());
    assert_eq!(first, fs::read(&path).unwrap());
}

#[test]
fn no_cache_leaves_cache_dir_alone() {
    let (tmp, config) = fixture(SETTINGS);
    let output = run(&config, &["--no-cache"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(!tmp.path().join("cache").exists());
    assert!(tmp.path().join("out/2023-01/RESTOS_PAGAR.csv").is_file());
}

#[test]
fn rejected_file_exits_5_but_writes_outputs() {
    let (tmp, config) = fixture(SETTINGS);
    write_source(
        &tmp.path().join("data/2023-01/branch2"),
        "LIQUIDAC",
        LEGISLATIVE_TAX_ID,
        &[movement(2021, 2, 5, "99999999", 100)],
    );

    let output = run(&config, &[]);
    assert_eq!(output.status.code(), Some(5), "stderr: {}", stderr(&output));
    let err = stderr(&output);
    assert!(err.contains("rejected"), "{err}");
    assert!(err.contains("liquidation_date"), "{err}");
    assert!(tmp.path().join("out/2023-01/RESTOS_PAGAR.csv").is_file());
}

#[test]
fn failed_write_publishes_neither_outputs_nor_cache() {
    let (tmp, config) = fixture(SETTINGS);
    let out = tmp.path().join("out/2023-01");
    fs::create_dir_all(out.parent().unwrap()).unwrap();
    fs::write(&out, "in the way").unwrap();

    let output = run(&config, &[]);
    assert_eq!(output.status.code(), Some(6), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("out/2023-01"));

    assert!(out.is_file());
    assert!(!tmp.path().join("out/2023-01.staging").exists());
    assert!(!tmp.path().join("cache/2023-01").exists());
    assert!(!tmp.path().join("cache/2023-01.staging").exists());
}

#[test]
fn failed_write_keeps_previous_outputs() {
    let (tmp, config) = fixture(SETTINGS);
    assert!(run(&config, &[]).status.success());
    let restos = tmp.path().join("out/2023-01/RESTOS_PAGAR.csv");
    let before = fs::read(&restos).unwrap();

    // A second run whose cache cannot be staged fails after the writers.
    let cache = tmp.path().join("cache");
    fs::remove_dir_all(&cache).unwrap();
    fs::write(&cache, "in the way").unwrap();
    let output = run(&config, &[]);
    assert_eq!(output.status.code(), Some(6), "stderr: {}", stderr(&output));

    assert_eq!(fs::read(&restos).unwrap(), before);
    assert!(!tmp.path().join("out/2023-01.staging").exists());
}

#[test]
fn invalid_month_is_usage_error() {
    let (_tmp, config) = fixture(SETTINGS);
    let output = padconv()
        .args(["run", "--year", "2023", "--month", "13", "--config"])
        .arg(&config)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn missing_config_is_config_error() {
    let tmp = TempDir::new().unwrap();
    let output = run(&tmp.path().join("nope.toml"), &[]);
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("hint:"));
}

// ===========================================================================
// padconv validate / schemas
// ===========================================================================

#[test]
fn validate_accepts_fixture() {
    let (_tmp, config) = fixture(SETTINGS);
    let output = padconv().arg("validate").arg("--config").arg(&config).output().unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("24 schema(s)"));
}

#[test]
fn validate_rejects_unknown_placeholder() {
    let (_tmp, config) = fixture(&SETTINGS.replace("data/{year}-{month}/branch1", "data/{period}/branch1"));
    let output = padconv().arg("validate").arg("--config").arg(&config).output().unwrap();
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("{period}"));
}

#[test]
fn invalid_schema_override_exits_4() {
    let settings = format!("{SETTINGS}\n[schemas]\ndir = \"schemas\"\n");
    let (tmp, config) = fixture(&settings);
    let dir = tmp.path().join("schemas");
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("EMPENHO.toml"),
        "kind = \"EMPENHO\"\nline_length = 10\n\n[[columns]]\nname = \"amount\"\nstart = 5\nend = 3\ntype = \"decimal\"\n",
    )
    .unwrap();

    let output = padconv().arg("validate").arg("--config").arg(&config).output().unwrap();
    assert_eq!(output.status.code(), Some(4), "stderr: {}", stderr(&output));
}

#[test]
fn schemas_lists_builtins_without_settings() {
    let tmp = TempDir::new().unwrap();
    let output = padconv()
        .args(["schemas", "--json", "--config"])
        .arg(tmp.path().join("absent.toml"))
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let listing: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let kinds: Vec<&str> = listing
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["kind"].as_str().unwrap())
        .collect();
    assert_eq!(kinds.len(), 24);
    assert!(kinds.contains(&"RD_EXTRA"));
    assert!(kinds.contains(&"DIARIO"));
    let empenho = listing.as_array().unwrap().iter().find(|s| s["kind"] == "EMPENHO").unwrap();
    assert_eq!(empenho["line_length"], 80);
}
