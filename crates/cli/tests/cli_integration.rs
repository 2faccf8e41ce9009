use std::process::{Command, Output};

fn demo() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cmdline-demo"));
    cmd.env_remove("RUST_LOG");
    cmd
}

fn run(args: &[&str]) -> Output {
    demo()
        .args(args)
        .output()
        .expect("failed to run cmdline-demo")
}

fn assert_success(out: &Output, what: &str) {
    assert!(
        out.status.success(),
        "cmdline-demo {what} failed:\nstatus: {}\nstdout:\n{}\nstderr:\n{}",
        out.status,
        String::from_utf8_lossy(&out.stdout),
        String::from_utf8_lossy(&out.stderr),
    );
}

#[test]
fn help_works() {
    let out = run(&["--help"]);
    assert_success(&out, "--help");

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.starts_with("Usage\n\n"), "unexpected help output:\n{stdout}");
    assert!(stdout.contains(" source [options]\n"), "unexpected help output:\n{stdout}");
    assert!(
        stdout.contains("  -o --output <file-path>  Output file\n"),
        "unexpected help output:\n{stdout}"
    );
    assert!(
        stdout.contains("Arguments:\n  source <file-path>       Input file\n"),
        "unexpected help output:\n{stdout}"
    );
}

#[test]
fn help_wins_over_unknown_options() {
    let out = run(&["--bogus", "-h"]);
    assert_success(&out, "--bogus -h");
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Options:"), "unexpected help output:\n{stdout}");
    assert!(!stdout.contains("invalid option"), "unexpected output:\n{stdout}");
}

#[test]
fn unknown_option_fails() {
    let out = run(&["in.txt", "--bogus", "-v"]);
    assert!(!out.status.success(), "expected failure, got {}", out.status);

    let stdout = String::from_utf8_lossy(&out.stdout);
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stdout.contains("Error: invalid option"),
        "unexpected stdout:\n{stdout}"
    );
    assert!(stderr.contains("--bogus"), "unexpected stderr:\n{stderr}");
}

#[test]
fn summary_lists_options_and_arguments() {
    let out = run(&["in.txt", "-o", "out.txt", "--verbose", "extra.txt"]);
    assert_success(&out, "summary");

    // --verbose swallows extra.txt as its value.
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("-o = out.txt\n"), "unexpected output:\n{stdout}");
    assert!(stdout.contains("-v = extra.txt\n"), "unexpected output:\n{stdout}");
    assert!(stdout.contains("--json (not set)\n"), "unexpected output:\n{stdout}");
    assert!(stdout.contains("source: in.txt\n"), "unexpected output:\n{stdout}");
    assert!(!stdout.contains("ignored:"), "unexpected output:\n{stdout}");
}

#[test]
fn surplus_positionals_are_reported() {
    let out = run(&["a.txt", "b.txt"]);
    assert_success(&out, "positionals");
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("source: a.txt\n"), "unexpected output:\n{stdout}");
    assert!(stdout.contains("ignored: b.txt\n"), "unexpected output:\n{stdout}");
}

#[test]
fn json_report() {
    let out = run(&["in.txt", "--output=out.txt", "--json"]);
    assert_success(&out, "--json");

    let report: serde_json::Value =
        serde_json::from_slice(&out.stdout).expect("stdout is not valid JSON");
    assert_eq!(report["error-code"], "no-error");
    assert_eq!(report["arguments"][0]["name"], "source");
    assert_eq!(report["arguments"][0]["value"], "in.txt");

    let options = report["options"].as_array().expect("options is not an array");
    let output = options
        .iter()
        .find(|o| o["name"] == "-o")
        .expect("-o missing from report");
    assert_eq!(output["enabled"], true);
    assert_eq!(output["value"], "out.txt");
    assert_eq!(output["aliases"][0], "--output");
}

#[cfg(unix)]
#[test]
fn non_utf8_argument_is_replaced() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let out = demo()
        .arg(OsStr::from_bytes(b"in\xff.txt"))
        .output()
        .expect("failed to run cmdline-demo");
    assert_success(&out, "non-UTF-8 argument");
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        stdout.contains("source: in\u{FFFD}.txt\n"),
        "unexpected output:\n{stdout}"
    );
}
