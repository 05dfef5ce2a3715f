use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(label: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    path.push(format!("deploykit_{}_{}_{label}", std::process::id(), nanos));
    path
}

fn write_temp_file(label: &str, contents: &str) -> PathBuf {
    let path = temp_path(label);
    fs::write(&path, contents).expect("write temp file");
    path
}

const TABLE: &str = r#"
[[adapter]]
mac = "00-15-5D-10-10-10"
tsid = "b94dbbb4-2ede-4e95-8902-8a24a5a53543"
"#;

const BOOTSTRAP: &str = r#"{
  "Server": "deploy01.corp.example",
  "Variables": {
    "TSID": "",
    "SiteCode": "HQ1"
  }
}
"#;

fn deploykit() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_deploykit"));
    cmd.env_remove("DEPLOYKIT_LOG");
    cmd
}

#[test]
fn test_cli_resolve_prints_tsid() {
    let table = write_temp_file("resolve_table.toml", TABLE);

    let output = deploykit()
        .args(["resolve", "--table"])
        .arg(&table)
        .args(["--mac", "00:15:5d:99:99:99", "--mac", "00:15:5d:10:10:10"])
        .output()
        .expect("run binary");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ADAPTER=arg1"));
    assert!(stdout.contains("MAC=00-15-5D-10-10-10"));
    assert!(stdout.contains("TSID=b94dbbb4-2ede-4e95-8902-8a24a5a53543"));
}

#[test]
fn test_cli_resolve_no_match_fails() {
    let table = write_temp_file("nomatch_table.toml", TABLE);

    let output = deploykit()
        .args(["resolve", "--table"])
        .arg(&table)
        .args(["--mac", "00:15:5d:99:99:99"])
        .output()
        .expect("run binary");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No detected adapter matches the adapter table"));
    assert!(stderr.contains("00:15:5d:99:99:99"));
}

#[test]
fn test_cli_set_tsid_writes_output() {
    let table = write_temp_file("set_table.toml", TABLE);
    let input = write_temp_file("set_in.json", BOOTSTRAP);
    let out = temp_path("set_out.json");

    let output = deploykit()
        .args(["set-tsid", "--table"])
        .arg(&table)
        .args(["--mac", "00-15-5d-10-10-10", "--in"])
        .arg(&input)
        .arg("--out")
        .arg(&out)
        .output()
        .expect("run binary");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(
        written["Variables"]["TSID"],
        "b94dbbb4-2ede-4e95-8902-8a24a5a53543"
    );
    assert_eq!(written["Variables"]["SiteCode"], "HQ1");
    assert_eq!(fs::read_to_string(&input).unwrap(), BOOTSTRAP);
}

#[test]
fn test_cli_set_tsid_rejects_same_input_output() {
    let input = write_temp_file("same_io.json", BOOTSTRAP);

    let output = deploykit()
        .args(["set-tsid", "--tsid", "b94dbbb4-2ede-4e95-8902-8a24a5a53543", "--in"])
        .arg(&input)
        .arg("--out")
        .arg(&input)
        .output()
        .expect("run binary");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Output path must be different from input path"));
}

#[test]
fn test_cli_cert_find_prints_thumbprint() {
    let store = temp_path("cert_store");
    fs::create_dir_all(&store).unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    for name in ["deploy01.pem", "deploy01_public.pem", "other01.pem"] {
        fs::copy(fixtures.join(name), store.join(name)).unwrap();
    }

    let output = deploykit()
        .args(["cert", "find", "--store"])
        .arg(&store)
        .args([
            "--issuer",
            "Corp Issuing CA",
            "--hostname",
            "deploy01",
            "--dns-suffix",
            "corp.example",
        ])
        .output()
        .expect("run binary");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), "BBC646B318ACE27C68C3F83941894A6001C55DCE");

    fs::remove_dir_all(&store).unwrap();
}

#[cfg(unix)]
#[test]
fn test_cli_install_propagates_failure_code() {
    let output = deploykit()
        .args(["install", "--", "sh", "-c", "exit 1603"])
        .output()
        .expect("run binary");

    // 1603 is truncated to 8 bits by the shell
    assert_eq!(output.status.code(), Some(1603 % 256));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Installer exited with code 67"));
}

#[cfg(unix)]
#[test]
fn test_cli_install_success() {
    let output = deploykit()
        .args(["install", "--", "sh", "-c", "exit 0"])
        .output()
        .expect("run binary");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Install succeeded"));
}

#[test]
fn test_cli_wait_port_times_out() {
    // Bind then drop to get a port nothing listens on
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().to_string()
    };

    let output = deploykit()
        .args(["wait-port", "--addr", &addr, "--timeout", "1", "--interval", "100"])
        .output()
        .expect("run binary");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Timed out"));
}

#[test]
fn test_cli_writes_log_file() {
    let table = write_temp_file("log_table.toml", TABLE);
    let log_dir = temp_path("logs");

    let output = deploykit()
        .args(["resolve", "--table"])
        .arg(&table)
        .args(["--mac", "00:15:5d:10:10:10", "--log-dir"])
        .arg(&log_dir)
        .output()
        .expect("run binary");

    assert!(output.status.success());
    let logs: Vec<_> = fs::read_dir(&log_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(logs.len(), 1);
    assert!(logs[0].starts_with("deploykit-resolve-"));

    let contents = fs::read_to_string(log_dir.join(&logs[0])).unwrap();
    assert!(contents.contains("matches the table"));

    fs::remove_dir_all(&log_dir).unwrap();
}
