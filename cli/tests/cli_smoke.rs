use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const ENV_KEYS: &[&str] = &[
    "OPENAI_API_KEY",
    "DASHSCOPE_API_KEY",
    "WORK_AGENT_BACKEND",
    "WORK_AGENT_MODEL",
    "WORK_AGENT_BASE_URL",
    "WORK_AGENT_TOOL_POLICY",
    "WEATHER_API_KEY",
    "WEATHER_API_BASE_URL",
    "WEATHER_API_TIMEOUT",
    "LOG_LEVEL",
];

/// A command isolated from config files and credentials on the host
fn work_agent(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("work-agent").unwrap();
    cmd.current_dir(dir.path())
        .env("XDG_CONFIG_HOME", dir.path().join("xdg"))
        .env("HOME", dir.path());
    for key in ENV_KEYS {
        cmd.env_remove(key);
    }
    cmd
}

#[test]
fn tools_lists_builtin_tools_without_weather() {
    let dir = TempDir::new().unwrap();
    work_agent(&dir)
        .args(["tools", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"shell_echo\""))
        .stdout(predicate::str::contains("\"get_current_time\""))
        .stdout(predicate::str::contains("get_city_weather").not());
}

#[test]
fn tools_lists_weather_tool_when_key_is_set() {
    let dir = TempDir::new().unwrap();
    work_agent(&dir)
        .env("WEATHER_API_KEY", "test-key")
        .arg("tools")
        .assert()
        .success()
        .stdout(predicate::str::contains("get_city_weather (from weather_tool)"));
}

#[test]
fn fail_fast_policy_reports_broken_source() {
    let dir = TempDir::new().unwrap();
    work_agent(&dir)
        .env("WORK_AGENT_TOOL_POLICY", "fail_fast")
        .arg("tools")
        .assert()
        .failure()
        .stderr(predicate::str::contains("weather_tool"));
}

#[test]
fn call_native_and_bridged_agree() {
    let dir = TempDir::new().unwrap();
    for extra in [None, Some("--bridged")] {
        let mut cmd = work_agent(&dir);
        cmd.args(["call", "shell_echo", r#"{"text": "hello"}"#]);
        if let Some(flag) = extra {
            cmd.arg(flag);
        }
        cmd.assert().success().stdout("[ECHO] hello\n");
    }
}

#[test]
fn bridged_call_reports_failures_as_text() {
    let dir = TempDir::new().unwrap();
    work_agent(&dir)
        .args(["call", "get_current_time", r#"{"timezone_name": "Mars"}"#, "--bridged"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "Tool get_current_time execution failed:",
        ));

    work_agent(&dir)
        .args(["call", "shell_echo", "{not json", "--bridged"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Malformed tool arguments"));
}

#[test]
fn call_unknown_tool_fails() {
    let dir = TempDir::new().unwrap();
    work_agent(&dir)
        .args(["call", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Tool nope not found"));
}

#[test]
fn agent_requires_credentials() {
    let dir = TempDir::new().unwrap();
    work_agent(&dir)
        .arg("agent")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No configuration found"));
}

#[test]
fn agent_uses_config_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("work-agent.json"),
        r#"{"backend": "blocking_tools", "api_key": "sk-test", "model": "qwen-max"}"#,
    )
    .unwrap();

    work_agent(&dir)
        .arg("agent")
        .assert()
        .success()
        .stdout(predicate::str::contains("Backend: blocking_tools"))
        .stdout(predicate::str::contains("Model: qwen-max"))
        .stdout(predicate::str::contains("\"name\": \"shell_echo\""));
}

#[test]
fn agent_backend_flag_overrides_environment() {
    let dir = TempDir::new().unwrap();
    work_agent(&dir)
        .env("OPENAI_API_KEY", "sk-a")
        .env("DASHSCOPE_API_KEY", "sk-b")
        .args(["agent", "--backend", "openai"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Backend: function_tools"))
        .stdout(predicate::str::contains("Model: gpt-4o"));
}

#[test]
fn debug_logs_stay_off_stdout() {
    let dir = TempDir::new().unwrap();
    let output = work_agent(&dir)
        .env("LOG_LEVEL", "debug")
        .args(["tools", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let listed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 2);
    assert!(String::from_utf8_lossy(&output.stderr).contains("Tool discovery finished"));
}
