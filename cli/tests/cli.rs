use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn fake_tool() -> String {
    let path = concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../core/tests/fixtures/fake_generate.sh"
    );
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }
    path.to_string()
}

/// `stylegen` running in an empty directory with no config or env leaking in
fn stylegen(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("stylegen").unwrap();
    cmd.current_dir(dir)
        .env("XDG_CONFIG_HOME", dir.join("xdg"))
        .env_remove("STYLEGEN_EXECUTABLE")
        .env_remove("STYLEGEN_MODEL")
        .env_remove("STYLEGEN_ADAPTER_PATH")
        .env_remove("RUST_BACKTRACE")
        .env_remove("RUST_LIB_BACKTRACE");
    cmd
}

fn workspace() -> TempDir {
    tempfile::tempdir().unwrap()
}

#[test]
fn show_command_prints_argument_vector() {
    let dir = workspace();
    stylegen(dir.path())
        .args([
            "--executable",
            "/opt/venv/bin/python",
            "--adapter-path",
            "adapters/cams_formal",
            "--temp",
            "0.1",
            "--top-p",
            "0.1",
            "--no-seed",
            "--extra-arg",
            "--ignore-chat-template",
            "show-command",
            "hello there",
        ])
        .assert()
        .success()
        .stdout(
            "/opt/venv/bin/python\n-m\nmlx_lm.generate\n\
             --model\nQwen/Qwen2-7B-Instruct-MLX\n--max-tokens\n256\n\
             --adapter-path\nadapters/cams_formal\n--temp\n0.1\n--top-p\n0.1\n\
             --ignore-chat-template\n--prompt\nhello there\n",
        );
}

#[test]
fn show_command_reads_config_file() {
    let dir = workspace();
    std::fs::write(
        dir.path().join("stylegen.json"),
        r#"{"executable": "/file/python", "model": "local-model", "max_tokens": 32, "seed": 7}"#,
    )
    .unwrap();

    stylegen(dir.path())
        .args(["show-command", "p"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "/file/python\n-m\nmlx_lm.generate\n--model\nlocal-model\n--max-tokens\n32\n",
        ))
        .stdout(predicate::str::contains("--seed\n7\n--prompt\np\n"));
}

#[test]
fn missing_executable_is_reported() {
    let dir = workspace();
    stylegen(dir.path())
        .args(["show-command", "p"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No executable configured"));
}

#[test]
fn generate_prints_trimmed_output() {
    let dir = workspace();
    stylegen(dir.path())
        .args(["--executable", &fake_tool(), "generate", "anything"])
        .assert()
        .success()
        .stdout("hello world\n");
}

#[test]
fn generate_failure_reports_exit_code_command_and_stderr() {
    let dir = workspace();
    let tool = fake_tool();
    stylegen(dir.path())
        .args(["--executable", &tool, "generate", "fail"])
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("exited with code 2"))
        .stderr(predicate::str::contains(format!("command: {} -m mlx_lm.generate", tool)))
        .stderr(predicate::str::contains("error: model not found"));
}

#[test]
fn generate_failure_without_command_echo() {
    let dir = workspace();
    stylegen(dir.path())
        .args(["--executable", &fake_tool(), "--no-echo-command", "generate", "fail"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("exited with code 2"))
        .stderr(predicate::str::contains("error: model not found"))
        .stderr(predicate::str::contains("\ncommand: ").not());
}

#[test]
fn generate_times_out() {
    let dir = workspace();
    let pid_file = dir.path().join("child.pid");
    stylegen(dir.path())
        .args([
            "--executable",
            &fake_tool(),
            "--timeout",
            "0.5",
            "generate",
            &format!("hang:{}", pid_file.display()),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("timed out"));
}

#[test]
fn rewrite_prints_original_and_rewrite() {
    let dir = workspace();
    stylegen(dir.path())
        .args(["--executable", &fake_tool(), "rewrite", "明天行吗？"])
        .assert()
        .success()
        .stdout("原文：\n明天行吗？\n\n改写：\nhello world\n");
}

#[test]
fn rewrite_uses_custom_template() {
    let dir = workspace();
    let template = dir.path().join("dump.hbs");
    std::fs::write(&template, "dump-args").unwrap();

    // the fake tool echoes its arguments for the "dump-args" prompt
    stylegen(dir.path())
        .args([
            "--executable",
            &fake_tool(),
            "rewrite",
            "ignored",
            "--template",
            template.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("--prompt\ndump-args"));
}

#[test]
fn imitate_prints_story() {
    let dir = workspace();
    stylegen(dir.path())
        .args(["--executable", &fake_tool(), "imitate", "鲁迅"])
        .assert()
        .success()
        .stdout("hello world\n");
}

#[test]
fn rejects_invalid_timeout() {
    let dir = workspace();
    stylegen(dir.path())
        .args(["--executable", "python3", "--timeout", "0", "generate", "p"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("positive"));
}

#[test]
fn rejects_overflowing_timeout() {
    let dir = workspace();
    stylegen(dir.path())
        .args(["--executable", "python3", "--timeout", "1e30", "generate", "p"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("not a valid timeout"))
        .stderr(predicate::str::contains("panicked").not());
}
