use std::{fs, path::PathBuf, process::Command};

fn script(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("skirmish-{}-{name}.txt", std::process::id()));
    fs::write(&path, contents).expect("failed to write script");
    path
}

fn skirmish(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_skirmish"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run skirmish")
}

#[test]
fn scripted_menu_flow_reaches_battle() {
    let path = script("menu", "help\nselect zombie\nmethod 2\nshow\nquit\n");
    let output = skirmish(&["--script", path.to_str().expect("utf-8 path")]);
    let _ = fs::remove_file(&path);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1. Zombie"));
    assert!(stdout.contains("commands:"));
    assert!(stdout.contains("Stage 1: choose an inference method"));
    assert!(stdout.contains("Battle vs Zombie using sugeno inference."));
}

#[test]
fn malformed_script_line_fails_with_its_number() {
    let path = script("malformed", "# opening\ndance\n");
    let output = skirmish(&["--script", path.to_str().expect("utf-8 path")]);
    let _ = fs::remove_file(&path);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("script line 2"));
}

#[test]
fn out_of_phase_intents_are_reported_but_not_fatal() {
    let path = script("phase", "end\nquit\n");
    let output = skirmish(&[
        "--enemy",
        "1",
        "--script",
        path.to_str().expect("utf-8 path"),
    ]);
    let _ = fs::remove_file(&path);

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("`end_turn` is not available"));
}
