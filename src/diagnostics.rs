//! System diagnostics and dependency checking.
//!
//! Verifies that the external tools the pipeline shells out to are installed.

use crate::defaults;
use std::process::Command;

/// Result of a dependency check.
#[derive(Debug, PartialEq)]
pub enum CheckResult {
    /// Tool is installed and working
    Ok(String),
    /// Tool is not found
    NotFound,
    /// Tool is found but has issues
    Warning(String),
}

/// Run `command version_flag` and report the first line of its output.
fn check_command(command: &str, version_flag: &str) -> CheckResult {
    match Command::new(command).arg(version_flag).output() {
        Ok(output) if output.status.success() => {
            // aws prints its version on stdout, older releases on stderr
            let text = if output.stdout.is_empty() {
                String::from_utf8_lossy(&output.stderr).to_string()
            } else {
                String::from_utf8_lossy(&output.stdout).to_string()
            };
            CheckResult::Ok(text.lines().next().unwrap_or("").trim().to_string())
        }
        Ok(_) => CheckResult::Warning(format!(
            "'{}' found but {} failed",
            command, version_flag
        )),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => CheckResult::NotFound,
        Err(e) => CheckResult::Warning(format!("Error checking '{}': {}", command, e)),
    }
}

/// Check that ffmpeg is installed.
pub fn check_ffmpeg() -> CheckResult {
    check_command(defaults::FFMPEG, "-version")
}

/// Check that the AWS CLI is installed.
pub fn check_aws_cli() -> CheckResult {
    check_command(defaults::AWS_CLI, "--version")
}

fn report(label: &str, result: &CheckResult, install_hint: &str) -> bool {
    print!("{label}: ");
    match result {
        CheckResult::Ok(version) if version.is_empty() => {
            println!("✓ OK");
            true
        }
        CheckResult::Ok(version) => {
            println!("✓ OK ({version})");
            true
        }
        CheckResult::NotFound => {
            println!("✗ NOT FOUND");
            println!("  {install_hint}");
            false
        }
        CheckResult::Warning(msg) => {
            println!("⚠ WARNING: {msg}");
            false
        }
    }
}

/// Run all dependency checks and print results.
///
/// Returns true when every tool is usable.
pub fn check_dependencies() -> bool {
    println!("recap {}", crate::version_string());
    println!("Checking system dependencies...\n");

    let ffmpeg_ok = report(
        "ffmpeg (audio conversion)",
        &check_ffmpeg(),
        "Install: sudo apt install ffmpeg  (Debian/Ubuntu) | brew install ffmpeg  (macOS)",
    );
    let aws_ok = report(
        "aws (S3, Transcribe, Bedrock)",
        &check_aws_cli(),
        "Install: https://docs.aws.amazon.com/cli/latest/userguide/getting-started-install.html",
    );

    println!();
    if ffmpeg_ok && aws_ok {
        println!("All dependencies available.");
    } else {
        println!("Some dependencies are missing; recap will fail at the stage that needs them.");
    }
    ffmpeg_ok && aws_ok
}
