use std::fmt::Write as _;

use crate::process::ExecutionResult;

/// Render a finished run for display.
///
/// The `executed:` line appears only when the backend ran something other
/// than what was requested.
pub fn render_transcript(requested: &[String], result: &ExecutionResult) -> String {
    let mut out = format!("$ docker {}", requested.join(" "));
    if result.arguments != requested {
        let _ = write!(out, "\nexecuted: {} {}", result.command, result.arguments.join(" "));
    }
    let _ = write!(out, "\nexit code: {}", result.exit_code);
    let _ = write!(out, "\nduration: {:.2}s", result.duration.as_secs_f64());

    for (label, text) in [("stdout", &result.stdout), ("stderr", &result.stderr)] {
        let text = text.trim();
        if !text.is_empty() {
            let _ = write!(out, "\n\n{label}:\n{text}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn result(arguments: &[&str], stdout: &str, stderr: &str) -> ExecutionResult {
        ExecutionResult {
            command: "/usr/local/bin/container".into(),
            arguments: arguments.iter().map(|a| a.to_string()).collect(),
            stdout: stdout.into(),
            stderr: stderr.into(),
            exit_code: 0,
            duration: Duration::from_millis(1234),
        }
    }

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn translated_run_shows_executed_command() {
        let text = render_transcript(
            &argv(&["ps", "--all"]),
            &result(&["list", "--all"], "ID  NAME\n", ""),
        );
        assert_eq!(
            text,
            "$ docker ps --all\n\
             executed: /usr/local/bin/container list --all\n\
             exit code: 0\n\
             duration: 1.23s\n\
             \n\
             stdout:\n\
             ID  NAME"
        );
    }

    #[test]
    fn untranslated_run_omits_executed_line_and_empty_sections() {
        let text = render_transcript(&argv(&["network", "ls"]), &result(&["network", "ls"], "  \n", "warn\n"));
        assert_eq!(
            text,
            "$ docker network ls\nexit code: 0\nduration: 1.23s\n\nstderr:\nwarn"
        );
    }
}
