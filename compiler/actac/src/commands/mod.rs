//! Command implementations for the `acta` binary.

mod check;
mod run;

pub use check::check_file;
pub use run::run_file;

use crate::RunOutput;

/// Read a source file, exiting with a message when it cannot be read.
pub(super) fn read_file(path: &str) -> String {
    match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            let msg = match e.kind() {
                std::io::ErrorKind::NotFound => format!("cannot find file '{path}'"),
                std::io::ErrorKind::PermissionDenied => {
                    format!("permission denied reading '{path}'")
                }
                std::io::ErrorKind::InvalidData => {
                    format!("'{path}' contains invalid UTF-8 data")
                }
                _ => format!("error reading '{path}': {e}"),
            };
            eprintln!("{msg}");
            std::process::exit(1);
        }
    }
}

/// Print warnings and errors as `path:line:col: severity: message`.
fn report_diagnostics(path: &str, output: &RunOutput) {
    for warning in &output.warnings {
        eprintln!("{}", located(path, "warning", warning));
    }
    for error in &output.errors {
        eprintln!("{}", located(path, "error", error));
    }
}

/// Splice the severity in after the `line:col:` prefix of a rendered
/// diagnostic.
fn located(path: &str, severity: &str, rendered: &str) -> String {
    let mut parts = rendered.splitn(3, ':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(line), Some(col), Some(message)) => {
            format!("{path}:{line}:{col}: {severity}:{message}")
        }
        _ => format!("{path}: {severity}: {rendered}"),
    }
}

#[cfg(test)]
mod tests {
    use super::located;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_located_inserts_severity() {
        assert_eq!(
            located("a.acta", "error", "3:7: unknown variable `x`"),
            "a.acta:3:7: error: unknown variable `x`"
        );
        assert_eq!(located("a.acta", "error", "odd"), "a.acta: error: odd");
    }
}
