//! The `check` command: parse and analyze an Acta file without running it.

use super::{read_file, report_diagnostics};
use crate::Session;

/// Check a file, reporting every parse or semantic error before exiting.
pub fn check_file(path: &str) {
    let content = read_file(path);
    let output = Session::default().check(&content);
    report_diagnostics(path, &output);

    if output.is_ok() {
        println!("{path}: ok ({} warning(s))", output.warnings.len());
    } else {
        std::process::exit(1);
    }
}
