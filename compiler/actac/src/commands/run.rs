//! The `run` command: parse, analyze, optimize and evaluate an Acta file.

use acta_eval::Value;

use super::{read_file, report_diagnostics};
use crate::{RunConfig, Session};

/// Run an Acta source file.
///
/// `print` output goes to stdout, followed by the program's value when it is
/// not null. Any error exits with status 1.
pub fn run_file(path: &str, optimize: bool) {
    let content = read_file(path);
    let config = if optimize {
        RunConfig::default()
    } else {
        RunConfig::default().without_optimizer()
    };
    let output = Session::new(config).run(&content);
    report_diagnostics(path, &output);

    if !output.is_ok() {
        std::process::exit(1);
    }
    if output.value != Value::Null {
        println!("{}", output.value);
    }
}
