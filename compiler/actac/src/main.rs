//! Acta CLI
//!
//! Runs or checks Acta action scripts.

use actac::commands::{check_file, run_file};

fn main() {
    actac::init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];

    match command.as_str() {
        "run" => {
            let mut optimize = true;
            let mut file_path = None;

            for arg in args.iter().skip(2) {
                if arg == "--no-opt" {
                    optimize = false;
                } else if !arg.starts_with('-') && file_path.is_none() {
                    file_path = Some(arg.as_str());
                }
            }

            let Some(path) = file_path else {
                eprintln!("Usage: acta run <file.acta> [--no-opt]");
                eprintln!();
                eprintln!("Options:");
                eprintln!("  --no-opt    Skip the optimizer");
                std::process::exit(1);
            };
            run_file(path, optimize);
        }
        "check" => {
            if args.len() < 3 {
                eprintln!("Usage: acta check <file.acta>");
                std::process::exit(1);
            }
            check_file(&args[2]);
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" | "-v" => {
            println!("acta {}", env!("CARGO_PKG_VERSION"));
        }
        _ => {
            // Treat a bare path as `run`
            if std::path::Path::new(command)
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("acta"))
            {
                run_file(command, true);
            } else {
                eprintln!("Unknown command: {command}");
                eprintln!();
                print_usage();
                std::process::exit(1);
            }
        }
    }
}

fn print_usage() {
    println!("Acta action language");
    println!();
    println!("Usage: acta <command> [options]");
    println!();
    println!("Commands:");
    println!("  run <file>     Parse, check, optimize and run a file");
    println!("  check <file>   Parse and check a file without running it");
    println!("  help           Show this help message");
    println!("  version        Show version information");
    println!();
    println!("Set RUST_LOG (e.g. RUST_LOG=acta_eval=debug) for trace output.");
}
