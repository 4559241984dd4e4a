use detect::{cache, Extension, Features, Level};
use log::{debug, error, info, warn};
use std::path::Path;
use std::process::ExitCode;

use crate::args::{Arguments, Requirement, SubCommandEnum};
use crate::policy::Policy;

mod args;
mod policy;

fn format_level(level: Level) -> String {
    format!("{} ({})", u32::from(level), level)
}

/// Logs every requirement `features` lacks; `true` if there are none.
fn check(requirements: &[Requirement], features: &Features) -> bool {
    let mut ok = true;
    for requirement in requirements {
        if !requirement.satisfied_by(features) {
            warn!("{requirement} is not available");
            ok = false;
        }
    }
    ok
}

fn print_report(features: &Features) {
    println!("level: {}", format_level(features.level));
    for extension in Extension::ALL {
        println!(
            "{}: {}",
            extension,
            if features.has(extension) { "yes" } else { "no" }
        );
    }
}

fn main() -> ExitCode {
    let args: Arguments = argh::from_env();
    let mut log_builder = env_logger::builder();
    if args.verbose {
        log_builder.filter_level(log::LevelFilter::Debug);
    } else {
        log_builder.filter_level(log::LevelFilter::Info);
    }
    log_builder.init();
    debug!("arguments: {args:#?}");

    if !detect::available() {
        info!("cpuid is not available, assuming baseline SIMD support");
    }

    let policy = match &args.policy {
        Some(path) => {
            let path = Path::new(path);
            match Policy::load(path) {
                Ok(policy) => {
                    debug!("policy: {policy:?}");
                    policy
                }
                Err(err) => {
                    error!("{}: {err}", path.display());
                    return ExitCode::from(2);
                }
            }
        }
        None => Policy::default(),
    };

    let detected = Features::detect();
    let features = policy.apply(detected);
    if features != detected {
        info!("policy lowered the detected features");
    }
    cache::store(features);
    let features = cache::detect_features();

    match args.cmd {
        SubCommandEnum::Level(_) => {
            println!("{}", format_level(features.level));
            ExitCode::SUCCESS
        }
        SubCommandEnum::Report(report) => {
            if report.json {
                match serde_json::to_string_pretty(&features) {
                    Ok(json) => println!("{json}"),
                    Err(err) => {
                        error!("failed to serialize the report: {err}");
                        return ExitCode::from(2);
                    }
                }
            } else {
                print_report(&features);
            }
            ExitCode::SUCCESS
        }
        SubCommandEnum::Check(check_args) => {
            if check(&check_args.requirements, &features) {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
