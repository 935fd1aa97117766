use clap::{Arg, ArgAction, Command};
use grievance_router::batch;
use grievance_router::config::loader::load_config_or_default;
use grievance_router::service::ComplaintService;
use grievance_router::{ComplaintSubmission, Config, LoginRequest};
use log::LevelFilter;
use serde::Serialize;
use std::process;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let matches = Command::new("grievance-router")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Classifies citizen grievances, routes them to departments and officers, and authenticates officials")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("grievance-router.yaml"),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Generate a default configuration file")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("test-config")
                .long("test-config")
                .help("Validate the configuration and print a summary")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("submit")
                .long("submit")
                .value_name("FILE")
                .help("Process one complaint submission (JSON file)")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("login")
                .long("login")
                .help("Authenticate an official (use with --username, --password, --govt-id)")
                .action(ArgAction::SetTrue),
        )
        .arg(Arg::new("username").long("username").value_name("USERNAME"))
        .arg(Arg::new("password").long("password").value_name("PASSWORD"))
        .arg(Arg::new("govt-id").long("govt-id").value_name("GOVT_ID"))
        .arg(
            Arg::new("batch")
                .long("batch")
                .value_name("FILE")
                .help("Process a JSON-lines file of submit/login requests concurrently")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("show-workloads")
                .long("show-workloads")
                .help("Print the configured officer workload table")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable debug logging, including routing decisions")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    if let Some(generate_path) = matches.get_one::<String>("generate-config") {
        generate_default_config(generate_path);
        return;
    }

    let config_path = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or("grievance-router.yaml");

    // Logger comes up before the config is read so load warnings are visible.
    // RUST_LOG, when set, owns the filter; otherwise the configured level is
    // applied as the global max once it is known
    let verbose = matches.get_flag("verbose");
    let env_filter = std::env::var_os("RUST_LOG").is_some();
    let mut builder = env_logger::Builder::from_default_env();
    if !env_filter {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
    if !env_filter {
        log::set_max_level(LevelFilter::Info);
    }

    let config = match load_config_or_default(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e:#}");
            process::exit(1);
        }
    };
    if let Some(level) = max_log_level(env_filter, verbose, config.log_level()) {
        log::set_max_level(level);
    }

    if matches.get_flag("test-config") {
        test_config(&config);
        return;
    }

    let service = Arc::new(ComplaintService::from_config(&config));

    if matches.get_flag("show-workloads") {
        print_workloads(&service);
        return;
    }

    if let Some(path) = matches.get_one::<String>("submit") {
        let submission: ComplaintSubmission = match read_json(path) {
            Ok(submission) => submission,
            Err(e) => {
                eprintln!("Error reading submission: {e:#}");
                process::exit(1);
            }
        };
        let response = service.submit(&submission);
        println!("HTTP {}", response.status().http_code());
        print_json(&response);
        return;
    }

    if matches.get_flag("login") {
        let request = LoginRequest {
            username: matches.get_one::<String>("username").cloned(),
            password: matches.get_one::<String>("password").cloned(),
            govt_id: matches.get_one::<String>("govt-id").cloned(),
        };
        let response = service.login(&request);
        println!("HTTP {}", response.status().http_code());
        print_json(&response);
        return;
    }

    if let Some(path) = matches.get_one::<String>("batch") {
        run_batch_file(Arc::clone(&service), path).await;
        print_workloads(&service);
        return;
    }

    eprintln!("Nothing to do. Use --submit, --login, --batch or --help.");
    process::exit(2);
}

/// Global max level once the config is loaded. `None` leaves RUST_LOG in charge.
fn max_log_level(env_filter: bool, verbose: bool, configured: LevelFilter) -> Option<LevelFilter> {
    if env_filter {
        None
    } else if verbose {
        Some(LevelFilter::Debug)
    } else {
        Some(configured)
    }
}

fn generate_default_config(path: &str) {
    match Config::default().to_file(path) {
        Ok(()) => {
            println!("Default configuration written to: {path}");
            println!("Please edit the configuration file to suit your needs.");
        }
        Err(e) => {
            eprintln!("Error writing configuration file: {e:#}");
            process::exit(1);
        }
    }
}

fn test_config(config: &Config) {
    println!("🔍 Testing configuration...");
    println!();
    println!("Tracking prefix: {} ({:?} scheme)", config.tracking.prefix, config.tracking.scheme);
    println!("Category mappings: {}", config.routing.departments.len());
    println!("Fallback department: {}", config.routing.fallback_department);
    println!("Escalation threshold: P >= {}", config.routing.escalation_threshold);
    println!("Officers: {}", config.routing.officers.len());
    println!("Officials: {}", config.officials.len());
    println!("Refinement rules: {}", config.classification.refinements.len());

    match config.validate() {
        Ok(()) => println!("✅ Configuration is valid"),
        Err(e) => {
            println!("❌ Configuration validation failed:");
            println!("Error: {e}");
            process::exit(1);
        }
    }
}

fn print_workloads(service: &ComplaintService) {
    match service.workloads() {
        Ok(workloads) => {
            println!("📊 Officer workloads");
            println!("═══════════════════════════════════════");
            for (officer, load) in &workloads {
                println!("  {:<30} {:>5}", officer, load);
            }
            println!("───────────────────────────────────────");
            match service.total_load() {
                Ok(total) => println!("  {:<30} {:>5}", "Total open cases", total),
                Err(e) => log::warn!("Failed to total workloads: {e:#}"),
            }
        }
        Err(e) => {
            eprintln!("❌ Failed to read workloads: {e:#}");
            process::exit(1);
        }
    }
}

async fn run_batch_file(service: Arc<ComplaintService>, path: &str) {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("❌ Error reading batch file {path}: {e}");
            process::exit(1);
        }
    };

    let requests = match batch::parse_requests(&content) {
        Ok(requests) => requests,
        Err(e) => {
            eprintln!("❌ {e:#}");
            process::exit(1);
        }
    };

    match batch::run_batch(service, requests).await {
        Ok(responses) => {
            for response in &responses {
                match serde_json::to_string(response) {
                    Ok(line) => println!("{} {}", response.status().http_code(), line),
                    Err(e) => log::error!("Failed to serialize response: {e}"),
                }
            }
        }
        Err(e) => {
            eprintln!("❌ Batch failed: {e:#}");
            process::exit(1);
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> anyhow::Result<T> {
    use anyhow::Context;

    let content = std::fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse JSON in {path}"))
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("❌ Failed to serialize response: {e}");
            process::exit(1);
        }
    }
}
