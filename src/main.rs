use clap::{Arg, Command};
use log::LevelFilter;
use phishguard::config::AnalyzerConfig;
use phishguard::detection::ContentCategory;
use phishguard::pipeline::{AnalysisReport, Pipeline};
use phishguard::store::RecordStore;
use std::process;

#[tokio::main]
async fn main() {
    let matches = Command::new("phishguard")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Heuristic social-engineering and phishing analyzer")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("phishguard.yaml"),
        )
        .arg(
            Arg::new("analyze")
                .short('a')
                .long("analyze")
                .value_name("TEXT")
                .help("Analyze a piece of text and print the report")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("FILE")
                .help("Analyze the contents of a file")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("type")
                .short('t')
                .long("type")
                .value_name("CATEGORY")
                .help("Force the content category (url, email, message)")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Emit the full report as JSON instead of a rendered summary")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("serve")
                .long("serve")
                .help("Start the JSON API server")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("history")
                .long("history")
                .help("List stored analyses")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("stats")
                .long("stats")
                .help("Show aggregate statistics for stored analyses")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Write a default configuration file and exit")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if let Some(path) = matches.get_one::<String>("generate-config") {
        match AnalyzerConfig::generate_default(path) {
            Ok(()) => println!("Default configuration written to {path}"),
            Err(e) => {
                eprintln!("Error writing configuration: {e}");
                process::exit(1);
            }
        }
        return;
    }

    let config_path = matches.get_one::<String>("config").unwrap();
    let config = match AnalyzerConfig::load_or_default(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            process::exit(1);
        }
    };

    if matches.get_flag("serve") {
        if let Err(e) = phishguard::server::serve(config).await {
            eprintln!("Server error: {e}");
            process::exit(1);
        }
        return;
    }

    if matches.get_flag("history") {
        show_history(&config);
        return;
    }

    if matches.get_flag("stats") {
        show_stats(&config);
        return;
    }

    let declared = match matches.get_one::<String>("type").map(String::as_str) {
        None => None,
        Some("url") => Some(ContentCategory::Url),
        Some("email") => Some(ContentCategory::Email),
        Some("message") => Some(ContentCategory::Message),
        Some(other) => {
            eprintln!("Unknown content type: {other} (expected url, email, or message)");
            process::exit(1);
        }
    };

    let content = if let Some(text) = matches.get_one::<String>("analyze") {
        text.clone()
    } else if let Some(path) = matches.get_one::<String>("file") {
        match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading {path}: {e}");
                process::exit(1);
            }
        }
    } else {
        eprintln!("Nothing to do: pass --analyze, --file, --serve, --history, or --stats");
        process::exit(1);
    };

    let pipeline = Pipeline::new(config.detection.clone());
    let report = pipeline.analyze(&content, declared);

    if matches.get_flag("json") {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing report: {e}");
                process::exit(1);
            }
        }
    } else {
        print_report(&report);
    }
}

fn print_report(report: &AnalysisReport) {
    let detection = &report.detection;
    let explanation = &report.explanation;

    println!("Risk level: {}", explanation.risk_level.label());
    println!(
        "Threat score: {}/100 (phishing: {})",
        detection.threat_score, detection.is_phishing
    );
    println!("Category: {}", detection.category.label());
    println!("Attack type: {}", report.reasoning.attack_type);
    println!();
    println!("{}", explanation.summary);

    if !detection.indicators.is_empty() {
        println!();
        println!("Indicators:");
        for indicator in &detection.indicators {
            match &indicator.evidence {
                Some(evidence) => println!(
                    "  [{}] {}: {} ({})",
                    indicator.severity.label(),
                    indicator.kind.label(),
                    indicator.description,
                    evidence
                ),
                None => println!(
                    "  [{}] {}: {}",
                    indicator.severity.label(),
                    indicator.kind.label(),
                    indicator.description
                ),
            }
        }
    }

    if !explanation.recommendations.is_empty() {
        println!();
        println!("Recommendations:");
        for recommendation in &explanation.recommendations {
            println!("  - {recommendation}");
        }
    }
}

fn show_history(config: &AnalyzerConfig) {
    let store = match RecordStore::open(&config.server.database_path) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error opening record store: {e}");
            process::exit(1);
        }
    };
    match store.list_all() {
        Ok(entries) if entries.is_empty() => println!("No stored analyses."),
        Ok(entries) => {
            for entry in entries {
                println!(
                    "#{} [{}] {} score {} - {}",
                    entry.id,
                    entry.timestamp,
                    entry.category,
                    entry.threat_score,
                    preview(&entry.content)
                );
            }
        }
        Err(e) => {
            eprintln!("Error listing analyses: {e}");
            process::exit(1);
        }
    }
}

fn show_stats(config: &AnalyzerConfig) {
    let store = match RecordStore::open(&config.server.database_path) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error opening record store: {e}");
            process::exit(1);
        }
    };
    match store.stats() {
        Ok(stats) => {
            println!("Stored analyses:    {}", stats.total_analyses);
            println!("Average score:      {:.1}", stats.average_threat_score);
            println!("High threats (70+): {}", stats.high_threat_count);
        }
        Err(e) => {
            eprintln!("Error reading statistics: {e}");
            process::exit(1);
        }
    }
}

fn preview(content: &str) -> String {
    let single_line = content.replace(['\n', '\r'], " ");
    if single_line.chars().count() > 60 {
        let truncated: String = single_line.chars().take(57).collect();
        format!("{truncated}...")
    } else {
        single_line
    }
}
