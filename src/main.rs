use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use convo_score::scoring::{AnalysisConfig, Analyzer};
use convo_score::store::{ConversationStore, StoreError};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, warn};

const EXIT_SUCCESS: i32 = 0;
const EXIT_FAILURE: i32 = 1;
const EXIT_CONFIG: i32 = 4;
const EXIT_NOT_FOUND: i32 = 5;

#[derive(ValueEnum, Clone, Copy, Debug, Default)]
enum ReportFormat {
    #[default]
    Table,
    Tsv,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Import conversations from JSON upload files (paths or glob patterns)
    Import {
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// Analyze one conversation and store the result
    Analyze {
        /// Conversation id (as printed by import)
        id: u64,
    },
    /// Analyze every stored conversation, continuing past failures
    Batch,
    /// List stored analyses, newest first (default if no subcommand)
    Reports {
        #[arg(short, long, value_enum, default_value_t = ReportFormat::Table)]
        format: ReportFormat,
    },
    /// Print a stored conversation transcript
    Show {
        id: u64,
    },
}

#[derive(Parser, Debug)]
#[command(name = "convo-score")]
#[command(about = "Conversation quality scoring CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging and score breakdowns
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/convo-score/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Directory holding the conversation store (overrides config)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn main() {
    let cli = Cli::parse();
    convo_score::logging::init_tracing(cli.verbose);

    let command = cli.command.unwrap_or(Commands::Reports {
        format: ReportFormat::Table,
    });
    let start_time = Instant::now();

    // Load config
    let config_path = cli.config.map(PathBuf::from);
    let config = match convo_score::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Validate analysis config at startup
    let analysis_config = config.analysis.clone().unwrap_or_default();
    if let Err(errors) = convo_score::scoring::validate_analysis(&analysis_config) {
        eprintln!("Analysis config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let data_dir = match convo_score::config::resolve_data_dir(cli.data_dir, &config) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    let mut store = match ConversationStore::open(&data_dir) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Store error: {:#}", e);
            std::process::exit(EXIT_FAILURE);
        }
    };

    let use_colors = convo_score::output::should_use_colors();

    let code = match command {
        Commands::Import { paths } => run_import(&mut store, &paths),
        Commands::Analyze { id } => {
            let analyzer = build_analyzer(analysis_config);
            run_analyze(&mut store, &analyzer, id, cli.verbose, use_colors)
        }
        Commands::Batch => {
            let analyzer = build_analyzer(analysis_config);
            let summary = convo_score::pipeline::run_batch(&mut store, &analyzer, Utc::now());
            println!(
                "Analysis completed for {} conversations.",
                summary.processed
            );
            if summary.failed.is_empty() {
                EXIT_SUCCESS
            } else {
                eprintln!("{} conversations failed:", summary.failed.len());
                for (id, error) in &summary.failed {
                    eprintln!("  #{}: {}", id, error);
                }
                EXIT_FAILURE
            }
        }
        Commands::Reports { format } => run_reports(&store, format, use_colors),
        Commands::Show { id } => match store.conversation(id) {
            Ok(conversation) => {
                println!("#{} {}", conversation.id, conversation.display_title());
                println!(
                    "{}",
                    convo_score::output::format_transcript(conversation, use_colors)
                );
                EXIT_SUCCESS
            }
            Err(e) => {
                eprintln!("{}", e);
                EXIT_NOT_FOUND
            }
        },
    };

    debug!(elapsed = ?start_time.elapsed(), "done");
    std::process::exit(code);
}

fn build_analyzer(config: AnalysisConfig) -> Analyzer {
    match Analyzer::with_vader(config) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Analysis config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    }
}

fn run_import(store: &mut ConversationStore, patterns: &[String]) -> i32 {
    let mut files = Vec::new();
    let mut failures = 0;

    for pattern in patterns {
        match glob::glob(pattern) {
            Ok(paths) => {
                let before = files.len();
                for entry in paths {
                    match entry {
                        Ok(path) => files.push(path),
                        Err(e) => {
                            eprintln!("Cannot read {}: {}", e.path().display(), e.error());
                            failures += 1;
                        }
                    }
                }
                if files.len() == before {
                    eprintln!("No files matched: {}", pattern);
                    failures += 1;
                }
            }
            Err(e) => {
                eprintln!("Invalid pattern '{}': {}", pattern, e);
                failures += 1;
            }
        }
    }

    for path in files {
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to read {}: {}", path.display(), e);
                failures += 1;
                continue;
            }
        };

        let conversation = match convo_score::conversation::parse_upload(&content) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Invalid conversation in {}: {}", path.display(), e);
                failures += 1;
                continue;
            }
        };

        let message_count = conversation.messages.len();
        match store.insert_conversation(conversation, Utc::now()) {
            Ok(id) => println!(
                "Imported {} as conversation #{} ({} messages)",
                path.display(),
                id,
                message_count
            ),
            Err(e) => {
                // A failed write leaves the store file untouched; stop here
                eprintln!("Store error: {:#}", e);
                return EXIT_FAILURE;
            }
        }
    }

    if failures > 0 {
        warn!(failures, "some imports failed");
        EXIT_FAILURE
    } else {
        EXIT_SUCCESS
    }
}

fn run_analyze(
    store: &mut ConversationStore,
    analyzer: &Analyzer,
    id: u64,
    verbose: bool,
    use_colors: bool,
) -> i32 {
    let result =
        convo_score::pipeline::analyze_conversation_detailed(store, analyzer, id, Utc::now());
    let (analysis, breakdown) = match result {
        Ok(detailed) => detailed,
        Err(e) => {
            return if let Some(StoreError::NotFound(_)) = e.downcast_ref::<StoreError>() {
                eprintln!("Conversation not found: {}", id);
                EXIT_NOT_FOUND
            } else {
                eprintln!("Analysis failed: {:#}", e);
                EXIT_FAILURE
            };
        }
    };

    let Ok(conversation) = store.conversation(id) else {
        eprintln!("Conversation not found: {}", id);
        return EXIT_NOT_FOUND;
    };

    println!(
        "{}",
        convo_score::output::format_analysis_detail(
            conversation.display_title(),
            &analysis,
            use_colors
        )
    );

    if verbose {
        println!("  Breakdown:");
        println!("{}", convo_score::output::format_breakdown(&breakdown));
    }

    EXIT_SUCCESS
}

fn run_reports(store: &ConversationStore, format: ReportFormat, use_colors: bool) -> i32 {
    let state = store.state();
    let analyses = state.analyses_newest_first();

    let rows: Vec<convo_score::output::ReportRow> = analyses
        .iter()
        .map(|&analysis| convo_score::output::ReportRow {
            analysis,
            title: state
                .conversations
                .get(&analysis.conversation_id)
                .map(|c| c.display_title())
                .unwrap_or("(deleted)"),
        })
        .collect();

    match format {
        ReportFormat::Table => {
            println!(
                "{}",
                convo_score::output::format_report_table(&rows, use_colors)
            );
        }
        ReportFormat::Tsv => {
            let tsv = convo_score::output::format_tsv(&rows);
            if !tsv.is_empty() {
                println!("{}", tsv);
            }
        }
        ReportFormat::Json => match serde_json::to_string_pretty(&analyses) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to serialize reports: {}", e);
                return EXIT_FAILURE;
            }
        },
    }

    EXIT_SUCCESS
}
