use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use credit_scope::applicant::{ApplicantInput, Education, MaritalStatus};
use credit_scope::config::Config;
use credit_scope::model::{ArtifactLoadError, Artifacts};
use credit_scope::scoring::ScoringService;

const EXIT_SUCCESS: i32 = 0;
const EXIT_UNAVAILABLE: i32 = 1;
const EXIT_REQUEST: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive scoring dashboard (default if no subcommand)
    Dashboard,
    /// Score one applicant and print the assessment
    Score {
        #[arg(long, default_value_t = 35)]
        age: u32,
        #[arg(long, default_value_t = 50_000)]
        credit_limit: u32,
        /// Average monthly payment amount
        #[arg(long, default_value_t = 10_000)]
        avg_pay_amt: u32,
        /// Largest monthly bill amount
        #[arg(long, default_value_t = 60_000)]
        max_bill_amt: u32,
        #[arg(long, value_enum, default_value_t = Education::Graduate)]
        education: Education,
        #[arg(long, value_enum, default_value_t = MaritalStatus::Single)]
        marital_status: MaritalStatus,
        /// Print JSON instead of the text report
        #[arg(long)]
        json: bool,
    },
    /// Clean the raw dataset and add engineered features
    Preprocess {
        /// Raw CSV input
        input: PathBuf,
        /// Engineered CSV output
        output: PathBuf,
    },
    /// Interactive setup wizard to create a config file
    Init,
}

#[derive(Parser, Debug)]
#[command(name = "credit-scope")]
#[command(about = "Credit-risk scoring dashboard with feature attributions", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/credit-scope/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn load_service(config: &Config) -> Result<ScoringService, ArtifactLoadError> {
    let artifacts = Artifacts::load(&config.artifacts.paths())?;
    Ok(ScoringService::new(artifacts, config.explanation.top_k))
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Dashboard);
    let config_path = cli.config.map(PathBuf::from);

    credit_scope::logging::init(cli.verbose);

    // Init runs before config loading (config may not exist yet)
    if let Commands::Init = command {
        match credit_scope::config::init::run_init_wizard(config_path) {
            Ok(()) => std::process::exit(EXIT_SUCCESS),
            Err(e) => {
                eprintln!("Init failed: {:#}", e);
                std::process::exit(EXIT_CONFIG);
            }
        }
    }

    let config = match credit_scope::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if let Err(errors) = credit_scope::config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    match command {
        Commands::Dashboard => {
            let state = match load_service(&config) {
                Ok(service) => credit_scope::tui::ServiceState::Ready(Arc::new(service)),
                Err(e) => {
                    tracing::error!(error = %e, "Scoring service unavailable");
                    credit_scope::tui::ServiceState::Unavailable(e.to_string())
                }
            };

            let theme = credit_scope::tui::resolve_theme();
            let app = credit_scope::tui::App::new(
                state,
                credit_scope::tui::ThemeColors::for_theme(theme),
            );
            if let Err(e) = credit_scope::tui::run_tui(app, config.dashboard.tick_rate_ms).await {
                eprintln!("Dashboard error: {:#}", e);
                std::process::exit(EXIT_REQUEST);
            }
        }
        Commands::Score {
            age,
            credit_limit,
            avg_pay_amt,
            max_bill_amt,
            education,
            marital_status,
            json,
        } => {
            let service = match load_service(&config) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Service unavailable: {}", e);
                    std::process::exit(EXIT_UNAVAILABLE);
                }
            };

            let input = ApplicantInput {
                age,
                credit_limit,
                avg_pay_amt,
                max_bill_amt,
                education,
                marital_status,
            };

            let assessment = match service.assess(&input) {
                Ok(a) => a,
                Err(e) => {
                    eprintln!("Scoring failed: {}", e);
                    std::process::exit(EXIT_REQUEST);
                }
            };

            if json {
                match credit_scope::output::format_assessment_json(&assessment) {
                    Ok(out) => println!("{}", out),
                    Err(e) => {
                        eprintln!("Failed to serialize assessment: {}", e);
                        std::process::exit(EXIT_REQUEST);
                    }
                }
            } else {
                let use_colors = credit_scope::output::should_use_colors();
                println!(
                    "{}",
                    credit_scope::output::format_assessment(&assessment, use_colors)
                );
            }
        }
        Commands::Preprocess { input, output } => {
            let start_time = Instant::now();
            let result = credit_scope::preprocessing::read_csv(&input).and_then(|df| {
                let (mut cleaned, report) = credit_scope::preprocessing::clean_and_engineer(&df)?;
                credit_scope::preprocessing::write_csv(&mut cleaned, &output)?;
                Ok(report)
            });

            match result {
                Ok(report) => {
                    let use_colors = credit_scope::output::should_use_colors();
                    println!(
                        "{}",
                        credit_scope::output::format_preprocess_report(&report, use_colors)
                    );
                    println!("Wrote {}", output.display());
                    if cli.verbose {
                        eprintln!("Total: {:?}", start_time.elapsed());
                    }
                }
                Err(e) => {
                    eprintln!("Preprocessing failed: {}", e);
                    std::process::exit(EXIT_REQUEST);
                }
            }
        }
        // Handled before config loading
        Commands::Init => {}
    }

    std::process::exit(EXIT_SUCCESS);
}
