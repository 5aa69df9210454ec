use anyhow::Result;
use clap::Parser;
use resume_ranker::error::RankError;
use resume_ranker::extract::{collect_resume_paths, extract_text, load_candidates};
use resume_ranker::ranking::{check_inputs, rank_resumes};
use resume_ranker::report::{save_csv, save_pdf, to_json};
use resume_ranker::scoring::OracleHandle;
use resume_ranker::settings::{settings, Settings};
use resume_ranker::utils::{
    init_tracing, log_error, log_export_written, log_init, print_ranked_table,
};
use std::path::PathBuf;
use std::process::ExitCode;

/// Ranks resumes against a job description.
#[derive(Debug, Parser)]
#[command(name = "resume-ranker", version)]
struct Cli {
    /// Job description file (text or PDF).
    #[arg(long)]
    job: Option<PathBuf>,

    /// Resume files or directories of resumes.
    #[arg(long, num_args = 1..)]
    resumes: Vec<PathBuf>,

    /// Write the ranked table as CSV.
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write a PDF report.
    #[arg(long)]
    pdf: Option<PathBuf>,

    /// Print the ranked report as JSON instead of a table.
    #[arg(long)]
    json: bool,

    /// Settings file to use instead of settings.default.ron / settings.ron.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Only print the best N candidates.
    #[arg(long)]
    top: Option<usize>,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    if let Err(e) = init_tracing() {
        log_error(&format!("Failed to set up logging: {e}"));
        return ExitCode::FAILURE;
    }

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log_error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings = match &cli.settings {
        Some(path) => Settings::load_from(path)?,
        None => settings().clone(),
    };

    let job_path = cli.job.ok_or(RankError::MissingJobDescription)?;
    let job_text = extract_text(&job_path);

    let paths = collect_resume_paths(&cli.resumes);
    let candidates = load_candidates(&paths);

    // Bad input should fail before the model download.
    check_inputs(&job_text, &candidates)?;
    settings.scoring.weights.validate()?;

    log_init(&job_path, candidates.len(), &settings);

    let oracle = OracleHandle::spawn(&settings.ml).await?;
    let report = rank_resumes(&job_text, &candidates, &settings, oracle).await?;

    if cli.json {
        println!("{}", to_json(&report)?);
    } else {
        print_ranked_table(&report, cli.top);
    }

    if let Some(path) = &cli.csv {
        save_csv(&report, path)?;
        log_export_written("CSV", path);
    }

    if let Some(path) = &cli.pdf {
        save_pdf(&report, &settings.report, path)?;
        log_export_written("PDF", path);
    }

    Ok(())
}
