use resume_ranker::extract::{display_name, extract_text};
use resume_ranker::scoring::{normalize, Candidate, JobProfile, OracleHandle, ScoringPipeline};
use resume_ranker::settings::{settings, Settings};
use resume_ranker::utils::{
    init_tracing, log_error, log_final_result, log_header, log_job_skills, log_newline,
    log_score_breakdown, log_text_sizes,
};
use std::env;
use std::path::{Path, PathBuf};
use std::process;

fn print_usage() {
    eprintln!("Usage: score-resume <job> <resume> [--settings <file>]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <job>       Job description file (text or PDF)");
    eprintln!("  <resume>    Resume file (text or PDF)");
    eprintln!("  --settings  Settings file to use instead of the defaults");
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    if let Err(e) = init_tracing() {
        log_error(&format!("Failed to set up logging: {e}"));
        process::exit(1);
    }

    let args: Vec<String> = env::args().skip(1).collect();
    let settings_path = args
        .iter()
        .position(|a| a == "--settings")
        .and_then(|idx| args.get(idx + 1))
        .map(PathBuf::from);
    let positional: Vec<&String> = args
        .iter()
        .enumerate()
        .filter(|(idx, a)| {
            *a != "--settings" && !(*idx > 0 && args[idx - 1] == "--settings")
        })
        .map(|(_, a)| a)
        .collect();

    if positional.len() != 2 {
        print_usage();
        process::exit(1);
    }

    let settings = match settings_path {
        Some(path) => match Settings::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log_error(&format!("{e:#}"));
                process::exit(1);
            }
        },
        None => settings().clone(),
    };

    if let Err(e) = settings.scoring.weights.validate() {
        log_error(&e.to_string());
        process::exit(1);
    }

    score_resume(Path::new(positional[0]), Path::new(positional[1]), &settings).await;
}

async fn score_resume(job_path: &Path, resume_path: &Path, settings: &Settings) {
    let job_text = extract_text(job_path);
    if job_text.trim().is_empty() {
        log_error("Please provide a job description.");
        process::exit(1);
    }

    let candidate = Candidate::new(display_name(resume_path), extract_text(resume_path));
    if !candidate.is_readable() {
        log_error(&format!("Could not read text from '{}'", resume_path.display()));
        process::exit(1);
    }

    let job = JobProfile::new(&job_text, &settings.skills);

    log_header("Normalized text");
    log_text_sizes(job.normalized.len(), normalize(&candidate.text).len());
    log_newline();

    log_header("Job skills");
    log_job_skills(&job);
    log_newline();

    let oracle = match OracleHandle::spawn(&settings.ml).await {
        Ok(handle) => handle,
        Err(e) => {
            log_error(&format!("Failed to load similarity model: {e:#}"));
            process::exit(1);
        }
    };
    log_newline();

    let pipeline = ScoringPipeline::new(job, settings.scoring.weights, oracle);
    let result = match pipeline.score(&candidate).await {
        Ok(result) => result,
        Err(reason) => {
            log_error(&format!("Resume skipped: {}", reason.describe()));
            process::exit(1);
        }
    };

    log_header("Score breakdown");
    log_score_breakdown(&result, pipeline.weights());
    log_newline();

    log_final_result(&result);
}
