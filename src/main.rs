use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;

use alco_probe_rs::client::ApiClient;
use alco_probe_rs::flood::{self, FloodConfig};
use alco_probe_rs::probe::{self, ScanConfig};
use alco_probe_rs::types::{
    FloodAttempt, ProbeAttempt, RegisterPayload, ScanOutcome, ScanReport, ScreeningRecord,
};
use alco_probe_rs::{codes, dump};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tokio_util::sync::CancellationToken;

/// alco-probe-rs — sequential HTTP probe toolkit for a local AlcoLens demo deployment.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "alco-probe-rs",
    version,
    about = "Sequential HTTP probe toolkit for a local AlcoLens demo deployment.",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Guess the hospital registration code, stopping at the first accepted candidate.
    Scan(ScanArgs),
    /// Fetch and pretty-print the stored screening results.
    Dump(DumpArgs),
    /// Submit a burst of synthetic screening records.
    Flood(FloodArgs),
}

#[derive(Debug, Clone, Args)]
struct TargetArgs {
    /// Base URL of the target deployment.
    #[arg(long, default_value = "http://localhost:3000")]
    base_url: String,

    /// Total request timeout in milliseconds.
    #[arg(long = "timeout-ms", default_value_t = 5_000)]
    timeout_ms: u64,
}

impl TargetArgs {
    fn client(&self) -> Result<ApiClient> {
        ApiClient::new(&self.base_url, Duration::from_millis(self.timeout_ms))
    }
}

#[derive(Debug, Clone, Args)]
struct ScanArgs {
    #[command(flatten)]
    target: TargetArgs,

    /// Path to candidate codes file (one code per line).
    #[arg(long, default_value = "codes.txt")]
    codes: PathBuf,

    /// Email used for the decoy registrations.
    #[arg(long, default_value = "hacker@example.com")]
    email: String,

    /// Keep scanning on HTTP 409 instead of treating the code as likely valid.
    #[arg(long, default_value_t = false)]
    ignore_conflict: bool,

    /// Write the scan report as pretty JSON to this path (optional).
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct DumpArgs {
    #[command(flatten)]
    target: TargetArgs,

    /// Write the dump report as pretty JSON to this path (optional).
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct FloodArgs {
    #[command(flatten)]
    target: TargetArgs,

    /// Number of records to submit.
    #[arg(long, default_value_t = 10)]
    count: u32,

    /// Pause between submissions in milliseconds.
    #[arg(long = "delay-ms", default_value_t = 100)]
    delay_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Scan(args) => run_scan_cmd(args).await,
        Command::Dump(args) => run_dump_cmd(args).await,
        Command::Flood(args) => run_flood_cmd(args).await,
    }
}

async fn run_scan_cmd(args: ScanArgs) -> Result<()> {
    let candidates = codes::load_codes_or_default(&args.codes);

    println!("alco-probe-rs scan configuration:");
    println!("  base_url     : {}", args.target.base_url);
    println!(
        "  codes        : {} ({} candidates)",
        args.codes.display(),
        candidates.len()
    );
    println!("  email        : {}", args.email);
    println!("  timeout_ms   : {}", args.target.timeout_ms);
    println!(
        "  on_conflict  : {}",
        if args.ignore_conflict {
            "keep scanning"
        } else {
            "stop (likely valid)"
        }
    );

    let client = args.target.client()?;
    let config = ScanConfig {
        stop_on_conflict: !args.ignore_conflict,
    };

    let client_ref = &client;
    let email = args.email.clone();
    let request = move |code: String| {
        let payload = RegisterPayload::with_hospital_code(&email, &code);
        async move { client_ref.register(&payload).await }
    };

    println!();
    let report = probe::run_scan_with_observer(
        &candidates,
        request,
        &config,
        CancellationToken::new(),
        print_attempt_line,
    )
    .await?;

    println!();
    match &report.outcome {
        ScanOutcome::CodeFound { code } => {
            println!("Hit: hospital code {code:?} was accepted.");
        }
        ScanOutcome::CodeLikelyValid { code } => {
            println!("Conflict on code {code:?}: an account with this email already exists.");
            println!("The code likely passed validation, but a stale decoy account gives the same status; rerun with a fresh --email to confirm.");
        }
        ScanOutcome::Exhausted => {
            println!("Exhausted all {} candidates without a hit.", report.total);
        }
        ScanOutcome::Interrupted => {
            println!(
                "Interrupted after {} of {} candidates.",
                report.tried, report.total
            );
        }
    }
    print_scan_table(&report);

    if let Some(path) = args.output.as_deref() {
        if let Err(e) = write_report_json(path, &report) {
            eprintln!("Failed to write JSON to {}: {}", path.display(), e);
        } else {
            println!("Wrote JSON report to {}", path.display());
        }
    }

    Ok(())
}

async fn run_dump_cmd(args: DumpArgs) -> Result<()> {
    println!("alco-probe-rs dump configuration:");
    println!("  base_url     : {}", args.target.base_url);
    println!("  timeout_ms   : {}", args.target.timeout_ms);

    let client = args.target.client()?;

    println!();
    let report = match dump::run_dump(&client).await {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Request failed: {e}");
            return Ok(());
        }
    };

    if report.status == 200 {
        match report.record_count {
            Some(n) => println!("Successfully dumped {n} records."),
            None => println!("Successfully dumped a payload without a data array."),
        }
        if let Some(payload) = &report.payload {
            match serde_json::to_string_pretty(payload) {
                Ok(rendered) => println!("{rendered}"),
                Err(e) => eprintln!("Failed to render payload: {e}"),
            }
        }
    } else {
        println!("Failed to dump data. Status: {}", report.status);
    }

    if let Some(path) = args.output.as_deref() {
        if let Err(e) = write_report_json(path, &report) {
            eprintln!("Failed to write JSON to {}: {}", path.display(), e);
        } else {
            println!("Wrote JSON report to {}", path.display());
        }
    }

    Ok(())
}

async fn run_flood_cmd(args: FloodArgs) -> Result<()> {
    println!("alco-probe-rs flood configuration:");
    println!("  base_url     : {}", args.target.base_url);
    println!("  count        : {}", args.count);
    println!("  delay_ms     : {}", args.delay_ms);
    println!("  timeout_ms   : {}", args.target.timeout_ms);

    let client = args.target.client()?;
    let config = FloodConfig {
        count: args.count,
        delay: Duration::from_millis(args.delay_ms),
    };

    let client_ref = &client;
    let request =
        move |record: ScreeningRecord| async move { client_ref.submit_screening(&record).await };

    println!();
    let total = args.count;
    let report = flood::run_flood_with_observer(
        &config,
        request,
        CancellationToken::new(),
        move |attempt| print_flood_line(attempt, total),
    )
    .await?;

    println!();
    if report.interrupted {
        println!(
            "Interrupted after {} of {} submissions.",
            report.sent, report.requested
        );
    }
    println!(
        "Submitted {} records: {} accepted, {} failed.",
        report.sent, report.succeeded, report.failed
    );

    Ok(())
}

fn print_attempt_line(attempt: &ProbeAttempt) {
    match attempt.status {
        Some(status) => {
            let note = match status {
                201 => " <- accepted",
                409 => " <- duplicate account (code may be valid)",
                _ => "",
            };
            println!("  trying {:<12} status={}{}", attempt.code, status, note);
        }
        None => {
            let error = attempt.error.as_deref().unwrap_or("transport error");
            println!("  trying {:<12} error: {}", attempt.code, error);
        }
    }
}

fn print_flood_line(attempt: &FloodAttempt, total: u32) {
    match attempt.status {
        Some(status) => println!(
            "  request {}/{}: {} status={}",
            attempt.seq, total, attempt.patient_id, status
        ),
        None => println!(
            "  request {}/{}: {} failed: {}",
            attempt.seq,
            total,
            attempt.patient_id,
            attempt.error.as_deref().unwrap_or("transport error")
        ),
    }
}

fn print_scan_table(report: &ScanReport) {
    let mut code_w = "code".len();
    let mut note_w = "note".len();
    for attempt in &report.attempts {
        code_w = code_w.max(attempt.code.len());
        note_w = note_w.max(attempt_note(attempt).len().min(60));
    }
    let status_w = "status".len();
    let lat_w = "latency_ms".len();

    println!(
        "\nProbed {} of {} candidates",
        report.tried, report.total
    );
    println!(
        "{:<code_w$}  {:>status_w$}  {:>lat_w$}  {:<note_w$}",
        "code",
        "status",
        "latency_ms",
        "note",
        code_w = code_w,
        status_w = status_w,
        lat_w = lat_w,
        note_w = note_w
    );
    println!(
        "{:-<code_w$}  {:-<status_w$}  {:-<lat_w$}  {:-<note_w$}",
        "",
        "",
        "",
        "",
        code_w = code_w,
        status_w = status_w,
        lat_w = lat_w,
        note_w = note_w
    );
    for attempt in &report.attempts {
        let status = attempt
            .status
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        let mut note = attempt_note(attempt);
        if note.len() > 60 {
            note.truncate(60);
        }
        println!(
            "{:<code_w$}  {:>status_w$}  {:>lat_w$}  {:<note_w$}",
            attempt.code,
            status,
            attempt.latency_ms,
            note,
            code_w = code_w,
            status_w = status_w,
            lat_w = lat_w,
            note_w = note_w
        );
    }
}

fn attempt_note(attempt: &ProbeAttempt) -> String {
    match attempt.status {
        Some(201) => "accepted".to_string(),
        Some(409) => "duplicate account".to_string(),
        Some(_) => String::new(),
        None => attempt.error.clone().unwrap_or_default(),
    }
}

fn write_report_json<T: serde::Serialize>(path: &std::path::Path, report: &T) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, report)?;
    Ok(())
}
