use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::Parser;
use miette::IntoDiagnostic;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use ismara_uploader::app::App;
use ismara_uploader::client::MaraHttpClient;
use ismara_uploader::domain::{DataType, JobParameters, Organism};
use ismara_uploader::error::MaraError;
use ismara_uploader::manifest;

#[derive(Parser)]
#[command(name = "ismara-upload")]
#[command(
    about = "Uploads files to the ISMARA webserver and starts an analysis job. \
             Note that fastq input is not supported for the hg18 and mm9 genome builds."
)]
#[command(version, author)]
struct Cli {
    /// Email address for job notifications
    #[arg(short, long, default_value = "")]
    email: String,

    /// Project name
    #[arg(short, long, default_value = "")]
    project: String,

    /// Data type
    #[arg(short = 't', long = "data-type", value_enum, default_value = "rnaseq")]
    data_type: DataType,

    /// Organism alias (human, mouse, ...) or concrete genome build (hg38, mm39, ...)
    #[arg(short, long, value_enum, default_value = "hg38")]
    organism: Organism,

    /// Run with miRNA
    #[arg(long)]
    mirna: bool,

    /// File list: ascii text, one input reference per line (local path, URL,
    /// or SRR accession). Supported file formats: .CEL, .FASTQ, .BAM, .BED, .SAM.
    #[arg(long = "file-list")]
    file_list: Utf8PathBuf,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(mara) = report.downcast_ref::<MaraError>() {
            return ExitCode::from(map_exit_code(mara));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &MaraError) -> u8 {
    match error {
        MaraError::MissingInput(_) | MaraError::ManifestRead(..) => 2,
        MaraError::SessionHttp(_)
        | MaraError::SessionStatus { .. }
        | MaraError::EmptySession
        | MaraError::UploadHttp(_)
        | MaraError::UploadStatus { .. }
        | MaraError::RunHttp(_)
        | MaraError::RunStatus { .. }
        | MaraError::RetryExhausted { .. } => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Classify the whole manifest before touching the network, so a missing
    // file aborts with no session opened server-side.
    let entries = manifest::load_manifest(&cli.file_list).into_diagnostic()?;
    let params = JobParameters::new(
        cli.email,
        cli.project,
        cli.data_type,
        cli.organism.resolve(),
        cli.mirna,
        manifest::size_report(&entries),
    );

    let client = MaraHttpClient::new().into_diagnostic()?;
    let app = App::new(client);
    let report = app.submit(&entries, &params).into_diagnostic()?;

    if !report.abandoned.is_empty() {
        warn!(
            "{} chunk(s) could not be uploaded; the submitted data is incomplete. \
             Please report this id to ISMARA administrators: {}",
            report.abandoned.len(),
            report.abandoned[0].session
        );
    }

    println!(
        "\n>>>>>>>>>>\nHere is the link to your submission:\n    {}",
        report.link
    );
    Ok(())
}
