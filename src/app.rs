use std::fs::File;
use std::io::Read;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{info, warn};

use crate::chunk::{ChunkRange, DEFAULT_CHUNK_SIZE, chunk_ranges};
use crate::client::{ChunkTransfer, MaraClient, RunRequest};
use crate::domain::{JobParameters, Session, SubmissionLink};
use crate::error::MaraError;
use crate::manifest::ManifestEntry;
use crate::retry::RetryPolicy;

/// Outcome of one submission. `abandoned` lists every chunk whose retry
/// budget ran out; the run still completes and the link is still produced,
/// but callers can choose to treat a non-empty list as a failure.
#[derive(Debug)]
pub struct SubmissionReport {
    pub link: SubmissionLink,
    pub uploaded_files: usize,
    pub abandoned: Vec<AbandonedChunk>,
}

/// A chunk given up on after the retry budget was spent. Carries the session
/// token so operators can correlate the partial upload with the remote
/// working directory.
#[derive(Debug, Clone)]
pub struct AbandonedChunk {
    pub path: Utf8PathBuf,
    pub range: ChunkRange,
    pub session: String,
}

pub struct App<C: MaraClient> {
    client: C,
    chunk_size: u64,
    retry: RetryPolicy,
}

impl<C: MaraClient> App<C> {
    pub fn new(client: C) -> Self {
        Self::with_settings(client, DEFAULT_CHUNK_SIZE, RetryPolicy::default())
    }

    pub fn with_settings(client: C, chunk_size: u64, retry: RetryPolicy) -> Self {
        Self {
            client,
            chunk_size,
            retry,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Runs the full submission state machine: acquire a session, register
    /// the job parameters (best effort), upload every local file chunk by
    /// chunk, then trigger the run with the collected remote references.
    ///
    /// The manifest must already be classified; session acquisition and the
    /// run trigger are the only remaining fatal steps.
    pub fn submit(
        &self,
        manifest: &[ManifestEntry],
        params: &JobParameters,
    ) -> Result<SubmissionReport, MaraError> {
        let session = self.client.acquire_session()?;
        info!("acquired session {session}");

        if let Err(err) = self.client.register_job(&session, params) {
            warn!("could not save job parameters, continuing: {err}");
        }

        let total = manifest.len();
        let mut urls = Vec::new();
        let mut accessions = Vec::new();
        let mut abandoned = Vec::new();
        let mut uploaded_files = 0;
        let mut counter = 0;

        for entry in manifest {
            match entry {
                ManifestEntry::Accession(text) => accessions.push(text.clone()),
                ManifestEntry::RemoteUrl(url) => urls.push(url.clone()),
                ManifestEntry::LocalFile { path, size } => {
                    counter += 1;
                    info!("uploading {path} ({counter}/{total})");
                    self.upload_file(&session, path, *size, &mut abandoned)?;
                    info!("finished uploading {path} ({counter}/{total})");
                    uploaded_files += 1;
                }
            }
        }

        let request = RunRequest::new(params, urls, accessions);
        let link = self.client.trigger_run(&session, &request)?;

        Ok(SubmissionReport {
            link,
            uploaded_files,
            abandoned,
        })
    }

    /// Drains one local file in chunk-sized reads, sending each chunk under
    /// the retry policy. A chunk whose budget runs out is recorded and
    /// skipped; the loop moves on to the next chunk rather than aborting,
    /// leaving that file incomplete on the server.
    fn upload_file(
        &self,
        session: &Session,
        path: &Utf8Path,
        size: u64,
        abandoned: &mut Vec<AbandonedChunk>,
    ) -> Result<(), MaraError> {
        let file_name = path
            .file_name()
            .unwrap_or(path.as_str())
            .to_string();
        let mut file = File::open(path.as_std_path())
            .map_err(|err| MaraError::Filesystem(format!("open {path}: {err}")))?;

        for range in chunk_ranges(size, self.chunk_size) {
            let mut bytes = vec![0u8; range.len() as usize];
            file.read_exact(&mut bytes)
                .map_err(|err| MaraError::Filesystem(format!("read {path}: {err}")))?;
            let chunk = ChunkTransfer {
                file_name: file_name.clone(),
                range,
                bytes,
            };
            let outcome = self
                .retry
                .run(|| self.client.upload_chunk(session, &chunk));
            if let Err(err) = outcome {
                warn!(
                    "could not upload {path} range {}, report this id to ISMARA \
                     administrators: {session} ({err})",
                    range.content_range()
                );
                abandoned.push(AbandonedChunk {
                    path: path.to_path_buf(),
                    range,
                    session: session.as_str().to_string(),
                });
            }
        }
        Ok(())
    }
}
