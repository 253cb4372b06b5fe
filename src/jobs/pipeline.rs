use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info};

use super::store::JobStore;
use super::types::JobUpdate;
use crate::synthesis::{MinutesOptions, Synthesizer};
use crate::transcribe::ChunkTranscriber;

/// The execution body enqueued for each minutes job: transcribe every
/// chunk in order, concatenate, synthesize, and record the outcome.
pub struct MinutesPipeline {
    store: Arc<JobStore>,
    transcriber: Arc<dyn ChunkTranscriber>,
    synthesizer: Arc<dyn Synthesizer>,
}

impl MinutesPipeline {
    pub fn new(
        store: Arc<JobStore>,
        transcriber: Arc<dyn ChunkTranscriber>,
        synthesizer: Arc<dyn Synthesizer>,
    ) -> Self {
        Self {
            store,
            transcriber,
            synthesizer,
        }
    }

    /// Run the whole job. Every internal error ends up as a Failed
    /// record in the store before this returns; the scheduler never
    /// inspects the outcome.
    pub async fn run(&self, job_id: &str, chunks: Vec<PathBuf>, options: MinutesOptions) {
        if let Err(err) = self.process(job_id, &chunks, &options).await {
            error!("Job {} failed: {:#}", job_id, err);
            self.store
                .update(job_id, JobUpdate::failed(format!("{:#}", err)))
                .await;
        }
    }

    async fn process(
        &self,
        job_id: &str,
        chunks: &[PathBuf],
        options: &MinutesOptions,
    ) -> anyhow::Result<()> {
        let total = chunks.len();
        info!("Processing {} chunk transcriptions for job {}", total, job_id);

        // Chunks are transcribed strictly in input order; the first
        // failure aborts the rest of the job.
        let mut transcripts = Vec::with_capacity(total);
        for (index, chunk) in chunks.iter().enumerate() {
            let percent = ((index as f64 / total as f64) * 100.0).round() as u8;
            self.store
                .update(
                    job_id,
                    JobUpdate::progress(
                        percent,
                        format!("Transcribing chunk {}/{}...", index + 1, total),
                    ),
                )
                .await;
            transcripts.push(self.transcriber.transcribe_chunk(chunk).await?);
        }
        self.store
            .update(job_id, JobUpdate::progress(100, "Transcription complete"))
            .await;

        let transcript = transcripts.join("\n").trim().to_string();

        self.store
            .update(job_id, JobUpdate::progress(100, "Generating minutes..."))
            .await;
        let minutes = self.synthesizer.generate_minutes(&transcript, options).await?;

        self.store.update(job_id, JobUpdate::completed(minutes)).await;
        info!("Job {} completed", job_id);
        Ok(())
    }
}
