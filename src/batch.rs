//! Parallel preprocessing of independent images.
//!
//! Pipeline runs are CPU bound and share no state, so each image gets its
//! own blocking task and its own copy of the options.

use crate::error::PreprocessError;
use crate::preprocessing::{preprocess, PreprocessingOptions, PreprocessingResult, SourceImage};
use futures::future::join_all;

/// Preprocess every source concurrently; results keep the input order
pub async fn preprocess_batch(
    sources: Vec<SourceImage>,
    options: PreprocessingOptions,
) -> Vec<Result<PreprocessingResult, PreprocessError>> {
    tracing::info!("Preprocessing batch of {} images", sources.len());

    let tasks = sources.into_iter().map(|source| {
        let options = options.clone();
        tokio::task::spawn_blocking(move || preprocess(&source, &options))
    });

    join_all(tasks)
        .await
        .into_iter()
        .map(|joined| {
            joined.unwrap_or_else(|e| Err(PreprocessError::TaskFailed(e.to_string())))
        })
        .collect()
}
