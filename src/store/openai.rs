//! OpenAI vector store implementation of the search index capability.

use super::{IndexingStatus, SearchIndex, StoreInfo};
use crate::error::{PensumError, Result};
use crate::openai::create_client;
use async_openai::error::OpenAIError;
use async_openai::types::{
    CreateFileRequest, CreateVectorStoreFileRequest, CreateVectorStoreRequestArgs, FileInput,
    FilePurpose, VectorStoreFileStatus,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Search index backed by the OpenAI vector store API.
pub struct OpenAISearchIndex {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
}

impl OpenAISearchIndex {
    pub fn new() -> Self {
        Self {
            client: create_client(),
        }
    }
}

impl Default for OpenAISearchIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchIndex for OpenAISearchIndex {
    #[instrument(skip(self))]
    async fn create_store(&self, name: &str) -> Result<String> {
        let request = CreateVectorStoreRequestArgs::default()
            .name(name)
            .build()
            .map_err(|e| PensumError::StoreCreation(format!("Failed to build request: {}", e)))?;

        let store = self
            .client
            .vector_stores()
            .create(request)
            .await
            .map_err(|e| PensumError::OpenAI(format!("Vector store API error: {}", e)))?;

        debug!(store_id = %store.id, "Created vector store");
        Ok(store.id)
    }

    #[instrument(skip(self, bytes), fields(bytes = bytes.len()))]
    async fn upload_file(&self, filename: &str, bytes: Vec<u8>) -> Result<String> {
        let request = CreateFileRequest {
            file: FileInput::from_vec_u8(filename.to_string(), bytes),
            purpose: FilePurpose::Assistants,
        };

        let file = self
            .client
            .files()
            .create(request)
            .await
            .map_err(|e| PensumError::OpenAI(format!("File API error: {}", e)))?;

        debug!(file_id = %file.id, "Uploaded material file");
        Ok(file.id)
    }

    #[instrument(skip(self))]
    async fn attach_file(&self, store_id: &str, file_id: &str) -> Result<()> {
        self.client
            .vector_stores()
            .files(store_id)
            .create(CreateVectorStoreFileRequest {
                file_id: file_id.to_string(),
                chunking_strategy: None,
            })
            .await
            .map_err(|e| PensumError::OpenAI(format!("Vector store file API error: {}", e)))?;
        Ok(())
    }

    async fn index_status(&self, store_id: &str, file_id: &str) -> Result<IndexingStatus> {
        let file = self
            .client
            .vector_stores()
            .files(store_id)
            .retrieve(file_id)
            .await
            .map_err(|e| PensumError::OpenAI(format!("Vector store file API error: {}", e)))?;

        Ok(match file.status {
            VectorStoreFileStatus::Completed => IndexingStatus::Completed,
            VectorStoreFileStatus::InProgress => IndexingStatus::InProgress,
            VectorStoreFileStatus::Cancelled => {
                IndexingStatus::Failed("indexing was cancelled".to_string())
            }
            VectorStoreFileStatus::Failed => IndexingStatus::Failed(
                file.last_error
                    .map(|e| e.message)
                    .unwrap_or_else(|| "unknown indexing error".to_string()),
            ),
        })
    }

    async fn retrieve_store(&self, store_id: &str) -> Result<Option<StoreInfo>> {
        match self.client.vector_stores().retrieve(store_id).await {
            Ok(store) => Ok(Some(StoreInfo {
                store_id: store.id,
                name: store.name.into(),
            })),
            // The service answered but would not resolve the store; the
            // handle is stale rather than the call having failed.
            Err(OpenAIError::ApiError(e)) => {
                debug!(store_id, error = %e.message, "Store did not resolve");
                Ok(None)
            }
            Err(e) => Err(PensumError::OpenAI(format!(
                "Vector store API error: {}",
                e
            ))),
        }
    }
}
