//! Adapter exposing a remote file handle through the resource contract.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use davlink_client::{ByteRange, ByteStream, HttpExchange, RemoteFile, RemoteFolder, TransferError};
use tokio::io::AsyncWrite;

use crate::error::ResourceError;
use crate::resource::{FileResource, FolderTarget, RemoteManager};

/// Gives a remote folder a [`FolderTarget`] face so it can stand in as a
/// copy/move destination.
pub struct FolderAdapter<C: HttpExchange> {
    folder: RemoteFolder<C>,
}

impl<C: HttpExchange> FolderAdapter<C> {
    pub fn new(folder: RemoteFolder<C>) -> Self {
        Self { folder }
    }
}

impl<C: HttpExchange> FolderTarget<C> for FolderAdapter<C> {
    fn remote_folder(&self) -> &RemoteFolder<C> {
        &self.folder
    }
}

/// Wraps a [`RemoteFile`] to adapt it for use as a served resource.
///
/// Stateless beyond the wrapped handle: content never lands in the
/// adapter, and metadata answers reflect whatever the handle last saw.
pub struct RemoteFileAdapter<C: HttpExchange> {
    file: Arc<RemoteFile<C>>,
    remote_manager: Arc<dyn RemoteManager<C>>,
}

impl<C: HttpExchange> RemoteFileAdapter<C> {
    pub fn new(file: Arc<RemoteFile<C>>, remote_manager: Arc<dyn RemoteManager<C>>) -> Self {
        Self {
            file,
            remote_manager,
        }
    }

    pub fn file(&self) -> &RemoteFile<C> {
        &self.file
    }
}

#[async_trait]
impl<C: HttpExchange + 'static> FileResource<C> for RemoteFileAdapter<C> {
    fn content_type(&self, _accepts: Option<&str>) -> Option<String> {
        self.file.content_type()
    }

    fn content_length(&self) -> Option<u64> {
        self.file.content_length()
    }

    fn create_date(&self) -> Option<DateTime<Utc>> {
        self.file.created()
    }

    fn max_age_seconds(&self) -> Option<u64> {
        None
    }

    async fn send_content(
        &self,
        out: &mut (dyn AsyncWrite + Send + Unpin),
        _range: Option<ByteRange>,
        _params: &HashMap<String, String>,
        _content_type: Option<&str>,
    ) -> Result<(), ResourceError> {
        self.file.download(out, None).await?;
        Ok(())
    }

    async fn replace_content(
        &self,
        content: ByteStream,
        content_length: Option<u64>,
    ) -> Result<(), ResourceError> {
        self.file.set_content(content, content_length, None).await?;
        Ok(())
    }

    async fn delete(&self) -> Result<(), ResourceError> {
        match self.file.delete().await {
            Ok(()) => Ok(()),
            // Already gone; nothing left to delete.
            Err(TransferError::NotFound { .. }) => Ok(()),
            Err(error) => Err(error.into()),
        }
    }

    async fn copy_to(
        &self,
        dest: &dyn FolderTarget<C>,
        dest_name: &str,
    ) -> Result<(), ResourceError> {
        self.remote_manager
            .copy_to(&self.file, dest_name, dest.remote_folder())
            .await?;
        Ok(())
    }

    async fn move_to(
        &self,
        dest: &dyn FolderTarget<C>,
        dest_name: &str,
    ) -> Result<(), ResourceError> {
        self.remote_manager
            .move_to(&self.file, dest_name, dest.remote_folder())
            .await?;
        Ok(())
    }

    fn process_form(&self, _parameters: &HashMap<String, String>) -> Result<String, ResourceError> {
        Err(ResourceError::UnsupportedOperation)
    }
}
