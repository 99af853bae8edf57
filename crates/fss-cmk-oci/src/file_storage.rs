//! File-storage control-plane adapter

use crate::client::OciClient;
use crate::endpoints::{service_endpoint, FILE_STORAGE};
use async_trait::async_trait;
use fss_cmk_core::{FileStorageService, FileSystemRecord, Result, UpdateResult};
use serde::Serialize;

const API_VERSION: &str = "20171215";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateFileSystemDetails<'a> {
    kms_key_id: &'a str,
}

pub struct FileStorageClient {
    client: OciClient,
    endpoint: String,
}

impl FileStorageClient {
    pub fn new(client: OciClient, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn for_region(client: OciClient, region: &str, domain: &str) -> Self {
        Self::new(client, service_endpoint(FILE_STORAGE, region, domain))
    }

    fn file_system_url(&self, file_system_id: &str) -> String {
        format!("{}/{}/fileSystems/{}", self.endpoint, API_VERSION, file_system_id)
    }
}

#[async_trait]
impl FileStorageService for FileStorageClient {
    async fn get_file_system(&self, file_system_id: &str) -> Result<FileSystemRecord> {
        let url = self.file_system_url(file_system_id);
        Ok(self.client.get(FILE_STORAGE, &url).await?.data)
    }

    async fn update_kms_key(
        &self,
        file_system_id: &str,
        kms_key_id: &str,
    ) -> Result<UpdateResult> {
        let url = self.file_system_url(file_system_id);
        let response = self
            .client
            .put::<_, UpdateResult>(FILE_STORAGE, &url, &UpdateFileSystemDetails { kms_key_id })
            .await?;

        Ok(UpdateResult {
            request_id: response.request_id,
            ..response.data
        })
    }
}
