//! Google Drive v3 client

use std::path::Path;

use duke_relay_core::store::{log_failure, require_local_file};
use duke_relay_core::{
    FileStore, RemoteFile, StoreError, StoreResult, UploadOptions, FOLDER_MIME_TYPE,
    LIST_PAGE_SIZE,
};
use reqwest::Method;

use crate::auth::{CredentialSource, ServiceAccountAuth, DRIVE_SCOPE};
use crate::error::AuthError;
use crate::protocol::{FileId, FileList, FileMetadata, FILE_LIST_FIELDS};
use crate::transport::{path_segment, ApiRequest, HttpTransport, Transport};

const FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3/files";

/// Bytes requested per ranged download request
pub const DOWNLOAD_CHUNK_SIZE: u64 = 10 * 1024 * 1024;

const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// Drive client implementing [`FileStore`]
pub struct DriveClient<T: Transport = HttpTransport> {
    transport: T,
}

impl DriveClient<HttpTransport> {
    /// Build a client authenticated with the Drive scope
    pub fn from_credentials(source: &CredentialSource) -> Result<Self, AuthError> {
        let auth = ServiceAccountAuth::from_source(source, DRIVE_SCOPE)?;
        let transport = HttpTransport::new(auth)?;
        tracing::info!("Drive client ready for {}", transport.client_email());
        Ok(Self::with_transport(transport))
    }
}

impl<T: Transport> DriveClient<T> {
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn file_url(file_id: &str) -> String {
        format!("{FILES_URL}/{}", path_segment(file_id))
    }

    fn query_files(&self, q: Option<String>, order_by: Option<&str>) -> StoreResult<Vec<RemoteFile>> {
        let mut request = ApiRequest::get(FILES_URL)
            .query("pageSize", LIST_PAGE_SIZE.to_string())
            .query("fields", FILE_LIST_FIELDS);
        if let Some(q) = q {
            request = request.query("q", q);
        }
        if let Some(order_by) = order_by {
            request = request.query("orderBy", order_by);
        }

        let list: FileList = self.transport.send(request)?.error_for_status()?.json()?;
        if list.next_page_token.is_some() {
            tracing::debug!("Listing truncated at {LIST_PAGE_SIZE} files");
        }
        Ok(list.files.into_iter().map(RemoteFile::from).collect())
    }

    fn try_download(&self, file_id: &str, output: &Path) -> StoreResult<u64> {
        let url = Self::file_url(file_id);
        let mut content: Vec<u8> = Vec::new();

        loop {
            let start = content.len() as u64;
            let end = start + DOWNLOAD_CHUNK_SIZE - 1;
            let request = ApiRequest::get(url.as_str())
                .query("alt", "media")
                .header("Range", format!("bytes={start}-{end}"));

            let response = self.transport.send(request)?;
            // Nothing left at `start`: an empty file, or one ending on a chunk boundary
            if response.status == 416 {
                break;
            }
            let response = response.error_for_status()?;

            let received = response.body.len() as u64;
            let total = response.header("content-range").and_then(content_range_total);
            content.extend_from_slice(&response.body);

            if let Some(total) = total.filter(|total| *total > 0) {
                tracing::debug!("Download {}%", content.len() as u64 * 100 / total);
            }

            let complete = response.status != 206
                || received < DOWNLOAD_CHUNK_SIZE
                || total.is_some_and(|total| content.len() as u64 >= total);
            if complete {
                break;
            }
        }

        std::fs::write(output, &content)?;
        tracing::info!(
            "Downloaded {} ({} bytes) to {}",
            file_id,
            content.len(),
            output.display()
        );
        Ok(content.len() as u64)
    }

    fn try_upload(&self, local_path: &Path, options: &UploadOptions) -> StoreResult<String> {
        require_local_file(local_path)?;

        let name = match &options.name {
            Some(name) => name.clone(),
            None => local_path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .ok_or_else(|| StoreError::LocalFileMissing(local_path.to_path_buf()))?,
        };
        let mime_type = options
            .mime_type
            .clone()
            .unwrap_or_else(|| guess_mime_type(local_path));

        let metadata = FileMetadata {
            name: &name,
            mime_type: Some(&mime_type),
            parents: options.folder_id.as_deref().into_iter().collect(),
        };
        let session = ApiRequest::post(UPLOAD_URL)
            .query("uploadType", "resumable")
            .query("fields", "id")
            .header("X-Upload-Content-Type", mime_type.as_str())
            .json(serde_json::to_value(&metadata)?);

        let file = self.send_resumable(session, local_path, &mime_type)?;
        tracing::info!("Uploaded {} as '{}' (ID: {})", local_path.display(), name, file.id);
        Ok(file.id)
    }

    fn try_update(&self, file_id: &str, local_path: &Path, mime_type: Option<&str>) -> StoreResult<()> {
        require_local_file(local_path)?;

        let mime_type = mime_type
            .map(str::to_string)
            .unwrap_or_else(|| guess_mime_type(local_path));
        let session = ApiRequest::new(
            Method::PATCH,
            format!("{UPLOAD_URL}/{}", path_segment(file_id)),
        )
        .query("uploadType", "resumable")
        .query("fields", "id")
        .header("X-Upload-Content-Type", mime_type.as_str())
        .json(serde_json::json!({}));

        self.send_resumable(session, local_path, &mime_type)?;
        tracing::info!("Updated {} from {}", file_id, local_path.display());
        Ok(())
    }

    /// Open a resumable session, then stream the file to it
    fn send_resumable(&self, session: ApiRequest, local_path: &Path, mime_type: &str) -> StoreResult<FileId> {
        let response = self.transport.send(session)?.error_for_status()?;
        let location = response
            .header("location")
            .ok_or_else(|| {
                StoreError::UnexpectedResponse("upload session has no Location header".into())
            })?
            .to_string();

        let upload = ApiRequest::new(Method::PUT, location).file(local_path, mime_type);
        self.transport.send(upload)?.error_for_status()?.json()
    }

    fn try_delete(&self, file_id: &str) -> StoreResult<()> {
        let request = ApiRequest::new(Method::DELETE, Self::file_url(file_id));
        self.transport.send(request)?.error_for_status()?;
        tracing::info!("Deleted {}", file_id);
        Ok(())
    }

    fn try_create_folder(&self, name: &str, parent_folder_id: Option<&str>) -> StoreResult<String> {
        let metadata = FileMetadata {
            name,
            mime_type: Some(FOLDER_MIME_TYPE),
            parents: parent_folder_id.into_iter().collect(),
        };
        let request = ApiRequest::post(FILES_URL)
            .query("fields", "id")
            .json(serde_json::to_value(&metadata)?);

        let folder: FileId = self.transport.send(request)?.error_for_status()?.json()?;
        tracing::info!("Created folder '{}' (ID: {})", name, folder.id);
        Ok(folder.id)
    }
}

impl<T: Transport> FileStore for DriveClient<T> {
    fn list(&self, folder_id: Option<&str>, query: Option<&str>) -> StoreResult<Vec<RemoteFile>> {
        let result = self.query_files(list_query(folder_id, query), None);
        log_failure("listing files", result)
    }

    fn find_by_name(&self, name: &str, folder_id: Option<&str>) -> StoreResult<Option<RemoteFile>> {
        let name_clause = format!("name = '{}'", escape_query(name));
        let result = self
            .query_files(
                list_query(folder_id, Some(&name_clause)),
                Some("modifiedTime desc"),
            )
            .map(|files| files.into_iter().next());

        log_failure("searching for file", result)
    }

    fn download(&self, file_id: &str, output: &Path) -> StoreResult<u64> {
        log_failure("downloading file", self.try_download(file_id, output))
    }

    fn upload(&self, local_path: &Path, options: &UploadOptions) -> StoreResult<String> {
        log_failure("uploading file", self.try_upload(local_path, options))
    }

    fn update(&self, file_id: &str, local_path: &Path, mime_type: Option<&str>) -> StoreResult<()> {
        log_failure("updating file", self.try_update(file_id, local_path, mime_type))
    }

    fn delete(&self, file_id: &str) -> StoreResult<()> {
        log_failure("deleting file", self.try_delete(file_id))
    }

    fn create_folder(&self, name: &str, parent_folder_id: Option<&str>) -> StoreResult<String> {
        log_failure(
            "creating folder",
            self.try_create_folder(name, parent_folder_id),
        )
    }
}

/// Join the folder predicate and a caller query with `and`
fn list_query(folder_id: Option<&str>, query: Option<&str>) -> Option<String> {
    let mut clauses = Vec::new();
    if let Some(folder_id) = folder_id {
        clauses.push(format!("'{}' in parents", escape_query(folder_id)));
    }
    if let Some(query) = query.filter(|query| !query.trim().is_empty()) {
        clauses.push(query.to_string());
    }

    if clauses.is_empty() {
        None
    } else {
        Some(clauses.join(" and "))
    }
}

/// Escape a value for use inside a single-quoted query string
fn escape_query(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// `bytes 0-99/1234` -> 1234
fn content_range_total(header: &str) -> Option<u64> {
    header.rsplit('/').next()?.trim().parse().ok()
}

fn guess_mime_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or(FALLBACK_MIME_TYPE)
        .to_string()
}
