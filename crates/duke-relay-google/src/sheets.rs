//! Google Sheets v4 client

use duke_relay_core::store::log_failure;
use duke_relay_core::{
    SheetMetadata, StoreError, StoreResult, TableRows, TableStore, UpdateSummary, ValueInputMode,
};
use reqwest::Method;
use serde_json::{json, Value};

use crate::auth::{CredentialSource, ServiceAccountAuth, SHEETS_SCOPE};
use crate::error::AuthError;
use crate::protocol::{
    AddSheetReply, AppendValuesResponse, BatchUpdateResponse, Spreadsheet, UpdateValuesResponse,
    ValueRange,
};
use crate::transport::{path_segment, ApiRequest, HttpTransport, Transport};

const SPREADSHEETS_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Sheets client implementing [`TableStore`]
///
/// Ranges are forwarded exactly as given; their validity is for the remote
/// to decide.
pub struct SheetsClient<T: Transport = HttpTransport> {
    transport: T,
}

impl SheetsClient<HttpTransport> {
    /// Build a client authenticated with the Sheets scope
    pub fn from_credentials(source: &CredentialSource) -> Result<Self, AuthError> {
        let auth = ServiceAccountAuth::from_source(source, SHEETS_SCOPE)?;
        let transport = HttpTransport::new(auth)?;
        tracing::info!("Sheets client ready for {}", transport.client_email());
        Ok(Self::with_transport(transport))
    }
}

impl<T: Transport> SheetsClient<T> {
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn spreadsheet_url(spreadsheet_id: &str) -> String {
        format!("{SPREADSHEETS_URL}/{}", path_segment(spreadsheet_id))
    }

    fn values_url(spreadsheet_id: &str, range: &str) -> String {
        format!(
            "{}/values/{}",
            Self::spreadsheet_url(spreadsheet_id),
            path_segment(range)
        )
    }

    fn try_read(&self, spreadsheet_id: &str, range: &str) -> StoreResult<TableRows> {
        let request = ApiRequest::get(Self::values_url(spreadsheet_id, range));
        let values: ValueRange = self.transport.send(request)?.error_for_status()?.json()?;
        tracing::debug!("Read {} rows from {}", values.values.len(), range);
        Ok(values.values)
    }

    fn try_write(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: &TableRows,
        mode: ValueInputMode,
    ) -> StoreResult<UpdateSummary> {
        let request = ApiRequest::new(Method::PUT, Self::values_url(spreadsheet_id, range))
            .query("valueInputOption", mode.as_str())
            .json(serde_json::to_value(ValueRange::for_write(range, rows))?);

        let response: UpdateValuesResponse =
            self.transport.send(request)?.error_for_status()?.json()?;
        tracing::info!("Updated {} cells", response.updated_cells);
        Ok(response.into())
    }

    fn try_append(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: &TableRows,
        mode: ValueInputMode,
    ) -> StoreResult<UpdateSummary> {
        let url = format!("{}:append", Self::values_url(spreadsheet_id, range));
        let request = ApiRequest::post(url)
            .query("valueInputOption", mode.as_str())
            .json(serde_json::to_value(ValueRange::for_write(range, rows))?);

        let response: AppendValuesResponse =
            self.transport.send(request)?.error_for_status()?.json()?;
        tracing::info!("Appended {} cells", response.updates.updated_cells);
        Ok(response.updates.into())
    }

    fn try_clear(&self, spreadsheet_id: &str, range: &str) -> StoreResult<()> {
        let url = format!("{}:clear", Self::values_url(spreadsheet_id, range));
        let request = ApiRequest::post(url).json(json!({}));
        self.transport.send(request)?.error_for_status()?;
        tracing::info!("Cleared range: {}", range);
        Ok(())
    }

    fn try_metadata(&self, spreadsheet_id: &str) -> StoreResult<Vec<SheetMetadata>> {
        let request =
            ApiRequest::get(Self::spreadsheet_url(spreadsheet_id)).query("fields", "sheets.properties");
        let spreadsheet: Spreadsheet = self.transport.send(request)?.error_for_status()?.json()?;
        Ok(spreadsheet
            .sheets
            .into_iter()
            .map(|sheet| sheet.properties.into())
            .collect())
    }

    fn try_batch_update(&self, spreadsheet_id: &str, requests: &[Value]) -> StoreResult<Vec<Value>> {
        let url = format!("{}:batchUpdate", Self::spreadsheet_url(spreadsheet_id));
        let request = ApiRequest::post(url).json(json!({ "requests": requests }));
        let response: BatchUpdateResponse =
            self.transport.send(request)?.error_for_status()?.json()?;
        Ok(response.replies)
    }

    fn try_create_sheet(&self, spreadsheet_id: &str, title: &str) -> StoreResult<SheetMetadata> {
        let requests = [json!({"addSheet": {"properties": {"title": title}}})];
        let replies = self.try_batch_update(spreadsheet_id, &requests)?;

        let reply = replies.into_iter().next().ok_or_else(|| {
            StoreError::UnexpectedResponse("addSheet returned no reply".into())
        })?;
        let reply: AddSheetReply = serde_json::from_value(reply)?;

        tracing::info!("Sheet '{}' created", title);
        Ok(reply.add_sheet.properties.into())
    }

    fn try_delete_sheet(&self, spreadsheet_id: &str, sheet_id: i64) -> StoreResult<()> {
        let requests = [json!({"deleteSheet": {"sheetId": sheet_id}})];
        self.try_batch_update(spreadsheet_id, &requests)?;
        tracing::info!("Sheet {} deleted", sheet_id);
        Ok(())
    }
}

impl<T: Transport> TableStore for SheetsClient<T> {
    fn read_range(&self, spreadsheet_id: &str, range: &str) -> StoreResult<TableRows> {
        log_failure("reading from sheet", self.try_read(spreadsheet_id, range))
    }

    fn write_range(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: &TableRows,
        mode: ValueInputMode,
    ) -> StoreResult<UpdateSummary> {
        log_failure(
            "writing to sheet",
            self.try_write(spreadsheet_id, range, rows, mode),
        )
    }

    fn append_rows(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: &TableRows,
        mode: ValueInputMode,
    ) -> StoreResult<UpdateSummary> {
        log_failure(
            "appending to sheet",
            self.try_append(spreadsheet_id, range, rows, mode),
        )
    }

    fn clear_range(&self, spreadsheet_id: &str, range: &str) -> StoreResult<()> {
        log_failure("clearing range", self.try_clear(spreadsheet_id, range))
    }

    fn sheet_metadata(&self, spreadsheet_id: &str) -> StoreResult<Vec<SheetMetadata>> {
        log_failure("getting sheet metadata", self.try_metadata(spreadsheet_id))
    }

    fn create_sheet(&self, spreadsheet_id: &str, title: &str) -> StoreResult<SheetMetadata> {
        log_failure("creating sheet", self.try_create_sheet(spreadsheet_id, title))
    }

    fn delete_sheet(&self, spreadsheet_id: &str, sheet_id: i64) -> StoreResult<()> {
        log_failure("deleting sheet", self.try_delete_sheet(spreadsheet_id, sheet_id))
    }

    fn batch_update(&self, spreadsheet_id: &str, requests: &[Value]) -> StoreResult<Vec<Value>> {
        log_failure(
            "batch updating spreadsheet",
            self.try_batch_update(spreadsheet_id, requests),
        )
    }
}
