//! Dashboard, exports and settings: singleton endpoints with no CRUD.

use serde::Serialize;

use super::resource;
use crate::download::DownloadSink;
use crate::error::ApiError;
use crate::request::Query;
use crate::types::Payload;

pub const DEFAULT_PERIOD: &str = "month";
pub const DEFAULT_EXPORT_FORMAT: &str = "excel";

resource!(DashboardApi);
resource!(
    /// Spreadsheet exports, always fetched as downloads.
    ExportApi
);
resource!(SettingsApi);

impl DashboardApi<'_> {
    pub async fn data(&self) -> Result<Payload, ApiError> {
        self.pipeline.get("/dashboard", Query::new()).await
    }

    pub async fn stats(&self, period: Option<&str>) -> Result<Payload, ApiError> {
        let query = Query::new().with("period", period.unwrap_or(DEFAULT_PERIOD));
        self.pipeline.get("/dashboard/stats", query).await
    }

    pub async fn charts(&self, kind: &str, period: Option<&str>) -> Result<Payload, ApiError> {
        let query = Query::new()
            .with("type", kind)
            .with("period", period.unwrap_or(DEFAULT_PERIOD));
        self.pipeline.get("/dashboard/charts", query).await
    }
}

impl ExportApi<'_> {
    pub async fn projects(&self, format: Option<&str>, sink: &dyn DownloadSink) -> Result<(), ApiError> {
        let format = format.unwrap_or(DEFAULT_EXPORT_FORMAT);
        self.pipeline
            .download(&format!("/export/projects/{format}"), &format!("projects.{format}"), sink)
            .await
    }

    pub async fn clients(&self, format: Option<&str>, sink: &dyn DownloadSink) -> Result<(), ApiError> {
        let format = format.unwrap_or(DEFAULT_EXPORT_FORMAT);
        self.pipeline
            .download(&format!("/export/clients/{format}"), &format!("clients.{format}"), sink)
            .await
    }

    /// `query` filters the exported rows (employee, date range, ...).
    pub async fn timesheet(
        &self,
        query: &Query,
        format: Option<&str>,
        sink: &dyn DownloadSink,
    ) -> Result<(), ApiError> {
        let format = format.unwrap_or(DEFAULT_EXPORT_FORMAT);
        let encoded = query.encode();
        let endpoint = if encoded.is_empty() {
            format!("/export/timesheet/{format}")
        } else {
            format!("/export/timesheet/{format}?{encoded}")
        };
        self.pipeline
            .download(&endpoint, &format!("timesheet.{format}"), sink)
            .await
    }
}

impl SettingsApi<'_> {
    pub async fn all(&self) -> Result<Payload, ApiError> {
        self.pipeline.get("/settings", Query::new()).await
    }

    pub async fn update<T: Serialize + ?Sized>(&self, settings: &T) -> Result<Payload, ApiError> {
        self.pipeline.put("/settings", settings).await
    }

    pub async fn company(&self) -> Result<Payload, ApiError> {
        self.pipeline.get("/settings/company", Query::new()).await
    }

    pub async fn update_company<T: Serialize + ?Sized>(&self, data: &T) -> Result<Payload, ApiError> {
        self.pipeline.put("/settings/company", data).await
    }
}
