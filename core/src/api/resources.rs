//! Collection resources. Each one is `Crud` under its path; the extra
//! workflow calls (approve, send, export, ...) live on the wrapper.

use serde::Serialize;
use serde_json::json;

use super::{resource, Crud};
use crate::download::DownloadSink;
use crate::error::ApiError;
use crate::http::FileHandle;
use crate::request::Query;
use crate::types::{Payload, UploadReceipt};

resource!(UsersApi, "/users");
resource!(ClientsApi, "/clients");
resource!(ContractorsApi, "/contractors");
resource!(ProjectsApi, "/projects");
resource!(TasksApi, "/tasks");
resource!(EmployeesApi, "/employees");
resource!(TimesheetApi, "/timesheet");
resource!(
    /// Stock items; movements are a sibling collection.
    WarehouseApi,
    "/warehouse/items"
);
resource!(EstimatesApi, "/estimates");
resource!(
    /// Commercial offers sent to clients.
    OffersApi,
    "/offers"
);
resource!(MaterialRequestsApi, "/material-requests");
resource!(DocumentsApi, "/documents");
resource!(
    /// The company price list.
    PriceListApi,
    "/price-list"
);
resource!(MessagesApi, "/messages");
resource!(NotificationsApi, "/notifications");

impl ProjectsApi<'_> {
    pub async fn tasks(&self, project_id: i64) -> Result<Payload, ApiError> {
        self.pipeline
            .get(&format!("{}/tasks", Self::item_path(project_id)), Query::new())
            .await
    }

    pub async fn create_task<T: Serialize + ?Sized>(&self, project_id: i64, data: &T) -> Result<Payload, ApiError> {
        self.pipeline
            .post(&format!("{}/tasks", Self::item_path(project_id)), data)
            .await
    }

    pub async fn estimates(&self, project_id: i64) -> Result<Payload, ApiError> {
        self.pipeline
            .get(&format!("{}/estimates", Self::item_path(project_id)), Query::new())
            .await
    }

    pub async fn create_estimate<T: Serialize + ?Sized>(
        &self,
        project_id: i64,
        data: &T,
    ) -> Result<Payload, ApiError> {
        self.pipeline
            .post(&format!("{}/estimates", Self::item_path(project_id)), data)
            .await
    }
}

impl TimesheetApi<'_> {
    pub async fn approve(&self, id: i64) -> Result<Payload, ApiError> {
        self.pipeline
            .post_empty(&format!("{}/approve", Self::item_path(id)))
            .await
    }

    pub async fn reject(&self, id: i64, reason: &str) -> Result<Payload, ApiError> {
        self.pipeline
            .post(&format!("{}/reject", Self::item_path(id)), &json!({ "reason": reason }))
            .await
    }
}

impl WarehouseApi<'_> {
    pub async fn movements(&self, query: Query) -> Result<Payload, ApiError> {
        self.pipeline.get("/warehouse/movements", query).await
    }

    pub async fn create_movement<T: Serialize + ?Sized>(&self, data: &T) -> Result<Payload, ApiError> {
        self.pipeline.post("/warehouse/movements", data).await
    }
}

impl EstimatesApi<'_> {
    pub async fn items(&self, id: i64) -> Result<Payload, ApiError> {
        self.pipeline
            .get(&format!("{}/items", Self::item_path(id)), Query::new())
            .await
    }

    pub async fn add_item<T: Serialize + ?Sized>(&self, id: i64, data: &T) -> Result<Payload, ApiError> {
        self.pipeline
            .post(&format!("{}/items", Self::item_path(id)), data)
            .await
    }

    pub async fn update_item<T: Serialize + ?Sized>(
        &self,
        id: i64,
        item_id: i64,
        data: &T,
    ) -> Result<Payload, ApiError> {
        self.pipeline
            .put(&format!("{}/items/{item_id}", Self::item_path(id)), data)
            .await
    }

    pub async fn delete_item(&self, id: i64, item_id: i64) -> Result<Payload, ApiError> {
        self.pipeline
            .delete(&format!("{}/items/{item_id}", Self::item_path(id)))
            .await
    }

    pub async fn approve(&self, id: i64) -> Result<Payload, ApiError> {
        self.pipeline
            .post_empty(&format!("{}/approve", Self::item_path(id)))
            .await
    }

    /// Saved as `estimate_{id}.pdf`.
    pub async fn export_pdf(&self, id: i64, sink: &dyn DownloadSink) -> Result<(), ApiError> {
        self.pipeline
            .download(&format!("{}/pdf", Self::item_path(id)), &format!("estimate_{id}.pdf"), sink)
            .await
    }
}

impl OffersApi<'_> {
    pub async fn send(&self, id: i64) -> Result<Payload, ApiError> {
        self.pipeline
            .post_empty(&format!("{}/send", Self::item_path(id)))
            .await
    }

    /// Saved as `offer_{id}.pdf`.
    pub async fn export_pdf(&self, id: i64, sink: &dyn DownloadSink) -> Result<(), ApiError> {
        self.pipeline
            .download(&format!("{}/pdf", Self::item_path(id)), &format!("offer_{id}.pdf"), sink)
            .await
    }
}

impl MaterialRequestsApi<'_> {
    pub async fn approve(&self, id: i64) -> Result<Payload, ApiError> {
        self.pipeline
            .post_empty(&format!("{}/approve", Self::item_path(id)))
            .await
    }
}

impl DocumentsApi<'_> {
    /// Uploads go to `/upload`, not under `/documents`.
    pub async fn upload(&self, file: FileHandle, fields: &[(String, String)]) -> Result<UploadReceipt, ApiError> {
        self.pipeline.upload("/upload", file, fields).await?.into_typed()
    }

    pub async fn download(&self, id: i64, filename: &str, sink: &dyn DownloadSink) -> Result<(), ApiError> {
        self.pipeline
            .download(&format!("{}/download", Self::item_path(id)), filename, sink)
            .await
    }
}

impl PriceListApi<'_> {
    pub async fn search(&self, q: &str) -> Result<Payload, ApiError> {
        self.pipeline
            .get("/price-list/search", Query::new().with("q", q))
            .await
    }
}

impl MessagesApi<'_> {
    pub async fn mark_as_read(&self, id: i64) -> Result<Payload, ApiError> {
        self.pipeline
            .patch(&Self::item_path(id), &json!({ "isRead": true }))
            .await
    }
}

impl NotificationsApi<'_> {
    pub async fn mark_as_read(&self, id: i64) -> Result<Payload, ApiError> {
        self.pipeline
            .patch(&Self::item_path(id), &json!({ "isRead": true }))
            .await
    }

    pub async fn mark_all_as_read(&self) -> Result<Payload, ApiError> {
        self.pipeline.post_empty("/notifications/mark-all-read").await
    }
}
