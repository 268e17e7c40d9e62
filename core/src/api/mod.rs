//! Per-resource wrappers over `RequestPipeline`.
//!
//! Every wrapper is a borrowed view of the pipeline plus a fixed path
//! template. Collection resources share the `Crud` operations; resource
//! specific calls are inherent methods on each wrapper.

mod auth;
mod reports;
mod resources;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::ApiError;
use crate::pipeline::RequestPipeline;
use crate::request::Query;
use crate::types::Payload;

pub use auth::AuthApi;
pub use reports::{DashboardApi, ExportApi, SettingsApi, DEFAULT_EXPORT_FORMAT, DEFAULT_PERIOD};
pub use resources::{
    ClientsApi, ContractorsApi, DocumentsApi, EmployeesApi, EstimatesApi, MaterialRequestsApi,
    MessagesApi, NotificationsApi, OffersApi, PriceListApi, ProjectsApi, TasksApi, TimesheetApi,
    UsersApi, WarehouseApi,
};

/// List/get/create/update/delete under `PATH`.
#[async_trait]
pub trait Crud: Sync {
    const PATH: &'static str;

    fn pipeline(&self) -> &RequestPipeline;

    fn item_path(id: i64) -> String {
        format!("{}/{id}", Self::PATH)
    }

    async fn list(&self, query: Query) -> Result<Payload, ApiError> {
        self.pipeline().get(Self::PATH, query).await
    }

    async fn get(&self, id: i64) -> Result<Payload, ApiError> {
        self.pipeline().get(&Self::item_path(id), Query::new()).await
    }

    async fn create<T: Serialize + Sync + ?Sized>(&self, data: &T) -> Result<Payload, ApiError> {
        self.pipeline().post(Self::PATH, data).await
    }

    async fn update<T: Serialize + Sync + ?Sized>(&self, id: i64, data: &T) -> Result<Payload, ApiError> {
        self.pipeline().put(&Self::item_path(id), data).await
    }

    async fn delete(&self, id: i64) -> Result<Payload, ApiError> {
        self.pipeline().delete(&Self::item_path(id)).await
    }
}

macro_rules! resource {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        pub struct $name<'a> {
            pipeline: &'a $crate::pipeline::RequestPipeline,
        }

        impl<'a> $name<'a> {
            pub fn new(pipeline: &'a $crate::pipeline::RequestPipeline) -> Self {
                Self { pipeline }
            }
        }
    };
    ($(#[$meta:meta])* $name:ident, $path:literal) => {
        $crate::api::resource!($(#[$meta])* $name);

        impl $crate::api::Crud for $name<'_> {
            const PATH: &'static str = $path;

            fn pipeline(&self) -> &$crate::pipeline::RequestPipeline {
                self.pipeline
            }
        }
    };
}

pub(crate) use resource;

impl RequestPipeline {
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    pub fn users(&self) -> UsersApi<'_> {
        UsersApi::new(self)
    }

    pub fn clients(&self) -> ClientsApi<'_> {
        ClientsApi::new(self)
    }

    pub fn contractors(&self) -> ContractorsApi<'_> {
        ContractorsApi::new(self)
    }

    pub fn projects(&self) -> ProjectsApi<'_> {
        ProjectsApi::new(self)
    }

    pub fn tasks(&self) -> TasksApi<'_> {
        TasksApi::new(self)
    }

    pub fn employees(&self) -> EmployeesApi<'_> {
        EmployeesApi::new(self)
    }

    pub fn timesheet(&self) -> TimesheetApi<'_> {
        TimesheetApi::new(self)
    }

    pub fn warehouse(&self) -> WarehouseApi<'_> {
        WarehouseApi::new(self)
    }

    pub fn estimates(&self) -> EstimatesApi<'_> {
        EstimatesApi::new(self)
    }

    pub fn offers(&self) -> OffersApi<'_> {
        OffersApi::new(self)
    }

    pub fn material_requests(&self) -> MaterialRequestsApi<'_> {
        MaterialRequestsApi::new(self)
    }

    pub fn documents(&self) -> DocumentsApi<'_> {
        DocumentsApi::new(self)
    }

    pub fn dashboard(&self) -> DashboardApi<'_> {
        DashboardApi::new(self)
    }

    pub fn export(&self) -> ExportApi<'_> {
        ExportApi::new(self)
    }

    pub fn price_list(&self) -> PriceListApi<'_> {
        PriceListApi::new(self)
    }

    pub fn messages(&self) -> MessagesApi<'_> {
        MessagesApi::new(self)
    }

    pub fn notifications(&self) -> NotificationsApi<'_> {
        NotificationsApi::new(self)
    }

    pub fn settings(&self) -> SettingsApi<'_> {
        SettingsApi::new(self)
    }
}
