use crate::config::Config;
use crate::grpc::authentication::AuthenticationService;
use crate::grpc::upload::UploadService;
use crate::grpc::video_catalog::VideoCatalogService;
use std::sync::Arc;

/// Application context containing shared dependencies
/// This reduces parameter passing and makes it easier to add new dependencies
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub auth: Arc<dyn AuthenticationService>,
    pub upload: Arc<dyn UploadService>,
    pub video_catalog: Arc<dyn VideoCatalogService>,
}

impl AppContext {
    /// Creates a new application context
    pub fn new(
        config: Arc<Config>,
        auth: Arc<dyn AuthenticationService>,
        upload: Arc<dyn UploadService>,
        video_catalog: Arc<dyn VideoCatalogService>,
    ) -> Self {
        Self {
            config,
            auth,
            upload,
            video_catalog,
        }
    }
}
