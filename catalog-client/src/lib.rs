//! Typed client for the catalog store and the admin session API.
//!
//! # Example
//!
//! ```no_run
//! use catalog_client::ClientConfig;
//! use catalog_client::Catalog;
//!
//! # async fn run() -> Result<(), catalog_client::ClientError> {
//! let config = ClientConfig {
//!     api_base: "https://api.example.com".to_string(),
//!     ..Default::default()
//! };
//! let catalog = Catalog::new(&config)?;
//!
//! for product in catalog.products()?.list().await? {
//!     println!("{} {}", product.productid, product.title);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod envelope;
pub mod error;
pub mod http;
pub mod images;
pub mod resource;
pub mod resources;
pub mod session;
pub mod uploads;
pub mod view;

pub use config::ClientConfig;
pub use error::ClientError;
pub use http::ApiClient;
pub use images::is_display_url;
pub use images::ImageKeyResolver;
pub use resource::new_record_id;
pub use resource::Resource;
pub use resource::ResourceClient;
pub use resources::ContactRecord;
pub use resources::GalleryClient;
pub use resources::GalleryItem;
pub use resources::LogClient;
pub use resources::LogEntry;
pub use resources::Product;
pub use resources::ProductCatalog;
pub use resources::ProductRecord;
pub use session::GuardState;
pub use session::SessionClient;
pub use session::SessionGuard;
pub use session::SessionProbe;
pub use uploads::UploadClient;
pub use view::ListView;
pub use view::MountFlag;
pub use view::RequestSequence;
pub use view::RequestTicket;

/// Entry point building each client against the base URL its resource
/// family is configured with.
#[derive(Debug, Clone)]
pub struct Catalog {
    config: ClientConfig,
    http: reqwest::Client,
}

impl Catalog {
    /// # Errors
    /// `Http` if the HTTP client cannot be built
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        Ok(Self {
            config: config.clone(),
            http: reqwest::Client::builder().build()?,
        })
    }

    fn api(&self, base: Result<String, ClientError>) -> Result<ApiClient, ClientError> {
        ApiClient::with_client(self.http.clone(), &base?, self.config.bearer_token())
    }

    pub fn products(&self) -> Result<ProductCatalog, ClientError> {
        Ok(ProductCatalog::new(ResourceClient::new(
            self.api(self.config.products_base())?,
        )))
    }

    pub fn logs(&self) -> Result<LogClient, ClientError> {
        Ok(LogClient::new(ResourceClient::new(
            self.api(self.config.products_base())?,
        )))
    }

    pub fn contacts(&self) -> Result<ResourceClient<ContactRecord>, ClientError> {
        Ok(ResourceClient::new(self.api(self.config.contacts_base())?))
    }

    pub fn gallery(&self) -> Result<GalleryClient, ClientError> {
        Ok(GalleryClient::new(self.api(self.config.gallery_base())?))
    }

    pub fn images(&self) -> Result<ImageKeyResolver, ClientError> {
        Ok(ImageKeyResolver::new(self.api(self.config.products_base())?))
    }

    pub fn uploads(&self) -> Result<UploadClient, ClientError> {
        Ok(UploadClient::new(self.api(self.config.products_base())?))
    }

    /// # Errors
    /// `Config` if `api_url` is not a valid URL
    pub fn session(&self) -> Result<SessionClient, ClientError> {
        SessionClient::new(&self.config.api_url)
    }
}
