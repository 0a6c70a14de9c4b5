pub mod contact;
pub mod gallery;
pub mod log;
pub mod product;

pub use contact::ContactPatch;
pub use contact::ContactRecord;
pub use gallery::GalleryClient;
pub use gallery::GalleryItem;
pub use log::LogClient;
pub use log::LogEntry;
pub use product::Product;
pub use product::ProductCatalog;
pub use product::ProductPatch;
pub use product::ProductRecord;
