pub mod file;

pub use file::FileCredentialStore;
