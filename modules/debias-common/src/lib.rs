pub mod config;
pub mod error;
pub mod types;
pub mod url;

pub use config::Config;
pub use error::{DebiasError, Result};
pub use types::{FetchRequest, Metadata, NewMetadata, ProcessRequest, RenderPolicy, RenderRequest, Target};
