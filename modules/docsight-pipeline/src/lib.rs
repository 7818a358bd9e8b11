pub mod analyzer;
pub mod encoder;
pub mod error;
pub mod narrator;
pub mod policy;

pub use analyzer::{DocumentAnalyzer, PipelineSnapshot, PipelineState};
pub use encoder::{decode, encode, encode_bytes, strip_data_url_prefix};
pub use error::{EncodingError, PipelineError, PipelineStep, Result, UploadRejection};
pub use narrator::Narrator;
pub use policy::UploadPolicy;
