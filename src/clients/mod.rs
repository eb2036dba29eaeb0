pub mod qbank_client;

pub use qbank_client::{QbankClient, RawResponse};
