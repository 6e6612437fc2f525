pub mod blob_fetcher_reqwest;
pub mod probe_reqwest;
