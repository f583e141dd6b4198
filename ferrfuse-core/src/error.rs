use snafu::prelude::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum FusionError {
    #[snafu(display("Invalid config `{}`: {}", field, reason))]
    InvalidConfig { field: String, reason: String },
    #[snafu(display("Invalid page {}: {}", page, reason))]
    InvalidPage { page: usize, reason: String },
    #[snafu(display("No page of {} could be processed", total))]
    NoPagesProcessed { total: usize },
    #[snafu(display("Build worker pool error: {}", source))]
    ThreadPool { source: rayon::ThreadPoolBuildError },
    #[snafu(display("Read `{}` error: {}", path, source))]
    ReadInput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Write `{}` error: {}", path, source))]
    WriteOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Json error at stage `{}`: {}", stage, source))]
    Json {
        source: serde_json::Error,
        stage: String,
    },
}
