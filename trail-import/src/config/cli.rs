//! Command line and environment configuration.

use clap::Parser;
use std::time::Duration;

use crate::ImportError;
use trail_import_pipeline::config::{DEFAULT_CONCURRENCY, DEFAULT_EVENT_INDEX, DEFAULT_WORK_INDEX};
use trail_import_pipeline::PipelineConfig;
use trail_import_repository::config::MAX_LIST_PAGE_SIZE;
use trail_import_repository::{OpenSearchConfig, S3Config};

/// Command line arguments. Every flag can also be set from the environment.
#[derive(Parser, Debug, Clone)]
#[command(name = "trail-import", version)]
#[command(about = "Import CloudTrail archives from S3 into OpenSearch, once per archive", long_about = None)]
pub struct Cli {
    /// S3 bucket holding the archives
    #[arg(short = 'b', long, env = "TRAIL_BUCKET")]
    pub bucket: String,

    /// AWS region of the bucket
    #[arg(short = 'r', long, env = "AWS_REGION", default_value = "us-west-2")]
    pub region: String,

    /// Only import keys starting with this prefix
    #[arg(short = 'p', long, env = "TRAIL_PREFIX", default_value = "")]
    pub prefix: String,

    /// OpenSearch URL; port 9200 is used when none is given
    #[arg(short = 'e', long = "opensearch", env = "OPENSEARCH_URL")]
    pub opensearch_url: String,

    /// Index recording which archives were imported
    #[arg(long, env = "TRAIL_WORK_INDEX", default_value = DEFAULT_WORK_INDEX)]
    pub work_index: String,

    /// Index receiving the event records
    #[arg(long, env = "TRAIL_CLOUDTRAIL_INDEX", default_value = DEFAULT_EVENT_INDEX)]
    pub cloudtrail_index: String,

    /// Number of archives processed concurrently
    #[arg(short = 'c', long, env = "TRAIL_CONCURRENCY", default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Objects requested per listing page
    #[arg(
        long,
        env = "TRAIL_PAGE_SIZE",
        default_value_t = MAX_LIST_PAGE_SIZE,
        value_parser = clap::value_parser!(i32).range(1..=MAX_LIST_PAGE_SIZE as i64)
    )]
    pub page_size: i32,

    /// Timeout for each request to S3 or OpenSearch, in seconds
    #[arg(long, env = "TRAIL_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Endpoint override for S3-compatible stores
    #[arg(long, env = "S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    /// Static access key; the default AWS provider chain is used when unset
    #[arg(long, env = "AWS_ACCESS_KEY", hide_env_values = true)]
    pub access_key: Option<String>,

    /// Static secret key; the default AWS provider chain is used when unset
    #[arg(long, env = "AWS_SECRET_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, env = "TRAIL_LOG_JSON")]
    pub log_json: bool,
}

/// Validated configuration for one run.
#[derive(Debug, Clone)]
pub struct ImportConfig {
    pub pipeline: PipelineConfig,
    pub opensearch: OpenSearchConfig,
    pub s3: S3Config,
    pub log_json: bool,
}

impl TryFrom<Cli> for ImportConfig {
    type Error = ImportError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        if cli.opensearch_url.trim().is_empty() {
            return Err(ImportError::config("an OpenSearch URL is required (--opensearch)"));
        }
        if cli.request_timeout_secs == 0 {
            return Err(ImportError::config("request timeout must be at least one second"));
        }

        let timeout = Duration::from_secs(cli.request_timeout_secs);

        let pipeline = PipelineConfig::new(cli.bucket, cli.prefix)
            .with_indexes(cli.work_index, cli.cloudtrail_index)
            .with_concurrency(cli.concurrency);
        pipeline.validate()?;

        let opensearch = OpenSearchConfig::new(cli.opensearch_url).with_request_timeout(timeout);

        let mut s3 = S3Config::new(cli.region);
        s3.endpoint = cli.s3_endpoint.filter(|e| !e.trim().is_empty());
        s3.access_key = cli.access_key.filter(|k| !k.is_empty());
        s3.secret_key = cli.secret_key.filter(|k| !k.is_empty());
        s3.page_size = cli.page_size;
        s3.operation_timeout = timeout;

        Ok(Self {
            pipeline,
            opensearch,
            s3,
            log_json: cli.log_json,
        })
    }
}
