pub mod config;
pub mod indexer;
pub mod metrics;
pub mod testing;
pub mod transport;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, IndexerConfig,
    SanitizedConfig, ServerConfig,
};
pub use indexer::{
    CategoryCode, CategoryMapper, CorsaroIndexer, Indexer, IndexerError, IndexerInfo,
    PageErrorPolicy, Query, Release, VerifyError,
};
pub use transport::{ReqwestTransport, Transport, TransportError, TransportResponse};
