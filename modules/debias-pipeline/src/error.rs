use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    ObjectStore(#[from] debias_objectstore::ObjectStoreError),

    #[error(transparent)]
    MetaStore(#[from] debias_metastore::MetaStoreError),

    #[error(transparent)]
    Broker(#[from] debias_broker::BrokerError),
}
