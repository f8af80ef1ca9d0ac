use std::sync::Arc;

use anyhow::Result;
use debias_broker::Broker;
use debias_common::Config;
use debias_metastore::MetaStore;
use debias_nlp::{HeuristicNlpEngine, NlpEngine};
use debias_objectstore::ObjectStore;
use debias_wordstore::WordStore;

pub struct Clients {
    pub broker: Broker,
    pub object_store: ObjectStore,
    pub metastore: MetaStore,
    pub wordstore: WordStore,
    pub nlp: Arc<dyn NlpEngine>,
}

impl Clients {
    pub async fn connect(config: &Config) -> Result<Self> {
        let broker = Broker::connect(&config.nats.dsn).await?;
        broker.ensure_stream().await?;

        let object_store = ObjectStore::connect(&config.s3).await;

        let metastore = MetaStore::connect(&config.pg.connection).await?;
        metastore.migrate().await?;

        let wordstore = WordStore::connect(&config.pg.connection).await?;
        wordstore.migrate().await?;

        let nlp: Arc<dyn NlpEngine> = Arc::new(HeuristicNlpEngine::new());

        Ok(Self {
            broker,
            object_store,
            metastore,
            wordstore,
            nlp,
        })
    }
}
