use anyhow::Result;
use browserless_client::BrowserlessClient;
use debias_broker::Broker;
use debias_common::Config;
use debias_dedup::DedupCache;
use debias_metastore::MetaStore;
use debias_objectstore::ObjectStore;
use debias_pipeline::ParserRegistry;

pub struct Clients {
    pub renderer: BrowserlessClient,
    pub broker: Broker,
    pub object_store: ObjectStore,
    pub metastore: MetaStore,
    pub dedup: DedupCache,
    pub parsers: ParserRegistry,
}

impl Clients {
    pub async fn connect(config: &Config) -> Result<Self> {
        let renderer = BrowserlessClient::new(
            &config.render.browserless_url,
            config.render.browserless_token.as_deref(),
        );

        let broker = Broker::connect(&config.nats.dsn).await?;
        broker.ensure_stream().await?;

        let object_store = ObjectStore::connect(&config.s3).await;

        let metastore = MetaStore::connect(&config.pg.connection).await?;
        metastore.migrate().await?;

        let dedup = DedupCache::connect(&config.keyvalue.dsn).await?;

        let parsers = ParserRegistry::from_targets(config.app.targets.clone());

        Ok(Self {
            renderer,
            broker,
            object_store,
            metastore,
            dedup,
            parsers,
        })
    }
}
