//! Process-wide state, initialized once at startup and released at shutdown (§5, §9 —
//! "process-wide state S initialized at startup and released at shutdown, with clients
//! passed to handlers by explicit context" rather than a module-level DI singleton).

use std::time::Duration;

use anyhow::Result;
use debias_broker::Broker;
use debias_common::Config;
use debias_dedup::DedupCache;
use debias_metastore::MetaStore;
use debias_objectstore::ObjectStore;
use debias_pipeline::ParserRegistry;

pub struct Clients {
    pub http: reqwest::Client,
    pub broker: Broker,
    pub object_store: ObjectStore,
    pub metastore: MetaStore,
    pub dedup: DedupCache,
    pub parsers: ParserRegistry,
}

impl Clients {
    pub async fn connect(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.http.user_agent.clone())
            .timeout(Duration::from_secs(30))
            .build()?;

        let broker = Broker::connect(&config.nats.dsn).await?;
        broker.ensure_stream().await?;

        let object_store = ObjectStore::connect(&config.s3).await;

        let metastore = MetaStore::connect(&config.pg.connection).await?;
        metastore.migrate().await?;

        let dedup = DedupCache::connect(&config.keyvalue.dsn).await?;

        let parsers = ParserRegistry::from_targets(config.app.targets.clone());

        Ok(Self {
            http,
            broker,
            object_store,
            metastore,
            dedup,
            parsers,
        })
    }
}
