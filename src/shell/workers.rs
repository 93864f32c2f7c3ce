use crate::adapters::in_memory::in_memory_container_store::InMemoryContainerStore;
use crate::adapters::in_memory::in_memory_member_store::InMemoryMemberStore;
use crate::application::consumer::handler::BatchHandler;
use crate::application::consumer::runner::BatchConsumer;
use crate::application::linking::handler::MemberLinkHandler;
use crate::application::sync::engine::{AssociationSyncEngine, EngineSettings};
use crate::config::SyncConfig;
use crate::core::association::container::ContainerKind;
use crate::core::ports::BatchSource;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Stores backing one worker process.
#[derive(Clone)]
pub struct WorkerStores {
    pub containers: HashMap<ContainerKind, Arc<InMemoryContainerStore>>,
    pub members: Arc<InMemoryMemberStore>,
}

impl WorkerStores {
    pub fn in_memory() -> Self {
        Self {
            containers: ContainerKind::ALL
                .into_iter()
                .map(|kind| (kind, Arc::new(InMemoryContainerStore::new())))
                .collect(),
            members: Arc::new(InMemoryMemberStore::new()),
        }
    }
}

pub struct WorkerSet {
    shutdown: watch::Sender<bool>,
    handles: Vec<(String, JoinHandle<()>)>,
}

impl WorkerSet {
    pub fn topics(&self) -> Vec<&str> {
        self.handles.iter().map(|(topic, _)| topic.as_str()).collect()
    }

    /// Signals every consumer and waits for in-flight batches to finish.
    pub async fn shutdown(self) {
        if self.shutdown.send(true).is_err() {
            debug!("every consumer had already stopped before shutdown");
        }
        for (topic, handle) in self.handles {
            if let Err(err) = handle.await {
                error!(topic = %topic, error = %err, "consumer task ended abnormally");
            }
        }
        info!("all consumers stopped");
    }
}

pub fn spawn_workers<TSource>(
    config: &SyncConfig,
    source: Arc<TSource>,
    stores: &WorkerStores,
) -> WorkerSet
where
    TSource: BatchSource + 'static,
{
    let (shutdown, signal) = watch::channel(false);
    let settings = EngineSettings::from(config);
    let mut handles = Vec::new();

    for kind in ContainerKind::ALL {
        let Some(store) = stores.containers.get(&kind) else {
            continue;
        };
        let engine = Arc::new(AssociationSyncEngine::new(kind, store.clone(), settings));
        let topic = config.topic_for(kind).to_string();
        handles.push(spawn_consumer(config, &topic, source.clone(), engine, signal.clone()));
    }

    for kind in ContainerKind::ALL {
        let linker = Arc::new(MemberLinkHandler::new(kind, stores.members.clone()));
        let topic = config.member_link_topic_for(kind).to_string();
        handles.push(spawn_consumer(config, &topic, source.clone(), linker, signal.clone()));
    }

    WorkerSet { shutdown, handles }
}

fn spawn_consumer<TSource, THandler>(
    config: &SyncConfig,
    topic: &str,
    source: Arc<TSource>,
    handler: Arc<THandler>,
    signal: watch::Receiver<bool>,
) -> (String, JoinHandle<()>)
where
    TSource: BatchSource + 'static,
    THandler: BatchHandler + 'static,
{
    let consumer = BatchConsumer::new(
        topic,
        source,
        handler,
        config.batch_limit,
        config.poll_interval,
    );
    let handle = tokio::spawn(async move { consumer.run(signal).await });
    (topic.to_string(), handle)
}
