use super::config_store::ConfigStore;
use crate::mapping::MappingTable;
use color_eyre::Result;
use tokio::sync::mpsc::{channel, Sender};
use tokio::sync::oneshot;
use tracing::{debug, error, info};

macro_rules! handle_action {
    ($action:expr, $response_tx:expr) => {
        if $response_tx.send($action.await).is_err() {
            error!("Failed to send response");
        }
    };
}

/// Requests handled by the persistence worker
#[derive(Debug)]
pub enum PersistenceAction {
    /// Store a new sensitivity multiplier
    SetSensitivity(f64),

    /// Reset to defaults and report the values written
    LoadDefaults {
        response_tx: oneshot::Sender<Result<(MappingTable, f64)>>,
    },

    /// Write the current state and report the outcome
    Flush {
        response_tx: oneshot::Sender<Result<()>>,
    },
}

// State owned by the worker task
struct PersistenceState {
    store: ConfigStore,
    mapping: MappingTable,
    sensitivity: f64,
}

impl PersistenceState {
    async fn save(&self) -> Result<()> {
        self.store.save(&self.mapping, self.sensitivity).await
    }

    async fn save_logged(&self) {
        if let Err(e) = self.save().await {
            error!("Failed to save config: {}", e);
        }
    }

    async fn load_defaults(&mut self) -> Result<(MappingTable, f64)> {
        let (mapping, sensitivity) = self.store.load_defaults().await?;
        self.mapping = mapping;
        self.sensitivity = sensitivity;
        Ok((mapping, sensitivity))
    }
}

/// Background task that writes config changes one at a time
pub struct PersistenceWorker {
    tx: Sender<PersistenceAction>,
    worker_handle: tokio::task::JoinHandle<()>,
}

impl PersistenceWorker {
    /// Spawns the worker with the values currently on disk
    pub fn spawn(store: ConfigStore, mapping: MappingTable, sensitivity: f64) -> Self {
        let (tx, mut rx) = channel::<PersistenceAction>(32);
        let mut state = PersistenceState {
            store,
            mapping,
            sensitivity,
        };

        let worker_handle = tokio::spawn(async move {
            while let Some(action) = rx.recv().await {
                debug!("Persistence action: {:?}", action);
                match action {
                    PersistenceAction::SetSensitivity(value) => {
                        state.sensitivity = value;
                        state.save_logged().await;
                    }
                    PersistenceAction::LoadDefaults { response_tx } => {
                        handle_action!(state.load_defaults(), response_tx);
                    }
                    PersistenceAction::Flush { response_tx } => {
                        handle_action!(state.save(), response_tx);
                    }
                }
            }
            info!("Persistence worker finished");
        });

        Self { tx, worker_handle }
    }

    pub fn sender(&self) -> Sender<PersistenceAction> {
        self.tx.clone()
    }

    /// Closes the queue and waits until pending writes are done
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.worker_handle.await {
            error!("Persistence worker panicked: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{InputCode, Slot};
    use crate::persistence::StoredConfig;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn writes_requests_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("config.toml"));
        let mut mapping = MappingTable::default();
        mapping.bind(Slot::XButton, Some(InputCode(0x58)));
        let worker = PersistenceWorker::spawn(store.clone(), mapping, 1.0);
        let sender = worker.sender();

        sender.send(PersistenceAction::SetSensitivity(2.0)).await.unwrap();
        sender.send(PersistenceAction::SetSensitivity(3.0)).await.unwrap();

        let (response_tx, response_rx) = oneshot::channel();
        sender
            .send(PersistenceAction::Flush { response_tx })
            .await
            .unwrap();
        response_rx.await.unwrap().unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.mapping, mapping);
        assert_eq!(loaded.sensitivity, 3.0);

        drop(sender);
        worker.shutdown().await;
    }

    #[tokio::test]
    async fn sensitivity_save_keeps_hand_edited_literals() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("config.toml"));
        std::fs::write(
            store.path(),
            "[mapping]\nback = \"bksp\"\nturbo = \"0x1\"\n",
        )
        .unwrap();
        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.mapping.binding(Slot::Back), None);

        let worker = PersistenceWorker::spawn(store.clone(), loaded.mapping, loaded.sensitivity);
        worker
            .sender()
            .send(PersistenceAction::SetSensitivity(2.0))
            .await
            .unwrap();
        worker.shutdown().await;

        let stored: StoredConfig =
            toml::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(stored.mapping["back"], "bksp");
        assert_eq!(stored.mapping["turbo"], "0x1");
        assert_eq!(stored.sensitivity_multiplier, Some(2.0));
    }

    #[tokio::test]
    async fn load_defaults_resets_worker_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("config.toml"));
        let worker = PersistenceWorker::spawn(store.clone(), MappingTable::unbound(), 4.0);
        let sender = worker.sender();

        let (response_tx, response_rx) = oneshot::channel();
        sender
            .send(PersistenceAction::LoadDefaults { response_tx })
            .await
            .unwrap();
        let (mapping, sensitivity) = response_rx.await.unwrap().unwrap();
        assert_eq!(mapping, MappingTable::default());
        assert_eq!(sensitivity, 1.0);

        sender.send(PersistenceAction::SetSensitivity(0.5)).await.unwrap();
        drop(sender);
        worker.shutdown().await;

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.mapping, MappingTable::default());
        assert_eq!(loaded.sensitivity, 0.5);
    }
}
