//! Diagram loading with cancel-on-reselect
//!
//! Fetching a diagram and applying its default styles can race a new
//! selection. Each load carries a [`CancellationToken`]; starting another
//! load, or selecting another artifact, cancels the previous token and the
//! stale load resolves to `NovaError::Cancelled` without touching styles.

use crate::error::NovaError;
use crate::services::DiagramService;
use nova_artifact::DiagramModel;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;

/// Cooperative, clonable cancellation flag
#[derive(Debug, Clone)]
pub struct CancellationToken {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once the token is cancelled
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // sender lives in self, so wait_for only fails if it is dropped
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

/// Loads diagrams for the active editor, one at a time
pub struct DiagramLoader {
    diagrams: Arc<dyn DiagramService>,
    current: Mutex<Option<CancellationToken>>,
}

impl DiagramLoader {
    #[must_use]
    pub fn new(diagrams: Arc<dyn DiagramService>) -> Self {
        Self {
            diagrams,
            current: Mutex::new(None),
        }
    }

    /// Cancel the load in flight, if any
    pub fn cancel_pending(&self) {
        if let Some(token) = self.current.lock().take() {
            tracing::debug!("cancelling pending diagram load");
            token.cancel();
        }
    }

    /// Fetch a diagram and apply default styles, cancelling any earlier load
    ///
    /// # Errors
    /// - `NovaError::Cancelled` when superseded before styles were applied
    /// - the fetch error otherwise
    pub async fn load(&self, id: i32, version: Option<i32>) -> Result<DiagramModel, NovaError> {
        let token = CancellationToken::new();
        let previous = self.current.lock().replace(token.clone());
        if let Some(previous) = previous {
            previous.cancel();
        }

        let fetched = tokio::select! {
            biased;
            () = token.cancelled() => Err(NovaError::Cancelled),
            result = self.diagrams.get_diagram(id, version) => result,
        };
        let mut diagram = fetched?;

        if token.is_cancelled() {
            return Err(NovaError::Cancelled);
        }
        let styled = diagram.apply_default_styles();
        tracing::debug!(id, styled, "diagram styles applied");

        let mut current = self.current.lock();
        if current.as_ref().is_some_and(|c| Arc::ptr_eq(&c.tx, &token.tx)) {
            *current = None;
        }
        Ok(diagram)
    }
}

impl std::fmt::Debug for DiagramLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagramLoader")
            .field("pending", &self.current.lock().is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MockDiagramService;
    use nova_artifact::DiagramShape;

    fn diagram(id: i32) -> DiagramModel {
        DiagramModel {
            id,
            diagram_type: "GenericDiagram".into(),
            shapes: vec![DiagramShape {
                id: 1,
                name: "Box".into(),
                x: 0.0,
                y: 0.0,
                width: 10.0,
                height: 10.0,
                style: None,
            }],
            connections: Vec::new(),
        }
    }

    #[tokio::test]
    async fn token_resolves_on_cancel() {
        let token = CancellationToken::new();
        let waiter = tokio::spawn({
            let token = token.clone();
            async move { token.cancelled().await }
        });
        assert!(!token.is_cancelled());
        token.cancel();
        waiter.await.unwrap();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn load_applies_styles() {
        let mut service = MockDiagramService::new();
        service
            .expect_get_diagram()
            .returning(|id, _| Ok(diagram(id)));
        let loader = DiagramLoader::new(Arc::new(service));

        let loaded = loader.load(7, None).await.unwrap();
        assert!(loaded.shapes[0].style.is_some());
    }

    /// Blocks every fetch until released
    #[derive(Default)]
    struct Gated {
        started: tokio::sync::Notify,
        release: tokio::sync::Notify,
    }

    #[async_trait::async_trait]
    impl DiagramService for Gated {
        async fn get_diagram(&self, id: i32, _: Option<i32>) -> Result<DiagramModel, NovaError> {
            self.started.notify_one();
            self.release.notified().await;
            Ok(diagram(id))
        }
    }

    #[tokio::test]
    async fn reselect_cancels_inflight_load() {
        let gated = Arc::new(Gated::default());
        let loader = Arc::new(DiagramLoader::new(gated.clone()));

        let pending = {
            let loader = Arc::clone(&loader);
            tokio::spawn(async move { loader.load(7, None).await })
        };
        gated.started.notified().await;
        loader.cancel_pending();

        let result = pending.await.unwrap();
        assert!(matches!(result, Err(NovaError::Cancelled)));
    }

    #[tokio::test]
    async fn newer_load_supersedes_older() {
        let gated = Arc::new(Gated::default());
        let loader = Arc::new(DiagramLoader::new(gated.clone()));

        let first = {
            let loader = Arc::clone(&loader);
            tokio::spawn(async move { loader.load(7, None).await })
        };
        gated.started.notified().await;

        let second = {
            let loader = Arc::clone(&loader);
            tokio::spawn(async move { loader.load(8, None).await })
        };
        assert!(matches!(first.await.unwrap(), Err(NovaError::Cancelled)));

        gated.started.notified().await;
        gated.release.notify_one();
        assert_eq!(second.await.unwrap().unwrap().id, 8);
    }
}
