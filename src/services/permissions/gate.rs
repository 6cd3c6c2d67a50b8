use async_trait::async_trait;
use log::{info, warn};
use std::sync::{Arc, Mutex};

use super::store::{PermissionFlags, PermissionStore};
use super::{Permission, PermissionStatus};
use crate::error::RecorderError;

/// Must pass before a capture stream may be opened
#[async_trait]
pub trait PermissionGate: Send + Sync {
    async fn ensure_granted(&self) -> Result<(), RecorderError>;
}

/// Platform permission queries
#[async_trait]
pub trait PermissionProbe: Send + Sync {
    fn microphone(&self) -> PermissionStatus;

    /// Ask the OS for microphone access; `true` when granted.
    async fn request_microphone(&self) -> bool;

    /// Whether the platform gates system audio behind screen recording access
    fn requires_screen_permission(&self) -> bool;

    fn screen(&self) -> PermissionStatus;

    fn request_screen(&self) -> bool;
}

/// Probes the OS only until both grants have been observed once, then trusts
/// the persisted flags.
pub struct CachedPermissionGate {
    probe: Arc<dyn PermissionProbe>,
    store: Mutex<PermissionStore>,
}

impl CachedPermissionGate {
    pub fn new(probe: Arc<dyn PermissionProbe>, store: PermissionStore) -> Self {
        Self {
            probe,
            store: Mutex::new(store),
        }
    }

    fn cached(&self) -> PermissionFlags {
        self.store
            .lock()
            .map(|store| store.flags())
            .unwrap_or_default()
    }

    fn remember(&self, update: impl FnOnce(&mut PermissionFlags)) {
        let Ok(mut store) = self.store.lock() else {
            return;
        };
        if let Err(e) = store.update(update) {
            warn!("Failed to persist permission grant: {}", e);
        }
    }
}

#[async_trait]
impl PermissionGate for CachedPermissionGate {
    async fn ensure_granted(&self) -> Result<(), RecorderError> {
        let needs_screen = self.probe.requires_screen_permission();
        let cached = self.cached();
        if cached.microphone_granted && (!needs_screen || cached.screen_granted) {
            return Ok(());
        }

        if !cached.microphone_granted {
            let granted = self.probe.microphone() == PermissionStatus::Authorized
                || self.probe.request_microphone().await;
            if !granted {
                info!("Microphone access not granted");
                return Err(RecorderError::PermissionDenied(Permission::Microphone));
            }
            self.remember(|f| f.microphone_granted = true);
        }

        if needs_screen && !cached.screen_granted {
            let granted = self.probe.screen() == PermissionStatus::Authorized
                || self.probe.request_screen();
            if !granted {
                info!("Screen recording access not granted");
                return Err(RecorderError::PermissionDenied(Permission::ScreenRecording));
            }
            self.remember(|f| f.screen_granted = true);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeProbe {
        microphone: PermissionStatus,
        grant_microphone_on_request: bool,
        screen: Option<PermissionStatus>,
        queries: AtomicUsize,
    }

    impl FakeProbe {
        fn new(microphone: PermissionStatus, screen: Option<PermissionStatus>) -> Self {
            Self {
                microphone,
                grant_microphone_on_request: false,
                screen,
                queries: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PermissionProbe for FakeProbe {
        fn microphone(&self) -> PermissionStatus {
            self.queries.fetch_add(1, Ordering::SeqCst);
            self.microphone.clone()
        }

        async fn request_microphone(&self) -> bool {
            self.grant_microphone_on_request
        }

        fn requires_screen_permission(&self) -> bool {
            self.screen.is_some()
        }

        fn screen(&self) -> PermissionStatus {
            self.queries.fetch_add(1, Ordering::SeqCst);
            self.screen.clone().unwrap_or(PermissionStatus::Authorized)
        }

        fn request_screen(&self) -> bool {
            false
        }
    }

    fn store_in(dir: &tempfile::TempDir) -> PermissionStore {
        PermissionStore::open(dir.path().join("permissions.json"))
    }

    #[tokio::test]
    async fn granted_permissions_are_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let probe = Arc::new(FakeProbe::new(
            PermissionStatus::Authorized,
            Some(PermissionStatus::Authorized),
        ));
        let gate = CachedPermissionGate::new(probe, store_in(&dir));

        gate.ensure_granted().await.unwrap();

        let flags = store_in(&dir).flags();
        assert!(flags.microphone_granted);
        assert!(flags.screen_granted);
    }

    #[tokio::test]
    async fn cached_grants_skip_the_probe() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        store
            .update(|f| {
                f.microphone_granted = true;
                f.screen_granted = true;
            })
            .unwrap();

        let probe = Arc::new(FakeProbe::new(
            PermissionStatus::Denied,
            Some(PermissionStatus::Denied),
        ));
        let gate = CachedPermissionGate::new(probe.clone(), store);

        gate.ensure_granted().await.unwrap();
        assert_eq!(probe.queries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn denied_microphone_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let probe = Arc::new(FakeProbe::new(PermissionStatus::Denied, None));
        let gate = CachedPermissionGate::new(probe, store_in(&dir));

        let err = gate.ensure_granted().await.unwrap_err();
        assert!(matches!(err, RecorderError::PermissionDenied(Permission::Microphone)));
        assert!(!store_in(&dir).flags().microphone_granted);
    }

    #[tokio::test]
    async fn microphone_request_can_grant() {
        let dir = tempfile::tempdir().unwrap();
        let mut probe = FakeProbe::new(PermissionStatus::NotDetermined, None);
        probe.grant_microphone_on_request = true;
        let gate = CachedPermissionGate::new(Arc::new(probe), store_in(&dir));

        gate.ensure_granted().await.unwrap();
        assert!(store_in(&dir).flags().microphone_granted);
    }

    #[tokio::test]
    async fn denied_screen_blocks_but_keeps_microphone_grant() {
        let dir = tempfile::tempdir().unwrap();
        let probe = Arc::new(FakeProbe::new(
            PermissionStatus::Authorized,
            Some(PermissionStatus::Denied),
        ));
        let gate = CachedPermissionGate::new(probe, store_in(&dir));

        let err = gate.ensure_granted().await.unwrap_err();
        assert!(matches!(err, RecorderError::PermissionDenied(Permission::ScreenRecording)));

        let flags = store_in(&dir).flags();
        assert!(flags.microphone_granted);
        assert!(!flags.screen_granted);
    }

    #[tokio::test]
    async fn screen_is_not_required_everywhere() {
        let dir = tempfile::tempdir().unwrap();
        let probe = Arc::new(FakeProbe::new(PermissionStatus::Authorized, None));
        let gate = CachedPermissionGate::new(probe, store_in(&dir));

        gate.ensure_granted().await.unwrap();
        assert!(!store_in(&dir).flags().screen_granted);
    }
}
