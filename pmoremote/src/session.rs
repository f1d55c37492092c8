//! Session : contexte explicite reliant configuration et autorité

use crate::authority::{Authority, CollectionHandle};
use crate::config::RemoteConfig;
use crate::playlist::{Playlist, PlaylistInner};
use crate::Result;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};

/// Contexte partagé par les proxys d'une même autorité
///
/// Construit et passé explicitement : il n'existe pas d'instance globale.
/// Tous les proxys obtenus pour un même handle, depuis la session ou ses
/// clones, partagent verrou de mutation et canal d'évènements.
#[derive(Debug, Clone)]
pub struct Session {
    config: Arc<RemoteConfig>,
    authority: Arc<dyn Authority>,
    proxies: Arc<Mutex<HashMap<CollectionHandle, Weak<PlaylistInner>>>>,
}

impl Session {
    pub fn new(config: RemoteConfig, authority: Arc<dyn Authority>) -> Self {
        Self {
            config: Arc::new(config),
            authority,
            proxies: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Session avec la configuration chargée depuis l'emplacement par défaut
    pub fn from_env(authority: Arc<dyn Authority>) -> Result<Self> {
        let config = RemoteConfig::load(None)?;
        Ok(Self::new(config, authority))
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    pub fn authority(&self) -> &Arc<dyn Authority> {
        &self.authority
    }

    /// Proxy sur une playlist existante de l'autorité
    ///
    /// Réutilise l'état d'un proxy encore vivant pour ce handle.
    pub fn playlist(&self, handle: CollectionHandle) -> Playlist {
        let mut proxies = self.proxies.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(playlist) = proxies.get(&handle).and_then(Playlist::upgrade) {
            return playlist;
        }

        proxies.retain(|_, inner| inner.strong_count() > 0);
        let playlist = Playlist::new(self.authority.clone(), handle, &self.config);
        proxies.insert(handle, playlist.downgrade());
        playlist
    }
}
