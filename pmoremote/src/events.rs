//! Évènements émis par les proxys de playlist après une mutation réussie

use crate::authority::CollectionHandle;
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

/// Drapeau booléen modifié
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistFlag {
    Collaborative,
    InRam,
    AutolinkTracks,
    OfflineMode,
}

/// Variantes d'évènements playlist
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaylistEventKind {
    TracksAdded { position: usize, count: usize },
    TracksRemoved { positions: Vec<usize> },
    TracksMoved { positions: Vec<usize>, destination: usize },
    Renamed { name: String },
    FlagChanged { flag: PlaylistFlag, value: bool },
    TrackSeenChanged { position: usize, seen: bool },
    SubscribersUpdated,
}

/// Évènement horodaté
#[derive(Debug, Clone)]
pub struct PlaylistEvent {
    pub playlist: CollectionHandle,
    pub kind: PlaylistEventKind,
    pub timestamp: DateTime<Utc>,
}

/// Canal de diffusion partagé par tous les clones d'un proxy
#[derive(Debug, Clone)]
pub(crate) struct EventBus {
    tx: broadcast::Sender<PlaylistEvent>,
}

impl EventBus {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            tx: broadcast::channel(capacity.max(1)).0,
        }
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<PlaylistEvent> {
        self.tx.subscribe()
    }

    pub(crate) fn emit(&self, playlist: CollectionHandle, kind: PlaylistEventKind) {
        let event = PlaylistEvent {
            playlist,
            kind,
            timestamp: Utc::now(),
        };
        // Ignoré si aucun abonné
        let _ = self.tx.send(event);
    }
}
