//! Playlist : proxy validé et observable sur une playlist détenue par l'autorité
//!
//! Le proxy ne met rien en cache. Les lectures interrogent l'instantané courant
//! de l'autorité ; les mutations sont validées localement (noms, positions,
//! types de liens) puis transmises en une seule requête. Une validation qui
//! échoue n'atteint jamais l'autorité.

mod entry;
mod offline;
mod staleness;

pub use entry::{TrackEntry, Tracks};
pub use offline::OfflineStatus;

use crate::authority::{Authority, CollectionHandle, PlaylistState};
use crate::config::RemoteConfig;
use crate::events::{EventBus, PlaylistEvent, PlaylistEventKind, PlaylistFlag};
use crate::link::{ImageRef, Link, UserRef};
use crate::name::check_name;
use crate::wait::poll_until;
use crate::{position, Error, Result};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{broadcast, Mutex, MutexGuard};
use tracing::{debug, warn};

pub(crate) struct PlaylistInner {
    handle: CollectionHandle,
    authority: Arc<dyn Authority>,
    poll_interval: Duration,
    default_timeout: Duration,
    events: EventBus,
    mutations: Mutex<()>,
}

/// Proxy sur une playlist de l'autorité
///
/// Les clones partagent le même canal d'évènements et sérialisent leurs
/// mutations.
#[derive(Clone)]
pub struct Playlist {
    inner: Arc<PlaylistInner>,
}

impl std::fmt::Debug for Playlist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Playlist")
            .field("handle", &self.inner.handle)
            .field("authority", &self.inner.authority)
            .finish()
    }
}

impl PartialEq for Playlist {
    fn eq(&self, other: &Self) -> bool {
        self.inner.handle == other.inner.handle
    }
}

impl Eq for Playlist {}

impl Playlist {
    /// Enveloppe un handle existant de l'autorité
    ///
    /// Le proxy obtenu ne partage ni verrou ni évènements avec d'autres
    /// proxys du même handle ; [`crate::Session::playlist`] les partage.
    pub fn new(
        authority: Arc<dyn Authority>,
        handle: CollectionHandle,
        config: &RemoteConfig,
    ) -> Self {
        Self {
            inner: Arc::new(PlaylistInner {
                handle,
                authority,
                poll_interval: config.upload.poll_interval(),
                default_timeout: config.upload.default_timeout(),
                events: EventBus::new(config.events.capacity),
                mutations: Mutex::new(()),
            }),
        }
    }

    /// Proxy sur un état partagé encore vivant
    pub(crate) fn upgrade(inner: &Weak<PlaylistInner>) -> Option<Self> {
        inner.upgrade().map(|inner| Self { inner })
    }

    pub(crate) fn downgrade(&self) -> Weak<PlaylistInner> {
        Arc::downgrade(&self.inner)
    }

    pub fn handle(&self) -> CollectionHandle {
        self.inner.handle
    }

    pub(crate) fn handle_ref(&self) -> &CollectionHandle {
        &self.inner.handle
    }

    pub(crate) fn authority(&self) -> &dyn Authority {
        self.inner.authority.as_ref()
    }

    pub(crate) async fn lock_mutations(&self) -> MutexGuard<'_, ()> {
        self.inner.mutations.lock().await
    }

    pub(crate) fn emit(&self, kind: PlaylistEventKind) {
        self.inner.events.emit(self.inner.handle, kind);
    }

    /// Souscrit aux évènements émis après chaque mutation réussie
    pub fn subscribe(&self) -> broadcast::Receiver<PlaylistEvent> {
        self.inner.events.subscribe()
    }

    // ========================================================================
    // Lectures
    // ========================================================================

    pub async fn is_loaded(&self) -> bool {
        self.authority().is_loaded(self.handle_ref()).await
    }

    /// Instantané si la playlist est chargée
    async fn loaded_state(&self) -> Option<PlaylistState> {
        if !self.is_loaded().await {
            return None;
        }
        Some(self.authority().state(self.handle_ref()).await)
    }

    async fn read<T: Default>(&self, field: impl FnOnce(PlaylistState) -> T) -> T {
        self.loaded_state().await.map(field).unwrap_or_default()
    }

    /// Nom de la playlist (vide si non chargée)
    pub async fn name(&self) -> String {
        self.read(|state| state.name).await
    }

    pub async fn owner(&self) -> Option<UserRef> {
        self.read(|state| state.owner).await
    }

    pub async fn description(&self) -> String {
        self.read(|state| state.description).await
    }

    pub async fn image(&self) -> Option<ImageRef> {
        self.read(|state| state.image).await
    }

    pub async fn total_subscribers(&self) -> u32 {
        self.read(|state| state.total_subscribers).await
    }

    /// Pourcentage de synchronisation hors-ligne
    pub async fn sync_progress(&self) -> u8 {
        self.read(|state| state.sync_progress).await
    }

    /// Nombre de morceaux (0 si non chargée)
    pub async fn size(&self) -> usize {
        self.read(|state| state.size).await
    }

    pub async fn is_collaborative(&self) -> bool {
        self.read(|state| state.collaborative).await
    }

    pub async fn is_in_ram(&self) -> bool {
        self.read(|state| state.in_ram).await
    }

    pub async fn is_autolink_tracks(&self) -> bool {
        self.read(|state| state.autolink_tracks).await
    }

    /// Vrai tant que des modifications locales n'ont pas été acceptées
    ///
    /// Lu directement, que la playlist soit chargée ou non.
    pub async fn is_pending(&self) -> bool {
        self.authority().state(self.handle_ref()).await.pending
    }

    /// Lien de la playlist elle-même
    pub async fn to_link(&self) -> Option<Link> {
        self.authority().link(self.handle_ref()).await
    }

    /// Entrées pour chaque emplacement courant (vide si non chargée)
    pub async fn tracks(&self) -> Tracks {
        let size = self.size().await;
        let mut entries = Vec::with_capacity(size);

        for position in 0..size {
            match self.authority().slot(self.handle_ref(), position).await {
                Some(slot) => entries.push(TrackEntry::new(self.clone(), position, slot.content)),
                None => break,
            }
        }

        Tracks::new(entries)
    }

    /// Entrée à une position (les positions négatives comptent depuis la fin)
    pub async fn track(&self, position: i64) -> Result<TrackEntry> {
        let size = self.size().await;
        let offset = position::resolve(position, size, false)?;
        let slot = self
            .authority()
            .slot(self.handle_ref(), offset)
            .await
            .ok_or(Error::OutOfRange {
                position,
                len: size,
            })?;
        Ok(TrackEntry::new(self.clone(), offset, slot.content))
    }

    /// Noms des abonnés (vide si indisponible)
    pub async fn subscribers(&self) -> Vec<String> {
        match self.authority().subscribers(self.handle_ref()).await {
            Ok(names) => names,
            Err(e) => {
                debug!(playlist = %self.handle(), "no subscriber data: {}", e);
                Vec::new()
            }
        }
    }

    // ========================================================================
    // Statut hors-ligne
    // ========================================================================

    /// Statut hors-ligne courant (`None` pour un code inconnu)
    pub async fn offline_status(&self) -> Option<OfflineStatus> {
        let code = self.authority().state(self.handle_ref()).await.offline_status;
        let status = OfflineStatus::from_code(code);
        if status.is_none() {
            warn!(playlist = %self.handle(), code, "unknown offline status code");
        }
        status
    }

    pub async fn is_offline_mode(&self) -> bool {
        self.offline_status().await == Some(OfflineStatus::OfflineMode)
    }

    pub async fn is_available_offline(&self) -> bool {
        self.offline_status().await == Some(OfflineStatus::AvailableOffline)
    }

    pub async fn is_syncing(&self) -> bool {
        self.offline_status().await == Some(OfflineStatus::Syncing)
    }

    pub async fn is_waiting(&self) -> bool {
        self.offline_status().await == Some(OfflineStatus::Waiting)
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Insère des morceaux à `position` (`None` : à la fin)
    ///
    /// Avec une position négative, `-1` désigne la fin de la playlist. Tous
    /// les liens doivent désigner des morceaux ; le lot est transmis en une
    /// seule requête, sans insertion partielle.
    pub async fn insert<I>(&self, position: Option<i64>, tracks: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<Link>,
    {
        let _guard = self.lock_mutations().await;

        let size = self.size().await;
        let offset = match position {
            Some(position) => position::resolve(position, size, true)?,
            None => size,
        };

        let tracks: Vec<Link> = tracks.into_iter().map(Into::into).collect();
        if tracks.is_empty() {
            return Err(Error::validation("no tracks to insert"));
        }
        if let Some(link) = tracks.iter().find(|link| !link.is_track()) {
            return Err(Error::InvalidTrack(link.clone()));
        }

        self.authority()
            .insert_tracks(self.handle_ref(), offset, &tracks)
            .await?;
        debug!(playlist = %self.handle(), offset, count = tracks.len(), "tracks inserted");
        self.emit(PlaylistEventKind::TracksAdded {
            position: offset,
            count: tracks.len(),
        });
        Ok(())
    }

    /// Retire simultanément les morceaux aux positions données
    ///
    /// Toutes les positions sont résolues sur l'indexation d'origine avant
    /// tout retrait ; une seule position invalide fait échouer l'appel.
    pub async fn remove(&self, positions: &[i64]) -> Result<()> {
        if positions.is_empty() {
            return Err(Error::validation("no positions to remove"));
        }

        let _guard = self.lock_mutations().await;

        let size = self.size().await;
        let offsets = position::resolve_all(positions, size, false)?;

        self.authority()
            .remove_tracks(self.handle_ref(), &offsets)
            .await?;
        debug!(playlist = %self.handle(), ?offsets, "tracks removed");
        self.emit(PlaylistEventKind::TracksRemoved { positions: offsets });
        Ok(())
    }

    /// Déplace en bloc les morceaux aux positions données vers `destination`
    ///
    /// Les morceaux déplacés gardent leur ordre relatif, de même que les
    /// morceaux restants.
    pub async fn move_tracks(&self, destination: i64, positions: &[i64]) -> Result<()> {
        if positions.is_empty() {
            return Err(Error::validation("no positions to move"));
        }

        let _guard = self.lock_mutations().await;

        let size = self.size().await;
        let destination = position::resolve(destination, size, true)?;
        let offsets = position::resolve_all(positions, size, false)?;

        self.authority()
            .reorder_tracks(self.handle_ref(), &offsets, destination)
            .await?;
        debug!(playlist = %self.handle(), ?offsets, destination, "tracks moved");
        self.emit(PlaylistEventKind::TracksMoved {
            positions: offsets,
            destination,
        });
        Ok(())
    }

    /// Renomme la playlist (nom validé localement)
    pub async fn set_name(&self, name: &str) -> Result<()> {
        check_name(name)?;

        self.authority().set_name(self.handle_ref(), name).await?;
        debug!(playlist = %self.handle(), name, "playlist renamed");
        self.emit(PlaylistEventKind::Renamed {
            name: name.to_string(),
        });
        Ok(())
    }

    pub async fn set_collaborative(&self, value: bool) -> Result<()> {
        self.set_flag(PlaylistFlag::Collaborative, value).await
    }

    pub async fn set_in_ram(&self, value: bool) -> Result<()> {
        self.set_flag(PlaylistFlag::InRam, value).await
    }

    pub async fn set_autolink_tracks(&self, value: bool) -> Result<()> {
        self.set_flag(PlaylistFlag::AutolinkTracks, value).await
    }

    pub async fn set_offline_mode(&self, value: bool) -> Result<()> {
        self.set_flag(PlaylistFlag::OfflineMode, value).await
    }

    async fn set_flag(&self, flag: PlaylistFlag, value: bool) -> Result<()> {
        let authority = self.authority();
        let handle = self.handle_ref();
        match flag {
            PlaylistFlag::Collaborative => authority.set_collaborative(handle, value).await?,
            PlaylistFlag::InRam => authority.set_in_ram(handle, value).await?,
            PlaylistFlag::AutolinkTracks => authority.set_autolink_tracks(handle, value).await?,
            PlaylistFlag::OfflineMode => authority.set_offline_mode(handle, value).await?,
        }
        debug!(playlist = %self.handle(), ?flag, value, "playlist flag updated");
        self.emit(PlaylistEventKind::FlagChanged { flag, value });
        Ok(())
    }

    /// Demande à l'autorité de rafraîchir les abonnés
    ///
    /// Retourne toujours ce même proxy ; un échec est journalisé puis ignoré.
    pub async fn update_subscribers(&self) -> &Self {
        match self.authority().update_subscribers(self.handle_ref()).await {
            Ok(()) => self.emit(PlaylistEventKind::SubscribersUpdated),
            Err(e) => warn!(playlist = %self.handle(), "subscriber refresh failed: {}", e),
        }
        self
    }

    // ========================================================================
    // Attentes
    // ========================================================================

    /// Attend que l'autorité ait accepté les modifications en attente
    ///
    /// `None` utilise le délai par défaut de la configuration.
    pub async fn upload(&self, timeout: Option<Duration>) -> Result<()> {
        let timeout = timeout.unwrap_or(self.inner.default_timeout);
        let this = self;
        poll_until(timeout, self.inner.poll_interval, move || async move {
            !this.is_pending().await
        })
        .await
    }

    /// Attend que l'autorité ait fini d'hydrater la playlist
    ///
    /// N'accélère ni ne force le chargement.
    pub async fn wait_loaded(&self, timeout: Option<Duration>) -> Result<()> {
        let timeout = timeout.unwrap_or(self.inner.default_timeout);
        let this = self;
        poll_until(timeout, self.inner.poll_interval, move || async move {
            this.is_loaded().await
        })
        .await
    }
}
