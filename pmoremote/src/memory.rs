//! MemoryAuthority : autorité en mémoire
//!
//! Implémente [`Authority`] sans moteur externe, avec la sémantique de
//! [`crate::sequence`]. Sert aux tests, aux démonstrations et aux
//! intégrations qui n'ont pas de moteur natif sous la main.

use crate::authority::{
    Authority, AuthorityResult, CollectionHandle, ContentId, PlaylistState, Rejection, Slot,
};
use crate::link::{ImageRef, Link, UserRef};
use crate::sequence;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

/// Catégories d'appels que l'on peut faire échouer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Rename,
    SetFlag,
    SetSeen,
    Insert,
    Remove,
    Reorder,
    FetchSubscribers,
    UpdateSubscribers,
}

/// Morceau initial d'une playlist en mémoire
#[derive(Debug, Clone)]
pub struct MemoryTrack {
    track: Link,
    added_at: i64,
    adder: Option<UserRef>,
    message: String,
    seen: bool,
}

impl MemoryTrack {
    pub fn new(track: impl Into<Link>) -> Self {
        Self {
            track: track.into(),
            added_at: 0,
            adder: None,
            message: String::new(),
            seen: false,
        }
    }

    pub fn added_at(mut self, epoch_secs: i64) -> Self {
        self.added_at = epoch_secs;
        self
    }

    pub fn adder(mut self, user: UserRef) -> Self {
        self.adder = Some(user);
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn seen(mut self, seen: bool) -> Self {
        self.seen = seen;
        self
    }

    fn into_slot(self) -> Slot {
        Slot {
            content: ContentId::new(),
            track: self.track,
            added_at: self.added_at,
            adder: self.adder,
            message: self.message,
            seen: self.seen,
        }
    }
}

/// Description d'une playlist à enregistrer dans une [`MemoryAuthority`]
#[derive(Debug, Clone)]
pub struct MemoryPlaylist {
    loaded: bool,
    link: Option<Link>,
    state: PlaylistState,
    subscribers: Option<Vec<String>>,
    tracks: Vec<MemoryTrack>,
}

impl MemoryPlaylist {
    /// Playlist chargée, vide, sans propriétaire
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            loaded: true,
            link: None,
            state: PlaylistState {
                name: name.into(),
                ..PlaylistState::default()
            },
            subscribers: Some(Vec::new()),
            tracks: Vec::new(),
        }
    }

    /// Playlist pas encore hydratée par le moteur
    pub fn unloaded() -> Self {
        Self {
            loaded: false,
            ..Self::new("")
        }
    }

    pub fn loaded(mut self, loaded: bool) -> Self {
        self.loaded = loaded;
        self
    }

    pub fn link(mut self, link: impl Into<Link>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn owner(mut self, owner: UserRef) -> Self {
        self.state.owner = Some(owner);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.state.description = description.into();
        self
    }

    pub fn image(mut self, image: ImageRef) -> Self {
        self.state.image = Some(image);
        self
    }

    pub fn total_subscribers(mut self, total: u32) -> Self {
        self.state.total_subscribers = total;
        self
    }

    pub fn subscribers<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subscribers = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn sync_progress(mut self, percent: u8) -> Self {
        self.state.sync_progress = percent.min(100);
        self
    }

    pub fn collaborative(mut self, value: bool) -> Self {
        self.state.collaborative = value;
        self
    }

    pub fn in_ram(mut self, value: bool) -> Self {
        self.state.in_ram = value;
        self
    }

    pub fn autolink_tracks(mut self, value: bool) -> Self {
        self.state.autolink_tracks = value;
        self
    }

    pub fn pending(mut self, value: bool) -> Self {
        self.state.pending = value;
        self
    }

    pub fn offline_status(mut self, code: i32) -> Self {
        self.state.offline_status = code;
        self
    }

    pub fn track(mut self, track: MemoryTrack) -> Self {
        self.tracks.push(track);
        self
    }

    pub fn tracks<I>(mut self, tracks: I) -> Self
    where
        I: IntoIterator<Item = MemoryTrack>,
    {
        self.tracks.extend(tracks);
        self
    }
}

#[derive(Debug)]
struct MemoryCollection {
    loaded: bool,
    link: Option<Link>,
    state: PlaylistState,
    subscribers: Option<Vec<String>>,
    slots: Vec<Slot>,
}

impl MemoryCollection {
    fn snapshot(&self) -> PlaylistState {
        PlaylistState {
            size: self.slots.len(),
            ..self.state.clone()
        }
    }

    fn check_offsets(&self, offsets: &[usize]) -> AuthorityResult<()> {
        match offsets.iter().find(|&&offset| offset >= self.slots.len()) {
            Some(offset) => Err(Rejection::new(format!("no track at offset {offset}"))),
            None => Ok(()),
        }
    }
}

/// Autorité en mémoire
#[derive(Debug, Default)]
pub struct MemoryAuthority {
    collections: RwLock<HashMap<CollectionHandle, MemoryCollection>>,
    rejected: RwLock<HashSet<Operation>>,
}

impl MemoryAuthority {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enregistre une playlist et retourne son handle
    pub async fn add_playlist(&self, playlist: MemoryPlaylist) -> CollectionHandle {
        let handle = CollectionHandle::new();
        let collection = MemoryCollection {
            loaded: playlist.loaded,
            link: playlist.link,
            state: playlist.state,
            subscribers: playlist.subscribers,
            slots: playlist
                .tracks
                .into_iter()
                .map(MemoryTrack::into_slot)
                .collect(),
        };
        self.collections.write().await.insert(handle, collection);
        handle
    }

    /// Fait échouer toutes les opérations de ce type
    pub async fn reject(&self, operation: Operation) {
        self.rejected.write().await.insert(operation);
    }

    /// Accepte de nouveau les opérations de ce type
    pub async fn accept(&self, operation: Operation) {
        self.rejected.write().await.remove(&operation);
    }

    pub async fn set_loaded(&self, playlist: &CollectionHandle, loaded: bool) {
        if let Some(collection) = self.collections.write().await.get_mut(playlist) {
            collection.loaded = loaded;
        }
    }

    pub async fn set_pending(&self, playlist: &CollectionHandle, pending: bool) {
        if let Some(collection) = self.collections.write().await.get_mut(playlist) {
            collection.state.pending = pending;
        }
    }

    pub async fn set_offline_status_code(&self, playlist: &CollectionHandle, code: i32) {
        if let Some(collection) = self.collections.write().await.get_mut(playlist) {
            collection.state.offline_status = code;
        }
    }

    /// `None` simule un moteur qui n'a aucune donnée d'abonnés
    pub async fn set_subscribers(&self, playlist: &CollectionHandle, names: Option<Vec<String>>) {
        if let Some(collection) = self.collections.write().await.get_mut(playlist) {
            collection.subscribers = names;
        }
    }

    /// Liens des morceaux dans l'ordre courant
    pub async fn track_links(&self, playlist: &CollectionHandle) -> Vec<Link> {
        self.collections
            .read()
            .await
            .get(playlist)
            .map(|collection| collection.slots.iter().map(|s| s.track.clone()).collect())
            .unwrap_or_default()
    }

    async fn check(&self, operation: Operation) -> AuthorityResult<()> {
        if self.rejected.read().await.contains(&operation) {
            return Err(Rejection::new(format!("{operation:?} rejected")));
        }
        Ok(())
    }

    /// Applique une mutation sur une collection chargée
    async fn mutate<T>(
        &self,
        playlist: &CollectionHandle,
        operation: Operation,
        apply: impl FnOnce(&mut MemoryCollection) -> AuthorityResult<T>,
    ) -> AuthorityResult<T> {
        self.check(operation).await?;
        let mut collections = self.collections.write().await;
        let collection = collections
            .get_mut(playlist)
            .ok_or_else(|| Rejection::new(format!("unknown playlist {playlist}")))?;
        if !collection.loaded {
            return Err(Rejection::new(format!("playlist {playlist} is not loaded")));
        }
        apply(collection)
    }
}

#[async_trait]
impl Authority for MemoryAuthority {
    async fn is_loaded(&self, playlist: &CollectionHandle) -> bool {
        self.collections
            .read()
            .await
            .get(playlist)
            .map(|collection| collection.loaded)
            .unwrap_or(false)
    }

    async fn state(&self, playlist: &CollectionHandle) -> PlaylistState {
        self.collections
            .read()
            .await
            .get(playlist)
            .map(MemoryCollection::snapshot)
            .unwrap_or_default()
    }

    async fn link(&self, playlist: &CollectionHandle) -> Option<Link> {
        self.collections
            .read()
            .await
            .get(playlist)
            .and_then(|collection| collection.link.clone())
    }

    async fn subscribers(&self, playlist: &CollectionHandle) -> AuthorityResult<Vec<String>> {
        self.check(Operation::FetchSubscribers).await?;
        let collections = self.collections.read().await;
        match collections.get(playlist) {
            Some(collection) if collection.loaded => collection
                .subscribers
                .clone()
                .ok_or_else(|| Rejection::new("no subscriber data")),
            _ => Err(Rejection::new(format!("playlist {playlist} is not loaded"))),
        }
    }

    async fn slot(&self, playlist: &CollectionHandle, index: usize) -> Option<Slot> {
        self.collections
            .read()
            .await
            .get(playlist)
            .and_then(|collection| collection.slots.get(index).cloned())
    }

    async fn set_name(&self, playlist: &CollectionHandle, name: &str) -> AuthorityResult<()> {
        self.mutate(playlist, Operation::Rename, |collection| {
            collection.state.name = name.to_string();
            Ok(())
        })
        .await
    }

    async fn set_collaborative(
        &self,
        playlist: &CollectionHandle,
        value: bool,
    ) -> AuthorityResult<()> {
        self.mutate(playlist, Operation::SetFlag, |collection| {
            collection.state.collaborative = value;
            Ok(())
        })
        .await
    }

    async fn set_in_ram(&self, playlist: &CollectionHandle, value: bool) -> AuthorityResult<()> {
        self.mutate(playlist, Operation::SetFlag, |collection| {
            collection.state.in_ram = value;
            Ok(())
        })
        .await
    }

    async fn set_autolink_tracks(
        &self,
        playlist: &CollectionHandle,
        value: bool,
    ) -> AuthorityResult<()> {
        self.mutate(playlist, Operation::SetFlag, |collection| {
            collection.state.autolink_tracks = value;
            Ok(())
        })
        .await
    }

    async fn set_offline_mode(
        &self,
        playlist: &CollectionHandle,
        value: bool,
    ) -> AuthorityResult<()> {
        self.mutate(playlist, Operation::SetFlag, |collection| {
            collection.state.offline_status = i32::from(value);
            Ok(())
        })
        .await
    }

    async fn set_seen(
        &self,
        playlist: &CollectionHandle,
        index: usize,
        content: ContentId,
        value: bool,
    ) -> AuthorityResult<bool> {
        self.mutate(playlist, Operation::SetSeen, |collection| {
            match collection.slots.get_mut(index) {
                Some(slot) if slot.content == content => {
                    slot.seen = value;
                    Ok(true)
                }
                _ => Ok(false),
            }
        })
        .await
    }

    async fn insert_tracks(
        &self,
        playlist: &CollectionHandle,
        offset: usize,
        tracks: &[Link],
    ) -> AuthorityResult<()> {
        self.mutate(playlist, Operation::Insert, |collection| {
            if offset > collection.slots.len() {
                return Err(Rejection::new(format!("cannot insert at offset {offset}")));
            }
            let added_at = chrono::Utc::now().timestamp();
            let batch = tracks.iter().map(|track| Slot {
                content: ContentId::new(),
                track: track.clone(),
                added_at,
                adder: None,
                message: String::new(),
                seen: false,
            });
            sequence::insert_at(&mut collection.slots, offset, batch);
            Ok(())
        })
        .await
    }

    async fn remove_tracks(
        &self,
        playlist: &CollectionHandle,
        offsets: &[usize],
    ) -> AuthorityResult<()> {
        self.mutate(playlist, Operation::Remove, |collection| {
            collection.check_offsets(offsets)?;
            sequence::remove_at(&mut collection.slots, offsets);
            Ok(())
        })
        .await
    }

    async fn reorder_tracks(
        &self,
        playlist: &CollectionHandle,
        offsets: &[usize],
        destination: usize,
    ) -> AuthorityResult<()> {
        self.mutate(playlist, Operation::Reorder, |collection| {
            collection.check_offsets(offsets)?;
            if destination > collection.slots.len() {
                return Err(Rejection::new(format!(
                    "cannot move to offset {destination}"
                )));
            }
            sequence::move_to(&mut collection.slots, offsets, destination);
            Ok(())
        })
        .await
    }

    async fn update_subscribers(&self, playlist: &CollectionHandle) -> AuthorityResult<()> {
        self.check(Operation::UpdateSubscribers).await?;
        if self.collections.read().await.contains_key(playlist) {
            Ok(())
        } else {
            Err(Rejection::new(format!("unknown playlist {playlist}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_state_reports_slot_count() {
        let authority = MemoryAuthority::new();
        let handle = authority
            .add_playlist(
                MemoryPlaylist::new("Mix")
                    .track(MemoryTrack::new("spotify:track:a"))
                    .track(MemoryTrack::new("spotify:track:b")),
            )
            .await;

        let state = authority.state(&handle).await;
        assert_eq!(state.name, "Mix");
        assert_eq!(state.size, 2);
    }

    #[tokio::test]
    async fn test_unknown_handle_is_empty() {
        let authority = MemoryAuthority::new();
        let handle = CollectionHandle::new();

        assert!(!authority.is_loaded(&handle).await);
        assert_eq!(authority.state(&handle).await, PlaylistState::default());
        assert!(authority.slot(&handle, 0).await.is_none());
        assert!(authority.set_name(&handle, "x").await.is_err());
    }

    #[tokio::test]
    async fn test_rejected_operation_leaves_tracks_untouched() {
        let authority = MemoryAuthority::new();
        let handle = authority
            .add_playlist(MemoryPlaylist::new("Mix").track(MemoryTrack::new("spotify:track:a")))
            .await;

        authority.reject(Operation::Remove).await;
        assert!(authority.remove_tracks(&handle, &[0]).await.is_err());
        assert_eq!(authority.track_links(&handle).await.len(), 1);

        authority.accept(Operation::Remove).await;
        assert!(authority.remove_tracks(&handle, &[0]).await.is_ok());
        assert!(authority.track_links(&handle).await.is_empty());
    }

    #[tokio::test]
    async fn test_unloaded_playlist_rejects_mutations() {
        let authority = MemoryAuthority::new();
        let handle = authority.add_playlist(MemoryPlaylist::unloaded()).await;

        let result = authority
            .insert_tracks(&handle, 0, &[Link::new("spotify:track:a")])
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_set_seen_checks_content() {
        let authority = MemoryAuthority::new();
        let handle = authority
            .add_playlist(
                MemoryPlaylist::new("Mix")
                    .track(MemoryTrack::new("spotify:track:a"))
                    .track(MemoryTrack::new("spotify:track:b")),
            )
            .await;
        let first = authority.slot(&handle, 0).await.unwrap().content;

        assert!(authority.set_seen(&handle, 0, first, true).await.unwrap());
        assert!(authority.slot(&handle, 0).await.unwrap().seen);

        authority.reorder_tracks(&handle, &[0], 2).await.unwrap();
        assert!(!authority.set_seen(&handle, 0, first, false).await.unwrap());
        assert!(!authority.set_seen(&handle, 5, first, false).await.unwrap());

        let slots = [
            authority.slot(&handle, 0).await.unwrap(),
            authority.slot(&handle, 1).await.unwrap(),
        ];
        assert!(!slots[0].seen);
        assert_eq!(slots[1].content, first);
        assert!(slots[1].seen);
    }

    #[tokio::test]
    async fn test_offline_mode_moves_status_code() {
        let authority = MemoryAuthority::new();
        let handle = authority.add_playlist(MemoryPlaylist::new("Mix")).await;

        authority.set_offline_mode(&handle, true).await.unwrap();
        assert_eq!(authority.state(&handle).await.offline_status, 1);
        authority.set_offline_mode(&handle, false).await.unwrap();
        assert_eq!(authority.state(&handle).await.offline_status, 0);
    }
}
