//! TrackEntry : vue paresseuse sur un emplacement de playlist

use super::{staleness, Playlist};
use crate::authority::{ContentId, Slot};
use crate::events::PlaylistEventKind;
use crate::link::{Link, UserRef};
use crate::{Error, Result};
use chrono::{DateTime, Utc};

/// Un emplacement de playlist
///
/// Seuls la position et l'identité du contenu sont capturées à la création ;
/// toutes les métadonnées sont relues auprès de l'autorité à chaque accès.
/// La position n'est qu'un indice : si l'emplacement change de contenu,
/// l'entrée est « déplacée » et refuse toute mutation.
#[derive(Debug, Clone)]
pub struct TrackEntry {
    playlist: Playlist,
    position: usize,
    content: ContentId,
}

impl PartialEq for TrackEntry {
    fn eq(&self, other: &Self) -> bool {
        self.playlist == other.playlist
            && self.position == other.position
            && self.content == other.content
    }
}

impl Eq for TrackEntry {}

impl TrackEntry {
    pub(crate) fn new(playlist: Playlist, position: usize, content: ContentId) -> Self {
        Self {
            playlist,
            position,
            content,
        }
    }

    /// Playlist d'origine
    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    /// Position au moment de la création
    pub fn position(&self) -> usize {
        self.position
    }

    async fn slot(&self) -> Option<Slot> {
        self.playlist
            .authority()
            .slot(self.playlist.handle_ref(), self.position)
            .await
    }

    /// Lien du morceau actuellement à cette position
    pub async fn track(&self) -> Option<Link> {
        self.slot().await.map(|slot| slot.track)
    }

    pub async fn is_seen(&self) -> bool {
        self.slot().await.map(|slot| slot.seen).unwrap_or(false)
    }

    /// Date d'ajout à la playlist, en UTC
    pub async fn added_at(&self) -> DateTime<Utc> {
        self.slot()
            .await
            .and_then(|slot| DateTime::from_timestamp(slot.added_at, 0))
            .unwrap_or_default()
    }

    /// Utilisateur ayant ajouté le morceau
    pub async fn adder(&self) -> Option<UserRef> {
        self.slot().await.and_then(|slot| slot.adder)
    }

    /// Message attaché au morceau (vide si aucun)
    pub async fn message(&self) -> String {
        self.slot().await.map(|slot| slot.message).unwrap_or_default()
    }

    /// Vrai si l'emplacement ne contient plus le contenu capturé
    pub async fn is_moved(&self) -> bool {
        staleness::is_stale(
            self.playlist.authority(),
            self.playlist.handle_ref(),
            self.position,
            self.content,
        )
        .await
    }

    /// Marque le morceau comme vu ou non vu
    ///
    /// Échoue avec [`Error::Moved`] si l'entrée est périmée, y compris quand
    /// l'autorité déplace l'emplacement entre la vérification et l'écriture.
    pub async fn set_seen(&self, seen: bool) -> Result<()> {
        let _guard = self.playlist.lock_mutations().await;
        let moved = Error::Moved {
            position: self.position,
        };

        if self.is_moved().await {
            return Err(moved);
        }

        let written = self
            .playlist
            .authority()
            .set_seen(self.playlist.handle_ref(), self.position, self.content, seen)
            .await?;
        if !written {
            return Err(moved);
        }
        tracing::debug!(
            playlist = %self.playlist.handle(),
            position = self.position,
            seen,
            "track seen flag updated"
        );
        self.playlist.emit(PlaylistEventKind::TrackSeenChanged {
            position: self.position,
            seen,
        });
        Ok(())
    }
}

/// Instantané des emplacements d'une playlist
///
/// Redemander [`Playlist::tracks`] produit de nouvelles entrées reflétant
/// l'état courant de l'autorité.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tracks {
    entries: Vec<TrackEntry>,
}

impl Tracks {
    pub(crate) fn new(entries: Vec<TrackEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TrackEntry> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TrackEntry> {
        self.entries.iter()
    }

    pub fn into_vec(self) -> Vec<TrackEntry> {
        self.entries
    }
}

impl IntoIterator for Tracks {
    type Item = TrackEntry;
    type IntoIter = std::vec::IntoIter<TrackEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Tracks {
    type Item = &'a TrackEntry;
    type IntoIter = std::slice::Iter<'a, TrackEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
