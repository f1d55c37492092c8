//! Autorité externe : le moteur qui possède réellement les playlists
//!
//! Le proxy ne stocke rien : chaque lecture interroge l'autorité, chaque
//! mutation validée lui est transmise en une seule requête. L'autorité
//! signale un échec par une [`Rejection`] opaque.

use crate::link::{ImageRef, Link, UserRef};
use async_trait::async_trait;
use std::fmt;
use uuid::Uuid;

/// Handle opaque d'une collection détenue par l'autorité
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollectionHandle(Uuid);

impl CollectionHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CollectionHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CollectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identité du contenu occupant un emplacement
///
/// Deux emplacements contenant le même morceau ont des identités distinctes ;
/// une identité suit son contenu lors d'un déplacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentId(Uuid);

impl ContentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ContentId {
    fn default() -> Self {
        Self::new()
    }
}

/// Échec opaque renvoyé par l'autorité
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct Rejection(pub String);

impl Rejection {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Résultat d'une mutation transmise à l'autorité
pub type AuthorityResult<T> = std::result::Result<T, Rejection>;

/// Instantané de l'état scalaire d'une collection
///
/// Les valeurs n'ont de sens que si la collection est chargée.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaylistState {
    pub name: String,
    pub owner: Option<UserRef>,
    pub description: String,
    pub image: Option<ImageRef>,
    pub total_subscribers: u32,
    /// Pourcentage de synchronisation hors-ligne (0-100)
    pub sync_progress: u8,
    pub size: usize,
    pub collaborative: bool,
    pub in_ram: bool,
    pub autolink_tracks: bool,
    pub pending: bool,
    /// Code brut du statut hors-ligne
    pub offline_status: i32,
}

/// Contenu et métadonnées d'un emplacement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub content: ContentId,
    pub track: Link,
    /// Date d'ajout, en secondes depuis l'epoch
    pub added_at: i64,
    pub adder: Option<UserRef>,
    pub message: String,
    pub seen: bool,
}

/// Capacités attendues du moteur externe
#[async_trait]
pub trait Authority: fmt::Debug + Send + Sync {
    async fn is_loaded(&self, playlist: &CollectionHandle) -> bool;

    async fn state(&self, playlist: &CollectionHandle) -> PlaylistState;

    async fn link(&self, playlist: &CollectionHandle) -> Option<Link>;

    async fn subscribers(&self, playlist: &CollectionHandle) -> AuthorityResult<Vec<String>>;

    async fn slot(&self, playlist: &CollectionHandle, index: usize) -> Option<Slot>;

    async fn set_name(&self, playlist: &CollectionHandle, name: &str) -> AuthorityResult<()>;

    async fn set_collaborative(&self, playlist: &CollectionHandle, value: bool)
        -> AuthorityResult<()>;

    async fn set_in_ram(&self, playlist: &CollectionHandle, value: bool) -> AuthorityResult<()>;

    async fn set_autolink_tracks(
        &self,
        playlist: &CollectionHandle,
        value: bool,
    ) -> AuthorityResult<()>;

    async fn set_offline_mode(&self, playlist: &CollectionHandle, value: bool)
        -> AuthorityResult<()>;

    /// Écrit le drapeau « vu » de l'emplacement `index` s'il contient encore
    /// `content`
    ///
    /// La comparaison et l'écriture sont atomiques. `Ok(false)` signale un
    /// emplacement qui a changé de contenu ; rien n'est alors écrit.
    async fn set_seen(
        &self,
        playlist: &CollectionHandle,
        index: usize,
        content: ContentId,
        value: bool,
    ) -> AuthorityResult<bool>;

    /// Insère un lot de morceaux à `offset` (`offset == size` pour ajouter)
    async fn insert_tracks(
        &self,
        playlist: &CollectionHandle,
        offset: usize,
        tracks: &[Link],
    ) -> AuthorityResult<()>;

    /// Retire simultanément les emplacements donnés (indexation d'origine)
    async fn remove_tracks(
        &self,
        playlist: &CollectionHandle,
        offsets: &[usize],
    ) -> AuthorityResult<()>;

    /// Déplace en bloc les emplacements donnés vers `destination`
    async fn reorder_tracks(
        &self,
        playlist: &CollectionHandle,
        offsets: &[usize],
        destination: usize,
    ) -> AuthorityResult<()>;

    async fn update_subscribers(&self, playlist: &CollectionHandle) -> AuthorityResult<()>;
}
