//! # pmoremote - Proxy validé sur des playlists détenues par un moteur externe
//!
//! Cette crate expose une vue locale, validée et observable sur des playlists
//! dont le moteur de streaming (l'« autorité ») reste seul propriétaire :
//! - Lecture de l'état courant (nom, propriétaire, taille, statut hors-ligne)
//! - Insertion, retrait et déplacement de morceaux par position
//! - Validation locale des noms et des positions avant tout appel au moteur
//! - Détection des entrées périmées après une mutation
//! - Diffusion d'évènements après chaque mutation réussie
//!
//! # Architecture
//!
//! - **Authority** : trait injecté représentant le moteur externe
//! - **Playlist** : proxy sur une playlist du moteur
//! - **TrackEntry** : vue paresseuse sur un emplacement
//! - **Session** : contexte explicite (configuration + autorité)
//! - **MemoryAuthority** : autorité en mémoire pour les tests
//!
//! # Exemple d'utilisation
//!
//! ```no_run
//! use pmoremote::memory::{MemoryAuthority, MemoryPlaylist, MemoryTrack};
//! use pmoremote::{RemoteConfig, Session};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> pmoremote::Result<()> {
//! let authority = Arc::new(MemoryAuthority::new());
//! let handle = authority
//!     .add_playlist(MemoryPlaylist::new("Megaplaylist").track(MemoryTrack::new("spotify:track:a")))
//!     .await;
//!
//! let session = Session::new(RemoteConfig::default(), authority);
//! let playlist = session.playlist(handle);
//!
//! playlist.insert(None, ["spotify:track:b", "spotify:track:c"]).await?;
//! playlist.move_tracks(0, &[-1]).await?;
//! playlist.remove(&[1]).await?;
//!
//! for entry in playlist.tracks().await {
//!     println!("{}: {:?}", entry.position(), entry.track().await);
//! }
//! # Ok(())
//! # }
//! ```

mod authority;
mod config;
mod error;
mod events;
mod link;
mod logging;
mod playlist;
mod session;
mod wait;

pub mod memory;
pub mod name;
pub mod position;
pub mod sequence;

// Réexports publics
pub use authority::{
    Authority, AuthorityResult, CollectionHandle, ContentId, PlaylistState, Rejection, Slot,
};
pub use config::{EventsConfig, LoggerConfig, RemoteConfig, UploadConfig};
pub use error::{Error, Result};
pub use events::{PlaylistEvent, PlaylistEventKind, PlaylistFlag};
pub use link::{ImageRef, Link, LinkKind, UserRef};
pub use logging::init_logging;
pub use name::{check_name, invalid_name, NameError, MAX_NAME_BYTES};
pub use playlist::{OfflineStatus, Playlist, TrackEntry, Tracks};
pub use session::Session;
