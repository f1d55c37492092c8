//! Détection des entrées dont l'emplacement a changé de contenu

use crate::authority::{Authority, CollectionHandle, ContentId};

/// Vrai si `position` ne contient plus `captured`
///
/// Un emplacement disparu (playlist raccourcie) est aussi considéré comme
/// périmé.
pub(crate) async fn is_stale(
    authority: &dyn Authority,
    playlist: &CollectionHandle,
    position: usize,
    captured: ContentId,
) -> bool {
    match authority.slot(playlist, position).await {
        Some(slot) => slot.content != captured,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryAuthority, MemoryPlaylist, MemoryTrack};

    async fn setup() -> (MemoryAuthority, CollectionHandle) {
        let authority = MemoryAuthority::new();
        let handle = authority
            .add_playlist(
                MemoryPlaylist::new("Mix")
                    .track(MemoryTrack::new("spotify:track:a"))
                    .track(MemoryTrack::new("spotify:track:b")),
            )
            .await;
        (authority, handle)
    }

    #[tokio::test]
    async fn test_fresh_slot() {
        let (authority, handle) = setup().await;
        let content = authority.slot(&handle, 1).await.unwrap().content;
        assert!(!is_stale(&authority, &handle, 1, content).await);
    }

    #[tokio::test]
    async fn test_shifted_slot() {
        let (authority, handle) = setup().await;
        let content = authority.slot(&handle, 0).await.unwrap().content;
        authority.reorder_tracks(&handle, &[0], 2).await.unwrap();
        assert!(is_stale(&authority, &handle, 0, content).await);
    }

    #[tokio::test]
    async fn test_vanished_slot() {
        let (authority, handle) = setup().await;
        let content = authority.slot(&handle, 1).await.unwrap().content;
        authority.remove_tracks(&handle, &[1]).await.unwrap();
        assert!(is_stale(&authority, &handle, 1, content).await);
    }

    #[tokio::test]
    async fn test_duplicate_track_is_still_detected() {
        let authority = MemoryAuthority::new();
        let handle = authority
            .add_playlist(
                MemoryPlaylist::new("Mix")
                    .track(MemoryTrack::new("spotify:track:a"))
                    .track(MemoryTrack::new("spotify:track:a")),
            )
            .await;
        let content = authority.slot(&handle, 0).await.unwrap().content;
        authority.reorder_tracks(&handle, &[0], 2).await.unwrap();
        assert!(is_stale(&authority, &handle, 0, content).await);
    }
}
