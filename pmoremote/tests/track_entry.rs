use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use pmoremote::memory::{MemoryAuthority, MemoryPlaylist, MemoryTrack, Operation};
use pmoremote::{
    Authority, AuthorityResult, CollectionHandle, ContentId, Error, Link, Playlist,
    PlaylistEventKind, PlaylistState, RemoteConfig, Session, Slot, UserRef,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// 2009-11-04 00:00:00 UTC
const ADDED_AT: i64 = 1_257_292_800;

const FIRST: &str = "spotify:track:4yJmwG2C1SDgcBbV50xI91";
const SECOND: &str = "spotify:track:2Foc5Q5nqNiosCNqttzHof";

fn megaplaylist() -> MemoryPlaylist {
    MemoryPlaylist::new("Megaplaylist")
        .track(
            MemoryTrack::new(FIRST)
                .added_at(ADDED_AT)
                .adder(UserRef::new("burgestrand"))
                .message("message this, YO!")
                .seen(true),
        )
        .track(MemoryTrack::new(SECOND))
        .track(MemoryTrack::new(SECOND))
}

async fn setup() -> (Arc<MemoryAuthority>, Playlist) {
    let authority = Arc::new(MemoryAuthority::new());
    let handle = authority.add_playlist(megaplaylist()).await;
    let session = Session::new(RemoteConfig::default(), authority.clone());
    (authority, session.playlist(handle))
}

/// Autorité qui déplace le premier morceau en fin de playlist juste après
/// une lecture d'emplacement, une fois armée
#[derive(Debug)]
struct ShiftingAuthority {
    inner: Arc<MemoryAuthority>,
    armed: AtomicBool,
}

#[async_trait]
impl Authority for ShiftingAuthority {
    async fn is_loaded(&self, playlist: &CollectionHandle) -> bool {
        self.inner.is_loaded(playlist).await
    }

    async fn state(&self, playlist: &CollectionHandle) -> PlaylistState {
        self.inner.state(playlist).await
    }

    async fn link(&self, playlist: &CollectionHandle) -> Option<Link> {
        self.inner.link(playlist).await
    }

    async fn subscribers(&self, playlist: &CollectionHandle) -> AuthorityResult<Vec<String>> {
        self.inner.subscribers(playlist).await
    }

    async fn slot(&self, playlist: &CollectionHandle, index: usize) -> Option<Slot> {
        let slot = self.inner.slot(playlist, index).await;
        if self.armed.swap(false, Ordering::SeqCst) {
            let size = self.inner.state(playlist).await.size;
            let _ = self.inner.reorder_tracks(playlist, &[0], size).await;
        }
        slot
    }

    async fn set_name(&self, playlist: &CollectionHandle, name: &str) -> AuthorityResult<()> {
        self.inner.set_name(playlist, name).await
    }

    async fn set_collaborative(
        &self,
        playlist: &CollectionHandle,
        value: bool,
    ) -> AuthorityResult<()> {
        self.inner.set_collaborative(playlist, value).await
    }

    async fn set_in_ram(&self, playlist: &CollectionHandle, value: bool) -> AuthorityResult<()> {
        self.inner.set_in_ram(playlist, value).await
    }

    async fn set_autolink_tracks(
        &self,
        playlist: &CollectionHandle,
        value: bool,
    ) -> AuthorityResult<()> {
        self.inner.set_autolink_tracks(playlist, value).await
    }

    async fn set_offline_mode(
        &self,
        playlist: &CollectionHandle,
        value: bool,
    ) -> AuthorityResult<()> {
        self.inner.set_offline_mode(playlist, value).await
    }

    async fn set_seen(
        &self,
        playlist: &CollectionHandle,
        index: usize,
        content: ContentId,
        value: bool,
    ) -> AuthorityResult<bool> {
        self.inner.set_seen(playlist, index, content, value).await
    }

    async fn insert_tracks(
        &self,
        playlist: &CollectionHandle,
        offset: usize,
        tracks: &[Link],
    ) -> AuthorityResult<()> {
        self.inner.insert_tracks(playlist, offset, tracks).await
    }

    async fn remove_tracks(
        &self,
        playlist: &CollectionHandle,
        offsets: &[usize],
    ) -> AuthorityResult<()> {
        self.inner.remove_tracks(playlist, offsets).await
    }

    async fn reorder_tracks(
        &self,
        playlist: &CollectionHandle,
        offsets: &[usize],
        destination: usize,
    ) -> AuthorityResult<()> {
        self.inner
            .reorder_tracks(playlist, offsets, destination)
            .await
    }

    async fn update_subscribers(&self, playlist: &CollectionHandle) -> AuthorityResult<()> {
        self.inner.update_subscribers(playlist).await
    }
}

#[tokio::test]
async fn test_entry_metadata() {
    let (_authority, playlist) = setup().await;
    let entry = playlist.track(0).await.unwrap();

    assert_eq!(entry.playlist(), &playlist);
    assert_eq!(entry.position(), 0);
    assert_eq!(entry.track().await, Some(Link::new(FIRST)));
    assert!(entry.is_seen().await);
    let added_at = Utc.with_ymd_and_hms(2009, 11, 4, 0, 0, 0).unwrap();
    assert_eq!(entry.added_at().await, added_at);
    assert_eq!(entry.adder().await, Some(UserRef::new("burgestrand")));
    assert_eq!(entry.message().await, "message this, YO!");
    assert!(!entry.is_moved().await);
}

#[tokio::test]
async fn test_entry_without_adder_or_message() {
    let (_authority, playlist) = setup().await;
    let entry = playlist.track(-1).await.unwrap();

    assert_eq!(entry.adder().await, None);
    assert_eq!(entry.message().await, "");
    assert!(!entry.is_seen().await);
}

#[tokio::test]
async fn test_set_seen() {
    let (_authority, playlist) = setup().await;
    let mut events = playlist.subscribe();
    let entry = playlist.track(1).await.unwrap();

    entry.set_seen(true).await.unwrap();
    assert!(entry.is_seen().await);
    assert_eq!(
        events.recv().await.unwrap().kind,
        PlaylistEventKind::TrackSeenChanged {
            position: 1,
            seen: true
        }
    );

    entry.set_seen(false).await.unwrap();
    assert!(!entry.is_seen().await);
}

#[tokio::test]
async fn test_entry_is_moved_after_reorder() {
    let (_authority, playlist) = setup().await;
    let entry = playlist.track(0).await.unwrap();

    playlist.move_tracks(-1, &[0]).await.unwrap();

    assert!(entry.is_moved().await);
    assert!(matches!(
        entry.set_seen(false).await,
        Err(Error::Moved { position: 0 })
    ));

    // Le morceau déplacé garde son état
    let moved = playlist.track(-1).await.unwrap();
    assert!(moved.is_seen().await);
    assert_eq!(moved.message().await, "message this, YO!");
}

#[tokio::test]
async fn test_entries_after_insertion_point_are_moved() {
    let (authority, playlist) = setup().await;
    let entries = playlist.tracks().await.into_vec();

    playlist
        .insert(Some(1), ["spotify:track:6lFMtXzLkLrsSezanTzHCm"])
        .await
        .unwrap();

    assert!(!entries[0].is_moved().await);
    assert!(entries[1].is_moved().await);
    assert!(entries[2].is_moved().await);

    for entry in &entries[1..] {
        let err = entry.set_seen(true).await.unwrap_err();
        assert!(matches!(err, Error::Moved { position } if position == entry.position()));
    }

    // Aucun emplacement n'a été marqué vu
    let handle = playlist.handle();
    for (position, expected) in [(0, true), (1, false), (2, false), (3, false)] {
        let slot = authority.slot(&handle, position).await.unwrap();
        assert_eq!(slot.seen, expected, "slot {position}");
    }
}

#[tokio::test]
async fn test_set_seen_when_authority_shifts_before_write() {
    let memory = Arc::new(MemoryAuthority::new());
    let handle = memory
        .add_playlist(
            MemoryPlaylist::new("Mix")
                .track(MemoryTrack::new("spotify:track:a"))
                .track(MemoryTrack::new("spotify:track:b"))
                .track(MemoryTrack::new("spotify:track:c")),
        )
        .await;
    let authority = Arc::new(ShiftingAuthority {
        inner: memory.clone(),
        armed: AtomicBool::new(false),
    });
    let session = Session::new(RemoteConfig::default(), authority.clone());
    let playlist = session.playlist(handle);
    let entry = playlist.track(0).await.unwrap();

    authority.armed.store(true, Ordering::SeqCst);
    let result = entry.set_seen(true).await;

    assert!(matches!(result, Err(Error::Moved { position: 0 })));
    let links: Vec<String> = memory
        .track_links(&handle)
        .await
        .iter()
        .map(|link| link.to_string())
        .collect();
    assert_eq!(
        links,
        ["spotify:track:b", "spotify:track:c", "spotify:track:a"]
    );
    for position in 0..3 {
        assert!(!memory.slot(&handle, position).await.unwrap().seen);
    }
}

#[tokio::test]
async fn test_duplicate_track_swap_is_detected() {
    let (_authority, playlist) = setup().await;
    let second = playlist.track(1).await.unwrap();
    let third = playlist.track(2).await.unwrap();
    assert_eq!(second.track().await, third.track().await);

    // Même lien à la même position, mais pas le même emplacement
    playlist.move_tracks(1, &[2]).await.unwrap();

    assert_eq!(second.track().await, Some(Link::new(SECOND)));
    assert!(second.is_moved().await);
    assert!(third.is_moved().await);
}

#[tokio::test]
async fn test_entry_is_moved_after_removal() {
    let (_authority, playlist) = setup().await;
    let last = playlist.track(2).await.unwrap();

    playlist.remove(&[0]).await.unwrap();

    assert!(last.is_moved().await);
    assert_eq!(last.track().await, None);
    assert_eq!(last.message().await, "");
    assert!(matches!(
        last.set_seen(true).await,
        Err(Error::Moved { position: 2 })
    ));
}

#[tokio::test]
async fn test_set_seen_rejected() {
    let (authority, playlist) = setup().await;
    authority.reject(Operation::SetSeen).await;
    let entry = playlist.track(1).await.unwrap();

    assert!(matches!(
        entry.set_seen(true).await,
        Err(Error::Operation(_))
    ));
    assert!(!entry.is_seen().await);
}

#[tokio::test]
async fn test_fresh_tracks_reflect_new_order() {
    let (_authority, playlist) = setup().await;
    let before = playlist.tracks().await;

    playlist.move_tracks(-1, &[0]).await.unwrap();
    let after = playlist.tracks().await;

    assert_ne!(before, after);
    for entry in &after {
        assert!(!entry.is_moved().await);
    }
    assert_eq!(after.get(2).unwrap().track().await, Some(Link::new(FIRST)));
}
