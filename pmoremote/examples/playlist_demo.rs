// examples/playlist_demo.rs
//
// Démo du proxy de playlist sur une autorité en mémoire :
//   - chargement de la configuration et du logging
//   - abonnement aux évènements
//   - insertion, déplacement et retrait de morceaux
//   - détection d'une entrée périmée
//
// Build et run (depuis la racine du crate pmoremote) :
//   RUST_LOG=debug cargo run --example playlist_demo

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use pmoremote::memory::{MemoryAuthority, MemoryPlaylist, MemoryTrack};
use pmoremote::{init_logging, RemoteConfig, Session, UserRef};

#[tokio::main]
async fn main() -> Result<()> {
    let config = RemoteConfig::load(None)?;
    init_logging(&config);

    // 1. Une autorité en mémoire avec une playlist chargée
    let authority = Arc::new(MemoryAuthority::new());
    let handle = authority
        .add_playlist(
            MemoryPlaylist::new("Megaplaylist")
                .owner(UserRef::new("burgestrand"))
                .track(
                    MemoryTrack::new("spotify:track:4yJmwG2C1SDgcBbV50xI91")
                        .seen(true),
                )
                .track(MemoryTrack::new("spotify:track:2Foc5Q5nqNiosCNqttzHof")),
        )
        .await;

    let session = Session::new(config, authority);
    let playlist = session.playlist(handle);

    // 2. Affichage continu des évènements
    let mut events = playlist.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            println!("[{}] {:?}", event.timestamp.format("%H:%M:%S"), event.kind);
        }
    });

    // 3. Mutations
    let first = playlist.track(0).await?;
    playlist
        .insert(Some(1), ["spotify:track:6lFMtXzLkLrsSezanTzHCm"])
        .await?;
    playlist.move_tracks(-1, &[0]).await?;
    playlist.set_name("Monoplaylist").await?;

    if let Err(e) = playlist.set_name("   ").await {
        println!("Rejected locally: {e}");
    }
    if let Err(e) = first.set_seen(false).await {
        println!("Stale entry: {e}");
    }

    playlist.upload(Some(Duration::from_secs(1))).await?;

    // 4. État final
    println!(
        "\n{} ({} tracks)",
        playlist.name().await,
        playlist.size().await
    );
    for entry in playlist.tracks().await {
        let track = entry
            .track()
            .await
            .map(|link| link.to_string())
            .unwrap_or_default();
        println!(
            "  [{}] {} seen={}",
            entry.position(),
            track,
            entry.is_seen().await
        );
    }

    drop(playlist);
    drop(session);
    printer.abort();
    Ok(())
}
