//! Identifiants opaques des ressources exposées par l'autorité

use std::fmt;

/// Type de ressource désignée par un lien
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    Track,
    Album,
    Artist,
    Playlist,
    User,
    Image,
    Unknown,
}

impl LinkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkKind::Track => "track",
            LinkKind::Album => "album",
            LinkKind::Artist => "artist",
            LinkKind::Playlist => "playlist",
            LinkKind::User => "user",
            LinkKind::Image => "image",
            LinkKind::Unknown => "unknown",
        }
    }

    /// Déduit le type à partir des segments `scheme:kind:...`
    ///
    /// Un lien `scheme:user:<nom>:playlist:<id>` désigne une playlist, pas
    /// l'utilisateur.
    fn detect(uri: &str) -> Self {
        let segments: Vec<&str> = uri.split(':').collect();
        match segments.as_slice() {
            [_, "user", _, "playlist", ..] | [_, "user", _, "starred"] => LinkKind::Playlist,
            [_, kind, rest @ ..] if !rest.is_empty() => match *kind {
                "track" => LinkKind::Track,
                "album" => LinkKind::Album,
                "artist" => LinkKind::Artist,
                "playlist" => LinkKind::Playlist,
                "user" => LinkKind::User,
                "image" => LinkKind::Image,
                _ => LinkKind::Unknown,
            },
            _ => LinkKind::Unknown,
        }
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lien vers une ressource (URI opaque + type)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Link {
    uri: String,
    kind: LinkKind,
}

impl Link {
    pub fn new(uri: impl Into<String>) -> Self {
        let uri = uri.into();
        let kind = LinkKind::detect(uri.trim());
        Self { uri, kind }
    }

    pub fn as_str(&self) -> &str {
        &self.uri
    }

    pub fn kind(&self) -> LinkKind {
        self.kind
    }

    pub fn is_track(&self) -> bool {
        self.kind == LinkKind::Track
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri)
    }
}

impl From<&str> for Link {
    fn from(uri: &str) -> Self {
        Link::new(uri)
    }
}

impl From<String> for Link {
    fn from(uri: String) -> Self {
        Link::new(uri)
    }
}

/// Référence vers un utilisateur du service
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserRef {
    canonical_name: String,
}

impl UserRef {
    pub fn new(canonical_name: impl Into<String>) -> Self {
        Self {
            canonical_name: canonical_name.into(),
        }
    }

    pub fn canonical_name(&self) -> &str {
        &self.canonical_name
    }
}

/// Référence vers une image (pochette, image de playlist)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRef {
    link: Link,
}

impl ImageRef {
    pub fn new(link: impl Into<Link>) -> Self {
        Self { link: link.into() }
    }

    pub fn link(&self) -> &Link {
        &self.link
    }
}
