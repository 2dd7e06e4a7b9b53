//! Entity kinds of the music platform
//!
//! One kind per collection. Each kind has a stable collection name (the name
//! the documents are stored under) and a Rust-facing name; both parse.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::errors::SchemaError;

/// The 24 domain record types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Listener,
    Playlist,
    Song,
    Collection,
    Review,
    ArtistBand,
    Genre,
    Product,
    Event,
    VideoClip,
    Transaction,
    Featuring,
    Reaction,
    Listening,
    Disc,
    Apparel,
    Ticket,
    SavedPlaylist,
    Attraction,
    GenreArtistLink,
    GenreCollectionLink,
    GenreSongLink,
    PlaylistSongLink,
    Friendship,
}

impl EntityKind {
    /// Every kind, in declaration order
    pub const ALL: [EntityKind; 24] = [
        EntityKind::Listener,
        EntityKind::Playlist,
        EntityKind::Song,
        EntityKind::Collection,
        EntityKind::Review,
        EntityKind::ArtistBand,
        EntityKind::Genre,
        EntityKind::Product,
        EntityKind::Event,
        EntityKind::VideoClip,
        EntityKind::Transaction,
        EntityKind::Featuring,
        EntityKind::Reaction,
        EntityKind::Listening,
        EntityKind::Disc,
        EntityKind::Apparel,
        EntityKind::Ticket,
        EntityKind::SavedPlaylist,
        EntityKind::Attraction,
        EntityKind::GenreArtistLink,
        EntityKind::GenreCollectionLink,
        EntityKind::GenreSongLink,
        EntityKind::PlaylistSongLink,
        EntityKind::Friendship,
    ];

    /// Name of the backing collection
    pub fn collection_name(&self) -> &'static str {
        match self {
            EntityKind::Listener => "ouvintes",
            EntityKind::Playlist => "playlists",
            EntityKind::Song => "musicas",
            EntityKind::Collection => "colecoes",
            EntityKind::Review => "avaliacoes",
            EntityKind::ArtistBand => "artistas_bandas",
            EntityKind::Genre => "generos",
            EntityKind::Product => "produtos",
            EntityKind::Event => "eventos",
            EntityKind::VideoClip => "videoclipes",
            EntityKind::Transaction => "transacoes",
            EntityKind::Featuring => "featuring",
            EntityKind::Reaction => "reacoes",
            EntityKind::Listening => "escutando",
            EntityKind::Disc => "discos",
            EntityKind::Apparel => "vestimentas",
            EntityKind::Ticket => "ingressos",
            EntityKind::SavedPlaylist => "playlists_salvas",
            EntityKind::Attraction => "atracoes",
            EntityKind::GenreArtistLink => "generos_artistas_banda",
            EntityKind::GenreCollectionLink => "generos_colecoes",
            EntityKind::GenreSongLink => "generos_musicas",
            EntityKind::PlaylistSongLink => "musicas_playlist",
            EntityKind::Friendship => "amizades",
        }
    }

    /// Rust-facing name, e.g. `ArtistBand`
    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Listener => "Listener",
            EntityKind::Playlist => "Playlist",
            EntityKind::Song => "Song",
            EntityKind::Collection => "Collection",
            EntityKind::Review => "Review",
            EntityKind::ArtistBand => "ArtistBand",
            EntityKind::Genre => "Genre",
            EntityKind::Product => "Product",
            EntityKind::Event => "Event",
            EntityKind::VideoClip => "VideoClip",
            EntityKind::Transaction => "Transaction",
            EntityKind::Featuring => "Featuring",
            EntityKind::Reaction => "Reaction",
            EntityKind::Listening => "Listening",
            EntityKind::Disc => "Disc",
            EntityKind::Apparel => "Apparel",
            EntityKind::Ticket => "Ticket",
            EntityKind::SavedPlaylist => "SavedPlaylist",
            EntityKind::Attraction => "Attraction",
            EntityKind::GenreArtistLink => "GenreArtistLink",
            EntityKind::GenreCollectionLink => "GenreCollectionLink",
            EntityKind::GenreSongLink => "GenreSongLink",
            EntityKind::PlaylistSongLink => "PlaylistSongLink",
            EntityKind::Friendship => "Friendship",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for EntityKind {
    type Err = SchemaError;

    /// Accepts the collection name or the Rust-facing name (case-insensitive)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.collection_name() == s || kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| SchemaError::UnknownKind(s.to_string()))
    }
}

impl Serialize for EntityKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.collection_name())
    }
}

impl<'de> Deserialize<'de> for EntityKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
