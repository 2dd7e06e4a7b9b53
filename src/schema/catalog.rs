//! Built-in catalog of the music platform collections
//!
//! One definition per `EntityKind`. Reference typing is normalized: every
//! field holding another document's `_id` is an objectId reference, and the
//! link collections that join on names (`nome_genero`, `nome_produto`,
//! `nome_evento`) reference the target's unique name field.
//!
//! objectId fields whose target collection is not modeled here (`id_local`,
//! `id_produtora`, `loja`, the artist's own `id_usuario`) stay plain
//! objectId fields.

use once_cell::sync::OnceCell;

use crate::observability::{self, log_event_with_fields};

use super::entity::EntityKind;
use super::errors::{SchemaError, SchemaResult};
use super::registry::SchemaRegistry;
use super::types::{FieldRule, FieldType, Pattern, SchemaDefinition};

use EntityKind::*;
use FieldType::{Boolean, Date, Decimal, Integer, ObjectId, String as Text};

/// Email shape used on listener addresses
pub const EMAIL_PATTERN: &str = ".+@.+\\..+";

/// Allowed `Listener.sexo` values
pub const SEXES: [&str; 3] = ["Masculino", "Feminino", "Outro"];

/// Allowed `Collection.tipo` values
pub const COLLECTION_TYPES: [&str; 4] = ["Album", "EP", "Single", "Compilacao"];

static SHARED: OnceCell<SchemaRegistry> = OnceCell::new();

/// Process-wide frozen catalog, built on first use.
pub fn shared() -> SchemaResult<&'static SchemaRegistry> {
    SHARED.get_or_try_init(build)
}

/// Builds and freezes a registry holding every built-in definition.
pub fn build() -> SchemaResult<SchemaRegistry> {
    let mut registry = SchemaRegistry::new();
    for definition in definitions()? {
        registry.register(definition)?;
    }
    registry.freeze()?;

    let count = registry.len().to_string();
    log_event_with_fields(observability::Event::CatalogLoaded, &[("kinds", count.as_str())]);
    Ok(registry)
}

fn req(name: &str, ty: FieldType) -> FieldRule {
    FieldRule::required(name, ty)
}

fn opt(name: &str, ty: FieldType) -> FieldRule {
    FieldRule::optional(name, ty)
}

fn array(items: FieldType) -> FieldType {
    FieldType::array_of(items)
}

/// All 24 definitions, in declaration order.
pub fn definitions() -> SchemaResult<Vec<SchemaDefinition>> {
    let email = Pattern::new(EMAIL_PATTERN)
        .map_err(|e| SchemaError::invalid(Listener, format!("email pattern: {}", e)))?;

    Ok(vec![
        SchemaDefinition::new(
            Listener,
            vec![
                req("email", array(Text)).pattern(email),
                req("senha", Text).min_length(6),
                req("username", Text).min_length(3).max_length(30),
                req("nome", Text).max_length(30),
                req("sobrenome", Text).max_length(60),
                opt("sexo", Text).one_of(&SEXES),
                req("data_nascimento", Date),
                req("criado_em", Date),
                req("atualizado_em", Date),
                req("id_local", ObjectId),
            ],
        ),
        SchemaDefinition::new(
            Playlist,
            vec![
                req("nome", Text),
                opt("descricao", Text),
                req("criado_em", Date),
                req("atualizado_em", Date),
                req("id_ouvinte_criador", ObjectId).references(Listener),
            ],
        ),
        SchemaDefinition::new(
            Song,
            vec![
                req("caminho_audio", Text).unique(),
                req("titulo", Text),
                opt("letra", Text),
            ],
        ),
        SchemaDefinition::new(
            Collection,
            vec![
                req("caminho_capa", Text).max_length(500).unique(),
                req("duracao", Integer),
                req("data_lancamento", Date),
                req("titulo", Text).max_length(90),
                req("tipo", Text).one_of(&COLLECTION_TYPES),
                opt("generos_ids", array(ObjectId))
                    .unique_items()
                    .references(Genre),
            ],
        ),
        SchemaDefinition::new(
            Review,
            vec![
                req("id_usuario", ObjectId).references(Listener),
                req("id_colecao", ObjectId).references(Collection),
                opt("titulo", Text).max_length(60),
                req("nota", Decimal).minimum(0.0).maximum(10.0),
                opt("descricao", Text).max_length(500),
            ],
        ),
        SchemaDefinition::new(
            ArtistBand,
            vec![
                req("id_usuario", ObjectId),
                req("integrantes", array(Text)),
                req("ano_formacao", Integer),
                req("nome_artistico", Text),
                opt("descricao", Text),
                req("email", array(Text)),
                req("senha", Text),
                req("username", Text),
                opt("id_produtora", ObjectId),
                req("id_local", ObjectId),
            ],
        ),
        SchemaDefinition::new(
            Genre,
            vec![
                req("nome", Text).max_length(60).unique(),
                req("surgiu_em", Date),
            ],
        ),
        SchemaDefinition::new(
            Product,
            vec![
                req("nome", Text).unique(),
                req("preco", Decimal),
                req("peso", Decimal),
                req("disponivel", Boolean),
            ],
        ),
        SchemaDefinition::new(
            Event,
            vec![
                req("nome", Text).unique(),
                req("inicio", Date),
                req("capacidade", Integer),
                req("id_local", ObjectId),
            ],
        ),
        SchemaDefinition::new(
            VideoClip,
            vec![
                req("id_musica", ObjectId).references(Song),
                opt("descricao", Text),
                req("titulo", Text),
                req("caminho_video", Text),
                req("ano_lancamento", Integer),
            ],
        ),
        SchemaDefinition::new(
            Transaction,
            vec![
                req("nome_produto", Text).references_by(Product, "nome"),
                req("id_ouvinte", ObjectId).references(Listener),
                req("loja", ObjectId),
                req("numero", Integer),
                req("valor", Decimal),
            ],
        ),
        SchemaDefinition::new(
            Featuring,
            vec![
                req("id_musica", ObjectId).references(Song),
                req("id_usuario", ObjectId).references(ArtistBand),
            ],
        ),
        SchemaDefinition::new(
            Reaction,
            vec![
                req("id_usuario_ouvinte", ObjectId).references(Listener),
                req("id_musica", ObjectId).references(Song),
                req("id_usuario_reagiu", ObjectId).references(Listener),
                req("emoji", Text).min_length(1).max_length(1),
            ],
        ),
        SchemaDefinition::new(
            Listening,
            vec![
                req("id_usuario", ObjectId).references(Listener),
                req("id_musica", ObjectId).references(Song),
            ],
        ),
        SchemaDefinition::new(
            Disc,
            vec![
                req("nome_produto", Text).references_by(Product, "nome"),
                req("id_colecao", ObjectId).references(Collection),
                req("tipo", Text),
                req("quantidade_discos", Integer),
            ],
        ),
        SchemaDefinition::new(
            Apparel,
            vec![
                req("nome_produto", Text).references_by(Product, "nome"),
                req("preco", Decimal),
                req("tamanho", Text),
                req("cor", Text),
                req("tipo", Text),
                req("disponivel", Boolean),
            ],
        ),
        SchemaDefinition::new(
            Ticket,
            vec![
                req("nome_produto", Text).references_by(Product, "nome"),
                req("nome_evento", Text).references_by(Event, "nome"),
                req("tipo", Text),
            ],
        ),
        SchemaDefinition::new(
            SavedPlaylist,
            vec![
                req("ouvinte_id_usuario", ObjectId).references(Listener),
                req("playlist_id_playlist", ObjectId).references(Playlist),
            ],
        ),
        SchemaDefinition::new(
            Attraction,
            vec![
                req("id_artista_banda", ObjectId).references(ArtistBand),
                req("nome_evento", Text).references_by(Event, "nome"),
            ],
        ),
        SchemaDefinition::new(
            GenreArtistLink,
            vec![
                req("nome_genero", Text).references_by(Genre, "nome"),
                req("id_artista_banda", ObjectId).references(ArtistBand),
            ],
        ),
        SchemaDefinition::new(
            GenreCollectionLink,
            vec![
                req("nome_genero", Text).references_by(Genre, "nome"),
                req("id_colecao", ObjectId).references(Collection),
            ],
        ),
        SchemaDefinition::new(
            GenreSongLink,
            vec![
                req("nome_genero", Text).references_by(Genre, "nome"),
                req("id_musica", ObjectId).references(Song),
            ],
        ),
        SchemaDefinition::new(
            PlaylistSongLink,
            vec![
                req("id_musica", ObjectId).references(Song),
                req("id_playlist", ObjectId).references(Playlist),
            ],
        ),
        SchemaDefinition::new(
            Friendship,
            vec![
                req("id_seguidor", ObjectId).references(Listener),
                req("id_seguindo", ObjectId).references(Listener),
            ],
        ),
    ])
}
