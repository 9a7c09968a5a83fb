//! WordPress payload normalization.
//!
//! Raw REST API records are tagged with an `mst` discriminant by the fetching
//! layer (`single` when absent). Each discriminant has its own raw shape which
//! is mapped onto the canonical [`Entity`] variants.

use super::{Author, Entity, EntityClass, Image, Media, Meta, Single, Taxonomy};
use crate::error::StoreError;
use crate::types::EntityId;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
struct Rendered {
    rendered: String,
}

#[derive(Debug, Default, Deserialize)]
struct YoastMeta {
    yoast_wpseo_title: Option<String>,
    yoast_wpseo_desc: Option<String>,
    yoast_wpseo_canonical: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSingle {
    id: EntityId,
    #[serde(rename = "type")]
    kind: String,
    date: Option<String>,
    modified: Option<String>,
    title: Option<Rendered>,
    slug: Option<String>,
    link: Option<String>,
    content: Option<Rendered>,
    excerpt: Option<Rendered>,
    author: Option<EntityId>,
    featured_media: Option<EntityId>,
    #[serde(rename = "taxonomiesMap", default)]
    taxonomies: BTreeMap<String, Vec<EntityId>>,
    #[serde(rename = "post-target")]
    target: Option<String>,
    yoast_meta: Option<YoastMeta>,
}

#[derive(Debug, Deserialize)]
struct RawTaxonomy {
    id: EntityId,
    taxonomy: String,
    name: Option<String>,
    slug: Option<String>,
    link: Option<String>,
    #[serde(rename = "term-target")]
    target: Option<String>,
    yoast_meta: Option<YoastMeta>,
}

#[derive(Debug, Deserialize)]
struct RawAuthor {
    id: EntityId,
    name: Option<String>,
    slug: Option<String>,
    description: Option<String>,
    link: Option<String>,
    avatar_urls: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct RawImage {
    height: Option<u32>,
    width: Option<u32>,
    file: Option<String>,
    source_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawMediaDetails {
    height: Option<u32>,
    width: Option<u32>,
    file: Option<String>,
    #[serde(default)]
    sizes: BTreeMap<String, RawImage>,
}

#[derive(Debug, Deserialize)]
struct RawMedia {
    id: EntityId,
    date: Option<String>,
    slug: Option<String>,
    alt_text: Option<String>,
    mime_type: Option<String>,
    media_type: Option<String>,
    title: Option<Rendered>,
    author: Option<EntityId>,
    #[serde(default)]
    media_details: RawMediaDetails,
    source_url: Option<String>,
}

/// Normalize one raw entity.
///
/// `group` is the payload group the entity arrived in and is only consulted
/// when the record carries no `mst` of its own.
pub fn normalize(raw: &serde_json::Value, group: Option<&str>) -> Result<Entity, StoreError> {
    let discriminant = raw
        .get("mst")
        .and_then(|v| v.as_str())
        .or(group)
        .unwrap_or("single");
    let class: EntityClass = discriminant.parse()?;

    match class {
        EntityClass::Single => parse::<RawSingle>(raw, class).map(single),
        EntityClass::Taxonomy => parse::<RawTaxonomy>(raw, class).map(taxonomy),
        EntityClass::Author => parse::<RawAuthor>(raw, class).map(author),
        EntityClass::Media => parse::<RawMedia>(raw, class).map(media),
    }
}

fn parse<T: DeserializeOwned>(raw: &serde_json::Value, class: EntityClass) -> Result<T, StoreError> {
    T::deserialize(raw).map_err(|source| StoreError::MalformedEntity {
        class: class.as_str().to_string(),
        source,
    })
}

/// WordPress dates come without offset (site time) or as RFC 3339.
fn parse_date(value: Option<&str>) -> Option<DateTime<Utc>> {
    let value = value?;
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Some(date.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

fn related(id: Option<EntityId>) -> Option<EntityId> {
    id.filter(|id| !id.is_unset())
}

/// Decode the character references WordPress leaves in rendered titles.
fn decode_html(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}

fn meta(yoast: Option<YoastMeta>, fallback_title: Option<&str>) -> Meta {
    let yoast = yoast.unwrap_or_default();
    Meta {
        title: yoast
            .yoast_wpseo_title
            .filter(|t| !t.is_empty())
            .or_else(|| fallback_title.map(str::to_string)),
        description: yoast.yoast_wpseo_desc,
        canonical: yoast.yoast_wpseo_canonical,
    }
}

fn single(raw: RawSingle) -> Entity {
    let title = raw.title.map(|t| t.rendered);
    // Only single titles are decoded; taxonomy names are kept as sent.
    let mut meta = meta(raw.yoast_meta, title.as_deref());
    meta.title = meta.title.map(|t| decode_html(&t));
    Entity::Single(Single {
        meta,
        id: raw.id,
        kind: raw.kind,
        creation_date: parse_date(raw.date.as_deref()),
        modification_date: parse_date(raw.modified.as_deref()),
        title,
        slug: raw.slug,
        link: raw.link,
        content: raw.content.map(|c| c.rendered),
        excerpt: raw.excerpt.map(|e| e.rendered),
        author: related(raw.author),
        featured: related(raw.featured_media),
        taxonomies: raw.taxonomies,
        target: raw.target,
    })
}

fn taxonomy(raw: RawTaxonomy) -> Entity {
    let kind = if raw.taxonomy == "post_tag" {
        "tag".to_string()
    } else {
        raw.taxonomy
    };
    Entity::Taxonomy(Taxonomy {
        meta: meta(raw.yoast_meta, raw.name.as_deref()),
        id: raw.id,
        kind,
        name: raw.name,
        slug: raw.slug,
        link: raw.link,
        target: raw.target,
    })
}

fn author(raw: RawAuthor) -> Entity {
    // Smallest numeric size key wins, independent of payload key order.
    // Query string stripped.
    let avatar = raw.avatar_urls.and_then(|urls| {
        urls.into_iter()
            .min_by_key(|(size, _)| size.parse::<u32>().unwrap_or(u32::MAX))
            .map(|(_, url)| match url.split_once('?') {
                Some((base, _)) => base.to_string(),
                None => url,
            })
    });
    Entity::Author(Author {
        id: raw.id,
        name: raw.name,
        slug: raw.slug,
        description: raw.description,
        link: raw.link,
        avatar,
    })
}

fn media(raw: RawMedia) -> Entity {
    let details = raw.media_details;
    let original = Image {
        height: details.height,
        width: details.width,
        filename: details.file,
        url: raw.source_url,
    };
    let sizes = details
        .sizes
        .into_values()
        .map(|image| Image {
            height: image.height,
            width: image.width,
            filename: image.file,
            url: image.source_url,
        })
        .collect();
    Entity::Media(Media {
        id: raw.id,
        creation_date: parse_date(raw.date.as_deref()),
        slug: raw.slug,
        title: raw.title.map(|t| t.rendered),
        alt: raw.alt_text,
        mime_type: raw.mime_type,
        media_type: raw.media_type,
        author: related(raw.author),
        original: Some(original),
        sizes,
    })
}
