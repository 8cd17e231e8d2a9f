//! JSON:API style documents.
//!
//! Outgoing records are mapped explicitly by the `*_resource` functions. Related labels are only
//! placed under `included` where a handler asks for them.

use flashcards_repo::card_repo::Card;
use flashcards_repo::label_repo::{Label, LabelId};
use flashcards_repo::user_repo::User;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct ResourceIdentifier {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
}

#[derive(Serialize, Debug)]
pub struct Relationship {
    pub data: Vec<ResourceIdentifier>,
}

#[derive(Serialize, Debug)]
pub struct Resource<A> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub id: String,
    pub attributes: A,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub relationships: BTreeMap<&'static str, Relationship>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "kebab-case")]
pub struct CardAttributes {
    pub side_a: String,
    pub side_b: String,
    pub proficiency_level: i32,
}

#[derive(Serialize, Debug)]
pub struct LabelAttributes {
    pub name: String,
}

#[derive(Serialize, Debug)]
pub struct UserAttributes {
    pub email: String,
}

#[derive(Serialize, Debug)]
pub struct Meta {
    #[serde(rename = "auth-token")]
    pub auth_token: String,
}

#[derive(Serialize, Debug)]
pub struct Document<D> {
    pub data: D,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub included: Vec<Resource<LabelAttributes>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl<D: Serialize> Document<D> {
    pub fn new(data: D) -> Document<D> {
        Document {
            data,
            included: Vec::new(),
            meta: None,
        }
    }

    pub fn with_included(mut self, included: Vec<Resource<LabelAttributes>>) -> Document<D> {
        self.included = included;
        self
    }

    pub fn with_meta(mut self, meta: Meta) -> Document<D> {
        self.meta = Some(meta);
        self
    }
}

fn label_relationship(label_ids: impl IntoIterator<Item = LabelId>) -> Relationship {
    Relationship {
        data: label_ids
            .into_iter()
            .map(|id| ResourceIdentifier {
                kind: "labels".to_owned(),
                id: id.to_string(),
            })
            .collect(),
    }
}

pub fn label_resource(label: &Label) -> Resource<LabelAttributes> {
    Resource {
        kind: "labels",
        id: label.id.to_string(),
        attributes: LabelAttributes {
            name: label.name.clone(),
        },
        relationships: BTreeMap::new(),
    }
}

pub fn card_resource(card: &Card) -> Resource<CardAttributes> {
    Resource {
        kind: "cards",
        id: card.id.to_string(),
        attributes: CardAttributes {
            side_a: card.side_a.clone(),
            side_b: card.side_b.clone(),
            proficiency_level: card.proficiency_level,
        },
        relationships: BTreeMap::from([("labels", label_relationship(card.label_ids.clone()))]),
    }
}

pub fn user_resource(user: &User, labels: &[Label]) -> Resource<UserAttributes> {
    Resource {
        kind: "users",
        id: user.id.to_string(),
        attributes: UserAttributes {
            email: user.email.clone(),
        },
        relationships: BTreeMap::from([(
            "labels",
            label_relationship(labels.iter().map(|l| l.id)),
        )]),
    }
}

/// A single card with the labels it references under `included`. `labels` may hold more labels
/// than the card references.
pub fn card_document(card: &Card, labels: &[Label]) -> Document<Resource<CardAttributes>> {
    let included = labels
        .iter()
        .filter(|l| card.label_ids.binary_search(&l.id).is_ok())
        .map(label_resource)
        .collect();
    Document::new(card_resource(card)).with_included(included)
}

pub fn card_collection(cards: &[Card]) -> Document<Vec<Resource<CardAttributes>>> {
    Document::new(cards.iter().map(card_resource).collect())
}

pub fn user_document(user: &User, labels: &[Label]) -> Document<Resource<UserAttributes>> {
    Document::new(user_resource(user, labels))
        .with_included(labels.iter().map(label_resource).collect())
}

/// An integer that may arrive as a JSON number or as a numeric string.
#[derive(Deserialize, Clone, Debug)]
#[serde(untagged)]
pub enum LenientInt {
    Number(i64),
    Text(String),
}

impl LenientInt {
    pub fn to_i32(&self) -> Option<i32> {
        match self {
            LenientInt::Number(n) => i32::try_from(*n).ok(),
            LenientInt::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Incoming `{"data": {...}}` document. `type`, `id` and unknown members are ignored.
#[derive(Deserialize, Debug)]
#[serde(bound(deserialize = "A: Deserialize<'de> + Default"))]
pub struct Payload<A> {
    pub data: ResourcePayload<A>,
}

#[derive(Deserialize, Debug)]
#[serde(bound(deserialize = "A: Deserialize<'de> + Default"))]
pub struct ResourcePayload<A> {
    #[serde(default)]
    pub attributes: A,
    #[serde(default)]
    pub relationships: RelationshipsPayload,
}

/// Only `labels` is read. A `user` relationship is accepted and ignored, the owner is always the
/// authenticated user.
#[derive(Deserialize, Default, Debug)]
pub struct RelationshipsPayload {
    pub labels: Option<ToManyPayload>,
}

#[derive(Deserialize, Debug)]
pub struct ToManyPayload {
    pub data: Vec<IdentifierPayload>,
}

#[derive(Deserialize, Debug)]
pub struct IdentifierPayload {
    pub id: LenientInt,
}

impl ToManyPayload {
    /// Returns the referenced ids, or `None` if any of them is not an integer.
    pub fn ids(&self) -> Option<Vec<i32>> {
        self.data.iter().map(|identifier| identifier.id.to_i32()).collect()
    }
}

#[derive(Deserialize, Default, Debug)]
#[serde(rename_all = "kebab-case")]
pub struct CardAttributesPayload {
    pub side_a: Option<String>,
    pub side_b: Option<String>,
    pub proficiency_level: Option<LenientInt>,
}

#[derive(Deserialize, Default, Debug)]
pub struct LabelAttributesPayload {
    pub name: Option<String>,
}
