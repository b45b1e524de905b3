//! Wire shapes of every published resource version.
//!
//! Field names on the wire are camelCase. All fields are required; unknown
//! extra fields are ignored so servers can grow a schema without breaking
//! older clients.

use crate::endpoint::{Endpoint, Resource};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A DTO that has a JSON endpoint of its own.
///
/// Used by [`Client::fetch`](crate::Client::fetch) to resolve where a type
/// comes from.
pub trait Dto: DeserializeOwned {
    /// The JSON endpoint serving this DTO.
    const ENDPOINT: Endpoint;
}

/// First published user shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserV1 {
    pub id: u64,
    pub name: String,
}

/// Splits the display name into first and last name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserV2 {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
}

/// Adds contact email and creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserV3 {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Embeds the user's addresses and roles.
///
/// This is the only shape carrying nested collections, so it needs
/// [`DecodeStrategy::CollectionAware`](crate::DecodeStrategy::CollectionAware).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserV4 {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub addresses: Vec<Address>,
    pub roles: Vec<Role>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub name: String,
    pub granted_at: DateTime<Utc>,
}

/// First published item shape. Also what the legacy payload carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemV1 {
    pub id: u64,
    pub name: String,
    pub price: f64,
}

/// Adds currency and stock state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemV2 {
    pub id: u64,
    pub name: String,
    pub price: f64,
    pub currency: String,
    pub in_stock: bool,
}

impl Dto for UserV1 {
    const ENDPOINT: Endpoint = Endpoint::UsersV1;
}

impl Dto for UserV2 {
    const ENDPOINT: Endpoint = Endpoint::UsersV2;
}

impl Dto for UserV3 {
    const ENDPOINT: Endpoint = Endpoint::UsersV3;
}

impl Dto for UserV4 {
    const ENDPOINT: Endpoint = Endpoint::UsersV4;
}

impl Dto for ItemV1 {
    const ENDPOINT: Endpoint = Endpoint::ItemsV1;
}

impl Dto for ItemV2 {
    const ENDPOINT: Endpoint = Endpoint::ItemsV2;
}

/// Records of any version, as returned by
/// [`Client::fetch_records`](crate::Client::fetch_records).
#[derive(Debug, Clone, PartialEq)]
pub enum Records {
    UsersV1(Vec<UserV1>),
    UsersV2(Vec<UserV2>),
    UsersV3(Vec<UserV3>),
    UsersV4(Vec<UserV4>),
    ItemsV1(Vec<ItemV1>),
    ItemsV2(Vec<ItemV2>),
}

impl Records {
    pub fn len(&self) -> usize {
        match self {
            Records::UsersV1(v) => v.len(),
            Records::UsersV2(v) => v.len(),
            Records::UsersV3(v) => v.len(),
            Records::UsersV4(v) => v.len(),
            Records::ItemsV1(v) => v.len(),
            Records::ItemsV2(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn resource(&self) -> Resource {
        match self {
            Records::UsersV1(_)
            | Records::UsersV2(_)
            | Records::UsersV3(_)
            | Records::UsersV4(_) => Resource::Users,
            Records::ItemsV1(_) | Records::ItemsV2(_) => Resource::Items,
        }
    }

    pub fn version(&self) -> u8 {
        match self {
            Records::UsersV1(_) | Records::ItemsV1(_) => 1,
            Records::UsersV2(_) | Records::ItemsV2(_) => 2,
            Records::UsersV3(_) => 3,
            Records::UsersV4(_) => 4,
        }
    }
}
