//! The table of published endpoints.
//!
//! Each entry ties a resource kind and schema version to a fixed request path
//! and the [`DecodeStrategy`] its body needs. Paths carry their `limit` query
//! verbatim.

use crate::decode::DecodeStrategy;
use crate::metadata::RequestMetadata;
use http::header::ACCEPT;
use http::Method;
use std::fmt;

/// Resource kinds served by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Users,
    Items,
}

impl Resource {
    pub fn as_str(self) -> &'static str {
        match self {
            Resource::Users => "users",
            Resource::Items => "items",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One published endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    UsersV1,
    UsersV2,
    UsersV3,
    UsersV4,
    ItemsV1,
    /// Same path as [`Endpoint::ItemsV1`], served in the legacy format.
    ItemsV1Legacy,
    ItemsV2,
}

/// Where an endpoint lives and how its body is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub endpoint: Endpoint,
    pub resource: Resource,
    pub version: u8,
    /// Path and query, relative to the client's base URL.
    pub path: &'static str,
    pub strategy: DecodeStrategy,
}

// Indexed by `Endpoint as usize`.
static ROUTES: [Route; 7] = [
    Route {
        endpoint: Endpoint::UsersV1,
        resource: Resource::Users,
        version: 1,
        path: "/api/v1/users",
        strategy: DecodeStrategy::Plain,
    },
    Route {
        endpoint: Endpoint::UsersV2,
        resource: Resource::Users,
        version: 2,
        path: "/api/v2/users",
        strategy: DecodeStrategy::Plain,
    },
    Route {
        endpoint: Endpoint::UsersV3,
        resource: Resource::Users,
        version: 3,
        path: "/api/v3/users",
        strategy: DecodeStrategy::Plain,
    },
    Route {
        endpoint: Endpoint::UsersV4,
        resource: Resource::Users,
        version: 4,
        path: "/api/v4/users",
        strategy: DecodeStrategy::CollectionAware,
    },
    Route {
        endpoint: Endpoint::ItemsV1,
        resource: Resource::Items,
        version: 1,
        path: "/api/v1/items?limit=0,5",
        strategy: DecodeStrategy::Plain,
    },
    Route {
        endpoint: Endpoint::ItemsV1Legacy,
        resource: Resource::Items,
        version: 1,
        path: "/api/v1/items?limit=0,5",
        strategy: DecodeStrategy::Legacy,
    },
    Route {
        endpoint: Endpoint::ItemsV2,
        resource: Resource::Items,
        version: 2,
        path: "/api/v2/items?limit=0,10",
        strategy: DecodeStrategy::Plain,
    },
];

impl Endpoint {
    pub const ALL: [Endpoint; 7] = [
        Endpoint::UsersV1,
        Endpoint::UsersV2,
        Endpoint::UsersV3,
        Endpoint::UsersV4,
        Endpoint::ItemsV1,
        Endpoint::ItemsV1Legacy,
        Endpoint::ItemsV2,
    ];

    /// Finds the JSON endpoint for a resource version.
    ///
    /// The legacy variant is never returned; ask for
    /// [`Endpoint::ItemsV1Legacy`] explicitly.
    ///
    /// # Examples
    ///
    /// ```
    /// use demo_api_client::{Endpoint, Resource};
    ///
    /// assert_eq!(Endpoint::lookup(Resource::Users, 4), Some(Endpoint::UsersV4));
    /// assert_eq!(Endpoint::lookup(Resource::Items, 3), None);
    /// ```
    pub fn lookup(resource: Resource, version: u8) -> Option<Endpoint> {
        ROUTES
            .iter()
            .find(|r| {
                r.resource == resource
                    && r.version == version
                    && r.strategy != DecodeStrategy::Legacy
            })
            .map(|r| r.endpoint)
    }

    pub fn route(self) -> &'static Route {
        &ROUTES[self as usize]
    }

    pub fn path(self) -> &'static str {
        self.route().path
    }

    pub fn strategy(self) -> DecodeStrategy {
        self.route().strategy
    }

    /// Builds the GET request for this endpoint.
    pub fn request(self) -> RequestMetadata {
        let route = self.route();
        let metadata = RequestMetadata::new(Method::GET, route.path);
        match route.strategy.accept() {
            Some(media_type) => metadata.with_static_header(ACCEPT, media_type),
            None => metadata,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let route = self.route();
        write!(f, "{} v{}", route.resource, route.version)?;
        if route.strategy == DecodeStrategy::Legacy {
            f.write_str(" (legacy)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_indexed_by_endpoint() {
        for endpoint in Endpoint::ALL {
            assert_eq!(endpoint.route().endpoint, endpoint);
        }
    }

    #[test]
    fn test_lookup() {
        assert_eq!(Endpoint::lookup(Resource::Users, 1), Some(Endpoint::UsersV1));
        assert_eq!(Endpoint::lookup(Resource::Users, 3), Some(Endpoint::UsersV3));
        assert_eq!(Endpoint::lookup(Resource::Items, 1), Some(Endpoint::ItemsV1));
        assert_eq!(Endpoint::lookup(Resource::Items, 2), Some(Endpoint::ItemsV2));
        assert_eq!(Endpoint::lookup(Resource::Users, 0), None);
        assert_eq!(Endpoint::lookup(Resource::Users, 5), None);
    }

    #[test]
    fn test_strategies() {
        assert_eq!(Endpoint::UsersV3.strategy(), DecodeStrategy::Plain);
        assert_eq!(Endpoint::UsersV4.strategy(), DecodeStrategy::CollectionAware);
        assert_eq!(Endpoint::ItemsV1Legacy.strategy(), DecodeStrategy::Legacy);
    }

    #[test]
    fn test_items_paths_carry_limit() {
        assert_eq!(Endpoint::ItemsV1.path(), "/api/v1/items?limit=0,5");
        assert_eq!(Endpoint::ItemsV1Legacy.path(), "/api/v1/items?limit=0,5");
        assert_eq!(Endpoint::ItemsV2.path(), "/api/v2/items?limit=0,10");
    }

    #[test]
    fn test_request_metadata() {
        let request = Endpoint::ItemsV1Legacy.request();
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.path, "/api/v1/items");
        assert_eq!(request.query.as_deref(), Some("limit=0,5"));
        assert_eq!(request.headers.get(ACCEPT).unwrap(), "application/vnd.demo.dto");

        let request = Endpoint::UsersV2.request();
        assert_eq!(request.path, "/api/v2/users");
        assert!(request.query.is_none());
        assert!(request.headers.is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(Endpoint::UsersV4.to_string(), "users v4");
        assert_eq!(Endpoint::ItemsV1Legacy.to_string(), "items v1 (legacy)");
    }
}
