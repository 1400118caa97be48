//! Catalog read API client.
//!
//! Upstream catalog records arrive in several field spellings depending on
//! which backend service produced them. They are normalized to one
//! canonical shape right here at the boundary (serde aliases on the raw
//! records, one adapter per type) so nothing downstream ever probes for
//! shape variants.
//!
//! List responses are cached read-through via `moka` with a configurable
//! TTL.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use souk_core::{BannerId, CategoryId, ProductId, VendorId};

use crate::api::{ApiError, RestClient};
use crate::config::ApiConfig;

// =============================================================================
// Canonical types
// =============================================================================

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub image: Option<String>,
    pub parent: Option<CategoryId>,
}

/// A promotional banner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Banner {
    pub id: BannerId,
    pub image_url: String,
    pub link: Option<String>,
}

/// A product as it appears in listing pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub brand: Option<String>,
    pub image: Option<String>,
    pub vendor_id: VendorId,
    pub vendor_name: String,
    pub category_path: Option<String>,
}

/// One page of product listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductPage {
    pub items: Vec<ProductSummary>,
    pub page: u32,
    pub has_next: bool,
}

// =============================================================================
// Raw upstream shapes
// =============================================================================

#[derive(Debug, Deserialize)]
struct RawCategory {
    #[serde(alias = "category_id")]
    id: CategoryId,
    #[serde(alias = "category_name", alias = "title")]
    name: String,
    #[serde(default, alias = "icon", alias = "image_url")]
    image: Option<String>,
    #[serde(default, alias = "parent_id")]
    parent: Option<CategoryId>,
}

impl From<RawCategory> for Category {
    fn from(raw: RawCategory) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            image: raw.image,
            parent: raw.parent,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawBanner {
    #[serde(alias = "banner_id")]
    id: BannerId,
    #[serde(alias = "image", alias = "banner_image")]
    image_url: String,
    #[serde(default, alias = "target_url", alias = "href")]
    link: Option<String>,
}

impl From<RawBanner> for Banner {
    fn from(raw: RawBanner) -> Self {
        Self {
            id: raw.id,
            image_url: raw.image_url,
            link: raw.link,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawProductSummary {
    #[serde(alias = "product_id")]
    id: ProductId,
    #[serde(alias = "product_name", alias = "title")]
    name: String,
    #[serde(alias = "unit_price", alias = "sale_price")]
    price: Decimal,
    #[serde(default)]
    brand: Option<String>,
    #[serde(default, alias = "thumbnail", alias = "image_url")]
    image: Option<String>,
    #[serde(alias = "shop_id", alias = "seller_id")]
    vendor_id: VendorId,
    #[serde(default, alias = "shop_name", alias = "seller_name")]
    vendor_name: Option<String>,
    #[serde(default, alias = "category", alias = "category_name")]
    category_path: Option<String>,
}

impl From<RawProductSummary> for ProductSummary {
    fn from(raw: RawProductSummary) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            price: raw.price,
            brand: raw.brand,
            image: raw.image,
            vendor_id: raw.vendor_id,
            vendor_name: raw.vendor_name.unwrap_or_default(),
            category_path: raw.category_path,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    #[serde(alias = "items", alias = "results")]
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct RawProductPage {
    #[serde(alias = "items", alias = "results")]
    data: Vec<RawProductSummary>,
    #[serde(default, alias = "page")]
    current_page: Option<u32>,
    #[serde(default, alias = "has_more")]
    has_next: bool,
}

// =============================================================================
// Cache
// =============================================================================

/// Cache key for catalog list responses.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum CacheKey {
    Categories,
    Banners,
    Products { page: u32 },
}

/// Cached value types.
#[derive(Debug, Clone)]
enum CacheValue {
    Categories(Vec<Category>),
    Banners(Vec<Banner>),
    Products(ProductPage),
}

// =============================================================================
// CatalogClient
// =============================================================================

/// Client for the catalog read APIs.
///
/// Categories, banners, and product pages are cached for the configured
/// TTL.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    rest: RestClient,
    cache: Cache<CacheKey, CacheValue>,
}

impl CatalogClient {
    /// Create a new catalog client with the given list-cache TTL.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client fails to build.
    pub fn new(config: &ApiConfig, cache_ttl: Duration) -> Result<Self, ApiError> {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                rest: RestClient::new(config)?,
                cache,
            }),
        })
    }

    /// Fetch all categories (cached).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be
    /// decoded.
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        if let Some(CacheValue::Categories(cached)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            return Ok(cached);
        }

        let raw: ListResponse<RawCategory> = self.inner.rest.get_json("categories").await?;
        let categories: Vec<Category> = raw.data.into_iter().map(Category::from).collect();

        self.inner
            .cache
            .insert(CacheKey::Categories, CacheValue::Categories(categories.clone()))
            .await;
        Ok(categories)
    }

    /// Fetch the active banners (cached).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be
    /// decoded.
    pub async fn banners(&self) -> Result<Vec<Banner>, ApiError> {
        if let Some(CacheValue::Banners(cached)) = self.inner.cache.get(&CacheKey::Banners).await {
            return Ok(cached);
        }

        let raw: ListResponse<RawBanner> = self.inner.rest.get_json("banners").await?;
        let banners: Vec<Banner> = raw.data.into_iter().map(Banner::from).collect();

        self.inner
            .cache
            .insert(CacheKey::Banners, CacheValue::Banners(banners.clone()))
            .await;
        Ok(banners)
    }

    /// Fetch one page of product listings (cached per page).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be
    /// decoded.
    pub async fn products(&self, page: u32) -> Result<ProductPage, ApiError> {
        let key = CacheKey::Products { page };
        if let Some(CacheValue::Products(cached)) = self.inner.cache.get(&key).await {
            return Ok(cached);
        }

        let raw: RawProductPage = self
            .inner
            .rest
            .get_json(&format!("products?page={page}"))
            .await?;
        let result = ProductPage {
            items: raw.data.into_iter().map(ProductSummary::from).collect(),
            page: raw.current_page.unwrap_or(page),
            has_next: raw.has_next,
        };

        self.inner
            .cache
            .insert(key, CacheValue::Products(result.clone()))
            .await;
        Ok(result)
    }
}
