//! The GeoServer catalog: discovery over cached GETs plus the mutating calls
//! needed to publish a coverage view.
//!
//! Every GET goes through a [`ResponseCache`] keyed by URL. Every other
//! request clears that cache, whatever its outcome.

use gscoverage_model::{CoverageDocument, LayerStyle, StoreDescriptor, WorkspaceDescriptor};
use gscoverage_xml::{
    AboutInfo, CatalogEntry, CatalogListing, GsDeserialize, LayerInfo, SerializeOptions,
    coverage_to_xml, from_xml, to_xml,
};
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::cache::ResponseCache;
use crate::config::GeoServerConfig;
use crate::error::{GeoServerError, GeoServerResult};
use crate::transport::{HttpRequest, HttpResponse, Method, ReqwestTransport, Transport};
use crate::url::{append_query, build_url};

/// Version reported for servers too old to expose `about/version`.
pub const FALLBACK_VERSION: &str = "2.2.x";

/// Statuses accepted by saves.
const SAVE_OK: &[u16] = &[200, 201];
/// Statuses accepted when creating workspaces.
const CREATE_OK: &[u16] = &[200, 201, 202];
/// Statuses accepted by deletes.
const DELETE_OK: &[u16] = &[200];

/// Client for one GeoServer REST endpoint.
#[derive(Debug)]
pub struct Catalog<T = ReqwestTransport> {
    config: GeoServerConfig,
    transport: T,
    cache: ResponseCache,
    version: Mutex<Option<String>>,
}

impl Catalog<ReqwestTransport> {
    /// A catalog talking HTTP through `reqwest`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: GeoServerConfig) -> GeoServerResult<Self> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::new(config, transport))
    }
}

impl<T: Transport> Catalog<T> {
    /// A catalog over an arbitrary transport.
    pub fn new(config: GeoServerConfig, transport: T) -> Self {
        let cache = ResponseCache::new(config.cache_ttl());
        Self {
            config,
            transport,
            cache,
            version: Mutex::new(None),
        }
    }

    /// The configuration this catalog was built with.
    pub fn config(&self) -> &GeoServerConfig {
        &self.config
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// URL of a REST resource below the service root.
    #[must_use]
    pub fn url<S: AsRef<str>>(&self, segments: &[S], query: &[(&str, &str)]) -> String {
        build_url(&self.config.service_url, segments, query)
    }

    // -----------------------------------------------------------------------
    // Request plumbing
    // -----------------------------------------------------------------------

    /// GET a resource body, serving it from the cache while fresh.
    ///
    /// # Errors
    ///
    /// Returns [`GeoServerError::Transport`] for any status other than 200.
    pub async fn get_xml(&self, url: &str) -> GeoServerResult<Vec<u8>> {
        if let Some(body) = self.cache.get(url) {
            debug!(url, "cache hit");
            return Ok(body);
        }

        let request = HttpRequest::get(url);
        let response = self.transport.send(request).await?;
        if response.status != 200 {
            return Err(transport_error(Method::Get, url, &response));
        }
        self.cache.insert(url, response.body.clone());
        Ok(response.body)
    }

    async fn get<R: GsDeserialize>(&self, url: &str) -> GeoServerResult<R> {
        let body = self.get_xml(url).await?;
        Ok(from_xml(&body)?)
    }

    /// Send a mutating request, clear the cache, and check the status.
    async fn mutate(
        &self,
        request: HttpRequest,
        accepted: &[u16],
    ) -> GeoServerResult<HttpResponse> {
        let method = request.method;
        let url = request.url.clone();
        let result = self.transport.send(request).await;
        self.cache.clear();

        let response = result?;
        if !accepted.contains(&response.status) {
            return Err(transport_error(method, &url, &response));
        }
        Ok(response)
    }

    // -----------------------------------------------------------------------
    // Discovery
    // -----------------------------------------------------------------------

    /// Server version from `about/version`, or [`FALLBACK_VERSION`] when the
    /// server does not report one. Memoized.
    ///
    /// # Errors
    ///
    /// Returns an error only if the server cannot be reached.
    pub async fn version(&self) -> GeoServerResult<String> {
        if let Some(version) = self.version.lock().clone() {
            return Ok(version);
        }

        let url = self.url(&["about", "version.xml"], &[]);
        let version = match self.get::<AboutInfo>(&url).await {
            Ok(about) => about
                .geoserver_version()
                .map_or_else(|| FALLBACK_VERSION.to_owned(), str::to_owned),
            Err(GeoServerError::Transport { .. } | GeoServerError::Xml(_)) => {
                FALLBACK_VERSION.to_owned()
            }
            Err(e) => return Err(e),
        };
        *self.version.lock() = Some(version.clone());
        Ok(version)
    }

    /// Workspaces, restricted to `names` unless it is empty.
    pub async fn workspaces(&self, names: &[&str]) -> GeoServerResult<Vec<CatalogEntry>> {
        let url = self.url(&["workspaces.xml"], &[]);
        let listing: CatalogListing = self.get(&url).await?;
        Ok(listing.filter_names(names))
    }

    /// The workspace named `name`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`GeoServerError::Ambiguous`] if several workspaces match.
    pub async fn workspace(&self, name: &str) -> GeoServerResult<Option<CatalogEntry>> {
        unique("workspace", name, self.workspaces(&[name]).await?)
    }

    /// Coverage stores of a workspace.
    pub async fn coverage_stores(&self, workspace: &str) -> GeoServerResult<Vec<CatalogEntry>> {
        let url = self.url(&["workspaces", workspace, "coveragestores.xml"], &[]);
        let listing: CatalogListing = self.get(&url).await?;
        Ok(listing
            .entries
            .into_iter()
            .map(|mut e| {
                e.workspace = Some(workspace.to_owned());
                e
            })
            .collect())
    }

    /// The coverage store `name` in `workspace`, if any.
    pub async fn store(&self, name: &str, workspace: &str) -> GeoServerResult<Option<CatalogEntry>> {
        let stores = self
            .coverage_stores(workspace)
            .await?
            .into_iter()
            .filter(|s| s.name == name)
            .collect();
        unique("coverage store", name, stores)
    }

    /// The layer named `name`. A failed lookup of any kind yields `None`.
    pub async fn layer(&self, name: &str) -> GeoServerResult<Option<LayerInfo>> {
        let url = self.url(&["layers", format!("{name}.xml").as_str()], &[]);
        match self.get::<LayerInfo>(&url).await {
            Ok(layer) => Ok(Some(layer)),
            Err(GeoServerError::Transport { status, .. }) => {
                debug!(layer = name, status, "layer lookup failed");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// All layers.
    pub async fn layers(&self) -> GeoServerResult<Vec<CatalogEntry>> {
        let url = self.url(&["layers.xml"], &[]);
        let listing: CatalogListing = self.get(&url).await?;
        Ok(listing.entries)
    }

    /// Styles. Without a workspace this is the global styles followed by the
    /// styles of every workspace; with one, only that workspace's styles.
    pub async fn styles(&self, workspace: Option<&str>) -> GeoServerResult<Vec<CatalogEntry>> {
        let mut styles = Vec::new();
        let workspaces = match workspace {
            Some(ws) => vec![ws.to_owned()],
            None => {
                let url = self.url(&["styles.xml"], &[]);
                let global: CatalogListing = self.get(&url).await?;
                styles.extend(global.entries);
                self.workspaces(&[])
                    .await?
                    .into_iter()
                    .map(|w| w.name)
                    .collect()
            }
        };

        for ws in workspaces {
            let url = self.url(&["workspaces", ws.as_str(), "styles.xml"], &[]);
            match self.get::<CatalogListing>(&url).await {
                Ok(listing) => styles.extend(listing.entries.into_iter().map(|mut e| {
                    e.workspace = Some(ws.clone());
                    e
                })),
                Err(GeoServerError::Transport { ref body, .. }) if is_missing_workspace(body, &ws) => {
                    debug!(workspace = %ws, "skipping styles of missing workspace");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(styles)
    }

    /// The style `name`, searched globally and in every workspace unless a
    /// workspace is given.
    ///
    /// # Errors
    ///
    /// Returns [`GeoServerError::Ambiguous`] if several styles match.
    pub async fn style(
        &self,
        name: &str,
        workspace: Option<&str>,
    ) -> GeoServerResult<Option<CatalogEntry>> {
        let styles = self
            .styles(workspace)
            .await?
            .into_iter()
            .filter(|s| s.name == name)
            .collect();
        unique("style", name, styles)
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Create a workspace and its namespace.
    pub async fn create_workspace(
        &self,
        name: &str,
        uri: &str,
    ) -> GeoServerResult<Option<CatalogEntry>> {
        let body = to_xml(&WorkspaceDescriptor::new(name, uri))?;
        let url = self.url(&["namespaces"], &[]);
        self.mutate(HttpRequest::post(url, body), CREATE_OK).await?;
        info!(workspace = name, "workspace created");
        self.workspace(name).await
    }

    /// Register a NetCDF coverage store.
    ///
    /// # Errors
    ///
    /// Returns [`GeoServerError::InvalidArgument`] for non-NetCDF stores and
    /// [`GeoServerError::Conflict`] if the store already exists.
    pub async fn create_coverage_store(&self, store: &StoreDescriptor) -> GeoServerResult<()> {
        if !store.store_type.eq_ignore_ascii_case(StoreDescriptor::NETCDF) {
            return Err(GeoServerError::InvalidArgument(format!(
                "unsupported coverage store type `{}`",
                store.store_type
            )));
        }
        if self.store(&store.name, &store.workspace).await?.is_some() {
            return Err(GeoServerError::Conflict {
                kind: "coverage store",
                name: store.name.clone(),
            });
        }

        let body = to_xml(store)?;
        let url = self.url(
            &["workspaces", store.workspace.as_str(), "coveragestores"],
            &[("name", store.name.as_str())],
        );
        self.mutate(HttpRequest::post(url, body), SAVE_OK).await?;
        info!(workspace = %store.workspace, store = %store.name, "coverage store created");
        Ok(())
    }

    /// Publish a coverage into an existing store.
    ///
    /// The document is serialized first, so a malformed descriptor fails
    /// before any request is made.
    ///
    /// # Errors
    ///
    /// Returns [`GeoServerError::Conflict`] if a layer of the same name exists,
    /// [`GeoServerError::NotFound`] if the store does not.
    pub async fn publish_coverage(
        &self,
        workspace: &str,
        store: &str,
        document: &CoverageDocument,
        options: &SerializeOptions,
    ) -> GeoServerResult<()> {
        let body = coverage_to_xml(document, options)?;
        let name = document.name().unwrap_or_default();

        if self.layer(name).await?.is_some() {
            return Err(GeoServerError::Conflict {
                kind: "layer",
                name: name.to_owned(),
            });
        }
        if self.store(store, workspace).await?.is_none() {
            return Err(GeoServerError::NotFound {
                kind: "coverage store",
                name: format!("{workspace}:{store}"),
            });
        }

        let url = self.url(&["workspaces", workspace, "coveragestores", store, "coverages"], &[]);
        self.mutate(HttpRequest::post(url, body), SAVE_OK).await?;
        info!(workspace, store, coverage = name, "coverage published");
        Ok(())
    }

    /// Make `style` the default style of `layer`. A `ws:style` name refers to
    /// a workspace style.
    ///
    /// # Errors
    ///
    /// Returns [`GeoServerError::NotFound`] if the style does not exist.
    pub async fn bind_layer_style(&self, layer: &str, style: &str) -> GeoServerResult<()> {
        let binding = LayerStyle::new(style);
        if self
            .style(&binding.style, binding.workspace.as_deref())
            .await?
            .is_none()
        {
            return Err(GeoServerError::NotFound {
                kind: "style",
                name: style.to_owned(),
            });
        }

        let body = to_xml(&binding)?;
        let url = self.url(&["layers", layer], &[]);
        self.mutate(HttpRequest::put(url, body), SAVE_OK).await?;
        info!(layer, style, "default style bound");
        Ok(())
    }

    /// Delete the resource at `url`. `purge` removes files on disk (e.g.
    /// `all` for a style's SLD); `recurse` removes dependent resources.
    pub async fn delete(&self, url: &str, purge: Option<&str>, recurse: bool) -> GeoServerResult<()> {
        let mut query = Vec::new();
        if let Some(purge) = purge {
            query.push(("purge", purge));
        }
        if recurse {
            query.push(("recurse", "true"));
        }
        let url = append_query(url, &query);
        self.mutate(HttpRequest::delete(url), DELETE_OK).await?;
        Ok(())
    }

    /// Reload the server configuration from disk.
    pub async fn reload(&self) -> GeoServerResult<()> {
        let url = self.url(&["reload"], &[]);
        self.mutate(HttpRequest::post(url, Vec::new()), SAVE_OK).await?;
        Ok(())
    }

    /// Reset the server's resource caches.
    pub async fn reset(&self) -> GeoServerResult<()> {
        let url = self.url(&["reset"], &[]);
        self.mutate(HttpRequest::post(url, Vec::new()), SAVE_OK).await?;
        Ok(())
    }
}

fn transport_error(method: Method, url: &str, response: &HttpResponse) -> GeoServerError {
    GeoServerError::Transport {
        method,
        url: url.to_owned(),
        status: response.status,
        body: response.text().into_owned(),
    }
}

fn is_missing_workspace(body: &str, workspace: &str) -> bool {
    let body = body.to_lowercase();
    body.contains("no such workspace")
        || body.contains(&format!("workspace {} not found", workspace.to_lowercase()))
}

/// At most one item, or [`GeoServerError::Ambiguous`].
fn unique<I>(kind: &'static str, name: &str, mut items: Vec<I>) -> GeoServerResult<Option<I>> {
    match items.len() {
        0 | 1 => Ok(items.pop()),
        _ => Err(GeoServerError::Ambiguous {
            kind,
            name: name.to_owned(),
        }),
    }
}
