//! Smaller REST bodies used alongside coverages: stores, layer styles and
//! workspaces.

use serde::{Deserialize, Serialize};

/// A `<coverageStore>` body registering a raster file with GeoServer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreDescriptor {
    /// Store name.
    pub name: String,
    /// Owning workspace.
    pub workspace: String,
    /// Store type, e.g. `NetCDF` or `GeoTIFF`.
    #[serde(rename = "type")]
    pub store_type: String,
    /// `file:` URL relative to the GeoServer data directory, or absolute.
    pub url: String,
    /// Whether the store is enabled.
    pub enabled: bool,
}

impl StoreDescriptor {
    /// Store type name of NetCDF stores.
    pub const NETCDF: &'static str = "NetCDF";

    /// A store of the given type reading `path`.
    ///
    /// `path` is prefixed with `file:` unless it already is.
    pub fn new(
        workspace: impl Into<String>,
        name: impl Into<String>,
        store_type: impl Into<String>,
        path: &str,
    ) -> Self {
        let url = if path.starts_with("file:") {
            path.to_owned()
        } else {
            format!("file:{path}")
        };
        Self {
            name: name.into(),
            workspace: workspace.into(),
            store_type: store_type.into(),
            url,
            enabled: true,
        }
    }

    /// A NetCDF store reading `path`.
    pub fn netcdf(workspace: impl Into<String>, name: impl Into<String>, path: &str) -> Self {
        Self::new(workspace, name, Self::NETCDF, path)
    }
}

/// A `<layer>` body that sets a layer's default style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerStyle {
    /// Style name without its workspace prefix.
    pub style: String,
    /// Workspace of a workspace-scoped style.
    pub workspace: Option<String>,
}

impl LayerStyle {
    /// Parse a style name, splitting a `workspace:style` qualified name.
    ///
    /// # Examples
    ///
    /// ```
    /// use gscoverage_model::LayerStyle;
    ///
    /// let style = LayerStyle::new("my_test_2:wind_barbs");
    /// assert_eq!(style.style, "wind_barbs");
    /// assert_eq!(style.workspace.as_deref(), Some("my_test_2"));
    /// ```
    #[must_use]
    pub fn new(name: &str) -> Self {
        match name.split_once(':') {
            Some((ws, style)) => Self {
                style: style.to_owned(),
                workspace: Some(ws.to_owned()),
            },
            None => Self {
                style: name.to_owned(),
                workspace: None,
            },
        }
    }
}

/// A `<namespace>` body creating a workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceDescriptor {
    /// Workspace name.
    pub prefix: String,
    /// Namespace URI.
    pub uri: String,
}

impl WorkspaceDescriptor {
    /// Create a workspace body.
    pub fn new(prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            uri: uri.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_prefix_store_path_with_file_scheme() {
        let store = StoreDescriptor::netcdf("ws", "s", "nmefc/waterwind/a.nc");
        assert_eq!(store.url, "file:nmefc/waterwind/a.nc");
        assert_eq!(store.store_type, "NetCDF");
        assert!(store.enabled);

        let store = StoreDescriptor::netcdf("ws", "s", "file:/data/a.nc");
        assert_eq!(store.url, "file:/data/a.nc");
    }

    #[test]
    fn test_should_keep_unqualified_style_global() {
        let style = LayerStyle::new("raster");
        assert_eq!(style.style, "raster");
        assert!(style.workspace.is_none());
    }
}
