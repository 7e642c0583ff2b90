//! Discovery and workspace integration tests.

#[cfg(test)]
mod tests {
    use crate::{catalog, cleanup_workspace, create_test_workspace};

    #[tokio::test]
    #[ignore = "requires running GeoServer"]
    async fn test_should_report_server_version() {
        let catalog = catalog();
        let version = catalog.version().await.expect("version");
        assert!(!version.is_empty());
    }

    #[tokio::test]
    #[ignore = "requires running GeoServer"]
    async fn test_should_create_and_find_workspace() {
        let catalog = catalog();
        let name = create_test_workspace(&catalog, "ws").await;

        let found = catalog.workspace(&name).await.expect("lookup");
        assert_eq!(found.map(|w| w.name).as_deref(), Some(name.as_str()));

        cleanup_workspace(&catalog, &name).await;
        let found = catalog.workspace(&name).await.expect("lookup");
        assert!(found.is_none(), "workspace should be gone after delete");
    }

    #[tokio::test]
    #[ignore = "requires running GeoServer"]
    async fn test_should_list_global_styles() {
        let catalog = catalog();
        let styles = catalog.styles(None).await.expect("styles");
        assert!(
            styles.iter().any(|s| s.name == "raster" && s.workspace.is_none()),
            "stock GeoServer ships a global `raster` style"
        );
    }

    #[tokio::test]
    #[ignore = "requires running GeoServer"]
    async fn test_should_return_none_for_unknown_layer() {
        let catalog = catalog();
        let layer = catalog.layer("no_such_layer_anywhere").await.expect("lookup");
        assert!(layer.is_none());
    }

    #[tokio::test]
    #[ignore = "requires running GeoServer"]
    async fn test_should_have_no_stores_in_new_workspace() {
        let catalog = catalog();
        let name = create_test_workspace(&catalog, "stores").await;

        let stores = catalog.coverage_stores(&name).await.expect("stores");
        assert!(stores.is_empty());

        cleanup_workspace(&catalog, &name).await;
    }
}
