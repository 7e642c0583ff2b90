//! Coverage view publishing integration tests.

#[cfg(test)]
mod tests {
    use gscoverage_core::{CoverageViewPublisher, CoverageViewRequest, GeoServerError};
    use gscoverage_model::StoreDescriptor;

    use crate::{catalog, cleanup_workspace, create_test_workspace, test_name};

    fn netcdf_fixture() -> Option<(String, Vec<String>)> {
        let path = std::env::var("GEOSERVER_NETCDF_PATH").ok()?;
        let bands = std::env::var("GEOSERVER_NETCDF_BANDS")
            .ok()?
            .split(',')
            .map(|b| b.trim().to_owned())
            .filter(|b| !b.is_empty())
            .collect();
        Some((path, bands))
    }

    #[tokio::test]
    #[ignore = "requires running GeoServer and a NetCDF fixture"]
    async fn test_should_publish_coverage_view_and_bind_style() {
        let Some((path, bands)) = netcdf_fixture() else {
            return;
        };
        let catalog = catalog();
        let workspace = create_test_workspace(&catalog, "publish").await;
        let store = test_name("store");
        let layer = test_name("view");

        catalog
            .create_coverage_store(&StoreDescriptor::netcdf(workspace.as_str(), store.as_str(), &path))
            .await
            .expect("create store");

        let request = CoverageViewRequest::builder()
            .workspace(workspace.as_str())
            .store(store.as_str())
            .layer(layer.as_str())
            .bands(bands)
            .style("raster")
            .build();
        CoverageViewPublisher::new(&catalog)
            .publish(&request)
            .await
            .expect("publish");

        let published = catalog.layer(&layer).await.expect("lookup").expect("layer exists");
        assert_eq!(
            published.default_style.map(|s| s.name).as_deref(),
            Some("raster")
        );

        let again = CoverageViewPublisher::new(&catalog).publish(&request).await;
        assert!(matches!(again, Err(GeoServerError::Conflict { kind: "layer", .. })));

        cleanup_workspace(&catalog, &workspace).await;
    }

    #[tokio::test]
    #[ignore = "requires running GeoServer"]
    async fn test_should_refuse_publishing_into_missing_store() {
        let catalog = catalog();
        let workspace = create_test_workspace(&catalog, "nostore").await;

        let request = CoverageViewRequest::builder()
            .workspace(workspace.as_str())
            .store("missing")
            .layer(test_name("view"))
            .bands(vec!["x_wind_10m".to_owned()])
            .build();
        let err = CoverageViewPublisher::new(&catalog)
            .publish(&request)
            .await
            .unwrap_err();
        assert!(matches!(err, GeoServerError::NotFound { .. }));

        cleanup_workspace(&catalog, &workspace).await;
    }
}
