//! Harvester service: plots and plot directories.

use serde_json::json;
use types::{service_names, HarvesterConfig, PlotListing};

use crate::{ProxyError, Result};

crate::define_service_proxy!(
    /// Proxy for the harvester service.
    HarvesterProxy,
    service_names::HARVESTER
);

fn check_path(path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(ProxyError::InvalidArgument("path must not be empty".to_string()));
    }
    Ok(())
}

impl HarvesterProxy {
    /// Loaded plots and the files that failed to load.
    pub async fn get_plots(&self) -> Result<PlotListing> {
        self.proxy.send_as("get_plots", json!({})).await
    }

    /// Rescans the plot directories.
    pub async fn refresh_plots(&self) -> Result<()> {
        self.proxy.send_ok("refresh_plots", json!({})).await
    }

    /// Deletes a plot file from disk.
    pub async fn delete_plot(&self, filename: &str) -> Result<()> {
        check_path(filename)?;
        self.proxy.send_ok("delete_plot", json!({ "filename": filename })).await
    }

    /// Adds a directory to scan for plots.
    pub async fn add_plot_directory(&self, dirname: &str) -> Result<()> {
        check_path(dirname)?;
        self.proxy.send_ok("add_plot_directory", json!({ "dirname": dirname })).await
    }

    /// Directories scanned for plots.
    pub async fn get_plot_directories(&self) -> Result<Vec<String>> {
        self.proxy.send_for("get_plot_directories", json!({}), "directories").await
    }

    /// Stops scanning a directory.
    pub async fn remove_plot_directory(&self, dirname: &str) -> Result<()> {
        check_path(dirname)?;
        self.proxy.send_ok("remove_plot_directory", json!({ "dirname": dirname })).await
    }

    /// Plot loading settings.
    pub async fn get_harvester_config(&self) -> Result<HarvesterConfig> {
        self.proxy.send_as("get_harvester_config", json!({})).await
    }
}
