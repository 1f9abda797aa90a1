//! Path arithmetic shared by planning and running.

use std::path::PathBuf;

use crate::config::SplitConfig;

use super::TaskId;

/// Where descriptors live, where extracts go, and what root extracts read.
#[derive(Debug, Clone)]
pub struct Layout {
    pub catalog_dir: PathBuf,
    pub boundary_extension: String,
    pub output_dir: PathBuf,
    pub output_extension: String,
    pub master_dataset: PathBuf,
}

impl Layout {
    pub fn from_config(cfg: &SplitConfig) -> Self {
        Self {
            catalog_dir: cfg.catalog_dir.clone(),
            boundary_extension: cfg.boundary_extension.clone(),
            output_dir: cfg.output_dir.clone(),
            output_extension: cfg.output_extension.clone(),
            master_dataset: cfg.master_dataset.clone(),
        }
    }

    /// `<output_dir>/<id><output_extension>`
    pub fn output_path(&self, id: &TaskId) -> PathBuf {
        self.output_dir
            .join(format!("{}{}", id.as_str(), self.output_extension))
    }

    /// `<catalog_dir>/<id><boundary_extension>`
    pub fn boundary_path(&self, id: &TaskId) -> PathBuf {
        self.catalog_dir
            .join(format!("{}{}", id.as_str(), self.boundary_extension))
    }

    /// Dataset read by a batch depending on `parent` (master dataset when `None`).
    pub fn source_for(&self, parent: Option<&TaskId>) -> PathBuf {
        match parent {
            Some(id) => self.output_path(id),
            None => self.master_dataset.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> Layout {
        Layout::from_config(&SplitConfig {
            catalog_dir: PathBuf::from("clipbounds"),
            output_dir: PathBuf::from("/out"),
            master_dataset: PathBuf::from("/data/planet.osm.pbf"),
            ..SplitConfig::default()
        })
    }

    #[test]
    fn paths_follow_identifier() {
        let l = layout();
        let id = TaskId::new("europe/germany");
        assert_eq!(
            l.output_path(&id),
            PathBuf::from("/out/europe/germany.osm.pbf")
        );
        assert_eq!(
            l.boundary_path(&id),
            PathBuf::from("clipbounds/europe/germany.poly")
        );
    }

    #[test]
    fn source_is_master_or_parent_output() {
        let l = layout();
        assert_eq!(l.source_for(None), PathBuf::from("/data/planet.osm.pbf"));
        assert_eq!(
            l.source_for(Some(&TaskId::new("europe"))),
            PathBuf::from("/out/europe.osm.pbf")
        );
    }
}
