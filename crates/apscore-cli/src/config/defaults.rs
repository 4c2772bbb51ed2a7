use std::path::{Path, PathBuf};

/// File names the reference artifacts carry inside the artifacts directory.
pub struct DefaultsConfig {
    pub artifacts_dir: PathBuf,
    pub classifier: &'static str,
    pub strain_table: &'static str,
    pub gram_table: &'static str,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            artifacts_dir: PathBuf::from("checkpoints"),
            classifier: "MolE-XGBoost.json",
            strain_table: "maier_screening_results.tsv.gz",
            gram_table: "strain_info_SF2.xlsx",
        }
    }
}

impl DefaultsConfig {
    /// The embedding model lives directly in the artifacts directory.
    pub fn embedding_model(&self, root: &Path) -> PathBuf {
        root.to_path_buf()
    }

    pub fn classifier(&self, root: &Path) -> PathBuf {
        root.join(self.classifier)
    }

    pub fn strain_table(&self, root: &Path) -> PathBuf {
        root.join(self.strain_table)
    }

    pub fn gram_table(&self, root: &Path) -> PathBuf {
        root.join(self.gram_table)
    }
}
