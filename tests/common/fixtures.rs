//! Fake extraction tool and configuration fixtures

use punk_records::{Config, ExtractionTool, Language};
use std::path::{Path, PathBuf};

const FAKE_TOOL: &str = include_str!("../fixtures/fake_vegapull.sh");

/// A pack listing entry as vegapull prints it
pub fn pack_json(id: &str, raw_title: &str) -> String {
    format!(
        r#"{{"id":"{id}","raw_title":"{raw_title}","title_parts":{{"prefix":null,"title":"{raw_title}","label":null}}}}"#
    )
}

/// Fake vegapull script parameters
#[derive(Default)]
pub struct FakeTool {
    pub packs: Vec<(String, String)>,
    pub failing_cards: Vec<String>,
    pub failing_images: Vec<String>,
}

impl FakeTool {
    /// A tool listing the given pack ids, titled "Pack <id>"
    pub fn with_packs(ids: &[&str]) -> Self {
        Self {
            packs: ids
                .iter()
                .map(|id| (id.to_string(), format!("Pack {id}")))
                .collect(),
            ..Default::default()
        }
    }

    pub fn fail_cards(mut self, id: &str) -> Self {
        self.failing_cards.push(id.to_string());
        self
    }

    pub fn fail_images(mut self, id: &str) -> Self {
        self.failing_images.push(id.to_string());
        self
    }

    /// Write the script into `dir`, returning its path
    pub fn write(&self, dir: &Path) -> PathBuf {
        let listing: Vec<String> = self
            .packs
            .iter()
            .map(|(id, title)| pack_json(id, title))
            .collect();
        let content = FAKE_TOOL
            .replace("@PACKS@", &format!("[{}]", listing.join(",")))
            .replace("@FAIL_CARDS@", &self.failing_cards.join(" "))
            .replace("@FAIL_IMAGES@", &self.failing_images.join(" "));
        let path = dir.join("fake_vegapull.sh");
        std::fs::write(&path, content).unwrap();
        path
    }

    /// Write the script and wrap it in an [`ExtractionTool`]
    pub fn install(&self, dir: &Path) -> ExtractionTool {
        let script = self.write(dir);
        ExtractionTool::new("/bin/sh", Language::English)
            .with_launcher_args(vec![script.display().to_string()])
    }

    /// Write the script and build a config running it against `data_dir`
    pub fn config(&self, dir: &Path, data_dir: &Path) -> Config {
        let script = self.write(dir);
        let mut config = Config {
            data_dir: Some(data_dir.to_path_buf()),
            ..Default::default()
        };
        config.tool.vegapull_path = PathBuf::from("/bin/sh");
        config.tool.launcher_args = vec![script.display().to_string()];
        config
    }
}

/// Write `config` as TOML into `dir/punk-records.toml`
pub fn write_config_file(dir: &Path, config: &Config) -> PathBuf {
    let path = dir.join("punk-records.toml");
    std::fs::write(&path, toml::to_string(config).unwrap()).unwrap();
    path
}
