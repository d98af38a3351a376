//! Shared fixture: a throwaway Minecraft server directory.

#![allow(dead_code)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use solder_server::{ContentHash, SourceLayout};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub const FORGE_JAR: &str = "forge-1.12.2-14.23.5.2847-universal.jar";

pub const VERSION_JSON: &str = r#"{
  "id": "1.12.2-forge1.12.2-14.23.5.2847",
  "time": "2019-05-03T21:00:00-0700",
  "minecraftArguments": "--username ${auth_player_name} --version ${version_name}",
  "mainClass": "net.minecraft.launchwrapper.Launch",
  "libraries": []
}"#;

/// Server directory with a manifest, mods, a forge jar and a config tree.
pub struct Fixture {
    dir: TempDir,
    mods: Vec<(String, String, Vec<u8>)>,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::Builder::new()
            .prefix("solder-fixture")
            .tempdir()
            .expect("Failed to create fixture directory");
        std::fs::create_dir_all(dir.path().join("mods")).unwrap();

        let mut fixture = Self {
            dir,
            mods: Vec::new(),
        };
        fixture.set_mod("curseforge:jei", "jei_1.12.2-4.16.1.302.jar", b"jei classes");
        fixture.set_mod(
            "curseforge:applied-energistics-2",
            "appliedenergistics2-rv6-stable-7.jar",
            b"ae2 classes",
        );
        fixture.set_mod("url:https://example.com/x", "x.jar", b"x classes");
        fixture.write_forge(VERSION_JSON);
        fixture.write_config();
        fixture
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn layout(&self) -> SourceLayout {
        SourceLayout::new(self.root())
    }

    /// Add or replace a mod and rewrite the manifest.
    pub fn set_mod(&mut self, key: &str, file_name: &str, content: &[u8]) {
        std::fs::write(self.root().join("mods").join(file_name), content).unwrap();
        match self.mods.iter_mut().find(|(k, _, _)| k == key) {
            Some(entry) => *entry = (key.to_string(), file_name.to_string(), content.to_vec()),
            None => self
                .mods
                .push((key.to_string(), file_name.to_string(), content.to_vec())),
        }
        self.write_manifest();
    }

    pub fn write_manifest(&self) {
        let mut mods = serde_json::Map::new();
        for (key, file_name, content) in &self.mods {
            mods.insert(
                key.clone(),
                serde_json::json!({
                    "fileName": file_name,
                    "sha256": ContentHash::of(content).to_hex(),
                }),
            );
        }
        let manifest = serde_json::json!({ "mods": mods });
        std::fs::write(
            self.layout().manifest_path(),
            serde_json::to_vec_pretty(&manifest).unwrap(),
        )
        .unwrap();
    }

    pub fn forge_path(&self) -> PathBuf {
        self.root().join(FORGE_JAR)
    }

    pub fn write_forge(&self, descriptor: &str) {
        let mut zip = ZipWriter::new(File::create(self.forge_path()).unwrap());
        let options = SimpleFileOptions::default().last_modified_time(zip::DateTime::default());
        zip.start_file("META-INF/MANIFEST.MF", options).unwrap();
        zip.write_all(b"Manifest-Version: 1.0\n").unwrap();
        zip.start_file("net/minecraftforge/common/ForgeVersion.class", options)
            .unwrap();
        zip.write_all(b"\xca\xfe\xba\xbe forge").unwrap();
        zip.start_file("version.json", options).unwrap();
        zip.write_all(descriptor.as_bytes()).unwrap();
        zip.finish().unwrap();
    }

    pub fn remove_forge(&self) {
        std::fs::remove_file(self.forge_path()).unwrap();
    }

    fn write_config(&self) {
        let config = self.root().join("config");
        std::fs::create_dir_all(config.join("enderio/recipes")).unwrap();
        std::fs::write(config.join("forge.cfg"), b"general {\n}\n").unwrap();
        std::fs::write(config.join("jei.cfg"), b"search {\n}\n").unwrap();
        std::fs::write(config.join("fmlModState.properties"), b"jei=true\n").unwrap();
        std::fs::write(config.join("enderio/recipes/core.xml"), b"<recipes/>").unwrap();
        std::fs::write(self.root().join("servers.dat"), b"\x0a\x00\x00\x00").unwrap();
    }

    pub fn remove_config(&self) {
        std::fs::remove_dir_all(self.root().join("config")).unwrap();
    }
}
