//! Command implementations. Each command returns the JSON value printed on
//! stdout.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use orgweave_config::Config;
use orgweave_engine::address::{ExtensionTable, VirtualAddress};
use orgweave_engine::manifest::BlockManifest;
use orgweave_engine::position::{self, Position};
use orgweave_engine::resolve::{ReferenceContext, resolve};
use orgweave_engine::{BlockEngine, DocumentFilter, EngineOptions, io};
use relative_path::RelativePath;
use serde_json::{Value, json};

/// The project a command runs against.
pub struct Workspace {
    pub root: PathBuf,
    pub config: Config,
}

impl Workspace {
    /// `--root` wins; otherwise the configured root relative to `cwd`.
    pub fn open(root: Option<PathBuf>, cwd: &Path) -> Result<Self> {
        let base = root.clone().unwrap_or_else(|| cwd.to_path_buf());
        let config = Config::discover(&base)
            .context("Failed to load config")?
            .unwrap_or_default();
        let root = match root {
            Some(root) => root,
            None => config.resolve_project_root(cwd),
        };
        io::validate_project_root(&root)
            .with_context(|| format!("Project root '{}' is invalid", root.display()))?;
        tracing::debug!(root = %root.display(), "opened workspace");
        Ok(Self { root, config })
    }

    pub fn options(&self) -> EngineOptions {
        EngineOptions {
            default_selector: self.config.default_selector.clone(),
            extensions: ExtensionTable::with_overrides(&self.config.extensions),
        }
    }

    pub fn filter(&self) -> Result<DocumentFilter> {
        Ok(DocumentFilter::new(
            &self.config.include,
            &self.config.exclude,
        )?)
    }

    pub fn manifest(&self) -> Result<BlockManifest> {
        let mut engine = BlockEngine::new(&self.root, self.options());
        Ok(engine.build_project_manifest(&self.filter()?)?)
    }
}

pub fn manifest(workspace: &Workspace) -> Result<Value> {
    Ok(serde_json::to_value(workspace.manifest()?)?)
}

pub fn blocks(workspace: &Workspace, document: &str) -> Result<Value> {
    let manifest = workspace.manifest()?;
    let path = RelativePath::new(document.trim_start_matches('/')).normalize();
    let blocks = manifest
        .blocks_for(&path)
        .ok_or_else(|| anyhow!("Document '{path}' is not in the manifest"))?;
    Ok(serde_json::to_value(blocks)?)
}

pub fn resolve_reference(workspace: &Workspace, reference: &str, from: Option<&str>) -> Result<Value> {
    let manifest = workspace.manifest()?;
    let context = from.map_or(ReferenceContext::None, ReferenceContext::parse);
    match resolve(reference, &context, &workspace.root, &manifest) {
        Ok(resolved) => Ok(serde_json::to_value(resolved)?),
        Err(e) => Err(anyhow!("{}: {e}", e.code())),
    }
}

pub fn decode(address: &str) -> Result<Value> {
    let decoded = VirtualAddress::decode(address)
        .ok_or_else(|| anyhow!("'{address}' is not a virtual address"))?;
    Ok(serde_json::to_value(decoded)?)
}

/// `null` when the position is outside every block.
pub fn map_to_block(workspace: &Workspace, document: &str, at: Position) -> Result<Value> {
    let manifest = workspace.manifest()?;
    let path = RelativePath::new(document.trim_start_matches('/')).normalize();
    let mapped = position::to_block(&path, at, &manifest).map(|local| {
        json!({
            "address": local.block.virtual_address,
            "position": local.position,
        })
    });
    Ok(mapped.unwrap_or(Value::Null))
}

pub fn map_to_document(workspace: &Workspace, address: &str, at: Position) -> Result<Value> {
    let manifest = workspace.manifest()?;
    Ok(serde_json::to_value(position::to_document(address, at, &manifest))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const UTILS: &str = "* Helpers\n#+name: helpers\n#+begin_src clojure\n(defn add [a b] (+ a b))\n(defn sub [a b] (- a b))\n#+end_src\n";

    fn workspace() -> (TempDir, Workspace) {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("pages")).unwrap();
        std::fs::write(dir.path().join("pages/utils.org"), UTILS).unwrap();
        std::fs::write(dir.path().join("pages/index.org"), "* Index\n").unwrap();
        std::fs::write(
            dir.path().join("orgweave.toml"),
            "default_selector = \"site\"\n\n[extensions]\nclojure = \"clj\"\n",
        )
        .unwrap();

        let workspace = Workspace::open(Some(dir.path().to_path_buf()), Path::new("/")).unwrap();
        (dir, workspace)
    }

    #[test]
    fn project_config_shapes_addresses() {
        let (_dir, workspace) = workspace();
        let blocks = blocks(&workspace, "pages/utils.org").unwrap();
        assert_eq!(
            blocks[0]["virtual_address"],
            json!("vaddr:block:site:pages/utils.org:0.clj")
        );
    }

    #[test]
    fn resolves_relative_reference() {
        let (_dir, workspace) = workspace();
        let resolved =
            resolve_reference(&workspace, "./utils.org?name=helpers", Some("pages/index.org")).unwrap();
        assert_eq!(resolved["document_path"], json!("pages/utils.org"));
        assert_eq!(resolved["block"]["name"], json!("helpers"));
    }

    #[test]
    fn resolve_errors_carry_their_code() {
        let (_dir, workspace) = workspace();
        let err = resolve_reference(&workspace, "./missing.org?name=x", Some("index.org")).unwrap_err();
        assert!(err.to_string().starts_with("DOCUMENT_NOT_FOUND"));
    }

    #[test]
    fn maps_both_directions() {
        let (_dir, workspace) = workspace();
        let local = map_to_block(&workspace, "pages/utils.org", Position::new(4, 2)).unwrap();
        assert_eq!(local["position"], json!({"line": 0, "character": 2}));

        for line in [1, 5] {
            let outside = map_to_block(&workspace, "pages/utils.org", Position::new(line, 0)).unwrap();
            assert_eq!(outside, Value::Null);
        }

        let back = map_to_document(&workspace, "vaddr:block:site:pages/utils.org:0.clj", Position::new(0, 2)).unwrap();
        assert_eq!(back["position"], json!({"line": 4, "character": 2}));
    }

    #[test]
    fn decode_rejects_plain_paths() {
        assert!(decode("pages/utils.org").is_err());
        let decoded = decode("vaddr:block:site:pages/utils.org:NAME:helpers.clj").unwrap();
        assert_eq!(decoded["target"], json!({"Name": "helpers"}));
    }
}
