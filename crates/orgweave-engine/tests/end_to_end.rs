use std::path::{Path, PathBuf};

use orgweave_engine::manifest::BlockManifest;
use orgweave_engine::position::{self, Position};
use orgweave_engine::resolve::{ReferenceContext, ResolveError, resolve};
use orgweave_engine::{
    BlockEngine, DocumentChange, DocumentFilter, EngineOptions, ManifestBuilder, io,
};
use pretty_assertions::assert_eq;
use relative_path::{RelativePath, RelativePathBuf};
use tempfile::TempDir;

const INDEX: &str = r#"#+title: Index

* Imports
#+begin_src js :selector bundle
import { add } from "./utils.org?name=helpers";
#+end_src
"#;

const UTILS: &str = "\
* Helpers
#+name: helpers
#+begin_src js :tangle yes
export const add = (a, b) => a + b;
export const sub = (a, b) => a - b;
#+end_src

#+begin_src sh
echo unnamed
#+end_src
";

const BROKEN: &str = "* Draft\n#+begin_src python\nprint('never closed')\n";

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "pages/index.org", INDEX);
    write(dir.path(), "pages/utils.org", UTILS);
    write(dir.path(), "broken.org", BROKEN);
    write(dir.path(), "archive/old.org", UTILS);
    write(dir.path(), "README.md", "not a document");
    dir
}

fn filter() -> DocumentFilter {
    DocumentFilter::new(&["**/*.org"], &["archive/**"]).unwrap()
}

fn build(root: &Path) -> BlockManifest {
    let paths: Vec<PathBuf> = io::scan_documents(root, &filter())
        .unwrap()
        .iter()
        .map(|p| p.to_path(""))
        .collect();
    ManifestBuilder::default().build(root, &paths)
}

fn summary(manifest: &BlockManifest) -> String {
    manifest
        .documents()
        .flat_map(|(_, blocks)| blocks)
        .map(|b| {
            format!(
                "{} {} {} {}..{} {}",
                b.id,
                b.name.as_deref().unwrap_or("-"),
                b.language,
                b.start_marker_line,
                b.end_marker_line,
                b.virtual_address
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn scan_honours_include_and_exclude() {
    let project = project();
    let found = io::scan_documents(project.path(), &filter()).unwrap();
    assert_eq!(
        found,
        vec![
            RelativePathBuf::from("broken.org"),
            RelativePathBuf::from("pages/index.org"),
            RelativePathBuf::from("pages/utils.org"),
        ]
    );
}

#[test]
fn manifest_of_a_project() {
    let project = project();
    let manifest = build(project.path());

    assert_eq!(manifest.document_count(), 2);
    manifest.check_invariants().unwrap();
    insta::assert_snapshot!(summary(&manifest), @r"
    pages/index.org#0 - js 4..6 vaddr:block:bundle:pages/index.org:0.js
    pages/utils.org#0 helpers js 3..6 vaddr:block:default:pages/utils.org:0.js
    pages/utils.org#1 - sh 8..10 vaddr:block:default:pages/utils.org:1.sh
    ");
}

#[test]
fn extraction_is_deterministic() {
    let project = project();
    assert_eq!(summary(&build(project.path())), summary(&build(project.path())));
}

#[test]
fn import_inside_a_block_resolves_to_the_named_block() {
    let project = project();
    let manifest = build(project.path());

    let importer = &manifest.blocks_for(RelativePath::new("pages/index.org")).unwrap()[0];
    let context = ReferenceContext::parse(&importer.virtual_address);

    let resolved = resolve("./utils.org?name=helpers", &context, project.path(), &manifest).unwrap();
    assert_eq!(resolved.document_path, RelativePathBuf::from("pages/utils.org"));
    assert_eq!(
        resolved.block.content,
        "export const add = (a, b) => a + b;\nexport const sub = (a, b) => a - b;"
    );

    let absolute = format!("{}/pages/utils.org?name=helpers", project.path().display());
    let again = resolve(&absolute, &ReferenceContext::None, project.path(), &manifest).unwrap();
    assert_eq!(again.block, resolved.block);
}

#[test]
fn broken_documents_are_not_resolvable() {
    let project = project();
    let manifest = build(project.path());
    let err = resolve(
        "/broken.org?name=anything",
        &ReferenceContext::None,
        project.path(),
        &manifest,
    )
    .unwrap_err();
    assert_eq!(
        err,
        ResolveError::DocumentNotFound {
            path: RelativePathBuf::from("broken.org")
        }
    );
}

#[test]
fn editor_position_round_trip_through_block_text() {
    let project = project();
    let manifest = build(project.path());
    let doc = RelativePath::new("pages/utils.org");

    // The helpers block has markers on lines 3 and 6.
    let local = position::to_block(doc, Position::new(4, 13), &manifest).unwrap();
    assert_eq!(local.block.name.as_deref(), Some("helpers"));
    assert_eq!(local.position, Position::new(0, 13));
    assert_eq!(position::to_block(doc, Position::new(5, 13), &manifest), None);

    let offset = position::position_to_offset(&local.block.content, local.position);
    assert_eq!(&local.block.content[offset..offset + 3], "add");
    assert_eq!(position::offset_to_position(&local.block.content, offset), local.position);

    let back = position::to_document(&local.block.virtual_address, local.position, &manifest).unwrap();
    assert_eq!(back.position, Position::new(4, 13));
    assert_eq!(back.document_path, doc.to_relative_path_buf());
}

#[test]
fn engine_follows_file_changes() {
    let project = project();
    let mut engine = BlockEngine::new(project.path(), EngineOptions::default());
    let mut manifest = engine.build_project_manifest(&filter()).unwrap();
    assert_eq!(manifest.document_count(), 2);

    engine
        .apply_change(
            &mut manifest,
            DocumentChange::Modified {
                path: project.path().join("pages/utils.org"),
                content: UTILS.replace("#+name: helpers", "#+name: math"),
            },
        )
        .unwrap();
    let err = resolve(
        "/pages/utils.org?name=helpers",
        &ReferenceContext::None,
        project.path(),
        &manifest,
    )
    .unwrap_err();
    assert_eq!(err.code(), "BLOCK_NOT_FOUND");

    engine
        .apply_change(
            &mut manifest,
            DocumentChange::Modified {
                path: PathBuf::from("broken.org"),
                content: format!("{BROKEN}#+end_src\n"),
            },
        )
        .unwrap();
    assert!(manifest.contains_document(RelativePath::new("broken.org")));
    assert!(manifest.block("vaddr:block:default:broken.org:0.py").is_some());
    manifest.check_invariants().unwrap();
}

#[test]
fn manifest_survives_json() {
    let project = project();
    let manifest = build(project.path());

    let json = serde_json::to_string(&manifest).unwrap();
    let restored: BlockManifest = serde_json::from_str(&json).unwrap();

    assert_eq!(summary(&restored), summary(&manifest));
    restored.check_invariants().unwrap();
}
