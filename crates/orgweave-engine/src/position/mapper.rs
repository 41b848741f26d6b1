use std::sync::Arc;

use relative_path::RelativePath;

use crate::address::VirtualAddress;
use crate::blocks::BlockInfo;
use crate::manifest::BlockManifest;

use super::types::{
    BlockPosition, BlockRange, DocumentPosition, DocumentRange, Location, LocationTarget,
    Position, Range,
};

/// Translates a document position into the local coordinates of the block
/// containing it. Marker lines and prose map to `None`.
///
/// Editor lines are 0-based while marker lines are 1-based. A block with
/// markers on lines 5 and 10 owns document lines 6 to 8: line 6 becomes
/// block-local line 0 and line 9, the end marker, is outside.
pub fn to_block(
    document_path: &RelativePath,
    position: Position,
    manifest: &BlockManifest,
) -> Option<BlockPosition> {
    let line = position.line as usize;
    let block = manifest
        .blocks_for(document_path)?
        .iter()
        .find(|b| b.contains_line(line))?;

    let local = line - block.start_marker_line - 1;
    Some(BlockPosition {
        block: Arc::clone(block),
        position: Position::new(u32::try_from(local).ok()?, position.character),
    })
}

/// Translates a block-local position back into document space. `address`
/// may use either the index or the name form.
pub fn to_document(
    address: &str,
    position: Position,
    manifest: &BlockManifest,
) -> Option<DocumentPosition> {
    let address = VirtualAddress::decode(address)?;
    to_document_at(&address, position, manifest)
}

pub fn to_document_at(
    address: &VirtualAddress,
    position: Position,
    manifest: &BlockManifest,
) -> Option<DocumentPosition> {
    let block = manifest.lookup(address)?;
    block_to_document(block, position)
}

fn block_to_document(block: &BlockInfo, position: Position) -> Option<DocumentPosition> {
    let line = position.line as usize + block.start_marker_line + 1;
    if !block.contains_line(line) {
        return None;
    }
    Some(DocumentPosition {
        document_path: block.document_path.clone(),
        position: Position::new(u32::try_from(line).ok()?, position.character),
    })
}

/// Both ends must land in the same block.
pub fn map_range_to_block(
    document_path: &RelativePath,
    range: Range,
    manifest: &BlockManifest,
) -> Option<BlockRange> {
    let start = to_block(document_path, range.start, manifest)?;
    let end = to_block(document_path, range.end, manifest)?;
    if start.block.id != end.block.id {
        return None;
    }
    Some(BlockRange {
        block: start.block,
        range: Range::new(start.position, end.position),
    })
}

pub fn map_range_to_document(
    address: &str,
    range: Range,
    manifest: &BlockManifest,
) -> Option<DocumentRange> {
    let address = VirtualAddress::decode(address)?;
    map_address_range(&address, range, manifest)
}

fn map_address_range(
    address: &VirtualAddress,
    range: Range,
    manifest: &BlockManifest,
) -> Option<DocumentRange> {
    let block = manifest.lookup(address)?;
    let start = block_to_document(block, range.start)?;
    let end = block_to_document(block, range.end)?;
    Some(DocumentRange {
        document_path: start.document_path,
        range: Range::new(start.position, end.position),
    })
}

/// Rewrites a location reported against a virtual address into document
/// space. Document locations are returned as they are.
pub fn map_location_to_document(location: &Location, manifest: &BlockManifest) -> Option<Location> {
    match &location.target {
        LocationTarget::Document(_) => Some(location.clone()),
        LocationTarget::Address(address) => {
            let mapped = map_address_range(address, location.range, manifest)?;
            Some(Location {
                target: LocationTarget::Document(mapped.document_path),
                range: mapped.range,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::BlockTarget;
    use crate::blocks::{BlockId, Parameters};
    use pretty_assertions::assert_eq;
    use relative_path::RelativePathBuf;
    use rstest::rstest;
    use std::path::Path;

    fn block(path: &str, index: usize, name: Option<&str>, start: usize, end: usize) -> BlockInfo {
        BlockInfo {
            id: BlockId {
                document_path: RelativePathBuf::from(path),
                index,
            },
            document_path: RelativePathBuf::from(path),
            name: name.map(str::to_string),
            index,
            language: "js".into(),
            start_marker_line: start,
            end_marker_line: end,
            parameters: Parameters::new(),
            selector: "default".into(),
            virtual_address: format!("vaddr:block:default:{path}:{index}.js"),
            content: String::new(),
        }
    }

    /// One document with blocks framed by lines 5..10 and 12..15.
    fn manifest() -> BlockManifest {
        let mut manifest = BlockManifest::new(Path::new("/p"));
        manifest.replace_document(
            RelativePathBuf::from("doc.org"),
            vec![
                block("doc.org", 0, Some("first"), 5, 10),
                block("doc.org", 1, None, 12, 15),
            ],
        );
        manifest
    }

    fn doc() -> &'static RelativePath {
        RelativePath::new("doc.org")
    }

    #[test]
    fn document_to_block_and_back() {
        let m = manifest();
        let mapped = to_block(doc(), Position::new(6, 3), &m).unwrap();
        assert_eq!(mapped.block.index, 0);
        assert_eq!(mapped.position, Position::new(0, 3));

        let back = to_document("vaddr:block:default:doc.org:0.js", Position::new(0, 3), &m).unwrap();
        assert_eq!(back.document_path, RelativePathBuf::from("doc.org"));
        assert_eq!(back.position, Position::new(6, 3));
    }

    #[rstest]
    #[case(0)]
    #[case(4)]
    #[case(5)]
    #[case(9)]
    #[case(10)]
    #[case(11)]
    #[case(12)]
    #[case(14)]
    #[case(15)]
    #[case(40)]
    fn lines_outside_blocks_are_unmapped(#[case] line: u32) {
        assert_eq!(to_block(doc(), Position::new(line, 0), &manifest()), None);
    }

    #[rstest]
    #[case(6, 0, 0)]
    #[case(8, 0, 2)]
    #[case(13, 1, 0)]
    fn lines_inside_blocks(#[case] line: u32, #[case] index: usize, #[case] local: u32) {
        let mapped = to_block(doc(), Position::new(line, 7), &manifest()).unwrap();
        assert_eq!(mapped.block.index, index);
        assert_eq!(mapped.position, Position::new(local, 7));
    }

    #[test]
    fn marker_lines_of_an_extracted_block_are_outside() {
        let content = "#+begin_src sh\necho one\necho two\necho three\n#+end_src\n";
        let blocks = crate::blocks::extract(doc(), content).unwrap();
        let mut m = BlockManifest::new(Path::new("/p"));
        m.replace_document(doc().to_relative_path_buf(), blocks);

        let mapped: Vec<_> = (0..6)
            .map(|line| to_block(doc(), Position::new(line, 0), &m).map(|b| b.position.line))
            .collect();
        assert_eq!(mapped, vec![None, None, Some(0), Some(1), None, None]);
    }

    #[test]
    fn end_to_end_block_lines_map_back() {
        let m = {
            let mut m = BlockManifest::new(Path::new("/p"));
            m.replace_document(
                RelativePathBuf::from("doc.org"),
                vec![block("doc.org", 0, None, 3, 8)],
            );
            m
        };
        let address = "vaddr:block:default:doc.org:0.js";
        let lines: Vec<_> = (0..2)
            .map(|local| to_document(address, Position::new(local, 0), &m).unwrap().position.line)
            .collect();
        assert_eq!(lines, vec![4, 5]);
    }

    #[test]
    fn unknown_document_is_unmapped() {
        assert_eq!(
            to_block(RelativePath::new("other.org"), Position::new(6, 0), &manifest()),
            None
        );
    }

    #[test]
    fn name_form_address_maps_back() {
        let back = to_document(
            "vaddr:block:render:doc.org:NAME:first.ts",
            Position::new(2, 1),
            &manifest(),
        )
        .unwrap();
        assert_eq!(back.position, Position::new(8, 1));
    }

    #[test]
    fn block_lines_reaching_the_end_marker_are_unmapped() {
        let m = manifest();
        let address = "vaddr:block:default:doc.org:0.js";
        assert!(to_document(address, Position::new(2, 0), &m).is_some());
        assert_eq!(to_document(address, Position::new(3, 0), &m), None);
        assert_eq!(to_document("vaddr:block:default:doc.org:1.js", Position::new(1, 0), &m), None);
        assert_eq!(to_document("not an address", Position::new(0, 0), &m), None);
        assert_eq!(
            to_document("vaddr:block:default:doc.org:9.js", Position::new(0, 0), &m),
            None
        );
    }

    #[test]
    fn ranges_within_one_block() {
        let m = manifest();
        let range = Range::new(Position::new(6, 2), Position::new(8, 4));
        let mapped = map_range_to_block(doc(), range, &m).unwrap();
        assert_eq!(mapped.block.index, 0);
        assert_eq!(mapped.range, Range::new(Position::new(0, 2), Position::new(2, 4)));

        let back = map_range_to_document("vaddr:block:default:doc.org:0.js", mapped.range, &m).unwrap();
        assert_eq!(back.range, range);
    }

    #[test]
    fn ranges_spanning_blocks_are_unmapped() {
        let range = Range::new(Position::new(6, 0), Position::new(13, 0));
        assert_eq!(map_range_to_block(doc(), range, &manifest()), None);

        let half_outside = Range::new(Position::new(6, 0), Position::new(10, 0));
        assert_eq!(map_range_to_block(doc(), half_outside, &manifest()), None);
    }

    #[test]
    fn locations_map_into_document_space() {
        let m = manifest();
        let address = VirtualAddress::new("default", "doc.org", BlockTarget::Index(0), "js");
        let reported = Location {
            target: LocationTarget::Address(address),
            range: Range::new(Position::new(0, 0), Position::new(2, 5)),
        };

        let mapped = map_location_to_document(&reported, &m).unwrap();
        assert_eq!(
            mapped,
            Location {
                target: LocationTarget::Document(RelativePathBuf::from("doc.org")),
                range: Range::new(Position::new(6, 0), Position::new(8, 5)),
            }
        );

        assert_eq!(map_location_to_document(&mapped, &m), Some(mapped.clone()));
    }
}
