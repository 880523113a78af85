use std::fs;
use std::path::Path;

use ai_bt::{Attributes, BehaviorRegistry, BehaviorTreeAsset, NodeId};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::{info, warn};

use crate::error::CompileError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Reject attributes no behavior reads instead of warning about them.
    pub strict_attributes: bool,
}

/// Compiles `script_path` with the built-in registry and writes the tables to
/// `asset_path`.
pub fn compile(script_path: &Path, asset_path: &Path) -> Result<BehaviorTreeAsset, CompileError> {
    compile_with(
        script_path,
        asset_path,
        &BehaviorRegistry::builtin(),
        CompileOptions::default(),
    )
}

/// Like [`compile`], with an explicit registry and options.
///
/// The asset file is replaced atomically and only after the whole script
/// compiled; on any error the previous asset is left as it was.
pub fn compile_with(
    script_path: &Path,
    asset_path: &Path,
    registry: &BehaviorRegistry,
    options: CompileOptions,
) -> Result<BehaviorTreeAsset, CompileError> {
    let source = fs::read_to_string(script_path).map_err(|source| CompileError::Io {
        path: script_path.to_path_buf(),
        source,
    })?;
    let asset = compile_str(&source, registry, options)?;
    asset.save(asset_path)?;

    info!(
        script = %script_path.display(),
        asset = %asset_path.display(),
        nodes = asset.len(),
        "compiled behavior tree"
    );
    Ok(asset)
}

/// An element whose end tag has not been read yet.
struct Open {
    tag: String,
    /// `None` for the wrapper element.
    node: Option<NodeId>,
    path: String,
    children: usize,
}

/// Compiles script text into flattened tables without touching the disk.
///
/// The script is read as a stream of tag events; open elements live on an
/// explicit stack, so nesting depth is bounded by memory only.
pub fn compile_str(
    source: &str,
    registry: &BehaviorRegistry,
    options: CompileOptions,
) -> Result<BehaviorTreeAsset, CompileError> {
    let mut reader = Reader::from_str(source);
    let mut asset = BehaviorTreeAsset {
        behaviors: Vec::new(),
        parents: Vec::new(),
        children: Vec::new(),
    };
    let mut open: Vec<Open> = Vec::new();
    let mut wrapper_closed = false;

    loop {
        let event = reader.read_event().map_err(|e| {
            CompileError::MalformedDocument(format!("{e} (at byte {})", reader.buffer_position()))
        })?;
        match event {
            Event::Start(start) => {
                let element = open_element(
                    &start,
                    &mut open,
                    &mut asset,
                    registry,
                    options,
                    wrapper_closed,
                )?;
                open.push(element);
            }
            Event::Empty(start) => {
                let element = open_element(
                    &start,
                    &mut open,
                    &mut asset,
                    registry,
                    options,
                    wrapper_closed,
                )?;
                close_element(element, &asset, &mut wrapper_closed)?;
            }
            Event::End(end) => {
                let name = utf8(end.name().as_ref())?.to_string();
                let Some(element) = open.pop() else {
                    return Err(CompileError::MalformedDocument(format!(
                        "unexpected end tag </{name}>"
                    )));
                };
                if name != element.tag {
                    return Err(CompileError::MalformedDocument(format!(
                        "expected </{}>, found </{name}>",
                        element.tag
                    )));
                }
                close_element(element, &asset, &mut wrapper_closed)?;
            }
            Event::Text(text) if open.is_empty() && !text.iter().all(u8::is_ascii_whitespace) => {
                return Err(CompileError::MalformedDocument(
                    "text outside the root element".to_string(),
                ));
            }
            Event::CData(_) if open.is_empty() => {
                return Err(CompileError::MalformedDocument(
                    "CDATA outside the root element".to_string(),
                ));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(element) = open.last() {
        return Err(CompileError::MalformedDocument(format!(
            "<{}> is never closed",
            element.tag
        )));
    }
    if !wrapper_closed {
        return Err(CompileError::MalformedDocument(
            "document has no root element".to_string(),
        ));
    }

    debug_assert!(asset.validate().is_ok());
    Ok(asset)
}

/// Assigns the next pre-order id to `start` and records it under the element
/// on top of `open`. The first element of the document is the wrapper and
/// gets no id.
fn open_element(
    start: &BytesStart<'_>,
    open: &mut [Open],
    asset: &mut BehaviorTreeAsset,
    registry: &BehaviorRegistry,
    options: CompileOptions,
    wrapper_closed: bool,
) -> Result<Open, CompileError> {
    let tag = utf8(start.name().as_ref())?.to_string();

    let Some(parent) = open.last_mut() else {
        if wrapper_closed {
            return Err(CompileError::MalformedDocument(format!(
                "<{tag}> follows the root element"
            )));
        }
        return Ok(Open {
            tag,
            node: None,
            path: String::new(),
            children: 0,
        });
    };

    let position = parent.children;
    parent.children += 1;
    let (parent_id, path) = match parent.node {
        None if position > 0 => {
            return Err(CompileError::MalformedDocument(format!(
                "<{}> must contain exactly one behavior element",
                parent.tag
            )))
        }
        None => (None, format!("/{tag}")),
        Some(id) => (Some(id), format!("{}/{tag}[{position}]", parent.path)),
    };

    let mut pairs = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| CompileError::MalformedDocument(format!("{path}: {e}")))?;
        let name = utf8(attr.key.as_ref())?.to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| CompileError::MalformedDocument(format!("{path}: {e}")))?
            .into_owned();
        pairs.push((name, value));
    }
    let mut attrs = Attributes::new(pairs);

    let config = match registry.construct(&tag, &mut attrs) {
        Some(result) => result.map_err(|source| CompileError::InvalidAttribute {
            path: path.clone(),
            source,
        })?,
        None => return Err(CompileError::UnknownBehaviorType { tag, path }),
    };

    let unused: Vec<String> = attrs.unused().map(str::to_string).collect();
    for name in unused {
        if options.strict_attributes {
            return Err(CompileError::UnknownAttribute { path, name });
        }
        warn!(%path, attribute = %name, "ignoring unknown attribute");
    }

    let id = NodeId(asset.behaviors.len() as u32);
    asset.behaviors.push(config);
    asset.parents.push(parent_id);
    asset.children.push(Vec::new());
    if let Some(parent_id) = parent_id {
        asset.children[parent_id.index()].push(id);
    }

    Ok(Open {
        tag,
        node: Some(id),
        path,
        children: 0,
    })
}

/// Checks the child count of a finished element against its behavior.
fn close_element(
    element: Open,
    asset: &BehaviorTreeAsset,
    wrapper_closed: &mut bool,
) -> Result<(), CompileError> {
    let Some(id) = element.node else {
        if element.children == 0 {
            return Err(CompileError::MalformedDocument(format!(
                "<{}> contains no behavior element",
                element.tag
            )));
        }
        *wrapper_closed = true;
        return Ok(());
    };

    let arity = asset.behaviors[id.index()].arity();
    if !arity.accepts(element.children) {
        return Err(CompileError::InvalidChildCount {
            tag: element.tag,
            path: element.path,
            expected: arity.describe(),
            found: element.children,
        });
    }
    Ok(())
}

fn utf8(bytes: &[u8]) -> Result<&str, CompileError> {
    std::str::from_utf8(bytes).map_err(|e| CompileError::MalformedDocument(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_bt::BehaviorConfig;

    fn compile_default(source: &str) -> Result<BehaviorTreeAsset, CompileError> {
        compile_str(source, &BehaviorRegistry::builtin(), CompileOptions::default())
    }

    #[test]
    fn ids_follow_document_preorder() {
        let asset = compile_default(
            r#"<Tree>
                 <Selector>
                   <Sequence>
                     <Succeed/>
                     <Fail/>
                   </Sequence>
                   <Wait ticks="1"/>
                 </Selector>
               </Tree>"#,
        )
        .unwrap();

        let tags: Vec<&str> = asset.behaviors.iter().map(BehaviorConfig::tag).collect();
        assert_eq!(tags, vec!["Selector", "Sequence", "Succeed", "Fail", "Wait"]);
        assert_eq!(asset.children[0], vec![NodeId(1), NodeId(4)]);
        assert_eq!(asset.children[1], vec![NodeId(2), NodeId(3)]);
        assert_eq!(asset.parents[4], Some(NodeId(0)));
    }

    #[test]
    fn text_and_comments_are_not_children() {
        let asset = compile_default(
            "<Tree><!-- root --><Sequence>text<Succeed/><!-- x --></Sequence></Tree>",
        )
        .unwrap();
        assert_eq!(asset.len(), 2);
    }

    #[test]
    fn error_paths_name_sibling_positions() {
        let err = compile_default("<Tree><Sequence><Succeed/><Teleport/></Sequence></Tree>")
            .unwrap_err();
        match err {
            CompileError::UnknownBehaviorType { tag, path } => {
                assert_eq!(tag, "Teleport");
                assert_eq!(path, "/Sequence/Teleport[1]");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
