//! Tree transforms run once the document has been parsed.
//!
//! Order matters: ids are assigned first (in document order), internal
//! targets then hand their ids to the element that follows them, the
//! document title is promoted, and named references are finally resolved.

use std::collections::HashMap;

use crate::doctree::{IdGenerator, Node, NodeKind, normalize_name};
use crate::error::ParseError;

/// Maximum length of an indirect target chain.
const MAX_INDIRECTION: usize = 10;

pub(crate) fn apply(document: &mut Node, doctitle: bool) -> Result<(), ParseError> {
    let mut ids = IdGenerator::new();
    assign_ids(document, &mut ids);
    propagate_targets(document);
    if doctitle && promote_title(document) {
        promote_subtitle(document);
    }
    resolve_references(document)
}

fn is_internal_target(node: &Node) -> bool {
    matches!(node.kind, NodeKind::Target { refuri: None }) && node.text.is_empty()
}

/// Section names come from their titles; every named node gets an id.
fn assign_ids(node: &mut Node, ids: &mut IdGenerator) {
    if node.kind == NodeKind::Section {
        let name = node
            .children
            .first()
            .map(|title| normalize_name(&title.astext()))
            .unwrap_or_default();
        node.attrs.names.push(name);
    }
    if matches!(node.kind, NodeKind::Section | NodeKind::Target { .. }) && node.attrs.ids.is_empty() {
        if let Some(name) = node.attrs.names.first() {
            let id = ids.id_for(name);
            node.attrs.ids.push(id);
        }
    }
    for child in &mut node.children {
        assign_ids(child, ids);
    }
}

/// Move the ids of internal targets (`.. _name:`) onto the next element.
fn propagate_targets(node: &mut Node) {
    let mut pending: Vec<usize> = Vec::new();
    for k in 0..node.children.len() {
        if is_internal_target(&node.children[k]) {
            pending.push(k);
            continue;
        }
        if matches!(node.children[k].kind, NodeKind::Comment) {
            continue;
        }
        for t in pending.drain(..) {
            let target_ids = std::mem::take(&mut node.children[t].attrs.ids);
            let element = &mut node.children[k];
            element.attrs.ids.extend(target_ids);
            let refid = element.attrs.ids.first().cloned();
            node.children[t].attrs.refid = refid;
        }
    }
    for child in &mut node.children {
        propagate_targets(child);
    }
}

fn is_prebibliographic(node: &Node) -> bool {
    matches!(
        node.kind,
        NodeKind::Comment | NodeKind::Target { .. } | NodeKind::Title
    )
}

fn candidate_index(node: &Node) -> Option<usize> {
    let index = node.children.iter().position(|c| !is_prebibliographic(c))?;
    (index + 1 == node.children.len() && node.children[index].kind == NodeKind::Section)
        .then_some(index)
}

/// A lone top-level section becomes the document title.
fn promote_title(document: &mut Node) -> bool {
    let Some(index) = candidate_index(document) else {
        return false;
    };
    let section = document.children.remove(index);
    let mut rest = section.children.into_iter();
    let Some(title) = rest.next() else {
        return false;
    };
    document.attrs.ids.extend(section.attrs.ids);
    document.attrs.names.extend(section.attrs.names);
    let mut children = Vec::with_capacity(document.children.len() + rest.len() + 1);
    children.push(title);
    children.append(&mut document.children);
    children.extend(rest);
    document.children = children;
    tracing::debug!("promoted lone section to document title");
    true
}

/// A lone section directly under the document title becomes its subtitle.
fn promote_subtitle(document: &mut Node) {
    let Some(index) = candidate_index(document) else {
        return;
    };
    let section = document.children.remove(index);
    let mut rest = section.children.into_iter();
    let Some(title) = rest.next() else {
        return;
    };
    let mut subtitle = Node::element(NodeKind::Subtitle, title.children).with_line(title.line);
    subtitle.attrs.ids = section.attrs.ids;
    subtitle.attrs.names = section.attrs.names;
    document.children.insert(1, subtitle);
    document.children.extend(rest);
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Resolution {
    Uri(String),
    Id(String),
    Alias(String),
}

fn collect_targets(node: &Node, explicit: &mut HashMap<String, Resolution>, implicit: &mut HashMap<String, Resolution>) {
    match &node.kind {
        NodeKind::Target { refuri } => {
            let resolution = match refuri {
                Some(uri) => Some(Resolution::Uri(uri.clone())),
                None if !node.text.is_empty() => Some(Resolution::Alias(node.text.clone())),
                None => node
                    .attrs
                    .refid
                    .clone()
                    .or_else(|| node.attrs.ids.first().cloned())
                    .map(Resolution::Id),
            };
            if let Some(resolution) = resolution {
                for name in &node.attrs.names {
                    match explicit.get(name) {
                        Some(existing) if *existing != resolution => {
                            tracing::warn!(line = node.line, name, "Duplicate explicit target name");
                        }
                        Some(_) => {}
                        None => {
                            explicit.insert(name.clone(), resolution.clone());
                        }
                    }
                }
            }
        }
        NodeKind::Section | NodeKind::Document | NodeKind::Subtitle => {
            if let Some(id) = node.attrs.ids.first() {
                for name in &node.attrs.names {
                    implicit
                        .entry(name.clone())
                        .or_insert_with(|| Resolution::Id(id.clone()));
                }
            }
        }
        _ => {}
    }
    for child in &node.children {
        collect_targets(child, explicit, implicit);
    }
}

fn resolve_references(document: &mut Node) -> Result<(), ParseError> {
    let mut targets = HashMap::new();
    let mut implicit = HashMap::new();
    collect_targets(document, &mut targets, &mut implicit);
    for (name, resolution) in implicit {
        targets.entry(name).or_insert(resolution);
    }
    resolve_in(document, &targets)
}

fn lookup<'a>(name: &str, targets: &'a HashMap<String, Resolution>) -> Option<&'a Resolution> {
    let mut current = targets.get(name)?;
    for _ in 0..MAX_INDIRECTION {
        match current {
            Resolution::Alias(alias) => current = targets.get(alias)?,
            resolved => return Some(resolved),
        }
    }
    None
}

fn resolve_in(node: &mut Node, targets: &HashMap<String, Resolution>) -> Result<(), ParseError> {
    if let NodeKind::Reference {
        refuri,
        refname: Some(name),
    } = &mut node.kind
    {
        if refuri.is_none() {
            match lookup(name, targets) {
                Some(Resolution::Uri(uri)) => *refuri = Some(uri.clone()),
                Some(Resolution::Id(id)) => node.attrs.refid = Some(id.clone()),
                Some(Resolution::Alias(_)) | None => {
                    return Err(ParseError::syntax(
                        node.line,
                        format!("Unknown target name: \"{name}\"."),
                    ));
                }
            }
        }
    }
    for child in &mut node.children {
        resolve_in(child, targets)?;
    }
    Ok(())
}
