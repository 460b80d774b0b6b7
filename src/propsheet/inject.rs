//! # Injection Controller
//!
//! Places a properties [`Fragment`] into a [`RenderTarget`] and takes it out again.
//! Both operations are idempotent:
//!
//! - [`Injector::inject`] is a no-op when the block marker is already reachable
//!   from the target's root, so a target never holds more than one block.
//! - [`remove`] is a no-op when no block is present.
//!
//! ## Scope resolution
//!
//! Where the block goes is decided by a ranked list of candidate scopes, each a
//! fallible probe returning an optional node:
//!
//! 1. the target's own container (the rendered view),
//! 2. the `<body>` of the document the target belongs to.
//!
//! The first probe that yields a node wins. Inside that scope the placement rule
//! is the same: with `insert_after_heading` and an `h1` present, the block goes
//! right after the first `h1`; otherwise it becomes the first child of the inner
//! content container (`.markdown-preview-sizer`) when the scope wraps one, or of
//! the scope itself.

use crate::render::{Fragment, BLOCK_SELECTOR};
use kuchiki::NodeRef;
use log::debug;

/// Inner content container of a rendered view.
pub const CONTENT_SELECTOR: &str = ".markdown-preview-sizer";

/// Headings the block may follow.
pub const HEADING_SELECTOR: &str = "h1";

/// A rendered view of one document.
///
/// `container` is the view's element; `document` is the tree it lives in. Either
/// may be unknown: a view handed over from another rendering context has no
/// reachable document, and a print job without a resolvable view only has the
/// document.
#[derive(Debug, Clone)]
pub struct RenderTarget {
    document: Option<NodeRef>,
    container: Option<NodeRef>,
}

impl RenderTarget {
    pub fn new(document: NodeRef, container: NodeRef) -> Self {
        Self {
            document: Some(document),
            container: Some(container),
        }
    }

    /// A target whose view could not be resolved; only the document is known.
    pub fn document_only(document: NodeRef) -> Self {
        Self {
            document: Some(document),
            container: None,
        }
    }

    /// A target whose owning document is out of reach.
    pub fn container_only(container: NodeRef) -> Self {
        Self {
            document: None,
            container: Some(container),
        }
    }

    pub fn container(&self) -> Option<&NodeRef> {
        self.container.as_ref()
    }

    pub fn document(&self) -> Option<&NodeRef> {
        self.document.as_ref()
    }

    /// Whether both targets name the same nodes.
    pub fn same_nodes(&self, other: &RenderTarget) -> bool {
        self.document == other.document && self.container == other.container
    }

    /// The widest tree reachable from this target.
    fn root(&self) -> Option<NodeRef> {
        if let Some(document) = &self.document {
            return Some(document.clone());
        }
        let container = self.container.as_ref()?;
        Some(container.ancestors().last().unwrap_or_else(|| container.clone()))
    }

    /// Serialize the whole reachable tree.
    pub fn to_html(&self) -> String {
        self.root().map(|root| root.to_string()).unwrap_or_default()
    }

    /// Number of injected blocks reachable from the root.
    pub fn block_count(&self) -> usize {
        self.root()
            .and_then(|root| root.select(BLOCK_SELECTOR).ok())
            .map(|blocks| blocks.count())
            .unwrap_or(0)
    }

    pub fn has_block(&self) -> bool {
        self.root()
            .map(|root| root.select_first(BLOCK_SELECTOR).is_ok())
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Container,
    Body,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    AfterHeading,
    Top,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectOutcome {
    NothingToShow,
    AlreadyPresent,
    Inserted { scope: ScopeKind, placement: Placement },
    NoScope,
}

type Probe = fn(&RenderTarget) -> Option<NodeRef>;

/// Candidate scopes, most specific first.
const SCOPES: &[(ScopeKind, Probe)] = &[
    (ScopeKind::Container, probe_container),
    (ScopeKind::Body, probe_body),
];

fn probe_container(target: &RenderTarget) -> Option<NodeRef> {
    target.container.clone()
}

fn probe_body(target: &RenderTarget) -> Option<NodeRef> {
    let document = target.document.as_ref()?;
    let body = document.select_first("body").ok()?;
    Some(body.as_node().clone())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Injector {
    insert_after_heading: bool,
}

impl Injector {
    pub fn new(insert_after_heading: bool) -> Self {
        Self {
            insert_after_heading,
        }
    }

    pub fn inject(&self, target: &RenderTarget, fragment: Option<&Fragment>) -> InjectOutcome {
        let Some(fragment) = fragment else {
            return InjectOutcome::NothingToShow;
        };

        if target.has_block() {
            debug!("Properties block already present, skipping");
            return InjectOutcome::AlreadyPresent;
        }

        let Some((scope_kind, scope)) = SCOPES
            .iter()
            .find_map(|(kind, probe)| probe(target).map(|node| (*kind, node)))
        else {
            debug!("No scope to place the properties block in");
            return InjectOutcome::NoScope;
        };

        let Some(block) = fragment.to_node() else {
            return InjectOutcome::NothingToShow;
        };

        let placement = self.place(&scope, block);
        debug!("Inserted properties block ({:?}, {:?})", scope_kind, placement);
        InjectOutcome::Inserted {
            scope: scope_kind,
            placement,
        }
    }

    fn place(&self, scope: &NodeRef, block: NodeRef) -> Placement {
        let content = scope
            .select_first(CONTENT_SELECTOR)
            .ok()
            .map(|c| c.as_node().clone());
        let area = content.unwrap_or_else(|| scope.clone());

        if self.insert_after_heading {
            if let Ok(heading) = area.select_first(HEADING_SELECTOR) {
                heading.as_node().insert_after(block);
                return Placement::AfterHeading;
            }
        }

        area.prepend(block);
        Placement::Top
    }
}

/// Detach every injected block, looking in the container first and then in the
/// whole reachable tree. Returns how many blocks were removed.
pub fn remove(target: &RenderTarget) -> usize {
    let scopes = [target.container.clone(), target.root()];
    for scope in scopes.into_iter().flatten() {
        let Ok(blocks) = scope.select(BLOCK_SELECTOR) else {
            continue;
        };
        let found: Vec<NodeRef> = blocks.map(|b| b.as_node().clone()).collect();
        if found.is_empty() {
            continue;
        }
        for block in &found {
            block.detach();
        }
        debug!("Removed {} properties block(s)", found.len());
        return found.len();
    }
    0
}
