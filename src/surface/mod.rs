// src/surface/mod.rs

//! Visual surfaces and the container abstraction they live in.
//!
//! A slot's visible output is exactly one [`Surface`] at a time: either the
//! engine-bound live video visual or a fallback placeholder. Surfaces are
//! move-only values with an explicit detach-before-attach protocol, so a
//! visual can never end up with two parent containers, even when the engine
//! hands over a visual it had already parented somewhere itself.
//!
//! The widget system behind the containers is abstracted as
//! [`SurfaceHost`]; the in-tree [`headless::HeadlessHost`] implements it
//! with plain bookkeeping for the harness binary and for tests.

pub mod headless;

pub use headless::HeadlessHost;

/// Opaque handle to a visual element (live video view or placeholder).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VisualId(pub u64);

/// Opaque handle to a parent container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContainerId(pub u64);

/// Container abstraction over the display layer.
///
/// Implementations must tolerate operations on ids they no longer know
/// (log and continue); the supervisor treats the display layer as
/// best-effort and never lets it fail a mode switch.
pub trait SurfaceHost: Send + Sync {
    fn create_container(&self) -> ContainerId;
    fn create_placeholder(&self) -> VisualId;
    fn add_child(&self, parent: ContainerId, child: VisualId);
    fn remove_child(&self, parent: ContainerId, child: VisualId);
    fn parent_of(&self, child: VisualId) -> Option<ContainerId>;
    /// Mark the child as expand-to-fill within its parent.
    fn set_expand(&self, child: VisualId);
    fn show(&self, child: VisualId);
    fn hide(&self, child: VisualId);
    fn destroy_visual(&self, child: VisualId);
    fn destroy_container(&self, container: ContainerId);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SurfaceKind {
    /// Engine-bound video view; the engine keeps ownership of the visual.
    Live,
    /// Host-created fallback; destroyed when the surface is disposed.
    Placeholder,
}

/// The visible content of one slot.
#[derive(Debug)]
pub struct Surface {
    kind: SurfaceKind,
    visual: VisualId,
    parent: Option<ContainerId>,
}

impl Surface {
    /// Wrap an engine-provided visual.
    pub fn live(visual: VisualId) -> Self {
        Self {
            kind: SurfaceKind::Live,
            visual,
            parent: None,
        }
    }

    /// Create a fresh fallback placeholder via the host.
    pub fn placeholder(host: &dyn SurfaceHost) -> Self {
        Self {
            kind: SurfaceKind::Placeholder,
            visual: host.create_placeholder(),
            parent: None,
        }
    }

    pub fn is_live(&self) -> bool {
        self.kind == SurfaceKind::Live
    }

    pub fn visual(&self) -> VisualId {
        self.visual
    }

    pub fn parent(&self) -> Option<ContainerId> {
        self.parent
    }

    /// Attach to `container`, expand-to-fill.
    ///
    /// The surface must be detached. If the underlying visual still has a
    /// stray parent (an engine may hand over a visual it already put into a
    /// container of its own), that parent is removed first; a visual has
    /// exactly one parent at a time.
    pub fn attach(&mut self, host: &dyn SurfaceHost, container: ContainerId) {
        debug_assert!(self.parent.is_none(), "attach on an attached surface");

        if let Some(stray) = host.parent_of(self.visual) {
            host.remove_child(stray, self.visual);
        }

        host.add_child(container, self.visual);
        host.set_expand(self.visual);
        self.parent = Some(container);
    }

    /// Remove from the current parent, if any.
    pub fn detach(&mut self, host: &dyn SurfaceHost) {
        if let Some(parent) = self.parent.take() {
            host.remove_child(parent, self.visual);
        }
    }

    /// Detach and release. Placeholders are destroyed; live visuals stay
    /// alive because the engine owns them for as long as their pipeline
    /// exists.
    pub fn dispose(mut self, host: &dyn SurfaceHost) {
        self.detach(host);
        if self.kind == SurfaceKind::Placeholder {
            host.destroy_visual(self.visual);
        }
    }

    pub fn show(&self, host: &dyn SurfaceHost) {
        host.show(self.visual);
    }

    pub fn hide(&self, host: &dyn SurfaceHost) {
        host.hide(self.visual);
    }
}
