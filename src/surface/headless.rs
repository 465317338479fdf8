// src/surface/headless.rs

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use tracing::{trace, warn};

use super::{ContainerId, SurfaceHost, VisualId};

/// In-memory surface host.
///
/// Tracks containers, visuals, parent links and visibility without any real
/// widget system behind them. Used by the harness binary in place of the
/// display layer, and by tests to inspect what the supervisor did to the
/// surface tree.
#[derive(Debug, Default)]
pub struct HeadlessHost {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: u64,
    containers: HashSet<u64>,
    visuals: HashMap<u64, VisualState>,
}

#[derive(Debug, Default)]
struct VisualState {
    parent: Option<u64>,
    visible: bool,
    expand: bool,
}

impl Inner {
    fn fresh_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl HeadlessHost {
    /// Register a visual that was created outside the host, the way an
    /// engine's sink element brings its own video view into the widget
    /// system. Starts hidden and unparented, like any other visual.
    pub fn external_visual(&self) -> VisualId {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.fresh_id();
        inner.visuals.insert(id, VisualState::default());
        VisualId(id)
    }

    /// Children of a container, in no particular order.
    pub fn children_of(&self, container: ContainerId) -> Vec<VisualId> {
        let inner = self.inner.lock().unwrap();
        inner
            .visuals
            .iter()
            .filter(|(_, state)| state.parent == Some(container.0))
            .map(|(id, _)| VisualId(*id))
            .collect()
    }

    pub fn container_count(&self) -> usize {
        self.inner.lock().unwrap().containers.len()
    }

    pub fn visual_exists(&self, visual: VisualId) -> bool {
        self.inner.lock().unwrap().visuals.contains_key(&visual.0)
    }

    pub fn is_visible(&self, visual: VisualId) -> bool {
        self.inner
            .lock()
            .unwrap()
            .visuals
            .get(&visual.0)
            .map(|state| state.visible)
            .unwrap_or(false)
    }

    pub fn is_expanded(&self, visual: VisualId) -> bool {
        self.inner
            .lock()
            .unwrap()
            .visuals
            .get(&visual.0)
            .map(|state| state.expand)
            .unwrap_or(false)
    }
}

impl SurfaceHost for HeadlessHost {
    fn create_container(&self) -> ContainerId {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.fresh_id();
        inner.containers.insert(id);
        trace!(container = id, "container created");
        ContainerId(id)
    }

    fn create_placeholder(&self) -> VisualId {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.fresh_id();
        inner.visuals.insert(id, VisualState::default());
        trace!(visual = id, "placeholder created");
        VisualId(id)
    }

    fn add_child(&self, parent: ContainerId, child: VisualId) {
        let mut inner = self.inner.lock().unwrap();
        if !inner.containers.contains(&parent.0) {
            warn!(container = parent.0, "add_child to unknown container");
            return;
        }
        match inner.visuals.get_mut(&child.0) {
            Some(state) => {
                if let Some(previous) = state.parent.replace(parent.0) {
                    // Single-parent rule; the caller should have detached.
                    warn!(
                        visual = child.0,
                        previous, new = parent.0,
                        "visual reparented without detach"
                    );
                }
            }
            None => warn!(visual = child.0, "add_child with unknown visual"),
        }
    }

    fn remove_child(&self, parent: ContainerId, child: VisualId) {
        let mut inner = self.inner.lock().unwrap();
        match inner.visuals.get_mut(&child.0) {
            Some(state) if state.parent == Some(parent.0) => {
                state.parent = None;
            }
            Some(state) => warn!(
                visual = child.0,
                actual = ?state.parent,
                claimed = parent.0,
                "remove_child from a container that is not the parent"
            ),
            None => warn!(visual = child.0, "remove_child with unknown visual"),
        }
    }

    fn parent_of(&self, child: VisualId) -> Option<ContainerId> {
        self.inner
            .lock()
            .unwrap()
            .visuals
            .get(&child.0)
            .and_then(|state| state.parent)
            .map(ContainerId)
    }

    fn set_expand(&self, child: VisualId) {
        if let Some(state) = self.inner.lock().unwrap().visuals.get_mut(&child.0) {
            state.expand = true;
        }
    }

    fn show(&self, child: VisualId) {
        if let Some(state) = self.inner.lock().unwrap().visuals.get_mut(&child.0) {
            state.visible = true;
        }
    }

    fn hide(&self, child: VisualId) {
        if let Some(state) = self.inner.lock().unwrap().visuals.get_mut(&child.0) {
            state.visible = false;
        }
    }

    fn destroy_visual(&self, child: VisualId) {
        let mut inner = self.inner.lock().unwrap();
        if inner.visuals.remove(&child.0).is_none() {
            warn!(visual = child.0, "destroy of unknown visual");
        }
    }

    fn destroy_container(&self, container: ContainerId) {
        let mut inner = self.inner.lock().unwrap();
        if !inner.containers.remove(&container.0) {
            warn!(container = container.0, "destroy of unknown container");
            return;
        }
        // Destroying a container takes any remaining children with it.
        inner
            .visuals
            .retain(|_, state| state.parent != Some(container.0));
    }
}
