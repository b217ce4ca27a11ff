use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use super::controller::ProfileController;

struct MountedView {
    controller: Arc<ProfileController>,
    /// Username of the session that mounted the view; `None` when anonymous.
    owner: Option<String>,
}

/// Mounted profile views, addressed by view id.
///
/// Holds at most `capacity` views. When full, a new view evicts the oldest
/// view of the same owner, else the oldest anonymous view, else the oldest
/// overall. The caller is expected to unmount whatever comes back.
pub struct ViewRegistry {
    views: HashMap<String, MountedView>,
    order: VecDeque<String>,
    capacity: usize,
}

impl ViewRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            views: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Register a view under a fresh id. Returns the id and the evicted
    /// view, if any.
    pub fn register(
        &mut self,
        controller: Arc<ProfileController>,
        owner: Option<String>,
    ) -> (String, Option<Arc<ProfileController>>) {
        let evicted = if self.views.len() >= self.capacity {
            self.evict_for(owner.as_deref())
        } else {
            None
        };

        let id = uuid::Uuid::now_v7().to_string();
        self.views.insert(id.clone(), MountedView { controller, owner });
        self.order.push_back(id.clone());
        (id, evicted)
    }

    pub fn get(&self, id: &str) -> Option<Arc<ProfileController>> {
        self.views.get(id).map(|view| view.controller.clone())
    }

    pub fn remove(&mut self, id: &str) -> Option<Arc<ProfileController>> {
        let removed = self.views.remove(id)?;
        self.order.retain(|existing| existing != id);
        Some(removed.controller)
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    fn evict_for(&mut self, owner: Option<&str>) -> Option<Arc<ProfileController>> {
        let owned_by = |id: &String, wanted: Option<&str>| {
            self.views
                .get(id)
                .is_some_and(|view| view.owner.as_deref() == wanted)
        };
        let position = self
            .order
            .iter()
            .position(|id| owned_by(id, owner))
            .or_else(|| self.order.iter().position(|id| owned_by(id, None)))
            .or_else(|| (!self.order.is_empty()).then_some(0))?;

        let id = self.order.remove(position)?;
        tracing::debug!(view_id = %id, "evicting view");
        self.views.remove(&id).map(|view| view.controller)
    }
}
