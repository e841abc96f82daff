use std;
use fnv::FnvHashMap;

use alg;
use entity;
use components::transform::Transform;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SceneError {
    InvalidHandle(entity::Handle),
    /// Attaching `child` under `parent` would create a cycle
    Cycle {
        parent: entity::Handle,
        child:  entity::Handle,
    },
}

impl std::fmt::Display for SceneError {
    fn fmt(&self, out: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            SceneError::InvalidHandle(handle) => {
                write!(out, "no scene node with handle {}", handle)
            },
            SceneError::Cycle { parent, child } => write!(
                out,
                "cannot attach {} under {}: it is the node itself or one of its ancestors",
                child,
                parent,
            ),
        }
    }
}

impl std::error::Error for SceneError {}

pub struct Node {
    pub name: String,
    pub transform: Transform,
    parent: Option<entity::Handle>, // Non-owning back-reference
    children: Vec<entity::Handle>,  // Owned, in insertion order
}

impl Node {
    fn new(name: String) -> Node {
        Node {
            name,
            transform: Transform::default(),
            parent: None,
            children: Vec::new(),
        }
    }

    #[inline]
    pub fn parent(&self) -> Option<entity::Handle> {
        self.parent
    }

    #[inline]
    pub fn children(&self) -> &[entity::Handle] {
        &self.children
    }
}

/// Tree of named nodes. Roots are owned by the scene, every other node
/// by its parent; removing a node removes its whole subtree.
pub struct Scene {
    entities: entity::Manager,
    nodes: FnvHashMap<entity::Handle, Node>,
    roots: Vec<entity::Handle>,
}

impl Default for Scene {
    fn default() -> Scene {
        Scene::new(16)
    }
}

impl Scene {
    pub fn new(hint: usize) -> Scene {
        Scene {
            entities: entity::Manager::new(hint),
            nodes: FnvHashMap::with_capacity_and_hasher(
                hint,
                Default::default(),
            ),
            roots: Vec::with_capacity(hint),
        }
    }

    /// Adds a parentless node at the end of the root list
    pub fn add_root<S: Into<String>>(&mut self, name: S) -> entity::Handle {
        let handle = self.entities.add();
        let node = Node::new(name.into());

        debug!("added root {} \"{}\"", handle, node.name);

        self.nodes.insert(handle, node);
        self.roots.push(handle);

        handle
    }

    /// Adds a node owned by nothing yet; it is not drawn or walked until
    /// attached with `add_child` or `detach`
    pub fn add_node<S: Into<String>>(&mut self, name: S) -> entity::Handle {
        let handle = self.entities.add();
        let node = Node::new(name.into());

        debug!("added node {} \"{}\"", handle, node.name);

        self.nodes.insert(handle, node);
        handle
    }

    /// Adds `child` under `parent`. \
    /// `None` is ignored. A child already under `parent` is left in place;
    /// a child owned elsewhere (including a root) is moved.
    pub fn add_child(
        &mut self,
        parent: entity::Handle,
        child:  Option<entity::Handle>,
    ) -> Result<(), SceneError> {
        let child = match child {
            Some(child) => child,
            None => return Ok(()),
        };

        self.validate(parent)?;
        self.validate(child)?;

        if self.is_ancestor_or_self(child, parent) {
            return Err(SceneError::Cycle { parent, child });
        }

        if self.nodes[&child].parent == Some(parent) {
            return Ok(());
        }

        self.unlink(child);

        self.nodes.get_mut(&child)
            .ok_or(SceneError::InvalidHandle(child))?
            .parent = Some(parent);

        self.nodes.get_mut(&parent)
            .ok_or(SceneError::InvalidHandle(parent))?
            .children.push(child);

        debug!("attached {} under {}", child, parent);

        Ok(())
    }

    /// Creates a new node directly under `parent`
    pub fn spawn_child<S: Into<String>>(
        &mut self,
        parent: entity::Handle,
        name:   S,
    ) -> Result<entity::Handle, SceneError> {
        self.validate(parent)?;

        let child = self.add_node(name);
        self.add_child(parent, Some(child))?;

        Ok(child)
    }

    /// Turns `handle` into a root, appended after the existing roots
    pub fn detach(&mut self, handle: entity::Handle) -> Result<(), SceneError> {
        self.validate(handle)?;

        if self.nodes[&handle].parent.is_none() && self.roots.contains(&handle) {
            return Ok(());
        }

        self.unlink(handle);
        self.roots.push(handle);

        debug!("detached {}", handle);

        Ok(())
    }

    /// Removes `handle` and all of its descendants,
    /// returning how many nodes were removed
    pub fn remove(&mut self, handle: entity::Handle) -> Result<usize, SceneError> {
        self.validate(handle)?;

        self.unlink(handle);

        let mut pending = vec![handle];
        let mut removed = 0;

        while let Some(next) = pending.pop() {
            if let Some(node) = self.nodes.remove(&next) {
                pending.extend(node.children);
                self.entities.remove(next);
                removed += 1;
            }
        }

        debug!("removed {} ({} nodes)", handle, removed);

        Ok(removed)
    }

    pub fn get(&self, handle: entity::Handle) -> Option<&Node> {
        self.nodes.get(&handle)
    }

    pub fn get_mut(&mut self, handle: entity::Handle) -> Option<&mut Node> {
        self.nodes.get_mut(&handle)
    }

    pub fn contains(&self, handle: entity::Handle) -> bool {
        self.nodes.contains_key(&handle)
    }

    pub fn parent(&self, handle: entity::Handle) -> Option<entity::Handle> {
        self.nodes.get(&handle).and_then(|node| node.parent)
    }

    /// Empty for unknown handles
    pub fn children(&self, handle: entity::Handle) -> &[entity::Handle] {
        self.nodes.get(&handle)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn roots(&self) -> &[entity::Handle] {
        &self.roots
    }

    pub fn count(&self) -> usize {
        debug_assert!(self.nodes.len() == self.entities.count());
        self.nodes.len()
    }

    /// `parent_global * local`, folded up the parent chain
    pub fn global_matrix(
        &self,
        handle: entity::Handle,
    ) -> Result<alg::Mat, SceneError> {
        let node = self.nodes.get(&handle)
            .ok_or(SceneError::InvalidHandle(handle))?;

        let mut result = node.transform.local_matrix();
        let mut next = node.parent;

        while let Some(ancestor) = next {
            let node = self.nodes.get(&ancestor)
                .ok_or(SceneError::InvalidHandle(ancestor))?;

            result = node.transform.local_matrix() * result;
            next = node.parent;
        }

        Ok(result)
    }

    /// Pre-order walk over every tree, roots and children in insertion order
    pub fn depth_first<'a>(&'a self) -> DepthFirst<'a> {
        DepthFirst {
            scene: self,
            stack: self.roots.iter().rev().map(|root| (*root, 0)).collect(),
        }
    }

    fn validate(&self, handle: entity::Handle) -> Result<(), SceneError> {
        if self.nodes.contains_key(&handle) {
            Ok(())
        } else {
            Err(SceneError::InvalidHandle(handle))
        }
    }

    fn is_ancestor_or_self(
        &self,
        ancestor: entity::Handle,
        handle:   entity::Handle,
    ) -> bool {
        let mut next = Some(handle);

        while let Some(current) = next {
            if current == ancestor {
                return true;
            }

            next = self.parent(current);
        }

        false
    }

    // Remove from the parent's child list or from the roots
    fn unlink(&mut self, handle: entity::Handle) {
        let parent = self.nodes.get_mut(&handle)
            .and_then(|node| node.parent.take());

        match parent {
            Some(parent) => {
                if let Some(node) = self.nodes.get_mut(&parent) {
                    node.children.retain(|child| *child != handle);
                }
            },
            None => self.roots.retain(|root| *root != handle),
        }
    }
}

pub struct DepthFirst<'a> {
    scene: &'a Scene,
    stack: Vec<(entity::Handle, usize)>,
}

impl<'a> Iterator for DepthFirst<'a> {
    /// Handle, node, and depth (roots are at depth zero)
    type Item = (entity::Handle, &'a Node, usize);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((handle, depth)) = self.stack.pop() {
            let node = match self.scene.nodes.get(&handle) {
                Some(node) => node,
                None => continue,
            };

            self.stack.extend(
                node.children.iter().rev().map(|child| (*child, depth + 1))
            );

            return Some((handle, node, depth));
        }

        None
    }
}
