//! Hierarchical coordinate frames
//!
//! Frames form a forest: every frame stores its own transform state plus a
//! parent link, and a root is a frame whose parent is itself. Frames live in
//! a generational arena ([`FrameTree`]) and are addressed by [`FrameId`]
//! handles validated on every dereference, so a dangling parent shows up as
//! an error instead of undefined behavior.
//!
//! Transform resolution ([`FrameTree::resolve`]) walks both frames to their
//! roots and fails if the walks end at different roots or pass through a
//! missing node. Walks are bounded by [`MAX_FRAME_DEPTH`] hops, which doubles
//! as the cycle guard: a parent loop cannot hang the engine, it errors.

use slotmap::{new_key_type, SlotMap};
use thiserror::Error;

use crate::foundation::math::Vec2;
use crate::geometry::transform::Transform;

new_key_type! {
    /// Stable handle to a frame in a [`FrameTree`]
    pub struct FrameId;
}

/// Upper bound on parent-chain length before a walk is treated as cyclic
pub const MAX_FRAME_DEPTH: usize = 64;

/// Errors from frame lookups and transform resolution
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// A frame handle passed directly to an operation no longer resolves
    #[error("unknown frame handle")]
    UnknownFrame,

    /// A parent link points at a frame that no longer exists
    #[error("broken frame chain: parent frame no longer exists")]
    BrokenChain,

    /// Two frames do not share a root and cannot be related
    #[error("incompatible universes: frames do not share a root")]
    IncompatibleUniverses,

    /// A parent chain exceeded [`MAX_FRAME_DEPTH`] hops without reaching a root
    #[error("frame chain exceeded {MAX_FRAME_DEPTH} hops; parent cycle suspected")]
    DepthExceeded,
}

#[derive(Debug, Clone, Copy)]
struct FrameNode {
    position: Vec2,
    rotation: f32,
    origin: Vec2,
    zoom: f32,
    parent: FrameId,
}

impl FrameNode {
    fn transform(&self) -> Transform {
        Transform {
            position: self.position,
            rotation: self.rotation,
            origin: self.origin,
            zoom: self.zoom,
        }
    }
}

/// Arena of coordinate frames supporting transform resolution between any
/// two frames sharing a root
#[derive(Debug, Default)]
pub struct FrameTree {
    nodes: SlotMap<FrameId, FrameNode>,
}

impl FrameTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new root frame (its own parent) with identity state
    pub fn insert_root(&mut self) -> FrameId {
        self.insert_root_with(Transform::identity())
    }

    /// Insert a new root frame with the given initial state
    pub fn insert_root_with(&mut self, transform: Transform) -> FrameId {
        self.nodes.insert_with_key(|key| FrameNode {
            position: transform.position,
            rotation: transform.rotation,
            origin: transform.origin,
            zoom: transform.zoom,
            parent: key,
        })
    }

    /// Insert a new frame with identity state under the given parent
    pub fn insert_child(&mut self, parent: FrameId) -> Result<FrameId, FrameError> {
        self.insert_child_with(parent, Transform::identity())
    }

    /// Insert a new frame with the given initial state under the given parent
    pub fn insert_child_with(
        &mut self,
        parent: FrameId,
        transform: Transform,
    ) -> Result<FrameId, FrameError> {
        if !self.nodes.contains_key(parent) {
            return Err(FrameError::UnknownFrame);
        }
        Ok(self.nodes.insert(FrameNode {
            position: transform.position,
            rotation: transform.rotation,
            origin: transform.origin,
            zoom: transform.zoom,
            parent,
        }))
    }

    /// Remove a frame.
    ///
    /// Children of the removed frame are not touched; resolving through them
    /// afterwards reports [`FrameError::BrokenChain`]. Returns whether the
    /// handle was live.
    pub fn remove(&mut self, frame: FrameId) -> bool {
        self.nodes.remove(frame).is_some()
    }

    /// Whether the handle refers to a live frame
    pub fn contains(&self, frame: FrameId) -> bool {
        self.nodes.contains_key(frame)
    }

    /// Number of live frames
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds no frames
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Reparent a frame. Passing the frame itself as the parent turns it
    /// into a root.
    pub fn set_parent(&mut self, frame: FrameId, parent: FrameId) -> Result<(), FrameError> {
        if !self.nodes.contains_key(parent) {
            return Err(FrameError::UnknownFrame);
        }
        let node = self.nodes.get_mut(frame).ok_or(FrameError::UnknownFrame)?;
        node.parent = parent;
        Ok(())
    }

    /// Detach a frame from its parent, making it a root
    pub fn detach(&mut self, frame: FrameId) -> Result<(), FrameError> {
        let node = self.nodes.get_mut(frame).ok_or(FrameError::UnknownFrame)?;
        node.parent = frame;
        Ok(())
    }

    /// The frame's parent handle (itself for roots)
    pub fn parent(&self, frame: FrameId) -> Result<FrameId, FrameError> {
        self.node(frame).map(|n| n.parent)
    }

    /// Whether the frame is a root
    pub fn is_root(&self, frame: FrameId) -> Result<bool, FrameError> {
        self.node(frame).map(|n| n.parent == frame)
    }

    /// Position relative to the parent frame
    pub fn position(&self, frame: FrameId) -> Result<Vec2, FrameError> {
        self.node(frame).map(|n| n.position)
    }

    /// Set the position relative to the parent frame
    pub fn set_position(&mut self, frame: FrameId, position: Vec2) -> Result<(), FrameError> {
        self.node_mut(frame)?.position = position;
        Ok(())
    }

    /// Translate the frame by a displacement
    pub fn move_by(&mut self, frame: FrameId, displacement: Vec2) -> Result<(), FrameError> {
        let node = self.node_mut(frame)?;
        node.position += displacement;
        Ok(())
    }

    /// Rotation in degrees relative to the parent frame
    pub fn rotation(&self, frame: FrameId) -> Result<f32, FrameError> {
        self.node(frame).map(|n| n.rotation)
    }

    /// Set the rotation in degrees
    pub fn set_rotation(&mut self, frame: FrameId, rotation: f32) -> Result<(), FrameError> {
        self.node_mut(frame)?.rotation = rotation;
        Ok(())
    }

    /// Rotate the frame by an angle in degrees
    pub fn rotate_by(&mut self, frame: FrameId, degrees: f32) -> Result<(), FrameError> {
        let node = self.node_mut(frame)?;
        node.rotation += degrees;
        Ok(())
    }

    /// The frame's origin (pivot)
    pub fn origin(&self, frame: FrameId) -> Result<Vec2, FrameError> {
        self.node(frame).map(|n| n.origin)
    }

    /// Set the frame's origin (pivot)
    pub fn set_origin(&mut self, frame: FrameId, origin: Vec2) -> Result<(), FrameError> {
        self.node_mut(frame)?.origin = origin;
        Ok(())
    }

    /// The frame's zoom factor
    pub fn zoom(&self, frame: FrameId) -> Result<f32, FrameError> {
        self.node(frame).map(|n| n.zoom)
    }

    /// Set the frame's zoom factor
    pub fn set_zoom(&mut self, frame: FrameId, zoom: f32) -> Result<(), FrameError> {
        self.node_mut(frame)?.zoom = zoom;
        Ok(())
    }

    /// The transform mapping this frame's local space into its parent's
    pub fn transform_from_parent(&self, frame: FrameId) -> Result<Transform, FrameError> {
        self.node(frame).map(FrameNode::transform)
    }

    /// The transform mapping this frame's local space into its root's.
    ///
    /// The root's own transform state is never part of the result; a root
    /// resolves to the identity.
    pub fn transform_from_root(&self, frame: FrameId) -> Result<Transform, FrameError> {
        self.walk_to_root(frame).map(|(transform, _)| transform)
    }

    /// The root frame this frame's parent chain terminates at
    pub fn root_of(&self, frame: FrameId) -> Result<FrameId, FrameError> {
        self.walk_to_root(frame).map(|(_, root)| root)
    }

    /// Resolve the transform mapping `from`-local points into `to`-local
    /// points. `None` targets the root of `from`'s tree.
    ///
    /// Fails with [`FrameError::IncompatibleUniverses`] when the two frames
    /// live in disjoint trees, and [`FrameError::BrokenChain`] when a parent
    /// link no longer resolves. Pure query, O(chain depth), no caching.
    pub fn resolve(&self, from: FrameId, to: Option<FrameId>) -> Result<Transform, FrameError> {
        let (source, source_root) = self.walk_to_root(from)?;
        let Some(target) = to else {
            return Ok(source);
        };
        let (target_walk, target_root) = self.walk_to_root(target)?;
        if source_root != target_root {
            return Err(FrameError::IncompatibleUniverses);
        }
        Ok(target_walk.inverse().compose(&source))
    }

    /// Compose parent transforms from `start` up to its root.
    ///
    /// Accumulates on the right so the result equals the root-to-leaf
    /// composition without materializing the chain.
    fn walk_to_root(&self, start: FrameId) -> Result<(Transform, FrameId), FrameError> {
        let first = self.nodes.get(start).ok_or(FrameError::UnknownFrame)?;
        if first.parent == start {
            return Ok((Transform::identity(), start));
        }

        let mut acc = first.transform();
        let mut current = first.parent;
        for _ in 0..MAX_FRAME_DEPTH {
            let node = self.nodes.get(current).ok_or(FrameError::BrokenChain)?;
            if node.parent == current {
                return Ok((acc, current));
            }
            acc = node.transform().compose(&acc);
            current = node.parent;
        }
        Err(FrameError::DepthExceeded)
    }

    fn node(&self, frame: FrameId) -> Result<&FrameNode, FrameError> {
        self.nodes.get(frame).ok_or(FrameError::UnknownFrame)
    }

    fn node_mut(&mut self, frame: FrameId) -> Result<&mut FrameNode, FrameError> {
        self.nodes.get_mut(frame).ok_or(FrameError::UnknownFrame)
    }
}
