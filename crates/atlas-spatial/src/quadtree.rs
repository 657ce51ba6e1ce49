use glam::Vec2;

use crate::Quad;

/// Default capacity of a leaf before it subdivides.
pub const DEFAULT_MIN_CELL_SIZE: usize = 1;
/// Default cap on subdivision depth.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Handle to a node in the tree's arena.
///
/// Handles are returned by insertion and stay usable for read-only walks
/// until a removal collapses the node they point to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Where an entry is anchored: a single point or an axis-aligned region.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Geometry {
    Point(Vec2),
    Region(Quad),
}

/// An element stored in the tree together with its anchor.
#[derive(Debug, Clone)]
struct Entry<T> {
    element: T,
    geometry: Geometry,
}

/// A node is either a leaf holding entries or an internal node with exactly
/// four children in NW, NE, SW, SE order. Internal nodes never hold entries.
#[derive(Debug)]
enum NodeKind<T> {
    Leaf { entries: Vec<Entry<T>> },
    Internal { children: [NodeId; 4] },
}

#[derive(Debug)]
struct Node<T> {
    bounds: Quad,
    depth: usize,
    parent: Option<NodeId>,
    kind: NodeKind<T>,
}

/// A region quadtree for 2D map queries.
///
/// Stores elements keyed by a point or by an axis-aligned region and answers
/// containment, viewport and nearest-neighbor queries by recursive
/// subdivision. Nodes live in an arena addressed by [`NodeId`]; freed nodes
/// are reused through a free list.
///
/// The tree is single-writer and fully synchronous. Mutation while other
/// reads are in flight must be serialized by the caller.
///
/// # Type Parameters
///
/// * `T` - The element handle stored with each anchor. Expected to be a
///   lightweight, id-like value: region insertion clones it and removal
///   compares it with `==`.
///
/// # Example
///
/// ```
/// use atlas_spatial::{Quad, Quadtree};
/// use glam::Vec2;
///
/// let bounds = Quad::new(Vec2::ZERO, Vec2::splat(100.0));
/// let mut tree = Quadtree::new(bounds);
///
/// tree.insert(Vec2::new(10.0, 20.0), "cafe").unwrap();
/// tree.insert(Vec2::new(80.0, 64.0), "park").unwrap();
///
/// let viewport = Quad::new(Vec2::ZERO, Vec2::splat(50.0));
/// let visible: Vec<_> = tree.query_region(&viewport).collect();
/// assert_eq!(visible, vec![&"cafe"]);
/// ```
#[derive(Debug)]
pub struct Quadtree<T> {
    nodes: Vec<Node<T>>,
    free: Vec<NodeId>,
    root: NodeId,
    min_cell_size: usize,
    max_depth: usize,
}

impl<T> Quadtree<T> {
    /// Creates a tree over `bounds` with the default capacity and depth cap.
    pub fn new(bounds: Quad) -> Self {
        Self::with_limits(bounds, DEFAULT_MIN_CELL_SIZE, DEFAULT_MAX_DEPTH)
    }

    /// Creates a tree over `bounds`.
    ///
    /// `min_cell_size` is the number of entries a leaf holds before it
    /// subdivides (clamped to at least 1); `max_depth` caps subdivision, and
    /// a leaf at the cap keeps accepting entries past capacity.
    pub fn with_limits(bounds: Quad, min_cell_size: usize, max_depth: usize) -> Self {
        Self {
            nodes: vec![Node {
                bounds,
                depth: 0,
                parent: None,
                kind: NodeKind::Leaf {
                    entries: Vec::new(),
                },
            }],
            free: Vec::new(),
            root: NodeId(0),
            min_cell_size: min_cell_size.max(1),
            max_depth,
        }
    }

    /// Returns the bounds of the whole tree.
    pub fn bounds(&self) -> Quad {
        self.nodes[self.root.0].bounds
    }

    /// Returns the root node handle.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Returns the bounds of a node.
    pub fn node_bounds(&self, id: NodeId) -> Quad {
        self.nodes[id.0].bounds
    }

    /// Returns a node's children in NW, NE, SW, SE order, or `None` for a
    /// leaf.
    pub fn node_children(&self, id: NodeId) -> Option<[NodeId; 4]> {
        match &self.nodes[id.0].kind {
            NodeKind::Internal { children } => Some(*children),
            NodeKind::Leaf { .. } => None,
        }
    }

    /// Collects the bounds of every live node in depth-first NW, NE, SW, SE
    /// order, each paired with whether that node is subdivided.
    ///
    /// This is the read-only feed for debug overlays; it never mutates the
    /// tree.
    pub fn quads(&self) -> Vec<(Quad, bool)> {
        let mut out = Vec::new();
        self.collect_quads(self.root, &mut out);
        out
    }

    fn collect_quads(&self, id: NodeId, out: &mut Vec<(Quad, bool)>) {
        let node = &self.nodes[id.0];
        match &node.kind {
            NodeKind::Leaf { .. } => out.push((node.bounds, false)),
            NodeKind::Internal { children } => {
                out.push((node.bounds, true));
                for &child in children {
                    self.collect_quads(child, out);
                }
            }
        }
    }

    /// Returns the number of stored entries.
    ///
    /// A region entry counts once per leaf it occupies.
    pub fn len(&self) -> usize {
        self.count(self.root)
    }

    /// Returns `true` if the tree holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn count(&self, id: NodeId) -> usize {
        match &self.nodes[id.0].kind {
            NodeKind::Leaf { entries } => entries.len(),
            NodeKind::Internal { children } => {
                children.iter().map(|&child| self.count(child)).sum()
            }
        }
    }

    /// Removes every entry, resetting the tree to a single empty leaf with
    /// the same bounds and limits.
    pub fn clear(&mut self) {
        let bounds = self.bounds();
        self.nodes.clear();
        self.free.clear();
        self.nodes.push(Node {
            bounds,
            depth: 0,
            parent: None,
            kind: NodeKind::Leaf {
                entries: Vec::new(),
            },
        });
        self.root = NodeId(0);
    }

    fn alloc(&mut self, bounds: Quad, depth: usize, parent: NodeId) -> NodeId {
        let node = Node {
            bounds,
            depth,
            parent: Some(parent),
            kind: NodeKind::Leaf {
                entries: Vec::new(),
            },
        };
        match self.free.pop() {
            Some(id) => {
                self.nodes[id.0] = node;
                id
            }
            None => {
                let id = NodeId(self.nodes.len());
                self.nodes.push(node);
                id
            }
        }
    }

    fn release(&mut self, id: NodeId) {
        self.nodes[id.0].kind = NodeKind::Leaf {
            entries: Vec::new(),
        };
        self.free.push(id);
    }

    fn leaf_len(&self, id: NodeId) -> usize {
        match &self.nodes[id.0].kind {
            NodeKind::Leaf { entries } => entries.len(),
            NodeKind::Internal { .. } => 0,
        }
    }

    fn push_entry(&mut self, id: NodeId, entry: Entry<T>) {
        if let NodeKind::Leaf { entries } = &mut self.nodes[id.0].kind {
            entries.push(entry);
        }
    }
}

impl<T: Clone> Quadtree<T> {
    /// Inserts an element anchored at `point`.
    ///
    /// Returns the node the element now resides in, or `None` if the point
    /// lies outside the tree bounds. Boundary points shared by sibling
    /// quadrants land in the first containing child in NW, NE, SW, SE order.
    pub fn insert(&mut self, point: Vec2, element: T) -> Option<NodeId> {
        self.insert_point_at(self.root, point, element)
    }

    fn insert_point_at(&mut self, id: NodeId, point: Vec2, element: T) -> Option<NodeId> {
        if !self.nodes[id.0].bounds.contains(point) {
            return None;
        }

        let children = match self.node_children(id) {
            Some(children) => children,
            None => {
                let at_depth_cap = self.nodes[id.0].depth == self.max_depth;
                if self.leaf_len(id) < self.min_cell_size || at_depth_cap {
                    self.push_entry(
                        id,
                        Entry {
                            element,
                            geometry: Geometry::Point(point),
                        },
                    );
                    return Some(id);
                }
                self.subdivide(id)
            }
        };

        for child in children {
            if self.nodes[child.0].bounds.contains(point) {
                return self.insert_point_at(child, point, element);
            }
        }
        None
    }

    /// Inserts an element anchored at an axis-aligned region.
    ///
    /// Children are matched by intersection, so one region can land in
    /// several leaves at once; the returned list names every node that
    /// received a copy. Returns `None` if the region does not intersect the
    /// tree bounds at all. A region under capacity at a leaf is stored once
    /// there, not fanned out.
    pub fn insert_region(&mut self, region: Quad, element: T) -> Option<Vec<NodeId>> {
        let mut placed = Vec::new();
        self.insert_region_at(self.root, region, &element, &mut placed);
        if placed.is_empty() { None } else { Some(placed) }
    }

    fn insert_region_at(
        &mut self,
        id: NodeId,
        region: Quad,
        element: &T,
        placed: &mut Vec<NodeId>,
    ) {
        if !self.nodes[id.0].bounds.intersects(&region) {
            return;
        }

        let children = match self.node_children(id) {
            Some(children) => children,
            None => {
                let at_depth_cap = self.nodes[id.0].depth == self.max_depth;
                if self.leaf_len(id) < self.min_cell_size || at_depth_cap {
                    self.push_entry(
                        id,
                        Entry {
                            element: element.clone(),
                            geometry: Geometry::Region(region),
                        },
                    );
                    placed.push(id);
                    return;
                }
                self.subdivide(id)
            }
        };

        for child in children {
            self.insert_region_at(child, region, element, placed);
        }
    }

    /// Splits a leaf into four children and redistributes its entries under
    /// the normal insertion rules, which may cascade further subdivisions.
    /// The node itself ends up internal with an empty entry list.
    fn subdivide(&mut self, id: NodeId) -> [NodeId; 4] {
        let (bounds, depth) = {
            let node = &self.nodes[id.0];
            (node.bounds, node.depth)
        };
        let children = bounds.quadrants().map(|quad| self.alloc(quad, depth + 1, id));

        let entries = match &mut self.nodes[id.0].kind {
            NodeKind::Leaf { entries } => std::mem::take(entries),
            NodeKind::Internal { .. } => Vec::new(),
        };
        self.nodes[id.0].kind = NodeKind::Internal { children };

        for entry in entries {
            match entry.geometry {
                Geometry::Point(point) => {
                    let _ = self.insert_point_at(id, point, entry.element);
                }
                Geometry::Region(region) => {
                    let mut placed = Vec::new();
                    self.insert_region_at(id, region, &entry.element, &mut placed);
                }
            }
        }
        children
    }
}

impl<T> Quadtree<T> {
    /// Returns every element whose leaf contains `point`, in depth-first NW,
    /// NE, SW, SE order.
    ///
    /// A leaf contributes all of its entries: point entries were already
    /// routed here by insertion, and region entries stored at the leaf are
    /// included as well, without per-entry filtering. A point on a shared
    /// quadrant boundary is contained by both siblings, so such a query can
    /// report the contents of more than one leaf.
    pub fn query_point(&self, point: Vec2) -> impl Iterator<Item = &T> {
        let mut results = Vec::new();
        self.query_point_at(self.root, point, &mut results);
        results.into_iter()
    }

    fn query_point_at<'a>(&'a self, id: NodeId, point: Vec2, results: &mut Vec<&'a T>) {
        let node = &self.nodes[id.0];
        if !node.bounds.contains(point) {
            return;
        }
        match &node.kind {
            NodeKind::Leaf { entries } => {
                for entry in entries {
                    results.push(&entry.element);
                }
            }
            NodeKind::Internal { children } => {
                for &child in children {
                    self.query_point_at(child, point, results);
                }
            }
        }
    }

    /// Returns every element visible in `region`, in depth-first NW, NE, SW,
    /// SE order.
    ///
    /// A point entry matches when the query rectangle contains it; a region
    /// entry matches when the two rectangles intersect. A region entry
    /// spanning several leaves is reported once per leaf; duplicates are not
    /// removed.
    pub fn query_region(&self, region: &Quad) -> impl Iterator<Item = &T> {
        let mut results = Vec::new();
        self.query_region_at(self.root, region, &mut results);
        results.into_iter()
    }

    fn query_region_at<'a>(&'a self, id: NodeId, region: &Quad, results: &mut Vec<&'a T>) {
        let node = &self.nodes[id.0];
        if !node.bounds.intersects(region) {
            return;
        }
        match &node.kind {
            NodeKind::Leaf { entries } => {
                for entry in entries {
                    let hit = match entry.geometry {
                        Geometry::Point(point) => region.contains(point),
                        Geometry::Region(stored) => stored.intersects(region),
                    };
                    if hit {
                        results.push(&entry.element);
                    }
                }
            }
            NodeKind::Internal { children } => {
                for &child in children {
                    self.query_region_at(child, region, results);
                }
            }
        }
    }

    /// Finds the element nearest to `query`.
    ///
    /// Equivalent to [`Quadtree::nearest_where`] with an accept-all filter.
    pub fn nearest(&self, query: Vec2) -> Option<&T> {
        self.nearest_where(query, |_| true)
    }

    /// Finds the element nearest to `query` among those accepted by
    /// `filter`, or `None` when nothing reachable is accepted.
    ///
    /// Branch-and-bound over the children in fixed NW, NE, SW, SE order,
    /// threading the best candidate through the traversal; an exact distance
    /// tie keeps the earlier-found element.
    ///
    /// Two behaviors are kept compatible with the system this tree was
    /// ported from rather than corrected:
    ///
    /// * Until a first candidate is found, the pruning radius at a node
    ///   falls back to the node's own minimum x coordinate instead of an
    ///   unbounded sentinel. The radius is under-estimated on the first
    ///   probe, so a query point outside the tree bounds returns `None`
    ///   even when the tree is not empty.
    /// * The distance to a region entry is zero when the query point lies
    ///   inside it and is otherwise measured to the region's max corner
    ///   only, not to its nearest corner or edge.
    pub fn nearest_where<F>(&self, query: Vec2, filter: F) -> Option<&T>
    where
        F: Fn(&T) -> bool,
    {
        let mut best: Option<(&T, f32)> = None;
        self.nearest_at(self.root, query, &filter, &mut best);
        best.map(|(element, _)| element)
    }

    fn nearest_at<'a, F>(
        &'a self,
        id: NodeId,
        query: Vec2,
        filter: &F,
        best: &mut Option<(&'a T, f32)>,
    ) where
        F: Fn(&T) -> bool,
    {
        let node = &self.nodes[id.0];

        // Min-x fallback before the first candidate, see nearest_where.
        let budget = best.as_ref().map_or(node.bounds.min.x, |&(_, distance)| distance);
        if query.x + budget < node.bounds.min.x
            || query.x - budget > node.bounds.max.x
            || query.y + budget < node.bounds.min.y
            || query.y - budget > node.bounds.max.y
        {
            return;
        }

        match &node.kind {
            NodeKind::Leaf { entries } => {
                for entry in entries {
                    if !filter(&entry.element) {
                        continue;
                    }
                    let distance = match entry.geometry {
                        Geometry::Point(point) => query.distance(point),
                        Geometry::Region(region) => {
                            if region.contains(query) {
                                0.0
                            } else {
                                query.distance(region.max)
                            }
                        }
                    };
                    if best.as_ref().is_none_or(|&(_, nearest)| distance < nearest) {
                        *best = Some((&entry.element, distance));
                    }
                }
            }
            NodeKind::Internal { children } => {
                for &child in children {
                    self.nearest_at(child, query, filter, best);
                }
            }
        }
    }
}

impl<T: PartialEq> Quadtree<T> {
    /// Removes `element` wherever it is stored, reporting whether anything
    /// was removed.
    ///
    /// The walk is exhaustive: every child is searched regardless of the
    /// stored geometry, so removal still works when the caller's data has
    /// moved since insertion. A region element fanned out over several
    /// leaves is removed from each of them. Emptying a leaf invites its
    /// parent to collapse its children, one level at most: the parent
    /// reverts to a leaf only when all four children are empty leaves, and
    /// a subdivided child blocks the merge.
    pub fn remove(&mut self, element: &T) -> bool {
        self.remove_at(self.root, element)
    }

    fn remove_at(&mut self, id: NodeId, element: &T) -> bool {
        if let Some(children) = self.node_children(id) {
            let mut removed = false;
            for child in children {
                removed |= self.remove_at(child, element);
            }
            return removed;
        }

        let (found, emptied) = match &mut self.nodes[id.0].kind {
            NodeKind::Leaf { entries } => {
                match entries.iter().position(|entry| entry.element == *element) {
                    Some(index) => {
                        entries.remove(index);
                        (true, entries.is_empty())
                    }
                    None => (false, false),
                }
            }
            NodeKind::Internal { .. } => (false, false),
        };

        if found && emptied {
            if let Some(parent) = self.nodes[id.0].parent {
                self.unify(parent);
            }
        }
        found
    }
}

impl<T> Quadtree<T> {
    /// Collapses a node's four children back into it when all four are
    /// leaves with no entries, returning the node to leaf state and the
    /// children to the free list.
    ///
    /// A subdivided child blocks the collapse even when its own subtree is
    /// empty; the merge is never attempted more than one level at a time.
    fn unify(&mut self, id: NodeId) {
        let children = match &self.nodes[id.0].kind {
            NodeKind::Internal { children } => *children,
            NodeKind::Leaf { .. } => return,
        };
        let collapsible = children.iter().all(|&child| {
            matches!(&self.nodes[child.0].kind, NodeKind::Leaf { entries } if entries.is_empty())
        });
        if !collapsible {
            return;
        }
        for child in children {
            self.release(child);
        }
        self.nodes[id.0].kind = NodeKind::Leaf {
            entries: Vec::new(),
        };
    }
}
