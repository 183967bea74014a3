// Fixed-dimension k-d tree backing both action models

/// Dimensionality of every index key (one per feature).
pub const DIMS: usize = 4;

/// Euclidean distance between two keys.
pub fn key_distance(a: &[f32; DIMS], b: &[f32; DIMS]) -> f32 {
    let mut sum = 0.0;
    for dim in 0..DIMS {
        let d = a[dim] - b[dim];
        sum += d * d;
    }
    sum.sqrt()
}

struct Node<T> {
    key: [f32; DIMS],
    value: T,
    left: Option<Box<Node<T>>>,
    right: Option<Box<Node<T>>>,
}

/// An approximate-nearest-neighbor index over voxel keys.
///
/// Supports radius queries and insertion only: entries are never evicted,
/// matching the session-lifetime growth of the learned models. The
/// upsert-by-radius policy lives in the models, not here - callers query
/// within their match radius first and insert only on a miss.
pub struct KdTree<T> {
    root: Option<Box<Node<T>>>,
    len: usize,
}

impl<T> KdTree<T> {
    pub fn new() -> Self {
        Self { root: None, len: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn insert(&mut self, key: [f32; DIMS], value: T) {
        let mut depth = 0;
        let mut slot = &mut self.root;
        while let Some(node) = slot {
            let axis = depth % DIMS;
            slot = if key[axis] < node.key[axis] {
                &mut node.left
            } else {
                &mut node.right
            };
            depth += 1;
        }
        *slot = Some(Box::new(Node {
            key,
            value,
            left: None,
            right: None,
        }));
        self.len += 1;
    }

    /// All entries within `radius` of `key`, as (distance, value) pairs.
    /// No ordering guarantee beyond "within radius".
    pub fn within_radius(&self, key: &[f32; DIMS], radius: f32) -> Vec<(f32, &T)> {
        let mut found = Vec::new();
        Self::collect(&self.root, key, radius, 0, &mut found);
        found
    }

    /// The closest entry within `radius` of `key`, if any.
    pub fn nearest_within(&self, key: &[f32; DIMS], radius: f32) -> Option<(f32, &T)> {
        self.within_radius(key, radius)
            .into_iter()
            .min_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal))
    }

    /// Every stored value, in tree order.
    pub fn values(&self) -> Vec<&T> {
        let mut out = Vec::with_capacity(self.len);
        Self::walk(&self.root, &mut out);
        out
    }

    fn collect<'a>(
        node: &'a Option<Box<Node<T>>>,
        key: &[f32; DIMS],
        radius: f32,
        depth: usize,
        found: &mut Vec<(f32, &'a T)>,
    ) {
        let Some(node) = node else {
            return;
        };

        let dist = key_distance(&node.key, key);
        if dist <= radius {
            found.push((dist, &node.value));
        }

        // Descend into any half the query ball could still reach
        let axis = depth % DIMS;
        let diff = key[axis] - node.key[axis];
        if diff <= radius {
            Self::collect(&node.left, key, radius, depth + 1, found);
        }
        if diff >= -radius {
            Self::collect(&node.right, key, radius, depth + 1, found);
        }
    }

    fn walk<'a>(node: &'a Option<Box<Node<T>>>, out: &mut Vec<&'a T>) {
        let Some(node) = node else {
            return;
        };
        Self::walk(&node.left, out);
        out.push(&node.value);
        Self::walk(&node.right, out);
    }
}

impl<T> Default for KdTree<T> {
    fn default() -> Self {
        Self::new()
    }
}
