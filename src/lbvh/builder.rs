//! Bottom-up LBVH builder: morton leaf table, radix sort, and the parallel
//! radix-tree-forest climb.
//!
//! Every sorted leaf climbs toward the root concurrently. The slot between
//! adjacent leaves `v` and `v+1` is an internal node claimed through a single
//! atomic exchange on `other_bounds[v]`: the first child to arrive deposits
//! its interval endpoint and stops, the second reads it, completes the node
//! and keeps climbing. Exactly one climb reaches the full interval and
//! publishes the root.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicU32, Ordering};

use bytemuck::{Pod, Zeroable, zeroed_vec};
use glam::Vec3A;
use rdst::{RadixKey, RadixSort};

#[cfg(feature = "parallel")]
use rayon::iter::{
    IndexedParallelIterator, IntoParallelIterator, IntoParallelRefIterator,
    IntoParallelRefMutIterator, ParallelIterator,
};

use crate::{
    INVALID,
    aabb::Aabb,
    lbvh::{
        Lbvh,
        node::{LbvhNode, child_index, inner_child, is_leaf_child, leaf_child},
    },
    mesh::Mesh,
    morton::morton_encode_u32_unorm,
};

// Rayon overhead dominates below these sizes.
#[cfg(feature = "parallel")]
const MIN_PARALLEL_ITER: usize = 100_000;
#[cfg(feature = "parallel")]
const MIN_PARALLEL_CLIMB: usize = 10_000;

/// One leaf record: which triangle, and where its centroid landed on the
/// morton curve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct Leaf {
    pub triangle_index: u32,
    pub morton: u32,
}

impl RadixKey for Leaf {
    const LEVELS: usize = 4;

    #[inline(always)]
    fn get_level(&self, level: usize) -> u8 {
        self.morton.get_level(level)
    }
}

/// Builds the LBVH for a mesh.
///
/// A mesh with no faces, positions or normals builds an empty tree whose
/// traversals all miss. A single-triangle mesh has no internal nodes; the
/// root references the triangle directly.
pub fn build(mesh: Mesh<'_>) -> Lbvh<'_> {
    let face_count = mesh.face_count();
    if face_count == 0 || mesh.position_count() == 0 || mesh.normal_count() == 0 {
        log::warn!("lbvh: build skipped, mesh has no geometry");
        return Lbvh {
            root: INVALID,
            nodes: Vec::new(),
            mesh,
        };
    }
    // Tagged child indices spend one bit on the leaf flag.
    assert!(
        face_count < (1usize << 31),
        "face count {face_count} exceeds the tagged u32 index range"
    );

    let bounds = reference_bounds(&mesh);
    let mut leaves = leaf_table(&mesh, &bounds);
    sort_leaves(&mut leaves);

    if face_count == 1 {
        return Lbvh {
            root: leaf_child(leaves[0].triangle_index),
            nodes: Vec::new(),
            mesh,
        };
    }

    let (root, mut nodes) = radix_climb(&leaves, &mesh, bounds.min);
    debug_assert_ne!(root, INVALID);

    // The climb ran in the frame translated by -bounds.min to keep merge
    // arithmetic small; shift every box back.
    let offset = bounds.min;
    let untranslate = |node: &mut LbvhNode| {
        node.aabb.min += offset;
        node.aabb.max += offset;
    };
    #[cfg(feature = "parallel")]
    {
        if nodes.len() >= MIN_PARALLEL_ITER {
            nodes.par_iter_mut().for_each(untranslate);
        } else {
            nodes.iter_mut().for_each(untranslate);
        }
    }
    #[cfg(not(feature = "parallel"))]
    nodes.iter_mut().for_each(untranslate);

    log::debug!(
        "lbvh: built {} internal nodes over {} leaves",
        nodes.len(),
        face_count
    );

    Lbvh { root, nodes, mesh }
}

/// Bounds of every referenced position; the frame for morton normalization
/// and for the builder's centering translation.
fn reference_bounds(mesh: &Mesh) -> Aabb {
    #[cfg(feature = "parallel")]
    {
        let indices = mesh.indices();
        if indices.len() >= MIN_PARALLEL_ITER {
            return indices
                .par_iter()
                .fold(
                    || Aabb::EMPTY,
                    |mut aabb, vi| {
                        aabb.extend(mesh.position(vi.position));
                        aabb
                    },
                )
                .reduce(|| Aabb::EMPTY, |a, b| a.union(&b));
        }
    }
    mesh.aabb()
}

/// Fills the leaf table: one record per triangle, keyed by the morton code
/// of its normalized centroid.
fn leaf_table(mesh: &Mesh, bounds: &Aabb) -> Vec<Leaf> {
    let mut leaves: Vec<Leaf> = zeroed_vec(mesh.face_count());
    let fill = |(i, leaf): (usize, &mut Leaf)| {
        let centroid = mesh.triangle(i as u32).centroid();
        *leaf = Leaf {
            triangle_index: i as u32,
            morton: morton_encode_u32_unorm(bounds.normalize_point(centroid)),
        };
    };
    #[cfg(feature = "parallel")]
    {
        if leaves.len() >= MIN_PARALLEL_ITER {
            leaves.par_iter_mut().enumerate().for_each(fill);
        } else {
            leaves.iter_mut().enumerate().for_each(fill);
        }
    }
    #[cfg(not(feature = "parallel"))]
    leaves.iter_mut().enumerate().for_each(fill);
    leaves
}

/// Ascending unstable sort by morton code. Comparison sort wins for small
/// tables; the radix sort pays off above the threshold.
fn sort_leaves(leaves: &mut [Leaf]) {
    #[cfg(feature = "parallel")]
    const RADIX_THRESHOLD: usize = 20_000;
    #[cfg(not(feature = "parallel"))]
    const RADIX_THRESHOLD: usize = 250_000;

    if leaves.len() <= RADIX_THRESHOLD {
        leaves.sort_unstable_by_key(|leaf| leaf.morton);
    } else {
        leaves.radix_sort_unstable();
    }
}

/// Radix-tree comparator over adjacent sorted codes: a larger XOR means the
/// split between positions `i` and `i+1` sits at a coarser bit. Out-of-range
/// positions (`delta(-1)` and `delta(T-1)`) are infinite by convention, and
/// the strict comparison at the call sites breaks duplicate-code ties by
/// position.
#[inline(always)]
fn delta(leaves: &[Leaf], i: i64) -> u64 {
    if i < 0 || i + 1 >= leaves.len() as i64 {
        return u64::MAX;
    }
    let i = i as usize;
    u64::from(leaves[i + 1].morton ^ leaves[i].morton)
}

/// Shared mutable view of the internal-node array during the climb.
///
/// Aliasing discipline: the slot between sorted leaves `v` and `v+1` is
/// reached by exactly two climbs, one covering an interval that ends at `v`
/// (it writes `left`) and one covering an interval that starts at `v+1` (it
/// writes `right`), so each link field has exactly one writer. A link is
/// written before its writer's exchange on `other_bounds[v]` and read only
/// by the thread whose later exchange on the same slot acquired that
/// release. The box is written only by the second arriver, which is also
/// the only thread that climbs on, and is read above the slot through the
/// same exchange chain.
struct ClimbNodes<'a> {
    ptr: *mut LbvhNode,
    len: usize,
    marker: PhantomData<&'a mut [LbvhNode]>,
}

unsafe impl Send for ClimbNodes<'_> {}
unsafe impl Sync for ClimbNodes<'_> {}

impl<'a> ClimbNodes<'a> {
    fn new(nodes: &'a mut [LbvhNode]) -> Self {
        Self {
            ptr: nodes.as_mut_ptr(),
            len: nodes.len(),
            marker: PhantomData,
        }
    }

    #[inline(always)]
    unsafe fn set_left(&self, index: u32, child: u32) {
        debug_assert!((index as usize) < self.len);
        (*self.ptr.add(index as usize)).left = child;
    }

    #[inline(always)]
    unsafe fn set_right(&self, index: u32, child: u32) {
        debug_assert!((index as usize) < self.len);
        (*self.ptr.add(index as usize)).right = child;
    }

    #[inline(always)]
    unsafe fn left(&self, index: u32) -> u32 {
        debug_assert!((index as usize) < self.len);
        (*self.ptr.add(index as usize)).left
    }

    #[inline(always)]
    unsafe fn right(&self, index: u32) -> u32 {
        debug_assert!((index as usize) < self.len);
        (*self.ptr.add(index as usize)).right
    }

    #[inline(always)]
    unsafe fn aabb(&self, index: u32) -> Aabb {
        debug_assert!((index as usize) < self.len);
        (*self.ptr.add(index as usize)).aabb
    }

    #[inline(always)]
    unsafe fn set_aabb(&self, index: u32, aabb: Aabb) {
        debug_assert!((index as usize) < self.len);
        (*self.ptr.add(index as usize)).aabb = aabb;
    }
}

/// Runs the per-leaf climbs. Returns the tagged root reference and the
/// internal nodes, with boxes still in the translated frame.
fn radix_climb(leaves: &[Leaf], mesh: &Mesh, base: Vec3A) -> (u32, Vec<LbvhNode>) {
    let node_count = leaves.len() - 1;
    let mut nodes = vec![LbvhNode::EMPTY; node_count];
    let other_bounds: Vec<AtomicU32> = (0..node_count).map(|_| AtomicU32::new(INVALID)).collect();
    let root = AtomicU32::new(INVALID);

    {
        let shared = ClimbNodes::new(&mut nodes);
        let climb = |i: usize| climb_from(i, leaves, mesh, base, &shared, &other_bounds, &root);
        #[cfg(feature = "parallel")]
        {
            if leaves.len() >= MIN_PARALLEL_CLIMB {
                (0..leaves.len()).into_par_iter().for_each(climb);
            } else {
                (0..leaves.len()).for_each(climb);
            }
        }
        #[cfg(not(feature = "parallel"))]
        (0..leaves.len()).for_each(climb);
    }

    (root.into_inner(), nodes)
}

/// Climbs from sorted leaf `i` toward the root.
///
/// The subtree being climbed covers the leaf interval `[l, r]`. Each step
/// joins the neighbor slot whose adjacent split is coarser, publishes the
/// child link, and rendezvouses on `other_bounds`: the first arriver leaves
/// its far endpoint and stops, the second adopts the widened interval,
/// completes the parent box and continues.
fn climb_from(
    i: usize,
    leaves: &[Leaf],
    mesh: &Mesh,
    base: Vec3A,
    nodes: &ClimbNodes,
    other_bounds: &[AtomicU32],
    root: &AtomicU32,
) {
    let last = (leaves.len() - 1) as u32;
    let triangle_index = leaves[i].triangle_index;
    let mut current = i as u32;
    let mut is_leaf = true;
    let mut l = i as u32;
    let mut r = i as u32;
    let mut aabb = translated_aabb(mesh, triangle_index, base);

    loop {
        let encoded = if is_leaf {
            leaf_child(triangle_index)
        } else {
            inner_child(current)
        };

        if l == 0 && r == last {
            root.store(encoded, Ordering::Relaxed);
            return;
        }

        let parent;
        let sibling;
        if l == 0 || (r != last && delta(leaves, r as i64) < delta(leaves, l as i64 - 1)) {
            // The split on our right is the coarser one: slot r is the
            // parent and we arrive as its left child.
            parent = r;
            unsafe { nodes.set_left(parent, encoded) };
            let prev = other_bounds[parent as usize].swap(l, Ordering::AcqRel);
            if prev == INVALID {
                // First at the slot; the sibling finishes this node.
                return;
            }
            r = prev;
            sibling = unsafe { nodes.right(parent) };
        } else {
            parent = l - 1;
            unsafe { nodes.set_right(parent, encoded) };
            let prev = other_bounds[parent as usize].swap(r, Ordering::AcqRel);
            if prev == INVALID {
                return;
            }
            l = prev;
            sibling = unsafe { nodes.left(parent) };
        }

        // Second at the slot. The sibling link and, for an internal sibling,
        // its completed subtree box were published before the sibling's
        // exchange, so the parent box can be completed here.
        let sibling_aabb = if is_leaf_child(sibling) {
            translated_aabb(mesh, child_index(sibling), base)
        } else {
            unsafe { nodes.aabb(child_index(sibling)) }
        };
        aabb = aabb.union(&sibling_aabb);
        unsafe { nodes.set_aabb(parent, aabb) };

        current = parent;
        is_leaf = false;
    }
}

/// Triangle bounds in the frame centered on the mesh minimum. Smaller
/// magnitudes keep the repeated merges precise.
#[inline(always)]
fn translated_aabb(mesh: &Mesh, triangle_index: u32, base: Vec3A) -> Aabb {
    let aabb = mesh.triangle(triangle_index).aabb();
    Aabb::new(aabb.min - base, aabb.max - base)
}
