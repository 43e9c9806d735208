//! Move-based reconciliation of one node run into another.

use crate::dom::Dom;
use tracing::{instrument, trace};

/// Replaces the DOM run `a` (children of `parent`, in order, contiguous) with `b`.
///
/// Nodes present in both are moved rather than recreated. The node directly after `a`
/// keeps its position relative to the run.
///
/// `a` must not be empty.
///
/// # Errors
///
/// Iff a DOM operation fails, in which case the run is left partially updated.
#[allow(clippy::many_single_char_names)]
#[allow(clippy::too_many_lines)]
#[instrument(skip(dom, a, b), fields(a.len = a.len(), b.len = b.len()))]
pub fn reconcile<D: Dom>(dom: &D, parent: &D::Node, a: &[D::Node], b: &[D::Node]) -> Result<(), D::Error> {
	debug_assert!(!a.is_empty(), "`reconcile` requires a previous run");
	if a == b {
		trace!("Runs are identical.");
		return Ok(());
	}

	// Backward swaps overwrite `a` in place.
	let mut a = a.to_vec();
	let b_len = b.len();
	let mut a_end = a.len();
	let mut b_end = b_len;
	let mut a_start = 0;
	let mut b_start = 0;
	let after = a.last().and_then(|last| dom.next_sibling(last));
	let mut map: Option<Vec<(D::Node, usize)>> = None;

	while a_start < a_end || b_start < b_end {
		// Common prefix.
		if a_start < a_end && b_start < b_end && a[a_start] == b[b_start] {
			a_start += 1;
			b_start += 1;
			continue;
		}

		// Common suffix.
		while a_start < a_end && b_start < b_end && a[a_end - 1] == b[b_end - 1] {
			a_end -= 1;
			b_end -= 1;
		}

		if a_end == a_start {
			// Only insertions left.
			let reference = if b_end < b_len {
				if b_start > 0 {
					dom.next_sibling(&b[b_start - 1])
				} else {
					Some(b[b_end].clone())
				}
			} else {
				after.clone()
			};
			while b_start < b_end {
				dom.insert_before(parent, &b[b_start], reference.as_ref())?;
				b_start += 1;
			}
		} else if b_end == b_start {
			// Only removals left.
			while a_start < a_end {
				let keep = map.as_ref().map_or(false, |map| index_in_b(map, &a[a_start]).is_some());
				if !keep {
					dom.remove(&a[a_start])?;
				}
				a_start += 1;
			}
		} else if a[a_start] == b[b_end - 1] && b[b_start] == a[a_end - 1] {
			// Swap backward.
			a_end -= 1;
			let reference = dom.next_sibling(&a[a_end]);
			let first_reference = dom.next_sibling(&a[a_start]);
			dom.insert_before(parent, &b[b_start], first_reference.as_ref())?;
			a_start += 1;
			b_start += 1;
			b_end -= 1;
			dom.insert_before(parent, &b[b_end], reference.as_ref())?;
			a[a_end] = b[b_end].clone();
		} else {
			// Fall back to an index map of the remaining `b`.
			let map = map.get_or_insert_with(|| (b_start..b_end).map(|i| (b[i].clone(), i)).collect());
			match index_in_b(map, &a[a_start]) {
				Some(index) if b_start < index && index < b_end => {
					let mut i = a_start;
					let mut sequence = 1;
					loop {
						i += 1;
						if i >= a_end || i >= b_end {
							break;
						}
						match index_in_b(map, &a[i]) {
							Some(t) if t == index + sequence => sequence += 1,
							_ => break,
						}
					}

					if sequence > index - b_start {
						let node = a[a_start].clone();
						while b_start < index {
							dom.insert_before(parent, &b[b_start], Some(&node))?;
							b_start += 1;
						}
					} else {
						dom.replace_child(parent, &b[b_start], &a[a_start])?;
						a_start += 1;
						b_start += 1;
					}
				}
				Some(_) => a_start += 1,
				None => {
					dom.remove(&a[a_start])?;
					a_start += 1;
				}
			}
		}
	}
	Ok(())
}

fn index_in_b<N: PartialEq>(map: &[(N, usize)], node: &N) -> Option<usize> {
	map.iter().find(|(n, _)| n == node).map(|&(_, i)| i)
}
