use xylem_dom::{
	memory::{MemoryDom, MemoryNode},
	reconcile::reconcile,
	Dom,
};

/// A parent holding `run` followed by a tail node that must stay last.
fn setup(len: usize) -> (MemoryDom, MemoryNode, Vec<MemoryNode>, MemoryNode) {
	let dom = MemoryDom::new();
	let parent = dom.create_element("ul");
	let run: Vec<_> = (0..len).map(|i| dom.create_text(&i.to_string())).collect();
	for node in &run {
		dom.append_child(&parent, node).unwrap();
	}
	let tail = dom.create_element("tail");
	dom.append_child(&parent, &tail).unwrap();
	(dom, parent, run, tail)
}

fn pick(run: &[MemoryNode], order: &[usize]) -> Vec<MemoryNode> {
	order.iter().map(|&i| run[i].clone()).collect()
}

fn assert_run(dom: &MemoryDom, parent: &MemoryNode, expected: &[MemoryNode], tail: &MemoryNode) {
	let mut expected = expected.to_vec();
	expected.push(tail.clone());
	assert_eq!(dom.child_nodes(parent), expected);
}

#[test]
fn identical_runs_are_left_alone() {
	let (dom, parent, run, tail) = setup(3);
	let before = dom.mutation_count();

	reconcile(&dom, &parent, &run, &run).unwrap();

	assert_eq!(dom.mutation_count(), before);
	assert_run(&dom, &parent, &run, &tail);
}

#[test]
fn prepend() {
	let (dom, parent, run, tail) = setup(2);
	let new = dom.create_text("new");
	let b = vec![new, run[0].clone(), run[1].clone()];

	reconcile(&dom, &parent, &run, &b).unwrap();

	assert_run(&dom, &parent, &b, &tail);
}

#[test]
fn append_stays_before_following_siblings() {
	let (dom, parent, run, tail) = setup(2);
	let new = dom.create_text("new");
	let b = vec![run[0].clone(), run[1].clone(), new];
	let before = dom.mutation_count();

	reconcile(&dom, &parent, &run, &b).unwrap();

	assert_run(&dom, &parent, &b, &tail);
	assert_eq!(dom.mutation_count(), before + 1);
}

#[test]
fn remove_from_the_middle() {
	let (dom, parent, run, tail) = setup(3);
	let b = pick(&run, &[0, 2]);

	reconcile(&dom, &parent, &run, &b).unwrap();

	assert_run(&dom, &parent, &b, &tail);
	assert_eq!(dom.parent_node(&run[1]), None);
}

#[test]
fn insert_into_the_middle() {
	let (dom, parent, run, tail) = setup(2);
	let new = dom.create_text("new");
	let b = vec![run[0].clone(), new, run[1].clone()];

	reconcile(&dom, &parent, &run, &b).unwrap();

	assert_run(&dom, &parent, &b, &tail);
}

#[test]
fn swap_ends() {
	let (dom, parent, run, tail) = setup(4);
	let b = pick(&run, &[3, 1, 2, 0]);

	reconcile(&dom, &parent, &run, &b).unwrap();

	assert_run(&dom, &parent, &b, &tail);
}

#[test]
fn reverse() {
	let (dom, parent, run, tail) = setup(4);
	let b = pick(&run, &[3, 2, 1, 0]);

	reconcile(&dom, &parent, &run, &b).unwrap();

	assert_run(&dom, &parent, &b, &tail);
}

#[test]
fn shuffle_keeps_identity() {
	let (dom, parent, run, tail) = setup(5);
	let b = pick(&run, &[2, 0, 4, 1, 3]);

	reconcile(&dom, &parent, &run, &b).unwrap();

	assert_run(&dom, &parent, &b, &tail);
	assert_eq!(dom.inner_html(&parent), "20413<tail></tail>");
}

#[test]
fn replace_everything() {
	let (dom, parent, run, tail) = setup(2);
	let b = vec![dom.create_text("x"), dom.create_text("y"), dom.create_text("z")];

	reconcile(&dom, &parent, &run, &b).unwrap();

	assert_run(&dom, &parent, &b, &tail);
	assert!(run.iter().all(|node| dom.parent_node(node).is_none()));
}

#[test]
fn move_forward_with_insertion() {
	let (dom, parent, run, tail) = setup(3);
	let new = dom.create_text("new");
	let b = vec![run[1].clone(), run[2].clone(), new, run[0].clone()];

	reconcile(&dom, &parent, &run, &b).unwrap();

	assert_run(&dom, &parent, &b, &tail);
}

#[test]
fn shrink_to_one_moved_node() {
	let (dom, parent, run, tail) = setup(4);
	let b = pick(&run, &[2]);

	reconcile(&dom, &parent, &run, &b).unwrap();

	assert_run(&dom, &parent, &b, &tail);
}
