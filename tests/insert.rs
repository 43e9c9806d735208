use xylem_dom::{
	insert,
	insert::resolve,
	memory::{MemoryDom, MemoryDomError, MemoryNode},
	reactive::{root, signal},
	Anchor, Committed, Dom, NodeKind, RenderContext, Renderable,
};

fn setup() -> (MemoryDom, RenderContext<MemoryDom>, MemoryNode) {
	let dom = MemoryDom::new();
	let cx = RenderContext::client(dom.clone());
	let div = dom.create_element("div");
	(dom, cx, div)
}

fn nodes(nodes: &[&MemoryNode]) -> Renderable<MemoryNode> {
	Renderable::List(nodes.iter().map(|&node| Renderable::Node(node.clone())).collect())
}

#[test]
fn same_list_twice_does_not_mutate() {
	let (dom, cx, div) = setup();
	let a = dom.create_element("a");
	let b = dom.create_element("b");
	let value = nodes(&[&a, &b]);

	let committed = insert(&cx, &div, value.clone(), Anchor::Absent).unwrap();
	let before = dom.mutation_count();
	let committed = resolve(&cx, &div, value, &Anchor::Absent, committed, false).unwrap();

	assert_eq!(dom.mutation_count(), before);
	assert_eq!(committed.nodes(), vec![a, b]);
	assert_eq!(dom.inner_html(&div), "<a></a><b></b>");
}

#[test]
fn same_text_twice_does_not_mutate() {
	let (dom, cx, div) = setup();

	let committed = insert(&cx, &div, "same".into(), Anchor::Absent).unwrap();
	let before = dom.mutation_count();
	resolve(&cx, &div, "same".into(), &Anchor::Absent, committed, false).unwrap();

	assert_eq!(dom.mutation_count(), before);
}

#[test]
fn same_node_twice_does_not_mutate() {
	let (dom, cx, div) = setup();
	let span = dom.create_element("span");

	let committed = insert(&cx, &div, Renderable::Node(span.clone()), Anchor::Absent).unwrap();
	let before = dom.mutation_count();
	resolve(&cx, &div, Renderable::Node(span), &Anchor::Absent, committed, false).unwrap();

	assert_eq!(dom.mutation_count(), before);
}

#[test]
fn text_is_updated_in_place() {
	let (dom, cx, div) = setup();

	let committed = insert(&cx, &div, "apples".into(), Anchor::Absent).unwrap();
	let text = dom.first_child(&div).unwrap();
	let committed = resolve(&cx, &div, "oranges".into(), &Anchor::Absent, committed, false).unwrap();

	assert!(matches!(committed, Committed::Text(ref text) if text == "oranges"));
	assert_eq!(dom.child_nodes(&div), vec![text.clone()]);
	assert_eq!(dom.character_data(&text).as_deref(), Some("oranges"));
}

#[test]
fn anchored_text_is_updated_in_place() {
	let (dom, cx, div) = setup();
	let marker = dom.create_comment("$");
	dom.append_child(&div, &marker).unwrap();

	let committed = insert(&cx, &div, "apples".into(), Anchor::Before(marker.clone())).unwrap();
	let text = dom.first_child(&div).unwrap();
	let committed = resolve(&cx, &div, 7_u8.into(), &Anchor::Before(marker), committed, false).unwrap();

	assert_eq!(committed.nodes(), vec![text]);
	assert_eq!(dom.inner_html(&div), "7<!--$-->");
}

#[test]
fn list_order_and_identity() {
	let (dom, cx, div) = setup();
	let a = dom.create_element("a");
	let b = dom.create_element("b");
	let c = dom.create_element("c");

	let committed = insert(&cx, &div, nodes(&[&a, &b, &c]), Anchor::Absent).unwrap();
	assert_eq!(dom.child_nodes(&div), vec![a.clone(), b.clone(), c.clone()]);

	resolve(&cx, &div, nodes(&[&c, &a]), &Anchor::Absent, committed, false).unwrap();
	assert_eq!(dom.child_nodes(&div), vec![c, a]);
	assert_eq!(dom.parent_node(&b), None);
}

#[test]
fn falsy_values_are_dropped() {
	let (dom, cx, div) = setup();
	let value = Renderable::List(vec![false.into(), Renderable::Empty, None::<&str>.into(), "x".into(), 0_i32.into()]);

	insert(&cx, &div, value, Anchor::Absent).unwrap();

	let children = dom.child_nodes(&div);
	assert_eq!(children.len(), 2);
	assert!(children.iter().all(|child| dom.kind(child) == NodeKind::Text));
	assert_eq!(dom.inner_html(&div), "x0");
}

#[test]
fn clearing_at_a_marker_leaves_a_placeholder() {
	let (dom, cx, div) = setup();
	let marker = dom.create_comment("$");
	dom.append_child(&div, &marker).unwrap();
	let a = dom.create_element("a");
	let b = dom.create_element("b");

	let committed = insert(&cx, &div, nodes(&[&a, &b]), Anchor::Before(marker.clone())).unwrap();
	assert_eq!(dom.inner_html(&div), "<a></a><b></b><!--$-->");

	let committed = resolve(&cx, &div, Renderable::Empty, &Anchor::Before(marker), committed, false).unwrap();
	assert_eq!(dom.inner_html(&div), "<!----><!--$-->");
	assert_eq!(committed.nodes().len(), 1);
	assert_eq!(dom.parent_node(&a), None);
	assert_eq!(dom.parent_node(&b), None);
}

#[test]
fn clearing_without_a_marker_empties_the_parent() {
	let (dom, cx, div) = setup();
	dom.append_child(&div, &dom.create_element("old")).unwrap();

	let committed = insert(&cx, &div, Renderable::Empty, Anchor::Absent).unwrap();

	assert!(matches!(committed, Committed::Empty));
	assert_eq!(dom.first_child(&div), None);
}

#[test]
fn list_after_placeholder_replaces_it() {
	let (dom, cx, div) = setup();
	let marker = dom.create_comment("$");
	dom.append_child(&div, &marker).unwrap();
	let a = dom.create_element("a");

	let committed = insert(&cx, &div, Renderable::Empty, Anchor::Before(marker.clone())).unwrap();
	assert_eq!(dom.inner_html(&div), "<!----><!--$-->");

	resolve(&cx, &div, nodes(&[&a]), &Anchor::Before(marker), committed, false).unwrap();
	assert_eq!(dom.inner_html(&div), "<a></a><!--$-->");
}

#[test]
fn node_replaces_text() {
	let (dom, cx, div) = setup();
	let span = dom.create_element("span");

	let committed = insert(&cx, &div, "text".into(), Anchor::Absent).unwrap();
	let committed = resolve(&cx, &div, Renderable::Node(span.clone()), &Anchor::Absent, committed, false).unwrap();

	assert!(matches!(committed, Committed::Node(ref node) if *node == span));
	assert_eq!(dom.child_nodes(&div), vec![span]);
}

#[test]
fn node_replaces_list_without_marker() {
	let (dom, cx, div) = setup();
	let a = dom.create_element("a");
	let b = dom.create_element("b");
	let span = dom.create_element("span");

	let committed = insert(&cx, &div, nodes(&[&a, &b]), Anchor::Absent).unwrap();
	resolve(&cx, &div, Renderable::Node(span.clone()), &Anchor::Absent, committed, false).unwrap();

	assert_eq!(dom.child_nodes(&div), vec![span]);
}

#[test]
fn anchored_content_stays_between_siblings() {
	let (dom, cx, div) = setup();
	let before = dom.create_element("before");
	let marker = dom.create_comment("$");
	dom.append_child(&div, &before).unwrap();
	dom.append_child(&div, &marker).unwrap();
	let span = dom.create_element("span");

	let committed = insert(&cx, &div, "text".into(), Anchor::Before(marker.clone())).unwrap();
	assert_eq!(dom.inner_html(&div), "<before></before>text<!--$-->");

	let committed = resolve(&cx, &div, Renderable::Node(span), &Anchor::Before(marker.clone()), committed, false).unwrap();
	assert_eq!(dom.inner_html(&div), "<before></before><span></span><!--$-->");

	resolve(&cx, &div, vec!["a", "b"].into(), &Anchor::Before(marker), committed, false).unwrap();
	assert_eq!(dom.inner_html(&div), "<before></before>ab<!--$-->");
}

#[test]
fn end_anchor_appends_after_existing_children() {
	let (dom, cx, div) = setup();
	dom.append_child(&div, &dom.create_element("static")).unwrap();

	insert(&cx, &div, vec!["a", "b"].into(), Anchor::End).unwrap();

	assert_eq!(dom.inner_html(&div), "<static></static>ab");
}

#[test]
fn reactive_text_keeps_its_node() {
	let (dom, cx, div) = setup();
	let count = signal(0_i32);

	let (committed, scope) = root(|| {
		let count = count.clone();
		insert(&cx, &div, Renderable::thunk(move || count.get().into()), Anchor::Absent).unwrap()
	});
	let committed = committed.unwrap();
	let text = dom.first_child(&div).unwrap();
	assert_eq!(dom.character_data(&text).as_deref(), Some("0"));

	count.set(1);
	xylem_dom::reactive::flush_sync();

	assert_eq!(dom.child_nodes(&div), vec![text.clone()]);
	assert_eq!(dom.character_data(&text).as_deref(), Some("1"));
	assert!(matches!(committed.settle(), Committed::Text(ref text) if text == "1"));
	scope.dispose();
}

#[test]
fn nested_thunk_in_static_list_is_observed() {
	let (dom, cx, div) = setup();
	let a = dom.create_element("a");
	let c = dom.create_element("c");
	let middle = signal("x".to_owned());

	let (_, scope) = root(|| {
		let middle = middle.clone();
		let value = Renderable::List(vec![Renderable::Node(a.clone()), Renderable::thunk(move || middle.get().into()), Renderable::Node(c.clone())]);
		let committed = insert(&cx, &div, value, Anchor::Absent).unwrap();
		assert!(matches!(committed, Committed::Reactive(_)));
	});
	assert_eq!(dom.inner_html(&div), "<a></a>x<c></c>");

	middle.set("y".to_owned());
	let children = dom.child_nodes(&div);
	assert_eq!(dom.inner_html(&div), "<a></a>y<c></c>");
	assert_eq!(children[0], a);
	assert_eq!(children[2], c);
	scope.dispose();
}

#[test]
fn thunk_switches_between_shapes() {
	let (dom, cx, div) = setup();
	let marker = dom.create_comment("$");
	dom.append_child(&div, &marker).unwrap();
	let span = dom.create_element("span");
	let state = signal(0_u8);

	let (_, scope) = root(|| {
		let state = state.clone();
		let span = span.clone();
		insert(
			&cx,
			&div,
			Renderable::thunk(move || match state.get() {
				0 => "text".into(),
				1 => Renderable::Node(span.clone()),
				2 => vec!["a", "b", "c"].into(),
				_ => Renderable::Empty,
			}),
			Anchor::Before(marker.clone()),
		)
		.unwrap();
	});
	assert_eq!(dom.inner_html(&div), "text<!--$-->");

	state.set(1);
	assert_eq!(dom.inner_html(&div), "<span></span><!--$-->");

	state.set(2);
	assert_eq!(dom.inner_html(&div), "abc<!--$-->");

	state.set(3);
	assert_eq!(dom.inner_html(&div), "<!----><!--$-->");

	state.set(0);
	assert_eq!(dom.inner_html(&div), "text<!--$-->");
	scope.dispose();
}

#[test]
fn disposed_insertion_stops_updating() {
	let (dom, cx, div) = setup();
	let text = signal("before");

	let (_, scope) = root(|| {
		let text = text.clone();
		insert(&cx, &div, Renderable::thunk(move || text.get().into()), Anchor::Absent).unwrap()
	});
	scope.dispose();
	text.set("after");

	assert_eq!(dom.inner_html(&div), "before");
}

#[test]
fn dom_errors_propagate() {
	let (_, cx, div) = setup();

	let result = insert(&cx, &div, Renderable::Node(div.clone()), Anchor::Absent);

	assert_eq!(result.unwrap_err(), MemoryDomError::HierarchyRequest);
}

#[test]
fn dom_errors_of_the_first_run_propagate() {
	let (_, cx, div) = setup();

	let (result, scope) = root(|| {
		let inner = div.clone();
		insert(&cx, &div, Renderable::thunk(move || Renderable::Node(inner.clone())), Anchor::Absent)
	});

	assert_eq!(result.unwrap().unwrap_err(), MemoryDomError::HierarchyRequest);
	scope.dispose();
}
