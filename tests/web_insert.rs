#![cfg(target_arch = "wasm32")]

use std::sync::Once;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::{Element, HtmlElement, Node};
use xylem_dom::{
	hydrate, insert,
	reactive::{root, signal},
	render,
	web::WebDom,
	Anchor, Dom, Options, RenderContext, Renderable,
};

wasm_bindgen_test_configure!(run_in_browser);

static LOG_INITIALIZED: Once = Once::new();

fn setup() -> (WebDom, Element) {
	LOG_INITIALIZED.call_once(tracing_wasm::set_as_global_default);

	let dom = WebDom::for_window().unwrap();
	let body: HtmlElement = dom.document().body().unwrap();
	let container = dom.document().create_element("div").unwrap();
	body.append_child(&container).unwrap();
	(dom, container)
}

#[wasm_bindgen_test]
fn reactive_text_in_browser() {
	let (dom, container) = setup();
	let cx = RenderContext::client(dom);
	let parent: Node = container.clone().into();
	let count = signal(0_i32);

	let (committed, scope) = root(|| {
		let count = count.clone();
		insert(&cx, &parent, Renderable::thunk(move || count.get().into()), Anchor::Absent).unwrap()
	});
	let committed = committed.unwrap();
	assert_eq!(container.inner_html(), "0");
	let node = parent.first_child().unwrap();

	count.set(1);
	assert_eq!(container.inner_html(), "1");
	assert!(parent.first_child().unwrap().is_same_node(Some(&node)));
	assert!(committed.nodes().is_empty());

	scope.dispose();
	container.remove();
}

#[wasm_bindgen_test]
fn list_reconciliation_in_browser() {
	let (dom, container) = setup();
	let document = dom.document().clone();
	let items: Vec<Node> = ["a", "b", "c"].iter().map(|name| document.create_element(name).unwrap().into()).collect();
	let order = signal(vec![0_usize, 1, 2]);
	let parent: Node = container.clone().into();
	let tail: Node = document.create_element("tail").unwrap().into();
	parent.append_child(&tail).unwrap();

	let render_items = items.clone();
	let scope = render(dom, &parent, Options::default(), move |_| {
		let order = order.clone();
		let items = render_items.clone();
		Renderable::thunk(move || order.get().into_iter().map(|i| Renderable::Node(items[i].clone())).collect::<Vec<_>>().into())
	})
	.unwrap();
	assert_eq!(container.inner_html(), "<tail></tail><a></a><b></b><c></c>");

	order.set(vec![2, 0]);
	assert_eq!(container.inner_html(), "<tail></tail><c></c><a></a>");
	assert!(items[1].parent_node().is_none());

	scope.dispose();
	container.remove();
}

#[wasm_bindgen_test]
fn hydrate_server_markup_in_browser() {
	let (dom, container) = setup();
	container.set_inner_html("<span><!--$-->5</span>");
	let span = container.first_element_child().unwrap();
	let text = span.last_child().unwrap();
	let count = signal(5_i32);

	let parent: Node = container.clone().into();
	let view_count = count.clone();
	let scope = hydrate(dom, &parent, Options::default(), move |cx| {
		let dom = cx.dom();
		let marker = cx.next_marker().unwrap();
		let span = dom.parent_node(&marker).unwrap();
		let count = view_count.clone();
		insert(cx, &span, Renderable::thunk(move || count.get().into()), Anchor::Before(marker)).unwrap();
		Renderable::Node(span)
	})
	.unwrap();

	count.set(6);
	assert_eq!(container.inner_html(), "<span><!--$-->6</span>");
	assert!(span.last_child().unwrap().is_same_node(Some(&text)));

	scope.dispose();
	container.remove();
}
