//! Lifecycle hook ordering and the removal protocol

mod common;

use common::*;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use twig_reconciler::memory_host::NodeId;
use twig_reconciler::{Host, ReconcileError};
use twig_vdom::{h, AttrValue, Child, HookKind, Removal};

#[test]
fn test_oncreate_can_modify_element() {
    let (host, reconciler) = setup();
    let hook_host = Rc::clone(&host);
    let view: V = h(
        "div",
        props().oncreate(move |node| {
            hook_host.set_attribute(node, "class", &AttrValue::from("foo"))?;
            Ok(())
        }),
        "foo",
    );

    reconciler.reconcile(None, &view, None, None).unwrap();

    assert_eq!(host.inner_html(host.body()), r#"<div class="foo">foo</div>"#);
}

#[test]
fn test_onupdate_receives_old_props() {
    let (host, reconciler) = setup();
    let calls = Rc::new(Cell::new(0));

    let view = |state: &str| -> V {
        let host = Rc::clone(&host);
        let calls = Rc::clone(&calls);
        h(
            "div",
            props().attr("class", state).onupdate(move |node, old| {
                assert_eq!(host.text_content(*node), "bar");
                assert_eq!(old.value("class"), Some(&AttrValue::from("foo")));
                calls.set(calls.get() + 1);
                Ok(())
            }),
            state,
        )
    };

    let node = reconciler.reconcile(None, &view("foo"), None, None).unwrap();
    assert_eq!(calls.get(), 0);

    reconciler.reconcile(None, &view("bar"), Some(node), None).unwrap();
    assert_eq!(calls.get(), 1);
    assert_eq!(host.inner_html(host.body()), r#"<div class="bar">bar</div>"#);
}

#[test]
fn test_onremove_completed_inside_hook() {
    let (host, reconciler) = setup();
    let calls = Rc::new(Cell::new(0));

    let view = |state: bool| -> V {
        if state {
            let host = Rc::clone(&host);
            let calls = Rc::clone(&calls);
            h(
                "ul",
                props(),
                vec![
                    h("li", props(), ()),
                    h(
                        "li",
                        props().onremove(move |_, removal| {
                            assert!(removal.complete()?);
                            assert_eq!(host.inner_html(host.body()), "<ul><li></li></ul>");
                            calls.set(calls.get() + 1);
                            Ok(())
                        }),
                        (),
                    ),
                ],
            )
        } else {
            h("ul", props(), vec![h("li", props(), ())])
        }
    };

    let node = reconciler.reconcile(None, &view(true), None, None).unwrap();
    assert_eq!(host.inner_html(host.body()), "<ul><li></li><li></li></ul>");

    reconciler.reconcile(None, &view(false), Some(node), None).unwrap();
    assert_eq!(calls.get(), 1);
    assert_eq!(host.inner_html(host.body()), "<ul><li></li></ul>");
}

#[test]
fn test_removal_waits_for_completion() {
    let (host, reconciler) = setup();
    let pending: Rc<RefCell<Option<Removal>>> = Rc::new(RefCell::new(None));
    let calls = Rc::new(Cell::new(0));

    let view = |state: bool| -> V {
        let mut items = vec![h("li", props(), "kept")];
        if state {
            let pending = Rc::clone(&pending);
            let calls = Rc::clone(&calls);
            items.push(h(
                "li",
                props().onremove(move |_, removal| {
                    calls.set(calls.get() + 1);
                    *pending.borrow_mut() = Some(removal);
                    Ok(())
                }),
                "leaving",
            ));
        }
        h("ul", props(), items)
    };

    let ul = reconciler.reconcile(None, &view(true), None, None).unwrap();
    reconciler.reconcile(None, &view(false), Some(ul), None).unwrap();

    // Both children stay until the hook confirms
    assert_eq!(host.children(ul).len(), 2);
    assert_eq!(
        host.inner_html(host.body()),
        "<ul><li>kept</li><li>leaving</li></ul>"
    );

    // A render while the removal is pending neither matches nor removes it again
    reconciler.reconcile(None, &view(false), Some(ul), None).unwrap();
    assert_eq!(host.children(ul).len(), 2);
    assert_eq!(calls.get(), 1);

    let removal = pending.borrow_mut().take().unwrap();
    assert_eq!(removal.complete(), Ok(true));
    assert_eq!(host.inner_html(host.body()), "<ul><li>kept</li></ul>");

    // Completing twice is a no-op
    assert_eq!(removal.complete(), Ok(false));
    assert_eq!(host.children(ul).len(), 1);
}

#[test]
fn test_ondestroy_sees_subtree_before_detach() {
    let (host, reconciler) = setup();
    let seen = Rc::new(RefCell::new(Vec::new()));

    let view = |state: bool| -> V {
        if state {
            let host = Rc::clone(&host);
            let seen = Rc::clone(&seen);
            h(
                "ul",
                props(),
                vec![
                    h("li", props(), ()),
                    h(
                        "li",
                        props(),
                        vec![h(
                            "span",
                            props().ondestroy(move |_| {
                                seen.borrow_mut().push(host.inner_html(host.body()));
                                Ok(())
                            }),
                            (),
                        )],
                    ),
                ],
            )
        } else {
            h("ul", props(), vec![h("li", props(), ())])
        }
    };

    let node = reconciler.reconcile(None, &view(true), None, None).unwrap();
    reconciler.reconcile(None, &view(false), Some(node), None).unwrap();

    assert_eq!(
        *seen.borrow(),
        vec!["<ul><li></li><li><span></span></li></ul>".to_string()]
    );
    assert_eq!(host.inner_html(host.body()), "<ul><li></li></ul>");
}

#[test]
fn test_ondestroy_and_onremove_fire_once_in_order() {
    let (host, reconciler) = setup();
    let log = new_log();

    let view = |state: bool| -> V {
        let mut items = vec![h("li", props(), ())];
        if state {
            let log = Rc::clone(&log);
            items.push(h(
                "li",
                props().ondestroy(record(&log, "destroy")).onremove(move |_, removal| {
                    log.borrow_mut().push("remove".to_string());
                    removal.complete()?;
                    removal.complete()?;
                    log.borrow_mut().push("complete".to_string());
                    Ok(())
                }),
                (),
            ));
        }
        h("ul", props(), items)
    };

    let node = reconciler.reconcile(None, &view(true), None, None).unwrap();
    reconciler.reconcile(None, &view(false), Some(node), None).unwrap();
    reconciler.reconcile(None, &view(false), Some(node), None).unwrap();

    assert_eq!(entries(&log), vec!["destroy", "remove", "complete"]);
    assert_eq!(host.inner_html(host.body()), "<ul><li></li></ul>");
}

#[test]
fn test_destroy_cascade_is_top_down() {
    let (host, reconciler) = setup();
    let log = new_log();

    let tree: V = h(
        "section",
        props().ondestroy(record(&log, "section")),
        vec![
            h(
                "div",
                props().ondestroy(record(&log, "div")),
                vec![h("span", props().ondestroy(record(&log, "span")), ())],
            ),
            h("p", props().ondestroy(record(&log, "p")), ()),
        ],
    );
    let root: V = h("main", props(), vec![tree]);
    let emptied: V = h("main", props(), ());

    let node = reconciler.reconcile(None, &root, None, None).unwrap();
    reconciler.reconcile(None, &emptied, Some(node), None).unwrap();

    assert_eq!(entries(&log), vec!["section", "div", "span", "p"]);
    assert_eq!(host.inner_html(host.body()), "<main></main>");
}

#[test]
fn test_hooks_fire_in_post_order() {
    let (_host, reconciler) = setup();
    let log = new_log();

    let view = || -> V {
        let children: Vec<V> = (0..3)
            .map(|i| {
                let label = format!("p{}", i);
                h(
                    "p",
                    props()
                        .oncreate(record(&log, &format!("create {}", label)))
                        .onupdate(record_update(&log, &format!("update {}", label))),
                    (),
                )
            })
            .collect();
        h(
            "main",
            props()
                .oncreate(record(&log, "create main"))
                .onupdate(record_update(&log, "update main")),
            children,
        )
    };

    let node = reconciler.reconcile(None, &view(), None, None).unwrap();
    reconciler.reconcile(None, &view(), Some(node), None).unwrap();

    assert_eq!(
        entries(&log),
        vec![
            "create p0",
            "create p1",
            "create p2",
            "create main",
            "update p0",
            "update p1",
            "update p2",
            "update main",
        ]
    );
}

#[test]
fn test_nested_post_order() {
    let (_host, reconciler) = setup();
    let log = new_log();

    let view: V = h(
        "div",
        props().oncreate(record(&log, "div")),
        vec![
            h(
                "section",
                props().oncreate(record(&log, "section")),
                vec![h("span", props().oncreate(record(&log, "span")), ())],
            ),
            h("p", props().oncreate(record(&log, "p")), ()),
        ],
    );

    reconciler.reconcile(None, &view, None, None).unwrap();

    assert_eq!(entries(&log), vec!["span", "section", "p", "div"]);
}

#[test]
fn test_oncreate_sees_attached_subtree() {
    let (host, reconciler) = setup();
    let markup = Rc::new(RefCell::new(String::new()));

    let hook_host = Rc::clone(&host);
    let hook_markup = Rc::clone(&markup);
    let view: V = h(
        "ul",
        props(),
        vec![h(
            "li",
            props().oncreate(move |node: &NodeId| {
                assert!(hook_host.parent(*node).is_some());
                *hook_markup.borrow_mut() = hook_host.inner_html(hook_host.body());
                Ok(())
            }),
            "item",
        )],
    );

    reconciler.reconcile(None, &view, None, None).unwrap();

    assert_eq!(*markup.borrow(), "<ul><li>item</li></ul>");
}

#[test]
fn test_hook_error_propagates() {
    let (host, reconciler) = setup();
    let log = new_log();

    let view: V = h(
        "div",
        props().oncreate(record(&log, "div")),
        vec![
            Child::from(h(
                "p",
                props().oncreate(|_| Err(anyhow::anyhow!("refused"))),
                (),
            )),
            Child::from(h("span", props().oncreate(record(&log, "span")), ())),
        ],
    );

    let err = reconciler.reconcile(None, &view, None, None).unwrap_err();
    match err {
        ReconcileError::Hook { hook, tag, .. } => {
            assert_eq!(hook, HookKind::Create);
            assert_eq!(tag, "p");
        }
        other => panic!("Expected hook error, got {:?}", other),
    }

    // Later hooks did not run; the tree is built and attached
    assert!(entries(&log).is_empty());
    assert_eq!(host.inner_html(host.body()), "<div><p></p><span></span></div>");
}

#[test]
fn test_replacement_fires_removal_hooks() {
    let (host, reconciler) = setup();
    let log = new_log();

    let old: V = h(
        "div",
        props().ondestroy(record(&log, "destroy div")),
        vec![h("b", props().ondestroy(record(&log, "destroy b")), ())],
    );
    let new: V = h("span", props().oncreate(record(&log, "create span")), ());

    let div = reconciler.reconcile(None, &old, None, None).unwrap();
    let span = reconciler.reconcile(None, &new, Some(div), None).unwrap();

    assert_ne!(div, span);
    assert_eq!(
        entries(&log),
        vec!["create span", "destroy div", "destroy b"]
    );
    assert_eq!(host.inner_html(host.body()), "<span></span>");
    assert_eq!(host.parent(div), None);
}

fn keyed_item(key: &str) -> V {
    h("li", props().with_key(key), key)
}

#[test]
fn test_failed_hook_keeps_queued_removal_retryable() {
    let (host, reconciler) = setup();
    let first: V = h("ul", props(), vec![keyed_item("a"), keyed_item("b")]);
    let failing: V = h(
        "ul",
        props(),
        vec![
            h(
                "li",
                props()
                    .with_key("c")
                    .oncreate(|_| Err(anyhow::anyhow!("refused"))),
                "c",
            ),
            keyed_item("a"),
        ],
    );

    let ul = reconciler.reconcile(None, &first, None, None).unwrap();
    let err = reconciler
        .reconcile(None, &failing, Some(ul), None)
        .unwrap_err();
    assert!(err.is_hook_error());
    assert_eq!(
        host.inner_html(ul),
        r#"<li key="c">c</li><li key="a">a</li><li key="b">b</li>"#
    );

    // The next pass sees "b" again and finishes removing it
    let settled: V = h("ul", props(), vec![keyed_item("a")]);
    reconciler.reconcile(None, &settled, Some(ul), None).unwrap();
    assert_eq!(host.inner_html(host.body()), r#"<ul><li key="a">a</li></ul>"#);
}

#[test]
fn test_failed_ondestroy_is_retried() {
    let (host, reconciler) = setup();
    let calls = Rc::new(Cell::new(0));
    let leaving: V = {
        let calls = Rc::clone(&calls);
        h(
            "li",
            props().with_key("a").ondestroy(move |_| {
                calls.set(calls.get() + 1);
                if calls.get() == 1 {
                    Err(anyhow::anyhow!("busy"))
                } else {
                    Ok(())
                }
            }),
            "a",
        )
    };
    let first: V = h("ul", props(), vec![leaving, keyed_item("b")]);
    let second: V = h("ul", props(), vec![keyed_item("b")]);

    let ul = reconciler.reconcile(None, &first, None, None).unwrap();
    let err = reconciler
        .reconcile(None, &second, Some(ul), None)
        .unwrap_err();
    match err {
        ReconcileError::Hook { hook, .. } => assert_eq!(hook, HookKind::Destroy),
        other => panic!("Expected hook error, got {:?}", other),
    }
    assert_eq!(host.children(ul).len(), 2);

    reconciler.reconcile(None, &second, Some(ul), None).unwrap();
    assert_eq!(calls.get(), 2);
    assert_eq!(host.inner_html(ul), r#"<li key="b">b</li>"#);
}

#[test]
fn test_failed_onremove_is_retried() {
    let (host, reconciler) = setup();
    let calls = Rc::new(Cell::new(0));
    let leaving: V = {
        let calls = Rc::clone(&calls);
        h(
            "li",
            props().onremove(move |_, removal| {
                calls.set(calls.get() + 1);
                if calls.get() == 1 {
                    return Err(anyhow::anyhow!("not yet"));
                }
                removal.complete()?;
                Ok(())
            }),
            "leaving",
        )
    };
    let first: V = h("ul", props(), vec![h("li", props(), "kept"), leaving]);
    let second: V = h("ul", props(), vec![h("li", props(), "kept")]);

    let ul = reconciler.reconcile(None, &first, None, None).unwrap();
    assert!(reconciler
        .reconcile(None, &second, Some(ul), None)
        .unwrap_err()
        .is_hook_error());
    assert_eq!(host.children(ul).len(), 2);

    reconciler.reconcile(None, &second, Some(ul), None).unwrap();
    assert_eq!(calls.get(), 2);
    assert_eq!(host.inner_html(ul), "<li>kept</li>");
}

#[test]
fn test_failed_hook_leaves_gated_removal_pending() {
    let (host, reconciler) = setup();
    let pending: Rc<RefCell<Option<Removal>>> = Rc::new(RefCell::new(None));
    let gated: V = {
        let pending = Rc::clone(&pending);
        h(
            "li",
            props().with_key("a").onremove(move |_, removal| {
                *pending.borrow_mut() = Some(removal);
                Ok(())
            }),
            "a",
        )
    };
    let first: V = h("ul", props(), vec![gated, keyed_item("b")]);
    // "a" leaves first, then the parent's onupdate fails
    let failing: V = h(
        "ul",
        props().onupdate(|_, _| Err(anyhow::anyhow!("refused"))),
        vec![keyed_item("b")],
    );

    let ul = reconciler.reconcile(None, &first, None, None).unwrap();
    assert!(reconciler
        .reconcile(None, &failing, Some(ul), None)
        .unwrap_err()
        .is_hook_error());

    // The removal ran before the failure, so it waits on its token as usual
    assert_eq!(host.children(ul).len(), 2);
    let settled: V = h("ul", props(), vec![keyed_item("b")]);
    reconciler.reconcile(None, &settled, Some(ul), None).unwrap();
    assert_eq!(host.children(ul).len(), 2);

    let removal = pending.borrow_mut().take().unwrap();
    assert_eq!(removal.complete(), Ok(true));
    assert_eq!(host.inner_html(ul), r#"<li key="b">b</li>"#);
}
