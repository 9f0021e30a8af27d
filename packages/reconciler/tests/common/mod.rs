#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use twig_reconciler::memory_host::{MemoryHost, NodeId};
use twig_reconciler::Reconciler;
use twig_vdom::{HookResult, Props, VNode};

pub type V = VNode<NodeId>;

pub type Log = Rc<RefCell<Vec<String>>>;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub fn props() -> Props<NodeId> {
    Props::new()
}

pub fn setup() -> (Rc<MemoryHost>, Reconciler<MemoryHost>) {
    init_tracing();
    let host = MemoryHost::shared();
    let reconciler = Reconciler::new(Rc::clone(&host));
    (host, reconciler)
}

pub fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

/// Hook that appends `label` to `log`
pub fn record(log: &Log, label: &str) -> impl Fn(&NodeId) -> HookResult + 'static {
    let log = Rc::clone(log);
    let label = label.to_string();
    move |_: &NodeId| {
        log.borrow_mut().push(label.clone());
        Ok(())
    }
}

/// Update hook that appends `label` to `log`
pub fn record_update(
    log: &Log,
    label: &str,
) -> impl Fn(&NodeId, &Props<NodeId>) -> HookResult + 'static {
    let log = Rc::clone(log);
    let label = label.to_string();
    move |_: &NodeId, _: &Props<NodeId>| {
        log.borrow_mut().push(label.clone());
        Ok(())
    }
}

pub fn entries(log: &Log) -> Vec<String> {
    log.borrow().clone()
}
