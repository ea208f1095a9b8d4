// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mouse gestures over a small in-memory tree.
//!
//! This example shows how to:
//! - implement the `NodeTree`, `PointerSource` and `Timers` capabilities,
//! - declare click, double-click, long-click and move rules,
//! - drive a `Dispatcher` from a scripted event stream on a virtual clock,
//! - route key input by mode with a `ScopeRouter`.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p understory_demos --example mouse_gestures`

use std::cell::RefCell;
use std::rc::Rc;

use kurbo::Point;
use understory_gesture::source::{Listener, PointerSource};
use understory_gesture::timer::{TimerHandle, TimerToken, Timers};
use understory_gesture::tree::NodeTree;
use understory_gesture::types::ListenerTag;
use understory_gesture::{
    Button, Dispatcher, GestureType, HandlerError, PointerEvent, PointerKind, RuleNode, RuleSet,
    ScopeRouter, ScopeRules,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
struct NodeId(usize);

/// Parent link plus a class name per node; selectors are class names.
#[derive(Default)]
struct Scene {
    nodes: Vec<(Option<NodeId>, &'static str, &'static str)>,
}

impl Scene {
    fn insert(&mut self, parent: Option<NodeId>, class: &'static str, name: &'static str) -> NodeId {
        self.nodes.push((parent, class, name));
        NodeId(self.nodes.len() - 1)
    }

    fn name(&self, node: NodeId) -> &'static str {
        self.nodes[node.0].2
    }

    fn is_within(&self, node: NodeId, root: NodeId) -> bool {
        let mut cur = Some(node);
        while let Some(n) = cur {
            if n == root {
                return true;
            }
            cur = self.parent(&n);
        }
        false
    }
}

impl NodeTree<NodeId> for Scene {
    type Selector = &'static str;

    fn contains(&self, node: &NodeId) -> bool {
        node.0 < self.nodes.len()
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|(p, ..)| *p)
    }

    fn matches(&self, node: &NodeId, selector: &&'static str) -> bool {
        self.nodes.get(node.0).is_some_and(|(_, class, _)| class == selector)
    }

    fn boundary(&self) -> Option<NodeId> {
        Some(NodeId(0))
    }
}

/// Listener registry standing in for a windowing backend.
#[derive(Default)]
struct Listeners {
    active: Vec<Listener<NodeId>>,
}

impl Listeners {
    fn wants(&self, scene: &Scene, kind: PointerKind, target: NodeId) -> bool {
        self.active
            .iter()
            .any(|l| l.kind == kind && scene.is_within(target, l.root))
    }
}

impl PointerSource<NodeId> for Listeners {
    fn listen(&mut self, listener: Listener<NodeId>) {
        self.active.push(listener);
    }

    fn unlisten_all(&mut self, tag: ListenerTag) {
        self.active.retain(|l| l.tag != tag);
    }
}

/// Virtual clock with a pending timer list.
#[derive(Default)]
struct Clock {
    now: u64,
    next: u64,
    pending: Vec<(u64, TimerHandle, TimerToken)>,
}

impl Clock {
    /// Move time forward to `t` and return the tokens that came due.
    fn advance_to(&mut self, t: u64) -> Vec<TimerToken> {
        self.now = self.now.max(t);
        let now = self.now;
        let mut due: Vec<_> = self.pending.iter().filter(|(at, ..)| *at <= now).copied().collect();
        self.pending.retain(|(at, ..)| *at > now);
        due.sort_by_key(|(at, handle, _)| (*at, handle.0));
        due.into_iter().map(|(.., token)| token).collect()
    }
}

impl Timers for Clock {
    fn schedule(&mut self, delay: u64, token: TimerToken) -> TimerHandle {
        self.next += 1;
        let handle = TimerHandle(self.next);
        self.pending.push((self.now + delay, handle, token));
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.pending.retain(|(_, h, _)| *h != handle);
    }
}

struct App {
    scene: Rc<Scene>,
    listeners: Listeners,
    clock: Clock,
    dispatcher: Dispatcher<NodeId, &'static str>,
}

impl App {
    fn tick(&mut self, t: u64) {
        for token in self.clock.advance_to(t) {
            if let Err(failures) = self.dispatcher.on_timer(token, &*self.scene) {
                println!("  ! {failures}");
            }
        }
    }

    fn send(&mut self, mut ev: PointerEvent<NodeId>) {
        self.tick(ev.timestamp);
        if !self.listeners.wants(&self.scene, ev.kind, ev.target) {
            return;
        }
        if let Err(failures) = self.dispatcher.handle(&mut ev, &*self.scene, &mut self.clock) {
            println!("  ! {failures}");
        }
    }
}

fn main() {
    env_logger::init();

    // body > app > (toolbar, list > item × 3)
    let mut scene = Scene::default();
    let body = scene.insert(None, "body", "body");
    let app = scene.insert(Some(body), "app", "app");
    let toolbar = scene.insert(Some(app), "toolbar", "toolbar");
    let list = scene.insert(Some(app), "list", "list");
    let items: Vec<NodeId> = ["inbox", "drafts", "archive"]
        .into_iter()
        .map(|name| scene.insert(Some(list), "item", name))
        .collect();
    let scene = Rc::new(scene);

    // Key input is routed by mode; a double-click switches into rename mode.
    let mode: ScopeRouter<&'static str> = ScopeRouter::new();
    let keys = ScopeRules::new();
    keys.add_rule("default", |_: Option<&&'static str>, key: char| {
        println!("  key {key:?}: navigate");
    });
    keys.add_rule("rename", |item: Option<&&'static str>, key: char| {
        println!("  key {key:?}: rename {}", item.copied().unwrap_or("?"));
    });
    let on_key = mode.bind_rules(&keys);

    let say = |what: &'static str| {
        let scene = scene.clone();
        move |_ev: &PointerEvent<NodeId>, node: NodeId| -> Result<(), HandlerError> {
            println!("  {what} {}", scene.name(node));
            Ok(())
        }
    };
    let rename = {
        let scene = scene.clone();
        let mode = mode.clone();
        move |_ev: &PointerEvent<NodeId>, node: NodeId| -> Result<(), HandlerError> {
            println!("  rename {}", scene.name(node));
            mode.switch(Some("rename"), Some(scene.name(node)));
            Ok(())
        }
    };
    let hovered: Rc<RefCell<Option<NodeId>>> = Rc::default();
    let hover = {
        let scene = scene.clone();
        let hovered = hovered.clone();
        move |_ev: &PointerEvent<NodeId>, node: NodeId| -> Result<(), HandlerError> {
            if hovered.replace(Some(node)) != Some(node) {
                println!("  hover {}", scene.name(node));
            }
            Ok(())
        }
    };

    let rules: RuleSet<NodeId, &'static str> = RuleSet::builder()
        .on(
            GestureType::ClickLeft,
            [RuleNode::selector("list")
                .hold_trigger()
                .handler(say("select in"))
                .child(RuleNode::selector("item").handler(say("open")))],
        )
        .on(
            GestureType::DoubleClickLeft,
            [RuleNode::selector("item").handler(rename)],
        )
        .on(
            GestureType::LongClickRight,
            [RuleNode::selector("item").handler(say("context menu for"))],
        )
        .on(
            GestureType::DownLeft,
            [RuleNode::selector("toolbar")
                .current_only()
                .handler(|_, _| Err(HandlerError::new("toolbar is disabled")))],
        )
        .on(GestureType::Move, [RuleNode::selector("item").handler(hover)])
        .build()
        .expect("rules are valid");

    let mut listeners = Listeners::default();
    let dispatcher =
        Dispatcher::new(rules, app, &*scene, &mut listeners).expect("app is part of the scene");
    let mut app_state = App {
        scene: scene.clone(),
        listeners,
        clock: Clock::default(),
        dispatcher,
    };

    let at = Point::new(10.0, 10.0);
    let [inbox, drafts, archive] = [items[0], items[1], items[2]];

    println!("single click on inbox");
    app_state.send(PointerEvent::press(Button::Left, inbox, at, 0));
    app_state.send(PointerEvent::release(Button::Left, inbox, at, 60));
    app_state.tick(400);

    println!("double click on drafts");
    app_state.send(PointerEvent::press(Button::Left, drafts, at, 1000));
    app_state.send(PointerEvent::release(Button::Left, drafts, at, 1050));
    app_state.send(PointerEvent::press(Button::Left, drafts, at, 1120));
    app_state.send(PointerEvent::release(Button::Left, drafts, at, 1170));
    app_state.tick(1500);
    on_key('x');
    mode.switch(None, None);
    on_key('x');

    println!("long press with the right button on archive");
    app_state.send(PointerEvent::press(Button::Right, archive, at, 2000));
    app_state.send(PointerEvent::release(Button::Right, archive, at, 2800));

    println!("press on the toolbar");
    app_state.send(PointerEvent::press(Button::Left, toolbar, at, 3000));
    app_state.send(PointerEvent::release(Button::Left, toolbar, at, 3050));
    app_state.tick(3400);

    println!("pointer sweep across the list");
    for (i, &item) in items.iter().enumerate() {
        for step in 0..4_u64 {
            let t = 4000 + (i as u64) * 100 + step * 10;
            app_state.send(PointerEvent::moved(item, Point::new(10.0, t as f64), t));
        }
    }

    println!("press, then rebuild before release");
    app_state.send(PointerEvent::press(Button::Left, inbox, at, 5000));
    app_state
        .dispatcher
        .rebuild(&mut app_state.listeners, &mut app_state.clock);
    app_state.send(PointerEvent::release(Button::Left, inbox, at, 5050));
    app_state.tick(6000);

    app_state
        .dispatcher
        .destroy(&mut app_state.listeners, &mut app_state.clock);
    println!(
        "destroyed: {} listener(s), {} timer(s) left",
        app_state.listeners.active.len(),
        app_state.clock.pending.len()
    );
}
