//! Property tests: live listener counts match a simple model after any
//! sequence of operations.

use proptest::prelude::*;
use tidings_core::events::{Callback, Dispatcher, EventKey, Subscription};

const KEYS: [&str; 3] = ["greet", "ping", "submit"];

#[derive(Debug, Clone)]
enum Op {
    Subscribe(usize),
    SubscribeOnce(usize),
    Unsubscribe(usize),
    Emit(usize),
    OffCallback(usize),
    OffAll(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..KEYS.len()).prop_map(Op::Subscribe),
        (0..KEYS.len()).prop_map(Op::SubscribeOnce),
        (0..32usize).prop_map(Op::Unsubscribe),
        (0..KEYS.len()).prop_map(Op::Emit),
        (0..KEYS.len()).prop_map(Op::OffCallback),
        (0..KEYS.len()).prop_map(Op::OffAll),
    ]
}

/// One registration as the model sees it
struct ModelListener {
    key: usize,
    once: bool,
    shared_callback: bool,
    alive: bool,
}

proptest! {
    #[test]
    fn listener_counts_match_model(ops in proptest::collection::vec(op(), 1..64)) {
        let dispatcher: Dispatcher<u8> = Dispatcher::new();
        let shared: Callback<u8> = Callback::payload_only(|_| {});
        let mut model: Vec<ModelListener> = Vec::new();
        let mut handles: Vec<Subscription> = Vec::new();

        for (step, op) in ops.into_iter().enumerate() {
            match op {
                Op::Subscribe(k) | Op::SubscribeOnce(k) => {
                    let once = matches!(op, Op::SubscribeOnce(_));
                    // Alternate between the shared callback and a fresh one.
                    let shared_callback = step % 2 == 0;
                    let callback = if shared_callback {
                        shared.clone()
                    } else {
                        Callback::payload_only(|_| {})
                    };
                    let handle = if once {
                        dispatcher.subscribe_once(KEYS[k], callback, None)
                    } else {
                        dispatcher.subscribe(KEYS[k], callback, None)
                    };
                    handles.push(handle);
                    model.push(ModelListener { key: k, once, shared_callback, alive: true });
                }
                Op::Unsubscribe(i) => {
                    if let Some(handle) = handles.get(i) {
                        let removed = handle.unsubscribe();
                        prop_assert_eq!(removed, model[i].alive);
                        model[i].alive = false;
                    }
                }
                Op::Emit(k) => {
                    dispatcher.emit(KEYS[k], &0u8);
                    for listener in model.iter_mut().filter(|l| l.key == k && l.once) {
                        listener.alive = false;
                    }
                }
                Op::OffCallback(k) => {
                    dispatcher.off(KEYS[k], Some(&shared), None);
                    for listener in model.iter_mut().filter(|l| l.key == k && l.shared_callback) {
                        listener.alive = false;
                    }
                }
                Op::OffAll(k) => {
                    dispatcher.off(KEYS[k], None, None);
                    for listener in model.iter_mut().filter(|l| l.key == k) {
                        listener.alive = false;
                    }
                }
            }

            for (k, name) in KEYS.iter().enumerate() {
                let expected = model.iter().filter(|l| l.key == k && l.alive).count();
                prop_assert_eq!(dispatcher.listener_count(*name), expected);
                prop_assert_eq!(dispatcher.has_listeners(*name), expected > 0);
                prop_assert_eq!(
                    dispatcher.event_keys().contains(&EventKey::from(*name)),
                    expected > 0
                );
            }
            for (handle, listener) in handles.iter().zip(&model) {
                prop_assert_eq!(handle.is_active(), listener.alive);
            }
        }
    }

    #[test]
    fn event_keys_never_repeat(names in proptest::collection::vec("[a-c]{1,2}", 0..32)) {
        let dispatcher: Dispatcher<u8> = Dispatcher::new();
        for name in &names {
            dispatcher.on(name.as_str(), |_| {});
        }

        let keys = dispatcher.event_keys();
        let mut unique = names.clone();
        unique.sort();
        unique.dedup();
        prop_assert_eq!(keys.len(), unique.len());
    }
}
