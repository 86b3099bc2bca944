//! Read-only inputs shared by every controller, plus a tiny single-writer
//! observable used to broadcast them.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use crate::math::Vec2;
use crate::theme::Theme;

/// Pointer or touch position in viewport pixels. `None` is "cursor at
/// infinity": every proximity effect decays back to rest.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pointer(pub Option<Vec2>);

impl Pointer {
    pub fn at(x: f64, y: f64) -> Self {
        Pointer(Some(Vec2::new(x, y)))
    }

    pub fn away() -> Self {
        Pointer(None)
    }

    pub fn position(&self) -> Option<Vec2> {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    Up,
    Down,
    #[default]
    Idle,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Idle => "idle",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollSignal {
    /// Virtual scroll offset in pixels.
    pub scroll: f64,
    /// Maximum scroll offset.
    pub limit: f64,
    /// `scroll / limit`, in `[0, 1]`.
    pub progress: f64,
    /// Pixels moved during the last update.
    pub velocity: f64,
    pub direction: Direction,
    pub is_scrolling: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }
}

/// Snapshot handed to every effect once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Signals {
    pub pointer: Pointer,
    pub scroll: ScrollSignal,
    pub viewport: Viewport,
    pub theme: Theme,
    /// Seconds since the frame loop started.
    pub time: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener<T> = (SubscriptionId, Box<dyn FnMut(&T)>);

struct Registry<T> {
    next_id: u64,
    live: HashSet<SubscriptionId>,
    listeners: Vec<Listener<T>>,
}

/// Cloneable subscribe/unsubscribe handle. It never touches the published
/// value, so listeners may use it while a publish is running.
pub struct Subscribers<T> {
    registry: Rc<RefCell<Registry<T>>>,
}

impl<T> Clone for Subscribers<T> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
        }
    }
}

impl<T> Subscribers<T> {
    pub fn subscribe(&self, listener: impl FnMut(&T) + 'static) -> SubscriptionId {
        let mut reg = self.registry.borrow_mut();
        let id = SubscriptionId(reg.next_id);
        reg.next_id += 1;
        reg.live.insert(id);
        reg.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns `false` when `id` was not (or no longer) subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut reg = self.registry.borrow_mut();
        // listeners running right now are out of `listeners`; `publish`
        // drops them on merge once they are no longer live
        reg.listeners.retain(|(sid, _)| *sid != id);
        reg.live.remove(&id)
    }

    pub fn count(&self) -> usize {
        self.registry.borrow().live.len()
    }

    pub fn clear(&self) {
        let mut reg = self.registry.borrow_mut();
        reg.live.clear();
        reg.listeners.clear();
    }

    fn notify(&self, value: &T) {
        let mut running = std::mem::take(&mut self.registry.borrow_mut().listeners);
        for (id, listener) in running.iter_mut() {
            if self.registry.borrow().live.contains(&*id) {
                listener(value);
            }
        }
        let mut reg = self.registry.borrow_mut();
        let live = &reg.live;
        running.retain(|(id, _)| live.contains(id));
        running.append(&mut reg.listeners);
        reg.listeners = running;
    }
}

/// Single-writer observable value. Listeners run synchronously on publish
/// and may subscribe or unsubscribe through `subscribers()` while doing so.
pub struct Broadcast<T> {
    value: T,
    subscribers: Subscribers<T>,
}

impl<T: Clone> Broadcast<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            subscribers: Subscribers {
                registry: Rc::new(RefCell::new(Registry {
                    next_id: 0,
                    live: HashSet::new(),
                    listeners: Vec::new(),
                })),
            },
        }
    }

    pub fn get(&self) -> T {
        self.value.clone()
    }

    pub fn subscribers(&self) -> Subscribers<T> {
        self.subscribers.clone()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&T) + 'static) -> SubscriptionId {
        self.subscribers.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    pub fn publish(&mut self, value: T) {
        self.value = value;
        self.subscribers.notify(&self.value);
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.count()
    }

    pub fn clear(&mut self) {
        self.subscribers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn unsubscribed_listener_stops_receiving() {
        let hits = Rc::new(Cell::new(0));
        let mut b = Broadcast::new(0u32);
        let h = hits.clone();
        let id = b.subscribe(move |_| h.set(h.get() + 1));
        b.publish(1);
        assert!(b.unsubscribe(id));
        b.publish(2);
        assert_eq!(hits.get(), 1);
        assert_eq!(b.get(), 2);
        assert!(!b.unsubscribe(id));
    }

    #[test]
    fn listeners_may_unsubscribe_during_publish() {
        let hits = Rc::new(Cell::new(0));
        let mut b = Broadcast::new(0u32);
        let subs = b.subscribers();
        let own = Rc::new(Cell::new(None));
        let id = {
            let (subs, own, hits) = (subs.clone(), own.clone(), hits.clone());
            b.subscribe(move |_| {
                hits.set(hits.get() + 1);
                if let Some(id) = own.get() {
                    assert!(subs.unsubscribe(id));
                }
            })
        };
        own.set(Some(id));
        b.publish(1);
        b.publish(2);
        assert_eq!(hits.get(), 1);
        assert_eq!(b.subscriber_count(), 0);
    }

    #[test]
    fn listeners_added_during_publish_start_on_the_next_one() {
        let late_hits = Rc::new(Cell::new(0));
        let mut b = Broadcast::new(0u32);
        let subs = b.subscribers();
        {
            let late_hits = late_hits.clone();
            b.subscribe(move |_| {
                if subs.count() == 1 {
                    let late_hits = late_hits.clone();
                    subs.subscribe(move |_| late_hits.set(late_hits.get() + 1));
                }
            });
        }
        b.publish(1);
        assert_eq!(late_hits.get(), 0);
        b.publish(2);
        assert_eq!(late_hits.get(), 1);
        assert_eq!(b.subscriber_count(), 2);
    }
}
