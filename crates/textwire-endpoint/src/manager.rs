//! Endpoint name to ordered subscriber list.

use std::collections::HashMap;

/// Handle returned by [`EndpointManager::register`].
///
/// Unregistering with it removes exactly the subscriber it was issued for,
/// even when the same callback was registered more than once.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subscription {
    endpoint: String,
    id: u64,
}

impl Subscription {
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

/// A registered subscriber and its id.
#[derive(Debug)]
pub struct Listener<C> {
    id: u64,
    callback: C,
}

impl<C> Listener<C> {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn callback(&self) -> &C {
        &self.callback
    }

    pub fn callback_mut(&mut self) -> &mut C {
        &mut self.callback
    }
}

/// Subscribers keyed by endpoint name, in registration order.
///
/// An endpoint exists only while it has at least one subscriber.
#[derive(Debug)]
pub struct EndpointManager<C> {
    endpoints: HashMap<String, Vec<Listener<C>>>,
    next_id: u64,
}

impl<C> EndpointManager<C> {
    pub fn new() -> Self {
        Self {
            endpoints: HashMap::new(),
            next_id: 1,
        }
    }

    /// Append `callback` to the endpoint's subscriber list.
    pub fn register(&mut self, endpoint: impl Into<String>, callback: C) -> Subscription {
        let endpoint = endpoint.into();
        let id = self.next_id;
        self.next_id += 1;

        self.endpoints
            .entry(endpoint.clone())
            .or_default()
            .push(Listener { id, callback });

        Subscription { endpoint, id }
    }

    /// Remove the subscriber behind `subscription`, returning its callback.
    ///
    /// Returns `None` if it was already removed.
    pub fn unregister(&mut self, subscription: &Subscription) -> Option<C> {
        let listeners = self.endpoints.get_mut(&subscription.endpoint)?;
        let position = listeners.iter().position(|l| l.id == subscription.id)?;
        let removed = listeners.remove(position);

        if listeners.is_empty() {
            self.endpoints.remove(&subscription.endpoint);
        }
        Some(removed.callback)
    }

    /// Subscribers for `endpoint` in registration order, or an empty slice.
    pub fn listeners(&self, endpoint: &str) -> &[Listener<C>] {
        self.endpoints
            .get(endpoint)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn listeners_mut(&mut self, endpoint: &str) -> &mut [Listener<C>] {
        match self.endpoints.get_mut(endpoint) {
            Some(listeners) => listeners.as_mut_slice(),
            None => &mut [],
        }
    }

    pub fn contains(&self, endpoint: &str) -> bool {
        self.endpoints.contains_key(endpoint)
    }

    pub fn endpoint_count(&self) -> usize {
        self.endpoints.len()
    }
}

impl<C> Default for EndpointManager<C> {
    fn default() -> Self {
        Self::new()
    }
}
