//! Listener registration and event dispatch on selections.

use std::sync::Arc;

use horizon_bind_core::logging::targets;
use horizon_bind_core::{Element, Event, EventInit, Listener, TypeName};

use super::{Bindable, Context, Selection};

impl<D: Bindable> Selection<D> {
    /// Register `listener` on every node for each `type[.name]` in the
    /// space-separated `typenames`.
    ///
    /// Registering the same `type.name` again replaces the earlier listener.
    /// The listener's context carries the datum as of dispatch time, and the
    /// index and group as of registration.
    pub fn on<F>(&self, typenames: &str, listener: F) -> Self
    where
        F: Fn(&Event, Context<'_, D>) + Send + Sync + 'static,
    {
        let listener = Arc::new(listener);
        let keys: Vec<TypeName> = TypeName::parse_list(typenames)
            .into_iter()
            .filter(|key| !key.event_type.is_empty())
            .collect();

        for group in self.groups() {
            let shared_group = Arc::new(group.clone());
            for (index, node) in group.nodes.iter().enumerate() {
                let Some(node) = *node else { continue };
                for key in &keys {
                    let listener = Arc::clone(&listener);
                    let group = Arc::clone(&shared_group);
                    let wrapped: Listener = Arc::new(move |event: &Event, element: &Element| {
                        let datum = element
                            .document()
                            .read(|t| t.datum(element.id()).ok().flatten());
                        let typed = datum.as_deref().and_then(|d| d.downcast_ref::<D>());
                        listener(
                            event,
                            Context {
                                element,
                                datum: typed,
                                index,
                                group: &*group,
                            },
                        );
                    });
                    let result = self
                        .document()
                        .write(|t| t.set_listener(node, key.clone(), wrapped));
                    self.report("on", node, result);
                }
            }
        }
        tracing::debug!(target: targets::EVENTS, typenames, nodes = self.size(), "registered listeners");
        self.clone()
    }

    /// Remove listeners from every node. `type` removes the unnamed listener
    /// of that type, `type.name` a named one, and `.name` that name for every
    /// type.
    pub fn on_remove(&self, typenames: &str) -> Self {
        let keys = TypeName::parse_list(typenames);
        for node in self.nodes() {
            let result = self.document().write(|t| -> horizon_bind_core::Result<()> {
                for key in &keys {
                    t.remove_listeners(node, key)?;
                }
                Ok(())
            });
            self.report("on_remove", node, result);
        }
        self.clone()
    }

    /// The listener registered on the first node under exactly `typename`.
    pub fn listener(&self, typename: &str) -> Option<Listener> {
        let node = self.node()?;
        let key = TypeName::parse(typename);
        self.document()
            .read(|t| t.listener(node, &key).ok().flatten())
    }

    /// Dispatch an event of `event_type` to every node.
    pub fn dispatch(&self, event_type: &str, init: EventInit) -> Self {
        for node in self.nodes() {
            let result = self.document().dispatch(node, event_type, init.clone()).map(|_| ());
            self.report("dispatch", node, result);
        }
        self.clone()
    }

    /// Dispatch an event to every node with parameters computed per node.
    pub fn dispatch_with<F>(&self, event_type: &str, mut f: F) -> Self
    where
        F: FnMut(Context<'_, D>) -> EventInit,
    {
        self.visit(|ctx| {
            let node = ctx.element.id();
            let init = f(ctx);
            let result = self.document().dispatch(node, event_type, init).map(|_| ());
            self.report("dispatch", node, result);
        });
        self.clone()
    }
}
