use std::{collections::BTreeMap, fmt};

use crate::{
    admission_request::{GroupVersionKind, Operation},
    request::MutationRequest,
};

/// Outcome of a binding callback. Failures are ordinary error values; the
/// processor decides whether a failure rejects the request or downgrades
/// to a warning.
pub type CallbackResult = anyhow::Result<()>;

type Callback = Box<dyn Fn(&mut MutationRequest) -> CallbackResult + Send + Sync>;

/// Event selector of a binding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    Create,
    Update,
    Delete,
    CreateOrUpdate,
}

impl Event {
    /// Whether this selector covers the given admission operation.
    /// `CreateOrUpdate` covers exactly CREATE and UPDATE; CONNECT is
    /// covered by nothing.
    pub fn covers(&self, operation: Operation) -> bool {
        match self {
            Event::Create => operation == Operation::Create,
            Event::Update => operation == Operation::Update,
            Event::Delete => operation == Operation::Delete,
            Event::CreateOrUpdate => {
                matches!(operation, Operation::Create | Operation::Update)
            }
        }
    }
}

/// Conjunctive request filters of a binding. An empty field matches
/// everything; a label or annotation mapped to the empty string only
/// requires the key to be present.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BindingFilters {
    pub namespaces: Vec<String>,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
}

/// One rule of a capability: a filter plus a callback. Immutable after
/// creation.
pub struct Binding {
    pub event: Event,
    pub kind: GroupVersionKind,
    pub filters: BindingFilters,
    callback: Callback,
}

impl Binding {
    pub fn run(&self, request: &mut MutationRequest) -> CallbackResult {
        (self.callback)(request)
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("event", &self.event)
            .field("kind", &self.kind)
            .field("filters", &self.filters)
            .finish_non_exhaustive()
    }
}

/// A named, ordered group of bindings. Bindings retain registration order
/// and run in it.
pub struct Capability {
    name: String,
    namespaces: Vec<String>,
    bindings: Vec<Binding>,
}

impl Capability {
    pub fn new(name: impl Into<String>) -> Self {
        Capability {
            name: name.into(),
            namespaces: Vec::new(),
            bindings: Vec::new(),
        }
    }

    /// Restrict every binding of this capability to the given namespaces.
    #[must_use]
    pub fn in_namespaces<I, S>(mut self, namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.namespaces
            .extend(namespaces.into_iter().map(Into::into));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Root of the fluent registration chain: pick the resource kind,
    /// then the event, then optional filters, then one or more callbacks.
    pub fn when(&mut self, kind: GroupVersionKind) -> BindingWhen<'_> {
        BindingWhen {
            capability: self,
            kind,
        }
    }
}

/// Chain state after `when`: only event selectors are valid here.
pub struct BindingWhen<'a> {
    capability: &'a mut Capability,
    kind: GroupVersionKind,
}

impl<'a> BindingWhen<'a> {
    #[must_use]
    pub fn is_created(self) -> BindingFilter<'a> {
        self.with_event(Event::Create)
    }

    #[must_use]
    pub fn is_updated(self) -> BindingFilter<'a> {
        self.with_event(Event::Update)
    }

    #[must_use]
    pub fn is_deleted(self) -> BindingFilter<'a> {
        self.with_event(Event::Delete)
    }

    #[must_use]
    pub fn is_created_or_updated(self) -> BindingFilter<'a> {
        self.with_event(Event::CreateOrUpdate)
    }

    fn with_event(self, event: Event) -> BindingFilter<'a> {
        BindingFilter {
            capability: self.capability,
            kind: self.kind,
            event,
            filters: BindingFilters::default(),
        }
    }
}

/// Chain state after the event selector: filters accumulate until `then`
/// freezes them into a binding.
pub struct BindingFilter<'a> {
    capability: &'a mut Capability,
    kind: GroupVersionKind,
    event: Event,
    filters: BindingFilters,
}

impl<'a> BindingFilter<'a> {
    #[must_use]
    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.filters.namespaces.push(namespace.into());
        self
    }

    #[must_use]
    pub fn in_one_of_namespaces<I, S>(mut self, namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters
            .namespaces
            .extend(namespaces.into_iter().map(Into::into));
        self
    }

    /// Require the label key to be present, with any value.
    #[must_use]
    pub fn with_label(mut self, key: impl Into<String>) -> Self {
        self.filters.labels.insert(key.into(), String::new());
        self
    }

    /// Require the label key to be present with exactly this value.
    #[must_use]
    pub fn with_label_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.labels.insert(key.into(), value.into());
        self
    }

    /// Require the annotation key to be present, with any value.
    #[must_use]
    pub fn with_annotation(mut self, key: impl Into<String>) -> Self {
        self.filters.annotations.insert(key.into(), String::new());
        self
    }

    /// Require the annotation key to be present with exactly this value.
    #[must_use]
    pub fn with_annotation_value(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.filters.annotations.insert(key.into(), value.into());
        self
    }

    /// Freeze the filter and register the callback as a binding.
    pub fn then<F>(self, callback: F) -> BindingChain<'a>
    where
        F: Fn(&mut MutationRequest) -> CallbackResult + Send + Sync + 'static,
    {
        let chain = BindingChain {
            capability: self.capability,
            kind: self.kind,
            event: self.event,
            filters: self.filters,
        };
        chain.then(callback)
    }
}

/// Handle returned by `then`. The filter is frozen; further `then` calls
/// append sibling bindings sharing it, each a separate binding in
/// registration order.
pub struct BindingChain<'a> {
    capability: &'a mut Capability,
    kind: GroupVersionKind,
    event: Event,
    filters: BindingFilters,
}

impl<'a> BindingChain<'a> {
    pub fn then<F>(self, callback: F) -> BindingChain<'a>
    where
        F: Fn(&mut MutationRequest) -> CallbackResult + Send + Sync + 'static,
    {
        self.capability.bindings.push(Binding {
            event: self.event,
            kind: self.kind.clone(),
            filters: self.filters.clone(),
            callback: Box::new(callback),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use rstest::*;

    use super::*;

    #[rstest]
    #[case(Event::Create, Operation::Create, true)]
    #[case(Event::Create, Operation::Update, false)]
    #[case(Event::Update, Operation::Update, true)]
    #[case(Event::Update, Operation::Delete, false)]
    #[case(Event::Delete, Operation::Delete, true)]
    #[case(Event::Delete, Operation::Create, false)]
    #[case(Event::CreateOrUpdate, Operation::Create, true)]
    #[case(Event::CreateOrUpdate, Operation::Update, true)]
    #[case(Event::CreateOrUpdate, Operation::Delete, false)]
    #[case(Event::CreateOrUpdate, Operation::Connect, false)]
    fn event_coverage(#[case] event: Event, #[case] operation: Operation, #[case] covered: bool) {
        assert_eq!(event.covers(operation), covered);
    }

    #[test]
    fn builder_registers_bindings_in_order() {
        let mut capability = Capability::new("ordering");

        capability
            .when(GroupVersionKind::with_kind("Pod"))
            .is_created()
            .then(|_| Ok(()));
        capability
            .when(GroupVersionKind::with_kind("Service"))
            .is_updated()
            .then(|_| Ok(()));

        let bindings = capability.bindings();
        assert_eq!(bindings.len(), 2);
        assert_eq!(bindings[0].kind.kind, "Pod");
        assert_eq!(bindings[0].event, Event::Create);
        assert_eq!(bindings[1].kind.kind, "Service");
        assert_eq!(bindings[1].event, Event::Update);
    }

    #[test]
    fn chained_then_shares_the_frozen_filter() {
        let mut capability = Capability::new("chained");

        capability
            .when(GroupVersionKind::with_kind("Pod"))
            .is_created_or_updated()
            .in_namespace("default")
            .with_label_value("app", "web")
            .then(|_| Ok(()))
            .then(|_| Ok(()));

        let bindings = capability.bindings();
        assert_eq!(bindings.len(), 2);
        assert_eq!(bindings[0].filters, bindings[1].filters);
        assert_eq!(bindings[0].filters.namespaces, vec!["default"]);
        assert_eq!(
            bindings[0].filters.labels.get("app"),
            Some(&String::from("web"))
        );
    }

    #[test]
    fn presence_only_label_is_stored_as_empty_value() {
        let mut capability = Capability::new("presence");

        capability
            .when(GroupVersionKind::with_kind("Pod"))
            .is_created()
            .with_label("needs-sidecar")
            .with_annotation("reviewed")
            .then(|_| Ok(()));

        let binding = &capability.bindings()[0];
        assert_eq!(
            binding.filters.labels.get("needs-sidecar"),
            Some(&String::new())
        );
        assert_eq!(
            binding.filters.annotations.get("reviewed"),
            Some(&String::new())
        );
    }

    #[test]
    fn capability_namespace_restriction_accumulates() {
        let capability =
            Capability::new("restricted").in_namespaces(["team-a", "team-b"]);
        assert_eq!(capability.namespaces(), ["team-a", "team-b"]);
    }
}
