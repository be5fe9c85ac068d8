//! Middleware registry.
//!
//! The [`Registry`] holds the three middleware collections an engine owns:
//!
//! | Category | Shape | Dedup key |
//! |----------|-------|-----------|
//! | Global   | ordered list | resolved handler reference |
//! | Named    | alias → entry | alias (first registration wins) |
//! | Server   | ordered list | resolved handler reference |
//!
//! Insertions never replace an existing entry. A rejected insertion is
//! reported to the caller, which turns it into a warning.

use crate::entry::MiddlewareEntry;
use indexmap::IndexMap;
use std::fmt;

/// The collection a middleware is registered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Runs for every composed global/named chain, ahead of named middleware.
    Global,
    /// Registered under an alias and selected per use.
    Named,
    /// Runs in the server chain, independent of global and named.
    Server,
}

impl Category {
    /// Returns the category name as used in warnings and log fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Named => "named",
            Self::Server => "server",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Formats the warning emitted when a registration is discarded.
#[must_use]
pub fn duplicate_warning(category: Category, name: &str) -> String {
    format!("Detected existing {category} middleware {{{name}}}, the current one will be ignored")
}

/// Registered middleware, owned by a single engine.
pub struct Registry<C> {
    global: Vec<MiddlewareEntry<C>>,
    named: IndexMap<String, MiddlewareEntry<C>>,
    server: Vec<MiddlewareEntry<C>>,
}

impl<C> Registry<C> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            global: Vec::new(),
            named: IndexMap::new(),
            server: Vec::new(),
        }
    }

    /// Returns the global middleware in registration order.
    #[must_use]
    pub fn global(&self) -> &[MiddlewareEntry<C>] {
        &self.global
    }

    /// Returns the named middleware in registration order.
    #[must_use]
    pub const fn named(&self) -> &IndexMap<String, MiddlewareEntry<C>> {
        &self.named
    }

    /// Returns the server middleware in registration order.
    #[must_use]
    pub fn server(&self) -> &[MiddlewareEntry<C>] {
        &self.server
    }

    /// Looks up a named middleware by alias.
    #[must_use]
    pub fn get_named(&self, name: &str) -> Option<&MiddlewareEntry<C>> {
        self.named.get(name)
    }

    /// Appends `entry` to the global list.
    ///
    /// Returns `false` without inserting if an entry with the same handler
    /// reference is already present.
    pub(crate) fn push_global(&mut self, entry: MiddlewareEntry<C>) -> bool {
        push_unique(&mut self.global, entry)
    }

    /// Appends `entry` to the server list. Same dedup rule as `push_global`.
    pub(crate) fn push_server(&mut self, entry: MiddlewareEntry<C>) -> bool {
        push_unique(&mut self.server, entry)
    }

    /// Inserts a named entry. Returns `false` if the alias is taken.
    pub(crate) fn insert_named(&mut self, name: String, entry: MiddlewareEntry<C>) -> bool {
        if self.named.contains_key(&name) {
            return false;
        }
        self.named.insert(name, entry);
        true
    }
}

fn push_unique<C>(list: &mut Vec<MiddlewareEntry<C>>, entry: MiddlewareEntry<C>) -> bool {
    if list.iter().any(|existing| existing.handler() == entry.handler()) {
        return false;
    }
    list.push(entry);
    true
}

impl<C> Default for Registry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: 'static> fmt::Debug for Registry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("global", &self.global)
            .field("named", &self.named)
            .field("server", &self.server)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_warning_format() {
        assert_eq!(
            duplicate_warning(Category::Global, "foo"),
            "Detected existing global middleware {foo}, the current one will be ignored"
        );
        assert_eq!(
            duplicate_warning(Category::Named, "auth"),
            "Detected existing named middleware {auth}, the current one will be ignored"
        );
        assert_eq!(
            duplicate_warning(Category::Server, "foo"),
            "Detected existing server middleware {foo}, the current one will be ignored"
        );
    }

    #[test]
    fn test_push_preserves_order() {
        let mut registry: Registry<()> = Registry::new();
        assert!(registry.push_global(MiddlewareEntry::namespace("foo.handle")));
        assert!(registry.push_global(MiddlewareEntry::namespace("bar.handle")));

        let namespaces: Vec<_> = registry
            .global()
            .iter()
            .filter_map(|e| e.handler().namespace())
            .collect();
        assert_eq!(namespaces, vec!["foo.handle", "bar.handle"]);
    }

    #[test]
    fn test_push_rejects_duplicates() {
        let mut registry: Registry<()> = Registry::new();
        assert!(registry.push_server(MiddlewareEntry::namespace("foo.handle")));
        assert!(!registry.push_server(MiddlewareEntry::namespace("foo.handle")));
        assert_eq!(registry.server().len(), 1);
    }

    #[test]
    fn test_categories_are_independent() {
        let mut registry: Registry<()> = Registry::new();
        assert!(registry.push_global(MiddlewareEntry::namespace("foo.handle")));
        assert!(registry.push_server(MiddlewareEntry::namespace("foo.handle")));
        assert!(registry.insert_named("foo".to_string(), MiddlewareEntry::namespace("foo.handle")));
    }

    #[test]
    fn test_first_named_registration_wins() {
        let mut registry: Registry<()> = Registry::new();
        assert!(registry.insert_named("auth".to_string(), MiddlewareEntry::namespace("Auth.handle")));
        assert!(!registry.insert_named("auth".to_string(), MiddlewareEntry::namespace("Other.handle")));

        assert_eq!(
            registry.get_named("auth").unwrap().handler().namespace(),
            Some("Auth.handle")
        );
    }

    #[test]
    fn test_category_display() {
        assert_eq!(Category::Global.to_string(), "global");
        assert_eq!(Category::Named.as_str(), "named");
        assert_eq!(Category::Server.as_str(), "server");
    }
}
