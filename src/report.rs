//! Structured reporting of preprocessing and query runs.
//!
//! A thread local reporter collects key/value pairs into a JSON object tree
//! roughly isomorph to the call graph. RAII guards open and close nested
//! contexts; when the guard returned by [`enable_reporting`] drops, the
//! collected tree is printed to standard output as one JSON object.
//! With no reporter enabled all reporting calls are no-ops, so library code
//! can report unconditionally.

use serde_json::{Map, Value};
use std::cell::RefCell;

pub use serde_json::json;

pub mod benchmark;
pub use benchmark::*;

#[macro_export]
macro_rules! report {
    ($k:expr, $($json:tt)+) => {
        $crate::report::report($k.to_string(), $crate::report::json!($($json)+))
    };
}

#[derive(Debug)]
enum Context {
    Object(Map<String, Value>),
    Collection(Vec<Value>),
}

/// Collector for one report tree.
///
/// The bottom frame is the root object. Every frame above it remembers the
/// key it will be inserted under in its parent when popped; collection items
/// have no key and are appended instead.
#[derive(Debug)]
struct Reporter {
    stack: Vec<(Option<String>, Context)>,
}

impl Reporter {
    fn new() -> Self {
        Reporter {
            stack: vec![(None, Context::Object(Map::new()))],
        }
    }

    fn report(&mut self, key: String, value: Value) {
        match &mut self.stack.last_mut().expect("empty reporting stack").1 {
            Context::Object(object) => {
                object.insert(key, value);
            }
            Context::Collection(_) => panic!("cannot report a keyed value inside a collection"),
        }
    }

    fn push_object(&mut self, key: Option<String>) {
        self.stack.push((key, Context::Object(Map::new())));
    }

    fn push_collection(&mut self, key: String) {
        self.stack.push((Some(key), Context::Collection(Vec::new())));
    }

    fn pop_context(&mut self) {
        let (key, context) = self.stack.pop().expect("popped the root reporting context");
        let value = match context {
            Context::Object(object) => Value::Object(object),
            Context::Collection(items) => Value::Array(items),
        };
        match &mut self.stack.last_mut().expect("popped the root reporting context").1 {
            Context::Object(object) => {
                object.insert(key.expect("nested context in an object needs a key"), value);
            }
            Context::Collection(items) => items.push(value),
        }
    }

    fn into_root(mut self) -> Value {
        while self.stack.len() > 1 {
            self.pop_context();
        }
        match self.stack.pop() {
            Some((None, Context::Object(object))) => Value::Object(object),
            _ => panic!("broken root object for reporting"),
        }
    }
}

thread_local! {
    static REPORTER: RefCell<Option<Reporter>> = RefCell::new(None);
}

fn with_reporter(f: impl FnOnce(&mut Reporter)) {
    REPORTER.with(|reporter| {
        if let Some(reporter) = reporter.borrow_mut().as_mut() {
            f(reporter);
        }
    });
}

/// Record one key/value pair in the current context.
/// Prefer the [`report!`](crate::report!) macro over calling this directly.
pub fn report(key: String, value: Value) {
    with_reporter(|reporter| reporter.report(key, value));
}

/// Guard for a nested object context. Dropping it closes the context.
#[must_use]
pub struct ContextGuard(());

impl Drop for ContextGuard {
    fn drop(&mut self) {
        with_reporter(Reporter::pop_context);
    }
}

/// Open a nested object under `key`; subsequent reports go into it until the
/// guard drops.
pub fn push_context(key: &str) -> ContextGuard {
    with_reporter(|reporter| reporter.push_object(Some(key.to_string())));
    ContextGuard(())
}

/// Guard for a collection context, e.g. one entry per query of an experiment.
#[must_use]
pub struct CollectionContextGuard(());

impl CollectionContextGuard {
    /// Open an object context for the next collection item.
    pub fn push_collection_item(&mut self) -> CollectionItemContextGuard {
        with_reporter(|reporter| reporter.push_object(None));
        CollectionItemContextGuard(self)
    }
}

impl Drop for CollectionContextGuard {
    fn drop(&mut self) {
        with_reporter(Reporter::pop_context);
    }
}

/// Open a collection under `key`.
pub fn push_collection_context(key: &str) -> CollectionContextGuard {
    with_reporter(|reporter| reporter.push_collection(key.to_string()));
    CollectionContextGuard(())
}

/// Guard for one item of a collection context.
#[must_use]
pub struct CollectionItemContextGuard<'a>(#[allow(dead_code)] &'a CollectionContextGuard);

impl<'a> Drop for CollectionItemContextGuard<'a> {
    fn drop(&mut self) {
        with_reporter(Reporter::pop_context);
    }
}

/// Guard returned by [`enable_reporting`]. Dropping it prints the report.
#[must_use]
pub struct ReportingGuard(());

impl Drop for ReportingGuard {
    fn drop(&mut self) {
        REPORTER.with(|reporter| {
            if let Some(reporter) = reporter.borrow_mut().take() {
                println!("{}", reporter.into_root());
            }
        });
    }
}

/// Activate reporting for the current thread and seed the report with run
/// metadata. The returned guard prints the collected JSON object on drop.
pub fn enable_reporting(program: &str) -> ReportingGuard {
    REPORTER.with(|reporter| reporter.replace(Some(Reporter::new())));

    report!("program", program);
    let start_time = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc2822)
        .unwrap_or_default();
    report!("start_time", start_time);
    report!("args", std::env::args().collect::<Vec<String>>());

    ReportingGuard(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_contexts_build_an_object_tree() {
        REPORTER.with(|reporter| reporter.replace(Some(Reporter::new())));
        report!("graph", "karlsruhe");
        {
            let _ctx = push_context("preprocessing");
            report!("num_shortcuts", 42);
        }
        {
            let mut queries = push_collection_context("queries");
            for distance in [10, 20] {
                let _item = queries.push_collection_item();
                report!("distance", distance);
            }
        }

        let root = REPORTER.with(|reporter| reporter.borrow_mut().take().unwrap().into_root());
        assert_eq!(root["graph"], "karlsruhe");
        assert_eq!(root["preprocessing"]["num_shortcuts"], 42);
        assert_eq!(root["queries"][1]["distance"], 20);
    }

    #[test]
    fn reporting_is_a_no_op_when_disabled() {
        report!("ignored", 1);
        let _ctx = push_context("also_ignored");
    }
}
