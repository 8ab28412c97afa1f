use core::fmt::Display;

use serde_core::ser::Error;

crate::cfg::debug! {
    std::thread_local! {
        pub(super) static SCHEMA_STACK: core::cell::RefCell<SchemaStack> =
            const { core::cell::RefCell::new(SchemaStack::new()) };
    }
}

/// The names of the record schemas currently being written, outermost first.
#[derive(Default, Clone)]
#[cfg_attr(
    not(all(feature = "std", feature = "debug", debug_assertions)),
    allow(dead_code)
)]
pub(super) struct SchemaStack {
    stack: alloc::vec::Vec<alloc::sync::Arc<bravo_schema::RecordSchema>>,
}

#[cfg_attr(
    not(all(feature = "std", feature = "debug", debug_assertions)),
    allow(dead_code)
)]
impl SchemaStack {
    pub const fn new() -> Self {
        Self {
            stack: alloc::vec::Vec::new(),
        }
    }

    pub fn push(&mut self, schema: alloc::sync::Arc<bravo_schema::RecordSchema>) {
        self.stack.push(schema);
    }

    pub fn pop(&mut self) {
        self.stack.pop();
    }
}

impl core::fmt::Debug for SchemaStack {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut iter = self.stack.iter();

        if let Some(first) = iter.next() {
            write!(f, "`{}`", first.name())?;
        }

        for schema in iter {
            write!(f, " -> `{}`", schema.name())?;
        }

        Ok(())
    }
}

/// Creates a custom serialization error.
///
/// This function should be preferred over [`Error::custom`] as it will include
/// the stack of record schemas being written in debug builds.
#[inline]
pub fn make_custom_error<E: Error>(msg: impl Display) -> E {
    crate::cfg::debug! {
        if {
            SCHEMA_STACK.with_borrow(|stack| {
                if stack.stack.is_empty() {
                    E::custom(msg)
                } else {
                    E::custom(format_args!("{msg} (stack: {stack:?})"))
                }
            })
        } else {
            E::custom(msg)
        }
    }
}
