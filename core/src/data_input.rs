//! `DataInput` — Domain-specific field extraction
//!
//! The `DataInput` trait is the field extractor contract: it reads one named
//! attribute from a domain-specific context (connection, HTTP request, test
//! map) and returns a tri-state [`FieldValue`].
//!
//! It is generic over the context type `Ctx`, while matchers only ever see
//! the extracted string, so the same matcher kinds serve every domain.

use crate::FieldValue;
use std::fmt::Debug;

/// Extracts one field from a domain-specific context.
///
/// Implementations must not mutate the request and must be cheap to call:
/// a tree only queries its input when evaluation reaches that tree, and the
/// caller may re-run evaluation after a pending field resolves.
///
/// # Type Parameters
///
/// - `Ctx`: The context type this input operates on (e.g. `ConnectionContext`)
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync`: one tree is shared by every
/// concurrent evaluation.
///
/// # Example
///
/// ```ignore
/// use mtree::{DataInput, FieldValue};
///
/// #[derive(Debug)]
/// struct HeaderInput { name: String }
///
/// impl DataInput<HttpRequest> for HeaderInput {
///     fn get(&self, ctx: &HttpRequest) -> FieldValue {
///         match ctx.headers() {
///             None => FieldValue::Pending,
///             Some(headers) => headers.get(&self.name).cloned().into(),
///         }
///     }
/// }
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `DataInput<{Ctx}>`",
    label = "this type cannot extract fields from `{Ctx}`",
    note = "DataInput<Ctx> extracts a field from a specific context type",
    note = "ensure your input type implements DataInput for the correct context (e.g., DataInput<ConnectionContext>, DataInput<TestContext>)"
)]
pub trait DataInput<Ctx>: Send + Sync + Debug {
    /// Extract the field from the given context.
    ///
    /// Returns [`FieldValue::Pending`] when the value cannot be produced yet,
    /// and an empty [`FieldValue::Available`] when the field is absent.
    fn get(&self, ctx: &Ctx) -> FieldValue;
}

#[diagnostic::do_not_recommend]
impl<Ctx> DataInput<Ctx> for Box<dyn DataInput<Ctx>> {
    fn get(&self, ctx: &Ctx) -> FieldValue {
        (**self).get(ctx)
    }
}
