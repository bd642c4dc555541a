//! # Adapters Layer (Hexagonal Architecture)
//!
//! `LakeStore` implementations.
//!
//! - [`InMemoryLakeStore`]: in-process store with visibility-lag and fault
//!   injection, for tests and simulations.
//! - [`FsLakeStore`]: serves a local mirror of the lake layout.

mod fs;
mod memory;

pub use fs::FsLakeStore;
pub use memory::{InMemoryLakeStore, InjectedResponse};

use crate::ports::{ListPage, ListRequest};

/// Group already-sorted keys into one page of common prefixes.
///
/// Continuation tokens are the last prefix of the previous page.
pub(crate) fn paginate_common_prefixes<'a, I>(sorted_keys: I, request: &ListRequest) -> ListPage
where
    I: IntoIterator<Item = &'a str>,
{
    let mut page = ListPage::default();
    if request.delimiter.is_empty() {
        return page;
    }

    let resume = request.continuation_token.as_deref();
    for key in sorted_keys {
        if key <= request.start_after.as_str() {
            continue;
        }
        if let Some(token) = resume {
            if key <= token || key.starts_with(token) {
                continue;
            }
        }

        // Objects at the root are not prefixes.
        let Some(idx) = key.find(request.delimiter.as_str()) else {
            continue;
        };
        let prefix = &key[..idx + request.delimiter.len()];
        if page.common_prefixes.last().map(String::as_str) == Some(prefix) {
            continue;
        }

        if page.common_prefixes.len() == request.max_keys {
            page.next_continuation_token = page.common_prefixes.last().cloned();
            break;
        }
        page.common_prefixes.push(prefix.to_string());
    }
    page
}
