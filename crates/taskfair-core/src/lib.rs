//! Data-fetching core between `taskfair-api` and UI consumers.
//!
//! This crate owns the domain model and the two fetching primitives
//! every screen composes:
//!
//! - **[`FetchTask<T>`]** — a one-shot request spawned on creation,
//!   observed as `{data, loading, error}` through a watch channel, and
//!   cancelled when its owner drops it. Used for uncached reads and
//!   screen mutations.
//!
//! - **[`QueryCache`]** / **[`QueryHandle<T>`]** — a keyed query cache
//!   with request de-duplication: at most one in-flight request per
//!   [`QueryKey`]; concurrent subscribers and refetches share a single
//!   network round-trip. Staleness is zero, so the cache coalesces
//!   rather than reuses — every new subscription revalidates. Stale
//!   settles are discarded via per-entry sequence numbers, and entries
//!   are evicted (in-flight work cancelled) when the last handle drops.
//!
//! Failure is always data, never an exception: both primitives surface
//! errors as rendered strings via [`CoreError`], so screens implement
//! the loading / error / empty / success contract without `Result`
//! plumbing.
//!
//! - **Domain model** ([`model`]) — canonical marketplace types
//!   (`Provider`, `Booking`, `Withdrawal`, `QuoteRequest`, …) with
//!   tolerant wire conversion in [`convert`].

pub mod convert;
pub mod error;
pub mod fetch;
pub mod model;
pub mod query;

// ── Primary re-exports ──────────────────────────────────────────────
pub use error::CoreError;
pub use fetch::{FetchState, FetchTask};
pub use query::{QueryCache, QueryHandle, QueryKey, QuerySnapshot};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    BankAccount,
    Booking,
    BookingStatus,
    Category,
    DashboardStats,
    Money,
    Provider,
    Quote,
    QuoteRequest,
    QuoteStatus,
    Review,
    Withdrawal,
    WithdrawalStatus,
};
