// Core algorithm exports
pub mod filters;
pub mod matcher;
pub mod sweep;

pub use filters::{matches_alert, matches_location, within_price_range};
pub use matcher::matching_listings;
pub use sweep::{
    AlertRepository, ContactResolver, DispatchError, DispatchOutcome, MailError, MailTransport,
    RepositoryError, ResolveError, SkipReason, SweepError, SweepPolicy, SweepReport, Sweeper,
};
