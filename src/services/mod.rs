// Service exports
pub mod listings;
pub mod mailer;
pub mod stats;
pub mod supabase;

pub use listings::ListingStore;
pub use mailer::{Mailer, MailerError};
pub use stats::{UsageOverview, UsageStats};
pub use supabase::{SupabaseClient, SupabaseError, SupabaseTables};
