//! External collaborator seams: mail transport and identity lookups.

mod identity;
mod mail;

pub use identity::{IdentityGateway, StaticIdentityGateway, UserRef};
pub use mail::{LogMailer, MailAttachment, MailError, MailMessage, Mailer, MemoryMailer};
