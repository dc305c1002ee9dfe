//! Confirmation workflow — registration, token delivery and the
//! unconfirmed → confirmed transition.

use std::sync::Arc;

use tracing::{debug, info};

use super::credentials::CredentialStore;
use super::token::ConfirmationTokens;
use super::{AuthError, AuthResult};
use crate::mail::{Mail, MailQueue};
use crate::models::auth::User;

/// Result of presenting a confirmation token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    Confirmed,
    /// The actor was confirmed before; the token was not looked at.
    AlreadyConfirmed,
    /// Bad signature, malformed, expired, or issued for someone else.
    Invalid,
}

/// Result of asking for a fresh confirmation email.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResendOutcome {
    Sent,
    AlreadyConfirmed,
}

pub struct ConfirmationWorkflow {
    credentials: Arc<CredentialStore>,
    tokens: Arc<ConfirmationTokens>,
    mail: MailQueue,
    /// Base URL the confirmation link is built on, without trailing slash.
    public_url: String,
}

impl ConfirmationWorkflow {
    pub fn new(
        credentials: Arc<CredentialStore>,
        tokens: Arc<ConfirmationTokens>,
        mail: MailQueue,
        public_url: &str,
    ) -> Self {
        Self {
            credentials,
            tokens,
            mail,
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create the account and queue its confirmation email.
    ///
    /// Returns as soon as the mail is queued. A later delivery failure does
    /// not undo the registration.
    pub async fn register(&self, email: &str, username: &str, raw_password: &str) -> AuthResult<User> {
        let user = self.credentials.create(email, username, raw_password).await?;
        self.send_confirmation(&user)?;
        Ok(user)
    }

    /// Confirm `actor` with `token`.
    pub async fn confirm(&self, actor: &User, token: &str) -> AuthResult<ConfirmOutcome> {
        if actor.confirmed {
            return Ok(ConfirmOutcome::AlreadyConfirmed);
        }

        let subject = match self.tokens.verify(token) {
            Ok(subject) => subject,
            Err(e) => {
                debug!(user_id = %actor.id, "confirmation token rejected: {e}");
                return Ok(ConfirmOutcome::Invalid);
            }
        };
        if subject != actor.id {
            info!(user_id = %actor.id, "confirmation token issued for another user");
            return Ok(ConfirmOutcome::Invalid);
        }

        self.credentials.mark_confirmed(&actor.id).await?;
        info!(user_id = %actor.id, "account confirmed");
        Ok(ConfirmOutcome::Confirmed)
    }

    /// Issue a new token for an unconfirmed actor and queue the email.
    pub fn resend(&self, actor: &User) -> AuthResult<ResendOutcome> {
        if actor.confirmed {
            return Ok(ResendOutcome::AlreadyConfirmed);
        }
        self.send_confirmation(actor)?;
        Ok(ResendOutcome::Sent)
    }

    fn send_confirmation(&self, user: &User) -> AuthResult<()> {
        let token = self
            .tokens
            .issue(&user.id)
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        self.mail.submit(self.confirmation_mail(user, &token));
        debug!(user_id = %user.id, "confirmation mail queued");
        Ok(())
    }

    /// Build the confirmation message for `user`.
    pub fn confirmation_mail(&self, user: &User, token: &str) -> Mail {
        let link = format!("{}/auth/confirm/{token}", self.public_url);
        let minutes = self.tokens.ttl().num_minutes();
        Mail {
            to: user.email.clone(),
            subject: "Confirm your account".to_string(),
            body: format!(
                "Hello {},\n\n\
                 Welcome to the studio! To confirm your account, open the link below\n\
                 while signed in:\n\n\
                 {link}\n\n\
                 The link stays valid for {minutes} minutes.\n",
                user.username
            ),
        }
    }
}
